use colored::Colorize;
use pagesift::commands::command_argument_builder;
use pagesift::handlers;

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    let quiet = chosen_command.get_flag("quiet");

    // Show banner unless --quiet flag is set
    if !quiet {
        print_banner();
    }

    if chosen_command.subcommand().is_none() {
        // No subcommand provided, just show the banner
        return;
    }

    match chosen_command.subcommand() {
        Some(("analyze", sub_matches)) => handlers::handle_analyze(sub_matches).await,
        Some(("serve", sub_matches)) => handlers::handle_serve(sub_matches).await,
        _ => unreachable!("clap should ensure we don't get here"),
    }
}

fn print_banner() {
    let banner = r#"                              _  __ _
     _ __   __ _  __ _  ___  ___(_)/ _| |_
    | '_ \ / _` |/ _` |/ _ \/ __| | |_| __|
    | |_) | (_| | (_| |  __/\__ \ |  _| |_
    | .__/ \__,_|\__, |\___||___/_|_|  \__|
    |_|          |___/"#;

    println!("{}", banner.bright_cyan());
    println!(
        "    {}\n",
        format!("v{} - single-page web analyzer", env!("CARGO_PKG_VERSION")).dimmed()
    );
}
