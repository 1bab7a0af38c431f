use clap::ArgMatches;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use pagesift_analyzer::{AnalysisResult, Analyzer, AnalyzerConfig, CancelToken};
use pagesift_server::{AppServer, Config};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

pub async fn handle_analyze(sub_matches: &ArgMatches) {
    // Initialize tracing for logging; RUST_LOG controls verbosity
    tracing_subscriber::fmt::init();

    let target = sub_matches.get_one::<String>("url").unwrap();
    let workers = *sub_matches.get_one::<usize>("workers").unwrap();
    let timeout = *sub_matches.get_one::<u64>("timeout").unwrap();
    let link_timeout = *sub_matches.get_one::<u64>("link-timeout").unwrap();
    let max_redirects = *sub_matches.get_one::<usize>("max-redirects").unwrap();
    let format = sub_matches.get_one::<String>("format").unwrap();
    let output = sub_matches.get_one::<PathBuf>("output");

    let config = AnalyzerConfig {
        max_workers: workers,
        request_timeout_secs: timeout,
        link_timeout_secs: link_timeout,
        max_redirects,
    };

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message(format!("Analyzing {target}"));

    let analyzer = Analyzer::new(config);
    let cancel = CancelToken::new();

    let result = match analyzer.analyze(target, &cancel).await {
        Ok(result) => result,
        Err(e) => {
            spinner.finish_and_clear();
            eprintln!("{} Analysis failed: {}", "✗".red().bold(), e);
            std::process::exit(1);
        }
    };
    spinner.finish_and_clear();

    let report = match format.as_str() {
        "json" => {
            let mut json =
                serde_json::to_string_pretty(&result).expect("Failed to serialize result");
            json.push('\n');
            json
        }
        _ => format_text_report(&result),
    };

    match output {
        Some(path) => {
            if let Err(e) = fs::write(path, &report) {
                eprintln!(
                    "{} Failed to write {}: {}",
                    "✗".red().bold(),
                    path.display(),
                    e
                );
                std::process::exit(1);
            }
            println!(
                "{} Report saved to {}",
                "✓".green().bold(),
                path.display().to_string().bright_white()
            );
        }
        None => print!("{report}"),
    }
}

pub async fn handle_serve(sub_matches: &ArgMatches) {
    let config_path = sub_matches
        .get_one::<String>("config")
        .map(|path| shellexpand::tilde(path).to_string());
    let bind = sub_matches.get_one::<String>("bind");

    let mut config = match Config::load(config_path.as_deref().map(Path::new)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} Failed to load config: {:#}", "✗".red().bold(), e);
            std::process::exit(1);
        }
    };

    if let Some(bind) = bind {
        config.bind_address = bind.clone();
    }

    init_logging(&config.log_level, &config.log_format);

    info!(
        bind = %config.bind_address,
        workers = config.analyzer.max_workers,
        "starting pagesift server"
    );

    let server = match AppServer::bind(config).await {
        Ok(server) => server,
        Err(e) => {
            eprintln!("{} Failed to bind: {}", "✗".red().bold(), e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.serve().await {
        eprintln!("{} Server failed: {}", "✗".red().bold(), e);
        std::process::exit(1);
    }
}

/// Text or JSON log output at the configured level; RUST_LOG wins when set.
fn init_logging(level: &str, format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if format == "json" {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// Plain-text report for one analyzed page.
pub fn format_text_report(result: &AnalysisResult) -> String {
    let mut report = String::new();

    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");
    report.push_str(&format!("# {}\n\n", result.url));

    if let Some(error) = &result.error {
        report.push_str(&format!("  Analysis failed: {error}\n"));
        return report;
    }

    report.push_str(&format!("  Document version: {}\n", result.html_version));
    let title = if result.title.is_empty() {
        "(none)"
    } else {
        &result.title
    };
    report.push_str(&format!("  Title: {title}\n\n"));

    report.push_str("  Headings:\n");
    for (level, count) in &result.headings {
        report.push_str(&format!("    {level}: {count}\n"));
    }

    report.push_str(&format!("\n  Internal links: {}\n", result.internal_links));
    report.push_str(&format!("  External links: {}\n", result.external_links));
    report.push_str(&format!(
        "  Inaccessible links: {}\n",
        result.inaccessible_links
    ));
    report.push_str(&format!(
        "  Login form: {}\n",
        if result.has_login_form { "yes" } else { "no" }
    ));

    report
}
