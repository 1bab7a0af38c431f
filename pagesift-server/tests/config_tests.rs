// Configuration layering tests: defaults, TOML file, environment.

use pagesift_server::Config;
use std::env;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use tempfile::NamedTempFile;

// The PAGESIFT_* variables are process-global; tests touching them take
// this lock so they cannot interleave.
static ENV_LOCK: Mutex<()> = Mutex::new(());

const ENV_VARS: &[&str] = &[
    "PAGESIFT_CONFIG",
    "PAGESIFT_BIND_ADDRESS",
    "PAGESIFT_LOG_LEVEL",
    "PAGESIFT_LOG_FORMAT",
    "PAGESIFT_REQUEST_TIMEOUT_SECS",
    "PAGESIFT_MAX_WORKERS",
    "PAGESIFT_FETCH_TIMEOUT_SECS",
    "PAGESIFT_LINK_TIMEOUT_SECS",
    "PAGESIFT_MAX_REDIRECTS",
];

fn clear_env() {
    for var in ENV_VARS {
        unsafe { env::remove_var(var) };
    }
}

#[test]
fn test_defaults() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let config = Config::load(None).unwrap();

    assert_eq!(config.bind_address, "0.0.0.0:8080");
    assert_eq!(config.log_level, "info");
    assert_eq!(config.log_format, "text");
    assert_eq!(config.request_timeout_secs, 60);
    assert_eq!(config.analyzer.max_workers, 10);
    assert_eq!(config.analyzer.request_timeout_secs, 30);
    assert_eq!(config.analyzer.link_timeout_secs, 10);
    assert_eq!(config.analyzer.max_redirects, 5);
}

#[test]
fn test_partial_toml_file_overlays_defaults() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
bind_address = "127.0.0.1:9000"
log_format = "json"

[analyzer]
max_workers = 4
"#
    )
    .unwrap();

    let config = Config::load(Some(file.path())).unwrap();

    assert_eq!(config.bind_address, "127.0.0.1:9000");
    assert_eq!(config.log_format, "json");
    assert_eq!(config.analyzer.max_workers, 4);
    // Untouched settings keep their defaults.
    assert_eq!(config.log_level, "info");
    assert_eq!(config.analyzer.max_redirects, 5);
}

#[test]
fn test_missing_explicit_file_fails_loudly() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let result = Config::load(Some(Path::new("/definitely/not/here/pagesift.toml")));
    assert!(result.is_err());
}

#[test]
fn test_unparseable_file_fails_loudly() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "this = [ is not toml").unwrap();

    assert!(Config::load(Some(file.path())).is_err());
}

#[test]
fn test_env_overrides_file_and_defaults() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, r#"bind_address = "127.0.0.1:9000""#).unwrap();

    unsafe {
        env::set_var("PAGESIFT_BIND_ADDRESS", "127.0.0.1:7070");
        env::set_var("PAGESIFT_LOG_LEVEL", "debug");
        env::set_var("PAGESIFT_MAX_WORKERS", "2");
        env::set_var("PAGESIFT_LINK_TIMEOUT_SECS", "3");
        env::set_var("PAGESIFT_MAX_REDIRECTS", "1");
    }

    let config = Config::load(Some(file.path())).unwrap();
    clear_env();

    assert_eq!(config.bind_address, "127.0.0.1:7070");
    assert_eq!(config.log_level, "debug");
    assert_eq!(config.analyzer.max_workers, 2);
    assert_eq!(config.analyzer.link_timeout_secs, 3);
    assert_eq!(config.analyzer.max_redirects, 1);
}

#[test]
fn test_unparseable_env_numbers_are_ignored() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    unsafe { env::set_var("PAGESIFT_MAX_WORKERS", "many") };

    let config = Config::load(None).unwrap();
    clear_env();

    assert_eq!(config.analyzer.max_workers, 10);
}
