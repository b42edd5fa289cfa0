//! Integration tests for logging system

use bridge_traits::time::LogLevel;
use core_runtime::config::TickerConfig;
use core_runtime::logging::{redact_if_sensitive, strip_path, LogFormat, LoggingConfig};

#[test]
fn test_logging_config_from_ticker_config() {
    let json = r#"{ "logging": { "level": "debug", "format": "json" } }"#;
    let config = TickerConfig::from_json_str(json).unwrap();
    let logging: LoggingConfig = config.logging.to_logging_config();

    assert_eq!(logging.format, LogFormat::Json);
    assert_eq!(logging.level, LogLevel::Debug);
    assert!(logging.filter.is_none());
}

#[test]
fn test_credentials_are_redacted() {
    let key = "wJalrXUtnFEMI/K7MDENG/bPxRfiCYEXAMPLEKEY";
    assert_eq!(redact_if_sensitive("secret_access_key", key), "[REDACTED]");
    assert_eq!(redact_if_sensitive("bucket", "mybucket"), "mybucket");
}

#[test]
fn test_media_paths_are_shortened() {
    assert_eq!(strip_path("/tmp/uploads/2016/sunset.jpg"), "sunset.jpg");
}

#[test]
fn test_init_logging_rejects_bad_filter() {
    let config = LoggingConfig::default().with_filter("core_sync=notalevel");
    assert!(core_runtime::logging::init_logging(config).is_err());
}
