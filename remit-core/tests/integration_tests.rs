//! Integration tests for remit-core infrastructure

use remit_core::{
    config_error, init_logging, storage_error, validation_error, ErrorContext, LogFormat,
    LoggingConfig, RemitConfig, RemitError,
};
use tempfile::TempDir;

#[test]
fn test_error_handling() {
    let error = storage_error!("Disk full", "credentials");

    match &error {
        RemitError::Storage {
            message, context, ..
        } => {
            assert_eq!(message, "Disk full");
            assert_eq!(context.component, "credentials");
            assert!(!context.error_id.is_empty());
        }
        _ => panic!("Expected Storage error"),
    }

    // Logging an error must not panic even without a subscriber
    error.log();
    assert!(error.is_recoverable());

    let network_error = RemitError::Network {
        message: "Connection refused".to_string(),
        source: None,
        context: ErrorContext::new("test"),
    };
    assert!(network_error.is_recoverable());
    assert!(!network_error.is_auth_failure());

    let config_error = config_error!("Invalid config", "test");
    assert!(!config_error.is_recoverable());
    assert!(config_error
        .context()
        .map(|c| !c.recovery_suggestions.is_empty())
        .unwrap_or(false));

    let validation = validation_error!("must not be empty", "token", "cli");
    match validation {
        RemitError::Validation { field, .. } => assert_eq!(field.as_deref(), Some("token")),
        _ => panic!("Expected Validation error"),
    }
}

#[test]
fn test_config_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let mut config = RemitConfig::default();
    config.api.base_url = "https://backend.example.com/index.php".to_string();
    config.storage.profile_cache_ttl_secs = 600;
    config.logging.format = LogFormat::Json;

    config.save_to_file(&path).unwrap();
    let loaded = RemitConfig::from_file(&path).unwrap();

    assert_eq!(loaded.api.base_url, "https://backend.example.com/index.php");
    assert_eq!(loaded.storage.profile_cache_ttl_secs, 600);
    assert_eq!(loaded.logging.format, LogFormat::Json);
    assert!(loaded.validate().is_ok());
}

#[test]
fn test_partial_config_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("remit.toml");
    std::fs::write(
        &path,
        "[api]\nbase_url = \"https://api.example.com\"\ntimeout_seconds = 5\nuser_agent = \"test\"\nprofile_path = \"me\"\n",
    )
    .unwrap();

    let loaded = RemitConfig::from_file(&path).unwrap();
    assert_eq!(loaded.api.timeout_seconds, 5);
    assert_eq!(loaded.storage.profile_cache_ttl_secs, 1800);
    assert_eq!(loaded.logging.level, "info");
}

#[test]
fn test_config_validation() {
    let mut config = RemitConfig::default();
    assert!(config.validate().is_ok());

    config.api.base_url = "ftp://nope".to_string();
    assert!(matches!(config.validate(), Err(RemitError::Config { .. })));

    let mut config = RemitConfig::default();
    config.api.timeout_seconds = 0;
    assert!(config.validate().is_err());

    let mut config = RemitConfig::default();
    config.storage.profile_cache_ttl_secs = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_missing_config_file() {
    let result = RemitConfig::from_file("/definitely/not/here/remit.toml");
    match result {
        Err(RemitError::Config { context, .. }) => {
            assert_eq!(context.operation.as_deref(), Some("read_file"));
        }
        _ => panic!("Expected Config error"),
    }
}

#[test]
fn test_data_dir_expansion() {
    let mut config = RemitConfig::default();
    config.storage.data_dir = "/var/lib/remit".to_string();
    assert_eq!(
        config.storage.resolved_data_dir(),
        std::path::PathBuf::from("/var/lib/remit")
    );

    config.storage.data_dir = "~/.remit/data".to_string();
    let resolved = config.storage.resolved_data_dir();
    assert!(resolved.ends_with(".remit/data"));
    assert!(!resolved.to_string_lossy().starts_with('~'));
}

#[test]
fn test_logging_initialization() {
    let config = LoggingConfig {
        level: "debug".to_string(),
        format: LogFormat::Compact,
        filter_directives: vec!["remit_core=trace".to_string()],
        ..LoggingConfig::default()
    };

    let first = init_logging(&config);
    assert!(first.is_ok());

    // The global subscriber can only be installed once per process
    let second = init_logging(&config);
    assert!(matches!(second, Err(RemitError::Config { .. })));
}

#[test]
fn test_logging_requires_file_path() {
    let config = LoggingConfig {
        log_to_file: true,
        log_file_path: None,
        ..LoggingConfig::default()
    };

    assert!(init_logging(&config).is_err());
}
