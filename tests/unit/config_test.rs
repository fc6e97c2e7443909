//! Unit tests for configuration parsing

use flowlog::config::{RotationKind, Schedule};
use flowlog::{Config, ConfigError, DetailLevel};

#[test]
fn full_file_parses() {
    let toml = r#"
[logging]
enabled = true
detail_level = "minimal"
max_content_length = 500
indent_size = 4
directory = "/var/log/agent"
file_name = "pipeline.log"

[writer]
async_enabled = false
batch_size = 50
flush_interval_ms = 200
queue_capacity = 1000
shutdown_timeout_ms = 2000

[rotation]
enabled = true
kind = "time"
schedule = "hourly"
backup_count = 3
compress = true

[redaction]
enabled = true
redact_tool_payloads = true
"#;
    let config: Config = toml::from_str(toml).unwrap();
    config.validate().unwrap();

    assert_eq!(config.logging.detail_level, DetailLevel::Minimal);
    assert_eq!(config.format_options().indent_size, 4);
    assert_eq!(config.log_path().to_str(), Some("/var/log/agent/pipeline.log"));
    assert_eq!(config.writer.capacity(), Some(1000));
    assert_eq!(config.rotation.kind, RotationKind::Time);
    assert_eq!(config.rotation.schedule, Schedule::Hourly);
    assert!(config.redaction.redact_prompts);
    assert!(config.redaction.redact_tool_payloads);
}

#[test]
fn empty_file_gives_defaults() {
    let config: Config = toml::from_str("").unwrap();
    assert!(config.logging.enabled);
    assert_eq!(config.logging.detail_level, DetailLevel::Normal);
    assert_eq!(config.writer.batch_size, 10);
    assert_eq!(config.writer.capacity(), None);
    assert!(!config.rotation.enabled);
    assert!(!config.redaction.enabled);
}

#[test]
fn unknown_detail_level_is_a_parse_error() {
    let result: Result<Config, _> = toml::from_str("[logging]\ndetail_level = \"loud\"\n");
    assert!(result.is_err());
}

#[test]
fn string_typed_enums_report_config_errors() {
    assert_eq!("VERBOSE".parse::<DetailLevel>().unwrap(), DetailLevel::Verbose);
    assert!(matches!(
        "weekly".parse::<Schedule>(),
        Err(ConfigError::InvalidSchedule(_))
    ));
    assert!(matches!(
        "count".parse::<RotationKind>(),
        Err(ConfigError::InvalidRotationKind(_))
    ));
}

#[test]
fn zero_max_bytes_only_matters_for_size_rotation() {
    let mut config = Config::default();
    config.rotation.max_bytes = 0;
    assert!(config.validate().is_ok());

    config.rotation.enabled = true;
    assert!(matches!(
        config.validate(),
        Err(ConfigError::Zero {
            field: "rotation.max_bytes"
        })
    ));

    config.rotation.kind = RotationKind::Time;
    assert!(config.validate().is_ok());
}

#[test]
fn config_round_trips_through_toml() {
    let mut config = Config::default();
    config.rotation.enabled = true;
    config.rotation.backup_count = 7;
    let text = toml::to_string_pretty(&config).unwrap();
    let back: Config = toml::from_str(&text).unwrap();
    assert_eq!(back.rotation.backup_count, 7);
    assert!(back.rotation.enabled);
}

#[test]
fn zero_indent_size_is_rejected_from_file() {
    let config: Config = toml::from_str("[logging]\nindent_size = 0\n").unwrap();
    assert!(matches!(
        config.validate(),
        Err(ConfigError::Zero {
            field: "logging.indent_size"
        })
    ));
}
