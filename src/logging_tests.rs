use super::*;

#[test]
fn test_log_config_default() {
    let config = LogConfig::default();
    assert_eq!(config.log_level, Level::INFO);
    assert!(!config.json_format);
    assert!(config.log_dir.ends_with("logs"));
    assert!(config.log_dir.to_string_lossy().contains(".affairs"));
}

#[test]
fn test_parse_rotation_known_values() {
    assert_eq!(format!("{:?}", parse_rotation("HOURLY")), format!("{:?}", Rotation::HOURLY));
    assert_eq!(format!("{:?}", parse_rotation(" never ")), format!("{:?}", Rotation::NEVER));
    assert_eq!(format!("{:?}", parse_rotation("daily")), format!("{:?}", Rotation::DAILY));
}

#[test]
fn test_parse_rotation_unknown_defaults_to_daily() {
    assert_eq!(
        format!("{:?}", parse_rotation("weekly")),
        format!("{:?}", Rotation::DAILY)
    );
}

#[test]
fn test_log_file_path_unset_is_empty_or_stable() {
    let first = get_log_file_path();
    assert_eq!(first, get_log_file_path());
}

#[test]
fn test_log_filename_constant() {
    assert_eq!(LOG_FILENAME, "affairs-daemon.log");
}
