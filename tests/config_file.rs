use bb84_sim::SimulationConfig;
use bb84_sim::errors::ConfigError;
use std::io::Write;

#[test]
fn loads_and_runs_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{ "n_bits": 400, "channel_error_rate": 0.0, "eve_present": false, "seed": 3 }}"#
    )
    .unwrap();

    let config = SimulationConfig::from_json_file(file.path()).unwrap();
    assert_eq!(config.n_bits, 400);
    assert_eq!(config.seed, Some(3));

    let first = config.run().unwrap();
    let second = config.run().unwrap();
    assert_eq!(first, second);
    assert!(first.keys_agree());
}

#[test]
fn file_overrides_environment_field_by_field() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{ "n_bits": 50, "channel_error_rate": 0.0 }}"#).unwrap();

    let env = [("BB84_EVE_PRESENT", "true"), ("BB84_SEED", "1"), ("BB84_N_BITS", "999")]
        .map(|(k, v)| (k.to_string(), v.to_string()));
    let config = SimulationConfig::layered(env, Some(file.path())).unwrap();

    assert_eq!(config.n_bits, 50);
    assert_eq!(config.channel_error_rate, 0.0);
    assert!(config.eve_present);
    assert_eq!(config.seed, Some(1));
    assert_eq!(config.trials, 100);

    let res = config.run().unwrap();
    assert!(res.eve_present());
    assert_eq!(res.n_bits(), 50);
}

#[test]
fn layered_without_file_is_environment_only() {
    let env = vec![("BB84_TRIALS".to_string(), "7".to_string())];
    let config = SimulationConfig::layered(env, None).unwrap();

    assert_eq!(config.trials, 7);
    assert_eq!(config.n_bits, 100);
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = SimulationConfig::from_json_file(dir.path().join("absent.json")).unwrap_err();

    assert!(matches!(err, ConfigError::Io(_)));
}

#[test]
fn invalid_values_in_file_are_rejected() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{ "n_bits": 0 }}"#).unwrap();

    let err = SimulationConfig::from_json_file(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}
