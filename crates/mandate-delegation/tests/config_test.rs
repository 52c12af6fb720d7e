//! Engine configuration loading

use mandate_core::{Address, MandateConfig};
use mandate_delegation::{EngineConfig, ReusePolicy};
use std::io::Write;

#[test]
fn file_values_override_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
max_chain_length = 4
reuse_policy = "single-use"

[domain]
chain_id = 10
"#
    )
    .unwrap();

    let config = EngineConfig::load_from_file(file.path()).unwrap();
    assert_eq!(config.max_chain_length, 4);
    assert_eq!(config.reuse_policy, ReusePolicy::SingleUse);
    assert_eq!(config.domain.chain_id, 10);
    assert_eq!(config.domain.name, "mandate");
    assert!(config.allow_open_delegations);
}

#[test]
fn prefixed_variables_set_nested_keys() {
    let mut config = EngineConfig::default();
    config
        .merge_with_vars([
            ("MANDATE_DOMAIN__CHAIN_ID".to_string(), "7".to_string()),
            ("MANDATE_ALLOW_OPEN_DELEGATIONS".to_string(), "false".to_string()),
            ("UNRELATED".to_string(), "ignored".to_string()),
        ])
        .unwrap();

    assert_eq!(config.domain.chain_id, 7);
    assert!(!config.allow_open_delegations);
}

#[test]
fn domain_name_accepts_numeric_and_boolean_text() {
    let mut config = EngineConfig::default();
    config
        .merge_with_vars([("MANDATE_DOMAIN__NAME".to_string(), "123".to_string())])
        .unwrap();
    assert_eq!(config.domain.name, "123");
    config.validate().unwrap();

    config
        .merge_with_vars([("MANDATE_DOMAIN__NAME".to_string(), "true".to_string())])
        .unwrap();
    assert_eq!(config.domain.name, "true");
    config.validate().unwrap();
}

#[test]
fn verifying_contract_round_trips_as_hex() {
    let config = EngineConfig::default();
    let rendered = toml::to_string(&config).unwrap();
    assert!(rendered.contains(&config.domain.verifying_contract.to_string()));

    let parsed: EngineConfig = toml::from_str(&rendered).unwrap();
    assert_eq!(parsed, config);
    assert_eq!(
        parsed.domain.verifying_contract,
        Address::well_known("delegation-manager")
    );
}

#[test]
fn out_of_range_chain_length_fails_validation() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "max_chain_length = 1000").unwrap();

    let config = EngineConfig::load_from_file(file.path()).unwrap();
    assert!(config.validate().is_err());
}
