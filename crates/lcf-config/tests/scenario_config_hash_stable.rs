//! Scenario: config hash stability.
//!
//! GREEN when:
//! - Loading the same documents twice yields the same hash.
//! - Reordering keys within YAML does not change the hash.
//! - Different values produce different hashes.
//! - Overlays take effect and the merged hash is stable.

use lcf_config::load_layered_yaml_from_strings;

const BASE_YAML: &str = r#"
field:
  price_mode: custom
  price:
    number: "5.00"
    currency_code: USD
  hide: false
gateway:
  base_url: "http://127.0.0.1:9112"
  api_token_env: "LCF_CHARGE_TOKEN"
"#;

const BASE_YAML_REORDERED: &str = r#"
gateway:
  api_token_env: "LCF_CHARGE_TOKEN"
  base_url: "http://127.0.0.1:9112"
field:
  hide: false
  price:
    currency_code: USD
    number: "5.00"
  price_mode: custom
"#;

const OVERLAY_YAML: &str = r#"
field:
  price_mode: donation
  hide: true
"#;

#[test]
fn same_input_produces_identical_hash() {
    let a = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    let b = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    assert_eq!(a.config_hash, b.config_hash);
    assert_eq!(a.canonical_json, b.canonical_json);
}

#[test]
fn reordered_keys_produce_same_hash() {
    let original = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    let reordered = load_layered_yaml_from_strings(&[BASE_YAML_REORDERED]).unwrap();
    assert_eq!(
        original.config_hash, reordered.config_hash,
        "reordering keys in YAML must not change the hash"
    );
}

#[test]
fn different_values_produce_different_hash() {
    let a = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    let b = load_layered_yaml_from_strings(&[BASE_YAML, "field:\n  hide: true\n"]).unwrap();
    assert_ne!(a.config_hash, b.config_hash);
}

#[test]
fn overlay_takes_effect_in_typed_settings() {
    let a = load_layered_yaml_from_strings(&[BASE_YAML, OVERLAY_YAML]).unwrap();
    let b = load_layered_yaml_from_strings(&[BASE_YAML, OVERLAY_YAML]).unwrap();
    assert_eq!(a.config_hash, b.config_hash);

    let settings = a.settings().unwrap();
    assert_eq!(settings.field.price_mode, lcf_config::PriceMode::Donation);
    assert!(settings.field.hide);
    // Base values the overlay did not touch survive the merge.
    assert_eq!(settings.field.price.number, "5.00");
    assert_eq!(settings.gateway.api_token_env, "LCF_CHARGE_TOKEN");
}

#[test]
fn hash_is_64_hex_chars() {
    let loaded = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    assert_eq!(loaded.config_hash.len(), 64);
    assert!(loaded.config_hash.chars().all(|c| c.is_ascii_hexdigit()));
}
