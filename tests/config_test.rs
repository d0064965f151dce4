//! Integration tests for TourConfig loading.

use std::io::Write;

use kv_attention_tour::{Error, TourConfig};

fn write_config(json: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();
    file
}

#[test]
fn test_empty_object_gives_defaults() {
    let file = write_config("{}");
    let config = TourConfig::from_file(file.path()).unwrap();
    assert_eq!(config, TourConfig::default());
}

#[test]
fn test_partial_override() {
    let file = write_config(
        r#"{
            "dimensions": { "seq_len": 3, "model_dim": 8, "num_heads": 2, "head_dim": 4 },
            "playback": { "interval_ms": 500 },
            "tokens": { "prompt": ["I", "love", "ML"], "next": "!" }
        }"#,
    );
    let config = TourConfig::from_file(file.path()).unwrap();

    assert_eq!(config.dimensions.seq_len, 3);
    assert_eq!(config.dimensions.model_dim, 8);
    assert_eq!(config.playback.interval_ms, 500);
    assert_eq!(config.tokens.next, "!");
}

#[test]
fn test_token_count_must_match_seq_len() {
    let file = write_config(r#"{ "dimensions": { "seq_len": 4 } }"#);
    let err = TourConfig::from_file(file.path()).unwrap_err();
    assert!(matches!(err, Error::Config(msg) if msg.contains("tokens.prompt")));
}

#[test]
fn test_oversized_dimension_rejected() {
    let file = write_config(
        r#"{ "dimensions": { "seq_len": 6, "model_dim": 34, "num_heads": 2, "head_dim": 17 } }"#,
    );
    assert!(matches!(
        TourConfig::from_file(file.path()),
        Err(Error::Config(_))
    ));
}

#[test]
fn test_malformed_json() {
    let file = write_config("{ not json");
    assert!(matches!(
        TourConfig::from_file(file.path()),
        Err(Error::Json(_))
    ));
}

#[test]
fn test_missing_file() {
    assert!(matches!(
        TourConfig::from_file("/nonexistent/tour.json"),
        Err(Error::Io(_))
    ));
}

#[test]
fn test_roundtrip_through_json() {
    let config = TourConfig::default().with_seq_len(4).with_interval_ms(750);
    let json = serde_json::to_string(&config).unwrap();
    let file = write_config(&json);
    assert_eq!(TourConfig::from_file(file.path()).unwrap(), config);
}
