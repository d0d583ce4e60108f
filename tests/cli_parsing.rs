//! Tests for command-line parsing and its conversion into a library `Config`.

use clap::Parser;
use electorate_geocoder::config::{LogFormat, LogLevel};
use electorate_geocoder::{Config, Opt};
use secrecy::ExposeSecret;
use std::path::PathBuf;
use std::time::Duration;

#[test]
fn test_defaults() {
    let opt = Opt::try_parse_from(["electorate_geocoder", "--api-key", "k"]).unwrap();
    let config = Config::from(opt);

    assert_eq!(config.input, PathBuf::from("data/grants.csv"));
    assert_eq!(config.resolved_output, PathBuf::from("data/grants_geocoded.csv"));
    assert_eq!(config.missed_output, PathBuf::from("data/grants_geocoded_missed.csv"));
    assert_eq!(config.checkpoint_path(), PathBuf::from("data/grants_geocoded.csv_bak"));
    assert_eq!(config.cache_path, PathBuf::from(".geocode_cache.db"));
    assert_eq!(config.venue_column, "club");
    assert_eq!(config.state_column, "state");
    assert_eq!(config.country_suffix, "Australia");
    assert_eq!(config.query_limit, None);
    assert_eq!(config.progress_interval, 10);
    assert_eq!(config.checkpoint_interval, 100);
    assert!(matches!(config.log_level, LogLevel::Info));
    assert!(matches!(config.log_format, LogFormat::Plain));
}

#[test]
fn test_all_flags() {
    let opt = Opt::try_parse_from([
        "electorate_geocoder",
        "grants_2019.csv",
        "--boundaries",
        "boundaries/2019.geojson",
        "--output",
        "out/resolved.csv",
        "--missed-output",
        "out/missed.csv",
        "--cache-path",
        "out/cache.db",
        "--api-key",
        "secret",
        "--places-endpoint",
        "http://127.0.0.1:9999/find",
        "--venue-column",
        "organisation",
        "--state-column",
        "st",
        "--country",
        "New Zealand",
        "--query-limit",
        "20",
        "--progress-interval",
        "5",
        "--checkpoint-interval",
        "50",
        "--max-attempts",
        "3",
        "--backoff-ms",
        "250",
        "--log-level",
        "debug",
        "--log-format",
        "json",
    ])
    .unwrap();
    let config = Config::from(opt);

    assert_eq!(config.input, PathBuf::from("grants_2019.csv"));
    assert_eq!(config.boundaries, PathBuf::from("boundaries/2019.geojson"));
    assert_eq!(config.checkpoint_path(), PathBuf::from("out/resolved.csv_bak"));
    assert_eq!(config.api_key.as_ref().map(|k| k.expose_secret()), Some("secret"));
    assert_eq!(config.places_endpoint, "http://127.0.0.1:9999/find");
    assert_eq!(config.venue_column, "organisation");
    assert_eq!(config.country_suffix, "New Zealand");
    assert_eq!(config.query_limit, Some(20));
    assert_eq!(config.progress_interval, 5);
    assert_eq!(config.checkpoint_interval, 50);
    assert_eq!(config.retry.max_attempts, 3);
    assert_eq!(config.retry.initial_delay, Duration::from_millis(250));
    assert!(matches!(config.log_level, LogLevel::Debug));
    assert!(matches!(config.log_format, LogFormat::Json));
    assert!(config.validate().is_ok());
}

#[test]
fn test_blank_api_key_is_treated_as_missing() {
    let opt = Opt::try_parse_from(["electorate_geocoder", "--api-key", "  "]).unwrap();
    let config = Config::from(opt);
    assert!(config.api_key.is_none());
    assert!(config.validate().is_err());
}

#[test]
fn test_invalid_numbers_are_rejected() {
    assert!(Opt::try_parse_from(["electorate_geocoder", "--query-limit", "lots"]).is_err());
    assert!(Opt::try_parse_from(["electorate_geocoder", "--log-level", "loud"]).is_err());
}
