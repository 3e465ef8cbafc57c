//! Integration tests for the `fedeval` command line

use std::path::PathBuf;

use clap::Parser;
use fedeval::cli::{run, Args, Commands};
use fedeval::config::CONFIG_ENV;
use serde_json::{json, Value};
use tempfile::TempDir;

const THREE_CLIENTS: &str = include_str!("../configs/fedavg-3-clients.toml");
const SINGLE_CLIENT: &str = include_str!("../configs/single-client.toml");

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

fn execute(argv: &[&str]) -> (anyhow::Result<()>, String) {
    let args = Args::try_parse_from(argv.iter().copied()).unwrap();
    let mut out = Vec::new();
    let result = run(args, &mut out);
    (result, String::from_utf8(out).unwrap())
}

#[test]
fn test_aggregate_prints_metric_map() {
    let dir = TempDir::new().unwrap();
    let reports = write(
        &dir,
        "round.json",
        r#"[{"num_examples": 10, "metrics": {"acc": 0.25}},
            {"num_examples": 10, "metrics": {"acc": 0.75}}]"#,
    );

    let (result, out) = execute(&["fedeval", "aggregate", "--reports", reports.to_str().unwrap()]);
    result.unwrap();
    let printed: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(printed, json!({"acc": 0.5}));
    assert_eq!(printed.to_string(), r#"{"acc":0.5}"#);
}

#[test]
fn test_aggregate_global_denominator_flag() {
    let dir = TempDir::new().unwrap();
    let reports = write(
        &dir,
        "round.json",
        r#"[{"num_examples": 5, "metrics": {"a": 1.0}},
            {"num_examples": 5, "metrics": {"b": 2.0}}]"#,
    );
    let path = reports.to_str().unwrap();

    let (result, out) = execute(&["fedeval", "aggregate", "--reports", path]);
    result.unwrap();
    assert_eq!(serde_json::from_str::<Value>(&out).unwrap(), json!({"a": 1.0, "b": 2.0}));

    let (result, out) = execute(&[
        "fedeval",
        "aggregate",
        "--reports",
        path,
        "--denominator",
        "global",
    ]);
    result.unwrap();
    assert_eq!(serde_json::from_str::<Value>(&out).unwrap(), json!({"a": 0.5, "b": 1.0}));
}

#[test]
fn test_aggregate_missing_reports_file() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("absent.json");

    let (result, out) = execute(&["fedeval", "aggregate", "--reports", missing.to_str().unwrap()]);
    let err = result.unwrap_err();
    assert!(format!("{:#}", err).contains("failed to read reports file"));
    assert!(out.is_empty());
}

#[test]
fn test_aggregate_rejects_negative_count_in_file() {
    let dir = TempDir::new().unwrap();
    let reports = write(&dir, "round.json", r#"[{"num_examples": -1, "metrics": {"acc": 0.5}}]"#);

    let (result, out) = execute(&["fedeval", "aggregate", "--reports", reports.to_str().unwrap()]);
    assert!(format!("{:#}", result.unwrap_err()).contains("failed to parse reports file"));
    assert!(out.is_empty());
}

#[test]
fn test_aggregate_zero_weight_fails() {
    let dir = TempDir::new().unwrap();
    let reports = write(&dir, "round.json", r#"[{"num_examples": 0, "metrics": {"acc": 1.0}}]"#);

    let (result, out) = execute(&["fedeval", "aggregate", "--reports", reports.to_str().unwrap()]);
    assert!(matches!(
        result.unwrap_err().downcast_ref::<fedeval::FedEvalError>(),
        Some(fedeval::FedEvalError::ZeroWeight { metric }) if metric == "acc"
    ));
    assert!(out.is_empty());
}

#[test]
fn test_validate_config_ok() {
    let dir = TempDir::new().unwrap();
    let config = write(&dir, "fedeval.toml", THREE_CLIENTS);

    let (result, out) = execute(&["fedeval", "validate-config", "--config", config.to_str().unwrap()]);
    result.unwrap();
    assert_eq!(out.trim(), "Config is OK");
}

#[test]
fn test_validate_config_reports_invalid_file() {
    let dir = TempDir::new().unwrap();
    let config = write(
        &dir,
        "fedeval.toml",
        &THREE_CLIENTS.replace("num_rounds = 20", "num_rounds = 0"),
    );

    let (result, out) = execute(&["fedeval", "validate-config", "--config", config.to_str().unwrap()]);
    let message = format!("{:#}", result.unwrap_err());
    assert!(message.starts_with("config validation failed"), "{}", message);
    assert!(message.contains("num_rounds"), "{}", message);
    assert!(out.is_empty());
}

#[test]
fn test_validate_config_unparseable_file() {
    let dir = TempDir::new().unwrap();
    let config = write(&dir, "fedeval.toml", "[server]\naddress = ");

    let (result, _) = execute(&["fedeval", "validate-config", "--config", config.to_str().unwrap()]);
    assert!(result.is_err());
}

#[test]
fn test_config_path_from_env() {
    let dir = TempDir::new().unwrap();
    let config = write(&dir, "fedeval.toml", SINGLE_CLIENT);

    // Only this test parses without --config, so the variable cannot leak
    // into another test's arguments.
    std::env::set_var(CONFIG_ENV, &config);
    let args = Args::try_parse_from(["fedeval", "validate-config"]);
    std::env::remove_var(CONFIG_ENV);

    let args = args.unwrap();
    match &args.command {
        Commands::ValidateConfig { config: from_env } => assert_eq!(from_env.config, config),
        other => panic!("expected ValidateConfig, got {:?}", other),
    }
    let mut out = Vec::new();
    run(args, &mut out).unwrap();
    assert_eq!(String::from_utf8(out).unwrap().trim(), "Config is OK");
}

#[test]
fn test_replay_prints_history() {
    let dir = TempDir::new().unwrap();
    let config = write(&dir, "fedeval.toml", SINGLE_CLIENT);
    let rounds = write(
        &dir,
        "rounds.json",
        r#"[{"results": [{"num_examples": 10, "metrics": {"acc": 0.25}},
                         {"num_examples": 10, "metrics": {"acc": 0.75}}]},
            {"results": [{"num_examples": 4, "metrics": {"acc": 0.9}}], "failures": 1}]"#,
    );

    let (result, out) = execute(&[
        "fedeval",
        "replay",
        "--config",
        config.to_str().unwrap(),
        "--rounds",
        rounds.to_str().unwrap(),
    ]);
    result.unwrap();

    // Recording holds 2 of the preset's 20 rounds, so replay stops early
    let history: Value = serde_json::from_str(&out).unwrap();
    let recorded = history["rounds"].as_array().unwrap();
    assert_eq!(recorded.len(), 2);
    assert_eq!(recorded[0]["metrics"], json!({"acc": 0.5}));
    assert_eq!(recorded[1]["num_failures"], 1);
    assert_eq!(recorded[1]["metrics"], json!({"acc": 0.9}));
}

#[test]
fn test_replay_too_few_clients() {
    let dir = TempDir::new().unwrap();
    let config = write(&dir, "fedeval.toml", THREE_CLIENTS);
    let rounds = write(
        &dir,
        "rounds.json",
        r#"[{"results": [{"num_examples": 10, "metrics": {"acc": 0.8}}]}]"#,
    );

    let (result, out) = execute(&[
        "fedeval",
        "replay",
        "--config",
        config.to_str().unwrap(),
        "--rounds",
        rounds.to_str().unwrap(),
    ]);
    assert!(matches!(
        result.unwrap_err().downcast_ref::<fedeval::FedEvalError>(),
        Some(fedeval::FedEvalError::InsufficientClients {
            round: 1,
            needed: 3,
            actual: 1
        })
    ));
    assert!(out.is_empty());
}

#[test]
fn test_replay_malformed_rounds_file() {
    let dir = TempDir::new().unwrap();
    let config = write(&dir, "fedeval.toml", SINGLE_CLIENT);
    let rounds = write(&dir, "rounds.json", r#"{"results": []}"#);

    let (result, _) = execute(&[
        "fedeval",
        "replay",
        "--config",
        config.to_str().unwrap(),
        "--rounds",
        rounds.to_str().unwrap(),
    ]);
    assert!(format!("{:#}", result.unwrap_err()).contains("failed to parse rounds file"));
}
