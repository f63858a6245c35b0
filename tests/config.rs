use clap::Parser;
use codebeast_server::cli::Cli;
use codebeast_server::config::AppConfig;
use codebeast_server::error::CodeBeastError;
use std::path::PathBuf;

const REQUIRED: [&str; 7] = [
    "codebeast-server",
    "--langflow-base-url",
    "https://langflow.example.com/",
    "--langflow-flow-id",
    "flow-123",
    "--openai-api-key",
    "sk-test",
];

#[test]
fn test_cli_defaults() {
    let cli = Cli::try_parse_from(REQUIRED).unwrap();
    let config = AppConfig::try_from(cli).unwrap();

    assert_eq!(config.langflow.flow_id, "flow-123");
    assert_eq!(config.langflow.api_key, None);
    assert_eq!(config.openai_base_url.as_str(), "https://api.openai.com/v1");
    assert_eq!(config.temp_dir(), PathBuf::from("static").join("temp"));
}

#[test]
fn test_cli_optional_values() {
    let mut args = REQUIRED.to_vec();
    args.extend([
        "--stability-api-key",
        "st-key",
        "--langflow-api-key",
        "",
        "--port",
        "8080",
        "--static-dir",
        "/srv/www",
    ]);
    let config = AppConfig::try_from(Cli::try_parse_from(args).unwrap()).unwrap();

    assert_eq!(config.stability_api_key.as_deref(), Some("st-key"));
    // Empty values count as unset
    assert_eq!(config.langflow.api_key, None);
    assert_eq!(config.port, 8080);
    assert_eq!(config.temp_dir(), PathBuf::from("/srv/www/temp"));
}

#[test]
fn test_missing_required_arguments() {
    let result = Cli::try_parse_from(["codebeast-server", "--langflow-flow-id", "flow-123"]);
    assert!(result.is_err());
}

#[test]
fn test_invalid_base_url() {
    let mut args = REQUIRED.to_vec();
    args[2] = "not a url";
    assert!(Cli::try_parse_from(args).is_err());
}

#[test]
fn test_empty_openai_key_is_rejected() {
    let mut args = REQUIRED.to_vec();
    args[6] = " ";
    let cli = Cli::try_parse_from(args).unwrap();
    assert!(matches!(AppConfig::try_from(cli), Err(CodeBeastError::Config(_))));
}
