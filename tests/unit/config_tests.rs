// Configuration module unit tests

use memebot::config::*;
use memebot::meme::MemeStyle;
use std::io::Write;

const FULL_CONFIG: &str = r#"
server:
  address: "127.0.0.1"
  port: 8080
  max_body_size: 65536
messenger:
  app_secret: "app-secret"
  validation_token: "verify-me"
  page_access_token: "page-token"
  require_signature: false
cloudinary:
  cloud_name: "demo"
  api_key: "123"
  api_secret: "cloud-secret"
  upload_tag: "uploads"
  stock_prefix: "library/"
session:
  backend: memory
  key_prefix: "bot"
  ttl_seconds: 86400
meme:
  output_width: 600
  watermark_text: "MYBOT"
logging:
  level: "debug"
  json: true
"#;

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(contents.as_bytes())
        .expect("Failed to write config");
    file
}

#[test]
fn test_from_file_reads_every_section() {
    let file = write_config(FULL_CONFIG);
    let config = Config::from_file(file.path()).expect("Failed to load config");

    assert_eq!(config.server.listen_addr(), "127.0.0.1:8080");
    assert_eq!(config.server.max_body_size, 65536);
    assert!(!config.messenger.require_signature);
    assert_eq!(config.cloudinary.upload_tag, "uploads");
    assert_eq!(config.cloudinary.stock_prefix, "library/");
    assert_eq!(config.session.backend, SessionBackend::Memory);
    assert_eq!(config.session.ttl_seconds, Some(86400));
    assert_eq!(config.meme.output_width, 600);
    assert_eq!(config.meme.watermark_text, "MYBOT");
    assert_eq!(config.meme.text_padding, MemeStyle::default().text_padding);
    assert_eq!(config.logging.level, "debug");
    assert!(config.logging.json);
    assert!(config.validate().is_ok());
}

#[test]
fn test_from_file_missing_file() {
    let err = Config::from_file("/nonexistent/memebot.yaml").unwrap_err();
    assert!(err.contains("Failed to read config file"));
}

#[test]
fn test_missing_required_section_fails_to_parse() {
    let file = write_config("server:\n  port: 8080\n");
    assert!(Config::from_file(file.path()).is_err());
}

#[test]
fn test_validate_rejects_zero_port() {
    let yaml = FULL_CONFIG.replace("port: 8080", "port: 0");
    let config = Config::from_yaml_with_env(&yaml).unwrap();
    assert!(config.validate().unwrap_err().contains("server.port"));
}

#[test]
fn test_validate_rejects_bad_graph_url() {
    let yaml = FULL_CONFIG.replace(
        "  require_signature: false\n",
        "  require_signature: false\n  graph_api_url: \"graph.facebook.com\"\n",
    );
    let config = Config::from_yaml_with_env(&yaml).unwrap();
    assert!(config.validate().unwrap_err().contains("graph_api_url"));
}

#[test]
fn test_validate_rejects_cloud_name_with_slash() {
    let yaml = FULL_CONFIG.replace("cloud_name: \"demo\"", "cloud_name: \"de/mo\"");
    let config = Config::from_yaml_with_env(&yaml).unwrap();
    assert!(config.validate().unwrap_err().contains("cloud_name"));
}

#[test]
fn test_validate_rejects_non_redis_url() {
    let yaml = FULL_CONFIG.replace(
        "  backend: memory\n",
        "  backend: redis\n  redis_url: \"http://localhost:6379\"\n",
    );
    let config = Config::from_yaml_with_env(&yaml).unwrap();
    assert!(config.validate().unwrap_err().contains("redis://"));
}

#[test]
fn test_validate_rejects_zero_ttl() {
    let yaml = FULL_CONFIG.replace("ttl_seconds: 86400", "ttl_seconds: 0");
    let config = Config::from_yaml_with_env(&yaml).unwrap();
    assert!(config.validate().unwrap_err().contains("ttl_seconds"));
}

#[test]
fn test_validate_rejects_padding_wider_than_image() {
    let yaml = FULL_CONFIG.replace("output_width: 600", "output_width: 20");
    let config = Config::from_yaml_with_env(&yaml).unwrap();
    assert!(config.validate().unwrap_err().contains("text_padding"));
}

#[test]
fn test_env_substitution_in_file() {
    std::env::set_var("MEMEBOT_UNIT_PAGE_TOKEN", "token-from-env");
    let yaml = FULL_CONFIG.replace("\"page-token\"", "\"${MEMEBOT_UNIT_PAGE_TOKEN}\"");
    let file = write_config(&yaml);
    let config = Config::from_file(file.path()).unwrap();
    assert_eq!(config.messenger.page_access_token, "token-from-env");
}
