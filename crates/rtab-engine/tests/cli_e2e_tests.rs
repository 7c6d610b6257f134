//! End-to-end tests for the rtab binary
//!
//! These tests drive the compiled CLI against a mock record store:
//! - fetch: runs a cycle and lists the published tables
//! - show: prints one table as JSON lines
//! - error handling for missing settings and unknown tables

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use std::io::Write;
use wiremock::matchers::{method, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn write_settings(base_url: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    let settings = json!({
        "production": {
            "base_url": base_url,
            "configs": {
                "orders": { "app_no": "12", "apitoken": "tok", "page_size": 100 }
            }
        }
    });
    file.write_all(settings.to_string().as_bytes()).unwrap();
    file
}

async fn mount_orders(mock_server: &MockServer) {
    Mock::given(method("GET"))
        .and(query_param("query", " limit 100 offset 0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "records": [{
                "$id": {"type": "__ID__", "value": "1"},
                "title": {"type": "SINGLE_LINE_TEXT", "value": "first"},
                "items": {"type": "SUBTABLE", "value": [
                    {"id": "10", "value": {"sku": {"type": "SINGLE_LINE_TEXT", "value": "A-1"}}}
                ]}
            }]
        })))
        .mount(mock_server)
        .await;

    Mock::given(method("GET"))
        .and(query_param("query", " limit 100 offset 100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "records": [] })))
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn test_fetch_lists_published_tables() {
    let mock_server = MockServer::start().await;
    mount_orders(&mock_server).await;

    let settings = write_settings(&mock_server.uri());

    let mut cmd = Command::cargo_bin("rtab").unwrap();
    cmd.arg("--config")
        .arg(settings.path())
        .arg("--environment")
        .arg("production")
        .arg("fetch");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("orders_main"))
        .stdout(predicate::str::contains("orders_df_sub_1"));
}

#[tokio::test]
async fn test_show_prints_rows_as_json_lines() {
    let mock_server = MockServer::start().await;
    mount_orders(&mock_server).await;

    let settings = write_settings(&mock_server.uri());

    let mut cmd = Command::cargo_bin("rtab").unwrap();
    cmd.arg("--config")
        .arg(settings.path())
        .arg("show")
        .arg("orders_main");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(r#""title":"first""#));
}

#[tokio::test]
async fn test_show_joined_sub_table() {
    let mock_server = MockServer::start().await;
    mount_orders(&mock_server).await;

    let settings = write_settings(&mock_server.uri());

    let mut cmd = Command::cargo_bin("rtab").unwrap();
    cmd.arg("--config")
        .arg(settings.path())
        .arg("show")
        .arg("orders_df_sub_1");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(r#""sku":"A-1""#))
        .stdout(predicate::str::contains(r#""title":"first""#));
}

#[tokio::test]
async fn test_show_unknown_table_fails_with_available_names() {
    let mock_server = MockServer::start().await;
    mount_orders(&mock_server).await;

    let settings = write_settings(&mock_server.uri());

    let mut cmd = Command::cargo_bin("rtab").unwrap();
    cmd.arg("--config")
        .arg(settings.path())
        .arg("show")
        .arg("nope_main");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("not found"))
        .stderr(predicate::str::contains("orders_main"));
}

#[test]
fn test_missing_settings_file_is_a_config_error() {
    let mut cmd = Command::cargo_bin("rtab").unwrap();
    cmd.arg("--config").arg("/nonexistent/rtab.json").arg("fetch");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"));
}

#[test]
fn test_unknown_environment_is_a_config_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(br#"{"production": {"base_url": "https://x", "configs": {}}}"#)
        .unwrap();

    let mut cmd = Command::cargo_bin("rtab").unwrap();
    cmd.arg("--config")
        .arg(file.path())
        .arg("--environment")
        .arg("qa")
        .arg("fetch");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("'qa' not found"));
}
