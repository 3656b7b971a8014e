//! Configuration loading and HTTP endpoint integration tests.
//!
//! Covers:
//! - Config loading from JSON (`PAIR_SIGNAL_CONFIG_JSON`) and files (`PAIR_SIGNAL_CONFIG_PATH`)
//! - Environment variable overrides (`PAIR_SIGNAL__*`, `PORT`)
//! - Health, info and metrics endpoints


use pair_signal_server::config::{self, Config};
use pair_signal_server::server::ServerConfig;
use pair_signal_server::websocket::create_router;
use std::env;
use std::io::Write;
use test_helpers::{connect, create_test_server, create_test_server_with_config, test_server_config};

const CONFIG_ENV_VARS: &[&str] = &[
    "PAIR_SIGNAL_CONFIG_JSON",
    "PAIR_SIGNAL_CONFIG_PATH",
    "PAIR_SIGNAL_CONFIG_STDIN",
    "PAIR_SIGNAL__PORT",
    "PAIR_SIGNAL__SERVER__WAITING_TIMEOUT_SECS",
    "PAIR_SIGNAL__SERVER__MATCH_GREETING",
    "PAIR_SIGNAL__SECURITY__MAX_CONNECTIONS_PER_IP",
    "PORT",
];

fn clear_config_env() {
    for key in CONFIG_ENV_VARS {
        env::remove_var(key);
    }
}

// ===========================================================================
// Config loading tests
// ===========================================================================

#[test]
fn test_config_from_json_string() {
    let json = r#"{
        "port": 9999,
        "server": {
            "strict_signal_routing": true,
            "waiting_timeout_secs": 0
        },
        "security": {
            "cors_origins": "https://chat.example"
        }
    }"#;

    let config: Config = serde_json::from_str(json).expect("parse should succeed");

    assert_eq!(config.port, 9999);
    assert!(config.server.strict_signal_routing);
    assert_eq!(config.security.cors_origins, "https://chat.example");
    // Non-specified fields should remain at defaults
    assert_eq!(config.server.reaper_interval_secs, 10);
    assert_eq!(config.websocket.send_queue_capacity, 64);

    let runtime = ServerConfig::from(&config);
    assert!(runtime.strict_signal_routing);
    assert_eq!(runtime.waiting_timeout, None);
}

#[test]
#[serial_test::serial]
fn test_inline_json_env_is_loaded() {
    clear_config_env();
    env::set_var(
        "PAIR_SIGNAL_CONFIG_JSON",
        r#"{"port": 5050, "server": {"server_name": "inline"}}"#,
    );

    let config = config::load();

    assert_eq!(config.port, 5050);
    assert_eq!(config.server.server_name, "inline");
    clear_config_env();
}

#[test]
#[serial_test::serial]
fn test_config_file_with_env_overrides() {
    use tempfile::tempdir;

    clear_config_env();
    let dir = tempdir().unwrap();
    let config_file = dir.path().join("pair_signal.json");
    let mut file = std::fs::File::create(&config_file).unwrap();
    file.write_all(br#"{"port": 7777, "server": {"waiting_timeout_secs": 45}}"#)
        .unwrap();

    env::set_var("PAIR_SIGNAL_CONFIG_PATH", config_file.to_str().unwrap());
    env::set_var("PAIR_SIGNAL__SERVER__WAITING_TIMEOUT_SECS", "90");
    env::set_var("PAIR_SIGNAL__SERVER__MATCH_GREETING", "Hi, stranger");

    let config = config::load();

    // File value should be used for port
    assert_eq!(config.port, 7777);
    // Environment override should take precedence over the file
    assert_eq!(config.server.waiting_timeout_secs, 90);
    assert_eq!(config.server.match_greeting.as_deref(), Some("Hi, stranger"));
    // Other values should be defaults
    assert_eq!(config.server.reaper_interval_secs, 10);

    clear_config_env();
}

#[test]
#[serial_test::serial]
fn test_inline_json_wins_over_file() {
    use tempfile::tempdir;

    clear_config_env();
    let dir = tempdir().unwrap();
    let config_file = dir.path().join("config.json");
    std::fs::write(&config_file, r#"{"port": 1111}"#).unwrap();

    env::set_var("PAIR_SIGNAL_CONFIG_PATH", config_file.to_str().unwrap());
    env::set_var("PAIR_SIGNAL_CONFIG_JSON", r#"{"port": 2222}"#);

    assert_eq!(config::load().port, 2222);
    clear_config_env();
}

#[test]
#[serial_test::serial]
fn test_plain_port_variable_wins() {
    clear_config_env();
    env::set_var("PAIR_SIGNAL__PORT", "6000");
    env::set_var("PORT", "6001");

    assert_eq!(config::load().port, 6001);

    env::set_var("PORT", "not-a-port");
    assert_eq!(config::load().port, 6000, "invalid PORT is ignored");
    clear_config_env();
}

#[test]
#[serial_test::serial]
fn test_fallback_to_defaults_on_invalid_config() {
    clear_config_env();
    env::set_var("PAIR_SIGNAL_CONFIG_JSON", "{invalid json content}");

    let config = config::load();

    assert_eq!(config.port, 4000);
    assert_eq!(config.server.max_chat_message_length, 2000);
    clear_config_env();
}

#[test]
#[serial_test::serial]
fn test_type_mismatch_falls_back_to_defaults() {
    clear_config_env();
    env::set_var(
        "PAIR_SIGNAL__SECURITY__MAX_CONNECTIONS_PER_IP",
        "plenty",
    );

    let config = config::load();

    assert_eq!(config.security.max_connections_per_ip, 10);
    clear_config_env();
}

// ===========================================================================
// Health and info endpoint tests
// ===========================================================================

#[tokio::test]
async fn test_health_endpoint_returns_counts() {
    let server = create_test_server();
    let (a, _inbox_a) = connect(&server);
    let (b, _inbox_b) = connect(&server);
    let (c, _inbox_c) = connect(&server);
    server.handle_ready(&a);
    server.handle_ready(&b);
    server.handle_ready(&c);

    let app = create_router("*").with_state(server);
    let test_server = axum_test::TestServer::new(app).expect("test server should start");
    let response = test_server.get("/health").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["connections"], 3);
    assert_eq!(body["waiting"], 1);
    assert_eq!(body["sessions"], 1);
    let timestamp = body["timestamp"].as_str().expect("timestamp string");
    assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
}

#[tokio::test]
async fn test_info_endpoint_reports_running() {
    let server = create_test_server_with_config(ServerConfig {
        server_name: "Test Pairing".to_string(),
        ..test_server_config()
    });
    let app = create_router("*").with_state(server);

    let test_server = axum_test::TestServer::new(app).expect("test server should start");
    let response = test_server.get("/").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["name"], "Test Pairing");
    assert_eq!(body["status"], "running");
    assert_eq!(body["connections"], 0);
    assert_eq!(body["waiting"], 0);
    assert_eq!(body["sessions"], 0);
}

// ===========================================================================
// Metrics endpoint tests
// ===========================================================================

#[tokio::test]
async fn test_metrics_endpoint_reports_counters() {
    let server = create_test_server();
    let (a, _inbox_a) = connect(&server);
    let (b, _inbox_b) = connect(&server);
    server.handle_ready(&a);
    server.handle_ready(&b);

    let app = create_router("*").with_state(server);
    let test_server = axum_test::TestServer::new(app).expect("test server should start");
    let response = test_server.get("/metrics").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["matching"]["ready_requests"], 2);
    assert_eq!(body["matching"]["matches_made"], 1);
    assert_eq!(body["connections"]["active_connections"], 2);
    assert_eq!(body["pairing"]["sessions"], 1);
}

// ===========================================================================
// Router structure tests
// ===========================================================================

#[tokio::test]
async fn test_websocket_route_exists() {
    let server = create_test_server();
    let app = create_router("*").with_state(server);

    let test_server = axum_test::TestServer::new(app).expect("test server should start");

    // GET /ws without WebSocket upgrade should not return 404
    let response = test_server.get("/ws").await;
    let status = response.status_code();
    assert_ne!(
        status,
        axum::http::StatusCode::NOT_FOUND,
        "/ws route should exist"
    );
}

#[tokio::test]
async fn test_unknown_route_returns_404() {
    let server = create_test_server();
    let app = create_router("*").with_state(server);

    let test_server = axum_test::TestServer::new(app).expect("test server should start");
    let response = test_server.get("/nonexistent").await;
    response.assert_status(axum::http::StatusCode::NOT_FOUND);
}

// ===========================================================================
// CORS configuration tests
// ===========================================================================

#[tokio::test]
async fn test_permissive_cors_with_wildcard() {
    let server = create_test_server();
    let app = create_router("*").with_state(server);

    let test_server = axum_test::TestServer::new(app).expect("test server should start");
    let response = test_server
        .get("/health")
        .add_header("origin", "https://anywhere.example")
        .await;
    response.assert_status_ok();
    assert!(response
        .headers()
        .contains_key("access-control-allow-origin"));
}

#[tokio::test]
async fn test_specific_cors_origins() {
    let server = create_test_server();
    let app = create_router("http://localhost:3000,http://example.com").with_state(server);

    let test_server = axum_test::TestServer::new(app).expect("test server should start");
    let response = test_server
        .get("/health")
        .add_header("origin", "http://example.com")
        .await;
    response.assert_status_ok();
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "http://example.com"
    );
}
