//! Shared integration-test server bootstrap helpers.

use axum_test::TestServer;
use clipdrop_server::{create_app, AppState, Config, Database};
use std::path::Path;
use tempfile::TempDir;

pub(crate) fn test_config_for_db_path(db_path: &Path, cron_secret: Option<&str>) -> Config {
    Config {
        port: 0,
        db_path: db_path.to_str().expect("db path").to_string(),
        cron_secret: cron_secret.map(str::to_string),
        sweep_interval_secs: 0,
        storage_timeout_ms: 5_000,
    }
}

pub(crate) fn test_server_for_config(config: Config) -> TestServer {
    let db = Database::new(config.db_path.as_str()).expect("open db");
    let state = AppState::new(config, db);
    let app = create_app(state, false);
    TestServer::new(app).expect("server")
}

pub(crate) fn setup_test_server() -> (TestServer, TempDir) {
    setup_test_server_with_secret(None)
}

pub(crate) fn setup_test_server_with_secret(cron_secret: Option<&str>) -> (TestServer, TempDir) {
    let temp_dir = TempDir::new().expect("temp dir");
    let db_path = temp_dir.path().join("db");
    let config = test_config_for_db_path(&db_path, cron_secret);
    let server = test_server_for_config(config);
    (server, temp_dir)
}
