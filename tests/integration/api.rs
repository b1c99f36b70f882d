use compareflow::{
    api::{ApiError, AuthService, ConnectionService, ValidationService},
    models::{
        ConnectionDraft, ConnectionKind, ConnectionSettings, Credentials, Registration, SqlServerConfig,
        ValidationConfig, ValidationDraft, ValidationStatus,
    },
};
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::test_utils::{fixtures, FakeBackend};

fn credentials(password: &str) -> Credentials {
    Credentials { username: "alice".into(), password: password.into() }
}

#[tokio::test]
async fn test_login_attaches_bearer_token_to_later_requests() {
    let server = FakeBackend::start().await;
    server.seed_connection(fixtures::sqlserver_json(1, "warehouse"));
    let client = server.client();

    let response = client.login(&credentials("secret")).await.unwrap();
    assert_eq!(response.user.username, "alice");
    assert_eq!(client.token().await.as_deref(), Some(fixtures::TOKEN));

    let connections = client.list_connections().await.unwrap();
    assert_eq!(connections.len(), 1);

    let requests = server.requests();
    assert_eq!(requests[0].path, "/auth/login");
    assert_eq!(requests[0].authorization, None);
    assert_eq!(requests[1].authorization.as_deref(), Some("Bearer test-token"));
}

#[tokio::test]
async fn test_error_body_becomes_status_error() {
    let server = FakeBackend::start().await;
    let client = server.client();

    let err = client.login(&credentials("wrong")).await.unwrap_err();
    assert_eq!(err, ApiError::Status { status: 401, message: "Invalid credentials".into() });
    assert_eq!(err.to_string(), "Invalid credentials");
    assert!(client.token().await.is_none());
}

#[tokio::test]
async fn test_register_failure_keeps_backend_message() {
    let server = FakeBackend::start().await;
    let client = server.client();

    let registration = Registration { username: "taken".into(), email: "t@example.com".into(), password: "pw".into() };
    let err = client.register(&registration).await.unwrap_err();
    assert_eq!(err.to_string(), "Username already exists");

    let registration = Registration { username: "bob".into(), email: "bob@example.com".into(), password: "pw".into() };
    let response = client.register(&registration).await.unwrap();
    assert_eq!(response.user.username, "bob");
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let server = FakeBackend::start().await;
    let client = server.client();

    let err = client.list_validations().await.unwrap_err();
    assert!(err.is_unauthorized());

    client.set_token(Some(fixtures::TOKEN.into())).await;
    assert_eq!(client.current_user().await.unwrap(), fixtures::user());

    client.set_token(None).await;
    assert!(client.current_user().await.unwrap_err().is_unauthorized());
}

#[tokio::test]
async fn test_not_found_is_reported() {
    let server = FakeBackend::start().await;
    let client = server.client();
    client.set_token(Some(fixtures::TOKEN.into())).await;

    let err = client.get_connection(99).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "Connection not found");
}

#[tokio::test]
async fn test_connection_crud_round_trip() {
    let server = FakeBackend::start().await;
    let client = server.client();
    client.set_token(Some(fixtures::TOKEN.into())).await;

    let draft = ConnectionDraft {
        name: "pg1".into(),
        settings: ConnectionSettings::SqlServer(SqlServerConfig {
            server: "db.internal".into(),
            database: "sales".into(),
            username: "sa".into(),
            password: "pw".into(),
            ..SqlServerConfig::default()
        }),
    };
    let created = client.create_connection(&draft).await.unwrap();
    assert_eq!(created.kind(), Some(ConnectionKind::SqlServer));
    assert_eq!(created.name, "pg1");

    let stored = server.stored_connection("pg1").unwrap();
    assert_eq!(stored["type"], "sqlserver");
    assert_eq!(stored["config"]["port"], 1433);

    let renamed = ConnectionDraft { name: "pg2".into(), ..draft };
    let updated = client.update_connection(created.id, &renamed).await.unwrap();
    assert_eq!(updated.name, "pg2");
    assert_eq!(client.get_connection(created.id).await.unwrap().name, "pg2");

    client.delete_connection(created.id).await.unwrap();
    assert!(client.list_connections().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_failed_connection_test_is_a_result() {
    let server = FakeBackend::start().await;
    server.seed_connection(fixtures::sqlserver_json(1, "warehouse"));
    let client = server.client();
    client.set_token(Some(fixtures::TOKEN.into())).await;

    let passed = client.test_connection(1).await.unwrap();
    assert!(passed.success);

    server.fail_connection_tests();
    let failed = client.test_connection(1).await.unwrap();
    assert!(!failed.success);
    assert_eq!(failed.message, "Login failed for user 'sa'");

    // A 404 is still an error, only 400 carries a test result.
    assert!(client.test_connection(5).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_table_names_are_percent_encoded() {
    let server = FakeBackend::start().await;
    server.seed_connection(fixtures::sqlserver_json(1, "warehouse"));
    server.set_tables(&["dbo.orders", "dbo.order lines"]);
    let client = server.client();
    client.set_token(Some(fixtures::TOKEN.into())).await;

    let tables = client.list_tables(1).await.unwrap();
    assert_eq!(tables, vec!["dbo.orders".to_string(), "dbo.order lines".to_string()]);

    let columns = client.list_columns(1, "dbo.order lines").await.unwrap();
    assert_eq!(columns[0].name, "dbo.order lines_id");
    assert!(!columns[0].nullable);
    assert_eq!(server.hits("GET", "/connections/1/tables/dbo.order%20lines/columns"), 1);
}

#[tokio::test]
async fn test_empty_schema_lists_decode_as_empty() {
    let server = FakeBackend::start().await;
    server.seed_connection(fixtures::sqlserver_json(1, "warehouse"));
    server.serve_null_schema();
    let client = server.client();
    client.set_token(Some(fixtures::TOKEN.into())).await;

    assert_eq!(client.list_tables(1).await.unwrap(), Vec::<String>::new());
    assert!(client.list_columns(1, "dbo.orders").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_other_connection_types_are_listed() {
    let server = FakeBackend::start().await;
    server.seed_connection(fixtures::sqlserver_json(1, "warehouse"));
    server.seed_connection(json!({
        "id": 2,
        "name": "app-db",
        "type": "postgresql",
        "config": { "host": "pg.local", "port": 5432, "database": "app", "ssl_mode": "prefer" }
    }));
    let client = server.client();
    client.set_token(Some(fixtures::TOKEN.into())).await;

    let connections = client.list_connections().await.unwrap();
    assert_eq!(connections.len(), 2);
    assert_eq!(connections[1].settings.type_name(), "postgresql");
    assert_eq!(connections[1].settings.endpoint(), "pg.local");
}

#[tokio::test]
async fn test_validation_run_returns_results() {
    let server = FakeBackend::start().await;
    let client = server.client();
    client.set_token(Some(fixtures::TOKEN.into())).await;

    let config = ValidationConfig {
        source_query: "select 1".into(),
        target_query: "select 1".into(),
        comparison_type: None,
        key_columns: vec!["id".into()],
    };
    let created = client.create_validation(&ValidationDraft::new("orders", 1, 2, config)).await.unwrap();
    assert_eq!(created.status, ValidationStatus::Pending);

    let ran = client.run_validation(created.id).await.unwrap();
    assert_eq!(ran.status, ValidationStatus::Completed);
    let summary = ran.summary();
    assert_eq!(summary.source_row_count, Some(100));
    assert_eq!(summary.matched_rows, Some(98));
    assert_eq!(ran.success_rate(), Some(98.0));

    let status = client.validation_status(created.id).await.unwrap();
    assert_eq!(status.status, ValidationStatus::Completed);

    client.delete_validation(created.id).await.unwrap();
    assert!(client.get_validation(created.id).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_unreachable_backend_is_transport_error() {
    let server = FakeBackend::start().await;
    let client = server.client();
    drop(server);
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    let err = client.login(&credentials("secret")).await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)), "unexpected error: {err:?}");
}
