//! Whole-application flows: keys in, HTTP against the fake backend, screen out.

use std::{sync::Arc, time::Duration};

use compareflow::{
    action::Action,
    app::App,
    config::Config,
    models::ValidationStatus,
    router::Route,
    tui::Event,
};
use pretty_assertions::assert_eq;
use ratatui::{backend::TestBackend, Terminal};
use serial_test::serial;

use crate::test_utils::{
    assertions::{assert_labelled, RenderAssertions},
    component::buffer_lines,
    fixtures, EventBuilder, FakeBackend, TEST_TERMINAL_HEIGHT, TEST_TERMINAL_WIDTH, TEST_TIMEOUT,
};

fn app(server: &FakeBackend) -> App {
    App::new(Config::new().unwrap(), Arc::new(server.client()), 4.0, 30.0).unwrap()
}

fn press(app: &mut App, events: Vec<Event>) {
    for event in events {
        app.handle_event(event).unwrap();
    }
}

/// Runs the event loop's update half until `done` holds.
async fn pump_until(app: &mut App, what: &str, done: impl Fn(&App) -> bool) {
    let settled = tokio::time::timeout(TEST_TIMEOUT, async {
        while !done(app) {
            let action = app.next_action().await.expect("action channel closed");
            app.update(action).unwrap();
        }
    })
    .await;
    assert!(settled.is_ok(), "timed out waiting for {what} (route {:?})", app.route);
}

/// Applies whatever is still queued, including work spawned by earlier actions.
async fn drain(app: &mut App) {
    while let Ok(Some(action)) = tokio::time::timeout(Duration::from_millis(200), app.next_action()).await {
        app.update(action).unwrap();
    }
}

fn screen(app: &mut App) -> Vec<String> {
    let mut terminal = Terminal::new(TestBackend::new(TEST_TERMINAL_WIDTH, TEST_TERMINAL_HEIGHT)).unwrap();
    terminal.draw(|f| app.draw(f).unwrap()).unwrap();
    buffer_lines(terminal.backend())
}

async fn signed_in(server: &FakeBackend) -> App {
    let mut app = app(server);
    app.update(Action::RestoreSession(fixtures::TOKEN.into())).unwrap();
    pump_until(&mut app, "session restore", |app| {
        app.route == Route::Dashboard && app.store.auth().user().is_some()
    })
    .await;
    drain(&mut app).await;
    app
}

#[tokio::test]
#[serial]
async fn test_login_then_create_connection() {
    let server = FakeBackend::start().await;
    let mut app = app(&server);
    app.update(Action::Navigate(Route::Dashboard)).unwrap();
    assert_eq!(app.route, Route::Login);

    press(&mut app, EventBuilder::new().keys("alice").enter().keys("secret").enter().build());
    pump_until(&mut app, "login", |app| app.route == Route::Dashboard).await;
    drain(&mut app).await;
    screen(&mut app).assert_contains("alice [Ctrl-x] logout");

    press(&mut app, EventBuilder::new().key('2').build());
    pump_until(&mut app, "connections page", |app| app.route == Route::Connections).await;
    press(&mut app, EventBuilder::new().key('n').build());
    pump_until(&mut app, "connection form", |app| app.route == Route::NewConnection).await;

    let events = EventBuilder::new()
        .keys("pg1")
        .tab()
        .tab()
        .keys("db.internal")
        .tab()
        .tab()
        .keys("sales")
        .tab()
        .keys("sa")
        .tab()
        .keys("pw")
        .ctrl('s')
        .build();
    press(&mut app, events);
    pump_until(&mut app, "saved connection in list", |app| {
        app.route == Route::Connections && app.store.connections().all().iter().any(|c| c.name == "pg1")
    })
    .await;

    assert_eq!(server.connection_names(), vec!["pg1".to_string()]);
    let stored = server.stored_connection("pg1").unwrap();
    assert_eq!(stored["type"], "sqlserver");
    assert_eq!(stored["config"]["server"], "db.internal");

    let screen = screen(&mut app);
    screen.assert_contains("pg1");
    assert_labelled(&screen, "pg1", "sqlserver");
}

#[tokio::test]
#[serial]
async fn test_failed_login_stays_on_login() {
    let server = FakeBackend::start().await;
    let mut app = app(&server);
    app.update(Action::Navigate(Route::Login)).unwrap();

    press(&mut app, EventBuilder::new().keys("alice").enter().keys("nope").enter().build());
    pump_until(&mut app, "login rejection", |app| app.store.auth().error().is_some()).await;

    assert_eq!(app.route, Route::Login);
    assert!(!app.store.is_authenticated());
    screen(&mut app).assert_contains("Invalid credentials");
}

#[tokio::test]
#[serial]
async fn test_run_validation_shows_report() {
    let server = FakeBackend::start().await;
    server.seed_connection(fixtures::sqlserver_json(1, "warehouse"));
    server.seed_connection(fixtures::databricks_json(2, "lakehouse"));
    server.seed_validation(fixtures::validation_json(3, "orders parity", "pending"));
    let mut app = signed_in(&server).await;

    press(&mut app, EventBuilder::new().key('3').build());
    pump_until(&mut app, "validation list", |app| {
        app.route == Route::Validations && app.store.validations().all().len() == 1
    })
    .await;
    screen(&mut app).assert_contains("orders parity");

    press(&mut app, EventBuilder::new().key('r').build());
    pump_until(&mut app, "run to finish", |app| {
        app.store
            .validations()
            .current()
            .is_some_and(|v| v.id == 3 && v.status == ValidationStatus::Completed)
    })
    .await;
    drain(&mut app).await;
    assert_eq!(server.hits("POST", "/validations/3/run"), 1);

    let report = screen(&mut app);
    report.assert_contains("Validation Execution Report: orders parity");
    report.assert_not_contains("Running validation...");
    assert_labelled(&report, "Source Rows", "100");
    assert_labelled(&report, "Target Rows", "98");
    assert_labelled(&report, "Matched Rows", "98");
    assert_labelled(&report, "Success Rate", "98%");

    press(&mut app, EventBuilder::new().esc().key('s').build());
    drain(&mut app).await;
    assert_eq!(server.hits("GET", "/validations/3/status"), 1);
    screen(&mut app).assert_not_contains("Validation Execution Report");
}

#[tokio::test]
#[serial]
async fn test_delete_requires_confirmation() {
    let server = FakeBackend::start().await;
    server.seed_connection(fixtures::sqlserver_json(1, "warehouse"));
    server.seed_connection(fixtures::sqlserver_json(2, "reporting"));
    let mut app = signed_in(&server).await;

    app.update(Action::Navigate(Route::Connections)).unwrap();
    pump_until(&mut app, "connection list", |app| app.store.connections().all().len() == 2).await;

    press(&mut app, EventBuilder::new().key('d').key('n').build());
    drain(&mut app).await;
    assert_eq!(server.hits("DELETE", "/connections/1"), 0);
    assert_eq!(app.store.connections().all().len(), 2);

    press(&mut app, EventBuilder::new().key('d').key('y').build());
    pump_until(&mut app, "delete", |app| app.store.connections().all().len() == 1).await;
    assert_eq!(server.hits("DELETE", "/connections/1"), 1);
    assert_eq!(server.connection_names(), vec!["reporting".to_string()]);
}

#[tokio::test]
#[serial]
async fn test_logout_returns_to_login_and_forgets_data() {
    let server = FakeBackend::start().await;
    server.seed_connection(fixtures::sqlserver_json(1, "warehouse"));
    let mut app = signed_in(&server).await;
    assert_eq!(app.store.connections().all().len(), 1);

    press(&mut app, EventBuilder::new().ctrl('x').build());
    pump_until(&mut app, "logout", |app| app.route == Route::Login).await;
    drain(&mut app).await;

    assert!(!app.store.is_authenticated());
    assert!(app.store.connections().all().is_empty());

    app.update(Action::Navigate(Route::Connections)).unwrap();
    assert_eq!(app.route, Route::Login);
}

#[tokio::test]
#[serial]
async fn test_bad_stored_token_falls_back_to_login() {
    let server = FakeBackend::start().await;
    let mut app = app(&server);

    app.update(Action::RestoreSession("expired".into())).unwrap();
    pump_until(&mut app, "session check", |app| !app.store.is_authenticated()).await;
    drain(&mut app).await;

    assert!(!app.store.is_authenticated());
    assert_eq!(app.route, Route::Login);
    assert_eq!(server.hits("GET", "/auth/me"), 1);
}
