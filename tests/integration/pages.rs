use compareflow::{
    action::Action,
    components::{
        connection_form::ConnectionForm, connections::Connections, validation_form::ValidationForm,
        validations::Validations, Component,
    },
    models::{ConnectionKind, ConnectionSettings},
    router::Route,
    store::{ConnectionEvent, Phase, ValidationEvent},
};
use pretty_assertions::assert_eq;

use crate::test_utils::{assertions::RenderAssertions, fixtures, ComponentTestHarness, EventBuilder};

fn connections_page() -> ComponentTestHarness<Connections> {
    let mut harness = ComponentTestHarness::new(Connections::new()).unwrap();
    harness
        .settle(ConnectionEvent::FetchAll(Phase::Fulfilled(vec![
            fixtures::connection(1, "warehouse"),
            fixtures::connection(2, "reporting"),
        ])))
        .unwrap();
    harness
}

#[test]
fn test_cancelled_delete_sends_no_request() {
    let mut harness = connections_page();

    let actions = harness.send_events(EventBuilder::new().key('d').build()).unwrap();
    assert!(actions.is_empty());
    assert!(harness.component.captures_keys());
    harness.render().unwrap().assert_contains("Delete Connection");

    let actions = harness.send_events(EventBuilder::new().key('n').build()).unwrap();
    assert!(actions.is_empty());
    assert!(harness.sent_actions().is_empty());
    assert!(!harness.component.captures_keys());
    harness.render().unwrap().assert_not_contains("Delete Connection");
}

#[test]
fn test_confirmed_delete_targets_selected_row() {
    let mut harness = connections_page();

    let actions = harness.send_events(EventBuilder::new().down().key('d').key('y').build()).unwrap();
    assert_eq!(actions, vec![Action::DeleteConnection(2)]);
}

#[test]
fn test_new_sql_server_connection_submits_draft() {
    let mut harness = ComponentTestHarness::new(ConnectionForm::new()).unwrap();
    harness.update(Action::Navigate(Route::NewConnection)).unwrap();

    let events = EventBuilder::new()
        .keys("pg1")
        .tab() // type stays SQL Server
        .tab()
        .keys("db.internal")
        .tab() // port keeps its default
        .tab()
        .keys("sales")
        .tab()
        .keys("sa")
        .tab()
        .keys("pw")
        .ctrl('s')
        .build();
    let actions = harness.send_events(events).unwrap();

    let [Action::SaveConnection(None, draft)] = actions.as_slice() else {
        panic!("expected a create request, got {actions:?}");
    };
    assert_eq!(draft.name, "pg1");
    assert_eq!(draft.settings.kind(), Some(ConnectionKind::SqlServer));
    let ConnectionSettings::SqlServer(config) = &draft.settings else { unreachable!() };
    assert_eq!(config.server, "db.internal");
    assert_eq!(config.port, 1433);
    assert_eq!(config.password, "pw");

    harness.render().unwrap().assert_contains("Saving...");

    let created = fixtures::connection(7, "pg1");
    harness.settle(ConnectionEvent::Create(Phase::Pending)).unwrap();
    let next = harness.settle(ConnectionEvent::Create(Phase::Fulfilled(created))).unwrap();
    assert_eq!(next, Some(Action::Navigate(Route::Connections)));
}

#[test]
fn test_connection_form_reports_missing_fields_inline() {
    let mut harness = ComponentTestHarness::new(ConnectionForm::new()).unwrap();
    harness.update(Action::Navigate(Route::NewConnection)).unwrap();

    let actions = harness.send_events(EventBuilder::new().keys("pg1").ctrl('s').build()).unwrap();
    assert!(actions.is_empty());
    harness.render().unwrap().assert_contains("required");
}

#[test]
fn test_rejected_save_shows_backend_message() {
    let mut harness = ComponentTestHarness::new(ConnectionForm::new()).unwrap();
    harness.update(Action::Navigate(Route::NewConnection)).unwrap();

    let events = EventBuilder::new()
        .keys("lake")
        .tab()
        .right() // switch to Databricks
        .tab()
        .keys("https://adb-1.azuredatabricks.net")
        .tab()
        .keys("/sql/1.0/warehouses/abc")
        .tab()
        .keys("dapi")
        .ctrl('s')
        .build();
    let actions = harness.send_events(events).unwrap();
    let [Action::SaveConnection(None, draft)] = actions.as_slice() else {
        panic!("expected a create request, got {actions:?}");
    };
    assert_eq!(draft.settings.kind(), Some(ConnectionKind::Databricks));

    harness.settle(ConnectionEvent::Create(Phase::Rejected("Name already in use".into()))).unwrap();
    harness.render().unwrap().assert_contains("Name already in use");
}

#[test]
fn test_validation_form_builds_draft_from_loaded_connections() {
    let mut harness = ComponentTestHarness::new(ValidationForm::new()).unwrap();
    harness.update(Action::Navigate(Route::NewValidation)).unwrap();
    assert_eq!(harness.sent_actions(), vec![Action::FetchConnections]);

    harness
        .settle(ConnectionEvent::FetchAll(Phase::Fulfilled(vec![
            fixtures::connection(1, "warehouse"),
            fixtures::connection(2, "reporting"),
        ])))
        .unwrap();
    harness.render().unwrap().assert_contains("warehouse (SQL Server)");

    let events = EventBuilder::new()
        .keys("orders parity")
        .tab()
        .tab()
        .right() // target moves to the second connection
        .tab()
        .tab()
        .keys("select * from orders")
        .tab()
        .keys("select * from orders_copy")
        .tab()
        .keys("id, region")
        .enter()
        .build();
    let actions = harness.send_events(events).unwrap();

    let [Action::SaveValidation(None, draft)] = actions.as_slice() else {
        panic!("expected a create request, got {actions:?}");
    };
    assert_eq!(draft.name, "orders parity");
    assert_eq!((draft.source_connection_id, draft.target_connection_id), (1, 2));
    assert_eq!(draft.config.key_columns, vec!["id".to_string(), "region".to_string()]);
    assert_eq!(draft.config.target_query, "select * from orders_copy");
}

#[test]
fn test_validation_form_requires_connections() {
    let mut harness = ComponentTestHarness::new(ValidationForm::new()).unwrap();
    harness.update(Action::Navigate(Route::NewValidation)).unwrap();

    let events = EventBuilder::new()
        .keys("orders")
        .tab()
        .tab()
        .tab()
        .tab()
        .keys("select 1")
        .tab()
        .keys("select 1")
        .ctrl('s')
        .build();
    assert!(harness.send_events(events).unwrap().is_empty());
    harness.render().unwrap().assert_contains("Source and target connections required");
}

#[test]
fn test_report_opens_for_completed_validation() {
    let mut harness = ComponentTestHarness::new(Validations::new()).unwrap();
    harness
        .settle(ValidationEvent::FetchAll(Phase::Fulfilled(vec![fixtures::completed_validation(3, "orders")])))
        .unwrap();

    harness.send_events(EventBuilder::new().key('v').build()).unwrap();
    assert_eq!(harness.sent_actions(), vec![Action::FetchValidation(3)]);

    let screen = harness.render().unwrap();
    screen.assert_contains("Summary Statistics");
    screen.assert_contains("98%");

    harness.send_events(EventBuilder::new().esc().build()).unwrap();
    harness.render().unwrap().assert_not_contains("Summary Statistics");
}
