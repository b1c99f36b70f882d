use compareflow::{
    models::AuthResponse,
    router::{guard, Route},
    store::{AuthEvent, ConnectionEvent, Phase, Store, ValidationEvent},
};
use pretty_assertions::assert_eq;
use rstest::rstest;

use crate::test_utils::fixtures;

fn signed_in() -> Store {
    let mut store = Store::new();
    store.reduce(AuthEvent::Login(Phase::Pending).into());
    store.reduce(
        AuthEvent::Login(Phase::Fulfilled(AuthResponse { access_token: fixtures::TOKEN.into(), user: fixtures::user() }))
            .into(),
    );
    store
}

#[test]
fn test_logout_drops_mirrored_data() {
    let mut store = signed_in();
    store.reduce(ConnectionEvent::FetchAll(Phase::Fulfilled(vec![fixtures::connection(1, "warehouse")])).into());
    store.reduce(ValidationEvent::FetchAll(Phase::Fulfilled(vec![fixtures::validation(2, "orders", "pending")])).into());
    assert_eq!(store.connections().all().len(), 1);

    store.reduce(AuthEvent::Logout.into());
    assert!(!store.is_authenticated());
    assert!(store.connections().all().is_empty());
    assert!(store.validations().all().is_empty());
    assert_eq!(guard(Route::Connections, store.is_authenticated()), Route::Login);
}

#[test]
fn test_errors_surface_until_cleared() {
    let mut store = signed_in();
    assert_eq!(store.last_error(), None);

    store.reduce(ValidationEvent::FetchAll(Phase::Rejected(String::new())).into());
    assert_eq!(store.last_error(), Some("Failed to fetch validations"));

    store.reduce(ConnectionEvent::Delete(4, Phase::Rejected("Connection is used by a validation".into())).into());
    assert_eq!(store.last_error(), Some("Connection is used by a validation"));

    store.reduce(ConnectionEvent::ClearError.into());
    assert_eq!(store.last_error(), Some("Failed to fetch validations"));
    store.reduce(ValidationEvent::ClearError.into());
    assert_eq!(store.last_error(), None);
}

#[test]
fn test_run_replaces_row_in_place() {
    let mut store = signed_in();
    store.reduce(
        ValidationEvent::FetchAll(Phase::Fulfilled(vec![
            fixtures::validation(1, "first", "pending"),
            fixtures::validation(2, "second", "pending"),
        ]))
        .into(),
    );

    store.reduce(ValidationEvent::Run(2, Phase::Fulfilled(fixtures::completed_validation(2, "second"))).into());
    let names: Vec<_> = store.validations().all().iter().map(|v| v.name.as_str()).collect();
    assert_eq!(names, vec!["first", "second"]);
    assert_eq!(store.validations().get(2).and_then(|v| v.success_rate()), Some(98.0));
}

#[rstest]
#[case(Route::Dashboard, false, Route::Login)]
#[case(Route::EditValidation(3), false, Route::Login)]
#[case(Route::Register, false, Route::Register)]
#[case(Route::Login, true, Route::Dashboard)]
#[case(Route::NewConnection, true, Route::NewConnection)]
fn test_guard(#[case] requested: Route, #[case] authenticated: bool, #[case] expected: Route) {
    assert_eq!(guard(requested, authenticated), expected);
}
