use config::Role;
use guard::Decision;
use integration_tests::{NOW, TestApp, TestClaims, unsigned_token};
use session::{FileStorage, Principal, SessionStorage};

use crate::CONFIG;

#[test]
fn trainer_on_admin_route_goes_to_trainer_home() {
    let app = TestApp::start(CONFIG);
    app.login_as(&[Role::Trainer]);

    let decision = app.check("/admin/users");

    assert_eq!(decision, Decision::RedirectToRoleHome("/trainer/dashboard".to_string()));
    assert!(app.store.load().is_some());
}

#[test]
fn no_session_on_client_route_goes_to_login() {
    let app = TestApp::start(CONFIG);

    insta::assert_snapshot!(app.check("/client/meals"), @"redirect to login at /");
}

#[test]
fn credential_expired_ten_seconds_ago_goes_to_login() {
    let app = TestApp::start(CONFIG);

    let token = unsigned_token(&TestClaims::new(&[Role::Client], NOW - 10));
    assert!(!app.guard.validator().is_valid(&token));

    app.store
        .save(&Principal::new(token, [Role::Client], "12345678Z"))
        .unwrap();

    assert_eq!(app.check("/client"), Decision::RedirectToLogin("/".to_string()));
    assert_eq!(app.store.load(), None);
    assert!(!app.session_path().exists());
}

#[test]
fn admin_trainer_on_trainer_route_is_allowed() {
    let app = TestApp::start(CONFIG);
    app.login_as(&[Role::Admin, Role::Trainer]);

    assert_eq!(app.check("/trainer/plans/7"), Decision::Allow);
}

#[test]
fn unparsable_principal_is_purged() {
    let app = TestApp::start(CONFIG);
    app.login_as(&[Role::Client]);

    let storage = FileStorage::new(app.session_path());
    storage.set("principal", "{\"credential\": ").unwrap();

    assert_eq!(app.store.load(), None);
    assert_eq!(storage.get("principal").unwrap(), None);
    assert_eq!(storage.get("credential").unwrap(), None);
    assert_eq!(app.store.load(), None);
    assert_eq!(app.check("/profile"), Decision::RedirectToLogin("/".to_string()));
}

#[test]
fn corrupt_session_document_is_purged() {
    let app = TestApp::start(CONFIG);
    app.login_as(&[Role::Client]);

    std::fs::write(app.session_path(), "not a json document").unwrap();

    assert_eq!(app.store.load(), None);
    assert!(!app.session_path().exists());
    assert_eq!(app.store.load(), None);
}
