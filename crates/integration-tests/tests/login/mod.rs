use config::Role;
use guard::{Decision, LoginError, LoginPayload};
use integration_tests::{NOW, TestApp, TestClaims, unsigned_token};

use crate::CONFIG;

fn payload(roles: &[Role], exp: i64, profiles: serde_json::Value) -> LoginPayload {
    let token = unsigned_token(&TestClaims::new(roles, exp));
    let roles: Vec<_> = roles.iter().map(|role| role.tag()).collect();

    serde_json::from_value(serde_json::json!({
        "token": token,
        "roles": roles,
        "dni": "12345678Z",
        "profiles": profiles,
    }))
    .unwrap()
}

#[test]
fn login_lands_on_primary_home_and_survives_reload() {
    let app = TestApp::start(CONFIG);

    let logged_in = app
        .guard
        .login(payload(&[Role::Trainer, Role::Client], NOW + 600, serde_json::json!({})))
        .unwrap();

    assert_eq!(logged_in.home, "/trainer/dashboard");

    let (store, guard) = app.reload();

    assert_eq!(store.role(), Some(Role::Trainer));
    assert_eq!(store.identity().as_deref(), Some("12345678Z"));
    assert_eq!(store.load(), Some(logged_in.principal));
    assert_eq!(guard.evaluate(&app.route("/client/diary")), Decision::Allow);
}

#[test]
fn inactive_primary_profile_is_refused() {
    let app = TestApp::start(CONFIG);
    app.login_as(&[Role::Admin]);

    let result = app.guard.login(payload(
        &[Role::Nutritionist],
        NOW + 600,
        serde_json::json!({ "nutritionist": { "active": false } }),
    ));

    assert!(matches!(result, Err(LoginError::InactiveProfile(Role::Nutritionist))));
    assert_eq!(app.store.load(), None);
    assert_eq!(app.check("/admin"), Decision::RedirectToLogin("/".to_string()));
}

#[test]
fn expired_login_credential_is_refused() {
    let app = TestApp::start(CONFIG);

    let result = app.guard.login(payload(&[Role::Client], NOW - 10, serde_json::json!({})));

    insta::assert_snapshot!(result.unwrap_err(), @"Credential rejected: Expired credential");
    assert!(!app.session_path().exists());
}

#[test]
fn unknown_roles_are_ignored() {
    let app = TestApp::start(CONFIG);

    let token = unsigned_token(&TestClaims::new(&[Role::Client], NOW + 600));
    let payload: LoginPayload = serde_json::from_value(serde_json::json!({
        "credential": token,
        "roles": ["ROLE_CLIENT", "ROLE_JANITOR"],
        "identity": "12345678Z",
    }))
    .unwrap();

    let logged_in = app.guard.login(payload).unwrap();

    assert_eq!(logged_in.principal.roles.len(), 1);
    assert_eq!(logged_in.home, "/client/dashboard");
}
