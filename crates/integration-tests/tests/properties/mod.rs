use config::Role;
use guard::{AuthError, Decision, Route};
use integration_tests::{NOW, TestApp, TestClaims, principal, unsigned_token};
use session::{Principal, SessionError};

use crate::CONFIG;

const ALL_ROUTES: &[&str] = &["/admin", "/trainer", "/nutritionist", "/client", "/plans", "/profile", "/"];

#[test]
fn empty_roles_never_allow() {
    let app = TestApp::start(CONFIG);
    let token = unsigned_token(&TestClaims::new(&[], NOW + 3600));

    let result = app.store.save(&Principal::new(token, [], "12345678Z"));

    assert!(matches!(result, Err(SessionError::EmptyRoles)));
    assert_eq!(app.guard.authorize(&Route::any_authenticated()), Err(AuthError::NoSession));
}

#[test]
fn role_less_stored_principal_is_treated_as_absent() {
    let app = TestApp::start(CONFIG);
    app.login_as(&[Role::Client]);

    let mut stored: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(app.session_path()).unwrap(),
    )
    .unwrap();

    let mut principal: serde_json::Value =
        serde_json::from_str(stored["principal"].as_str().unwrap()).unwrap();
    principal["roles"] = serde_json::json!([]);
    stored["principal"] = serde_json::Value::String(principal.to_string());

    std::fs::write(app.session_path(), stored.to_string()).unwrap();

    assert_eq!(app.check("/profile"), Decision::RedirectToLogin("/".to_string()));
    assert_eq!(app.store.load(), None);
}

#[test]
fn absent_session_always_redirects_to_login() {
    let app = TestApp::start(CONFIG);

    for path in ALL_ROUTES {
        assert_eq!(app.check(path), Decision::RedirectToLogin(expected_login(path)), "{path}");
    }
}

#[test]
fn expiry_at_now_redirects_to_login_everywhere() {
    let app = TestApp::start(CONFIG);
    let roles = [Role::Admin, Role::Trainer, Role::Nutritionist, Role::Client];

    for path in ALL_ROUTES {
        let token = unsigned_token(&TestClaims::new(&roles, NOW));
        app.store.save(&Principal::new(token, roles, "12345678Z")).unwrap();

        assert_eq!(app.check(path), Decision::RedirectToLogin(expected_login(path)), "{path}");
    }
}

#[test]
fn credential_expires_as_time_passes() {
    let app = TestApp::start(CONFIG);
    app.login_as(&[Role::Client]);

    assert_eq!(app.check("/client"), Decision::Allow);

    app.clock.advance(3599);
    assert_eq!(app.check("/client"), Decision::Allow);

    app.clock.advance(1);
    assert_eq!(app.check("/client"), Decision::RedirectToLogin("/".to_string()));
}

#[test]
fn open_routes_allow_any_valid_session() {
    let app = TestApp::start(CONFIG);

    for role in Role::PRIORITY {
        app.login_as(&[role]);

        assert_eq!(app.check("/profile"), Decision::Allow, "{role}");
        assert_eq!(app.check("/unconfigured/page"), Decision::Allow, "{role}");
    }
}

#[test]
fn disjoint_roles_follow_fixed_priority() {
    let app = TestApp::start(CONFIG);

    let cases: &[(&[Role], &str, &str)] = &[
        (&[Role::Client], "/admin", "/client/dashboard"),
        (&[Role::Nutritionist, Role::Client], "/trainer", "/nutritionist/dashboard"),
        (&[Role::Trainer, Role::Client], "/nutritionist", "/trainer/dashboard"),
        (&[Role::Admin, Role::Client], "/trainer", "/admin/dashboard"),
        (&[Role::Admin, Role::Nutritionist], "/client", "/admin/dashboard"),
        (&[Role::Client], "/plans", "/client/dashboard"),
    ];

    for (roles, path, home) in cases {
        app.login_as(roles);

        assert_eq!(
            app.check(path),
            Decision::RedirectToRoleHome(home.to_string()),
            "{roles:?} on {path}"
        );
    }
}

#[test]
fn clear_twice_equals_clear_once() {
    let app = TestApp::start(CONFIG);
    app.login_as(&[Role::Trainer]);

    app.store.clear().unwrap();
    assert_eq!(app.store.load(), None);
    assert!(!app.session_path().exists());

    app.store.clear().unwrap();
    assert_eq!(app.store.load(), None);
    assert!(!app.session_path().exists());
}

#[test]
fn load_after_save_returns_the_same_principal() {
    let app = TestApp::start(CONFIG);
    let saved = principal(&[Role::Admin, Role::Nutritionist]);

    app.store.save(&saved).unwrap();

    assert_eq!(app.store.load(), Some(saved.clone()));

    let (store, guard) = app.reload();
    assert_eq!(store.load(), Some(saved));
    assert_eq!(guard.evaluate(&app.route("/nutritionist")), Decision::Allow);
}

#[test]
fn in_memory_storage_is_not_shared_across_reloads() {
    let config = CONFIG.replace(r#"{ type = "file", path = "session.json" }"#, r#"{ type = "memory" }"#);
    let app = TestApp::start(&config);
    app.login_as(&[Role::Client]);

    assert_eq!(app.check("/client"), Decision::Allow);

    let (store, _) = app.reload();
    assert_eq!(store.load(), None);
}

#[test]
fn authorization_header_follows_the_session() {
    let app = TestApp::start(CONFIG);
    assert_eq!(app.store.authorization_header(), None);

    let principal = app.login_as(&[Role::Client]);
    let header = app.store.authorization_header().unwrap();

    assert!(header.is_sensitive());
    assert_eq!(
        header.to_str().unwrap(),
        format!("Bearer {}", principal.credential.expose())
    );

    app.guard.logout().unwrap();
    assert_eq!(app.store.authorization_header(), None);
}

fn expected_login(path: &str) -> String {
    if path == "/plans" { "/login" } else { "/" }.to_string()
}
