use std::{sync::Arc, time::Duration};

use config::Role;
use guard::{AccountDirectory, AlwaysActive, Decision, DirectoryError, GuardState, GuardTracker};
use integration_tests::TestApp;
use tokio::sync::Notify;

use crate::CONFIG;

/// Directory whose lookups wait until released.
#[derive(Clone, Default)]
struct Suspended {
    release: Arc<Notify>,
    active: bool,
}

impl AccountDirectory for Suspended {
    async fn is_active(&self, _identity: &str, _role: Role) -> Result<bool, DirectoryError> {
        self.release.notified().await;
        Ok(self.active)
    }
}

#[tokio::test]
async fn active_account_resolves_to_allow() {
    let app = TestApp::start(CONFIG);
    app.login_as(&[Role::Client]);

    let (_, guard) = app.reload();
    let tracker = GuardTracker::new(guard, AlwaysActive, Duration::from_secs(5));
    let mut states = tracker.subscribe();

    assert_eq!(*states.borrow_and_update(), GuardState::Loading);

    let decision = tracker.evaluate(&app.route("/client")).await;

    assert_eq!(decision, Some(Decision::Allow));
    assert_eq!(tracker.state(), GuardState::Resolved(Decision::Allow));
}

#[tokio::test]
async fn inactive_account_destroys_the_session() {
    let app = TestApp::start(CONFIG);
    app.login_as(&[Role::Trainer]);

    let directory = Suspended::default();
    let (_, guard) = app.reload();
    let tracker = GuardTracker::new(guard, directory.clone(), Duration::from_secs(5));

    let route = app.route("/trainer");

    let (decision, _) = tokio::join!(tracker.evaluate(&route), async {
        tokio::task::yield_now().await;
        assert_eq!(tracker.state(), GuardState::Loading);
        directory.release.notify_one();
    });

    assert_eq!(decision, Some(Decision::RedirectToLogin("/".to_string())));
    assert!(!app.session_path().exists());
}

#[tokio::test]
async fn logout_while_loading_discards_the_result() {
    let app = TestApp::start(CONFIG);
    app.login_as(&[Role::Trainer]);

    let directory = Suspended {
        active: true,
        ..Default::default()
    };
    let (_, guard) = app.reload();
    let tracker = GuardTracker::new(guard, directory.clone(), Duration::from_secs(5));

    let route = app.route("/trainer");

    let (decision, _) = tokio::join!(tracker.evaluate(&route), async {
        tokio::task::yield_now().await;
        tracker.guard().logout().unwrap();
        directory.release.notify_one();
    });

    assert_eq!(decision, None);
    assert_eq!(tracker.state(), GuardState::Loading);

    let decision = tracker.evaluate(&route).await;
    assert_eq!(decision, Some(Decision::RedirectToLogin("/".to_string())));
}
