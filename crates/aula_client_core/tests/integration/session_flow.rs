//! Login, signup, logout and session persistence against the fake backend.

use crate::common::{TestApp, ADMIN, ANA};
use aula_client_core::models::Role;
use aula_client_core::views::{landing_screen, LoginView, ProfileView, Screen, SignupView};
use aula_client_core::ClientError;

#[tokio::test]
async fn wrong_password_is_rejected_with_backend_message() {
    let app = TestApp::start().await;
    let err = LoginView::new(app.ctx.clone())
        .submit("ana", "nope")
        .await
        .unwrap_err();
    assert!(matches!(&err, ClientError::Rejected(m) if m == "Invalid username or password"));
    assert!(!app.ctx.session.is_logged_in());
}

#[tokio::test]
async fn empty_fields_fail_before_any_request() {
    let app = TestApp::start().await;
    let err = LoginView::new(app.ctx.clone()).submit("  ", "x").await.unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)));
    let err = SignupView::new(app.ctx.clone()).submit("nuevo", "").await.unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)));
    assert!(app.backend.writes().is_empty());
}

#[tokio::test]
async fn login_stores_session_and_picks_landing_screen() {
    let app = TestApp::start().await;
    let mut rx = app.ctx.session.subscribe();

    let (user, screen) = LoginView::new(app.ctx.clone())
        .submit(ADMIN.0, ADMIN.1)
        .await
        .expect("login");
    assert_eq!(user.role, Role::Administrator);
    assert_eq!(user.username, "admin");
    assert_eq!(user.display_name(), "Marta Suárez");
    assert_eq!(screen, Screen::AdminDashboard);
    assert_eq!(app.ctx.session.token().as_deref(), Some("token-1"));
    assert!(rx.has_changed().unwrap());
    assert_eq!(rx.borrow_and_update().as_ref().map(|u| u.user_id.get()), Some(1));
}

#[tokio::test]
async fn session_survives_restart_and_logout_clears_it() {
    let app = TestApp::start().await;
    app.login_as(ANA).await;

    let restarted = app.reopen();
    let role = restarted.session.role();
    assert_eq!(landing_screen(role.as_ref()), Screen::StudentDashboard);

    // The restored token authenticates requests.
    let mut profile = ProfileView::new(restarted.clone());
    profile.load().await.expect("profile");
    assert_eq!(profile.profile.as_ref().map(|p| p.initials()), Some("AP".to_string()));

    LoginView::new(restarted).logout().expect("logout");
    assert!(!app.reopen().session.is_logged_in());
}

#[tokio::test]
async fn signup_creates_account_or_reports_taken_username() {
    let app = TestApp::start().await;
    let view = SignupView::new(app.ctx.clone());

    let created = view.submit("carla", "carla123").await.expect("signup");
    assert_eq!(created.username, "carla");

    let err = view.submit("ana", "whatever").await.unwrap_err();
    assert_eq!(err.user_message(), "El username ya existe");
}
