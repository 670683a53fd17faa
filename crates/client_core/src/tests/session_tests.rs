use super::*;
use crate::test_support::{identity, Call, FakeBackend, Op};
use shared::domain::UserId;

fn controller(backend: FakeBackend) -> (Arc<FakeBackend>, SessionController) {
    let backend = Arc::new(backend);
    let controller = SessionController::new(backend.clone());
    (backend, controller)
}

#[tokio::test]
async fn check_resolves_primary_id_field() {
    let (_, controller) =
        controller(FakeBackend::new().with_identity(identity(Some(7), None, "a")));

    let outcome = controller.check().await;

    let CheckOutcome::Resolved(Session::Authenticated(identity)) = outcome else {
        panic!("expected authenticated session, got {outcome:?}");
    };
    assert_eq!(identity.user_id(), UserId(7));
    assert_eq!(identity.username(), "a");
    assert!(controller.session().await.is_authenticated());
}

#[tokio::test]
async fn check_falls_back_to_user_id_field() {
    let payload = IdentityPayload {
        user_id: Some(9),
        ..IdentityPayload::default()
    };
    let (_, controller) = controller(FakeBackend::new().with_identity(payload));

    controller.check().await;

    assert_eq!(controller.session().await.user_id(), Some(UserId(9)));
}

#[tokio::test]
async fn check_failure_is_silently_anonymous() {
    let (backend, controller) = controller(FakeBackend::new());

    let outcome = controller.check().await;

    assert_eq!(outcome, CheckOutcome::Resolved(Session::Anonymous));
    assert_eq!(backend.calls(), vec![Call::CurrentUser]);
    assert!(!controller.is_checking());
}

#[tokio::test]
async fn check_without_usable_id_is_anonymous() {
    let (_, controller) =
        controller(FakeBackend::new().with_identity(identity(Some(0), None, "zero")));

    assert_eq!(
        controller.check().await,
        CheckOutcome::Resolved(Session::Anonymous)
    );
}

#[tokio::test]
async fn overlapping_check_is_suppressed() {
    let (backend, gate) = FakeBackend::new()
        .with_identity(identity(Some(4), None, "d"))
        .gated();
    let backend = Arc::new(backend);
    let controller = Arc::new(SessionController::new(backend.clone()));

    let first = tokio::spawn({
        let controller = controller.clone();
        async move { controller.check().await }
    });
    while !controller.is_checking() {
        tokio::task::yield_now().await;
    }

    assert_eq!(controller.check().await, CheckOutcome::Suppressed);

    gate.notify_one();
    let resolved = first.await.expect("join");
    assert!(matches!(
        resolved,
        CheckOutcome::Resolved(Session::Authenticated(_))
    ));
    assert_eq!(backend.count(|call| *call == Call::CurrentUser), 1);
    assert!(!controller.is_checking());
}

#[tokio::test]
async fn login_surfaces_backend_detail_verbatim() {
    let (_, controller) = controller(FakeBackend::new());
    let backend = FakeBackend::new();
    backend.fail_with_detail(Op::Login, "Invalid credentials");
    let controller_with_detail = SessionController::new(Arc::new(backend));

    let failure = controller_with_detail
        .login("alice", "wrong")
        .await
        .expect_err("must fail");
    assert_eq!(failure.message, "Invalid credentials");

    let missing_identity = controller.login("alice", "pw").await.expect_err("no id");
    assert_eq!(missing_identity.message, "Login failed");
}

#[tokio::test]
async fn login_uses_generic_message_without_detail() {
    let backend = FakeBackend::new();
    backend.fail(Op::Login);
    let (_, controller) = controller(backend);

    let failure = controller.login("alice", "pw").await.expect_err("must fail");

    assert_eq!(failure.message, "Login failed");
    assert!(!controller.session().await.is_authenticated());
}

#[tokio::test]
async fn login_adopts_identity_and_fills_missing_username() {
    let payload = IdentityPayload {
        user_id: Some(21),
        ..IdentityPayload::default()
    };
    let (backend, controller) = controller(FakeBackend::new().with_identity(payload));

    let identity = controller.login("carol", "secret").await.expect("login");

    assert_eq!(identity.user_id(), UserId(21));
    assert_eq!(identity.username(), "carol");
    assert_eq!(controller.session().await.user_id(), Some(UserId(21)));
    assert_eq!(backend.calls(), vec![Call::Login("carol".into())]);
}

#[tokio::test]
async fn blank_credentials_never_reach_the_backend() {
    let (backend, controller) = controller(FakeBackend::new());

    assert!(controller.login("  ", "pw").await.is_err());
    assert!(controller.login("alice", "").await.is_err());
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn register_rejects_mismatched_passwords_locally() {
    let (backend, controller) = controller(FakeBackend::new());

    let failure = controller
        .register("dave", "secret1", "secret2")
        .await
        .expect_err("mismatch");

    assert_eq!(failure.message, "Passwords do not match");
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn register_reports_identity_without_touching_session() {
    let (_, controller) =
        controller(FakeBackend::new().with_identity(identity(Some(5), None, "erin")));

    let registration = controller
        .register("erin", "secret", "secret")
        .await
        .expect("register");

    assert_eq!(
        registration.identity.as_ref().map(|identity| identity.user_id()),
        Some(UserId(5))
    );
    assert!(!controller.session().await.is_authenticated());
}

#[tokio::test]
async fn register_failure_uses_detail_or_fallback() {
    let backend = FakeBackend::new();
    backend.fail_with_detail(Op::Register, "Username already exists");
    let (_, controller) = controller(backend);
    let failure = controller
        .register("erin", "secret", "secret")
        .await
        .expect_err("taken");
    assert_eq!(failure.message, "Username already exists");

    let backend = FakeBackend::new();
    backend.fail(Op::Register);
    let (_, controller) = self::controller(backend);
    let failure = controller
        .register("erin", "secret", "secret")
        .await
        .expect_err("failed");
    assert_eq!(failure.message, "Registration failed");
}

#[tokio::test]
async fn logout_clears_session_even_when_backend_fails() {
    let (backend, controller) =
        controller(FakeBackend::new().with_identity(identity(Some(3), None, "f")));
    controller.check().await;
    backend.fail(Op::Logout);

    controller.logout().await;

    assert_eq!(controller.session().await, Session::Anonymous);
    assert!(backend.calls().contains(&Call::Logout));
}
