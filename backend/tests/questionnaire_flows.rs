//! End-to-end flows through the assembled application.
//!
//! Bootstraps a real [`AppContext`] over a temporary database and drives
//! it the way an inbound adapter would: credentials in, gate chain,
//! service call. Covers registration, login, the questionnaire lifecycle,
//! and the race between two registrations of the same address.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;
use rstest::{fixture, rstest};
use tempfile::TempDir;

use tiramisu_backend::config::AppConfig;
use tiramisu_backend::context::{AppContext, BootstrapError};
use tiramisu_backend::domain::{
    Answer, AuthContext, DisplayName, ErrorCode, Gate, LoginCredentials, QuestionDraft,
    Registration, RequestContext, SessionToken,
};

struct FrozenClock(DateTime<Utc>);

impl Clock for FrozenClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0)
        .single()
        .expect("valid time")
}

struct App {
    context: AppContext,
    _dir: TempDir,
}

#[fixture]
fn app() -> App {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let dir = tempfile::tempdir().expect("temp dir");
    let config = AppConfig {
        db_path: Some(dir.path().join("tiramisu.db")),
        token_secret: Some("integration-test-secret".to_owned()),
        token_ttl_secs: 86_400,
    };
    let context = AppContext::bootstrap_with_clock(&config, Arc::new(FrozenClock(now())))
        .expect("bootstrap succeeds");
    App { context, _dir: dir }
}

/// Run a token through the authenticated gate, as an adapter would.
fn authenticate(app: &App, token: &SessionToken) -> AuthContext {
    app.context
        .authenticated_gate()
        .admit(RequestContext::with_bearer(token.as_str()))
        .expect("issued token admits")
        .into_auth()
        .expect("subject bound")
}

async fn register(app: &App, email: &str) -> AuthContext {
    let registration =
        Registration::try_from_parts(email, "secret1", "Ada").expect("valid registration");
    let account = app
        .context
        .accounts()
        .register(&registration)
        .await
        .expect("registration succeeds");
    authenticate(app, &account.token)
}

#[rstest]
#[case(None)]
#[case(Some(String::new()))]
fn bootstrap_without_a_token_secret_fails(#[case] token_secret: Option<String>) {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = AppConfig {
        db_path: Some(dir.path().join("tiramisu.db")),
        token_secret,
        token_ttl_secs: 86_400,
    };
    let err = AppContext::bootstrap(&config).expect_err("missing secret must abort");
    assert!(matches!(err, BootstrapError::MissingTokenSecret));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn register_login_and_profile_round_trip(app: App) {
    let ctx = register(&app, "ada@x.com").await;
    assert!(!ctx.is_admin());

    let credentials =
        LoginCredentials::try_from_parts("ada@x.com", "secret1").expect("valid credentials");
    let token = app
        .context
        .accounts()
        .login(&credentials)
        .await
        .expect("login succeeds");
    let login_ctx = authenticate(&app, &token);
    assert_eq!(login_ctx.subject(), ctx.subject());

    let profile = app
        .context
        .accounts()
        .profile(&ctx)
        .await
        .expect("profile succeeds");
    assert_eq!(&profile.id, ctx.subject());
    assert_eq!(profile.name, "Ada");

    let updated = app
        .context
        .accounts()
        .update_profile(
            &ctx,
            DisplayName::new("Countess").expect("valid name"),
            Some("avatar.png".to_owned()),
        )
        .await
        .expect("update succeeds");
    assert_eq!(updated.name, "Countess");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn wrong_password_and_unknown_email_fail_alike(app: App) {
    register(&app, "ada@x.com").await;

    let wrong = LoginCredentials::try_from_parts("ada@x.com", "not-the-password")
        .expect("valid credentials");
    let unknown =
        LoginCredentials::try_from_parts("ghost@x.com", "secret1").expect("valid credentials");

    let wrong_err = app
        .context
        .accounts()
        .login(&wrong)
        .await
        .expect_err("wrong password must fail");
    let unknown_err = app
        .context
        .accounts()
        .login(&unknown)
        .await
        .expect_err("unknown email must fail");

    assert_eq!(wrong_err.code(), ErrorCode::Unauthorized);
    assert_eq!(wrong_err.message(), unknown_err.message());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn concurrent_registrations_of_one_email_admit_exactly_one(app: App) {
    let make = |app: &App| {
        let accounts = app.context.accounts().clone();
        async move {
            let registration = Registration::try_from_parts("race@x.com", "secret1", "Ada")
                .expect("valid registration");
            accounts.register(&registration).await
        }
    };

    let (first, second) = futures::join!(
        tokio::spawn(make(&app)),
        tokio::spawn(make(&app)),
    );
    let outcomes = [first.expect("task runs"), second.expect("task runs")];

    let successes = outcomes.iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1, "exactly one registration may win");
    let conflict = outcomes
        .iter()
        .find_map(|r| r.as_ref().err())
        .expect("one registration must lose");
    assert_eq!(conflict.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn questionnaire_lifecycle_enforces_roles_and_ownership(app: App) {
    // Registration never grants the admin role, so administer questions
    // through the repository-level service with a synthetic admin context.
    let member = register(&app, "member@x.com").await;
    let admin = AuthContext::new(member.subject().clone(), true);

    let question = app
        .context
        .questionnaires()
        .create_question(&admin, QuestionDraft::scale("Rate the tiramisu", 1, 5))
        .await
        .expect("admin creates question");

    let err = app
        .context
        .questionnaires()
        .create_question(&member, QuestionDraft::scale("Smuggled", 1, 5))
        .await
        .expect_err("member cannot administer questions");
    assert_eq!(err.code(), ErrorCode::Forbidden);

    let listed = app
        .context
        .questionnaires()
        .list_questions()
        .await
        .expect("listing succeeds");
    assert_eq!(listed, vec![question.clone()]);

    let receipt = app
        .context
        .questionnaires()
        .submit(&member, vec![Answer::new(question.id().clone(), "4")])
        .await
        .expect("member submits");

    let own = app
        .context
        .questionnaires()
        .own_submissions(&member)
        .await
        .expect("listing succeeds");
    assert_eq!(own.len(), 1);

    let stranger = register(&app, "stranger@x.com").await;
    let err = app
        .context
        .questionnaires()
        .submission(&stranger, &receipt.id)
        .await
        .expect_err("stranger cannot read another user's submission");
    assert_eq!(err.code(), ErrorCode::Forbidden);

    app.context
        .questionnaires()
        .submission(&admin, &receipt.id)
        .await
        .expect("admin may read any submission");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn admin_gate_rejects_member_tokens(app: App) {
    let registration = Registration::try_from_parts("member@x.com", "secret1", "Ada")
        .expect("valid registration");
    let account = app
        .context
        .accounts()
        .register(&registration)
        .await
        .expect("registration succeeds");

    let err = app
        .context
        .admin_gate()
        .admit(RequestContext::with_bearer(account.token.as_str()))
        .expect_err("member token must be rejected");
    assert_eq!(err.code(), ErrorCode::Forbidden);
}
