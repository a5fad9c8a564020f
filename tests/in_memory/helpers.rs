//! Shared helpers for in-memory end-to-end tests.

use aid_connect::app::AidConnect;
use aid_connect::config::AppConfig;
use aid_connect::notification::adapters::{RecordingPushTransport, SentNotification};
use aid_connect::organization::UpdateSettingsRequest;
use aid_connect::session::Session;
use aid_connect::user::domain::{NotificationToken, Role, UserId};
use aid_connect::user::services::CreateProfileRequest;
use eyre::WrapErr;
use std::sync::Arc;
use std::time::Duration;

/// Admin enrollment code used by every test organization.
pub const ADMIN_CODE: &str = "orchard-7";

/// A running instance with a recording transport.
pub type TestApp = AidConnect<RecordingPushTransport>;

/// Starts an instance with default configuration.
pub fn start_app() -> (TestApp, Arc<RecordingPushTransport>) {
    let transport = Arc::new(RecordingPushTransport::new());
    let app = AidConnect::start(AppConfig::default(), Arc::clone(&transport));
    (app, transport)
}

/// Token a helper registers for `name`.
///
/// # Errors
///
/// Returns an error when the generated token is rejected.
pub fn token_for(name: &str) -> Result<NotificationToken, eyre::Report> {
    NotificationToken::new(format!("device-{}", name.to_lowercase())).wrap_err("build token")
}

/// Identity a helper signs `name` in with.
///
/// # Errors
///
/// Returns an error when the generated identifier is rejected.
pub fn identity_for(name: &str) -> Result<UserId, eyre::Report> {
    UserId::new(format!("uid-{}", name.to_lowercase())).wrap_err("build identity")
}

/// Bootstraps the organization settings.
///
/// # Errors
///
/// Returns an error when the settings cannot be written.
pub async fn bootstrap(app: &TestApp) -> Result<(), eyre::Report> {
    app.organization()
        .bootstrap(UpdateSettingsRequest::new("Street Aid", ADMIN_CODE))
        .await
        .wrap_err("bootstrap settings")?;
    Ok(())
}

/// Creates a profile for `name` and registers a notification token.
///
/// # Errors
///
/// Returns an error when profile creation or token registration fails.
pub async fn enroll(app: &TestApp, name: &str, role: Role) -> Result<Session, eyre::Report> {
    let mut request = CreateProfileRequest::new(name, role);
    if role == Role::Admin {
        request = request.with_admin_code(ADMIN_CODE).with_phone("03-5550000");
    }
    let user = app
        .profiles()
        .create_profile(identity_for(name)?, request)
        .await
        .wrap_err_with(|| format!("create profile for {name}"))?;
    let session = Session::from_user(&user);
    app.profiles()
        .register_token(&session, token_for(name)?)
        .await
        .wrap_err_with(|| format!("register token for {name}"))?;
    Ok(session)
}

/// Polls the transport until at least `count` notifications were sent.
///
/// # Errors
///
/// Returns an error when the deadline passes first.
pub async fn wait_for_sent(
    transport: &RecordingPushTransport,
    count: usize,
) -> Result<Vec<SentNotification>, eyre::Report> {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    loop {
        let sent = transport.sent()?;
        if sent.len() >= count {
            return Ok(sent);
        }
        if tokio::time::Instant::now() >= deadline {
            return Err(eyre::eyre!(
                "expected {count} notifications, saw {}",
                sent.len()
            ));
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
