//! First sign-in, enrollment, and logout against a running instance.

use super::helpers::{bootstrap, enroll, identity_for, start_app, token_for, wait_for_sent};
use aid_connect::session::{SessionState, StaticIdentityProvider};
use aid_connect::task::domain::{TaskKind, Urgency};
use aid_connect::task::services::CreateTaskRequest;
use aid_connect::user::domain::Role;
use aid_connect::user::services::{CreateProfileRequest, ProfileError};
use rstest::rstest;
use std::sync::Arc;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn first_sign_in_walks_through_profile_creation() -> Result<(), eyre::Report> {
    let (app, _transport) = start_app();
    let identity = Arc::new(StaticIdentityProvider::new());
    let sessions = app.sessions(Arc::clone(&identity));
    assert_eq!(sessions.current().await?, SessionState::SignedOut);

    let user_id = identity_for("Noa")?;
    identity.sign_in(user_id.clone());
    assert_eq!(
        sessions.current().await?,
        SessionState::NeedsProfile(user_id.clone())
    );

    app.profiles()
        .create_profile(user_id.clone(), CreateProfileRequest::new("Noa", Role::Volunteer))
        .await?;
    let SessionState::Active(session) = sessions.current().await? else {
        return Err(eyre::eyre!("expected an active session after profile creation"));
    };
    assert_eq!(session.user_id(), &user_id);
    assert_eq!(session.role(), Role::Volunteer);
    assert_eq!(session.display_name(), "Noa");

    identity.sign_out();
    assert_eq!(sessions.current().await?, SessionState::SignedOut);
    app.shutdown().await;
    Ok(())
}

#[rstest]
#[case::no_code(None)]
#[case::wrong_code(Some("guess"))]
#[tokio::test(flavor = "multi_thread")]
async fn admin_enrollment_requires_the_organization_code(
    #[case] code: Option<&str>,
) -> Result<(), eyre::Report> {
    let (app, _transport) = start_app();
    bootstrap(&app).await?;
    let mut request = CreateProfileRequest::new("Eitan", Role::Admin);
    if let Some(value) = code {
        request = request.with_admin_code(value);
    }

    let result = app
        .profiles()
        .create_profile(identity_for("Eitan")?, request)
        .await;

    assert!(matches!(result, Err(ProfileError::InvalidAdminCode)));
    assert!(app.profiles().profile(&identity_for("Eitan")?).await?.is_none());
    app.shutdown().await;
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn logged_out_volunteer_stops_receiving_broadcasts() -> Result<(), eyre::Report> {
    let (app, transport) = start_app();
    bootstrap(&app).await?;
    let admin = enroll(&app, "Miriam", Role::Admin).await?;
    let leaving = enroll(&app, "Dana", Role::Volunteer).await?;
    enroll(&app, "Omer", Role::Volunteer).await?;

    app.profiles().logout(&leaving).await?;
    app.lifecycle()
        .create_task(
            &admin,
            CreateTaskRequest::new(TaskKind::Shopping, "Pharmacy run", Urgency::High),
        )
        .await?;

    let sent = wait_for_sent(&transport, 1).await?;
    app.shutdown().await;
    let tokens: Vec<_> = sent.into_iter().map(|entry| entry.token).collect();
    assert_eq!(tokens, vec![token_for("Omer")?]);
    assert_eq!(transport.sent()?.len(), 1);
    Ok(())
}
