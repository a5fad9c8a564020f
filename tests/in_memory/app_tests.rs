//! Background dispatch, live feeds, and shutdown of a running instance.

use super::helpers::{bootstrap, enroll, start_app, token_for, wait_for_sent};
use aid_connect::task::domain::{TaskKind, TaskStatus, TransitionKind, Urgency};
use aid_connect::task::ports::TaskQuery;
use aid_connect::task::services::CreateTaskRequest;
use aid_connect::user::domain::{Role, UserId};
use aid_connect::store::InMemoryStore;
use aid_connect::user::ports::UserDirectory;
use rstest::rstest;
use std::time::Duration;

async fn wait_for_token_cleared(store: &InMemoryStore, id: &UserId) -> Result<(), eyre::Report> {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    loop {
        let user = store
            .find_by_id(id)
            .await?
            .ok_or_else(|| eyre::eyre!("user {id} missing"))?;
        if user.notification_token().is_none() {
            return Ok(());
        }
        eyre::ensure!(
            tokio::time::Instant::now() < deadline,
            "token of {id} was never cleared"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn new_task_is_broadcast_to_volunteers_in_the_background() -> Result<(), eyre::Report> {
    let (app, transport) = start_app();
    bootstrap(&app).await?;
    let admin = enroll(&app, "Miriam", Role::Admin).await?;
    enroll(&app, "Dana", Role::Volunteer).await?;
    enroll(&app, "Omer", Role::Volunteer).await?;

    let task = app
        .lifecycle()
        .create_task(
            &admin,
            CreateTaskRequest::new(TaskKind::Shopping, "Groceries for Ruth", Urgency::Medium),
        )
        .await?;

    let sent = wait_for_sent(&transport, 2).await?;
    let mut tokens: Vec<_> = sent.iter().map(|entry| entry.token.clone()).collect();
    tokens.sort_by(|left, right| left.as_str().cmp(right.as_str()));
    assert_eq!(tokens, vec![token_for("Dana")?, token_for("Omer")?]);
    for entry in &sent {
        assert_eq!(entry.message.title, "🟠 Medium 🛒 New task!");
        assert_eq!(entry.message.body, "🛒 Shopping / delivery\nGroceries for Ruth");
        assert_eq!(entry.data.task_id(), task.id());
        assert_eq!(entry.data.event(), TransitionKind::Created);
    }
    app.shutdown().await;
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn creator_hears_about_claim_and_completion() -> Result<(), eyre::Report> {
    let (app, transport) = start_app();
    bootstrap(&app).await?;
    let admin = enroll(&app, "Miriam", Role::Admin).await?;
    let volunteer = enroll(&app, "Dana", Role::Volunteer).await?;

    let task = app
        .lifecycle()
        .create_task(
            &admin,
            CreateTaskRequest::new(TaskKind::Transport, "Ride to clinic", Urgency::High),
        )
        .await?;
    app.lifecycle().claim_task(&volunteer, task.id()).await?;
    let done = app.lifecycle().complete_task(&volunteer, task.id()).await?;
    assert_eq!(done.status(), TaskStatus::Completed);

    let admin_token = token_for("Miriam")?;
    let sent = wait_for_sent(&transport, 3).await?;
    let updates: Vec<_> = sent
        .iter()
        .filter(|entry| entry.token == admin_token)
        .map(|entry| (entry.data.event(), entry.message.body.clone()))
        .collect();
    assert_eq!(
        updates,
        vec![
            (TransitionKind::Taken, "Dana took: Ride to clinic".to_owned()),
            (TransitionKind::Completed, "Dana finished: Ride to clinic".to_owned()),
        ]
    );
    app.shutdown().await;
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unregistered_token_is_cleared_after_broadcast() -> Result<(), eyre::Report> {
    let (app, transport) = start_app();
    bootstrap(&app).await?;
    let admin = enroll(&app, "Miriam", Role::Admin).await?;
    let stale = enroll(&app, "Dana", Role::Volunteer).await?;
    let healthy = enroll(&app, "Omer", Role::Volunteer).await?;
    transport.mark_stale(token_for("Dana")?)?;

    app.lifecycle()
        .create_task(
            &admin,
            CreateTaskRequest::new(TaskKind::General, "Fix a fence", Urgency::Low),
        )
        .await?;

    wait_for_token_cleared(app.store(), stale.user_id()).await?;
    let sent = wait_for_sent(&transport, 1).await?;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent.first().map(|entry| entry.token.clone()), Some(token_for("Omer")?));
    let kept = app
        .store()
        .find_by_id(healthy.user_id())
        .await?
        .ok_or_else(|| eyre::eyre!("volunteer missing"))?;
    assert_eq!(kept.notification_token(), Some(&token_for("Omer")?));

    let audience = app.store().find_notifiable_volunteers().await?;
    assert_eq!(audience.len(), 1);
    app.shutdown().await;
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn transport_outage_does_not_block_the_lifecycle() -> Result<(), eyre::Report> {
    let (app, transport) = start_app();
    bootstrap(&app).await?;
    let admin = enroll(&app, "Miriam", Role::Admin).await?;
    let volunteer = enroll(&app, "Dana", Role::Volunteer).await?;
    transport.set_outage(true)?;

    let task = app
        .lifecycle()
        .create_task(
            &admin,
            CreateTaskRequest::new(TaskKind::Medical, "Check blood pressure", Urgency::High),
        )
        .await?;
    let claimed = app.lifecycle().claim_task(&volunteer, task.id()).await?;

    assert_eq!(claimed.status(), TaskStatus::Taken);
    app.shutdown().await;
    assert!(transport.sent()?.is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn open_feed_tracks_the_board() -> Result<(), eyre::Report> {
    let (app, _transport) = start_app();
    bootstrap(&app).await?;
    let admin = enroll(&app, "Miriam", Role::Admin).await?;
    let volunteer = enroll(&app, "Dana", Role::Volunteer).await?;
    let mut feed = app.feed(TaskQuery::open());
    assert!(feed.snapshot().await?.is_empty());

    let task = app
        .lifecycle()
        .create_task(
            &admin,
            CreateTaskRequest::new(TaskKind::General, "Carry boxes", Urgency::Low),
        )
        .await?;
    let after_create = tokio::time::timeout(Duration::from_secs(2), feed.next_change())
        .await??
        .ok_or_else(|| eyre::eyre!("feed closed early"))?;
    assert_eq!(
        after_create.iter().map(|entry| entry.id()).collect::<Vec<_>>(),
        vec![task.id()]
    );

    app.lifecycle().claim_task(&volunteer, task.id()).await?;
    let after_claim = tokio::time::timeout(Duration::from_secs(2), feed.next_change())
        .await??
        .ok_or_else(|| eyre::eyre!("feed closed early"))?;
    assert!(after_claim.is_empty());

    app.shutdown().await;
    let closed = tokio::time::timeout(Duration::from_secs(2), feed.next_change()).await??;
    assert!(closed.is_none());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn shutdown_drains_queued_notifications() -> Result<(), eyre::Report> {
    let (app, transport) = start_app();
    bootstrap(&app).await?;
    let admin = enroll(&app, "Miriam", Role::Admin).await?;
    enroll(&app, "Dana", Role::Volunteer).await?;

    for title in ["One", "Two", "Three"] {
        app.lifecycle()
            .create_task(
                &admin,
                CreateTaskRequest::new(TaskKind::General, title, Urgency::Low),
            )
            .await?;
    }
    app.shutdown().await;

    let bodies: Vec<_> = transport
        .sent()?
        .into_iter()
        .map(|entry| entry.message.body)
        .collect();
    assert_eq!(
        bodies,
        vec![
            "🤝 General help\nOne".to_owned(),
            "🤝 General help\nTwo".to_owned(),
            "🤝 General help\nThree".to_owned(),
        ]
    );
    Ok(())
}
