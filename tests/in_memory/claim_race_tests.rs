//! Concurrent claims against one running instance.

use super::helpers::{bootstrap, enroll, start_app};
use aid_connect::session::Session;
use aid_connect::task::domain::{TaskKind, TaskStatus, Urgency};
use aid_connect::task::services::CreateTaskRequest;
use aid_connect::user::domain::Role;
use aid_connect::user::ports::UserDirectory;
use rstest::rstest;
use std::sync::Arc;

#[rstest]
#[case::two_volunteers(2)]
#[case::crowd(12)]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn exactly_one_volunteer_wins(#[case] contenders: usize) -> Result<(), eyre::Report> {
    let (app, _transport) = start_app();
    bootstrap(&app).await?;
    let admin = enroll(&app, "Miriam", Role::Admin).await?;
    let mut volunteers: Vec<Session> = Vec::with_capacity(contenders);
    for index in 0..contenders {
        volunteers.push(enroll(&app, &format!("Volunteer{index}"), Role::Volunteer).await?);
    }
    let task = app
        .lifecycle()
        .create_task(
            &admin,
            CreateTaskRequest::new(TaskKind::Transport, "Airport pickup", Urgency::High),
        )
        .await?;

    let task_id = task.id();
    let lifecycle = Arc::clone(app.lifecycle());
    let handles: Vec<_> = volunteers
        .iter()
        .cloned()
        .map(|session| {
            let service = Arc::clone(&lifecycle);
            tokio::spawn(async move { service.claim_task(&session, task_id).await })
        })
        .collect();

    let mut winners = Vec::new();
    let mut already_claimed = 0_usize;
    for handle in handles {
        match handle.await? {
            Ok(claimed) => winners.push(claimed),
            Err(err) if err.is_already_claimed() => already_claimed += 1,
            Err(err) => return Err(eyre::eyre!("unexpected claim failure: {err}")),
        }
    }

    assert_eq!(winners.len(), 1);
    assert_eq!(already_claimed, contenders - 1);
    let stored = app.lifecycle().find_task(task_id).await?;
    assert_eq!(stored.status(), TaskStatus::Taken);
    let winner = winners
        .first()
        .and_then(|claimed| claimed.claimant().cloned())
        .ok_or_else(|| eyre::eyre!("winner without claimant"))?;
    assert_eq!(stored.claimant(), Some(&winner));

    let mut total_taken = 0;
    for session in &volunteers {
        let user = app
            .store()
            .find_by_id(session.user_id())
            .await?
            .ok_or_else(|| eyre::eyre!("volunteer missing"))?;
        total_taken += user.counters().tasks_taken();
    }
    assert_eq!(total_taken, 1);

    drop(lifecycle);
    app.shutdown().await;
    Ok(())
}
