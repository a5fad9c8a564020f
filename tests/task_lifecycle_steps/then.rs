//! Then steps for task lifecycle BDD scenarios.

use super::given::token_for;
use super::world::{LifecycleWorld, run_async};
use aid_connect::notification::domain::NotificationIntent;
use aid_connect::task::domain::{Task, TaskDomainError, TaskStatus};
use aid_connect::task::services::TaskLifecycleError;
use aid_connect::user::domain::{TaskCounters, UserId};
use aid_connect::user::ports::UserDirectory;
use rstest_bdd_macros::then;

fn stored_task(world: &LifecycleWorld) -> Result<Task, eyre::Report> {
    let task_id = world.task()?.id();
    Ok(run_async(world.lifecycle.find_task(task_id))?)
}

fn counters(world: &LifecycleWorld, user_id: &UserId) -> Result<TaskCounters, eyre::Report> {
    let user = run_async(world.store.find_by_id(user_id))?
        .ok_or_else(|| eyre::eyre!("user {user_id} missing from store"))?;
    Ok(user.counters())
}

fn intent(world: &LifecycleWorld) -> Result<&NotificationIntent, eyre::Report> {
    world
        .last_intent
        .as_ref()
        .ok_or_else(|| eyre::eyre!("the last transition produced no notification"))
}

fn recipient_ids(intent: &NotificationIntent) -> Vec<UserId> {
    intent
        .recipients
        .iter()
        .map(|recipient| recipient.user_id.clone())
        .collect()
}

#[then(r#"the task status is "{status}""#)]
fn task_status_is(world: &LifecycleWorld, status: String) -> Result<(), eyre::Report> {
    let expected = TaskStatus::try_from(status.as_str())
        .map_err(|err| eyre::eyre!("invalid expected status in scenario: {err}"))?;
    let task = stored_task(world)?;
    if task.status() != expected {
        return Err(eyre::eyre!(
            "expected status {}, found {}",
            expected.as_str(),
            task.status().as_str()
        ));
    }
    Ok(())
}

#[then(r#"the task is claimed by "{name}""#)]
fn task_is_claimed_by(world: &LifecycleWorld, name: String) -> Result<(), eyre::Report> {
    let expected = world.volunteer(&name)?.user_id().clone();
    let task = stored_task(world)?;
    let claimant = task
        .claimant()
        .ok_or_else(|| eyre::eyre!("task has no claimant"))?;
    if claimant.id() != &expected || claimant.display_name() != name {
        return Err(eyre::eyre!("expected claimant {name}, found {claimant:?}"));
    }
    Ok(())
}

#[then("the admin has created {count:u64} tasks")]
fn admin_created(world: &LifecycleWorld, count: u64) -> Result<(), eyre::Report> {
    let actual = counters(world, world.admin()?.user_id())?.tasks_created();
    if actual != count {
        return Err(eyre::eyre!("expected {count} created tasks, found {actual}"));
    }
    Ok(())
}

#[then(r#"volunteer "{name}" has taken {count:u64} tasks"#)]
fn volunteer_taken(world: &LifecycleWorld, name: String, count: u64) -> Result<(), eyre::Report> {
    let actual = counters(world, world.volunteer(&name)?.user_id())?.tasks_taken();
    if actual != count {
        return Err(eyre::eyre!("expected {name} to have taken {count}, found {actual}"));
    }
    Ok(())
}

#[then(r#"volunteer "{name}" has completed {count:u64} tasks"#)]
fn volunteer_completed(
    world: &LifecycleWorld,
    name: String,
    count: u64,
) -> Result<(), eyre::Report> {
    let actual = counters(world, world.volunteer(&name)?.user_id())?.tasks_completed();
    if actual != count {
        return Err(eyre::eyre!("expected {name} to have completed {count}, found {actual}"));
    }
    Ok(())
}

#[then("the notification goes to every notifiable volunteer")]
fn notification_to_volunteers(world: &LifecycleWorld) -> Result<(), eyre::Report> {
    let expected: Vec<UserId> = run_async(world.store.find_notifiable_volunteers())?
        .iter()
        .map(|user| user.id().clone())
        .collect();
    let actual = recipient_ids(intent(world)?);
    if expected.is_empty() || actual != expected {
        return Err(eyre::eyre!("expected recipients {expected:?}, found {actual:?}"));
    }
    Ok(())
}

#[then("the notification goes only to the admin")]
fn notification_to_admin(world: &LifecycleWorld) -> Result<(), eyre::Report> {
    let expected = vec![world.admin()?.user_id().clone()];
    let actual = recipient_ids(intent(world)?);
    if actual != expected {
        return Err(eyre::eyre!("expected recipients {expected:?}, found {actual:?}"));
    }
    Ok(())
}

#[then(r#"the notification title contains "{first}" and "{second}""#)]
fn notification_title_contains(
    world: &LifecycleWorld,
    first: String,
    second: String,
) -> Result<(), eyre::Report> {
    let title = &intent(world)?.message.title;
    if !title.contains(&first) || !title.contains(&second) {
        return Err(eyre::eyre!("title {title:?} lacks {first} or {second}"));
    }
    Ok(())
}

#[then(r#"the notification body mentions "{name}""#)]
fn notification_body_mentions(world: &LifecycleWorld, name: String) -> Result<(), eyre::Report> {
    let body = &intent(world)?.message.body;
    if !body.contains(&name) {
        return Err(eyre::eyre!("body {body:?} does not mention {name}"));
    }
    Ok(())
}

#[then("the claim fails because the task is already claimed")]
fn claim_already_claimed(world: &LifecycleWorld) -> Result<(), eyre::Report> {
    let err = world
        .last_error
        .as_ref()
        .ok_or_else(|| eyre::eyre!("expected the claim to fail"))?;
    if !err.is_already_claimed() {
        return Err(eyre::eyre!("expected AlreadyClaimed, got {err:?}"));
    }
    Ok(())
}

#[then("the cancellation fails as an invalid transition")]
fn cancellation_invalid(world: &LifecycleWorld) -> Result<(), eyre::Report> {
    let err = world
        .last_error
        .as_ref()
        .ok_or_else(|| eyre::eyre!("expected the cancellation to fail"))?;
    if !matches!(
        err,
        TaskLifecycleError::Domain(TaskDomainError::InvalidTransition { .. })
    ) {
        return Err(eyre::eyre!("expected InvalidTransition, got {err:?}"));
    }
    Ok(())
}

#[then("{delivered:u64} notification is delivered and {failed:u64} fails")]
fn delivery_counts(world: &LifecycleWorld, delivered: u64, failed: u64) -> Result<(), eyre::Report> {
    let report = world
        .last_report
        .ok_or_else(|| eyre::eyre!("no dispatch report recorded"))?;
    if u64::try_from(report.delivered)? != delivered || u64::try_from(report.failed)? != failed {
        return Err(eyre::eyre!("unexpected dispatch report {report:?}"));
    }
    Ok(())
}

#[then(r#"volunteer "{name}" no longer holds a token"#)]
fn volunteer_without_token(world: &LifecycleWorld, name: String) -> Result<(), eyre::Report> {
    let user_id = world.volunteer(&name)?.user_id();
    let user = run_async(world.store.find_by_id(user_id))?
        .ok_or_else(|| eyre::eyre!("{name} missing from store"))?;
    if user.notification_token().is_some() {
        return Err(eyre::eyre!("{name} still holds a token"));
    }
    Ok(())
}

#[then(r#"volunteer "{name}" still holds a token"#)]
fn volunteer_with_token(world: &LifecycleWorld, name: String) -> Result<(), eyre::Report> {
    let user_id = world.volunteer(&name)?.user_id();
    let user = run_async(world.store.find_by_id(user_id))?
        .ok_or_else(|| eyre::eyre!("{name} missing from store"))?;
    if user.notification_token() != Some(&token_for(&name)?) {
        return Err(eyre::eyre!("{name} lost their token"));
    }
    Ok(())
}
