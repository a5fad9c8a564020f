//! When steps for task lifecycle BDD scenarios.

use super::world::{LifecycleWorld, run_async};
use aid_connect::task::domain::{TaskKind, Urgency};
use aid_connect::task::services::CreateTaskRequest;
use rstest_bdd_macros::when;

#[when(r#"the admin posts a "{kind}" task "{title}" with "{urgency}" urgency"#)]
fn admin_posts(
    world: &mut LifecycleWorld,
    kind: String,
    title: String,
    urgency: String,
) -> Result<(), eyre::Report> {
    let request = CreateTaskRequest::new(
        TaskKind::try_from(kind.as_str())?,
        title,
        Urgency::try_from(urgency.as_str())?,
    );
    let result = run_async(world.lifecycle.create_task(world.admin()?, request));
    world.record(result)
}

#[when(r#"volunteer "{name}" claims the task"#)]
fn volunteer_claims(world: &mut LifecycleWorld, name: String) -> Result<(), eyre::Report> {
    let task_id = world.task()?.id();
    let result = run_async(world.lifecycle.claim_task(world.volunteer(&name)?, task_id));
    world.record(result)
}

#[when(r#"volunteer "{name}" completes the task"#)]
fn volunteer_completes(world: &mut LifecycleWorld, name: String) -> Result<(), eyre::Report> {
    let task_id = world.task()?.id();
    let result = run_async(world.lifecycle.complete_task(world.volunteer(&name)?, task_id));
    world.record(result)
}

#[when("the admin cancels the task")]
fn admin_cancels(world: &mut LifecycleWorld) -> Result<(), eyre::Report> {
    let task_id = world.task()?.id();
    let result = run_async(world.lifecycle.cancel_task(world.admin()?, task_id));
    world.record(result)
}

#[when("the notification is delivered")]
fn notification_is_delivered(world: &mut LifecycleWorld) -> Result<(), eyre::Report> {
    let event = world
        .last_event
        .as_ref()
        .ok_or_else(|| eyre::eyre!("no transition to notify about"))?;
    let report = run_async(world.dispatcher.dispatch(event));
    world.last_report = Some(report);
    Ok(())
}
