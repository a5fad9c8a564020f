//! Given steps for task lifecycle BDD scenarios.

use super::world::{LifecycleWorld, run_async};
use aid_connect::organization::{OrganizationService, UpdateSettingsRequest};
use aid_connect::session::Session;
use aid_connect::task::domain::{TaskKind, Urgency};
use aid_connect::task::services::CreateTaskRequest;
use aid_connect::user::domain::{NotificationToken, Role, UserId};
use aid_connect::user::services::CreateProfileRequest;
use eyre::WrapErr;
use mockable::DefaultClock;
use rstest_bdd_macros::given;
use std::sync::Arc;

const ADMIN_CODE: &str = "enroll-2025";

/// Token registered for a named user.
pub fn token_for(name: &str) -> Result<NotificationToken, eyre::Report> {
    NotificationToken::new(format!("token-{}", name.to_lowercase())).wrap_err("build token")
}

fn enroll(
    world: &LifecycleWorld,
    name: &str,
    request: CreateProfileRequest,
) -> Result<Session, eyre::Report> {
    let identity = UserId::new(format!("uid-{}", name.to_lowercase()))?;
    let user = run_async(world.profiles.create_profile(identity, request))
        .wrap_err_with(|| format!("create profile for {name}"))?;
    let session = Session::from_user(&user);
    run_async(world.profiles.register_token(&session, token_for(name)?))
        .wrap_err_with(|| format!("register token for {name}"))?;
    Ok(session)
}

#[given(
    r#"an organization with admin "{admin}" and volunteers "{first}" and "{second}" holding tokens"#
)]
fn organization_with_members(
    world: &mut LifecycleWorld,
    admin: String,
    first: String,
    second: String,
) -> Result<(), eyre::Report> {
    let organization = OrganizationService::new(Arc::clone(&world.store), Arc::new(DefaultClock));
    run_async(organization.bootstrap(UpdateSettingsRequest::new("Neighbourhood Aid", ADMIN_CODE)))
        .wrap_err("bootstrap organization settings")?;

    let admin_session = enroll(
        world,
        &admin,
        CreateProfileRequest::new(admin.clone(), Role::Admin)
            .with_phone("050-0000000")
            .with_admin_code(ADMIN_CODE),
    )?;
    world.admin = Some(admin_session);
    for name in [first, second] {
        let session = enroll(
            world,
            &name,
            CreateProfileRequest::new(name.clone(), Role::Volunteer),
        )?;
        world.volunteers.insert(name, session);
    }
    Ok(())
}

#[given(r#"the admin has posted a "{kind}" task "{title}" with "{urgency}" urgency"#)]
fn admin_has_posted(
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

#[given(r#"volunteer "{name}" has claimed the task"#)]
fn volunteer_has_claimed(world: &mut LifecycleWorld, name: String) -> Result<(), eyre::Report> {
    let task_id = world.task()?.id();
    let result = run_async(world.lifecycle.claim_task(world.volunteer(&name)?, task_id));
    world.record(result)?;
    if let Some(err) = world.last_error.take() {
        return Err(eyre::eyre!("claim in scenario setup failed: {err}"));
    }
    Ok(())
}

#[given(r#"the push transport reports the token of "{name}" as unregistered"#)]
fn transport_rejects_token(world: &mut LifecycleWorld, name: String) -> Result<(), eyre::Report> {
    world.transport.mark_stale(token_for(&name)?)?;
    Ok(())
}
