#![allow(dead_code)]

use rusqlite::Connection;
use taskhub_core::db::open_db_in_memory;
use taskhub_core::{
    CoreServices, PageRequest, PaginationSettings, Principal, Project, ProjectPatch,
    ProjectStatus, TaskDraft, TaskView, UserId,
};

pub fn open() -> Connection {
    open_db_in_memory().unwrap()
}

pub fn services(conn: &Connection) -> CoreServices<'_> {
    CoreServices::new(conn, &PaginationSettings::default()).unwrap()
}

pub fn register(services: &CoreServices<'_>, name: &str) -> Principal {
    let user = services
        .users
        .register(name, &format!("{}@example.com", name.to_lowercase()))
        .unwrap();
    Principal::new(user.id)
}

pub fn project(services: &CoreServices<'_>, owner: &Principal, name: &str) -> Project {
    services.projects.create(owner, name, None).unwrap()
}

pub fn task(
    services: &CoreServices<'_>,
    owner: &Principal,
    project: &Project,
    title: &str,
    assignee: Option<UserId>,
) -> TaskView {
    services
        .tasks
        .create(
            owner,
            project.id,
            &TaskDraft {
                title: title.to_string(),
                description: None,
                assigned_user_id: assignee,
            },
        )
        .unwrap()
}

pub fn set_status(
    services: &CoreServices<'_>,
    owner: &Principal,
    project: &Project,
    status: ProjectStatus,
) {
    services
        .projects
        .update(
            owner,
            project.id,
            &ProjectPatch {
                status: Some(status),
                ..ProjectPatch::default()
            },
        )
        .unwrap();
}

/// Every message the principal has received, newest first.
pub fn messages(services: &CoreServices<'_>, principal: &Principal) -> Vec<String> {
    services
        .notifications
        .list(principal, &PageRequest::new(1, 100))
        .unwrap()
        .data
        .into_iter()
        .map(|notification| notification.message)
        .collect()
}
