mod common;

use common::{open, project, register, services, task};
use taskhub_core::access::{can_read_task, TaskFacts};
use taskhub_core::{
    ErrorKind, Principal, ServiceError, TaskDraft, TaskFilter, TaskPatch, TaskStatus,
};
use uuid::Uuid;

#[test]
fn created_task_starts_todo_and_appears_in_project_listing() {
    let conn = open();
    let core = services(&conn);
    let alice = register(&core, "Alice");
    let bob = register(&core, "Bob");
    let apollo = project(&core, &alice, "Apollo");

    let draft = TaskDraft {
        title: " Write docs ".to_string(),
        description: Some("user guide".to_string()),
        assigned_user_id: Some(bob.user_id),
    };
    let created = core.tasks.create(&alice, apollo.id, &draft).unwrap();
    assert_eq!(created.task.title, "Write docs");
    assert_eq!(created.task.status, TaskStatus::Todo);
    assert_eq!(created.task.project_id, apollo.id);
    assert_eq!(created.task.assigned_user_id, Some(bob.user_id));
    assert_eq!(created.project.name, "Apollo");

    let listed = core.tasks.list_for_project(&alice, apollo.id, None).unwrap();
    assert_eq!(listed, vec![created]);
}

#[test]
fn only_project_owner_creates_tasks() {
    let conn = open();
    let core = services(&conn);
    let alice = register(&core, "Alice");
    let bob = register(&core, "Bob");
    let apollo = project(&core, &alice, "Apollo");
    task(&core, &alice, &apollo, "assigned", Some(bob.user_id));

    let draft = TaskDraft {
        title: "sneaky".to_string(),
        ..TaskDraft::default()
    };
    let err = core.tasks.create(&bob, apollo.id, &draft).unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden(_)));
    assert_eq!(
        core.tasks.list_for_project(&alice, apollo.id, None).unwrap().len(),
        1
    );
}

#[test]
fn create_reports_missing_project_and_assignee() {
    let conn = open();
    let core = services(&conn);
    let alice = register(&core, "Alice");
    let apollo = project(&core, &alice, "Apollo");
    let draft = TaskDraft {
        title: "orphan".to_string(),
        ..TaskDraft::default()
    };

    let no_project = core.tasks.create(&alice, Uuid::new_v4(), &draft).unwrap_err();
    assert!(matches!(no_project, ServiceError::NotFound { entity: "project", .. }));

    let ghost = Uuid::new_v4();
    let with_ghost = TaskDraft {
        assigned_user_id: Some(ghost),
        ..draft
    };
    let no_user = core.tasks.create(&alice, apollo.id, &with_ghost).unwrap_err();
    assert!(matches!(no_user, ServiceError::NotFound { entity: "user", id } if id == ghost));
}

#[test]
fn blank_title_is_rejected() {
    let conn = open();
    let core = services(&conn);
    let alice = register(&core, "Alice");
    let apollo = project(&core, &alice, "Apollo");

    let err = core
        .tasks
        .create(&alice, apollo.id, &TaskDraft::default())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test]
fn owner_and_assignee_may_update_but_strangers_may_not() {
    let conn = open();
    let core = services(&conn);
    let alice = register(&core, "Alice");
    let bob = register(&core, "Bob");
    let mallory = register(&core, "Mallory");
    let apollo = project(&core, &alice, "Apollo");
    let created = task(&core, &alice, &apollo, "launch", Some(bob.user_id));

    let done = TaskPatch {
        status: Some(TaskStatus::Done),
        ..TaskPatch::default()
    };
    let by_assignee = core.tasks.update(&bob, created.task.id, &done).unwrap();
    assert_eq!(by_assignee.task.status, TaskStatus::Done);

    // Transitions are unconstrained.
    let reopen = TaskPatch {
        status: Some(TaskStatus::Todo),
        title: Some("relaunch".to_string()),
        ..TaskPatch::default()
    };
    let by_owner = core.tasks.update(&alice, created.task.id, &reopen).unwrap();
    assert_eq!(by_owner.task.status, TaskStatus::Todo);
    assert_eq!(by_owner.task.title, "relaunch");
    assert_eq!(by_owner.task.assigned_user_id, Some(bob.user_id));

    let denied = core.tasks.update(&mallory, created.task.id, &done).unwrap_err();
    assert_eq!(denied.kind(), ErrorKind::Forbidden);
    let denied_delete = core.tasks.delete(&mallory, created.task.id).unwrap_err();
    assert_eq!(denied_delete.kind(), ErrorKind::Forbidden);

    let stored = core.tasks.list_for_project(&alice, apollo.id, None).unwrap();
    assert_eq!(stored[0].task.status, TaskStatus::Todo);
}

#[test]
fn assignee_may_delete_task() {
    let conn = open();
    let core = services(&conn);
    let alice = register(&core, "Alice");
    let bob = register(&core, "Bob");
    let apollo = project(&core, &alice, "Apollo");
    let created = task(&core, &alice, &apollo, "launch", Some(bob.user_id));

    core.tasks.delete(&bob, created.task.id).unwrap();
    assert!(core
        .tasks
        .list_for_project(&alice, apollo.id, None)
        .unwrap()
        .is_empty());

    let again = core.tasks.delete(&bob, created.task.id).unwrap_err();
    assert!(matches!(again, ServiceError::NotFound { entity: "task", .. }));
}

#[test]
fn missing_task_is_not_found() {
    let conn = open();
    let core = services(&conn);
    let alice = register(&core, "Alice");

    let err = core
        .tasks
        .update(&alice, Uuid::new_v4(), &TaskPatch::default())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn project_listing_is_owner_only_and_filters_by_status() {
    let conn = open();
    let core = services(&conn);
    let alice = register(&core, "Alice");
    let bob = register(&core, "Bob");
    let apollo = project(&core, &alice, "Apollo");
    let assigned = task(&core, &alice, &apollo, "assigned", Some(bob.user_id));
    task(&core, &alice, &apollo, "open", None);

    let denied = core
        .tasks
        .list_for_project(&bob, apollo.id, None)
        .unwrap_err();
    assert_eq!(denied.kind(), ErrorKind::Forbidden);

    let missing = core
        .tasks
        .list_for_project(&alice, Uuid::new_v4(), None)
        .unwrap_err();
    assert_eq!(missing.kind(), ErrorKind::NotFound);

    core.tasks
        .update(
            &bob,
            assigned.task.id,
            &TaskPatch {
                status: Some(TaskStatus::InProgress),
                ..TaskPatch::default()
            },
        )
        .unwrap();
    let in_progress = core
        .tasks
        .list_for_project(&alice, apollo.id, Some(TaskStatus::InProgress))
        .unwrap();
    assert_eq!(in_progress.len(), 1);
    assert_eq!(in_progress[0].task.id, assigned.task.id);
}

#[test]
fn global_listing_shows_owned_and_assigned_tasks_only() {
    let conn = open();
    let core = services(&conn);
    let alice = register(&core, "Alice");
    let bob = register(&core, "Bob");
    let mallory = register(&core, "Mallory");
    let apollo = project(&core, &alice, "Apollo");
    let gemini = project(&core, &bob, "Gemini");

    let for_bob = task(&core, &alice, &apollo, "for bob", Some(bob.user_id));
    let unassigned = task(&core, &alice, &apollo, "unassigned", None);
    let bobs_own = task(&core, &bob, &gemini, "bob's own", None);
    let for_alice = task(&core, &bob, &gemini, "for alice", Some(alice.user_id));

    let ids = |principal: &Principal| {
        let mut ids: Vec<_> = core
            .tasks
            .list_global(principal, &TaskFilter::default())
            .unwrap()
            .into_iter()
            .map(|view| view.task.id)
            .collect();
        ids.sort_unstable();
        ids
    };
    let sorted = |mut ids: Vec<Uuid>| {
        ids.sort_unstable();
        ids
    };

    assert_eq!(
        ids(&alice),
        sorted(vec![for_bob.task.id, unassigned.task.id, for_alice.task.id])
    );
    assert_eq!(
        ids(&bob),
        sorted(vec![for_bob.task.id, bobs_own.task.id, for_alice.task.id])
    );
    assert!(ids(&mallory).is_empty());
}

#[test]
fn global_listing_applies_filters_within_visibility() {
    let conn = open();
    let core = services(&conn);
    let alice = register(&core, "Alice");
    let bob = register(&core, "Bob");
    let apollo = project(&core, &alice, "Apollo");
    let gemini = project(&core, &bob, "Gemini");

    let for_bob = task(&core, &alice, &apollo, "for bob", Some(bob.user_id));
    task(&core, &alice, &apollo, "unassigned", None);
    task(&core, &bob, &gemini, "bob keeps", Some(bob.user_id));

    let assigned_to_bob = core
        .tasks
        .list_global(
            &alice,
            &TaskFilter {
                assigned_user_id: Some(bob.user_id),
                ..TaskFilter::default()
            },
        )
        .unwrap();
    assert_eq!(assigned_to_bob.len(), 1);
    assert_eq!(assigned_to_bob[0].task.id, for_bob.task.id);
    assert_eq!(assigned_to_bob[0].project.name, "Apollo");

    let done = core
        .tasks
        .list_global(
            &alice,
            &TaskFilter {
                status: Some(TaskStatus::Done),
                ..TaskFilter::default()
            },
        )
        .unwrap();
    assert!(done.is_empty());
}

#[test]
fn global_listing_agrees_with_read_policy() {
    let conn = open();
    let core = services(&conn);
    let people: Vec<_> = ["Alice", "Bob", "Carol"]
        .into_iter()
        .map(|name| register(&core, name))
        .collect();

    let mut all = Vec::new();
    for (index, owner) in people.iter().enumerate() {
        let owned = project(&core, owner, &format!("Project {index}"));
        for assignee in people.iter().map(|p| Some(p.user_id)).chain([None]) {
            let created = task(&core, owner, &owned, "work", assignee);
            all.push((owner.user_id, created));
        }
    }

    for principal in &people {
        let visible = core
            .tasks
            .list_global(principal, &TaskFilter::default())
            .unwrap();
        let expected = all
            .iter()
            .filter(|(owner_id, view)| {
                can_read_task(
                    principal,
                    TaskFacts {
                        project_owner_id: *owner_id,
                        assignee_id: view.task.assigned_user_id,
                    },
                )
            })
            .count();
        assert_eq!(visible.len(), expected);
    }
}

#[test]
fn deleting_assignee_unassigns_their_tasks() {
    let conn = open();
    let core = services(&conn);
    let alice = register(&core, "Alice");
    let bob = register(&core, "Bob");
    let apollo = project(&core, &alice, "Apollo");
    task(&core, &alice, &apollo, "handoff", Some(bob.user_id));

    core.users.delete(&bob, bob.user_id).unwrap();

    let remaining = core.tasks.list_for_project(&alice, apollo.id, None).unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].task.assigned_user_id, None);
    assert!(remaining[0].assigned_user.is_none());
}

#[test]
fn single_task_is_readable_by_owner_and_assignee_only() {
    let conn = open();
    let core = services(&conn);
    let alice = register(&core, "Alice");
    let bob = register(&core, "Bob");
    let mallory = register(&core, "Mallory");
    let apollo = project(&core, &alice, "Apollo");
    let created = task(&core, &alice, &apollo, "launch", Some(bob.user_id));

    assert_eq!(core.tasks.get(&alice, created.task.id).unwrap(), created);
    assert_eq!(core.tasks.get(&bob, created.task.id).unwrap(), created);

    let denied = core.tasks.get(&mallory, created.task.id).unwrap_err();
    match denied {
        ServiceError::Forbidden(denial) => assert_eq!(denial.action.as_str(), "read_task"),
        other => panic!("unexpected error: {other}"),
    }

    let missing = core.tasks.get(&alice, Uuid::new_v4()).unwrap_err();
    assert_eq!(missing.kind(), ErrorKind::NotFound);
}
