//! Project lifecycle use-cases.
//!
//! # Responsibility
//! - Create, list, read, update and delete projects for their owner.
//! - Notify the owner on status change and every distinct assignee on delete.
//!
//! # Invariants
//! - Only the owner may read or mutate a project.
//! - A status-change notification is written after the update is stored,
//!   and only when the supplied status differs from the stored one.
//! - Delete fan-out recipients come from one read of the project's tasks and
//!   are deduplicated before any write; the project row is removed last.

use super::notification_service::NotificationService;
use super::{observe, ServiceError, ServiceResult};
use crate::access::{can_mutate_project, can_read_project, require, Action, Principal, ProjectFacts};
use crate::model::notification::{project_deleted_message, status_changed_message};
use crate::model::project::{NewProject, Project, ProjectId, ProjectPatch, ProjectView};
use crate::model::user::UserId;
use crate::pagination::{Page, PageLimits, PageRequest};
use crate::repo::notification_repo::NotificationRepository;
use crate::repo::project_repo::{ProjectListQuery, ProjectRepository};
use crate::repo::task_repo::TaskRepository;
use log::info;
use std::collections::BTreeSet;

const MODULE: &str = "project";

pub struct ProjectService<P, T, N>
where
    P: ProjectRepository,
    T: TaskRepository,
    N: NotificationRepository,
{
    projects: P,
    tasks: T,
    notifier: NotificationService<N>,
    limits: PageLimits,
}

impl<P, T, N> ProjectService<P, T, N>
where
    P: ProjectRepository,
    T: TaskRepository,
    N: NotificationRepository,
{
    pub fn new(projects: P, tasks: T, notifier: NotificationService<N>) -> Self {
        Self {
            projects,
            tasks,
            notifier,
            limits: PageLimits::projects(),
        }
    }

    pub fn with_page_limits(mut self, limits: PageLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Creates a `PLANNED` project owned by the principal.
    pub fn create(
        &self,
        principal: &Principal,
        name: &str,
        description: Option<&str>,
    ) -> ServiceResult<Project> {
        observe("project_create", MODULE, || {
            let new_project = NewProject::new(principal.user_id, name, description)?;
            let project = self.projects.create_project(&new_project)?;
            info!(
                "event=project_create module={MODULE} status=ok project_id={} owner_id={}",
                project.id, project.owner_id
            );
            Ok(project)
        })
    }

    /// Lists the principal's own projects, newest first, with their tasks.
    ///
    /// A non-blank `search` narrows results to projects whose name or
    /// description contains it, ignoring case.
    pub fn list(
        &self,
        principal: &Principal,
        request: &PageRequest,
        search: Option<&str>,
    ) -> ServiceResult<Page<ProjectView>> {
        observe("project_list", MODULE, || {
            let window = request.resolve(self.limits)?;
            let query = ProjectListQuery {
                owner_id: principal.user_id,
                search: search
                    .map(str::trim)
                    .filter(|value| !value.is_empty())
                    .map(str::to_string),
                window,
            };
            let (total, data) = self.projects.page_projects(&query)?;
            Ok(Page {
                data,
                meta: window.meta(total),
            })
        })
    }

    /// Reads one project with its tasks.
    pub fn get(&self, principal: &Principal, project_id: ProjectId) -> ServiceResult<ProjectView> {
        observe("project_get", MODULE, || {
            let project = self.load(project_id)?;
            require(
                can_read_project(principal, ProjectFacts::from(&project)),
                Action::ReadProject,
            )?;
            self.view(project)
        })
    }

    /// Applies a partial update and notifies the owner on status change.
    pub fn update(
        &self,
        principal: &Principal,
        project_id: ProjectId,
        patch: &ProjectPatch,
    ) -> ServiceResult<ProjectView> {
        observe("project_update", MODULE, || {
            let current = self.load(project_id)?;
            require(
                can_mutate_project(principal, ProjectFacts::from(&current)),
                Action::MutateProject,
            )?;

            let next = patch.apply_to(&current)?;
            let updated = self.projects.update_project(&next)?;

            let status_changed = patch
                .status
                .is_some_and(|status| status != current.status);
            if status_changed {
                // The owner is notified even though they made the change.
                self.notifier.emit(
                    updated.owner_id,
                    &status_changed_message(&updated.name, updated.status.as_str()),
                )?;
            }

            info!(
                "event=project_update module={MODULE} status=ok project_id={project_id} status_changed={status_changed}"
            );
            self.view(updated)
        })
    }

    /// Deletes the project after notifying each distinct task assignee once.
    ///
    /// Tasks cascade with the project; emitted notifications are kept.
    pub fn delete(&self, principal: &Principal, project_id: ProjectId) -> ServiceResult<()> {
        observe("project_delete", MODULE, || {
            let project = self.load(project_id)?;
            require(
                can_mutate_project(principal, ProjectFacts::from(&project)),
                Action::MutateProject,
            )?;

            let tasks = self.tasks.list_project_tasks(project_id, None)?;
            let recipients: BTreeSet<UserId> = tasks
                .iter()
                .filter_map(|view| view.task.assigned_user_id)
                .collect();

            let message = project_deleted_message(&project.name);
            for recipient_id in &recipients {
                self.notifier.emit(*recipient_id, &message)?;
            }

            self.projects.delete_project(project_id)?;
            info!(
                "event=project_delete module={MODULE} status=ok project_id={project_id} tasks={} notified={}",
                tasks.len(),
                recipients.len()
            );
            Ok(())
        })
    }

    fn load(&self, project_id: ProjectId) -> ServiceResult<Project> {
        self.projects
            .get_project(project_id)?
            .ok_or_else(|| ServiceError::not_found("project", project_id))
    }

    fn view(&self, project: Project) -> ServiceResult<ProjectView> {
        let tasks = self.tasks.list_project_tasks(project.id, None)?;
        Ok(ProjectView {
            task_count: tasks.len() as u64,
            project,
            tasks,
        })
    }
}
