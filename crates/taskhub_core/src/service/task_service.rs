//! Task lifecycle use-cases.
//!
//! # Invariants
//! - Only the project owner creates tasks or lists a project's tasks.
//! - The project owner and the task assignee may read a single task.
//! - The project owner and the task assignee may update or delete a task.
//! - Global listing never loads tasks outside the principal's visibility.
//! - Status transitions are unconstrained.

use super::{observe, ServiceError, ServiceResult};
use crate::access::{
    can_mutate_project, can_mutate_task, can_read_task, require, Action, Principal,
    ProjectFacts, TaskFacts,
};
use crate::model::project::{Project, ProjectId};
use crate::model::task::{
    NewTask, TaskDraft, TaskFilter, TaskId, TaskOwnership, TaskPatch, TaskStatus, TaskView,
};
use crate::repo::project_repo::ProjectRepository;
use crate::repo::task_repo::TaskRepository;
use crate::repo::user_repo::UserRepository;
use log::info;

const MODULE: &str = "task";

pub struct TaskService<P, T, U>
where
    P: ProjectRepository,
    T: TaskRepository,
    U: UserRepository,
{
    projects: P,
    tasks: T,
    users: U,
}

impl<P, T, U> TaskService<P, T, U>
where
    P: ProjectRepository,
    T: TaskRepository,
    U: UserRepository,
{
    pub fn new(projects: P, tasks: T, users: U) -> Self {
        Self {
            projects,
            tasks,
            users,
        }
    }

    /// Creates a `TODO` task in a project the principal owns.
    pub fn create(
        &self,
        principal: &Principal,
        project_id: ProjectId,
        draft: &TaskDraft,
    ) -> ServiceResult<TaskView> {
        observe("task_create", MODULE, || {
            self.load_owned_project(principal, project_id)?;
            let new_task = NewTask::new(project_id, draft)?;
            if let Some(assignee_id) = new_task.assigned_user_id {
                if self.users.get_user(assignee_id)?.is_none() {
                    return Err(ServiceError::not_found("user", assignee_id));
                }
            }

            let created = self.tasks.create_task(&new_task)?;
            info!(
                "event=task_create module={MODULE} status=ok task_id={} project_id={project_id} assigned={}",
                created.task.id,
                created.task.assigned_user_id.is_some()
            );
            Ok(created)
        })
    }

    /// Lists every task the principal can see: tasks in projects they own
    /// and tasks assigned to them, narrowed by `filter`.
    pub fn list_global(
        &self,
        principal: &Principal,
        filter: &TaskFilter,
    ) -> ServiceResult<Vec<TaskView>> {
        observe("task_list_global", MODULE, || {
            Ok(self.tasks.list_visible_tasks(principal.user_id, filter)?)
        })
    }

    /// Reads one task with its project and assignee summaries.
    pub fn get(&self, principal: &Principal, task_id: TaskId) -> ServiceResult<TaskView> {
        observe("task_get", MODULE, || {
            let ownership = self.load_task(task_id)?;
            require(
                can_read_task(principal, TaskFacts::from(&ownership)),
                Action::ReadTask,
            )?;
            self.tasks
                .get_task_view(task_id)?
                .ok_or_else(|| ServiceError::not_found("task", task_id))
        })
    }

    /// Lists one project's tasks; owner only.
    pub fn list_for_project(
        &self,
        principal: &Principal,
        project_id: ProjectId,
        status: Option<TaskStatus>,
    ) -> ServiceResult<Vec<TaskView>> {
        observe("task_list_project", MODULE, || {
            self.load_owned_project(principal, project_id)?;
            Ok(self.tasks.list_project_tasks(project_id, status)?)
        })
    }

    pub fn update(
        &self,
        principal: &Principal,
        task_id: TaskId,
        patch: &TaskPatch,
    ) -> ServiceResult<TaskView> {
        observe("task_update", MODULE, || {
            let ownership = self.load_mutable_task(principal, task_id)?;
            let next = patch.apply_to(&ownership.task)?;
            let updated = self.tasks.update_task(&next)?;
            info!(
                "event=task_update module={MODULE} status=ok task_id={task_id} task_status={}",
                updated.task.status
            );
            Ok(updated)
        })
    }

    pub fn delete(&self, principal: &Principal, task_id: TaskId) -> ServiceResult<()> {
        observe("task_delete", MODULE, || {
            self.load_mutable_task(principal, task_id)?;
            self.tasks.delete_task(task_id)?;
            info!("event=task_delete module={MODULE} status=ok task_id={task_id}");
            Ok(())
        })
    }

    fn load_owned_project(
        &self,
        principal: &Principal,
        project_id: ProjectId,
    ) -> ServiceResult<Project> {
        let project = self
            .projects
            .get_project(project_id)?
            .ok_or_else(|| ServiceError::not_found("project", project_id))?;
        require(
            can_mutate_project(principal, ProjectFacts::from(&project)),
            Action::MutateProject,
        )?;
        Ok(project)
    }

    fn load_task(&self, task_id: TaskId) -> ServiceResult<TaskOwnership> {
        self.tasks
            .get_task_ownership(task_id)?
            .ok_or_else(|| ServiceError::not_found("task", task_id))
    }

    fn load_mutable_task(
        &self,
        principal: &Principal,
        task_id: TaskId,
    ) -> ServiceResult<TaskOwnership> {
        let ownership = self.load_task(task_id)?;
        require(
            can_mutate_task(principal, TaskFacts::from(&ownership)),
            Action::MutateTask,
        )?;
        Ok(ownership)
    }
}
