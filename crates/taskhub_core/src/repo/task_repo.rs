//! Task repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist tasks and load them joined with project and assignee summaries.
//! - Apply task visibility as a SQL predicate for global listings.
//!
//! # Invariants
//! - Visible tasks are those whose project the viewer owns or that are
//!   assigned to the viewer; rows outside that set are never loaded.
//! - Listings are ordered by `created_at DESC`.

use super::{
    ensure_schema_ready, parse_optional_uuid, parse_uuid, placeholders, RepoError, RepoResult,
    ID_CHUNK_SIZE, NOW_MILLIS_SQL,
};
use crate::model::project::{ProjectId, ProjectSummary};
use crate::model::task::{
    NewTask, Task, TaskFilter, TaskId, TaskOwnership, TaskStatus, TaskView,
};
use crate::model::user::{UserId, UserSummary};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

const TASK_VIEW_SELECT_SQL: &str = "SELECT
    t.id AS id,
    t.title AS title,
    t.description AS description,
    t.status AS status,
    t.project_id AS project_id,
    t.assigned_user_id AS assigned_user_id,
    t.created_at AS created_at,
    t.updated_at AS updated_at,
    p.name AS project_name,
    p.description AS project_description,
    p.owner_id AS project_owner_id,
    u.name AS assignee_name,
    u.email AS assignee_email
FROM tasks t
INNER JOIN projects p ON p.id = t.project_id
LEFT JOIN users u ON u.id = t.assigned_user_id";

const TASK_ORDER_SQL: &str = " ORDER BY t.created_at DESC, t.rowid DESC";

pub trait TaskRepository {
    fn create_task(&self, task: &NewTask) -> RepoResult<TaskView>;
    /// Loads a task together with its project owner for access decisions.
    fn get_task_ownership(&self, id: TaskId) -> RepoResult<Option<TaskOwnership>>;
    fn get_task_view(&self, id: TaskId) -> RepoResult<Option<TaskView>>;
    /// Tasks visible to `viewer_id`, narrowed by the equality filters.
    fn list_visible_tasks(&self, viewer_id: UserId, filter: &TaskFilter)
        -> RepoResult<Vec<TaskView>>;
    fn list_project_tasks(
        &self,
        project_id: ProjectId,
        status: Option<TaskStatus>,
    ) -> RepoResult<Vec<TaskView>>;
    /// Persists title, description and status of an existing task.
    fn update_task(&self, task: &Task) -> RepoResult<TaskView>;
    fn delete_task(&self, id: TaskId) -> RepoResult<()>;
}

pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn)?;
        Ok(Self { conn })
    }

    fn get_columns(&self, id: TaskId) -> RepoResult<Option<TaskColumns>> {
        let row = self
            .conn
            .query_row(
                &format!("{TASK_VIEW_SELECT_SQL} WHERE t.id = ?1;"),
                [id.to_string()],
                read_task_columns,
            )
            .optional()?;
        Ok(row)
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn create_task(&self, task: &NewTask) -> RepoResult<TaskView> {
        self.conn.execute(
            "INSERT INTO tasks (id, title, description, status, project_id, assigned_user_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                task.id.to_string(),
                task.title,
                task.description,
                TaskStatus::Todo.as_str(),
                task.project_id.to_string(),
                task.assigned_user_id.map(|id| id.to_string()),
            ],
        )?;

        self.get_task_view(task.id)?.ok_or_else(|| {
            RepoError::InvalidData(format!("created task {} missing on read-back", task.id))
        })
    }

    fn get_task_ownership(&self, id: TaskId) -> RepoResult<Option<TaskOwnership>> {
        self.get_columns(id)?
            .map(TaskColumns::into_ownership)
            .transpose()
    }

    fn get_task_view(&self, id: TaskId) -> RepoResult<Option<TaskView>> {
        self.get_columns(id)?.map(TaskColumns::into_view).transpose()
    }

    fn list_visible_tasks(
        &self,
        viewer_id: UserId,
        filter: &TaskFilter,
    ) -> RepoResult<Vec<TaskView>> {
        let viewer = viewer_id.to_string();
        let mut sql = format!(
            "{TASK_VIEW_SELECT_SQL} WHERE (p.owner_id = ? OR t.assigned_user_id = ?)"
        );
        let mut bind_values = vec![Value::Text(viewer.clone()), Value::Text(viewer)];

        if let Some(status) = filter.status {
            sql.push_str(" AND t.status = ?");
            bind_values.push(Value::Text(status.as_str().to_string()));
        }
        if let Some(assignee) = filter.assigned_user_id {
            sql.push_str(" AND t.assigned_user_id = ?");
            bind_values.push(Value::Text(assignee.to_string()));
        }
        sql.push_str(TASK_ORDER_SQL);

        query_views(self.conn, &sql, bind_values)
    }

    fn list_project_tasks(
        &self,
        project_id: ProjectId,
        status: Option<TaskStatus>,
    ) -> RepoResult<Vec<TaskView>> {
        let mut sql = format!("{TASK_VIEW_SELECT_SQL} WHERE t.project_id = ?");
        let mut bind_values = vec![Value::Text(project_id.to_string())];

        if let Some(status) = status {
            sql.push_str(" AND t.status = ?");
            bind_values.push(Value::Text(status.as_str().to_string()));
        }
        sql.push_str(TASK_ORDER_SQL);

        query_views(self.conn, &sql, bind_values)
    }

    fn update_task(&self, task: &Task) -> RepoResult<TaskView> {
        let changed = self.conn.execute(
            &format!(
                "UPDATE tasks
                 SET
                    title = ?2,
                    description = ?3,
                    status = ?4,
                    updated_at = {NOW_MILLIS_SQL}
                 WHERE id = ?1;"
            ),
            params![
                task.id.to_string(),
                task.title,
                task.description,
                task.status.as_str(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "task",
                id: task.id,
            });
        }

        self.get_task_view(task.id)?.ok_or(RepoError::NotFound {
            entity: "task",
            id: task.id,
        })
    }

    fn delete_task(&self, id: TaskId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM tasks WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: "task", id });
        }
        Ok(())
    }
}

fn query_views(conn: &Connection, sql: &str, bind_values: Vec<Value>) -> RepoResult<Vec<TaskView>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params_from_iter(bind_values), read_task_columns)?;
    let mut tasks = Vec::new();
    for row in rows {
        tasks.push(row?.into_view()?);
    }
    Ok(tasks)
}

/// Tasks of every project in `project_ids`, newest first.
///
/// Takes the connection directly so callers can read inside their own
/// transaction.
pub(crate) fn list_tasks_for_projects(
    conn: &Connection,
    project_ids: &[ProjectId],
) -> RepoResult<Vec<TaskView>> {
    let mut tasks = Vec::new();
    for chunk in project_ids.chunks(ID_CHUNK_SIZE) {
        let sql = format!(
            "{TASK_VIEW_SELECT_SQL} WHERE t.project_id IN ({}){TASK_ORDER_SQL}",
            placeholders(chunk.len())
        );
        let bind_values = chunk
            .iter()
            .map(|id| Value::Text(id.to_string()))
            .collect();
        tasks.extend(query_views(conn, &sql, bind_values)?);
    }
    Ok(tasks)
}

struct TaskColumns {
    id: String,
    title: String,
    description: Option<String>,
    status: String,
    project_id: String,
    assigned_user_id: Option<String>,
    created_at: i64,
    updated_at: i64,
    project_name: String,
    project_description: Option<String>,
    project_owner_id: String,
    assignee_name: Option<String>,
    assignee_email: Option<String>,
}

impl TaskColumns {
    fn task(&self) -> RepoResult<Task> {
        let status = self.status.parse::<TaskStatus>().map_err(|_| {
            RepoError::InvalidData(format!("invalid task status `{}` in tasks.status", self.status))
        })?;
        Ok(Task {
            id: parse_uuid(&self.id, "tasks.id")?,
            title: self.title.clone(),
            description: self.description.clone(),
            status,
            project_id: parse_uuid(&self.project_id, "tasks.project_id")?,
            assigned_user_id: parse_optional_uuid(
                self.assigned_user_id.clone(),
                "tasks.assigned_user_id",
            )?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }

    fn into_ownership(self) -> RepoResult<TaskOwnership> {
        Ok(TaskOwnership {
            task: self.task()?,
            project_owner_id: parse_uuid(&self.project_owner_id, "projects.owner_id")?,
        })
    }

    fn into_view(self) -> RepoResult<TaskView> {
        let task = self.task()?;
        let assigned_user = match (task.assigned_user_id, self.assignee_name, self.assignee_email) {
            (Some(id), Some(name), Some(email)) => Some(UserSummary { id, name, email }),
            (None, _, _) => None,
            (Some(id), _, _) => {
                return Err(RepoError::InvalidData(format!(
                    "task {} references missing assignee {id}",
                    task.id
                )));
            }
        };
        Ok(TaskView {
            task,
            project: ProjectSummary {
                name: self.project_name,
                description: self.project_description,
            },
            assigned_user,
        })
    }
}

fn read_task_columns(row: &Row<'_>) -> rusqlite::Result<TaskColumns> {
    Ok(TaskColumns {
        id: row.get("id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        status: row.get("status")?,
        project_id: row.get("project_id")?,
        assigned_user_id: row.get("assigned_user_id")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        project_name: row.get("project_name")?,
        project_description: row.get("project_description")?,
        project_owner_id: row.get("project_owner_id")?,
        assignee_name: row.get("assignee_name")?,
        assignee_email: row.get("assignee_email")?,
    })
}
