//! Project repository contract and SQLite implementation.
//!
//! # Invariants
//! - Listing is scoped to one owner and ordered by `created_at DESC`.
//! - A listed page, its total and its embedded tasks come from one snapshot.
//! - Search folds case with Unicode lowercase rules on both sides.
//! - `owner_id` is never written after insert.
//! - Deleting a project cascades to its tasks through the foreign key.

use super::task_repo::list_tasks_for_projects;
use super::{
    ensure_schema_ready, like_contains_pattern, parse_uuid, RepoError, RepoResult,
    NOW_MILLIS_SQL,
};
use crate::db::CASEFOLD_FN;
use crate::model::project::{NewProject, Project, ProjectId, ProjectStatus, ProjectView};
use crate::model::task::TaskView;
use crate::model::user::UserId;
use crate::pagination::PageWindow;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::collections::HashMap;

const PROJECT_SELECT_SQL: &str = "SELECT
    id,
    name,
    description,
    status,
    owner_id,
    created_at,
    updated_at
FROM projects";

/// Owner-scoped search for the paginated project listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectListQuery {
    pub owner_id: UserId,
    /// Case-insensitive contains-match over name and description.
    /// Expected trimmed and non-blank.
    pub search: Option<String>,
    pub window: PageWindow,
}

pub trait ProjectRepository {
    fn create_project(&self, project: &NewProject) -> RepoResult<Project>;
    fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>>;
    /// Returns `(total, window)` with each project's tasks, read from one
    /// snapshot.
    fn page_projects(&self, query: &ProjectListQuery) -> RepoResult<(u64, Vec<ProjectView>)>;
    /// Persists name, description and status of an existing project.
    fn update_project(&self, project: &Project) -> RepoResult<Project>;
    fn delete_project(&self, id: ProjectId) -> RepoResult<()>;
}

pub struct SqliteProjectRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProjectRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn)?;
        Ok(Self { conn })
    }
}

impl ProjectRepository for SqliteProjectRepository<'_> {
    fn create_project(&self, project: &NewProject) -> RepoResult<Project> {
        self.conn.execute(
            "INSERT INTO projects (id, name, description, status, owner_id)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                project.id.to_string(),
                project.name,
                project.description,
                ProjectStatus::Planned.as_str(),
                project.owner_id.to_string(),
            ],
        )?;

        self.get_project(project.id)?.ok_or_else(|| {
            RepoError::InvalidData(format!(
                "created project {} missing on read-back",
                project.id
            ))
        })
    }

    fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>> {
        let row = self
            .conn
            .query_row(
                &format!("{PROJECT_SELECT_SQL} WHERE id = ?1;"),
                [id.to_string()],
                read_project_columns,
            )
            .optional()?;
        row.map(ProjectColumns::into_project).transpose()
    }

    fn page_projects(&self, query: &ProjectListQuery) -> RepoResult<(u64, Vec<ProjectView>)> {
        let mut filter = String::from(" WHERE owner_id = ?");
        let mut bind_values: Vec<Value> = vec![Value::Text(query.owner_id.to_string())];

        if let Some(search) = query.search.as_deref() {
            filter.push_str(&format!(
                " AND ({CASEFOLD_FN}(name) LIKE ? ESCAPE '\\'
                   OR {CASEFOLD_FN}(COALESCE(description, '')) LIKE ? ESCAPE '\\')"
            ));
            let pattern = like_contains_pattern(&search.to_lowercase());
            bind_values.push(Value::Text(pattern.clone()));
            bind_values.push(Value::Text(pattern));
        }

        let tx = self.conn.unchecked_transaction()?;

        let total: i64 = tx.query_row(
            &format!("SELECT COUNT(*) FROM projects{filter};"),
            params_from_iter(bind_values.iter()),
            |row| row.get(0),
        )?;

        let mut window_values = bind_values;
        window_values.push(Value::Integer(i64::from(query.window.limit)));
        window_values.push(Value::Integer(offset_value(query.window)?));

        let mut projects = Vec::new();
        {
            let mut stmt = tx.prepare(&format!(
                "{PROJECT_SELECT_SQL}{filter}
                 ORDER BY created_at DESC, rowid DESC
                 LIMIT ? OFFSET ?;"
            ))?;
            let rows = stmt.query_map(params_from_iter(window_values), read_project_columns)?;
            for row in rows {
                projects.push(row?.into_project()?);
            }
        }

        let project_ids: Vec<ProjectId> = projects.iter().map(|project| project.id).collect();
        let mut tasks_by_project: HashMap<ProjectId, Vec<TaskView>> = HashMap::new();
        for view in list_tasks_for_projects(&tx, &project_ids)? {
            tasks_by_project
                .entry(view.task.project_id)
                .or_default()
                .push(view);
        }
        tx.commit()?;

        let views = projects
            .into_iter()
            .map(|project| {
                let tasks = tasks_by_project.remove(&project.id).unwrap_or_default();
                ProjectView {
                    task_count: tasks.len() as u64,
                    project,
                    tasks,
                }
            })
            .collect();
        Ok((count_value(total)?, views))
    }

    fn update_project(&self, project: &Project) -> RepoResult<Project> {
        let changed = self.conn.execute(
            &format!(
                "UPDATE projects
                 SET
                    name = ?2,
                    description = ?3,
                    status = ?4,
                    updated_at = {NOW_MILLIS_SQL}
                 WHERE id = ?1;"
            ),
            params![
                project.id.to_string(),
                project.name,
                project.description,
                project.status.as_str(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "project",
                id: project.id,
            });
        }

        self.get_project(project.id)?.ok_or(RepoError::NotFound {
            entity: "project",
            id: project.id,
        })
    }

    fn delete_project(&self, id: ProjectId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM projects WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "project",
                id,
            });
        }
        Ok(())
    }
}

pub(crate) fn offset_value(window: PageWindow) -> RepoResult<i64> {
    i64::try_from(window.offset())
        .map_err(|_| RepoError::InvalidData(format!("page offset {} out of range", window.offset())))
}

pub(crate) fn count_value(total: i64) -> RepoResult<u64> {
    u64::try_from(total).map_err(|_| RepoError::InvalidData(format!("negative row count {total}")))
}

struct ProjectColumns {
    id: String,
    name: String,
    description: Option<String>,
    status: String,
    owner_id: String,
    created_at: i64,
    updated_at: i64,
}

impl ProjectColumns {
    fn into_project(self) -> RepoResult<Project> {
        let status = self.status.parse::<ProjectStatus>().map_err(|_| {
            RepoError::InvalidData(format!(
                "invalid project status `{}` in projects.status",
                self.status
            ))
        })?;
        Ok(Project {
            id: parse_uuid(&self.id, "projects.id")?,
            name: self.name,
            description: self.description,
            status,
            owner_id: parse_uuid(&self.owner_id, "projects.owner_id")?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn read_project_columns(row: &Row<'_>) -> rusqlite::Result<ProjectColumns> {
    Ok(ProjectColumns {
        id: row.get("id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        status: row.get("status")?,
        owner_id: row.get("owner_id")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
