//! User repository contract and SQLite implementation.

use super::{ensure_schema_ready, map_unique_violation, parse_uuid, RepoError, RepoResult};
use crate::model::user::{NewUser, User, UserId, UserPatch};
use rusqlite::{params, Connection, OptionalExtension, Row};

const USER_SELECT_SQL: &str = "SELECT id, name, email, created_at FROM users";

pub trait UserRepository {
    fn create_user(&self, user: &NewUser) -> RepoResult<User>;
    fn get_user(&self, id: UserId) -> RepoResult<Option<User>>;
    /// All users, oldest first.
    fn list_users(&self) -> RepoResult<Vec<User>>;
    /// Applies supplied fields only and returns the stored result.
    fn update_user(&self, id: UserId, patch: &UserPatch) -> RepoResult<User>;
    /// Deletes the user; owned projects and notifications cascade.
    fn delete_user(&self, id: UserId) -> RepoResult<()>;
}

pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn)?;
        Ok(Self { conn })
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(&self, user: &NewUser) -> RepoResult<User> {
        self.conn
            .execute(
                "INSERT INTO users (id, name, email) VALUES (?1, ?2, ?3);",
                params![user.id.to_string(), user.name, user.email],
            )
            .map_err(|err| map_unique_violation(err, "email already registered"))?;

        self.get_user(user.id)?.ok_or_else(|| {
            RepoError::InvalidData(format!("created user {} missing on read-back", user.id))
        })
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        let row = self
            .conn
            .query_row(
                &format!("{USER_SELECT_SQL} WHERE id = ?1;"),
                [id.to_string()],
                read_user_columns,
            )
            .optional()?;
        row.map(UserColumns::into_user).transpose()
    }

    fn list_users(&self) -> RepoResult<Vec<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} ORDER BY created_at ASC, rowid ASC;"))?;
        let rows = stmt.query_map([], read_user_columns)?;
        let mut users = Vec::new();
        for row in rows {
            users.push(row?.into_user()?);
        }
        Ok(users)
    }

    fn update_user(&self, id: UserId, patch: &UserPatch) -> RepoResult<User> {
        let changed = self
            .conn
            .execute(
                "UPDATE users
                 SET
                    name = COALESCE(?2, name),
                    email = COALESCE(?3, email)
                 WHERE id = ?1;",
                params![id.to_string(), patch.name, patch.email],
            )
            .map_err(|err| map_unique_violation(err, "email already registered"))?;

        if changed == 0 {
            return Err(RepoError::NotFound { entity: "user", id });
        }

        self.get_user(id)?
            .ok_or(RepoError::NotFound { entity: "user", id })
    }

    fn delete_user(&self, id: UserId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM users WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: "user", id });
        }
        Ok(())
    }
}

struct UserColumns {
    id: String,
    name: String,
    email: String,
    created_at: i64,
}

impl UserColumns {
    fn into_user(self) -> RepoResult<User> {
        Ok(User {
            id: parse_uuid(&self.id, "users.id")?,
            name: self.name,
            email: self.email,
            created_at: self.created_at,
        })
    }
}

fn read_user_columns(row: &Row<'_>) -> rusqlite::Result<UserColumns> {
    Ok(UserColumns {
        id: row.get("id")?,
        name: row.get("name")?,
        email: row.get("email")?,
        created_at: row.get("created_at")?,
    })
}
