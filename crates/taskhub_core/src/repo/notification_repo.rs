//! Notification repository contract and SQLite implementation.
//!
//! # Invariants
//! - Every bulk write is scoped by `recipient_id`; ids owned by other
//!   recipients never match.
//! - Listing is ordered by `created_at DESC`.

use super::project_repo::{count_value, offset_value};
use super::{
    bool_to_int, ensure_schema_ready, parse_uuid, placeholders, RepoError, RepoResult,
    ID_CHUNK_SIZE,
};
use crate::model::notification::{Notification, NotificationId};
use crate::model::user::UserId;
use crate::pagination::PageWindow;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use uuid::Uuid;

const NOTIFICATION_SELECT_SQL: &str = "SELECT
    id,
    recipient_id,
    message,
    is_read,
    created_at
FROM notifications";

pub trait NotificationRepository {
    fn create_notification(&self, recipient_id: UserId, message: &str)
        -> RepoResult<Notification>;
    /// Returns `(total, window)` read from one snapshot.
    fn page_notifications(
        &self,
        recipient_id: UserId,
        window: PageWindow,
    ) -> RepoResult<(u64, Vec<Notification>)>;
    /// Marks matching unread rows as read and returns how many flipped.
    fn mark_read(&self, recipient_id: UserId, ids: &[NotificationId]) -> RepoResult<usize>;
    /// Deletes matching rows and returns how many were removed.
    fn delete_notifications(&self, recipient_id: UserId, ids: &[NotificationId])
        -> RepoResult<usize>;
}

pub struct SqliteNotificationRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNotificationRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn)?;
        Ok(Self { conn })
    }

    fn get_notification(&self, id: NotificationId) -> RepoResult<Option<Notification>> {
        let row = self
            .conn
            .query_row(
                &format!("{NOTIFICATION_SELECT_SQL} WHERE id = ?1;"),
                [id.to_string()],
                read_notification_columns,
            )
            .optional()?;
        row.map(NotificationColumns::into_notification).transpose()
    }

    /// Runs `{statement} WHERE recipient_id = ? AND id IN (...){extra_condition}`
    /// over `ids` in bounded chunks.
    fn execute_scoped(
        &self,
        statement: &str,
        extra_condition: &str,
        recipient_id: UserId,
        ids: &[NotificationId],
    ) -> RepoResult<usize> {
        if ids.is_empty() {
            return Ok(0);
        }

        let tx = self.conn.unchecked_transaction()?;
        let mut changed = 0;
        for chunk in ids.chunks(ID_CHUNK_SIZE) {
            let sql = format!(
                "{statement} WHERE recipient_id = ? AND id IN ({}){extra_condition};",
                placeholders(chunk.len())
            );
            let mut bind_values = Vec::with_capacity(chunk.len() + 1);
            bind_values.push(Value::Text(recipient_id.to_string()));
            bind_values.extend(chunk.iter().map(|id| Value::Text(id.to_string())));
            changed += tx.execute(&sql, params_from_iter(bind_values))?;
        }
        tx.commit()?;
        Ok(changed)
    }
}

impl NotificationRepository for SqliteNotificationRepository<'_> {
    fn create_notification(
        &self,
        recipient_id: UserId,
        message: &str,
    ) -> RepoResult<Notification> {
        let id = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO notifications (id, recipient_id, message, is_read)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                id.to_string(),
                recipient_id.to_string(),
                message,
                bool_to_int(false)
            ],
        )?;

        self.get_notification(id)?.ok_or_else(|| {
            RepoError::InvalidData(format!("created notification {id} missing on read-back"))
        })
    }

    fn page_notifications(
        &self,
        recipient_id: UserId,
        window: PageWindow,
    ) -> RepoResult<(u64, Vec<Notification>)> {
        let recipient = recipient_id.to_string();
        let tx = self.conn.unchecked_transaction()?;

        let total: i64 = tx.query_row(
            "SELECT COUNT(*) FROM notifications WHERE recipient_id = ?1;",
            [recipient.as_str()],
            |row| row.get(0),
        )?;

        let mut notifications = Vec::new();
        {
            let mut stmt = tx.prepare(&format!(
                "{NOTIFICATION_SELECT_SQL}
                 WHERE recipient_id = ?1
                 ORDER BY created_at DESC, rowid DESC
                 LIMIT ?2 OFFSET ?3;"
            ))?;
            let rows = stmt.query_map(
                params![recipient, i64::from(window.limit), offset_value(window)?],
                read_notification_columns,
            )?;
            for row in rows {
                notifications.push(row?.into_notification()?);
            }
        }
        tx.commit()?;

        Ok((count_value(total)?, notifications))
    }

    fn mark_read(&self, recipient_id: UserId, ids: &[NotificationId]) -> RepoResult<usize> {
        self.execute_scoped(
            "UPDATE notifications SET is_read = 1",
            " AND is_read = 0",
            recipient_id,
            ids,
        )
    }

    fn delete_notifications(
        &self,
        recipient_id: UserId,
        ids: &[NotificationId],
    ) -> RepoResult<usize> {
        self.execute_scoped("DELETE FROM notifications", "", recipient_id, ids)
    }
}

struct NotificationColumns {
    id: String,
    recipient_id: String,
    message: String,
    is_read: i64,
    created_at: i64,
}

impl NotificationColumns {
    fn into_notification(self) -> RepoResult<Notification> {
        let read = match self.is_read {
            0 => false,
            1 => true,
            other => {
                return Err(RepoError::InvalidData(format!(
                    "invalid is_read value `{other}` in notifications.is_read"
                )));
            }
        };
        Ok(Notification {
            id: parse_uuid(&self.id, "notifications.id")?,
            recipient_id: parse_uuid(&self.recipient_id, "notifications.recipient_id")?,
            message: self.message,
            read,
            created_at: self.created_at,
        })
    }
}

fn read_notification_columns(row: &Row<'_>) -> rusqlite::Result<NotificationColumns> {
    Ok(NotificationColumns {
        id: row.get("id")?,
        recipient_id: row.get("recipient_id")?,
        message: row.get("message")?,
        is_read: row.get("is_read")?,
        created_at: row.get("created_at")?,
    })
}
