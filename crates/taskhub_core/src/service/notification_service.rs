//! Notification emitter and recipient-scoped inbox operations.
//!
//! # Invariants
//! - Every read and bulk write is scoped to the recipient; foreign ids are
//!   ignored without error.
//! - `emit` is reachable only from the lifecycle services in this crate.

use super::{observe, ServiceResult};
use crate::access::Principal;
use crate::model::notification::{Notification, NotificationId};
use crate::model::user::UserId;
use crate::pagination::{Page, PageLimits, PageRequest};
use crate::repo::notification_repo::NotificationRepository;
use log::info;

const MODULE: &str = "notification";

pub struct NotificationService<N: NotificationRepository> {
    repo: N,
    limits: PageLimits,
}

impl<N: NotificationRepository> NotificationService<N> {
    pub fn new(repo: N) -> Self {
        Self {
            repo,
            limits: PageLimits::notifications(),
        }
    }

    pub fn with_page_limits(mut self, limits: PageLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Lists the principal's notifications, newest first.
    pub fn list(
        &self,
        principal: &Principal,
        request: &PageRequest,
    ) -> ServiceResult<Page<Notification>> {
        observe("notification_list", MODULE, || {
            let window = request.resolve(self.limits)?;
            let (total, data) = self.repo.page_notifications(principal.user_id, window)?;
            Ok(Page {
                data,
                meta: window.meta(total),
            })
        })
    }

    /// Marks the principal's notifications in `ids` as read.
    ///
    /// Returns how many unread notifications flipped to read; ids of other
    /// recipients and already-read ids are skipped.
    pub fn mark_read(&self, principal: &Principal, ids: &[NotificationId]) -> ServiceResult<usize> {
        observe("notification_mark_read", MODULE, || {
            let changed = self.repo.mark_read(principal.user_id, ids)?;
            info!(
                "event=notification_mark_read module={MODULE} status=ok requested={} changed={changed}",
                ids.len()
            );
            Ok(changed)
        })
    }

    /// Deletes the principal's notifications in `ids`.
    pub fn delete(&self, principal: &Principal, ids: &[NotificationId]) -> ServiceResult<usize> {
        observe("notification_delete", MODULE, || {
            let removed = self.repo.delete_notifications(principal.user_id, ids)?;
            info!(
                "event=notification_delete module={MODULE} status=ok requested={} removed={removed}",
                ids.len()
            );
            Ok(removed)
        })
    }

    pub(crate) fn emit(&self, recipient_id: UserId, message: &str) -> ServiceResult<Notification> {
        let notification = self.repo.create_notification(recipient_id, message)?;
        info!(
            "event=notification_emit module={MODULE} status=ok recipient_id={recipient_id} notification_id={}",
            notification.id
        );
        Ok(notification)
    }
}
