//! User account use-cases.
//!
//! Registration bootstraps a user record only; credentials live upstream.
//! Updates and deletes are self-service.

use super::{observe, ServiceError, ServiceResult};
use crate::access::{can_mutate_user, require, Action, Principal};
use crate::model::user::{NewUser, User, UserId, UserPatch};
use crate::repo::user_repo::UserRepository;
use log::info;

const MODULE: &str = "user";

pub struct UserService<U: UserRepository> {
    repo: U,
}

impl<U: UserRepository> UserService<U> {
    pub fn new(repo: U) -> Self {
        Self { repo }
    }

    /// Creates a user. Duplicate emails are rejected as a conflict.
    pub fn register(&self, name: &str, email: &str) -> ServiceResult<User> {
        observe("user_register", MODULE, || {
            let new_user = NewUser::new(name, email)?;
            let user = self.repo.create_user(&new_user)?;
            info!("event=user_register module={MODULE} status=ok user_id={}", user.id);
            Ok(user)
        })
    }

    /// Lists all users with public fields only.
    pub fn list(&self) -> ServiceResult<Vec<User>> {
        observe("user_list", MODULE, || Ok(self.repo.list_users()?))
    }

    pub fn update(
        &self,
        principal: &Principal,
        user_id: UserId,
        patch: &UserPatch,
    ) -> ServiceResult<User> {
        observe("user_update", MODULE, || {
            require(can_mutate_user(principal, user_id), Action::MutateUser)?;
            let patch = patch.normalized()?;
            let user = self.repo.update_user(user_id, &patch)?;
            info!("event=user_update module={MODULE} status=ok user_id={user_id}");
            Ok(user)
        })
    }

    /// Deletes the principal's own account with everything it owns.
    pub fn delete(&self, principal: &Principal, user_id: UserId) -> ServiceResult<()> {
        observe("user_delete", MODULE, || {
            require(can_mutate_user(principal, user_id), Action::MutateUser)?;
            if self.repo.get_user(user_id)?.is_none() {
                return Err(ServiceError::not_found("user", user_id));
            }
            self.repo.delete_user(user_id)?;
            info!("event=user_delete module={MODULE} status=ok user_id={user_id}");
            Ok(())
        })
    }
}
