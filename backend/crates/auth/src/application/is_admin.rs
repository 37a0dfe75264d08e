//! IsAdmin Use Case

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::{ops, with_deadline};
use crate::domain::repository::UserProvider;
use crate::domain::value_object::user_id::UserId;
use crate::error::{OpResult, WithOp};

pub struct IsAdminUseCase<U>
where
    U: UserProvider,
{
    user_repo: Arc<U>,
    config: Arc<AuthConfig>,
}

impl<U> IsAdminUseCase<U>
where
    U: UserProvider,
{
    pub fn new(user_repo: Arc<U>, config: Arc<AuthConfig>) -> Self {
        Self { user_repo, config }
    }

    pub async fn execute(&self, user_id: UserId) -> OpResult<bool> {
        let is_admin = with_deadline(
            self.config.storage_timeout,
            self.user_repo.is_admin(&user_id),
        )
        .await
        .with_op(ops::IS_ADMIN)?;

        tracing::debug!(op = ops::IS_ADMIN, user_id = %user_id, is_admin, "Checked admin flag");

        Ok(is_admin)
    }
}
