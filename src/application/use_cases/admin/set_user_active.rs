use uuid::Uuid;

use crate::application::ports::user_repository::{UserRepository, UserRow};

pub struct SetUserActive<'a, U: UserRepository + ?Sized> {
    pub users: &'a U,
}

#[derive(Debug)]
pub enum SetUserActiveOutcome {
    Updated(UserRow),
    NotFound,
    /// An admin cannot lock themselves out.
    SelfDeactivation,
}

impl<'a, U: UserRepository + ?Sized> SetUserActive<'a, U> {
    pub async fn execute(
        &self,
        admin_id: Uuid,
        user_id: Uuid,
        is_active: bool,
    ) -> anyhow::Result<SetUserActiveOutcome> {
        if user_id == admin_id && !is_active {
            return Ok(SetUserActiveOutcome::SelfDeactivation);
        }
        match self.users.set_active(user_id, is_active).await? {
            Some(row) => Ok(SetUserActiveOutcome::Updated(UserRow {
                password_hash: None,
                ..row
            })),
            None => Ok(SetUserActiveOutcome::NotFound),
        }
    }
}
