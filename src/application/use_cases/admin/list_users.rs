use crate::application::ports::user_repository::{UserRepository, UserRow};

pub struct ListUsers<'a, U: UserRepository + ?Sized> {
    pub users: &'a U,
}

impl<'a, U: UserRepository + ?Sized> ListUsers<'a, U> {
    pub async fn execute(&self, limit: i64, offset: i64) -> anyhow::Result<Vec<UserRow>> {
        let rows = self.users.list_users(limit, offset).await?;
        // Hashes never leave the application layer.
        Ok(rows
            .into_iter()
            .map(|row| UserRow {
                password_hash: None,
                ..row
            })
            .collect())
    }
}
