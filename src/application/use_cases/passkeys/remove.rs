use uuid::Uuid;

use crate::application::ports::passkey_repository::PasskeyRepository;

pub struct RemovePasskey<'a, R: PasskeyRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: PasskeyRepository + ?Sized> RemovePasskey<'a, R> {
    /// Returns false when the user had no credential to remove.
    pub async fn execute(&self, user_id: Uuid) -> anyhow::Result<bool> {
        self.repo.remove(user_id).await
    }
}
