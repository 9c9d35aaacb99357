use crate::application::ports::user_repository::UserRepository;
use crate::application::use_cases::auth::tokens;

pub struct ForgotPassword<'a, R: UserRepository + ?Sized> {
    pub repo: &'a R,
}

#[derive(Debug)]
pub struct PendingReset {
    pub email: String,
    pub username: String,
    pub token: String,
}

impl<'a, R: UserRepository + ?Sized> ForgotPassword<'a, R> {
    /// Returns `None` for unknown or deactivated accounts; the caller answers
    /// with the same message in every case.
    pub async fn execute(&self, email: &str) -> anyhow::Result<Option<PendingReset>> {
        let user = match self.repo.find_by_email(email).await? {
            Some(u) => u,
            None => return Ok(None),
        };
        if !user.is_active {
            return Ok(None);
        }
        let email = match user.email {
            Some(e) => e,
            None => return Ok(None),
        };
        let token = tokens::new_token();
        self.repo
            .set_reset_token(user.id, &token, tokens::reset_expiry())
            .await?;
        Ok(Some(PendingReset {
            email,
            username: user.username,
            token,
        }))
    }
}
