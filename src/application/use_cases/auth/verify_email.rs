use chrono::Utc;

use crate::application::ports::user_repository::{UserRepository, UserRow};

pub struct VerifyEmail<'a, R: UserRepository + ?Sized> {
    pub repo: &'a R,
}

#[derive(Debug)]
pub enum VerifyEmailOutcome {
    Verified(UserRow),
    Invalid,
    Expired,
}

impl<'a, R: UserRepository + ?Sized> VerifyEmail<'a, R> {
    pub async fn execute(&self, token: &str) -> anyhow::Result<VerifyEmailOutcome> {
        let lookup = match self.repo.find_by_email_token(token).await? {
            Some(l) => l,
            None => return Ok(VerifyEmailOutcome::Invalid),
        };
        if lookup.expires_at < Utc::now() {
            return Ok(VerifyEmailOutcome::Expired);
        }
        if lookup.user.email_verified {
            // Token row still present, user already confirmed. Treat as success.
            return Ok(VerifyEmailOutcome::Verified(lookup.user));
        }
        self.repo.mark_email_verified(lookup.user.id).await?;
        Ok(VerifyEmailOutcome::Verified(UserRow {
            email_verified: true,
            ..lookup.user
        }))
    }
}
