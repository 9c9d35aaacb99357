use anyhow::anyhow;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHasher};
use chrono::Utc;
use password_hash::rand_core::OsRng;

use crate::application::ports::user_repository::UserRepository;

pub struct ResetPassword<'a, R: UserRepository + ?Sized> {
    pub repo: &'a R,
}

#[derive(Debug)]
pub enum ResetPasswordOutcome {
    Done,
    Invalid,
    Expired,
    WeakPassword,
}

impl<'a, R: UserRepository + ?Sized> ResetPassword<'a, R> {
    pub async fn execute(
        &self,
        token: &str,
        new_password: &str,
    ) -> anyhow::Result<ResetPasswordOutcome> {
        if new_password.len() < 8 {
            return Ok(ResetPasswordOutcome::WeakPassword);
        }
        let lookup = match self.repo.find_by_reset_token(token).await? {
            Some(l) => l,
            None => return Ok(ResetPasswordOutcome::Invalid),
        };
        if lookup.expires_at < Utc::now() {
            return Ok(ResetPasswordOutcome::Expired);
        }
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(new_password.as_bytes(), &salt)
            .map_err(|e| anyhow!("hash password: {e}"))?
            .to_string();
        self.repo.reset_password(lookup.user.id, &hash).await?;
        Ok(ResetPasswordOutcome::Done)
    }
}
