use argon2::{
    Argon2,
    password_hash::{PasswordHasher, SaltString},
};
use once_cell::sync::Lazy;
use password_hash::rand_core::OsRng;
use regex::Regex;

use crate::application::ports::user_repository::{UserRepository, UserRow};
use crate::application::use_cases::auth::tokens;

static USERNAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_]{3,32}$").unwrap());

pub struct Register<'a, R: UserRepository + ?Sized> {
    pub repo: &'a R,
}

#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug)]
pub enum RegisterOutcome {
    /// Account created; the caller still has to send the verification mail.
    Created {
        user: UserRow,
        verification_token: String,
    },
    UsernameTaken,
    EmailTaken,
    InvalidInput(&'static str),
}

impl<'a, R: UserRepository + ?Sized> Register<'a, R> {
    pub async fn execute(&self, req: &RegisterRequest) -> anyhow::Result<RegisterOutcome> {
        let username = req.username.trim();
        let email = req.email.trim().to_ascii_lowercase();
        if !USERNAME_RE.is_match(username) {
            return Ok(RegisterOutcome::InvalidInput(
                "username must be 3-32 letters, digits or underscores",
            ));
        }
        if !email.contains('@') || email.len() > 254 {
            return Ok(RegisterOutcome::InvalidInput("a valid email is required"));
        }
        if req.password.len() < 8 {
            return Ok(RegisterOutcome::InvalidInput(
                "password must be at least 8 characters",
            ));
        }
        if self.repo.find_by_username(username).await?.is_some() {
            return Ok(RegisterOutcome::UsernameTaken);
        }
        if self.repo.find_by_email(&email).await?.is_some() {
            return Ok(RegisterOutcome::EmailTaken);
        }

        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(req.password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!(e.to_string()))?
            .to_string();
        let user = self
            .repo
            .create_user(username, Some(&email), &hash, false, false)
            .await?;
        let token = tokens::new_token();
        self.repo
            .set_email_token(user.id, &token, tokens::verification_expiry())
            .await?;
        Ok(RegisterOutcome::Created {
            user,
            verification_token: token,
        })
    }
}
