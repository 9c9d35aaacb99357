use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordVerifier},
};

use crate::application::ports::user_repository::{UserRepository, UserRow};

pub struct Login<'a, R: UserRepository + ?Sized> {
    pub repo: &'a R,
}

#[derive(Debug, Clone)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    /// Admin-portal logins reject non-admin accounts outright.
    pub admin: bool,
}

#[derive(Debug)]
pub enum LoginOutcome {
    Success(UserRow),
    BadCredentials,
    Deactivated,
    EmailUnverified,
    NotAdmin,
}

impl<'a, R: UserRepository + ?Sized> Login<'a, R> {
    pub async fn execute(&self, req: &LoginRequest) -> anyhow::Result<LoginOutcome> {
        let row = match self.repo.find_by_username(req.username.trim()).await? {
            Some(r) => r,
            None => return Ok(LoginOutcome::BadCredentials),
        };
        let hash = row.password_hash.clone().unwrap_or_default();
        let parsed = match PasswordHash::new(&hash) {
            Ok(p) => p,
            Err(_) => return Ok(LoginOutcome::BadCredentials),
        };
        if Argon2::default()
            .verify_password(req.password.as_bytes(), &parsed)
            .is_err()
        {
            return Ok(LoginOutcome::BadCredentials);
        }
        // Admins are exempt from the verification gate.
        if !row.email_verified && !row.is_admin {
            return Ok(LoginOutcome::EmailUnverified);
        }
        if req.admin && !row.is_admin {
            return Ok(LoginOutcome::NotAdmin);
        }
        if !row.is_active {
            return Ok(LoginOutcome::Deactivated);
        }
        self.repo.touch_last_login(row.id).await?;
        Ok(LoginOutcome::Success(UserRow {
            password_hash: None,
            ..row
        }))
    }
}
