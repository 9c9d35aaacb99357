use crate::application::ports::user_repository::UserRepository;
use crate::application::use_cases::auth::tokens;

pub struct ResendVerification<'a, R: UserRepository + ?Sized> {
    pub repo: &'a R,
}

/// Minted for accounts that exist and still need confirmation. The caller
/// responds identically either way so addresses cannot be probed.
#[derive(Debug)]
pub struct PendingVerification {
    pub email: String,
    pub username: String,
    pub token: String,
}

impl<'a, R: UserRepository + ?Sized> ResendVerification<'a, R> {
    pub async fn execute(&self, email: &str) -> anyhow::Result<Option<PendingVerification>> {
        let user = match self.repo.find_by_email(email).await? {
            Some(u) => u,
            None => return Ok(None),
        };
        if user.email_verified || !user.is_active {
            return Ok(None);
        }
        let email = match user.email {
            Some(e) => e,
            None => return Ok(None),
        };
        let token = tokens::new_token();
        self.repo
            .set_email_token(user.id, &token, tokens::verification_expiry())
            .await?;
        Ok(Some(PendingVerification {
            email,
            username: user.username,
            token,
        }))
    }
}
