use argon2::{
    Argon2,
    password_hash::{PasswordHasher, SaltString},
};
use password_hash::rand_core::OsRng;
use tracing::info;

use crate::application::ports::challenge_repository::{ChallengeRepository, NewChallenge};
use crate::application::ports::user_repository::UserRepository;
use crate::application::services::challenges::generate;
use crate::bootstrap::config::Config;
use crate::domain::challenges::challenge::{ChallengeKind, Difficulty};

const DEFAULT_CHALLENGES: [(&str, ChallengeKind, Difficulty); 3] = [
    ("aes_easy", ChallengeKind::Aes, Difficulty::Easy),
    ("vigenere_medium", ChallengeKind::Vigenere, Difficulty::Medium),
    ("rsa_hard", ChallengeKind::Rsa, Difficulty::Hard),
];

/// Creates or promotes the admin account named in the environment.
/// A no-op unless both `ADMIN_USERNAME` and `ADMIN_PASSWORD` are set.
pub async fn ensure_admin(cfg: &Config, users: &dyn UserRepository) -> anyhow::Result<()> {
    let (Some(username), Some(password)) =
        (cfg.admin_username.as_deref(), cfg.admin_password.as_deref())
    else {
        return Ok(());
    };
    match users.find_by_username(username).await? {
        Some(user) if user.is_admin => {}
        Some(user) => {
            users.promote_admin(user.id).await?;
            info!(username, "existing user promoted to admin");
        }
        None => {
            let email = if cfg.brevo_api_key.is_some() {
                cfg.sender_email.clone()
            } else {
                format!("{username}@admin.local")
            };
            let salt = SaltString::generate(&mut OsRng);
            let hash = Argon2::default()
                .hash_password(password.as_bytes(), &salt)
                .map_err(|e| anyhow::anyhow!(e.to_string()))?
                .to_string();
            users
                .create_user(username, Some(&email), &hash, true, true)
                .await?;
            info!(username, "admin account created");
        }
    }
    Ok(())
}

/// Inserts the stock challenge set on first boot. Existing ids are left
/// untouched so a restart never regenerates keys under players mid-solve.
pub async fn ensure_default_challenges(challenges: &dyn ChallengeRepository) -> anyhow::Result<()> {
    for (id, kind, difficulty) in DEFAULT_CHALLENGES {
        if challenges.exists(id).await? {
            continue;
        }
        let generated = generate(kind, difficulty)?;
        challenges
            .insert(&NewChallenge {
                id: id.to_string(),
                kind: kind.as_str().to_string(),
                difficulty: difficulty.as_str().to_string(),
                category: "crypto".to_string(),
                description: generated.description,
                points: generated.points,
                hints: generated.hints,
                encrypted_message: generated.encrypted_message,
                flag: generated.flag,
            })
            .await?;
        info!(challenge = id, "seeded default challenge");
    }
    Ok(())
}
