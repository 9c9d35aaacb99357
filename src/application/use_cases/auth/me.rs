use uuid::Uuid;

use crate::application::ports::buyer_repository::{BuyerRepository, BuyerRow};
use crate::application::ports::passkey_repository::PasskeyRepository;
use crate::application::ports::progress_repository::{ProgressRepository, SolveRow};
use crate::application::ports::seller_repository::{SellerRepository, SellerRow};
use crate::application::ports::user_repository::{UserRepository, UserRow};

pub struct GetMe<'a, U, P, K, B, S>
where
    U: UserRepository + ?Sized,
    P: ProgressRepository + ?Sized,
    K: PasskeyRepository + ?Sized,
    B: BuyerRepository + ?Sized,
    S: SellerRepository + ?Sized,
{
    pub users: &'a U,
    pub progress: &'a P,
    pub passkeys: &'a K,
    pub buyers: &'a B,
    pub sellers: &'a S,
}

#[derive(Debug)]
pub struct Profile {
    pub user: UserRow,
    pub score: i64,
    pub solves: Vec<SolveRow>,
    pub has_passkey: bool,
    pub buyer: Option<BuyerRow>,
    pub seller: Option<SellerRow>,
}

impl<'a, U, P, K, B, S> GetMe<'a, U, P, K, B, S>
where
    U: UserRepository + ?Sized,
    P: ProgressRepository + ?Sized,
    K: PasskeyRepository + ?Sized,
    B: BuyerRepository + ?Sized,
    S: SellerRepository + ?Sized,
{
    pub async fn execute(&self, user_id: Uuid) -> anyhow::Result<Option<Profile>> {
        let user = match self.users.find_by_id(user_id).await? {
            Some(u) => u,
            None => return Ok(None),
        };
        let score = self.progress.score_for_user(user_id).await?;
        let solves = self.progress.solves_for_user(user_id).await?;
        let has_passkey = self.passkeys.find_for_user(user_id).await?.is_some();
        let buyer = self.buyers.find_by_user(user_id).await?;
        let seller = self.sellers.find_by_user(user_id).await?;
        Ok(Some(Profile {
            user: UserRow {
                password_hash: None,
                ..user
            },
            score,
            solves,
            has_passkey,
            buyer,
            seller,
        }))
    }
}
