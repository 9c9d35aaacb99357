use uuid::Uuid;

use crate::application::ports::buyer_repository::BuyerRepository;
use crate::application::ports::product_repository::{ListedProduct, ProductRepository};
use crate::application::ports::progress_repository::ProgressRepository;
use crate::domain::marketplace::verification::{VerificationProgress, VerificationTier};

pub struct ListProducts<'a, B, P, R>
where
    B: BuyerRepository + ?Sized,
    P: ProductRepository + ?Sized,
    R: ProgressRepository + ?Sized,
{
    pub buyers: &'a B,
    pub products: &'a P,
    pub progress: &'a R,
}

#[derive(Debug)]
pub enum ListProductsOutcome {
    Allowed(Vec<ListedProduct>),
    NoProfile,
    NotVerified(VerificationProgress),
}

impl<'a, B, P, R> ListProducts<'a, B, P, R>
where
    B: BuyerRepository + ?Sized,
    P: ProductRepository + ?Sized,
    R: ProgressRepository + ?Sized,
{
    pub async fn execute(
        &self,
        user_id: Uuid,
        required: i64,
    ) -> anyhow::Result<ListProductsOutcome> {
        if self.buyers.find_by_user(user_id).await?.is_none() {
            return Ok(ListProductsOutcome::NoProfile);
        }
        let progress = VerificationProgress {
            solved: self
                .progress
                .count_solves_by_difficulty(
                    user_id,
                    VerificationTier::Buyer.difficulty().as_str(),
                )
                .await?,
            required,
        };
        if !progress.verified() {
            return Ok(ListProductsOutcome::NotVerified(progress));
        }
        Ok(ListProductsOutcome::Allowed(
            self.products.list_active().await?,
        ))
    }
}
