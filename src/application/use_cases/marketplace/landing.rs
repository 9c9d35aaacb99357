use uuid::Uuid;

use crate::application::ports::buyer_repository::{BuyerRepository, BuyerRow};
use crate::application::ports::product_repository::{ListedProduct, ProductRepository};
use crate::application::ports::progress_repository::ProgressRepository;
use crate::application::ports::seller_repository::{SellerRepository, SellerRow};
use crate::domain::marketplace::verification::{VerificationProgress, VerificationTier};

pub struct Landing<'a, B, S, P, R>
where
    B: BuyerRepository + ?Sized,
    S: SellerRepository + ?Sized,
    P: ProductRepository + ?Sized,
    R: ProgressRepository + ?Sized,
{
    pub buyers: &'a B,
    pub sellers: &'a S,
    pub products: &'a P,
    pub progress: &'a R,
}

#[derive(Debug)]
pub struct LandingView {
    pub buyer: Option<BuyerRow>,
    pub seller: Option<SellerRow>,
    pub buyer_progress: VerificationProgress,
    pub seller_progress: VerificationProgress,
    /// Active listings, present only for verified buyers.
    pub listings: Option<Vec<ListedProduct>>,
}

impl<'a, B, S, P, R> Landing<'a, B, S, P, R>
where
    B: BuyerRepository + ?Sized,
    S: SellerRepository + ?Sized,
    P: ProductRepository + ?Sized,
    R: ProgressRepository + ?Sized,
{
    pub async fn execute(
        &self,
        user_id: Uuid,
        buyer_required: i64,
        seller_required: i64,
    ) -> anyhow::Result<LandingView> {
        let buyer = self.buyers.find_by_user(user_id).await?;
        let seller = self.sellers.find_by_user(user_id).await?;
        let buyer_progress = VerificationProgress {
            solved: self
                .progress
                .count_solves_by_difficulty(
                    user_id,
                    VerificationTier::Buyer.difficulty().as_str(),
                )
                .await?,
            required: buyer_required,
        };
        let seller_progress = VerificationProgress {
            solved: self
                .progress
                .count_solves_by_difficulty(
                    user_id,
                    VerificationTier::Seller.difficulty().as_str(),
                )
                .await?,
            required: seller_required,
        };
        let listings = if buyer.is_some() && buyer_progress.verified() {
            Some(self.products.list_active().await?)
        } else {
            None
        };
        Ok(LandingView {
            buyer,
            seller,
            buyer_progress,
            seller_progress,
            listings,
        })
    }
}
