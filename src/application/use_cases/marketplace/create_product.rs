use uuid::Uuid;

use crate::application::ports::product_repository::{ProductRepository, ProductRow};
use crate::application::ports::progress_repository::ProgressRepository;
use crate::application::ports::seller_repository::SellerRepository;
use crate::domain::marketplace::verification::{VerificationProgress, VerificationTier};

pub struct CreateProduct<'a, S, P, R>
where
    S: SellerRepository + ?Sized,
    P: ProductRepository + ?Sized,
    R: ProgressRepository + ?Sized,
{
    pub sellers: &'a S,
    pub products: &'a P,
    pub progress: &'a R,
}

#[derive(Debug, Clone)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price_cents: i64,
    pub stock: i32,
}

#[derive(Debug)]
pub enum CreateProductOutcome {
    Created(ProductRow),
    NoProfile,
    NotVerified(VerificationProgress),
    InvalidInput(&'static str),
}

impl<'a, S, P, R> CreateProduct<'a, S, P, R>
where
    S: SellerRepository + ?Sized,
    P: ProductRepository + ?Sized,
    R: ProgressRepository + ?Sized,
{
    pub async fn execute(
        &self,
        user_id: Uuid,
        req: &CreateProductRequest,
        required: i64,
    ) -> anyhow::Result<CreateProductOutcome> {
        let name = req.name.trim();
        if name.is_empty() {
            return Ok(CreateProductOutcome::InvalidInput("product name is required"));
        }
        if req.price_cents <= 0 {
            return Ok(CreateProductOutcome::InvalidInput("price must be positive"));
        }
        if req.stock < 0 {
            return Ok(CreateProductOutcome::InvalidInput("stock cannot be negative"));
        }
        let seller = match self.sellers.find_by_user(user_id).await? {
            Some(s) => s,
            None => return Ok(CreateProductOutcome::NoProfile),
        };
        let progress = VerificationProgress {
            solved: self
                .progress
                .count_solves_by_difficulty(
                    user_id,
                    VerificationTier::Seller.difficulty().as_str(),
                )
                .await?,
            required,
        };
        if !progress.verified() {
            return Ok(CreateProductOutcome::NotVerified(progress));
        }
        let category = req
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or("Other");
        let row = self
            .products
            .create(
                seller.id,
                name,
                req.description.as_deref().unwrap_or("").trim(),
                category,
                req.price_cents,
                req.stock,
            )
            .await?;
        Ok(CreateProductOutcome::Created(row))
    }
}
