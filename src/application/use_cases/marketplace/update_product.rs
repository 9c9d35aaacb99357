use uuid::Uuid;

use crate::application::ports::product_repository::{
    ProductPatch, ProductRepository, ProductRow,
};
use crate::application::ports::seller_repository::SellerRepository;

pub struct UpdateProduct<'a, S, P>
where
    S: SellerRepository + ?Sized,
    P: ProductRepository + ?Sized,
{
    pub sellers: &'a S,
    pub products: &'a P,
}

#[derive(Debug)]
pub enum UpdateProductOutcome {
    Updated(ProductRow),
    /// Missing, or owned by another seller.
    NotFound,
    NoProfile,
    InvalidInput(&'static str),
}

impl<'a, S, P> UpdateProduct<'a, S, P>
where
    S: SellerRepository + ?Sized,
    P: ProductRepository + ?Sized,
{
    pub async fn execute(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        patch: &ProductPatch,
    ) -> anyhow::Result<UpdateProductOutcome> {
        if let Some(name) = &patch.name {
            if name.trim().is_empty() {
                return Ok(UpdateProductOutcome::InvalidInput("product name is required"));
            }
        }
        if matches!(patch.price_cents, Some(p) if p <= 0) {
            return Ok(UpdateProductOutcome::InvalidInput("price must be positive"));
        }
        if matches!(patch.stock, Some(s) if s < 0) {
            return Ok(UpdateProductOutcome::InvalidInput("stock cannot be negative"));
        }
        let seller = match self.sellers.find_by_user(user_id).await? {
            Some(s) => s,
            None => return Ok(UpdateProductOutcome::NoProfile),
        };
        match self.products.update(product_id, seller.id, patch).await? {
            Some(row) => Ok(UpdateProductOutcome::Updated(row)),
            None => Ok(UpdateProductOutcome::NotFound),
        }
    }
}
