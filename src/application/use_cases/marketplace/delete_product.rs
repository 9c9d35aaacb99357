use tracing::warn;
use uuid::Uuid;

use crate::application::ports::image_store::ImageStore;
use crate::application::ports::product_repository::ProductRepository;
use crate::application::ports::seller_repository::SellerRepository;

pub struct DeleteProduct<'a, S, P, I>
where
    S: SellerRepository + ?Sized,
    P: ProductRepository + ?Sized,
    I: ImageStore + ?Sized,
{
    pub sellers: &'a S,
    pub products: &'a P,
    pub images: &'a I,
}

#[derive(Debug)]
pub enum DeleteProductOutcome {
    Deleted,
    NotFound,
    NoProfile,
}

impl<'a, S, P, I> DeleteProduct<'a, S, P, I>
where
    S: SellerRepository + ?Sized,
    P: ProductRepository + ?Sized,
    I: ImageStore + ?Sized,
{
    pub async fn execute(
        &self,
        user_id: Uuid,
        product_id: Uuid,
    ) -> anyhow::Result<DeleteProductOutcome> {
        let seller = match self.sellers.find_by_user(user_id).await? {
            Some(s) => s,
            None => return Ok(DeleteProductOutcome::NoProfile),
        };
        let image = match self.products.find_by_id(product_id).await? {
            Some(p) if p.seller_id == seller.id => p.image_filename,
            _ => return Ok(DeleteProductOutcome::NotFound),
        };
        if !self.products.delete(product_id, seller.id).await? {
            return Ok(DeleteProductOutcome::NotFound);
        }
        // The row is gone either way; a leftover file is only disk noise.
        if let Some(filename) = image {
            if let Err(err) = self.images.delete(&filename).await {
                warn!(%product_id, error = %err, "product_image_cleanup_failed");
            }
        }
        Ok(DeleteProductOutcome::Deleted)
    }
}
