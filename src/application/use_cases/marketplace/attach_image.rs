use tracing::warn;
use uuid::Uuid;

use crate::application::ports::image_store::ImageStore;
use crate::application::ports::product_repository::{ProductRepository, ProductRow};
use crate::application::ports::seller_repository::SellerRepository;
use crate::application::services::images::sniff_image;

pub struct AttachImage<'a, S, P, I>
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
pub enum AttachImageOutcome {
    Attached(ProductRow),
    NotFound,
    NoProfile,
    /// Bytes did not sniff as a supported image format.
    NotAnImage,
}

impl<'a, S, P, I> AttachImage<'a, S, P, I>
where
    S: SellerRepository + ?Sized,
    P: ProductRepository + ?Sized,
    I: ImageStore + ?Sized,
{
    pub async fn execute(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        bytes: &[u8],
    ) -> anyhow::Result<AttachImageOutcome> {
        // Content decides the type; the client's filename and declared
        // content type are ignored.
        let kind = match sniff_image(bytes) {
            Some(k) => k,
            None => return Ok(AttachImageOutcome::NotAnImage),
        };
        let seller = match self.sellers.find_by_user(user_id).await? {
            Some(s) => s,
            None => return Ok(AttachImageOutcome::NoProfile),
        };
        let previous = match self.products.find_by_id(product_id).await? {
            Some(p) if p.seller_id == seller.id => p.image_filename,
            _ => return Ok(AttachImageOutcome::NotFound),
        };

        let filename = self.images.save(bytes, kind.extension).await?;
        let row = match self
            .products
            .set_image(product_id, seller.id, &filename)
            .await?
        {
            Some(row) => row,
            None => {
                // Product vanished between the ownership check and the
                // update; do not leave the new file orphaned.
                let _ = self.images.delete(&filename).await;
                return Ok(AttachImageOutcome::NotFound);
            }
        };
        if let Some(old) = previous {
            if old != filename {
                if let Err(err) = self.images.delete(&old).await {
                    warn!(%product_id, error = %err, "product_image_cleanup_failed");
                }
            }
        }
        Ok(AttachImageOutcome::Attached(row))
    }
}
