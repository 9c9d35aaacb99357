use uuid::Uuid;

use crate::application::ports::product_repository::{ProductRepository, ProductRow};
use crate::application::ports::seller_repository::SellerRepository;

pub struct MyProducts<'a, S, P>
where
    S: SellerRepository + ?Sized,
    P: ProductRepository + ?Sized,
{
    pub sellers: &'a S,
    pub products: &'a P,
}

#[derive(Debug)]
pub enum MyProductsOutcome {
    Allowed(Vec<ProductRow>),
    NoProfile,
}

impl<'a, S, P> MyProducts<'a, S, P>
where
    S: SellerRepository + ?Sized,
    P: ProductRepository + ?Sized,
{
    pub async fn execute(&self, user_id: Uuid) -> anyhow::Result<MyProductsOutcome> {
        let seller = match self.sellers.find_by_user(user_id).await? {
            Some(s) => s,
            None => return Ok(MyProductsOutcome::NoProfile),
        };
        Ok(MyProductsOutcome::Allowed(
            self.products.list_for_seller(seller.id).await?,
        ))
    }
}
