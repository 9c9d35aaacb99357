use uuid::Uuid;

use crate::application::ports::order_repository::{OrderDetail, OrderRepository};
use crate::application::ports::seller_repository::SellerRepository;

pub struct SellerOrders<'a, S, O>
where
    S: SellerRepository + ?Sized,
    O: OrderRepository + ?Sized,
{
    pub sellers: &'a S,
    pub orders: &'a O,
}

#[derive(Debug)]
pub enum SellerOrdersOutcome {
    Allowed(Vec<OrderDetail>),
    NoProfile,
}

impl<'a, S, O> SellerOrders<'a, S, O>
where
    S: SellerRepository + ?Sized,
    O: OrderRepository + ?Sized,
{
    pub async fn execute(&self, user_id: Uuid) -> anyhow::Result<SellerOrdersOutcome> {
        let seller = match self.sellers.find_by_user(user_id).await? {
            Some(s) => s,
            None => return Ok(SellerOrdersOutcome::NoProfile),
        };
        Ok(SellerOrdersOutcome::Allowed(
            self.orders.list_for_seller(seller.id).await?,
        ))
    }
}
