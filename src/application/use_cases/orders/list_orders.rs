use uuid::Uuid;

use crate::application::ports::buyer_repository::BuyerRepository;
use crate::application::ports::order_repository::{OrderDetail, OrderRepository};

pub struct ListOrders<'a, B, O>
where
    B: BuyerRepository + ?Sized,
    O: OrderRepository + ?Sized,
{
    pub buyers: &'a B,
    pub orders: &'a O,
}

#[derive(Debug)]
pub enum ListOrdersOutcome {
    Allowed(Vec<OrderDetail>),
    NoProfile,
}

impl<'a, B, O> ListOrders<'a, B, O>
where
    B: BuyerRepository + ?Sized,
    O: OrderRepository + ?Sized,
{
    pub async fn execute(&self, user_id: Uuid) -> anyhow::Result<ListOrdersOutcome> {
        let buyer = match self.buyers.find_by_user(user_id).await? {
            Some(b) => b,
            None => return Ok(ListOrdersOutcome::NoProfile),
        };
        Ok(ListOrdersOutcome::Allowed(
            self.orders.list_for_buyer(buyer.id).await?,
        ))
    }
}
