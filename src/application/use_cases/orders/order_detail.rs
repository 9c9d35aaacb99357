use uuid::Uuid;

use crate::application::ports::buyer_repository::BuyerRepository;
use crate::application::ports::order_repository::{OrderDetail, OrderRepository};

pub struct GetOrder<'a, B, O>
where
    B: BuyerRepository + ?Sized,
    O: OrderRepository + ?Sized,
{
    pub buyers: &'a B,
    pub orders: &'a O,
}

#[derive(Debug)]
pub enum GetOrderOutcome {
    Found(Box<OrderDetail>),
    NotFound,
    NoProfile,
}

impl<'a, B, O> GetOrder<'a, B, O>
where
    B: BuyerRepository + ?Sized,
    O: OrderRepository + ?Sized,
{
    pub async fn execute(&self, user_id: Uuid, order_id: Uuid) -> anyhow::Result<GetOrderOutcome> {
        let buyer = match self.buyers.find_by_user(user_id).await? {
            Some(b) => b,
            None => return Ok(GetOrderOutcome::NoProfile),
        };
        match self.orders.order_for_buyer(order_id, buyer.id).await? {
            Some(detail) => Ok(GetOrderOutcome::Found(Box::new(detail))),
            None => Ok(GetOrderOutcome::NotFound),
        }
    }
}
