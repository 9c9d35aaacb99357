use uuid::Uuid;

use crate::application::ports::order_repository::{OrderRepository, OrderRow};
use crate::application::ports::seller_repository::SellerRepository;
use crate::domain::marketplace::order::DeliveryStatus;

pub struct UpdateDelivery<'a, S, O>
where
    S: SellerRepository + ?Sized,
    O: OrderRepository + ?Sized,
{
    pub sellers: &'a S,
    pub orders: &'a O,
}

#[derive(Debug)]
pub enum UpdateDeliveryOutcome {
    Updated(OrderRow),
    NotFound,
    NoProfile,
    InvalidStatus,
}

impl<'a, S, O> UpdateDelivery<'a, S, O>
where
    S: SellerRepository + ?Sized,
    O: OrderRepository + ?Sized,
{
    pub async fn execute(
        &self,
        user_id: Uuid,
        order_id: Uuid,
        status: &str,
    ) -> anyhow::Result<UpdateDeliveryOutcome> {
        let Some(next) = DeliveryStatus::parse(status) else {
            return Ok(UpdateDeliveryOutcome::InvalidStatus);
        };
        let seller = match self.sellers.find_by_user(user_id).await? {
            Some(s) => s,
            None => return Ok(UpdateDeliveryOutcome::NoProfile),
        };
        match self
            .orders
            .update_delivery(order_id, seller.id, next.as_str())
            .await?
        {
            Some(row) => Ok(UpdateDeliveryOutcome::Updated(row)),
            None => Ok(UpdateDeliveryOutcome::NotFound),
        }
    }
}
