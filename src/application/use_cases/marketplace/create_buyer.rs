use uuid::Uuid;

use crate::application::ports::buyer_repository::{BuyerRepository, BuyerRow};

pub struct CreateBuyer<'a, B: BuyerRepository + ?Sized> {
    pub buyers: &'a B,
}

#[derive(Debug)]
pub enum CreateBuyerOutcome {
    Created(BuyerRow),
    AlreadyExists,
    InvalidInput(&'static str),
}

impl<'a, B: BuyerRepository + ?Sized> CreateBuyer<'a, B> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        display_name: &str,
    ) -> anyhow::Result<CreateBuyerOutcome> {
        let display_name = display_name.trim();
        if display_name.is_empty() {
            return Ok(CreateBuyerOutcome::InvalidInput("display name is required"));
        }
        if self.buyers.find_by_user(user_id).await?.is_some() {
            return Ok(CreateBuyerOutcome::AlreadyExists);
        }
        let row = self.buyers.create(user_id, display_name).await?;
        Ok(CreateBuyerOutcome::Created(row))
    }
}
