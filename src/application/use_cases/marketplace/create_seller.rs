use uuid::Uuid;

use crate::application::ports::seller_repository::{SellerRepository, SellerRow};

pub struct CreateSeller<'a, S: SellerRepository + ?Sized> {
    pub sellers: &'a S,
}

#[derive(Debug, Clone)]
pub struct CreateSellerRequest {
    pub business_name: String,
    pub description: Option<String>,
}

#[derive(Debug)]
pub enum CreateSellerOutcome {
    Created(SellerRow),
    AlreadyExists,
    InvalidInput(&'static str),
}

impl<'a, S: SellerRepository + ?Sized> CreateSeller<'a, S> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        req: &CreateSellerRequest,
    ) -> anyhow::Result<CreateSellerOutcome> {
        let business_name = req.business_name.trim();
        if business_name.is_empty() {
            return Ok(CreateSellerOutcome::InvalidInput(
                "business name is required",
            ));
        }
        if self.sellers.find_by_user(user_id).await?.is_some() {
            return Ok(CreateSellerOutcome::AlreadyExists);
        }
        let row = self
            .sellers
            .create(
                user_id,
                business_name,
                req.description
                    .as_deref()
                    .map(str::trim)
                    .filter(|d| !d.is_empty()),
            )
            .await?;
        Ok(CreateSellerOutcome::Created(row))
    }
}
