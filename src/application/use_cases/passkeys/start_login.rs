use anyhow::anyhow;
use uuid::Uuid;
use webauthn_rs::prelude::{Passkey, RequestChallengeResponse, Webauthn};

use crate::application::ports::flow_store::{FlowData, FlowStore};
use crate::application::ports::passkey_repository::PasskeyRepository;
use crate::application::ports::user_repository::UserRepository;

pub struct StartPasskeyLogin<'a, U, K, F>
where
    U: UserRepository + ?Sized,
    K: PasskeyRepository + ?Sized,
    F: FlowStore + ?Sized,
{
    pub users: &'a U,
    pub passkeys: &'a K,
    pub flows: &'a F,
    pub webauthn: &'a Webauthn,
}

#[derive(Debug)]
pub enum StartLoginOutcome {
    Started {
        flow_id: Uuid,
        request: RequestChallengeResponse,
    },
    NotAvailable,
    Deactivated,
}

impl<'a, U, K, F> StartPasskeyLogin<'a, U, K, F>
where
    U: UserRepository + ?Sized,
    K: PasskeyRepository + ?Sized,
    F: FlowStore + ?Sized,
{
    pub async fn execute(&self, username: &str) -> anyhow::Result<StartLoginOutcome> {
        let user = match self.users.find_by_username(username).await? {
            Some(u) => u,
            None => return Ok(StartLoginOutcome::NotAvailable),
        };
        if !user.is_active {
            return Ok(StartLoginOutcome::Deactivated);
        }
        let row = match self.passkeys.find_for_user(user.id).await? {
            Some(r) => r,
            None => return Ok(StartLoginOutcome::NotAvailable),
        };
        let passkey: Passkey = serde_json::from_value(row.credential)
            .map_err(|e| anyhow!("stored passkey corrupt: {e}"))?;
        let (request, state) = self
            .webauthn
            .start_passkey_authentication(&[passkey])
            .map_err(|e| anyhow!("start passkey authentication: {e}"))?;
        let flow_id = self
            .flows
            .begin(FlowData::PasskeyLogin {
                user_id: user.id,
                state,
            })
            .await?;
        Ok(StartLoginOutcome::Started { flow_id, request })
    }
}
