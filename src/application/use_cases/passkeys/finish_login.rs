use anyhow::anyhow;
use uuid::Uuid;
use webauthn_rs::prelude::{Passkey, PublicKeyCredential, Webauthn};

use crate::application::ports::flow_store::{FlowData, FlowStore};
use crate::application::ports::passkey_repository::PasskeyRepository;
use crate::application::ports::user_repository::{UserRepository, UserRow};

pub struct FinishPasskeyLogin<'a, U, K, F>
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
pub enum FinishLoginOutcome {
    Success(UserRow),
    InvalidFlow,
    Rejected(String),
    Deactivated,
}

impl<'a, U, K, F> FinishPasskeyLogin<'a, U, K, F>
where
    U: UserRepository + ?Sized,
    K: PasskeyRepository + ?Sized,
    F: FlowStore + ?Sized,
{
    pub async fn execute(
        &self,
        flow_id: Uuid,
        credential: &PublicKeyCredential,
    ) -> anyhow::Result<FinishLoginOutcome> {
        let data = match self.flows.take(flow_id).await? {
            Some(d) => d,
            None => return Ok(FinishLoginOutcome::InvalidFlow),
        };
        let (user_id, state) = match data {
            FlowData::PasskeyLogin { user_id, state } => (user_id, state),
            _ => return Ok(FinishLoginOutcome::InvalidFlow),
        };
        let result = match self.webauthn.finish_passkey_authentication(credential, &state) {
            Ok(r) => r,
            Err(e) => return Ok(FinishLoginOutcome::Rejected(e.to_string())),
        };
        let user = match self.users.find_by_id(user_id).await? {
            Some(u) => u,
            None => return Ok(FinishLoginOutcome::InvalidFlow),
        };
        if !user.is_active {
            return Ok(FinishLoginOutcome::Deactivated);
        }
        // Write back the authenticator counter so clone detection keeps
        // working across logins.
        if let Some(row) = self.passkeys.find_for_user(user_id).await? {
            let mut passkey: Passkey = serde_json::from_value(row.credential)
                .map_err(|e| anyhow!("stored passkey corrupt: {e}"))?;
            if passkey.update_credential(&result).is_some() {
                let body = serde_json::to_value(&passkey)?;
                self.passkeys
                    .update_credential(user_id, &body, i64::from(result.counter()))
                    .await?;
            }
        }
        self.users.touch_last_login(user_id).await?;
        Ok(FinishLoginOutcome::Success(UserRow {
            password_hash: None,
            ..user
        }))
    }
}
