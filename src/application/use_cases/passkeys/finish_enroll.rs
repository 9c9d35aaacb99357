use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use uuid::Uuid;
use webauthn_rs::prelude::{RegisterPublicKeyCredential, Webauthn};

use crate::application::ports::flow_store::{FlowData, FlowStore};
use crate::application::ports::passkey_repository::PasskeyRepository;

pub struct FinishPasskeyEnroll<'a, K, F>
where
    K: PasskeyRepository + ?Sized,
    F: FlowStore + ?Sized,
{
    pub passkeys: &'a K,
    pub flows: &'a F,
    pub webauthn: &'a Webauthn,
}

#[derive(Debug)]
pub enum FinishEnrollOutcome {
    Saved { credential_id: String },
    InvalidFlow,
    Rejected(String),
}

impl<'a, K, F> FinishPasskeyEnroll<'a, K, F>
where
    K: PasskeyRepository + ?Sized,
    F: FlowStore + ?Sized,
{
    pub async fn execute(
        &self,
        user_id: Uuid,
        flow_id: Uuid,
        credential: &RegisterPublicKeyCredential,
    ) -> anyhow::Result<FinishEnrollOutcome> {
        let data = match self.flows.take(flow_id).await? {
            Some(d) => d,
            None => return Ok(FinishEnrollOutcome::InvalidFlow),
        };
        let (owner, state) = match data {
            FlowData::PasskeyEnroll { user_id, state } => (user_id, state),
            _ => return Ok(FinishEnrollOutcome::InvalidFlow),
        };
        if owner != user_id {
            return Ok(FinishEnrollOutcome::InvalidFlow);
        }
        let passkey = match self.webauthn.finish_passkey_registration(credential, &state) {
            Ok(p) => p,
            Err(e) => return Ok(FinishEnrollOutcome::Rejected(e.to_string())),
        };
        let credential_id = URL_SAFE_NO_PAD.encode(passkey.cred_id());
        let body = serde_json::to_value(&passkey)?;
        self.passkeys.save(user_id, &body, &credential_id).await?;
        Ok(FinishEnrollOutcome::Saved { credential_id })
    }
}
