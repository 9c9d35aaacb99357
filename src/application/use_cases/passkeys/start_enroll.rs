use anyhow::anyhow;
use uuid::Uuid;
use webauthn_rs::prelude::{CreationChallengeResponse, Webauthn};

use crate::application::ports::flow_store::{FlowData, FlowStore};
use crate::application::ports::user_repository::UserRepository;

pub struct StartPasskeyEnroll<'a, U, F>
where
    U: UserRepository + ?Sized,
    F: FlowStore + ?Sized,
{
    pub users: &'a U,
    pub flows: &'a F,
    pub webauthn: &'a Webauthn,
}

#[derive(Debug)]
pub enum StartEnrollOutcome {
    Started {
        flow_id: Uuid,
        creation: CreationChallengeResponse,
    },
    NotFound,
}

impl<'a, U, F> StartPasskeyEnroll<'a, U, F>
where
    U: UserRepository + ?Sized,
    F: FlowStore + ?Sized,
{
    pub async fn execute(&self, user_id: Uuid) -> anyhow::Result<StartEnrollOutcome> {
        let user = match self.users.find_by_id(user_id).await? {
            Some(u) => u,
            None => return Ok(StartEnrollOutcome::NotFound),
        };
        // A fresh registration replaces any existing credential, so nothing
        // is excluded here.
        let (creation, state) = self
            .webauthn
            .start_passkey_registration(user.id, &user.username, &user.username, None)
            .map_err(|e| anyhow!("start passkey registration: {e}"))?;
        let flow_id = self
            .flows
            .begin(FlowData::PasskeyEnroll {
                user_id: user.id,
                state,
            })
            .await?;
        Ok(StartEnrollOutcome::Started { flow_id, creation })
    }
}
