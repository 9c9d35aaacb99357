use async_trait::async_trait;
use uuid::Uuid;
use webauthn_rs::prelude::{PasskeyAuthentication, PasskeyRegistration};

use crate::domain::challenges::minigame::Minigame;

/// Server-side state of a minigame round in progress.
#[derive(Debug)]
pub enum RoundState {
    Wheel { part_index: i32, part: String },
    Quiz { part_index: i32, part: String, answer_key: Vec<usize> },
    Memory { part_index: i32, part: String },
    Slider { part_index: i32, part: String },
    Scramble { part_index: i32, part: String, word: String },
}

impl RoundState {
    pub fn minigame(&self) -> Minigame {
        match self {
            RoundState::Wheel { .. } => Minigame::Wheel,
            RoundState::Quiz { .. } => Minigame::Quiz,
            RoundState::Memory { .. } => Minigame::Memory,
            RoundState::Slider { .. } => Minigame::Slider,
            RoundState::Scramble { .. } => Minigame::Scramble,
        }
    }

    pub fn part(&self) -> (i32, &str) {
        match self {
            RoundState::Wheel { part_index, part }
            | RoundState::Quiz { part_index, part, .. }
            | RoundState::Memory { part_index, part }
            | RoundState::Slider { part_index, part }
            | RoundState::Scramble { part_index, part, .. } => (*part_index, part.as_str()),
        }
    }
}

/// State parked between the two halves of a client round trip. Never
/// serialized to the client; the client only ever sees the flow id.
#[derive(Debug)]
pub enum FlowData {
    PasskeyEnroll {
        user_id: Uuid,
        state: PasskeyRegistration,
    },
    PasskeyLogin {
        user_id: Uuid,
        state: PasskeyAuthentication,
    },
    MinigameRound {
        user_id: Uuid,
        challenge_id: String,
        round: RoundState,
    },
}

#[async_trait]
pub trait FlowStore: Send + Sync {
    async fn begin(&self, data: FlowData) -> anyhow::Result<Uuid>;
    /// Removes and returns the flow. A flow is consumed on first take;
    /// expired or unknown ids yield None.
    async fn take(&self, id: Uuid) -> anyhow::Result<Option<FlowData>>;
    async fn purge_expired(&self) -> anyhow::Result<usize>;
}
