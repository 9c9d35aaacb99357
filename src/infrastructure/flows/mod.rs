use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::application::ports::flow_store::{FlowData, FlowStore};

// Pending flows are single-use and short-lived; a quarter hour covers a
// slow passkey prompt or minigame round comfortably.
const FLOW_TTL: Duration = Duration::from_secs(15 * 60);

/// Process-local flow store. State never leaves the process, which is
/// fine for a single-instance deployment; flows are consumed on first
/// take and swept by the background task otherwise.
pub struct InMemoryFlowStore {
    ttl: Duration,
    flows: Mutex<HashMap<Uuid, (Instant, FlowData)>>,
}

impl InMemoryFlowStore {
    pub fn new() -> Self {
        Self::with_ttl(FLOW_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            flows: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryFlowStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FlowStore for InMemoryFlowStore {
    async fn begin(&self, data: FlowData) -> anyhow::Result<Uuid> {
        let id = Uuid::new_v4();
        let deadline = Instant::now() + self.ttl;
        self.flows.lock().await.insert(id, (deadline, data));
        Ok(id)
    }

    async fn take(&self, id: Uuid) -> anyhow::Result<Option<FlowData>> {
        let mut flows = self.flows.lock().await;
        match flows.remove(&id) {
            Some((deadline, data)) if Instant::now() < deadline => Ok(Some(data)),
            _ => Ok(None),
        }
    }

    async fn purge_expired(&self) -> anyhow::Result<usize> {
        let mut flows = self.flows.lock().await;
        let before = flows.len();
        let now = Instant::now();
        flows.retain(|_, (deadline, _)| *deadline > now);
        Ok(before - flows.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::flow_store::RoundState;

    fn round() -> FlowData {
        FlowData::MinigameRound {
            user_id: Uuid::new_v4(),
            challenge_id: "aes_easy".into(),
            round: RoundState::Wheel {
                part_index: 0,
                part: "abcd".into(),
            },
        }
    }

    #[tokio::test]
    async fn a_flow_is_consumed_on_first_take() {
        let store = InMemoryFlowStore::new();
        let id = store.begin(round()).await.unwrap();
        assert!(store.take(id).await.unwrap().is_some());
        assert!(store.take(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unknown_ids_yield_nothing() {
        let store = InMemoryFlowStore::new();
        assert!(store.take(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn expired_flows_cannot_be_taken() {
        let store = InMemoryFlowStore::with_ttl(Duration::ZERO);
        let id = store.begin(round()).await.unwrap();
        assert!(store.take(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn purge_reports_how_many_were_swept() {
        let store = InMemoryFlowStore::with_ttl(Duration::ZERO);
        store.begin(round()).await.unwrap();
        store.begin(round()).await.unwrap();
        assert_eq!(store.purge_expired().await.unwrap(), 2);
        assert_eq!(store.purge_expired().await.unwrap(), 0);
    }
}
