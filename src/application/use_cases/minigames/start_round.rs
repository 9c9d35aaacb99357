use anyhow::Context;
use uuid::Uuid;

use crate::application::ports::challenge_repository::ChallengeRepository;
use crate::application::ports::flow_store::{FlowData, FlowStore, RoundState};
use crate::application::ports::minigame_repository::MinigameRepository;
use crate::application::services::minigames::{
    MemoryCard, QUIZ_BANK, WheelSegment, memory_cards, part_for, quiz_round, scramble_round,
    slider_puzzle, split_key, wheel_segments,
};
use crate::domain::challenges::challenge::LayeredMessage;
use crate::domain::challenges::minigame::Minigame;

pub struct StartRound<'a, C, M, F>
where
    C: ChallengeRepository + ?Sized,
    M: MinigameRepository + ?Sized,
    F: FlowStore + ?Sized,
{
    pub challenges: &'a C,
    pub minigames: &'a M,
    pub flows: &'a F,
}

#[derive(Debug, Clone)]
pub struct QuizPrompt {
    pub question: String,
    pub options: Vec<String>,
}

/// Client-facing round material. Answers stay server-side in the flow.
#[derive(Debug)]
pub enum RoundContent {
    Wheel { segments: Vec<WheelSegment> },
    Quiz { questions: Vec<QuizPrompt> },
    Memory { cards: Vec<MemoryCard> },
    Slider { tiles: Vec<u8> },
    Scramble { scrambled: String, hint: String },
}

#[derive(Debug)]
pub enum StartRoundOutcome {
    NotFound,
    AlreadyCompleted {
        part_index: i32,
        revealed_part: String,
    },
    Started {
        flow_id: Uuid,
        game: Minigame,
        content: RoundContent,
    },
}

impl<'a, C, M, F> StartRound<'a, C, M, F>
where
    C: ChallengeRepository + ?Sized,
    M: MinigameRepository + ?Sized,
    F: FlowStore + ?Sized,
{
    pub async fn execute(
        &self,
        user_id: Uuid,
        challenge_id: &str,
        game: Minigame,
    ) -> anyhow::Result<StartRoundOutcome> {
        let challenge = match self.challenges.find_by_id(challenge_id).await? {
            Some(c) if c.is_active => c,
            _ => return Ok(StartRoundOutcome::NotFound),
        };
        let layered = LayeredMessage::parse(&challenge.encrypted_message)
            .with_context(|| format!("challenge {} has a malformed message", challenge.id))?;
        let parts = split_key(&layered.key);
        let Some(part) = part_for(&parts, game) else {
            // Short keys deal fewer parts, so a game can be absent.
            return Ok(StartRoundOutcome::NotFound);
        };

        let progress = self.minigames.progress_for(user_id, &challenge.id).await?;
        if let Some(done) = progress.iter().find(|row| row.minigame == game.as_str()) {
            return Ok(StartRoundOutcome::AlreadyCompleted {
                part_index: done.part_index,
                revealed_part: done.revealed_part.clone(),
            });
        }

        let part_index = part.index as i32;
        let value = part.value.clone();
        // Rng is not Send, so all sampling happens before the flow await.
        let (round, content) = {
            let mut rng = rand::thread_rng();
            match game {
                Minigame::Wheel => (
                    RoundState::Wheel {
                        part_index,
                        part: value.clone(),
                    },
                    RoundContent::Wheel {
                        segments: wheel_segments(&mut rng, &value),
                    },
                ),
                Minigame::Quiz => {
                    let picked = quiz_round(&mut rng);
                    let questions = picked
                        .iter()
                        .map(|&i| QuizPrompt {
                            question: QUIZ_BANK[i].question.to_string(),
                            options: QUIZ_BANK[i].options.iter().map(|o| o.to_string()).collect(),
                        })
                        .collect();
                    let answer_key = picked.iter().map(|&i| QUIZ_BANK[i].answer).collect();
                    (
                        RoundState::Quiz {
                            part_index,
                            part: value.clone(),
                            answer_key,
                        },
                        RoundContent::Quiz { questions },
                    )
                }
                Minigame::Memory => (
                    RoundState::Memory {
                        part_index,
                        part: value.clone(),
                    },
                    RoundContent::Memory {
                        cards: memory_cards(&mut rng, &value),
                    },
                ),
                Minigame::Slider => (
                    RoundState::Slider {
                        part_index,
                        part: value.clone(),
                    },
                    RoundContent::Slider {
                        tiles: slider_puzzle(&mut rng),
                    },
                ),
                Minigame::Scramble => {
                    let scramble = scramble_round(&mut rng);
                    (
                        RoundState::Scramble {
                            part_index,
                            part: value.clone(),
                            word: scramble.word,
                        },
                        RoundContent::Scramble {
                            scrambled: scramble.scrambled,
                            hint: scramble.hint,
                        },
                    )
                }
            }
        };

        let flow_id = self
            .flows
            .begin(FlowData::MinigameRound {
                user_id,
                challenge_id: challenge.id.clone(),
                round,
            })
            .await?;
        Ok(StartRoundOutcome::Started {
            flow_id,
            game,
            content,
        })
    }
}
