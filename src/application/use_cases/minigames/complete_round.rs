use std::collections::HashSet;

use uuid::Uuid;

use crate::application::ports::challenge_repository::ChallengeRepository;
use crate::application::ports::flow_store::{FlowData, FlowStore, RoundState};
use crate::application::ports::minigame_repository::MinigameRepository;
use crate::application::services::minigames::{
    grade_quiz, quiz_passed, revealed_key, scramble_matches, slider_solved, split_key,
};
use crate::domain::challenges::challenge::LayeredMessage;
use crate::domain::challenges::minigame::Minigame;

pub struct CompleteRound<'a, C, M, F>
where
    C: ChallengeRepository + ?Sized,
    M: MinigameRepository + ?Sized,
    F: FlowStore + ?Sized,
{
    pub challenges: &'a C,
    pub minigames: &'a M,
    pub flows: &'a F,
}

/// What the client sent for its half of the round.
#[derive(Debug)]
pub enum RoundSubmission {
    /// Wheel and memory only report that the round finished.
    Finished,
    Quiz { answers: Vec<usize> },
    Slider { state: Vec<u8> },
    Scramble { answer: String },
}

#[derive(Debug)]
pub struct RevealedPart {
    pub game: Minigame,
    pub part_index: i32,
    pub part: String,
    pub masked_key: String,
    pub key_complete: bool,
}

#[derive(Debug)]
pub enum CompleteRoundOutcome {
    NotFound,
    /// Unknown, expired, or mismatched flow. Flows are single-use.
    InvalidFlow,
    QuizFailed { correct: usize, total: usize },
    WrongAnswer { message: &'static str },
    Revealed(RevealedPart),
}

impl<'a, C, M, F> CompleteRound<'a, C, M, F>
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
        flow_id: Uuid,
        submission: RoundSubmission,
    ) -> anyhow::Result<CompleteRoundOutcome> {
        let round = match self.flows.take(flow_id).await? {
            Some(FlowData::MinigameRound {
                user_id: owner,
                challenge_id: flow_challenge,
                round,
            }) if owner == user_id
                && flow_challenge == challenge_id
                && round.minigame() == game =>
            {
                round
            }
            _ => return Ok(CompleteRoundOutcome::InvalidFlow),
        };

        match (&round, &submission) {
            (RoundState::Wheel { .. }, RoundSubmission::Finished)
            | (RoundState::Memory { .. }, RoundSubmission::Finished) => {}
            (RoundState::Quiz { answer_key, .. }, RoundSubmission::Quiz { answers }) => {
                let (correct, total) = grade_quiz(answer_key, answers);
                if !quiz_passed(correct) {
                    return Ok(CompleteRoundOutcome::QuizFailed { correct, total });
                }
            }
            (RoundState::Slider { .. }, RoundSubmission::Slider { state }) => {
                if !slider_solved(state) {
                    return Ok(CompleteRoundOutcome::WrongAnswer {
                        message: "puzzle is not in the solved position",
                    });
                }
            }
            (RoundState::Scramble { word, .. }, RoundSubmission::Scramble { answer }) => {
                if !scramble_matches(answer, word) {
                    return Ok(CompleteRoundOutcome::WrongAnswer {
                        message: "that is not the word",
                    });
                }
            }
            _ => return Ok(CompleteRoundOutcome::InvalidFlow),
        }

        let challenge = match self.challenges.find_by_id(challenge_id).await? {
            Some(c) if c.is_active => c,
            _ => return Ok(CompleteRoundOutcome::NotFound),
        };

        let (part_index, part) = round.part();
        self.minigames
            .mark_completed(user_id, &challenge.id, game.as_str(), part_index, part)
            .await?;

        let parts = LayeredMessage::parse(&challenge.encrypted_message)
            .map(|layered| split_key(&layered.key))
            .unwrap_or_default();
        let completed: HashSet<Minigame> = self
            .minigames
            .progress_for(user_id, &challenge.id)
            .await?
            .iter()
            .filter_map(|row| Minigame::parse(&row.minigame))
            .collect();
        let masked_key = revealed_key(&parts, &completed);
        let key_complete = !parts.is_empty() && parts.iter().all(|p| completed.contains(&p.game));

        Ok(CompleteRoundOutcome::Revealed(RevealedPart {
            game,
            part_index,
            part: part.to_string(),
            masked_key,
            key_complete,
        }))
    }
}
