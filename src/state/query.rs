//! Read-only views for dashboards and integrations

use super::AppState;
use crate::protocol::{ParticipantSummary, ScoreEntry};
use crate::types::*;
use std::collections::BTreeMap;

impl AppState {
    /// Answers recorded for a question
    pub async fn answers_for(&self, key: QuestionKey) -> Vec<AnswerRecord> {
        self.game
            .read()
            .await
            .answers
            .get(&key)
            .map(|answers| answers.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Answers recorded for the active question
    pub async fn current_answers(&self) -> Vec<AnswerRecord> {
        self.game
            .read()
            .await
            .current_answers()
            .map(|answers| answers.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Registered participants with their total score
    pub async fn participant_roster(&self) -> Vec<ParticipantSummary> {
        let game = self.game.read().await;
        game.participants
            .values()
            .filter(|p| p.registered)
            .map(|p| ParticipantSummary {
                user_id: p.id.clone(),
                name: p.name.clone().unwrap_or_default(),
                color: p.color.clone(),
                score: game.scores.get(&p.id).map_or(0, Score::total),
            })
            .collect()
    }

    /// Full score table keyed by participant id
    pub async fn score_table(&self) -> BTreeMap<ParticipantId, ScoreEntry> {
        let game = self.game.read().await;
        game.scores
            .iter()
            .map(|(id, score)| {
                let name = game
                    .participants
                    .get(id)
                    .and_then(|p| p.name.clone())
                    .unwrap_or_else(|| "Unknown".to_string());
                let entry = ScoreEntry {
                    name,
                    total: score.total(),
                    round1: score.round1(),
                    round2: score.round2(),
                };
                (id.clone(), entry)
            })
            .collect()
    }
}
