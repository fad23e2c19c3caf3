use crate::types::*;

/// Per-participant summary for the current round.
///
/// Only registered participants are listed. Answer counts cover the
/// current round only; scores are the running ledger values.
pub fn calculate_round_statistics(game: &GameState) -> RoundStatistics {
    let round = game.current_round;

    game.participants
        .values()
        .filter(|p| p.registered)
        .map(|participant| {
            let score = game.scores.get(&participant.id).copied().unwrap_or_default();

            let (total_answers, correct_answers) = game
                .answers
                .iter()
                .filter(|(key, _)| key.round == round)
                .filter_map(|(_, answers)| answers.get(&participant.id))
                .fold((0u32, 0u32), |(total, correct), record| {
                    (total + 1, correct + u32::from(record.is_correct))
                });

            let stats = ParticipantStats {
                name: participant.name.clone().unwrap_or_default(),
                score: score.total(),
                round1_score: score.round1(),
                round2_score: score.round2(),
                correct_answers,
                total_answers,
            };
            (participant.id.clone(), stats)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    #[tokio::test]
    async fn test_counts_current_round_only() {
        let state = small_state();
        let alice = register(&state, 1, "Alice").await;
        let bob = register(&state, 2, "Bob").await;

        state.submit_answer(&alice, "C").await.unwrap();
        state.submit_answer(&bob, "B").await.unwrap();
        state.advance_question().await;
        state.submit_answer(&alice, "B").await.unwrap();

        let stats = calculate_round_statistics(&*state.game.read().await);
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[&alice].total_answers, 2);
        assert_eq!(stats[&alice].correct_answers, 1);
        assert_eq!(stats[&alice].score, 1);
        assert_eq!(stats[&alice].round1_score, 1);
        assert_eq!(stats[&bob].total_answers, 1);
        assert_eq!(stats[&bob].correct_answers, 0);

        // Answers from another round are not counted
        state.game.write().await.current_round = Round::Two;
        let stats = calculate_round_statistics(&*state.game.read().await);
        assert_eq!(stats[&alice].total_answers, 0);
        assert_eq!(stats[&alice].score, 1);
    }

    #[tokio::test]
    async fn test_skips_unregistered_and_is_deterministic() {
        let state = small_state();
        register(&state, 1, "Alice").await;
        state.start_registration(2).await;

        let game = state.game.read().await;
        let first = calculate_round_statistics(&game);
        let second = calculate_round_statistics(&game);
        assert_eq!(first.len(), 1);
        assert!(first.contains_key("tg_1"));
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_game() {
        assert!(calculate_round_statistics(&GameState::default()).is_empty());
    }
}
