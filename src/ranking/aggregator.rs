use std::collections::HashMap;

use crate::participation::models::ParticipationModel;

/// A player's place in a season leaderboard before it is persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankedPlayer {
    pub player_id: i64,
    pub score: i64,
    pub position: i32,
}

/// Sums scores per player and assigns dense 1-based positions.
///
/// Higher total first; equal totals are ordered by ascending player id so the
/// result is deterministic for any input order.
pub fn aggregate(participations: &[ParticipationModel]) -> Vec<RankedPlayer> {
    let mut totals: HashMap<i64, i64> = HashMap::new();
    for participation in participations {
        *totals.entry(participation.player_id).or_default() += i64::from(participation.score);
    }

    let mut standings: Vec<(i64, i64)> = totals.into_iter().collect();
    standings.sort_by(|(a_id, a_score), (b_id, b_score)| {
        b_score.cmp(a_score).then(a_id.cmp(b_id))
    });

    standings
        .into_iter()
        .zip(1..)
        .map(|((player_id, score), position)| RankedPlayer {
            player_id,
            score,
            position,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rstest::rstest;

    fn participation(tournament_id: i64, player_id: i64, score: i32) -> ParticipationModel {
        ParticipationModel {
            tournament_id,
            player_id,
            position: 1,
            score,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn sums_scores_across_tournaments() {
        // A: 100 + 50, B: 80 + 80
        let ranked = aggregate(&[
            participation(1, 1, 100),
            participation(1, 2, 80),
            participation(2, 1, 50),
            participation(2, 2, 80),
        ]);

        assert_eq!(
            ranked,
            vec![
                RankedPlayer {
                    player_id: 2,
                    score: 160,
                    position: 1
                },
                RankedPlayer {
                    player_id: 1,
                    score: 150,
                    position: 2
                },
            ]
        );
    }

    #[test]
    fn empty_input_gives_empty_leaderboard() {
        assert!(aggregate(&[]).is_empty());
    }

    #[rstest]
    #[case(vec![(9, 40), (3, 40), (5, 40)], vec![3, 5, 9])]
    #[case(vec![(4, 10), (2, 30), (8, 30)], vec![2, 8, 4])]
    #[case(vec![(1, 0), (2, 0)], vec![1, 2])]
    fn ties_break_on_player_id(#[case] scores: Vec<(i64, i32)>, #[case] expected: Vec<i64>) {
        let participations: Vec<ParticipationModel> = scores
            .into_iter()
            .map(|(player_id, score)| participation(1, player_id, score))
            .collect();

        let order: Vec<i64> = aggregate(&participations)
            .into_iter()
            .map(|r| r.player_id)
            .collect();
        assert_eq!(order, expected);
    }

    #[test]
    fn positions_are_dense_and_scores_non_increasing() {
        let participations: Vec<ParticipationModel> = (1..=20)
            .map(|i| participation(i % 4, i % 7, ((i * 37) % 50) as i32))
            .collect();

        let ranked = aggregate(&participations);
        let positions: Vec<i32> = ranked.iter().map(|r| r.position).collect();
        assert_eq!(positions, (1..=ranked.len() as i32).collect::<Vec<_>>());
        assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));

        let total: i64 = ranked.iter().map(|r| r.score).sum();
        let expected: i64 = participations.iter().map(|p| i64::from(p.score)).sum();
        assert_eq!(total, expected);
    }
}
