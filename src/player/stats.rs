use serde::{Deserialize, Serialize};

use crate::participation::models::ParticipationModel;

/// Aggregate counters recomputed from a player's full participation history
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStatistics {
    pub total_tournaments: i32,
    pub total_score: i64,
    pub best_position: Option<i32>,
    pub wins: i32,
}

impl PlayerStatistics {
    pub fn from_participations(participations: &[ParticipationModel]) -> Self {
        Self {
            total_tournaments: participations.len() as i32,
            total_score: participations.iter().map(|p| i64::from(p.score)).sum(),
            best_position: participations.iter().map(|p| p.position).min(),
            wins: participations.iter().filter(|p| p.position == 1).count() as i32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn participation(tournament_id: i64, position: i32, score: i32) -> ParticipationModel {
        ParticipationModel {
            tournament_id,
            player_id: 1,
            position,
            score,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn counts_every_field() {
        let stats = PlayerStatistics::from_participations(&[
            participation(1, 3, 40),
            participation(2, 1, 100),
            participation(3, 1, 90),
            participation(4, 7, 0),
        ]);

        assert_eq!(
            stats,
            PlayerStatistics {
                total_tournaments: 4,
                total_score: 230,
                best_position: Some(1),
                wins: 2,
            }
        );
    }

    #[test]
    fn no_participations_resets_counters() {
        assert_eq!(
            PlayerStatistics::from_participations(&[]),
            PlayerStatistics {
                total_tournaments: 0,
                total_score: 0,
                best_position: None,
                wins: 0,
            }
        );
    }

    #[test]
    fn best_position_without_wins() {
        let stats =
            PlayerStatistics::from_participations(&[participation(1, 4, 10), participation(2, 2, 30)]);
        assert_eq!(stats.best_position, Some(2));
        assert_eq!(stats.wins, 0);
    }
}
