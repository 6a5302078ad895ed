//! League fixtures - seasons, tournaments and players created through the services
#![allow(dead_code)] // Test utilities may not all be used in every test

use chrono::{TimeZone, Utc};

use poker_league::{
    participation::types::AddParticipationRequest,
    player::{models::PlayerModel, types::CreatePlayerRequest},
    season::{models::SeasonModel, types::CreateSeasonRequest},
    tournament::{models::TournamentModel, types::CreateTournamentRequest},
    AppState,
};

pub struct LeagueFixture {
    pub season: SeasonModel,
    pub tournaments: Vec<TournamentModel>,
    pub players: Vec<PlayerModel>,
}

impl LeagueFixture {
    pub fn tournament(&self, index: usize) -> i64 {
        self.tournaments[index].id
    }

    pub fn player(&self, index: usize) -> i64 {
        self.players[index].id
    }
}

pub struct LeagueFixtureBuilder {
    year: i32,
    tournaments: usize,
    players: Vec<String>,
}

impl LeagueFixtureBuilder {
    pub fn new() -> Self {
        Self {
            year: 2024,
            tournaments: 1,
            players: vec![],
        }
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = year;
        self
    }

    pub fn with_tournaments(mut self, count: usize) -> Self {
        self.tournaments = count;
        self
    }

    pub fn with_players(mut self, names: Vec<&str>) -> Self {
        self.players = names.into_iter().map(|s| s.to_string()).collect();
        self
    }

    pub async fn build(self, state: &AppState) -> LeagueFixture {
        let season = create_season(state, self.year).await;

        let mut tournaments = Vec::new();
        for index in 0..self.tournaments {
            tournaments.push(create_tournament(state, season.id, index as u32).await);
        }

        let mut players = Vec::new();
        for name in &self.players {
            players.push(create_player(state, name).await);
        }

        LeagueFixture {
            season,
            tournaments,
            players,
        }
    }
}

pub async fn create_season(state: &AppState, year: i32) -> SeasonModel {
    state
        .season_service
        .create(CreateSeasonRequest {
            name: format!("Season {year}"),
            year,
        })
        .await
        .unwrap()
}

pub async fn create_tournament(state: &AppState, season_id: i64, index: u32) -> TournamentModel {
    state
        .tournament_service
        .create(CreateTournamentRequest {
            season_id,
            name: format!("Stage {}", index + 1),
            date_time: Utc.with_ymd_and_hms(2024, 1, 1 + index % 28, 20, 0, 0).unwrap(),
            location: "Club".to_string(),
            notes: None,
            active: None,
        })
        .await
        .unwrap()
        .tournament
}

pub async fn create_player(state: &AppState, name: &str) -> PlayerModel {
    state
        .player_service
        .create(CreatePlayerRequest {
            name: name.to_string(),
            ..Default::default()
        })
        .await
        .unwrap()
}

pub async fn add_result(
    state: &AppState,
    tournament_id: i64,
    player_id: i64,
    position: i32,
    score: i32,
) {
    state
        .participation_service
        .add(
            tournament_id,
            AddParticipationRequest {
                player_id,
                position,
                score,
            },
        )
        .await
        .unwrap();
}
