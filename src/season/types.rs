use serde::{Deserialize, Serialize};

use super::models::SeasonModel;
use crate::ranking::RankingEntry;
use crate::tournament::models::TournamentModel;
use crate::validation::{FieldError, Validate, Validator};

pub const MIN_SEASON_YEAR: i32 = 2020;

#[derive(Debug, Deserialize)]
pub struct CreateSeasonRequest {
    pub name: String,
    pub year: i32,
}

fn check_year(validator: &mut Validator, year: Option<i32>) -> &mut Validator {
    validator.check(
        year.map_or(true, |y| y >= MIN_SEASON_YEAR),
        "year",
        "year must be 2020 or later",
    )
}

impl Validate for CreateSeasonRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut validator = Validator::new();
        validator.not_blank(Some(self.name.as_str()), "name");
        check_year(&mut validator, Some(self.year)).finish()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateSeasonRequest {
    pub name: Option<String>,
    pub year: Option<i32>,
}

impl Validate for UpdateSeasonRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut validator = Validator::new();
        validator.not_blank(self.name.as_deref(), "name");
        check_year(&mut validator, self.year).finish()
    }
}

/// Season with its tournaments (oldest first) and leaderboard
#[derive(Debug, Clone, Serialize)]
pub struct SeasonOverview {
    #[serde(flatten)]
    pub season: SeasonModel,
    pub tournaments: Vec<TournamentModel>,
    pub rankings: Vec<RankingEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Liga", 2020, true)]
    #[case("Liga", 2019, false)]
    #[case(" ", 2024, false)]
    fn create_rules(#[case] name: &str, #[case] year: i32, #[case] valid: bool) {
        let request = CreateSeasonRequest {
            name: name.to_string(),
            year,
        };
        assert_eq!(request.validate().is_ok(), valid);
    }

    #[test]
    fn update_checks_present_fields_only() {
        assert!(UpdateSeasonRequest::default().validate().is_ok());
        let errors = UpdateSeasonRequest {
            name: None,
            year: Some(1999),
        }
        .validate()
        .unwrap_err();
        assert_eq!(errors[0].field, "year");
    }

    #[test]
    fn overview_flattens_season_fields() {
        let overview = SeasonOverview {
            season: SeasonModel {
                id: 3,
                name: "Liga 2024".to_string(),
                year: 2024,
                created_at: chrono::Utc::now(),
            },
            tournaments: Vec::new(),
            rankings: Vec::<RankingEntry>::new(),
        };
        let json = serde_json::to_value(&overview).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["year"], 2024);
        assert!(json["rankings"].as_array().unwrap().is_empty());
    }
}
