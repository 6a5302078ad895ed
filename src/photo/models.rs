use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{postgres::PgRow, FromRow, Row};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// Gallery section a photo is filed under. Parsing also accepts the
/// Portuguese labels used by the public site.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    EnumIter,
    EnumString,
    Display,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(ascii_case_insensitive)]
pub enum PhotoCategory {
    #[default]
    #[strum(to_string = "SEASON", serialize = "TEMPORADA")]
    #[serde(alias = "TEMPORADA")]
    Season,
    #[strum(to_string = "HALL_OF_FAME", serialize = "HALL_DA_FAMA")]
    #[serde(alias = "HALL_DA_FAMA")]
    HallOfFame,
    #[strum(to_string = "BEST_MOMENTS", serialize = "MELHORES_MOMENTOS")]
    #[serde(alias = "MELHORES_MOMENTOS")]
    BestMoments,
}

impl PhotoCategory {
    /// Unknown labels land in the season section
    pub fn parse_lenient(raw: &str) -> Self {
        raw.trim().parse().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoModel {
    pub id: i64,
    pub image_url: String,
    pub caption: Option<String>,
    pub album: String,
    pub category: PhotoCategory,
    pub date: DateTime<Utc>,
    pub tournament_id: Option<i64>,
    pub season_id: Option<i64>,
    pub player_id: Option<i64>,
}

impl<'r> FromRow<'r, PgRow> for PhotoModel {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let category: String = row.try_get("category")?;
        Ok(Self {
            id: row.try_get("id")?,
            image_url: row.try_get("image_url")?,
            caption: row.try_get("caption")?,
            album: row.try_get("album")?,
            category: PhotoCategory::parse_lenient(&category),
            date: row.try_get("date")?,
            tournament_id: row.try_get("tournament_id")?,
            season_id: row.try_get("season_id")?,
            player_id: row.try_get("player_id")?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct NewPhoto {
    pub image_url: String,
    pub caption: Option<String>,
    pub album: String,
    pub category: PhotoCategory,
    pub tournament_id: Option<i64>,
    pub season_id: Option<i64>,
    pub player_id: Option<i64>,
}
