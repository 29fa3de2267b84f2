use std::str::FromStr;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Screening lifecycle of a movie.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    DeriveActiveEnum,
    EnumIter,
    utoipa::ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "PascalCase")]
pub enum MovieStatus {
    #[sea_orm(string_value = "Coming")]
    Coming,
    #[sea_orm(string_value = "Showing")]
    Showing,
    #[sea_orm(string_value = "Ended")]
    Ended,
}

impl FromStr for MovieStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "coming" => Ok(Self::Coming),
            "showing" => Ok(Self::Showing),
            "ended" => Ok(Self::Ended),
            other => Err(format!(
                "Unknown status '{other}', expected Coming, Showing or Ended"
            )),
        }
    }
}

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "movie")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub title: String,
    pub description: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub price: Decimal,
    /// Public path of the poster under `/uploads/movies`.
    pub img_url: Option<String>,
    pub trailer_url: Option<String>,
    pub start_date: Date,
    pub end_date: Date,
    pub status: MovieStatus,

    pub cinema_id: i32,
    #[sea_orm(belongs_to, from = "cinema_id", to = "id")]
    pub cinema: Option<super::cinema::Entity>,

    pub category_id: i32,
    #[sea_orm(belongs_to, from = "category_id", to = "id")]
    pub category: Option<super::category::Entity>,

    /// Bumped by every successful update.
    pub version: i32,

    #[sea_orm(has_many)]
    pub movie_images: HasMany<super::movie_image::Entity>,

    #[sea_orm(has_many, via = "movie_actor")]
    pub actors: HasMany<super::actor::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
