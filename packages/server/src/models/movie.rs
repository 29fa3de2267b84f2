use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::shared::{Pagination, SelectOption};
use crate::catalog::{FileCleanup, money};
use crate::entity::{MovieStatus, movie, movie_image};

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MovieListQuery {
    /// Case-insensitive substring of the title.
    pub search: Option<String>,
    /// Ignored unless positive.
    pub category_id: Option<i32>,
    /// Ignored unless positive.
    pub cinema_id: Option<i32>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MovieFormQuery {
    pub cinema_id: Option<i32>,
    pub category_id: Option<i32>,
    /// Comma-separated actor ids to mark as selected.
    pub actor_ids: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct MovieResponse {
    pub id: i32,
    #[schema(example = "Dune")]
    pub title: String,
    pub description: Option<String>,
    #[schema(value_type = String, example = "12.50")]
    pub price: Decimal,
    /// Public poster path.
    #[schema(example = "/uploads/movies/0b6c2c1e-6f4d-4b8f-9d59-0f1c1a8e4a55.jpg")]
    pub img_url: Option<String>,
    pub trailer_url: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: MovieStatus,
    pub cinema_id: i32,
    pub category_id: i32,
    /// Pass back on update to detect concurrent edits.
    #[schema(example = 1)]
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<movie::Model> for MovieResponse {
    fn from(m: movie::Model) -> Self {
        Self {
            id: m.id,
            title: m.title,
            description: m.description,
            price: money(m.price),
            img_url: m.img_url,
            trailer_url: m.trailer_url,
            start_date: m.start_date,
            end_date: m.end_date,
            status: m.status,
            cinema_id: m.cinema_id,
            category_id: m.category_id,
            version: m.version,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct MovieImageResponse {
    pub id: i32,
    pub img_url: String,
}

impl From<movie_image::Model> for MovieImageResponse {
    fn from(m: movie_image::Model) -> Self {
        Self {
            id: m.id,
            img_url: m.img_url,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct MovieActorItem {
    pub id: i32,
    #[schema(example = "Timothée Chalamet")]
    pub name: String,
    pub profile_picture: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct MovieDetailResponse {
    #[serde(flatten)]
    pub movie: MovieResponse,
    pub cinema_name: Option<String>,
    pub category_name: Option<String>,
    pub images: Vec<MovieImageResponse>,
    pub actors: Vec<MovieActorItem>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct MovieListItem {
    pub id: i32,
    pub title: String,
    #[schema(value_type = String, example = "12.50")]
    pub price: Decimal,
    pub img_url: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: MovieStatus,
    pub cinema_id: i32,
    pub cinema_name: Option<String>,
    pub category_id: i32,
    pub category_name: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct MovieListResponse {
    pub data: Vec<MovieListItem>,
    pub pagination: Pagination,
    /// Every category, for the filter dropdown.
    pub categories: Vec<SelectOption>,
    /// Every cinema, for the filter dropdown.
    pub cinemas: Vec<SelectOption>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct MovieFormOptions {
    pub cinemas: Vec<SelectOption>,
    pub categories: Vec<SelectOption>,
    pub actors: Vec<SelectOption>,
    pub statuses: Vec<MovieStatus>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct UpdateMovieResponse {
    #[serde(flatten)]
    pub movie: MovieDetailResponse,
    /// Outcome of removing superseded files. Failures here never fail the update.
    pub cleanup: FileCleanup,
}
