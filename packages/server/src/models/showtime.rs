use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::shared::Pagination;
use crate::catalog::{CatalogError, input, money};
use crate::entity::showtime;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ShowtimeRequest {
    pub show_date_time: DateTime<Utc>,
    pub movie_id: i32,
    pub cinema_id: i32,
    pub hall_id: Option<i32>,
    #[schema(value_type = String, example = "9.50")]
    pub ticket_price: Decimal,
}

impl ShowtimeRequest {
    pub fn validate(&self) -> Result<(), CatalogError> {
        input::price("ticket_price", self.ticket_price)?;
        input::id("movie_id", self.movie_id)?;
        input::id("cinema_id", self.cinema_id)?;
        if let Some(hall_id) = self.hall_id {
            input::id("hall_id", hall_id)?;
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ShowtimeListQuery {
    pub movie_id: Option<i32>,
    pub cinema_id: Option<i32>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ShowtimeResponse {
    pub id: i32,
    pub show_date_time: DateTime<Utc>,
    pub movie_id: i32,
    pub cinema_id: i32,
    pub hall_id: Option<i32>,
    #[schema(value_type = String, example = "9.50")]
    pub ticket_price: Decimal,
}

impl From<showtime::Model> for ShowtimeResponse {
    fn from(m: showtime::Model) -> Self {
        Self {
            id: m.id,
            show_date_time: m.show_date_time,
            movie_id: m.movie_id,
            cinema_id: m.cinema_id,
            hall_id: m.hall_id,
            ticket_price: money(m.ticket_price),
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ShowtimeListResponse {
    pub data: Vec<ShowtimeResponse>,
    pub pagination: Pagination,
}
