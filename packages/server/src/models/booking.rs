use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::shared::Pagination;
use crate::catalog::{CatalogError, input, money};
use crate::entity::{booking, ticket};

pub const MAX_TICKETS_PER_BOOKING: i32 = 20;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateBookingRequest {
    pub movie_id: i32,
    pub user_id: i32,
    pub cinema_id: i32,
    pub showtime_id: Option<i32>,
    #[schema(example = 2)]
    pub ticket_count: i32,
    /// Defaults to now.
    pub booking_date: Option<DateTime<Utc>>,
}

impl CreateBookingRequest {
    pub fn validate(&self) -> Result<(), CatalogError> {
        input::id("movie_id", self.movie_id)?;
        input::id("user_id", self.user_id)?;
        input::id("cinema_id", self.cinema_id)?;
        if let Some(showtime_id) = self.showtime_id {
            input::id("showtime_id", showtime_id)?;
        }
        if !(1..=MAX_TICKETS_PER_BOOKING).contains(&self.ticket_count) {
            return Err(CatalogError::invalid(
                "ticket_count",
                format!("Ticket count must be 1-{MAX_TICKETS_PER_BOOKING}"),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BookingListQuery {
    pub movie_id: Option<i32>,
    pub user_id: Option<i32>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct BookingResponse {
    pub id: i32,
    pub booking_date: DateTime<Utc>,
    pub ticket_count: i32,
    #[schema(value_type = String, example = "25.00")]
    pub total_price: Decimal,
    pub movie_id: i32,
    pub user_id: i32,
    pub cinema_id: i32,
    pub showtime_id: Option<i32>,
}

impl From<booking::Model> for BookingResponse {
    fn from(m: booking::Model) -> Self {
        Self {
            id: m.id,
            booking_date: m.booking_date,
            ticket_count: m.ticket_count,
            total_price: money(m.total_price),
            movie_id: m.movie_id,
            user_id: m.user_id,
            cinema_id: m.cinema_id,
            showtime_id: m.showtime_id,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct TicketResponse {
    pub id: i32,
    pub seat_number: String,
    #[schema(value_type = String, example = "12.50")]
    pub price: Decimal,
    pub seat_id: Option<i32>,
}

impl From<ticket::Model> for TicketResponse {
    fn from(m: ticket::Model) -> Self {
        Self {
            id: m.id,
            seat_number: m.seat_number,
            price: money(m.price),
            seat_id: m.seat_id,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct BookingDetailResponse {
    #[serde(flatten)]
    pub booking: BookingResponse,
    pub movie_title: Option<String>,
    pub user_name: Option<String>,
    pub cinema_name: Option<String>,
    pub tickets: Vec<TicketResponse>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct BookingListResponse {
    pub data: Vec<BookingResponse>,
    pub pagination: Pagination,
}
