use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::prelude::Expr;
use sea_orm::*;
use tracing::{info, instrument};

use crate::catalog::money;
use crate::entity::{booking, cinema, movie, seat, showtime, ticket, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::models::booking::*;
use crate::models::shared::{Pagination, page_bounds, page_offset};
use crate::state::AppState;

/// Seat label used for general-admission tickets issued with a booking.
const GENERAL_ADMISSION: &str = "GA";

#[utoipa::path(
    get,
    path = "/",
    tag = "Bookings",
    operation_id = "listBookings",
    summary = "List bookings",
    description = "Newest bookings first. Optional `movie_id` and `user_id` filters.",
    params(BookingListQuery),
    responses((status = 200, description = "Page of bookings", body = BookingListResponse)),
)]
#[instrument(skip(state, query))]
pub async fn list_bookings(
    State(state): State<AppState>,
    Query(query): Query<BookingListQuery>,
) -> Result<Json<BookingListResponse>, AppError> {
    let limits = &state.config.listing;
    let (page, per_page) = page_bounds(
        query.page,
        query.per_page,
        limits.default_page_size,
        limits.max_page_size,
    );

    let mut select = booking::Entity::find();
    if let Some(movie_id) = query.movie_id.filter(|id| *id > 0) {
        select = select.filter(booking::Column::MovieId.eq(movie_id));
    }
    if let Some(user_id) = query.user_id.filter(|id| *id > 0) {
        select = select.filter(booking::Column::UserId.eq(user_id));
    }

    let total = select.clone().count(&state.db).await?;
    let data = select
        .order_by_desc(booking::Column::BookingDate)
        .order_by_desc(booking::Column::Id)
        .offset(page_offset(page, per_page))
        .limit(per_page)
        .all(&state.db)
        .await?
        .into_iter()
        .map(BookingResponse::from)
        .collect();

    Ok(Json(BookingListResponse {
        data,
        pagination: Pagination::new(page, per_page, total),
    }))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Bookings",
    operation_id = "createBooking",
    summary = "Create a booking",
    description = "Issues `ticket_count` general-admission tickets. The unit price is the showtime's ticket price when a showtime is given, otherwise the movie price.",
    request_body = CreateBookingRequest,
    responses(
        (status = 201, description = "Booking created", body = BookingDetailResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "A referenced record was not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload))]
pub async fn create_booking(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateBookingRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let txn = state.db.begin().await?;

    let movie = movie::Entity::find_by_id(payload.movie_id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Movie {} not found", payload.movie_id)))?;
    let user = user::Entity::find_by_id(payload.user_id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", payload.user_id)))?;
    let cinema = cinema::Entity::find_by_id(payload.cinema_id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Cinema {} not found", payload.cinema_id)))?;

    let unit_price = match payload.showtime_id {
        Some(showtime_id) => {
            let showtime = showtime::Entity::find_by_id(showtime_id)
                .one(&txn)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Showtime {showtime_id} not found")))?;
            if showtime.movie_id != movie.id || showtime.cinema_id != cinema.id {
                return Err(AppError::invalid_field(
                    "showtime_id",
                    format!("Showtime {showtime_id} is not for this movie and cinema"),
                ));
            }
            money(showtime.ticket_price)
        }
        None => money(movie.price),
    };
    let total_price = money(unit_price * Decimal::from(payload.ticket_count));

    let booking = booking::ActiveModel {
        booking_date: Set(payload.booking_date.unwrap_or_else(Utc::now)),
        ticket_count: Set(payload.ticket_count),
        total_price: Set(total_price),
        movie_id: Set(movie.id),
        user_id: Set(user.id),
        cinema_id: Set(cinema.id),
        showtime_id: Set(payload.showtime_id),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let tickets: Vec<ticket::ActiveModel> = (1..=payload.ticket_count)
        .map(|n| ticket::ActiveModel {
            seat_number: Set(format!("{GENERAL_ADMISSION}-{n}")),
            price: Set(unit_price),
            booking_id: Set(booking.id),
            seat_id: Set(None),
            ..Default::default()
        })
        .collect();
    ticket::Entity::insert_many(tickets).exec(&txn).await?;

    txn.commit().await?;

    info!(
        booking_id = booking.id,
        movie_id = movie.id,
        tickets = payload.ticket_count,
        "Booking created"
    );

    let detail = booking_detail(&state.db, booking).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Bookings",
    operation_id = "getBooking",
    summary = "Get a booking by ID",
    params(("id" = i32, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Booking with tickets", body = BookingDetailResponse),
        (status = 404, description = "Booking not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn get_booking(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<BookingDetailResponse>, AppError> {
    let model = find_booking(&state.db, id).await?;
    Ok(Json(booking_detail(&state.db, model).await?))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Bookings",
    operation_id = "deleteBooking",
    summary = "Delete a booking",
    description = "Releases reserved seats, then removes the booking. Tickets and payments go with it.",
    params(("id" = i32, Path, description = "Booking ID")),
    responses(
        (status = 204, description = "Booking deleted"),
        (status = 404, description = "Booking not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn delete_booking(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;
    find_booking(&txn, id).await?;

    let released = seat::Entity::update_many()
        .col_expr(seat::Column::IsReserved, Expr::value(false))
        .col_expr(seat::Column::BookingId, Expr::value(Option::<i32>::None))
        .filter(seat::Column::BookingId.eq(id))
        .exec(&txn)
        .await?
        .rows_affected;

    // Tickets and payments cascade through their foreign keys.
    booking::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    info!(booking_id = id, released_seats = released, "Booking deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn find_booking<C: ConnectionTrait>(db: &C, id: i32) -> Result<booking::Model, AppError> {
    booking::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Booking {id} not found")))
}

async fn booking_detail<C: ConnectionTrait>(
    db: &C,
    model: booking::Model,
) -> Result<BookingDetailResponse, AppError> {
    let movie_title = movie::Entity::find_by_id(model.movie_id)
        .one(db)
        .await?
        .map(|m| m.title);
    let user_name = user::Entity::find_by_id(model.user_id)
        .one(db)
        .await?
        .map(|u| u.full_name);
    let cinema_name = cinema::Entity::find_by_id(model.cinema_id)
        .one(db)
        .await?
        .map(|c| c.name);
    let tickets = ticket::Entity::find()
        .filter(ticket::Column::BookingId.eq(model.id))
        .order_by_asc(ticket::Column::Id)
        .all(db)
        .await?
        .into_iter()
        .map(TicketResponse::from)
        .collect();

    Ok(BookingDetailResponse {
        booking: model.into(),
        movie_title,
        user_name,
        cinema_name,
        tickets,
    })
}
