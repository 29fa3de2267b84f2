use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::*;
use tracing::{info, instrument};

use crate::catalog::money;
use crate::entity::{booking, cinema, hall, movie, showtime};
use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::models::shared::{Pagination, page_bounds, page_offset};
use crate::models::showtime::*;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/",
    tag = "Showtimes",
    operation_id = "listShowtimes",
    summary = "List showtimes",
    description = "Showtimes ordered by start time. Optional `movie_id` and `cinema_id` filters.",
    params(ShowtimeListQuery),
    responses((status = 200, description = "Page of showtimes", body = ShowtimeListResponse)),
)]
#[instrument(skip(state, query))]
pub async fn list_showtimes(
    State(state): State<AppState>,
    Query(query): Query<ShowtimeListQuery>,
) -> Result<Json<ShowtimeListResponse>, AppError> {
    let limits = &state.config.listing;
    let (page, per_page) = page_bounds(
        query.page,
        query.per_page,
        limits.default_page_size,
        limits.max_page_size,
    );

    let mut select = showtime::Entity::find();
    if let Some(movie_id) = query.movie_id.filter(|id| *id > 0) {
        select = select.filter(showtime::Column::MovieId.eq(movie_id));
    }
    if let Some(cinema_id) = query.cinema_id.filter(|id| *id > 0) {
        select = select.filter(showtime::Column::CinemaId.eq(cinema_id));
    }

    let total = select.clone().count(&state.db).await?;
    let data = select
        .order_by_asc(showtime::Column::ShowDateTime)
        .order_by_asc(showtime::Column::Id)
        .offset(page_offset(page, per_page))
        .limit(per_page)
        .all(&state.db)
        .await?
        .into_iter()
        .map(ShowtimeResponse::from)
        .collect();

    Ok(Json(ShowtimeListResponse {
        data,
        pagination: Pagination::new(page, per_page, total),
    }))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Showtimes",
    operation_id = "createShowtime",
    summary = "Schedule a showtime",
    request_body = ShowtimeRequest,
    responses(
        (status = 201, description = "Showtime created", body = ShowtimeResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Movie, cinema or hall not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload))]
pub async fn create_showtime(
    State(state): State<AppState>,
    AppJson(payload): AppJson<ShowtimeRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    ensure_references(&state.db, &payload).await?;

    let model = showtime::ActiveModel {
        show_date_time: Set(payload.show_date_time),
        ticket_price: Set(money(payload.ticket_price)),
        movie_id: Set(payload.movie_id),
        cinema_id: Set(payload.cinema_id),
        hall_id: Set(payload.hall_id),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    info!(showtime_id = model.id, movie_id = model.movie_id, "Showtime created");
    Ok((StatusCode::CREATED, Json(ShowtimeResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Showtimes",
    operation_id = "getShowtime",
    summary = "Get a showtime by ID",
    params(("id" = i32, Path, description = "Showtime ID")),
    responses(
        (status = 200, description = "Showtime", body = ShowtimeResponse),
        (status = 404, description = "Showtime not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn get_showtime(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ShowtimeResponse>, AppError> {
    Ok(Json(find_showtime(&state.db, id).await?.into()))
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Showtimes",
    operation_id = "updateShowtime",
    summary = "Update a showtime",
    params(("id" = i32, Path, description = "Showtime ID")),
    request_body = ShowtimeRequest,
    responses(
        (status = 200, description = "Showtime updated", body = ShowtimeResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Showtime or a reference not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(id))]
pub async fn update_showtime(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<ShowtimeRequest>,
) -> Result<Json<ShowtimeResponse>, AppError> {
    payload.validate()?;
    let existing = find_showtime(&state.db, id).await?;
    ensure_references(&state.db, &payload).await?;

    let mut active: showtime::ActiveModel = existing.into();
    active.show_date_time = Set(payload.show_date_time);
    active.ticket_price = Set(money(payload.ticket_price));
    active.movie_id = Set(payload.movie_id);
    active.cinema_id = Set(payload.cinema_id);
    active.hall_id = Set(payload.hall_id);

    let model = active.update(&state.db).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Showtimes",
    operation_id = "deleteShowtime",
    summary = "Delete a showtime",
    description = "Returns 409 CONFLICT while bookings reference the showtime.",
    params(("id" = i32, Path, description = "Showtime ID")),
    responses(
        (status = 204, description = "Showtime deleted"),
        (status = 404, description = "Showtime not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Showtime has bookings (CONFLICT)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn delete_showtime(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;
    find_showtime(&txn, id).await?;

    let bookings = booking::Entity::find()
        .filter(booking::Column::ShowtimeId.eq(id))
        .count(&txn)
        .await?;
    if bookings > 0 {
        return Err(AppError::Conflict(format!(
            "Cannot delete a showtime with {bookings} booking(s)"
        )));
    }

    showtime::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    info!(showtime_id = id, "Showtime deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn find_showtime<C: ConnectionTrait>(db: &C, id: i32) -> Result<showtime::Model, AppError> {
    showtime::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Showtime {id} not found")))
}

/// The movie and cinema must exist; a hall, when given, must belong to the cinema.
async fn ensure_references<C: ConnectionTrait>(
    db: &C,
    payload: &ShowtimeRequest,
) -> Result<(), AppError> {
    if movie::Entity::find_by_id(payload.movie_id).one(db).await?.is_none() {
        return Err(AppError::NotFound(format!("Movie {} not found", payload.movie_id)));
    }
    if cinema::Entity::find_by_id(payload.cinema_id).one(db).await?.is_none() {
        return Err(AppError::NotFound(format!("Cinema {} not found", payload.cinema_id)));
    }
    if let Some(hall_id) = payload.hall_id {
        let hall = hall::Entity::find_by_id(hall_id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Hall {hall_id} not found")))?;
        if hall.cinema_id != payload.cinema_id {
            return Err(AppError::invalid_field(
                "hall_id",
                format!("Hall {hall_id} does not belong to cinema {}", payload.cinema_id),
            ));
        }
    }
    Ok(())
}
