use axum::Json;
use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::UploadedFile;
use sea_orm::*;
use tracing::{info, instrument, warn};

use crate::catalog::input::present;
use crate::entity::{cinema, hall, movie};
use crate::error::{AppError, ErrorBody};
use crate::extractors::form::FormData;
use crate::models::cinema::*;
use crate::state::AppState;

/// Upload folder for cinema logos.
pub const CINEMA_FOLDER: &str = "cinemas";

/// Body limit for cinema forms: one logo plus the text parts.
pub fn cinema_form_body_limit(max_upload_bytes: u64) -> DefaultBodyLimit {
    DefaultBodyLimit::max(usize::try_from(max_upload_bytes.saturating_mul(2)).unwrap_or(usize::MAX))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Cinemas",
    operation_id = "listCinemas",
    summary = "List all cinemas",
    responses((status = 200, description = "Cinemas sorted by name", body = Vec<CinemaResponse>)),
)]
#[instrument(skip(state))]
pub async fn list_cinemas(State(state): State<AppState>) -> Result<Json<Vec<CinemaResponse>>, AppError> {
    let data = cinema::Entity::find()
        .order_by_asc(cinema::Column::Name)
        .all(&state.db)
        .await?
        .into_iter()
        .map(CinemaResponse::from)
        .collect();
    Ok(Json(data))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Cinemas",
    operation_id = "createCinema",
    summary = "Create a cinema",
    description = "Text parts: `name`, `address`, `description`. Optional image part `logo`.",
    request_body(content_type = "multipart/form-data", description = "Cinema form"),
    responses(
        (status = 201, description = "Cinema created", body = CinemaResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, multipart))]
pub async fn create_cinema(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let policy = state.upload_policy();
    let mut form = FormData::read(multipart, policy.max_bytes).await?;
    let fields = cinema_fields(&form);
    let logo = present(form.take_file("logo"));

    fields.validate()?;
    check_logo(&state, logo.as_ref())?;

    let logo_path = match logo {
        Some(ref file) => Some(state.files.put(file, &policy, CINEMA_FOLDER).await?),
        None => None,
    };

    let inserted = cinema::ActiveModel {
        name: Set(fields.name),
        description: Set(fields.description),
        address: Set(fields.address),
        cinema_logo: Set(logo_path.clone()),
        ..Default::default()
    }
    .insert(&state.db)
    .await;

    match inserted {
        Ok(model) => Ok((StatusCode::CREATED, Json(CinemaResponse::from(model)))),
        Err(e) => {
            discard(&state, logo_path).await;
            Err(e.into())
        }
    }
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Cinemas",
    operation_id = "getCinema",
    summary = "Get a cinema by ID",
    params(("id" = i32, Path, description = "Cinema ID")),
    responses(
        (status = 200, description = "Cinema details", body = CinemaDetailResponse),
        (status = 404, description = "Cinema not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn get_cinema(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<CinemaDetailResponse>, AppError> {
    let model = find_cinema(&state.db, id).await?;
    let movie_count = movie::Entity::find()
        .filter(movie::Column::CinemaId.eq(id))
        .count(&state.db)
        .await?;
    let hall_count = hall::Entity::find()
        .filter(hall::Column::CinemaId.eq(id))
        .count(&state.db)
        .await?;

    Ok(Json(CinemaDetailResponse {
        cinema: model.into(),
        movie_count,
        hall_count,
    }))
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Cinemas",
    operation_id = "updateCinema",
    summary = "Update a cinema",
    description = "Replaces the text fields. A new `logo` replaces the old one, which is removed after the update is saved.",
    params(("id" = i32, Path, description = "Cinema ID")),
    request_body(content_type = "multipart/form-data", description = "Cinema form"),
    responses(
        (status = 200, description = "Cinema updated", body = CinemaResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Cinema not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, multipart), fields(id))]
pub async fn update_cinema(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> Result<Json<CinemaResponse>, AppError> {
    let policy = state.upload_policy();
    let mut form = FormData::read(multipart, policy.max_bytes).await?;
    let fields = cinema_fields(&form);
    let logo = present(form.take_file("logo"));

    fields.validate()?;
    check_logo(&state, logo.as_ref())?;

    let existing = find_cinema(&state.db, id).await?;
    let old_logo = existing.cinema_logo.clone();

    let new_logo = match logo {
        Some(ref file) => Some(state.files.put(file, &policy, CINEMA_FOLDER).await?),
        None => None,
    };

    let mut active: cinema::ActiveModel = existing.into();
    active.name = Set(fields.name);
    active.description = Set(fields.description);
    active.address = Set(fields.address);
    if new_logo.is_some() {
        active.cinema_logo = Set(new_logo.clone());
    }

    let model = match active.update(&state.db).await {
        Ok(model) => model,
        Err(e) => {
            discard(&state, new_logo).await;
            return Err(e.into());
        }
    };

    if new_logo.is_some() {
        discard(&state, old_logo).await;
    }
    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Cinemas",
    operation_id = "deleteCinema",
    summary = "Delete a cinema",
    description = "Returns 409 CONFLICT while movies, halls, showtimes or bookings reference the cinema. The logo file is removed after the row.",
    params(("id" = i32, Path, description = "Cinema ID")),
    responses(
        (status = 204, description = "Cinema deleted"),
        (status = 404, description = "Cinema not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Cinema in use (CONFLICT)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn delete_cinema(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;
    let existing = find_cinema(&txn, id).await?;

    let movies = movie::Entity::find()
        .filter(movie::Column::CinemaId.eq(id))
        .count(&txn)
        .await?;
    if movies > 0 {
        return Err(AppError::Conflict(format!(
            "Cannot delete a cinema with {movies} movie(s)"
        )));
    }

    // Halls, showtimes and bookings are protected by their foreign keys.
    cinema::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    discard(&state, existing.cinema_logo).await;
    info!(cinema_id = id, "Cinema deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn find_cinema<C: ConnectionTrait>(db: &C, id: i32) -> Result<cinema::Model, AppError> {
    cinema::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Cinema {id} not found")))
}

fn cinema_fields(form: &FormData) -> CinemaFields {
    CinemaFields {
        name: form.text("name").unwrap_or_default(),
        description: form.text("description"),
        address: form.text("address").unwrap_or_default(),
    }
}

fn check_logo(state: &AppState, logo: Option<&UploadedFile>) -> Result<(), AppError> {
    if let Some(logo) = logo {
        state
            .upload_policy()
            .check(logo)
            .map_err(|e| AppError::invalid_field("logo", e.to_string()))?;
    }
    Ok(())
}

async fn discard(state: &AppState, path: Option<String>) {
    if let Some(path) = path
        && !state.files.delete(&path).await
    {
        warn!(path = %path, "Could not remove cinema logo");
    }
}
