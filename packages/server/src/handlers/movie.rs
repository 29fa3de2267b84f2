use axum::Json;
use axum::extract::{DefaultBodyLimit, Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{instrument, warn};

use crate::catalog::input::MAX_GALLERY_FILES;
use crate::catalog::projection::{self, Selection};
use crate::catalog::{CatalogService, CreateMovie, FileCleanup, MovieFields, UpdateMovie};
use crate::entity::MovieStatus;
use crate::error::{AppError, ErrorBody};
use crate::extractors::form::FormData;
use crate::models::movie::*;
use crate::state::AppState;

/// Body limit for movie forms: a poster plus a full gallery, with slack for
/// the text parts.
pub fn movie_form_body_limit(max_upload_bytes: u64) -> DefaultBodyLimit {
    let files = MAX_GALLERY_FILES as u64 + 2;
    DefaultBodyLimit::max(usize::try_from(max_upload_bytes.saturating_mul(files)).unwrap_or(usize::MAX))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Movies",
    operation_id = "listMovies",
    summary = "List movies with filters and pagination",
    description = "Returns one page of movies ordered by start date, newest first. `search` matches the title case-insensitively; `category_id` and `cinema_id` filter when positive. Also returns every category and cinema for the filter dropdowns.",
    params(MovieListQuery),
    responses(
        (status = 200, description = "Page of movies", body = MovieListResponse),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_movies(
    State(state): State<AppState>,
    Query(query): Query<MovieListQuery>,
) -> Result<Json<MovieListResponse>, AppError> {
    let page = projection::list_movies(&state.db, &query, &state.config.listing).await?;
    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/form-options",
    tag = "Movies",
    operation_id = "movieFormOptions",
    summary = "Dropdown options for the movie form",
    description = "Cinemas and categories sorted by name, actors sorted by first name, and the status values. Ids passed as query parameters come back with `selected = true`.",
    params(MovieFormQuery),
    responses(
        (status = 200, description = "Form options", body = MovieFormOptions),
        (status = 400, description = "Malformed actor id list (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query))]
pub async fn form_options(
    State(state): State<AppState>,
    Query(query): Query<MovieFormQuery>,
) -> Result<Json<MovieFormOptions>, AppError> {
    let actor_ids = query
        .actor_ids
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i32>()
                .map_err(|_| AppError::invalid_field("actor_ids", format!("Invalid id '{s}'")))
        })
        .collect::<Result<_, _>>()?;

    let selection = Selection {
        cinema_id: query.cinema_id,
        category_id: query.category_id,
        actor_ids,
    };
    Ok(Json(projection::form_options(&state.db, &selection).await?))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Movies",
    operation_id = "createMovie",
    summary = "Create a movie",
    description = "Creates a movie with an optional poster (`poster`), gallery images (`images`, repeatable) and actor links (`actor_ids`, repeatable or comma-separated). Text parts: `title`, `description`, `price`, `trailer_url`, `start_date`, `end_date` (YYYY-MM-DD), `status` (Coming, Showing, Ended), `cinema_id`, `category_id`. Images must be .jpg, .jpeg, .png or .gif and at most the configured size. Nothing is written if any input is invalid.",
    request_body(content_type = "multipart/form-data", description = "Movie form"),
    responses(
        (status = 201, description = "Movie created", body = MovieDetailResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Cinema, category or actor not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, multipart))]
pub async fn create_movie(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let policy = state.upload_policy();
    let mut form = FormData::read(multipart, policy.max_bytes).await?;

    let input = CreateMovie {
        fields: movie_fields(&form)?,
        actor_ids: form.ids("actor_ids")?,
        poster: form.take_file("poster"),
        images: form.take_files("images"),
    };

    let movie = CatalogService::new(&state.db, &*state.files, &policy)
        .create(input)
        .await?;
    let detail = projection::movie_detail(&state.db, movie.id).await?;

    Ok((StatusCode::CREATED, Json(detail)))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Movies",
    operation_id = "getMovie",
    summary = "Get a movie by ID",
    description = "Returns the movie with its version token, gallery, actors, and cinema and category names.",
    params(("id" = i32, Path, description = "Movie ID")),
    responses(
        (status = 200, description = "Movie details", body = MovieDetailResponse),
        (status = 404, description = "Movie not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn get_movie(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<MovieDetailResponse>, AppError> {
    Ok(Json(projection::movie_detail(&state.db, id).await?))
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Movies",
    operation_id = "updateMovie",
    summary = "Update a movie",
    description = "Replaces the scalar fields and the actor set (`actor_ids` is the complete desired set). A new `poster` replaces the old one. `image_ids_to_delete` removes gallery images; `images` adds new ones. If `version` is sent and no longer matches, the update is rejected with CONFLICT. Superseded files are removed after commit; failures there are reported in `cleanup`, never as an error.",
    params(("id" = i32, Path, description = "Movie ID")),
    request_body(content_type = "multipart/form-data", description = "Movie form"),
    responses(
        (status = 200, description = "Movie updated", body = UpdateMovieResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Movie or a referenced record not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Stale version token (CONFLICT)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, multipart), fields(id))]
pub async fn update_movie(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> Result<Json<UpdateMovieResponse>, AppError> {
    let policy = state.upload_policy();
    let mut form = FormData::read(multipart, policy.max_bytes).await?;

    let input = UpdateMovie {
        fields: movie_fields(&form)?,
        version: form.parse_opt("version")?,
        actor_ids: form.ids("actor_ids")?,
        image_ids_to_delete: form.ids("image_ids_to_delete")?,
        poster: form.take_file("poster"),
        images: form.take_files("images"),
    };

    let updated = CatalogService::new(&state.db, &*state.files, &policy)
        .update(id, input)
        .await?;
    let movie = projection::movie_detail(&state.db, updated.movie.id).await?;

    Ok(Json(UpdateMovieResponse {
        movie,
        cleanup: updated.cleanup,
    }))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Movies",
    operation_id = "deleteMovie",
    summary = "Delete a movie",
    description = "Deletes the movie with its gallery rows and actor and category links, then removes its files. Returns 409 CONFLICT while the movie has bookings. File removal is best effort and reported in the body.",
    params(("id" = i32, Path, description = "Movie ID")),
    responses(
        (status = 200, description = "Movie deleted", body = FileCleanup),
        (status = 404, description = "Movie not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Movie has bookings (CONFLICT)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn delete_movie(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<FileCleanup>, AppError> {
    let policy = state.upload_policy();
    let cleanup = CatalogService::new(&state.db, &*state.files, &policy)
        .delete(id)
        .await?;
    if !cleanup.is_clean() {
        warn!(movie_id = id, failed = ?cleanup.failed, "Some movie files were not removed");
    }
    Ok(Json(cleanup))
}

fn movie_fields(form: &FormData) -> Result<MovieFields, AppError> {
    Ok(MovieFields {
        title: form.text("title").unwrap_or_default(),
        description: form.text("description"),
        price: form.parse::<Decimal>("price")?,
        trailer_url: form.text("trailer_url"),
        start_date: form.parse::<NaiveDate>("start_date")?,
        end_date: form.parse::<NaiveDate>("end_date")?,
        status: form.parse::<MovieStatus>("status")?,
        cinema_id: form.parse("cinema_id")?,
        category_id: form.parse("category_id")?,
    })
}
