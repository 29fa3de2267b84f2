use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::sea_query::{Expr, ExprTrait, Func, LikeExpr};
use sea_orm::*;
use tracing::{info, instrument};

use crate::entity::{actor, movie, movie_actor};
use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::models::actor::*;
use crate::models::shared::{Pagination, escape_like, page_bounds, page_offset};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/",
    tag = "Actors",
    operation_id = "listActors",
    summary = "List actors",
    description = "Actors sorted by first then last name. `search` matches either name case-insensitively.",
    params(ActorListQuery),
    responses((status = 200, description = "Page of actors", body = ActorListResponse)),
)]
#[instrument(skip(state, query))]
pub async fn list_actors(
    State(state): State<AppState>,
    Query(query): Query<ActorListQuery>,
) -> Result<Json<ActorListResponse>, AppError> {
    let limits = &state.config.listing;
    let (page, per_page) = page_bounds(
        query.page,
        query.per_page,
        limits.default_page_size,
        limits.max_page_size,
    );

    let mut select = actor::Entity::find();
    if let Some(ref search) = query.search {
        let term = escape_like(search.trim());
        if !term.is_empty() {
            let pattern = format!("%{}%", term.to_lowercase());
            select = select.filter(
                Condition::any()
                    .add(
                        Expr::expr(Func::lower(Expr::col(actor::Column::FirstName)))
                            .like(LikeExpr::new(pattern.clone()).escape('\\')),
                    )
                    .add(
                        Expr::expr(Func::lower(Expr::col(actor::Column::LastName)))
                            .like(LikeExpr::new(pattern).escape('\\')),
                    ),
            );
        }
    }

    let total = select.clone().count(&state.db).await?;
    let data = select
        .order_by_asc(actor::Column::FirstName)
        .order_by_asc(actor::Column::LastName)
        .offset(Some(page_offset(page, per_page)))
        .limit(Some(per_page))
        .all(&state.db)
        .await?
        .into_iter()
        .map(ActorResponse::from)
        .collect();

    Ok(Json(ActorListResponse {
        data,
        pagination: Pagination::new(page, per_page, total),
    }))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Actors",
    operation_id = "createActor",
    summary = "Create an actor",
    request_body = ActorRequest,
    responses(
        (status = 201, description = "Actor created", body = ActorResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(last_name = %payload.last_name))]
pub async fn create_actor(
    State(state): State<AppState>,
    AppJson(payload): AppJson<ActorRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let model = actor::ActiveModel {
        first_name: Set(payload.first_name.trim().to_string()),
        last_name: Set(payload.last_name.trim().to_string()),
        name: Set(trimmed(payload.name)),
        bio: Set(trimmed(payload.bio)),
        profile_picture: Set(trimmed(payload.profile_picture)),
        news: Set(trimmed(payload.news)),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(ActorResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Actors",
    operation_id = "getActor",
    summary = "Get an actor with their movies",
    params(("id" = i32, Path, description = "Actor ID")),
    responses(
        (status = 200, description = "Actor details", body = ActorDetailResponse),
        (status = 404, description = "Actor not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn get_actor(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ActorDetailResponse>, AppError> {
    let actor = find_actor(&state.db, id).await?;

    let movie_ids: Vec<i32> = movie_actor::Entity::find()
        .filter(movie_actor::Column::ActorId.eq(id))
        .all(&state.db)
        .await?
        .into_iter()
        .map(|link| link.movie_id)
        .collect();
    let movies = if movie_ids.is_empty() {
        Vec::new()
    } else {
        movie::Entity::find()
            .filter(movie::Column::Id.is_in(movie_ids))
            .order_by_desc(movie::Column::StartDate)
            .all(&state.db)
            .await?
            .into_iter()
            .map(|m| ActorMovieItem {
                id: m.id,
                title: m.title,
            })
            .collect()
    };

    Ok(Json(ActorDetailResponse {
        actor: actor.into(),
        movies,
    }))
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Actors",
    operation_id = "updateActor",
    summary = "Replace an actor's details",
    params(("id" = i32, Path, description = "Actor ID")),
    request_body = ActorRequest,
    responses(
        (status = 200, description = "Actor updated", body = ActorResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Actor not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(id))]
pub async fn update_actor(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<ActorRequest>,
) -> Result<Json<ActorResponse>, AppError> {
    payload.validate()?;

    let existing = find_actor(&state.db, id).await?;
    let mut active: actor::ActiveModel = existing.into();
    active.first_name = Set(payload.first_name.trim().to_string());
    active.last_name = Set(payload.last_name.trim().to_string());
    active.name = Set(trimmed(payload.name));
    active.bio = Set(trimmed(payload.bio));
    active.profile_picture = Set(trimmed(payload.profile_picture));
    active.news = Set(trimmed(payload.news));

    let model = active.update(&state.db).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Actors",
    operation_id = "deleteActor",
    summary = "Delete an actor",
    description = "Removes the actor's movie links, then the actor, in one transaction.",
    params(("id" = i32, Path, description = "Actor ID")),
    responses(
        (status = 204, description = "Actor deleted"),
        (status = 404, description = "Actor not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn delete_actor(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;

    find_actor(&txn, id).await?;
    let unlinked = movie_actor::Entity::delete_many()
        .filter(movie_actor::Column::ActorId.eq(id))
        .exec(&txn)
        .await?;
    actor::Entity::delete_by_id(id).exec(&txn).await?;

    txn.commit().await?;
    info!(actor_id = id, unlinked = unlinked.rows_affected, "Actor deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn find_actor<C: ConnectionTrait>(db: &C, id: i32) -> Result<actor::Model, AppError> {
    actor::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Actor {id} not found")))
}

/// Trims an optional text field; blank becomes `None`.
pub(crate) fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
