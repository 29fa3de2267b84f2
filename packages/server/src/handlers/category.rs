use std::collections::HashMap;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{category, movie, movie_category};
use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::models::category::*;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/",
    tag = "Categories",
    operation_id = "listCategories",
    summary = "List all categories",
    description = "Every category sorted by name, with the number of movies filed under it.",
    responses((status = 200, description = "Categories", body = Vec<CategoryResponse>)),
)]
#[instrument(skip(state))]
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<CategoryResponse>>, AppError> {
    let mut counts: HashMap<i32, u64> = HashMap::new();
    for m in movie::Entity::find().all(&state.db).await? {
        *counts.entry(m.category_id).or_default() += 1;
    }

    let data = category::Entity::find()
        .order_by_asc(category::Column::Name)
        .all(&state.db)
        .await?
        .into_iter()
        .map(|c| {
            let count = counts.get(&c.id).copied().unwrap_or_default();
            CategoryResponse::new(c, count)
        })
        .collect();
    Ok(Json(data))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Categories",
    operation_id = "createCategory",
    summary = "Create a category",
    request_body = CategoryRequest,
    responses(
        (status = 201, description = "Category created", body = CategoryResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 409, description = "Name already used (CONFLICT)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(name = %payload.name))]
pub async fn create_category(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CategoryRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let name = payload.name.trim().to_string();

    let txn = state.db.begin().await?;
    ensure_name_free(&txn, &name, None).await?;
    let model = category::ActiveModel {
        name: Set(name),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    Ok((StatusCode::CREATED, Json(CategoryResponse::new(model, 0))))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Categories",
    operation_id = "getCategory",
    summary = "Get a category by ID",
    params(("id" = i32, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category", body = CategoryResponse),
        (status = 404, description = "Category not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<CategoryResponse>, AppError> {
    let model = find_category(&state.db, id).await?;
    let count = movie_count(&state.db, id).await?;
    Ok(Json(CategoryResponse::new(model, count)))
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Categories",
    operation_id = "updateCategory",
    summary = "Rename a category",
    params(("id" = i32, Path, description = "Category ID")),
    request_body = CategoryRequest,
    responses(
        (status = 200, description = "Category updated", body = CategoryResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Category not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Name already used (CONFLICT)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(id))]
pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<CategoryRequest>,
) -> Result<Json<CategoryResponse>, AppError> {
    payload.validate()?;
    let name = payload.name.trim().to_string();

    let txn = state.db.begin().await?;
    let existing = find_category(&txn, id).await?;
    ensure_name_free(&txn, &name, Some(id)).await?;

    let mut active: category::ActiveModel = existing.into();
    active.name = Set(name);
    let model = active.update(&txn).await?;
    let count = movie_count(&txn, id).await?;
    txn.commit().await?;

    Ok(Json(CategoryResponse::new(model, count)))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Categories",
    operation_id = "deleteCategory",
    summary = "Delete a category",
    description = "Returns 409 CONFLICT while any movie is filed under the category or linked to it.",
    params(("id" = i32, Path, description = "Category ID")),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 404, description = "Category not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Category in use (CONFLICT)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;
    find_category(&txn, id).await?;

    let movies = movie_count(&txn, id).await?;
    let links = movie_category::Entity::find()
        .filter(movie_category::Column::CategoryId.eq(id))
        .count(&txn)
        .await?;
    if movies + links > 0 {
        return Err(AppError::Conflict(
            "Cannot delete a category that still has movies".into(),
        ));
    }

    category::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn find_category<C: ConnectionTrait>(db: &C, id: i32) -> Result<category::Model, AppError> {
    category::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Category {id} not found")))
}

async fn movie_count<C: ConnectionTrait>(db: &C, category_id: i32) -> Result<u64, DbErr> {
    movie::Entity::find()
        .filter(movie::Column::CategoryId.eq(category_id))
        .count(db)
        .await
}

async fn ensure_name_free<C: ConnectionTrait>(
    db: &C,
    name: &str,
    except: Option<i32>,
) -> Result<(), AppError> {
    let mut select = category::Entity::find().filter(category::Column::Name.eq(name));
    if let Some(id) = except {
        select = select.filter(category::Column::Id.ne(id));
    }
    if select.count(db).await? > 0 {
        return Err(AppError::Conflict(format!(
            "Category '{name}' already exists"
        )));
    }
    Ok(())
}
