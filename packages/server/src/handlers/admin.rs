use axum::Json;
use axum::extract::{Query, State};
use tracing::instrument;

use crate::dashboard::DashboardStats;
use crate::error::{AppError, ErrorBody};
use crate::models::admin::{DashboardQuery, SweepQuery};
use crate::state::AppState;
use crate::sweep::{SweepReport, sweep_orphans};

#[utoipa::path(
    get,
    path = "/dashboard",
    tag = "Admin",
    operation_id = "getDashboard",
    summary = "Aggregate counts for the back-office",
    description = "Counts of movies, categories, users, bookings and showtimes. Cached for `dashboard.ttl_secs`; writes do not invalidate the cache, `refresh=true` does.",
    params(DashboardQuery),
    responses(
        (status = 200, description = "Dashboard counts", body = DashboardStats),
        (status = 500, description = "Internal error (INTERNAL_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn dashboard(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<DashboardStats>, AppError> {
    if query.refresh {
        state.dashboard.invalidate().await;
    }
    let stats = state.dashboard.get_or_load(&state.db).await?;
    Ok(Json(stats))
}

#[utoipa::path(
    post,
    path = "/uploads/sweep",
    tag = "Admin",
    operation_id = "sweepUploads",
    summary = "Remove unreferenced uploads",
    description = "Deletes stored files that no row references and that are older than `storage.orphan_grace_secs`. With `dry_run=true` nothing is removed.",
    params(SweepQuery),
    responses(
        (status = 200, description = "Sweep report", body = SweepReport),
        (status = 500, description = "Internal error (INTERNAL_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn sweep_uploads(
    State(state): State<AppState>,
    Query(query): Query<SweepQuery>,
) -> Result<Json<SweepReport>, AppError> {
    let grace = state.config.storage.orphan_grace();
    let report = sweep_orphans(&state.db, state.files.as_ref(), grace, query.dry_run).await?;
    Ok(Json(report))
}
