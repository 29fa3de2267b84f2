use std::collections::HashSet;
use std::time::{Duration, SystemTime};

use common::{FileStore, PublicPath};
use sea_orm::{ConnectionTrait, DbErr, EntityTrait};
use serde::Serialize;
use tracing::{info, warn};

use crate::catalog::CatalogError;
use crate::entity::{actor, cinema, movie, movie_image, user};

/// What a reconciliation pass found and did.
#[derive(Debug, Default, Clone, Serialize, utoipa::ToSchema)]
pub struct SweepReport {
    pub dry_run: bool,
    /// Stored files examined.
    pub scanned: usize,
    /// Unreferenced files old enough to remove. Removed unless `dry_run`.
    pub orphans: Vec<String>,
    /// Orphans that could not be removed.
    pub failed: Vec<String>,
    /// Unreferenced files still inside the grace period.
    pub recent: usize,
    /// Referenced paths with no file behind them.
    pub dangling: Vec<String>,
}

/// Every managed upload path referenced by a row.
pub async fn referenced_paths<C: ConnectionTrait>(db: &C) -> Result<HashSet<String>, DbErr> {
    let mut paths = HashSet::new();

    for m in movie::Entity::find().all(db).await? {
        paths.extend(m.img_url);
    }
    for img in movie_image::Entity::find().all(db).await? {
        paths.insert(img.img_url);
    }
    for c in cinema::Entity::find().all(db).await? {
        paths.extend(c.cinema_logo);
    }
    for a in actor::Entity::find().all(db).await? {
        paths.extend(a.profile_picture);
    }
    for u in user::Entity::find().all(db).await? {
        paths.extend(u.avatar_url);
    }

    paths.retain(|p| PublicPath::is_managed(p));
    Ok(paths)
}

/// Compares stored files with referenced paths and removes unreferenced
/// files older than `grace`.
///
/// The grace period covers uploads whose rows are not committed yet.
pub async fn sweep_orphans<C: ConnectionTrait>(
    db: &C,
    files: &dyn FileStore,
    grace: Duration,
    dry_run: bool,
) -> Result<SweepReport, CatalogError> {
    let referenced = referenced_paths(db).await?;
    let stored = files.list().await?;
    let now = SystemTime::now();

    let mut report = SweepReport {
        dry_run,
        scanned: stored.len(),
        ..SweepReport::default()
    };

    let stored_paths: HashSet<&str> = stored.iter().map(|f| f.public_path.as_str()).collect();
    let mut dangling: Vec<String> = referenced
        .iter()
        .filter(|p| !stored_paths.contains(p.as_str()))
        .cloned()
        .collect();
    dangling.sort();
    report.dangling = dangling;

    for file in stored {
        if referenced.contains(&file.public_path) {
            continue;
        }
        let age = now.duration_since(file.modified).unwrap_or_default();
        if age < grace {
            report.recent += 1;
            continue;
        }
        if !dry_run && !files.delete(&file.public_path).await {
            report.failed.push(file.public_path.clone());
        }
        report.orphans.push(file.public_path);
    }

    if !report.dangling.is_empty() {
        warn!(count = report.dangling.len(), "Rows reference missing uploads");
    }
    info!(
        dry_run,
        scanned = report.scanned,
        orphans = report.orphans.len(),
        failed = report.failed.len(),
        recent = report.recent,
        "Upload sweep finished"
    );
    Ok(report)
}
