use std::time::{Duration, Instant};

use sea_orm::{ConnectionTrait, DbErr, EntityTrait, PaginatorTrait};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::debug;

use crate::entity::{booking, category, movie, showtime, user};

/// Headline counts shown on the admin landing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct DashboardStats {
    pub movies: u64,
    pub categories: u64,
    pub users: u64,
    pub bookings: u64,
    pub showtimes: u64,
}

impl DashboardStats {
    pub async fn load<C: ConnectionTrait>(db: &C) -> Result<Self, DbErr> {
        Ok(Self {
            movies: movie::Entity::find().count(db).await?,
            categories: category::Entity::find().count(db).await?,
            users: user::Entity::find().count(db).await?,
            bookings: booking::Entity::find().count(db).await?,
            showtimes: showtime::Entity::find().count(db).await?,
        })
    }
}

struct Cached {
    stats: DashboardStats,
    loaded_at: Instant,
}

/// Time-bounded cache of [`DashboardStats`].
///
/// Writes never invalidate it; counts may lag by up to `ttl`.
pub struct DashboardCache {
    ttl: Duration,
    slot: RwLock<Option<Cached>>,
}

impl DashboardCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: RwLock::new(None),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the cached stats, recomputing them if absent or expired.
    pub async fn get_or_load<C: ConnectionTrait>(&self, db: &C) -> Result<DashboardStats, DbErr> {
        if let Some(stats) = self.fresh().await {
            return Ok(stats);
        }

        let mut slot = self.slot.write().await;
        // Another request may have refreshed while we waited for the lock.
        if let Some(cached) = slot.as_ref()
            && cached.loaded_at.elapsed() < self.ttl
        {
            return Ok(cached.stats);
        }

        let stats = DashboardStats::load(db).await?;
        debug!(?stats, "Dashboard stats refreshed");
        *slot = Some(Cached {
            stats,
            loaded_at: Instant::now(),
        });
        Ok(stats)
    }

    pub async fn invalidate(&self) {
        *self.slot.write().await = None;
    }

    async fn fresh(&self) -> Option<DashboardStats> {
        let slot = self.slot.read().await;
        slot.as_ref()
            .filter(|cached| cached.loaded_at.elapsed() < self.ttl)
            .map(|cached| cached.stats)
    }
}
