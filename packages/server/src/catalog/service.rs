use std::collections::BTreeSet;

use chrono::Utc;
use common::{FileStore, PublicPath, UploadPolicy, UploadedFile};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, PaginatorTrait, QueryFilter, Set, TransactionTrait,
};
use serde::Serialize;
use tracing::{info, warn};

use super::error::CatalogError;
use super::input::{CreateMovie, MovieFields, UpdateMovie, money, present};
use crate::entity::{actor, booking, category, cinema, movie, movie_actor, movie_category, movie_image};

/// Upload folder for posters and gallery images.
pub const MOVIE_FOLDER: &str = "movies";

/// Result of best-effort file removal after a committed change.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct FileCleanup {
    /// Files that were removed.
    pub removed: Vec<String>,
    /// Files that were already gone or could not be removed.
    pub failed: Vec<String>,
}

impl FileCleanup {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct UpdatedMovie {
    pub movie: movie::Model,
    pub cleanup: FileCleanup,
}

/// Writes a movie together with its images and actor links as one unit.
///
/// Database changes for an operation share one transaction. Files written
/// for a failed operation are removed again; files made obsolete by a
/// successful one are removed only after commit.
pub struct CatalogService<'a> {
    db: &'a DatabaseConnection,
    files: &'a dyn FileStore,
    policy: &'a UploadPolicy,
}

impl<'a> CatalogService<'a> {
    pub fn new(db: &'a DatabaseConnection, files: &'a dyn FileStore, policy: &'a UploadPolicy) -> Self {
        Self { db, files, policy }
    }

    pub async fn create(&self, input: CreateMovie) -> Result<movie::Model, CatalogError> {
        input.validate(self.policy)?;

        let CreateMovie {
            fields,
            poster,
            images,
            actor_ids,
        } = input;
        let poster = present(poster);
        let images: Vec<UploadedFile> = images.into_iter().filter(|f| !f.is_empty()).collect();
        let actor_ids: BTreeSet<i32> = actor_ids.into_iter().collect();

        let txn = self.db.begin().await?;
        let mut written = Vec::new();
        let result = self
            .create_in(&txn, fields, poster, &images, &actor_ids, &mut written)
            .await;
        let model = self.finish(txn, result, written).await?;

        info!(
            movie_id = model.id,
            images = images.len(),
            actors = actor_ids.len(),
            "Movie created"
        );
        Ok(model)
    }

    pub async fn update(&self, id: i32, input: UpdateMovie) -> Result<UpdatedMovie, CatalogError> {
        input.validate(self.policy)?;

        let txn = self.db.begin().await?;
        let mut written = Vec::new();
        let mut obsolete = Vec::new();
        let result = self
            .update_in(&txn, id, input, &mut written, &mut obsolete)
            .await;
        let model = self.finish(txn, result, written).await?;

        let cleanup = self.remove_files(obsolete).await;
        info!(movie_id = id, version = model.version, "Movie updated");
        Ok(UpdatedMovie {
            movie: model,
            cleanup,
        })
    }

    /// Deletes a movie that has no bookings, then its files.
    pub async fn delete(&self, id: i32) -> Result<FileCleanup, CatalogError> {
        let txn = self.db.begin().await?;
        let result = self.delete_in(&txn, id).await;
        let paths = self.finish(txn, result, Vec::new()).await?;

        let cleanup = self.remove_files(paths).await;
        info!(
            movie_id = id,
            files_removed = cleanup.removed.len(),
            files_failed = cleanup.failed.len(),
            "Movie deleted"
        );
        Ok(cleanup)
    }

    async fn create_in(
        &self,
        txn: &DatabaseTransaction,
        fields: MovieFields,
        poster: Option<UploadedFile>,
        images: &[UploadedFile],
        actor_ids: &BTreeSet<i32>,
        written: &mut Vec<String>,
    ) -> Result<movie::Model, CatalogError> {
        ensure_cinema_and_category(txn, fields.cinema_id, fields.category_id).await?;
        ensure_actors(txn, actor_ids).await?;

        let now = Utc::now();
        let mut model = movie::ActiveModel {
            title: Set(fields.title.trim().to_string()),
            description: Set(fields.description),
            price: Set(money(fields.price)),
            img_url: Set(None),
            trailer_url: Set(fields.trailer_url.map(|u| u.trim().to_string())),
            start_date: Set(fields.start_date),
            end_date: Set(fields.end_date),
            status: Set(fields.status),
            cinema_id: Set(fields.cinema_id),
            category_id: Set(fields.category_id),
            version: Set(1),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(txn)
        .await?;

        if let Some(poster) = poster {
            let path = self.store(&poster, written).await?;
            let mut active: movie::ActiveModel = model.into();
            active.img_url = Set(Some(path));
            model = active.update(txn).await?;
        }

        for image in images {
            self.attach_image(txn, model.id, image, written).await?;
        }

        for &actor_id in actor_ids {
            link_actor(txn, model.id, actor_id).await?;
        }

        Ok(model)
    }

    async fn update_in(
        &self,
        txn: &DatabaseTransaction,
        id: i32,
        input: UpdateMovie,
        written: &mut Vec<String>,
        obsolete: &mut Vec<String>,
    ) -> Result<movie::Model, CatalogError> {
        let existing = find_movie(txn, id).await?;
        if let Some(expected) = input.version
            && expected != existing.version
        {
            return Err(stale(id));
        }

        let UpdateMovie {
            fields,
            poster,
            images,
            image_ids_to_delete,
            actor_ids,
            ..
        } = input;
        ensure_cinema_and_category(txn, fields.cinema_id, fields.category_id).await?;
        let requested: BTreeSet<i32> = actor_ids.into_iter().collect();
        ensure_actors(txn, &requested).await?;

        // Compare-and-set on the version read above; a concurrent writer
        // that committed in between makes this touch zero rows.
        let claimed = movie::Entity::update_many()
            .col_expr(movie::Column::Title, Expr::value(fields.title.trim().to_string()))
            .col_expr(movie::Column::Description, Expr::value(fields.description))
            .col_expr(movie::Column::Price, Expr::value(money(fields.price)))
            .col_expr(
                movie::Column::TrailerUrl,
                Expr::value(fields.trailer_url.map(|u| u.trim().to_string())),
            )
            .col_expr(movie::Column::StartDate, Expr::value(fields.start_date))
            .col_expr(movie::Column::EndDate, Expr::value(fields.end_date))
            .col_expr(movie::Column::Status, Expr::value(fields.status))
            .col_expr(movie::Column::CinemaId, Expr::value(fields.cinema_id))
            .col_expr(movie::Column::CategoryId, Expr::value(fields.category_id))
            .col_expr(movie::Column::Version, Expr::value(existing.version + 1))
            .col_expr(movie::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(movie::Column::Id.eq(id))
            .filter(movie::Column::Version.eq(existing.version))
            .exec(txn)
            .await?;
        if claimed.rows_affected == 0 {
            return Err(stale(id));
        }

        if let Some(poster) = present(poster) {
            let path = self.store(&poster, written).await?;
            movie::Entity::update_many()
                .col_expr(movie::Column::ImgUrl, Expr::value(Some(path)))
                .filter(movie::Column::Id.eq(id))
                .exec(txn)
                .await?;
            obsolete.extend(existing.img_url.clone());
        }

        if !image_ids_to_delete.is_empty() {
            // Ids belonging to other movies are ignored.
            let doomed = movie_image::Entity::find()
                .filter(movie_image::Column::MovieId.eq(id))
                .filter(movie_image::Column::Id.is_in(image_ids_to_delete))
                .all(txn)
                .await?;
            if !doomed.is_empty() {
                movie_image::Entity::delete_many()
                    .filter(movie_image::Column::Id.is_in(doomed.iter().map(|img| img.id)))
                    .exec(txn)
                    .await?;
                obsolete.extend(doomed.into_iter().map(|img| img.img_url));
            }
        }

        for image in images.iter().filter(|f| !f.is_empty()) {
            self.attach_image(txn, id, image, written).await?;
        }

        let current: BTreeSet<i32> = movie_actor::Entity::find()
            .filter(movie_actor::Column::MovieId.eq(id))
            .all(txn)
            .await?
            .into_iter()
            .map(|link| link.actor_id)
            .collect();
        let to_remove: Vec<i32> = current.difference(&requested).copied().collect();
        if !to_remove.is_empty() {
            movie_actor::Entity::delete_many()
                .filter(movie_actor::Column::MovieId.eq(id))
                .filter(movie_actor::Column::ActorId.is_in(to_remove))
                .exec(txn)
                .await?;
        }
        for &actor_id in requested.difference(&current) {
            link_actor(txn, id, actor_id).await?;
        }

        find_movie(txn, id).await
    }

    /// Removes the movie rows and returns the files they referenced.
    async fn delete_in(&self, txn: &DatabaseTransaction, id: i32) -> Result<Vec<String>, CatalogError> {
        let existing = find_movie(txn, id).await?;

        let bookings = booking::Entity::find()
            .filter(booking::Column::MovieId.eq(id))
            .count(txn)
            .await?;
        if bookings > 0 {
            return Err(CatalogError::Conflict(format!(
                "Movie {id} has {bookings} booking(s) and cannot be deleted"
            )));
        }

        let images = movie_image::Entity::find()
            .filter(movie_image::Column::MovieId.eq(id))
            .all(txn)
            .await?;

        movie_image::Entity::delete_many()
            .filter(movie_image::Column::MovieId.eq(id))
            .exec(txn)
            .await?;
        movie_actor::Entity::delete_many()
            .filter(movie_actor::Column::MovieId.eq(id))
            .exec(txn)
            .await?;
        movie_category::Entity::delete_many()
            .filter(movie_category::Column::MovieId.eq(id))
            .exec(txn)
            .await?;
        movie::Entity::delete_by_id(id).exec(txn).await?;

        let mut paths: Vec<String> = existing.img_url.into_iter().collect();
        paths.extend(images.into_iter().map(|img| img.img_url));
        Ok(paths)
    }

    /// Commits on success. On failure rolls back and removes `written`.
    async fn finish<T>(
        &self,
        txn: DatabaseTransaction,
        result: Result<T, CatalogError>,
        written: Vec<String>,
    ) -> Result<T, CatalogError> {
        let outcome = match result {
            Ok(value) => txn.commit().await.map(|()| value).map_err(CatalogError::from),
            Err(e) => {
                if let Err(rollback) = txn.rollback().await {
                    warn!(error = %rollback, "Rollback failed");
                }
                Err(e)
            }
        };

        if outcome.is_err() && !written.is_empty() {
            let cleanup = self.remove_files(written).await;
            warn!(
                removed = cleanup.removed.len(),
                failed = cleanup.failed.len(),
                "Discarded uploads from failed catalog write"
            );
        }
        outcome
    }

    async fn store(&self, file: &UploadedFile, written: &mut Vec<String>) -> Result<String, CatalogError> {
        let path = self.files.put(file, self.policy, MOVIE_FOLDER).await?;
        written.push(path.clone());
        Ok(path)
    }

    async fn attach_image(
        &self,
        txn: &DatabaseTransaction,
        movie_id: i32,
        image: &UploadedFile,
        written: &mut Vec<String>,
    ) -> Result<movie_image::Model, CatalogError> {
        let path = self.store(image, written).await?;
        let model = movie_image::ActiveModel {
            movie_id: Set(movie_id),
            img_url: Set(path),
            ..Default::default()
        }
        .insert(txn)
        .await?;
        Ok(model)
    }

    /// Best-effort removal; each failure is logged and recorded, never raised.
    pub async fn remove_files(&self, paths: Vec<String>) -> FileCleanup {
        let mut cleanup = FileCleanup::default();
        for path in paths {
            if !PublicPath::is_managed(&path) {
                continue;
            }
            if self.files.delete(&path).await {
                cleanup.removed.push(path);
            } else {
                warn!(path = %path, "Could not remove stored file");
                cleanup.failed.push(path);
            }
        }
        cleanup
    }
}

fn stale(id: i32) -> CatalogError {
    CatalogError::Conflict(format!(
        "Movie {id} was modified by someone else; reload and try again"
    ))
}

pub async fn find_movie<C: ConnectionTrait>(db: &C, id: i32) -> Result<movie::Model, CatalogError> {
    movie::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| CatalogError::NotFound(format!("Movie {id} not found")))
}

async fn ensure_cinema_and_category<C: ConnectionTrait>(
    db: &C,
    cinema_id: i32,
    category_id: i32,
) -> Result<(), CatalogError> {
    if cinema::Entity::find_by_id(cinema_id).count(db).await? == 0 {
        return Err(CatalogError::NotFound(format!("Cinema {cinema_id} not found")));
    }
    if category::Entity::find_by_id(category_id).count(db).await? == 0 {
        return Err(CatalogError::NotFound(format!(
            "Category {category_id} not found"
        )));
    }
    Ok(())
}

async fn ensure_actors<C: ConnectionTrait>(db: &C, ids: &BTreeSet<i32>) -> Result<(), CatalogError> {
    if ids.is_empty() {
        return Ok(());
    }
    let found: BTreeSet<i32> = actor::Entity::find()
        .filter(actor::Column::Id.is_in(ids.iter().copied()))
        .all(db)
        .await?
        .into_iter()
        .map(|a| a.id)
        .collect();
    if let Some(missing) = ids.difference(&found).next() {
        return Err(CatalogError::NotFound(format!("Actor {missing} not found")));
    }
    Ok(())
}

async fn link_actor<C: ConnectionTrait>(db: &C, movie_id: i32, actor_id: i32) -> Result<(), CatalogError> {
    movie_actor::ActiveModel {
        movie_id: Set(movie_id),
        actor_id: Set(actor_id),
    }
    .insert(db)
    .await?;
    Ok(())
}
