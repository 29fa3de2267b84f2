use std::collections::{BTreeSet, HashMap};

use sea_orm::sea_query::{Expr, ExprTrait, Func, LikeExpr};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};

use super::error::CatalogError;
use super::input::money;
use super::service::find_movie;
use crate::config::ListingConfig;
use crate::entity::{MovieStatus, actor, category, cinema, movie, movie_actor, movie_image};
use crate::models::movie::{
    MovieActorItem, MovieDetailResponse, MovieFormOptions, MovieImageResponse, MovieListItem,
    MovieListQuery, MovieListResponse,
};
use crate::models::shared::{Pagination, SelectOption, escape_like, page_bounds, page_offset};

/// Which options a form should show as pre-selected.
#[derive(Debug, Default, Clone)]
pub struct Selection {
    pub cinema_id: Option<i32>,
    pub category_id: Option<i32>,
    pub actor_ids: BTreeSet<i32>,
}

/// One page of movies, newest start date first, plus the filter dropdowns.
pub async fn list_movies<C: ConnectionTrait>(
    db: &C,
    query: &MovieListQuery,
    limits: &ListingConfig,
) -> Result<MovieListResponse, DbErr> {
    let (page, per_page) = page_bounds(
        query.page,
        query.per_page,
        limits.default_page_size,
        limits.max_page_size,
    );

    let mut select = movie::Entity::find();

    if let Some(ref search) = query.search {
        let term = escape_like(search.trim());
        if !term.is_empty() {
            select = select.filter(
                Expr::expr(Func::lower(Expr::col(movie::Column::Title)))
                    .like(LikeExpr::new(format!("%{}%", term.to_lowercase())).escape('\\')),
            );
        }
    }
    if let Some(category_id) = query.category_id.filter(|id| *id > 0) {
        select = select.filter(movie::Column::CategoryId.eq(category_id));
    }
    if let Some(cinema_id) = query.cinema_id.filter(|id| *id > 0) {
        select = select.filter(movie::Column::CinemaId.eq(cinema_id));
    }

    let total = select.clone().count(db).await?;

    let rows = select
        .order_by_desc(movie::Column::StartDate)
        .order_by_desc(movie::Column::Id)
        .offset(Some(page_offset(page, per_page)))
        .limit(Some(per_page))
        .all(db)
        .await?;

    let categories = category_options(db, query.category_id).await?;
    let cinemas = cinema_options(db, query.cinema_id).await?;
    let category_names = names(&categories);
    let cinema_names = names(&cinemas);

    let data = rows
        .into_iter()
        .map(|m| MovieListItem {
            cinema_name: cinema_names.get(&m.cinema_id).cloned(),
            category_name: category_names.get(&m.category_id).cloned(),
            id: m.id,
            title: m.title,
            price: money(m.price),
            img_url: m.img_url,
            start_date: m.start_date,
            end_date: m.end_date,
            status: m.status,
            cinema_id: m.cinema_id,
            category_id: m.category_id,
        })
        .collect();

    Ok(MovieListResponse {
        data,
        pagination: Pagination::new(page, per_page, total),
        categories,
        cinemas,
    })
}

/// A movie with its gallery, cast and owner names.
pub async fn movie_detail<C: ConnectionTrait>(db: &C, id: i32) -> Result<MovieDetailResponse, CatalogError> {
    let movie = find_movie(db, id).await?;

    let cinema_name = cinema::Entity::find_by_id(movie.cinema_id)
        .one(db)
        .await?
        .map(|c| c.name);
    let category_name = category::Entity::find_by_id(movie.category_id)
        .one(db)
        .await?
        .map(|c| c.name);

    let images = movie_image::Entity::find()
        .filter(movie_image::Column::MovieId.eq(id))
        .order_by_asc(movie_image::Column::Id)
        .all(db)
        .await?
        .into_iter()
        .map(MovieImageResponse::from)
        .collect();

    let actor_ids = movie_actor_ids(db, id).await?;
    let actors = if actor_ids.is_empty() {
        Vec::new()
    } else {
        actor::Entity::find()
            .filter(actor::Column::Id.is_in(actor_ids))
            .order_by_asc(actor::Column::FirstName)
            .order_by_asc(actor::Column::LastName)
            .all(db)
            .await?
            .into_iter()
            .map(|a| MovieActorItem {
                id: a.id,
                name: a.display_name(),
                profile_picture: a.profile_picture,
            })
            .collect()
    };

    Ok(MovieDetailResponse {
        movie: movie.into(),
        cinema_name,
        category_name,
        images,
        actors,
    })
}

pub async fn movie_actor_ids<C: ConnectionTrait>(db: &C, movie_id: i32) -> Result<Vec<i32>, DbErr> {
    Ok(movie_actor::Entity::find()
        .filter(movie_actor::Column::MovieId.eq(movie_id))
        .all(db)
        .await?
        .into_iter()
        .map(|link| link.actor_id)
        .collect())
}

/// Dropdown contents for the movie create/edit form.
pub async fn form_options<C: ConnectionTrait>(db: &C, selection: &Selection) -> Result<MovieFormOptions, DbErr> {
    let actors = actor::Entity::find()
        .order_by_asc(actor::Column::FirstName)
        .order_by_asc(actor::Column::LastName)
        .all(db)
        .await?
        .into_iter()
        .map(|a| SelectOption {
            id: a.id,
            label: a.display_name(),
            selected: selection.actor_ids.contains(&a.id),
        })
        .collect();

    Ok(MovieFormOptions {
        cinemas: cinema_options(db, selection.cinema_id).await?,
        categories: category_options(db, selection.category_id).await?,
        actors,
        statuses: vec![MovieStatus::Coming, MovieStatus::Showing, MovieStatus::Ended],
    })
}

/// Every category sorted by name.
pub async fn category_options<C: ConnectionTrait>(
    db: &C,
    selected: Option<i32>,
) -> Result<Vec<SelectOption>, DbErr> {
    Ok(category::Entity::find()
        .order_by_asc(category::Column::Name)
        .all(db)
        .await?
        .into_iter()
        .map(|c| SelectOption {
            selected: selected == Some(c.id),
            id: c.id,
            label: c.name,
        })
        .collect())
}

/// Every cinema sorted by name.
pub async fn cinema_options<C: ConnectionTrait>(
    db: &C,
    selected: Option<i32>,
) -> Result<Vec<SelectOption>, DbErr> {
    Ok(cinema::Entity::find()
        .order_by_asc(cinema::Column::Name)
        .all(db)
        .await?
        .into_iter()
        .map(|c| SelectOption {
            selected: selected == Some(c.id),
            id: c.id,
            label: c.name,
        })
        .collect())
}

fn names(options: &[SelectOption]) -> HashMap<i32, String> {
    options.iter().map(|o| (o.id, o.label.clone())).collect()
}
