use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Legacy secondary category links. Movies are categorised by
/// `movie.category_id`; rows here are only ever read and cleaned up.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "movie_category")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub movie_id: i32,
    #[sea_orm(primary_key)]
    pub category_id: i32,
    #[sea_orm(belongs_to, from = "movie_id", to = "id")]
    pub movie: Option<super::movie::Entity>,
    #[sea_orm(belongs_to, from = "category_id", to = "id")]
    pub category: Option<super::category::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
