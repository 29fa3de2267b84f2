use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "hall")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,
    pub capacity: i32,

    pub cinema_id: i32,
    #[sea_orm(belongs_to, from = "cinema_id", to = "id")]
    pub cinema: Option<super::cinema::Entity>,

    #[sea_orm(has_many)]
    pub seats: HasMany<super::seat::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
