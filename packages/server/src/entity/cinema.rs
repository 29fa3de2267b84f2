use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "cinema")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,
    pub description: Option<String>,
    /// Public path of the logo under `/uploads/cinemas`.
    pub cinema_logo: Option<String>,
    pub address: String,

    #[sea_orm(has_many)]
    pub movies: HasMany<super::movie::Entity>,

    #[sea_orm(has_many)]
    pub halls: HasMany<super::hall::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
