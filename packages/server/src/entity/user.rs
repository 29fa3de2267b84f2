use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A customer account. Authentication lives elsewhere; bookings only need
/// a row to point at.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub full_name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub avatar_url: Option<String>,

    #[sea_orm(has_many)]
    pub bookings: HasMany<super::booking::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
