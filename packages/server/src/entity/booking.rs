use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "booking")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub booking_date: DateTimeUtc,
    pub ticket_count: i32,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub total_price: Decimal,

    pub movie_id: i32,
    #[sea_orm(belongs_to, from = "movie_id", to = "id")]
    pub movie: Option<super::movie::Entity>,

    pub user_id: i32,
    #[sea_orm(belongs_to, from = "user_id", to = "id")]
    pub user: Option<super::user::Entity>,

    pub cinema_id: i32,
    #[sea_orm(belongs_to, from = "cinema_id", to = "id")]
    pub cinema: Option<super::cinema::Entity>,

    pub showtime_id: Option<i32>,
    #[sea_orm(belongs_to, from = "showtime_id", to = "id")]
    pub showtime: Option<super::showtime::Entity>,

    #[sea_orm(has_many)]
    pub tickets: HasMany<super::ticket::Entity>,

    #[sea_orm(has_many)]
    pub payments: HasMany<super::payment::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
