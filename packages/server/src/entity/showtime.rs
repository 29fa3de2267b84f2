use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "showtime")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub show_date_time: DateTimeUtc,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub ticket_price: Decimal,

    pub movie_id: i32,
    #[sea_orm(belongs_to, from = "movie_id", to = "id")]
    pub movie: Option<super::movie::Entity>,

    pub cinema_id: i32,
    #[sea_orm(belongs_to, from = "cinema_id", to = "id")]
    pub cinema: Option<super::cinema::Entity>,

    pub hall_id: Option<i32>,
    #[sea_orm(belongs_to, from = "hall_id", to = "id")]
    pub hall: Option<super::hall::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
