use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A physical seat. `seat_number` is unique within its hall.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "seat")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique_key = "hall_seat")]
    pub seat_number: String,
    pub seat_row: i32,
    pub seat_column: i32,
    pub is_reserved: bool,

    #[sea_orm(unique_key = "hall_seat")]
    pub hall_id: i32,
    #[sea_orm(belongs_to, from = "hall_id", to = "id")]
    pub hall: Option<super::hall::Entity>,

    pub booking_id: Option<i32>,
    #[sea_orm(belongs_to, from = "booking_id", to = "id")]
    pub booking: Option<super::booking::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
