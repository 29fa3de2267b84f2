use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ticket")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub seat_number: String,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub price: Decimal,

    pub booking_id: i32,
    #[sea_orm(belongs_to, from = "booking_id", to = "id", on_delete = "Cascade")]
    pub booking: Option<super::booking::Entity>,

    pub seat_id: Option<i32>,
    #[sea_orm(belongs_to, from = "seat_id", to = "id")]
    pub seat: Option<super::seat::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
