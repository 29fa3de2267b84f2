use serde::{Deserialize, Serialize};

use crate::catalog::{CatalogError, input::text};
use crate::entity::category;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CategoryRequest {
    #[schema(example = "Science Fiction")]
    pub name: String,
}

impl CategoryRequest {
    pub fn validate(&self) -> Result<(), CatalogError> {
        text("name", &self.name, 1, 100)
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct CategoryResponse {
    pub id: i32,
    pub name: String,
    /// Movies whose primary category this is.
    pub movie_count: u64,
}

impl CategoryResponse {
    pub fn new(model: category::Model, movie_count: u64) -> Self {
        Self {
            id: model.id,
            name: model.name,
            movie_count,
        }
    }
}
