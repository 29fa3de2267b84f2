use serde::Serialize;

use crate::catalog::{CatalogError, input::text};
use crate::entity::cinema;

/// Text fields of the cinema multipart form.
#[derive(Debug, Clone)]
pub struct CinemaFields {
    pub name: String,
    pub description: Option<String>,
    pub address: String,
}

impl CinemaFields {
    pub fn validate(&self) -> Result<(), CatalogError> {
        text("name", &self.name, 1, 150)?;
        text("address", &self.address, 1, 250)?;
        if let Some(ref description) = self.description {
            text("description", description, 0, 1000)?;
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct CinemaResponse {
    pub id: i32,
    #[schema(example = "Grand Cinema")]
    pub name: String,
    pub description: Option<String>,
    #[schema(example = "/uploads/cinemas/6a0d0b9e-93b8-4c55-8a57-3bcb5c7b2c1f.png")]
    pub cinema_logo: Option<String>,
    pub address: String,
}

impl From<cinema::Model> for CinemaResponse {
    fn from(m: cinema::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            description: m.description,
            cinema_logo: m.cinema_logo,
            address: m.address,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct CinemaDetailResponse {
    #[serde(flatten)]
    pub cinema: CinemaResponse,
    pub movie_count: u64,
    pub hall_count: u64,
}
