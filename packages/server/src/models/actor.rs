use serde::{Deserialize, Serialize};

use super::shared::Pagination;
use crate::catalog::{CatalogError, input::text};
use crate::entity::actor;

/// Body for both create and full update.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ActorRequest {
    #[schema(example = "Zendaya")]
    pub first_name: String,
    #[schema(example = "Coleman")]
    pub last_name: String,
    pub name: Option<String>,
    pub bio: Option<String>,
    pub profile_picture: Option<String>,
    pub news: Option<String>,
}

impl ActorRequest {
    pub fn validate(&self) -> Result<(), CatalogError> {
        text("first_name", &self.first_name, 1, 100)?;
        text("last_name", &self.last_name, 1, 100)?;
        if let Some(ref name) = self.name {
            text("name", name, 0, 200)?;
        }
        if let Some(ref bio) = self.bio {
            text("bio", bio, 0, 1000)?;
        }
        if let Some(ref picture) = self.profile_picture {
            text("profile_picture", picture, 0, 500)?;
        }
        if let Some(ref news) = self.news {
            text("news", news, 0, 500)?;
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ActorListQuery {
    /// Case-insensitive substring of first or last name.
    pub search: Option<String>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ActorResponse {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub name: Option<String>,
    pub bio: Option<String>,
    pub profile_picture: Option<String>,
    pub news: Option<String>,
}

impl From<actor::Model> for ActorResponse {
    fn from(m: actor::Model) -> Self {
        Self {
            id: m.id,
            first_name: m.first_name,
            last_name: m.last_name,
            name: m.name,
            bio: m.bio,
            profile_picture: m.profile_picture,
            news: m.news,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ActorMovieItem {
    pub id: i32,
    pub title: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ActorDetailResponse {
    #[serde(flatten)]
    pub actor: ActorResponse,
    pub movies: Vec<ActorMovieItem>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ActorListResponse {
    pub data: Vec<ActorResponse>,
    pub pagination: Pagination,
}
