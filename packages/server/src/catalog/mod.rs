//! The movie catalog: validated writes of a movie aggregate and the
//! read projections built on top of it.

mod error;
pub mod input;
pub mod projection;
mod service;

pub use error::CatalogError;
pub use input::{CreateMovie, MovieFields, UpdateMovie, money};
pub use service::{CatalogService, FileCleanup, MOVIE_FOLDER, UpdatedMovie, find_movie};
