pub mod actor;
pub mod admin;
pub mod booking;
pub mod category;
pub mod cinema;
pub mod movie;
pub mod shared;
pub mod showtime;
