pub mod actor;
pub mod booking;
pub mod category;
pub mod cinema;
pub mod hall;
pub mod movie;
pub mod movie_actor;
pub mod movie_category;
pub mod movie_image;
pub mod payment;
pub mod seat;
pub mod showtime;
pub mod ticket;
pub mod user;

pub use movie::MovieStatus;
pub use payment::{PaymentMethod, PaymentStatus};
