pub mod movie;
pub mod user;

pub use movie::{Movie, SourceRating};
pub use user::{User, UserRating};
