pub mod gateway;
pub mod quiz;
pub mod session;

pub use gateway::{ApiGateway, HttpGateway};
pub use session::{Screen, Session};
