pub mod repository;
pub mod routing;

pub use repository::*;
pub use routing::*;
