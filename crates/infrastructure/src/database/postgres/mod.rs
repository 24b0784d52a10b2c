pub mod postgres_assignment_store;
pub mod postgres_candidate_directory;
pub mod postgres_task_repository;

pub use postgres_assignment_store::*;
pub use postgres_candidate_directory::*;
pub use postgres_task_repository::*;
