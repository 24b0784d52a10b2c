pub mod ors_client;

pub use ors_client::OpenRouteServiceClient;
