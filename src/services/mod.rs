pub mod fetch_service;
pub mod reporter;

pub use fetch_service::FetchService;
