mod client;

pub use client::{ApiClient, ApiError, DEFAULT_SERVER, LOG_READ_LIMIT};
