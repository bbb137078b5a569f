//! OpenWeather API client

pub mod client;
pub mod errors;

pub use client::{OpenWeatherClient, ResourceLocator, DEFAULT_BASE_URL};
pub use errors::UpstreamError;
