// HTTP access to the MixMatch server

pub mod api;
pub mod client;
pub mod errors;

#[cfg(test)]
pub mod mocks;


pub use api::{join_url, ImageApi, RawResponse};
pub use client::HttpImageApi;
pub use errors::NetworkError;
