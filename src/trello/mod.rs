pub mod api;
pub mod client;

pub use api::BoardApi;
pub use client::TrelloClient;
