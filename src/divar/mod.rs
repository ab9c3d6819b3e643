mod client;
pub mod request;
pub mod widgets;

pub use client::SearchClient;
