pub mod client;
pub mod repositories;
