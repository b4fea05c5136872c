pub mod chat_transport;
pub mod repositories;
