pub mod chat;
pub mod fetch;
