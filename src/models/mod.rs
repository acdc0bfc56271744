pub mod chat;
pub mod weather;
