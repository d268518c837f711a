pub mod client;
pub mod media;
