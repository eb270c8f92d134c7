pub mod client;
mod record;
pub mod store;
