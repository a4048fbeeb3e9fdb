pub(crate) mod client;
pub mod types;
