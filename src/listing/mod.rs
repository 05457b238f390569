pub mod extract;
pub mod models;
pub mod normalize;

pub use models::{PropertyRecord, RawProperty};
