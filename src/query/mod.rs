pub mod filter;
pub mod stats;

pub use filter::{FilterSpec, RawFilter};
