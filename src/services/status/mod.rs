pub mod types;
pub mod normalizer;
pub mod protocol;
pub mod query;

pub use types::*;
pub use normalizer::*;
pub use query::*;
