pub mod commands;
pub mod payload;
pub mod signature;
pub mod client;
pub mod sink;

pub use commands::*;
pub use payload::*;
pub use signature::*;
pub use client::*;
pub use sink::*;
