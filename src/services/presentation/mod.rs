pub mod embed;
pub mod help;

pub use embed::*;
pub use help::help_message;
