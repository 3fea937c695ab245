pub mod types;
pub mod sink;
pub mod change_detector;
pub mod rate_limiter;
pub mod scheduler;
pub mod schedule;
pub mod dispatcher;

pub use types::*;
pub use sink::*;
pub use change_detector::*;
pub use rate_limiter::*;
pub use scheduler::*;
pub use schedule::*;
pub use dispatcher::*;
