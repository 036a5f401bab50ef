pub mod common;
pub mod prize;
pub mod stats;
pub mod user;
pub mod wheel;
pub mod winner;

pub use common::*;
pub use prize::*;
pub use stats::*;
pub use user::*;
pub use wheel::*;
pub use winner::*;
