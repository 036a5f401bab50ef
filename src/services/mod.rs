pub mod draw_service;
pub mod eligibility_service;
pub mod prize_service;
pub mod stats_service;
pub mod user_service;
pub mod wheel_service;
pub mod winner_service;

pub use draw_service::*;
pub use eligibility_service::*;
pub use prize_service::*;
pub use stats_service::*;
pub use user_service::*;
pub use wheel_service::*;
pub use winner_service::*;
