pub mod prizes;
pub mod users;
pub mod winners;

pub use prizes as prize_entity;
pub use users as user_entity;
pub use winners as winner_entity;
