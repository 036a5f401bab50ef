pub mod clock;
pub mod phone;

pub use clock::*;
pub use phone::*;
