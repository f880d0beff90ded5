pub mod identity;

pub use identity::{UserId, USER_ID_HEADER};
