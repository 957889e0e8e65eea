//! User accounts and the email value object.

pub mod email;
pub mod model;

pub use email::Email;
pub use model::{CreateUser, User};
