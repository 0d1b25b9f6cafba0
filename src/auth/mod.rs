pub mod hasher;
pub mod identity;

pub use hasher::{Argon2Hasher, PasswordHasher};
pub use identity::Caller;
