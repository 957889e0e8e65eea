//! # booble-auth
//!
//! Authentication and authorization building blocks for BoobleDrive.
//!
//! ## Modules
//!
//! - `jwt`: access token creation, validation, and revocation
//! - `password`: Argon2id hashing and password policy
//! - `acl`: permission checks against a file's owner, visibility, and shares
//! - `token`: opaque random tokens for refresh tokens and public links

pub mod acl;
pub mod jwt;
pub mod password;
pub mod token;

pub use acl::FileAccessChecker;
pub use jwt::{Claims, JwtDecoder, JwtEncoder, RevocationList};
pub use password::{PasswordHasher, PasswordValidator};
