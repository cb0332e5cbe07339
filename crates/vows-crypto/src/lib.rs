//! Vows Crypto Library
//!
//! Guestbook entries carry a per-post password so their author can edit them
//! later. It keeps strangers from editing each other's messages and is not
//! meant as an account system: the salt is fixed and shared by every entry so
//! that a hash can be recomputed from the plaintext alone.

pub mod password;

pub use password::hash_password;
