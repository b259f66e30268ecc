//! Authentication module for the stored bearer credential.
//!
//! This module provides:
//! - `Session`: the in-memory credential, loaded once from storage
//! - `ClientStorage`: persistent key-value storage with file, keyring
//!   and in-memory backends
//!
//! The credential lives under the `"token"` key. It is written by the
//! login flow and removed on logout; it has no expiry on the client side.

pub mod session;
pub mod storage;

pub use session::Session;
pub use storage::{ClientStorage, FileStorage, KeyringStorage, MemoryStorage, TOKEN_KEY};
