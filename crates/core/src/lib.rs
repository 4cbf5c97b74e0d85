//! Domain core of the SecLock access-control backend.
//!
//! Everything here is storage- and transport-agnostic: the privilege model,
//! the token claim set, the authorization guard, the lock/user lifecycle
//! state machines, audit action kinds and pagination rules. The `db` and
//! `api` crates build on these types.

pub mod audit;
pub mod claims;
pub mod error;
pub mod guard;
pub mod locks;
pub mod pagination;
pub mod privilege_cache;
pub mod privileges;
pub mod types;
pub mod users;
