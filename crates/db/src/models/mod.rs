pub mod lock;
pub mod log;
pub mod privilege;
pub mod user;
