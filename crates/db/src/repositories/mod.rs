pub mod lock_repo;
pub mod log_repo;
pub mod privilege_repo;
pub mod user_repo;

pub use lock_repo::LockRepo;
pub use log_repo::{SystemLogRepo, UserLogRepo};
pub use privilege_repo::PrivilegeRepo;
pub use user_repo::UserRepo;
