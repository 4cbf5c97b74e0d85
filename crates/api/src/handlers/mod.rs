pub mod auth;
pub mod locks;
pub mod logs;
pub mod privileges;
pub mod users;
