pub mod announcements;
pub mod auth;
pub mod crud;
pub mod purchases;
pub mod system;
pub mod users;
