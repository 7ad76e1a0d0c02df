pub mod admin_users;
pub mod auth;
pub mod demands;
pub mod health;
