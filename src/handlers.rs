pub mod admin;
pub mod auth;
pub mod dashboard;
pub mod health;
pub mod listings;
pub mod upload;
pub mod wizard;
