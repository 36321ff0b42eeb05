pub mod auth;
pub mod booking;
pub mod dashboard;
pub mod filter;
pub mod kitchen;
pub mod listing;
pub mod property;
pub mod venue;

pub use listing::IdDocumentType;
