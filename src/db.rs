pub mod booking_repo;
pub mod kitchen_repo;
pub mod property_repo;
pub mod session_repo;
pub mod user_repo;
pub mod venue_repo;

pub use booking_repo::BookingRepository;
pub use kitchen_repo::KitchenRepository;
pub use property_repo::PropertyRepository;
pub use session_repo::SessionRepository;
pub use user_repo::UserRepository;
pub use venue_repo::VenueRepository;
