pub mod dashboard_service;
pub mod identity;
pub mod listing_service;
pub mod upload_service;

pub use dashboard_service::DashboardService;
pub use identity::{IdentityProvider, LocalIdentityProvider, SessionEvent, SessionNotifier};
pub use listing_service::{InProcessSubmitter, ListingService};
pub use upload_service::{LocalDiskStorage, ObjectStorage, UploadService};
