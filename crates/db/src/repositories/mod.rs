//! Repository layer over the SeaORM entities.

pub mod activity_event;
pub mod approval_queue;
pub mod brand_profile;
pub mod invoice;
pub mod listing;
pub mod listing_media;
pub mod stripe_event;
pub mod subscription;
pub mod user;

pub use activity_event::ActivityEventRepository;
pub use approval_queue::ApprovalQueueRepository;
pub use brand_profile::BrandProfileRepository;
pub use invoice::InvoiceRepository;
pub use listing::ListingRepository;
pub use listing_media::ListingMediaRepository;
pub use stripe_event::StripeEventRepository;
pub use subscription::SubscriptionRepository;
pub use user::UserRepository;
