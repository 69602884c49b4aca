//! SeaORM entity definitions.

pub mod activity_event;
pub mod approval_queue;
pub mod brand_profile;
pub mod invoice;
pub mod listing;
pub mod listing_media;
pub mod stripe_event;
pub mod subscription;
pub mod user;

pub use activity_event::Entity as ActivityEvent;
pub use approval_queue::Entity as ApprovalQueue;
pub use brand_profile::Entity as BrandProfile;
pub use invoice::Entity as Invoice;
pub use listing::Entity as Listing;
pub use listing_media::Entity as ListingMedia;
pub use stripe_event::Entity as StripeEvent;
pub use subscription::Entity as Subscription;
pub use user::Entity as User;
