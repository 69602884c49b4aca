//! Business logic services.

#![allow(missing_docs)]

pub mod approval;
pub mod billing;
pub mod brand;
pub mod dashboard;
pub mod email;
pub mod geocoding;
pub mod listing;
pub mod media;
pub mod stripe_webhook;
pub mod user;
pub mod wizard;

pub use approval::{
    ApprovalService, ComplianceCheck, ReviewDecision, run_compliance_checks,
};
pub use billing::{
    BillingOverview, BillingService, CheckoutSession, CheckoutSessionRequest, InvoiceResponse,
    LiveStripeGateway, PortalSession, StripeGateway, SubscriptionResponse,
};
pub use brand::{BrandResponse, BrandService, CreateBrandInput, UpdateBrandInput};
pub use dashboard::{ActivityEntry, DashboardKpis, DashboardService};
pub use email::{
    EmailConfig, EmailDeliveryResult, EmailMessage, EmailProvider, EmailService,
    ListingDecisionEmail, MailgunConfig, PaymentFailedEmail, SendGridConfig, SmtpConfig,
    WelcomeEmail,
};
pub use geocoding::{GeoPoint, GeocodingService};
pub use listing::{BrowseFilter, ListingResponse, ListingService};
pub use media::{AttachMediaInput, MediaService, MAX_MEDIA_PER_LISTING, MAX_MEDIA_SIZE};
pub use stripe_webhook::{
    verify_signature, StripeEvent, StripeEventType, StripeWebhookService,
};
pub use user::{CreateUserInput, UserService};
pub use wizard::{
    DraftMedia, DraftSnapshot, FieldErrors, ListingDraft, ListingWizard, LocationFields,
    PricingTerms, PropertyDetails, SubmitListingInput, WizardStep,
};
