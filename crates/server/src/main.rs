//! Hestia marketplace server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{middleware, Router};
use hestia_api::{middleware::AppState, router as api_router, webhook_router, MetaInfo};
use hestia_common::{Config, LocalStorage, StorageBackend};
use hestia_core::{
    ApprovalService, BillingService, BrandService, DashboardService, EmailConfig, EmailProvider,
    EmailService, GeocodingService, ListingService, LiveStripeGateway, MailgunConfig,
    MediaService, SendGridConfig, SmtpConfig, StripeGateway, StripeWebhookService, UserService,
};
use hestia_db::repositories::{
    ActivityEventRepository, ApprovalQueueRepository, BrandProfileRepository, InvoiceRepository,
    ListingMediaRepository, ListingRepository, StripeEventRepository, SubscriptionRepository,
    UserRepository,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

async fn build_storage(config: &Config) -> (Arc<dyn StorageBackend>, &'static str) {
    match &config.storage {
        None => {
            let base = config.server.url.trim_end_matches('/');
            (
                Arc::new(LocalStorage::new(
                    "./media".into(),
                    format!("{base}/media"),
                    format!("{base}/api/uploads"),
                )),
                "local",
            )
        }
        Some(hestia_common::config::StorageSettings::Local {
            base_path,
            base_url,
        }) => {
            let base = config.server.url.trim_end_matches('/');
            (
                Arc::new(LocalStorage::new(
                    base_path.into(),
                    base_url.clone(),
                    format!("{base}/api/uploads"),
                )),
                "local",
            )
        }
        #[cfg(feature = "s3")]
        Some(hestia_common::config::StorageSettings::S3 {
            endpoint,
            bucket,
            region,
            access_key_id,
            secret_access_key,
            public_url,
            presign_expiry_secs,
        }) => {
            let storage = hestia_common::storage::S3Storage::new(
                endpoint,
                bucket.clone(),
                region,
                access_key_id,
                secret_access_key,
                public_url.clone(),
                std::time::Duration::from_secs(*presign_expiry_secs),
            )
            .await
            .expect("Failed to initialize S3 storage");
            (Arc::new(storage), "s3")
        }
        #[cfg(not(feature = "s3"))]
        Some(hestia_common::config::StorageSettings::S3 { .. }) => {
            tracing::warn!("S3 storage configured but the binary was built without the `s3` feature; falling back to local storage");
            let base = config.server.url.trim_end_matches('/');
            (
                Arc::new(LocalStorage::new(
                    "./media".into(),
                    format!("{base}/media"),
                    format!("{base}/api/uploads"),
                )),
                "local",
            )
        }
    }
}

fn build_email(config: &Config) -> EmailService {
    let Some(settings) = &config.email else {
        info!("Email is not configured; notifications disabled");
        return EmailService::new(None);
    };

    let (provider, from_address) = match settings.clone() {
        hestia_common::config::EmailSettings::Smtp {
            host,
            port,
            from_address,
        } => (EmailProvider::Smtp(SmtpConfig { host, port }), from_address),
        hestia_common::config::EmailSettings::Sendgrid {
            api_key,
            from_address,
        } => (
            EmailProvider::SendGrid(SendGridConfig { api_key }),
            from_address,
        ),
        hestia_common::config::EmailSettings::Mailgun {
            api_key,
            domain,
            from_address,
        } => (
            EmailProvider::Mailgun(MailgunConfig { api_key, domain }),
            from_address,
        ),
        hestia_common::config::EmailSettings::Mock { from_address } => {
            (EmailProvider::Mock, from_address)
        }
    };

    EmailService::new(Some(EmailConfig {
        provider,
        from_address,
        marketplace_name: config.marketplace.name.clone(),
        marketplace_url: config.server.url.clone(),
    }))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hestia=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting hestia server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database and run migrations
    let db = hestia_db::init(&config).await?;
    info!("Connected to database");

    info!("Running database migrations...");
    hestia_db::migrate(&db).await?;
    info!("Migrations completed");

    // Initialize repositories
    let db = Arc::new(db);
    let user_repo = UserRepository::new(Arc::clone(&db));
    let listing_repo = ListingRepository::new(Arc::clone(&db));
    let media_repo = ListingMediaRepository::new(Arc::clone(&db));
    let queue_repo = ApprovalQueueRepository::new(Arc::clone(&db));
    let subscription_repo = SubscriptionRepository::new(Arc::clone(&db));
    let invoice_repo = InvoiceRepository::new(Arc::clone(&db));
    let stripe_event_repo = StripeEventRepository::new(Arc::clone(&db));
    let brand_repo = BrandProfileRepository::new(Arc::clone(&db));
    let activity_repo = ActivityEventRepository::new(Arc::clone(&db));

    // Optional integrations, each disabled rather than fatal when absent
    let (storage, storage_backend) = build_storage(&config).await;
    let email_service = build_email(&config);

    let geocoding_service = config
        .geocoding
        .as_ref()
        .map(|g| GeocodingService::new(g.api_key.clone()));
    if geocoding_service.is_none() {
        info!("Geocoding is not configured; coordinates stay client-supplied");
    }

    let stripe_gateway: Option<Arc<dyn StripeGateway>> = config
        .stripe
        .as_ref()
        .map(|s| Arc::new(LiveStripeGateway::new(s.secret_key.clone())) as Arc<dyn StripeGateway>);
    if stripe_gateway.is_none() {
        info!("Stripe is not configured; billing endpoints disabled");
    }

    // Initialize services
    let user_service = UserService::new(user_repo.clone());
    let listing_service = ListingService::new(listing_repo.clone(), geocoding_service.clone());
    let approval_service = ApprovalService::new(
        Arc::clone(&db),
        listing_repo.clone(),
        queue_repo.clone(),
        activity_repo.clone(),
        user_repo.clone(),
        email_service.clone(),
    );
    let media_service = MediaService::new(
        media_repo.clone(),
        listing_repo.clone(),
        activity_repo.clone(),
        Arc::clone(&storage),
    );
    let billing_service = BillingService::new(
        stripe_gateway,
        config
            .stripe
            .as_ref()
            .map(|s| s.developer_price_id.clone())
            .unwrap_or_default(),
        config.server.url.clone(),
        subscription_repo.clone(),
        invoice_repo.clone(),
        user_repo.clone(),
    );
    let stripe_webhook_service = config.stripe.as_ref().map(|s| {
        StripeWebhookService::new(
            s.webhook_secret.clone(),
            s.signature_tolerance_secs,
            user_repo.clone(),
            subscription_repo.clone(),
            invoice_repo.clone(),
            stripe_event_repo.clone(),
            activity_repo.clone(),
            email_service.clone(),
        )
    });
    let brand_service = BrandService::new(brand_repo, listing_repo.clone());
    let dashboard_service = DashboardService::new(
        listing_repo,
        activity_repo,
        subscription_repo,
    );

    let meta = MetaInfo {
        name: config.marketplace.name.clone(),
        description: config.marketplace.description.clone(),
        billing_enabled: billing_service.is_enabled(),
        geocoding_enabled: geocoding_service.is_some(),
        email_provider: email_service.provider_name(),
        storage_backend,
    };

    // Create app state
    let state = AppState {
        user_service,
        listing_service,
        approval_service,
        media_service,
        billing_service,
        stripe_webhook_service,
        brand_service,
        dashboard_service,
        meta,
    };

    // Build router
    let app = Router::new()
        .nest("/api", api_router())
        .nest("/webhooks", webhook_router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            hestia_api::middleware::auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server with graceful shutdown
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
