//! Email notification service.
//!
//! Providers are configured at boot; an unconfigured service is a silent
//! no-op for best-effort notifications and an explicit error for callers
//! that require delivery. The mock provider fails roughly 5% of sends so
//! retry handling and error surfaces get exercised in development.

use serde::{Deserialize, Serialize};

use hestia_common::{AppError, AppResult};

/// Email provider configuration.
#[derive(Debug, Clone)]
pub enum EmailProvider {
    /// SMTP relay (logged stub).
    Smtp(SmtpConfig),
    /// SendGrid HTTP API.
    SendGrid(SendGridConfig),
    /// Mailgun HTTP API.
    Mailgun(MailgunConfig),
    /// In-memory mock with simulated failures.
    Mock,
}

/// SMTP configuration.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    /// SMTP host
    pub host: String,
    /// SMTP port
    pub port: u16,
}

/// SendGrid configuration.
#[derive(Debug, Clone)]
pub struct SendGridConfig {
    /// SendGrid API key
    pub api_key: String,
}

/// Mailgun configuration.
#[derive(Debug, Clone)]
pub struct MailgunConfig {
    /// Mailgun API key
    pub api_key: String,
    /// Mailgun domain
    pub domain: String,
}

/// Email configuration.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    /// Email provider
    pub provider: EmailProvider,
    /// From address
    pub from_address: String,
    /// Marketplace name (for templates)
    pub marketplace_name: String,
    /// Marketplace URL (for templates)
    pub marketplace_url: String,
}

/// Email message to be sent.
#[derive(Debug)]
pub struct EmailMessage {
    /// Recipient email address
    pub to: String,
    /// Subject line
    pub subject: String,
    /// Plain text body
    pub text_body: String,
    /// HTML body (optional)
    pub html_body: Option<String>,
}

/// Email delivery result.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailDeliveryResult {
    /// Whether the email was sent successfully
    pub success: bool,
    /// Message ID from provider (if available)
    pub message_id: Option<String>,
    /// Error message (if failed)
    pub error: Option<String>,
}

/// Welcome email sent when billing activates an agency.
#[derive(Debug)]
pub struct WelcomeEmail {
    pub to: String,
    pub agency_name: Option<String>,
}

/// Notification for an approval-queue decision.
#[derive(Debug)]
pub struct ListingDecisionEmail {
    pub to: String,
    pub listing_title: String,
    pub approved: bool,
    pub reason: Option<String>,
}

/// Notification for a failed subscription payment.
#[derive(Debug)]
pub struct PaymentFailedEmail {
    pub to: String,
    pub amount_due: i64,
    pub currency: String,
}

/// Simulated failure rate of the mock provider.
const MOCK_FAILURE_RATE: f64 = 0.05;

/// Email service.
#[derive(Clone)]
pub struct EmailService {
    config: Option<EmailConfig>,
    http_client: reqwest::Client,
}

impl EmailService {
    /// Create a new email service.
    #[must_use]
    pub fn new(config: Option<EmailConfig>) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    /// Check if email service is enabled.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.config.is_some()
    }

    /// Provider name for the meta endpoint.
    #[must_use]
    pub fn provider_name(&self) -> Option<&'static str> {
        self.config.as_ref().map(|c| match c.provider {
            EmailProvider::Smtp(_) => "smtp",
            EmailProvider::SendGrid(_) => "sendgrid",
            EmailProvider::Mailgun(_) => "mailgun",
            EmailProvider::Mock => "mock",
        })
    }

    /// Send an email.
    pub async fn send(&self, message: EmailMessage) -> AppResult<EmailDeliveryResult> {
        let config = self.config.as_ref().ok_or_else(|| {
            AppError::ServiceUnavailable("Email service not configured".to_string())
        })?;

        match &config.provider {
            EmailProvider::Smtp(smtp) => Self::send_smtp(smtp, &message),
            EmailProvider::SendGrid(sg) => self.send_sendgrid(sg, config, message).await,
            EmailProvider::Mailgun(mg) => self.send_mailgun(mg, config, message).await,
            EmailProvider::Mock => Self::send_mock(&message),
        }
    }

    /// Send the agency-activation welcome email.
    pub async fn send_welcome(&self, email: WelcomeEmail) -> AppResult<EmailDeliveryResult> {
        let config = self.config.as_ref().ok_or_else(|| {
            AppError::ServiceUnavailable("Email service not configured".to_string())
        })?;

        let name = email.agency_name.as_deref().unwrap_or("there");
        let subject = format!("Welcome to {}!", config.marketplace_name);
        let text = format!(
            "Hi {}!\n\n\
            Your developer account on {} is active. You can now publish listings\n\
            and track them from mission control.\n\n\
            Get started: {}",
            name, config.marketplace_name, config.marketplace_url
        );
        let html = self.wrap_html(
            &format!(
                "<p>Hi {}!</p>\
                <p>Your developer account on <strong>{}</strong> is active. You can now publish \
                listings and track them from mission control.</p>\
                <p><a href=\"{}\" style=\"display:inline-block;padding:12px 24px;background:#007bff;color:#fff;text-decoration:none;border-radius:4px;\">Get Started</a></p>",
                name, config.marketplace_name, config.marketplace_url
            ),
            config,
        );

        self.send(EmailMessage {
            to: email.to,
            subject,
            text_body: text,
            html_body: Some(html),
        })
        .await
    }

    /// Send the review-decision email.
    pub async fn send_listing_decision(
        &self,
        email: ListingDecisionEmail,
    ) -> AppResult<EmailDeliveryResult> {
        let config = self.config.as_ref().ok_or_else(|| {
            AppError::ServiceUnavailable("Email service not configured".to_string())
        })?;

        let (subject, text, html) = if email.approved {
            let subject = format!("\"{}\" was approved", email.listing_title);
            let text = format!(
                "Good news! \"{}\" passed review and can now be published.\n\n\
                Manage it here: {}/dashboard",
                email.listing_title, config.marketplace_url
            );
            let html = self.wrap_html(
                &format!(
                    "<p>Good news! <strong>{}</strong> passed review and can now be published.</p>\
                    <p><a href=\"{}/dashboard\">Open mission control</a></p>",
                    email.listing_title, config.marketplace_url
                ),
                config,
            );
            (subject, text, html)
        } else {
            let reason = email.reason.as_deref().unwrap_or("No reason was given");
            let subject = format!("\"{}\" needs changes", email.listing_title);
            let text = format!(
                "\"{}\" was not approved.\n\nReviewer notes: {}\n\n\
                Fix it up and resubmit: {}/dashboard",
                email.listing_title, reason, config.marketplace_url
            );
            let html = self.wrap_html(
                &format!(
                    "<p><strong>{}</strong> was not approved.</p>\
                    <blockquote>{}</blockquote>\
                    <p><a href=\"{}/dashboard\">Fix it up and resubmit</a></p>",
                    email.listing_title, reason, config.marketplace_url
                ),
                config,
            );
            (subject, text, html)
        };

        self.send(EmailMessage {
            to: email.to,
            subject,
            text_body: text,
            html_body: Some(html),
        })
        .await
    }

    /// Send the payment-failed email.
    pub async fn send_payment_failed(
        &self,
        email: PaymentFailedEmail,
    ) -> AppResult<EmailDeliveryResult> {
        let config = self.config.as_ref().ok_or_else(|| {
            AppError::ServiceUnavailable("Email service not configured".to_string())
        })?;

        let amount = format!(
            "{} {:.2}",
            email.currency.to_uppercase(),
            email.amount_due as f64 / 100.0
        );
        let subject = format!("Payment failed on {}", config.marketplace_name);
        let text = format!(
            "We could not collect {} for your subscription.\n\n\
            Update your payment details: {}/dashboard/billing",
            amount, config.marketplace_url
        );
        let html = self.wrap_html(
            &format!(
                "<p>We could not collect <strong>{}</strong> for your subscription.</p>\
                <p><a href=\"{}/dashboard/billing\">Update your payment details</a></p>",
                amount, config.marketplace_url
            ),
            config,
        );

        self.send(EmailMessage {
            to: email.to,
            subject,
            text_body: text,
            html_body: Some(html),
        })
        .await
    }

    /// Wrap HTML content in a basic email template.
    fn wrap_html(&self, content: &str, config: &EmailConfig) -> String {
        format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <style>
        body {{ font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; line-height: 1.6; color: #333; max-width: 600px; margin: 0 auto; padding: 20px; }}
        a {{ color: #007bff; }}
        blockquote {{ margin: 10px 0; padding: 10px 20px; border-left: 4px solid #e9ecef; background: #f8f9fa; }}
    </style>
</head>
<body>
    {}
    <hr style="margin-top: 40px; border: none; border-top: 1px solid #e9ecef;">
    <p style="font-size: 12px; color: #6c757d;">
        This email was sent from <a href="{}">{}</a>.
    </p>
</body>
</html>"#,
            content, config.marketplace_url, config.marketplace_name
        )
    }

    // Provider-specific implementations

    fn send_smtp(_smtp: &SmtpConfig, message: &EmailMessage) -> AppResult<EmailDeliveryResult> {
        // SMTP relay is a logged stub in this deployment.
        tracing::info!(
            to = %message.to,
            subject = %message.subject,
            "Would send email via SMTP"
        );
        Ok(EmailDeliveryResult {
            success: true,
            message_id: Some(format!("smtp-{}", uuid::Uuid::new_v4())),
            error: None,
        })
    }

    fn send_mock(message: &EmailMessage) -> AppResult<EmailDeliveryResult> {
        use rand::Rng;

        // Simulated transient failure to exercise retry/error surfaces.
        if rand::thread_rng().gen_bool(MOCK_FAILURE_RATE) {
            tracing::warn!(to = %message.to, "Mock email provider simulated a failure");
            return Ok(EmailDeliveryResult {
                success: false,
                message_id: None,
                error: Some("Simulated delivery failure".to_string()),
            });
        }

        tracing::info!(
            to = %message.to,
            subject = %message.subject,
            "Mock email delivered"
        );
        Ok(EmailDeliveryResult {
            success: true,
            message_id: Some(format!("mock-{}", uuid::Uuid::new_v4())),
            error: None,
        })
    }

    async fn send_sendgrid(
        &self,
        sg: &SendGridConfig,
        config: &EmailConfig,
        message: EmailMessage,
    ) -> AppResult<EmailDeliveryResult> {
        let body = serde_json::json!({
            "personalizations": [{
                "to": [{"email": message.to}]
            }],
            "from": {
                "email": config.from_address,
                "name": config.marketplace_name
            },
            "subject": message.subject,
            "content": [
                {"type": "text/plain", "value": message.text_body},
                {"type": "text/html", "value": message.html_body.unwrap_or_default()}
            ]
        });

        let response = self
            .http_client
            .post("https://api.sendgrid.com/v3/mail/send")
            .header("Authorization", format!("Bearer {}", sg.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("SendGrid request failed: {e}")))?;

        if response.status().is_success() {
            let message_id = response
                .headers()
                .get("X-Message-Id")
                .and_then(|v| v.to_str().ok())
                .map(String::from);
            Ok(EmailDeliveryResult {
                success: true,
                message_id,
                error: None,
            })
        } else {
            let error_text = response.text().await.unwrap_or_default();
            Ok(EmailDeliveryResult {
                success: false,
                message_id: None,
                error: Some(error_text),
            })
        }
    }

    async fn send_mailgun(
        &self,
        mg: &MailgunConfig,
        config: &EmailConfig,
        message: EmailMessage,
    ) -> AppResult<EmailDeliveryResult> {
        let mut form_params = vec![
            (
                "from",
                format!("{} <{}>", config.marketplace_name, config.from_address),
            ),
            ("to", message.to),
            ("subject", message.subject),
            ("text", message.text_body),
        ];

        if let Some(html) = message.html_body {
            form_params.push(("html", html));
        }

        let response = self
            .http_client
            .post(format!(
                "https://api.mailgun.net/v3/{}/messages",
                mg.domain
            ))
            .basic_auth("api", Some(&mg.api_key))
            .form(&form_params)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Mailgun request failed: {e}")))?;

        if response.status().is_success() {
            #[derive(Deserialize)]
            struct MailgunResponse {
                id: Option<String>,
            }
            let result: MailgunResponse = response
                .json()
                .await
                .unwrap_or(MailgunResponse { id: None });
            Ok(EmailDeliveryResult {
                success: true,
                message_id: result.id,
                error: None,
            })
        } else {
            let error_text = response.text().await.unwrap_or_default();
            Ok(EmailDeliveryResult {
                success: false,
                message_id: None,
                error: Some(error_text),
            })
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_service_errors_on_send() {
        let service = EmailService::new(None);
        let result = service
            .send(EmailMessage {
                to: "dev@example.com".into(),
                subject: "hi".into(),
                text_body: "hi".into(),
                html_body: None,
            })
            .await;

        assert!(matches!(result, Err(AppError::ServiceUnavailable(_))));
    }

    #[tokio::test]
    async fn test_mock_provider_mostly_delivers() {
        let service = EmailService::new(Some(EmailConfig {
            provider: EmailProvider::Mock,
            from_address: "noreply@example.com".into(),
            marketplace_name: "Hestia".into(),
            marketplace_url: "https://example.com".into(),
        }));

        let mut delivered = 0;
        for _ in 0..100 {
            let result = service
                .send_welcome(WelcomeEmail {
                    to: "dev@example.com".into(),
                    agency_name: Some("Oak & Stone".into()),
                })
                .await
                .unwrap();
            if result.success {
                delivered += 1;
            }
        }

        // ~5% simulated failure rate; anything above 75 is a safe bound.
        assert!(delivered > 75, "only {delivered} of 100 delivered");
    }
}
