use std::time::Duration;

use anyhow::{Result, anyhow};
use futures_util::future::BoxFuture;
use serde::Serialize;
use tracing::warn;

/// Entrants at or below this position get the early bird welcome.
pub const EARLY_BIRD_LIMIT: u64 = 100;

pub const DEFAULT_FROM_EMAIL: &str = "Vendra <hello@vendra.ng>";

const RESEND_ENDPOINT: &str = "https://api.resend.com/emails";

/// Whole-request limit for one Resend call.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Outbound welcome delivery. Failures are reported to the caller, which
/// logs them; they never reach the signup response.
pub trait Notifier: Send + Sync + 'static {
    fn send<'a>(&'a self, email: &'a str, position: u64) -> BoxFuture<'a, Result<()>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WelcomeVariant {
    EarlyBird,
    Standard,
}

impl WelcomeVariant {
    pub fn for_position(position: u64) -> Self {
        if position <= EARLY_BIRD_LIMIT {
            WelcomeVariant::EarlyBird
        } else {
            WelcomeVariant::Standard
        }
    }

    fn subject(self) -> &'static str {
        match self {
            WelcomeVariant::EarlyBird => "You're in the First 100! - Vendra Waitlist",
            WelcomeVariant::Standard => "Welcome to Vendra!",
        }
    }

    fn perk(self) -> &'static str {
        match self {
            WelcomeVariant::EarlyBird => {
                "You're in the first 100! You've earned 3 months of Pro tier FREE when we launch."
            }
            WelcomeVariant::Standard => {
                "Thank you for joining! We'll keep you updated on our launch progress."
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WelcomeEmail {
    pub variant: WelcomeVariant,
    pub subject: &'static str,
    pub html: String,
}

pub fn welcome_email(position: u64) -> WelcomeEmail {
    let variant = WelcomeVariant::for_position(position);
    let html = format!(
        "<h1>Welcome to Vendra</h1>\
         <p>Thank you for joining the Vendra waitlist.</p>\
         <p><strong>{}</strong></p>\
         <p>Your position: <strong>{}</strong></p>\
         <p>The Vendra Team</p>",
        variant.perk(),
        position
    );

    WelcomeEmail {
        variant,
        subject: variant.subject(),
        html,
    }
}

#[derive(Serialize)]
struct ResendEmail<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

/// Sends welcome emails through the Resend HTTP API.
pub struct ResendNotifier {
    client: reqwest::Client,
    api_key: String,
    from_email: String,
}

impl ResendNotifier {
    pub fn new(api_key: String, from_email: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            api_key,
            from_email,
        })
    }

    async fn deliver(&self, email: &str, position: u64) -> Result<()> {
        let welcome = welcome_email(position);

        let res = self
            .client
            .post(RESEND_ENDPOINT)
            .bearer_auth(&self.api_key)
            .json(&ResendEmail {
                from: &self.from_email,
                to: [email],
                subject: welcome.subject,
                html: &welcome.html,
            })
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(anyhow!("Resend returned {}: {}", status, body));
        }

        Ok(())
    }
}

impl Notifier for ResendNotifier {
    fn send<'a>(&'a self, email: &'a str, position: u64) -> BoxFuture<'a, Result<()>> {
        Box::pin(self.deliver(email, position))
    }
}

/// Used when no Resend API key is configured.
pub struct DisabledNotifier;

impl Notifier for DisabledNotifier {
    fn send<'a>(&'a self, email: &'a str, position: u64) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            warn!(email, position, "RESEND_API_KEY not configured, skipping welcome email");
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_hundred_get_early_bird() {
        assert_eq!(WelcomeVariant::for_position(1), WelcomeVariant::EarlyBird);
        assert_eq!(WelcomeVariant::for_position(100), WelcomeVariant::EarlyBird);
        assert_eq!(WelcomeVariant::for_position(101), WelcomeVariant::Standard);
    }

    #[test]
    fn welcome_email_carries_position_and_perk() {
        let early = welcome_email(1);
        assert_eq!(early.subject, "You're in the First 100! - Vendra Waitlist");
        assert!(early.html.contains("3 months of Pro tier FREE"));
        assert!(early.html.contains("<strong>1</strong>"));

        let standard = welcome_email(101);
        assert_eq!(standard.variant, WelcomeVariant::Standard);
        assert_eq!(standard.subject, "Welcome to Vendra!");
        assert!(!standard.html.contains("Pro tier"));
        assert!(standard.html.contains("<strong>101</strong>"));
    }

    #[test]
    fn resend_payload_shape() {
        let body = serde_json::to_value(ResendEmail {
            from: DEFAULT_FROM_EMAIL,
            to: ["a@b.co"],
            subject: "Welcome to Vendra!",
            html: "<p>hi</p>",
        })
        .unwrap();

        assert_eq!(body["to"], serde_json::json!(["a@b.co"]));
        assert_eq!(body["from"], "Vendra <hello@vendra.ng>");
    }

    #[test]
    fn resend_client_builds_with_timeouts() {
        assert!(ResendNotifier::new("re_test".into(), DEFAULT_FROM_EMAIL.into()).is_ok());
        assert!(REQUEST_TIMEOUT < crate::dispatch::SEND_TIMEOUT);
    }

    #[tokio::test]
    async fn disabled_notifier_succeeds() {
        assert!(DisabledNotifier.send("a@b.co", 1).await.is_ok());
    }
}
