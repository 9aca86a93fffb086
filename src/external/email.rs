use crate::config::EmailConfig;
use crate::error::{AppError, AppResult};
use crate::utils::email_templates::EmailMessage;
use reqwest::Client;
use serde::{Deserialize, Serialize};

const RESEND_URL: &str = "https://api.resend.com/emails";

#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: String,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct SendEmailResponse {
    pub id: String,
}

#[derive(Clone)]
pub struct EmailService {
    client: Client,
    config: EmailConfig,
}

impl EmailService {
    pub fn new(config: EmailConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn company_name(&self) -> &str {
        &self.config.company_name
    }

    pub fn is_enabled(&self) -> bool {
        self.config.is_enabled()
    }

    /// Returns the provider message id, or `None` when sending was skipped.
    pub async fn send(&self, to: &str, message: &EmailMessage) -> AppResult<Option<String>> {
        if !self.is_enabled() {
            log::info!("Email disabled, skipping \"{}\" to {to}", message.subject);
            return Ok(None);
        }
        if to.trim().is_empty() {
            log::warn!("No recipient for \"{}\", skipping", message.subject);
            return Ok(None);
        }

        let body = SendEmailRequest {
            from: format!("{} <{}>", self.config.company_name, self.config.sender_email),
            to: [to],
            subject: &message.subject,
            html: &message.html,
            text: &message.text,
        };

        let response = self
            .client
            .post(RESEND_URL)
            .bearer_auth(&self.config.resend_api_key)
            .json(&body)
            .send()
            .await?;

        if response.status().is_success() {
            let sent: SendEmailResponse = response.json().await?;
            log::info!("Email \"{}\" sent to {to} ({})", message.subject, sent.id);
            Ok(Some(sent.id))
        } else {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            log::error!("Email to {to} failed with {status}: {error_text}");
            Err(AppError::ExternalApiError(format!(
                "Email sending failed: {error_text}"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message() -> EmailMessage {
        EmailMessage {
            subject: "Hello".to_string(),
            html: "<p>Hi</p>".to_string(),
            text: "Hi".to_string(),
        }
    }

    #[tokio::test]
    async fn test_send_skipped_when_disabled() {
        let service = EmailService::new(EmailConfig::default());
        assert!(!service.is_enabled());
        assert_eq!(service.send("fan@example.com", &message()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_send_skipped_without_recipient() {
        let service = EmailService::new(EmailConfig {
            enabled: true,
            ..EmailConfig::default()
        });
        assert_eq!(service.send("  ", &message()).await.unwrap(), None);
    }

    #[test]
    fn test_request_shape() {
        let msg = message();
        let body = SendEmailRequest {
            from: "BuyMeADrink <no-reply@buymeadrink.app>".to_string(),
            to: ["fan@example.com"],
            subject: &msg.subject,
            html: &msg.html,
            text: &msg.text,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["to"][0], "fan@example.com");
        assert_eq!(value["subject"], "Hello");
    }
}
