use crate::config::AppConfig;
use crate::entities::{creator_entity as creators, order_entity as orders, tier_entity as tiers};
use crate::external::EmailService;
use crate::models::{MonthlyEarnings, perks_from_json};
use crate::utils::email_templates::{self, EmailMessage, GiftEmail, TierSignupEmail};

/// Fire-and-forget transactional email. Sends run on spawned tasks; failures
/// are logged and never reach the caller.
#[derive(Clone)]
pub struct NotificationService {
    email: EmailService,
    app: AppConfig,
}

impl NotificationService {
    pub fn new(email: EmailService, app: AppConfig) -> Self {
        Self { email, app }
    }

    pub fn profile_url(&self, handle: &str) -> String {
        format!("{}/profile/{handle}", self.app.public_url.trim_end_matches('/'))
    }

    pub fn creator_welcome(&self, creator: &creators::Model) -> bool {
        let message = email_templates::creator_welcome(
            self.email.company_name(),
            &creator.name,
            &creator.handle,
            &self.profile_url(&creator.handle),
        );
        self.dispatch(creator.email.clone(), message)
    }

    /// Receipt to the fan and an alert to the creator.
    pub fn gift_completed(&self, order: &orders::Model, gift_title: &str, creator: &creators::Model) {
        let gift = GiftEmail {
            fan_name: order.fan_name.as_deref(),
            creator_name: &creator.name,
            gift_title,
            quantity: order.quantity,
            total_amount: order.total_amount,
            currency: &order.currency,
            message: order.message.as_deref(),
        };
        let company = self.email.company_name();
        self.dispatch(
            order.fan_email.clone(),
            email_templates::gift_receipt(company, &gift),
        );
        self.dispatch(
            creator.email.clone(),
            email_templates::creator_gift_alert(company, &gift),
        );
    }

    pub fn tier_signup(
        &self,
        fan_email: Option<String>,
        fan_name: Option<&str>,
        tier: &tiers::Model,
        creator: &creators::Model,
    ) -> bool {
        let perks = perks_from_json(&tier.perks);
        let message = email_templates::tier_signup(
            self.email.company_name(),
            &TierSignupEmail {
                fan_name,
                creator_name: &creator.name,
                tier_name: &tier.name,
                price: tier.price,
                currency: &tier.currency,
                perks: &perks,
            },
        );
        self.dispatch(fan_email, message)
    }

    pub fn payout_digest(
        &self,
        creator: &creators::Model,
        year: i32,
        month: u32,
        earnings: &MonthlyEarnings,
    ) -> bool {
        let message = email_templates::payout_digest(
            self.email.company_name(),
            &creator.name,
            year,
            month,
            earnings,
        );
        self.dispatch(creator.email.clone(), message)
    }

    /// Returns whether a send was queued.
    fn dispatch(&self, to: Option<String>, message: EmailMessage) -> bool {
        let Some(to) = to.filter(|t| !t.trim().is_empty()) else {
            log::warn!("No recipient for \"{}\", skipping", message.subject);
            return false;
        };
        if !self.email.is_enabled() {
            log::info!("Email disabled, skipping \"{}\" to {to}", message.subject);
            return false;
        }

        let email = self.email.clone();
        tokio::spawn(async move {
            if let Err(e) = email.send(&to, &message).await {
                log::error!("Failed to send \"{}\" to {to}: {e}", message.subject);
            }
        });
        true
    }
}
