//! Transactional email bodies.
//!
//! Every builder returns an [`EmailMessage`] with an HTML body and a plain-text
//! alternative derived from it. Text supplied by fans or creators is escaped
//! before it is interpolated.

use crate::models::MonthlyEarnings;
use regex::Regex;
use std::sync::LazyLock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub subject: String,
    pub html: String,
    pub text: String,
}

pub struct GiftEmail<'a> {
    pub fan_name: Option<&'a str>,
    pub creator_name: &'a str,
    pub gift_title: &'a str,
    pub quantity: i32,
    pub total_amount: i64,
    pub currency: &'a str,
    pub message: Option<&'a str>,
}

pub struct TierSignupEmail<'a> {
    pub fan_name: Option<&'a str>,
    pub creator_name: &'a str,
    pub tier_name: &'a str,
    pub price: i64,
    pub currency: &'a str,
    pub perks: &'a [String],
}

static BR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").expect("br regex"));
static P_CLOSE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)</p>").expect("p regex"));
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag regex"));
static BLANK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").expect("blank regex"));
static INDENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]+|[ \t]+$").expect("indent regex"));

/// `1234, "usd"` -> `"USD 12.34"`
pub fn format_amount(amount: i64, currency: &str) -> String {
    let sign = if amount < 0 { "-" } else { "" };
    let abs = amount.unsigned_abs();
    format!(
        "{} {sign}{}.{:02}",
        currency.to_ascii_uppercase(),
        abs / 100,
        abs % 100
    )
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn to_plain_text(html: &str) -> String {
    let text = BR_RE.replace_all(html, "\n");
    let text = P_CLOSE_RE.replace_all(&text, "\n\n");
    let text = TAG_RE.replace_all(&text, "");
    let text = INDENT_RE.replace_all(&text, "");
    let text = BLANK_RE.replace_all(&text, "\n\n");
    text.trim().to_string()
}

fn wrap_email(company: &str, title: &str, content: &str) -> String {
    let company = escape_html(company);
    format!(
        r#"<!DOCTYPE html>
<html>
  <head>
    <meta charset="utf-8" />
    <title>{title}</title>
  </head>
  <body style="margin:0;padding:32px;background:#f7f7f7;font-family:Arial,Helvetica,sans-serif;color:#111;">
    <table role="presentation" width="100%" style="max-width:560px;margin:0 auto;background:#ffffff;border-radius:16px;padding:32px;border:1px solid #e5e5e5;">
      <tr>
        <td>
          <h1 style="margin:0 0 16px 0;font-size:24px;color:#111;">{title}</h1>
          {content}
          <p style="margin-top:32px;font-size:13px;color:#777;">Sent by {company}. Need help? Reply to this email.</p>
        </td>
      </tr>
    </table>
  </body>
</html>"#
    )
}

fn finish(company: &str, subject: String, title: &str, body: &str) -> EmailMessage {
    let html = wrap_email(company, &escape_html(title), body);
    let text = to_plain_text(&html);
    EmailMessage {
        subject,
        html,
        text,
    }
}

fn summary_row(label: &str, value: &str) -> String {
    format!(
        r#"<tr><td style="padding:8px 0;">{label}</td><td style="padding:8px 0;text-align:right;">{value}</td></tr>
"#
    )
}

fn message_block(heading: &str, message: Option<&str>) -> String {
    match message.map(str::trim).filter(|m| !m.is_empty()) {
        Some(m) => format!(
            r#"<div style="margin:16px 0;padding:16px;background:#f1f5f9;border-radius:12px;"><p style="margin:0 0 8px 0;font-weight:bold;">{heading}</p><p style="margin:0;white-space:pre-wrap;">{}</p></div>
"#,
            escape_html(m)
        ),
        None => String::new(),
    }
}

pub fn creator_welcome(company: &str, name: &str, handle: &str, profile_url: &str) -> EmailMessage {
    let body = format!(
        r#"<p>Hi {name},</p>
<p>Your creator profile <strong>@{handle}</strong> is live. Share it with your fans so they can send gifts and join your support tiers.</p>
<p><a href="{url}">{url}</a></p>
<p>Next steps: add your first gift, set up a support tier and link your socials from the dashboard.</p>
"#,
        name = escape_html(name),
        handle = escape_html(handle),
        url = escape_html(profile_url),
    );
    finish(
        company,
        format!("Welcome to {company}, {name}! Your creator profile is ready"),
        &format!("Welcome to {company}!"),
        &body,
    )
}

pub fn gift_receipt(company: &str, gift: &GiftEmail<'_>) -> EmailMessage {
    let mut body = format!(
        r#"<p>Hi {fan},</p>
<p>Thanks for buying {qty} &times; {title} for {creator}. They will see your support right away.</p>
<table role="presentation" style="width:100%;border-collapse:collapse;margin-bottom:16px;">
"#,
        fan = escape_html(gift.fan_name.unwrap_or("there")),
        qty = gift.quantity,
        title = escape_html(gift.gift_title),
        creator = escape_html(gift.creator_name),
    );
    body.push_str(&summary_row(
        "Order total",
        &format_amount(gift.total_amount, gift.currency),
    ));
    body.push_str(&summary_row("Quantity", &gift.quantity.to_string()));
    body.push_str(&summary_row("Gift", &escape_html(gift.gift_title)));
    body.push_str("</table>\n");
    body.push_str(&message_block("Your message", gift.message));
    body.push_str(&format!(
        "<p>You will see {} on your bank statement.</p>\n",
        escape_html(company)
    ));

    finish(
        company,
        format!("You just supported {}", gift.creator_name),
        "Thanks for your gift!",
        &body,
    )
}

pub fn creator_gift_alert(company: &str, gift: &GiftEmail<'_>) -> EmailMessage {
    let fan = gift.fan_name.unwrap_or("Anonymous");
    let mut body = format!(
        r#"<p>Hi {creator},</p>
<p>{fan} just sent you {qty} &times; {title}.</p>
<table role="presentation" style="width:100%;border-collapse:collapse;margin-bottom:16px;">
"#,
        creator = escape_html(gift.creator_name),
        fan = escape_html(fan),
        qty = gift.quantity,
        title = escape_html(gift.gift_title),
    );
    body.push_str(&summary_row(
        "Amount",
        &format_amount(gift.total_amount, gift.currency),
    ));
    body.push_str("</table>\n");
    body.push_str(&message_block("Message from your fan", gift.message));

    let subject_fan = gift.fan_name.unwrap_or("A fan");
    finish(
        company,
        format!("{subject_fan} sent you a gift"),
        "You received a gift",
        &body,
    )
}

pub fn tier_signup(company: &str, signup: &TierSignupEmail<'_>) -> EmailMessage {
    let mut body = format!(
        r#"<p>Hi {fan},</p>
<p>You are now a {tier} supporter of {creator} for {price} per month.</p>
"#,
        fan = escape_html(signup.fan_name.unwrap_or("there")),
        tier = escape_html(signup.tier_name),
        creator = escape_html(signup.creator_name),
        price = format_amount(signup.price, signup.currency),
    );
    if !signup.perks.is_empty() {
        body.push_str("<p>Your perks:</p>\n<ul>\n");
        for perk in signup.perks {
            body.push_str(&format!("<li>{}</li>\n", escape_html(perk)));
        }
        body.push_str("</ul>\n");
    }

    finish(
        company,
        format!("Welcome to {} for {}", signup.tier_name, signup.creator_name),
        "Thanks for joining!",
        &body,
    )
}

pub fn payout_digest(
    company: &str,
    creator_name: &str,
    year: i32,
    month: u32,
    earnings: &MonthlyEarnings,
) -> EmailMessage {
    let month_name = u8::try_from(month)
        .ok()
        .and_then(|m| chrono::Month::try_from(m).ok())
        .map(|m| m.name().to_string())
        .unwrap_or_else(|| month.to_string());
    let period = format!("{month_name} {year}");
    let currency = earnings.currency.as_str();

    let mut body = format!(
        r#"<p>Hi {creator},</p>
<p>Here is your earnings summary for {period}.</p>
<table role="presentation" style="width:100%;border-collapse:collapse;margin-bottom:16px;">
"#,
        creator = escape_html(creator_name),
    );
    body.push_str(&summary_row(
        "Gifts",
        &format!(
            "{} ({})",
            format_amount(earnings.gift_earnings, currency),
            earnings.gift_count
        ),
    ));
    body.push_str(&summary_row(
        "Memberships",
        &format!(
            "{} ({})",
            format_amount(earnings.subscription_earnings, currency),
            earnings.subscription_count
        ),
    ));
    body.push_str(&summary_row(
        "Gross",
        &format_amount(earnings.total_earnings, currency),
    ));
    body.push_str(&summary_row(
        "Platform fee",
        &format_amount(earnings.platform_fee, currency),
    ));
    body.push_str(&summary_row(
        "Net payout",
        &format_amount(earnings.net_earnings, currency),
    ));
    body.push_str("</table>\n");

    finish(
        company,
        format!("{period} payout summary"),
        &format!("{period} payout summary"),
        &body,
    )
}
