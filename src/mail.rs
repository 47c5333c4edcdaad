//! Mail relay for widget order submissions.
//!
//! The public widget posts an order to `/send-mail`; this module owns the
//! payload shape, the HTML letter templates, and the transport client. Two
//! letters go out per order - a notification to the widget's admin address
//! and an acknowledgment to the submitter - both rendered from the same
//! template with the translation strings supplied in the request.
//!
//! Delivery itself is an external service: the client posts a
//! `{from, to, subject, html}` message to the configured HTTP mail API and
//! treats anything non-2xx as failure. No retries.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::catalog::MISSING_LABEL;
use crate::config::Config;

// ==================== Payload ====================

/// Order payload posted by the embedded widget.
///
/// Every field is optional at the decode layer so the handler can reproduce
/// the exact required-field contract (missing OR empty string counts as
/// absent) instead of a generic deserialization error. Unknown extra fields
/// are accepted and ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMailRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub selected_house: Option<String>,
    #[serde(default)]
    pub selected_trademark: Option<String>,
    #[serde(default)]
    pub selected_color: Option<String>,
    #[serde(default)]
    pub admin_email: Option<String>,
    #[serde(default)]
    pub widget_name: Option<String>,
    #[serde(default)]
    pub pdf_url: Option<String>,
    #[serde(default)]
    pub translations: Option<MailTranslations>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MailTranslations {
    #[serde(default)]
    pub form: BTreeMap<String, String>,
    #[serde(default)]
    pub widget: BTreeMap<String, String>,
}

fn blank(value: &Option<String>) -> bool {
    value.as_deref().unwrap_or("").is_empty()
}

impl SendMailRequest {
    /// The relay contract: `name`, `phone`, `email`, `adminEmail`,
    /// `widgetName`, `pdfUrl` and `translations` must all be present and
    /// non-empty. The selected catalog labels may be absent.
    pub fn missing_required_fields(&self) -> bool {
        blank(&self.name)
            || blank(&self.phone)
            || blank(&self.email)
            || blank(&self.admin_email)
            || blank(&self.widget_name)
            || blank(&self.pdf_url)
            || self.translations.is_none()
    }

    fn form_label(&self, key: &str) -> &str {
        self.translations
            .as_ref()
            .and_then(|t| t.form.get(key))
            .map(String::as_str)
            .unwrap_or(MISSING_LABEL)
    }

    fn widget_label(&self, key: &str) -> &str {
        self.translations
            .as_ref()
            .and_then(|t| t.widget.get(key))
            .map(String::as_str)
            .unwrap_or(MISSING_LABEL)
    }

    fn field<'a>(&self, value: &'a Option<String>) -> &'a str {
        value.as_deref().filter(|v| !v.is_empty()).unwrap_or(MISSING_LABEL)
    }
}

// ==================== Templates ====================

/// The order letter body sent to the widget admin.
pub fn order_html(request: &SendMailRequest) -> String {
    format!(
        r#"
      <h2>{header} "{widget_name}"</h2>
      <p><strong>{your_name}:</strong> {name}</p>
      <p><strong>{phone_number}:</strong> {phone}</p>
      <p><strong>{email_label}:</strong> {email}</p>
      <p><strong>{house_type}:</strong> {selected_house}</p>
      <p><strong>{tm}:</strong> {selected_trademark}</p>
      <p><strong>{color}:</strong> {selected_color}</p>
      <p>{letter_pdf}: <a href="{pdf_url}" target="_blank">{download_pdf}</a></p>
  "#,
        header = request.form_label("letter_header"),
        widget_name = request.field(&request.widget_name),
        your_name = request.form_label("your_name"),
        name = request.field(&request.name),
        phone_number = request.form_label("phone_number"),
        phone = request.field(&request.phone),
        email_label = request.form_label("email"),
        email = request.field(&request.email),
        house_type = request.form_label("house_type"),
        selected_house = request.field(&request.selected_house),
        tm = request.form_label("tm"),
        selected_trademark = request.field(&request.selected_trademark),
        color = request.form_label("color"),
        selected_color = request.field(&request.selected_color),
        letter_pdf = request.form_label("letter_pdf"),
        pdf_url = request.field(&request.pdf_url),
        download_pdf = request.widget_label("download_pdf"),
    )
}

/// The acknowledgment letter sent back to the submitter: a thank-you header
/// over a copy of the order.
pub fn acknowledgment_html(request: &SendMailRequest) -> String {
    format!(
        r#"
        <h3>{thanks}, {name}!</h3>
        <p>{feedback}</p>
        <hr/>
        {order}
      "#,
        thanks = request.form_label("letter_thanku"),
        name = request.field(&request.name),
        feedback = request.form_label("letter_feedback"),
        order = order_html(request),
    )
}

// ==================== Transport ====================

#[derive(Debug, Serialize)]
struct OutgoingMessage<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
}

#[derive(Clone)]
pub struct Mailer {
    client: reqwest::Client,
    api_url: String,
    token: String,
    from: String,
}

impl Mailer {
    pub fn new(config: &Config) -> Self {
        Self::from_parts(&config.mail_api_url, &config.mail_api_token, &config.mail_from)
    }

    pub fn from_parts(api_url: &str, token: &str, from: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            from: from.to_string(),
        }
    }

    /// Send one message through the mail API.
    pub async fn send(&self, to: &str, subject: &str, html: &str) -> Result<()> {
        let url = format!("{}/messages", self.api_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&OutgoingMessage {
                from: &self.from,
                to,
                subject,
                html,
            })
            .send()
            .await
            .context("Failed to reach mail API")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Mail API error ({}): {}", status, body);
        }

        Ok(())
    }

    /// Relay one order: admin notification first, then the submitter
    /// acknowledgment. A failure on either send fails the relay.
    pub async fn relay_order(&self, request: &SendMailRequest) -> Result<()> {
        let subject = request.form_label("letter_subject");
        let admin_email = request.admin_email.as_deref().unwrap_or_default();
        let submitter_email = request.email.as_deref().unwrap_or_default();

        self.send(admin_email, subject, &order_html(request)).await?;
        self.send(submitter_email, subject, &acknowledgment_html(request))
            .await?;

        tracing::info!(
            "✓ Order relayed for widget {:?} to {} and {}",
            request.widget_name.as_deref().unwrap_or(""),
            admin_email,
            submitter_email
        );

        Ok(())
    }
}
