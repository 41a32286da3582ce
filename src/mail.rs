use async_trait::async_trait;
use eyre::{Result, bail};
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// An outgoing HTML email
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Email {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &Email) -> Result<()>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PostmarkResponse {
    #[serde(default)]
    error_code: i64,
    #[serde(default)]
    message: String,
    #[serde(rename = "MessageID", default)]
    message_id: Option<String>,
}

/// Sends mail through Postmark's single-email endpoint
#[derive(Debug, Clone)]
pub struct PostmarkMailer {
    client: reqwest::Client,
    api_url: String,
}

impl PostmarkMailer {
    pub fn new(client: reqwest::Client, api_url: impl Into<String>) -> Self {
        Self {
            client,
            api_url: api_url.into(),
        }
    }
}

#[async_trait]
impl Mailer for PostmarkMailer {
    async fn send(&self, email: &Email) -> Result<()> {
        let token = std::env::var("POSTMARK_API_KEY")
            .map_err(|_| eyre::eyre!("POSTMARK_API_KEY environment variable not set (required for email delivery)"))?;

        debug!("Sending {:?} to {}", email.subject, email.to);

        let resp = self
            .client
            .post(&self.api_url)
            .header("X-Postmark-Server-Token", token)
            .header("Accept", "application/json")
            .json(email)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        let parsed: Option<PostmarkResponse> = serde_json::from_str(&body).ok();

        match parsed {
            Some(r) if status.is_success() && r.error_code == 0 => {
                info!("Email sent to {} ({})", email.to, r.message_id.as_deref().unwrap_or("-"));
                Ok(())
            }
            Some(r) => bail!("Postmark rejected email ({}): {}", r.error_code, r.message),
            None => bail!("Postmark returned {status}: {body}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_wire_format() {
        let email = Email {
            from: "info@example.com".to_string(),
            to: "me@example.com".to_string(),
            subject: "Your video summary".to_string(),
            html_body: "<p>hi</p>".to_string(),
        };
        let json = serde_json::to_value(&email).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "From": "info@example.com",
                "To": "me@example.com",
                "Subject": "Your video summary",
                "HtmlBody": "<p>hi</p>"
            })
        );
    }

    #[test]
    fn test_parse_postmark_error() {
        let r: PostmarkResponse =
            serde_json::from_str(r#"{"ErrorCode":300,"Message":"Invalid 'To' address"}"#).unwrap();
        assert_eq!(r.error_code, 300);
        assert_eq!(r.message, "Invalid 'To' address");
        assert!(r.message_id.is_none());
    }

    #[test]
    fn test_parse_postmark_success() {
        let r: PostmarkResponse = serde_json::from_str(
            r#"{"To":"me@example.com","SubmittedAt":"2024-01-01T00:00:00Z","MessageID":"b7bc2f4a","ErrorCode":0,"Message":"OK"}"#,
        )
        .unwrap();
        assert_eq!(r.error_code, 0);
        assert_eq!(r.message_id.as_deref(), Some("b7bc2f4a"));
    }
}
