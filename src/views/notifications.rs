use super::forms;
use super::{OrFail, ViewError};
use crate::api::models::EmailRequest;
use crate::api::ApiClient;

pub fn send_email(
    client: &ApiClient,
    to: &str,
    subject: &str,
    body: &str,
) -> Result<String, ViewError> {
    let request = EmailRequest {
        to: forms::email(to)?,
        subject: forms::require("subject", subject)?,
        body: forms::require("body", body)?,
    };
    client
        .notifications()
        .send_email(&request)
        .or_fail("Failed to send email")?;
    Ok(format!("Email sent to {}", request.to))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::testing::FakeTransport;
    use crate::api::client::Body;
    use serde_json::json;

    #[test]
    fn test_send_email() {
        let t = FakeTransport::new();
        t.reply(200, "");
        let client = ApiClient::new("http://x/api", Box::new(t.clone()));
        send_email(&client, "a@example.com", "Interview", "See you at 10").unwrap();
        let sent = t.last();
        assert_eq!(sent.path, "/notifications/email");
        assert_eq!(
            sent.body,
            Body::Json(json!({"to": "a@example.com", "subject": "Interview", "body": "See you at 10"}))
        );
    }

    #[test]
    fn test_send_email_validates() {
        let t = FakeTransport::new();
        let client = ApiClient::new("http://x/api", Box::new(t.clone()));
        assert!(send_email(&client, "nope", "s", "b").is_err());
        assert!(send_email(&client, "a@example.com", " ", "b").is_err());
        assert!(t.sent.borrow().is_empty());
    }
}
