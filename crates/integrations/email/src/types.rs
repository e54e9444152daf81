use serde::Serialize;

use crate::backend::EmailMessage;

/// Request body of `POST /v3/mail/send`.
#[derive(Debug, Clone, Serialize)]
pub struct SendGridMailRequest {
    pub personalizations: Vec<SendGridPersonalization>,
    pub from: SendGridAddress,
    pub subject: String,
    pub content: Vec<SendGridContent>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SendGridPersonalization {
    pub to: Vec<SendGridAddress>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SendGridAddress {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// One body part. `SendGrid` requires `text/plain` to come before `text/html`.
#[derive(Debug, Clone, Serialize)]
pub struct SendGridContent {
    #[serde(rename = "type")]
    pub content_type: String,
    pub value: String,
}

fn address(email: &str, name: Option<&str>) -> SendGridAddress {
    SendGridAddress {
        email: email.to_owned(),
        name: name.filter(|n| !n.is_empty()).map(str::to_owned),
    }
}

impl From<&EmailMessage> for SendGridMailRequest {
    fn from(msg: &EmailMessage) -> Self {
        let mut content = Vec::with_capacity(2);
        if let Some(text) = msg.body.as_deref().filter(|t| !t.is_empty()) {
            content.push(SendGridContent {
                content_type: "text/plain".to_owned(),
                value: text.to_owned(),
            });
        }
        if let Some(html) = msg.html_body.as_deref().filter(|h| !h.is_empty()) {
            content.push(SendGridContent {
                content_type: "text/html".to_owned(),
                value: html.to_owned(),
            });
        }

        Self {
            personalizations: vec![SendGridPersonalization {
                to: vec![address(&msg.to, msg.to_name.as_deref())],
            }],
            from: address(&msg.from, msg.from_name.as_deref()),
            subject: msg.subject.clone(),
            content,
        }
    }
}
