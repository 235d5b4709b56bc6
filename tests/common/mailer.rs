//! Mailers that record or refuse messages instead of talking to SMTP
#![allow(dead_code)]

use async_trait::async_trait;
use campus_shield::email::{EmailError, EmailResult, Mailer};
use std::sync::Mutex;

#[derive(Debug, Clone)]
pub struct SentEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Records every message. With `fail` set, records nothing and reports a send error.
#[derive(Default)]
pub struct RecordingMailer {
    pub fail: bool,
    sent: Mutex<Vec<SentEmail>>,
}

impl RecordingMailer {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn sent(&self) -> Vec<SentEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send_email(&self, to: &str, subject: &str, body_text: &str) -> EmailResult<()> {
        if self.fail {
            return Err(EmailError::ConfigError(
                "connection refused by test relay".to_owned(),
            ));
        }
        self.sent.lock().unwrap().push(SentEmail {
            to: to.to_owned(),
            subject: subject.to_owned(),
            body: body_text.to_owned(),
        });
        Ok(())
    }

    fn describe(&self) -> String {
        "test relay".to_owned()
    }
}
