//! Email sender doubles for handler tests.

use crate::email::{EmailMessage, EmailSender};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Default)]
pub(crate) struct RecordingEmailSender {
    sent: Mutex<Vec<EmailMessage>>,
}

impl RecordingEmailSender {
    pub(crate) fn messages(&self) -> Vec<EmailMessage> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl EmailSender for RecordingEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        self.sent
            .lock()
            .map_err(|_| anyhow!("recorder poisoned"))?
            .push(message.clone());
        Ok(())
    }
}

#[derive(Debug)]
pub(crate) struct FailingEmailSender;

#[async_trait]
impl EmailSender for FailingEmailSender {
    async fn send(&self, _message: &EmailMessage) -> Result<()> {
        Err(anyhow!("mail API unavailable"))
    }
}

#[derive(Debug)]
pub(crate) struct StalledEmailSender;

#[async_trait]
impl EmailSender for StalledEmailSender {
    async fn send(&self, _message: &EmailMessage) -> Result<()> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(())
    }
}
