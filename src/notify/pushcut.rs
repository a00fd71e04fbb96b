// src/notify/pushcut.rs
use std::time::Duration;

use reqwest::Client;
use serde::Serialize;

use super::{AlertPayload, AlertSink};
use crate::error::DeliveryError;

const DEFAULT_TITLE: &str = "Fantasy";
const DEFAULT_TEXT: &str = "New league activity";

/// Pushcut webhook sink. One attempt per alert with a bounded timeout:
/// delivery errors are terminal and a delivered-but-unconfirmed alert is
/// preferred over re-notifying.
#[derive(Clone)]
pub struct PushcutNotifier {
    url: String,
    client: Client,
    timeout: Duration,
}

impl PushcutNotifier {
    pub fn new(url: String) -> Self {
        Self {
            url,
            client: Client::new(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }
}

#[derive(Serialize)]
struct PushcutRequest<'a> {
    title: &'a str,
    text: &'a str,
    /// Pushcut forwards `input` as a JSON object to the shortcut.
    input: &'a AlertPayload,
}

#[async_trait::async_trait]
impl AlertSink for PushcutNotifier {
    async fn deliver(&self, payload: &AlertPayload) -> Result<(), DeliveryError> {
        let body = PushcutRequest {
            title: DEFAULT_TITLE,
            text: DEFAULT_TEXT,
            input: payload,
        };
        let resp = self
            .client
            .post(&self.url)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(DeliveryError::Http {
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}
