//! Fire-and-forget webhook delivery.
//!
//! `publish` only enqueues; a background task posts each envelope as JSON.
//! A slow or failing endpoint never holds up order processing: when the
//! queue is full the event is dropped with a warning.

use crate::domain::events::EventEnvelope;
use crate::domain::ports::EventSink;
use crate::utils::error::Result;
use crate::utils::validation::validate_url;
use reqwest::Client;
use std::time::Duration;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;

#[derive(Debug, Clone)]
pub struct WebhookSettings {
    pub url: String,
    pub timeout: Duration,
    pub queue_capacity: usize,
}

/// Delivery totals, returned when the worker shuts down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub delivered: usize,
    pub failed: usize,
}

#[derive(Debug, Clone)]
pub struct WebhookDispatcher {
    sender: mpsc::Sender<EventEnvelope>,
}

impl WebhookDispatcher {
    /// Starts the delivery task; must be called inside a Tokio runtime.
    /// The task ends once every dispatcher clone is dropped and the queue
    /// has drained.
    pub fn spawn(settings: WebhookSettings) -> Result<(Self, JoinHandle<DispatchReport>)> {
        validate_url("webhook.url", &settings.url)?;
        let client = Client::builder().timeout(settings.timeout).build()?;
        let (sender, receiver) = mpsc::channel(settings.queue_capacity.max(1));

        tracing::info!("🔗 Webhook dispatcher started for {}", settings.url);
        let handle = tokio::spawn(run_worker(client, settings.url, receiver));
        Ok((Self { sender }, handle))
    }
}

impl EventSink for WebhookDispatcher {
    fn publish(&self, envelope: EventEnvelope) {
        match self.sender.try_send(envelope) {
            Ok(()) => {}
            Err(TrySendError::Full(envelope)) => {
                tracing::warn!("Webhook queue full, dropping '{}' event", envelope.name());
            }
            Err(TrySendError::Closed(envelope)) => {
                tracing::warn!("Webhook worker stopped, dropping '{}' event", envelope.name());
            }
        }
    }
}

async fn deliver(client: &Client, url: &str, envelope: &EventEnvelope) -> Result<()> {
    client
        .post(url)
        .json(envelope)
        .send()
        .await?
        .error_for_status()?;
    Ok(())
}

async fn run_worker(
    client: Client,
    url: String,
    mut receiver: mpsc::Receiver<EventEnvelope>,
) -> DispatchReport {
    let mut report = DispatchReport::default();

    while let Some(envelope) = receiver.recv().await {
        match deliver(&client, &url, &envelope).await {
            Ok(()) => {
                tracing::debug!("Delivered '{}' event", envelope.name());
                report.delivered += 1;
            }
            Err(e) => {
                tracing::warn!("Webhook delivery of '{}' failed: {}", envelope.name(), e);
                report.failed += 1;
            }
        }
    }

    tracing::debug!(
        "Webhook dispatcher stopped ({} delivered, {} failed)",
        report.delivered,
        report.failed
    );
    report
}
