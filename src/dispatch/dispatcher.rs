//! Dispatch router: picks a channel, times the call, records history.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::ClientConfig;
use crate::dispatch::channel::{Channel, DirectChannel, ProxyChannel};
use crate::dispatch::envelope::{Outcome, ResponseEnvelope};
use crate::dispatch::target::{classify, Target};
use crate::history::{HistoryEntry, HistoryRecorder};
use crate::request::RequestDescriptor;
use crate::transport::{HttpTransport, TransportError};

/// Routes descriptors to the direct or proxied channel.
pub struct Dispatcher<D = DirectChannel, P = ProxyChannel> {
    base_url: String,
    direct: D,
    proxy: P,
    recorder: Arc<dyn HistoryRecorder>,
}

impl Dispatcher {
    /// Standard wiring: direct reqwest transport plus the proxy at `base_url`,
    /// both bounded by the client timeout.
    pub fn from_config(
        config: &ClientConfig,
        recorder: Arc<dyn HistoryRecorder>,
    ) -> Result<Self, TransportError> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let direct = DirectChannel::new(HttpTransport::new(timeout, config.max_redirects)?);
        let proxy = ProxyChannel::new(&config.base_url, timeout)?;
        Ok(Self::new(config.base_url.clone(), direct, proxy, recorder))
    }
}

impl<D: Channel, P: Channel> Dispatcher<D, P> {
    pub fn new(
        base_url: impl Into<String>,
        direct: D,
        proxy: P,
        recorder: Arc<dyn HistoryRecorder>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            direct,
            proxy,
            recorder,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn target(&self, descriptor: &RequestDescriptor) -> Target {
        classify(&descriptor.url, &self.base_url)
    }

    /// Send one request and return its envelope.
    ///
    /// Never fails: validation and network problems come back as
    /// `Outcome::Error`. Exactly one history entry is recorded per call.
    pub async fn dispatch(&self, descriptor: &RequestDescriptor) -> Outcome {
        let start = Instant::now();
        let target = self.target(descriptor);

        let outcome = match url::Url::parse(&descriptor.url) {
            Err(e) => {
                tracing::warn!(url = %descriptor.url, error = %e, "Rejected malformed URL");
                Outcome::Error(ResponseEnvelope::bad_request(
                    &descriptor.url,
                    e.to_string(),
                    start.elapsed(),
                ))
            }
            Ok(_) => {
                tracing::debug!(
                    method = %descriptor.method,
                    url = %descriptor.url,
                    target = ?target,
                    "Dispatching request"
                );
                let result = match target {
                    Target::Internal => self.direct.send(descriptor).await,
                    Target::External => self.proxy.send(descriptor).await,
                };
                let elapsed = start.elapsed();
                match result {
                    Ok(exchange) => Outcome::Response(ResponseEnvelope::from_exchange(exchange, elapsed)),
                    Err(failure) => {
                        tracing::warn!(url = %descriptor.url, error = %failure.message, "Dispatch failed");
                        Outcome::Error(ResponseEnvelope::from_failure(failure, elapsed))
                    }
                }
            }
        };

        self.recorder
            .record(HistoryEntry::new(descriptor, outcome.envelope()));
        outcome
    }
}
