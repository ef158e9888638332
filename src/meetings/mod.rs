//! Meeting-provider port: turns a confirmed booking into a join link.
//!
//! Invoked strictly after commit and outside any lock or transaction. The
//! HTTP adapter bounds every attempt with a timeout and retries with
//! exponential backoff; exhausting the retries degrades the booking to
//! "no link yet" instead of failing it.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::MeetingProviderConfig;
use crate::db::Booking;

#[derive(Debug, Error)]
pub enum MeetingError {
    #[error("Meeting provider is not configured")]
    Disabled,

    #[error("Meeting provider request failed: {0}")]
    Request(String),

    #[error("Meeting provider returned status {0}")]
    Status(u16),
}

#[derive(Debug, Clone)]
pub struct MeetingDetails {
    pub join_link: String,
}

#[async_trait]
pub trait MeetingProvider: Send + Sync {
    async fn create_meeting(&self, booking: &Booking) -> Result<MeetingDetails, MeetingError>;
}

#[derive(Debug, Deserialize)]
struct CreateMeetingResponse {
    join_link: String,
}

pub struct HttpMeetingProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    retry_count: u32,
    timeout: Duration,
}

impl HttpMeetingProvider {
    pub fn new(config: &MeetingProviderConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            retry_count: config.retry_count,
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

#[async_trait]
impl MeetingProvider for HttpMeetingProvider {
    async fn create_meeting(&self, booking: &Booking) -> Result<MeetingDetails, MeetingError> {
        let url = format!("{}/meetings", self.base_url.trim_end_matches('/'));
        let payload = json!({
            "booking_id": booking.id,
            "guest_name": booking.guest_name,
            "guest_email": booking.guest_email,
            "start_time": booking.start_time,
            "end_time": booking.end_time,
        });

        let mut last_error = MeetingError::Request("No attempt was made".to_string());
        for attempt in 0..=self.retry_count {
            let mut request = self
                .client
                .post(&url)
                .json(&payload)
                .timeout(self.timeout);
            if let Some(key) = &self.api_key {
                request = request.bearer_auth(key);
            }

            match request.send().await {
                Ok(response) if response.status().is_success() => {
                    let parsed: CreateMeetingResponse = response
                        .json()
                        .await
                        .map_err(|e| MeetingError::Request(e.to_string()))?;
                    debug!(booking_id = %booking.id, "Meeting created");
                    return Ok(MeetingDetails {
                        join_link: parsed.join_link,
                    });
                }
                Ok(response) => {
                    last_error = MeetingError::Status(response.status().as_u16());
                    warn!(
                        booking_id = %booking.id,
                        attempt = attempt + 1,
                        status = response.status().as_u16(),
                        "Meeting provider rejected the request"
                    );
                }
                Err(e) => {
                    last_error = MeetingError::Request(e.to_string());
                    warn!(
                        booking_id = %booking.id,
                        attempt = attempt + 1,
                        error = %e,
                        "Meeting provider request error"
                    );
                }
            }

            // Exponential backoff before the next attempt.
            if attempt < self.retry_count {
                let delay = Duration::from_millis(100 * 2u64.pow(attempt));
                tokio::time::sleep(delay).await;
            }
        }

        Err(last_error)
    }
}

/// Stand-in when no provider is configured; every booking simply stays
/// without a link.
pub struct NullMeetingProvider;

#[async_trait]
impl MeetingProvider for NullMeetingProvider {
    async fn create_meeting(&self, _booking: &Booking) -> Result<MeetingDetails, MeetingError> {
        Err(MeetingError::Disabled)
    }
}
