use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;

use super::{Request, Response, Transport};
use crate::parse_error::Result;

/// Retries a request exactly once, after `pause`, when it was answered with
/// HTTP 429. Everything else passes through untouched.
pub struct RateLimitRetry<T> {
    inner: T,
    pause: Duration,
}

impl<T> RateLimitRetry<T> {
    pub fn new(inner: T, pause: Duration) -> Self {
        Self { inner, pause }
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }
}

#[async_trait]
impl<T: Transport> Transport for RateLimitRetry<T> {
    async fn execute(&self, request: Request) -> Result<Response> {
        let response = self.inner.execute(request.clone()).await?;
        if response.status != StatusCode::TOO_MANY_REQUESTS {
            return Ok(response);
        }
        warn!("[{}] rate limited, retrying in {:?}", request.url, self.pause);
        tokio::time::sleep(self.pause).await;
        self.inner.execute(request).await
    }
}
