use async_trait::async_trait;
use reqwest::StatusCode;

use super::{Request, Response};
use crate::parse_error::{ParseError, Result};

const CHALLENGE_MARKERS: [&str; 4] = [
    "cf-browser-verification",
    "cf_chl_opt",
    "challenge-platform",
    "Just a moment...",
];

/// A 403/503 whose body carries an anti-bot interstitial.
pub fn is_challenge(response: &Response) -> bool {
    matches!(
        response.status,
        StatusCode::FORBIDDEN | StatusCode::SERVICE_UNAVAILABLE
    ) && CHALLENGE_MARKERS
        .iter()
        .any(|marker| response.body.contains(marker))
}

/// Gets past anti-bot interstitials, for example by driving a browser and
/// replaying the request with the cookies it obtained.
#[async_trait]
pub trait ChallengeSolver: Send + Sync {
    async fn solve(&self, request: &Request, response: Response) -> Result<Response>;
}

/// Reports every challenge as [`ParseError::CloudflareIUAM`].
#[derive(Debug, Default, Clone, Copy)]
pub struct NoChallengeSolver;

#[async_trait]
impl ChallengeSolver for NoChallengeSolver {
    async fn solve(&self, request: &Request, _response: Response) -> Result<Response> {
        debug!("[{}] no challenge solver configured", request.url);
        Err(ParseError::CloudflareIUAM)
    }
}
