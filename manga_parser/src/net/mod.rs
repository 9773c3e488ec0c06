//! Injectable HTTP plumbing shared by all parsers.

mod challenge;
mod cookie;
mod rate_limit;
mod transport;

pub use challenge::{is_challenge, ChallengeSolver, NoChallengeSolver};
pub use cookie::{CookieStore, MemoryCookieStore};
pub use rate_limit::RateLimitRetry;
pub use transport::{HttpTransport, Method, Request, Response, Transport, DEFAULT_USER_AGENT};
