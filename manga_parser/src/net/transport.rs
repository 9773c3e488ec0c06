use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    header::{ACCEPT, COOKIE, REFERER, SET_COOKIE, USER_AGENT},
    Client, StatusCode, Url,
};

use super::{is_challenge, ChallengeSolver, CookieStore, MemoryCookieStore, NoChallengeSolver};
use crate::{
    parse_error::{ParseError, Result},
    util,
};

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:128.0) Gecko/20100101 Firefox/128.0";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

#[derive(Clone, Debug)]
pub struct Request {
    pub method: Method,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub form: Option<Vec<(String, String)>>,
}

impl Request {
    pub fn get(url: Url) -> Self {
        Self {
            method: Method::Get,
            url,
            headers: vec![],
            form: None,
        }
    }

    pub fn post_form<K, V>(url: Url, form: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            method: Method::Post,
            url,
            headers: vec![],
            form: Some(form.into_iter().map(|(k, v)| (k.into(), v.into())).collect()),
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

#[derive(Clone, Debug)]
pub struct Response {
    /// Location after redirects
    pub url: Url,
    pub status: StatusCode,
    pub body: String,
}

impl Response {
    /// 403 becomes [`ParseError::CloudflareIUAM`], 429 [`ParseError::RateLimited`]
    /// and any other non-success status [`ParseError::NetworkError`].
    pub fn error_for_status(self) -> Result<Self> {
        match self.status {
            StatusCode::FORBIDDEN => Err(ParseError::CloudflareIUAM),
            StatusCode::TOO_MANY_REQUESTS => Err(ParseError::RateLimited(
                self.url.host_str().unwrap_or_default().to_owned(),
            )),
            status if !status.is_success() => Err(ParseError::NetworkError(status)),
            _ => Ok(self),
        }
    }
}

/// Executes requests. Any HTTP status is a successful execution; callers
/// decide with [`Response::error_for_status`].
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: Request) -> Result<Response>;
}

/// [`Transport`] backed by `reqwest`.
pub struct HttpTransport {
    client: Client,
    cookies: Arc<dyn CookieStore>,
    challenge: Arc<dyn ChallengeSolver>,
    user_agent: String,
    timeout: Duration,
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            cookies: Arc::new(MemoryCookieStore::default()),
            challenge: Arc::new(NoChallengeSolver),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_user_agent(self, user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
            ..self
        }
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self { timeout, ..self }
    }

    pub fn with_cookie_store(self, cookies: Arc<dyn CookieStore>) -> Self {
        Self { cookies, ..self }
    }

    pub fn with_challenge_solver(self, challenge: Arc<dyn ChallengeSolver>) -> Self {
        Self { challenge, ..self }
    }

    pub fn cookies(&self) -> &Arc<dyn CookieStore> {
        &self.cookies
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: Request) -> Result<Response> {
        let mut builder = match request.method {
            Method::Get => self.client.get(request.url.clone()),
            Method::Post => self.client.post(request.url.clone()),
        };
        if let Some(form) = &request.form {
            builder = builder.form(form);
        }
        builder = builder
            .header(USER_AGENT, self.user_agent.as_str())
            .header(ACCEPT, "*/*")
            .header(REFERER, request.url.as_str())
            .timeout(self.timeout);
        if let Some(cookie) = util::get_hostname(&request.url)
            .ok()
            .and_then(|domain| self.cookies.cookie_header(&domain))
        {
            builder = builder.header(COOKIE, cookie);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        trace!("{:?} {}", request.method, request.url);
        let response = builder.send().await?;

        let url = response.url().clone();
        let status = response.status();
        if let Ok(domain) = util::get_hostname(&url) {
            for set_cookie in response.headers().get_all(SET_COOKIE) {
                if let Ok(set_cookie) = set_cookie.to_str() {
                    self.cookies.store(&domain, set_cookie);
                }
            }
        }
        let body = response.text().await?;
        let response = Response { url, status, body };

        if is_challenge(&response) {
            warn!("[{}] browser challenge, status {}", response.url, response.status);
            return self.challenge.solve(&request, response).await;
        }
        Ok(response)
    }
}
