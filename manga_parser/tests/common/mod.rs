#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use manga_parser::{
    net::{Request, Response, Transport},
    parse_error::Result,
    Url,
};
use parking_lot::Mutex;
use reqwest::StatusCode;

pub fn init() {
    let _ = env_logger::builder()
        .write_style(env_logger::WriteStyle::Always)
        .filter(Some("manga_parser"), log::LevelFilter::Debug)
        .is_test(true)
        .try_init();
}

/// Serves canned bodies by url, 404 for anything else
#[derive(Default)]
pub struct StubTransport {
    pages: HashMap<String, (StatusCode, String)>,
    requests: Mutex<Vec<Request>>,
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, body: impl Into<String>) -> Self {
        self.pages.insert(url.to_owned(), (StatusCode::OK, body.into()));
        self
    }

    pub fn status(mut self, url: &str, status: StatusCode) -> Self {
        self.pages.insert(url.to_owned(), (status, String::new()));
        self
    }

    pub fn requested(&self) -> Vec<String> {
        self.requests
            .lock()
            .iter()
            .map(|request| request.url.to_string())
            .collect()
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn execute(&self, request: Request) -> Result<Response> {
        self.requests.lock().push(request.clone());
        let (status, body) = self
            .pages
            .get(request.url.as_str())
            .cloned()
            .unwrap_or((StatusCode::NOT_FOUND, String::new()));
        Ok(Response {
            url: request.url,
            status,
            body,
        })
    }
}

/// Answers with the given statuses in order, then 200
pub struct SequenceTransport {
    statuses: Mutex<VecDeque<StatusCode>>,
    pub calls: AtomicUsize,
}

impl SequenceTransport {
    pub fn new(statuses: impl IntoIterator<Item = StatusCode>) -> Self {
        Self {
            statuses: Mutex::new(statuses.into_iter().collect()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for SequenceTransport {
    async fn execute(&self, request: Request) -> Result<Response> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let status = self.statuses.lock().pop_front().unwrap_or(StatusCode::OK);
        Ok(Response {
            url: request.url,
            status,
            body: "ok".to_owned(),
        })
    }
}

pub fn url(url: &str) -> Url {
    Url::parse(url).unwrap()
}
