use std::collections::{BTreeMap, HashMap};

use itertools::Itertools;
use parking_lot::RwLock;

/// Cookie jar keyed by registrable domain (see [`crate::util::get_hostname`]).
pub trait CookieStore: Send + Sync {
    /// Value for a `Cookie` request header
    fn cookie_header(&self, domain: &str) -> Option<String>;
    /// Record one `Set-Cookie` header value
    fn store(&self, domain: &str, set_cookie: &str);
    fn clear(&self, domain: &str);
}

#[derive(Debug, Default)]
pub struct MemoryCookieStore {
    jar: RwLock<HashMap<String, BTreeMap<String, String>>>,
}

impl CookieStore for MemoryCookieStore {
    fn cookie_header(&self, domain: &str) -> Option<String> {
        let jar = self.jar.read();
        let cookies = jar.get(domain).filter(|cookies| !cookies.is_empty())?;
        Some(
            cookies
                .iter()
                .map(|(name, value)| format!("{}={}", name, value))
                .join("; "),
        )
    }

    fn store(&self, domain: &str, set_cookie: &str) {
        let Some((name, value)) = set_cookie
            .split(';')
            .next()
            .and_then(|pair| pair.split_once('='))
        else {
            return;
        };
        let name = name.trim();
        if name.is_empty() {
            return;
        }
        self.jar
            .write()
            .entry(domain.to_owned())
            .or_default()
            .insert(name.to_owned(), value.trim().to_owned());
    }

    fn clear(&self, domain: &str) {
        self.jar.write().remove(domain);
    }
}
