use std::env;
use std::sync::Arc;
use std::time::Duration;

use manga_parser::{
    net::{HttpTransport, RateLimitRetry, DEFAULT_USER_AGENT},
    parser::{MangaParser, ParserContext},
    plugin::MangaSource,
};

use crate::related::RelatedMangaFinder;

/// Runtime settings, read from the environment and `.env`.
#[derive(Clone, Debug)]
pub struct Config {
    pub user_agent: String,
    pub request_timeout: Duration,
    /// Pause before the single retry of a rate limited request
    pub rate_limit_pause: Duration,
    /// How many searchable sources the related manga finder asks
    pub related_sources_max: usize,
    /// Path of the log4rs yaml file
    pub log_config: String,
    pub sources: Vec<MangaSource>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            request_timeout: Duration::from_millis(10000),
            rate_limit_pause: Duration::from_millis(5000),
            related_sources_max: 4,
            log_config: "log4rs.yml".to_owned(),
            sources: MangaSource::ALL.to_vec(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Values that are missing or do not parse keep their default.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let millis = |key: &str, default: Duration| {
            var(key)
                .and_then(|value| value.trim().parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(default)
        };

        let sources: Vec<MangaSource> = var("MANGA_SOURCES")
            .map(|names| {
                names
                    .split(',')
                    .filter(|name| !name.trim().is_empty())
                    .filter_map(|name| {
                        let source = MangaSource::from_name(name);
                        if source.is_none() {
                            warn!("Unknown source '{}' in MANGA_SOURCES", name.trim());
                        }
                        source
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            user_agent: var("MANGA_USER_AGENT")
                .filter(|agent| !agent.trim().is_empty())
                .unwrap_or(defaults.user_agent),
            request_timeout: millis("MANGA_REQUEST_TIMEOUT_MS", defaults.request_timeout),
            rate_limit_pause: millis("MANGA_RATE_LIMIT_PAUSE_MS", defaults.rate_limit_pause),
            related_sources_max: var("MANGA_RELATED_SOURCES_MAX")
                .and_then(|max| max.trim().parse().ok())
                .unwrap_or(defaults.related_sources_max),
            log_config: var("LOG_CONFIG").unwrap_or(defaults.log_config),
            sources: if sources.is_empty() {
                defaults.sources
            } else {
                sources
            },
        }
    }

    /// reqwest transport retrying once on HTTP 429
    pub fn parser_context(&self) -> ParserContext {
        let http = HttpTransport::new()
            .with_user_agent(self.user_agent.clone())
            .with_timeout(self.request_timeout);
        ParserContext::new(Arc::new(RateLimitRetry::new(http, self.rate_limit_pause)))
    }

    pub fn manga_parser(&self) -> MangaParser {
        let context = self.parser_context();
        MangaParser::from_parsers(
            self.sources
                .iter()
                .map(|source| source.create(&context))
                .collect(),
        )
    }

    pub fn related_finder(&self, parser: &MangaParser) -> RelatedMangaFinder {
        RelatedMangaFinder::new(
            parser
                .parsers
                .iter()
                .filter(|parser| parser.can_search())
                .take(self.related_sources_max)
                .cloned()
                .collect(),
        )
    }
}
