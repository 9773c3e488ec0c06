#[macro_use]
extern crate log;

pub mod config;
pub mod logging;
pub mod related;
pub mod resolver;

pub use config::Config;
pub use related::{RelatedMangaFinder, SelectionPolicy, SmallestNonEmpty};
pub use resolver::{LinkResolver, UNKNOWN_TITLE};
