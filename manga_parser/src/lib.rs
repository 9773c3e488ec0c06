pub mod chapter_list;
pub mod codec;
pub mod id;
pub mod model;
pub mod net;
pub mod paginator;
pub mod parse_error;
pub mod parser;
pub mod plugin;
pub mod tag_cache;
pub use reqwest::Url;
pub mod util;

#[macro_use]
extern crate log;
#[macro_use]
extern crate lazy_static;
