use std::sync::Arc;

use crate::parser::{Parser, ParserContext};

pub mod generic_query_parser;
pub mod madara;
pub mod manga_kakalot;
pub mod manhua_gui;
pub mod read_m;

/// Every source known at compile time. Sites sharing a layout are still
/// separate sources, so their ids never collide.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MangaSource {
    FirstKissManga,
    AquaManga,
    ZinManga,
    MangaTx,
    MangaKakalot,
    MangaNato,
    ReadM,
    ManhuaGui,
}

impl MangaSource {
    pub const ALL: [MangaSource; 8] = [
        MangaSource::FirstKissManga,
        MangaSource::AquaManga,
        MangaSource::ZinManga,
        MangaSource::MangaTx,
        MangaSource::MangaKakalot,
        MangaSource::MangaNato,
        MangaSource::ReadM,
        MangaSource::ManhuaGui,
    ];

    /// Namespace of the ids the source generates
    pub fn name(self) -> &'static str {
        match self {
            MangaSource::FirstKissManga => "1STKISSMANGA",
            MangaSource::AquaManga => "AQUAMANGA",
            MangaSource::ZinManga => "ZINMANGA",
            MangaSource::MangaTx => "MANGATX",
            MangaSource::MangaKakalot => "MANGAKAKALOT",
            MangaSource::MangaNato => "MANGANATO",
            MangaSource::ReadM => read_m::SOURCE,
            MangaSource::ManhuaGui => manhua_gui::SOURCE,
        }
    }

    pub fn from_name(name: &str) -> Option<MangaSource> {
        Self::ALL
            .into_iter()
            .find(|source| source.name().eq_ignore_ascii_case(name.trim()))
    }

    pub fn create(self, context: &ParserContext) -> Arc<dyn Parser> {
        let name = self.name();
        match self {
            MangaSource::FirstKissManga => Arc::new(madara::new(context, name, vec!["1stkissmanga.me"])),
            MangaSource::AquaManga => Arc::new(madara::new(context, name, vec!["aquamanga.com"])),
            MangaSource::ZinManga => Arc::new(madara::new(context, name, vec!["zinmanga.com"])),
            MangaSource::MangaTx => Arc::new(madara::new(context, name, vec!["mangatx.com"])),
            MangaSource::MangaKakalot => {
                Arc::new(manga_kakalot::new(context, name, vec!["mangakakalot.com"]))
            }
            // manga and chapter pages live on the second host
            MangaSource::MangaNato => Arc::new(manga_kakalot::new(
                context,
                name,
                vec!["manganato.com", "chapmanganato.to"],
            )),
            MangaSource::ReadM => Arc::new(read_m::new(context)),
            MangaSource::ManhuaGui => Arc::new(manhua_gui::new(context)),
        }
    }
}

pub fn plugins(context: &ParserContext) -> Vec<Arc<dyn Parser>> {
    MangaSource::ALL
        .into_iter()
        .map(|source| source.create(context))
        .collect()
}
