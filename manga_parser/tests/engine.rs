extern crate manga_parser;

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{init, url, SequenceTransport, StubTransport};
use manga_parser::{
    id,
    model::*,
    net::{Request, RateLimitRetry, Transport},
    parse_error::ParseError,
    parser::{MangaParser, Parser, ParserContext},
    plugin::{generic_query_parser::GenericQueryParser, manhua_gui, MangaSource},
};
use reqwest::StatusCode;

const LIST_PAGE_1: &str = r#"
<ul>
  <li class="item"><a href="/manga/alpha/"><img data-src="/covers/alpha.jpg"></a><h3>Alpha</h3></li>
  <li class="item"><a href="/manga/beta/"><img src="/covers/beta.jpg"></a><h3>Beta</h3></li>
  <li class="item"><a href="https://manga.test/manga/gamma/"><img></a><h3> Gamma </h3></li>
</ul>"#;

const LIST_PAGE_2: &str = r#"
<ul>
  <li class="item"><a href="/manga/delta/"></a><h3>Delta</h3></li>
</ul>"#;

const DETAILS: &str = r#"
<html><body>
  <h1>Alpha Story</h1>
  <div class="summary">A tale of two letters.</div>
  <span class="status">Ongoing</span>
  <div class="authors"><a>Jane Roe</a> <a>John Doe</a></div>
  <div class="genres"><a href="/genre/action/">Action</a><a href="/genre/slice-of-life/">Slice of Life</a></div>
  <ul class="chapters">
    <li><a href="/manga/alpha/3/">Alpha Story - Chapter 3</a><span class="date">2023-06-01</span></li>
    <li><a href="/manga/alpha/3/">Alpha Story - Chapter 3</a><span class="date">2023-05-01</span></li>
    <li><a href="/manga/alpha/2-5/">Alpha Story Chapter 2.5</a><span class="date">2023/05/01</span></li>
    <li><a href="/manga/alpha/prologue/">Prologue</a></li>
  </ul>
</body></html>"#;

const GENRES: &str = r#"
<ul class="genres">
  <li><a href="/genre/action/">Action</a></li>
  <li><a href="/genre/comedy/">Comedy</a></li>
  <li><a href="/genre/empty/"> </a></li>
</ul>"#;

fn test_query() -> GenericQuery {
    GenericQuery {
        source: "TESTSRC",
        hostnames: vec!["manga.test"],
        list: GenericQueryList {
            paths: vec![
                (SortOrder::Updated, "/list/[page]"),
                (SortOrder::Popularity, "/popular/[page]"),
            ],
            item: GenericQueryItem {
                base: "li.item",
                title: Some("h3"),
                ..Default::default()
            },
            page_size: 2,
            ..Default::default()
        },
        manga: GenericQueryManga {
            description: Some("div.summary"),
            state: Some("span.status"),
            authors: Some("div.authors a"),
            genres: Some("div.genres a"),
            chapter: GenericQueryMangaChapter {
                base: "ul.chapters li",
                href: Some("a"),
                posted: Some("span.date"),
                ..Default::default()
            },
            ..Default::default()
        },
        search: Some(GenericQuerySearch {
            path: "/search?q=[query]&page=[page]",
            ..Default::default()
        }),
        tags: Some(GenericQueryTags {
            path: "/genres/",
            base: "ul.genres a",
        }),
        date_formats: vec!["%Y-%m-%d"],
        ..Default::default()
    }
}

fn test_parser(transport: &Arc<StubTransport>) -> GenericQueryParser {
    GenericQueryParser::new(test_query(), &ParserContext::new(transport.clone()))
}

fn seed() -> Manga {
    Manga {
        id: id::generate_uid("TESTSRC", "/manga/alpha/"),
        source: "TESTSRC".to_owned(),
        url: "/manga/alpha/".to_owned(),
        public_url: "https://manga.test/manga/alpha/".to_owned(),
        title: "Alpha".to_owned(),
        ..Default::default()
    }
}

#[tokio::test]
async fn list_follows_short_and_long_pages() {
    init();
    let transport = Arc::new(
        StubTransport::new()
            .page("https://manga.test/list/1", LIST_PAGE_1)
            .page("https://manga.test/list/2", LIST_PAGE_2),
    );
    let parser = test_parser(&transport);

    let first = parser
        .list_page(0, SortOrder::Updated, &MangaListFilter::default())
        .await
        .unwrap();
    assert_eq!(first.len(), 3);
    assert_eq!(first[0].id, 4816080476294916014);
    assert_eq!(first[0].url, "/manga/alpha/");
    assert_eq!(first[0].public_url, "https://manga.test/manga/alpha/");
    assert_eq!(first[0].source, "TESTSRC");
    assert_eq!(
        first[0].cover_url.as_deref(),
        Some("https://manga.test/covers/alpha.jpg")
    );
    assert_eq!(first[2].title, "Gamma");
    assert_eq!(first[2].cover_url, None);

    // page size is 2 but the first page held 3 items
    let second = parser
        .list_page(3, SortOrder::Updated, &MangaListFilter::default())
        .await
        .unwrap();
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].title, "Delta");
    assert_eq!(
        transport.requested(),
        vec!["https://manga.test/list/1", "https://manga.test/list/2"]
    );
}

#[tokio::test]
async fn list_uses_path_of_order() {
    let transport = Arc::new(StubTransport::new().page("https://manga.test/popular/1", LIST_PAGE_2));
    let parser = test_parser(&transport);

    assert_eq!(parser.default_sort_order(), SortOrder::Updated);
    assert_eq!(
        parser.sort_orders(),
        vec![SortOrder::Updated, SortOrder::Popularity, SortOrder::Relevance]
    );
    let list = parser
        .list_page(0, SortOrder::Popularity, &MangaListFilter::default())
        .await
        .unwrap();
    assert_eq!(list.len(), 1);
}

#[tokio::test]
async fn details_with_chapters() {
    init();
    let transport = Arc::new(StubTransport::new().page("https://manga.test/manga/alpha/", DETAILS));
    let parser = test_parser(&transport);

    let manga = parser.details(&seed()).await.unwrap();
    assert_eq!(manga.id, seed().id);
    assert_eq!(manga.title, "Alpha Story");
    assert_eq!(manga.description.as_deref(), Some("A tale of two letters."));
    assert_eq!(manga.state, MangaState::Ongoing);
    assert_eq!(
        manga.authors.iter().map(String::as_str).collect::<Vec<_>>(),
        vec!["Jane Roe", "John Doe"]
    );
    assert!(manga.tags.contains(&MangaTag::new("action", "Action", "TESTSRC")));
    assert!(manga.tags.contains(&MangaTag::new("slice-of-life", "Slice of Life", "TESTSRC")));

    let chapters = manga.chapters.unwrap();
    assert_eq!(
        chapters.iter().map(|chapter| chapter.name.as_str()).collect::<Vec<_>>(),
        vec!["Prologue", "Chapter 2.5", "Chapter 3"]
    );
    assert_eq!(
        chapters.iter().map(|chapter| chapter.number).collect::<Vec<_>>(),
        vec![1.0, 2.5, 3.0]
    );
    // the copy of chapter 3 pinned on top of the list is the newer one and is dropped
    assert_eq!(
        chapters.iter().map(|chapter| chapter.upload_date).collect::<Vec<_>>(),
        vec![0, 1682899200000, 1682899200000]
    );
    assert_eq!(chapters[2].url, "/manga/alpha/3/");
    assert_eq!(chapters[2].id, id::generate_uid("TESTSRC", "/manga/alpha/3/"));
    assert!(chapters.iter().all(|chapter| chapter.source == "TESTSRC"));
}

#[tokio::test]
async fn list_filters_by_state() {
    let transport = Arc::new(
        StubTransport::new()
            .page("https://manga.test/list/done/1", LIST_PAGE_2)
            .page("https://manga.test/list/all/1", LIST_PAGE_1),
    );
    let mut query = test_query();
    query.list.paths = vec![(SortOrder::Updated, "/list/[state]/[page]")];
    query.list.states = vec![(MangaState::Finished, "done")];
    query.list.any_state = "all";
    let parser = GenericQueryParser::new(query, &ParserContext::new(transport.clone()));

    let filter = |states: &[MangaState]| MangaListFilter {
        states: states.iter().copied().collect(),
        ..Default::default()
    };
    let finished = parser
        .list_page(0, SortOrder::Updated, &filter(&[MangaState::Finished]))
        .await
        .unwrap();
    assert_eq!(finished.len(), 1);
    let paused = parser
        .list_page(0, SortOrder::Updated, &filter(&[MangaState::Paused]))
        .await
        .unwrap();
    assert_eq!(paused.len(), 3);
    parser
        .list_page(0, SortOrder::Updated, &filter(&[]))
        .await
        .unwrap();
    assert_eq!(
        transport.requested(),
        vec![
            "https://manga.test/list/done/1",
            "https://manga.test/list/all/1",
            "https://manga.test/list/all/1",
        ]
    );
}

#[tokio::test]
async fn adult_badge_sets_content_rating() {
    let transport = Arc::new(
        StubTransport::new()
            .page(
                "https://manga.test/manga/alpha/",
                r#"<h1>Alpha</h1><span class="badge adult">18+</span>"#,
            )
            .page("https://manga.test/manga/beta/", "<h1>Beta</h1>"),
    );
    let mut query = test_query();
    query.manga.adult = Some("span.adult");
    let parser = GenericQueryParser::new(query, &ParserContext::new(transport.clone()));

    let alpha = parser.details(&seed()).await.unwrap();
    assert_eq!(alpha.content_rating, ContentRating::Adult);

    let beta = Manga {
        url: "/manga/beta/".to_owned(),
        public_url: "https://manga.test/manga/beta/".to_owned(),
        ..seed()
    };
    let beta = parser.details(&beta).await.unwrap();
    assert_eq!(beta.content_rating, ContentRating::Unknown);
}

#[tokio::test]
async fn sectioned_chapters_are_sorted_by_number() {
    let transport = Arc::new(StubTransport::new().page(
        "https://manga.test/manga/alpha/",
        r#"<h1>Alpha</h1>
        <ul class="chapters">
          <li><a href="/manga/alpha/2/">Chapter 2</a></li>
          <li><a href="/manga/alpha/1/">Chapter 1</a></li>
        </ul>
        <ul class="chapters">
          <li><a href="/manga/alpha/1-5/">Extra 1.5</a></li>
        </ul>"#,
    ));
    let mut query = test_query();
    query.manga.chapter.sort_by_number = true;
    let parser = GenericQueryParser::new(query, &ParserContext::new(transport.clone()));

    let chapters = parser.details(&seed()).await.unwrap().chapters.unwrap();
    assert_eq!(
        chapters.iter().map(|chapter| chapter.number).collect::<Vec<_>>(),
        vec![1.0, 1.5, 2.0]
    );
}

#[tokio::test]
async fn details_of_missing_page() {
    let transport = Arc::new(StubTransport::new());
    let parser = test_parser(&transport);
    assert!(matches!(
        parser.details(&seed()).await,
        Err(ParseError::NetworkError(StatusCode::NOT_FOUND))
    ));
}

#[tokio::test]
async fn tags_are_loaded_once() {
    init();
    let transport = Arc::new(StubTransport::new().page("https://manga.test/genres/", GENRES));
    let parser = test_parser(&transport);

    let (first, second) = tokio::join!(parser.tags(), parser.tags());
    let (first, second) = (first.unwrap(), second.unwrap());
    assert_eq!(first.len(), 2);
    assert!(first.contains(&MangaTag::new("comedy", "Comedy", "TESTSRC")));
    assert_eq!(first, second);

    parser.tags().await.unwrap();
    assert_eq!(transport.requested(), vec!["https://manga.test/genres/"]);
}

#[tokio::test]
async fn plain_image_pages() {
    let transport = Arc::new(StubTransport::new().page(
        "https://manga.test/manga/alpha/3/",
        r#"<div><img src="/p/1.png"><img data-src=" https://cdn.test/2.png "></div>"#,
    ));
    let parser = test_parser(&transport);
    let chapter = MangaChapter {
        url: "/manga/alpha/3/".to_owned(),
        source: "TESTSRC".to_owned(),
        ..Default::default()
    };

    let pages = parser.pages(&chapter).await.unwrap();
    assert_eq!(
        pages.iter().map(|page| page.url.as_str()).collect::<Vec<_>>(),
        vec!["https://manga.test/p/1.png", "https://cdn.test/2.png"]
    );
    assert!(pages.iter().all(|page| page.source == "TESTSRC"));
}

#[test]
fn no_images_is_an_error() {
    let transport = Arc::new(StubTransport::new());
    let parser = test_parser(&transport);
    assert!(matches!(
        parser.parse_pages("<p>nothing here</p>", &url("https://manga.test/manga/alpha/3/")),
        Err(ParseError::MissingImages)
    ));
}

#[tokio::test]
async fn packed_pages() {
    init();
    let html = format!(
        "<html><head><script>var x = 1;</script></head><body><img id=\"mangaFile\"><script type=\"text/javascript\">{}</script></body></html>",
        include_str!("fixtures/packed_script.js")
    );
    let transport = Arc::new(StubTransport::new().page("https://www.manhuagui.com/comic/17023/905113.html", html));
    let parser = manhua_gui::new(&ParserContext::new(transport.clone()));
    let chapter = MangaChapter {
        url: "/comic/17023/905113.html".to_owned(),
        source: manhua_gui::SOURCE.to_owned(),
        ..Default::default()
    };

    let pages = parser.pages(&chapter).await.unwrap();
    assert_eq!(pages.len(), 70);
    assert_eq!(
        pages[0].url,
        "https://i.hamreus.com/ps3/g/gdss/Vol_01/p001_63z.jpg.webp?e=1718245678&m=aGlkZGVu"
    );
    assert_eq!(
        pages[69].url,
        "https://i.hamreus.com/ps3/g/gdss/Vol_01/p070_bvq2.jpg.webp?e=1718245678&m=aGlkZGVu"
    );
}

#[tokio::test]
async fn broken_packed_script_names_chapter() {
    let html = "<script>eval(function(p,a,c,k,e,d){return p}('0',1,1,'x'.split('|'),0,{}))</script>";
    let transport = Arc::new(StubTransport::new().page("https://www.manhuagui.com/comic/1/2.html", html));
    let parser = manhua_gui::new(&ParserContext::new(transport.clone()));
    let chapter = MangaChapter {
        url: "/comic/1/2.html".to_owned(),
        ..Default::default()
    };

    match parser.pages(&chapter).await {
        Err(ParseError::Decode { origin, .. }) => assert!(origin.ends_with("/comic/1/2.html")),
        other => panic!("expected decode error, got {:?}", other.map(|pages| pages.len())),
    }
}

const PROTECTED_CHAPTER: &str = r#"
<div class="reading-content">
<script id="chapter-protector-data" type="text/javascript">
var wpmangaprotectornonce='f3a9c0d1e2';
var chapter_data='{"ct":"63OYC7Qewnip\/mF2nm\/Zbj6xs5hnFtK8q0Hy3hZpa56kbgTwJsnGHA3A0ZesnkwZvQP2kn+HPYURhF+QqnVJy1ZiaQSVpaDZPGC+R3E\/U8Olxgl0Jzeys6c4glkuCrLzuQ758aaG\/VmcubsjhmszRa6hN1Dx1194nQl\/Z\/6231M=","iv":"ebf1d3031af2504c47b6d20c200b9071","s":"9e3779b97f4a7c15"}';
</script>
</div>"#;

#[tokio::test]
async fn encrypted_pages() {
    init();
    let transport = Arc::new(StubTransport::new().page(
        "https://1stkissmanga.me/manga/alpha/chapter-1/",
        PROTECTED_CHAPTER,
    ));
    let parser = MangaSource::FirstKissManga.create(&ParserContext::new(transport.clone()));
    let chapter = MangaChapter {
        url: "/manga/alpha/chapter-1/".to_owned(),
        source: parser.source().to_owned(),
        ..Default::default()
    };

    let pages = parser.pages(&chapter).await.unwrap();
    assert_eq!(
        pages.iter().map(|page| page.url.as_str()).collect::<Vec<_>>(),
        vec![
            "https://cdn.example.net/wp-manga/data/abc/01.jpg",
            "https://cdn.example.net/wp-manga/data/abc/02.jpg",
        ]
    );
}

#[tokio::test]
async fn unprotected_madara_pages() {
    let transport = Arc::new(StubTransport::new().page(
        "https://1stkissmanga.me/manga/alpha/chapter-2/",
        r#"<div class="page-break"><img class="wp-manga-chapter-img" data-src=" https://cdn.test/a/1.jpg "></div>"#,
    ));
    let parser = MangaSource::FirstKissManga.create(&ParserContext::new(transport.clone()));
    let chapter = MangaChapter {
        url: "/manga/alpha/chapter-2/".to_owned(),
        ..Default::default()
    };

    let pages = parser.pages(&chapter).await.unwrap();
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].url, "https://cdn.test/a/1.jpg");
}

#[tokio::test]
async fn madara_chapters_come_from_ajax() {
    init();
    let transport = Arc::new(
        StubTransport::new()
            .page(
                "https://1stkissmanga.me/manga/alpha/",
                r#"<div class="post-title"><h1>Alpha</h1></div>
                <div class="post-status"><div class="summary-content"> Completed </div></div>"#,
            )
            .page(
                "https://1stkissmanga.me/manga/alpha/ajax/chapters/",
                r#"<ul>
                <li class="wp-manga-chapter"><a href="https://1stkissmanga.me/manga/alpha/chapter-2/">Chapter 2</a>
                  <span class="chapter-release-date"><i>May 1, 2023</i></span></li>
                <li class="wp-manga-chapter"><a href="https://1stkissmanga.me/manga/alpha/chapter-1/">Chapter 1</a></li>
                </ul>"#,
            ),
    );
    let parser = MangaSource::FirstKissManga.create(&ParserContext::new(transport.clone()));
    let manga = Manga {
        url: "/manga/alpha/".to_owned(),
        public_url: "https://1stkissmanga.me/manga/alpha/".to_owned(),
        ..Default::default()
    };

    let manga = parser.details(&manga).await.unwrap();
    assert_eq!(manga.state, MangaState::Finished);
    let chapters = manga.chapters.unwrap();
    assert_eq!(chapters.len(), 2);
    assert_eq!(chapters[0].url, "/manga/alpha/chapter-1/");
    assert_eq!(chapters[1].number, 2.0);
    assert_eq!(chapters[1].upload_date, 1682899200000);
    assert_eq!(
        transport.requested(),
        vec![
            "https://1stkissmanga.me/manga/alpha/",
            "https://1stkissmanga.me/manga/alpha/ajax/chapters/",
        ]
    );
}

#[tokio::test]
async fn sites_sharing_a_layout_stay_apart() {
    init();
    let transport = Arc::new(
        StubTransport::new()
            .page(
                "https://1stkissmanga.me/manga/solo/chapter-1/",
                r#"<div class="reading-content"><img src="https://cdn.test/kiss/1.jpg"></div>"#,
            )
            .page(
                "https://aquamanga.com/manga/solo/chapter-1/",
                r#"<div class="reading-content"><img src="https://cdn.test/aqua/1.jpg"></div>"#,
            ),
    );
    let context = ParserContext::new(transport.clone());
    let kiss = MangaSource::FirstKissManga.create(&context);
    let aqua = MangaSource::AquaManga.create(&context);

    assert_ne!(kiss.generate_uid("/manga/solo/"), aqua.generate_uid("/manga/solo/"));

    let chapter = |source: &str| MangaChapter {
        url: "/manga/solo/chapter-1/".to_owned(),
        source: source.to_owned(),
        ..Default::default()
    };
    let pages = aqua.pages(&chapter(aqua.source())).await.unwrap();
    assert_eq!(pages[0].url, "https://cdn.test/aqua/1.jpg");
    let pages = kiss.pages(&chapter(kiss.source())).await.unwrap();
    assert_eq!(pages[0].url, "https://cdn.test/kiss/1.jpg");
    assert_eq!(
        transport.requested(),
        vec![
            "https://aquamanga.com/manga/solo/chapter-1/",
            "https://1stkissmanga.me/manga/solo/chapter-1/",
        ]
    );
}

#[tokio::test]
async fn chapters_on_another_host_are_fetched_there() {
    init();
    let transport = Arc::new(
        StubTransport::new()
            .page(
                "https://chapmanganato.to/manga-ab123",
                r#"<div class="story-info-right"><h1>Alpha</h1></div>
                <ul class="row-content-chapter">
                  <li><a href="https://chapmanganato.to/manga-ab123/chapter-2">Chapter 2</a></li>
                  <li><a href="https://chapmanganato.to/manga-ab123/chapter-1">Chapter 1</a></li>
                </ul>"#,
            )
            .page(
                "https://chapmanganato.to/manga-ab123/chapter-1",
                r#"<div class="container-chapter-reader"><img src="https://img.test/1.jpg"></div>"#,
            ),
    );
    let parser = MangaSource::MangaNato.create(&ParserContext::new(transport.clone()));
    assert_eq!(parser.domain(), "manganato.com");
    let manga = Manga {
        url: "https://chapmanganato.to/manga-ab123".to_owned(),
        public_url: "https://chapmanganato.to/manga-ab123".to_owned(),
        source: parser.source().to_owned(),
        ..Default::default()
    };

    let chapters = parser.details(&manga).await.unwrap().chapters.unwrap();
    assert_eq!(chapters[0].url, "https://chapmanganato.to/manga-ab123/chapter-1");
    assert_eq!(
        chapters[0].id,
        id::generate_uid("MANGANATO", "https://chapmanganato.to/manga-ab123/chapter-1")
    );

    let pages = parser.pages(&chapters[0]).await.unwrap();
    assert_eq!(pages[0].url, "https://img.test/1.jpg");
    assert_eq!(
        transport.requested().last().map(String::as_str),
        Some("https://chapmanganato.to/manga-ab123/chapter-1")
    );
}

#[tokio::test]
async fn search_skips_failing_sources() {
    init();
    let transport = Arc::new(
        StubTransport::new()
            .page("https://manga.test/search?q=alpha%20story&page=1", LIST_PAGE_2)
            .status("https://broken.test/search?q=alpha%20story&page=1", StatusCode::FORBIDDEN),
    );
    let broken = GenericQuery {
        source: "BROKEN",
        hostnames: vec!["broken.test"],
        ..test_query()
    };
    let context = ParserContext::new(transport.clone());
    let parsers: Vec<Arc<dyn Parser>> = vec![
        Arc::new(GenericQueryParser::new(test_query(), &context)),
        Arc::new(GenericQueryParser::new(broken, &context)),
    ];
    let parser = MangaParser::from_parsers(parsers);

    let found = parser.search("alpha story", &[]).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].source, "TESTSRC");

    let found = parser.search("alpha story", &["broken.test".to_owned()]).await.unwrap();
    assert!(found.is_empty());
    assert_eq!(transport.requested().len(), 3);
}

#[tokio::test]
async fn rate_limited_request_is_retried_once() {
    let request = || Request::get(url("https://manga.test/list/1"));

    let retry = RateLimitRetry::new(
        SequenceTransport::new([StatusCode::TOO_MANY_REQUESTS]),
        Duration::from_millis(1),
    );
    let response = retry.execute(request()).await.unwrap();
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(retry.inner().calls(), 2);

    let retry = RateLimitRetry::new(
        SequenceTransport::new([StatusCode::TOO_MANY_REQUESTS, StatusCode::TOO_MANY_REQUESTS]),
        Duration::from_millis(1),
    );
    let response = retry.execute(request()).await.unwrap();
    assert_eq!(response.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(retry.inner().calls(), 2);
    assert!(matches!(
        response.error_for_status(),
        Err(ParseError::RateLimited(host)) if host == "manga.test"
    ));

    let retry = RateLimitRetry::new(SequenceTransport::new([StatusCode::OK]), Duration::from_millis(1));
    retry.execute(request()).await.unwrap();
    assert_eq!(retry.inner().calls(), 1);
}
