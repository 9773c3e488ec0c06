use thiserror::Error;

/// Failures of the payload codecs (lz-string, packer, CryptoJS).
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Invalid base64: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
    #[error("Invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),
    #[error("Ciphertext has no 'Salted__' header")]
    MissingSaltHeader,
    #[error("Unsupported AES key length: {0} bytes")]
    InvalidKeyLength(usize),
    #[error("Unsupported IV length: {0} bytes")]
    InvalidIvLength(usize),
    #[error("Decryption failed, wrong key or corrupted ciphertext")]
    Cipher,
    #[error("Decoded text is not valid UTF-8")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
    #[error("Compressed stream from {0} is truncated or corrupt")]
    CorruptStream(String),
    #[error("No payload found in script from {origin}")]
    PayloadNotFound { origin: String },
    #[error("Payload from {origin} is not valid JSON: {source}")]
    InvalidPayload {
        origin: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid CryptoJS envelope: {0}")]
    InvalidEnvelope(#[source] serde_json::Error),
    #[error("Not a p,a,c,k,e,d script")]
    InvalidPackedScript,
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Network error, status = {0}")]
    NetworkError(reqwest::StatusCode),
    #[error("Rate limited by {0}")]
    RateLimited(String),
    #[error(transparent)]
    NetworkErrorUnknown(#[from] reqwest::Error),
    #[error("Cloudflare's I'm Under Attack Mode")]
    CloudflareIUAM,
    #[error("Invalid selector '{0}'")]
    InvalidSelector(String),
    #[error("No url found in element '{}' with attrs: {:?}", .0, .1)]
    NoUrlFound(String, Vec<&'static str>),
    #[error("Failed to make '{0}' absolute")]
    FailedToMakeAbsolute(String),
    #[error("No parser found that supports {0}")]
    NoParserFound(String),
    #[error("Missing hostname in url: {0}")]
    MissingHostname(String),
    #[error("Missing query: {0}")]
    MissingQuery(&'static str),
    // Manga
    #[error("Missing manga title")]
    MissingMangaTitle,

    // Chapters
    #[error("Missing chapter title")]
    MissingChapterTitle,
    #[error("Missing chapter href")]
    MissingChapterHref,
    #[error("Invalid chapter url: {0}")]
    InvalidChapterUrl(String),

    // Images
    #[error("No images")]
    MissingImages,

    // Search
    #[error("Missing search title")]
    MissingSearchTitle,
    #[error("Missing search href")]
    MissingSearchHref,
    #[error("Searching is not implemented for this parser")]
    SearchNotImplemented,
    #[error("Invalid search url: {0}")]
    InvalidSearchUrl(String),

    #[error("Failed to decode payload of {origin}: {source}")]
    Decode {
        origin: String,
        #[source]
        source: DecodeError,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ParseError {
    pub fn decode(origin: impl ToString, source: DecodeError) -> Self {
        Self::Decode {
            origin: origin.to_string(),
            source,
        }
    }
}

pub type Result<T> = core::result::Result<T, ParseError>;
