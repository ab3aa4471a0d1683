use serde::{Deserialize, Serialize};

/// A heading found inside the page's content root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    /// Heading level, 1 through 6
    pub level: u8,
    pub text: String,
}

/// Whether a list was `<ul>` or `<ol>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListKind {
    Unordered,
    Ordered,
}

/// A list block with its kept items in document order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListBlock {
    pub kind: ListKind,
    pub items: Vec<String>,
}

/// An image with meaningful alt text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    /// Absolute image URL
    pub src: String,
    pub alt: String,
}

/// An outbound link, resolved to an absolute URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub text: String,
    pub url: String,
}

/// Structured content extracted from one HTML page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageContent {
    /// The URL that was requested
    pub url: String,
    pub title: String,
    pub meta_description: String,
    pub headings: Vec<Heading>,
    /// Paragraph text, one paragraph per line
    pub text: String,
    pub lists: Vec<ListBlock>,
    /// Tables as row-major cell text
    pub tables: Vec<Vec<Vec<String>>>,
    pub images: Vec<Image>,
    pub links: Vec<Link>,
}

/// Where a content record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchSource {
    Network,
    Cache,
}

/// The outcome of fetching one URL
///
/// Every failure mode is data: callers branch on the variant rather than on a
/// `Result`. `Error` records are terminal; they are never cached and never
/// have their links followed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum PageRecord {
    Content {
        #[serde(flatten)]
        page: PageContent,
        source: FetchSource,
    },
    Error {
        url: String,
        error_message: String,
        is_robots_blocked: bool,
    },
}

/// Sub-pages use the same record type as top-level pages
pub type SubPageRecord = PageRecord;

impl PageRecord {
    /// Builds an error record for a failed fetch
    pub fn error(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Error {
            url: url.into(),
            error_message: message.into(),
            is_robots_blocked: false,
        }
    }

    /// Builds an error record for a URL disallowed by robots.txt
    pub fn robots_blocked(url: impl Into<String>) -> Self {
        Self::Error {
            url: url.into(),
            error_message: "Disallowed by robots.txt".to_string(),
            is_robots_blocked: true,
        }
    }

    /// The URL this record describes
    pub fn url(&self) -> &str {
        match self {
            Self::Content { page, .. } => &page.url,
            Self::Error { url, .. } => url,
        }
    }

    /// Returns the extracted content, if the fetch succeeded
    pub fn content(&self) -> Option<&PageContent> {
        match self {
            Self::Content { page, .. } => Some(page),
            Self::Error { .. } => None,
        }
    }

    pub fn is_content(&self) -> bool {
        matches!(self, Self::Content { .. })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    pub fn is_robots_blocked(&self) -> bool {
        matches!(
            self,
            Self::Error {
                is_robots_blocked: true,
                ..
            }
        )
    }

    pub fn from_cache(&self) -> bool {
        matches!(
            self,
            Self::Content {
                source: FetchSource::Cache,
                ..
            }
        )
    }
}
