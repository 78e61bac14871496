pub mod crawler;
pub mod document;
pub mod error;
pub mod exclusion;
pub mod fetch;
pub mod normalize;
pub mod result;

pub use crawler::{Crawler, EventCallback};
pub use document::{Document, Element};
pub use error::ScanError;
pub use exclusion::ExclusionMatcher;
pub use fetch::{FetchedPage, HttpFetcher, PageFetcher};
pub use result::{CrawlEvent, CrawlReport, Page};
pub use tokio_util::sync::CancellationToken;
