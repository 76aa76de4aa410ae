pub mod collector;
pub mod error;
pub mod scraper;

pub use crate::collector::{CollectionReport, Collector, Progress, RunState, WorkCounter};
pub use crate::error::{Result, ScrapeError};
pub use crate::scraper::{ClientOptions, RetryPolicy, SearchClient, Session};
