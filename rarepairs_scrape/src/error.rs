use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Login was attempted and refused. Nothing has been scraped yet.
    #[error("Login failed: {0}")]
    Auth(String),

    /// Still throttled after every retry the policy allows
    #[error("Rate limited by the archive after {attempts} attempts")]
    RateLimited { attempts: u32 },

    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("Web error: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Data(#[from] rarepairs::Error),
}

pub type Result<T> = std::result::Result<T, ScrapeError>;
