mod parse;
mod retry;

pub use parse::{parse_authenticity_token, parse_work_count};
pub use retry::{retry_after, RetryPolicy};

use crate::{
    collector::WorkCounter,
    error::{Result, ScrapeError},
};
use const_format::formatcp;
use http::StatusCode;
use rarepairs::{build_tag, search_url, Fandom, ARCHIVE_URL};
use reqwest::{
    blocking::{Client, Response},
    redirect,
};
use std::{thread, time::Duration};
use tracing::{debug, info, warn};

const LOGIN_PATH: &str = "/users/login";

const USER_AGENT: &str = formatcp!(
    "rarepairs/{} (fic counts by pairing)",
    env!("CARGO_PKG_VERSION")
);

/// How the client talks to the archive
#[derive(Clone, Debug)]
pub struct ClientOptions {
    /// Archive root. Only tests point this anywhere else.
    pub base_url: String,
    pub retry: RetryPolicy,
    /// Per request, including reading the body
    pub timeout: Duration,
}

impl ClientOptions {
    pub fn new() -> ClientOptions {
        ClientOptions {
            base_url: String::from(ARCHIVE_URL),
            retry: RetryPolicy::new(),
            timeout: Duration::from_secs(60),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> ClientOptions {
        self.base_url = base_url.into();
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> ClientOptions {
        self.retry = retry;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> ClientOptions {
        self.timeout = timeout;
        self
    }
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Who the archive thinks we are. Logged-in searches also see works restricted to members.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Session {
    Anonymous,
    LoggedIn { username: String },
}

/// Searches the archive for relationship tags, one request at a time.
///
/// The session cookie lives in the client's cookie store for as long as the client does. It is
/// never refreshed.
pub struct SearchClient {
    client: Client,
    fandom: Fandom,
    options: ClientOptions,
    session: Session,
}

impl SearchClient {
    pub fn new(fandom: Fandom, options: ClientOptions) -> Result<SearchClient> {
        // Redirects are how a successful login is recognised, so never follow them
        let client = Client::builder()
            .cookie_store(true)
            .redirect(redirect::Policy::none())
            .timeout(options.timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(SearchClient {
            client,
            fandom,
            options,
            session: Session::Anonymous,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Logs in with the form on the login page. The archive answers a good login with a redirect
    /// and a bad one by showing the form again.
    pub fn login(&mut self, username: &str, password: &str) -> Result<()> {
        let login_url = format!("{}{}", self.base_url(), LOGIN_PATH);
        info!(username, "logging in");

        let page = self.get_with_retry(&login_url)?;
        let page = check_status(page, &login_url)?;
        let token = parse_authenticity_token(&page.text()?).ok_or_else(|| {
            ScrapeError::Auth(String::from("login page had no authenticity token"))
        })?;

        let response = self
            .client
            .post(&login_url)
            .form(&[
                ("user[login]", username),
                ("user[password]", password),
                ("authenticity_token", token.as_str()),
                ("commit", "Log in"),
            ])
            .send()?;

        let status = response.status();
        if !status.is_redirection() {
            warn!(%status, "login rejected");
            return Err(ScrapeError::Auth(format!(
                "the archive did not accept the credentials for {} (HTTP {})",
                username,
                status.as_u16()
            )));
        }

        info!(username, "logged in");
        self.session = Session::LoggedIn {
            username: username.to_owned(),
        };
        Ok(())
    }

    /// Number of works found when searching for the pairing's canonical relationship tag.
    ///
    /// This reads the result count, not the works themselves, so fics that only mention the
    /// pairing in passing are counted too.
    pub fn fetch_count(&self, name1: &str, name2: &str) -> Result<u64> {
        let tag = build_tag(&self.fandom, name1, name2);
        let url = search_url(self.base_url(), &tag);
        debug!(%tag, "searching");

        let response = self.get_with_retry(&url)?;
        let response = check_status(response, &url)?;

        Ok(parse_work_count(&response.text()?))
    }

    fn base_url(&self) -> &str {
        self.options.base_url.trim_end_matches('/')
    }

    // GET, sleeping through 429s for as long as the retry policy allows
    fn get_with_retry(&self, url: &str) -> Result<Response> {
        let policy = &self.options.retry;
        let mut retries = 0;

        loop {
            let response = self.client.get(url).send()?;
            if response.status() != StatusCode::TOO_MANY_REQUESTS {
                return Ok(response);
            }

            if retries >= policy.max_retries {
                return Err(ScrapeError::RateLimited {
                    attempts: retries + 1,
                });
            }

            retries += 1;
            let delay = policy.delay(retries, retry_after(response.headers()));
            warn!(
                retry = retries,
                of = policy.max_retries,
                wait_secs = delay.as_secs_f64(),
                "rate limited, backing off"
            );
            thread::sleep(delay);
        }
    }
}

impl WorkCounter for SearchClient {
    fn work_count(&mut self, name1: &str, name2: &str) -> Result<u64> {
        self.fetch_count(name1, name2)
    }
}

fn check_status(response: Response, url: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(ScrapeError::Status {
            status: status.as_u16(),
            url: url.to_owned(),
        })
    }
}
