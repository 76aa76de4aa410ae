use lazy_static::lazy_static;
use regex::Regex;
use scraper::{Html, Selector};
use tracing::warn;

lazy_static! {
    // The result count heading on the works search page, e.g. "1,234 Found"
    static ref HEADING: Selector =
        Selector::parse("div#main h3.heading").expect("Hardcoded selector shouldn't fail.");
    static ref AUTHENTICITY_TOKEN: Selector =
        Selector::parse(r#"input[name="authenticity_token"]"#)
            .expect("Hardcoded selector shouldn't fail.");
    static ref WORK_COUNT_PATTERN: Regex =
        Regex::new(r"^\s*([0-9][0-9,]*)").expect("Hardcoded regex shouldn't fail.");
}

/// Number of works a search page reports.
///
/// No heading means no results. This is how the archive renders an empty search today, not
/// something it promises, so any change in the page markup belongs here.
pub fn parse_work_count(html: &str) -> u64 {
    let document = Html::parse_document(html);

    let heading = match document.select(&HEADING).next() {
        Some(heading) => heading.text().collect::<String>(),
        None => return 0,
    };

    let count = WORK_COUNT_PATTERN
        .captures(&heading)
        .and_then(|captures| captures.get(1))
        .and_then(|digits| digits.as_str().replace(',', "").parse().ok());

    match count {
        Some(count) => count,
        None => {
            warn!(heading = heading.trim(), "results heading without a count");
            0
        }
    }
}

/// The CSRF token the login form has to send back.
pub fn parse_authenticity_token(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    document
        .select(&AUTHENTICITY_TOKEN)
        .filter_map(|input| input.value().attr("value"))
        .find(|token| !token.is_empty())
        .map(String::from)
}
