// src/states.rs

use thiserror::Error;

/// Sentinel code for nationwide totals.
pub const NATIONWIDE: &str = "US";

/// Every state the site has a landing page for, as (code, URL path segment).
/// Row order of every results file follows this list.
pub static STATES: &[(&str, &str)] = &[
    ("AL", "alabama"),
    ("AK", "alaska"),
    ("AZ", "arizona"),
    ("AR", "arkansas"),
    ("CA", "california"),
    ("CO", "colorado"),
    ("CT", "connecticut"),
    ("DE", "delaware"),
    ("FL", "florida"),
    ("GA", "georgia"),
    ("HI", "hawaii"),
    ("ID", "idaho"),
    ("IL", "illinois"),
    ("IN", "indiana"),
    ("IA", "iowa"),
    ("KS", "kansas"),
    ("KY", "kentucky"),
    ("LA", "louisiana"),
    ("ME", "maine"),
    ("MD", "maryland"),
    ("MA", "massachusetts"),
    ("MI", "michigan"),
    ("MN", "minnesota"),
    ("MS", "mississippi"),
    ("MO", "missouri"),
    ("MT", "montana"),
    ("NE", "nebraska"),
    ("NV", "nevada"),
    ("NH", "new-hampshire"),
    ("NJ", "new-jersey"),
    ("NM", "new-mexico"),
    ("NY", "new-york"),
    ("NC", "north-carolina"),
    ("ND", "north-dakota"),
    ("OH", "ohio"),
    ("OK", "oklahoma"),
    ("OR", "oregon"),
    ("PA", "pennsylvania"),
    ("RI", "rhode-island"),
    ("SC", "south-carolina"),
    ("SD", "south-dakota"),
    ("TN", "tennessee"),
    ("TX", "texas"),
    ("UT", "utah"),
    ("VT", "vermont"),
    ("VA", "virginia"),
    ("WA", "washington"),
    ("WV", "west-virginia"),
    ("WI", "wisconsin"),
    ("WY", "wyoming"),
];

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown state code `{0}`")]
pub struct UnknownState(pub String);

/// Iterate the state codes in results-file row order.
pub fn codes() -> impl Iterator<Item = &'static str> {
    STATES.iter().map(|&(code, _)| code)
}

/// Map a two-letter code (any case) to the site's path segment.
/// `US` resolves to the empty segment, i.e. the nationwide page.
pub fn resolve(code: &str) -> Result<&'static str, UnknownState> {
    let code = code.trim().to_ascii_uppercase();
    if code == NATIONWIDE {
        return Ok("");
    }
    STATES
        .iter()
        .find(|&&(c, _)| c == code)
        .map(|&(_, name)| name)
        .ok_or(UnknownState(code))
}
