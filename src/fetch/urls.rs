// src/fetch/urls.rs

use url::{ParseError, Url};

pub const DEFAULT_HOST: &str = "https://www.engineerjobs.com/";

/// `<host>/<level>/<field>/<state-path>/`, keeping the trailing slash the
/// site expects. An empty field or state path leaves an empty segment,
/// which the site treats as "all".
pub fn target_url(
    host: &str,
    level: &str,
    field: &str,
    state_path: &str,
) -> Result<Url, ParseError> {
    let mut url = Url::parse(host)?;
    let prefix = url.path().trim_end_matches('/').to_string();
    url.set_path(&format!("{}/{}/{}/{}/", prefix, level, field, state_path));
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_page() {
        let url = target_url(DEFAULT_HOST, "entry-level", "software-engineering", "california")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.engineerjobs.com/entry-level/software-engineering/california/"
        );
    }

    #[test]
    fn nationwide_all_fields() {
        let url = target_url(DEFAULT_HOST, "jobs", "", "").unwrap();
        assert_eq!(url.as_str(), "https://www.engineerjobs.com/jobs///");
    }

    #[test]
    fn host_without_trailing_slash() {
        let url = target_url("http://localhost:8080", "mid-level", "civil-engineering", "ohio")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/mid-level/civil-engineering/ohio/"
        );
    }

    #[test]
    fn bad_host() {
        assert!(target_url("not a url", "jobs", "", "").is_err());
    }
}
