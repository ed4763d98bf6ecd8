//! Request URLs for a single CouchDB database.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::Url;

use super::view::{DESIGN_DOC, FILES_BY_JOB};

/// Everything except RFC 3986 unreserved characters is escaped, including `/`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Escape a single URL component.
pub fn escape_component(s: &str) -> String {
    utf8_percent_encode(s, COMPONENT).to_string()
}

/// Escape each `/`-separated segment of `s`, keeping the separators.
pub fn escape_segments(s: &str) -> String {
    s.split('/')
        .map(escape_component)
        .collect::<Vec<_>>()
        .join("/")
}

/// Base URL of a database plus the URL builders for every request the
/// backend makes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CouchEndpoint {
    base: String,
}

impl CouchEndpoint {
    /// Create an endpoint from the database URL.
    pub fn new(url: &Url) -> Self {
        Self {
            base: url.as_str().trim_end_matches('/').to_string(),
        }
    }

    /// `{base}/{id}` with the whole id escaped as one component.
    pub fn document(&self, id: &str) -> String {
        format!("{}/{}", self.base, escape_component(id))
    }

    /// `{base}/{id}?rev={rev}`.
    pub fn document_at(&self, id: &str, rev: &str) -> String {
        format!("{}?rev={}", self.document(id), escape_component(rev))
    }

    /// `{base}/{id}/{filename}`; this is also the locator handed back by save.
    pub fn attachment(&self, id: &str, filename: &str) -> String {
        format!("{}/{}", self.document(id), escape_segments(filename))
    }

    /// `{base}/_design/cloudcrowd`.
    pub fn design(&self) -> String {
        format!("{}/_design/{DESIGN_DOC}", self.base)
    }

    /// `{base}/_design/cloudcrowd/_view/files_by_job?key="{job}"`.
    pub fn files_by_job(&self, job: &str) -> String {
        let key = serde_json::Value::String(job.to_string()).to_string();
        format!(
            "{}/_view/{FILES_BY_JOB}?key={}",
            self.design(),
            escape_component(&key)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint(raw: &str) -> CouchEndpoint {
        CouchEndpoint::new(&Url::parse(raw).expect("valid url"))
    }

    #[test]
    fn test_document_id_escapes_slashes() {
        let ep = endpoint("http://localhost:5984/cloudcrowd");
        assert_eq!(
            ep.document("resize/job_42/unit_1/out.txt"),
            "http://localhost:5984/cloudcrowd/resize%2Fjob_42%2Funit_1%2Fout.txt"
        );
    }

    #[test]
    fn test_attachment_locator() {
        let ep = endpoint("http://localhost:5984/cloudcrowd/");
        assert_eq!(
            ep.attachment("resize/job_42/unit_1/out.txt", "out.txt"),
            "http://localhost:5984/cloudcrowd/resize%2Fjob_42%2Funit_1%2Fout.txt/out.txt"
        );
        assert_eq!(
            ep.attachment("a/b/c/sub dir/x.png", "sub dir/x.png"),
            "http://localhost:5984/cloudcrowd/a%2Fb%2Fc%2Fsub%20dir%2Fx.png/sub%20dir/x.png"
        );
    }

    #[test]
    fn test_view_query_key_is_quoted_json() {
        let ep = endpoint("http://localhost:5984/cloudcrowd");
        assert_eq!(
            ep.files_by_job("resize/job_42"),
            "http://localhost:5984/cloudcrowd/_design/cloudcrowd/_view/files_by_job?key=%22resize%2Fjob_42%22"
        );
    }

    #[test]
    fn test_revision_is_escaped() {
        let ep = endpoint("http://localhost:5984");
        assert_eq!(ep.document_at("id", "2-ab+c"), "http://localhost:5984/id?rev=2-ab%2Bc");
    }
}
