use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Markup generation declared by the document's doctype.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HtmlVersion {
    #[default]
    #[serde(rename = "HTML5")]
    Html5,
    #[serde(rename = "HTML 4.01")]
    Html4,
    #[serde(rename = "XHTML")]
    Xhtml,
}

impl fmt::Display for HtmlVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HtmlVersion::Html5 => "HTML5",
            HtmlVersion::Html4 => "HTML 4.01",
            HtmlVersion::Xhtml => "XHTML",
        };
        f.write_str(name)
    }
}

/// Everything derived from one analyzed page.
///
/// `internal_links + external_links` equals the number of anchors that
/// resolved to an http/https address; the same set feeds the link prober,
/// so `inaccessible_links` never exceeds that sum.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub url: String,
    pub html_version: HtmlVersion,
    pub title: String,
    pub headings: BTreeMap<String, usize>,
    pub internal_links: usize,
    pub external_links: usize,
    pub inaccessible_links: usize,
    pub has_login_form: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalysisResult {
    /// Fresh result with every heading level present at zero.
    pub fn new(url: String) -> Self {
        let headings = (1..=6).map(|level| (format!("h{level}"), 0)).collect();

        Self {
            url,
            html_version: HtmlVersion::Html5,
            title: String::new(),
            headings,
            internal_links: 0,
            external_links: 0,
            inaccessible_links: 0,
            has_login_form: false,
            error: None,
        }
    }

    /// Result for an analysis that never got off the ground. Only the target
    /// address and the failure description are meaningful.
    pub fn with_error(url: String, error: String) -> Self {
        Self {
            url,
            html_version: HtmlVersion::Html5,
            title: String::new(),
            headings: BTreeMap::new(),
            internal_links: 0,
            external_links: 0,
            inaccessible_links: 0,
            has_login_form: false,
            error: Some(error),
        }
    }
}
