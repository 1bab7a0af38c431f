use crate::result::{AnalysisResult, HtmlVersion};
use ego_tree::NodeRef;
use scraper::node::{Doctype, Element};
use scraper::{Html, Node};
use tracing::debug;
use url::Url;

/// Walk a parsed document once, depth-first, filling `result` with
/// structural facts and returning the http/https link targets in document
/// order. Repeated identical links stay repeated; classification and the
/// probe set are built from the same anchors.
pub fn scan_document(document: &Html, base: &Url, result: &mut AnalysisResult) -> Vec<Url> {
    let mut targets = Vec::new();
    walk(document.tree.root(), base, result, &mut targets);

    debug!(
        title = %result.title,
        internal_links = result.internal_links,
        external_links = result.external_links,
        probe_targets = targets.len(),
        "document scan complete"
    );

    targets
}

fn walk(node: NodeRef<'_, Node>, base: &Url, result: &mut AnalysisResult, targets: &mut Vec<Url>) {
    match node.value() {
        Node::Element(element) => match element.name() {
            "title" => {
                if let Some(child) = node.first_child()
                    && let Node::Text(text) = child.value()
                {
                    result.title = text.trim().to_string();
                }
            }
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                *result
                    .headings
                    .entry(element.name().to_string())
                    .or_insert(0) += 1;
            }
            "a" => classify_anchor(element, base, result, targets),
            "form" => {
                if is_login_form(node) {
                    result.has_login_form = true;
                }
            }
            _ => {}
        },
        Node::Doctype(doctype) => {
            result.html_version = detect_html_version(doctype);
        }
        _ => {}
    }

    for child in node.children() {
        walk(child, base, result, targets);
    }
}

/// Classify one anchor and record its probe target. Anchors that do not
/// resolve to an http/https address touch neither counter nor the target
/// list.
fn classify_anchor(
    element: &Element,
    base: &Url,
    result: &mut AnalysisResult,
    targets: &mut Vec<Url>,
) {
    let Some(href) = element.attr("href") else {
        return;
    };

    let resolved = match base.join(href) {
        Ok(resolved) => resolved,
        Err(err) => {
            debug!(href, error = %err, "skipping unparseable href");
            return;
        }
    };

    if !matches!(resolved.scheme(), "http" | "https") {
        return;
    }

    // The port is part of a site's identity: the same host on another port
    // is a different site.
    let same_site = resolved.host_str() == base.host_str()
        && resolved.port_or_known_default() == base.port_or_known_default();

    if same_site {
        result.internal_links += 1;
    } else {
        result.external_links += 1;
    }

    targets.push(resolved);
}

/// A login form needs a password input plus a user-identifying input: type
/// absent, `text` or `email`, with a name containing "user", "email" or
/// "login".
fn is_login_form(form: NodeRef<'_, Node>) -> bool {
    let mut has_password = false;
    let mut has_username = false;

    for descendant in form.descendants() {
        let Some(element) = descendant.value().as_element() else {
            continue;
        };
        if element.name() != "input" {
            continue;
        }

        let input_type = element.attr("type").unwrap_or("").to_lowercase();
        let input_name = element.attr("name").unwrap_or("").to_lowercase();

        if input_type == "password" {
            has_password = true;
        }

        if matches!(input_type.as_str(), "" | "text" | "email")
            && ["user", "email", "login"]
                .iter()
                .any(|needle| input_name.contains(needle))
        {
            has_username = true;
        }

        if has_password && has_username {
            return true;
        }
    }

    false
}

fn detect_html_version(doctype: &Doctype) -> HtmlVersion {
    let mut literal = doctype.name().to_string();
    if !doctype.public_id().is_empty() {
        literal.push(' ');
        literal.push_str(doctype.public_id());
    }
    if !doctype.system_id().is_empty() {
        literal.push(' ');
        literal.push_str(doctype.system_id());
    }

    version_from_doctype(&literal)
}

/// Doctype classification: a bare "html" is HTML5, the DTD families are
/// recognized by substring, and anything unrecognized falls back to HTML5.
pub fn version_from_doctype(doctype: &str) -> HtmlVersion {
    let doctype = doctype.trim().to_lowercase();

    if doctype == "html" {
        return HtmlVersion::Html5;
    }
    if doctype.contains("xhtml") {
        return HtmlVersion::Xhtml;
    }
    if doctype.contains("html 4") {
        return HtmlVersion::Html4;
    }

    HtmlVersion::Html5
}
