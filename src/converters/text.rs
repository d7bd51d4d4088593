// src/converters/text.rs
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{node::Node, ElementRef, Html};

/// Elements whose content never reaches the text output.
const SKIPPED_ELEMENTS: [&str; 3] = ["script", "style", "noscript"];

static BLANK_RUN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{3,}").expect("Failed to compile BLANK_RUN_RE"));

/// Strips markup from a filing. Each text node lands on its own line, lines
/// are trimmed, runs of blank lines collapse to a single blank line and the
/// result is trimmed.
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);

    let mut pieces: Vec<&str> = Vec::new();
    collect_text(document.root_element(), &mut pieces);

    let joined = pieces.join("\n");
    let lines: Vec<&str> = joined.lines().map(str::trim).collect();
    let text = lines.join("\n");

    BLANK_RUN_RE.replace_all(&text, "\n\n").trim().to_string()
}

fn collect_text<'a>(element: ElementRef<'a>, out: &mut Vec<&'a str>) {
    for node in element.children() {
        if let Some(child) = ElementRef::wrap(node) {
            if SKIPPED_ELEMENTS.contains(&child.value().name()) {
                continue;
            }
            collect_text(child, out);
        } else if let Node::Text(text_node) = node.value() {
            out.push(&text_node.text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_script_style_and_noscript() {
        let html = r#"
            <html><head><style>body { color: red; }</style>
            <script>var secret = 1;</script></head>
            <body><p>Annual Report</p><noscript>Enable JS</noscript><p>Item 1. Business</p></body></html>
        "#;
        let text = html_to_text(html);
        assert!(text.contains("Annual Report"));
        assert!(text.contains("Item 1. Business"));
        assert!(!text.contains("color: red"));
        assert!(!text.contains("secret"));
        assert!(!text.contains("Enable JS"));
    }

    #[test]
    fn collapses_blank_runs_and_trims() {
        let html = "<body>\n\n   <div>First</div>\n\n\n\n<div>   Second   </div>\n\n\n</body>";
        assert_eq!(html_to_text(html), "First\n\nSecond");
    }

    #[test]
    fn separates_adjacent_text_nodes() {
        let text = html_to_text("<p>Revenue<b>$394</b>billion</p>");
        assert_eq!(text, "Revenue\n$394\nbillion");
    }

    #[test]
    fn decodes_entities() {
        assert_eq!(html_to_text("<p>AT&amp;T&nbsp;Inc.</p>"), "AT&T\u{a0}Inc.");
    }

    #[test]
    fn empty_input_is_empty_output() {
        assert_eq!(html_to_text(""), "");
    }
}
