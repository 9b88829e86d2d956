//! Marker rewrite engine.
//!
//! Templates flag translatable content with `data-i18n*` attributes. Each
//! [`MarkerKind`] owns one attribute and one target (element text or another
//! attribute on the same tag). A pass is two steps:
//!
//! 1. [`MarkerKind::find`] scans the document and returns every marker with
//!    the byte span of the value it controls;
//! 2. [`apply_pass`] splices translated values into those spans.
//!
//! Splicing copies the source around the spans exactly once, so a translated
//! value is never scanned again by the same pass. Markers whose key is missing
//! from the table keep their source text.

use crate::i18n::{RewriteMetrics, TranslationTable};
use regex::Regex;
use serde::Serialize;
use std::borrow::Cow;
use std::ops::Range;
use std::sync::OnceLock;
use tracing::debug;

/// The five marker attributes a template can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    /// `data-i18n`: replaces the element's text
    Text,
    /// `data-i18n-content`: replaces `content="..."`
    ContentAttr,
    /// `data-i18n-data-text`: replaces `data-text="..."`
    DataTextAttr,
    /// `data-i18n-aria-label`: replaces `aria-label="..."`
    AriaLabelAttr,
    /// `data-i18n-href`: replaces `href="..."`, in either attribute order
    HrefAttr,
}

impl MarkerKind {
    /// Order the passes run in. Attribute passes come first: the text pattern
    /// spans from an opening tag to the next closing tag and must see the
    /// attribute markers already resolved.
    pub const PIPELINE: [MarkerKind; 5] = [
        MarkerKind::ContentAttr,
        MarkerKind::DataTextAttr,
        MarkerKind::AriaLabelAttr,
        MarkerKind::HrefAttr,
        MarkerKind::Text,
    ];

    /// Name of the marker attribute.
    pub const fn attribute(self) -> &'static str {
        match self {
            MarkerKind::Text => "data-i18n",
            MarkerKind::ContentAttr => "data-i18n-content",
            MarkerKind::DataTextAttr => "data-i18n-data-text",
            MarkerKind::AriaLabelAttr => "data-i18n-aria-label",
            MarkerKind::HrefAttr => "data-i18n-href",
        }
    }

    /// Attribute whose value the marker controls, `None` for element text.
    pub const fn target(self) -> Option<&'static str> {
        match self {
            MarkerKind::Text => None,
            MarkerKind::ContentAttr => Some("content"),
            MarkerKind::DataTextAttr => Some("data-text"),
            MarkerKind::AriaLabelAttr => Some("aria-label"),
            MarkerKind::HrefAttr => Some("href"),
        }
    }

    /// Escape a translated value for this marker's target.
    pub fn escape(self, value: &str) -> Cow<'_, str> {
        match self {
            MarkerKind::ContentAttr if value.contains(['&', '"']) => {
                Cow::Owned(value.replace('&', "&amp;").replace('"', "&quot;"))
            }
            MarkerKind::DataTextAttr | MarkerKind::AriaLabelAttr if value.contains('"') => {
                Cow::Owned(value.replace('"', "&quot;"))
            }
            _ => Cow::Borrowed(value),
        }
    }

    /// Find every marker of this kind, ordered by position.
    pub fn find(self, html: &str) -> Vec<MarkerMatch> {
        let mut matches: Vec<MarkerMatch> = patterns(self)
            .iter()
            .flat_map(|pattern| pattern.matches(html))
            .collect();

        if self == MarkerKind::HrefAttr {
            // Both orderings are scanned; keep the earliest of any overlap.
            matches.sort_by_key(|m| m.value.start);
            let mut last_end = 0;
            matches.retain(|m| {
                let keep = m.value.start >= last_end;
                if keep {
                    last_end = m.value.end;
                }
                keep
            });
        }

        matches
    }
}

/// One marker occurrence: the key it names and the span it controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerMatch {
    pub key: String,
    /// Byte range of the text or attribute value to replace
    pub value: Range<usize>,
}

/// Result of one pass over a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassOutcome {
    pub html: String,
    /// Markers whose value was replaced
    pub replaced: usize,
    /// Markers left untouched because their key was missing
    pub missing: usize,
}

/// A compiled marker pattern and the capture groups holding key and value.
struct MarkerPattern {
    regex: Regex,
    key_group: usize,
    value_group: usize,
}

impl MarkerPattern {
    fn new(pattern: &str, key_group: usize, value_group: usize) -> Self {
        Self {
            regex: Regex::new(pattern).expect("marker pattern is a valid regex"),
            key_group,
            value_group,
        }
    }

    fn matches<'a>(&'a self, html: &'a str) -> impl Iterator<Item = MarkerMatch> + 'a {
        self.regex.captures_iter(html).filter_map(move |caps| {
            let key = caps.get(self.key_group)?;
            let value = caps.get(self.value_group)?;
            Some(MarkerMatch {
                key: key.as_str().to_string(),
                value: value.range(),
            })
        })
    }
}

static TEXT_PATTERNS: OnceLock<Vec<MarkerPattern>> = OnceLock::new();
static CONTENT_PATTERNS: OnceLock<Vec<MarkerPattern>> = OnceLock::new();
static DATA_TEXT_PATTERNS: OnceLock<Vec<MarkerPattern>> = OnceLock::new();
static ARIA_LABEL_PATTERNS: OnceLock<Vec<MarkerPattern>> = OnceLock::new();
static HREF_PATTERNS: OnceLock<Vec<MarkerPattern>> = OnceLock::new();
static STRIP_REGEX: OnceLock<Regex> = OnceLock::new();

fn patterns(kind: MarkerKind) -> &'static [MarkerPattern] {
    match kind {
        MarkerKind::Text => TEXT_PATTERNS.get_or_init(|| {
            vec![MarkerPattern::new(
                r#"(?s)<[^>]+\sdata-i18n="([^"]+)"[^>]*>(.*?)</[^>]+>"#,
                1,
                2,
            )]
        }),
        MarkerKind::ContentAttr => CONTENT_PATTERNS.get_or_init(|| {
            vec![MarkerPattern::new(
                r#"data-i18n-content="([^"]+)"[^>]*?\scontent="([^"]*)""#,
                1,
                2,
            )]
        }),
        MarkerKind::DataTextAttr => DATA_TEXT_PATTERNS.get_or_init(|| {
            vec![MarkerPattern::new(
                r#"data-i18n-data-text="([^"]+)"[^>]*?\sdata-text="([^"]*)""#,
                1,
                2,
            )]
        }),
        MarkerKind::AriaLabelAttr => ARIA_LABEL_PATTERNS.get_or_init(|| {
            vec![MarkerPattern::new(
                r#"data-i18n-aria-label="([^"]+)"[^>]*?\saria-label="([^"]*)""#,
                1,
                2,
            )]
        }),
        MarkerKind::HrefAttr => HREF_PATTERNS.get_or_init(|| {
            vec![
                MarkerPattern::new(r#"data-i18n-href="([^"]+)"[^>]*?\shref="([^"]*)""#, 1, 2),
                MarkerPattern::new(r#"\shref="([^"]*)"[^>]*?\sdata-i18n-href="([^"]+)""#, 2, 1),
            ]
        }),
    }
}

/// Run one marker pass over `html`.
pub fn apply_pass(kind: MarkerKind, html: &str, translations: &TranslationTable) -> PassOutcome {
    let mut output = String::with_capacity(html.len());
    let mut cursor = 0;
    let mut replaced = 0;
    let mut missing = 0;

    for marker in kind.find(html) {
        match translations.get(&marker.key) {
            Some(value) => {
                output.push_str(&html[cursor..marker.value.start]);
                output.push_str(&kind.escape(value));
                cursor = marker.value.end;
                replaced += 1;
            }
            None => missing += 1,
        }
    }
    output.push_str(&html[cursor..]);

    PassOutcome {
        html: output,
        replaced,
        missing,
    }
}

/// Run every marker pass in [`MarkerKind::PIPELINE`] order.
pub fn apply_markers(
    html: &str,
    translations: &TranslationTable,
    metrics: &mut RewriteMetrics,
) -> String {
    let mut current = html.to_string();
    for kind in MarkerKind::PIPELINE {
        let outcome = apply_pass(kind, &current, translations);
        debug!(
            "{} pass: {} replaced, {} missing",
            kind.attribute(),
            outcome.replaced,
            outcome.missing
        );
        metrics.record_pass(kind, outcome.replaced, outcome.missing);
        current = outcome.html;
    }
    current
}

/// Remove every marker attribute, translated or not.
pub fn strip_markers(html: &str) -> String {
    let regex = STRIP_REGEX.get_or_init(|| {
        Regex::new(r#"\s*data-i18n(?:-content|-data-text|-aria-label|-href)?="[^"]*""#)
            .expect("strip pattern is a valid regex")
    });
    regex.replace_all(html, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(entries: &[(&str, &str)]) -> TranslationTable {
        entries.iter().copied().collect()
    }

    // ==================== Kind Tests ====================

    #[test]
    fn test_pipeline_runs_text_last() {
        assert_eq!(MarkerKind::PIPELINE.len(), 5);
        assert_eq!(MarkerKind::PIPELINE[4], MarkerKind::Text);
        assert!(MarkerKind::PIPELINE[..4]
            .iter()
            .all(|kind| kind.target().is_some()));
    }

    #[test]
    fn test_attribute_names_are_distinct() {
        let mut names: Vec<_> = MarkerKind::PIPELINE.iter().map(|k| k.attribute()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 5);
    }

    #[test]
    fn test_escape() {
        assert_eq!(MarkerKind::ContentAttr.escape(r#"A & "B""#), "A &amp; &quot;B&quot;");
        assert_eq!(MarkerKind::AriaLabelAttr.escape(r#"A & "B""#), "A & &quot;B&quot;");
        assert_eq!(MarkerKind::DataTextAttr.escape(r#"say "hi""#), "say &quot;hi&quot;");
        assert_eq!(MarkerKind::HrefAttr.escape("/a?b=1&c=2"), "/a?b=1&c=2");
        assert_eq!(MarkerKind::HrefAttr.escape(r#"/a"b"#), r#"/a"b"#);
        assert_eq!(MarkerKind::Text.escape("<strong>x</strong>"), "<strong>x</strong>");
    }

    // ==================== Find Tests ====================

    #[test]
    fn test_find_text_marker() {
        let html = r#"<p><a class="x" data-i18n="nav.home">Home</a></p>"#;
        let found = MarkerKind::Text.find(html);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].key, "nav.home");
        assert_eq!(&html[found[0].value.clone()], "Home");
    }

    #[test]
    fn test_find_ignores_other_kinds() {
        let html = r#"<meta data-i18n-content="seo.desc" content="Old">"#;
        assert!(MarkerKind::Text.find(html).is_empty());
        assert!(MarkerKind::AriaLabelAttr.find(html).is_empty());
        assert_eq!(MarkerKind::ContentAttr.find(html).len(), 1);
    }

    #[test]
    fn test_find_attribute_without_target() {
        let html = r#"<button data-i18n-aria-label="menu.open">x</button>"#;
        assert!(MarkerKind::AriaLabelAttr.find(html).is_empty());
    }

    #[test]
    fn test_find_does_not_cross_tags() {
        let html = r#"<span data-i18n-aria-label="k"></span><button aria-label="Open">"#;
        assert!(MarkerKind::AriaLabelAttr.find(html).is_empty());
    }

    #[test]
    fn test_find_href_both_orders() {
        let html = r#"<a data-i18n-href="link.cv" href="/cv.pdf">CV</a>
<a href="/en.pdf" class="b" data-i18n-href="link.doc">Doc</a>"#;
        let found = MarkerKind::HrefAttr.find(html);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].key, "link.cv");
        assert_eq!(&html[found[0].value.clone()], "/cv.pdf");
        assert_eq!(found[1].key, "link.doc");
        assert_eq!(&html[found[1].value.clone()], "/en.pdf");
    }

    #[test]
    fn test_content_marker_does_not_match_data_content() {
        let html = r#"<meta data-i18n-content="k" data-content="no" content="yes">"#;
        let found = MarkerKind::ContentAttr.find(html);
        assert_eq!(found.len(), 1);
        assert_eq!(&html[found[0].value.clone()], "yes");
    }

    // ==================== Pass Tests ====================

    #[test]
    fn test_text_pass_replaces_and_keeps_marker() {
        let html = r#"<a data-i18n="nav.home">Home</a>"#;
        let outcome = apply_pass(MarkerKind::Text, html, &table(&[("nav.home", "Domů")]));
        assert_eq!(outcome.html, r#"<a data-i18n="nav.home">Domů</a>"#);
        assert_eq!(outcome.replaced, 1);
        assert_eq!(outcome.missing, 0);
    }

    #[test]
    fn test_text_pass_allows_markup_in_value() {
        let html = r#"<p data-i18n="about.lead">Hi</p>"#;
        let outcome = apply_pass(
            MarkerKind::Text,
            html,
            &table(&[("about.lead", "Ahoj <strong>světe</strong>")]),
        );
        assert_eq!(
            outcome.html,
            r#"<p data-i18n="about.lead">Ahoj <strong>světe</strong></p>"#
        );
    }

    #[test]
    fn test_missing_key_is_left_verbatim() {
        let html = r#"<h1 data-i18n="hero.title">Hello</h1><meta data-i18n-content="x" content="y">"#;
        for kind in MarkerKind::PIPELINE {
            let outcome = apply_pass(kind, html, &TranslationTable::new());
            assert_eq!(outcome.html, html, "{:?} changed the document", kind);
            assert_eq!(outcome.replaced, 0);
        }
    }

    #[test]
    fn test_missing_count() {
        let html = r#"<p data-i18n="a">1</p><p data-i18n="b">2</p>"#;
        let outcome = apply_pass(MarkerKind::Text, html, &table(&[("a", "one")]));
        assert_eq!(outcome.html, r#"<p data-i18n="a">one</p><p data-i18n="b">2</p>"#);
        assert_eq!(outcome.replaced, 1);
        assert_eq!(outcome.missing, 1);
    }

    #[test]
    fn test_content_pass_escapes() {
        let html = r#"<meta name="description" data-i18n-content="seo.desc" content="Old">"#;
        let outcome = apply_pass(
            MarkerKind::ContentAttr,
            html,
            &table(&[("seo.desc", r#"Tom & "Jerry""#)]),
        );
        assert_eq!(
            outcome.html,
            r#"<meta name="description" data-i18n-content="seo.desc" content="Tom &amp; &quot;Jerry&quot;">"#
        );
    }

    #[test]
    fn test_data_text_pass() {
        let html = r#"<span class="glitch" data-i18n-data-text="hero.name" data-text="Hi">Hi</span>"#;
        let outcome = apply_pass(MarkerKind::DataTextAttr, html, &table(&[("hero.name", "Ahoj")]));
        assert_eq!(
            outcome.html,
            r#"<span class="glitch" data-i18n-data-text="hero.name" data-text="Ahoj">Hi</span>"#
        );
    }

    #[test]
    fn test_aria_label_pass() {
        let html = r#"<button data-i18n-aria-label="menu.toggle" type="button" aria-label="Toggle menu"></button>"#;
        let outcome = apply_pass(
            MarkerKind::AriaLabelAttr,
            html,
            &table(&[("menu.toggle", "Přepnout \"menu\"")]),
        );
        assert!(outcome
            .html
            .contains(r#"aria-label="Přepnout &quot;menu&quot;""#));
    }

    #[test]
    fn test_href_pass_both_orders_verbatim() {
        let html = r#"<a data-i18n-href="cv" href="/cv-en.pdf">CV</a><a href="/cv-en.pdf" data-i18n-href="cv">CV</a>"#;
        let outcome = apply_pass(MarkerKind::HrefAttr, html, &table(&[("cv", "/cv-cs.pdf?a=1&b=2")]));
        assert_eq!(
            outcome.html,
            r#"<a data-i18n-href="cv" href="/cv-cs.pdf?a=1&b=2">CV</a><a href="/cv-cs.pdf?a=1&b=2" data-i18n-href="cv">CV</a>"#
        );
        assert_eq!(outcome.replaced, 2);
    }

    #[test]
    fn test_href_pass_does_not_escape_quotes() {
        let html = r#"<a data-i18n-href="cv" href="/cv-en.pdf">CV</a>"#;
        let outcome = apply_pass(MarkerKind::HrefAttr, html, &table(&[("cv", r#"/a"b"#)]));
        assert_eq!(outcome.html, r#"<a data-i18n-href="cv" href="/a"b">CV</a>"#);
    }

    #[test]
    fn test_pass_does_not_rescan_translated_value() {
        let html = r#"<p data-i18n="a">x</p>"#;
        let outcome = apply_pass(
            MarkerKind::Text,
            html,
            &table(&[("a", r#"<b data-i18n="b">y</b>"#), ("b", "NOPE")]),
        );
        assert_eq!(outcome.html, r#"<p data-i18n="a"><b data-i18n="b">y</b></p>"#);
        assert_eq!(outcome.replaced, 1);
    }

    // ==================== Pipeline Tests ====================

    #[test]
    fn test_apply_markers_all_kinds() {
        let html = r#"<meta data-i18n-content="seo.desc" content="Old">
<a data-i18n="nav.home" data-i18n-aria-label="nav.home_label" aria-label="Go home" data-i18n-href="nav.home_href" href="/">Home</a>"#;
        let translations = table(&[
            ("seo.desc", "Nový"),
            ("nav.home", "Domů"),
            ("nav.home_label", "Jít domů"),
            ("nav.home_href", "/cs/"),
        ]);
        let mut metrics = RewriteMetrics::new();
        let result = apply_markers(html, &translations, &mut metrics);

        assert!(result.contains(r#"content="Nový""#));
        assert!(result.contains(r#"aria-label="Jít domů""#));
        assert!(result.contains(r#"href="/cs/""#));
        assert!(result.contains(">Domů</a>"));
        assert_eq!(metrics.replaced(), 4);
        assert_eq!(metrics.missing(), 0);
    }

    #[test]
    fn test_apply_markers_empty_document() {
        let mut metrics = RewriteMetrics::new();
        assert_eq!(apply_markers("", &TranslationTable::new(), &mut metrics), "");
        assert_eq!(metrics.replaced(), 0);
    }

    // ==================== Strip Tests ====================

    #[test]
    fn test_strip_markers_example() {
        let html = r#"<a data-i18n="nav.home">Domů</a>"#;
        assert_eq!(strip_markers(html), "<a>Domů</a>");
    }

    #[test]
    fn test_strip_all_kinds() {
        let html = r#"<a class="x" data-i18n="a" data-i18n-content="b" data-i18n-data-text="c" data-i18n-aria-label="d" data-i18n-href="e" href="/">x</a>"#;
        let stripped = strip_markers(html);
        assert_eq!(stripped, r#"<a class="x" href="/">x</a>"#);
        for kind in MarkerKind::PIPELINE {
            assert!(!stripped.contains(kind.attribute()));
        }
    }

    #[test]
    fn test_strip_keeps_target_attributes() {
        let html = "<span\n    data-i18n-data-text=\"k\"\n    data-text=\"Hi\">Hi</span>";
        assert_eq!(strip_markers(html), "<span\n    data-text=\"Hi\">Hi</span>");
    }

    #[test]
    fn test_strip_is_idempotent() {
        let html = r#"<p data-i18n="a" id="x">t</p>"#;
        let once = strip_markers(html);
        assert_eq!(strip_markers(&once), once);
    }
}
