//! Locale-specific document metadata.
//!
//! Single-value fields (`<html lang>`, `og:locale`, canonical link, `og:url`,
//! `twitter:url`) are rewritten in place and only when the template already
//! carries them. Multi-value content (hreflang alternates and the SEO title
//! data block) is injected right before `</head>`, which must exist.

use crate::error::{LocalizeError, Result};
use crate::i18n::{LocaleConfig, LocaleRegistry, TranslationTable};
use regex::{Captures, Regex};
use serde_json::json;
use std::sync::OnceLock;

/// Element id of the injected SEO title data block
pub const SEO_DATA_ID: &str = "i18n-seo-data";

const HEAD_END: &str = "</head>";

static HTML_LANG_REGEX: OnceLock<Regex> = OnceLock::new();
static OG_LOCALE_REGEX: OnceLock<Regex> = OnceLock::new();
static CANONICAL_REGEX: OnceLock<Regex> = OnceLock::new();
static OG_URL_REGEX: OnceLock<Regex> = OnceLock::new();
static TWITTER_URL_REGEX: OnceLock<Regex> = OnceLock::new();

fn cached(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("metadata pattern is a valid regex"))
}

/// Replace the value between capture groups 1 and 2 of the first match.
fn replace_first_value(regex: &Regex, html: &str, value: &str) -> String {
    regex
        .replacen(html, 1, |caps: &Captures| {
            format!("{}{}{}", &caps[1], value, &caps[2])
        })
        .into_owned()
}

/// Set `<html lang="...">` to the locale's language value.
pub fn set_html_lang(html: &str, locale: &LocaleConfig) -> String {
    let regex = cached(&HTML_LANG_REGEX, r#"(<html\s+lang=")[^"]*(")"#);
    replace_first_value(regex, html, &locale.html_lang)
}

/// Set `<meta property="og:locale" content="...">`.
pub fn set_og_locale(html: &str, locale: &LocaleConfig) -> String {
    let regex = cached(
        &OG_LOCALE_REGEX,
        r#"(<meta\s+property="og:locale"\s+content=")[^"]*(")"#,
    );
    replace_first_value(regex, html, &locale.og_locale)
}

/// Point the canonical link, `og:url` and `twitter:url` at `url`.
pub fn set_page_urls(html: &str, url: &str) -> String {
    let canonical = cached(
        &CANONICAL_REGEX,
        r#"(<link\s+rel="canonical"\s+href=")[^"]*(")"#,
    );
    let og_url = cached(
        &OG_URL_REGEX,
        r#"(<meta\s+property="og:url"\s+content=")[^"]*(")"#,
    );
    let twitter_url = cached(
        &TWITTER_URL_REGEX,
        r#"(<meta\s+property="twitter:url"\s+content=")[^"]*(")"#,
    );

    let html = replace_first_value(canonical, html, url);
    let html = replace_first_value(og_url, &html, url);
    replace_first_value(twitter_url, &html, url)
}

/// Insert `block` on its own line(s) right before the first `</head>`.
fn insert_before_head_end(html: &str, block: &str, locale: &LocaleConfig) -> Result<String> {
    let index = html
        .find(HEAD_END)
        .ok_or_else(|| LocalizeError::MissingHeadTerminator {
            locale: locale.code.clone(),
        })?;

    let mut output = String::with_capacity(html.len() + block.len() + 1);
    output.push_str(&html[..index]);
    output.push_str(block);
    output.push('\n');
    output.push_str(&html[index..]);
    Ok(output)
}

/// Render the hreflang alternates: one per locale, then `x-default`.
pub fn hreflang_block(registry: &LocaleRegistry) -> String {
    registry
        .alternates()
        .iter()
        .map(|(lang, url)| {
            format!(
                r#"    <link rel="alternate" hreflang="{}" href="{}">"#,
                lang, url
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Inject the hreflang alternates before `</head>`.
pub fn inject_hreflang(
    html: &str,
    registry: &LocaleRegistry,
    locale: &LocaleConfig,
) -> Result<String> {
    insert_before_head_end(html, &hreflang_block(registry), locale)
}

/// Render the SEO title data block read by the page's title switcher.
pub fn seo_data_block(translations: &TranslationTable) -> String {
    let titles = json!({
        "title_about": translations.get("seo.title_about").unwrap_or_default(),
        "title_projects": translations.get("seo.title_projects").unwrap_or_default(),
        "title_contact": translations.get("seo.title_contact").unwrap_or_default(),
    });

    // Keep the script element closed where we close it.
    let body = titles.to_string().replace("</", "<\\/");
    format!(
        r#"    <script id="{}" type="application/json">{}</script>"#,
        SEO_DATA_ID, body
    )
}

/// Inject the SEO title data block before `</head>`.
pub fn inject_seo_data(
    html: &str,
    translations: &TranslationTable,
    locale: &LocaleConfig,
) -> Result<String> {
    insert_before_head_end(html, &seo_data_block(translations), locale)
}

/// Apply every metadata rewrite for `locale`.
///
/// # Errors
/// `MissingHeadTerminator` if the document has no `</head>`.
pub fn rewrite_metadata(
    html: &str,
    registry: &LocaleRegistry,
    locale: &LocaleConfig,
    translations: &TranslationTable,
) -> Result<String> {
    let url = registry.canonical_url(locale);

    let html = set_html_lang(html, locale);
    let html = set_og_locale(&html, locale);
    let html = set_page_urls(&html, &url);
    let html = inject_hreflang(&html, registry, locale)?;
    inject_seo_data(&html, translations, locale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::test_registry;

    const TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta property="og:locale" content="en_US">
    <meta property="og:url" content="https://old.test/">
    <meta property="twitter:url" content="https://old.test/">
    <link rel="canonical" href="https://old.test/">
</head>
<body></body>
</html>"#;

    // ==================== Single-Value Field Tests ====================

    #[test]
    fn test_set_html_lang() {
        let registry = test_registry();
        let cs = registry.get_by_code("cs").unwrap();
        let html = set_html_lang(TEMPLATE, cs);
        assert!(html.contains(r#"<html lang="cs">"#));
    }

    #[test]
    fn test_set_og_locale() {
        let registry = test_registry();
        let cs = registry.get_by_code("cs").unwrap();
        let html = set_og_locale(TEMPLATE, cs);
        assert!(html.contains(r#"<meta property="og:locale" content="cs_CZ">"#));
    }

    #[test]
    fn test_og_locale_alternate_untouched() {
        let registry = test_registry();
        let cs = registry.get_by_code("cs").unwrap();
        let html = r#"<meta property="og:locale:alternate" content="en_US">"#;
        assert_eq!(set_og_locale(html, cs), html);
    }

    #[test]
    fn test_set_page_urls() {
        let html = set_page_urls(TEMPLATE, "https://example.test/cs/");
        assert!(html.contains(r#"<link rel="canonical" href="https://example.test/cs/">"#));
        assert!(html.contains(r#"<meta property="og:url" content="https://example.test/cs/">"#));
        assert!(
            html.contains(r#"<meta property="twitter:url" content="https://example.test/cs/">"#)
        );
        assert!(!html.contains("old.test"));
    }

    #[test]
    fn test_url_with_dollar_sign_is_literal() {
        let html = set_page_urls(TEMPLATE, "https://example.test/$1/");
        assert!(html.contains(r#"href="https://example.test/$1/""#));
    }

    #[test]
    fn test_absent_fields_are_not_invented() {
        let html = "<html><head></head></html>";
        let registry = test_registry();
        let cs = registry.get_by_code("cs").unwrap();
        assert_eq!(set_html_lang(html, cs), html);
        assert_eq!(set_page_urls(html, "https://example.test/cs/"), html);
    }

    // ==================== Injection Tests ====================

    #[test]
    fn test_hreflang_block() {
        let block = hreflang_block(&test_registry());
        let lines: Vec<_> = block.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            r#"    <link rel="alternate" hreflang="en" href="https://example.test/">"#
        );
        assert_eq!(
            lines[1],
            r#"    <link rel="alternate" hreflang="cs" href="https://example.test/cs/">"#
        );
        assert_eq!(
            lines[2],
            r#"    <link rel="alternate" hreflang="x-default" href="https://example.test/">"#
        );
    }

    #[test]
    fn test_inject_hreflang_before_head_end() {
        let registry = test_registry();
        let html = inject_hreflang(TEMPLATE, &registry, registry.default_locale()).unwrap();
        assert!(html.contains(
            "hreflang=\"x-default\" href=\"https://example.test/\">\n</head>"
        ));
    }

    #[test]
    fn test_missing_head_terminator_is_fatal() {
        let registry = test_registry();
        let cs = registry.get_by_code("cs").unwrap();
        let err = inject_hreflang("<html><body></body></html>", &registry, cs).unwrap_err();
        assert!(matches!(err, LocalizeError::MissingHeadTerminator { ref locale } if locale == "cs"));
    }

    #[test]
    fn test_seo_data_block() {
        let translations: TranslationTable = [
            ("seo.title_about", "O mně"),
            ("seo.title_projects", "Projekty"),
        ]
        .into_iter()
        .collect();

        let block = seo_data_block(&translations);
        assert_eq!(
            block,
            r#"    <script id="i18n-seo-data" type="application/json">{"title_about":"O mně","title_projects":"Projekty","title_contact":""}</script>"#
        );
    }

    #[test]
    fn test_seo_data_block_cannot_close_script() {
        let translations: TranslationTable = [("seo.title_about", "</script><b>")]
            .into_iter()
            .collect();
        let block = seo_data_block(&translations);
        assert_eq!(block.matches("</script>").count(), 1);
    }

    // ==================== Full Rewrite Tests ====================

    #[test]
    fn test_rewrite_metadata_for_secondary_locale() {
        let registry = test_registry();
        let cs = registry.get_by_code("cs").unwrap();
        let html = rewrite_metadata(TEMPLATE, &registry, cs, &TranslationTable::new()).unwrap();

        assert!(html.contains(r#"<html lang="cs">"#));
        assert!(html.contains(r#"<link rel="canonical" href="https://example.test/cs/">"#));
        assert_eq!(html.matches(r#"rel="alternate""#).count(), 3);
        assert!(html.contains(r#"<script id="i18n-seo-data""#));
        assert!(html.find(r#"id="i18n-seo-data""#) > html.find(r#"hreflang="x-default""#));
    }
}
