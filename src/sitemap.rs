//! Multilingual sitemap derived from the locale registry.

use crate::i18n::LocaleRegistry;
use chrono::{NaiveDate, Utc};

/// File name the sitemap is emitted under
pub const SITEMAP_FILE: &str = "sitemap.xml";

const PRIORITY_DEFAULT: &str = "1.0";
const PRIORITY_OTHER: &str = "0.9";

/// Escape text for an XML attribute or element body.
fn xml_escape(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '&' => "&amp;".to_string(),
            '<' => "&lt;".to_string(),
            '>' => "&gt;".to_string(),
            '"' => "&quot;".to_string(),
            _ => c.to_string(),
        })
        .collect()
}

/// Generate `sitemap.xml` with one `<url>` per locale.
///
/// Each entry lists every locale (plus `x-default`) as an `xhtml:link`
/// alternate. The default locale gets priority 1.0, every other 0.9.
pub fn generate_sitemap(registry: &LocaleRegistry, lastmod: NaiveDate) -> String {
    let lastmod = lastmod.format("%Y-%m-%d").to_string();

    let alternates: String = registry
        .alternates()
        .iter()
        .map(|(lang, url)| {
            format!(
                "    <xhtml:link rel=\"alternate\" hreflang=\"{}\" href=\"{}\" />\n",
                xml_escape(lang),
                xml_escape(url)
            )
        })
        .collect();

    let urls: String = registry
        .locales()
        .iter()
        .map(|locale| {
            let priority = if registry.is_default(locale) {
                PRIORITY_DEFAULT
            } else {
                PRIORITY_OTHER
            };
            format!(
                "  <url>\n    <loc>{}</loc>\n{}    <lastmod>{}</lastmod>\n    <priority>{}</priority>\n  </url>\n",
                xml_escape(&registry.canonical_url(locale)),
                alternates,
                lastmod,
                priority
            )
        })
        .collect();

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9"
        xmlns:xhtml="http://www.w3.org/1999/xhtml">
{}</urlset>
"#,
        urls
    )
}

/// Generate the sitemap stamped with today's UTC date.
pub fn generate_sitemap_today(registry: &LocaleRegistry) -> String {
    generate_sitemap(registry, Utc::now().date_naive())
}
