//! JSON-LD structured-data overlay.
//!
//! The template embeds one `<script type="application/ld+json">` object
//! describing the page owner. Three of its fields have translations:
//!
//! | Field | Translation key |
//! |-------|-----------------|
//! | `jobTitle` | `schema.jobTitle` |
//! | `description` | `schema.description` |
//! | `worksFor.name` | `schema.worksFor` |
//!
//! A payload that does not parse as a JSON object is passed through as-is.

use crate::i18n::TranslationTable;
use regex::Regex;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Serializer, Value};
use std::sync::OnceLock;
use tracing::warn;

static LD_JSON_REGEX: OnceLock<Regex> = OnceLock::new();

/// Indentation of the re-serialized payload
const JSON_INDENT: &[u8] = b"      ";
/// Prefix added to every payload line so it sits inside the script element
const LINE_PREFIX: &str = "    ";

/// Result of overlaying translations onto the structured-data payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructuredDataOutcome {
    /// The payload was rewritten with this many translated fields
    Updated { html: String, fields: usize },
    /// No payload, or no translation applied: the document is unchanged
    Unchanged,
    /// The payload is not a JSON object: the document is unchanged
    Unparseable,
}

/// Overlay translated fields onto an already parsed payload.
///
/// Returns the number of fields written.
pub fn overlay_fields(data: &mut Value, translations: &TranslationTable) -> usize {
    let Some(object) = data.as_object_mut() else {
        return 0;
    };
    let mut fields = 0;

    if let Some(job_title) = translations.get_non_empty("schema.jobTitle") {
        object.insert("jobTitle".to_string(), Value::from(job_title));
        fields += 1;
    }
    if let Some(description) = translations.get_non_empty("schema.description") {
        object.insert("description".to_string(), Value::from(description));
        fields += 1;
    }
    if let Some(works_for) = translations.get_non_empty("schema.worksFor") {
        if let Some(Value::Object(employer)) = object.get_mut("worksFor") {
            employer.insert("name".to_string(), Value::from(works_for));
            fields += 1;
        }
    }

    fields
}

/// Serialize with 6-space indentation, every line after the first prefixed
/// so the payload lines up inside its script element.
fn render_payload(data: &Value) -> Option<String> {
    let mut buffer = Vec::new();
    let mut serializer =
        Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(JSON_INDENT));
    data.serialize(&mut serializer).ok()?;
    let json = String::from_utf8(buffer).ok()?;
    // Keep the script element closed where we close it.
    let json = json.replace("</", "<\\/");
    Some(json.replace('\n', &format!("\n{}", LINE_PREFIX)))
}

/// Overlay translations onto the first JSON-LD payload in `html`.
pub fn rewrite_structured_data(
    html: &str,
    translations: &TranslationTable,
) -> StructuredDataOutcome {
    let regex = LD_JSON_REGEX.get_or_init(|| {
        Regex::new(r#"(?s)(<script\s+type="application/ld\+json">)(.*?)(</script>)"#)
            .expect("structured data pattern is a valid regex")
    });

    let Some(caps) = regex.captures(html) else {
        return StructuredDataOutcome::Unchanged;
    };
    let (Some(open_tag), Some(body), Some(close_tag)) = (caps.get(1), caps.get(2), caps.get(3))
    else {
        return StructuredDataOutcome::Unchanged;
    };

    let mut data: Value = match serde_json::from_str(body.as_str()) {
        Ok(value @ Value::Object(_)) => value,
        Ok(_) => {
            warn!("Structured data payload is not a JSON object, leaving it unchanged");
            return StructuredDataOutcome::Unparseable;
        }
        Err(e) => {
            warn!("Failed to parse structured data payload, leaving it unchanged: {}", e);
            return StructuredDataOutcome::Unparseable;
        }
    };

    let fields = overlay_fields(&mut data, translations);
    if fields == 0 {
        return StructuredDataOutcome::Unchanged;
    }

    let Some(payload) = render_payload(&data) else {
        return StructuredDataOutcome::Unchanged;
    };

    let mut output = String::with_capacity(html.len() + payload.len());
    output.push_str(&html[..open_tag.end()]);
    output.push('\n');
    output.push_str(LINE_PREFIX);
    output.push_str(&payload);
    output.push('\n');
    output.push_str(LINE_PREFIX);
    output.push_str(&html[close_tag.start()..]);

    StructuredDataOutcome::Updated {
        html: output,
        fields,
    }
}
