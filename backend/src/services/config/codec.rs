//! Reader and writer for the sectioned campaign `.conf` format.
//!
//! ```text
//! [constants]
//! campid: CAMP123
//!
//! [metadata]
//! column : USERID
//!
//! [msghdrs]
//! From    :sender@example.com
//! ```
//!
//! The reader is permissive: comments, unknown sections and lines it does not
//! recognise are dropped without a diagnostic, because these files are
//! maintained by hand. The writer is canonicalising: it always emits the six
//! known sections in a fixed order, so anything the reader dropped is gone
//! after a round trip.

use common::model::config::{CampaignConfig, DEFAULT_NAMESPACE_CONSTANT};

/// Minimum width of the header name column in `[msghdrs]`.
const HEADER_KEY_WIDTH: usize = 8;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Section {
    Constants,
    Metadata,
    Template,
    MsgHdrs,
    Attachments,
    Namespace,
    Unknown,
}

impl Section {
    fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "constants" => Section::Constants,
            "metadata" => Section::Metadata,
            "template" => Section::Template,
            "msghdrs" => Section::MsgHdrs,
            "attachments" => Section::Attachments,
            "namespace" => Section::Namespace,
            _ => Section::Unknown,
        }
    }
}

/// Splits `line` on the first `:` into trimmed key and value.
fn split_kv(line: &str) -> Option<(&str, &str)> {
    line.split_once(':').map(|(k, v)| (k.trim(), v.trim()))
}

fn starts_with_ignore_case(line: &str, prefix: &str) -> bool {
    line.len() >= prefix.len()
        && line.is_char_boundary(prefix.len())
        && line[..prefix.len()].eq_ignore_ascii_case(prefix)
}

/// Value of `line` if it starts with `prefix` (any case) and has a `:`.
fn prefixed_value<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    if starts_with_ignore_case(line, prefix) {
        split_kv(line).map(|(_, v)| v)
    } else {
        None
    }
}

/// Parses `.conf` text into a [`CampaignConfig`] for `campaign_id`.
pub fn parse(text: &str, campaign_id: &str) -> CampaignConfig {
    let mut config = CampaignConfig::new(campaign_id);
    let mut constant: Option<String> = None;
    let mut namespace: Option<String> = None;
    let mut section: Option<Section> = None;

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.len() >= 2 && line.starts_with('[') && line.ends_with(']') {
            section = Some(Section::from_name(&line[1..line.len() - 1]));
            continue;
        }

        let Some(current) = section else {
            continue;
        };

        match current {
            Section::Constants => {
                if let Some((key, value)) = split_kv(line) {
                    if key.eq_ignore_ascii_case("campid") {
                        constant = Some(value.to_string());
                    }
                }
            }
            Section::Metadata => {
                if let Some(value) = prefixed_value(line, "column") {
                    config.metadata_columns.push(value.to_string());
                }
            }
            Section::Template => {
                if let Some(value) = prefixed_value(line, "path") {
                    config.template_path = Some(value.to_string());
                }
            }
            Section::MsgHdrs => {
                if let Some((key, value)) = split_kv(line) {
                    // IndexMap keeps the first-seen position and takes the last value.
                    config
                        .message_headers
                        .insert(key.to_string(), value.to_string());
                }
            }
            Section::Attachments => {
                if let Some(value) = prefixed_value(line, "dir") {
                    config.attachment_dir = Some(value.to_string());
                }
            }
            Section::Namespace => {
                if let Some(value) = prefixed_value(line, "constant") {
                    namespace = Some(value.to_string());
                }
            }
            Section::Unknown => {}
        }
    }

    config.constant_campaign_id = constant.unwrap_or_else(|| campaign_id.to_string());
    config.namespace_constant =
        namespace.unwrap_or_else(|| DEFAULT_NAMESPACE_CONSTANT.to_string());
    config
}

/// Renders `config` in canonical section order.
///
/// Absent `template_path` / `attachment_dir` leave their section empty rather
/// than writing a placeholder value.
pub fn serialize(config: &CampaignConfig) -> String {
    let mut out: Vec<String> = Vec::new();

    out.push("# constants used by metadata section".into());
    out.push("[constants]".into());
    out.push(format!("campid: {}", config.constant_campaign_id));
    out.push(String::new());

    out.push("# the metadata section".into());
    out.push("[metadata]".into());
    for column in &config.metadata_columns {
        out.push(format!("column : {}", column));
    }
    out.push(String::new());

    out.push("# message template relative path".into());
    out.push("[template]".into());
    if let Some(path) = &config.template_path {
        out.push(format!("path : {}", path));
    }
    out.push(String::new());

    out.push("# message headers".into());
    out.push("[msghdrs]".into());
    for (key, value) in &config.message_headers {
        out.push(format!("{:<width$}:{}", key, value, width = HEADER_KEY_WIDTH));
    }
    out.push(String::new());

    out.push("# attachment dir relative path".into());
    out.push("[attachments]".into());
    if let Some(dir) = &config.attachment_dir {
        out.push(format!("dir : {}", dir));
    }
    out.push(String::new());

    out.push("# namespace for memcached".into());
    out.push("[namespace]".into());
    out.push(format!("constant : {}", config.namespace_constant));
    out.push(String::new());

    let mut text = out.join("\n");
    text.push('\n');
    text
}
