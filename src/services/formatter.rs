// src/services/formatter.rs

//! Message formatting.
//!
//! Turns an [`OtpRecord`] into channel-ready text. Formatting is a pure
//! function of the record, the source label and the template settings.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::{FormatConfig, OtpRecord};
use crate::services::countries::flag_for;

/// Sentinel shown when no OTP is found in the message.
pub const OTP_NOT_AVAILABLE: &str = "N/A";

/// Inserted between the visible head and tail of a masked identifier.
pub const MASK_TOKEN: &str = "XXXX";

/// Identifiers shorter than this are shown unmasked.
const MASK_MIN_LEN: usize = 7;
const MASK_HEAD: usize = 5;
const MASK_TAIL: usize = 2;

/// "3-4 digits, optional separator, 3-4 digits" or "4-8 digits".
///
/// Word boundaries are ASCII-only: CJK or Arabic text directly before a
/// code must not hide it.
static OTP_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?-u:\b)[0-9]{3,4}[-\t\n\x0C\r ]?[0-9]{3,4}(?-u:\b)|(?-u:\b)[0-9]{4,8}(?-u:\b)",
    )
    .expect("valid OTP pattern")
});

/// Normalized country with its flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Country {
    pub name: String,
    pub flag: String,
}

impl Country {
    /// Display form, flag first.
    pub fn display(&self) -> String {
        format!("{} {}", self.flag, self.name)
    }
}

/// Renders records using a `{placeholder}` template.
#[derive(Debug, Clone)]
pub struct MessageFormatter {
    template: String,
    footer: String,
    flatten_newlines: bool,
}

impl MessageFormatter {
    /// Create a formatter from template settings.
    pub fn new(config: &FormatConfig, bot_name: &str) -> Self {
        let footer = render(&config.footer, |key| match key {
            "bot_name" => Some(bot_name.to_string()),
            _ => None,
        });

        Self {
            template: config.template.trim().to_string(),
            footer,
            flatten_newlines: config.flatten_newlines,
        }
    }

    /// Format a record reported by `source_label`.
    pub fn format(&self, record: &OtpRecord, source_label: &str) -> String {
        let country = normalize_country(&record.country);
        let message = if self.flatten_newlines {
            record.message.replace("\r\n", " ").replace(['\n', '\r'], " ")
        } else {
            record.message.clone()
        };

        render(&self.template, |key| {
            let value = match key {
                "flag" => country.flag.clone(),
                "service_upper" => record.service.to_uppercase(),
                "source" => source_label.to_string(),
                "time" => record.timestamp.clone(),
                "country" => country.display(),
                "number" => mask_identifier(&record.account),
                "service" => record.service.clone(),
                "otp" => extract_otp(&record.message),
                "message" => message.clone(),
                "footer" => self.footer.clone(),
                _ => return None,
            };
            Some(value)
        })
    }
}

/// Find the first OTP-looking substring in a message body.
pub fn extract_otp(body: &str) -> String {
    OTP_PATTERN
        .find(body)
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| OTP_NOT_AVAILABLE.to_string())
}

/// Hide the middle of an account identifier.
pub fn mask_identifier(id: &str) -> String {
    let chars: Vec<char> = id.chars().collect();
    if chars.len() < MASK_MIN_LEN {
        return id.to_string();
    }

    let head: String = chars[..MASK_HEAD].iter().collect();
    let tail: String = chars[chars.len() - MASK_TAIL..].iter().collect();
    format!("{}{}{}", head, MASK_TOKEN, tail)
}

/// Reduce a country descriptor like `"Pakistan-PTCL"` to a name and flag.
pub fn normalize_country(descriptor: &str) -> Country {
    let name = descriptor
        .split('-')
        .next()
        .and_then(|segment| segment.split_whitespace().next())
        .unwrap_or("Unknown")
        .to_string();
    let flag = flag_for(&name);

    Country { name, flag }
}

/// Single-pass `{key}` substitution; substituted text is never re-scanned.
///
/// Unknown keys and unbalanced braces are copied through literally.
fn render(template: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(template.len() * 2);
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        match after.find('}') {
            Some(close) => {
                let key = &after[..close];
                match lookup(key) {
                    Some(value) => out.push_str(&value),
                    None => {
                        out.push('{');
                        out.push_str(key);
                        out.push('}');
                    }
                }
                rest = &after[close + 1..];
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }

    out.push_str(rest);
    out
}
