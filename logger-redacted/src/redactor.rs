#![allow(clippy::expect_used)]

use crate::config::LoggerConfig;
use base64::{engine::general_purpose, Engine as _};
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use sha2::{Digest, Sha256};

lazy_static! {
    static ref EMAIL_REGEX: Regex =
        Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").expect("email pattern");
    static ref CARD_REGEX: Regex =
        Regex::new(r"\b(?:\d{4}[-\s]?){3}\d{4}\b").expect("card pattern");
    // Old style 9 digits + V/X, new style 12 digits
    static ref NATIONAL_ID_REGEX: Regex =
        Regex::new(r"\b(?:\d{9}[VvXx]|\d{12})\b").expect("national id pattern");
    static ref PHONE_REGEX: Regex =
        Regex::new(r"(?:\+94[-\s]?|\b0)\d{2}[-\s]?\d{3}[-\s]?\d{4}\b").expect("phone pattern");
    static ref IP_REGEX: Regex =
        Regex::new(r"\b(?:\d{1,3}\.){3}\d{1,3}\b").expect("ip pattern");
}

/// Kinds of personal data the redactor recognises
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PiiKind {
    Email,
    CardNumber,
    NationalId,
    Phone,
    IpAddress,
}

impl PiiKind {
    fn tag(self) -> &'static str {
        match self {
            PiiKind::Email => "EMAIL",
            PiiKind::CardNumber => "CARD",
            PiiKind::NationalId => "NIC",
            PiiKind::Phone => "PHONE",
            PiiKind::IpAddress => "IP",
        }
    }

    fn pattern(self) -> &'static Regex {
        match self {
            PiiKind::Email => &EMAIL_REGEX,
            PiiKind::CardNumber => &CARD_REGEX,
            PiiKind::NationalId => &NATIONAL_ID_REGEX,
            PiiKind::Phone => &PHONE_REGEX,
            PiiKind::IpAddress => &IP_REGEX,
        }
    }
}

// Longer digit runs first so a card number is not half-eaten as an id
const SCAN_ORDER: [PiiKind; 5] = [
    PiiKind::Email,
    PiiKind::CardNumber,
    PiiKind::NationalId,
    PiiKind::Phone,
    PiiKind::IpAddress,
];

/// Scrubs personal data out of free text before it reaches a log sink.
///
/// Database errors echo the offending statement, and statements carry
/// patient contact details, so anything derived from a driver error goes
/// through here first.
#[derive(Debug, Clone)]
pub struct PiiRedactor {
    enabled: bool,
    hash_for_correlation: bool,
}

impl Default for PiiRedactor {
    fn default() -> Self {
        Self::from_config(&LoggerConfig::default())
    }
}

impl PiiRedactor {
    pub fn from_config(config: &LoggerConfig) -> Self {
        Self {
            enabled: config.redaction_enabled,
            hash_for_correlation: config.hash_for_correlation,
        }
    }

    /// A redactor that passes text through untouched
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            hash_for_correlation: false,
        }
    }

    pub fn redact(&self, text: &str) -> String {
        if !self.enabled {
            return text.to_string();
        }

        SCAN_ORDER.iter().fold(text.to_string(), |acc, kind| {
            kind.pattern()
                .replace_all(&acc, |caps: &Captures| {
                    self.replacement(*kind, caps.get(0).map_or("", |m| m.as_str()))
                })
                .into_owned()
        })
    }

    fn replacement(&self, kind: PiiKind, value: &str) -> String {
        if self.hash_for_correlation {
            return format!("{}[{}]", kind.tag(), hash_value(value));
        }

        match kind {
            PiiKind::Email => match value.split_once('@') {
                Some((local, domain)) => format!(
                    "{}***@{}***",
                    local.chars().next().unwrap_or('*'),
                    domain.chars().next().unwrap_or('*')
                ),
                None => "***@***".to_string(),
            },
            PiiKind::CardNumber => {
                let digits: String = value.chars().filter(char::is_ascii_digit).collect();
                let last4 = digits.get(digits.len().saturating_sub(4)..).unwrap_or("");
                format!("****-****-****-{last4}")
            }
            PiiKind::IpAddress => match value.split('.').next() {
                Some(first) => format!("{first}.***.***.***"),
                None => "***.***.***.***".to_string(),
            },
            PiiKind::NationalId | PiiKind::Phone => format!("[{}]", kind.tag()),
        }
    }
}

fn hash_value(value: &str) -> String {
    let digest = Sha256::digest(value.as_bytes());
    general_purpose::STANDARD_NO_PAD.encode(digest.get(..8).unwrap_or_default())
}
