use crate::error::IdFormatError;
use std::cmp::Ordering;
use std::fmt;

/// Prefix length and seed of refund identifiers (`r0001`, `r0002`, ...)
pub const REFUND_ID_PREFIX_LEN: usize = 1;
pub const REFUND_ID_SEED: &str = "r0001";

/// A stored identifier split into a fixed prefix and a zero-padded counter,
/// e.g. `app036` is prefix `app`, number 36, width 3.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequentialId {
    prefix: String,
    number: u64,
    width: usize,
}

impl SequentialId {
    /// Split `value` after `prefix_len` characters and parse the remainder.
    ///
    /// # Errors
    ///
    /// Fails when nothing follows the prefix or the remainder is not a
    /// plain decimal number.
    pub fn parse(value: &str, prefix_len: usize) -> Result<Self, IdFormatError> {
        let split = value
            .char_indices()
            .nth(prefix_len)
            .map(|(idx, _)| idx)
            .ok_or_else(|| IdFormatError::MissingSuffix {
                id: value.to_string(),
                prefix_len,
            })?;
        let (prefix, digits) = value.split_at(split);

        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(IdFormatError::NonNumericSuffix { id: value.to_string() });
        }
        let number = digits
            .parse::<u64>()
            .map_err(|_| IdFormatError::Overflow { id: value.to_string() })?;

        Ok(Self {
            prefix: prefix.to_string(),
            number,
            width: digits.len(),
        })
    }

    /// The following identifier, keeping prefix and padding width. The
    /// width only grows once the counter outgrows it (`r9999` → `r10000`).
    ///
    /// # Errors
    ///
    /// Fails only when the counter is already `u64::MAX`.
    pub fn next(&self) -> Result<Self, IdFormatError> {
        let number = self
            .number
            .checked_add(1)
            .ok_or_else(|| IdFormatError::Overflow { id: self.to_string() })?;
        Ok(Self {
            prefix: self.prefix.clone(),
            number,
            width: self.width,
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn number(&self) -> u64 {
        self.number
    }

    pub fn width(&self) -> usize {
        self.width
    }
}

impl fmt::Display for SequentialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:0width$}", self.prefix, self.number, width = self.width)
    }
}

/// Next identifier after `current_max`, or `seed` when the table is empty.
///
/// # Errors
///
/// Propagates [`SequentialId::parse`] failures for malformed stored ids.
pub fn next_id(current_max: Option<&str>, prefix_len: usize, seed: &str) -> Result<String, IdFormatError> {
    match current_max {
        None => Ok(seed.to_string()),
        Some(max) => Ok(SequentialId::parse(max, prefix_len)?.next()?.to_string()),
    }
}

/// Next refund id given the highest stored one
///
/// # Errors
///
/// Fails with [`IdFormatError`] when the stored id is malformed.
pub fn next_refund_id(current_max: Option<&str>) -> Result<String, IdFormatError> {
    next_id(current_max, REFUND_ID_PREFIX_LEN, REFUND_ID_SEED)
}

/// Order ids of one series by counter value. A widened id (`r10000`) sorts
/// above every narrower one (`r9999`); equal widths compare as text.
pub fn compare_ids(a: &str, b: &str) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}
