//! Prefix allocation.
//!
//! Maps a registrant's product type to a queue prefix and computes the
//! next / previous / reset value for that prefix from the latest number
//! currently stored. Everything here is pure; the store decides which row
//! is "latest" and the server decides when to commit.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{FIRST_SEQUENCE, SEQUENCE_FLOOR, SEQUENCE_WIDTH, UNASSIGNED_SENTINEL};
use crate::error::{QueueError, QueueResult};
use crate::types::ControlAction;

/// A queue prefix. Each one scopes an independent number sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Prefix {
    A,
    B,
    C,
    D,
}

/// Registrant type → prefix. Matching is exact.
const TYPE_TABLE: [(&str, Prefix); 4] = [
    ("iPhone 15 Pro Max", Prefix::A),
    ("iPhone 15 Pro", Prefix::B),
    ("iPhone 15 Plus", Prefix::C),
    ("iPhone 15", Prefix::D),
];

impl Prefix {
    pub const ALL: [Prefix; 4] = [Prefix::A, Prefix::B, Prefix::C, Prefix::D];

    pub fn as_str(&self) -> &'static str {
        match self {
            Prefix::A => "A-",
            Prefix::B => "B-",
            Prefix::C => "C-",
            Prefix::D => "D-",
        }
    }

    /// Classify a registrant type. Unlisted types never fall back to a
    /// default prefix.
    pub fn classify(product_type: &str) -> QueueResult<Self> {
        TYPE_TABLE
            .iter()
            .find(|(name, _)| *name == product_type)
            .map(|(_, prefix)| *prefix)
            .ok_or_else(|| QueueError::InvalidType(product_type.to_string()))
    }

    /// Registrant types mapped to this prefix.
    pub fn product_types(&self) -> impl Iterator<Item = &'static str> + '_ {
        TYPE_TABLE
            .iter()
            .filter(move |(_, prefix)| prefix == self)
            .map(|(name, _)| *name)
    }

    /// Render `sequence` under this prefix, zero padded to at least three
    /// digits. Larger values widen.
    pub fn render(&self, sequence: u32) -> String {
        format!("{}{:0width$}", self.as_str(), sequence, width = SEQUENCE_WIDTH)
    }

    /// Parse the numeric suffix of a stored queue number.
    pub fn sequence_of(&self, value: &str) -> QueueResult<u32> {
        let corrupt = || QueueError::CorruptQueueNumber {
            prefix: self.as_str().to_string(),
            value: value.to_string(),
        };

        let digits = value.strip_prefix(self.as_str()).ok_or_else(corrupt)?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(corrupt());
        }
        digits.parse::<u32>().map_err(|_| corrupt())
    }

    /// Number handed out after `latest`. With no latest (or a blank one) the
    /// sequence starts at `001`.
    pub fn next_number(&self, latest: Option<&str>) -> QueueResult<String> {
        match latest.filter(|v| !is_unassigned(v)) {
            None => Ok(self.render(FIRST_SEQUENCE)),
            Some(value) => {
                let current = self.sequence_of(value)?;
                let next = current.checked_add(1).ok_or_else(|| QueueError::CorruptQueueNumber {
                    prefix: self.as_str().to_string(),
                    value: value.to_string(),
                })?;
                Ok(self.render(next))
            }
        }
    }

    /// Number one below `latest`, clamped at `001`.
    pub fn prev_number(&self, latest: &str) -> QueueResult<String> {
        let current = self.sequence_of(latest)?;
        Ok(self.render(current.saturating_sub(1).max(SEQUENCE_FLOOR)))
    }

    pub fn reset_number(&self) -> String {
        self.render(0)
    }

    /// New value of the latest row under this prefix after `action`.
    pub fn apply(&self, action: ControlAction, latest: &str) -> QueueResult<String> {
        match action {
            ControlAction::Increment => self.next_number(Some(latest)),
            ControlAction::Decrement => self.prev_number(latest),
            ControlAction::Reset => Ok(self.reset_number()),
            ControlAction::Delete => Ok(delete_sentinel().to_string()),
        }
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Prefix {
    type Err = QueueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Prefix::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| QueueError::BadRequest(format!("unknown prefix {s:?}")))
    }
}

impl TryFrom<String> for Prefix {
    type Error = QueueError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Prefix> for String {
    fn from(prefix: Prefix) -> Self {
        prefix.as_str().to_string()
    }
}

/// Value stored when an admin clears the latest number of a prefix.
pub fn delete_sentinel() -> &'static str {
    UNASSIGNED_SENTINEL
}

/// A queue number is unassigned when it is empty after trimming.
pub fn is_unassigned(value: &str) -> bool {
    value.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_covers_every_table_entry() {
        assert_eq!(Prefix::classify("iPhone 15 Pro Max").unwrap(), Prefix::A);
        assert_eq!(Prefix::classify("iPhone 15 Pro").unwrap(), Prefix::B);
        assert_eq!(Prefix::classify("iPhone 15 Plus").unwrap(), Prefix::C);
        assert_eq!(Prefix::classify("iPhone 15").unwrap(), Prefix::D);

        for prefix in Prefix::ALL {
            assert_eq!(prefix.product_types().count(), 1, "{prefix}");
        }
    }

    #[test]
    fn classify_rejects_unlisted_types() {
        for ty in ["General", "", "iphone 15", "iPhone 15 ", "iPhone 16"] {
            assert_eq!(
                Prefix::classify(ty),
                Err(QueueError::InvalidType(ty.to_string()))
            );
        }
    }

    #[test]
    fn next_number_starts_at_one() {
        assert_eq!(Prefix::A.next_number(None).unwrap(), "A-001");
        assert_eq!(Prefix::B.next_number(Some(" ")).unwrap(), "B-001");
    }

    #[test]
    fn next_number_increments_and_widens() {
        assert_eq!(Prefix::A.next_number(Some("A-001")).unwrap(), "A-002");
        assert_eq!(Prefix::C.next_number(Some("C-099")).unwrap(), "C-100");
        assert_eq!(Prefix::D.next_number(Some("D-999")).unwrap(), "D-1000");
        assert_eq!(Prefix::A.next_number(Some("A-000")).unwrap(), "A-001");
    }

    #[test]
    fn malformed_suffix_is_corrupt() {
        for bad in ["A-", "A-0x1", "A-+12", "B-001", "A-99999999999"] {
            let err = Prefix::A.next_number(Some(bad)).unwrap_err();
            assert_eq!(err.code(), "CORRUPT_QUEUE_NUMBER", "{bad}");
        }
    }

    #[test]
    fn prev_number_clamps_at_one() {
        assert_eq!(Prefix::A.prev_number("A-005").unwrap(), "A-004");
        assert_eq!(Prefix::A.prev_number("A-001").unwrap(), "A-001");
        assert_eq!(Prefix::A.prev_number("A-000").unwrap(), "A-001");
    }

    #[test]
    fn reset_and_delete() {
        assert_eq!(Prefix::B.reset_number(), "B-000");
        assert_eq!(Prefix::B.apply(ControlAction::Reset, "B-042").unwrap(), "B-000");
        assert_eq!(Prefix::B.apply(ControlAction::Delete, "B-042").unwrap(), " ");
        assert!(is_unassigned(delete_sentinel()));
    }

    #[test]
    fn prefix_parsing() {
        assert_eq!("C-".parse::<Prefix>().unwrap(), Prefix::C);
        assert!(matches!("E-".parse::<Prefix>(), Err(QueueError::BadRequest(_))));
        assert!(matches!("a-".parse::<Prefix>(), Err(QueueError::BadRequest(_))));
    }
}
