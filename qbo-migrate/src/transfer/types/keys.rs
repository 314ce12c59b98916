//! Identity keys used to match records across companies

use std::fmt;

/// Separator of class and department paths ("Parent:Child")
pub const PATH_SEPARATOR: char = ':';

/// Account identity: by name, or by account number plus name
///
/// A name containing `_` never equals a number/name pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AccountKey {
    Name(String),
    Numbered { number: String, name: String },
}

impl AccountKey {
    pub fn name(name: &str) -> Self {
        AccountKey::Name(name.trim().to_string())
    }

    /// Number/name pair; an absent number is the empty string
    pub fn numbered(number: Option<&str>, name: &str) -> Self {
        AccountKey::Numbered {
            number: number.unwrap_or_default().trim().to_string(),
            name: name.trim().to_string(),
        }
    }
}

impl fmt::Display for AccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountKey::Name(name) => write!(f, "{}", name),
            AccountKey::Numbered { number, name } => write!(f, "{}_{}", number, name),
        }
    }
}

/// Journal entry identity: transaction date plus document number
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JournalKey {
    pub txn_date: String,
    pub doc_number: String,
}

impl JournalKey {
    pub fn new(txn_date: &str, doc_number: &str) -> Self {
        JournalKey {
            txn_date: txn_date.trim().to_string(),
            doc_number: doc_number.trim().to_string(),
        }
    }
}

impl fmt::Display for JournalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.txn_date, self.doc_number)
    }
}

/// Trimmed, non-empty segments of a colon-delimited path
pub fn path_segments(path: &str) -> Vec<&str> {
    path.split(PATH_SEPARATOR)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Every leading prefix of a path, shallowest first: "A:B:C" → A, A:B, A:B:C
pub fn path_prefixes(path: &str) -> Vec<String> {
    let segments = path_segments(path);
    (1..=segments.len())
        .map(|n| segments[..n].join(":"))
        .collect()
}

/// Path of the parent node, if any: "A:B:C" → "A:B"
pub fn parent_path(path: &str) -> Option<String> {
    let segments = path_segments(path);
    if segments.len() < 2 {
        return None;
    }
    Some(segments[..segments.len() - 1].join(":"))
}

/// Number of segments; an empty path is depth 0
pub fn path_depth(path: &str) -> usize {
    path_segments(path).len()
}

/// Trimmed value, or `None` when absent or blank
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}
