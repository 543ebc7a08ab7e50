//! Title identifier classification.
//!
//! A base game identifier is 16 characters, starts with the platform prefix
//! `01`, and ends with the base suffix `000`. Updates end in `800`; any other
//! suffix is add-on content.

use std::fmt;

use serde::Serialize;

/// Exact length of a title identifier.
pub const TITLE_ID_LEN: usize = 16;

/// Prefix shared by every identifier on the target platform.
pub const BASE_PREFIX: &str = "01";

/// Suffix that marks a base title.
pub const BASE_SUFFIX: &str = "000";

/// Suffix that marks an update.
pub const UPDATE_SUFFIX: &str = "800";

/// Why an identifier was not accepted as a base title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RejectReason {
    NotTargetPlatform,
    IsUpdate,
    IsDlc,
    BadLength,
    /// Identifier missing, or the entry could not be read at all.
    Other,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotTargetPlatform => "not-target-platform",
            Self::IsUpdate => "is-update",
            Self::IsDlc => "is-dlc",
            Self::BadLength => "bad-length",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of classifying one identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleIdCheck {
    Valid,
    Rejected(RejectReason),
}

impl TitleIdCheck {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    pub fn reason(&self) -> Option<RejectReason> {
        match self {
            Self::Valid => None,
            Self::Rejected(r) => Some(*r),
        }
    }
}

/// Classify a raw identifier.
///
/// Checks run in a fixed order (platform prefix, update suffix, base suffix,
/// length) so the same string always gets the same reason.
pub fn validate_title_id(id: &str) -> TitleIdCheck {
    let reason = if !id.starts_with(BASE_PREFIX) {
        RejectReason::NotTargetPlatform
    } else if id.ends_with(UPDATE_SUFFIX) {
        RejectReason::IsUpdate
    } else if !id.ends_with(BASE_SUFFIX) {
        RejectReason::IsDlc
    } else if id.chars().count() != TITLE_ID_LEN {
        RejectReason::BadLength
    } else {
        return TitleIdCheck::Valid;
    };
    TitleIdCheck::Rejected(reason)
}

/// Classify an identifier that may be absent from its entry.
pub fn validate_entry_id(id: Option<&str>) -> TitleIdCheck {
    match id {
        Some(id) => validate_title_id(id),
        None => TitleIdCheck::Rejected(RejectReason::Other),
    }
}

#[cfg(test)]
#[path = "tests/title_id_tests.rs"]
mod tests;
