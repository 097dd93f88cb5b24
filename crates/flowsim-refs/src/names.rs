//! Branch name and label validation.
//!
//! Branch names follow git-style rules and must also name their workflow
//! role: either the bare kind (`develop`) or `kind-suffix` (`feature-login`).
//!
//! - Must be non-empty
//! - Must not contain whitespace, `~`, `^`, `:`, `?`, `*`, `[`, `\` or `"`
//! - Must not contain `..` or `@{`
//! - Must not start or end with `.` or `/`, or end with `.lock`
//! - Must not contain `//`
//!
//! Commit messages and version tags are written into the graph description
//! inside double quotes, so they must be single-line text without `"`.

use crate::error::{RefError, Result};
use crate::types::BranchKind;

/// Characters that are forbidden anywhere in a branch name.
const FORBIDDEN_CHARS: &[char] = &[
    ' ', '\t', '\n', '\r', '~', '^', ':', '?', '*', '[', '\\', '"',
];

/// Substrings that are forbidden anywhere in a branch name.
const FORBIDDEN_SEQUENCES: &[&str] = &["..", "@{", "//"];

fn invalid(name: &str, reason: impl Into<String>) -> RefError {
    RefError::InvalidBranchName {
        name: name.to_string(),
        reason: reason.into(),
    }
}

/// Validate the syntax of a branch name.
///
/// ```
/// use flowsim_refs::names::validate_branch_name;
///
/// assert!(validate_branch_name("feature-auth").is_ok());
/// assert!(validate_branch_name("").is_err());
/// assert!(validate_branch_name("bad..name").is_err());
/// ```
pub fn validate_branch_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(invalid(name, "branch name must not be empty"));
    }
    if let Some(ch) = name.chars().find(|c| FORBIDDEN_CHARS.contains(c)) {
        return Err(invalid(name, format!("contains forbidden character: {ch:?}")));
    }
    if let Some(seq) = FORBIDDEN_SEQUENCES.iter().find(|s| name.contains(**s)) {
        return Err(invalid(name, format!("must not contain '{seq}'")));
    }
    for edge in ['.', '/'] {
        if name.starts_with(edge) || name.ends_with(edge) {
            return Err(invalid(name, format!("must not start or end with '{edge}'")));
        }
    }
    if name.ends_with(".lock") {
        return Err(invalid(name, "must not end with '.lock'"));
    }
    Ok(())
}

/// Infer a branch's kind from its name.
///
/// The prefix before the first `-` selects the kind; a suffix, when present,
/// must be non-empty.
///
/// ```
/// use flowsim_refs::{infer_kind, BranchKind};
///
/// assert_eq!(infer_kind("hotfix-1").unwrap(), BranchKind::Hotfix);
/// assert_eq!(infer_kind("develop").unwrap(), BranchKind::Develop);
/// assert!(infer_kind("bugfix-2").is_err());
/// ```
pub fn infer_kind(name: &str) -> Result<BranchKind> {
    validate_branch_name(name)?;
    let (prefix, suffix) = match name.split_once('-') {
        Some((prefix, suffix)) => (prefix, Some(suffix)),
        None => (name, None),
    };
    let kind = BranchKind::from_prefix(prefix).ok_or_else(|| {
        invalid(
            name,
            "must start with master, develop, release, hotfix or feature",
        )
    })?;
    if suffix == Some("") {
        return Err(invalid(name, "suffix after '-' must not be empty"));
    }
    Ok(kind)
}

/// Validate a commit message or version tag for the graph description.
pub fn validate_label(label: &str) -> Result<()> {
    let reason = if label.contains('"') {
        "must not contain '\"'"
    } else if label.contains(['\n', '\r']) {
        "must be a single line"
    } else {
        return Ok(());
    };
    Err(RefError::InvalidLabel {
        label: label.to_string(),
        reason: reason.into(),
    })
}
