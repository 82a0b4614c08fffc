//! Field splitter: key before the first separator, attributes after it.

use crate::SkipReason;

/// How the attribute section of a line is divided.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SplitMode {
    /// Split on every secondary separator. For short tag lists.
    All,
    /// Split from the right at most `trailing` times. The leading field keeps
    /// any separators of its own, so free text (sentences, transcriptions)
    /// survives intact.
    Rightmost { trailing: usize },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FieldPolicy {
    /// Separates the key from the attributes; only the first one counts.
    pub separator: char,
    /// Separates attributes from one another.
    pub secondary: char,
    pub mode: SplitMode,
}

impl FieldPolicy {
    pub const fn all(secondary: char) -> Self {
        Self {
            separator: ':',
            secondary,
            mode: SplitMode::All,
        }
    }

    pub const fn rightmost(trailing: usize) -> Self {
        Self {
            separator: ':',
            secondary: ',',
            mode: SplitMode::Rightmost { trailing },
        }
    }
}

/// A line divided into its key and trimmed attributes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Fields<'a> {
    pub key: &'a str,
    pub attributes: Vec<&'a str>,
}

impl<'a> Fields<'a> {
    /// Return the attributes if there are exactly `N` of them.
    pub fn exact<const N: usize>(&self) -> Result<[&'a str; N], SkipReason> {
        <[&'a str; N]>::try_from(self.attributes.as_slice()).map_err(|_| SkipReason::Arity {
            expected: N,
            found: self.attributes.len(),
        })
    }

    /// The key, rejecting an empty one.
    pub fn non_empty_key(&self) -> Result<&'a str, SkipReason> {
        if self.key.is_empty() {
            return Err(SkipReason::EmptyKey);
        }
        Ok(self.key)
    }
}

/// Split `line` according to `policy`.
///
/// Fails only when the primary separator is missing; arity is the caller's
/// concern.
pub fn split_fields<'a>(line: &'a str, policy: &FieldPolicy) -> Result<Fields<'a>, SkipReason> {
    let (key, rest) = line
        .split_once(policy.separator)
        .ok_or(SkipReason::MissingSeparator(policy.separator))?;
    let rest = rest.trim();
    let attributes = match policy.mode {
        SplitMode::All => rest.split(policy.secondary).map(str::trim).collect(),
        SplitMode::Rightmost { trailing } => {
            let mut parts: Vec<&str> = rest
                .rsplitn(trailing + 1, policy.secondary)
                .map(str::trim)
                .collect();
            parts.reverse();
            parts
        }
    };
    Ok(Fields {
        key: key.trim(),
        attributes,
    })
}
