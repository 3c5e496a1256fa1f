//! Line grammar shared by the loader and the flush merge.
//!
//! The settings file is read one line at a time.  Every line is trimmed and
//! then falls into exactly one of three shapes:
//!
//! ```text
//! [SectionName]      -> Line::Section
//! key = value        -> Line::Entry   (split at the first '=')
//! anything else      -> Line::Other   (comments, blanks, junk)
//! ```
//!
//! The header check runs first, so `[a=b]` is a section named `a=b`.
//! Nothing here ever fails: lines that match neither grammar are simply
//! `Other`, and the callers decide what to do with them.

/// UTF-8 byte-order mark some Windows editors put at the start of a file.
pub const BOM: char = '\u{feff}';

/// Classification of a single line of the settings file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line<'a> {
    /// `[name]`: starts a new section.
    Section(&'a str),
    /// `key=value`: key and value are trimmed; key is never empty.
    Entry { key: &'a str, value: &'a str },
    /// Anything else.  Preserved verbatim on rewrite.
    Other,
}

/// Classifies one line (without its terminator).
///
/// # Examples
///
/// ```rust
/// use speedo_config::document::grammar::{classify, Line};
///
/// assert_eq!(classify("  [Core] "), Line::Section("Core"));
/// assert_eq!(classify("UseMph = False"), Line::Entry { key: "UseMph", value: "False" });
/// assert_eq!(classify("; comment"), Line::Other);
/// ```
pub fn classify(line: &str) -> Line<'_> {
    let trimmed = line.trim();

    if let Some(name) = trimmed
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
    {
        if !name.is_empty() {
            return Line::Section(name);
        }
    }

    if let Some((key, value)) = trimmed.split_once('=') {
        let key = key.trim();
        if !key.is_empty() {
            return Line::Entry {
                key,
                value: value.trim(),
            };
        }
    }

    Line::Other
}

/// Checks that `[section]` and `key=value` would be written as lines that
/// [`classify`] reads back unchanged.  Values are not checked for
/// surrounding whitespace: the store trims them before writing.
///
/// Returns the reason for the first problem found.
pub fn check_entry(section: &str, key: &str, value: &str) -> Result<(), &'static str> {
    let breaks_line = |s: &str| s.contains(['\r', '\n']);

    if section.is_empty() {
        return Err("section name is empty");
    }
    if breaks_line(section) {
        return Err("section name contains a line break");
    }
    if section.trim() != section {
        return Err("section name has surrounding whitespace");
    }
    if key.is_empty() {
        return Err("key is empty");
    }
    if breaks_line(key) {
        return Err("key contains a line break");
    }
    if key.trim() != key {
        return Err("key has surrounding whitespace");
    }
    if key.contains('=') {
        return Err("key contains '='");
    }
    // `[k=v]` would read back as a section header.
    if key.starts_with('[') {
        return Err("key starts with '['");
    }
    if breaks_line(value) {
        return Err("value contains a line break");
    }
    Ok(())
}

/// Removes a leading byte-order mark, returning the rest and whether one was found.
pub fn strip_bom(text: &str) -> (&str, bool) {
    match text.strip_prefix(BOM) {
        Some(rest) => (rest, true),
        None => (text, false),
    }
}

/// Line terminator used when rewriting a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnding {
    Lf,
    CrLf,
}

impl LineEnding {
    /// Picks `\r\n` if the original text uses it anywhere, `\n` otherwise.
    pub fn detect(text: &str) -> Self {
        if text.contains("\r\n") {
            LineEnding::CrLf
        } else {
            LineEnding::Lf
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
