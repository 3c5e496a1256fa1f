//! In-memory model of the settings file and the parser that builds it.
//!
//! # Why insertion-ordered maps?
//!
//! A `HashMap` would forget the order in which keys were written.  The flush
//! merge appends brand-new keys and sections in the order the caller wrote
//! them, so both levels use [`IndexMap`], which iterates in insertion order.
//!
//! # Duplicate sections and keys
//!
//! The first occurrence always wins.  A second `[Core]` header switches the
//! parser into "ignore" mode until the next header, so *every* line of the
//! duplicate block is skipped, including keys that the first block did not
//! have.  A repeated key inside one block is skipped the same way.

use indexmap::IndexMap;

pub mod grammar;
pub mod merge;

use grammar::{classify, strip_bom, Line};

/// Keys and values of one `[Section]`, in file (or write) order.
pub type Section = IndexMap<String, String>;

/// Section name → section, in file (or write) order.
pub type Sections = IndexMap<String, Section>;

/// Parses the full text of a settings file.
///
/// Malformed lines, lines before the first header and duplicate
/// sections/keys are skipped silently.
///
/// # Examples
///
/// ```rust
/// use speedo_config::document::parse_document;
///
/// let sections = parse_document("[Core]\nUseMph=False\n");
/// assert_eq!(sections["Core"]["UseMph"], "False");
/// ```
pub fn parse_document(text: &str) -> Sections {
    let (text, _) = strip_bom(text);
    let mut sections = Sections::new();
    // `None` both before the first header and inside a duplicate block.
    let mut current: Option<String> = None;

    for line in text.lines() {
        match classify(line) {
            Line::Section(name) => {
                if sections.contains_key(name) {
                    current = None;
                } else {
                    sections.insert(name.to_string(), Section::new());
                    current = Some(name.to_string());
                }
            }
            Line::Entry { key, value } => {
                let Some(section) = current.as_ref().and_then(|name| sections.get_mut(name))
                else {
                    continue;
                };
                if !section.contains_key(key) {
                    section.insert(key.to_string(), value.to_string());
                }
            }
            Line::Other => {}
        }
    }

    sections
}

/// Number of key/value pairs across all sections.
pub fn entry_count(sections: &Sections) -> usize {
    sections.values().map(IndexMap::len).sum()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
