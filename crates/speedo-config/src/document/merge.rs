//! Diff-merge of pending writes into the original file text.
//!
//! The flush never regenerates the file from the cache.  Instead it walks the
//! file as it is *now* on disk and only touches the lines it has to:
//!
//! 1. A key line inside a section with pending writes for that key is
//!    replaced by `key=new_value` (first occurrence only).
//! 2. Pending keys the section did not contain are inserted after the last
//!    non-blank line of that section's block.
//! 3. Sections that never appeared in the file are appended at the end.
//!
//! Every other line is copied byte for byte, apart from the line terminator,
//! which follows whatever the file already used.

use super::grammar::{classify, strip_bom, Line, LineEnding, BOM};
use super::{Section, Sections};

/// Merges `dirty` into `original` and returns the new file text.
///
/// `original` is `None` when the backing file does not exist yet; the result
/// is then just the dirty sections written out in order.
///
/// # Examples
///
/// ```rust
/// use speedo_config::document::{merge::merge_document, parse_document};
///
/// let dirty = parse_document("[Core]\nDisplayMode=2\n");
/// let merged = merge_document(Some("[Core]\nUseMph=False\n"), &dirty);
/// assert_eq!(merged, "[Core]\nUseMph=False\nDisplayMode=2\n");
/// ```
pub fn merge_document(original: Option<&str>, dirty: &Sections) -> String {
    let (body, had_bom, ending) = match original {
        Some(text) => {
            let (body, had_bom) = strip_bom(text);
            (body, had_bom, LineEnding::detect(text))
        }
        None => ("", false, LineEnding::Lf),
    };

    let mut writer = MergeWriter::new(ending, had_bom);
    let mut pending = dirty.clone();
    // Pending keys of the block being scanned.  Taken out of `pending` when
    // its header is seen, so a duplicate block later in the file gets `None`.
    let mut open: Option<Section> = None;
    // Blank lines are held back so new keys land before the block's trailing
    // separator rather than after it.
    let mut held_blanks: Vec<&str> = Vec::new();

    for line in body.lines() {
        let kind = classify(line);

        if let Line::Section(name) = kind {
            writer.close_block(open.take(), &mut held_blanks, true);
            open = pending.shift_remove(name);
            writer.push_line(line);
            continue;
        }

        if line.trim().is_empty() {
            held_blanks.push(line);
            continue;
        }
        writer.release(&mut held_blanks);

        match (kind, open.as_mut()) {
            (Line::Entry { key, .. }, Some(section)) => match section.shift_remove(key) {
                Some(value) => writer.push_entry(key, &value),
                None => writer.push_line(line),
            },
            _ => writer.push_line(line),
        }
    }
    writer.close_block(open.take(), &mut held_blanks, false);

    for (name, section) in &pending {
        writer.push_new_section(name, section);
    }

    writer.finish()
}

/// Accumulates output lines and remembers just enough about the tail to
/// place separators correctly.
struct MergeWriter {
    out: String,
    ending: &'static str,
    lines: usize,
    last_blank: bool,
}

impl MergeWriter {
    fn new(ending: LineEnding, bom: bool) -> Self {
        let mut out = String::new();
        if bom {
            out.push(BOM);
        }
        Self {
            out,
            ending: ending.as_str(),
            lines: 0,
            last_blank: false,
        }
    }

    fn push_line(&mut self, line: &str) {
        self.out.push_str(line);
        self.out.push_str(self.ending);
        self.lines += 1;
        self.last_blank = line.trim().is_empty();
    }

    fn push_entry(&mut self, key: &str, value: &str) {
        self.push_line(&format!("{key}={value}"));
    }

    fn release(&mut self, held: &mut Vec<&str>) {
        for blank in held.drain(..) {
            self.push_line(blank);
        }
    }

    /// Appends the leftover (new) keys of a block, then its held-back blanks.
    fn close_block(&mut self, leftovers: Option<Section>, held: &mut Vec<&str>, more_follows: bool) {
        if let Some(section) = leftovers.filter(|s| !s.is_empty()) {
            for (key, value) in &section {
                self.push_entry(key, value);
            }
            if held.is_empty() && more_follows {
                self.push_line("");
            }
        }
        self.release(held);
    }

    fn push_new_section(&mut self, name: &str, section: &Section) {
        if self.lines > 0 && !self.last_blank {
            self.push_line("");
        }
        self.push_line(&format!("[{name}]"));
        for (key, value) in section {
            self.push_entry(key, value);
        }
    }

    fn finish(self) -> String {
        self.out
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
