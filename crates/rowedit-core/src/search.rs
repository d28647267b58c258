//! Search and replace over a [`Document`].
//!
//! Queries run against the document text (rows joined with [`crate::ROW_SEPARATOR`]) and matches
//! are reported as model-coordinate [`Selection`]s. A plain query is escaped and compiled into a
//! regex, so both modes share one code path.

use regex::{Captures, Regex, RegexBuilder};

use crate::document::Document;
use crate::error::EditError;
use crate::selection::{Position, Selection};

/// Options that control how a query is matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchOptions {
    /// Match case exactly.
    pub case_sensitive: bool,
    /// Only accept matches not surrounded by word characters.
    pub whole_word: bool,
    /// Treat the query as a regex pattern.
    pub regex: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            case_sensitive: true,
            whole_word: false,
            regex: false,
        }
    }
}

/// Character/byte offset table plus row starts for one snapshot of the document text.
struct TextIndex {
    char_to_byte: Vec<usize>,
    row_starts: Vec<usize>,
}

impl TextIndex {
    fn new(doc: &Document) -> Self {
        let text = doc.text();
        let mut char_to_byte: Vec<usize> = text.char_indices().map(|(b, _)| b).collect();
        char_to_byte.push(text.len());

        let mut row_starts = Vec::with_capacity(doc.row_count());
        let mut offset = 0;
        for row in doc.rows() {
            row_starts.push(offset);
            offset += row.len() + 1;
        }

        Self {
            char_to_byte,
            row_starts,
        }
    }

    fn char_count(&self) -> usize {
        self.char_to_byte.len().saturating_sub(1)
    }

    fn byte_to_char(&self, byte: usize) -> usize {
        match self.char_to_byte.binary_search(&byte) {
            Ok(idx) | Err(idx) => idx,
        }
    }

    fn char_to_byte(&self, offset: usize) -> usize {
        self.char_to_byte[offset.min(self.char_count())]
    }

    fn position(&self, offset: usize) -> Position {
        let row = match self.row_starts.binary_search(&offset) {
            Ok(row) => row,
            Err(next) => next.saturating_sub(1),
        };
        Position::new(row, offset - self.row_starts[row])
    }

    fn offset(&self, pos: Position) -> usize {
        let row = pos.row.min(self.row_starts.len().saturating_sub(1));
        self.row_starts.get(row).copied().unwrap_or(0) + pos.col
    }
}

fn compile(query: &str, options: SearchOptions) -> Result<Regex, EditError> {
    let pattern = if options.regex {
        query.to_string()
    } else {
        regex::escape(query)
    };

    Ok(RegexBuilder::new(&pattern)
        .case_insensitive(!options.case_sensitive)
        .multi_line(true)
        .build()?)
}

fn is_word_char(ch: char) -> bool {
    ch == '_' || ch.is_alphanumeric()
}

fn is_whole_word(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
}

/// Every non-overlapping, non-empty match of `query`, in document order.
pub fn find_all(
    doc: &Document,
    query: &str,
    options: SearchOptions,
) -> Result<Vec<Selection>, EditError> {
    if query.is_empty() {
        return Ok(Vec::new());
    }

    let re = compile(query, options)?;
    let text = doc.text();
    let index = TextIndex::new(doc);

    Ok(re
        .find_iter(&text)
        .filter(|m| !m.is_empty())
        .filter(|m| !options.whole_word || is_whole_word(&text, m.start(), m.end()))
        .map(|m| {
            Selection::new(
                index.position(index.byte_to_char(m.start())),
                index.position(index.byte_to_char(m.end())),
            )
        })
        .collect())
}

/// First match starting at or after `from`, without wrapping.
pub fn find_next(
    doc: &Document,
    query: &str,
    options: SearchOptions,
    from: Position,
) -> Result<Option<Selection>, EditError> {
    if query.is_empty() {
        return Ok(None);
    }

    let re = compile(query, options)?;
    let text = doc.text();
    let index = TextIndex::new(doc);

    let mut start_byte = index.char_to_byte(index.offset(from));
    while start_byte <= text.len() {
        let Some(m) = re.find_at(&text, start_byte) else {
            return Ok(None);
        };
        if m.is_empty() {
            start_byte = m.end() + text[m.end()..].chars().next().map_or(1, char::len_utf8);
            continue;
        }
        if options.whole_word && !is_whole_word(&text, m.start(), m.end()) {
            start_byte = m.end();
            continue;
        }
        return Ok(Some(Selection::new(
            index.position(index.byte_to_char(m.start())),
            index.position(index.byte_to_char(m.end())),
        )));
    }
    Ok(None)
}

/// Replace every match of `query` in `text`.
///
/// In regex mode `replacement` may reference capture groups (`$1`, `${name}`); otherwise it is
/// inserted literally. Returns the new text and the number of replacements.
pub fn replace_all(
    text: &str,
    query: &str,
    replacement: &str,
    options: SearchOptions,
) -> Result<(String, usize), EditError> {
    if query.is_empty() {
        return Ok((text.to_string(), 0));
    }

    let re = compile(query, options)?;
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    let mut count = 0;

    for caps in re.captures_iter(text) {
        let Some(m) = caps.get(0) else {
            continue;
        };
        if m.is_empty() || (options.whole_word && !is_whole_word(text, m.start(), m.end())) {
            continue;
        }

        out.push_str(&text[last..m.start()]);
        push_replacement(&mut out, &caps, replacement, options.regex);
        last = m.end();
        count += 1;
    }
    out.push_str(&text[last..]);

    Ok((out, count))
}

fn push_replacement(out: &mut String, caps: &Captures<'_>, replacement: &str, regex: bool) {
    if regex {
        caps.expand(replacement, out);
    } else {
        out.push_str(replacement);
    }
}
