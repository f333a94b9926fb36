//! Line-oriented parser for comma-delimited, double-quoted text.
//!
//! Only the two fixed reference schemas go through here, so the rules are
//! deliberately small:
//! - `,` separates fields unless it appears inside `"..."`
//! - `""` inside a quoted field is a literal `"`
//! - unquoted text is trimmed, quoted text is kept exactly
//! - an unterminated quote swallows the rest of the line
//! - an empty or whitespace-only line yields no fields at all

const DELIMITER: char = ',';
const QUOTE: char = '"';

/// Accumulates one field while the line is scanned.
#[derive(Default)]
struct FieldBuf {
    text: String,
    /// Byte length of `text` up to and including the last quoted character.
    quoted_end: Option<usize>,
}

impl FieldBuf {
    fn open_quote(&mut self) {
        // Whitespace before the opening quote is padding, not content.
        if self.quoted_end.is_none() {
            let trimmed = self.text.trim_start();
            if trimmed.len() != self.text.len() {
                self.text = trimmed.to_string();
            }
        }
    }

    fn push_quoted(&mut self, c: char) {
        self.text.push(c);
        self.quoted_end = Some(self.text.len());
    }

    fn push_plain(&mut self, c: char) {
        self.text.push(c);
    }

    fn finish(&mut self) -> String {
        let text = std::mem::take(&mut self.text);
        match self.quoted_end.take() {
            None => text.trim().to_string(),
            Some(end) => {
                let (quoted, rest) = text.split_at(end);
                let mut out = String::with_capacity(text.len());
                out.push_str(quoted);
                out.push_str(rest.trim_end());
                out
            }
        }
    }
}

/// Split one line into its fields.
///
/// Never fails. A trailing `\r` is ignored so CRLF input behaves like LF.
pub fn parse_row(line: &str) -> Vec<String> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    if line.trim().is_empty() {
        return Vec::new();
    }

    let mut fields = Vec::new();
    let mut field = FieldBuf::default();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == QUOTE {
                if chars.peek() == Some(&QUOTE) {
                    chars.next();
                    field.push_quoted(QUOTE);
                } else {
                    in_quotes = false;
                    // `""` as a whole field is still a quoted (empty) field.
                    if field.quoted_end.is_none() {
                        field.quoted_end = Some(field.text.len());
                    }
                }
            } else {
                field.push_quoted(c);
            }
            continue;
        }

        match c {
            DELIMITER => fields.push(field.finish()),
            QUOTE => {
                field.open_quote();
                in_quotes = true;
            }
            _ => field.push_plain(c),
        }
    }

    if in_quotes {
        tracing::debug!("Unterminated quote in row; keeping remainder as field text");
    }
    fields.push(field.finish());
    fields
}

/// Iterate over the data rows of a resource: header skipped, blank lines dropped.
///
/// Yields `(line_number, fields)` with 1-based line numbers as they appear in the text.
pub fn data_rows(text: &str) -> impl Iterator<Item = (usize, Vec<String>)> + '_ {
    text.lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, parse_row(line)))
        .filter(|(_, fields)| !fields.is_empty())
        .skip(1)
}
