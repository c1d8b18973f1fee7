//! Line-by-line program source with EOF signaling
//!
//! A lazy, finite, non-restartable sequence of `(line_number, text)` pairs.
//! Blank lines and comment-only lines are skipped (but their line numbers
//! are not otherwise observable, matching the contract); `next()` returns
//! `None` at EOF and stays `None` on every subsequent call.

use std::io::BufRead;

/// Source of G-code lines for the Controller or Prescanner to consume.
pub trait Streamer {
    /// Pull the next non-blank, non-comment-only line, or `None` at EOF.
    /// Idempotent after the first `None`.
    fn next_line(&mut self) -> std::io::Result<Option<(u32, String)>>;
}

/// Reference `Streamer` over any buffered reader.
pub struct LineStreamer<R: BufRead> {
    reader: R,
    next_line_number: u32,
    eof: bool,
}

impl<R: BufRead> LineStreamer<R> {
    /// Wrap a `BufRead` source; line numbers start at 1.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            next_line_number: 1,
            eof: false,
        }
    }
}

fn is_blank_or_comment_only(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return true;
    }
    if let Some(rest) = trimmed.strip_prefix(';') {
        let _ = rest;
        return true;
    }
    if trimmed.starts_with('(') && trimmed.ends_with(')') {
        return true;
    }
    false
}

impl<R: BufRead> Streamer for LineStreamer<R> {
    fn next_line(&mut self) -> std::io::Result<Option<(u32, String)>> {
        if self.eof {
            return Ok(None);
        }
        loop {
            let mut buf = String::new();
            let bytes_read = self.reader.read_line(&mut buf)?;
            if bytes_read == 0 {
                self.eof = true;
                return Ok(None);
            }
            let line_number = self.next_line_number;
            self.next_line_number += 1;
            let text = buf.trim_end_matches(['\n', '\r']).to_string();
            if is_blank_or_comment_only(&text) {
                continue;
            }
            return Ok(Some((line_number, text)));
        }
    }
}

/// In-memory `Streamer` for tests.
pub struct VecStreamer {
    lines: std::vec::IntoIter<String>,
    next_line_number: u32,
    eof: bool,
}

impl VecStreamer {
    /// Build a streamer over pre-split lines; numbering starts at 1.
    pub fn new(lines: Vec<String>) -> Self {
        Self {
            lines: lines.into_iter(),
            next_line_number: 1,
            eof: false,
        }
    }
}

impl Streamer for VecStreamer {
    fn next_line(&mut self) -> std::io::Result<Option<(u32, String)>> {
        if self.eof {
            return Ok(None);
        }
        loop {
            let Some(text) = self.lines.next() else {
                self.eof = true;
                return Ok(None);
            };
            let line_number = self.next_line_number;
            self.next_line_number += 1;
            if is_blank_or_comment_only(&text) {
                continue;
            }
            return Ok(Some((line_number, text)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_skips_blank_and_comment_only_lines() {
        let text = "G1 X1\n\n; a note\nG1 X2\n";
        let mut streamer = LineStreamer::new(Cursor::new(text));
        assert_eq!(streamer.next_line().unwrap(), Some((1, "G1 X1".to_string())));
        assert_eq!(streamer.next_line().unwrap(), Some((4, "G1 X2".to_string())));
        assert_eq!(streamer.next_line().unwrap(), None);
    }

    #[test]
    fn test_idempotent_eof() {
        let mut streamer = LineStreamer::new(Cursor::new("G1 X1\n"));
        assert!(streamer.next_line().unwrap().is_some());
        assert_eq!(streamer.next_line().unwrap(), None);
        assert_eq!(streamer.next_line().unwrap(), None);
        assert_eq!(streamer.next_line().unwrap(), None);
    }

    #[test]
    fn test_vec_streamer_matches_line_streamer_behavior() {
        let mut streamer = VecStreamer::new(vec!["G1 X1".to_string(), "".to_string(), "G1 X2".to_string()]);
        assert_eq!(streamer.next_line().unwrap(), Some((1, "G1 X1".to_string())));
        assert_eq!(streamer.next_line().unwrap(), Some((3, "G1 X2".to_string())));
        assert_eq!(streamer.next_line().unwrap(), None);
        assert_eq!(streamer.next_line().unwrap(), None);
    }
}
