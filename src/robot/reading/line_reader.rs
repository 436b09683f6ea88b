//! Line reader
//!
//!     A lazy iterator over the lines of a byte stream. Lines keep their end-of-line kind so
//!     the dumper can reproduce the exact terminators, and a start offset into the original
//!     bytes (a BOM counts towards offsets but is not part of any line text).
//!
//!     The reader owns a single fixed-size buffer. A CR that happens to be the last byte of a
//!     buffer fill is resolved by refilling before deciding between CR and CRLF, so a split
//!     CRLF never produces an extra empty line.

use std::io::{self, Read};

use serde::Serialize;

use crate::robot::error::ReadError;

const BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];
const DEFAULT_BUFFER_SIZE: usize = 8 * 1024;

/// Line terminator of a logical line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EndOfLine {
    Lf,
    Cr,
    CrLf,
    /// Last line of a file without a trailing terminator.
    None,
}

impl EndOfLine {
    pub fn as_str(self) -> &'static str {
        match self {
            EndOfLine::Lf => "\n",
            EndOfLine::Cr => "\r",
            EndOfLine::CrLf => "\r\n",
            EndOfLine::None => "",
        }
    }

    pub fn len(self) -> usize {
        self.as_str().len()
    }

    pub fn is_none(self) -> bool {
        self == EndOfLine::None
    }

    /// Parses the configuration spelling (`lf`, `crlf`, `cr`).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "lf" => Some(EndOfLine::Lf),
            "crlf" => Some(EndOfLine::CrLf),
            "cr" => Some(EndOfLine::Cr),
            _ => None,
        }
    }
}

/// One logical line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// 1-based line number.
    pub number: usize,
    pub text: String,
    pub eol: EndOfLine,
    /// Byte offset of the first character of `text` in the original input.
    pub start_offset: usize,
}

/// Lazy line splitter over any [Read] source.
pub struct LineReader<R> {
    source: R,
    buffer: Vec<u8>,
    pos: usize,
    filled: usize,
    offset: usize,
    line_number: usize,
    carry: Vec<u8>,
    bom_checked: bool,
    has_bom: bool,
    finished: bool,
}

impl<R: Read> LineReader<R> {
    pub fn new(source: R) -> Self {
        Self::with_buffer_size(source, DEFAULT_BUFFER_SIZE)
    }

    /// Reader with an explicit buffer size (clamped to at least one byte).
    pub fn with_buffer_size(source: R, size: usize) -> Self {
        Self {
            source,
            buffer: vec![0; size.max(1)],
            pos: 0,
            filled: 0,
            offset: 0,
            line_number: 0,
            carry: Vec::new(),
            bom_checked: false,
            has_bom: false,
            finished: false,
        }
    }

    /// Whether a leading BOM was found. Only meaningful once the first line was read.
    pub fn has_bom(&self) -> bool {
        self.has_bom
    }

    fn fill(&mut self) -> Result<bool, ReadError> {
        loop {
            match self.source.read(&mut self.buffer) {
                Ok(0) => return Ok(false),
                Ok(n) => {
                    self.pos = 0;
                    self.filled = n;
                    return Ok(true);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    return Err(ReadError::Io {
                        line: self.line_number + 1,
                        source: e,
                    })
                }
            }
        }
    }

    fn skip_bom(&mut self) -> Result<(), ReadError> {
        self.bom_checked = true;
        let mut matched = 0;
        // BOM bytes can straddle buffer fills
        while matched < BOM.len() {
            if self.pos == self.filled && !self.fill()? {
                break;
            }
            if self.buffer[self.pos] != BOM[matched] {
                break;
            }
            self.pos += 1;
            matched += 1;
        }
        if matched == BOM.len() {
            self.has_bom = true;
            self.offset = BOM.len();
        } else {
            self.carry.extend_from_slice(&BOM[..matched]);
        }
        Ok(())
    }

    /// Reads the next line, `Ok(None)` at end of input.
    pub fn read_line(&mut self) -> Result<Option<Line>, ReadError> {
        if self.finished {
            return Ok(None);
        }
        if !self.bom_checked {
            self.skip_bom()?;
        }

        let start_offset = self.offset;
        let mut bytes = std::mem::take(&mut self.carry);
        let eol = loop {
            if self.pos == self.filled && !self.fill()? {
                break EndOfLine::None;
            }
            let window = &self.buffer[self.pos..self.filled];
            match window.iter().position(|b| *b == b'\n' || *b == b'\r') {
                Some(idx) => {
                    bytes.extend_from_slice(&window[..idx]);
                    let terminator = window[idx];
                    self.pos += idx + 1;
                    if terminator == b'\n' {
                        break EndOfLine::Lf;
                    }
                    if self.pos == self.filled && !self.fill()? {
                        break EndOfLine::Cr;
                    }
                    if self.buffer[self.pos] == b'\n' {
                        self.pos += 1;
                        break EndOfLine::CrLf;
                    }
                    break EndOfLine::Cr;
                }
                None => {
                    bytes.extend_from_slice(window);
                    self.pos = self.filled;
                }
            }
        };

        if eol.is_none() {
            self.finished = true;
            if bytes.is_empty() {
                return Ok(None);
            }
        }

        self.line_number += 1;
        self.offset = start_offset + bytes.len() + eol.len();
        let text = String::from_utf8(bytes).map_err(|e| ReadError::Decoding {
            line: self.line_number,
            offset: start_offset + e.utf8_error().valid_up_to(),
            source: e.utf8_error(),
        })?;

        Ok(Some(Line {
            number: self.line_number,
            text,
            eol,
            start_offset,
        }))
    }
}

impl<R: Read> Iterator for LineReader<R> {
    type Item = Result<Line, ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        let result = self.read_line();
        if result.is_err() {
            self.finished = true;
        }
        result.transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(input: &[u8], buffer: usize) -> Vec<Line> {
        LineReader::with_buffer_size(input, buffer)
            .collect::<Result<Vec<_>, _>>()
            .expect("valid input")
    }

    #[test]
    fn splits_on_every_terminator_kind() {
        let read = lines(b"a\nb\r\nc\rd", 64);
        let kinds: Vec<_> = read.iter().map(|l| (l.text.as_str(), l.eol)).collect();
        assert_eq!(
            kinds,
            vec![
                ("a", EndOfLine::Lf),
                ("b", EndOfLine::CrLf),
                ("c", EndOfLine::Cr),
                ("d", EndOfLine::None)
            ]
        );
        let offsets: Vec<_> = read.iter().map(|l| l.start_offset).collect();
        assert_eq!(offsets, vec![0, 2, 5, 7]);
    }

    #[test]
    fn crlf_split_across_buffers_is_one_terminator() {
        let input = b"ab\r\ncd\r\n";
        for size in 1..=input.len() {
            let read = lines(input, size);
            assert_eq!(read.len(), 2, "buffer size {size}");
            assert_eq!(read[0].eol, EndOfLine::CrLf);
            assert_eq!(read[1].start_offset, 4, "buffer size {size}");
        }
    }

    #[test]
    fn trailing_terminator_does_not_add_an_empty_line() {
        assert_eq!(lines(b"x\n", 4).len(), 1);
        assert_eq!(lines(b"x\n\n", 4).len(), 2);
        assert!(lines(b"", 4).is_empty());
    }

    #[test]
    fn strips_bom_but_counts_it_in_offsets() {
        let mut input = BOM.to_vec();
        input.extend_from_slice(b"*** Settings ***\nLibrary  X");
        for size in [1, 2, 64] {
            let mut reader = LineReader::with_buffer_size(&input[..], size);
            let first = reader.read_line().unwrap().unwrap();
            assert!(reader.has_bom());
            assert_eq!(first.text, "*** Settings ***");
            assert_eq!(first.start_offset, 3);
            let second = reader.read_line().unwrap().unwrap();
            assert_eq!(second.start_offset, 3 + "*** Settings ***\n".len());
        }
    }

    #[test]
    fn reports_decoding_errors_with_line_and_offset() {
        let err = LineReader::new(&b"ok\nbad \xff here\n"[..])
            .collect::<Result<Vec<_>, _>>()
            .unwrap_err();
        match err {
            ReadError::Decoding { line, offset, .. } => {
                assert_eq!(line, 2);
                assert_eq!(offset, 7);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}
