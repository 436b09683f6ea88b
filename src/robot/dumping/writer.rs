//! Output buffer with line bookkeeping

use crate::robot::reading::EndOfLine;

/// Accumulates dumped text line by line.
///
/// A line written without terminator (the last line of the original file) gets the default
/// terminator as soon as another line follows it, which happens when elements are appended or
/// reordered.
#[derive(Debug)]
pub struct LineWriter {
    out: String,
    default_eol: EndOfLine,
    eol_override: Option<EndOfLine>,
    unterminated: bool,
    lines: usize,
}

impl LineWriter {
    pub fn new(default_eol: EndOfLine, eol_override: Option<EndOfLine>) -> Self {
        Self {
            out: String::new(),
            default_eol,
            eol_override,
            unterminated: false,
            lines: 0,
        }
    }

    pub fn write_bom(&mut self) {
        self.out.push('\u{feff}');
    }

    pub fn begin_line(&mut self) {
        if self.unterminated {
            self.out.push_str(self.eol(self.default_eol).as_str());
            self.unterminated = false;
        }
    }

    pub fn push_str(&mut self, text: &str) {
        self.out.push_str(text);
    }

    pub fn end_line(&mut self, eol: EndOfLine) {
        let eol = self.eol(eol);
        self.out.push_str(eol.as_str());
        self.unterminated = eol.is_none();
        self.lines += 1;
    }

    /// Terminator for a line that did not exist in the source.
    pub fn fresh_eol(&self) -> EndOfLine {
        self.eol(self.default_eol)
    }

    pub fn lines(&self) -> usize {
        self.lines
    }

    pub fn finish(self) -> String {
        self.out
    }

    fn eol(&self, eol: EndOfLine) -> EndOfLine {
        match self.eol_override {
            Some(forced) if !eol.is_none() => forced,
            _ => eol,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unterminated_line_is_closed_before_the_next() {
        let mut writer = LineWriter::new(EndOfLine::CrLf, None);
        writer.begin_line();
        writer.push_str("last");
        writer.end_line(EndOfLine::None);
        writer.begin_line();
        writer.push_str("appended");
        writer.end_line(writer.fresh_eol());
        assert_eq!(writer.finish(), "last\r\nappended\r\n");
    }

    #[test]
    fn override_replaces_terminators_but_keeps_a_missing_one() {
        let mut writer = LineWriter::new(EndOfLine::Lf, Some(EndOfLine::CrLf));
        writer.begin_line();
        writer.push_str("a");
        writer.end_line(EndOfLine::Lf);
        writer.begin_line();
        writer.push_str("b");
        writer.end_line(EndOfLine::None);
        assert_eq!(writer.lines(), 2);
        assert_eq!(writer.finish(), "a\r\nb");
    }
}
