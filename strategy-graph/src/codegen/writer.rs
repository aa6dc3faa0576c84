//! Line-oriented text buffer that knows where every line landed

/// Position of a written line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LinePos {
    /// 1-based line number
    pub line: usize,
    /// Characters of indentation before the text
    pub indent: usize,
}

impl LinePos {
    /// 1-based column of the first character of the text
    pub fn column(&self) -> usize {
        self.indent + 1
    }
}

pub(crate) struct CodeWriter {
    out: String,
    lines: usize,
    depth: usize,
    unit: usize,
}

impl CodeWriter {
    pub fn new(indent_width: usize) -> Self {
        Self {
            out: String::new(),
            lines: 0,
            depth: 0,
            unit: indent_width,
        }
    }

    pub fn line(&mut self, text: &str) -> LinePos {
        self.line_at(0, text)
    }

    /// Write `text` `extra` levels deeper than the current depth
    pub fn line_at(&mut self, extra: usize, text: &str) -> LinePos {
        let indent = (self.depth + extra) * self.unit;
        for _ in 0..indent {
            self.out.push(' ');
        }
        self.out.push_str(text);
        self.out.push('\n');
        self.lines += 1;
        LinePos {
            line: self.lines,
            indent,
        }
    }

    pub fn blank(&mut self) {
        self.out.push('\n');
        self.lines += 1;
    }

    /// Write `text` and indent what follows
    pub fn open(&mut self, text: &str) -> LinePos {
        let pos = self.line(text);
        self.depth += 1;
        pos
    }

    /// Outdent and write `text`
    pub fn close(&mut self, text: &str) -> LinePos {
        self.depth = self.depth.saturating_sub(1);
        self.line(text)
    }

    pub fn finish(self) -> String {
        self.out
    }
}
