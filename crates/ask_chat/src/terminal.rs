//! Line-oriented terminal rendering for the `ask-chat` binary.

use std::io::Write;

use crate::view::{ChatView, MountError, RenderedLine, WidgetLayout};

/// Prints the header on mount and each transcript line once, as it appears.
/// The input field is the user's own terminal line, so input updates are
/// not drawn.
pub struct TerminalView<W: Write> {
    out: W,
    shown: usize,
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            shown: 0,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ChatView for TerminalView<W> {
    fn mount(&mut self, layout: &WidgetLayout) -> Result<(), MountError> {
        self.shown = 0;
        let _ = writeln!(self.out, "{}", layout.header);
        let _ = writeln!(self.out, "({})", layout.placeholder);
        let _ = self.out.flush();
        Ok(())
    }

    fn render(&mut self, lines: &[RenderedLine]) {
        for line in lines.iter().skip(self.shown) {
            let _ = writeln!(self.out, "{}", line);
        }
        self.shown = self.shown.max(lines.len());
        let _ = self.out.flush();
    }

    fn set_input(&mut self, _value: &str) {}

    fn set_input_enabled(&mut self, _enabled: bool) {}

    fn unmount(&mut self) {
        let _ = self.out.flush();
    }
}
