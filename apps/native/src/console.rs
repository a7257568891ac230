//! Line-oriented presentation layer: command parsing, transcript printing
//! and ANSI span painting.

use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};

use core_types::{EditSource, TranscriptDisplay, TranscriptEvent};
use highlight::{SpanCategory, SpanRenderer, SpanSet};

/// One line typed by the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Connect(Option<String>),
    Disconnect,
    Toggle,
    Ports,
    Send(String),
    /// Confirm sending the script that triggered a collision warning
    Confirm,
    Clear,
    Highlight(String),
    Preview(String),
    Help,
    Quit,
    /// Anything not starting with `:` goes to the device as-is
    Message(String),
    Unknown(String),
    Empty,
}

pub fn parse_input(line: &str) -> Input {
    let line = line.trim();
    if line.is_empty() {
        return Input::Empty;
    }
    let Some(command) = line.strip_prefix(':') else {
        return Input::Message(line.to_string());
    };

    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, Some(arg.trim().to_string()).filter(|a| !a.is_empty())),
        None => (command, None),
    };

    match (name, arg) {
        ("connect" | "c", port) => Input::Connect(port),
        ("disconnect" | "d", None) => Input::Disconnect,
        ("toggle", None) => Input::Toggle,
        ("ports", None) => Input::Ports,
        ("send" | "s", Some(path)) => Input::Send(path),
        ("yes" | "y", None) => Input::Confirm,
        ("clear", None) => Input::Clear,
        ("highlight" | "hl", Some(path)) => Input::Highlight(path),
        ("preview", Some(path)) => Input::Preview(path),
        ("help" | "h" | "?", None) => Input::Help,
        ("quit" | "q" | "exit", None) => Input::Quit,
        _ => Input::Unknown(line.to_string()),
    }
}

pub const HELP: &str = "\
Commands:
  :connect [PORT]   open PORT (or the --port given at startup)
  :disconnect       close the port
  :toggle           connect or disconnect
  :ports            list serial ports
  :send FILE        compact, frame and send a Lua script
  :yes              send the last script despite a '$' warning
  :preview FILE     show the frame that :send would write
  :highlight FILE   print a script with syntax colors
  :clear            clear the transcript
  :quit             disconnect and exit
Anything else is sent to the device as a raw message.";

/// Prints transcript entries, one rendered line each.
pub struct TranscriptPrinter<W: Write> {
    out: W,
}

impl<W: Write> TranscriptPrinter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> TranscriptDisplay for TranscriptPrinter<W> {
    fn render_transcript_append(&mut self, event: &TranscriptEvent) {
        let _ = writeln!(self.out, "{}", event.render());
    }

    fn render_transcript_cleared(&mut self) {
        let _ = writeln!(self.out, "---- transcript cleared ----");
    }
}

fn ansi(category: SpanCategory) -> &'static str {
    match category {
        SpanCategory::Comment => "\x1b[90m",
        SpanCategory::String => "\x1b[32m",
        SpanCategory::Number => "\x1b[35m",
        SpanCategory::Keyword => "\x1b[1;34m",
        SpanCategory::FunctionName => "\x1b[36m",
        SpanCategory::Operator => "\x1b[33m",
        SpanCategory::FlaggedChar => "\x1b[1;97;41m",
    }
}

const RESET: &str = "\x1b[0m";

/// Wrap every run of same-category characters in its color.
pub fn paint(text: &str, spans: &SpanSet) -> String {
    let mut out = String::with_capacity(text.len() * 2);
    let mut current: Option<SpanCategory> = None;

    for (offset, ch) in text.char_indices() {
        // Colors are reset at line ends so terminals don't bleed them
        let category = if ch == '\n' {
            None
        } else {
            spans.category_at(offset)
        };
        if category != current {
            if current.is_some() {
                out.push_str(RESET);
            }
            if let Some(category) = category {
                out.push_str(ansi(category));
            }
            current = category;
        }
        out.push(ch);
    }
    if current.is_some() {
        out.push_str(RESET);
    }
    out
}

/// Shared slot for the script being highlighted.
///
/// The scheduler pulls the text from here at idle time, and the renderer
/// reads the same text back to paint the spans onto it.
#[derive(Clone, Default)]
pub struct EditBuffer(Arc<Mutex<String>>);

impl EditBuffer {
    pub fn replace(&self, text: String) {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = text;
    }
}

impl EditSource for EditBuffer {
    fn get_current_text(&self) -> String {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Prints the edit buffer with colors whenever fresh spans arrive.
pub struct AnsiPreview<W: Write> {
    buffer: EditBuffer,
    out: W,
}

impl<W: Write> AnsiPreview<W> {
    pub fn new(buffer: EditBuffer, out: W) -> Self {
        Self { buffer, out }
    }
}

impl<W: Write> SpanRenderer for AnsiPreview<W> {
    fn render_spans(&mut self, spans: &SpanSet) {
        let text = self.buffer.get_current_text();
        let _ = writeln!(self.out, "{}", paint(&text, spans));
        let _ = self.out.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::Direction;
    use highlight::tokenize;

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_input("  "), Input::Empty);
        assert_eq!(parse_input(":connect"), Input::Connect(None));
        assert_eq!(
            parse_input(":c /dev/ttyUSB1"),
            Input::Connect(Some("/dev/ttyUSB1".into()))
        );
        assert_eq!(parse_input(":send blink.lua"), Input::Send("blink.lua".into()));
        assert_eq!(parse_input(":y"), Input::Confirm);
        assert_eq!(parse_input(":q"), Input::Quit);
    }

    #[test]
    fn test_parse_message_and_unknown() {
        assert_eq!(
            parse_input("  print(node.heap())  "),
            Input::Message("print(node.heap())".into())
        );
        assert_eq!(parse_input(":send"), Input::Unknown(":send".into()));
        assert_eq!(parse_input(":flash x"), Input::Unknown(":flash x".into()));
    }

    #[test]
    fn test_printer_renders_lines() {
        let mut printer = TranscriptPrinter::new(Vec::new());
        printer.render_transcript_append(&TranscriptEvent::new(Direction::Received, "ok"));
        let out = String::from_utf8(printer.into_inner()).unwrap();
        assert!(out.ends_with("] RECV: ok\n"));
    }

    #[test]
    fn test_paint_plain_text_untouched() {
        let text = "abc xyz";
        assert_eq!(paint(text, &tokenize(text)), text);
    }

    #[test]
    fn test_paint_wraps_categories() {
        let text = "x = 1 -- one";
        let painted = paint(text, &tokenize(text));
        assert!(painted.contains("\x1b[35m1\x1b[0m"));
        assert!(painted.contains("\x1b[90m-- one\x1b[0m"));
    }

    #[test]
    fn test_preview_reads_buffer() {
        let buffer = EditBuffer::default();
        buffer.replace("local".into());
        let mut preview = AnsiPreview::new(buffer.clone(), Vec::new());
        preview.render_spans(&tokenize("local"));
        assert_eq!(
            String::from_utf8(preview.out).unwrap(),
            "\x1b[1;34mlocal\x1b[0m\n"
        );
    }
}
