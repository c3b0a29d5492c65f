use std::io::Write;

use base64::Engine;
use parking_lot::Mutex;

use crate::error::LaunchpadError;

pub trait Clipboard: Send + Sync {
    fn write_text(&self, text: &str) -> Result<(), LaunchpadError>;
}

/// Sets the terminal's clipboard with an OSC 52 escape sequence.
///
/// Works over SSH and in most modern terminal emulators; terminals without
/// support silently ignore the sequence.
pub struct Osc52Clipboard;

impl Osc52Clipboard {
    pub fn sequence(text: &str) -> String {
        let encoded = base64::engine::general_purpose::STANDARD.encode(text);
        format!("\x1b]52;c;{encoded}\x07")
    }
}

impl Clipboard for Osc52Clipboard {
    fn write_text(&self, text: &str) -> Result<(), LaunchpadError> {
        let mut stdout = std::io::stdout().lock();
        stdout
            .write_all(Self::sequence(text).as_bytes())
            .and_then(|_| stdout.flush())
            .map_err(|e| LaunchpadError::Clipboard(e.to_string()))
    }
}

/// Keeps the last copied text in memory.
#[derive(Default)]
pub struct MemoryClipboard {
    contents: Mutex<Option<String>>,
}

impl MemoryClipboard {
    pub fn contents(&self) -> Option<String> {
        self.contents.lock().clone()
    }
}

impl Clipboard for MemoryClipboard {
    fn write_text(&self, text: &str) -> Result<(), LaunchpadError> {
        *self.contents.lock() = Some(text.to_string());
        Ok(())
    }
}
