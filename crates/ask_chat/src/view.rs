//! Display surface abstraction and the model → display projection.

use std::cell::RefCell;
use std::rc::Rc;

use thiserror::Error;

use crate::transcript::{Role, TranscriptEntry};

/// Static parts of the widget: header text, input placeholder and the
/// speaker labels used when projecting entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetLayout {
    pub header: String,
    pub placeholder: String,
    pub user_label: String,
    pub bot_label: String,
}

impl Default for WidgetLayout {
    fn default() -> Self {
        Self {
            header: "Chatbot PDF".into(),
            placeholder: "Escribe tu pregunta...".into(),
            user_label: "Tú".into(),
            bot_label: "Bot".into(),
        }
    }
}

/// One projected transcript line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedLine {
    pub label: String,
    pub text: String,
    pub is_error: bool,
}

impl std::fmt::Display for RenderedLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.label, self.text)
    }
}

/// Pure projection from transcript entries to display lines.
pub fn render_lines(layout: &WidgetLayout, entries: &[TranscriptEntry]) -> Vec<RenderedLine> {
    entries
        .iter()
        .map(|entry| RenderedLine {
            label: match entry.role() {
                Role::User => layout.user_label.clone(),
                Role::Bot => layout.bot_label.clone(),
            },
            text: entry.text().to_string(),
            is_error: entry.is_error(),
        })
        .collect()
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MountError {
    /// The container handle does not refer to a live display surface.
    #[error("container is detached")]
    Detached,
}

/// The container the widget mounts into.
///
/// `render` always receives the full projection; views that only append
/// (like a terminal) are free to skip lines they have already shown.
pub trait ChatView {
    /// Replace whatever the container holds with the header, an empty
    /// transcript area and an empty input field.
    fn mount(&mut self, layout: &WidgetLayout) -> Result<(), MountError>;

    fn render(&mut self, lines: &[RenderedLine]);

    fn set_input(&mut self, value: &str);

    fn set_input_enabled(&mut self, enabled: bool);

    /// Release the container. Called exactly once, on unmount or drop.
    fn unmount(&mut self);
}

/// What a [`MemoryView`] currently shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Surface {
    pub mounted: bool,
    pub header: String,
    pub placeholder: String,
    pub lines: Vec<RenderedLine>,
    pub input: String,
    pub input_enabled: bool,
    /// Text left over from before the widget was mounted.
    pub stale: Vec<String>,
}

/// In-memory view. Clones share the same surface, so a caller can keep
/// one handle to inspect what the widget rendered into the other.
#[derive(Debug, Clone)]
pub struct MemoryView {
    surface: Rc<RefCell<Surface>>,
    attached: bool,
}

impl MemoryView {
    pub fn new() -> Self {
        Self {
            surface: Rc::default(),
            attached: true,
        }
    }

    /// A view whose container has gone away; mounting into it fails.
    pub fn detached() -> Self {
        Self {
            attached: false,
            ..Self::new()
        }
    }

    /// A view that already holds unrelated content.
    pub fn with_stale_content<I, S>(content: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let view = Self::new();
        view.surface.borrow_mut().stale = content.into_iter().map(Into::into).collect();
        view
    }

    pub fn snapshot(&self) -> Surface {
        self.surface.borrow().clone()
    }
}

impl Default for MemoryView {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatView for MemoryView {
    fn mount(&mut self, layout: &WidgetLayout) -> Result<(), MountError> {
        if !self.attached {
            return Err(MountError::Detached);
        }
        *self.surface.borrow_mut() = Surface {
            mounted: true,
            header: layout.header.clone(),
            placeholder: layout.placeholder.clone(),
            input_enabled: true,
            ..Surface::default()
        };
        Ok(())
    }

    fn render(&mut self, lines: &[RenderedLine]) {
        self.surface.borrow_mut().lines = lines.to_vec();
    }

    fn set_input(&mut self, value: &str) {
        self.surface.borrow_mut().input = value.to_string();
    }

    fn set_input_enabled(&mut self, enabled: bool) {
        self.surface.borrow_mut().input_enabled = enabled;
    }

    fn unmount(&mut self) {
        let mut surface = self.surface.borrow_mut();
        surface.mounted = false;
        surface.input_enabled = false;
    }
}
