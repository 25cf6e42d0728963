//! Transcript-building chat client for a question-answering HTTP endpoint.
//!
//! A [`ChatWidget`] is mounted into a [`ChatView`], sends each submitted
//! question to an [`AskBackend`] and appends the exchange to its
//! [`Transcript`]. The `ask-chat` binary drives one from the terminal.

pub mod client;
pub mod config;
pub mod messages;
pub mod terminal;
pub mod transcript;
pub mod view;
pub mod widget;

pub use client::{AskBackend, ClientError, HttpBackend};
pub use config::{default_config_path, Config, ConfigError, ServerSection, WidgetSection};
pub use terminal::TerminalView;
pub use transcript::{Role, SubmissionId, Transcript, TranscriptEntry, ERROR_MARKER};
pub use view::{render_lines, ChatView, MemoryView, MountError, RenderedLine, Surface, WidgetLayout};
pub use widget::{
    ChatWidget, KeyEvent, SubmissionPolicy, SubmitError, WidgetOptions, WidgetState,
};
