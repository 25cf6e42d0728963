//! Typed, append-only record of a chat session.

use serde::Serialize;

/// Text of the Bot entry appended when a request fails.
pub const ERROR_MARKER: &str = "[error: request failed]";

/// Identifies one submitted question within a widget's lifetime.
pub type SubmissionId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Bot,
}

/// One line of the conversation. Fields are private so entries cannot be
/// edited after they are appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranscriptEntry {
    role: Role,
    text: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    is_error: bool,
    #[serde(skip)]
    submission: SubmissionId,
}

impl TranscriptEntry {
    pub fn role(&self) -> Role {
        self.role
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// True only for Bot entries standing in for a failed request.
    pub fn is_error(&self) -> bool {
        self.is_error
    }

    /// The submission this entry asked (User) or answered (Bot).
    pub fn submission(&self) -> SubmissionId {
        self.submission
    }
}

/// Ordered entries. Bot entries can only be appended for a submission whose
/// User entry is already present, so every answer follows its question.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&TranscriptEntry> {
        self.entries.last()
    }

    pub(crate) fn push_user(&mut self, submission: SubmissionId, text: String) -> &TranscriptEntry {
        self.push(TranscriptEntry {
            role: Role::User,
            text,
            is_error: false,
            submission,
        })
    }

    /// Returns `None` (and appends nothing) if `submission` has no User
    /// entry or has already been answered.
    pub(crate) fn push_bot(
        &mut self,
        submission: SubmissionId,
        text: String,
        is_error: bool,
    ) -> Option<&TranscriptEntry> {
        let asked = self
            .entries
            .iter()
            .any(|e| e.role == Role::User && e.submission == submission);
        let answered = self
            .entries
            .iter()
            .any(|e| e.role == Role::Bot && e.submission == submission);
        if !asked || answered {
            return None;
        }
        Some(self.push(TranscriptEntry {
            role: Role::Bot,
            text,
            is_error,
            submission,
        }))
    }

    fn push(&mut self, entry: TranscriptEntry) -> &TranscriptEntry {
        self.entries.push(entry);
        &self.entries[self.entries.len() - 1]
    }
}
