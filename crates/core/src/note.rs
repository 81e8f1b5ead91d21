//! Note model and input types.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

pub type UserId = i64;
pub type NoteId = i64;

/// Maximum title length in characters.
pub const MAX_TITLE_CHARS: usize = 100;

/// Registered note categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum NoteType {
    Personal,
    Work,
}

impl NoteType {
    pub const ALL: [NoteType; 2] = [NoteType::Personal, NoteType::Work];

    pub fn as_str(&self) -> &'static str {
        match self {
            NoteType::Personal => "personal",
            NoteType::Work => "work",
        }
    }

    /// Validate a raw note type.
    ///
    /// Both the create and the update path go through here.
    pub fn parse(raw: &str) -> Result<Self, Error> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == raw)
            .ok_or_else(|| Error::InvalidNoteType(raw.to_string()))
    }

    pub fn allowed_values() -> String {
        Self::ALL.iter().map(NoteType::as_str).collect::<Vec<_>>().join(", ")
    }
}

impl fmt::Display for NoteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NoteType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// A persisted note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Note {
    pub id: NoteId,
    pub user_id: UserId,
    pub title: String,
    pub content: Option<String>,
    pub note_type: NoteType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    /// Whether applying `update` would leave this note unchanged.
    pub fn is_unchanged_by(&self, update: &NoteUpdate) -> bool {
        self.note_type.as_str() == update.note_type && self.title == update.title && self.content == update.content
    }
}

/// Unvalidated input for creating a note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteDraft {
    pub user_id: UserId,
    pub title: String,
    pub content: Option<String>,
    pub note_type: String,
}

/// Unvalidated replacement values for an existing note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteUpdate {
    pub title: String,
    pub content: Option<String>,
    pub note_type: String,
}

/// Validated note ready for insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct NewNote {
    pub user_id: UserId,
    pub title: String,
    pub content: Option<String>,
    pub note_type: NoteType,
}

impl TryFrom<NoteDraft> for NewNote {
    type Error = Error;

    fn try_from(draft: NoteDraft) -> Result<Self, Self::Error> {
        let note_type = NoteType::parse(&draft.note_type)?;
        Ok(Self { user_id: draft.user_id, title: draft.title, content: draft.content, note_type })
    }
}

/// Validated replacement values.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteChanges {
    pub title: String,
    pub content: Option<String>,
    pub note_type: NoteType,
}

impl TryFrom<NoteUpdate> for NoteChanges {
    type Error = Error;

    fn try_from(update: NoteUpdate) -> Result<Self, Self::Error> {
        let note_type = NoteType::parse(&update.note_type)?;
        Ok(Self { title: update.title, content: update.content, note_type })
    }
}

/// Check the title length limit.
pub fn validate_title(title: &str) -> Result<(), Error> {
    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(Error::InvalidInput(format!("Title must be a maximum of {MAX_TITLE_CHARS} characters")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_types() {
        assert_eq!(NoteType::parse("personal").unwrap(), NoteType::Personal);
        assert_eq!("work".parse::<NoteType>().unwrap(), NoteType::Work);
    }

    #[test]
    fn test_parse_rejects_unknown_and_wrong_case() {
        assert!(matches!(NoteType::parse("misc"), Err(Error::InvalidNoteType(t)) if t == "misc"));
        assert!(NoteType::parse("Work").is_err());
    }

    #[test]
    fn test_note_type_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&NoteType::Personal).unwrap(), "\"personal\"");
    }

    #[test]
    fn test_draft_conversion_validates_type() {
        let draft =
            NoteDraft { user_id: 1, title: "A".into(), content: None, note_type: "urgent".into() };
        assert!(NewNote::try_from(draft).is_err());
    }

    #[test]
    fn test_validate_title_limit() {
        assert!(validate_title(&"a".repeat(100)).is_ok());
        assert!(matches!(validate_title(&"a".repeat(101)), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_is_unchanged_by() {
        let note = Note {
            id: 1,
            user_id: 1,
            title: "A".into(),
            content: Some("x".into()),
            note_type: NoteType::Personal,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let same = NoteUpdate { title: "A".into(), content: Some("x".into()), note_type: "personal".into() };
        let retyped = NoteUpdate { note_type: "work".into(), ..same.clone() };
        assert!(note.is_unchanged_by(&same));
        assert!(!note.is_unchanged_by(&retyped));
    }
}
