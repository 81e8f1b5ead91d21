//! Search criteria and their compilation into store predicates.
//!
//! Every supplied field becomes one [`Condition`]; a note matches a
//! [`NotePredicate`] only when it satisfies all of them.

use chrono::{DateTime, Duration, NaiveDate, SubsecRound, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

use crate::note::{Note, NoteType};

/// Partially specified search over a user's notes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SearchCriteria {
    /// Exact note type.
    #[serde(default)]
    pub note_type: Option<NoteType>,

    /// Case-sensitive substring of the title.
    #[serde(default)]
    pub title: Option<String>,

    /// Case-sensitive substring of the content.
    #[serde(default)]
    pub content: Option<String>,

    /// Lower bound (inclusive) on the last update time.
    /// Accepts RFC3339 or `YYYY-MM-DD`.
    #[serde(default, deserialize_with = "date_bound")]
    #[schemars(with = "Option<String>")]
    pub date_from: Option<DateTime<Utc>>,

    /// Upper bound (inclusive) on the last update time.
    /// Accepts RFC3339 or `YYYY-MM-DD`.
    #[serde(default, deserialize_with = "date_bound")]
    #[schemars(with = "Option<String>")]
    pub date_to: Option<DateTime<Utc>>,
}

impl SearchCriteria {
    /// True when no field would impose a condition.
    pub fn is_empty(&self) -> bool {
        self.note_type.is_none()
            && non_blank(&self.title).is_none()
            && non_blank(&self.content).is_none()
            && self.date_from.is_none()
            && self.date_to.is_none()
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

fn date_bound<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    raw.map(|s| parse_date_bound(&s).map_err(serde::de::Error::custom)).transpose()
}

/// Parse an RFC3339 timestamp or a bare date (midnight UTC).
pub fn parse_date_bound(raw: &str) -> Result<DateTime<Utc>, String> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| format!("invalid date '{raw}': expected RFC3339 or YYYY-MM-DD"))
}

/// A single filter condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    TypeIs(NoteType),
    TitleContains(String),
    ContentContains(String),
    UpdatedFrom(DateTime<Utc>),
    UpdatedTo(DateTime<Utc>),
}

impl Condition {
    pub fn matches(&self, note: &Note) -> bool {
        match self {
            Condition::TypeIs(t) => note.note_type == *t,
            Condition::TitleContains(needle) => note.title.contains(needle.as_str()),
            Condition::ContentContains(needle) => note.content.as_deref().is_some_and(|c| c.contains(needle.as_str())),
            Condition::UpdatedFrom(from) => note.updated_at >= *from,
            Condition::UpdatedTo(to) => note.updated_at <= *to,
        }
    }
}

/// Conjunction of conditions over one user's notes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotePredicate {
    conditions: Vec<Condition>,
}

impl NotePredicate {
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn matches(&self, note: &Note) -> bool {
        self.conditions.iter().all(|c| c.matches(note))
    }
}

/// Compile criteria into a predicate.
///
/// Callers route empty criteria to the cached full-list read instead.
/// Date bounds are narrowed to whole microseconds, the precision notes are
/// stored with, so the SQL rendering and [`NotePredicate::matches`] agree.
pub fn compile(criteria: &SearchCriteria) -> NotePredicate {
    let mut conditions = Vec::new();

    if let Some(t) = criteria.note_type {
        conditions.push(Condition::TypeIs(t));
    }
    if let Some(title) = non_blank(&criteria.title) {
        conditions.push(Condition::TitleContains(title.to_string()));
    }
    if let Some(content) = non_blank(&criteria.content) {
        conditions.push(Condition::ContentContains(content.to_string()));
    }
    if let Some(from) = criteria.date_from {
        conditions.push(Condition::UpdatedFrom(ceil_micros(from)));
    }
    if let Some(to) = criteria.date_to {
        conditions.push(Condition::UpdatedTo(to.trunc_subsecs(6)));
    }

    NotePredicate { conditions }
}

fn ceil_micros(ts: DateTime<Utc>) -> DateTime<Utc> {
    let floor = ts.trunc_subsecs(6);
    if floor == ts {
        return ts;
    }
    floor.checked_add_signed(Duration::microseconds(1)).unwrap_or(ts)
}
