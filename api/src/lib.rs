pub mod auth;
pub mod blizzard;
pub mod client;
pub mod discord;
pub mod http;

use crate::blizzard::{LeaderboardRow, StatField, rank_of};
use crate::client::{ApiError, ApiResult};

// ---------------------------------------------------------------------------
// Domain types: match results, independent of the Battle.net wire format
// ---------------------------------------------------------------------------

/// Where a tracked battle tag stands on one leaderboard.
#[derive(Debug, Clone, PartialEq)]
pub enum Standing {
    /// The matched row's statistics, rank first.
    Found(Vec<StatField>),
    Absent,
}

impl Standing {
    pub fn is_found(&self) -> bool {
        matches!(self, Standing::Found(_))
    }

    pub fn rank(&self) -> Option<&serde_json::Number> {
        match self {
            Standing::Found(stats) => rank_of(stats),
            Standing::Absent => None,
        }
    }
}

/// Battle tag → standing, one entry per distinct tag, kept in the order the
/// entries were recorded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchResult {
    entries: Vec<(String, Standing)>,
}

impl MatchResult {
    /// Insert or overwrite; an overwritten entry keeps its position.
    pub fn insert(&mut self, tag: impl Into<String>, standing: Standing) {
        let tag = tag.into();
        match self.entries.iter_mut().find(|(t, _)| *t == tag) {
            Some((_, existing)) => *existing = standing,
            None => self.entries.push((tag, standing)),
        }
    }

    pub fn get(&self, tag: &str) -> Option<&Standing> {
        self.entries.iter().find(|(t, _)| t == tag).map(|(_, s)| s)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Standing)> {
        self.entries.iter().map(|(t, s)| (t.as_str(), s))
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(t, _)| t.as_str())
    }
}

// ---------------------------------------------------------------------------
// Matching and rendering
// ---------------------------------------------------------------------------

/// Resolve each battle tag in `tags` to its leaderboard row.
///
/// Rows are scanned in API order and the scan stops as soon as every tag has
/// been found, so rows past that point are never looked at. Tags that were
/// not found are recorded as [`Standing::Absent`] after the found ones.
///
/// Only the first row carrying a tag is attributed to it. Several heroes with
/// the same battle tag are indistinguishable here.
pub fn find_players<S: AsRef<str>>(rows: &[LeaderboardRow], tags: &[S]) -> ApiResult<MatchResult> {
    let mut remaining: Vec<&str> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.as_ref();
        if !remaining.contains(&tag) {
            remaining.push(tag);
        }
    }

    let mut result = MatchResult::default();
    if remaining.is_empty() {
        return Ok(result);
    }

    for (index, row) in rows.iter().enumerate() {
        let hero_tag = row.display_id().ok_or_else(|| {
            ApiError::Schema(format!("row {index} has no player[0].data[0].string"))
        })?;

        if let Some(pos) = remaining.iter().position(|t| *t == hero_tag) {
            remaining.remove(pos);
            result.insert(hero_tag, Standing::Found(row.data.clone()));

            if remaining.is_empty() {
                break;
            }
        }
    }

    for tag in remaining {
        result.insert(tag, Standing::Absent);
    }

    Ok(result)
}

/// Render one leaderboard's block of the summary.
///
/// ```text
/// Leaderboard for rift-barbarian:
/// * Anon#1234 at rank 5
/// * Anon#9999 not in list
/// ```
pub fn format_message(category: &str, standings: &MatchResult) -> String {
    let mut output = format!("Leaderboard for {category}:");

    for (tag, standing) in standings.iter() {
        output.push_str("\n* ");
        output.push_str(tag);
        match standing {
            Standing::Absent => output.push_str(" not in list"),
            Standing::Found(_) => match standing.rank() {
                Some(rank) => output.push_str(&format!(" at rank {rank}")),
                None => output.push_str(" at rank ?"),
            },
        }
    }

    output
}
