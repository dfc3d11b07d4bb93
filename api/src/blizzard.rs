//! Battle.net raw wire types: the OAuth token grant and the Diablo III
//! season leaderboard.
//! Endpoint: https://{region}.api.blizzard.com/data/d3/season/{season}/leaderboard/rift-{category}
use serde::Deserialize;

// ---------------------------------------------------------------------------
// OAuth client-credentials grant
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Clone)]
pub struct TokenResponse {
    pub access_token: Option<String>,
    pub token_type: Option<String>,
    /// Seconds. Logged only; the token is never refreshed.
    pub expires_in: Option<u64>,
}

// ---------------------------------------------------------------------------
// Season leaderboard
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct LeaderboardResponse {
    /// Absent on leaderboards nobody has entered yet.
    #[serde(default)]
    pub row: Vec<LeaderboardRow>,
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct LeaderboardRow {
    /// One entry per hero in the group (1 for solo rifts, up to 4 for team).
    #[serde(default)]
    pub player: Vec<PlayerEntry>,
    /// Rank, RiftLevel, RiftTime, CompletedTime, BattleTag... Rank comes first.
    #[serde(default)]
    pub data: Vec<StatField>,
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct PlayerEntry {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(rename = "accountId", default)]
    pub account_id: Option<serde_json::Number>,
    #[serde(default)]
    pub data: Vec<StatField>,
}

/// A single `{ id, number | string | timestamp }` cell.
#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct StatField {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub number: Option<serde_json::Number>,
    #[serde(default)]
    pub string: Option<String>,
    #[serde(default)]
    pub timestamp: Option<serde_json::Number>,
}

impl LeaderboardRow {
    /// The hero's battle tag: `player[0].data[0].string`.
    ///
    /// This is the only place that knows the field path. Returns `None` when
    /// the row does not have that shape.
    pub fn display_id(&self) -> Option<&str> {
        self.player.first()?.data.first()?.string.as_deref()
    }

    /// The row's rank, i.e. the `number` of its first statistic.
    pub fn rank(&self) -> Option<&serde_json::Number> {
        rank_of(&self.data)
    }
}

pub fn rank_of(stats: &[StatField]) -> Option<&serde_json::Number> {
    stats.first()?.number.as_ref()
}
