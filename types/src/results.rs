//! Display projections of candidate and results data.

use crate::ids::CandidateId;
use crate::wire::{CandidateWire, ResultWire, ResultsResponse};
use serde::{Deserialize, Deserializer, Serialize};

const UNKNOWN_NAME: &str = "Nom inconnu";
const UNKNOWN_PARTY: &str = "Parti inconnu";

/// A candidate as shown on the ballot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CandidateSummary {
    pub id: CandidateId,
    pub name: String,
    pub party: String,
    pub description: String,
}

impl From<CandidateWire> for CandidateSummary {
    fn from(wire: CandidateWire) -> Self {
        Self {
            id: wire.id,
            name: wire.nom.unwrap_or_else(|| UNKNOWN_NAME.to_string()),
            party: wire.parti.unwrap_or_else(|| UNKNOWN_PARTY.to_string()),
            description: wire.description.unwrap_or_default(),
        }
    }
}

/// Votes cast during one hour of the day.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourlyVotes {
    /// Hour label as the backend reports it (`"09"`, `"17"`, ...).
    #[serde(deserialize_with = "text_or_number")]
    pub heure: String,
    pub votes: u64,
}

fn text_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(u64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}

/// One candidate's standing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResultEntry {
    pub id: CandidateId,
    pub name: String,
    pub party: String,
    pub votes: u64,
    /// Share of all votes, in percent.
    pub percentage: f64,
}

impl From<ResultWire> for ResultEntry {
    fn from(wire: ResultWire) -> Self {
        Self {
            id: wire.id,
            name: wire.candidat,
            party: wire.parti,
            votes: wire.votes,
            percentage: wire.pourcentage,
        }
    }
}

/// The results table at one point in time, ordered by votes (descending).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultsSnapshot {
    pub entries: Vec<ResultEntry>,
    pub total_voters: Option<u64>,
    pub participation: Option<f64>,
}

impl ResultsSnapshot {
    pub fn new(mut entries: Vec<ResultEntry>) -> Self {
        // Stable: ties keep the backend's order.
        entries.sort_by(|a, b| b.votes.cmp(&a.votes));
        Self {
            entries,
            total_voters: None,
            participation: None,
        }
    }

    pub fn total_votes(&self) -> u64 {
        self.entries.iter().map(|e| e.votes).sum()
    }

    /// Recompute every percentage from the vote counts.
    ///
    /// All percentages are zero when no vote has been cast.
    pub fn recalculate_percentages(&mut self) {
        let total = self.total_votes();
        for entry in &mut self.entries {
            entry.percentage = if total > 0 {
                entry.votes as f64 / total as f64 * 100.0
            } else {
                0.0
            };
        }
    }

    pub fn percentage_sum(&self) -> f64 {
        self.entries.iter().map(|e| e.percentage).sum()
    }

    pub fn leader(&self) -> Option<&ResultEntry> {
        self.entries.first().filter(|e| e.votes > 0)
    }

    /// 1-based rank of a candidate in this snapshot.
    pub fn position(&self, id: CandidateId) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id).map(|i| i + 1)
    }
}

impl From<ResultsResponse> for ResultsSnapshot {
    fn from(resp: ResultsResponse) -> Self {
        let mut snapshot = Self::new(resp.results.into_iter().map(ResultEntry::from).collect());
        snapshot.total_voters = resp.total_electeurs;
        snapshot.participation = resp.participation;
        snapshot
    }
}
