// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// The synthetic voting country that collects the votes of every source
/// which is not on the authoritative list of a given year.
pub const REST_OF_THE_WORLD: &str = "Rest of the World";

/// Points given for the ranks 1 to 10. Any rank beyond gets nothing.
pub const POINTS_SCALE: [u32; 10] = [12, 10, 8, 7, 6, 5, 4, 3, 2, 1];

/// The votes cast by one voting country.
///
/// The order of the entries is the order in which the contestants were read.
/// It matters: it is the tie-break order when points are allocated.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct VoterRow {
    pub country: String,
    pub votes: Vec<(String, u64)>,
}

impl VoterRow {
    pub fn new(country: &str) -> VoterRow {
        VoterRow {
            country: country.to_string(),
            votes: Vec::new(),
        }
    }

    /// Sets the count for a contestant.
    ///
    /// A contestant that was already present keeps its position and takes the
    /// new count, so that each contestant appears at most once per row.
    pub fn set(&mut self, target: &str, count: u64) {
        match self.votes.iter_mut().find(|(name, _)| name == target) {
            Some(entry) => entry.1 = count,
            None => self.votes.push((target.to_string(), count)),
        }
    }

    pub fn get(&self, target: &str) -> Option<u64> {
        self.votes
            .iter()
            .find(|(name, _)| name == target)
            .map(|(_, count)| *count)
    }
}

/// Mapping from voting country to the votes it gave to each contestant.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct VotingRecord {
    pub rows: Vec<VoterRow>,
}

impl VotingRecord {
    pub fn new() -> VotingRecord {
        VotingRecord { rows: Vec::new() }
    }

    pub fn row(&self, country: &str) -> Option<&VoterRow> {
        self.rows.iter().find(|r| r.country == country)
    }

    /// Returns the row of a voting country, appending an empty one at the end
    /// if it does not exist yet.
    pub fn row_mut(&mut self, country: &str) -> &mut VoterRow {
        let idx = match self.rows.iter().position(|r| r.country == country) {
            Some(idx) => idx,
            None => {
                self.rows.push(VoterRow::new(country));
                self.rows.len() - 1
            }
        };
        &mut self.rows[idx]
    }

    pub fn countries(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.country.as_str()).collect()
    }

    /// The votes received by each contestant, summed over all the voting
    /// countries (the catch-all bucket included), in first-seen order.
    pub fn totals(&self) -> Vec<(String, u64)> {
        sum_by_target(self.rows.iter().map(|r| r.votes.as_slice()))
    }
}

// ******** Output data structures *********

/// The points given by one voting country.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct PointsRow {
    pub country: String,
    pub points: Vec<(String, u32)>,
}

impl PointsRow {
    pub fn get(&self, target: &str) -> Option<u32> {
        self.points
            .iter()
            .find(|(name, _)| name == target)
            .map(|(_, p)| *p)
    }
}

/// Same shape as a [VotingRecord], with the vote counts replaced by points.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct PointsTable {
    pub rows: Vec<PointsRow>,
}

impl PointsTable {
    pub fn row(&self, country: &str) -> Option<&PointsRow> {
        self.rows.iter().find(|r| r.country == country)
    }

    /// Points received by each contestant over all the voting countries.
    pub fn totals_received(&self) -> Vec<(String, u64)> {
        let widened: Vec<Vec<(String, u64)>> = self
            .rows
            .iter()
            .map(|r| {
                r.points
                    .iter()
                    .map(|(name, p)| (name.clone(), u64::from(*p)))
                    .collect()
            })
            .collect();
        sum_by_target(widened.iter().map(|v| v.as_slice()))
    }

    /// The points a contestant received from each voting country that ranked it.
    pub fn received_from_each(&self, target: &str) -> Vec<(String, u32)> {
        self.rows
            .iter()
            .filter_map(|r| r.get(target).map(|p| (r.country.clone(), p)))
            .collect()
    }
}

fn sum_by_target<'a>(rows: impl Iterator<Item = &'a [(String, u64)]>) -> Vec<(String, u64)> {
    let mut totals: Vec<(String, u64)> = Vec::new();
    for row in rows {
        for (name, count) in row {
            match totals.iter_mut().find(|(n, _)| n == name) {
                Some(entry) => entry.1 += count,
                None => totals.push((name.clone(), *count)),
            }
        }
    }
    totals
}

/// Errors that prevent a statistic from being computed.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum AnalysisErrors {
    /// Fewer data points than the statistic requires.
    NotEnoughData(usize),
    /// The two series do not have the same length.
    LengthMismatch(usize, usize),
    /// All the values are identical, the spread is zero.
    ConstantInput,
    /// The values sum up to zero and cannot be turned into shares.
    EmptyTotal,
}

impl Error for AnalysisErrors {}

impl Display for AnalysisErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalysisErrors::NotEnoughData(n) => write!(f, "not enough data points: {}", n),
            AnalysisErrors::LengthMismatch(a, b) => {
                write!(f, "series have different lengths: {} and {}", a, b)
            }
            AnalysisErrors::ConstantInput => write!(f, "input is constant"),
            AnalysisErrors::EmptyTotal => write!(f, "values sum up to zero"),
        }
    }
}
