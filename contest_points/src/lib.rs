/*!

Vote records and rank-based point allocation for an annual song contest.

The crate turns the raw per-country votes of a contest into a [VotingRecord],
converts every voting country's votes into contest points with
[allocate_points], and compares the actual outcome with the polling made
before the contest (see [comparison]).

```
use contest_points::builder::build_record;
use contest_points::allocate_points;

let countries = vec!["Austria".to_string()];
let record = build_record(&countries, "Sweden\t3\t3\t0\nItaly\t5\t5\t0");
let points = allocate_points(&record);

assert_eq!(points.row("Austria").unwrap().get("Italy"), Some(12));
assert_eq!(points.row("Austria").unwrap().get("Sweden"), Some(10));
```

The file formats read by the `contestpoll` program are described in the
[manual].
*/
mod config;
use log::{debug, info};

pub mod builder;
pub mod comparison;
pub mod manual;
pub mod stats;

pub use crate::config::*;

/// The points given to the contestant at the given rank (0 is the first).
pub fn points_for_rank(rank: usize) -> u32 {
    POINTS_SCALE.get(rank).cloned().unwrap_or(0)
}

/// Allocates the contest points of every voting country.
///
/// Each voting country is handled independently: its contestants are sorted
/// by vote count, highest first, and receive 12, 10, 8, 7, 6, 5, 4, 3, 2 and 1
/// points. Everyone else receives 0. Contestants with the same count keep
/// their input order, so the first one read gets the better rank.
///
/// The output has the same voting countries and the same contestants, in the
/// same order, as the input.
pub fn allocate_points(record: &VotingRecord) -> PointsTable {
    info!(
        "allocate_points: Processing {:?} voting countries",
        record.rows.len()
    );
    PointsTable {
        rows: record.rows.iter().map(allocate_row).collect(),
    }
}

fn allocate_row(row: &VoterRow) -> PointsRow {
    let mut ranked: Vec<(usize, u64)> = row
        .votes
        .iter()
        .enumerate()
        .map(|(idx, (_, count))| (idx, *count))
        .collect();
    // sort_by is stable.
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    let mut points: Vec<u32> = vec![0; row.votes.len()];
    for (rank, (idx, _)) in ranked.iter().enumerate() {
        points[*idx] = points_for_rank(rank);
    }
    debug!(
        "allocate_row: {}: ranked {:?}",
        row.country,
        ranked
            .iter()
            .take(POINTS_SCALE.len())
            .map(|(idx, _)| row.votes[*idx].0.as_str())
            .collect::<Vec<&str>>()
    );

    PointsRow {
        country: row.country.clone(),
        points: row
            .votes
            .iter()
            .zip(points)
            .map(|((name, _), p)| (name.clone(), p))
            .collect(),
    }
}
