pub use crate::config::*;

use log::debug;

/// Orders the authoritative countries the way the columns of a votes file
/// are laid out.
///
/// The order is alphabetical ignoring case (names that compare equal keep
/// their input order), duplicates are collapsed, and the catch-all bucket
/// [REST_OF_THE_WORLD] comes last unless the list already names it.
pub fn sorted_countries(names: &[String]) -> Vec<String> {
    let mut unique: Vec<String> = Vec::new();
    for name in names {
        if !unique.contains(name) {
            unique.push(name.clone());
        }
    }
    unique.sort_by_key(|n| n.to_lowercase());
    if !unique.iter().any(|n| n == REST_OF_THE_WORLD) {
        unique.push(REST_OF_THE_WORLD.to_string());
    }
    unique
}

/// Reads a list of countries: one per line, only the first tab-separated
/// field counts. Blank lines are ignored.
pub fn parse_country_list(text: &str) -> Vec<String> {
    text.lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .filter_map(|l| l.split('\t').next())
        .map(|s| s.trim().to_string())
        .collect()
}

/// A builder for a [VotingRecord], fed one line of the votes file at a time.
///
/// ```
/// use contest_points::builder::RecordBuilder;
///
/// let mut builder = RecordBuilder::new(&["B".to_string(), "a".to_string()]);
/// builder.add_line("Sweden\t100\t12\t0\t8");
/// let record = builder.build();
///
/// assert_eq!(record.countries(), vec!["a", "B", "Rest of the World"]);
/// assert_eq!(record.row("B").unwrap().get("Sweden"), Some(0));
/// ```
pub struct RecordBuilder {
    countries: Vec<String>,
    record: VotingRecord,
}

impl RecordBuilder {
    pub fn new(authoritative: &[String]) -> RecordBuilder {
        let countries = sorted_countries(authoritative);
        let record = VotingRecord {
            rows: countries.iter().map(|c| VoterRow::new(c)).collect(),
        };
        RecordBuilder { countries, record }
    }

    /// The voting countries, in column order.
    pub fn countries(&self) -> &[String] {
        &self.countries
    }

    /// Adds one line `name<TAB>total<TAB>v1<TAB>v2...`.
    ///
    /// The value in column `2 + i` goes to the i-th country. Missing and
    /// non-numeric values are recorded as 0: a short line silently gives
    /// nothing to the trailing countries. Negative values such as `-3` are
    /// recorded as 0 too, vote counts are never negative.
    pub fn add_line(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        let name = fields[0].trim();

        if fields.len() < self.countries.len() + 2 {
            debug!(
                "add_line: {:?} has {} vote columns for {} countries",
                name,
                fields.len().saturating_sub(2),
                self.countries.len()
            );
        }

        let mut row_sum: u64 = 0;
        for (idx, row) in self.record.rows.iter_mut().enumerate() {
            let count = fields.get(2 + idx).and_then(|s| parse_count(s)).unwrap_or(0);
            row_sum += count;
            row.set(name, count);
        }

        match fields.get(1).and_then(|s| parse_count(s)) {
            Some(total) if total != row_sum => {
                debug!(
                    "add_line: {:?} declares a total of {} but its columns sum to {}",
                    name, total, row_sum
                );
            }
            Some(_) => {}
            None => {
                debug!("add_line: {:?} has no readable total", name);
            }
        }
    }

    pub fn add_text(&mut self, text: &str) {
        for line in text.lines() {
            self.add_line(line);
        }
    }

    pub fn build(self) -> VotingRecord {
        self.record
    }
}

/// Builds the record of a whole votes file in one call.
pub fn build_record(authoritative: &[String], text: &str) -> VotingRecord {
    let mut builder = RecordBuilder::new(authoritative);
    builder.add_text(text);
    builder.build()
}

fn parse_count(s: &str) -> Option<u64> {
    s.trim().parse::<u64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(l: &[&str]) -> Vec<String> {
        l.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn columns_follow_country_order() {
        let record = build_record(&names(&["A", "B"]), "Sweden\t100\t12\t0\t8");
        assert_eq!(record.countries(), vec!["A", "B", REST_OF_THE_WORLD]);
        assert_eq!(record.row("A").unwrap().votes, vec![("Sweden".to_string(), 12)]);
        assert_eq!(record.row("B").unwrap().votes, vec![("Sweden".to_string(), 0)]);
        assert_eq!(
            record.row(REST_OF_THE_WORLD).unwrap().votes,
            vec![("Sweden".to_string(), 8)]
        );
    }

    #[test]
    fn countries_sorted_ignoring_case() {
        let sorted = sorted_countries(&names(&["spain", "Austria", "Croatia", "albania"]));
        assert_eq!(
            sorted,
            names(&["albania", "Austria", "Croatia", "spain", REST_OF_THE_WORLD])
        );
    }

    #[test]
    fn catch_all_not_duplicated() {
        let sorted = sorted_countries(&names(&["Zimbabwe", REST_OF_THE_WORLD, "Malta", "Malta"]));
        assert_eq!(sorted, names(&["Malta", REST_OF_THE_WORLD, "Zimbabwe"]));
    }

    #[test]
    fn short_line_zero_fills_trailing_countries() {
        let record = build_record(&names(&["A", "B", "C"]), "Norway\t5\t5");
        assert_eq!(record.row("A").unwrap().get("Norway"), Some(5));
        assert_eq!(record.row("B").unwrap().get("Norway"), Some(0));
        assert_eq!(record.row("C").unwrap().get("Norway"), Some(0));
        assert_eq!(record.row(REST_OF_THE_WORLD).unwrap().get("Norway"), Some(0));
    }

    #[test]
    fn bad_values_become_zero() {
        let record = build_record(&names(&["A", "B"]), "Italy\tn/a\tx\t-3\t 7 ");
        assert_eq!(record.row("A").unwrap().get("Italy"), Some(0));
        assert_eq!(record.row("B").unwrap().get("Italy"), Some(0));
        assert_eq!(record.row(REST_OF_THE_WORLD).unwrap().get("Italy"), Some(7));
    }

    #[test]
    fn negative_count_recorded_as_zero() {
        let mut builder = RecordBuilder::new(&names(&["A"]));
        assert_eq!(builder.countries(), names(&["A", REST_OF_THE_WORLD]).as_slice());
        builder.add_line("Italy	0	-3	-0");
        let record = builder.build();
        assert_eq!(record.row("A").unwrap().get("Italy"), Some(0));
        assert_eq!(record.row(REST_OF_THE_WORLD).unwrap().get("Italy"), Some(0));
    }

    #[test]
    fn name_only_line_gives_zeros() {
        let record = build_record(&names(&["A"]), "Malta");
        assert_eq!(record.row("A").unwrap().get("Malta"), Some(0));
        assert_eq!(record.row(REST_OF_THE_WORLD).unwrap().get("Malta"), Some(0));
    }

    #[test]
    fn blank_lines_skipped_and_order_kept() {
        let text = "Sweden\t3\t1\t2\n\n   \nFinland\t4\t4\t0\n";
        let record = build_record(&names(&["A"]), text);
        let row = record.row("A").unwrap();
        assert_eq!(
            row.votes,
            vec![("Sweden".to_string(), 1), ("Finland".to_string(), 4)]
        );
    }

    #[test]
    fn repeated_contestant_keeps_position() {
        let text = "Sweden\t1\t1\nFinland\t2\t2\nSweden\t9\t9";
        let record = build_record(&names(&["A"]), text);
        assert_eq!(
            record.row("A").unwrap().votes,
            vec![("Sweden".to_string(), 9), ("Finland".to_string(), 2)]
        );
    }

    #[test]
    fn country_list_uses_first_field() {
        let list = parse_country_list("Austria\textra\n\nBelgium\n  Cyprus  \n");
        assert_eq!(list, names(&["Austria", "Belgium", "Cyprus"]));
    }
}
