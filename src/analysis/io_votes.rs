// Readers and writers for the per-country vote files.

use contest_points::builder::{parse_country_list, RecordBuilder};
use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;

use crate::analysis::{
    io_common::{read_json, read_text, write_text},
    *,
};

pub fn read_countries(path: &Path) -> PollResult<Vec<String>> {
    let countries = parse_country_list(&read_text(path)?);
    debug!("read_countries: {:?}: {:?}", path, countries);
    Ok(countries)
}

pub fn read_votes(path: &Path, countries: &[String]) -> PollResult<VotingRecord> {
    let contents = read_text(path)?;
    let mut builder = RecordBuilder::new(countries);
    debug!("read_votes: column order {:?}", builder.countries());
    builder.add_text(&contents);
    Ok(builder.build())
}

pub fn record_to_json(record: &VotingRecord) -> JSValue {
    let mut countries: JSMap<String, JSValue> = JSMap::new();
    for row in record.rows.iter() {
        let mut votes: JSMap<String, JSValue> = JSMap::new();
        for (name, count) in row.votes.iter() {
            votes.insert(name.clone(), json!(count));
        }
        countries.insert(row.country.clone(), JSValue::Object(votes));
    }
    JSValue::Object(countries)
}

pub fn record_from_json(js: &JSValue, path: &str) -> PollResult<VotingRecord> {
    let countries = js.as_object().context(MalformedResultsSnafu { path })?;
    let mut record = VotingRecord::new();
    for (country, votes) in countries.iter() {
        let votes = votes.as_object().context(MalformedResultsSnafu { path })?;
        let row = record.row_mut(country);
        for (name, count) in votes.iter() {
            let count = read_js_count(count).context(MalformedResultsSnafu { path })?;
            row.set(name, count);
        }
    }
    Ok(record)
}

// Counts written by other tools may come out as floats (`12.0`).
fn read_js_count(x: &JSValue) -> Option<u64> {
    match x {
        JSValue::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| *f >= 0.0 && *f < u64::MAX as f64 && f.fract() == 0.0)
                .map(|f| f as u64)
        }),
        _ => None,
    }
}

/// Writes the intermediate record of a year as pretty-printed JSON.
pub fn write_record(path: &Path, record: &VotingRecord) -> PollResult<()> {
    let js = record_to_json(record);
    let pretty = serde_json::to_string_pretty(&js).context(SerializingJsonSnafu {})?;
    write_text(path, &pretty)
}

pub fn read_record(path: &Path) -> PollResult<VotingRecord> {
    let js = read_json(path)?;
    record_from_json(&js, path.display().to_string().as_str())
}
