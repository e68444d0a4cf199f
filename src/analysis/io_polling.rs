// Reader for the polling files: a vote count line, then a contestant line.

use crate::analysis::{io_common::read_text, *};

/// Reads the polling of a year, sorted by votes, highest first. Contestants
/// with the same number of votes stay in file order.
pub fn read_polling(path: &Path) -> PollResult<Vec<(String, u64)>> {
    let contents = read_text(path)?;
    let mut polling = parse_polling(&contents, path.display().to_string().as_str())?;
    polling.sort_by(|a, b| b.1.cmp(&a.1));
    debug!("read_polling: {:?}: {:?}", path, polling);
    Ok(polling)
}

pub fn parse_polling(contents: &str, path: &str) -> PollResult<Vec<(String, u64)>> {
    let mut lines: Vec<&str> = contents.lines().collect();
    while lines.last().map(|l| l.trim().is_empty()).unwrap_or(false) {
        lines.pop();
    }

    let mut res: Vec<(String, u64)> = Vec::new();
    for (idx, pair) in lines.chunks(2).enumerate() {
        let lineno = 2 * idx + 1;
        let count = pair[0]
            .replace(',', "")
            .trim()
            .parse::<u64>()
            .ok()
            .context(PollingCountSnafu {
                path,
                lineno,
                content: pair[0],
            })?;
        let name = pair
            .get(1)
            .map(|s| s.trim())
            .context(PollingMissingNameSnafu { path, lineno })?;
        // A contestant polled twice keeps its first position.
        match res.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = count,
            None => res.push((name.to_string(), count)),
        }
    }
    Ok(res)
}
