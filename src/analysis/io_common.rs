use std::path::Path;

use serde_json::Value as JSValue;

use crate::analysis::*;

pub fn read_text(path: &Path) -> PollResult<String> {
    let p = path.display().to_string();
    info!("Attempting to read file {:?}", p);
    fs::read_to_string(path).context(OpeningFileSnafu { path: p })
}

pub fn read_json(path: &Path) -> PollResult<JSValue> {
    let contents = read_text(path)?;
    serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {
        path: path.display().to_string(),
    })
}

/// Writes a file, creating the missing parent directories.
pub fn write_text(path: &Path, contents: &str) -> PollResult<()> {
    ensure_parent_dir(path)?;
    fs::write(path, contents).context(WritingFileSnafu {
        path: path.display().to_string(),
    })
}

pub fn ensure_parent_dir(path: &Path) -> PollResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).context(WritingFileSnafu {
                path: parent.display().to_string(),
            })?;
        }
    }
    Ok(())
}

/// A name usable in a file name: lowercase, anything else than letters and
/// digits replaced by `_`.
pub fn file_slug(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs() {
        assert_eq!(file_slug("Sweden"), "sweden");
        assert_eq!(file_slug(" North Macedonia "), "north_macedonia");
        assert_eq!(file_slug("Rest of the World"), "rest_of_the_world");
    }
}
