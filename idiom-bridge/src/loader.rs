use crate::error::{IdiomError, IdiomResult};
use crate::index::IdiomIndex;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Load the idiom dictionary from a JSON file
///
/// The JSON file should have the following structure:
/// ```json
/// {
///     "break the ice": "නිහඬතාව බිඳිනවා",
///     "once in a blue moon": "කලාතුරකින්"
/// }
/// ```
///
/// Entry order in the file is kept; it decides which of two equally long
/// idioms is tried first during detection.
///
/// # Errors
/// Every problem is a fatal `IdiomError::ConfigLoad`:
/// - File not found or unreadable
/// - Invalid JSON, or a root that is not an object
/// - A value that is not a string, or an empty key/value
pub fn load_idioms_from_file(path: &Path) -> IdiomResult<IdiomIndex> {
    let content = fs::read_to_string(path).map_err(|e| {
        IdiomError::ConfigLoad(format!("Failed to read file '{}': {}", path.display(), e))
    })?;

    let index = parse_idiom_mapping(&content)
        .map_err(|e| match e {
            IdiomError::ConfigLoad(msg) => {
                IdiomError::ConfigLoad(format!("{} (in '{}')", msg, path.display()))
            }
            other => other,
        })?;

    tracing::info!(
        path = %path.display(),
        idioms = index.len(),
        "loaded idiom dictionary"
    );
    Ok(index)
}

/// Build an index from the JSON text of an idiom mapping
pub fn parse_idiom_mapping(content: &str) -> IdiomResult<IdiomIndex> {
    let json: Value = serde_json::from_str(content)
        .map_err(|e| IdiomError::ConfigLoad(format!("Failed to parse JSON: {}", e)))?;

    let obj = json
        .as_object()
        .ok_or_else(|| IdiomError::ConfigLoad("Invalid JSON: root must be an object".to_string()))?;

    let mut entries = Vec::with_capacity(obj.len());
    for (english, value) in obj {
        let sinhala = value.as_str().ok_or_else(|| {
            IdiomError::ConfigLoad(format!("Idiom '{}' is not mapped to a string", english))
        })?;
        entries.push((english.as_str(), sinhala));
    }

    IdiomIndex::new(entries)
}
