//! Small JSON file store helpers shared by the ledger and subscriber state.
//!
//! Writes go through a temp file followed by a rename so a crash mid-write
//! never leaves a truncated state file behind.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Read a JSON file into `T`, returning `T::default()` when the file does
/// not exist yet.
pub(crate) fn read_json_or_default<T>(path: &Path) -> anyhow::Result<T>
where
    T: DeserializeOwned + Default,
{
    if !path.exists() {
        return Ok(T::default());
    }
    let data = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

/// Serialize `value` as pretty JSON and replace `path` atomically
/// (write-temp-then-rename, best effort).
pub(crate) fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(value)?;

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = std::path::PathBuf::from(tmp);

    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn missing_file_reads_as_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.json");
        let map: HashMap<String, i64> = read_json_or_default(&path).unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn write_then_read_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        let mut map = HashMap::new();
        map.insert("g1_Kzarka_30".to_string(), 1_750_000_000i64);
        write_json_atomic(&path, &map).unwrap();

        let back: HashMap<String, i64> = read_json_or_default(&path).unwrap();
        assert_eq!(back, map);
    }

    #[test]
    fn write_leaves_no_temp_file_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        write_json_atomic(&path, &vec![1, 2, 3]).unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("state.json")]);
    }

    #[test]
    fn write_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/state.json");
        write_json_atomic(&path, &42u32).unwrap();
        let back: u32 = read_json_or_default(&path).unwrap();
        assert_eq!(back, 42);
    }
}
