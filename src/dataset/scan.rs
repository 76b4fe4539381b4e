use std::fs;
use std::path::Path;

use super::DatasetError;

/// True when `path` ends in one of `extensions` (lowercase, without dots).
pub fn has_audio_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|allowed| ext.eq_ignore_ascii_case(allowed)))
}

/// List track file names directly inside `dir`, sorted ascending.
///
/// The sort order is the label order, so it must stay a plain string sort.
pub fn list_audio_files(dir: &Path, extensions: &[String]) -> Result<Vec<String>, DatasetError> {
    if !dir.is_dir() {
        return Err(DatasetError::NotADirectory(dir.to_path_buf()));
    }
    let read_err = |source| DatasetError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };
    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_err)? {
        let entry = entry.map_err(read_err)?;
        let path = entry.path();
        if !path.is_file() || !has_audio_extension(&path, extensions) {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => names.push(name),
            Err(raw) => tracing::warn!("Ignoring non-UTF-8 file name {:?}", raw),
        }
    }
    names.sort();
    Ok(names)
}
