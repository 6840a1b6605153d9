//! Resolve batch inputs: a directory of images or a newline-delimited file list.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobMatcher};

use crate::foundation::error::{InputError, ReelError, ReelResult};
use crate::frames::list::FrameList;
use crate::project::read_file_list;

/// Extensions picked up when a directory is scanned without a pattern, in scan order.
pub const DEFAULT_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "tif", "tiff", "bmp"];

/// Compile a shell-style file-name glob (`*`, `?`, `[...]`, `{a,b}`).
pub fn file_name_matcher(pattern: &str) -> ReelResult<GlobMatcher> {
    let glob = Glob::new(pattern)
        .map_err(|e| ReelError::validation(format!("bad pattern '{pattern}': {e}")))?;
    Ok(glob.compile_matcher())
}

fn sorted_files(dir: &Path) -> ReelResult<Vec<(OsString, PathBuf)>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(|e| ReelError::io(dir, e))? {
        let entry = entry.map_err(|e| ReelError::io(dir, e))?;
        let path = entry.path();
        if path.is_file() {
            files.push((entry.file_name(), path));
        }
    }
    files.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(files)
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

/// List image files in `dir`.
///
/// With a pattern, every file whose name matches is returned in name order. Without one, files
/// are grouped by [`DEFAULT_EXTENSIONS`] order and name-sorted within each group.
pub fn scan_directory(dir: &Path, pattern: Option<&str>) -> ReelResult<Vec<PathBuf>> {
    let files = sorted_files(dir)?;
    let out: Vec<PathBuf> = match pattern {
        Some(p) => {
            let matcher = file_name_matcher(p)?;
            files
                .into_iter()
                .filter(|(name, _)| matcher.is_match(name))
                .map(|(_, path)| path)
                .collect()
        }
        None => DEFAULT_EXTENSIONS
            .iter()
            .flat_map(|ext| {
                files
                    .iter()
                    .filter(move |(_, path)| has_extension(path, ext))
                    .map(|(_, path)| path.clone())
            })
            .collect(),
    };
    tracing::debug!(dir = %dir.display(), ?pattern, found = out.len(), "scanned directory");
    Ok(out)
}

/// `input` is a directory to scan or a file list to read. Fails with `NoFiles` when nothing resolves.
pub fn resolve_inputs(input: &Path, pattern: Option<&str>) -> ReelResult<Vec<PathBuf>> {
    let files = if input.is_dir() {
        scan_directory(input, pattern)?
    } else {
        read_file_list(input)?
    };
    if files.is_empty() {
        return Err(InputError::NoFiles.into());
    }
    Ok(files)
}

/// Append a directory's matching files to `list`; returns how many were new.
pub fn import_sequence(list: &mut FrameList, dir: &Path, pattern: &str) -> ReelResult<usize> {
    let files = scan_directory(dir, Some(pattern))?;
    if files.is_empty() {
        return Err(InputError::NoFiles.into());
    }
    Ok(list.add(files))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, names: &[&str]) {
        for n in names {
            std::fs::write(dir.join(n), b"").unwrap();
        }
    }

    fn file_names(paths: &[PathBuf]) -> Vec<String> {
        paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn file_name_globs() {
        let m = file_name_matcher("frame_*.png").unwrap();
        assert!(m.is_match("frame_0001.png"));
        assert!(!m.is_match("frame_0001xpng"));
        assert!(!m.is_match("old_frame_1.png"));

        let q = file_name_matcher("f?.(1).png").unwrap();
        assert!(q.is_match("fa.(1).png"));
        assert!(!q.is_match("fab.(1).png"));

        assert!(file_name_matcher("f[1-").is_err());
    }

    #[test]
    fn pattern_scan_honours_character_classes() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), &["f1.png", "f2.png", "f3.png"]);
        let found = scan_directory(dir.path(), Some("f[12].png")).unwrap();
        assert_eq!(file_names(&found), ["f1.png", "f2.png"]);

        let found = scan_directory(dir.path(), Some("f{1,3}.png")).unwrap();
        assert_eq!(file_names(&found), ["f1.png", "f3.png"]);
    }

    #[test]
    fn default_scan_groups_by_extension_then_name() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), &["b.jpg", "c.png", "a.png", "a.bmp", "notes.txt"]);
        std::fs::create_dir(dir.path().join("sub.png")).unwrap();

        let found = scan_directory(dir.path(), None).unwrap();
        assert_eq!(file_names(&found), ["a.png", "c.png", "b.jpg", "a.bmp"]);
    }

    #[test]
    fn pattern_scan_is_name_sorted() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), &["f_10.png", "f_02.png", "g_01.png", "f_01.jpg"]);
        let found = scan_directory(dir.path(), Some("f_*.png")).unwrap();
        assert_eq!(file_names(&found), ["f_02.png", "f_10.png"]);
    }

    #[test]
    fn resolve_reads_file_lists_and_rejects_empty_input() {
        let dir = tempfile::tempdir().unwrap();
        let list = dir.path().join("list.txt");
        std::fs::write(&list, "/x/1.png\n\n  /x/2.png  \n").unwrap();
        let found = resolve_inputs(&list, None).unwrap();
        assert_eq!(found, [PathBuf::from("/x/1.png"), PathBuf::from("/x/2.png")]);

        let empty = dir.path().join("empty");
        std::fs::create_dir(&empty).unwrap();
        assert!(matches!(
            resolve_inputs(&empty, None),
            Err(ReelError::Input(InputError::NoFiles))
        ));
        assert!(matches!(
            resolve_inputs(&dir.path().join("missing.txt"), None),
            Err(ReelError::Io { .. })
        ));
    }

    #[test]
    fn import_sequence_appends_without_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), &["s_1.png", "s_2.png"]);
        let mut list = FrameList::new();
        assert_eq!(import_sequence(&mut list, dir.path(), "s_*.png").unwrap(), 2);
        assert_eq!(import_sequence(&mut list, dir.path(), "*.png").unwrap(), 0);
        assert!(import_sequence(&mut list, dir.path(), "*.tif").is_err());
    }
}
