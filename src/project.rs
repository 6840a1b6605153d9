//! Persisted project state and plain-text file lists.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write as _};
use std::path::{Path, PathBuf};

use crate::encode::codec::OutputSettings;
use crate::foundation::error::{ReelError, ReelResult};
use crate::frames::list::{FrameList, ImageRef};

/// On-disk project record. Missing fields load as their defaults.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Project {
    #[serde(default)]
    pub image_files: Vec<PathBuf>,
    #[serde(default)]
    pub output_settings: OutputSettings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<String>,
}

impl Project {
    pub fn from_frame_list(list: &FrameList, settings: &OutputSettings) -> Self {
        Self {
            image_files: list.iter().map(|r| r.path().to_path_buf()).collect(),
            output_settings: settings.clone(),
            saved_at: None,
        }
    }

    /// Rebuild the frame list. Duplicate entries collapse to their first occurrence.
    pub fn to_frame_list(&self) -> FrameList {
        let mut list = FrameList::new();
        list.add(self.image_files.iter().cloned());
        list
    }

    pub fn load(path: &Path) -> ReelResult<Self> {
        let f = File::open(path).map_err(|e| ReelError::io(path, e))?;
        let project: Self = serde_json::from_reader(BufReader::new(f)).map_err(|e| {
            ReelError::serde(format!("parse project '{}': {e}", path.display()))
        })?;
        tracing::debug!(
            path = %path.display(),
            images = project.image_files.len(),
            "loaded project"
        );
        Ok(project)
    }

    /// Stamp `saved_at` with the local time and write pretty-printed JSON.
    pub fn save(&mut self, path: &Path) -> ReelResult<()> {
        self.saved_at = Some(chrono::Local::now().to_rfc3339());
        let f = File::create(path).map_err(|e| ReelError::io(path, e))?;
        let mut w = BufWriter::new(f);
        serde_json::to_writer_pretty(&mut w, self)
            .map_err(|e| ReelError::serde(format!("write project '{}': {e}", path.display())))?;
        w.flush().map_err(|e| ReelError::io(path, e))?;
        Ok(())
    }
}

/// Write one path per line.
pub fn export_file_list<'a>(
    path: &Path,
    images: impl IntoIterator<Item = &'a ImageRef>,
) -> ReelResult<usize> {
    let f = File::create(path).map_err(|e| ReelError::io(path, e))?;
    let mut w = BufWriter::new(f);
    let mut n = 0usize;
    for image in images {
        writeln!(w, "{}", image.path().display()).map_err(|e| ReelError::io(path, e))?;
        n += 1;
    }
    w.flush().map_err(|e| ReelError::io(path, e))?;
    Ok(n)
}

/// Read a newline-delimited list, trimming whitespace and skipping blank lines.
pub fn read_file_list(path: &Path) -> ReelResult<Vec<PathBuf>> {
    let text = std::fs::read_to_string(path).map_err(|e| ReelError::io(path, e))?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(PathBuf::from)
        .collect())
}

/// Replace the contents of `list` with the files named in `path` that exist.
pub fn import_file_list(list: &mut FrameList, path: &Path) -> ReelResult<usize> {
    let paths = read_file_list(path)?;
    list.clear();
    Ok(list.add(paths.into_iter().filter(|p| p.is_file())))
}
