use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Absolute path of one still image in playback order.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageRef(PathBuf);

impl ImageRef {
    /// Build a reference, making relative paths absolute against the current directory.
    ///
    /// Does not touch the filesystem: the path is neither canonicalized nor checked.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let abs = std::path::absolute(&path).unwrap_or(path);
        Self(abs)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }

    /// File name for display, falling back to the full path.
    pub fn display_name(&self) -> String {
        self.0
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.0.display().to_string())
    }
}

impl AsRef<Path> for ImageRef {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

/// Direction for [`FrameList::move_one`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveDirection {
    /// Towards index 0.
    Up,
    /// Towards the end of the list.
    Down,
}

impl MoveDirection {
    fn target(self, index: usize) -> Option<usize> {
        match self {
            Self::Up => index.checked_sub(1),
            Self::Down => index.checked_add(1),
        }
    }
}

/// Immutable, cheaply cloneable copy of a [`FrameList`]'s contents.
///
/// Jobs only ever see a snapshot, so edits to the live list after a job starts do not reach it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameSnapshot(Arc<[ImageRef]>);

impl FrameSnapshot {
    pub fn from_refs(refs: impl IntoIterator<Item = ImageRef>) -> Self {
        Self(refs.into_iter().collect())
    }

    /// Build a snapshot from raw paths without deduplication.
    pub fn from_paths<P: Into<PathBuf>>(paths: impl IntoIterator<Item = P>) -> Self {
        Self::from_refs(paths.into_iter().map(ImageRef::new))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ImageRef> {
        self.0.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ImageRef> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[ImageRef] {
        &self.0
    }

    /// First `n` frames (or all of them when shorter).
    pub fn head(&self, n: usize) -> Self {
        if n >= self.0.len() {
            return self.clone();
        }
        Self(self.0[..n].iter().cloned().collect())
    }
}

/// Ordered, deduplicated list of images with a selection and a preview cursor.
///
/// Insertion order is playback order. Selection indices always point at valid positions:
/// removals and reorders rebuild or clear the selection.
#[derive(Clone, Debug, Default)]
pub struct FrameList {
    items: Vec<ImageRef>,
    seen: HashSet<ImageRef>,
    selection: BTreeSet<usize>,
    preview: Option<usize>,
}

impl FrameList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append every path not already present, in the order given. Returns how many were added.
    pub fn add<P: Into<PathBuf>>(&mut self, paths: impl IntoIterator<Item = P>) -> usize {
        let mut added = 0usize;
        for p in paths {
            let r = ImageRef::new(p);
            if self.seen.contains(&r) {
                continue;
            }
            self.seen.insert(r.clone());
            self.items.push(r);
            added += 1;
        }
        if added > 0 && self.preview.is_none() {
            self.preview = Some(0);
        }
        added
    }

    /// Remove every listed position at once.
    ///
    /// The result is computed by exclusion, so the order (and duplication) of `indices` does not
    /// matter. Out-of-range indices are ignored. Returns how many items were removed.
    pub fn remove_at(&mut self, indices: impl IntoIterator<Item = usize>) -> usize {
        let drop: HashSet<usize> = indices
            .into_iter()
            .filter(|&i| i < self.items.len())
            .collect();
        if drop.is_empty() {
            return 0;
        }

        let before = self.items.len();
        let kept: Vec<ImageRef> = std::mem::take(&mut self.items)
            .into_iter()
            .enumerate()
            .filter_map(|(i, r)| (!drop.contains(&i)).then_some(r))
            .collect();
        self.items = kept;
        self.seen = self.items.iter().cloned().collect();
        self.selection.clear();

        self.preview = match (self.preview, self.items.len()) {
            (_, 0) => None,
            (Some(p), n) => Some(p.min(n - 1)),
            (None, _) => Some(0),
        };

        before - self.items.len()
    }

    /// Remove the currently selected items.
    pub fn remove_selected(&mut self) -> usize {
        let sel: Vec<usize> = self.selection.iter().copied().collect();
        self.remove_at(sel)
    }

    /// Swap the item at `index` with its neighbour in `direction`.
    ///
    /// Only acts when `index` is the single selected item and the neighbour exists; returns
    /// whether the list changed. The selection follows the moved item.
    pub fn move_one(&mut self, index: usize, direction: MoveDirection) -> bool {
        if self.single_selection() != Some(index) || index >= self.items.len() {
            return false;
        }
        let Some(target) = direction.target(index) else {
            return false;
        };
        if target >= self.items.len() {
            return false;
        }

        self.items.swap(index, target);
        self.selection.clear();
        self.selection.insert(target);

        if self.preview == Some(index) {
            self.preview = Some(target);
        } else if self.preview == Some(target) {
            self.preview = Some(index);
        }
        true
    }

    /// [`Self::move_one`] applied to the single selected item.
    pub fn move_selected(&mut self, direction: MoveDirection) -> bool {
        match self.single_selection() {
            Some(i) => self.move_one(i, direction),
            None => false,
        }
    }

    pub fn select_all(&mut self) {
        self.selection = (0..self.items.len()).collect();
    }

    pub fn deselect_all(&mut self) {
        self.selection.clear();
    }

    /// Replace the selection; out-of-range indices are dropped.
    pub fn set_selection(&mut self, indices: impl IntoIterator<Item = usize>) {
        let n = self.items.len();
        self.selection = indices.into_iter().filter(|&i| i < n).collect();
    }

    pub fn selection(&self) -> &BTreeSet<usize> {
        &self.selection
    }

    pub fn single_selection(&self) -> Option<usize> {
        if self.selection.len() == 1 {
            self.selection.first().copied()
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn at(&self, index: usize) -> Option<&ImageRef> {
        self.items.get(index)
    }

    pub fn contains(&self, path: impl Into<PathBuf>) -> bool {
        self.seen.contains(&ImageRef::new(path))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ImageRef> {
        self.items.iter()
    }

    pub fn snapshot(&self) -> FrameSnapshot {
        FrameSnapshot::from_refs(self.items.iter().cloned())
    }

    /// Drop everything, including selection and preview cursor.
    pub fn clear(&mut self) {
        self.items.clear();
        self.seen.clear();
        self.selection.clear();
        self.preview = None;
    }

    // Preview cursor. `None` only while the list is empty.

    pub fn preview_index(&self) -> Option<usize> {
        self.preview
    }

    pub fn preview_item(&self) -> Option<&ImageRef> {
        self.preview.and_then(|i| self.items.get(i))
    }

    pub fn set_preview(&mut self, index: usize) -> bool {
        if index < self.items.len() {
            self.preview = Some(index);
            true
        } else {
            false
        }
    }

    pub fn preview_first(&mut self) {
        if !self.items.is_empty() {
            self.preview = Some(0);
        }
    }

    pub fn preview_last(&mut self) {
        if let Some(last) = self.items.len().checked_sub(1) {
            self.preview = Some(last);
        }
    }

    pub fn preview_next(&mut self) {
        if let (Some(p), Some(last)) = (self.preview, self.items.len().checked_sub(1)) {
            self.preview = Some((p + 1).min(last));
        }
    }

    pub fn preview_previous(&mut self) {
        if let Some(p) = self.preview {
            self.preview = Some(p.saturating_sub(1));
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/frames/list.rs"]
mod tests;
