/// Ordered image list with selection, reordering and snapshots.
pub mod list;
