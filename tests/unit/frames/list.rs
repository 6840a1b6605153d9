use super::*;

fn names(list: &FrameList) -> Vec<String> {
    list.iter().map(ImageRef::display_name).collect()
}

fn list_of(names: &[&str]) -> FrameList {
    let mut list = FrameList::new();
    list.add(names.iter().map(|n| format!("/frames/{n}")));
    list
}

#[test]
fn add_skips_duplicates_and_keeps_first_seen_order() {
    let mut list = FrameList::new();
    assert_eq!(list.add(["/f/b.png", "/f/a.png", "/f/b.png"]), 2);
    assert_eq!(list.add(["/f/c.png", "/f/a.png"]), 1);
    assert_eq!(list.add(Vec::<PathBuf>::new()), 0);
    assert_eq!(names(&list), ["b.png", "a.png", "c.png"]);
}

#[test]
fn add_sets_preview_cursor_on_first_insert() {
    let mut list = FrameList::new();
    assert_eq!(list.preview_index(), None);
    list.add(["/f/a.png"]);
    assert_eq!(list.preview_index(), Some(0));
}

#[test]
fn remove_at_is_order_independent() {
    let mut a = list_of(&["0", "1", "2", "3", "4", "5"]);
    let mut b = a.clone();
    let mut c = a.clone();

    assert_eq!(a.remove_at([1, 3, 4]), 3);
    assert_eq!(b.remove_at([4, 1, 3]), 3);
    assert_eq!(c.remove_at([3, 4, 1, 3]), 3);

    assert_eq!(names(&a), ["0", "2", "5"]);
    assert_eq!(names(&a), names(&b));
    assert_eq!(names(&a), names(&c));
}

#[test]
fn remove_at_ignores_out_of_range_and_clears_selection() {
    let mut list = list_of(&["0", "1", "2"]);
    list.set_selection([0, 2]);
    assert_eq!(list.remove_at([9]), 0);
    assert_eq!(list.selection().len(), 2);

    assert_eq!(list.remove_at([2, 7]), 1);
    assert!(list.selection().is_empty());
    assert_eq!(names(&list), ["0", "1"]);
}

#[test]
fn removed_paths_can_be_added_again() {
    let mut list = list_of(&["a", "b"]);
    list.remove_at([0]);
    assert!(!list.contains("/frames/a"));
    assert_eq!(list.add(["/frames/a"]), 1);
    assert_eq!(names(&list), ["b", "a"]);
}

#[test]
fn remove_clamps_preview_cursor() {
    let mut list = list_of(&["0", "1", "2", "3"]);
    assert!(list.set_preview(3));
    list.remove_at([2, 3]);
    assert_eq!(list.preview_index(), Some(1));

    list.remove_at([0, 1]);
    assert_eq!(list.preview_index(), None);
    assert!(list.is_empty());
}

#[test]
fn move_one_swaps_with_neighbour() {
    let mut list = list_of(&["a", "b", "c"]);
    list.set_selection([0]);
    assert!(list.move_one(0, MoveDirection::Down));
    assert_eq!(names(&list), ["b", "a", "c"]);
    assert_eq!(list.single_selection(), Some(1));
}

#[test]
fn move_down_then_up_restores_order() {
    let original = list_of(&["a", "b", "c", "d"]);
    let mut list = original.clone();
    list.set_selection([1]);
    assert!(list.move_one(1, MoveDirection::Down));
    assert!(list.move_one(2, MoveDirection::Up));
    assert_eq!(names(&list), names(&original));
}

#[test]
fn move_one_requires_single_selection_and_valid_target() {
    let mut list = list_of(&["a", "b", "c"]);

    assert!(!list.move_one(1, MoveDirection::Up));

    list.set_selection([0, 1]);
    assert!(!list.move_one(0, MoveDirection::Down));

    list.set_selection([0]);
    assert!(!list.move_one(0, MoveDirection::Up));

    list.set_selection([2]);
    assert!(!list.move_one(2, MoveDirection::Down));

    assert_eq!(names(&list), ["a", "b", "c"]);
}

#[test]
fn move_one_only_moves_the_selected_item() {
    let mut list = list_of(&["a", "b", "c"]);
    list.set_selection([0]);
    assert!(!list.move_one(1, MoveDirection::Down));
    assert_eq!(names(&list), ["a", "b", "c"]);
    assert_eq!(list.single_selection(), Some(0));
}

#[test]
fn move_selected_uses_the_selected_index() {
    let mut list = list_of(&["a", "b", "c"]);
    list.set_selection([2]);
    assert!(list.move_selected(MoveDirection::Up));
    assert_eq!(names(&list), ["a", "c", "b"]);
    assert!(list.move_selected(MoveDirection::Up));
    assert_eq!(names(&list), ["c", "a", "b"]);
    assert!(!list.move_selected(MoveDirection::Up));
}

#[test]
fn preview_cursor_follows_swapped_items() {
    let mut list = list_of(&["a", "b", "c"]);
    list.set_preview(1);
    list.set_selection([1]);
    list.move_one(1, MoveDirection::Down);
    assert_eq!(list.preview_index(), Some(2));

    list.set_preview(1);
    list.move_one(2, MoveDirection::Up);
    assert_eq!(list.preview_index(), Some(2));
}

#[test]
fn selection_is_filtered_to_valid_indices() {
    let mut list = list_of(&["a", "b"]);
    list.set_selection([1, 5, 0]);
    assert_eq!(list.selection().iter().copied().collect::<Vec<_>>(), [0, 1]);

    list.select_all();
    assert_eq!(list.selection().len(), 2);
    assert_eq!(list.remove_selected(), 2);
    assert!(list.is_empty());

    list.deselect_all();
    assert!(list.selection().is_empty());
}

#[test]
fn empty_list_operations_are_noops() {
    let mut list = FrameList::new();
    list.select_all();
    assert!(list.selection().is_empty());
    assert_eq!(list.remove_at([0, 1]), 0);
    assert!(!list.move_selected(MoveDirection::Down));
    list.preview_next();
    list.preview_last();
    assert_eq!(list.preview_index(), None);
    assert!(list.snapshot().is_empty());
}

#[test]
fn snapshot_is_insulated_from_later_edits() {
    let mut list = list_of(&["a", "b", "c"]);
    let snap = list.snapshot();
    list.remove_at([0]);
    list.add(["/frames/z"]);

    assert_eq!(snap.len(), 3);
    assert_eq!(snap.get(0).unwrap().display_name(), "a");
    assert_eq!(snap.head(2).len(), 2);
    assert_eq!(snap.head(10).len(), 3);
}

#[test]
fn preview_navigation_saturates() {
    let mut list = list_of(&["a", "b", "c"]);
    list.preview_previous();
    assert_eq!(list.preview_index(), Some(0));
    list.preview_last();
    list.preview_next();
    assert_eq!(list.preview_index(), Some(2));
    list.preview_first();
    assert_eq!(list.preview_item().unwrap().display_name(), "a");
}

#[test]
fn relative_paths_are_made_absolute() {
    let r = ImageRef::new("frame.png");
    assert!(r.path().is_absolute());
    assert_eq!(r.display_name(), "frame.png");
}
