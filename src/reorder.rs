//! Index-based list reordering
//!
//! Drag-and-drop in any front end reduces to moving one element from one
//! index to another.

/// Move the element at `from` so that it ends up at `to`.
///
/// Returns false and leaves the list untouched when either index is out of
/// range or both are equal.
pub fn reorder<T>(list: &mut Vec<T>, from: usize, to: usize) -> bool {
    if from == to || from >= list.len() || to >= list.len() {
        return false;
    }
    let item = list.remove(from);
    list.insert(to, item);
    true
}
