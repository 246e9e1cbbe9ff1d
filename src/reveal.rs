//! Scroll reveal: `.reveal` elements gain the `in` class the first time they
//! enter the viewport and keep it from then on.

use crate::page::Document;

pub const REVEAL_CLASS: &str = "reveal";
pub const SHOWN_CLASS: &str = "in";

/// Mark the element with `id` as shown. Returns true only on the first
/// sighting of a `.reveal` element; later sightings and unmarked elements
/// are ignored.
pub fn reveal(document: &mut Document, id: &str) -> bool {
    match document.get_mut(id) {
        Some(el) if el.has_class(REVEAL_CLASS) && !el.has_class(SHOWN_CLASS) => {
            el.add_class(SHOWN_CLASS);
            true
        }
        _ => false,
    }
}

/// Ids of `.reveal` elements not yet shown, in tree order.
pub fn pending(document: &Document) -> Vec<String> {
    let mut ids = Vec::new();
    document.root.walk(&mut |el| {
        if el.has_class(REVEAL_CLASS) && !el.has_class(SHOWN_CLASS) {
            if let Some(id) = &el.id {
                ids.push(id.clone());
            }
        }
    });
    ids
}
