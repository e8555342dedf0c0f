//! R-tree backed hit testing for rendered element rectangles.
//!
//! [`super::MemoryHost`] builds one index per lookup from its element tree
//! and asks it for the element under a pointer sample.

use crate::geometry::{ElementId, Point, Rect};
use rstar::{AABB, RTree, RTreeObject};

/// One element's rendered rectangle and its place in the tree.
#[derive(Debug, Clone, Copy)]
pub(crate) struct HitEntry {
    element: ElementId,
    depth: usize,
    /// Document order, used to break ties between siblings
    order: usize,
    rect: Rect,
}

impl HitEntry {
    pub(crate) fn new(element: ElementId, depth: usize, order: usize, rect: Rect) -> Self {
        Self {
            element,
            depth,
            order,
            rect,
        }
    }

    fn contains(&self, point: Point) -> bool {
        point.x >= self.rect.x
            && point.x <= self.rect.right()
            && point.y >= self.rect.y
            && point.y <= self.rect.bottom()
    }
}

impl RTreeObject for HitEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(
            [self.rect.x, self.rect.y],
            [self.rect.right(), self.rect.bottom()],
        )
    }
}

pub(crate) struct HitIndex {
    tree: RTree<HitEntry>,
}

impl HitIndex {
    pub(crate) fn build(entries: impl IntoIterator<Item = HitEntry>) -> Self {
        Self {
            tree: RTree::bulk_load(entries.into_iter().collect()),
        }
    }

    /// The deepest element under `point`; later siblings win ties, the way
    /// later siblings paint on top.
    pub(crate) fn topmost(&self, point: Point) -> Option<ElementId> {
        let envelope = AABB::from_point([point.x, point.y]);
        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .filter(|entry| entry.contains(point))
            .max_by_key(|entry| (entry.depth, entry.order))
            .map(|entry| entry.element)
    }
}
