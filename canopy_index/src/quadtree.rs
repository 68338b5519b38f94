// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Quad tree over element bounds.
//!
//! ## Placement
//!
//! An element descends into the child quadrant whose boundary fully contains
//! its bounds. Elements that straddle a split line, or that lie partly or
//! entirely outside the root boundary, stay in the deepest node that can take
//! them. Each element lives in exactly one node, so queries never report it
//! twice.
//!
//! ## Ordering
//!
//! Queries walk parent before children, children in quadrant order
//! (top-left, top-right, bottom-left, bottom-right), and elements in insertion
//! order within a node. Event dispatch relies on this order for determinism.
//!
//! ## Growth
//!
//! Nodes are never merged back after removals. [`QuadTree::update_boundary`]
//! is the reset path; it drops the whole structure.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt::Debug;

use smallvec::SmallVec;

use crate::types::{Bounded, Rectangle, Scalar};

/// Tuning knobs for [`QuadTree`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct QuadTreeConfig {
    /// Elements a leaf holds before it subdivides.
    pub capacity: usize,
    /// Nodes at this depth never subdivide and may exceed `capacity`.
    pub max_depth: usize,
}

impl Default for QuadTreeConfig {
    fn default() -> Self {
        Self {
            capacity: 4,
            max_depth: 8,
        }
    }
}

impl QuadTreeConfig {
    /// Create a config with the given leaf capacity and the default depth limit.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }
}

struct Node<E, T: Scalar> {
    boundary: Rectangle<T>,
    depth: usize,
    elements: SmallVec<[E; 4]>,
    children: Option<Box<[Node<E, T>; 4]>>,
}

impl<E: Bounded<T>, T: Scalar> Node<E, T> {
    fn new(boundary: Rectangle<T>, depth: usize) -> Self {
        Self {
            boundary,
            depth,
            elements: SmallVec::new(),
            children: None,
        }
    }

    fn insert(&mut self, element: E, bounds: Rectangle<T>, config: &QuadTreeConfig) {
        if let Some(children) = self.children.as_deref_mut() {
            match children
                .iter_mut()
                .find(|c| c.boundary.contains_rect(&bounds))
            {
                Some(child) => child.insert(element, bounds, config),
                None => self.elements.push(element),
            }
            return;
        }

        if self.elements.len() < config.capacity.max(1) || self.depth >= config.max_depth {
            self.elements.push(element);
            return;
        }

        self.subdivide();
        for existing in core::mem::take(&mut self.elements) {
            let b = existing.bounds();
            self.insert(existing, b, config);
        }
        self.insert(element, bounds, config);
    }

    fn subdivide(&mut self) {
        let depth = self.depth + 1;
        let [tl, tr, bl, br] = self.boundary.quadrants();
        self.children = Some(Box::new([
            Self::new(tl, depth),
            Self::new(tr, depth),
            Self::new(bl, depth),
            Self::new(br, depth),
        ]));
    }

    fn remove(&mut self, element: &E) -> bool
    where
        E: PartialEq,
    {
        if let Some(pos) = self.elements.iter().position(|e| e == element) {
            self.elements.remove(pos);
            return true;
        }
        self.children
            .as_deref_mut()
            .is_some_and(|children| children.iter_mut().any(|c| c.remove(element)))
    }

    fn visit_point<F: FnMut(&E)>(&self, x: T, y: T, f: &mut F) {
        for e in &self.elements {
            if e.bounds().contains_point(x, y) {
                f(e);
            }
        }
        if let Some(children) = self.children.as_deref() {
            for c in children {
                if c.boundary.contains_point(x, y) {
                    c.visit_point(x, y, f);
                }
            }
        }
    }

    fn visit_rect<F: FnMut(&E)>(&self, rect: &Rectangle<T>, f: &mut F) {
        for e in &self.elements {
            if e.bounds().intersects(rect) {
                f(e);
            }
        }
        if let Some(children) = self.children.as_deref() {
            for c in children {
                if c.boundary.intersects(rect) {
                    c.visit_rect(rect, f);
                }
            }
        }
    }

    fn visit_all<F: FnMut(&E)>(&self, f: &mut F) {
        self.elements.iter().for_each(&mut *f);
        if let Some(children) = self.children.as_deref() {
            for c in children {
                c.visit_all(f);
            }
        }
    }

    fn max_depth(&self) -> usize {
        self.children.as_deref().map_or(self.depth, |children| {
            children.iter().map(Self::max_depth).max().unwrap_or(self.depth)
        })
    }

    fn node_count(&self) -> usize {
        1 + self
            .children
            .as_deref()
            .map_or(0, |children| children.iter().map(Self::node_count).sum())
    }
}

/// Hierarchical partition of a 2D region indexing elements by their bounds.
///
/// ## Usage
///
/// - Create with [`QuadTree::new`] sized to the canvas, or
///   [`QuadTree::with_config`] to tune capacity and depth.
/// - [`QuadTree::insert`] and [`QuadTree::remove`] mutate in place. Inserting
///   the same element twice stores it twice; callers must not double-insert.
/// - [`QuadTree::query_point`] for hit testing and [`QuadTree::query`] for
///   visible-region culling.
/// - On resize, call [`QuadTree::update_boundary`] and re-insert every element.
///
/// Element bounds are read at insertion time to pick a node and again on every
/// query to filter results. If an element's bounds change, remove and
/// re-insert it ([`QuadTree::reinsert`]) to keep queries exact.
///
/// ## Example
///
/// ```rust
/// use canopy_index::{QuadTree, Rectangle};
///
/// let mut tree = QuadTree::new(Rectangle::new(0.0, 0.0, 800.0, 600.0));
/// tree.insert(("a", Rectangle::new(10.0, 10.0, 50.0, 50.0)));
///
/// let hits = tree.query_point(30.0, 30.0);
/// assert_eq!(hits.len(), 1);
/// assert_eq!(hits[0].0, "a");
/// assert!(tree.query_point(500.0, 500.0).is_empty());
/// ```
pub struct QuadTree<E, T: Scalar = f64> {
    root: Node<E, T>,
    config: QuadTreeConfig,
    len: usize,
}

impl<E, T: Scalar> Debug for QuadTree<E, T>
where
    E: Bounded<T>,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("QuadTree")
            .field("boundary", &self.root.boundary)
            .field("config", &self.config)
            .field("len", &self.len)
            .field("nodes", &self.root.node_count())
            .finish_non_exhaustive()
    }
}

impl<E: Bounded<T> + Clone + PartialEq, T: Scalar> QuadTree<E, T> {
    /// Create an empty tree covering `boundary` with the default configuration.
    pub fn new(boundary: Rectangle<T>) -> Self {
        Self::with_config(boundary, QuadTreeConfig::default())
    }

    /// Create an empty tree with an explicit configuration.
    pub fn with_config(boundary: Rectangle<T>, config: QuadTreeConfig) -> Self {
        Self {
            root: Node::new(boundary, 0),
            config,
            len: 0,
        }
    }

    /// The root boundary.
    pub fn boundary(&self) -> Rectangle<T> {
        self.root.boundary
    }

    /// The configuration in use.
    pub fn config(&self) -> QuadTreeConfig {
        self.config
    }

    /// Number of stored elements.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the tree holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Depth of the deepest node (0 for an undivided root).
    pub fn depth(&self) -> usize {
        self.root.max_depth()
    }

    /// Insert an element.
    pub fn insert(&mut self, element: E) {
        let bounds = element.bounds();
        self.root.insert(element, bounds, &self.config);
        self.len += 1;
    }

    /// Remove the first stored element equal to `element`.
    ///
    /// Returns `false` (and does nothing) if the element is not present.
    pub fn remove(&mut self, element: &E) -> bool {
        let removed = self.root.remove(element);
        if removed {
            self.len -= 1;
        }
        removed
    }

    /// Remove and insert again so the element is placed by its current bounds.
    ///
    /// Returns `false` if the element was not present; it is not inserted then.
    pub fn reinsert(&mut self, element: &E) -> bool {
        if !self.remove(element) {
            return false;
        }
        self.insert(element.clone());
        true
    }

    /// Elements whose bounds intersect `rect`.
    pub fn query(&self, rect: &Rectangle<T>) -> Vec<E> {
        let mut out = Vec::new();
        self.visit_rect(rect, |e| out.push(e.clone()));
        out
    }

    /// Elements whose bounds contain the point, in dispatch order.
    pub fn query_point(&self, x: T, y: T) -> Vec<E> {
        let mut out = Vec::new();
        self.visit_point(x, y, |e| out.push(e.clone()));
        out
    }

    /// Visit elements whose bounds contain the point (does not allocate result storage).
    pub fn visit_point<F: FnMut(&E)>(&self, x: T, y: T, mut f: F) {
        self.root.visit_point(x, y, &mut f);
    }

    /// Visit elements whose bounds intersect `rect` (does not allocate result storage).
    pub fn visit_rect<F: FnMut(&E)>(&self, rect: &Rectangle<T>, mut f: F) {
        self.root.visit_rect(rect, &mut f);
    }

    /// Every stored element, parent before children.
    pub fn all_elements(&self) -> Vec<E> {
        let mut out = Vec::with_capacity(self.len);
        self.root.visit_all(&mut |e: &E| out.push(e.clone()));
        out
    }

    /// Discard the structure and start over with a fresh root covering `boundary`.
    ///
    /// All elements are dropped; callers re-insert from their own list.
    pub fn update_boundary(&mut self, boundary: Rectangle<T>) {
        self.root = Node::new(boundary, 0);
        self.len = 0;
    }

    /// Remove all elements, keeping the current boundary.
    pub fn clear(&mut self) {
        let boundary = self.root.boundary;
        self.update_boundary(boundary);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    type Item = (u32, Rectangle<f64>);

    fn canvas() -> QuadTree<Item> {
        QuadTree::new(Rectangle::new(0.0, 0.0, 800.0, 600.0))
    }

    fn ids(items: &[Item]) -> Vec<u32> {
        items.iter().map(|i| i.0).collect()
    }

    #[test]
    fn scenario_single_component() {
        let mut tree = canvas();
        tree.insert((1, Rectangle::new(10.0, 10.0, 50.0, 50.0)));
        assert_eq!(ids(&tree.query_point(30.0, 30.0)), vec![1]);
        assert!(tree.query_point(500.0, 500.0).is_empty());
    }

    #[test]
    fn empty_tree_queries_are_empty() {
        let tree = canvas();
        assert!(tree.query_point(1.0, 1.0).is_empty());
        assert!(tree.query(&Rectangle::new(0.0, 0.0, 800.0, 600.0)).is_empty());
        assert!(tree.all_elements().is_empty());

        let degenerate: QuadTree<Item> = QuadTree::new(Rectangle::new(0.0, 0.0, 0.0, 0.0));
        assert!(degenerate.query_point(0.0, 0.0).is_empty());
    }

    #[test]
    fn containment_matches_brute_force() {
        let mut tree = canvas();
        let mut items = Vec::new();
        for i in 0..60_u32 {
            let x = f64::from((i * 37) % 760);
            let y = f64::from((i * 53) % 560);
            let w = f64::from(5 + (i * 7) % 90);
            let h = f64::from(5 + (i * 11) % 70);
            let item = (i, Rectangle::new(x, y, w, h));
            items.push(item);
            tree.insert(item);
        }
        assert!(tree.depth() > 0, "sixty elements should subdivide the root");

        for px in (0..800).step_by(23) {
            for py in (0..600).step_by(19) {
                let (px, py) = (f64::from(px), f64::from(py));
                let mut got = ids(&tree.query_point(px, py));
                let mut expected: Vec<u32> = items
                    .iter()
                    .filter(|i| i.1.contains_point(px, py))
                    .map(|i| i.0)
                    .collect();
                got.sort_unstable();
                expected.sort_unstable();
                assert_eq!(got, expected, "mismatch at ({px}, {py})");
            }
        }

        let window = Rectangle::new(100.0, 100.0, 200.0, 150.0);
        let mut got = ids(&tree.query(&window));
        let mut expected: Vec<u32> = items
            .iter()
            .filter(|i| i.1.intersects(&window))
            .map(|i| i.0)
            .collect();
        got.sort_unstable();
        expected.sort_unstable();
        assert_eq!(got, expected);
    }

    #[test]
    fn insert_then_remove_is_never_hit() {
        let mut tree = canvas();
        for i in 0..10_u32 {
            tree.insert((i, Rectangle::new(f64::from(i) * 10.0, 0.0, 8.0, 8.0)));
        }
        let target = (99, Rectangle::new(20.0, 2.0, 4.0, 4.0));
        tree.insert(target);
        assert!(tree.remove(&target));
        assert!(!ids(&tree.query_point(21.0, 3.0)).contains(&99));
        assert_eq!(tree.len(), 10);
        // Absent element is a no-op.
        assert!(!tree.remove(&target));
        assert_eq!(tree.len(), 10);
    }

    #[test]
    fn point_query_is_parent_before_children_then_insertion_order() {
        let config = QuadTreeConfig::with_capacity(2);
        let mut tree = QuadTree::with_config(Rectangle::new(0.0, 0.0, 100.0, 100.0), config);
        // Two small items in the top-left quadrant, then a straddler and a third small one.
        tree.insert((1, Rectangle::new(10.0, 10.0, 10.0, 10.0)));
        tree.insert((2, Rectangle::new(12.0, 12.0, 10.0, 10.0)));
        tree.insert((3, Rectangle::new(0.0, 0.0, 100.0, 100.0)));
        tree.insert((4, Rectangle::new(14.0, 14.0, 2.0, 2.0)));

        // Item 3 straddles every split line and stays at the root.
        assert_eq!(ids(&tree.query_point(15.0, 15.0)), vec![3, 1, 2, 4]);
        assert_eq!(ids(&tree.all_elements()), vec![3, 1, 2, 4]);
    }

    #[test]
    fn zero_area_element_is_matched_at_its_corner() {
        let mut tree = canvas();
        tree.insert((7, Rectangle::new(42.0, 42.0, 0.0, 0.0)));
        assert_eq!(ids(&tree.query_point(42.0, 42.0)), vec![7]);
        assert!(tree.query_point(42.5, 42.0).is_empty());
    }

    #[test]
    fn out_of_bounds_elements_are_kept() {
        let mut tree: QuadTree<Item> = QuadTree::with_config(
            Rectangle::new(0.0, 0.0, 100.0, 100.0),
            QuadTreeConfig::with_capacity(1),
        );
        tree.insert((1, Rectangle::new(90.0, 90.0, 50.0, 50.0)));
        tree.insert((2, Rectangle::new(500.0, 500.0, 10.0, 10.0)));
        tree.insert((3, Rectangle::new(10.0, 10.0, 5.0, 5.0)));
        assert_eq!(tree.len(), 3);
        assert_eq!(ids(&tree.query_point(120.0, 120.0)), vec![1]);
        assert_eq!(ids(&tree.query_point(505.0, 505.0)), vec![2]);
        assert_eq!(ids(&tree.query_point(12.0, 12.0)), vec![3]);
    }

    #[test]
    fn overlapping_elements_are_all_returned() {
        let mut tree = canvas();
        tree.insert((1, Rectangle::new(0.0, 0.0, 100.0, 100.0)));
        tree.insert((2, Rectangle::new(50.0, 50.0, 100.0, 100.0)));
        assert_eq!(ids(&tree.query_point(75.0, 75.0)), vec![1, 2]);
        assert_eq!(tree.query(&Rectangle::new(99.0, 99.0, 1.0, 1.0)).len(), 2);
    }

    #[test]
    fn depth_limit_stops_subdivision() {
        let config = QuadTreeConfig {
            capacity: 1,
            max_depth: 3,
        };
        let mut tree = QuadTree::with_config(Rectangle::new(0.0, 0.0, 64.0, 64.0), config);
        for i in 0..20_u32 {
            tree.insert((i, Rectangle::new(1.0, 1.0, 0.5, 0.5)));
        }
        assert_eq!(tree.depth(), 3);
        assert_eq!(tree.query_point(1.2, 1.2).len(), 20);
    }

    #[test]
    fn update_boundary_drops_everything() {
        let mut tree = canvas();
        tree.insert((1, Rectangle::new(10.0, 10.0, 50.0, 50.0)));
        tree.update_boundary(Rectangle::new(0.0, 0.0, 1600.0, 1200.0));
        assert!(tree.is_empty());
        assert!(tree.query_point(30.0, 30.0).is_empty());
        assert_eq!(tree.boundary(), Rectangle::new(0.0, 0.0, 1600.0, 1200.0));
    }

    #[test]
    fn duplicate_inserts_are_not_deduplicated() {
        let mut tree = canvas();
        let item = (1, Rectangle::new(10.0, 10.0, 5.0, 5.0));
        tree.insert(item);
        tree.insert(item);
        assert_eq!(tree.query_point(12.0, 12.0).len(), 2);
        assert!(tree.remove(&item));
        assert_eq!(tree.query_point(12.0, 12.0).len(), 1);
    }

    #[test]
    fn reinsert_follows_moved_bounds() {
        let mut tree: QuadTree<Rectangle<i64>, i64> = QuadTree::with_config(
            Rectangle::new(0, 0, 100, 100),
            QuadTreeConfig::with_capacity(1),
        );
        let a = Rectangle::new(1, 1, 2, 2);
        tree.insert(a);
        tree.insert(Rectangle::new(80, 80, 2, 2));
        assert!(tree.reinsert(&a));
        assert_eq!(tree.len(), 2);
        assert!(!tree.reinsert(&Rectangle::new(5, 5, 5, 5)));
    }
}
