// Copyright 2026 the Cambium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Arena-backed element storage with structural operations and index upkeep.

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use hashbrown::HashSet;
use kurbo::{Affine, Point, Rect};

use crate::error::ModelError;

use super::id::ElementId;
use super::index::IdIndex;
use super::traverse::{Children, Descendants};

/// Distinguishes the tree root from ordinary elements.
///
/// Root resolution walks parent references until it reaches a slot carrying
/// `Root`; a chain that ends on a parentless `Child` is detached.
#[derive(Clone, Debug)]
enum Role {
    /// The distinguished root. Carries the frame-level metadata the root
    /// owns on behalf of the whole tree.
    Root {
        /// Available drawing surface, empty until a producer sets it.
        canvas_bounds: Rect,
        /// Monotonic revision counter, advanced by producers (not by the
        /// core).
        revision: u64,
    },
    /// Any other element.
    Child,
}

/// One element's storage slot.
#[derive(Clone, Debug)]
pub(crate) struct ElementNode {
    pub(crate) type_tag: String,
    pub(crate) id: String,
    pub(crate) parent: Option<ElementId>,
    pub(crate) children: Vec<ElementId>,
    pub(crate) local_transform: Affine,
    role: Role,
}

/// An indexed tree of diagram elements.
///
/// Elements occupy arena slots addressed by generational [`ElementId`]
/// handles. The model owns the tree's [`IdIndex`] on behalf of the root and
/// keeps it exactly in sync with the set of elements reachable from the
/// root: attaching a subtree registers every element in it (generating ids
/// where they are empty), detaching unregisters them.
///
/// Elements are created detached via [`create`](Self::create), attached with
/// [`add_child`](Self::add_child) / [`insert_child`](Self::insert_child),
/// and detached with the `remove*` operations. Each structural operation is
/// a single atomic step: on failure the tree and index are left exactly as
/// they were.
///
/// ```rust
/// use cambium_core::model::Model;
///
/// let mut model = Model::with_root_id("diagram", "canvas");
/// let root = model.root();
/// let shape = model.create("shape", "s1");
/// model.add_child(root, shape).unwrap();
/// assert_eq!(model.get_by_id("s1"), Some(shape));
/// assert_eq!(model.parent(shape), Some(root));
/// ```
pub struct Model {
    /// Slots; `None` marks a destroyed slot awaiting reuse.
    nodes: Vec<Option<ElementNode>>,
    /// Last generation per slot (persists across frees).
    generations: Vec<u32>,
    free_list: Vec<u32>,
    root: ElementId,
    index: IdIndex,
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let alive = self.nodes.iter().filter(|slot| slot.is_some()).count();
        f.debug_struct("Model")
            .field("nodes_total", &self.nodes.len())
            .field("nodes_alive", &alive)
            .field("free_list", &self.free_list.len())
            .field("indexed", &self.index.len())
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl Model {
    /// Creates a model whose root has the given type tag and a generated id.
    #[must_use]
    pub fn new(root_type: impl Into<String>) -> Self {
        Self::with_root_id(root_type, "")
    }

    /// Creates a model whose root has the given type tag and id.
    ///
    /// An empty `root_id` requests auto-generation.
    #[must_use]
    pub fn with_root_id(root_type: impl Into<String>, root_id: impl Into<String>) -> Self {
        let mut index = IdIndex::new();
        let mut id = root_id.into();
        if id.is_empty() {
            id = index.generate_id(|_| false);
        }
        let root = ElementId {
            idx: 0,
            generation: 0,
        };
        index.insert(id.clone(), root);
        Self {
            nodes: vec![Some(ElementNode {
                type_tag: root_type.into(),
                id,
                parent: None,
                children: Vec::new(),
                local_transform: Affine::IDENTITY,
                role: Role::Root {
                    canvas_bounds: Rect::ZERO,
                    revision: 0,
                },
            })],
            generations: vec![0],
            free_list: Vec::new(),
            root,
            index,
        }
    }

    // -- Allocation API --

    /// Creates a detached element with the given type tag and id.
    ///
    /// An empty `id` requests auto-generation, which happens when the
    /// element first becomes reachable from the root. Id uniqueness is also
    /// enforced at that point, so two detached elements may transiently
    /// share an id.
    pub fn create(&mut self, type_tag: impl Into<String>, id: impl Into<String>) -> ElementId {
        let node = ElementNode {
            type_tag: type_tag.into(),
            id: id.into(),
            parent: None,
            children: Vec::new(),
            local_transform: Affine::IDENTITY,
            role: Role::Child,
        };
        if let Some(idx) = self.free_list.pop() {
            self.nodes[idx as usize] = Some(node);
            ElementId {
                idx,
                generation: self.generations[idx as usize],
            }
        } else {
            let idx = self.nodes.len() as u32;
            self.nodes.push(Some(node));
            self.generations.push(0);
            ElementId { idx, generation: 0 }
        }
    }

    /// Destroys a detached element, freeing its slot for reuse.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale, the element is the root, it still has
    /// a parent, or it still has children (detach them first).
    pub fn destroy(&mut self, el: ElementId) {
        let node = self.node(el);
        assert!(
            !matches!(node.role, Role::Root { .. }),
            "cannot destroy the root"
        );
        assert!(node.parent.is_none(), "cannot destroy an attached element");
        assert!(
            node.children.is_empty(),
            "cannot destroy an element with children"
        );
        // Bump generation so old handles immediately fail validation.
        self.generations[el.idx as usize] += 1;
        self.nodes[el.idx as usize] = None;
        self.free_list.push(el.idx);
    }

    /// Returns whether the given handle refers to a live element.
    #[must_use]
    pub fn is_alive(&self, el: ElementId) -> bool {
        (el.idx as usize) < self.nodes.len()
            && self.generations[el.idx as usize] == el.generation
            && self.nodes[el.idx as usize].is_some()
    }

    // -- Read API --

    /// Returns the root element.
    #[must_use]
    pub fn root(&self) -> ElementId {
        self.root
    }

    /// Returns whether `el` is the root.
    #[must_use]
    pub fn is_root(&self, el: ElementId) -> bool {
        matches!(self.node(el).role, Role::Root { .. })
    }

    /// Returns the element's type tag.
    #[must_use]
    pub fn type_tag(&self, el: ElementId) -> &str {
        &self.node(el).type_tag
    }

    /// Returns the element's id (empty until one is assigned or generated).
    #[must_use]
    pub fn id(&self, el: ElementId) -> &str {
        &self.node(el).id
    }

    /// Returns the element's parent, if attached to one.
    #[must_use]
    pub fn parent(&self, el: ElementId) -> Option<ElementId> {
        self.node(el).parent
    }

    /// Returns an iterator over the element's direct children, in order.
    #[must_use]
    pub fn children(&self, el: ElementId) -> Children<'_> {
        Children::new(self.node(el).children.iter())
    }

    /// Number of direct children.
    #[must_use]
    pub fn child_count(&self, el: ElementId) -> usize {
        self.node(el).children.len()
    }

    /// Returns `child`'s position in `parent`'s children sequence, if it is
    /// currently a child of `parent`.
    #[must_use]
    pub fn index_of(&self, parent: ElementId, child: ElementId) -> Option<usize> {
        self.node(parent).children.iter().position(|&c| c == child)
    }

    /// Returns a depth-first iterator over `el` and its entire subtree.
    #[must_use]
    pub fn descendants(&self, el: ElementId) -> Descendants<'_> {
        let _ = self.node(el);
        Descendants::new(self, el)
    }

    /// Read access to the tree's identity index.
    ///
    /// The index is mutated exclusively by this model's structural
    /// operations; going around them is what would break the
    /// index-equals-reachable-set invariant, so no mutable access exists.
    #[must_use]
    pub fn index(&self) -> &IdIndex {
        &self.index
    }

    /// Looks up an attached element by id.
    #[must_use]
    pub fn get_by_id(&self, id: &str) -> Option<ElementId> {
        self.index.get(id)
    }

    /// Returns whether `el` is currently registered in the index.
    #[must_use]
    pub fn contains(&self, el: ElementId) -> bool {
        let node = self.node(el);
        !node.id.is_empty() && self.index.get(&node.id) == Some(el)
    }

    /// Iterates over every registered element, in unspecified but stable
    /// order.
    pub fn indexed_elements(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.index.iter().map(|(_, el)| el)
    }

    /// Resolves the tree root from any element by walking parent
    /// references.
    ///
    /// # Errors
    ///
    /// [`ModelError::Detached`] if the chain ends without reaching the root,
    /// i.e. the element was never attached or was detached and retained.
    pub fn root_of(&self, el: ElementId) -> Result<ElementId, ModelError> {
        let mut current = el;
        loop {
            let node = self.node(current);
            match node.role {
                Role::Root { .. } => return Ok(current),
                Role::Child => match node.parent {
                    Some(parent) => current = parent,
                    None => return Err(ModelError::Detached),
                },
            }
        }
    }

    /// Returns whether `el` is reachable from the root.
    #[must_use]
    pub fn is_attached(&self, el: ElementId) -> bool {
        self.root_of(el).is_ok()
    }

    // -- Root metadata --

    /// Returns the canvas bounds (empty until a producer sets them).
    #[must_use]
    pub fn canvas_bounds(&self) -> Rect {
        self.root_meta().0
    }

    /// Sets the canvas bounds.
    pub fn set_canvas_bounds(&mut self, bounds: Rect) {
        *self.root_meta_mut().0 = bounds;
    }

    /// Returns the producer-advanced revision counter.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.root_meta().1
    }

    /// Sets the revision counter. Producers advance this; the core never
    /// does.
    pub fn set_revision(&mut self, revision: u64) {
        *self.root_meta_mut().1 = revision;
    }

    // -- Local transforms and coordinate frames --

    /// Returns the element's local transform (identity by default).
    #[must_use]
    pub fn local_transform(&self, el: ElementId) -> Affine {
        self.node(el).local_transform
    }

    /// Sets the element's local transform.
    ///
    /// This is the extension point for elements that define scaling or
    /// rotation; the transform must be invertible for the `parent_to_local`
    /// conversions to be meaningful.
    pub fn set_local_transform(&mut self, el: ElementId, transform: Affine) {
        self.node_mut(el).local_transform = transform;
    }

    /// Maps a point from `el`'s local frame into its parent's frame.
    ///
    /// With the default identity transform the point comes back unchanged.
    #[must_use]
    pub fn local_to_parent_point(&self, el: ElementId, point: Point) -> Point {
        self.node(el).local_transform * point
    }

    /// Maps a point from `el`'s parent's frame into its local frame.
    #[must_use]
    pub fn parent_to_local_point(&self, el: ElementId, point: Point) -> Point {
        self.node(el).local_transform.inverse() * point
    }

    /// Maps a rectangle from `el`'s local frame into its parent's frame,
    /// returning the bounding box of the transformed corners.
    ///
    /// Callers holding a bare point lift it with
    /// [`geometry::point_rect`](crate::geometry::point_rect) and get a
    /// degenerate rectangle back out.
    #[must_use]
    pub fn local_to_parent_rect(&self, el: ElementId, rect: Rect) -> Rect {
        self.node(el).local_transform.transform_rect_bbox(rect)
    }

    /// Maps a rectangle from `el`'s parent's frame into its local frame.
    #[must_use]
    pub fn parent_to_local_rect(&self, el: ElementId, rect: Rect) -> Rect {
        self.node(el)
            .local_transform
            .inverse()
            .transform_rect_bbox(rect)
    }

    // -- Structural operations --

    /// Appends `child` to `parent`'s children sequence.
    ///
    /// Sets the child's parent reference and, if `parent` is reachable from
    /// the root, registers the child's entire subtree in the index as one
    /// atomic step, generating ids where they are empty. Attaching beneath a
    /// detached parent links structure only; registration happens when the
    /// subtree becomes reachable.
    ///
    /// # Errors
    ///
    /// [`ModelError::DuplicateId`] if any id in the child's subtree is
    /// already registered (or appears twice within the subtree). The child
    /// is left fully detached — no partial registration.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale, `child` already has a parent,
    /// `child` is the root, or `parent` lies inside `child`'s subtree.
    pub fn add_child(&mut self, parent: ElementId, child: ElementId) -> Result<(), ModelError> {
        let at = self.node(parent).children.len();
        self.insert_child(parent, child, at)
    }

    /// Inserts `child` into `parent`'s children sequence at `index`.
    ///
    /// Valid positions are `0..=len`; `len` appends. Otherwise behaves like
    /// [`add_child`](Self::add_child).
    ///
    /// # Errors
    ///
    /// [`ModelError::IndexOutOfBounds`] if `index > len`;
    /// [`ModelError::DuplicateId`] as for [`add_child`](Self::add_child).
    ///
    /// # Panics
    ///
    /// As for [`add_child`](Self::add_child).
    pub fn insert_child(
        &mut self,
        parent: ElementId,
        child: ElementId,
        index: usize,
    ) -> Result<(), ModelError> {
        let len = self.node(parent).children.len();
        let child_node = self.node(child);
        assert!(
            !matches!(child_node.role, Role::Root { .. }),
            "the root cannot be attached to a parent"
        );
        assert!(child_node.parent.is_none(), "child already has a parent");
        assert!(
            !self.in_subtree(child, parent),
            "cannot attach an element beneath its own descendant"
        );
        if index > len {
            return Err(ModelError::IndexOutOfBounds { index, len });
        }
        if self.is_attached(parent) {
            self.register_subtree(child)?;
        }
        self.node_mut(child).parent = Some(parent);
        self.node_mut(parent).children.insert(index, child);
        Ok(())
    }

    /// Removes `child` from `parent`'s children sequence.
    ///
    /// Clears the child's parent reference and unregisters its entire
    /// subtree from the index. The child and its subtree stay alive and can
    /// be re-attached.
    ///
    /// # Errors
    ///
    /// [`ModelError::ChildNotFound`] if `child` is not currently a child of
    /// `parent`.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale.
    pub fn remove_child(&mut self, parent: ElementId, child: ElementId) -> Result<(), ModelError> {
        let _ = self.node(child);
        let Some(pos) = self.index_of(parent, child) else {
            return Err(ModelError::ChildNotFound);
        };
        self.detach_at(parent, pos);
        Ok(())
    }

    /// Detaches and unregisters every child of `parent`.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn remove_all_children(&mut self, parent: ElementId) {
        // Back to front so positions stay valid as the sequence shrinks.
        while let Some(last) = self.node(parent).children.len().checked_sub(1) {
            self.detach_at(parent, last);
        }
    }

    /// Detaches and unregisters every child of `parent` for which the
    /// predicate holds, preserving the relative order of the remainder.
    ///
    /// The predicate is evaluated against a stable snapshot of the children
    /// taken before any removal, walked from the end toward the start.
    /// Returns how many children were removed.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn remove_children_where<F>(&mut self, parent: ElementId, mut predicate: F) -> usize
    where
        F: FnMut(&Self, ElementId) -> bool,
    {
        let snapshot = self.node(parent).children.clone();
        let mut removed = 0;
        for &child in snapshot.iter().rev() {
            if predicate(self, child) {
                let pos = self
                    .index_of(parent, child)
                    .expect("snapshot child is present until detached");
                self.detach_at(parent, pos);
                removed += 1;
            }
        }
        removed
    }

    /// Relocates `child` within `parent`'s children sequence to
    /// `new_index`, touching neither the index nor the parent reference.
    ///
    /// Valid targets are `0..len - 1`: the element count does not change, so
    /// unlike [`insert_child`](Self::insert_child) there is no
    /// one-past-the-end position. Moving to the current position is a no-op.
    ///
    /// # Errors
    ///
    /// [`ModelError::ChildNotFound`] if `child` is not currently a child of
    /// `parent`; [`ModelError::IndexOutOfBounds`] if `new_index >= len`.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale.
    pub fn move_child(
        &mut self,
        parent: ElementId,
        child: ElementId,
        new_index: usize,
    ) -> Result<(), ModelError> {
        let _ = self.node(child);
        let Some(pos) = self.index_of(parent, child) else {
            return Err(ModelError::ChildNotFound);
        };
        let len = self.node(parent).children.len();
        if new_index >= len {
            return Err(ModelError::IndexOutOfBounds {
                index: new_index,
                len,
            });
        }
        if new_index != pos {
            let children = &mut self.node_mut(parent).children;
            children.remove(pos);
            children.insert(new_index, child);
        }
        Ok(())
    }

    // -- Internal helpers --

    /// Panics if the handle is stale.
    pub(crate) fn node(&self, el: ElementId) -> &ElementNode {
        assert!(
            self.is_alive(el),
            "stale ElementId: {el:?} (current gen: {})",
            if (el.idx as usize) < self.generations.len() {
                self.generations[el.idx as usize]
            } else {
                u32::MAX
            }
        );
        self.nodes[el.idx as usize]
            .as_ref()
            .expect("validated slot is occupied")
    }

    fn node_mut(&mut self, el: ElementId) -> &mut ElementNode {
        let _ = self.node(el);
        self.nodes[el.idx as usize]
            .as_mut()
            .expect("validated slot is occupied")
    }

    fn root_meta(&self) -> (Rect, u64) {
        match self.node(self.root).role {
            Role::Root {
                canvas_bounds,
                revision,
            } => (canvas_bounds, revision),
            Role::Child => unreachable!("the root slot always has the Root role"),
        }
    }

    fn root_meta_mut(&mut self) -> (&mut Rect, &mut u64) {
        match &mut self.node_mut(self.root).role {
            Role::Root {
                canvas_bounds,
                revision,
            } => (canvas_bounds, revision),
            Role::Child => unreachable!("the root slot always has the Root role"),
        }
    }

    /// Returns whether `el` lies in the subtree rooted at `ancestor`
    /// (inclusive), following parent references upward.
    fn in_subtree(&self, ancestor: ElementId, el: ElementId) -> bool {
        let mut current = Some(el);
        while let Some(c) = current {
            if c == ancestor {
                return true;
            }
            current = self.node(c).parent;
        }
        false
    }

    /// Registers `el` and its entire subtree in the index as one atomic
    /// step.
    ///
    /// All collision checks and id generation happen before the first map
    /// insertion, so a duplicate anywhere in the batch leaves the index
    /// untouched.
    fn register_subtree(&mut self, el: ElementId) -> Result<(), ModelError> {
        let batch: Vec<ElementId> = self.descendants(el).collect();
        let mut staged: HashSet<String> = HashSet::with_capacity(batch.len());
        let mut generated: Vec<(ElementId, String)> = Vec::new();
        for &e in &batch {
            let id = self.node(e).id.clone();
            if id.is_empty() {
                let fresh = self.index.generate_id(|candidate| staged.contains(candidate));
                staged.insert(fresh.clone());
                generated.push((e, fresh));
            } else if self.index.contains_id(&id) || staged.contains(&id) {
                return Err(ModelError::DuplicateId { id });
            } else {
                staged.insert(id);
            }
        }
        // Commit; infallible from here on.
        for (e, fresh) in generated {
            self.node_mut(e).id = fresh;
        }
        for &e in &batch {
            let id = self.node(e).id.clone();
            self.index.insert(id, e);
        }
        Ok(())
    }

    /// Unregisters `el` and its entire subtree from the index.
    fn unregister_subtree(&mut self, el: ElementId) {
        let batch: Vec<ElementId> = self.descendants(el).collect();
        for e in batch {
            let id = self.node(e).id.clone();
            let _ = self.index.remove(&id);
        }
    }

    /// Detaches the child at `pos`, unregistering its subtree when the
    /// parent is reachable from the root.
    fn detach_at(&mut self, parent: ElementId, pos: usize) {
        let child = self.node(parent).children[pos];
        if self.is_attached(parent) {
            self.unregister_subtree(child);
        }
        self.node_mut(parent).children.remove(pos);
        self.node_mut(child).parent = None;
    }
}
