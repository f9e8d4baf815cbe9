// Copyright 2026 the Cambium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Plain records for building a [`Model`] from externally supplied data.
//!
//! A deserializer (JSON, a wire protocol, a test fixture) produces
//! [`RootSchema`] / [`ElementSchema`] records; [`Model::from_schema`] turns
//! them into a fully indexed tree, generating ids where the data leaves them
//! empty.
//!
//! # Reserved properties
//!
//! Framework-managed state — parent references, the identity index, the
//! root designation — has no schema fields, so externally supplied keys of
//! those names (`parent`, `root`, `index`, …) are silently ignored during
//! deserialization and can never overwrite the managed fields they are
//! named after. The `id` and `children` keys *are* schema data: they feed
//! the registration and attachment machinery rather than bypassing it.

use alloc::string::String;
use alloc::vec::Vec;

use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::model::{ElementId, Model};

/// One element record: type tag, optional id, nested children.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementSchema {
    /// Type tag selecting the element's visual encoding elsewhere.
    #[serde(rename = "type")]
    pub type_tag: String,
    /// Element id; empty requests auto-generation.
    pub id: String,
    /// Ordered child records.
    pub children: Vec<ElementSchema>,
}

/// Rectangle record for the root's canvas bounds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundsSchema {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width of the drawing surface.
    pub width: f64,
    /// Height of the drawing surface.
    pub height: f64,
}

impl BoundsSchema {
    /// Converts to a [`kurbo::Rect`].
    #[must_use]
    pub fn to_rect(self) -> Rect {
        Rect::from_origin_size(Point::new(self.x, self.y), Size::new(self.width, self.height))
    }

    /// Converts from a [`kurbo::Rect`].
    #[must_use]
    pub fn from_rect(rect: Rect) -> Self {
        Self {
            x: rect.x0,
            y: rect.y0,
            width: rect.width(),
            height: rect.height(),
        }
    }
}

/// The root record: an element plus the frame-level metadata the root
/// carries.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RootSchema {
    /// Type tag of the root element.
    #[serde(rename = "type")]
    pub type_tag: String,
    /// Root id; empty requests auto-generation.
    pub id: String,
    /// Ordered child records.
    pub children: Vec<ElementSchema>,
    /// Available drawing surface, if the data supplies one.
    #[serde(rename = "canvasBounds")]
    pub canvas_bounds: Option<BoundsSchema>,
    /// Producer-advanced revision counter.
    pub revision: u64,
}

impl Model {
    /// Builds a fully indexed model tree from a root record.
    ///
    /// Children are created and attached in record order; empty ids are
    /// generated at attachment.
    ///
    /// # Errors
    ///
    /// [`ModelError::DuplicateId`] if two records anywhere in the tree carry
    /// the same id.
    pub fn from_schema(schema: &RootSchema) -> Result<Self, ModelError> {
        let mut model = Self::with_root_id(schema.type_tag.clone(), schema.id.clone());
        if let Some(bounds) = schema.canvas_bounds {
            model.set_canvas_bounds(bounds.to_rect());
        }
        model.set_revision(schema.revision);
        let root = model.root();
        for child in &schema.children {
            build_into(&mut model, root, child)?;
        }
        Ok(model)
    }

    /// Exports the tree back into schema records.
    #[must_use]
    pub fn to_schema(&self) -> RootSchema {
        let root = self.root();
        RootSchema {
            type_tag: self.type_tag(root).into(),
            id: self.id(root).into(),
            children: self
                .children(root)
                .map(|child| subtree_schema(self, child))
                .collect(),
            canvas_bounds: Some(BoundsSchema::from_rect(self.canvas_bounds())),
            revision: self.revision(),
        }
    }
}

fn build_into(model: &mut Model, parent: ElementId, schema: &ElementSchema) -> Result<(), ModelError> {
    let el = model.create(schema.type_tag.clone(), schema.id.clone());
    model.add_child(parent, el)?;
    for child in &schema.children {
        build_into(model, el, child)?;
    }
    Ok(())
}

fn subtree_schema(model: &Model, el: ElementId) -> ElementSchema {
    ElementSchema {
        type_tag: model.type_tag(el).into(),
        id: model.id(el).into(),
        children: model
            .children(el)
            .map(|child| subtree_schema(model, child))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;
    use alloc::vec;
    use alloc::vec::Vec;

    use super::*;

    #[test]
    fn builds_nested_tree_with_index_and_metadata() {
        let json = r#"{
            "type": "diagram",
            "id": "R",
            "canvasBounds": { "x": 0.0, "y": 0.0, "width": 640.0, "height": 480.0 },
            "revision": 3,
            "children": [
                { "type": "shape", "id": "E1" },
                { "type": "group", "id": "E2", "children": [
                    { "type": "shape", "id": "E3" }
                ] }
            ]
        }"#;
        let schema: RootSchema = serde_json::from_str(json).unwrap();
        let model = Model::from_schema(&schema).unwrap();

        let e1 = model.get_by_id("E1").unwrap();
        let e3 = model.get_by_id("E3").unwrap();
        assert_eq!(model.id(model.parent(e1).unwrap()), "R");
        assert_eq!(model.id(model.parent(e3).unwrap()), "E2");
        assert_eq!(model.index().get("E3"), Some(e3));
        assert_eq!(model.canvas_bounds(), Rect::new(0.0, 0.0, 640.0, 480.0));
        assert_eq!(model.revision(), 3);
    }

    #[test]
    fn duplicate_ids_in_records_are_rejected() {
        let schema = RootSchema {
            type_tag: "diagram".into(),
            id: "R".into(),
            children: vec![
                ElementSchema {
                    type_tag: "shape".into(),
                    id: "x".into(),
                    children: vec![],
                },
                ElementSchema {
                    type_tag: "shape".into(),
                    id: "x".into(),
                    children: vec![],
                },
            ],
            canvas_bounds: None,
            revision: 0,
        };
        let err = Model::from_schema(&schema).unwrap_err();
        assert_eq!(err, ModelError::DuplicateId { id: "x".to_string() });
    }

    #[test]
    fn missing_ids_are_generated() {
        let json = r#"{ "type": "diagram", "children": [
            { "type": "shape" },
            { "type": "shape" }
        ] }"#;
        let schema: RootSchema = serde_json::from_str(json).unwrap();
        let model = Model::from_schema(&schema).unwrap();

        let root = model.root();
        assert!(!model.id(root).is_empty());
        let kids: Vec<_> = model.children(root).collect();
        assert_eq!(kids.len(), 2);
        assert!(!model.id(kids[0]).is_empty());
        assert_ne!(model.id(kids[0]), model.id(kids[1]));
    }

    #[test]
    fn reserved_keys_cannot_touch_managed_state() {
        // `parent`, `root`, and `index` are framework-managed; external data
        // carrying them parses but changes nothing.
        let json = r#"{ "type": "diagram", "id": "R", "children": [
            { "type": "shape", "id": "a", "parent": "bogus", "root": "nope", "index": 99 }
        ] }"#;
        let schema: RootSchema = serde_json::from_str(json).unwrap();
        let model = Model::from_schema(&schema).unwrap();

        let a = model.get_by_id("a").unwrap();
        assert_eq!(model.parent(a), Some(model.root()));
        assert_eq!(model.index().len(), 2);
    }

    #[test]
    fn export_mirrors_the_tree() {
        let json = r#"{ "type": "diagram", "id": "R", "revision": 7, "children": [
            { "type": "group", "id": "g", "children": [ { "type": "shape", "id": "s" } ] }
        ] }"#;
        let schema: RootSchema = serde_json::from_str(json).unwrap();
        let model = Model::from_schema(&schema).unwrap();

        let exported = model.to_schema();
        assert_eq!(exported.id, "R");
        assert_eq!(exported.revision, 7);
        assert_eq!(exported.children.len(), 1);
        assert_eq!(exported.children[0].id, "g");
        assert_eq!(exported.children[0].children[0].id, "s");
        assert_eq!(exported.children[0].children[0].type_tag, "shape");
        assert_eq!(
            exported.canvas_bounds,
            Some(BoundsSchema::from_rect(Rect::ZERO))
        );
    }
}
