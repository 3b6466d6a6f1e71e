//! Interactive map view: per-country highlight state, hover and tooltip,
//! and the pan/zoom transform.

use glam::DVec2;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::data::{Feature, FeatureCollection};
use crate::highlight::{Fill, Mark};
use crate::map::{build_outlines, FeatureGrid, Outline, Projection, Zoom};

/// Tooltip offset from the pointer, in cells (right, up)
pub const TOOLTIP_OFFSET: (i32, i32) = (2, -1);

/// Hover label, positioned in cells relative to the map area's top-left
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tooltip {
    pub x: i32,
    pub y: i32,
    pub name: String,
}

impl Tooltip {
    fn at(cell: (u16, u16), name: &str) -> Self {
        Self {
            x: cell.0 as i32 + TOOLTIP_OFFSET.0,
            y: cell.1 as i32 + TOOLTIP_OFFSET.1,
            name: name.to_string(),
        }
    }
}

pub struct MapView {
    collection: Arc<FeatureCollection>,
    outlines: Vec<Outline>,
    grid: FeatureGrid,
    highlights: HashMap<String, Mark>,
    hovered: Option<String>,
    tooltip: Option<Tooltip>,
    zoom: Zoom,
}

impl MapView {
    pub fn new(collection: Arc<FeatureCollection>) -> Self {
        Self::with_projection(collection, &Projection::world())
    }

    pub fn with_projection(collection: Arc<FeatureCollection>, projection: &Projection) -> Self {
        let outlines = build_outlines(&collection.features, projection);
        let empty = outlines.iter().filter(|o| o.is_empty()).count();
        if empty > 0 {
            debug!(empty, "features without drawable geometry");
        }
        let grid = FeatureGrid::build(&outlines);
        Self {
            collection,
            outlines,
            grid,
            highlights: HashMap::new(),
            hovered: None,
            tooltip: None,
            zoom: Zoom::new(),
        }
    }

    pub fn features(&self) -> &[Feature] {
        &self.collection.features
    }

    pub fn outlines(&self) -> &[Outline] {
        &self.outlines
    }

    pub fn zoom(&self) -> &Zoom {
        &self.zoom
    }

    pub fn zoom_mut(&mut self) -> &mut Zoom {
        &mut self.zoom
    }

    pub fn mark(&self, id: &str) -> Mark {
        self.highlights.get(id).copied().unwrap_or_default()
    }

    /// Advance a feature's mark one step. Returns the new mark.
    pub fn click(&mut self, idx: usize) -> Option<Mark> {
        let feature = self.collection.features.get(idx)?;
        let mark = self.highlights.entry(feature.id.clone()).or_default();
        let next = mark.next();
        *mark = next;
        debug!(id = %feature.id, mark = ?next, "country clicked");
        Some(next)
    }

    pub fn is_hovered(&self, idx: usize) -> bool {
        match (&self.hovered, self.collection.features.get(idx)) {
            (Some(hovered), Some(feature)) => *hovered == feature.id,
            _ => false,
        }
    }

    pub fn fill(&self, idx: usize) -> Fill {
        let mark = self
            .collection
            .features
            .get(idx)
            .map_or(Mark::Unmarked, |f| self.mark(&f.id));
        Fill::resolve(mark, self.is_hovered(idx))
    }

    pub fn hovered(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    pub fn tooltip(&self) -> Option<&Tooltip> {
        self.tooltip.as_ref()
    }

    /// Feature under a point on the logical canvas (before pan/zoom is undone)
    pub fn feature_at(&self, canvas: DVec2) -> Option<usize> {
        let p = self.zoom.transform().invert(canvas);
        self.grid.hit_test(&self.outlines, p)
    }

    /// Pointer moved; `hit` is the feature now under it and `cell` its
    /// position relative to the map area
    pub fn pointer_moved(&mut self, hit: Option<usize>, cell: (u16, u16)) {
        let hit_id = hit.and_then(|idx| self.collection.features.get(idx)).map(|f| f.id.as_str());
        if hit_id != self.hovered.as_deref() {
            self.pointer_leave();
            if let Some(idx) = hit {
                self.pointer_enter(idx, cell);
            }
        } else if let Some(idx) = hit {
            self.pointer_move(idx, cell);
        }
    }

    pub fn pointer_enter(&mut self, idx: usize, cell: (u16, u16)) {
        let Some(feature) = self.collection.features.get(idx) else {
            return;
        };
        self.hovered = Some(feature.id.clone());
        self.tooltip = Some(Tooltip::at(cell, &feature.name));
    }

    pub fn pointer_move(&mut self, idx: usize, cell: (u16, u16)) {
        if self.hovered.is_none() {
            return;
        }
        if let Some(feature) = self.collection.features.get(idx) {
            self.tooltip = Some(Tooltip::at(cell, &feature.name));
        }
    }

    pub fn pointer_leave(&mut self) {
        self.hovered = None;
        self.tooltip = None;
    }
}
