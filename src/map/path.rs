use geojson::{PolygonType, Position, Value};
use glam::DVec2;
use rayon::prelude::*;

use crate::data::Feature;
use crate::map::projection::Projection;

/// Points closer than this (canvas units) to the previous kept point are dropped
const MIN_SEGMENT: f64 = 0.25;

/// A country's projected boundary in canvas units. Rings are closed
/// implicitly and filled with the even-odd rule, so holes work.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Outline {
    rings: Vec<Vec<DVec2>>,
    min: DVec2,
    max: DVec2,
}

impl Outline {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Project a geometry. Anything other than (multi)polygons, and any
    /// ring that can't be projected, contributes nothing.
    pub fn from_geometry(geometry: Option<&Value>, projection: &Projection) -> Self {
        let mut rings = Vec::new();
        match geometry {
            Some(Value::Polygon(polygon)) => push_polygon(&mut rings, polygon, projection),
            Some(Value::MultiPolygon(polygons)) => {
                for polygon in polygons {
                    push_polygon(&mut rings, polygon, projection);
                }
            }
            _ => {}
        }
        Self::from_rings(rings)
    }

    pub fn from_rings(rings: Vec<Vec<DVec2>>) -> Self {
        let mut min = DVec2::splat(f64::INFINITY);
        let mut max = DVec2::splat(f64::NEG_INFINITY);
        for p in rings.iter().flatten() {
            min = min.min(*p);
            max = max.max(*p);
        }
        if rings.is_empty() {
            return Self::empty();
        }
        Self { rings, min, max }
    }

    pub fn is_empty(&self) -> bool {
        self.rings.is_empty()
    }

    pub fn rings(&self) -> &[Vec<DVec2>] {
        &self.rings
    }

    /// Bounding box (min, max), `None` when empty
    pub fn bounds(&self) -> Option<(DVec2, DVec2)> {
        (!self.is_empty()).then_some((self.min, self.max))
    }

    /// Even-odd containment test in canvas units
    pub fn contains(&self, p: DVec2) -> bool {
        if self.is_empty() || p.cmplt(self.min).any() || p.cmpgt(self.max).any() {
            return false;
        }
        let mut inside = false;
        for ring in &self.rings {
            let mut j = ring.len() - 1;
            for i in 0..ring.len() {
                let (a, b) = (ring[i], ring[j]);
                if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
                    inside = !inside;
                }
                j = i;
            }
        }
        inside
    }
}

fn push_polygon(rings: &mut Vec<Vec<DVec2>>, polygon: &PolygonType, projection: &Projection) {
    rings.extend(polygon.iter().filter_map(|ring| project_ring(ring, projection)));
}

/// `None` for rings with unusable positions or fewer than three distinct points
fn project_ring(ring: &[Position], projection: &Projection) -> Option<Vec<DVec2>> {
    let mut out: Vec<DVec2> = Vec::with_capacity(ring.len());
    for pos in ring {
        let (&lon, &lat) = (pos.first()?, pos.get(1)?);
        let p = projection.project(lon, lat)?;
        if out.last().map_or(true, |last| last.distance(p) >= MIN_SEGMENT) {
            out.push(p);
        }
    }
    // Closing point duplicates the first
    if out.len() > 1 && out[0].distance(out[out.len() - 1]) < MIN_SEGMENT {
        out.pop();
    }
    (out.len() >= 3).then_some(out)
}

/// Build every feature's outline, in collection order
pub fn build_outlines(features: &[Feature], projection: &Projection) -> Vec<Outline> {
    features
        .par_iter()
        .map(|f| Outline::from_geometry(f.geometry.as_ref(), projection))
        .collect()
}
