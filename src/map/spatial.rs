use glam::DVec2;
use std::collections::HashMap;

use crate::map::path::Outline;

/// Cell size in canvas units
const CELL_SIZE: f64 = 40.0;

/// Spatial index over feature bounding boxes using conservative approximation.
/// Each feature's bounding box is indexed into every cell it overlaps,
/// guaranteeing no false negatives while allowing false positives
/// (eliminated by the exact containment test in `hit_test`).
pub struct FeatureGrid {
    cells: HashMap<(i32, i32), Vec<usize>>,
    cell_size: f64,
}

impl FeatureGrid {
    pub fn new(cell_size: f64) -> Self {
        Self {
            cells: HashMap::new(),
            cell_size,
        }
    }

    #[inline(always)]
    fn to_cell(&self, p: DVec2) -> (i32, i32) {
        let x = (p.x / self.cell_size).floor() as i32;
        let y = (p.y / self.cell_size).floor() as i32;
        (x, y)
    }

    /// Index outlines by position; empty outlines are left out
    pub fn build(outlines: &[Outline]) -> Self {
        let mut grid = Self::new(CELL_SIZE);
        for (idx, outline) in outlines.iter().enumerate() {
            let Some((min, max)) = outline.bounds() else {
                continue;
            };
            let min_cell = grid.to_cell(min);
            let max_cell = grid.to_cell(max);
            for y in min_cell.1..=max_cell.1 {
                for x in min_cell.0..=max_cell.0 {
                    grid.cells.entry((x, y)).or_default().push(idx);
                }
            }
        }
        grid
    }

    /// Feature indices whose bounding box may contain `p`, ascending
    pub fn candidates(&self, p: DVec2) -> &[usize] {
        self.cells
            .get(&self.to_cell(p))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Top-most feature containing `p` (later features draw over earlier ones)
    pub fn hit_test(&self, outlines: &[Outline], p: DVec2) -> Option<usize> {
        self.candidates(p)
            .iter()
            .rev()
            .copied()
            .find(|&idx| outlines.get(idx).is_some_and(|o| o.contains(p)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Outline {
        Outline::from_rings(vec![vec![
            DVec2::new(x0, y0),
            DVec2::new(x1, y0),
            DVec2::new(x1, y1),
            DVec2::new(x0, y1),
        ]])
    }

    #[test]
    fn test_hit_test_topmost() {
        let outlines = vec![rect(0.0, 0.0, 100.0, 100.0), rect(50.0, 50.0, 150.0, 150.0)];
        let grid = FeatureGrid::build(&outlines);
        assert_eq!(grid.hit_test(&outlines, DVec2::new(10.0, 10.0)), Some(0));
        assert_eq!(grid.hit_test(&outlines, DVec2::new(75.0, 75.0)), Some(1));
        assert_eq!(grid.hit_test(&outlines, DVec2::new(140.0, 20.0)), None);
    }

    #[test]
    fn test_empty_outlines_not_indexed() {
        let outlines = vec![Outline::empty(), rect(0.0, 0.0, 10.0, 10.0)];
        let grid = FeatureGrid::build(&outlines);
        assert_eq!(grid.candidates(DVec2::new(5.0, 5.0)), &[1]);
        assert_eq!(grid.hit_test(&outlines, DVec2::new(-500.0, 5.0)), None);
    }
}
