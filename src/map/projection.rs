use glam::DVec2;
use std::f64::consts::FRAC_PI_4;

/// Logical canvas width, in map units
pub const CANVAS_WIDTH: f64 = 1200.0;
/// Logical canvas height, in map units
pub const CANVAS_HEIGHT: f64 = 700.0;

/// Mercator blows up at the poles; clamp to the Web Mercator limit
const MAX_LAT: f64 = 85.051_128_78;

/// Fixed Mercator projection from (lon, lat) degrees to logical canvas units.
/// Computed once; pan/zoom is layered on top by `ViewTransform`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    scale: f64,
    translate: DVec2,
}

impl Projection {
    pub fn new(scale: f64, translate: DVec2) -> Self {
        Self { scale, translate }
    }

    /// World view for the 1200x700 canvas
    pub fn world() -> Self {
        Self::new(180.0, DVec2::new(CANVAS_WIDTH / 2.0, CANVAS_HEIGHT / 1.5))
    }

    /// Project a geographic coordinate. `None` for non-finite input.
    pub fn project(&self, lon: f64, lat: f64) -> Option<DVec2> {
        if !lon.is_finite() || !lat.is_finite() {
            return None;
        }
        let lambda = lon.to_radians();
        let phi = lat.clamp(-MAX_LAT, MAX_LAT).to_radians();

        let x = self.scale * lambda;
        let y = (FRAC_PI_4 + phi / 2.0).tan().ln() * self.scale;

        Some(DVec2::new(self.translate.x + x, self.translate.y - y))
    }
}

impl Default for Projection {
    fn default() -> Self {
        Self::world()
    }
}

/// The logical canvas fitted into a pixel grid, centered and aspect
/// preserving (letterboxed).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Surface {
    /// Pixel grid size
    pub width: usize,
    pub height: usize,
    fit: f64,
    offset: DVec2,
}

impl Surface {
    pub fn new(width: usize, height: usize) -> Self {
        let fit = (width as f64 / CANVAS_WIDTH).min(height as f64 / CANVAS_HEIGHT);
        let offset = DVec2::new(
            (width as f64 - CANVAS_WIDTH * fit) / 2.0,
            (height as f64 - CANVAS_HEIGHT * fit) / 2.0,
        );
        Self {
            width,
            height,
            fit,
            offset,
        }
    }

    /// Surface for a terminal area of `cols` x `rows` cells (2x4 Braille dots each)
    pub fn for_cells(cols: u16, rows: u16) -> Self {
        Self::new(cols as usize * 2, rows as usize * 4)
    }

    /// Pixels per logical unit
    pub fn fit(&self) -> f64 {
        self.fit
    }

    pub fn offset(&self) -> DVec2 {
        self.offset
    }

    pub fn to_pixel(&self, p: DVec2) -> DVec2 {
        p * self.fit + self.offset
    }

    /// `None` when the surface has no area
    pub fn to_logical(&self, px: DVec2) -> Option<DVec2> {
        if self.fit <= 0.0 {
            return None;
        }
        Some((px - self.offset) / self.fit)
    }

    /// Pixel center of a terminal cell, relative to the surface's own cell grid
    pub fn cell_center(col: u16, row: u16) -> DVec2 {
        DVec2::new(col as f64 * 2.0 + 1.0, row as f64 * 4.0 + 2.0)
    }
}
