use glam::DVec2;

use crate::braille::BrailleCanvas;
use crate::highlight::Fill;
use crate::map::geometry::{fill_rings, stroke_ring};
use crate::map::projection::Surface;
use crate::view::MapView;

/// Rendered map, one canvas per fill color plus country borders
pub struct MapLayers {
    /// Indexed by `Fill::index`, painted in `Fill::ALL` order
    pub fills: Vec<BrailleCanvas>,
    pub borders: BrailleCanvas,
}

impl MapLayers {
    fn new(cols: usize, rows: usize) -> Self {
        Self {
            fills: Fill::ALL.iter().map(|_| BrailleCanvas::new(cols, rows)).collect(),
            borders: BrailleCanvas::new(cols, rows),
        }
    }

    pub fn fill(&self, fill: Fill) -> &BrailleCanvas {
        &self.fills[fill.index()]
    }
}

/// Display settings for map layers
#[derive(Clone)]
pub struct DisplaySettings {
    pub show_borders: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self { show_borders: true }
    }
}

#[derive(Default)]
pub struct MapRenderer {
    pub settings: DisplaySettings,
}

impl MapRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render the view into a `cols` x `rows` cell area
    pub fn render(&self, view: &MapView, cols: u16, rows: u16) -> MapLayers {
        let mut layers = MapLayers::new(cols as usize, rows as usize);
        let surface = Surface::for_cells(cols, rows);
        let transform = view.zoom().transform();

        // canvas -> pan/zoom -> pixels, folded into one scale + offset
        let scale = transform.k * surface.fit();
        let offset = transform.translation() * surface.fit() + surface.offset();
        let to_pixel = |p: DVec2| p * scale + offset;

        let width = surface.width as f64;
        let height = surface.height as f64;

        for (idx, outline) in view.outlines().iter().enumerate() {
            let Some((min, max)) = outline.bounds() else {
                continue;
            };
            let (smin, smax) = (to_pixel(min), to_pixel(max));
            if smax.x < 0.0 || smax.y < 0.0 || smin.x >= width || smin.y >= height {
                continue;
            }

            let rings: Vec<Vec<DVec2>> = outline
                .rings()
                .iter()
                .map(|ring| ring.iter().map(|&p| to_pixel(p)).collect())
                .collect();

            fill_rings(&mut layers.fills[view.fill(idx).index()], &rings);

            if self.settings.show_borders {
                for ring in &rings {
                    stroke_ring(&mut layers.borders, ring);
                }
            }
        }

        layers
    }

    /// Toggle country borders
    pub fn toggle_borders(&mut self) {
        self.settings.show_borders = !self.settings.show_borders;
    }
}
