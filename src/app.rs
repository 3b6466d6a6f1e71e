use glam::DVec2;
use ratatui::layout::{Position, Rect};
use std::time::Instant;
use tracing::info;

use crate::data::{LoadState, Loader, Source};
use crate::map::{MapRenderer, Surface, WHEEL_FACTOR};
use crate::view::MapView;

/// On-screen zoom buttons
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    ZoomIn,
    ZoomOut,
    Reset,
}

impl Control {
    pub const ALL: [Control; 3] = [Control::ZoomIn, Control::ZoomOut, Control::Reset];

    pub fn label(self) -> &'static str {
        match self {
            Control::ZoomIn => " + ",
            Control::ZoomOut => " - ",
            Control::Reset => " ⟲ ",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Control::ZoomIn => "Zoom In",
            Control::ZoomOut => "Zoom Out",
            Control::Reset => "Reset View",
        }
    }
}

/// Button stack in the top-right corner of the map area
pub fn control_rects(area: Rect) -> [(Control, Rect); 3] {
    const WIDTH: u16 = 3;
    let x = area.right().saturating_sub(WIDTH + 1).max(area.x);
    Control::ALL.map(|control| {
        let i = control as u16;
        let rect = Rect::new(x, area.y + 1 + i * 2, WIDTH, 1).intersection(area);
        (control, rect)
    })
}

/// What a left press landed on
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PressTarget {
    Control(Control),
    Feature(usize),
    Water,
}

#[derive(Clone, Copy, Debug)]
struct Press {
    target: PressTarget,
    dragged: bool,
}

/// Application state
pub struct App {
    source: Source,
    loader: Loader,
    pub view: Option<MapView>,
    pub map_renderer: MapRenderer,
    pub should_quit: bool,
    /// Terminal size in cells
    width: u16,
    height: u16,
    /// Last mouse position for drag tracking
    last_mouse: Option<(u16, u16)>,
    /// Last known pointer cell, for re-hit-testing when the map moves under it
    pointer: Option<(u16, u16)>,
    press: Option<Press>,
    /// Frame counter for the loading spinner
    pub frame: u64,
}

impl App {
    pub fn new(source: Source, width: u16, height: u16) -> Self {
        let loader = Loader::spawn(source.clone());
        Self::with_loader(source, loader, width, height)
    }

    pub fn with_loader(source: Source, loader: Loader, width: u16, height: u16) -> Self {
        Self {
            source,
            loader,
            view: None,
            map_renderer: MapRenderer::new(),
            should_quit: false,
            width,
            height,
            last_mouse: None,
            pointer: None,
            press: None,
            frame: 0,
        }
    }

    pub fn load_state(&self) -> &LoadState {
        self.loader.state()
    }

    /// Start over with a fresh loader and empty highlight state
    pub fn reload(&mut self) {
        info!("reloading map data");
        *self = Self::new(self.source.clone(), self.width, self.height);
    }

    /// Update terminal size
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
    }

    /// Inner map area: inside the border, above the two-line footer
    pub fn map_area(&self) -> Rect {
        map_area(Rect::new(0, 0, self.width, self.height))
    }

    /// Per-frame housekeeping: pick up load results and run animations
    pub fn update(&mut self, now: Instant) {
        self.frame = self.frame.wrapping_add(1);

        self.loader.poll();
        if self.view.is_none() {
            if let LoadState::Loaded(collection) = self.loader.state() {
                self.view = Some(MapView::new(collection.clone()));
            }
        }

        let Some(view) = &mut self.view else {
            return;
        };
        let before = view.zoom().transform();
        view.zoom_mut().tick(now);
        if view.zoom().transform() != before {
            self.refresh_hover();
        }
    }

    /// Request quit
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn zoom_in(&mut self, now: Instant) {
        if let Some(view) = &mut self.view {
            view.zoom_mut().zoom_in(now);
        }
        self.refresh_hover();
    }

    pub fn zoom_out(&mut self, now: Instant) {
        if let Some(view) = &mut self.view {
            view.zoom_mut().zoom_out(now);
        }
        self.refresh_hover();
    }

    pub fn reset_view(&mut self, now: Instant) {
        if let Some(view) = &mut self.view {
            view.zoom_mut().reset(now);
        }
        self.refresh_hover();
    }

    pub fn activate(&mut self, control: Control, now: Instant) {
        match control {
            Control::ZoomIn => self.zoom_in(now),
            Control::ZoomOut => self.zoom_out(now),
            Control::Reset => self.reset_view(now),
        }
    }

    /// Move the view by canvas units (positive = look right/down)
    pub fn pan(&mut self, dx: f64, dy: f64) {
        if let Some(view) = &mut self.view {
            view.zoom_mut().pan_by(DVec2::new(-dx, -dy));
        }
        self.refresh_hover();
    }

    /// Get current zoom level as a string
    pub fn zoom_level(&self) -> String {
        let k = self.view.as_ref().map_or(1.0, |v| v.zoom().transform().k);
        format!("{k:.1}x")
    }

    pub fn hovered_name(&self) -> Option<&str> {
        self.view.as_ref()?.tooltip().map(|t| t.name.as_str())
    }

    /// Zoom button under the pointer, if any
    pub fn hovered_control(&self) -> Option<Control> {
        let (col, row) = self.pointer?;
        self.control_at(col, row)
    }

    pub fn control_at(&self, col: u16, row: u16) -> Option<Control> {
        if self.view.is_none() {
            return None;
        }
        control_rects(self.map_area())
            .into_iter()
            .find(|(_, rect)| rect.contains(Position::new(col, row)))
            .map(|(control, _)| control)
    }

    /// Cell relative to the map area, if inside it
    fn map_cell(&self, col: u16, row: u16) -> Option<(u16, u16)> {
        let area = self.map_area();
        area.contains(Position::new(col, row))
            .then(|| (col - area.x, row - area.y))
    }

    /// Point on the logical canvas under a terminal cell
    fn canvas_point(&self, cell: (u16, u16)) -> Option<DVec2> {
        let area = self.map_area();
        Surface::for_cells(area.width, area.height).to_logical(Surface::cell_center(cell.0, cell.1))
    }

    fn feature_under(&self, col: u16, row: u16) -> Option<usize> {
        let view = self.view.as_ref()?;
        if self.control_at(col, row).is_some() {
            return None;
        }
        let p = self.canvas_point(self.map_cell(col, row)?)?;
        view.feature_at(p)
    }

    /// Pointer position changed (with or without a button held)
    pub fn pointer_moved(&mut self, col: u16, row: u16) {
        self.pointer = Some((col, row));
        let hit = self.feature_under(col, row);
        let cell = self.map_cell(col, row);
        let Some(view) = &mut self.view else {
            return;
        };
        match cell {
            Some(cell) => view.pointer_moved(hit, cell),
            None => view.pointer_leave(),
        }
    }

    /// The map moved under a still pointer: hover and tooltip follow
    /// whatever is under it now
    fn refresh_hover(&mut self) {
        if let Some((col, row)) = self.pointer {
            self.pointer_moved(col, row);
        }
    }

    pub fn press(&mut self, col: u16, row: u16) {
        self.last_mouse = Some((col, row));
        if self.view.is_none() {
            return;
        }
        let target = match (self.control_at(col, row), self.feature_under(col, row)) {
            (Some(control), _) => PressTarget::Control(control),
            (None, Some(idx)) => PressTarget::Feature(idx),
            (None, None) => PressTarget::Water,
        };
        self.press = Some(Press {
            target,
            dragged: false,
        });
    }

    /// Handle mouse drag: pan the map under the pointer
    pub fn drag(&mut self, col: u16, row: u16) {
        let last = self.last_mouse.replace((col, row));
        let Some(press) = &mut self.press else {
            return;
        };
        let Some((last_col, last_row)) = last else {
            return;
        };
        if (last_col, last_row) == (col, row) {
            return;
        }
        press.dragged = true;
        if matches!(press.target, PressTarget::Control(_)) {
            return;
        }

        let area = self.map_area();
        let fit = Surface::for_cells(area.width, area.height).fit();
        if fit <= 0.0 {
            return;
        }
        let dx = (col as f64 - last_col as f64) * 2.0 / fit;
        let dy = (row as f64 - last_row as f64) * 4.0 / fit;
        if let Some(view) = &mut self.view {
            view.zoom_mut().pan_by(DVec2::new(dx, dy));
        }
        self.refresh_hover();
    }

    /// Left button released: a press and release on the same target with no
    /// drag in between is a click
    pub fn release(&mut self, col: u16, row: u16, now: Instant) {
        self.last_mouse = None;
        let Some(press) = self.press.take() else {
            return;
        };
        if press.dragged {
            return;
        }
        match press.target {
            PressTarget::Control(control) => {
                if self.control_at(col, row) == Some(control) {
                    self.activate(control, now);
                }
            }
            PressTarget::Feature(idx) => {
                if self.feature_under(col, row) == Some(idx) {
                    if let Some(view) = &mut self.view {
                        view.click(idx);
                    }
                }
            }
            PressTarget::Water => {}
        }
    }

    /// Scroll wheel zooms about the pointer
    pub fn wheel(&mut self, col: u16, row: u16, zoom_in: bool) {
        let Some(anchor) = self.map_cell(col, row).and_then(|cell| self.canvas_point(cell)) else {
            return;
        };
        let factor = if zoom_in { WHEEL_FACTOR } else { 1.0 / WHEEL_FACTOR };
        if let Some(view) = &mut self.view {
            view.zoom_mut().zoom_at(factor, anchor);
        }
        self.refresh_hover();
    }
}

/// Map area inside a full-screen frame: one-cell border, two footer lines
pub fn map_area(screen: Rect) -> Rect {
    Rect::new(
        screen.x + 1,
        screen.y + 1,
        screen.width.saturating_sub(2),
        screen.height.saturating_sub(4),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Feature, FeatureCollection, LoadError};
    use crate::highlight::Mark;
    use geojson::Value;
    use std::sync::mpsc;

    /// Three wide bands side by side: A west, B middle, C east
    fn bands() -> FeatureCollection {
        let band = |lon0: f64, lon1: f64| {
            Value::Polygon(vec![vec![
                vec![lon0, -60.0],
                vec![lon1, -60.0],
                vec![lon1, 70.0],
                vec![lon0, 70.0],
                vec![lon0, -60.0],
            ]])
        };
        let features = [("A", -170.0, -60.0), ("B", -55.0, 55.0), ("C", 60.0, 170.0)]
            .into_iter()
            .map(|(id, lon0, lon1)| Feature {
                id: id.into(),
                name: format!("Country {id}"),
                geometry: Some(band(lon0, lon1)),
            })
            .collect();
        FeatureCollection { features }
    }

    fn app_with(result: Result<FeatureCollection, LoadError>) -> App {
        let (tx, rx) = mpsc::channel();
        tx.send(result).unwrap();
        let loader = Loader::from_receiver(rx);
        let mut app = App::with_loader(Source::Remote("test://".into()), loader, 122, 44);
        app.update(Instant::now());
        app
    }

    fn loaded() -> App {
        let app = app_with(Ok(bands()));
        assert!(app.view.is_some());
        app
    }

    /// Terminal cell over the center of feature `idx`
    fn cell_over(app: &App, idx: usize) -> (u16, u16) {
        let view = app.view.as_ref().unwrap();
        let (min, max) = view.outlines()[idx].bounds().unwrap();
        let canvas = view.zoom().transform().apply((min + max) / 2.0);
        let area = app.map_area();
        let surface = Surface::for_cells(area.width, area.height);
        let px = surface.to_pixel(canvas);
        (area.x + (px.x / 2.0) as u16, area.y + (px.y / 4.0) as u16)
    }

    fn click(app: &mut App, (col, row): (u16, u16)) {
        app.pointer_moved(col, row);
        app.press(col, row);
        app.release(col, row, Instant::now());
    }

    fn mark(app: &App, id: &str) -> Mark {
        app.view.as_ref().unwrap().mark(id)
    }

    #[test]
    fn test_click_full_cycle() {
        let mut app = loaded();
        let a = cell_over(&app, 0);

        click(&mut app, a);
        assert_eq!(mark(&app, "A"), Mark::First);
        assert_eq!(mark(&app, "B"), Mark::Unmarked);
        assert_eq!(mark(&app, "C"), Mark::Unmarked);

        click(&mut app, a);
        click(&mut app, a);
        assert_eq!(mark(&app, "A"), Mark::Unmarked);
    }

    #[test]
    fn test_release_without_press_does_nothing() {
        let mut app = loaded();
        let a = cell_over(&app, 0);
        app.press(a.0, a.1);
        app.release(a.0, a.1, Instant::now());
        // A second release for the same press must not click again
        app.release(a.0, a.1, Instant::now());
        assert_eq!(mark(&app, "A"), Mark::First);
    }

    #[test]
    fn test_drag_pans_without_click() {
        let mut app = loaded();
        let a = cell_over(&app, 0);
        let before = app.view.as_ref().unwrap().zoom().transform();

        app.press(a.0, a.1);
        app.drag(a.0 + 3, a.1 + 1);
        app.release(a.0 + 3, a.1 + 1, Instant::now());

        let after = app.view.as_ref().unwrap().zoom().transform();
        assert!(after.x > before.x && after.y > before.y);
        assert_eq!(mark(&app, "A"), Mark::Unmarked);
    }

    #[test]
    fn test_press_and_release_on_different_countries() {
        let mut app = loaded();
        let (a, b) = (cell_over(&app, 0), cell_over(&app, 1));
        app.press(a.0, a.1);
        app.release(b.0, b.1, Instant::now());
        assert_eq!(mark(&app, "A"), Mark::Unmarked);
        assert_eq!(mark(&app, "B"), Mark::Unmarked);
    }

    #[test]
    fn test_hover_sets_tooltip_with_offset() {
        let mut app = loaded();
        let b = cell_over(&app, 1);
        app.pointer_moved(b.0, b.1);

        let area = app.map_area();
        let view = app.view.as_ref().unwrap();
        assert_eq!(view.hovered(), Some("B"));
        let tip = view.tooltip().unwrap();
        assert_eq!(tip.name, "Country B");
        assert_eq!(tip.x, (b.0 - area.x) as i32 + 2);
        assert_eq!(tip.y, (b.1 - area.y) as i32 - 1);

        app.pointer_moved(b.0 + 1, b.1);
        let tip = app.view.as_ref().unwrap().tooltip().unwrap();
        assert_eq!(tip.name, "Country B");
        assert_eq!(tip.x, (b.0 + 1 - area.x) as i32 + 2);

        // Off the map entirely
        app.pointer_moved(0, 0);
        let view = app.view.as_ref().unwrap();
        assert!(view.hovered().is_none() && view.tooltip().is_none());
    }

    #[test]
    fn test_controls_zoom_and_reset() {
        let mut app = loaded();
        let now = Instant::now();
        let rects = control_rects(app.map_area());
        let (_, zoom_in) = rects[0];
        let (_, reset) = rects[2];

        app.press(zoom_in.x, zoom_in.y);
        app.release(zoom_in.x, zoom_in.y, now);
        app.update(now + crate::map::ZOOM_DURATION);
        assert_eq!(app.zoom_level(), "1.3x");

        app.press(reset.x + 1, reset.y);
        app.release(reset.x + 1, reset.y, now);
        app.update(now + crate::map::RESET_DURATION);
        let t = app.view.as_ref().unwrap().zoom().transform();
        assert_eq!(t, crate::map::ViewTransform::IDENTITY);
    }

    #[test]
    fn test_wheel_clamped() {
        let mut app = loaded();
        let a = cell_over(&app, 0);
        for _ in 0..40 {
            app.wheel(a.0, a.1, true);
        }
        assert_eq!(app.zoom_level(), "8.0x");
        for _ in 0..40 {
            app.wheel(a.0, a.1, false);
        }
        assert_eq!(app.zoom_level(), "1.0x");
    }

    #[test]
    fn test_hover_follows_keyboard_pan() {
        let mut app = loaded();
        let b = cell_over(&app, 1);
        app.pointer_moved(b.0, b.1);
        assert_eq!(app.view.as_ref().unwrap().hovered(), Some("B"));

        // The map slides left under a still pointer until C sits beneath it
        for _ in 0..10 {
            app.pan(40.0, 0.0);
        }
        app.update(Instant::now());
        let view = app.view.as_ref().unwrap();
        assert_eq!(view.hovered(), Some("C"));
        assert_eq!(app.hovered_name(), Some("Country C"));
    }

    #[test]
    fn test_hover_follows_reset_animation() {
        let mut app = loaded();
        let b = cell_over(&app, 1);
        app.pan(400.0, 0.0);
        app.pointer_moved(b.0, b.1);
        assert_eq!(app.hovered_name(), Some("Country C"));

        let now = Instant::now();
        app.reset_view(now);
        app.update(now + crate::map::RESET_DURATION / 2);
        app.update(now + crate::map::RESET_DURATION);
        let view = app.view.as_ref().unwrap();
        assert_eq!(view.hovered(), Some("B"));
        assert_eq!(app.hovered_name(), Some("Country B"));
    }

    #[test]
    fn test_hover_cleared_when_map_pans_away() {
        let mut app = loaded();
        let a = cell_over(&app, 0);
        app.pointer_moved(a.0, a.1);
        assert_eq!(app.hovered_name(), Some("Country A"));

        // Everything slides right; only open water is left under the pointer
        app.pan(-1000.0, 0.0);
        let view = app.view.as_ref().unwrap();
        assert!(view.hovered().is_none());
        assert!(view.tooltip().is_none());
    }

    #[test]
    fn test_control_title_under_pointer() {
        let mut app = loaded();
        let (_, reset) = control_rects(app.map_area())[2];
        app.pointer_moved(reset.x, reset.y);
        assert_eq!(app.hovered_control(), Some(Control::Reset));
        assert_eq!(app.hovered_control().map(Control::title), Some("Reset View"));
        assert!(app.hovered_name().is_none());

        let a = cell_over(&app, 0);
        app.pointer_moved(a.0, a.1);
        assert_eq!(app.hovered_control(), None);
    }

    #[test]
    fn test_reload_starts_over() {
        let doc = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","id":"A","properties":{"name":"Country A"},
             "geometry":{"type":"Polygon","coordinates":[[[-170,-60],[-60,-60],[-60,70],[-170,70],[-170,-60]]]}}]}"#;
        let path = std::env::temp_dir().join(format!("world-map-{}-reload.geojson", std::process::id()));
        std::fs::write(&path, doc).unwrap();

        let mut app = App::new(Source::File(path.clone()), 122, 44);
        assert!(matches!(app.loader.wait(), LoadState::Loaded(_)));
        app.update(Instant::now());
        let a = cell_over(&app, 0);
        click(&mut app, a);
        assert_eq!(mark(&app, "A"), Mark::First);

        app.reload();
        assert!(app.load_state().is_loading());
        assert!(app.view.is_none());

        assert!(matches!(app.loader.wait(), LoadState::Loaded(_)));
        app.update(Instant::now());
        assert_eq!(mark(&app, "A"), Mark::Unmarked);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_failed_load_has_no_map() {
        let mut app = app_with(Err(LoadError::Disconnected));
        assert!(matches!(app.load_state(), LoadState::Failed));
        assert!(app.view.is_none());
        // Input is ignored without a map
        app.press(10, 10);
        app.release(10, 10, Instant::now());
        app.wheel(10, 10, true);
        assert!(app.view.is_none());
    }
}
