use crate::app::{control_rects, App, Control};
use crate::data::LoadState;
use crate::highlight::Fill;
use crate::map::MapLayers;
use crate::view::Tooltip;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
    Frame,
};

const SPINNER: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

const BORDER_COLOR: Color = Color::Black;

pub fn fill_color(fill: Fill) -> Color {
    match fill {
        Fill::Default => Color::Gray,
        Fill::Hover => Color::Cyan,
        Fill::First => Color::Yellow,
        Fill::Second => Color::Green,
    }
}

/// Render the UI
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // Split into map area and footer (legend + status bar)
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Map
            Constraint::Length(2), // Footer
        ])
        .split(area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            " Interactive World Map ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ))
        .title(Span::styled(
            " Click countries to highlight them ",
            Style::default().fg(Color::DarkGray),
        ));
    let inner = block.inner(chunks[0]);
    frame.render_widget(block, chunks[0]);

    match (app.load_state(), &app.view) {
        (state, _) if state.is_loading() => render_loading(frame, app, inner),
        (LoadState::Failed, _) => render_failed(frame, inner),
        (_, Some(_)) => render_map(frame, app, inner),
        // Loaded, view mounts on the next update
        (_, None) => render_loading(frame, app, inner),
    }

    render_footer(frame, app, chunks[1]);
}

/// A few lines of text centered in `area`
fn centered(frame: &mut Frame, area: Rect, lines: Vec<Line>) {
    let height = (lines.len() as u16).min(area.height);
    let y = area.y + area.height.saturating_sub(height) / 2;
    let rect = Rect::new(area.x, y, area.width, height);
    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), rect);
}

fn render_loading(frame: &mut Frame, app: &App, area: Rect) {
    let spinner = SPINNER[(app.frame / 4) as usize % SPINNER.len()];
    centered(
        frame,
        area,
        vec![
            Line::from(Span::styled(spinner.to_string(), Style::default().fg(Color::Cyan))),
            Line::from(""),
            Line::from(Span::styled("Loading world map...", Style::default().fg(Color::DarkGray))),
        ],
    );
}

fn render_failed(frame: &mut Frame, area: Rect) {
    centered(
        frame,
        area,
        vec![
            Line::from(Span::styled("Failed to load map data", Style::default().fg(Color::Red))),
            Line::from(""),
            Line::from(vec![
                Span::styled("Press ", Style::default().fg(Color::DarkGray)),
                Span::styled("Enter", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
                Span::styled(" to retry", Style::default().fg(Color::DarkGray)),
            ]),
        ],
    );
}

fn render_map(frame: &mut Frame, app: &App, area: Rect) {
    let Some(view) = &app.view else {
        return;
    };

    let layers = app.map_renderer.render(view, area.width, area.height);
    frame.render_widget(MapWidget { layers }, area);

    for (control, rect) in control_rects(area) {
        let button = Paragraph::new(control.label()).style(
            Style::default()
                .fg(Color::White)
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        );
        frame.render_widget(button, rect);
    }

    if let Some(tooltip) = view.tooltip() {
        render_tooltip(frame, tooltip, area);
    }
}

/// Tooltip box, kept inside the map area
fn render_tooltip(frame: &mut Frame, tooltip: &Tooltip, area: Rect) {
    let text = format!(" {} ", tooltip.name);
    let width = (text.chars().count() as u16).min(area.width);
    if width == 0 || area.height == 0 {
        return;
    }
    let max_x = area.width.saturating_sub(width) as i32;
    let max_y = area.height.saturating_sub(1) as i32;
    let x = area.x + tooltip.x.clamp(0, max_x) as u16;
    let y = area.y + tooltip.y.clamp(0, max_y) as u16;
    let rect = Rect::new(x, y, width, 1);

    frame.render_widget(Clear, rect);
    frame.render_widget(
        Paragraph::new(text).style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
        rect,
    );
}

/// Countries as cell backgrounds, borders as Braille dots on top
struct MapWidget {
    layers: MapLayers,
}

impl Widget for MapWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Later fills win shared cells, so marks and hover show over neighbours
        for fill in Fill::ALL {
            let color = fill_color(fill);
            for (col, row, _) in self.layers.fill(fill).cells() {
                if col < area.width && row < area.height {
                    buf[(area.x + col, area.y + row)].set_bg(color);
                }
            }
        }

        for (col, row, ch) in self.layers.borders.cells() {
            if col < area.width && row < area.height {
                buf[(area.x + col, area.y + row)]
                    .set_char(ch)
                    .set_fg(BORDER_COLOR);
            }
        }
    }
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let swatch = |fill: Fill, label: &'static str| {
        [
            Span::styled("  ", Style::default().bg(fill_color(fill))),
            Span::styled(format!(" {label}  "), Style::default().fg(Color::Gray)),
        ]
    };

    let mut legend = vec![Span::styled(" ", Style::default())];
    legend.extend(swatch(Fill::Default, "Default"));
    legend.extend(swatch(Fill::First, "First Click"));
    legend.extend(swatch(Fill::Second, "Second Click"));
    legend.push(Span::styled(
        "| Click any country to cycle through colors",
        Style::default().fg(Color::DarkGray),
    ));

    let status = Line::from(vec![
        Span::styled(" Zoom: ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.zoom_level(), Style::default().fg(Color::Yellow)),
        Span::styled(" | ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            app.hovered_control()
                .map(Control::title)
                .or(app.hovered_name())
                .unwrap_or("-")
                .to_string(),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            " | wheel or +/-:zoom drag/hjkl:pan r:reset b:borders q:quit",
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let paragraph = Paragraph::new(vec![Line::from(legend), status]);
    frame.render_widget(paragraph, area);
}
