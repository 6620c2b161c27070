use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Paragraph};
use soundgrid::shared::{NUM_PADS, PAD_COLS, PAD_ROWS};

use super::input::PAD_KEYS;

// each pad shows its key in the border and the sound's label inside
pub fn draw_pad_grid(frame: &mut Frame, area: Rect, labels: &[String], lit: &[bool; NUM_PADS]) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Ratio(1, PAD_ROWS as u32); PAD_ROWS])
        .split(area);

    for (row_idx, row_area) in rows.iter().enumerate() {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, PAD_COLS as u32); PAD_COLS])
            .split(*row_area);

        for (col_idx, cell_area) in cols.iter().enumerate() {
            let pad_idx = row_idx * PAD_COLS + col_idx;
            let style = if lit[pad_idx] {
                Style::default().fg(Color::Black).bg(Color::LightMagenta).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            let label = labels.get(pad_idx).map(String::as_str).unwrap_or("");
            let block = Block::bordered()
                .title(PAD_KEYS[pad_idx].to_ascii_uppercase().to_string())
                .border_style(style);
            let pad = Paragraph::new(label).block(block).style(style).alignment(Alignment::Center);
            frame.render_widget(pad, *cell_area);
        }
    }
}
