use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};
use soundgrid::looper::Note;
use soundgrid::shared::{BEATS_PER_BAR, DisplayState, NUM_PADS, TOTAL_BEATS};

use super::grid::draw_pad_grid;
use super::input::PAD_KEYS;

const HELP: &str = "space play  b rec  -/= bpm  p pack  arrows select  [ ] nudge  bksp/del delete  0 clear  k/l/K packs  esc quit";

pub fn render(frame: &mut Frame, area: Rect, state: &DisplayState, lit: &[bool; NUM_PADS], blink_on: bool) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),  // transport
            Constraint::Length(12), // pad grid
            Constraint::Min(4),     // layer timeline
            Constraint::Length(2),  // status + help
        ])
        .split(area);

    draw_transport(frame, sections[0], state, blink_on);
    draw_pad_grid(frame, sections[1], &state.pad_labels, lit);
    draw_timeline(frame, sections[2], state);
    draw_footer(frame, sections[3], state);
}

fn draw_transport(frame: &mut Frame, area: Rect, state: &DisplayState, blink_on: bool) {
    let mut spans = vec![if state.playing {
        Span::styled(" PLAY ", Style::default().fg(Color::Black).bg(Color::Green))
    } else {
        Span::styled(" STOP ", Style::default().fg(Color::Gray))
    }];
    // REC blinks while a session is open
    if state.recording {
        let style = if blink_on { Style::default().fg(Color::White).bg(Color::Red) } else { Style::default().fg(Color::Red) };
        spans.push(Span::styled(" REC ", style));
    }
    let beat = state.current_beat;
    spans.push(Span::raw(format!(
        "  {} bpm   bar {:>2} beat {}   {}",
        state.bpm,
        beat / BEATS_PER_BAR + 1,
        beat % BEATS_PER_BAR + 1,
        state.pack_label
    )));
    let title = if state.playing || state.recording { "soundgrid *" } else { "soundgrid" };
    frame.render_widget(Paragraph::new(Line::from(spans)).block(Block::bordered().title(title)), area);
}

fn draw_timeline(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let block = Block::bordered().title(format!("layers ({})", state.layers.len()));
    let visible = area.height.saturating_sub(2) as usize;
    let cursor = state.playing.then_some(state.current_beat);

    let mut lines = Vec::new();
    if state.recording {
        lines.push(beat_row("rec", &state.in_progress, cursor, None, Style::default().fg(Color::Red)));
    }
    let room = visible.saturating_sub(lines.len()).max(1);
    // keep the selected layer on screen
    let skip = state.selected_layer.map_or(0, |sel| (sel + 1).saturating_sub(room));
    for (index, layer) in state.layers.iter().enumerate().skip(skip).take(room) {
        let selected = state.selected_layer == Some(index);
        let note_beat = state.selected_note.filter(|_| selected).and_then(|n| layer.notes().get(n)).map(|n| n.beat);
        let style = if selected { Style::default().fg(Color::Yellow) } else { Style::default() };
        lines.push(beat_row(&format!("{:>3}", index + 1), layer.notes(), cursor, note_beat, style));
    }
    if lines.is_empty() {
        lines.push(Line::styled("press b to record a layer", Style::default().fg(Color::DarkGray)));
    }
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

// one cell per beat, bars split by a space; a pad's key marks a note, `+` several
fn beat_row(label: &str, notes: &[Note], cursor: Option<usize>, selected_beat: Option<usize>, style: Style) -> Line<'static> {
    let mut spans = vec![Span::styled(format!("{label} "), style)];
    for beat in 0..TOTAL_BEATS {
        if beat > 0 && beat % BEATS_PER_BAR == 0 {
            spans.push(Span::raw(" "));
        }
        let mut on_beat = notes.iter().filter(|n| n.beat == beat);
        let cell = match (on_beat.next(), on_beat.next()) {
            (None, _) => '.',
            (Some(note), None) => PAD_KEYS[note.key.index()],
            (Some(_), Some(_)) => '+',
        };
        let mut cell_style = style;
        if cursor == Some(beat) {
            cell_style = cell_style.bg(Color::DarkGray);
        }
        if selected_beat == Some(beat) {
            cell_style = cell_style.add_modifier(Modifier::REVERSED);
        }
        spans.push(Span::styled(cell.to_string(), cell_style));
    }
    Line::from(spans)
}

fn draw_footer(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let lines = vec![
        Line::raw(state.status.clone()),
        Line::styled(HELP, Style::default().fg(Color::DarkGray)),
    ];
    frame.render_widget(Paragraph::new(lines), area);
}
