pub mod charting;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Axis, Chart, Dataset, GraphType, Paragraph, Widget},
};

use crate::{layout::layout_words, App, AppState};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

/// Chunks of the reading screen. The mouse handler resolves taps against the
/// same chunks, so render and hit-testing can never disagree.
pub struct ReadingChunks {
    pub header: Rect,
    pub controls: Rect,
    pub passage: Rect,
}

pub fn reading_chunks(area: Rect) -> ReadingChunks {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints(
            [
                Constraint::Length(1), // header
                Constraint::Length(1), // controls
                Constraint::Length(1), // padding
                Constraint::Min(1),    // passage
            ]
            .as_ref(),
        )
        .split(area);

    ReadingChunks {
        header: chunks[0],
        controls: chunks[1],
        passage: chunks[3],
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.state {
            AppState::Reading => render_reading(self, area, buf),
            AppState::Results => render_results(self, area, buf),
        }
    }
}

fn render_reading(app: &App, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let dim_style = Style::default().add_modifier(Modifier::DIM);
    let dim_bold_style = Style::default().patch(bold_style).add_modifier(Modifier::DIM);
    let underlined_bold_style = Style::default()
        .patch(bold_style)
        .add_modifier(Modifier::UNDERLINED);
    let green_style = Style::default().fg(Color::Green);
    let pulse_style = Style::default()
        .patch(bold_style)
        .add_modifier(Modifier::REVERSED);

    let chunks = reading_chunks(area);
    let session = &app.session;

    // header: elapsed | phase | estimate
    let header_cells = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Percentage(33),
                Constraint::Percentage(34),
                Constraint::Percentage(33),
            ]
            .as_ref(),
        )
        .split(chunks.header);

    Paragraph::new(Span::styled(
        format!("{:.1} sec", session.elapsed_secs()),
        bold_style,
    ))
    .alignment(Alignment::Left)
    .render(header_cells[0], buf);

    Paragraph::new(Span::styled(app.phase().to_string(), dim_bold_style))
        .alignment(Alignment::Center)
        .render(header_cells[1], buf);

    Paragraph::new(Span::styled(format!("{:.1} wpm", session.wpm()), bold_style))
        .alignment(Alignment::Right)
        .render(header_cells[2], buf);

    // controls: start is a no-op while running, so swap in the tap hint
    let controls = if session.is_running() {
        Line::from(vec![
            Span::styled("(space/click)", bold_style),
            Span::raw(" tap the word you are on   "),
            Span::styled("(r)", bold_style),
            Span::raw("eset   "),
            Span::styled("(esc)", dim_style),
            Span::raw(" quit"),
        ])
    } else {
        Line::from(vec![
            Span::styled("(s)", bold_style),
            Span::raw("tart   "),
            Span::styled("(r)", bold_style),
            Span::raw("eset   "),
            Span::styled("(esc)", dim_style),
            Span::raw(" quit"),
        ])
    };
    Paragraph::new(controls)
        .alignment(Alignment::Center)
        .render(chunks.controls, buf);

    // passage, word by word from the shared layout
    let pulsed = if !session.is_running() && app.settings.show_pulse {
        app.pulse.highlighted(app.passage.word_count())
    } else {
        None
    };
    let bookmark_index = session.bookmark().word_index;

    for cell in layout_words(app.passage.words(), chunks.passage) {
        let Some(word) = app.passage.word(cell.index) else {
            continue;
        };

        let style = if pulsed == Some(cell.index) {
            pulse_style
        } else if !session.is_running() {
            // the "blur" of the reference: the passage dims while idle
            dim_style
        } else if cell.index < bookmark_index {
            green_style
        } else if cell.index == bookmark_index {
            underlined_bold_style
        } else {
            Style::default()
        };

        buf.set_stringn(cell.x, cell.y, word, cell.width as usize, style);
    }
}

fn render_results(app: &App, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let magenta_style = Style::default().fg(Color::Magenta);
    let cyan_italic_style = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::ITALIC);
    let legend_style = Style::default()
        .fg(Color::Gray)
        .add_modifier(Modifier::ITALIC);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints(
            [
                Constraint::Min(1),    // chart
                Constraint::Length(1), // stats
                Constraint::Length(1), // history delta
                Constraint::Length(1), // padding
                Constraint::Length(1), // legend
            ]
            .as_ref(),
        )
        .split(area);

    let session = &app.session;
    let (overall_duration, highest_wpm) = charting::chart_bounds(session.taps());

    let tuples: Vec<(f64, f64)> = session
        .taps()
        .iter()
        .map(|point| (point.at_secs, point.wpm))
        .collect();
    let datasets = vec![Dataset::default()
        .marker(ratatui::symbols::Marker::Braille)
        .style(magenta_style)
        .graph_type(GraphType::Line)
        .data(&tuples)];

    let chart = Chart::new(datasets)
        .x_axis(
            Axis::default()
                .title("seconds")
                .bounds([0.0, overall_duration])
                .labels(vec![
                    Span::styled("0", bold_style),
                    Span::styled(charting::format_label(overall_duration), bold_style),
                ]),
        )
        .y_axis(
            Axis::default()
                .title("wpm")
                .bounds([0.0, highest_wpm])
                .labels(vec![
                    Span::styled("0", bold_style),
                    Span::styled(charting::format_label(highest_wpm), bold_style),
                ]),
        );

    chart.render(chunks[0], buf);

    let stats = Paragraph::new(Span::styled(
        format!(
            "{:.1} wpm   {:.1} sec   {} words   {:.1} sd",
            session.wpm(),
            session.elapsed_secs(),
            session.word_count(),
            session.pace_std_dev()
        ),
        bold_style,
    ))
    .alignment(Alignment::Center);
    stats.render(chunks[1], buf);

    if let Some(note) = app.history_note.as_deref() {
        Paragraph::new(Span::styled(note, cyan_italic_style))
            .alignment(Alignment::Center)
            .render(chunks[2], buf);
    }

    Paragraph::new(Span::styled("(r) read again   (esc) quit", legend_style))
        .alignment(Alignment::Center)
        .render(chunks[4], buf);
}
