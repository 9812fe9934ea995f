use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::*;

use crate::ui::AppState;
use crate::widgets::menu::SPINNER;

pub fn draw_footer(f: &mut Frame, area: Rect, state: &AppState, help_text: &str) {
    let mut spans: Vec<Span> = Vec::new();
    let pending = state.tree.in_flight_count();
    if !state.catalog_loaded || pending > 0 {
        let spinner = SPINNER[state.tick as usize % SPINNER.len()];
        let msg = if state.catalog_loaded {
            format!(" {spinner} loading {pending}")
        } else {
            format!(" {spinner} loading catalog")
        };
        spans.push(Span::raw(msg));
        spans.push(Span::raw("  |  "));
    }
    if let Some(err) = &state.catalog.error {
        spans.push(Span::styled(
            "[ERROR] ",
            state.theme.text_error().add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::styled(
            format!("catalog: {err}  |  "),
            state.theme.text_error(),
        ));
    }
    spans.push(Span::styled(
        help_text.to_string(),
        Style::default().fg(Color::DarkGray),
    ));
    let p = Paragraph::new(Line::from(spans));
    f.render_widget(p, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn footer_text(state: &AppState) -> String {
        let backend = ratatui::backend::TestBackend::new(80, 1);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        terminal
            .draw(|f| draw_footer(f, f.area(), state, "q quit"))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn spinner_frame_follows_tick() {
        let mut state = AppState::default();
        for tick in [0u64, 5, 6, 13] {
            state.tick = tick;
            let frame = SPINNER[tick as usize % SPINNER.len()];
            assert!(footer_text(&state).contains(&format!("{frame} loading catalog")));
        }
    }
}
