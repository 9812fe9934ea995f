use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::ui::AppState;

pub fn draw_header(f: &mut Frame, area: Rect, state: &AppState) {
    let theme = &state.theme;
    let mut spans = vec![
        Span::styled(
            format!(" {} ", state.config.title),
            Style::default()
                .fg(theme.primary)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!(" {}", state.config.base_url), theme.text_muted()),
    ];
    if state.catalog_loaded {
        let n = state.catalog.entries.len();
        let noun = if n == 1 { "wrap" } else { "wraps" };
        spans.push(Span::styled(
            format!("  {n} {noun}"),
            Style::default().fg(theme.secondary),
        ));
    }
    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Style::default().fg(theme.frame));
    let p = Paragraph::new(Line::from(spans)).block(block);
    f.render_widget(p, area);
}
