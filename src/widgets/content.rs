use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::model::SelectedItem;
use crate::ui::AppState;
use crate::widgets::chrome::panel_block;

pub(crate) const NO_SELECTION: &str = "Select an item from the menu";

pub(crate) fn content_lines(selection: Option<&SelectedItem>) -> Vec<String> {
    match selection {
        None => vec![NO_SELECTION.to_string()],
        Some(item) => {
            let mut lines = vec![format!("wrap = {}", item.wrap)];
            if let Some(r) = &item.resource {
                lines.push(format!("resource = {r}"));
            }
            lines
        }
    }
}

pub fn draw_content(f: &mut Frame, area: Rect, state: &AppState) {
    let lines: Vec<Line> = content_lines(state.selection.as_ref())
        .into_iter()
        .map(|l| {
            if state.selection.is_some() {
                Line::from(Span::styled(l, state.theme.text_active_bold()))
            } else {
                Line::from(Span::styled(l, state.theme.text_muted()))
            }
        })
        .collect();
    let p = Paragraph::new(lines)
        .block(panel_block("Content", false, &state.theme))
        .wrap(Wrap { trim: false });
    f.render_widget(p, area);
}
