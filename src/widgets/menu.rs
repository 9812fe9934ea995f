use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::nav::flatten::FlatNode;
use crate::nav::tree::{ChildNode, FetchStatus, EMPTY_LABEL, LOADING_LABEL};
use crate::theme::Theme;
use crate::ui::AppState;
use crate::widgets::chrome::panel_block;

pub(crate) const SPINNER: [&str; 6] = ["⠋", "⠙", "⠸", "⠴", "⠦", "⠇"];

pub(crate) fn compute_scroll_window(total: usize, selected: usize, inner_h: u16) -> (usize, usize) {
    if inner_h == 0 || total == 0 {
        return (0, 0);
    }
    let sel = selected.min(total.saturating_sub(1));
    let ih = inner_h as usize;
    let start = sel.saturating_sub(ih - 1);
    let end = (start + ih).min(total);
    (start, end)
}

pub fn draw_menu(f: &mut Frame, area: Rect, state: &AppState) {
    let rows = state.rows();
    // Persistent offset window; adjusted by key handlers in ui.rs
    let inner_h = area.height.saturating_sub(2);
    let total = rows.len();
    let ih = inner_h as usize;
    let max_start = total.saturating_sub(ih);
    let start = state.menu_offset.min(max_start);
    let end = (start + ih).min(total);
    let spinner = SPINNER[state.tick as usize % SPINNER.len()];
    let items: Vec<ListItem> = rows
        .iter()
        .enumerate()
        .skip(start)
        .take(end - start)
        .map(|(idx, row)| {
            let is_sel = idx == state.selected;
            let item = ListItem::new(row_line(row, &state.theme, is_sel, spinner));
            if is_sel {
                item.style(state.theme.list_cursor_style())
            } else {
                item
            }
        })
        .collect();
    let title = if state.catalog_loaded {
        "Menu".to_string()
    } else {
        format!("Menu {spinner}")
    };
    let list = List::new(items).block(panel_block(&title, true, &state.theme));
    f.render_widget(list, area);
}

pub(crate) fn row_line(row: &FlatNode, theme: &Theme, is_sel: bool, spinner: &str) -> Line<'static> {
    let sel = if is_sel { "> " } else { "  " };
    match row {
        FlatNode::Leaf { label, .. } => Line::from(format!("{sel}• {label}")),
        FlatNode::Branch {
            label,
            expanded,
            status,
            loaded_count,
            ..
        } => {
            let chevron = if *expanded { "▾" } else { "▸" };
            let mut spans = vec![Span::raw(format!("{sel}{chevron} {label}"))];
            match status {
                FetchStatus::Idle => {}
                FetchStatus::Loading => {
                    spans.push(Span::styled(
                        format!(" ({spinner} loading)"),
                        theme.text_muted(),
                    ));
                }
                FetchStatus::Loaded => {
                    spans.push(Span::styled(format!(" ({loaded_count})"), theme.text_muted()));
                }
                FetchStatus::Error => {
                    spans.push(Span::styled(" ✗", theme.text_error()));
                }
            }
            Line::from(spans)
        }
        FlatNode::Child { child, .. } => {
            let indent = "    ";
            match child {
                ChildNode::Resource(r) => {
                    let mut spans = vec![Span::raw(format!("{sel}{indent}{}", r.name))];
                    if let Some(ns) = &r.namespace {
                        spans.push(Span::styled(format!("  {ns}"), theme.text_muted()));
                    }
                    Line::from(spans)
                }
                ChildNode::Loading => Line::from(Span::styled(
                    format!("{sel}{indent}{spinner} {LOADING_LABEL}"),
                    theme.text_muted(),
                )),
                ChildNode::Failed(_) => Line::from(Span::styled(
                    format!("{sel}{indent}✗ {}", child.label()),
                    theme.text_error(),
                )),
                ChildNode::Empty => Line::from(Span::styled(
                    format!("{sel}{indent}{EMPTY_LABEL}"),
                    theme.text_muted(),
                )),
            }
        }
    }
}
