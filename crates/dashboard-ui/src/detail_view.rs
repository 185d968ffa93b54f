//! Popup showing a transaction's payment details with card data masked.

use ratatui::{
    layout::{Constraint, Flex, Layout, Rect},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use dashboard_core::formatting::format_currency;
use dashboard_core::masking::mask_sensitive_data;
use dashboard_core::models::Transaction;

use crate::themes::Theme;

/// `area` shrunk to `percent_x` by `percent_y`, centred.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let [row] = Layout::vertical([Constraint::Percentage(percent_y)])
        .flex(Flex::Center)
        .areas(area);
    let [cell] = Layout::horizontal([Constraint::Percentage(percent_x)])
        .flex(Flex::Center)
        .areas(row);
    cell
}

/// Lines of the popup body: a short summary followed by the masked JSON.
pub fn detail_lines<'a>(tx: &Transaction, theme: &Theme) -> Vec<Line<'a>> {
    let mut lines = vec![
        Line::from(vec![
            Span::styled("Payment ", theme.label),
            Span::styled(tx.paymentid.clone(), theme.value),
            Span::styled("  Merchant ", theme.label),
            Span::styled(tx.merchantid.clone(), theme.value),
        ]),
        Line::from(vec![
            Span::styled("Amount ", theme.label),
            Span::styled(format_currency(tx.amount), theme.value),
            Span::styled("  Reference ", theme.label),
            Span::styled(tx.paymentreference.clone(), theme.text),
        ]),
        Line::from(""),
    ];

    let masked = mask_sensitive_data(&tx.jsondata);
    lines.extend(
        masked
            .lines()
            .map(|l| Line::from(Span::styled(l.to_string(), theme.popup_text))),
    );
    lines
}

/// Draw the inspector over `area`. `scroll` is the number of body lines
/// scrolled past.
pub fn render_detail_popup(
    frame: &mut Frame,
    area: Rect,
    tx: &Transaction,
    scroll: u16,
    theme: &Theme,
) {
    let popup = centered_rect(70, 70, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.popup_border)
        .title(" Payment details ")
        .title_bottom(Line::from(Span::styled(" ↑/↓ scroll · Esc close ", theme.dim)));

    let paragraph = Paragraph::new(Text::from(detail_lines(tx, theme)))
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));

    frame.render_widget(Clear, popup);
    frame.render_widget(paragraph, popup);
}

// ── Tests ─────────────────────────────────────────────────────────────────────
