//! Transaction table for the selected period.
//!
//! Renders a bordered [`ratatui::widgets::Table`] with one row per
//! transaction plus a highlighted totals row (total, average, count) at the
//! bottom. The highlighted row is driven by a [`TableState`].

use ratatui::{
    layout::{Constraint, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use dashboard_core::formatting;
use dashboard_core::models::Transaction;
use dashboard_core::periods::INVALID_DATE_LABEL;
use dashboard_core::time_utils::TimezoneHandler;
use dashboard_data::aggregator::Selection;

use crate::themes::Theme;

/// Highlight marker drawn in front of the selected row.
pub const ROW_MARKER: &str = "▶ ";

fn status_text(tx: &Transaction) -> &'static str {
    match tx.payment_status {
        1 => "success",
        0 => "failed",
        _ => "pending",
    }
}

/// `entrydt` rendered in the display timezone, or `"Invalid Date"`.
pub fn display_date(tx: &Transaction, tz: &TimezoneHandler) -> String {
    tx.timestamp()
        .and_then(|ts| tz.parse_timestamp(ts))
        .map(|dt| tz.to_local(dt).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| INVALID_DATE_LABEL.to_string())
}

/// Text of the totals row: total value, average value, count.
pub fn totals_cells(selection: &Selection) -> [String; 3] {
    [
        formatting::format_currency(selection.total()),
        format!("avg {}", formatting::format_currency(selection.average())),
        format!("{} txns", formatting::format_number(selection.count() as f64, 0)),
    ]
}

/// Render the transactions of `selection` into `area`.
///
/// `state` holds the highlighted row index; the totals row is never
/// selectable because it is appended after the data rows.
pub fn render_transaction_table(
    frame: &mut Frame,
    area: Rect,
    selection: &Selection,
    tz: &TimezoneHandler,
    state: &mut TableState,
    theme: &Theme,
) {
    let header_cells = ["Merchant", "Payment ID", "Channel", "Amount", "Status", "Date"]
        .iter()
        .map(|h| Cell::from(*h).style(theme.table_header));
    let header = Row::new(header_cells).height(1);

    let data_rows: Vec<Row> = selection
        .transactions()
        .iter()
        .enumerate()
        .map(|(i, tx)| {
            let style = if i % 2 == 0 {
                theme.table_row
            } else {
                theme.table_row_alt
            };
            Row::new(vec![
                Cell::from(tx.merchantid.clone()),
                Cell::from(tx.paymentid.clone()),
                Cell::from(tx.channelid.clone()),
                Cell::from(formatting::format_currency(tx.amount)),
                Cell::from(status_text(tx)),
                Cell::from(display_date(tx, tz)),
            ])
            .style(style)
        })
        .collect();

    let [total, average, count] = totals_cells(selection);
    let total_row = Row::new(vec![
        Cell::from("TOTAL"),
        Cell::from(count),
        Cell::from(""),
        Cell::from(total),
        Cell::from(average),
        Cell::from(""),
    ])
    .style(theme.table_total);

    let mut all_rows = data_rows;
    all_rows.push(total_row);

    let widths = [
        Constraint::Length(22),
        Constraint::Length(20),
        Constraint::Length(12),
        Constraint::Length(14),
        Constraint::Length(18),
        Constraint::Length(17),
    ];

    let title = if selection.label().is_empty() {
        " Transactions ".to_string()
    } else {
        format!(" Transactions: {} ", selection.label())
    };

    let table = Table::new(all_rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(title),
        )
        .style(theme.text)
        .row_highlight_style(theme.table_selected)
        .highlight_symbol(ROW_MARKER);

    frame.render_stateful_widget(table, area, state);
}

/// Render a placeholder when the selected period has no transactions.
pub fn render_no_data(frame: &mut Frame, area: Rect, label: &str, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("No transactions for {label}"),
            theme.warning,
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Use ←/→ to pick another period, 'r' to reload.",
            theme.dim,
        )),
        Line::from(Span::styled("Press 'q' or Ctrl+C to exit", theme.dim)),
    ];
    frame.render_widget(
        Paragraph::new(ratatui::text::Text::from(text)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(" Transactions "),
        ),
        area,
    );
}

// ── Tests ──────────────────────────────────────────────────────────────────────
