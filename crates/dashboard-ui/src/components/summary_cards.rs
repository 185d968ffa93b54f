use dashboard_core::formatting::{format_currency, format_number, format_pct_change};
use dashboard_core::models::SummaryData;
use dashboard_core::periods::{PeriodStrategy, SummaryKeys};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::truncate_to_width;
use crate::themes::Theme;

/// Placeholder for a figure the summary does not carry.
pub const MISSING: &str = "--";

/// One summary tile: a title, a headline figure and a secondary line.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryCard {
    pub title: String,
    pub headline: String,
    pub detail: String,
    /// Percent change shown under the detail line, when known.
    pub change: Option<f64>,
}

fn count_text(summary: &SummaryData, key: &str) -> String {
    summary
        .number(key)
        .map(|n| format_number(n, 0))
        .unwrap_or_else(|| MISSING.to_string())
}

fn amount_text(summary: &SummaryData, key: &str) -> String {
    summary
        .number(key)
        .map(format_currency)
        .unwrap_or_else(|| MISSING.to_string())
}

fn capitalise(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Build the tiles for `strategy` from a (possibly sparse) summary.
///
/// Monthly yields four tiles; quarterly adds "This month" and "This week".
pub fn build_cards(summary: &SummaryData, strategy: PeriodStrategy) -> Vec<SummaryCard> {
    let keys = strategy.summary_keys();
    let unit = capitalise(strategy.unit());

    let tx_change = summary.text(SummaryKeys::PCT_CHANGE_TRANSACTIONS);
    let amount_change = summary.text(SummaryKeys::PCT_CHANGE_AMOUNT);

    let mut cards = vec![
        SummaryCard {
            title: format!("This {unit}"),
            headline: amount_text(summary, &keys.this_total_amount),
            detail: format!("{} txns", count_text(summary, &keys.this_transactions)),
            change: None,
        },
        SummaryCard {
            title: format!("Last {unit}"),
            headline: amount_text(summary, &keys.last_total_amount),
            detail: format!("{} txns", count_text(summary, &keys.last_transactions)),
            change: None,
        },
        SummaryCard {
            title: "Txn change".to_string(),
            headline: tx_change
                .as_deref()
                .map(format_pct_change)
                .unwrap_or_else(|| MISSING.to_string()),
            detail: format!("vs last {}", strategy.unit()),
            change: summary.number(SummaryKeys::PCT_CHANGE_TRANSACTIONS),
        },
        SummaryCard {
            title: "Value change".to_string(),
            headline: amount_change
                .as_deref()
                .map(format_pct_change)
                .unwrap_or_else(|| MISSING.to_string()),
            detail: format!("vs last {}", strategy.unit()),
            change: summary.number(SummaryKeys::PCT_CHANGE_AMOUNT),
        },
    ];

    if strategy == PeriodStrategy::Quarterly {
        for unit in ["month", "week"] {
            cards.push(SummaryCard {
                title: format!("This {unit}"),
                headline: amount_text(summary, &format!("this_{unit}_total_amount")),
                detail: format!(
                    "{} txns",
                    count_text(summary, &format!("this_{unit}_transactions"))
                ),
                change: None,
            });
        }
    }

    cards
}

/// Render the summary tiles side by side across `area`.
pub fn render_summary_cards(
    frame: &mut Frame,
    area: Rect,
    summary: &SummaryData,
    strategy: PeriodStrategy,
    theme: &Theme,
) {
    let cards = build_cards(summary, strategy);
    let constraints = vec![Constraint::Ratio(1, cards.len() as u32); cards.len()];
    let slots = Layout::horizontal(constraints).split(area);

    for (card, slot) in cards.iter().zip(slots.iter()) {
        let inner_width = slot.width.saturating_sub(2) as usize;
        let headline_style: Style = match card.change {
            Some(pct) => theme.trend_style(pct),
            None => theme.value,
        };

        let lines = vec![
            Line::from(Span::styled(
                truncate_to_width(&card.headline, inner_width),
                headline_style,
            )),
            Line::from(Span::styled(
                truncate_to_width(&card.detail, inner_width),
                theme.dim,
            )),
        ];

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(theme.card_border)
            .title(Span::styled(
                format!(" {} ", truncate_to_width(&card.title, inner_width)),
                theme.card_title,
            ));

        frame.render_widget(Paragraph::new(lines).block(block), *slot);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
