//! Bar chart of the period buckets.
//!
//! Plots either the transaction count or the total value per period,
//! oldest on the left. The selected period's bar is highlighted.

use ratatui::{
    layout::Rect,
    text::Line,
    widgets::{Bar, BarChart, BarGroup, Block, Borders},
    Frame,
};

use dashboard_core::formatting::{format_currency_short, format_number};
use dashboard_core::models::ChartView;
use dashboard_data::aggregator::PeriodBucket;

use crate::themes::Theme;

const BAR_GAP: u16 = 1;

/// One bar as plotted: label, height, and the text drawn on the bar.
#[derive(Debug, Clone, PartialEq)]
pub struct BarSpec {
    pub label: String,
    pub height: u64,
    pub text: String,
    pub selected: bool,
}

/// Turn buckets into bars for `view`.
///
/// Values are plotted in kobo; negative totals are drawn as empty bars.
pub fn bar_specs(buckets: &[PeriodBucket], view: ChartView, selected: &str) -> Vec<BarSpec> {
    buckets
        .iter()
        .map(|b| {
            let (height, text) = match view {
                ChartView::Count => (b.count, format_number(b.count as f64, 0)),
                ChartView::Value => (
                    b.value.max(0.0).round() as u64,
                    format_currency_short(b.value),
                ),
            };
            BarSpec {
                label: b.label.clone(),
                height,
                text,
                selected: b.label == selected,
            }
        })
        .collect()
}

/// Widest bar that fits `count` bars in `width` columns, at least one.
pub fn bar_width(width: u16, count: usize) -> u16 {
    if count == 0 {
        return 1;
    }
    let count = count as u16;
    let gaps = BAR_GAP * count.saturating_sub(1);
    (width.saturating_sub(gaps) / count).max(1)
}

pub fn render_period_chart(
    frame: &mut Frame,
    area: Rect,
    buckets: &[PeriodBucket],
    view: ChartView,
    selected: &str,
    theme: &Theme,
) {
    let specs = bar_specs(buckets, view, selected);
    let bars: Vec<Bar> = specs
        .into_iter()
        .map(|spec| {
            let style = if spec.selected {
                theme.chart_bar_selected
            } else {
                theme.chart_bar
            };
            Bar::default()
                .value(spec.height)
                .text_value(spec.text)
                .label(Line::styled(spec.label, theme.chart_label))
                .style(style)
                .value_style(theme.chart_value)
        })
        .collect();

    let inner_width = area.width.saturating_sub(2);
    let title = format!(" Transactions by period ({}) ", view.label());

    let chart = BarChart::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.card_border)
                .title(title),
        )
        .bar_width(bar_width(inner_width, bars.len()))
        .bar_gap(BAR_GAP)
        .data(BarGroup::default().bars(&bars));

    frame.render_widget(chart, area);
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

    fn buckets() -> Vec<PeriodBucket> {
        vec![
            PeriodBucket {
                label: "May 2025".to_string(),
                count: 3,
                value: 72_000_000.0,
            },
            PeriodBucket {
                label: "Jun 2025".to_string(),
                count: 1_200,
                value: 0.0,
            },
        ]
    }

    // ── bar_specs ────────────────────────────────────────────────────────────

    #[test]
    fn test_bar_specs_count_view() {
        let specs = bar_specs(&buckets(), ChartView::Count, "Jun 2025");
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].height, 3);
        assert_eq!(specs[1].text, "1,200");
        assert!(!specs[0].selected);
        assert!(specs[1].selected);
    }

    #[test]
    fn test_bar_specs_value_view() {
        let specs = bar_specs(&buckets(), ChartView::Value, "May 2025");
        assert_eq!(specs[0].height, 72_000_000);
        assert_eq!(specs[0].text, "720k");
        assert_eq!(specs[1].text, "0");
        assert!(specs[0].selected);
    }

    #[test]
    fn test_bar_specs_negative_value_is_flat() {
        let b = vec![PeriodBucket {
            label: "Jan 2025".to_string(),
            count: 1,
            value: -500.0,
        }];
        assert_eq!(bar_specs(&b, ChartView::Value, "")[0].height, 0);
    }

    // ── bar_width ────────────────────────────────────────────────────────────

    #[test]
    fn test_bar_width() {
        assert_eq!(bar_width(119, 12), 9);
        assert_eq!(bar_width(10, 12), 1);
        assert_eq!(bar_width(50, 0), 1);
    }

    // ── render ───────────────────────────────────────────────────────────────

    #[test]
    fn test_render_period_chart_smoke() {
        let backend = TestBackend::new(60, 12);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::dark();
        let buckets = buckets();

        terminal
            .draw(|frame| {
                render_period_chart(
                    frame,
                    frame.area(),
                    &buckets,
                    ChartView::Value,
                    "Jun 2025",
                    &theme,
                );
            })
            .unwrap();

        let content: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(content.contains("Transactions by period (value)"));
    }

    #[test]
    fn test_render_period_chart_empty_does_not_panic() {
        let backend = TestBackend::new(40, 8);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::classic();

        terminal
            .draw(|frame| {
                render_period_chart(frame, frame.area(), &[], ChartView::Count, "", &theme);
            })
            .unwrap();
    }
}
