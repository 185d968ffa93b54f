use crate::themes::Theme;
use ratatui::text::{Line, Span};

/// Decorative marker placed either side of the application title.
pub const ACCENT: &str = "◆";

/// Dashboard header rendering three lines:
///
/// 1. Application title between accent markers.
/// 2. A 60-column `=` separator.
/// 3. `[ operator (role) | granularity | timezone ]`.
pub struct Header<'a> {
    pub operator: &'a str,
    pub role: &'a str,
    /// Granularity name, e.g. `"monthly"`.
    pub period: &'a str,
    pub timezone: &'a str,
    pub theme: &'a Theme,
}

impl<'a> Header<'a> {
    pub fn new(
        operator: &'a str,
        role: &'a str,
        period: &'a str,
        timezone: &'a str,
        theme: &'a Theme,
    ) -> Self {
        Self {
            operator,
            role,
            period,
            timezone,
            theme,
        }
    }

    pub fn to_lines(&self) -> Vec<Line<'a>> {
        let separator = "=".repeat(60);

        vec![
            Line::from(vec![
                Span::styled(ACCENT, self.theme.header_accent),
                Span::styled(" PAYMENTS ADMIN DASHBOARD ", self.theme.header),
                Span::styled(ACCENT, self.theme.header_accent),
            ]),
            Line::from(Span::styled(separator, self.theme.separator)),
            Line::from(vec![
                Span::styled("[ ", self.theme.label),
                Span::styled(self.operator, self.theme.value),
                Span::styled(format!(" ({})", self.role), self.theme.dim),
                Span::styled(" | ", self.theme.label),
                Span::styled(self.period.to_lowercase(), self.theme.value),
                Span::styled(" | ", self.theme.label),
                Span::styled(self.timezone, self.theme.value),
                Span::styled(" ]", self.theme.label),
            ]),
        ]
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_header_to_lines_count() {
        let theme = Theme::dark();
        let header = Header::new("admin@example.com", "admin", "monthly", "UTC", &theme);
        assert_eq!(header.to_lines().len(), 3);
    }

    #[test]
    fn test_header_title_line_content() {
        let theme = Theme::dark();
        let lines = Header::new("a@b.c", "viewer", "monthly", "UTC", &theme).to_lines();
        let title = text(&lines[0]);
        assert!(title.contains("PAYMENTS ADMIN DASHBOARD"), "got: {title}");
        assert!(title.starts_with(ACCENT));
    }

    #[test]
    fn test_header_separator_is_60_columns() {
        let theme = Theme::dark();
        let lines = Header::new("a@b.c", "viewer", "monthly", "UTC", &theme).to_lines();
        assert_eq!(text(&lines[1]), "=".repeat(60));
    }

    #[test]
    fn test_header_info_line() {
        let theme = Theme::light();
        let lines =
            Header::new("ops@example.com", "operator", "Quarterly", "Africa/Lagos", &theme)
                .to_lines();
        let info = text(&lines[2]);
        assert_eq!(
            info,
            "[ ops@example.com (operator) | quarterly | Africa/Lagos ]"
        );
    }
}
