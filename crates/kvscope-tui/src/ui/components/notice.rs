use ratatui::{
    Frame,
    layout::Alignment,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use kvscope_types::Notice;

use crate::ui::{Layout, Theme, text};

/// Blocking message; any key dismisses it
pub struct NoticePopup;

impl NoticePopup {
    pub fn render(frame: &mut Frame, notice: &Notice) {
        let color = notice.level.color();

        let mut lines: Vec<Line> = text::literal_lines(&notice.message)
            .into_iter()
            .map(|line| Line::from(Span::styled(line, Theme::text())))
            .collect();
        lines.push(Line::from(""));
        lines.push(
            Line::from(Span::styled("press any key", Theme::text_dim()))
                .alignment(Alignment::Right),
        );

        let height = (lines.len() as u16 + 2).clamp(5, 14);
        let area = Layout::centered_popup(frame.area(), 60, height);
        frame.render_widget(Clear, area);

        let popup = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color))
                .title(Span::styled(
                    notice.level.title(),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                )),
        );
        frame.render_widget(popup, area);
    }
}
