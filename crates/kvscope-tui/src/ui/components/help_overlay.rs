use ratatui::{
    Frame,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::ui::Layout;

/// Help overlay showing keybindings
pub struct HelpOverlay;

impl HelpOverlay {
    pub fn render(frame: &mut Frame) {
        let popup_area = Layout::centered_popup(frame.area(), 52, 30);
        frame.render_widget(Clear, popup_area);

        let help_text = vec![
            Line::from(Span::styled(
                "Keybindings",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Self::section("Panes"),
            Self::key_line("Tab", "Next pane"),
            Self::key_line("/", "Search by key prefix"),
            Self::key_line("j/↓ k/↑", "Move selection"),
            Self::key_line("Enter", "Open database / view key"),
            Line::from(""),
            Self::section("Keys"),
            Self::key_line("n/→", "Next page"),
            Self::key_line("p/←", "Previous page"),
            Self::key_line("a", "Add a key"),
            Self::key_line("d", "Delete selected key"),
            Self::key_line("x", "Clear search"),
            Self::key_line("r", "Reload / retry failed page"),
            Line::from(""),
            Self::section("Dialogs"),
            Self::key_line("e", "Edit the viewed value"),
            Self::key_line("Tab", "Switch field"),
            Self::key_line("Enter", "Save / confirm"),
            Self::key_line("Ctrl+j", "New line in value"),
            Self::key_line("Esc", "Close"),
            Line::from(""),
            Self::key_line("?", "Toggle this help"),
            Self::key_line("q", "Quit"),
        ];

        let help_widget = Paragraph::new(help_text).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(Span::styled(
                    " Help ",
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                )),
        );

        frame.render_widget(help_widget, popup_area);
    }

    fn section(title: &str) -> Line<'_> {
        Line::from(Span::styled(title, Style::default().fg(Color::Yellow)))
    }

    fn key_line<'a>(key: &'a str, desc: &'a str) -> Line<'a> {
        Line::from(vec![
            Span::styled(format!("  {:>8}", key), Style::default().fg(Color::Green)),
            Span::styled(format!("  {}", desc), Style::default().fg(Color::White)),
        ])
    }
}
