use ratatui::layout::{Constraint, Direction, Layout as RatatuiLayout, Rect};

/// Layout helper for consistent screen layouts
pub struct Layout;

/// Areas of the browser screen
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BrowserAreas {
    pub header: Rect,
    pub sidebar: Rect,
    pub search: Rect,
    pub keys: Rect,
    pub pager: Rect,
    pub status: Rect,
}

impl Layout {
    /// Create the main layout with header, content, and status bar
    pub fn main(area: Rect) -> (Rect, Rect, Rect) {
        let chunks = RatatuiLayout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(1),    // Content
                Constraint::Length(1), // Status bar
            ])
            .split(area);

        (chunks[0], chunks[1], chunks[2])
    }

    /// Database sidebar on the left, search / keys / pager on the right
    pub fn browser(area: Rect) -> BrowserAreas {
        let (header, content, status) = Self::main(area);

        let columns = RatatuiLayout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(25), // Databases
                Constraint::Min(20),        // Keys
            ])
            .split(content);

        let right = RatatuiLayout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Search
                Constraint::Min(3),    // Key list
                Constraint::Length(1), // Pager
            ])
            .split(columns[1]);

        BrowserAreas {
            header,
            sidebar: columns[0],
            search: right[0],
            keys: right[1],
            pager: right[2],
            status,
        }
    }

    /// A popup of at most `width` x `height` centered in `area`
    pub fn centered_popup(area: Rect, width: u16, height: u16) -> Rect {
        let width = width.min(area.width.saturating_sub(4));
        let height = height.min(area.height.saturating_sub(2));

        let x = area.x + area.width.saturating_sub(width) / 2;
        let y = area.y + area.height.saturating_sub(height) / 2;
        Rect::new(x, y, width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_browser_areas_fill_screen() {
        let area = Rect::new(0, 0, 100, 30);
        let areas = Layout::browser(area);

        assert_eq!(areas.header.height, 3);
        assert_eq!(areas.status.y, 29);
        assert_eq!(areas.sidebar.x, 0);
        assert_eq!(areas.search.x, areas.keys.x);
        assert_eq!(areas.pager.y + 1, areas.status.y);
    }

    #[test]
    fn test_centered_popup_fits() {
        let area = Rect::new(0, 0, 40, 10);
        let popup = Layout::centered_popup(area, 80, 20);
        assert!(popup.width <= 36);
        assert!(popup.height <= 8);
        assert!(popup.x >= 2);
    }
}
