use chrono::{DateTime, Local};
use std::fmt::{Display, Formatter};

use crate::input::Action;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
pub enum NavLevel {
    #[default]
    Namespaces,
    Pods,
    Containers,
    Logs,
}

impl NavLevel {
    pub fn title(self) -> &'static str {
        match self {
            Self::Namespaces => "Namespaces",
            Self::Pods => "Pods",
            Self::Containers => "Containers",
            Self::Logs => "Logs",
        }
    }

    /// The level shown side by side with this one.
    pub fn paired(self) -> Self {
        match self {
            Self::Namespaces => Self::Pods,
            Self::Pods => Self::Namespaces,
            Self::Containers => Self::Logs,
            Self::Logs => Self::Containers,
        }
    }

    pub fn is_drilled(self) -> bool {
        matches!(self, Self::Containers | Self::Logs)
    }
}

impl Display for NavLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.title().to_ascii_lowercase())
    }
}

/// A single-column list of names with a cursor. Never empty: a fetch that
/// returns nothing leaves one blank placeholder row so the cursor stays valid.
#[derive(Debug, Clone)]
pub struct ResourceTable {
    pub title: String,
    pub width: u16,
    rows: Vec<String>,
    selected: usize,
    page_size: usize,
    pub last_refreshed: Option<DateTime<Local>>,
}

impl ResourceTable {
    pub fn new(title: impl Into<String>, width: u16, rows: Vec<String>) -> Self {
        let rows = if rows.is_empty() {
            vec![String::new()]
        } else {
            rows
        };

        Self {
            title: title.into(),
            width,
            rows,
            selected: 0,
            page_size: 10,
            last_refreshed: Some(Local::now()),
        }
    }

    pub fn placeholder(title: impl Into<String>, width: u16) -> Self {
        let mut table = Self::new(title, width, Vec::new());
        table.last_refreshed = None;
        table
    }

    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_row(&self) -> &str {
        self.rows
            .get(self.selected)
            .map(String::as_str)
            .unwrap_or_default()
    }

    pub fn has_selection(&self) -> bool {
        !self.selected_row().is_empty()
    }

    pub fn is_placeholder(&self) -> bool {
        self.rows.len() == 1 && self.rows[0].is_empty()
    }

    /// Row count ignoring the placeholder.
    pub fn item_count(&self) -> usize {
        if self.is_placeholder() {
            0
        } else {
            self.rows.len()
        }
    }

    pub fn set_page_size(&mut self, rows: usize) {
        self.page_size = rows.max(1);
    }

    pub fn scroll_to_bottom(&mut self) {
        self.selected = self.rows.len().saturating_sub(1);
    }

    /// Applies cursor movement; actions that are not movement are ignored.
    pub fn handle_action(&mut self, action: Action) {
        match action {
            Action::Down => self.move_selection(1),
            Action::Up => self.move_selection(-1),
            Action::PageDown => self.move_selection(self.page_size as isize),
            Action::PageUp => self.move_selection(-(self.page_size as isize)),
            Action::HalfPageDown => self.move_selection(self.half_page()),
            Action::HalfPageUp => self.move_selection(-self.half_page()),
            Action::Top => self.selected = 0,
            Action::Bottom => self.scroll_to_bottom(),
            Action::Back | Action::CycleFocus | Action::Select | Action::Reload => {}
        }
    }

    fn half_page(&self) -> isize {
        (self.page_size / 2).max(1) as isize
    }

    fn move_selection(&mut self, delta: isize) {
        let max = self.rows.len().saturating_sub(1) as isize;
        let next = (self.selected as isize + delta).clamp(0, max);
        self.selected = next as usize;
    }
}
