//! Command input widget

use crate::input::Action;
use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::Span,
    widgets::{Block, Borders, Paragraph, Widget},
};
use unicode_width::UnicodeWidthChar;

/// Single-line command input with horizontal scrolling
#[derive(Debug, Default)]
pub struct InputBox {
    /// Current input text
    content: String,
    /// Cursor position (character index, not byte index)
    cursor: usize,
    /// Horizontal scroll offset (in display width)
    scroll: usize,
    /// Placeholder text
    placeholder: String,
    /// Whether the input is focused
    focused: bool,
    /// Whether voice capture is in progress
    listening: bool,
}

impl InputBox {
    /// Create a new input box
    pub fn new() -> Self {
        Self::default()
    }

    /// Set placeholder text
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// Set focus state
    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    /// Set whether voice capture is in progress
    pub fn set_listening(&mut self, listening: bool) {
        self.listening = listening;
    }

    /// Whether voice capture is in progress
    pub fn is_listening(&self) -> bool {
        self.listening
    }

    /// Get the current content
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Whether the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Replace the buffer, placing the cursor at the end
    pub fn set_content(&mut self, content: impl Into<String>, width: u16) {
        self.content = content.into();
        self.cursor = self.content.chars().count();
        self.update_scroll(width as usize);
    }

    /// Take the buffer contents, leaving the input empty
    pub fn take(&mut self) -> String {
        let text = std::mem::take(&mut self.content);
        self.cursor = 0;
        self.scroll = 0;
        text
    }

    /// Clear the content
    pub fn clear(&mut self) {
        self.content.clear();
        self.cursor = 0;
        self.scroll = 0;
    }

    /// Byte offset of the cursor within the content
    fn cursor_byte_offset(&self) -> usize {
        self.content
            .char_indices()
            .nth(self.cursor)
            .map(|(i, _)| i)
            .unwrap_or(self.content.len())
    }

    /// Display width of the text before the cursor
    fn cursor_display_width(&self) -> usize {
        self.content
            .chars()
            .take(self.cursor)
            .map(|c| c.width().unwrap_or(0))
            .sum()
    }

    /// Handle an input action
    pub fn handle_action(&mut self, action: &Action, width: u16) {
        let char_count = self.content.chars().count();

        match action {
            Action::Char(c) => {
                self.insert_char(*c);
            }
            Action::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    let offset = self.cursor_byte_offset();
                    self.content.remove(offset);
                }
            }
            Action::Delete => {
                if self.cursor < char_count {
                    let offset = self.cursor_byte_offset();
                    self.content.remove(offset);
                }
            }
            Action::Left => {
                self.cursor = self.cursor.saturating_sub(1);
            }
            Action::Right => {
                if self.cursor < char_count {
                    self.cursor += 1;
                }
            }
            Action::Home => {
                self.cursor = 0;
            }
            Action::End => {
                self.cursor = char_count;
            }
            Action::ClearLine => {
                self.clear();
            }
            Action::DeleteWord => {
                let chars: Vec<char> = self.content.chars().collect();
                let mut start = self.cursor;
                while start > 0 && chars.get(start - 1) == Some(&' ') {
                    start -= 1;
                }
                while start > 0 && chars.get(start - 1) != Some(&' ') {
                    start -= 1;
                }
                let start_byte = self
                    .content
                    .char_indices()
                    .nth(start)
                    .map(|(i, _)| i)
                    .unwrap_or(self.content.len());
                let end_byte = self.cursor_byte_offset();
                self.content.drain(start_byte..end_byte);
                self.cursor = start;
            }
            Action::Paste(text) => {
                // Single-line input: fold newlines into spaces
                for c in text.chars() {
                    match c {
                        '\n' => self.insert_char(' '),
                        '\r' => {}
                        _ => self.insert_char(c),
                    }
                }
            }
            _ => {}
        }

        self.update_scroll(width as usize);
    }

    fn insert_char(&mut self, c: char) {
        let offset = self.cursor_byte_offset();
        self.content.insert(offset, c);
        self.cursor += 1;
    }

    fn update_scroll(&mut self, width: usize) {
        let visible_width = width.saturating_sub(4); // borders plus padding
        let cursor_pos = self.cursor_display_width();

        if cursor_pos < self.scroll {
            self.scroll = cursor_pos;
        } else if visible_width > 0 && cursor_pos >= self.scroll + visible_width {
            self.scroll = cursor_pos - visible_width + 1;
        }
    }

    /// Render the input box
    pub fn render(&self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        let border_style = if self.listening {
            theme.error_style()
        } else if self.focused {
            theme.accent_style()
        } else {
            theme.border_style()
        };

        let mut block = Block::default().borders(Borders::ALL).border_style(border_style);
        if self.listening {
            block = block.title(Span::styled(" ◉ CAPTURING ", theme.error_style()));
        }

        let inner = block.inner(area);
        block.render(area, buf);
        if inner.width == 0 || inner.height == 0 {
            return;
        }

        if self.content.is_empty() {
            let hint = if self.listening {
                "Listening..."
            } else {
                self.placeholder.as_str()
            };
            Paragraph::new(hint).style(theme.dim_style()).render(inner, buf);
        } else {
            let visible = self.visible_window(inner.width as usize);
            Paragraph::new(visible).style(theme.base_style()).render(inner, buf);
        }

        // Cursor cell
        if self.focused {
            let cursor_x = self.cursor_display_width().saturating_sub(self.scroll);
            if cursor_x < inner.width as usize {
                let x = inner.x + cursor_x as u16;
                if let Some(cell) = buf.cell_mut((x, inner.y)) {
                    cell.set_style(Style::default().bg(theme.accent));
                }
            }
        }
    }

    /// The slice of the content visible after applying horizontal scroll
    fn visible_window(&self, visible_width: usize) -> String {
        let mut skipped = 0;
        let mut taken = 0;
        let mut visible = String::new();

        for c in self.content.chars() {
            let w = c.width().unwrap_or(0);
            if skipped < self.scroll {
                skipped += w;
                continue;
            }
            if taken + w > visible_width {
                break;
            }
            visible.push(c);
            taken += w;
        }

        visible
    }
}
