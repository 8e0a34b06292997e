//! Activity spinner

use std::time::Instant;

use ratatui::{buffer::Buffer, layout::Rect, style::Style, widgets::Widget};

/// Spinner animation frames
const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Frame duration in milliseconds
const FRAME_DURATION_MS: u128 = 80;

/// Current animation frame for an activity that started at `started`.
pub fn spinner_frame(started: Instant) -> &'static str {
    let elapsed = started.elapsed().as_millis();
    let index = (elapsed / FRAME_DURATION_MS) as usize % SPINNER_FRAMES.len();
    SPINNER_FRAMES[index]
}

/// Animated spinner with a trailing label
pub struct Spinner {
    started: Instant,
    label: String,
    style: Style,
}

impl Spinner {
    /// Create a spinner that started at the given instant
    pub fn new(started: Instant, label: impl Into<String>) -> Self {
        Self {
            started,
            label: label.into(),
            style: Style::default(),
        }
    }

    /// Set the style
    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }
}

impl Widget for Spinner {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let text = format!("{} {}", spinner_frame(self.started), self.label);
        buf.set_stringn(area.x, area.y, &text, area.width as usize, self.style);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_advances_with_time() {
        let now = Instant::now();
        let frame = spinner_frame(now);
        assert!(SPINNER_FRAMES.contains(&frame));

        // An activity started three frame periods earlier sits on a
        // different frame than one started just now
        let period = std::time::Duration::from_millis(3 * FRAME_DURATION_MS as u64);
        if let Some(earlier) = now.checked_sub(period) {
            assert_ne!(spinner_frame(earlier), spinner_frame(now));
        }
    }

    #[test]
    fn test_all_frames_are_single_width() {
        for frame in SPINNER_FRAMES {
            assert_eq!(frame.chars().count(), 1);
        }
    }
}
