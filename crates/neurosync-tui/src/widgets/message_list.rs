//! Transcript widget for the conversation history

use std::time::Instant;

use neurosync_ai::Message;
use neurosync_chat::media::{self, ImageRef};
use neurosync_chat::{CONFIG_ERROR_TEXT, EXCHANGE_ERROR_TEXT};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use crate::theme::Theme;
use crate::widgets::spinner::spinner_frame;

/// Role header shown over operator turns
const USER_HEADER: &str = "▶ YOU";
/// Role header shown over replies
const ASSISTANT_HEADER: &str = "◀ NEURAL_SYNC_X";
/// Role header shown over local notices
const NOTICE_HEADER: &str = "● SYS";
/// Caption above a generated image link
const MEDIA_CAPTION: &str = "⟐ NEURAL GENERATION";
/// Text shown under the trailing bubble while a reply is pending
const PENDING_TEXT: &str = "SYNCHRONIZING...";

/// Display form of one transcript entry.
///
/// Built once per history change rather than per frame, so the image link
/// (which carries a random seed) stays stable while the entry is on screen.
#[derive(Debug, Clone)]
pub struct Bubble {
    /// Whether this entry came from the operator
    pub from_user: bool,
    /// Entry text with the media directive marker removed
    pub display: String,
    /// Image link when the entry carries a generation directive
    pub image: Option<ImageRef>,
    /// Whether this entry is one of the fixed failure notices
    pub is_error: bool,
    /// Whether this entry is a local notice, not part of the history
    pub is_notice: bool,
}

impl Bubble {
    /// Build the display form of a message
    pub fn from_message(message: &Message) -> Self {
        let content = message.content();
        let is_error = message.is_assistant()
            && (content == EXCHANGE_ERROR_TEXT || content == CONFIG_ERROR_TEXT);
        Self {
            from_user: !message.is_assistant(),
            display: media::display_text(content),
            image: media::parse(content),
            is_error,
            is_notice: false,
        }
    }

    /// A local notice shown in the transcript but never persisted
    pub fn notice(text: impl Into<String>) -> Self {
        Self {
            from_user: false,
            display: text.into(),
            image: None,
            is_error: false,
            is_notice: true,
        }
    }
}

/// Widget rendering the transcript as a scrollable column of bubbles
pub struct MessageList<'a> {
    bubbles: &'a [Bubble],
    theme: &'a Theme,
    scroll: usize,
    pending_since: Option<Instant>,
}

impl<'a> MessageList<'a> {
    /// Create a new transcript widget
    pub fn new(bubbles: &'a [Bubble], theme: &'a Theme) -> Self {
        Self {
            bubbles,
            theme,
            scroll: 0,
            pending_since: None,
        }
    }

    /// Set scroll offset in lines
    pub fn scroll(mut self, scroll: usize) -> Self {
        self.scroll = scroll;
        self
    }

    /// Show a trailing bubble while a reply is pending
    pub fn pending_since(mut self, since: Option<Instant>) -> Self {
        self.pending_since = since;
        self
    }

    fn render_bubble(&self, bubble: &Bubble, width: usize) -> Vec<Line<'static>> {
        let mut lines = Vec::new();

        let header = if bubble.is_notice {
            Span::styled(NOTICE_HEADER, self.theme.dim_style())
        } else if bubble.from_user {
            Span::styled(USER_HEADER, self.theme.user_bold())
        } else {
            Span::styled(ASSISTANT_HEADER, self.theme.assistant_bold())
        };
        lines.push(Line::from(header));

        let content_width = width.saturating_sub(2);
        let body_style = if bubble.is_error {
            self.theme.error_style()
        } else if bubble.is_notice {
            self.theme.dim_style()
        } else {
            self.theme.base_style()
        };

        for segment in wrap_body(&bubble.display, content_width) {
            lines.push(Line::from(Span::styled(
                format!("  {segment}"),
                body_style,
            )));
        }

        if let Some(image) = &bubble.image {
            lines.push(Line::from(Span::styled(
                format!("  {MEDIA_CAPTION}"),
                self.theme.accent_style(),
            )));
            for segment in wrap_body(&image.url, content_width) {
                lines.push(Line::from(Span::styled(
                    format!("  {segment}"),
                    self.theme.dim_style(),
                )));
            }
        }

        lines.push(Line::from(""));
        lines
    }

    fn pending_lines(&self, since: Instant) -> Vec<Line<'static>> {
        vec![
            Line::from(Span::styled(ASSISTANT_HEADER, self.theme.assistant_bold())),
            Line::from(Span::styled(
                format!("  {} {PENDING_TEXT}", spinner_frame(since)),
                self.theme.accent_style(),
            )),
            Line::from(""),
        ]
    }
}

impl Widget for MessageList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default().borders(Borders::NONE);
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let width = inner.width as usize;
        let mut all_lines: Vec<Line> = Vec::new();
        for bubble in self.bubbles {
            all_lines.extend(self.render_bubble(bubble, width));
        }
        if let Some(since) = self.pending_since {
            all_lines.extend(self.pending_lines(since));
        }

        let visible: Vec<Line> = all_lines
            .into_iter()
            .skip(self.scroll)
            .take(inner.height as usize)
            .collect();

        Paragraph::new(visible)
            .wrap(Wrap { trim: false })
            .render(inner, buf);
    }
}

/// Wrap entry text to the content width, preserving explicit line breaks
fn wrap_body(text: &str, content_width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for raw in text.lines() {
        if raw.is_empty() {
            lines.push(String::new());
            continue;
        }
        for segment in textwrap::wrap(raw, content_width) {
            lines.push(segment.into_owned());
        }
    }
    lines
}

/// Total line count the transcript occupies at the given width.
///
/// Must stay in step with `MessageList::render` so scroll clamping and
/// follow-tail behavior land on the right line.
pub fn calculate_transcript_height(bubbles: &[Bubble], pending: bool, width: usize) -> usize {
    let content_width = width.saturating_sub(2);
    let mut total = 0;

    for bubble in bubbles {
        total += 1; // header
        total += wrap_body(&bubble.display, content_width).len();
        if let Some(image) = &bubble.image {
            total += 1; // caption
            total += wrap_body(&image.url, content_width).len();
        }
        total += 1; // separator
    }

    if pending {
        total += 3;
    }

    total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bubble_strips_marker_and_derives_image() {
        let bubble = Bubble::from_message(&Message::assistant("GEN_IMG: a red fox"));
        assert!(!bubble.from_user);
        assert_eq!(bubble.display, "a red fox");
        let image = bubble.image.as_ref().unwrap();
        assert_eq!(image.prompt, "a red fox");
        assert!(image.url.starts_with("https://image.pollinations.ai/prompt/"));
    }

    #[test]
    fn test_bubble_without_marker_keeps_text_verbatim() {
        let bubble = Bubble::from_message(&Message::user("  run diagnostics  "));
        assert!(bubble.from_user);
        assert_eq!(bubble.display, "  run diagnostics  ");
        assert!(bubble.image.is_none());
    }

    #[test]
    fn test_user_bubbles_run_the_display_transform_too() {
        // The transform is per-message, not per-role: a directive typed by
        // the user renders exactly like one in a reply
        let bubble = Bubble::from_message(&Message::user("try GEN_IMG: a red fox"));
        assert!(bubble.from_user);
        assert_eq!(bubble.display, "try  a red fox");
        assert_eq!(bubble.image.as_ref().unwrap().prompt, "a red fox");
    }

    #[test]
    fn test_failure_notices_flag_as_errors_only_for_replies() {
        let reply = Bubble::from_message(&Message::assistant(EXCHANGE_ERROR_TEXT));
        assert!(reply.is_error);

        let typed = Bubble::from_message(&Message::user(EXCHANGE_ERROR_TEXT));
        assert!(!typed.is_error);
    }

    #[test]
    fn test_height_counts_header_body_and_separator() {
        let bubbles = vec![Bubble::from_message(&Message::user("hi"))];
        assert_eq!(calculate_transcript_height(&bubbles, false, 40), 3);
    }

    #[test]
    fn test_pending_bubble_adds_three_lines() {
        let bubbles = vec![Bubble::from_message(&Message::user("hi"))];
        let idle = calculate_transcript_height(&bubbles, false, 40);
        let pending = calculate_transcript_height(&bubbles, true, 40);
        assert_eq!(pending - idle, 3);
    }

    #[test]
    fn test_image_bubble_is_taller_than_plain_text() {
        let plain = vec![Bubble::from_message(&Message::assistant("a red fox"))];
        let media = vec![Bubble::from_message(&Message::assistant("GEN_IMG: a red fox"))];
        let plain_height = calculate_transcript_height(&plain, false, 120);
        let media_height = calculate_transcript_height(&media, false, 120);
        assert!(media_height >= plain_height + 2);
    }

    #[test]
    fn test_notice_bubbles_are_local_only() {
        let bubble = Bubble::notice("Unknown command: /warp");
        assert!(bubble.is_notice);
        assert!(!bubble.is_error);
        assert!(bubble.image.is_none());
    }

    #[test]
    fn test_explicit_line_breaks_are_preserved() {
        let bubbles = vec![Bubble::notice("one\ntwo\nthree")];
        // header + three body lines + separator
        assert_eq!(calculate_transcript_height(&bubbles, false, 40), 5);
    }

    #[test]
    fn test_wrapping_reflects_width() {
        let bubbles = vec![Bubble::from_message(&Message::user(
            "a moderately long command that will not fit on one narrow line",
        ))];
        let wide = calculate_transcript_height(&bubbles, false, 120);
        let narrow = calculate_transcript_height(&bubbles, false, 24);
        assert!(narrow > wide);
    }
}
