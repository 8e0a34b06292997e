//! TUI implementation for neurosync

use tokio::sync::mpsc;

use crossterm::event::{Event, EventStream, MouseEventKind};
use futures::StreamExt;
use neurosync_ai::Message;
use neurosync_chat::{ChatEvent, Controller, Recognizer, Speaker, VoiceState, seed_history};
use neurosync_tui::{
    Theme,
    input::{Action, event_to_action},
    widgets::{Bubble, InputBox, MessageList, Spinner},
};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
};
use std::time::Instant;

/// Messages sent from UI state to the event loop
#[derive(Debug)]
pub enum UiMessage {
    /// User submitted input
    Submit(String),
    /// User requested quit
    Quit,
    /// Start a voice capture session
    Listen,
    /// Slash command
    Command(String),
}

/// TUI application state
pub struct TuiState {
    /// Transcript entries in display form
    bubbles: Vec<Bubble>,
    /// Input box
    input: InputBox,
    /// Current scroll position
    scroll: usize,
    /// Set while a reply is pending
    pending_since: Option<Instant>,
    /// Voice capture state
    voice: VoiceState,
    /// Current status message
    status: String,
    /// Theme
    theme: Theme,
    /// Model name for the title bar
    model: String,
    /// Speech output for replies
    speaker: Speaker,
    /// Whether voice capture is available
    voice_capture: bool,
    /// Channel to the event loop
    ui_tx: mpsc::Sender<UiMessage>,
}

impl TuiState {
    pub fn new(
        model: &str,
        speaker: Speaker,
        voice_capture: bool,
        ui_tx: mpsc::Sender<UiMessage>,
    ) -> Self {
        let mut input = InputBox::new().with_placeholder("Awaiting Command...");
        input.set_focused(true);

        Self {
            bubbles: vec![],
            input,
            scroll: 0,
            pending_since: None,
            voice: VoiceState::Idle,
            status: "ONLINE".to_string(),
            theme: Theme::default(),
            model: model.to_string(),
            speaker,
            voice_capture,
            ui_tx,
        }
    }

    /// Rebuild the transcript from a history snapshot
    pub fn sync_from(&mut self, messages: &[Message]) {
        self.bubbles = messages.iter().map(Bubble::from_message).collect();
        self.scroll_to_bottom();
    }

    /// Handle conversation events
    pub fn handle_chat_event(&mut self, event: ChatEvent) {
        match event {
            ChatEvent::TurnStarted => {
                // Usually set when the submission is queued; kept as a
                // fallback for event-only observers
                self.pending_since.get_or_insert_with(Instant::now);
                self.status = "SYNCHRONIZING...".to_string();
            }
            ChatEvent::HistoryChanged { messages } => {
                self.sync_from(&messages);
            }
            ChatEvent::ReplyReceived { message } => {
                self.speaker.speak(message.content());
            }
            ChatEvent::TurnEnded => {
                self.pending_since = None;
                self.status = "ONLINE".to_string();
            }
        }
    }

    /// Move the voice capture machine and sync the input indicator
    pub fn set_voice(&mut self, voice: VoiceState) {
        self.voice = voice;
        self.input.set_listening(voice == VoiceState::Listening);
    }

    /// Whether a voice capture session is running
    pub fn is_listening(&self) -> bool {
        self.voice == VoiceState::Listening
    }

    /// Apply the outcome of a voice capture session
    pub fn handle_transcript(&mut self, transcript: Option<String>, width: u16) {
        self.set_voice(VoiceState::Idle);
        match transcript {
            Some(text) => {
                self.input.set_content(text, width);
                self.status = "ONLINE".to_string();
            }
            None => {
                self.status = "NO TRANSCRIPT CAPTURED".to_string();
            }
        }
    }

    /// Show a local notice in the transcript
    pub fn show_notice(&mut self, content: &str) {
        self.bubbles.push(Bubble::notice(content));
        self.scroll_to_bottom();
    }

    fn scroll_to_bottom(&mut self) {
        // Clamped to the real bottom during render
        self.scroll = usize::MAX;
    }

    /// Handle keyboard action
    pub async fn handle_action(&mut self, action: Action, width: u16) -> bool {
        match action {
            Action::Submit => {
                let content = self.input.content().to_string();
                if !content.trim().is_empty() && self.pending_since.is_none() {
                    self.input.clear();

                    if content.trim_start().starts_with('/') {
                        let _ = self.ui_tx.send(UiMessage::Command(content)).await;
                    } else {
                        let _ = self.ui_tx.send(UiMessage::Submit(content)).await;
                    }
                }
                true
            }
            Action::Quit | Action::Interrupt => {
                let _ = self.ui_tx.send(UiMessage::Quit).await;
                false
            }
            Action::Escape => {
                if self.pending_since.is_none() {
                    let _ = self.ui_tx.send(UiMessage::Quit).await;
                    false
                } else {
                    true
                }
            }
            Action::Listen => {
                let _ = self.ui_tx.send(UiMessage::Listen).await;
                true
            }
            Action::Up => {
                self.scroll = self.scroll.saturating_sub(1);
                true
            }
            Action::Down => {
                self.scroll = self.scroll.saturating_add(1);
                true
            }
            Action::PageUp => {
                self.scroll = self.scroll.saturating_sub(10);
                true
            }
            Action::PageDown => {
                self.scroll = self.scroll.saturating_add(10);
                true
            }
            Action::Clear => {
                self.scroll_to_bottom();
                true
            }
            _ => {
                self.input.handle_action(&action, width);
                true
            }
        }
    }

    /// Render the UI
    pub fn render(&mut self, frame: &mut Frame) {
        let size = frame.area();

        // Layout: transcript (flex), status bar (1), input (3)
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),    // Transcript
                Constraint::Length(1), // Status
                Constraint::Length(3), // Input
            ])
            .split(size);

        self.render_transcript(frame, chunks[0]);
        self.render_status(frame, chunks[1]);
        self.input.render(chunks[2], frame.buffer_mut(), &self.theme);
    }

    fn render_transcript(&mut self, frame: &mut Frame, area: Rect) {
        let title = format!(" NEURAL_SYNC_X │ {} ", self.model);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border_style())
            .title(title);

        let inner = block.inner(area);
        frame.render_widget(block, area);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let pending = self.pending_since.is_some();
        let content_height = neurosync_tui::widgets::message_list::calculate_transcript_height(
            &self.bubbles,
            pending,
            inner.width as usize,
        );

        if self.scroll == usize::MAX {
            // Follow the tail
            self.scroll = content_height.saturating_sub(inner.height as usize);
        } else {
            self.scroll = self
                .scroll
                .min(content_height.saturating_sub(inner.height as usize));
        }

        let list = MessageList::new(&self.bubbles, &self.theme)
            .scroll(self.scroll)
            .pending_since(self.pending_since);
        frame.render_widget(list, inner);

        if content_height > inner.height as usize {
            let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .begin_symbol(Some("↑"))
                .end_symbol(Some("↓"))
                .track_symbol(Some("│"))
                .thumb_symbol("█");

            let mut scrollbar_state = ScrollbarState::new(content_height)
                .position(self.scroll)
                .viewport_content_length(inner.height as usize);

            frame.render_stateful_widget(scrollbar, inner, &mut scrollbar_state);
        }
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        if let Some(since) = self.pending_since {
            let spinner =
                Spinner::new(since, self.status.as_str()).style(self.theme.accent_style());
            frame.render_widget(spinner, area);
            return;
        }

        let left_content = format!("{} │ {}", self.model, self.status);
        let right_content = if self.voice_capture {
            "Ctrl+R: voice │ Ctrl+L: latest │ Ctrl+C: quit"
        } else {
            "Ctrl+L: latest │ Ctrl+C: quit"
        };

        let left_width = left_content.chars().count();
        let right_width = right_content.chars().count();
        let available = area.width as usize;

        let line = if left_width + right_width + 2 <= available {
            let spacing = available - left_width - right_width;
            Line::from(vec![
                Span::styled(left_content, self.theme.dim_style()),
                Span::raw(" ".repeat(spacing)),
                Span::styled(right_content, self.theme.dim_style()),
            ])
        } else {
            Line::from(Span::styled(left_content, self.theme.dim_style()))
        };

        frame.render_widget(Paragraph::new(line), area);
    }
}

/// Run the TUI application
pub async fn run_tui(
    controller: &mut Controller,
    model_name: &str,
    speaker: Speaker,
    recognizer: Recognizer,
) -> anyhow::Result<()> {
    use crate::commands::{CommandResult, execute_command};
    use crossterm::{
        execute,
        terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
    };
    use ratatui::{Terminal, backend::CrosstermBackend};
    use std::io;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create channels
    let (ui_tx, mut ui_rx) = mpsc::channel::<UiMessage>(32);
    let (voice_tx, mut voice_rx) = mpsc::channel::<Option<String>>(4);

    // Create state from the restored history
    let voice_capture = recognizer.is_available();
    let mut state = TuiState::new(model_name, speaker, voice_capture, ui_tx);
    state.sync_from(controller.messages());

    // Subscribe to conversation events
    let mut chat_rx = controller.subscribe();

    // Event stream
    let mut event_stream = EventStream::new();

    // Tick interval for animations (80ms for smooth spinner)
    let mut tick_interval = tokio::time::interval(std::time::Duration::from_millis(80));

    // Pending submission - processed at the start of the next loop iteration
    // so the future borrows the controller only inside the inner loop
    let mut pending_prompt: Option<String> = None;

    let result = loop {
        if let Some(content) = pending_prompt.take() {
            state.pending_since = Some(Instant::now());
            state.status = "SYNCHRONIZING...".to_string();
            state.scroll_to_bottom();

            let mut submit_future = std::pin::pin!(controller.submit(&content));

            // Poll the submission alongside other events until it resolves
            loop {
                terminal.draw(|frame| state.render(frame))?;
                let area_width = terminal.size()?.width;

                tokio::select! {
                    biased;

                    _ = &mut submit_future => {
                        break;
                    }

                    event = chat_rx.recv() => {
                        if let Ok(chat_event) = event {
                            state.handle_chat_event(chat_event);
                        }
                    }

                    // Terminal events - typing still works while waiting
                    event = event_stream.next() => {
                        match event {
                            Some(Ok(Event::Mouse(mouse))) => {
                                match mouse.kind {
                                    MouseEventKind::ScrollUp => {
                                        state.scroll = state.scroll.saturating_sub(3);
                                    }
                                    MouseEventKind::ScrollDown => {
                                        state.scroll = state.scroll.saturating_add(3);
                                    }
                                    _ => {}
                                }
                            }
                            Some(Ok(event)) => {
                                match event_to_action(event) {
                                    Some(Action::Quit | Action::Interrupt) => {
                                        disable_raw_mode()?;
                                        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
                                        terminal.show_cursor()?;
                                        return Ok(());
                                    }
                                    // Draft edits only; the input box ignores
                                    // Submit while an exchange is in flight
                                    Some(action) => {
                                        state.input.handle_action(&action, area_width);
                                    }
                                    None => {}
                                }
                            }
                            Some(Err(_)) | None => {
                                disable_raw_mode()?;
                                execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
                                terminal.show_cursor()?;
                                return Ok(());
                            }
                        }
                    }

                    transcript = voice_rx.recv() => {
                        if let Some(transcript) = transcript {
                            state.handle_transcript(transcript, area_width);
                        }
                    }

                    _ = tick_interval.tick() => {}
                }
            }

            // Drain conversation events emitted while the future resolved
            while let Ok(chat_event) = chat_rx.try_recv() {
                state.handle_chat_event(chat_event);
            }

            terminal.draw(|frame| state.render(frame))?;
            continue;
        }

        terminal.draw(|frame| state.render(frame))?;
        let area_width = terminal.size()?.width;

        tokio::select! {
            biased;

            event = chat_rx.recv() => {
                if let Ok(chat_event) = event {
                    state.handle_chat_event(chat_event);
                }
            }

            event = event_stream.next() => {
                match event {
                    Some(Ok(Event::Mouse(mouse))) => {
                        match mouse.kind {
                            MouseEventKind::ScrollUp => {
                                state.scroll = state.scroll.saturating_sub(3);
                            }
                            MouseEventKind::ScrollDown => {
                                state.scroll = state.scroll.saturating_add(3);
                            }
                            _ => {}
                        }
                    }
                    Some(Ok(event)) => {
                        if let Some(action) = event_to_action(event) {
                            if !state.handle_action(action, area_width).await {
                                break Ok(());
                            }
                        }
                    }
                    Some(Err(e)) => {
                        break Err(anyhow::anyhow!("Event error: {}", e));
                    }
                    None => {
                        break Ok(());
                    }
                }
            }

            transcript = voice_rx.recv() => {
                if let Some(transcript) = transcript {
                    state.handle_transcript(transcript, area_width);
                }
            }

            _ = tick_interval.tick() => {}

            msg = ui_rx.recv() => {
                match msg {
                    Some(UiMessage::Submit(content)) => {
                        // Queued; the next loop iteration starts the exchange
                        pending_prompt = Some(content);
                    }
                    Some(UiMessage::Command(cmd)) => {
                        if let Some(result) = execute_command(&cmd) {
                            match result {
                                CommandResult::Message(text) => {
                                    state.show_notice(&text);
                                }
                                CommandResult::Clear => {
                                    controller.set_messages(seed_history());
                                    state.status = "TRANSCRIPT RESET".to_string();
                                }
                                CommandResult::Exit => {
                                    break Ok(());
                                }
                                CommandResult::Unknown(cmd) => {
                                    state.show_notice(&format!(
                                        "Unknown command: /{}\nType /help for available commands.",
                                        cmd
                                    ));
                                }
                            }
                        }
                    }
                    Some(UiMessage::Listen) => {
                        if state.is_listening() {
                            // A capture session is already running
                        } else if !recognizer.is_available() {
                            state.status = "VOICE CAPTURE OFFLINE".to_string();
                        } else {
                            state.set_voice(VoiceState::Listening);
                            state.status = "CAPTURING AUDIO".to_string();
                            let recognizer = recognizer.clone();
                            let voice_tx = voice_tx.clone();
                            tokio::spawn(async move {
                                let _ = voice_tx.send(recognizer.listen_once().await).await;
                            });
                        }
                    }
                    Some(UiMessage::Quit) | None => {
                        break Ok(());
                    }
                }
            }
        }
    };

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}
