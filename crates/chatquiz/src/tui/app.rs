//! Main TUI application for the questionnaire.

use std::io::{self, Stdout};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame, Terminal,
};
use tokio::sync::mpsc;
use tracing::debug;

use chatquiz_core::{
    ChatHost, Letter, QuizError, ReanswerAction, StageDescriptor, SubmitOutcome, ToggleOutcome,
    TurnController,
};
use chatquiz_logging::{Logger, QuizEvent};

use crate::search::{SearchDebouncer, SearchResult, SearchUpdate};
use crate::texts::Texts;

use super::layout::MainLayout;
use super::state::{ChatState, ReplyEvent, ReplyOutcome};
use super::widgets::{InputWidget, OptionButtons, ResultsWidget, TranscriptWidget};

/// Debounced song search plus the results currently on screen
pub struct SearchPane {
    debouncer: SearchDebouncer,
    updates: mpsc::UnboundedReceiver<SearchUpdate>,
    results: Vec<SearchResult>,
    highlighted: Option<usize>,
}

impl SearchPane {
    pub fn new(debouncer: SearchDebouncer, updates: mpsc::UnboundedReceiver<SearchUpdate>) -> Self {
        Self {
            debouncer,
            updates,
            results: Vec::new(),
            highlighted: None,
        }
    }

    fn clear(&mut self) {
        self.debouncer.clear();
        self.results.clear();
        self.highlighted = None;
    }

    fn drain(&mut self) {
        while let Ok(update) = self.updates.try_recv() {
            if let Some(results) = self.debouncer.accept(update) {
                self.highlighted = None;
                self.results = results;
            }
        }
    }

    fn move_highlight(&mut self, down: bool) {
        if self.results.is_empty() {
            return;
        }
        let last = self.results.len() - 1;
        self.highlighted = Some(match (self.highlighted, down) {
            (None, true) => 0,
            (None, false) => last,
            (Some(i), true) => (i + 1).min(last),
            (Some(i), false) => i.saturating_sub(1),
        });
    }

    fn take_highlighted(&mut self) -> Option<SearchResult> {
        let picked = self.highlighted.and_then(|i| self.results.get(i).cloned());
        if picked.is_some() {
            self.clear();
        }
        picked
    }
}

/// The main TUI application
pub struct App {
    state: ChatState,
    controller: TurnController,
    replies: mpsc::UnboundedReceiver<ReplyEvent>,
    search: Option<SearchPane>,
    texts: &'static Texts,
    logger: Logger,
    /// Lines scrolled up from the bottom of the transcript
    scroll: u16,
    /// Log length the current stage was entered at
    stage_len: Option<usize>,
    started: Instant,
    running: bool,
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl App {
    /// Create a new TUI application
    pub fn new(
        state: ChatState,
        replies: mpsc::UnboundedReceiver<ReplyEvent>,
        search: Option<SearchPane>,
        texts: &'static Texts,
        logger: Logger,
    ) -> Result<Self> {
        // Setup terminal
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend).context("Failed to create terminal")?;

        Ok(Self {
            state,
            controller: TurnController::new(),
            replies,
            search,
            texts,
            logger,
            scroll: 0,
            stage_len: None,
            started: Instant::now(),
            running: true,
            terminal,
        })
    }

    /// Run until the user quits. Returns the number of messages in the log.
    pub async fn run(&mut self) -> Result<usize> {
        while self.running {
            self.drain_replies();
            if let Some(ref mut search) = self.search {
                search.drain();
            }
            self.after_change();

            self.draw()?;

            // Poll with a timeout so replies and search results keep flowing
            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key);
                    }
                }
            }
            tokio::task::yield_now().await;
        }

        self.cleanup_terminal()?;
        Ok(self.state.messages().len())
    }

    pub fn state(&self) -> &ChatState {
        &self.state
    }

    pub fn is_complete(&self) -> bool {
        self.state.is_complete()
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Cleanup the terminal
    fn cleanup_terminal(&mut self) -> Result<()> {
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)
            .context("Failed to leave alternate screen")?;
        self.terminal
            .show_cursor()
            .context("Failed to show cursor")?;
        Ok(())
    }

    fn drain_replies(&mut self) {
        while let Ok(event) = self.replies.try_recv() {
            match self.state.handle_reply(event) {
                ReplyOutcome::Received { is_final, elapsed } => {
                    let log_len = self.state.messages().len();
                    self.logger.log(&QuizEvent::ReplyReceived {
                        log_len,
                        is_final,
                        duration_ms: elapsed.as_millis() as u64,
                    });
                    if is_final {
                        self.logger.log(&QuizEvent::SessionCompleted {
                            messages: log_len,
                            duration_secs: self.started.elapsed().as_secs_f64(),
                        });
                    }
                }
                ReplyOutcome::Failed(error) => {
                    self.logger.log(&QuizEvent::BackendFailed { error });
                }
                ReplyOutcome::Stale => {}
            }
        }
    }

    /// Keep the selection and search in step with the log
    fn after_change(&mut self) {
        self.controller.sync(&self.state);
        let stage = self.controller.stage(&self.state);
        let len = self.state.messages().len();

        if self.stage_len != Some(len) {
            self.stage_len = Some(len);
            self.scroll = 0;
            if let Some(ref mut search) = self.search {
                search.clear();
            }
            self.logger.log(&QuizEvent::StageEntered {
                log_len: len,
                mode: format!("{:?}", stage.mode),
            });
        }

        if !stage.search_enabled() {
            if let Some(ref mut search) = self.search {
                if !search.results.is_empty() {
                    search.clear();
                }
            }
        }
    }

    fn input_changed(&mut self) {
        let stage = self.controller.stage(&self.state);
        if let Some(ref mut search) = self.search {
            if stage.search_enabled() {
                search.debouncer.on_input(self.state.raw_input());
                if self.state.raw_input().is_empty() {
                    search.results.clear();
                    search.highlighted = None;
                }
            } else {
                search.clear();
            }
        }
    }

    /// Handle a key event
    fn handle_key_event(&mut self, key: KeyEvent) {
        // Clear the notice on any key press
        self.state.clear_notice();

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key.modifiers.contains(KeyModifiers::ALT);

        match key.code {
            KeyCode::Char('c') if ctrl => self.running = false,
            KeyCode::Char('n') if ctrl => self.new_chat(),
            KeyCode::Char('r') if ctrl => self.regenerate(),
            KeyCode::Char('z') if ctrl => self.reanswer(),
            KeyCode::Char('j') if ctrl => self.edit(|input| input.insert_newline()),
            KeyCode::Enter if alt => self.edit(|input| input.insert_newline()),
            KeyCode::Enter => {
                if !self.pick_search_result() {
                    self.submit();
                }
            }
            KeyCode::Tab => {
                self.pick_search_result();
            }
            KeyCode::Esc => self.stop(),
            KeyCode::F(n @ 1..=4) => self.toggle(Letter::ALL[n as usize - 1]),
            KeyCode::Up => match self.search.as_mut() {
                Some(search) if !search.results.is_empty() => search.move_highlight(false),
                _ => self.scroll = self.scroll.saturating_add(1),
            },
            KeyCode::Down => match self.search.as_mut() {
                Some(search) if !search.results.is_empty() => search.move_highlight(true),
                _ => self.scroll = self.scroll.saturating_sub(1),
            },
            KeyCode::PageUp => self.scroll = self.scroll.saturating_add(10),
            KeyCode::PageDown => self.scroll = self.scroll.saturating_sub(10),
            KeyCode::Left => self.state.input_mut().move_left(),
            KeyCode::Right => self.state.input_mut().move_right(),
            KeyCode::Home => self.state.input_mut().move_home(),
            KeyCode::End => self.state.input_mut().move_end(),
            KeyCode::Backspace => self.edit(|input| input.backspace()),
            KeyCode::Delete => self.edit(|input| input.delete()),
            KeyCode::Char(c) if !ctrl => self.edit(|input| input.insert(c)),
            _ => {}
        }
    }

    fn edit(&mut self, f: impl FnOnce(&mut super::input::InputBuffer)) {
        f(self.state.input_mut());
        self.input_changed();
    }

    fn pick_search_result(&mut self) -> bool {
        let picked = self.search.as_mut().and_then(|s| s.take_highlighted());
        match picked {
            Some(result) => {
                debug!(song = %result.name, "Picked search result");
                self.state.set_raw_input(result.name);
                true
            }
            None => false,
        }
    }

    fn toggle(&mut self, letter: Letter) {
        match self.controller.toggle_option(&mut self.state, letter) {
            Ok(Some(outcome @ (ToggleOutcome::Selected | ToggleOutcome::Deselected))) => {
                self.logger.log(&QuizEvent::OptionToggled {
                    letter: letter.as_char(),
                    selected: outcome == ToggleOutcome::Selected,
                });
            }
            Ok(_) => {}
            // Already shown to the user through the notice line
            Err(QuizError::SingleSelectViolation { .. }) => {}
            Err(e) => debug!("{}", e),
        }
    }

    fn submit(&mut self) {
        let log_len = self.state.messages().len();
        let chars = self.state.raw_input().chars().count();
        match self.controller.submit(&mut self.state) {
            Ok(SubmitOutcome::Sent) => {
                if let Some(ref mut search) = self.search {
                    search.clear();
                }
                self.logger
                    .log(&QuizEvent::AnswerSubmitted { log_len, chars });
            }
            Ok(SubmitOutcome::Blank | SubmitOutcome::Busy) => {}
            Err(e) => {
                self.logger.log(&QuizEvent::AnswerRejected {
                    log_len,
                    reason: e.to_string(),
                });
            }
        }
    }

    fn reanswer(&mut self) {
        let log_len = self.state.messages().len();
        match self.controller.reanswer(&mut self.state) {
            Some(ReanswerAction::Truncate { count }) => {
                self.logger.log(&QuizEvent::Reanswered { removed: count });
            }
            Some(ReanswerAction::CancelGeneration) => {
                self.logger.log(&QuizEvent::GenerationStopped { log_len });
            }
            None => {}
        }
    }

    fn regenerate(&mut self) {
        if self.controller.regenerate(&mut self.state) {
            self.logger.log(&QuizEvent::Regenerated {
                log_len: self.state.messages().len(),
            });
        }
    }

    fn stop(&mut self) {
        if self.controller.stop(&mut self.state) {
            self.logger.log(&QuizEvent::GenerationStopped {
                log_len: self.state.messages().len(),
            });
        } else if let Some(ref mut search) = self.search {
            search.clear();
        }
    }

    fn new_chat(&mut self) {
        let discarded = self.state.messages().len();
        self.controller.new_chat(&mut self.state);
        if let Some(ref mut search) = self.search {
            search.clear();
        }
        self.logger.log(&QuizEvent::ChatReset { discarded });
    }

    /// Draw the UI
    fn draw(&mut self) -> Result<()> {
        let stage = self.controller.stage(&self.state);
        let view = View {
            state: &self.state,
            controller: &self.controller,
            search: self.search.as_ref(),
            texts: self.texts,
            stage,
            scroll: self.scroll,
        };

        self.terminal.draw(|frame| view.render(frame))?;
        Ok(())
    }
}

/// Borrowed view of the app for one frame
struct View<'a> {
    state: &'a ChatState,
    controller: &'a TurnController,
    search: Option<&'a SearchPane>,
    texts: &'static Texts,
    stage: StageDescriptor,
    scroll: u16,
}

impl View<'_> {
    fn render(&self, frame: &mut Frame) {
        let input_lines =
            u16::try_from(self.state.raw_input().split('\n').count()).unwrap_or(u16::MAX);
        let results: &[SearchResult] = self.search.map(|s| s.results.as_slice()).unwrap_or(&[]);
        let layout = MainLayout::new(frame.area(), input_lines, results.len());

        self.render_header(frame, layout.header);

        let pending = self.state.is_generating().then_some(self.texts.thinking);
        frame.render_widget(
            TranscriptWidget::new(self.state.messages(), self.texts.you, self.texts.assistant)
                .title(self.texts.title)
                .scroll(self.scroll)
                .pending(pending)
                .empty_hint(self.texts.start_hint),
            layout.transcript,
        );

        frame.render_widget(
            OptionButtons::new(self.controller.selection())
                .enabled(self.stage.option_buttons_enabled)
                .multi_select(self.stage.is_multi_select()),
            layout.options,
        );

        if !results.is_empty() {
            let highlighted = self.search.and_then(|s| s.highlighted);
            frame.render_widget(
                ResultsWidget::new(results, highlighted).title(self.texts.search_results),
                layout.results,
            );
        }

        frame.render_widget(
            InputWidget::new(self.state.input())
                .placeholder(self.texts.placeholder(self.stage.placeholder))
                .title(self.texts.send)
                .enabled(!self.state.is_generating()),
            layout.input,
        );

        self.render_notice(frame, layout.notice);
        self.render_footer(frame, layout.footer);
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let title = Line::from(vec![
            Span::styled(
                " chatquiz ",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("| "),
            Span::styled(
                format!("{} ", self.state.backend_name()),
                Style::default().fg(Color::Yellow),
            ),
            Span::raw("| "),
            Span::styled(
                format!("{} ", self.state.messages().len()),
                Style::default().fg(Color::DarkGray),
            ),
        ]);
        frame.render_widget(Paragraph::new(title), area);
    }

    fn render_notice(&self, frame: &mut Frame, area: Rect) {
        let line = if let Some(notice) = self.state.notice() {
            Line::from(Span::styled(notice, Style::default().fg(Color::Red)))
        } else if self.state.is_complete() {
            Line::from(Span::styled(
                self.texts.completed,
                Style::default().fg(Color::Green),
            ))
        } else {
            Line::from("")
        };
        frame.render_widget(Paragraph::new(line), area);
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect) {
        let key = Style::default().bg(Color::DarkGray).fg(Color::White);
        let mut spans = vec![];
        let mut push = |shortcut: &'static str, label: &'static str| {
            spans.push(Span::styled(format!(" {} ", shortcut), key));
            spans.push(Span::raw(format!(" {} ", label)));
        };

        if !self.state.is_generating() {
            push("Enter", self.texts.send);
            push("Alt+Enter", self.texts.newline);
        }
        if self.stage.option_buttons_enabled {
            push("F1-F4", self.texts.options);
        }
        if self.stage.stop_enabled {
            push("Esc", self.texts.stop);
        }
        if self.stage.regenerate_enabled {
            push("Ctrl+R", self.texts.regenerate);
        }
        if self.stage.reanswer_enabled {
            push("Ctrl+Z", self.texts.reanswer);
        }
        push("Ctrl+N", self.texts.new_chat);
        push("Ctrl+C", self.texts.quit);

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}
