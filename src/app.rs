//! Front-end controller: turns terminal events into engine commands.
//!
//! Mirrors a text-input widget: the whole buffer is submitted on every edit.
//! Rejected keystrokes stay in the buffer until backspaced, so every key
//! press past a mismatch is a fresh submission. The buffer never grows past
//! the target length.

use crate::engine::SessionEngine;
use crate::history::Summary;
use crate::runtime::AppEvent;
use crate::session::{GameStatus, Snapshot};
use crate::text_source::TextSource;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Typing,
    Results,
    Summary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct App<S: TextSource> {
    pub engine: SessionEngine<S>,
    pub state: AppState,
    pub input: String,
    pub snapshot: Snapshot,
    pub summary: Option<Summary>,
    pub summary_scroll: usize,
}

impl<S: TextSource> App<S> {
    /// `snapshot` is the result of whichever command selected the first text.
    pub fn new(engine: SessionEngine<S>, snapshot: Snapshot) -> Self {
        Self {
            engine,
            state: AppState::Typing,
            input: String::new(),
            snapshot,
            summary: None,
            summary_scroll: 0,
        }
    }

    pub fn handle_event(&mut self, event: AppEvent) -> Flow {
        match event {
            AppEvent::Tick => {
                self.on_tick();
                Flow::Continue
            }
            AppEvent::Resize => Flow::Continue,
            AppEvent::Paste(text) => {
                if self.state == AppState::Typing {
                    self.type_text(&text);
                }
                Flow::Continue
            }
            AppEvent::Key(key) => self.on_key(key),
        }
    }

    /// Keystrokes held in the buffer past the accepted prefix.
    pub fn pending(&self) -> usize {
        self.input
            .chars()
            .count()
            .saturating_sub(self.snapshot.metrics.typed_length)
    }

    /// Only polls while a session is live.
    fn on_tick(&mut self) {
        if self.state == AppState::Typing && self.snapshot.metrics.status == GameStatus::Running {
            let snapshot = self.engine.tick();
            self.apply(snapshot);
        }
    }

    fn on_key(&mut self, key: KeyEvent) -> Flow {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if key.code == KeyCode::Esc || (ctrl && key.code == KeyCode::Char('c')) {
            return Flow::Quit;
        }

        match self.state {
            AppState::Typing => match key.code {
                KeyCode::Char('r') if ctrl => {
                    let snapshot = self.engine.restart_progress();
                    self.select(snapshot);
                }
                KeyCode::Char(c) if !ctrl => self.type_text(&c.to_string()),
                KeyCode::Enter => self.type_text("\n"),
                KeyCode::Backspace => {
                    self.input.pop();
                    self.submit();
                }
                KeyCode::Left => {
                    let snapshot = self.engine.repeat_current();
                    self.select(snapshot);
                }
                KeyCode::Right => {
                    let snapshot = self.engine.next_text();
                    self.select(snapshot);
                }
                KeyCode::Tab => self.show_summary(),
                _ => {}
            },
            AppState::Results => match key.code {
                KeyCode::Enter | KeyCode::Char('n') => {
                    let snapshot = self.engine.next_text();
                    self.select(snapshot);
                }
                KeyCode::Char('r') => {
                    let snapshot = self.engine.repeat_current();
                    self.select(snapshot);
                }
                KeyCode::Char('s') => self.show_summary(),
                _ => {}
            },
            AppState::Summary => match key.code {
                KeyCode::Char('b') | KeyCode::Backspace => {
                    self.state = if self.snapshot.metrics.finished {
                        AppState::Results
                    } else {
                        AppState::Typing
                    };
                }
                KeyCode::Char('p') => {
                    let snapshot = self.engine.restart_progress();
                    self.select(snapshot);
                }
                KeyCode::Up => {
                    self.summary_scroll = self.summary_scroll.saturating_sub(1);
                }
                KeyCode::Down => {
                    // clamped while rendering
                    self.summary_scroll += 1;
                }
                KeyCode::Home => self.summary_scroll = 0,
                _ => {}
            },
        }
        Flow::Continue
    }

    /// Append to the buffer up to the target length, then submit. Keys past
    /// the end are dropped like in a length-limited input field.
    fn type_text(&mut self, text: &str) {
        let room = self
            .snapshot
            .metrics
            .target_length
            .saturating_sub(self.input.chars().count());
        if room == 0 {
            return;
        }
        self.input.extend(text.chars().take(room));
        self.submit();
    }

    fn submit(&mut self) {
        let snapshot = self.engine.submit_input(&self.input);
        self.apply(snapshot);
    }

    fn select(&mut self, snapshot: Snapshot) {
        self.input.clear();
        self.summary = None;
        self.state = AppState::Typing;
        self.apply(snapshot);
    }

    fn apply(&mut self, snapshot: Snapshot) {
        if snapshot.metrics.finished {
            self.state = AppState::Results;
        }
        self.snapshot = snapshot;
    }

    fn show_summary(&mut self) {
        self.summary = Some(self.engine.summary());
        self.summary_scroll = 0;
        self.state = AppState::Summary;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text_source::StaticTextSource;

    fn app(texts: &[&str]) -> App<StaticTextSource> {
        let mut engine = SessionEngine::new(StaticTextSource::new(texts.iter().copied()));
        let snapshot = engine.current();
        App::new(engine, snapshot)
    }

    fn key(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_str(app: &mut App<StaticTextSource>, s: &str) {
        for c in s.chars() {
            let code = if c == '\n' {
                KeyCode::Enter
            } else {
                KeyCode::Char(c)
            };
            app.handle_event(key(code));
        }
    }

    #[test]
    fn test_typing_to_completion_shows_results() {
        let mut app = app(&["hi"]);
        type_str(&mut app, "hi");
        assert_eq!(app.state, AppState::Results);
        assert_eq!(app.snapshot.metrics.status, GameStatus::Completed);
        assert_eq!(app.engine.summary().completed, 1);
    }

    #[test]
    fn test_wrong_key_stays_until_backspaced() {
        let mut app = app(&["hello"]);
        type_str(&mut app, "hx");
        assert_eq!(app.input, "hx");
        assert_eq!(app.snapshot.typed_text, "h");
        assert_eq!(app.pending(), 1);
        assert_eq!(app.snapshot.metrics.errors, 1);

        app.handle_event(key(KeyCode::Backspace));
        type_str(&mut app, "e");
        assert_eq!(app.input, "he");
        assert_eq!(app.snapshot.typed_text, "he");
        assert_eq!(app.pending(), 0);
        assert_eq!(app.snapshot.metrics.errors, 1);
    }

    #[test]
    fn test_every_wrong_keystroke_counts() {
        let mut same = app(&["hello"]);
        type_str(&mut same, "hxxxx");
        assert_eq!(same.snapshot.metrics.errors, 4);

        let mut alternating = app(&["hello"]);
        type_str(&mut alternating, "hxyxy");
        assert_eq!(alternating.snapshot.metrics.errors, 4);
        assert_eq!(alternating.snapshot.metrics.accuracy, 0.0);
    }

    #[test]
    fn test_keys_past_target_length_are_dropped() {
        let mut app = app(&["abc"]);
        type_str(&mut app, "axxzz");
        assert_eq!(app.input, "axx");
        assert_eq!(app.snapshot.metrics.errors, 2);

        app.handle_event(AppEvent::Paste("more".into()));
        assert_eq!(app.input, "axx");
        assert_eq!(app.snapshot.metrics.errors, 2);
    }

    #[test]
    fn test_backspace_shrinks_buffer() {
        let mut app = app(&["hello"]);
        type_str(&mut app, "hel");
        app.handle_event(key(KeyCode::Backspace));
        assert_eq!(app.input, "he");
        assert_eq!(app.snapshot.typed_text, "he");
    }

    #[test]
    fn test_enter_types_newline() {
        let mut app = app(&["a\nb"]);
        type_str(&mut app, "a\nb");
        assert_eq!(app.state, AppState::Results);
    }

    #[test]
    fn test_paste_submits_whole_chunk() {
        let mut app = app(&["hello"]);
        app.handle_event(AppEvent::Paste("hello".into()));
        assert_eq!(app.state, AppState::Results);
    }

    #[test]
    fn test_results_next_and_repeat() {
        let mut app = app(&["a", "bb"]);
        type_str(&mut app, "a");
        assert_eq!(app.state, AppState::Results);

        app.handle_event(key(KeyCode::Char('r')));
        assert_eq!(app.state, AppState::Typing);
        assert_eq!(app.engine.target_text(), "a");

        type_str(&mut app, "a");
        app.handle_event(key(KeyCode::Enter));
        assert_eq!(app.state, AppState::Typing);
        assert_eq!(app.engine.target_text(), "bb");
        assert!(app.input.is_empty());
    }

    #[test]
    fn test_summary_round_trip() {
        let mut app = app(&["a", "bb"]);
        type_str(&mut app, "a");
        app.handle_event(key(KeyCode::Char('s')));
        assert_eq!(app.state, AppState::Summary);
        assert_eq!(app.summary.as_ref().map(|s| s.completed), Some(1));

        app.handle_event(key(KeyCode::Char('b')));
        assert_eq!(app.state, AppState::Results);

        app.handle_event(key(KeyCode::Char('s')));
        app.handle_event(key(KeyCode::Char('p')));
        assert_eq!(app.state, AppState::Typing);
        assert_eq!(app.engine.summary().completed, 0);
    }

    #[test]
    fn test_tab_opens_summary_mid_session() {
        let mut app = app(&["hello"]);
        type_str(&mut app, "he");
        app.handle_event(key(KeyCode::Tab));
        assert_eq!(app.state, AppState::Summary);
        app.handle_event(key(KeyCode::Backspace));
        assert_eq!(app.state, AppState::Typing);
        assert_eq!(app.input, "he");
    }

    #[test]
    fn test_tick_updates_running_session() {
        let mut app = app(&["hello"]);
        type_str(&mut app, "h");
        std::thread::sleep(std::time::Duration::from_millis(5));
        app.handle_event(AppEvent::Tick);
        assert!(app.snapshot.metrics.elapsed_seconds > 0.0);
    }

    #[test]
    fn test_escape_and_ctrl_c_quit() {
        let mut app = app(&["hello"]);
        assert_eq!(app.handle_event(key(KeyCode::Esc)), Flow::Quit);
        let ctrl_c = AppEvent::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(app.handle_event(ctrl_c), Flow::Quit);
    }

    #[test]
    fn test_ctrl_r_restarts_progress() {
        let mut app = app(&["a", "bb"]);
        app.handle_event(key(KeyCode::Right));
        assert_eq!(app.engine.bank_index(), 1);
        let ctrl_r = AppEvent::Key(KeyEvent::new(KeyCode::Char('r'), KeyModifiers::CONTROL));
        app.handle_event(ctrl_r);
        assert_eq!(app.engine.bank_index(), 0);
    }
}
