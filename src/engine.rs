use crate::error::Result;
use crate::history::{History, Summary};
use crate::metrics::{accuracy, words_per_minute};
use crate::session::{BankProgress, GameMetrics, GameStatus, SessionEvent, Snapshot};
use crate::text_source::{normalize_custom, TextSource};
use crate::timer::SessionTimer;
use crate::typing_policy::InputGate;
use std::path::Path;
use tracing::{debug, info, trace};

/// One player's typing session over a text bank.
///
/// All state changes go through the command methods, each of which returns a
/// fresh [`Snapshot`]. Completing a bank text records its metrics in the
/// history once; custom texts are never recorded.
#[derive(Debug)]
pub struct SessionEngine<S: TextSource> {
    source: S,
    bank: Vec<String>,
    bank_index: usize,
    target_text: String,
    target: Vec<char>,
    is_custom: bool,
    status: GameStatus,
    gate: InputGate,
    timer: SessionTimer,
    session_recorded: bool,
    history: History,
}

impl<S: TextSource> SessionEngine<S> {
    pub fn new(mut source: S) -> Self {
        source.reload();
        let mut engine = Self {
            source,
            bank: Vec::new(),
            bank_index: 0,
            target_text: String::new(),
            target: Vec::new(),
            is_custom: false,
            status: GameStatus::NoText,
            gate: InputGate::new(),
            timer: SessionTimer::new(),
            session_recorded: false,
            history: History::new(),
        };
        engine.sync_bank();
        engine.select_bank_entry();
        engine.initialize();
        engine
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn target_text(&self) -> &str {
        &self.target_text
    }

    pub fn typed_text(&self) -> String {
        self.target[..self.gate.accepted()].iter().collect()
    }

    pub fn mistakes(&self) -> usize {
        self.gate.mistakes()
    }

    pub fn bank_index(&self) -> usize {
        self.bank_index
    }

    pub fn is_custom(&self) -> bool {
        self.is_custom
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Start over on the first bank text.
    pub fn load_demo_text(&mut self) -> Snapshot {
        self.sync_bank();
        self.bank_index = 0;
        self.select_bank_entry();
        self.initialize()
    }

    /// Practice a text file. On a read error nothing changes.
    pub fn load_text_file<P: AsRef<Path>>(&mut self, path: P) -> Result<Snapshot> {
        let text = self.source.load_from_path(path.as_ref())?;
        self.select(text, true);
        Ok(self.initialize())
    }

    pub fn set_text(&mut self, text: &str) -> Snapshot {
        self.select(normalize_custom(text), true);
        self.initialize()
    }

    /// Reselect the bank text at the current position and start it fresh.
    pub fn current(&mut self) -> Snapshot {
        self.sync_bank();
        self.select_bank_entry();
        self.initialize()
    }

    pub fn reset(&mut self) -> Snapshot {
        self.initialize()
    }

    pub fn repeat_current(&mut self) -> Snapshot {
        self.initialize()
    }

    /// Reload the bank, forget all results and go back to the first text.
    pub fn restart_progress(&mut self) -> Snapshot {
        self.source.reload();
        self.sync_bank();
        self.history.clear();
        self.bank_index = 0;
        self.select_bank_entry();
        self.initialize()
    }

    /// Advance one bank position; the last text repeats once reached.
    pub fn next_text(&mut self) -> Snapshot {
        if self.bank_index + 1 < self.bank.len() {
            self.bank_index += 1;
        }
        self.select_bank_entry();
        self.initialize()
    }

    /// Reconcile the caller's whole input buffer with the target.
    pub fn submit_input(&mut self, typed: &str) -> Snapshot {
        if self.target.is_empty() {
            self.timer.reset();
            self.status = GameStatus::NoText;
            return self.snapshot(false);
        }
        if self.status.is_completed() {
            return self.snapshot(false);
        }

        let input: Vec<char> = typed
            .replace("\r\n", "\n")
            .chars()
            .take(self.target.len())
            .collect();
        let outcome = self.gate.apply(&self.target, &input);
        trace!(?outcome, accepted = self.gate.accepted(), "input reconciled");

        if self.gate.accepted() > 0 && !self.timer.has_started() {
            self.timer.start();
        }

        self.status = self.status.transition(SessionEvent::InputApplied {
            accepted: self.gate.accepted(),
            target_len: self.target.len(),
            timer_started: self.timer.has_started(),
        });
        if self.status.is_completed() {
            self.timer.stop();
            debug!(
                errors = self.gate.mistakes(),
                elapsed = self.timer.elapsed(),
                "session completed"
            );
        }

        self.snapshot(false)
    }

    /// Poll for live elapsed time; stops the timer if completion slipped past it.
    pub fn tick(&mut self) -> Snapshot {
        if self.status.is_completed() && !self.timer.has_finished() {
            self.timer.stop();
        }
        self.snapshot(false)
    }

    pub fn summary(&self) -> Summary {
        self.history.summary(self.bank.len())
    }

    fn sync_bank(&mut self) {
        self.bank = self.source.bank();
        if self.bank.is_empty() {
            self.bank_index = 0;
        } else if self.bank_index >= self.bank.len() {
            self.bank_index = self.bank.len() - 1;
        }
    }

    fn select_bank_entry(&mut self) {
        let text = self.bank.get(self.bank_index).cloned().unwrap_or_default();
        self.select(text, false);
    }

    fn select(&mut self, text: String, is_custom: bool) {
        self.target = text.chars().collect();
        self.target_text = text;
        self.is_custom = is_custom;
    }

    fn initialize(&mut self) -> Snapshot {
        self.gate.reset();
        self.timer.reset();
        self.session_recorded = false;
        self.status = self.status.transition(SessionEvent::Selected {
            has_text: !self.target.is_empty(),
        });
        debug!(
            status = %self.status,
            bank_index = self.bank_index,
            custom = self.is_custom,
            length = self.target.len(),
            "session initialized"
        );
        self.snapshot(true)
    }

    fn build_metrics(&mut self) -> GameMetrics {
        if self.status.is_completed() {
            self.timer.stop();
        }
        let started = self.timer.has_started();
        let typed_length = self.gate.accepted();
        let errors = self.gate.mistakes();
        let elapsed_seconds = if started { self.timer.elapsed() } else { 0.0 };
        let wpm = if started {
            words_per_minute(typed_length, elapsed_seconds)
        } else {
            0
        };

        GameMetrics {
            status: self.status,
            target_length: self.target.len(),
            typed_length,
            errors,
            accuracy: accuracy(typed_length, errors),
            wpm,
            elapsed_seconds,
            started,
            finished: self.status.is_completed(),
        }
    }

    fn snapshot(&mut self, include_text: bool) -> Snapshot {
        let metrics = self.build_metrics();

        if self.status.is_completed() && !self.session_recorded && !self.is_custom {
            self.history.record(self.bank_index, metrics.clone());
            self.session_recorded = true;
            info!(
                position = self.bank_index + 1,
                wpm = metrics.wpm,
                accuracy = metrics.accuracy,
                errors = metrics.errors,
                "session recorded"
            );
        }

        Snapshot {
            metrics,
            target_text: include_text.then(|| self.target_text.clone()),
            typed_text: self.typed_text(),
            bank_progress: BankProgress::new(self.bank_index, self.bank.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text_source::StaticTextSource;
    use assert_matches::assert_matches;
    use std::thread;
    use std::time::Duration;

    fn engine(texts: &[&str]) -> SessionEngine<StaticTextSource> {
        SessionEngine::new(StaticTextSource::new(texts.iter().copied()))
    }

    #[test]
    fn test_new_selects_first_bank_text() {
        let engine = engine(&["longer one", "hi"]);
        assert_eq!(engine.target_text(), "hi");
        assert_eq!(engine.status(), GameStatus::Ready);
        assert!(!engine.is_custom());
    }

    #[test]
    fn test_empty_bank_is_no_text() {
        let mut engine = engine(&[]);
        assert_eq!(engine.status(), GameStatus::NoText);

        let snap = engine.submit_input("abc");
        assert_eq!(snap.metrics.status, GameStatus::NoText);
        assert_eq!(snap.typed_text, "");
        assert!(!snap.metrics.started);
        assert_eq!(snap.bank_progress.position, 0);
        assert_eq!(snap.bank_progress.total, 0);
    }

    #[test]
    fn test_exact_prefix_is_accepted() {
        let target = "hello world";
        for end in 0..=target.len() {
            let mut engine = engine(&[target]);
            let snap = engine.submit_input(&target[..end]);
            assert_eq!(snap.typed_text, &target[..end]);
            assert_eq!(snap.metrics.errors, 0);
            assert_eq!(snap.metrics.accuracy, 100.0);
        }
    }

    #[test]
    fn test_first_keystroke_starts_running() {
        let mut engine = engine(&["hello"]);
        let snap = engine.submit_input("h");
        assert_eq!(snap.metrics.status, GameStatus::Running);
        assert!(snap.metrics.started);
        assert!(snap.target_text.is_none());
    }

    #[test]
    fn test_wrong_first_char_keeps_ready() {
        let mut engine = engine(&["hello"]);
        let snap = engine.submit_input("x");
        assert_eq!(snap.metrics.status, GameStatus::Ready);
        assert_eq!(snap.metrics.errors, 1);
        assert!(!snap.metrics.started);
    }

    #[test]
    fn test_wrong_char_gates_and_resubmission_is_idempotent() {
        let mut engine = engine(&["hello"]);
        let snap = engine.submit_input("hex");
        assert_eq!(snap.typed_text, "he");
        assert_eq!(snap.metrics.errors, 1);

        let snap = engine.submit_input("hex");
        assert_eq!(snap.typed_text, "he");
        assert_eq!(snap.metrics.errors, 1);
    }

    #[test]
    fn test_shrink_keeps_mistakes_and_correct_prefix() {
        let mut engine = engine(&["hello"]);
        engine.submit_input("hel");
        engine.submit_input("helx");
        let snap = engine.submit_input("hx");
        assert_eq!(snap.typed_text, "h");
        assert_eq!(snap.metrics.errors, 1);
        assert_eq!(snap.metrics.status, GameStatus::Running);
    }

    #[test]
    fn test_crlf_input_and_truncation() {
        let mut engine = engine(&["a\nb"]);
        let snap = engine.submit_input("a\r\nbzzz");
        assert_eq!(snap.typed_text, "a\nb");
        assert_eq!(snap.metrics.errors, 0);
        assert_eq!(snap.metrics.status, GameStatus::Completed);
    }

    #[test]
    fn test_completion_stops_timer_and_tick_is_stable() {
        let mut engine = engine(&["hi"]);
        engine.submit_input("h");
        thread::sleep(Duration::from_millis(5));
        let done = engine.submit_input("hi");
        assert_eq!(done.metrics.status, GameStatus::Completed);
        assert!(done.metrics.finished);
        assert!(done.metrics.elapsed_seconds >= 0.0);

        thread::sleep(Duration::from_millis(10));
        let later = engine.tick();
        assert_eq!(later.metrics.elapsed_seconds, done.metrics.elapsed_seconds);
        assert_eq!(later.metrics.wpm, done.metrics.wpm);
    }

    #[test]
    fn test_completed_session_ignores_input() {
        let mut engine = engine(&["hi"]);
        engine.submit_input("hi");
        let snap = engine.submit_input("h");
        assert_eq!(snap.metrics.status, GameStatus::Completed);
        assert_eq!(snap.typed_text, "hi");
    }

    #[test]
    fn test_tick_while_running_reports_live_time() {
        let mut engine = engine(&["hello"]);
        engine.submit_input("he");
        thread::sleep(Duration::from_millis(10));
        let snap = engine.tick();
        assert_eq!(snap.metrics.status, GameStatus::Running);
        assert!(snap.metrics.elapsed_seconds > 0.0);
        assert!(!snap.metrics.finished);
    }

    #[test]
    fn test_history_records_once() {
        let mut engine = engine(&["hi", "there"]);
        engine.submit_input("hi");
        engine.tick();
        engine.tick();
        engine.submit_input("hi");

        let summary = engine.summary();
        assert_eq!(summary.completed, 1);
        assert_eq!(summary.total, 2);
        assert_eq!(summary.results[0].index, 1);
    }

    #[test]
    fn test_custom_text_never_recorded() {
        let mut engine = engine(&["hi"]);
        let snap = engine.set_text("\r\nok\r\n");
        assert_eq!(snap.target_text.as_deref(), Some("ok"));
        assert!(engine.is_custom());

        engine.submit_input("ok");
        engine.tick();
        assert_eq!(engine.summary().completed, 0);
        assert!(engine.history().is_empty());
    }

    #[test]
    fn test_next_text_stops_at_last_entry() {
        let mut engine = engine(&["a", "bb"]);
        let snap = engine.next_text();
        assert_eq!(engine.bank_index(), 1);
        assert_eq!(snap.target_text.as_deref(), Some("bb"));
        assert!(!snap.bank_progress.has_next);

        let snap = engine.next_text();
        assert_eq!(engine.bank_index(), 1);
        assert_eq!(snap.bank_progress.position, 2);
        assert_eq!(snap.target_text.as_deref(), Some("bb"));
    }

    #[test]
    fn test_next_text_after_custom_returns_to_bank() {
        let mut engine = engine(&["a", "bb"]);
        engine.set_text("custom");
        engine.next_text();
        assert!(!engine.is_custom());
        assert_eq!(engine.target_text(), "bb");
    }

    #[test]
    fn test_next_text_with_empty_bank() {
        let mut engine = engine(&[]);
        engine.set_text("custom");
        let snap = engine.next_text();
        assert_eq!(snap.metrics.status, GameStatus::NoText);
        assert_eq!(snap.target_text.as_deref(), Some(""));
        assert!(!engine.is_custom());
    }

    #[test]
    fn test_repeat_and_reset_keep_target() {
        let mut engine = engine(&["abc"]);
        engine.submit_input("ax");
        let snap = engine.repeat_current();
        assert_eq!(snap.target_text.as_deref(), Some("abc"));
        assert_eq!(snap.metrics.errors, 0);
        assert_eq!(snap.typed_text, "");
        assert_eq!(snap.metrics.status, GameStatus::Ready);

        engine.submit_input("ab");
        let snap = engine.reset();
        assert_eq!(snap.typed_text, "");
        assert!(!snap.metrics.started);
    }

    #[test]
    fn test_repeat_allows_recording_again() {
        let mut engine = engine(&["hi"]);
        engine.submit_input("hx");
        engine.submit_input("hi");
        assert_eq!(engine.history().get(0).map(|m| m.errors), Some(1));

        engine.repeat_current();
        engine.submit_input("hi");
        assert_eq!(engine.history().len(), 1);
        assert_eq!(engine.history().get(0).map(|m| m.errors), Some(0));
    }

    #[test]
    fn test_restart_progress_clears_history() {
        let mut engine = engine(&["a", "bb"]);
        engine.submit_input("a");
        engine.next_text();
        engine.submit_input("bb");
        assert_eq!(engine.summary().completed, 2);

        let snap = engine.restart_progress();
        assert_eq!(engine.bank_index(), 0);
        assert_eq!(snap.target_text.as_deref(), Some("a"));
        assert_eq!(engine.summary().completed, 0);
    }

    #[test]
    fn test_load_demo_text_returns_to_first() {
        let mut engine = engine(&["a", "bb"]);
        engine.next_text();
        engine.set_text("custom");
        let snap = engine.load_demo_text();
        assert_eq!(snap.target_text.as_deref(), Some("a"));
        assert!(!engine.is_custom());
    }

    #[test]
    fn test_current_reselects_bank_entry() {
        let mut engine = engine(&["a", "bb"]);
        engine.next_text();
        engine.set_text("custom");
        let snap = engine.current();
        assert_eq!(snap.target_text.as_deref(), Some("bb"));
        assert!(!engine.is_custom());
    }

    #[test]
    fn test_load_missing_file_leaves_session() {
        let mut engine = engine(&["hello"]);
        engine.submit_input("he");

        let result = engine.load_text_file("/definitely/not/here.txt");
        assert_matches!(result, Err(crate::error::TyperError::Io { .. }));
        assert_eq!(engine.typed_text(), "he");
        assert_eq!(engine.target_text(), "hello");
        assert_eq!(engine.status(), GameStatus::Running);
    }

    #[test]
    fn test_unicode_target() {
        let mut engine = engine(&["caf\u{00e9} na\u{00ef}ve"]);
        let snap = engine.submit_input("caf\u{00e9}");
        assert_eq!(snap.typed_text, "caf\u{00e9}");
        assert_eq!(snap.metrics.typed_length, 4);
        assert_eq!(snap.metrics.target_length, 10);
    }
}
