//! Correctness gating for whole-buffer input submissions.
//!
//! The caller submits its entire input buffer on every change. The gate keeps
//! the longest accepted prefix of the target and a lifetime mistake tally: a
//! mismatch blocks all further progress until the buffer is corrected.
//!
//! Only a buffer that grew can count a mistake. Resubmitting the previous
//! buffer unchanged is a no-op, and a buffer shorter than the previous one is
//! a backspace, even when it still holds rejected characters.

/// Outcome of a single submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciled {
    /// Same buffer as the previous submission.
    Unchanged,
    /// Input shrank; the accepted prefix was recomputed from scratch.
    Rewound,
    /// Every new character matched.
    Advanced,
    /// Progress stopped at a mismatch.
    Blocked,
}

#[derive(Debug, Clone, Default)]
pub struct InputGate {
    accepted: usize,
    mistakes: usize,
    last_input: Option<Vec<char>>,
}

impl InputGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of accepted characters; always a prefix length of the target.
    pub fn accepted(&self) -> usize {
        self.accepted
    }

    pub fn mistakes(&self) -> usize {
        self.mistakes
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Apply a submission already truncated to the target length.
    pub fn apply(&mut self, target: &[char], input: &[char]) -> Reconciled {
        let input = &input[..input.len().min(target.len())];

        let previous_len = match self.last_input.as_deref() {
            Some(previous) if previous == input => return Reconciled::Unchanged,
            Some(previous) => previous.len(),
            None => 0,
        };
        self.last_input = Some(input.to_vec());

        if input.len() < self.accepted || input.len() < previous_len {
            self.accepted = matching_prefix(target, input);
            return Reconciled::Rewound;
        }

        let mut pos = self.accepted;
        while pos < input.len() {
            if input[pos] != target[pos] {
                self.mistakes += 1;
                self.accepted = pos;
                return Reconciled::Blocked;
            }
            pos += 1;
        }

        self.accepted = pos;
        Reconciled::Advanced
    }
}

fn matching_prefix(target: &[char], input: &[char]) -> usize {
    target
        .iter()
        .zip(input.iter())
        .take_while(|(expected, typed)| expected == typed)
        .count()
}
