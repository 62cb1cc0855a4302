//! Typewriter effect for the hero title
//!
//! Types a word one character at a time, holds it, deletes it, then moves
//! on to the next word. Driven entirely by the time the host feeds in.

use std::time::Duration;

pub const TYPE_DELAY: Duration = Duration::from_millis(150);
pub const DELETE_DELAY: Duration = Duration::from_millis(100);
pub const HOLD_DELAY: Duration = Duration::from_millis(2000);
pub const CURSOR_BLINK: Duration = Duration::from_millis(530);

pub const HERO_WORDS: [&str; 10] = [
    "Developer",
    "Self Learner",
    "Problem Solver",
    "AI Enthusiast",
    "Tech Explorer",
    "Code Architect",
    "Innovation Driver",
    "Digital Creator",
    "System Designer",
    "Full-Stack Expert",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Typing,
    Holding,
    Deleting,
}

#[derive(Debug, Clone)]
pub struct Typewriter {
    words: Vec<String>,
    word: usize,
    chars: usize,
    phase: Phase,
    pending: Duration,
    cursor_visible: bool,
    cursor_pending: Duration,
}

impl Typewriter {
    /// An empty word list is replaced by the hero words.
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut words: Vec<String> = words.into_iter().map(Into::into).collect();
        if words.is_empty() {
            words = HERO_WORDS.iter().map(|w| w.to_string()).collect();
        }
        Self {
            words,
            word: 0,
            chars: 0,
            phase: Phase::Typing,
            pending: Duration::ZERO,
            cursor_visible: true,
            cursor_pending: Duration::ZERO,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn word_index(&self) -> usize {
        self.word
    }

    pub fn cursor_visible(&self) -> bool {
        self.cursor_visible
    }

    /// The visible prefix of the current word.
    pub fn text(&self) -> &str {
        let word = &self.words[self.word];
        let end = word
            .char_indices()
            .nth(self.chars)
            .map_or(word.len(), |(i, _)| i);
        &word[..end]
    }

    fn word_len(&self) -> usize {
        self.words[self.word].chars().count()
    }

    fn delay(&self) -> Duration {
        match self.phase {
            Phase::Typing => TYPE_DELAY,
            Phase::Holding => HOLD_DELAY,
            Phase::Deleting => DELETE_DELAY,
        }
    }

    /// Feed `dt` of wall time. Returns whether the text changed.
    pub fn advance(&mut self, dt: Duration) -> bool {
        self.cursor_pending += dt;
        while self.cursor_pending >= CURSOR_BLINK {
            self.cursor_pending -= CURSOR_BLINK;
            self.cursor_visible = !self.cursor_visible;
        }

        let before = (self.word, self.chars);
        self.pending += dt;
        while self.pending >= self.delay() {
            self.pending -= self.delay();
            self.step();
        }
        before != (self.word, self.chars)
    }

    fn step(&mut self) {
        match self.phase {
            Phase::Typing => {
                self.chars += 1;
                if self.chars >= self.word_len() {
                    self.phase = Phase::Holding;
                }
            }
            Phase::Holding => self.phase = Phase::Deleting,
            Phase::Deleting => {
                self.chars = self.chars.saturating_sub(1);
                if self.chars == 0 {
                    self.word = (self.word + 1) % self.words.len();
                    self.phase = Phase::Typing;
                }
            }
        }
    }
}

impl Default for Typewriter {
    fn default() -> Self {
        Self::new(HERO_WORDS)
    }
}
