//! Challenge session state.
//!
//! Holds what a presentation layer needs between regenerations: the answer
//! in memory, one input cell per answer character, the focused cell, and
//! the validated flag derived from them.

use glyphwall_common::Result;
use glyphwall_common::constants::ANSWER_LENGTH;

use crate::generator::CaptchaGenerator;
use crate::random::RandomSource;
use crate::surface::Surface;

/// Outcome of feeding one input event into a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    /// Cell filled; focus moved to the given cell
    Accepted { focus: usize },
    /// Cell cleared; focus moved to the given cell
    Cleared { focus: usize },
    /// Character not in the alphabet or cell out of range; nothing changed
    Rejected,
}

/// One challenge cycle's worth of state
#[derive(Debug, Clone)]
pub struct ChallengeSession {
    generator: CaptchaGenerator,
    answer: String,
    cells: [Option<char>; ANSWER_LENGTH],
    focus: usize,
    generation: u64,
}

impl ChallengeSession {
    /// Session with no challenge drawn yet; call [`regenerate`](Self::regenerate)
    pub fn new(generator: CaptchaGenerator) -> Self {
        Self {
            generator,
            answer: String::new(),
            cells: [None; ANSWER_LENGTH],
            focus: 0,
            generation: 0,
        }
    }

    /// Draw a new challenge onto `surface` and clear all input
    pub fn regenerate<S, R>(&mut self, surface: &mut S, rng: &mut R) -> Result<()>
    where
        S: Surface + ?Sized,
        R: RandomSource + ?Sized,
    {
        let answer = self.generator.generate(surface, rng)?;
        self.answer = answer;
        self.clear_input();
        self.generation += 1;
        tracing::debug!(generation = self.generation, "Challenge regenerated");
        Ok(())
    }

    /// Set (`Some`) or clear (`None`) the cell at `index`.
    ///
    /// Accepted characters advance focus to the next cell; clearing moves
    /// focus back one cell.
    pub fn input(&mut self, index: usize, value: Option<char>) -> InputOutcome {
        if index >= ANSWER_LENGTH {
            return InputOutcome::Rejected;
        }
        match value {
            None => {
                self.cells[index] = None;
                self.focus = index.saturating_sub(1);
                InputOutcome::Cleared { focus: self.focus }
            }
            Some(c) if self.generator.accepts(c) => {
                self.cells[index] = Some(c);
                self.focus = (index + 1).min(ANSWER_LENGTH - 1);
                InputOutcome::Accepted { focus: self.focus }
            }
            Some(_) => InputOutcome::Rejected,
        }
    }

    /// Type `c` into the focused cell
    pub fn type_char(&mut self, c: char) -> InputOutcome {
        self.input(self.focus, Some(c))
    }

    /// Clear the focused cell, or step back if it is already empty
    pub fn backspace(&mut self) -> InputOutcome {
        if self.cells[self.focus].is_some() {
            self.input(self.focus, None)
        } else {
            self.focus = self.focus.saturating_sub(1);
            InputOutcome::Cleared { focus: self.focus }
        }
    }

    /// Replace all input with `text`, typed left to right.
    ///
    /// Returns how many characters were accepted.
    pub fn enter_text(&mut self, text: &str) -> usize {
        self.clear_input();
        text.chars()
            .take(ANSWER_LENGTH)
            .enumerate()
            .filter(|(i, c)| matches!(self.input(*i, Some(*c)), InputOutcome::Accepted { .. }))
            .count()
    }

    pub fn clear_input(&mut self) {
        self.cells = [None; ANSWER_LENGTH];
        self.focus = 0;
    }

    /// Filled cells, concatenated in order
    pub fn entered(&self) -> String {
        self.cells.iter().flatten().collect()
    }

    /// True once every cell is filled and matches the answer exactly
    pub fn is_validated(&self) -> bool {
        !self.answer.is_empty()
            && self.cells.iter().all(Option::is_some)
            && self.entered() == self.answer
    }

    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn cells(&self) -> &[Option<char>; ANSWER_LENGTH] {
        &self.cells
    }

    /// Number of challenges drawn so far
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The current answer; empty before the first regeneration
    pub fn answer(&self) -> &str {
        &self.answer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::RngSource;
    use crate::surface::RecordingSurface;
    use glyphwall_common::CaptchaOptions;

    fn session(alphabet: &str) -> ChallengeSession {
        let mut session = ChallengeSession::new(CaptchaGenerator::new(CaptchaOptions::plain(alphabet)));
        session
            .regenerate(&mut RecordingSurface::new(), &mut RngSource::seeded(77))
            .unwrap();
        session
    }

    #[test]
    fn test_correct_entry_validates() {
        let mut s = session("ABCDE");
        let answer = s.answer().to_string();
        for c in answer.chars() {
            assert!(matches!(s.type_char(c), InputOutcome::Accepted { .. }));
        }
        assert_eq!(s.entered(), answer);
        assert!(s.is_validated());
    }

    #[test]
    fn test_partial_entry_not_validated() {
        let mut s = session("ABCDE");
        let answer = s.answer().to_string();
        assert_eq!(s.enter_text(&answer[..4]), 4);
        assert!(!s.is_validated());
    }

    #[test]
    fn test_case_sensitive() {
        let mut s = session("abcde");
        let shouted = s.answer().to_uppercase();
        s.enter_text(&shouted);
        assert!(!s.is_validated());
    }

    #[test]
    fn test_rejects_characters_outside_alphabet() {
        let mut s = session("ABCDE");
        assert_eq!(s.type_char('z'), InputOutcome::Rejected);
        assert_eq!(s.focus(), 0);
        assert_eq!(s.entered(), "");
        assert_eq!(s.input(9, Some('A')), InputOutcome::Rejected);
    }

    #[test]
    fn test_focus_advances_and_stops_at_last_cell() {
        let mut s = session("ABCDE");
        for expected in [1, 2, 3, 4, 4] {
            assert_eq!(s.type_char('A'), InputOutcome::Accepted { focus: expected });
        }
        // Typing on the last cell overwrites it
        assert_eq!(s.type_char('B'), InputOutcome::Accepted { focus: 4 });
        assert_eq!(s.entered(), "AAAAB");
    }

    #[test]
    fn test_backspace_clears_then_steps_back() {
        let mut s = session("ABCDE");
        s.type_char('A');
        s.type_char('B');
        assert_eq!(s.focus(), 2);

        // Focused cell empty: step back
        assert_eq!(s.backspace(), InputOutcome::Cleared { focus: 1 });
        // Cell 1 holds 'B': clear it and step back
        assert_eq!(s.backspace(), InputOutcome::Cleared { focus: 0 });
        assert_eq!(s.entered(), "A");
        assert_eq!(s.backspace(), InputOutcome::Cleared { focus: 0 });
        assert_eq!(s.entered(), "");
        assert_eq!(s.backspace(), InputOutcome::Cleared { focus: 0 });
    }

    #[test]
    fn test_regenerate_resets_input() {
        let mut s = session("ABCDE");
        let answer = s.answer().to_string();
        s.enter_text(&answer);
        assert!(s.is_validated());

        s.regenerate(&mut RecordingSurface::new(), &mut RngSource::seeded(78))
            .unwrap();
        assert_eq!(s.generation(), 2);
        assert_eq!(s.entered(), "");
        assert_eq!(s.focus(), 0);
        assert!(!s.is_validated());
    }

    #[test]
    fn test_no_challenge_never_validates() {
        let mut s = ChallengeSession::new(CaptchaGenerator::new(CaptchaOptions::plain("A")));
        s.enter_text("AAAAA");
        assert!(!s.is_validated());
    }
}
