//! The drill loop: prompt, read a line, score it, pick the next card.

use crate::deck;
use crate::spaced_repetition::{Outcome, SpacedRepetition};
use crate::store::{CardId, CardStore};
use log::*;
use rand::Rng;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;
use thiserror::Error;

/// Input line that saves the deck instead of answering.
pub const SAVE_COMMAND: &str = "!save\n";

const CLEAR: &str = "\x1b[1;1H\x1b[2J";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("No cards!")]
    NoCards,

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Delay after a scored turn, so the verdict stays on screen.
pub trait Pacer {
    fn pause(&mut self);
}

pub struct SleepPacer(pub Duration);

impl Default for SleepPacer {
    fn default() -> Self {
        Self(Duration::from_millis(500))
    }
}

impl Pacer for SleepPacer {
    fn pause(&mut self) {
        thread::sleep(self.0);
    }
}

pub struct NoPacing;

impl Pacer for NoPacing {
    fn pause(&mut self) {}
}

#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// where `!save` writes
    pub deck_path: PathBuf,
    /// reveal the right answer after a wrong one
    pub show_answer: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub successes: u32,
    pub turns: u32,
}

pub struct Session<'a, I, O, E, P, G> {
    store: &'a mut CardStore,
    options: SessionOptions,
    input: I,
    output: O,
    errors: E,
    pacer: P,
    rng: G,
    successes: u32,
    /// turn being played, starting at 1
    turn: u32,
}

impl<'a, I, O, E, P, G> Session<'a, I, O, E, P, G>
where
    I: BufRead,
    O: Write,
    E: Write,
    P: Pacer,
    G: Rng,
{
    pub fn new(
        store: &'a mut CardStore,
        options: SessionOptions,
        input: I,
        output: O,
        errors: E,
        pacer: P,
        rng: G,
    ) -> Self {
        Self {
            store,
            options,
            input,
            output,
            errors,
            pacer,
            rng,
            successes: 0,
            turn: 1,
        }
    }

    /// Drill until the input runs out.
    pub fn run(mut self) -> Result<Summary, SessionError> {
        let mut current = self
            .store
            .next_to_review(&mut self.rng)
            .ok_or(SessionError::NoCards)?;
        self.prompt(current)?;

        let mut buf = Vec::new();
        loop {
            buf.clear();
            if self.input.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            let line = String::from_utf8_lossy(&buf);

            write!(self.output, "{CLEAR}")?;
            if line == SAVE_COMMAND {
                self.save()?;
            } else {
                current = self.score(current, &line)?;
            }
            self.prompt(current)?;
        }

        writeln!(self.output)?;
        self.output.flush()?;

        let summary = Summary {
            successes: self.successes,
            turns: self.turn - 1,
        };
        info!("session over: {summary:?}");
        Ok(summary)
    }

    fn prompt(&mut self, id: CardId) -> Result<(), SessionError> {
        let card = self.store.get(id).ok_or(SessionError::NoCards)?;
        write!(
            self.output,
            "{CLEAR}[{}/{}]\t{}\n? ",
            self.successes,
            self.turn - 1,
            card.question()
        )?;
        self.output.flush()?;
        Ok(())
    }

    /// Save without consuming a turn. Failures are reported and the drill goes on.
    fn save(&mut self) -> Result<(), SessionError> {
        if let Err(e) = deck::save(&self.options.deck_path, self.store) {
            warn!("{e}");
            writeln!(self.errors, "{e}")?;
            self.errors.flush()?;
            self.pacer.pause();
        }
        Ok(())
    }

    /// Score `line` against the card and return the next card to show.
    fn score(&mut self, id: CardId, line: &str) -> Result<CardId, SessionError> {
        let card = self.store.get(id).ok_or(SessionError::NoCards)?;
        let outcome = if card.answer() == line {
            writeln!(self.output, "Nice!")?;
            self.successes += 1;
            Outcome::Correct
        } else {
            writeln!(self.output, "Wrong!")?;
            if self.options.show_answer {
                write!(self.output, "right answer: {}", card.answer())?;
            }
            Outcome::Wrong
        };
        self.output.flush()?;

        self.store.update(id, outcome, self.turn);
        self.turn += 1;

        let next = self
            .store
            .next_to_review(&mut self.rng)
            .ok_or(SessionError::NoCards)?;
        self.pacer.pause();
        Ok(next)
    }
}
