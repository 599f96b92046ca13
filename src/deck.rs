//! Deck file: one `question,answer,priority` record per line.

use crate::store::{Card, CardStore, StoreError};
use log::*;
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Priority for records whose priority field is missing, zero or not a number.
pub const DEFAULT_PRIORITY: u32 = 1000;

/// Appended to answers on load so they compare equal to a full input line.
pub const TERMINATOR: char = '\n';

#[derive(Debug, Error)]
pub enum DeckError {
    #[error("Could not open {} in read mode!", .path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Could not open {} in write mode!", .path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeckRecord {
    pub question: String,
    pub answer: String,
    pub priority: u32,
}

impl From<&Card> for DeckRecord {
    fn from(card: &Card) -> Self {
        let answer = card.answer();
        Self {
            question: card.question().to_owned(),
            answer: answer.strip_suffix(TERMINATOR).unwrap_or(answer).to_owned(),
            priority: card.priority,
        }
    }
}

/// Base 10 leading digits, like `strtol`. Zero means unset.
pub fn parse_priority(field: &str) -> u32 {
    let field = field.trim_start();
    let digits = field.strip_prefix('+').unwrap_or(field);
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    match digits[..end].parse::<u32>() {
        Ok(0) | Err(_) => DEFAULT_PRIORITY,
        Ok(p) => p,
    }
}

/// Parse one deck line. Short or unreadable lines give `None`.
fn parse_line(line: &[u8]) -> Option<DeckRecord> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(line);
    let mut record = csv::StringRecord::new();
    match rdr.read_record(&mut record) {
        Ok(true) => {}
        Ok(false) => return None,
        Err(e) => {
            debug!("skipping unreadable record: {e}");
            return None;
        }
    }
    let (Some(question), Some(answer), Some(priority)) =
        (record.get(0), record.get(1), record.get(2))
    else {
        debug!("skipping short record {record:?}");
        return None;
    };
    Some(DeckRecord {
        question: question.to_owned(),
        answer: answer.to_owned(),
        priority: parse_priority(priority),
    })
}

/// Parse deck records line by line, skipping malformed lines.
///
/// A quote never spans a line end, so a stray `"` only costs its own line.
pub fn read_deck<R: BufRead>(reader: R) -> Result<Vec<DeckRecord>, csv::Error> {
    let mut v = Vec::new();
    for line in reader.split(b'\n') {
        if let Some(record) = parse_line(&line?) {
            v.push(record);
        }
    }
    Ok(v)
}

/// Load the deck at `path` into `store`, returning the number of records read.
pub fn load(path: &Path, store: &mut CardStore) -> Result<usize, DeckError> {
    let file = File::open(path).map_err(|source| DeckError::Load {
        path: path.to_owned(),
        source,
    })?;
    let records = read_deck(BufReader::new(file))?;
    for record in &records {
        let answer = format!("{}{TERMINATOR}", record.answer);
        store.insert(&record.question, &answer, record.priority, 0)?;
    }
    info!(
        "loaded {} records, {} cards from {:?}",
        records.len(),
        store.len(),
        path
    );
    Ok(records.len())
}

/// Write every card to `writer`, stopping at the first failed record.
///
/// Each record is flushed on its own so a failing sink stops the iteration.
pub fn write_deck<W: Write>(store: &CardStore, writer: W) -> Result<usize, csv::Error> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    let mut written = 0;
    let flow = store.for_each(|_, card| {
        let result = wtr
            .serialize(DeckRecord::from(card))
            .and_then(|()| wtr.flush().map_err(csv::Error::from));
        match result {
            Ok(()) => {
                written += 1;
                ControlFlow::Continue(())
            }
            Err(e) => ControlFlow::Break(e),
        }
    });
    if let ControlFlow::Break(e) = flow {
        return Err(e);
    }
    Ok(written)
}

/// Truncate the deck at `path` and write the current store into it.
pub fn save(path: &Path, store: &CardStore) -> Result<usize, DeckError> {
    let file = File::create(path).map_err(|source| DeckError::Save {
        path: path.to_owned(),
        source,
    })?;
    let written = write_deck(store, file).map_err(|source| DeckError::Write {
        path: path.to_owned(),
        source,
    })?;
    info!("saved {written} cards to {path:?}");
    Ok(written)
}

/// `question<TAB>answer` for every card.
pub fn dump<W: Write>(store: &CardStore, out: &mut W) -> io::Result<()> {
    for (_, card) in store.iter() {
        write!(out, "{}\t{}", card.question(), card.answer())?;
    }
    out.flush()
}
