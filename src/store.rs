//! In-memory card collection keyed by question.

use log::*;
use std::collections::HashMap;
use std::collections::TryReserveError;
use std::hash::{BuildHasherDefault, Hasher};
use std::ops::ControlFlow;
use thiserror::Error;

/// Initial table capacity, enough for a hand written deck.
pub const DEFAULT_BUCKETS: usize = 100;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to allocate memory!")]
    Allocation(#[from] TryReserveError),
}

/// sdbm string hash
#[derive(Debug, Default, Clone, Copy)]
pub struct Sdbm(u64);

impl Hasher for Sdbm {
    fn finish(&self) -> u64 {
        self.0
    }

    fn write(&mut self, bytes: &[u8]) {
        for &c in bytes {
            self.0 = u64::from(c)
                .wrapping_add(self.0 << 6)
                .wrapping_add(self.0 << 16)
                .wrapping_sub(self.0);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    question: String,
    /// line terminated, compared verbatim against user input
    answer: String,
    /// higher is more due
    pub priority: u32,
    /// turn the card was last shown, 0 means never this session
    pub last_appearance: u32,
}

impl Card {
    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }
}

/// Handle to a card in a [`CardStore`].
///
/// Stays valid until the next [`CardStore::remove`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CardId(usize);

#[derive(Debug, Default)]
pub struct CardStore {
    cards: Vec<Card>,
    index: HashMap<String, usize, BuildHasherDefault<Sdbm>>,
}

impl CardStore {
    pub fn with_buckets(buckets: usize) -> Result<Self, StoreError> {
        let mut store = Self::default();
        store.cards.try_reserve(buckets)?;
        store.index.try_reserve(buckets)?;
        Ok(store)
    }

    /// Insert a card, owning copies of `question` and `answer`.
    ///
    /// A question already in the store is overwritten in place and keeps its id.
    pub fn insert(
        &mut self,
        question: &str,
        answer: &str,
        priority: u32,
        last_appearance: u32,
    ) -> Result<CardId, StoreError> {
        let answer = owned(answer)?;

        if let Some(&i) = self.index.get(question) {
            debug!("overwriting duplicate card {question:?}");
            let card = &mut self.cards[i];
            card.answer = answer;
            card.priority = priority;
            card.last_appearance = last_appearance;
            return Ok(CardId(i));
        }

        let key = owned(question)?;
        let question = owned(question)?;
        self.cards.try_reserve(1)?;
        self.index.try_reserve(1)?;

        let i = self.cards.len();
        self.index.insert(key, i);
        self.cards.push(Card {
            question,
            answer,
            priority,
            last_appearance,
        });
        Ok(CardId(i))
    }

    pub fn remove(&mut self, question: &str) -> Option<Card> {
        let i = self.index.remove(question)?;
        let card = self.cards.swap_remove(i);
        // the last card moved into the hole
        if let Some(moved) = self.cards.get(i) {
            if let Some(slot) = self.index.get_mut(moved.question.as_str()) {
                *slot = i;
            }
        }
        Some(card)
    }

    pub fn get(&self, id: CardId) -> Option<&Card> {
        self.cards.get(id.0)
    }

    pub fn get_mut(&mut self, id: CardId) -> Option<&mut Card> {
        self.cards.get_mut(id.0)
    }

    pub fn find(&self, question: &str) -> Option<CardId> {
        self.index.get(question).copied().map(CardId)
    }

    /// population
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (CardId, &Card)> {
        self.cards.iter().enumerate().map(|(i, card)| (CardId(i), card))
    }

    /// Visit every card until the visitor breaks.
    pub fn for_each<B, F>(&self, mut visitor: F) -> ControlFlow<B>
    where
        F: FnMut(CardId, &Card) -> ControlFlow<B>,
    {
        self.iter().try_for_each(|(id, card)| visitor(id, card))
    }

    pub fn clear(&mut self) {
        self.cards.clear();
        self.index.clear();
    }

    pub fn destroy(self) {
        debug!("releasing {} cards", self.len());
    }
}

fn owned(s: &str) -> Result<String, TryReserveError> {
    let mut o = String::new();
    o.try_reserve_exact(s.len())?;
    o.push_str(s);
    Ok(o)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::hash::BuildHasher;

    fn store() -> CardStore {
        let mut store = CardStore::with_buckets(DEFAULT_BUCKETS).unwrap();
        store.insert("a", "1\n", 5, 0).unwrap();
        store.insert("b", "2\n", 6, 0).unwrap();
        store.insert("c", "3\n", 7, 0).unwrap();
        store
    }

    #[test]
    fn sdbm_matches_reference() {
        let mut h = Sdbm::default();
        h.write(b"ab");
        // 'a' = 97, then 98 + (97 << 6) + (97 << 16) - 97
        assert_eq!(h.finish(), 98 + (97 << 6) + (97 << 16) - 97);
    }

    #[test]
    fn sdbm_spreads_keys() {
        let build = BuildHasherDefault::<Sdbm>::default();
        assert_ne!(build.hash_one("ka"), build.hash_one("ki"));
    }

    #[test]
    fn insert_counts_population() {
        let store = store();
        assert_eq!(store.len(), 3);
        let id = store.find("b").unwrap();
        let card = store.get(id).unwrap();
        assert_eq!(card.question(), "b");
        assert_eq!(card.answer(), "2\n");
        assert_eq!(card.priority, 6);
        assert_eq!(card.last_appearance, 0);
    }

    #[test]
    fn insert_owns_strings() {
        let mut store = CardStore::default();
        let mut buf = String::from("question");
        let id = store.insert(&buf, "answer\n", 1, 0).unwrap();
        buf.clear();
        assert_eq!(store.get(id).unwrap().question(), "question");
    }

    #[test]
    fn duplicate_question_overwrites() {
        let mut store = store();
        let before = store.find("a").unwrap();
        let after = store.insert("a", "one\n", 9, 0).unwrap();
        assert_eq!(before, after);
        assert_eq!(store.len(), 3);
        assert_eq!(store.get(after).unwrap().answer(), "one\n");
        assert_eq!(store.get(after).unwrap().priority, 9);
    }

    #[test]
    fn remove_keeps_index_consistent() {
        let mut store = store();
        let removed = store.remove("a").unwrap();
        assert_eq!(removed.question(), "a");
        assert_eq!(store.len(), 2);
        assert!(store.find("a").is_none());
        assert!(store.remove("a").is_none());

        for q in ["b", "c"] {
            let id = store.find(q).unwrap();
            assert_eq!(store.get(id).unwrap().question(), q);
        }
    }

    #[test]
    fn get_mut_writes_through() {
        let mut store = store();
        let id = store.find("c").unwrap();
        store.get_mut(id).unwrap().priority = 1;
        assert_eq!(store.get(id).unwrap().priority, 1);
    }

    #[test]
    fn for_each_stops_on_break() {
        let store = store();
        let mut seen = 0;
        let flow = store.for_each(|_, card| {
            seen += 1;
            if card.question() == "b" {
                ControlFlow::Break(card.priority)
            } else {
                ControlFlow::Continue(())
            }
        });
        assert_eq!(flow, ControlFlow::Break(6));
        assert_eq!(seen, 2);

        let mut all = 0;
        let flow: ControlFlow<()> = store.for_each(|_, _| {
            all += 1;
            ControlFlow::Continue(())
        });
        assert_eq!(flow, ControlFlow::Continue(()));
        assert_eq!(all, 3);
    }

    #[test]
    fn clear_is_idempotent() {
        let mut store = store();
        store.clear();
        store.clear();
        assert!(store.is_empty());
        assert!(store.find("a").is_none());
        store.destroy();
    }
}
