use crate::store::{Card, CardId, CardStore};
use log::*;
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Correct,
    Wrong,
}

pub trait SpacedRepetition {
    /// find next card to review
    fn next_to_review<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<CardId>;

    /// apply `outcome` to the card shown at `turn`
    fn update(&mut self, id: CardId, outcome: Outcome, turn: u32) -> Option<&Card>;
}

/// Pick the most due card.
///
/// The first card scanned is the initial pick. A later card takes its place when it has a
/// strictly higher priority, was not shown more recently, and wins a fresh 2/3 draw.
pub fn select_next<'a, R, I>(cards: I, rng: &mut R) -> Option<CardId>
where
    R: Rng + ?Sized,
    I: IntoIterator<Item = (CardId, &'a Card)>,
{
    let mut best: Option<(CardId, &Card)> = None;
    for (id, card) in cards {
        match best {
            None => best = Some((id, card)),
            Some((_, b))
                if card.priority > b.priority
                    && card.last_appearance <= b.last_appearance
                    && rng.random_ratio(2, 3) =>
            {
                best = Some((id, card))
            }
            Some(_) => {}
        }
    }
    best.map(|(id, _)| id)
}

impl SpacedRepetition for CardStore {
    fn next_to_review<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<CardId> {
        select_next(self.iter(), rng)
    }

    fn update(&mut self, id: CardId, outcome: Outcome, turn: u32) -> Option<&Card> {
        let card = self.get_mut(id)?;
        card.priority = match outcome {
            Outcome::Correct => card.priority.saturating_sub(1),
            Outcome::Wrong => card.priority.saturating_add(1),
        };
        card.last_appearance = turn;
        debug!(
            "{:?} {outcome:?}: priority {} at turn {turn}",
            card.question(),
            card.priority
        );
        Some(card)
    }
}
