//! Card containers for the zones a search state tracks
//!
//! Hand and battlefield are order-irrelevant counted collections
//! ([`CardMultiset`]); the library is an ordered sequence ([`CardSequence`])
//! because draw order decides outcomes. Both are backed by `im` persistent
//! structures, so cloning a zone for a new branch is O(1) and siblings
//! share everything they didn't touch.

use crate::core::Card;
use im::{OrdMap, Vector};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Cards pulled off the top of the library in one go (draws, mills, reveals)
pub type CardRun = SmallVec<[Card; 8]>;

/// Order-irrelevant counted collection, such as a hand or battlefield
///
/// Invariant: no entry has a zero count.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardMultiset {
    counts: OrdMap<Card, u32>,
}

impl CardMultiset {
    pub fn new() -> Self {
        CardMultiset {
            counts: OrdMap::new(),
        }
    }

    /// Number of copies of `card`
    pub fn count(&self, card: &Card) -> u32 {
        self.counts.get(card).copied().unwrap_or(0)
    }

    pub fn contains(&self, card: &Card) -> bool {
        self.counts.contains_key(card)
    }

    /// Total number of cards, counting copies
    pub fn len(&self) -> usize {
        self.counts.values().map(|&n| n as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Distinct cards with their counts, in name order
    pub fn iter(&self) -> impl Iterator<Item = (&Card, u32)> + '_ {
        self.counts.iter().map(|(c, &n)| (c, n))
    }

    /// Distinct cards in name order
    pub fn cards(&self) -> impl Iterator<Item = &Card> + '_ {
        self.counts.keys()
    }

    /// A new multiset with one more copy of each given card
    pub fn plus<'a>(&self, cards: impl IntoIterator<Item = &'a Card>) -> Self {
        let mut counts = self.counts.clone();
        for card in cards {
            *counts.entry(card.clone()).or_insert(0) += 1;
        }
        CardMultiset { counts }
    }

    /// A new multiset with one copy of each given card removed
    ///
    /// # Panics
    ///
    /// Panics if asked to remove a card that isn't present. Callers check
    /// [`count`](Self::count) first; reaching this is an engine bug.
    pub fn minus<'a>(&self, cards: impl IntoIterator<Item = &'a Card>) -> Self {
        let mut counts = self.counts.clone();
        for card in cards {
            match counts.get(card).copied() {
                Some(n) if n > 1 => {
                    counts.insert(card.clone(), n - 1);
                }
                Some(_) => {
                    counts.remove(card);
                }
                None => panic!("can't remove {card} from {}", self.pretty()),
            }
        }
        CardMultiset { counts }
    }

    /// Sorted, order-independent rendering, e.g. "Forest*3 PrimevalTitan"
    pub fn pretty(&self) -> String {
        let mut chunks: Vec<String> = self
            .counts
            .iter()
            .map(|(card, &n)| {
                if n > 1 {
                    format!("{}*{n}", card.slug())
                } else {
                    card.slug()
                }
            })
            .collect();
        chunks.sort();
        chunks.join(" ")
    }
}

impl<'a> FromIterator<&'a Card> for CardMultiset {
    fn from_iter<I: IntoIterator<Item = &'a Card>>(iter: I) -> Self {
        CardMultiset::new().plus(iter)
    }
}

impl FromIterator<Card> for CardMultiset {
    fn from_iter<I: IntoIterator<Item = Card>>(iter: I) -> Self {
        let mut counts = OrdMap::new();
        for card in iter {
            *counts.entry(card).or_insert(0) += 1;
        }
        CardMultiset { counts }
    }
}

/// Ordered sequence of cards, such as a library in draw order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardSequence {
    cards: Vector<Card>,
}

impl CardSequence {
    pub fn new() -> Self {
        CardSequence {
            cards: Vector::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Look at the i-th card from the top without taking it
    ///
    /// # Panics
    ///
    /// Panics if `i` is out of range.
    pub fn get(&self, i: usize) -> &Card {
        match self.cards.get(i) {
            Some(card) => card,
            None => panic!("library index {i} out of range (len {})", self.cards.len()),
        }
    }

    /// Index of the first card matching `pred`, from the top
    pub fn position(&self, pred: impl Fn(&Card) -> bool) -> Option<usize> {
        self.cards.iter().position(pred)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Card> + '_ {
        self.cards.iter()
    }

    /// Split off the top `n` cards, returning them and the rest
    ///
    /// # Panics
    ///
    /// Panics if `n` exceeds the length of the sequence.
    pub fn split_after(&self, n: usize) -> (CardRun, CardSequence) {
        assert!(
            n <= self.cards.len(),
            "can't split {n} cards off a library of {}",
            self.cards.len()
        );
        let mut rest = self.cards.clone();
        let top = rest.slice(..n);
        (top.into_iter().collect(), CardSequence { cards: rest })
    }

    /// Order-dependent rendering, one slug per card
    pub fn pretty(&self) -> String {
        self.cards
            .iter()
            .map(Card::slug)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl FromIterator<Card> for CardSequence {
    fn from_iter<I: IntoIterator<Item = Card>>(iter: I) -> Self {
        CardSequence {
            cards: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cards(names: &[&str]) -> Vec<Card> {
        names.iter().map(|&n| Card::new(n)).collect()
    }

    #[test]
    fn test_multiset_counts() {
        let hand: CardMultiset = cards(&["Forest", "Forest", "Explore"]).into_iter().collect();
        assert_eq!(hand.count(&Card::new("Forest")), 2);
        assert_eq!(hand.count(&Card::new("Explore")), 1);
        assert_eq!(hand.count(&Card::new("Wastes")), 0);
        assert_eq!(hand.len(), 3);
        assert_eq!(hand.pretty(), "Explore Forest*2");
    }

    #[test]
    fn test_multiset_minus_removes_zero_entries() {
        let forest = Card::new("Forest");
        let hand = CardMultiset::new().plus([&forest]);
        let empty = hand.minus([&forest]);
        assert!(empty.is_empty());
        assert!(!empty.contains(&forest));
        assert_eq!(empty, CardMultiset::new());
        // Original is untouched
        assert_eq!(hand.count(&forest), 1);
    }

    #[test]
    #[should_panic(expected = "can't remove")]
    fn test_multiset_minus_missing_card_panics() {
        let hand = CardMultiset::new();
        let _ = hand.minus([&Card::new("Forest")]);
    }

    #[test]
    fn test_multiset_pretty_is_order_independent() {
        let a: CardMultiset = cards(&["Wastes", "Forest", "Amulet of Vigor"]).into_iter().collect();
        let b: CardMultiset = cards(&["Amulet of Vigor", "Wastes", "Forest"]).into_iter().collect();
        assert_eq!(a.pretty(), b.pretty());
    }

    #[test]
    fn test_sequence_split_after() {
        let lib: CardSequence = cards(&["Forest", "Explore", "Wastes", "Primeval Titan"])
            .into_iter()
            .collect();
        let (top, rest) = lib.split_after(3);
        assert_eq!(top.as_slice(), cards(&["Forest", "Explore", "Wastes"]).as_slice());
        assert_eq!(rest.len(), 1);
        assert_eq!(rest.get(0), &Card::new("Primeval Titan"));
        // Splitting doesn't consume the original
        assert_eq!(lib.len(), 4);

        let (none, all) = lib.split_after(0);
        assert!(none.is_empty());
        assert_eq!(all, lib);
    }

    #[test]
    #[should_panic(expected = "can't split")]
    fn test_sequence_split_past_end_panics() {
        let lib: CardSequence = cards(&["Forest"]).into_iter().collect();
        let _ = lib.split_after(2);
    }

    #[test]
    fn test_sequence_pretty_keeps_order() {
        let lib: CardSequence = cards(&["Wastes", "Forest"]).into_iter().collect();
        assert_eq!(lib.pretty(), "Wastes Forest");
        assert_eq!(lib.position(|c| c.name() == "Forest"), Some(1));
    }
}
