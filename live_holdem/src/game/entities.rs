use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};
use serde::{Deserialize, Serialize};
use std::{
    cmp::Ordering,
    collections::BTreeSet,
    fmt::{self},
    str::FromStr,
};
use uuid::Uuid;

use super::{errors::TableError, functional::compare_cards};

/// Player identifiers are issued by the session layer.
pub type PlayerId = Uuid;

pub type TableId = Uuid;

/// Whole chips. Blinds, bets and stacks never deal in fractions.
pub type Chips = u32;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Suit {
    Club,
    Spade,
    Diamond,
    Heart,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Club, Suit::Spade, Suit::Diamond, Suit::Heart];
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Club => "♣",
            Self::Spade => "♠",
            Self::Diamond => "♦",
            Self::Heart => "♥",
        };
        write!(f, "{repr}")
    }
}

/// Card values run from 2 to 14, the ace always counting high.
pub type Value = u8;

pub const ACE: Value = 14;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Card(pub Value, pub Suit);

impl Card {
    #[must_use]
    pub fn value(&self) -> Value {
        self.0
    }

    #[must_use]
    pub fn suit(&self) -> Suit {
        self.1
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let value = match self.0 {
            14 => "A",
            13 => "K",
            12 => "Q",
            11 => "J",
            v => &v.to_string(),
        };
        let repr = format!("{value}/{}", self.1);
        write!(f, "{repr:>4}")
    }
}

/// The two private cards dealt to a seated player.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Hand(pub [Card; 2]);

impl Hand {
    #[must_use]
    pub fn cards(&self) -> &[Card] {
        &self.0
    }
}

#[derive(Debug)]
pub struct Deck {
    cards: [Card; 52],
    deck_idx: usize,
}

impl Deck {
    /// # Panics
    ///
    /// Dealing past the last card means the table let more seats in than
    /// the deck can serve.
    pub fn deal_card(&mut self) -> Card {
        assert!(
            self.deck_idx < self.cards.len(),
            "Deck exhausted - this indicates a critical bug!"
        );
        let card = self.cards[self.deck_idx];
        self.deck_idx += 1;
        card
    }

    pub fn deal(&mut self, n: usize) -> Vec<Card> {
        (0..n).map(|_| self.deal_card()).collect()
    }

    /// Shuffles the full deck. A zero seed draws from thread entropy, any
    /// other seed gives a reproducible order.
    pub fn shuffle(&mut self, seed: u64) {
        if seed == 0 {
            self.cards.shuffle(&mut rand::rng());
        } else {
            self.cards.shuffle(&mut StdRng::seed_from_u64(seed));
        }
        self.deck_idx = 0;
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.cards.len() - self.deck_idx
    }
}

impl Default for Deck {
    fn default() -> Self {
        let mut cards = [Card(2, Suit::Club); 52];
        for (i, value) in (2..=ACE).enumerate() {
            for (j, suit) in Suit::ALL.into_iter().enumerate() {
                cards[4 * i + j] = Card(value, suit);
            }
        }
        Self { cards, deck_idx: 0 }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Rank {
    HighCard = 1,
    OnePair = 2,
    TwoPair = 3,
    ThreeOfAKind = 4,
    Straight = 5,
    Flush = 6,
    FullHouse = 7,
    FourOfAKind = 8,
    StraightFlush = 9,
    RoyalFlush = 10,
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::HighCard => "high card",
            Self::OnePair => "one pair",
            Self::TwoPair => "two pair",
            Self::ThreeOfAKind => "three of a kind",
            Self::Straight => "straight",
            Self::Flush => "flush",
            Self::FullHouse => "full house",
            Self::FourOfAKind => "four of a kind",
            Self::StraightFlush => "straight flush",
            Self::RoyalFlush => "royal flush",
        };
        write!(f, "{repr}")
    }
}

/// A hand's category plus the cards that break ties inside it,
/// most significant first.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Combination {
    pub rank: Rank,
    pub compare_cards: Vec<Card>,
}

impl Ord for Combination {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank
            .cmp(&other.rank)
            .then_with(|| compare_cards(&self.compare_cards, &other.compare_cards))
    }
}

impl PartialOrd for Combination {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Suits never break ties, so equality follows the ordering rather than the
// derived field comparison.
impl PartialEq for Combination {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Combination {}

impl fmt::Display for Combination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.rank)?;
        for card in &self.compare_cards {
            write!(f, " {card}")?;
        }
        Ok(())
    }
}

/// A seated participant. Only the table mutates players, everything
/// outside the crate reads them through the accessors.
#[derive(Clone, Debug)]
pub struct Player {
    pub(crate) id: PlayerId,
    pub(crate) balance: Chips,
    pub(crate) folded: bool,
    pub(crate) ready: bool,
    pub(crate) last_bet: Chips,
    pub(crate) hand: Option<Hand>,
}

impl Player {
    #[must_use]
    pub fn new(id: PlayerId, balance: Chips) -> Self {
        Self {
            id,
            balance,
            folded: false,
            ready: false,
            last_bet: 0,
            hand: None,
        }
    }

    /// Same player holding `hand`, for ranking hands outside a table.
    #[must_use]
    pub fn with_hand(mut self, hand: Hand) -> Self {
        self.hand = Some(hand);
        self
    }

    #[must_use]
    pub fn id(&self) -> PlayerId {
        self.id
    }

    #[must_use]
    pub fn balance(&self) -> Chips {
        self.balance
    }

    #[must_use]
    pub fn folded(&self) -> bool {
        self.folded
    }

    #[must_use]
    pub fn ready(&self) -> bool {
        self.ready
    }

    #[must_use]
    pub fn last_bet(&self) -> Chips {
        self.last_bet
    }

    #[must_use]
    pub fn hand(&self) -> Option<&Hand> {
        self.hand.as_ref()
    }

    /// Committed everything, still in the hand.
    #[must_use]
    pub fn is_all_in(&self) -> bool {
        !self.folded && self.balance == 0
    }

    /// Moves chips from the stack into the current round's bet, capped at
    /// what the player holds. Returns the amount actually moved.
    pub(crate) fn commit(&mut self, amount: Chips) -> Chips {
        let paid = amount.min(self.balance);
        self.balance -= paid;
        self.last_bet += paid;
        paid
    }

    pub(crate) fn reset_for_hand(&mut self) {
        self.folded = false;
        self.ready = false;
        self.last_bet = 0;
        self.hand = None;
    }
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Pot {
    pub amount: Chips,
    pub applicants: BTreeSet<PlayerId>,
}

impl Pot {
    #[must_use]
    pub fn new(amount: Chips, applicants: BTreeSet<PlayerId>) -> Self {
        Self { amount, applicants }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "action", content = "amount", rename_all = "kebab-case")]
pub enum Action {
    Check,
    Call,
    Raise(Chips),
    Fold,
    AllIn,
}

impl Action {
    /// Builds an action from the name and amount a client submitted.
    /// The amount only matters for raises.
    pub fn from_parts(name: &str, amount: Chips) -> Result<Self, TableError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "check" => Ok(Self::Check),
            "call" => Ok(Self::Call),
            "raise" | "bet" => Ok(Self::Raise(amount)),
            "fold" => Ok(Self::Fold),
            "all-in" | "allin" | "all_in" => Ok(Self::AllIn),
            other => Err(TableError::UnexpectedAction(other.to_string())),
        }
    }
}

impl FromStr for Action {
    type Err = TableError;

    /// Accepts `"check"`, `"call"`, `"fold"`, `"all-in"` and `"raise 400"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let name = parts.next().unwrap_or_default();
        let amount = match parts.next() {
            Some(raw) => raw
                .parse()
                .map_err(|_| TableError::UnexpectedAction(s.to_string()))?,
            None => 0,
        };
        Self::from_parts(name, amount)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Check => write!(f, "checks"),
            Self::Call => write!(f, "calls"),
            Self::Raise(amount) => write!(f, "raises to {amount}"),
            Self::Fold => write!(f, "folds"),
            Self::AllIn => write!(f, "goes all-in"),
        }
    }
}

/// What the player whose turn it is may do, with the amounts involved.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "choice", rename_all = "kebab-case")]
pub enum ActionChoice {
    Check,
    Call { owed: Chips },
    Raise { min: Chips },
    Fold,
    AllIn { amount: Chips },
}

impl fmt::Display for ActionChoice {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Check => write!(f, "check"),
            Self::Call { owed } => write!(f, "call {owed}"),
            Self::Raise { min } => write!(f, "raise >= {min}"),
            Self::Fold => write!(f, "fold"),
            Self::AllIn { amount } => write!(f, "all-in {amount}"),
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Round {
    PreFlop = 0,
    Flop = 1,
    Turn = 2,
    River = 3,
    Showdown = 4,
}

impl Round {
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Self::PreFlop => Self::Flop,
            Self::Flop => Self::Turn,
            Self::Turn => Self::River,
            Self::River | Self::Showdown => Self::Showdown,
        }
    }

    /// Community cards dealt when this round opens.
    #[must_use]
    pub fn cards_to_deal(self) -> usize {
        match self {
            Self::Flop => 3,
            Self::Turn | Self::River => 1,
            Self::PreFlop | Self::Showdown => 0,
        }
    }
}

impl fmt::Display for Round {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::PreFlop => "pre-flop",
            Self::Flop => "flop",
            Self::Turn => "turn",
            Self::River => "river",
            Self::Showdown => "showdown",
        };
        write!(f, "{repr}")
    }
}
