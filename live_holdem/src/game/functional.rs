//! Pure poker math: hand evaluation, pot construction and showdown
//! resolution. Nothing here touches table state beyond what it is handed.

use std::{
    cmp::Ordering,
    collections::{BTreeSet, HashMap},
};

use super::{
    constants::BOARD_CARDS,
    entities::{ACE, Card, Chips, Combination, Player, PlayerId, Pot, Rank, Suit},
    errors::WinnerError,
};

/// Sorts by value, high to low. Suit only breaks ties so the result does
/// not depend on the order the cards came in.
fn sort_desc(cards: &mut [Card]) {
    cards.sort_unstable_by(|a, b| b.0.cmp(&a.0).then(b.1.cmp(&a.1)));
}

/// Highest card of the best five card run, the wheel (A-2-3-4-5)
/// topping out at its five. `cards` must be sorted high to low.
fn straight_top(cards: &[Card]) -> Option<Card> {
    let mut distinct: Vec<Card> = Vec::with_capacity(cards.len());
    for &card in cards {
        if distinct.last().is_none_or(|last: &Card| last.0 != card.0) {
            distinct.push(card);
        }
    }

    if let Some(window) = distinct
        .windows(5)
        .find(|w| w[0].0 == w[4].0 + 4)
    {
        return Some(window[0]);
    }

    let has_ace = distinct.first().is_some_and(|c| c.0 == ACE);
    let low: Vec<Card> = distinct.iter().filter(|c| c.0 <= 5).copied().collect();
    if has_ace && low.len() == 4 {
        return Some(low[0]);
    }
    None
}

/// Highest `n` cards whose value is not in `used`.
fn kickers(cards: &[Card], used: &[Card], n: usize) -> Vec<Card> {
    cards
        .iter()
        .filter(|c| !used.iter().any(|u| u.0 == c.0))
        .take(n)
        .copied()
        .collect()
}

/// Best combination among hole and community cards. Works for any card
/// count, so pre-flop hands can be ranked too.
#[must_use]
pub fn evaluate_hand(hole: &[Card], community: &[Card]) -> Combination {
    let mut cards: Vec<Card> = hole.iter().chain(community).copied().collect();
    sort_desc(&mut cards);

    let flush: Option<Vec<Card>> = Suit::ALL
        .iter()
        .map(|suit| {
            cards
                .iter()
                .filter(|c| c.1 == *suit)
                .copied()
                .collect::<Vec<_>>()
        })
        .find(|suited| suited.len() >= 5);

    if let Some(top) = flush.as_deref().and_then(straight_top) {
        let rank = if top.0 == ACE {
            Rank::RoyalFlush
        } else {
            Rank::StraightFlush
        };
        return Combination {
            rank,
            compare_cards: vec![top],
        };
    }

    // Same-value groups, biggest group first, then highest value.
    let mut groups: Vec<Vec<Card>> = Vec::new();
    for &card in &cards {
        match groups.last_mut() {
            Some(group) if group[0].0 == card.0 => group.push(card),
            _ => groups.push(vec![card]),
        }
    }
    groups.sort_by(|a, b| b.len().cmp(&a.len()).then(b[0].0.cmp(&a[0].0)));
    let group_len = |i: usize| groups.get(i).map_or(0, Vec::len);

    let with_kickers = |rank: Rank, mut made: Vec<Card>, n: usize| {
        let extra = kickers(&cards, &made, n);
        made.extend(extra);
        Combination {
            rank,
            compare_cards: made,
        }
    };

    if group_len(0) == 4 {
        return with_kickers(Rank::FourOfAKind, groups[0].clone(), 1);
    }

    if group_len(0) == 3 && group_len(1) >= 2 {
        let mut made = groups[0].clone();
        made.extend_from_slice(&groups[1][..2]);
        return Combination {
            rank: Rank::FullHouse,
            compare_cards: made,
        };
    }

    if let Some(suited) = flush {
        return Combination {
            rank: Rank::Flush,
            compare_cards: suited[..5].to_vec(),
        };
    }

    if let Some(top) = straight_top(&cards) {
        return Combination {
            rank: Rank::Straight,
            compare_cards: vec![top],
        };
    }

    match (group_len(0), group_len(1)) {
        (3, _) => with_kickers(Rank::ThreeOfAKind, groups[0].clone(), 2),
        (2, 2) => {
            let mut made = groups[0].clone();
            made.extend_from_slice(&groups[1]);
            with_kickers(Rank::TwoPair, made, 1)
        }
        (2, _) => with_kickers(Rank::OnePair, groups[0].clone(), 3),
        _ => Combination {
            rank: Rank::HighCard,
            compare_cards: cards.iter().take(5).copied().collect(),
        },
    }
}

/// Tie-break between two compare-card sequences of the same rank. Values
/// are compared pairwise over the shorter length; an empty sequence loses
/// to a non-empty one.
#[must_use]
pub fn compare_cards(a: &[Card], b: &[Card]) -> Ordering {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Less,
        (false, true) => return Ordering::Greater,
        _ => {}
    }
    a.iter()
        .zip(b)
        .map(|(x, y)| x.0.cmp(&y.0))
        .find(|ord| ord.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Turns the current round's bets into pots, one per all-in level.
///
/// Every player pays into each level up to what they bet, folded players
/// included, but only players still in the hand who reached a level may
/// win it. Chips folded players put in above the top live level go to the
/// last pot. All bets are consumed.
pub fn create_pots(players: &mut HashMap<PlayerId, Player>) -> Vec<Pot> {
    let mut pots = Vec::new();

    while let Some(level) = players
        .values()
        .filter(|p| !p.folded && p.last_bet > 0)
        .map(|p| p.last_bet)
        .min()
    {
        let mut pot = Pot::default();
        for player in players.values_mut() {
            let part = player.last_bet.min(level);
            if part == 0 {
                continue;
            }
            player.last_bet -= part;
            pot.amount += part;
            if !player.folded && part == level {
                pot.applicants.insert(player.id);
            }
        }
        pots.push(pot);
    }

    let leftover: Chips = players
        .values_mut()
        .map(|p| std::mem::take(&mut p.last_bet))
        .sum();
    if leftover > 0 {
        match pots.last_mut() {
            Some(pot) => pot.amount += leftover,
            None => pots.push(Pot::new(leftover, BTreeSet::new())),
        }
    }

    pots
}

/// Merges pots that share the same applicants, keeping the order in which
/// each applicant set first appeared.
#[must_use]
pub fn union_pots(pots: Vec<Pot>) -> Vec<Pot> {
    let mut merged: Vec<Pot> = Vec::with_capacity(pots.len());
    for pot in pots {
        match merged.iter_mut().find(|m| m.applicants == pot.applicants) {
            Some(existing) => existing.amount += pot.amount,
            None => merged.push(pot),
        }
    }
    merged
}

/// Every contender holding the best hand on a full board. Folded players
/// are ignored; ties return all of them.
pub fn determine_winner(
    community: &[Card],
    contenders: &HashMap<PlayerId, &Player>,
) -> Result<BTreeSet<PlayerId>, WinnerError> {
    if community.len() != BOARD_CARDS {
        return Err(WinnerError::CommunityCards(community.len()));
    }

    let mut best: Option<Combination> = None;
    let mut winners = BTreeSet::new();

    for (id, player) in contenders.iter().filter(|(_, p)| !p.folded) {
        let hand = player.hand.ok_or(WinnerError::MissingHand(*id))?;
        let combination = evaluate_hand(hand.cards(), community);
        let ordering = best
            .as_ref()
            .map_or(Ordering::Greater, |b| combination.cmp(b));
        match ordering {
            Ordering::Greater => {
                winners.clear();
                winners.insert(*id);
                best = Some(combination);
            }
            Ordering::Equal => {
                winners.insert(*id);
            }
            Ordering::Less => {}
        }
    }

    if winners.is_empty() {
        return Err(WinnerError::EmptyContenders);
    }
    Ok(winners)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::entities::Hand;
    use proptest::prelude::*;
    use uuid::Uuid;

    fn c(value: u8, suit: Suit) -> Card {
        Card(value, suit)
    }

    use Suit::{Club as C, Diamond as D, Heart as H, Spade as S};

    fn values(combination: &Combination) -> Vec<u8> {
        combination.compare_cards.iter().map(|c| c.0).collect()
    }

    fn better(
        player: &mut Player,
        balance: Chips,
        last_bet: Chips,
        folded: bool,
    ) -> PlayerId {
        player.balance = balance;
        player.last_bet = last_bet;
        player.folded = folded;
        player.id
    }

    // === Evaluation Tests ===

    #[test]
    fn test_royal_flush() {
        let hand = evaluate_hand(
            &[c(14, S), c(13, S)],
            &[c(12, S), c(11, S), c(10, S), c(2, H), c(3, D)],
        );
        assert_eq!(hand.rank, Rank::RoyalFlush);
        assert_eq!(values(&hand), vec![14]);
    }

    #[test]
    fn test_wheel_is_a_five_high_straight() {
        let hand = evaluate_hand(
            &[c(14, S), c(2, H)],
            &[c(3, D), c(4, C), c(5, S), c(9, H), c(13, D)],
        );
        assert_eq!(hand.rank, Rank::Straight);
        assert_eq!(values(&hand), vec![5]);

        let six_high = evaluate_hand(
            &[c(6, S), c(2, H)],
            &[c(3, D), c(4, C), c(5, S), c(9, H), c(13, D)],
        );
        assert!(six_high > hand);
    }

    #[test]
    fn test_steel_wheel_is_a_straight_flush() {
        let hand = evaluate_hand(
            &[c(14, H), c(2, H)],
            &[c(3, H), c(4, H), c(5, H), c(13, H), c(9, D)],
        );
        assert_eq!(hand.rank, Rank::StraightFlush);
        assert_eq!(values(&hand), vec![5]);
    }

    #[test]
    fn test_four_of_a_kind_takes_best_kicker() {
        let hand = evaluate_hand(
            &[c(9, S), c(9, H)],
            &[c(9, D), c(9, C), c(3, S), c(12, H), c(12, D)],
        );
        assert_eq!(hand.rank, Rank::FourOfAKind);
        assert_eq!(values(&hand), vec![9, 9, 9, 9, 12]);
    }

    #[test]
    fn test_two_trips_make_a_full_house() {
        let hand = evaluate_hand(
            &[c(7, S), c(7, H)],
            &[c(7, D), c(11, C), c(11, S), c(11, H), c(2, D)],
        );
        assert_eq!(hand.rank, Rank::FullHouse);
        assert_eq!(values(&hand), vec![11, 11, 11, 7, 7]);
    }

    #[test]
    fn test_flush_compares_top_five() {
        let hand = evaluate_hand(
            &[c(2, D), c(13, D)],
            &[c(9, D), c(4, D), c(6, D), c(10, D), c(14, S)],
        );
        assert_eq!(hand.rank, Rank::Flush);
        assert_eq!(values(&hand), vec![13, 10, 9, 6, 4]);
    }

    #[test]
    fn test_two_pair_kicker_skips_paired_values() {
        let hand = evaluate_hand(
            &[c(8, S), c(8, H)],
            &[c(4, D), c(4, C), c(4, S), c(8, D), c(2, D)],
        );
        // Trips of eights with a pair of fours is a full house, not two pair.
        assert_eq!(hand.rank, Rank::FullHouse);

        let hand = evaluate_hand(
            &[c(8, S), c(8, H)],
            &[c(4, D), c(4, C), c(6, S), c(6, D), c(2, D)],
        );
        assert_eq!(hand.rank, Rank::TwoPair);
        assert_eq!(values(&hand), vec![8, 8, 6, 6, 4]);
    }

    #[test]
    fn test_one_pair_and_high_card() {
        let pair = evaluate_hand(
            &[c(14, S), c(14, H)],
            &[c(3, D), c(7, C), c(9, S), c(11, D), c(2, D)],
        );
        assert_eq!(pair.rank, Rank::OnePair);
        assert_eq!(values(&pair), vec![14, 14, 11, 9, 7]);

        let high = evaluate_hand(
            &[c(14, S), c(12, H)],
            &[c(3, D), c(7, C), c(9, S), c(11, D), c(2, D)],
        );
        assert_eq!(high.rank, Rank::HighCard);
        assert_eq!(values(&high), vec![14, 12, 11, 9, 7]);
    }

    #[test]
    fn test_hole_cards_only() {
        let hand = evaluate_hand(&[c(10, S), c(10, H)], &[]);
        assert_eq!(hand.rank, Rank::OnePair);
        assert_eq!(values(&hand), vec![10, 10]);
    }

    #[test]
    fn test_compare_cards_empty_loses() {
        assert_eq!(compare_cards(&[], &[]), Ordering::Equal);
        assert_eq!(compare_cards(&[], &[c(2, S)]), Ordering::Less);
        assert_eq!(compare_cards(&[c(2, S)], &[]), Ordering::Greater);
        assert_eq!(
            compare_cards(&[c(9, S), c(4, H)], &[c(9, D), c(3, H)]),
            Ordering::Greater
        );
        assert_eq!(compare_cards(&[c(9, S)], &[c(9, D)]), Ordering::Equal);
    }

    // === Pot Tests ===

    fn table_of(n: usize) -> (Vec<PlayerId>, HashMap<PlayerId, Player>) {
        let ids: Vec<PlayerId> = (0..n).map(|_| Uuid::new_v4()).collect();
        let players = ids.iter().map(|id| (*id, Player::new(*id, 0))).collect();
        (ids, players)
    }

    #[test]
    fn test_create_pots_all_in_levels() {
        let (ids, mut players) = table_of(3);
        for (id, bet) in ids.iter().zip([500, 400, 300]) {
            better(players.get_mut(id).unwrap(), 0, bet, false);
        }

        let pots = create_pots(&mut players);
        assert_eq!(pots.len(), 3);
        assert_eq!(pots[0].amount, 900);
        assert_eq!(pots[0].applicants, ids.iter().copied().collect());
        assert_eq!(pots[1].amount, 200);
        assert_eq!(pots[1].applicants, ids[..2].iter().copied().collect());
        assert_eq!(pots[2].amount, 100);
        assert_eq!(pots[2].applicants, BTreeSet::from([ids[0]]));
        assert!(players.values().all(|p| p.last_bet == 0));
    }

    #[test]
    fn test_create_pots_folded_chips_are_kept() {
        let (ids, mut players) = table_of(3);
        better(players.get_mut(&ids[0]).unwrap(), 0, 200, false);
        better(players.get_mut(&ids[1]).unwrap(), 0, 200, false);
        better(players.get_mut(&ids[2]).unwrap(), 0, 600, true);

        let pots = create_pots(&mut players);
        assert_eq!(pots.len(), 1);
        assert_eq!(pots[0].amount, 1000);
        assert!(!pots[0].applicants.contains(&ids[2]));
    }

    #[test]
    fn test_create_pots_only_folded_bets() {
        let (ids, mut players) = table_of(2);
        better(players.get_mut(&ids[0]).unwrap(), 0, 50, true);

        let pots = create_pots(&mut players);
        assert_eq!(pots, vec![Pot::new(50, BTreeSet::new())]);
    }

    #[test]
    fn test_union_pots_merges_same_applicants() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let pots = vec![
            Pot::new(100, BTreeSet::from([a, b])),
            Pot::new(40, BTreeSet::from([a])),
            Pot::new(60, BTreeSet::from([b, a])),
        ];
        let merged = union_pots(pots);
        assert_eq!(
            merged,
            vec![
                Pot::new(160, BTreeSet::from([a, b])),
                Pot::new(40, BTreeSet::from([a])),
            ]
        );
    }

    // === Winner Tests ===

    fn holding(cards: [Card; 2]) -> Player {
        let mut player = Player::new(Uuid::new_v4(), 0);
        player.hand = Some(Hand(cards));
        player
    }

    #[test]
    fn test_determine_winner_tie_returns_both() {
        let board = [c(14, S), c(14, H), c(13, D), c(13, C), c(12, S)];
        let a = holding([c(2, D), c(3, C)]);
        let b = holding([c(2, H), c(4, C)]);
        let contenders = HashMap::from([(a.id, &a), (b.id, &b)]);
        let winners = determine_winner(&board, &contenders).unwrap();
        assert_eq!(winners, BTreeSet::from([a.id, b.id]));
    }

    #[test]
    fn test_determine_winner_skips_folded() {
        let board = [c(2, S), c(7, H), c(9, D), c(11, C), c(4, S)];
        let a = holding([c(14, D), c(14, C)]);
        let b = holding([c(3, H), c(5, C)]);
        let c_ = holding([c(13, H), c(12, C)]);
        let mut a_folded = a.clone();
        a_folded.folded = true;
        let contenders = HashMap::from([(a.id, &a_folded), (b.id, &b), (c_.id, &c_)]);
        let winners = determine_winner(&board, &contenders).unwrap();
        assert_eq!(winners, BTreeSet::from([c_.id]));
    }

    #[test]
    fn test_determine_winner_errors() {
        let a = holding([c(2, D), c(3, C)]);
        let contenders = HashMap::from([(a.id, &a)]);
        assert_eq!(
            determine_winner(&[c(2, S)], &contenders),
            Err(WinnerError::CommunityCards(1))
        );

        let board = [c(14, S), c(14, H), c(13, D), c(13, C), c(12, S)];
        assert_eq!(
            determine_winner(&board, &HashMap::new()),
            Err(WinnerError::EmptyContenders)
        );

        let mut folded = a.clone();
        folded.folded = true;
        let only_folded = HashMap::from([(folded.id, &folded)]);
        assert_eq!(
            determine_winner(&board, &only_folded),
            Err(WinnerError::EmptyContenders)
        );
    }

    proptest! {
        #[test]
        fn test_pots_conserve_chips(
            bets in prop::collection::vec((0u32..2_000, any::<bool>()), 2..9)
        ) {
            let mut players: HashMap<PlayerId, Player> = HashMap::new();
            for (bet, folded) in &bets {
                let mut player = Player::new(Uuid::new_v4(), 0);
                player.last_bet = *bet;
                player.folded = *folded;
                players.insert(player.id, player);
            }
            let total: Chips = bets.iter().map(|(bet, _)| bet).sum();

            let pots = create_pots(&mut players);
            prop_assert_eq!(pots.iter().map(|p| p.amount).sum::<Chips>(), total);

            let merged = union_pots(pots);
            prop_assert_eq!(merged.iter().map(|p| p.amount).sum::<Chips>(), total);
            prop_assert!(players.values().all(|p| p.last_bet == 0));
        }
    }
}
