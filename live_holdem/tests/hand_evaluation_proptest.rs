/// Property-based tests for hand evaluation using proptest
///
/// These tests check the evaluator and showdown resolution across a wide
/// range of randomly dealt boards.
use live_holdem::game::{
    entities::{ACE, Card, Hand, Player, PlayerId, Rank, Suit},
    functional::{determine_winner, evaluate_hand},
};
use proptest::prelude::*;
use std::collections::HashMap;
use uuid::Uuid;

fn full_deck() -> Vec<Card> {
    (2..=ACE)
        .flat_map(|value| Suit::ALL.into_iter().map(move |suit| Card(value, suit)))
        .collect()
}

fn suit_strategy() -> impl Strategy<Value = Suit> {
    prop::sample::select(Suit::ALL.to_vec())
}

// `n` distinct cards in random order
fn distinct_cards(n: usize) -> impl Strategy<Value = Vec<Card>> {
    prop::sample::subsequence(full_deck(), n).prop_shuffle()
}

proptest! {
    #[test]
    fn test_evaluation_ignores_card_order(cards in distinct_cards(7), split in 0usize..=7) {
        let forward = evaluate_hand(&cards[..2], &cards[2..]);

        let mut reversed = cards.clone();
        reversed.reverse();
        let (hole, community) = reversed.split_at(split);
        let backward = evaluate_hand(hole, community);

        prop_assert_eq!(forward.rank, backward.rank);
        prop_assert_eq!(forward, backward);
    }

    #[test]
    fn test_combination_uses_at_most_five_cards(cards in distinct_cards(7)) {
        let combination = evaluate_hand(&cards[..2], &cards[2..]);
        prop_assert!(combination.compare_cards.len() <= 5);
    }

    #[test]
    fn test_evaluation_handles_short_boards(cards in distinct_cards(2)) {
        let combination = evaluate_hand(&cards, &[]);
        prop_assert!(combination.rank <= Rank::OnePair);
    }

    #[test]
    fn test_royal_flush_beats_any_other_board(
        suit in suit_strategy(),
        others in distinct_cards(7),
    ) {
        let royal = [
            Card(ACE, suit),
            Card(13, suit),
            Card(12, suit),
            Card(11, suit),
            Card(10, suit),
        ];
        let royal_hand = evaluate_hand(&royal[..2], &royal[2..]);
        prop_assert_eq!(royal_hand.rank, Rank::RoyalFlush);

        let other = evaluate_hand(&others[..2], &others[2..]);
        prop_assert!(royal_hand >= other);
    }

    #[test]
    fn test_wheel_is_lowest_straight(suit in suit_strategy(), high in 6u8..=13) {
        let off = if suit == Suit::Club { Suit::Heart } else { Suit::Club };
        let wheel = [
            Card(ACE, suit),
            Card(2, off),
            Card(3, suit),
            Card(4, suit),
            Card(5, suit),
        ];
        let wheel_hand = evaluate_hand(&wheel[..2], &wheel[2..]);
        prop_assert_eq!(wheel_hand.rank, Rank::Straight);
        prop_assert_eq!(wheel_hand.compare_cards[0].value(), 5);

        let straight: Vec<Card> = (high - 4..=high)
            .map(|v| Card(v, if v == high { off } else { suit }))
            .collect();
        let straight_hand = evaluate_hand(&straight[..2], &straight[2..]);
        prop_assert_eq!(straight_hand.rank, Rank::Straight);
        prop_assert!(straight_hand > wheel_hand);
    }

    #[test]
    fn test_four_of_a_kind_beats_full_house(quad in 2u8..=ACE, trip in 2u8..=ACE) {
        prop_assume!(quad != trip);

        let four_kind = [
            Card(quad, Suit::Club),
            Card(quad, Suit::Diamond),
            Card(quad, Suit::Heart),
            Card(quad, Suit::Spade),
            Card(trip, Suit::Club),
        ];
        let full_house = [
            Card(trip, Suit::Club),
            Card(trip, Suit::Diamond),
            Card(trip, Suit::Heart),
            Card(quad, Suit::Club),
            Card(quad, Suit::Diamond),
        ];

        let fk = evaluate_hand(&four_kind[..2], &four_kind[2..]);
        let fh = evaluate_hand(&full_house[..2], &full_house[2..]);
        prop_assert_eq!(fk.rank, Rank::FourOfAKind);
        prop_assert_eq!(fh.rank, Rank::FullHouse);
        prop_assert!(fk > fh);
    }

    #[test]
    fn test_winners_do_not_depend_on_seating(
        cards in distinct_cards(5 + 2 * 4),
        rotation in 0usize..4,
    ) {
        let (board, holes) = cards.split_at(5);
        let ids: Vec<PlayerId> = (0..4).map(|_| Uuid::new_v4()).collect();
        let players: Vec<Player> = ids
            .iter()
            .zip(holes.chunks(2))
            .map(|(id, hole)| Player::new(*id, 1000).with_hand(Hand([hole[0], hole[1]])))
            .collect();

        let seated: HashMap<PlayerId, &Player> = players.iter().map(|p| (p.id(), p)).collect();
        let mut rotated_players: Vec<&Player> = players.iter().collect();
        rotated_players.rotate_left(rotation);
        let rotated: HashMap<PlayerId, &Player> =
            rotated_players.into_iter().map(|p| (p.id(), p)).collect();

        let winners = determine_winner(board, &seated).unwrap();
        prop_assert!(!winners.is_empty());
        prop_assert_eq!(&winners, &determine_winner(board, &rotated).unwrap());

        // Every winner holds the best hand, nobody outside the set does.
        let best = players
            .iter()
            .map(|p| evaluate_hand(p.hand().unwrap().cards(), board))
            .max()
            .unwrap();
        for player in &players {
            let combination = evaluate_hand(player.hand().unwrap().cards(), board);
            prop_assert_eq!(winners.contains(&player.id()), combination == best);
        }
    }

    #[test]
    fn test_board_plays_for_everyone(suit in suit_strategy()) {
        // A royal flush on the board ties every hand.
        let board = [
            Card(ACE, suit),
            Card(13, suit),
            Card(12, suit),
            Card(11, suit),
            Card(10, suit),
        ];
        let off = if suit == Suit::Club { Suit::Heart } else { Suit::Club };
        let a = Player::new(Uuid::new_v4(), 0).with_hand(Hand([Card(2, off), Card(3, off)]));
        let b = Player::new(Uuid::new_v4(), 0).with_hand(Hand([Card(7, off), Card(9, off)]));
        let contenders: HashMap<PlayerId, &Player> = [(a.id(), &a), (b.id(), &b)].into();

        let winners = determine_winner(&board, &contenders).unwrap();
        prop_assert_eq!(winners.len(), 2);
    }
}
