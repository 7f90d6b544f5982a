//! The per-table Hold'em state machine.
//!
//! [`PokerTable`] is synchronous and owns every piece of table state. It
//! never sleeps or talks to the outside world; each operation records the
//! notifications it produced in an outbox that the owning actor drains with
//! [`PokerTable::drain_events`] and fans out after the mutation completes.
//!
//! A hand moves through `PreFlop -> Flop -> Turn -> River -> Showdown`.
//! Rounds whose betting is already settled (everyone all-in, or a single
//! player left) cascade straight into the next one.

use log::{debug, error, info};
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::collections::{BTreeSet, HashMap, HashSet};
use tokio::time::Instant;

use super::{
    constants::HOLE_CARDS,
    entities::{
        Action, ActionChoice, Card, Chips, Deck, Hand, Player, PlayerId, Pot, Round, TableId,
    },
    errors::{TableError, TableResult},
    events::{Envelope, EventKind, PlayerStats, TableEvent},
    functional::{create_pots, determine_winner, evaluate_hand, union_pots},
};
use crate::table::config::TableConfig;

#[derive(Debug)]
pub struct PokerTable {
    id: TableId,
    config: TableConfig,

    /// Seated players, keyed by id. Always holds exactly the ids in `order`.
    players: HashMap<PlayerId, Player>,
    /// Seating order, clockwise from the first player to sit down.
    order: Vec<PlayerId>,
    /// Joined mid-hand, seated at the next pre-flop.
    queue: Vec<Player>,
    /// Left mid-hand, unseated once the hand is over.
    leaving: HashSet<PlayerId>,

    deck: Deck,
    community: Vec<Card>,
    pots: Vec<Pot>,

    round: Option<Round>,
    started: bool,
    dealer: Option<usize>,
    turn: usize,
    current_bet: Chips,
    small_blind: Chips,
    seed: u64,
    hand_count: u64,
    /// Bumped every time a player is handed the turn.
    turn_seq: u64,
    last_blind_increase: Option<Instant>,

    outbox: Vec<Envelope>,
}

impl PokerTable {
    #[must_use]
    pub fn new(id: TableId, config: TableConfig) -> Self {
        Self {
            id,
            small_blind: config.small_blind,
            seed: config.seed,
            players: HashMap::with_capacity(config.max_players),
            order: Vec::with_capacity(config.max_players),
            config,
            queue: Vec::new(),
            leaving: HashSet::new(),
            deck: Deck::default(),
            community: Vec::with_capacity(5),
            pots: Vec::new(),
            round: None,
            started: false,
            dealer: None,
            turn: 0,
            current_bet: 0,
            hand_count: 0,
            turn_seq: 0,
            last_blind_increase: None,
            outbox: Vec::new(),
        }
    }

    // === Queries ===

    #[must_use]
    pub fn id(&self) -> TableId {
        self.id
    }

    #[must_use]
    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    #[must_use]
    pub fn is_started(&self) -> bool {
        self.started
    }

    #[must_use]
    pub fn round(&self) -> Option<Round> {
        self.round
    }

    /// Seated and queued players, not counting anyone who left mid-hand.
    #[must_use]
    pub fn current_players(&self) -> usize {
        self.order.len() - self.leaving.len() + self.queue.len()
    }

    #[must_use]
    pub fn has_player(&self, id: PlayerId) -> bool {
        (self.players.contains_key(&id) && !self.leaving.contains(&id))
            || self.queue.iter().any(|p| p.id == id)
    }

    #[must_use]
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players
            .get(&id)
            .or_else(|| self.queue.iter().find(|p| p.id == id))
    }

    /// Seated players in seating order.
    pub fn seated(&self) -> impl Iterator<Item = &Player> {
        self.order.iter().filter_map(|id| self.players.get(id))
    }

    pub fn queued(&self) -> impl Iterator<Item = &Player> {
        self.queue.iter()
    }

    #[must_use]
    pub fn community(&self) -> &[Card] {
        &self.community
    }

    /// Pots built from the rounds finished so far in this hand.
    #[must_use]
    pub fn pots(&self) -> &[Pot] {
        &self.pots
    }

    #[must_use]
    pub fn current_bet(&self) -> Chips {
        self.current_bet
    }

    #[must_use]
    pub fn small_blind(&self) -> Chips {
        self.small_blind
    }

    #[must_use]
    pub fn hand_count(&self) -> u64 {
        self.hand_count
    }

    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    #[must_use]
    pub fn dealer(&self) -> Option<PlayerId> {
        self.dealer.and_then(|idx| self.order.get(idx).copied())
    }

    /// The player who must act, if betting is open.
    #[must_use]
    pub fn turn_player(&self) -> Option<PlayerId> {
        match self.round {
            Some(round) if self.started && round != Round::Showdown => {
                self.order.get(self.turn).copied()
            }
            _ => None,
        }
    }

    /// Identifies the current turn. Changes whenever the turn is handed
    /// out, even to the same player twice in a row.
    #[must_use]
    pub fn turn_token(&self) -> Option<(PlayerId, u64)> {
        self.turn_player().map(|id| (id, self.turn_seq))
    }

    /// Moves open to `id` right now. Empty unless it is their turn.
    #[must_use]
    pub fn action_choices(&self, id: PlayerId) -> Vec<ActionChoice> {
        if self.turn_player() != Some(id) {
            return Vec::new();
        }
        let Some(player) = self.players.get(&id) else {
            return Vec::new();
        };

        let owed = self.current_bet.saturating_sub(player.last_bet);
        let mut choices = vec![ActionChoice::Fold];
        if owed == 0 {
            choices.push(ActionChoice::Check);
        } else {
            choices.push(ActionChoice::Call {
                owed: owed.min(player.balance),
            });
        }
        let min = self.min_raise(player);
        if min - player.last_bet <= player.balance {
            choices.push(ActionChoice::Raise { min });
        }
        if player.balance > 0 {
            choices.push(ActionChoice::AllIn {
                amount: player.balance,
            });
        }
        choices
    }

    /// What the turn timer plays for the player on turn: a check when that
    /// costs nothing, a fold otherwise.
    #[must_use]
    pub fn timeout_action(&self) -> Option<(PlayerId, Action)> {
        let id = self.turn_player()?;
        let player = self.players.get(&id)?;
        let action = if player.last_bet >= self.current_bet {
            Action::Check
        } else {
            Action::Fold
        };
        Some((id, action))
    }

    /// Takes every notification produced since the last drain, in order.
    pub fn drain_events(&mut self) -> Vec<Envelope> {
        std::mem::take(&mut self.outbox)
    }

    // === Seating ===

    /// Seats a player, or queues them for the next hand if one is running.
    pub fn add_player(&mut self, mut player: Player) -> TableResult<()> {
        if self.has_player(player.id) || self.players.contains_key(&player.id) {
            return Err(TableError::PlayerAlreadySeated(player.id));
        }
        if self.current_players() >= self.config.max_players {
            return Err(TableError::MaxPlayers {
                max: self.config.max_players,
            });
        }
        if self.started && !self.config.enter_after_start {
            return Err(TableError::GameStarted);
        }

        if self.config.bank_amount > 0 {
            player.balance = self.config.bank_amount;
        }
        // Pots and payouts are summed in `Chips`, so the table total must fit.
        if self.chips_in_play() + u64::from(player.balance) > u64::from(Chips::MAX) {
            return Err(TableError::ChipLimit { max: Chips::MAX });
        }
        player.reset_for_hand();

        let (id, balance, queued) = (player.id, player.balance, self.started);
        if queued {
            self.queue.push(player);
        } else {
            self.order.push(id);
            self.players.insert(id, player);
        }
        debug!(
            "Table {}: player {} entered (queued: {}, balance: {})",
            self.id, id, queued, balance
        );

        self.broadcast(EventKind::PlayerEntered {
            player_id: id,
            balance,
            queued,
        });
        Ok(())
    }

    /// Every chip on the table: stacks, live bets, pots and queued players.
    fn chips_in_play(&self) -> u64 {
        let stacks: u64 = self
            .players
            .values()
            .chain(&self.queue)
            .map(|p| u64::from(p.balance) + u64::from(p.last_bet))
            .sum();
        let pots: u64 = self.pots.iter().map(|p| u64::from(p.amount)).sum();
        stacks + pots
    }

    /// Removes a player. Mid-hand the player folds at once and gives up
    /// their seat when the hand ends.
    pub fn remove_player(&mut self, id: PlayerId) -> TableResult<()> {
        if let Some(pos) = self.queue.iter().position(|p| p.id == id) {
            let player = self.queue.remove(pos);
            self.announce_departure(id, player.balance);
            return Ok(());
        }

        if !self.players.contains_key(&id) || self.leaving.contains(&id) {
            return Err(TableError::PlayerNotFound(id));
        }

        if !self.started {
            let balance = self.unseat(id).map_or(0, |p| p.balance);
            self.announce_departure(id, balance);
            return Ok(());
        }

        let was_on_turn = self.turn_player() == Some(id);
        self.leaving.insert(id);
        let balance = match self.players.get_mut(&id) {
            Some(player) => {
                player.folded = true;
                player.ready = true;
                player.balance
            }
            None => 0,
        };
        self.announce_departure(id, balance);

        if self.round != Some(Round::Showdown) && (was_on_turn || self.round_complete()) {
            self.advance();
        }
        Ok(())
    }

    // === Game flow ===

    /// Shuffles and opens a new hand.
    pub fn start_game(&mut self) -> TableResult<()> {
        if self.started {
            return Err(TableError::GameStarted);
        }

        let ante = self.config.ante;
        let have = self
            .seated()
            .chain(self.queue.iter())
            .filter(|p| p.balance > 0 && p.balance >= ante)
            .count();
        if have < 2 {
            return Err(TableError::NotEnoughPlayers { have });
        }

        self.started = true;
        self.round = None;
        self.hand_count += 1;
        self.deck.shuffle(self.seed);
        self.last_blind_increase.get_or_insert_with(Instant::now);
        info!("Table {}: hand {} started", self.id, self.hand_count);

        self.broadcast(EventKind::GameStarted {
            hand: self.hand_count,
        });
        self.new_round()
    }

    /// Closes the betting round in progress and opens the next one,
    /// cascading through rounds nobody can bet in.
    pub fn new_round(&mut self) -> TableResult<()> {
        if !self.started {
            return Err(TableError::GameNotStarted);
        }

        loop {
            let bets = create_pots(&mut self.players);
            self.pots.extend(bets);

            let next = match self.round {
                None => Round::PreFlop,
                Some(_) if self.live_count() <= 1 => Round::Showdown,
                Some(round) => round.next(),
            };
            self.round = Some(next);
            self.current_bet = 0;
            for player in self.players.values_mut() {
                player.ready = false;
            }

            match next {
                Round::PreFlop => {
                    if !self.open_hand() {
                        return Ok(());
                    }
                }
                Round::Flop | Round::Turn | Round::River => {
                    self.broadcast(EventKind::NewRound { round: next });
                    let cards = self.deck.deal(next.cards_to_deal());
                    self.community.extend_from_slice(&cards);
                    self.broadcast(EventKind::CommunityCards {
                        cards: self.community.clone(),
                    });
                }
                Round::Showdown => {
                    self.broadcast(EventKind::NewRound { round: next });
                    self.showdown();
                    return Ok(());
                }
            }

            if self.round_complete() {
                continue;
            }
            let start = self.first_to_act(next);
            if let Some(idx) = self.next_eligible(start) {
                self.give_turn(idx);
                return Ok(());
            }
        }
    }

    /// Applies a move for the player on turn. A refused move leaves the
    /// table untouched and is reported privately to the player.
    pub fn make_move(&mut self, player_id: PlayerId, action: Action) -> TableResult<()> {
        let result = self.apply_move(player_id, action);
        match &result {
            Ok(()) => self.advance(),
            Err(e) => {
                debug!("Table {}: refused {:?} from {}: {}", self.id, action, player_id, e);
                self.emit(
                    vec![player_id],
                    EventKind::BadMove {
                        reason: e.to_string(),
                    },
                );
            }
        }
        result
    }

    fn apply_move(&mut self, id: PlayerId, action: Action) -> TableResult<()> {
        if !self.started || self.round.is_none() {
            return Err(TableError::GameNotStarted);
        }
        let on_turn = self.turn_player();
        let current_bet = self.current_bet;
        let player = self
            .players
            .get(&id)
            .ok_or(TableError::PlayerNotFound(id))?;
        if on_turn != Some(id) {
            return Err(if player.folded {
                TableError::PlayerFolded
            } else {
                TableError::NotYourTurn
            });
        }
        if player.folded {
            return Err(TableError::PlayerFolded);
        }

        let owed = current_bet.saturating_sub(player.last_bet);
        let min_raise = self.min_raise(player);
        let mut reopens = false;

        // Validate everything before touching the player.
        match action {
            Action::Check if owed > 0 => return Err(TableError::CantCheck { owed }),
            Action::Raise(amount) => {
                if amount < min_raise {
                    return Err(TableError::RaiseTooSmall { min: min_raise });
                }
                let required = amount - player.last_bet;
                if required > player.balance {
                    return Err(TableError::InsufficientFunds {
                        required,
                        available: player.balance,
                    });
                }
            }
            Action::AllIn if player.balance == 0 => {
                return Err(TableError::UnexpectedAction(
                    "all-in with an empty stack".to_string(),
                ));
            }
            _ => {}
        }

        let Some(player) = self.players.get_mut(&id) else {
            return Err(TableError::PlayerNotFound(id));
        };
        match action {
            Action::Check => {}
            Action::Call => {
                player.commit(owed);
            }
            Action::Raise(amount) => {
                let delta = amount - player.last_bet;
                player.commit(delta);
                self.current_bet = amount;
                reopens = true;
            }
            Action::AllIn => {
                let stack = player.balance;
                player.commit(stack);
                if player.last_bet > self.current_bet {
                    self.current_bet = player.last_bet;
                    reopens = true;
                }
            }
            Action::Fold => player.folded = true,
        }
        player.ready = true;
        let (bet, balance) = (player.last_bet, player.balance);

        if reopens {
            for other in self.players.values_mut().filter(|p| p.id != id && !p.folded) {
                other.ready = false;
            }
        }

        debug!("Table {}: {} {}", self.id, id, action);
        self.broadcast(EventKind::Do {
            player_id: id,
            action,
            bet,
            balance,
        });
        Ok(())
    }

    /// Hands the turn on, or moves to the next round when betting is done.
    fn advance(&mut self) {
        if !self.round_complete() {
            let from = (self.turn + 1) % self.order.len().max(1);
            if let Some(idx) = self.next_eligible(from) {
                self.give_turn(idx);
                return;
            }
        }
        if let Err(e) = self.new_round() {
            error!("Table {}: could not advance round: {}", self.id, e);
        }
    }

    /// A betting round is over when at most one player is left in the
    /// hand, when everyone who can still bet has acted since the last
    /// raise, or when a lone player with chips has matched the bet.
    fn round_complete(&self) -> bool {
        let live: Vec<&Player> = self.seated().filter(|p| !p.folded).collect();
        if live.len() <= 1 {
            return true;
        }
        let with_chips: Vec<&&Player> = live.iter().filter(|p| p.balance > 0).collect();
        if with_chips.iter().all(|p| p.ready) {
            return true;
        }
        with_chips.len() <= 1 && with_chips.iter().all(|p| p.last_bet >= self.current_bet)
    }

    fn live_count(&self) -> usize {
        self.seated().filter(|p| !p.folded).count()
    }

    fn min_raise(&self, player: &Player) -> Chips {
        (self.current_bet.saturating_mul(2))
            .max(player.last_bet + 1)
            .max(1)
    }

    /// Seat index whose owner opens the betting in `round`.
    fn first_to_act(&self, round: Round) -> usize {
        let n = self.order.len().max(1);
        let dealer = self.dealer.unwrap_or(0);
        match round {
            Round::PreFlop if n == 2 => dealer,
            Round::PreFlop => (dealer + 3) % n,
            _ => (dealer + 1) % n,
        }
    }

    /// First seat from `start` onwards whose owner can still act.
    fn next_eligible(&self, start: usize) -> Option<usize> {
        let n = self.order.len();
        (0..n).map(|k| (start + k) % n).find(|&idx| {
            self.players
                .get(&self.order[idx])
                .is_some_and(|p| !p.folded && p.balance > 0 && !p.ready)
        })
    }

    fn give_turn(&mut self, idx: usize) {
        self.turn = idx;
        self.turn_seq += 1;
        let player_id = self.order[idx];
        self.broadcast(EventKind::NextMove {
            player_id,
            timeout_secs: self.config.action_timeout_secs(),
        });
        let choices = self.action_choices(player_id);
        self.emit(vec![player_id], EventKind::CanDo { choices });
    }

    /// Pre-flop setup. Returns false when too few players can pay to play,
    /// in which case the hand is called off.
    fn open_hand(&mut self) -> bool {
        for player in self.players.values_mut() {
            player.reset_for_hand();
        }
        self.community.clear();
        self.pots.clear();

        for player in std::mem::take(&mut self.queue) {
            self.order.push(player.id);
            self.players.insert(player.id, player);
        }

        let ante = self.config.ante;
        let broke: Vec<PlayerId> = self
            .seated()
            .filter(|p| p.balance == 0 || p.balance < ante)
            .map(|p| p.id)
            .collect();
        for id in broke {
            let balance = self.unseat(id).map_or(0, |p| p.balance);
            self.broadcast(EventKind::CantAnte {
                player_id: id,
                ante,
            });
            self.announce_departure(id, balance);
        }

        if self.order.len() < 2 {
            info!("Table {}: hand {} called off, not enough players", self.id, self.hand_count);
            self.started = false;
            self.round = None;
            self.broadcast(EventKind::StopGame {
                players_remaining: self.current_players(),
            });
            return false;
        }

        self.broadcast(EventKind::NewRound {
            round: Round::PreFlop,
        });

        if let (Some(interval), Some(last)) = (
            self.config.blind_increase_interval(),
            self.last_blind_increase,
        ) && last.elapsed() >= interval
        {
            self.small_blind = self.small_blind.saturating_mul(2);
            self.last_blind_increase = Some(Instant::now());
            self.broadcast(EventKind::BlindsIncreased {
                small_blind: self.small_blind,
            });
        }

        if ante > 0 {
            let mut pot = Pot::default();
            for player in self.players.values_mut() {
                player.balance -= ante;
                pot.amount += ante;
                pot.applicants.insert(player.id);
            }
            self.broadcast(EventKind::GetAnte { amount: pot.amount });
            self.pots.push(pot);
        }

        for idx in 0..self.order.len() {
            let id = self.order[idx];
            let cards = self.deck.deal(HOLE_CARDS);
            let hand = Hand([cards[0], cards[1]]);
            if let Some(player) = self.players.get_mut(&id) {
                player.hand = Some(hand);
            }
            self.emit(vec![id], EventKind::GetCards { hand });
        }

        let n = self.order.len();
        // The button sits on seat 0 before the first hand, so the first
        // dealer is the second player seated.
        let dealer = (self.dealer.unwrap_or(0) + 1) % n;
        self.dealer = Some(dealer);
        self.broadcast(EventKind::Dealer {
            player_id: self.order[dealer],
        });

        let (sb_idx, bb_idx) = if n == 2 {
            (dealer, (dealer + 1) % n)
        } else {
            ((dealer + 1) % n, (dealer + 2) % n)
        };
        let small_blind = self.small_blind;
        let big_blind = small_blind.saturating_mul(2);
        let sb = self.post_blind(sb_idx, small_blind);
        let bb = self.post_blind(bb_idx, big_blind);
        self.broadcast(EventKind::SmallBlind {
            player_id: self.order[sb_idx],
            amount: sb,
        });
        self.broadcast(EventKind::BigBlind {
            player_id: self.order[bb_idx],
            amount: bb,
        });
        self.current_bet = big_blind;
        true
    }

    fn post_blind(&mut self, idx: usize, amount: Chips) -> Chips {
        self.players
            .get_mut(&self.order[idx])
            .map_or(0, |p| p.commit(amount))
    }

    /// Pays out every pot and closes the hand.
    fn showdown(&mut self) {
        let pots = union_pots(std::mem::take(&mut self.pots));
        let live: Vec<PlayerId> = self
            .seated()
            .filter(|p| !p.folded)
            .map(|p| p.id)
            .collect();

        match live.as_slice() {
            [] => error!(
                "Table {}: showdown with nobody left in the hand, {} pots unpaid",
                self.id,
                pots.len()
            ),
            [winner] => {
                let amount: Chips = pots.iter().map(|p| p.amount).sum();
                if let Some(player) = self.players.get_mut(winner) {
                    player.balance += amount;
                }
                self.broadcast(EventKind::WinAll {
                    player_id: *winner,
                    amount,
                });
            }
            _ => {
                for pot in pots {
                    self.settle_pot(&pot, &live);
                }
            }
        }

        self.finish_hand();
    }

    fn settle_pot(&mut self, pot: &Pot, live: &[PlayerId]) {
        let mut eligible: Vec<PlayerId> = live
            .iter()
            .filter(|id| pot.applicants.contains(id))
            .copied()
            .collect();
        if eligible.is_empty() {
            eligible = live.to_vec();
        }

        let contenders: HashMap<PlayerId, &Player> = eligible
            .iter()
            .filter_map(|id| self.players.get(id).map(|p| (*id, p)))
            .collect();
        let winners: BTreeSet<PlayerId> = match determine_winner(&self.community, &contenders) {
            Ok(winners) => winners,
            Err(e) => panic!("Table {}: showdown on a broken hand: {e}", self.id),
        };

        let combination = winners
            .first()
            .and_then(|id| self.players.get(id))
            .and_then(|p| p.hand)
            .map(|hand| evaluate_hand(hand.cards(), &self.community));

        // Odd chips go one at a time, clockwise from the dealer's left.
        let n = self.order.len();
        let dealer = self.dealer.unwrap_or(0);
        let ordered: Vec<PlayerId> = (1..=n)
            .map(|k| self.order[(dealer + k) % n])
            .filter(|id| winners.contains(id))
            .collect();
        let count = ordered.len() as Chips;
        let share = pot.amount / count;
        let mut odd = pot.amount % count;
        for id in &ordered {
            let bonus = if odd > 0 {
                odd -= 1;
                1
            } else {
                0
            };
            if let Some(player) = self.players.get_mut(id) {
                player.balance += share + bonus;
            }
        }

        self.broadcast(EventKind::WinPot {
            winners: ordered,
            amount: pot.amount,
            combination,
        });
    }

    fn finish_hand(&mut self) {
        self.advance_seed();

        for id in std::mem::take(&mut self.leaving) {
            self.unseat(id);
        }

        self.started = false;
        self.round = None;
        self.current_bet = 0;
        info!("Table {}: hand {} finished", self.id, self.hand_count);

        let players = self
            .seated()
            .map(|p| PlayerStats {
                player_id: p.id,
                balance: p.balance,
            })
            .collect();
        self.broadcast(EventKind::PlayersStats { players });
        self.broadcast(EventKind::StopGame {
            players_remaining: self.current_players(),
        });
    }

    /// Moves a non-zero seed to the next non-zero value it generates, so
    /// seeded tables replay the same sequence of hands.
    fn advance_seed(&mut self) {
        if self.seed == 0 {
            return;
        }
        let mut rng = StdRng::seed_from_u64(self.seed);
        self.seed = loop {
            let next: u64 = rng.random();
            if next != 0 {
                break next;
            }
        };
    }

    /// Takes a player out of the seating order, keeping the dealer button
    /// on the same seat.
    fn unseat(&mut self, id: PlayerId) -> Option<Player> {
        let pos = self.order.iter().position(|seat| *seat == id)?;
        self.order.remove(pos);
        if let Some(dealer) = self.dealer {
            if self.order.is_empty() {
                self.dealer = None;
            } else if pos <= dealer {
                self.dealer = Some(dealer.checked_sub(1).unwrap_or(self.order.len() - 1));
            }
        }
        if pos < self.turn {
            self.turn -= 1;
        }
        self.players.remove(&id)
    }

    fn announce_departure(&mut self, id: PlayerId, balance: Chips) {
        debug!("Table {}: player {} left with {}", self.id, id, balance);
        let players_remaining = self.current_players();
        self.emit(
            self.participants_and(id),
            EventKind::PlayerLeft {
                player_id: id,
                players_remaining,
            },
        );
        self.emit(
            vec![id],
            EventKind::PlayersStats {
                players: vec![PlayerStats {
                    player_id: id,
                    balance,
                }],
            },
        );
    }

    // === Notifications ===

    /// Everyone at the table who still receives table-wide events.
    fn participants(&self) -> Vec<PlayerId> {
        self.order
            .iter()
            .filter(|id| !self.leaving.contains(id))
            .copied()
            .chain(self.queue.iter().map(|p| p.id))
            .collect()
    }

    fn participants_and(&self, id: PlayerId) -> Vec<PlayerId> {
        let mut recipients = self.participants();
        if !recipients.contains(&id) {
            recipients.push(id);
        }
        recipients
    }

    fn broadcast(&mut self, event: EventKind) {
        let recipients = self.participants();
        self.emit(recipients, event);
    }

    fn emit(&mut self, recipients: Vec<PlayerId>, event: EventKind) {
        self.outbox.push(Envelope {
            recipients,
            event: TableEvent::new(self.id, event),
        });
    }
}
