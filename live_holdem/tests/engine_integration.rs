/// Integration tests for the engine facade
///
/// These run real table actors and the lobby scheduler on a paused tokio
/// clock, so timers fire in virtual time.
use live_holdem::{
    HoldemEngine, TableError,
    game::{entities::Round, events::TableEvent},
    lobby::LobbySettings,
    table::{TableConfig, TableSpeed},
    wallet::{InMemoryWallet, WalletError},
};
use std::{sync::Arc, time::Duration};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

fn untimed() -> TableConfig {
    TableConfig {
        speed: TableSpeed::Untimed,
        ..TableConfig::default()
    }
}

fn engine() -> (HoldemEngine, Arc<InMemoryWallet>) {
    let wallet = Arc::new(InMemoryWallet::new());
    let engine = HoldemEngine::new(wallet.clone(), LobbySettings::default());
    (engine, wallet)
}

/// Waits for the next event of the given type, skipping everything before it.
async fn next_of_type(rx: &mut mpsc::Receiver<TableEvent>, event_type: &str) -> TableEvent {
    tokio::time::timeout(Duration::from_secs(120), async {
        loop {
            let event = rx.recv().await.expect("session closed");
            if event.event_type() == event_type {
                return event;
            }
        }
    })
    .await
    .expect("timed out waiting for event")
}

fn drain(rx: &mut mpsc::Receiver<TableEvent>) -> Vec<TableEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[tokio::test(start_paused = true)]
async fn test_scheduler_deals_once_enough_players_sit() {
    let (engine, _) = engine();
    let table_id = engine.create_table(untimed(), None).await.unwrap();
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
    let mut rx_a = engine.connect(a);

    engine.add_player(table_id, a, 1000).await.unwrap();
    engine.add_player(table_id, b, 1000).await.unwrap();
    assert_eq!(engine.lobby().lobby(table_id).unwrap().players, 2);

    let shutdown = CancellationToken::new();
    let scheduler = engine.spawn_scheduler(shutdown.clone());

    let started = next_of_type(&mut rx_a, "game-started").await;
    assert_eq!(started.table_id, table_id);

    let summary = engine.get_table(table_id).await.unwrap();
    assert!(summary.started);
    assert_eq!(summary.hand_count, 1);
    assert_eq!(summary.round, Some(Round::PreFlop));
    assert!(engine.lobby().lobby(table_id).unwrap().started);

    shutdown.cancel();
    scheduler.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_scheduler_closes_abandoned_table() {
    let (engine, _) = engine();
    let table_id = engine.create_table(untimed(), None).await.unwrap();

    let shutdown = CancellationToken::new();
    let scheduler = engine.spawn_scheduler(shutdown.clone());

    tokio::time::sleep(Duration::from_secs(32)).await;

    assert_eq!(
        engine.get_table(table_id).await.unwrap_err(),
        TableError::TableNotFound(table_id)
    );
    assert_eq!(engine.lobby().tracked(), 0);
    assert!(engine.list_tables(0).await.is_empty());

    shutdown.cancel();
    scheduler.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_submit_move_parses_client_actions() {
    let (engine, _) = engine();
    let table_id = engine.create_table(untimed(), None).await.unwrap();
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
    engine.add_player(table_id, a, 1000).await.unwrap();
    engine.add_player(table_id, b, 1000).await.unwrap();
    engine.start_game(table_id).await.unwrap();

    assert!(matches!(
        engine.submit_move(b, table_id, "dance", 0).await,
        Err(TableError::UnexpectedAction(_))
    ));

    // The second seat deals and acts first heads-up.
    engine.submit_move(b, table_id, "raise", 400).await.unwrap();
    let summary = engine.get_table(table_id).await.unwrap();
    assert_eq!(summary.current_bet, 400);
    assert_eq!(summary.turn, Some(a));

    engine.submit_move(a, table_id, "call", 0).await.unwrap();
    let summary = engine.get_table(table_id).await.unwrap();
    assert_eq!(summary.round, Some(Round::Flop));
    assert_eq!(summary.community.len(), 3);
    assert_eq!(summary.pot_total, 800);

    let missing = Uuid::new_v4();
    assert_eq!(
        engine.submit_move(a, missing, "check", 0).await,
        Err(TableError::TableNotFound(missing))
    );
}

#[tokio::test(start_paused = true)]
async fn test_refused_move_reaches_only_the_mover() {
    let (engine, _) = engine();
    let table_id = engine.create_table(untimed(), None).await.unwrap();
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
    let mut rx_a = engine.connect(a);
    let mut rx_b = engine.connect(b);
    engine.add_player(table_id, a, 1000).await.unwrap();
    engine.add_player(table_id, b, 1000).await.unwrap();
    engine.start_game(table_id).await.unwrap();
    engine.get_table(table_id).await.unwrap();
    drain(&mut rx_a);
    drain(&mut rx_b);

    assert_eq!(
        engine.submit_move(a, table_id, "check", 0).await,
        Err(TableError::NotYourTurn)
    );
    // A round trip so everything the move produced has been published.
    engine.get_table(table_id).await.unwrap();

    let to_a = drain(&mut rx_a);
    assert_eq!(to_a.len(), 1);
    assert_eq!(to_a[0].event_type(), "bad-move");
    assert!(drain(&mut rx_b).is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_disconnect_mid_hand_settles_balances() {
    let (engine, wallet) = engine();
    let table_id = engine.create_table(untimed(), None).await.unwrap();
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
    let mut rx_a = engine.connect(a);
    engine.add_player(table_id, a, 1000).await.unwrap();
    engine.add_player(table_id, b, 1000).await.unwrap();
    engine.start_game(table_id).await.unwrap();

    // The dealer walks away after posting the small blind.
    engine.disconnect(b).await;

    assert_eq!(
        engine.get_table_by_player(b).await.unwrap_err(),
        TableError::PlayerNotFound(b)
    );
    let summary = engine.get_table_by_player(a).await.unwrap();
    assert_eq!(summary.table_id, table_id);
    assert_eq!(summary.current_players, 1);
    assert!(!summary.started);

    let left = next_of_type(&mut rx_a, "player-left").await;
    assert_eq!(left.table_id, table_id);
    next_of_type(&mut rx_a, "win-all").await;

    // Let the wallet worker catch up.
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(wallet.balance(a).await.unwrap(), 1050);
    assert_eq!(wallet.balance(b).await.unwrap(), 950);
    assert!(matches!(
        wallet.balance(Uuid::new_v4()).await,
        Err(WalletError::UnknownPlayer(_))
    ));
}

#[tokio::test(start_paused = true)]
async fn test_leave_and_close() {
    let (engine, _) = engine();
    let table_id = engine.create_table(untimed(), None).await.unwrap();
    let a = Uuid::new_v4();
    engine.add_player(table_id, a, 500).await.unwrap();
    engine.leave(table_id, a).await.unwrap();
    assert_eq!(
        engine.leave(table_id, a).await,
        Err(TableError::PlayerNotFound(a))
    );

    // The player-left event resyncs the lobby's head count.
    engine.get_table(table_id).await.unwrap();
    assert_eq!(engine.lobby().lobby(table_id).unwrap().players, 0);

    engine.close_table(table_id).await.unwrap();
    assert!(engine.lobby().lobby(table_id).is_none());
    assert_eq!(
        engine.close_table(table_id).await,
        Err(TableError::TableNotFound(table_id))
    );
}

#[tokio::test(start_paused = true)]
async fn test_timed_table_folds_idle_player() {
    let (engine, _) = engine();
    let config = TableConfig {
        speed: TableSpeed::Hyper,
        ..TableConfig::default()
    };
    let table_id = engine.create_table(config, None).await.unwrap();
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
    let mut rx_b = engine.connect(b);
    engine.add_player(table_id, a, 1000).await.unwrap();
    engine.add_player(table_id, b, 1000).await.unwrap();
    engine.start_game(table_id).await.unwrap();

    // The dealer owes the rest of the big blind, so the timer folds them.
    let win = next_of_type(&mut rx_b, "win-all").await;
    assert_eq!(win.table_id, table_id);
    let summary = engine.get_table(table_id).await.unwrap();
    assert!(!summary.started);
}
