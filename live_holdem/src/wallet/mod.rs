//! Wallet module: where chip counts go once a hand is settled.
//!
//! This module implements:
//! - `BalanceUpdater`, the persistence seam the engine writes through
//! - `InMemoryWallet`, a process-local store
//! - `BalanceObserver`, which turns `players-stats` events into updates
//!
//! ## Example
//!
//! ```no_run
//! use live_holdem::wallet::{BalanceUpdater, InMemoryWallet};
//! use uuid::Uuid;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let wallet = InMemoryWallet::new();
//!     let player = Uuid::new_v4();
//!     wallet.update_balances(&[player], &[1500]).await?;
//!     println!("Balance: {}", wallet.balance(player).await?);
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod observer;
pub mod updater;

pub use errors::{WalletError, WalletResult};
pub use observer::BalanceObserver;
pub use updater::{BalanceUpdater, InMemoryWallet};
