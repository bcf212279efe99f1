//! Telegram delivery of appointment lifecycle notifications.
//!
//! [`TelegramNotifier`] implements the core `Notifier` seam. Each dispatch is
//! spawned onto the Tokio runtime; the booking flow never waits for Telegram
//! and never sees its failures.

pub mod config;
pub mod messages;
pub mod notifier;

pub use config::TelegramConfig;
pub use notifier::TelegramNotifier;
