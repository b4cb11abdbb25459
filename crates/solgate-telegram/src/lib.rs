//! Telegram Mini-App host bridge.
//!
//! Implements the [`solgate_types::HostBridge`] contract on top of the
//! launch payload Telegram hands to a Mini-App: the init-data query
//! string carrying the invoking user, plus the `ready`/`expand`/`close`
//! window lifecycle.

pub mod host;
pub mod init_data;

pub use host::TelegramHost;
pub use init_data::InitData;
