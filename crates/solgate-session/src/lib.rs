//! Session controller for the Solgate NFT gate.
//!
//! The controller owns the single [`Session`], wires wallet-adapter
//! lifecycle events, issues the one verification round trip, and
//! re-renders the view on every state change. Everything else in the
//! workspace is a collaborator it consumes through a trait: the config
//! provider, the host bridge, the adapter factory, and the verification
//! backend.

pub mod controller;
pub mod session;
pub mod verify;
pub mod view;

pub use controller::{
    create_channels, run_session, SessionCommand, SessionController, SessionUpdate, CLOSE_DELAY,
    CMD_CHANNEL_SIZE, UPDATE_CHANNEL_SIZE,
};
pub use session::Session;
pub use verify::{HttpVerifier, VerifyBackend, VerifyOutcome};
pub use view::{fatal_view, view, Control, GateView};
