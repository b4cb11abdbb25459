//! GUI smoke tests.
//!
//! Verifies the channel plumbing and view-model flow the app is built
//! on without full UI rendering (no GPU required).

use tokio::sync::mpsc;

use solgate_session::controller::{
    create_channels, SessionCommand, SessionUpdate, CMD_CHANNEL_SIZE, UPDATE_CHANNEL_SIZE,
};
use solgate_session::view::fatal_view;

#[test]
fn channels_are_bounded() {
    let (cmd_tx, _cmd_rx, update_tx, _update_rx) = create_channels();

    // Filling the command channel beyond capacity must fail with try_send.
    for i in 0..(CMD_CHANNEL_SIZE + 40) {
        match cmd_tx.try_send(SessionCommand::Verify) {
            Ok(_) => {
                assert!(
                    i < CMD_CHANNEL_SIZE,
                    "channel should be bounded at {CMD_CHANNEL_SIZE}",
                );
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                assert!(i >= CMD_CHANNEL_SIZE, "channel full too early at {i}");
                break;
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                panic!("channel should not be closed");
            }
        }
    }

    // Same for the update channel.
    for i in 0..(UPDATE_CHANNEL_SIZE + 40) {
        let update = SessionUpdate::View(fatal_view("test"));
        match update_tx.try_send(update) {
            Ok(_) => {
                assert!(
                    i < UPDATE_CHANNEL_SIZE,
                    "update channel should be bounded at {UPDATE_CHANNEL_SIZE}",
                );
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                assert!(i >= UPDATE_CHANNEL_SIZE, "update channel full too early at {i}");
                break;
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                panic!("update channel should not be closed");
            }
        }
    }
}

#[test]
fn update_receive_is_non_blocking() {
    let (_cmd_tx, _cmd_rx, update_tx, mut update_rx) = create_channels();

    // try_recv on an empty channel returns Empty, never blocks.
    match update_rx.try_recv() {
        Err(mpsc::error::TryRecvError::Empty) => {}
        other => panic!("expected TryRecvError::Empty, got {other:?}"),
    }

    let _ = update_tx.try_send(SessionUpdate::Closed);
    match update_rx.try_recv() {
        Ok(SessionUpdate::Closed) => {}
        other => panic!("expected Closed, got {other:?}"),
    }
}

#[test]
fn commands_round_trip_through_the_channel() {
    let (cmd_tx, mut cmd_rx, _update_tx, _update_rx) = create_channels();

    cmd_tx
        .try_send(SessionCommand::Connect { adapter: 1 })
        .expect("send");

    match cmd_rx.try_recv() {
        Ok(SessionCommand::Connect { adapter }) => assert_eq!(adapter, 1),
        other => panic!("expected Connect, got {other:?}"),
    }
}

#[test]
fn fatal_views_render_terminal() {
    let v = fatal_view("config missing");
    assert!(v.terminal);
    assert!(v.controls.is_empty());
}

#[test]
fn short_address_is_display_safe() {
    let s = "4vJ9JU1bJJE96FWSJKvHsmmFADCg4gpZQff4P3bkLKi";
    let short = solgate_gui::theme::short_address(s);
    assert!(short.len() <= 12);
    assert!(short.contains('…'));
}
