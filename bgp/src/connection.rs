// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::error::Error;
use crate::messages::Message;
use crate::session::FsmEvent;
use slog::Logger;
use std::net::SocketAddr;
use std::sync::mpsc::Sender;
use std::time::Duration;

/// An outbound transport connection to a BGP peer. The production
/// implementation is [`crate::connection_tcp::BgpConnectionTcp`]; tests use
/// a channel-backed implementation so the state machine can be exercised
/// without a network.
///
/// Implementations own their reader: once `connect` succeeds they must push
/// every decoded inbound message onto the supplied event channel as
/// [`FsmEvent::Message`], and must send [`FsmEvent::TcpConnectionConfirmed`]
/// when the connection completes. The session's main loop is the only
/// caller of `send`.
pub trait BgpConnection: Send + 'static {
    fn new(peer: SocketAddr, log: Logger) -> Self
    where
        Self: Sized;

    /// Connect to the peer, blocking for at most `timeout`.
    fn connect(
        &self,
        event_tx: Sender<FsmEvent>,
        timeout: Duration,
    ) -> Result<(), Error>;

    fn send(&self, msg: Message) -> Result<(), Error>;

    fn peer(&self) -> SocketAddr;
}
