// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Test-only plumbing: a [`BgpConnection`] implementation over in-process
//! channels so the state machine in `session.rs` can be exercised against a
//! scripted remote peer with no network underneath. Only compiled under
//! `#[cfg(test)]`.

use crate::connection::BgpConnection;
use crate::error::Error;
use crate::messages::Message;
use crate::session::FsmEvent;
use rdb::lock;
use slog::{debug, error, Logger};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::spawn;
use std::time::Duration;

lazy_static! {
    static ref NET: Network = Network::new();
}

/// A simulated network mapping socket addresses to listeners.
pub struct Network {
    endpoints: Mutex<HashMap<SocketAddr, Sender<Endpoint<Message>>>>,
}

impl Network {
    fn new() -> Self {
        Self {
            endpoints: Mutex::new(HashMap::new()),
        }
    }

    fn bind(&self, sa: SocketAddr) -> Listener {
        let (tx, rx) = mpsc::channel();
        lock!(self.endpoints).insert(sa, tx);
        Listener { rx }
    }

    fn connect(
        &self,
        to: SocketAddr,
        ep: Endpoint<Message>,
    ) -> Result<(), Error> {
        match lock!(self.endpoints).get(&to) {
            None => Err(Error::ChannelConnect),
            Some(sender) => sender
                .send(ep)
                .map_err(|e| Error::ChannelSend(e.to_string())),
        }
    }
}

/// Listen on the simulated network. The returned listener plays the remote
/// peer: each accepted endpoint exchanges [`Message`] values with one
/// session under test.
pub fn bind(addr: &str) -> Listener {
    NET.bind(addr.parse().expect("bind address"))
}

pub struct Listener {
    rx: Receiver<Endpoint<Message>>,
}

impl Listener {
    pub fn accept(
        &self,
        timeout: Duration,
    ) -> Result<Endpoint<Message>, Error> {
        self.rx.recv_timeout(timeout).map_err(|e| match e {
            RecvTimeoutError::Timeout => Error::Timeout,
            RecvTimeoutError::Disconnected => Error::Disconnected,
        })
    }
}

#[derive(Clone)]
pub struct BgpConnectionChannel {
    peer: SocketAddr,
    conn_tx: Arc<Mutex<Option<Sender<Message>>>>,
    log: Logger,
}

impl BgpConnection for BgpConnectionChannel {
    fn new(peer: SocketAddr, log: Logger) -> Self {
        Self {
            peer,
            conn_tx: Arc::new(Mutex::new(None)),
            log,
        }
    }

    fn connect(
        &self,
        event_tx: Sender<FsmEvent>,
        _timeout: Duration,
    ) -> Result<(), Error> {
        debug!(self.log, "[{}] connecting", self.peer);
        let (local, remote) = channel();
        NET.connect(self.peer, remote)?;
        lock!(self.conn_tx).replace(local.tx);
        Self::recv(self.peer, local.rx, event_tx.clone(), self.log.clone());
        event_tx.send(FsmEvent::TcpConnectionConfirmed).map_err(|e| {
            Error::ChannelSend(format!("tcp connection confirmed: {e}"))
        })
    }

    fn send(&self, msg: Message) -> Result<(), Error> {
        match *lock!(self.conn_tx) {
            Some(ref ch) => {
                ch.send(msg).map_err(|e| Error::ChannelSend(e.to_string()))
            }
            None => Err(Error::NotConnected),
        }
    }

    fn peer(&self) -> SocketAddr {
        self.peer
    }
}

impl BgpConnectionChannel {
    fn recv(
        peer: SocketAddr,
        rx: Receiver<Message>,
        event_tx: Sender<FsmEvent>,
        log: Logger,
    ) {
        spawn(move || loop {
            match rx.recv() {
                Ok(msg) => {
                    debug!(log, "[{peer}] recv: {msg:?}");
                    if let Err(e) = event_tx.send(FsmEvent::Message(msg)) {
                        error!(log, "[{peer}] send fsm event: {e}");
                        break;
                    }
                }
                Err(_) => break,
            }
        });
    }
}

/// A combined (duplex) mpsc sender/receiver.
pub struct Endpoint<T> {
    pub rx: Receiver<T>,
    pub tx: Sender<T>,
}

impl<T> Endpoint<T> {
    fn new(rx: Receiver<T>, tx: Sender<T>) -> Self {
        Self { rx, tx }
    }
}

/// Analogous to std::sync::mpsc::channel for bidirectional endpoints.
pub fn channel<T>() -> (Endpoint<T>, Endpoint<T>) {
    let (tx_a, rx_b) = mpsc::channel();
    let (tx_b, rx_a) = mpsc::channel();
    (Endpoint::new(rx_a, tx_a), Endpoint::new(rx_b, tx_b))
}
