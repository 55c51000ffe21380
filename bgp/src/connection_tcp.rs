// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::connection::BgpConnection;
use crate::error::Error;
use crate::messages::{Header, Message};
use crate::session::FsmEvent;
use rdb::lock;
use slog::{info, trace, warn, Logger};
use std::io::{ErrorKind, Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};
use std::thread::spawn;
use std::time::Duration;

/// Read timeout on the stream. Short so the reader notices the `dropped`
/// flag promptly; session liveness is the hold timer's job.
const READ_POLL: Duration = Duration::from_millis(100);

#[derive(Clone)]
pub struct BgpConnectionTcp {
    peer: SocketAddr,
    conn: Arc<Mutex<Option<TcpStream>>>,
    dropped: Arc<AtomicBool>,
    log: Logger,
}

impl BgpConnection for BgpConnectionTcp {
    fn new(peer: SocketAddr, log: Logger) -> Self {
        Self {
            peer,
            conn: Arc::new(Mutex::new(None)),
            dropped: Arc::new(AtomicBool::new(false)),
            log,
        }
    }

    fn connect(
        &self,
        event_tx: Sender<FsmEvent>,
        timeout: Duration,
    ) -> Result<(), Error> {
        let new_conn = TcpStream::connect_timeout(&self.peer, timeout)?;
        lock!(self.conn).replace(new_conn.try_clone()?);

        Self::recv(
            self.peer,
            event_tx.clone(),
            new_conn,
            self.dropped.clone(),
            self.log.clone(),
        )?;

        event_tx.send(FsmEvent::TcpConnectionConfirmed).map_err(|e| {
            Error::ChannelSend(format!("tcp connection confirmed: {e}"))
        })
    }

    fn send(&self, msg: Message) -> Result<(), Error> {
        let mut guard = lock!(self.conn);
        match *guard {
            Some(ref mut stream) => Self::send_msg(stream, &self.log, msg),
            None => Err(Error::NotConnected),
        }
    }

    fn peer(&self) -> SocketAddr {
        self.peer
    }
}

impl Drop for BgpConnectionTcp {
    fn drop(&mut self) {
        self.dropped.store(true, Ordering::Relaxed);
    }
}

impl BgpConnectionTcp {
    fn recv(
        peer: SocketAddr,
        event_tx: Sender<FsmEvent>,
        mut conn: TcpStream,
        dropped: Arc<AtomicBool>,
        log: Logger,
    ) -> Result<(), Error> {
        conn.set_read_timeout(Some(READ_POLL))?;

        info!(log, "[{peer}] spawning recv loop");

        spawn(move || loop {
            if dropped.load(Ordering::Relaxed) {
                break;
            }
            match Self::recv_msg(&mut conn, &dropped) {
                Ok(msg) => {
                    trace!(log, "[{peer}] recv: {msg:?}");
                    if event_tx.send(FsmEvent::Message(msg)).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    if !dropped.load(Ordering::Relaxed) {
                        warn!(log, "[{peer}] recv: {e}");
                    }
                    break;
                }
            }
        });

        Ok(())
    }

    /// Read exactly `buf.len()` bytes, riding out read timeouts so the
    /// `dropped` flag gets polled.
    fn read_full(
        stream: &mut TcpStream,
        buf: &mut [u8],
        dropped: &Arc<AtomicBool>,
    ) -> Result<(), Error> {
        let mut i = 0;
        while i < buf.len() {
            if dropped.load(Ordering::Relaxed) {
                return Err(Error::Disconnected);
            }
            match stream.read(&mut buf[i..]) {
                Ok(0) => return Err(Error::Disconnected),
                Ok(n) => i += n,
                Err(e)
                    if e.kind() == ErrorKind::WouldBlock
                        || e.kind() == ErrorKind::TimedOut =>
                {
                    continue
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    fn recv_msg(
        stream: &mut TcpStream,
        dropped: &Arc<AtomicBool>,
    ) -> Result<Message, Error> {
        let mut buf = [0u8; Header::WIRE_SIZE];
        Self::read_full(stream, &mut buf, dropped)?;
        let hdr = Header::from_wire(&buf)?;

        let mut body = vec![0u8; usize::from(hdr.length) - Header::WIRE_SIZE];
        Self::read_full(stream, &mut body, dropped)?;

        Message::from_wire(hdr.typ, &body)
    }

    fn send_msg(
        stream: &mut TcpStream,
        log: &Logger,
        msg: Message,
    ) -> Result<(), Error> {
        trace!(log, "sending {msg:?}");
        let body = msg.to_wire()?;
        let header = Header::new(
            (body.len() + Header::WIRE_SIZE)
                .try_into()
                .map_err(|_| Error::TooLarge("message".into()))?,
            msg.typ(),
        )?;
        let mut buf = header.to_wire();
        buf.extend_from_slice(&body);
        stream.write_all(&buf)?;
        Ok(())
    }
}
