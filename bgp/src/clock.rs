// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::session::FsmEvent;
use rdb::lock;
use slog::{error, Logger};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};
use std::thread::{sleep, spawn, JoinHandle};
use std::time::Duration;

/// The clock drives the session's liveness timers. A single thread ticks
/// all timers at the clock's resolution and pushes expiry events onto the
/// session's event queue. Timers start out disabled; the session enables
/// them when it reaches Established.
#[derive(Clone)]
pub struct Clock {
    pub resolution: Duration,
    pub timers: Arc<ClockTimers>,
    pub join_handle: Arc<JoinHandle<()>>,

    shutdown: Arc<AtomicBool>,
}

pub struct ClockTimers {
    /// How long to keep the session alive between keepalive, update and/or
    /// notification messages from the peer.
    pub hold_timer: Timer,

    /// Time between sending keepalive messages.
    pub keepalive_timer: Timer,
}

impl Clock {
    pub fn new(
        resolution: Duration,
        keepalive_interval: Duration,
        hold_interval: Duration,
        s: Sender<FsmEvent>,
        log: Logger,
    ) -> Self {
        let shutdown = Arc::new(AtomicBool::new(false));
        let timers = Arc::new(ClockTimers {
            hold_timer: Timer::new(hold_interval),
            keepalive_timer: Timer::new(keepalive_interval),
        });
        let join_handle = Arc::new(Self::run(
            resolution,
            timers.clone(),
            s,
            shutdown.clone(),
            log,
        ));
        Self {
            resolution,
            timers,
            join_handle,
            shutdown,
        }
    }

    fn run(
        resolution: Duration,
        timers: Arc<ClockTimers>,
        s: Sender<FsmEvent>,
        shutdown: Arc<AtomicBool>,
        log: Logger,
    ) -> JoinHandle<()> {
        spawn(move || loop {
            if shutdown.load(Ordering::Relaxed) {
                return;
            }
            Self::step(
                resolution,
                &timers.hold_timer,
                FsmEvent::HoldTimerExpires,
                &s,
                &log,
            );
            Self::step(
                resolution,
                &timers.keepalive_timer,
                FsmEvent::KeepaliveTimerExpires,
                &s,
                &log,
            );
            sleep(resolution);
        })
    }

    fn step(
        resolution: Duration,
        t: &Timer,
        event: FsmEvent,
        s: &Sender<FsmEvent>,
        log: &Logger,
    ) {
        t.tick(resolution);
        if t.expired() {
            if let Err(e) = s.send(event.clone()) {
                error!(log, "send timer event {}: {e}", event.title());
            }
            t.reset();
        }
    }
}

impl Drop for Clock {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }
}

/// A countdown timer ticked by the clock thread.
#[derive(Clone)]
pub struct Timer {
    /// How long the timer runs until it fires.
    pub interval: Duration,

    /// Whether the timer is enabled, and how much time is left.
    value: Arc<Mutex<(bool, Duration)>>,
}

impl Timer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            value: Arc::new(Mutex::new((false, interval))),
        }
    }

    /// Tick the timer down by the given resolution. Saturating, so ticking
    /// an expired timer is a no-op. Disabled timers do not tick.
    pub fn tick(&self, resolution: Duration) {
        let mut value = lock!(self.value);
        if value.0 {
            value.1 = value.1.saturating_sub(resolution);
        }
    }

    pub fn enabled(&self) -> bool {
        lock!(self.value).0
    }

    /// Enable the timer. Only enabled timers tick and expire.
    pub fn enable(&self) {
        lock!(self.value).0 = true
    }

    pub fn disable(&self) {
        lock!(self.value).0 = false
    }

    /// True once an enabled timer has ticked down to zero.
    pub fn expired(&self) -> bool {
        let v = lock!(self.value);
        v.0 && v.1.is_zero()
    }

    /// Rewind the timer to its full interval.
    pub fn reset(&self) {
        lock!(self.value).1 = self.interval;
    }
}
