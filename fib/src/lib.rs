// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The forwarding lower half: observes one RIB and keeps the kernel
//! forwarding table converged with it through the platform's route
//! command. Failures to program the kernel are logged and swallowed; FIB
//! drift is tolerable, session liveness is not.

use rdb::{lock, Prefix, Rib, RibEntry};
use slog::{error, info, Logger};
use std::collections::BTreeSet;
use std::net::IpAddr;
use std::sync::{Arc, Mutex};

pub mod iproute;

mod error;
pub use error::Error;

/// Where kernel routes actually get programmed. The production
/// implementation is [`iproute::IpRoute`]; tests substitute a recorder.
pub trait RoutePlatform: Send + Sync + 'static {
    fn add(&self, prefix: &Prefix, next_hop: &IpAddr) -> Result<(), Error>;
    fn del(&self, prefix: &Prefix) -> Result<(), Error>;
}

/// Synchronizes one RIB into the kernel FIB. Registered as a RIB observer
/// on construction; `managed` tracks exactly the prefixes this syncer has
/// programmed, so teardown and replacement never touch foreign routes.
pub struct FibSync {
    rib: Rib,
    platform: Arc<dyn RoutePlatform>,
    managed: Arc<Mutex<BTreeSet<Prefix>>>,
    update_slot: usize,
    remove_slot: usize,
    log: Logger,
}

impl FibSync {
    pub fn new(
        rib: Rib,
        platform: Arc<dyn RoutePlatform>,
        log: Logger,
    ) -> Self {
        let managed = Arc::new(Mutex::new(BTreeSet::new()));

        let m = managed.clone();
        let p = platform.clone();
        let lg = log.clone();
        let update_slot = rib.on_update(Box::new(move |prev, curr| {
            on_update(&m, p.as_ref(), &lg, prev, curr);
        }));

        let m = managed.clone();
        let p = platform.clone();
        let lg = log.clone();
        let remove_slot = rib.on_remove(Box::new(move |e| {
            on_remove(&m, p.as_ref(), &lg, e);
        }));

        Self {
            rib,
            platform,
            managed,
            update_slot,
            remove_slot,
            log,
        }
    }

    /// The prefixes currently programmed into the kernel by this syncer.
    pub fn managed(&self) -> BTreeSet<Prefix> {
        lock!(self.managed).clone()
    }

    /// Delete every route this syncer has programmed. Used on shutdown so
    /// the kernel does not keep forwarding through a dead speaker.
    pub fn cleanup(&self) {
        let mut managed = lock!(self.managed);
        for prefix in managed.iter() {
            if let Err(e) = self.platform.del(prefix) {
                error!(self.log, "cleaning fib route {prefix}: {e}");
            }
        }
        managed.clear();
    }
}

impl Drop for FibSync {
    fn drop(&mut self) {
        self.rib.unregister_on_update(self.update_slot);
        self.rib.unregister_on_remove(self.remove_slot);
    }
}

fn on_update(
    managed: &Mutex<BTreeSet<Prefix>>,
    platform: &dyn RoutePlatform,
    log: &Logger,
    prev: Option<&RibEntry>,
    curr: &RibEntry,
) {
    let mut managed = lock!(managed);

    if let Some(prev) = prev {
        if managed.remove(&prev.prefix) {
            if let Err(e) = platform.del(&prev.prefix) {
                error!(log, "fib del {}: {e}", prev.prefix);
            }
        }
    }

    let Some(next_hop) = curr.next_hop else {
        return;
    };
    match platform.add(&curr.prefix, &next_hop) {
        Ok(()) => {
            managed.insert(curr.prefix);
            info!(log, "fib add {} via {next_hop}", curr.prefix);
        }
        Err(e) => error!(log, "fib add {}: {e}", curr.prefix),
    }
}

fn on_remove(
    managed: &Mutex<BTreeSet<Prefix>>,
    platform: &dyn RoutePlatform,
    log: &Logger,
    e: &RibEntry,
) {
    let mut managed = lock!(managed);
    if managed.remove(&e.prefix) {
        if let Err(err) = platform.del(&e.prefix) {
            error!(log, "fib del {}: {err}", e.prefix);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;
    use rdb::{AddressFamily, AsPath, PathOrigin};

    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<String>>,
    }

    impl RoutePlatform for Recorder {
        fn add(&self, prefix: &Prefix, next_hop: &IpAddr) -> Result<(), Error> {
            lock!(self.calls).push(format!("add {prefix} via {next_hop}"));
            Ok(())
        }

        fn del(&self, prefix: &Prefix) -> Result<(), Error> {
            lock!(self.calls).push(format!("del {prefix}"));
            Ok(())
        }
    }

    fn entry(prefix: &str, next_hop: Option<&str>) -> RibEntry {
        RibEntry {
            af: AddressFamily::Ipv4Unicast,
            prefix: prefix.parse().unwrap(),
            origin: PathOrigin::Igp,
            as_path: AsPath::default(),
            next_hop: next_hop.map(|s| s.parse().unwrap()),
            other_attributes: vec![],
            vpn: None,
            source: None,
        }
    }

    fn test_logger() -> Logger {
        Logger::root(slog::Discard, slog::o!())
    }

    #[test]
    fn route_lifecycle() {
        let rib = Rib::new();
        let platform = Arc::new(Recorder::default());
        let sync = FibSync::new(rib.clone(), platform.clone(), test_logger());

        // add
        rib.update(entry("10.4.0.0/24", Some("192.0.2.1")));
        assert_eq!(
            *lock!(platform.calls),
            vec!["add 10.4.0.0/24 via 192.0.2.1"]
        );
        assert!(sync.managed().contains(&"10.4.0.0/24".parse().unwrap()));

        // replace: old route deleted, new one added
        rib.update(entry("10.4.0.0/24", Some("192.0.2.2")));
        assert_eq!(
            *lock!(platform.calls),
            vec![
                "add 10.4.0.0/24 via 192.0.2.1",
                "del 10.4.0.0/24",
                "add 10.4.0.0/24 via 192.0.2.2",
            ]
        );

        // remove
        let e = rib.find(&"10.4.0.0/24".parse().unwrap()).unwrap();
        rib.remove(&e);
        assert_eq!(
            lock!(platform.calls).last().unwrap(),
            "del 10.4.0.0/24"
        );
        assert!(sync.managed().is_empty());
    }

    #[test]
    fn entries_without_next_hop_are_not_programmed() {
        let rib = Rib::new();
        let platform = Arc::new(Recorder::default());
        let sync = FibSync::new(rib.clone(), platform.clone(), test_logger());

        rib.update(entry("10.1.0.0/24", None));
        assert!(lock!(platform.calls).is_empty());
        assert!(sync.managed().is_empty());

        // removing an unmanaged entry issues no delete
        let e = rib.find(&"10.1.0.0/24".parse().unwrap()).unwrap();
        rib.remove(&e);
        assert!(lock!(platform.calls).is_empty());
    }

    #[test]
    fn cleanup_deletes_only_managed_routes() {
        let rib = Rib::new();
        let platform = Arc::new(Recorder::default());
        let sync = FibSync::new(rib.clone(), platform.clone(), test_logger());

        rib.update(entry("10.4.0.0/24", Some("192.0.2.1")));
        rib.update(entry("10.5.0.0/24", None));

        sync.cleanup();
        assert_eq!(
            lock!(platform.calls).last().unwrap(),
            "del 10.4.0.0/24"
        );
        assert!(sync.managed().is_empty());
    }

    #[test]
    fn detaches_on_drop() {
        let rib = Rib::new();
        let platform = Arc::new(Recorder::default());
        let sync = FibSync::new(rib.clone(), platform.clone(), test_logger());
        drop(sync);

        rib.update(entry("10.4.0.0/24", Some("192.0.2.1")));
        assert!(lock!(platform.calls).is_empty());
    }

    #[test]
    fn failed_adds_are_not_marked_managed() {
        struct Failing;
        impl RoutePlatform for Failing {
            fn add(&self, _: &Prefix, _: &IpAddr) -> Result<(), Error> {
                Err(Error::Command("ip route: exit status 2".into()))
            }
            fn del(&self, _: &Prefix) -> Result<(), Error> {
                Ok(())
            }
        }

        let rib = Rib::new();
        let sync =
            FibSync::new(rib.clone(), Arc::new(Failing), test_logger());
        rib.update(entry("10.4.0.0/24", Some("192.0.2.1")));
        assert!(sync.managed().is_empty());
    }
}
