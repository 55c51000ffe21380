// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Kernel route programming through the Linux `ip route` command. Each
//! invocation is a short-lived synchronous child process.

use crate::{Error, RoutePlatform};
use rdb::Prefix;
use slog::{info, Logger};
use std::net::IpAddr;
use std::process::Command;

pub struct IpRoute {
    log: Logger,
}

impl IpRoute {
    pub fn new(log: Logger) -> Self {
        Self { log }
    }

    fn run(&self, args: &[&str]) -> Result<(), Error> {
        info!(self.log, "execute: ip route {}", args.join(" "));
        let out = Command::new("ip").arg("route").args(args).output()?;
        if !out.stdout.is_empty() || !out.stderr.is_empty() {
            info!(
                self.log,
                "ip route: {}{}",
                String::from_utf8_lossy(&out.stdout),
                String::from_utf8_lossy(&out.stderr),
            );
        }
        if !out.status.success() {
            return Err(Error::Command(format!(
                "ip route {}: {}",
                args.join(" "),
                out.status,
            )));
        }
        Ok(())
    }
}

impl RoutePlatform for IpRoute {
    fn add(&self, prefix: &Prefix, next_hop: &IpAddr) -> Result<(), Error> {
        self.run(&[
            "add",
            &prefix.to_string(),
            "via",
            &next_hop.to_string(),
        ])
    }

    fn del(&self, prefix: &Prefix) -> Result<(), Error> {
        self.run(&["del", &prefix.to_string()])
    }
}
