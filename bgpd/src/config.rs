// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Daemon configuration: a JSON file naming the locally originated
//! networks and the one neighbor to peer with, or a legacy environment
//! bootstrap when no file is given.

use anyhow::{anyhow, bail, Context, Result};
use rdb::{AddressFamily, Prefix};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::net::{IpAddr, Ipv4Addr};
use std::path::Path;

const DEFAULT_HOLD_TIME: u16 = 180;

/// Clock resolution handed to the session, in milliseconds.
const DEFAULT_RESOLUTION: u64 = 100;

#[derive(Debug, Clone)]
pub struct Config {
    /// Locally originated networks seeded into the RIBs at startup.
    pub networks: Vec<Prefix>,

    pub asn: u16,
    pub router_id: Ipv4Addr,
    pub neighbor: IpAddr,
    pub hold_time: u16,
    pub resolution: u64,

    /// Configured address families and the next hop to advertise for each.
    pub families: BTreeMap<AddressFamily, IpAddr>,
}

#[derive(Deserialize)]
struct ConfigFile {
    #[serde(default)]
    networks: Vec<String>,
    peer: PeerSection,
}

#[derive(Deserialize)]
struct PeerSection {
    #[serde(rename = "as")]
    asn: u16,
    router_id: String,
    neighbor: String,
    #[serde(default)]
    hold_time: Option<u16>,
    #[serde(default)]
    address_families: BTreeMap<String, AfSection>,
}

#[derive(Deserialize)]
struct AfSection {
    next_hop: String,
}

/// Load and validate a config file.
pub fn load(path: &Path) -> Result<Config> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("open config {}", path.display()))?;
    let raw: ConfigFile =
        serde_json::from_reader(file).context("parse config")?;

    let mut networks = Vec::with_capacity(raw.networks.len());
    for n in &raw.networks {
        networks.push(
            n.parse::<Prefix>()
                .map_err(|e| anyhow!("network cidr {n}: {e}"))?,
        );
    }

    let router_id: Ipv4Addr = raw
        .peer
        .router_id
        .parse()
        .map_err(|_| anyhow!("invalid router id {:?}", raw.peer.router_id))?;
    let neighbor: IpAddr = raw
        .peer
        .neighbor
        .parse()
        .map_err(|_| anyhow!("invalid neighbor {:?}", raw.peer.neighbor))?;

    let mut families = BTreeMap::new();
    for (name, af_cfg) in &raw.peer.address_families {
        let af: AddressFamily = name
            .parse()
            .map_err(|e| anyhow!("address family {name:?}: {e}"))?;
        let next_hop: IpAddr = af_cfg
            .next_hop
            .parse()
            .map_err(|_| anyhow!("invalid next hop {:?}", af_cfg.next_hop))?;
        // the next hop must be an address of the family's AFI
        match (af.afi(), next_hop) {
            (1, IpAddr::V4(_)) | (2, IpAddr::V6(_)) => {}
            _ => bail!("next hop {next_hop} does not fit {af}"),
        }
        families.insert(af, next_hop);
    }

    Ok(Config {
        networks,
        asn: raw.peer.asn,
        router_id,
        neighbor,
        hold_time: raw.peer.hold_time.unwrap_or(DEFAULT_HOLD_TIME),
        resolution: DEFAULT_RESOLUTION,
        families,
    })
}

/// Legacy bootstrap from MY_ASN / ROUTER_ID / NEIGHBOR_ADDR when no config
/// file is given. IPv4 unicast only, with the router id doubling as the
/// self next hop.
pub fn from_env() -> Result<Config> {
    let asn: u16 = env_or("MY_ASN", "65001")
        .parse()
        .context("parsing MY_ASN")?;
    let router_id: Ipv4Addr = env_or("ROUTER_ID", "10.0.0.1")
        .parse()
        .context("parsing ROUTER_ID")?;
    let neighbor: IpAddr = env_or("NEIGHBOR_ADDR", "10.0.0.2")
        .parse()
        .context("parsing NEIGHBOR_ADDR")?;

    let mut families = BTreeMap::new();
    families.insert(AddressFamily::Ipv4Unicast, IpAddr::V4(router_id));

    Ok(Config {
        networks: vec![],
        asn,
        router_id,
        neighbor,
        hold_time: DEFAULT_HOLD_TIME,
        resolution: DEFAULT_RESOLUTION,
        families,
    })
}

fn env_or(name: &str, default: &str) -> String {
    match std::env::var(name) {
        Ok(v) if !v.is_empty() => v,
        _ => default.to_string(),
    }
}
