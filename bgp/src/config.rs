// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use rdb::Rib;
use std::net::{IpAddr, Ipv4Addr};

/// Static configuration for the session with the one configured neighbor.
#[derive(Debug, Clone)]
pub struct PeerConfig {
    /// Autonomous system number of this speaker.
    pub asn: u16,

    /// Router id of this speaker.
    pub id: Ipv4Addr,

    /// Address of the neighbor to dial.
    pub neighbor: IpAddr,

    /// Hold time proposed in our OPEN, in seconds. Keepalives are sent
    /// every third of this.
    pub hold_time: u16,

    /// Clock resolution in milliseconds.
    pub resolution: u64,
}

/// Per-address-family state the session works against.
#[derive(Clone)]
pub struct AfConfig {
    /// Next hop to advertise for locally originated routes.
    pub next_hop: IpAddr,

    /// The RIB for this address family.
    pub rib: Rib,
}
