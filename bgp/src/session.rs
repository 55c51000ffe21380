// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::clock::Clock;
use crate::config::{AfConfig, PeerConfig};
use crate::connection::BgpConnection;
use crate::error::Error;
use crate::messages::{
    as_path_attr, as_path_from_attr, next_hop_attr, next_hop_from_attr,
    origin_attr, origin_from_attr, Message, MpReachNlri, MpUnreachNlri, Nlri,
    OpenMessage, PathAttributeTypeCode, UpdateMessage, VpnNlri,
};
use crate::BGP_PORT;
use slog::{debug, info, warn, Logger};
use rdb::{
    AddressFamily, AsPath, Label, PathOrigin, Prefix, Rib, RibEntry,
    RouteDistinguisher, VpnPath,
};
use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};
use std::net::{IpAddr, SocketAddr};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::time::Duration;

/// How long to wait for the TCP dial to the peer to complete.
const DIAL_TIMEOUT: Duration = Duration::from_secs(5);

/// The states the peer state machine moves through. This speaker only
/// dials out, so there is no Active state.
///
/// Ref: RFC 4271 §8.2.2
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum FsmState {
    /// Initial state, nothing in flight.
    Idle,

    /// Waiting for the TCP connection to the peer to complete.
    Connect,

    /// Our OPEN is out, waiting for the peer's.
    OpenSent,

    /// Waiting for a keepalive or notification from the peer.
    OpenConfirm,

    /// Exchanging update, notification and keepalive messages.
    Established,
}

impl FsmState {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Connect => "connect",
            Self::OpenSent => "open sent",
            Self::OpenConfirm => "open confirm",
            Self::Established => "established",
        }
    }
}

impl Display for FsmState {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A batch of local RIB mutations fanned out to the session by its RIB
/// observers, to be forwarded to the peer as withdraws and announcements.
#[derive(Debug, Clone)]
pub struct RibChange {
    pub af: AddressFamily,
    pub removed: Vec<RibEntry>,
    pub updated: Vec<RibEntry>,
}

/// The events that drive the peer state machine. Everything the session
/// reacts to arrives through its event queue as one of these.
#[derive(Debug, Clone)]
pub enum FsmEvent {
    /// Kick off the outbound connection attempt.
    ManualStart,

    /// The TCP dial to the peer completed.
    TcpConnectionConfirmed,

    /// A message arrived from the peer.
    Message(Message),

    /// The hold timer ran out without traffic from the peer.
    HoldTimerExpires,

    /// Time to send a keepalive.
    KeepaliveTimerExpires,

    /// The local RIB changed under us.
    RibUpdate(RibChange),
}

impl FsmEvent {
    pub fn title(&self) -> &'static str {
        match self {
            Self::ManualStart => "manual start",
            Self::TcpConnectionConfirmed => "tcp connection confirmed",
            Self::Message(_) => "message",
            Self::HoldTimerExpires => "hold timer expires",
            Self::KeepaliveTimerExpires => "keepalive timer expires",
            Self::RibUpdate(_) => "rib update",
        }
    }
}

/// Drives one session with the configured neighbor from TCP dial to
/// teardown. The runner's event loop is the only writer of FSM state and
/// the only sender on the connection; the connection's reader thread and
/// the clock feed the event queue.
///
/// A runner is built fresh for every connection attempt. When [`run`]
/// returns, all RIB observer slots have been released and every RIB entry
/// learned from this peer has been removed.
///
/// [`run`]: SessionRunner::run
pub struct SessionRunner<Cnx: BgpConnection> {
    config: PeerConfig,
    families: BTreeMap<AddressFamily, AfConfig>,
    event_tx: Sender<FsmEvent>,
    event_rx: Receiver<FsmEvent>,
    state: FsmState,
    conn: Cnx,
    clock: Clock,
    observed: Vec<(Rib, usize, usize)>,
    log: Logger,
}

impl<Cnx: BgpConnection> SessionRunner<Cnx> {
    pub fn new(
        config: PeerConfig,
        families: BTreeMap<AddressFamily, AfConfig>,
        log: Logger,
    ) -> Self {
        let (event_tx, event_rx) = channel();
        let conn = Cnx::new(
            SocketAddr::new(config.neighbor, BGP_PORT),
            log.clone(),
        );
        let clock = Clock::new(
            Duration::from_millis(config.resolution),
            Duration::from_secs(u64::from(config.hold_time / 3)),
            Duration::from_secs(u64::from(config.hold_time)),
            event_tx.clone(),
            log.clone(),
        );
        Self {
            config,
            families,
            event_tx,
            event_rx,
            state: FsmState::Idle,
            conn,
            clock,
            observed: Vec::new(),
            log,
        }
    }

    pub fn state(&self) -> FsmState {
        self.state
    }

    /// Run the session to completion. Always returns an error: protocol,
    /// transport and timer failures all land here, and the supervisor is
    /// expected to build a fresh runner and try again.
    pub fn run(&mut self) -> Result<(), Error> {
        self.event_tx
            .send(FsmEvent::ManualStart)
            .map_err(|e| Error::ChannelSend(e.to_string()))?;
        let result = self.event_loop();
        self.teardown();
        result
    }

    fn event_loop(&mut self) -> Result<(), Error> {
        loop {
            let event = self.event_rx.recv()?;
            debug!(self.log, "event: {}", event.title());
            self.handle_event(event)?;
        }
    }

    fn handle_event(&mut self, event: FsmEvent) -> Result<(), Error> {
        match (self.state, event) {
            (FsmState::Idle, FsmEvent::ManualStart) => {
                self.set_state(FsmState::Connect);
                self.conn.connect(self.event_tx.clone(), DIAL_TIMEOUT)
            }

            (FsmState::Connect, FsmEvent::TcpConnectionConfirmed) => {
                self.send_open()?;
                self.set_state(FsmState::OpenSent);
                Ok(())
            }

            // The peer's OPEN is accepted as long as it framed; its
            // contents are not validated against our own parameters.
            (FsmState::OpenSent, FsmEvent::Message(Message::Open(_))) => {
                self.conn.send(Message::KeepAlive)?;
                self.set_state(FsmState::OpenConfirm);
                Ok(())
            }

            (
                FsmState::OpenConfirm,
                FsmEvent::Message(Message::KeepAlive),
            ) => self.establish(),

            (
                FsmState::Established,
                FsmEvent::Message(Message::KeepAlive),
            ) => {
                self.clock.timers.hold_timer.reset();
                Ok(())
            }

            (
                FsmState::Established,
                FsmEvent::Message(Message::Update(m)),
            ) => self.apply_update(m),

            (FsmState::Established, FsmEvent::KeepaliveTimerExpires) => {
                self.conn.send(Message::KeepAlive)
            }

            (FsmState::Established, FsmEvent::RibUpdate(change)) => {
                self.announce_change(&change)
            }

            (_, FsmEvent::Message(Message::Notification(m))) => {
                Err(Error::Notification {
                    code: m.error_code,
                    subcode: m.error_subcode,
                })
            }

            (_, FsmEvent::HoldTimerExpires) => Err(Error::HoldTimerExpired),

            (state, FsmEvent::Message(Message::Unknown(m))) => {
                warn!(
                    self.log,
                    "ignoring message of unknown type {} in state {state}",
                    m.typ,
                );
                Ok(())
            }

            (state, event) => Err(Error::UnexpectedFsmEvent {
                state: state.as_str(),
                event: event.title(),
            }),
        }
    }

    fn set_state(&mut self, next: FsmState) {
        info!(
            self.log,
            "[{}] {} -> {}", self.config.neighbor, self.state, next
        );
        self.state = next;
    }

    fn send_open(&mut self) -> Result<(), Error> {
        let mut open = OpenMessage::new(
            self.config.asn,
            self.config.hold_time,
            self.config.id,
        );
        for af in self.families.keys() {
            open.add_multiprotocol(*af);
        }
        self.conn.send(Message::Open(open))
    }

    /// Enter Established: start the liveness timers, hook this session up
    /// to its RIBs, and flush every known route to the peer.
    fn establish(&mut self) -> Result<(), Error> {
        self.set_state(FsmState::Established);

        self.clock.timers.hold_timer.reset();
        self.clock.timers.hold_timer.enable();
        self.clock.timers.keepalive_timer.reset();
        self.clock.timers.keepalive_timer.enable();

        self.register_rib_observers();

        info!(self.log, "sending initial update messages");
        for (af, afc) in &self.families {
            for e in afc.rib.entries() {
                let m = announcement_for(&self.config, &self.families, *af, &e)?;
                self.conn.send(Message::Update(m))?;
            }
        }
        Ok(())
    }

    /// Register on every configured RIB. The callbacks run under the RIB's
    /// write lock, so they only enqueue an event for the main loop and
    /// return; the actual message emission happens outside the lock.
    fn register_rib_observers(&mut self) {
        for (af, afc) in &self.families {
            let af = *af;

            let tx = self.event_tx.clone();
            let log = self.log.clone();
            let update_slot = afc.rib.on_update(Box::new(move |_prev, curr| {
                let change = RibChange {
                    af,
                    removed: vec![],
                    updated: vec![curr.clone()],
                };
                if tx.send(FsmEvent::RibUpdate(change)).is_err() {
                    warn!(log, "rib update observer: session is gone");
                }
            }));

            let tx = self.event_tx.clone();
            let log = self.log.clone();
            let remove_slot = afc.rib.on_remove(Box::new(move |e| {
                let change = RibChange {
                    af,
                    removed: vec![e.clone()],
                    updated: vec![],
                };
                if tx.send(FsmEvent::RibUpdate(change)).is_err() {
                    warn!(log, "rib remove observer: session is gone");
                }
            }));

            self.observed.push((afc.rib.clone(), update_slot, remove_slot));
        }
    }

    /// Take an inbound update apart and apply it to the RIBs: withdraws
    /// first (source-filtered), then candidate entries subject to the
    /// AS path length tie-break.
    fn apply_update(&mut self, m: UpdateMessage) -> Result<(), Error> {
        let peer = self.config.neighbor;
        let intake = decompose_update(&m, peer)?;

        for (af, prefix) in &intake.withdrawn {
            let Some(afc) = self.families.get(af) else {
                warn!(
                    self.log,
                    "withdraw for unconfigured address family {af}, ignoring"
                );
                continue;
            };
            let Some(existing) = afc.rib.find(prefix) else {
                continue;
            };
            if existing.source == Some(peer) {
                afc.rib.remove(&existing);
            } else {
                info!(
                    self.log,
                    "ignoring withdraw for {prefix}: not sourced by this peer"
                );
            }
        }

        for e in intake.entries {
            let Some(afc) = self.families.get(&e.af) else {
                warn!(
                    self.log,
                    "route in unconfigured address family {}, ignoring", e.af
                );
                continue;
            };
            if let Some(curr) = afc.rib.find(&e.prefix) {
                if curr.as_path.segments.len() < e.as_path.segments.len() {
                    info!(
                        self.log,
                        "ignoring update for {} (entry in RIB has priority)",
                        e.prefix
                    );
                    continue;
                }
            }
            afc.rib.update(e);
        }
        Ok(())
    }

    /// Forward a local RIB change to the peer as withdraw and/or announce
    /// updates.
    fn announce_change(&mut self, change: &RibChange) -> Result<(), Error> {
        for e in &change.removed {
            let m = withdrawal_for(change.af, e)?;
            self.conn.send(Message::Update(m))?;
        }
        for e in &change.updated {
            let m =
                announcement_for(&self.config, &self.families, change.af, e)?;
            self.conn.send(Message::Update(m))?;
        }
        Ok(())
    }

    /// Unhook from the RIBs, then drop everything this peer advertised.
    /// Runs on every exit path of [`SessionRunner::run`]; the connection
    /// and clock threads stop when the runner is dropped.
    fn teardown(&mut self) {
        for (rib, update_slot, remove_slot) in self.observed.drain(..) {
            rib.unregister_on_update(update_slot);
            rib.unregister_on_remove(remove_slot);
        }
        for afc in self.families.values() {
            afc.rib.remove_peer_entries(self.config.neighbor);
        }
        info!(self.log, "[{}] session closed", self.config.neighbor);
    }
}

/// Build the announcement update for one RIB entry: ORIGIN, AS_PATH with
/// our ASN prepended, a next hop (the entry's, or the configured self next
/// hop), and the entry's opaque attributes re-emitted verbatim. IPv4
/// unicast rides in the top-level NLRI; other families in MP_REACH_NLRI.
fn announcement_for(
    config: &PeerConfig,
    families: &BTreeMap<AddressFamily, AfConfig>,
    af: AddressFamily,
    e: &RibEntry,
) -> Result<UpdateMessage, Error> {
    let afc = families
        .get(&af)
        .ok_or(Error::UnconfiguredAddressFamily(af))?;

    let mut segments = Vec::with_capacity(e.as_path.segments.len() + 1);
    segments.push(config.asn);
    segments.extend_from_slice(&e.as_path.segments);
    let as_path = AsPath {
        sequence: e.as_path.sequence,
        segments,
    };

    let next_hop = e.next_hop.unwrap_or(afc.next_hop);

    let mut path_attributes = vec![
        origin_attr(e.origin),
        as_path_attr(&as_path)?,
    ];

    let nlri = match af {
        AddressFamily::Ipv4Unicast => {
            let IpAddr::V4(nh) = next_hop else {
                return Err(Error::InvalidAddress(format!(
                    "{next_hop} is not an ipv4 next hop"
                )));
            };
            path_attributes.push(next_hop_attr(nh));
            vec![e.prefix]
        }
        AddressFamily::Ipv6Unicast | AddressFamily::Ipv6LabeledVpn => {
            let mp = MpReachNlri {
                af,
                next_hops: vec![MpReachNlri::encode_next_hop(af, next_hop)?],
                nlri: vec![nlri_for_entry(af, e)],
            };
            path_attributes.push(mp.to_attribute()?);
            vec![]
        }
    };
    path_attributes.extend(e.other_attributes.iter().cloned());

    Ok(UpdateMessage {
        withdrawn: vec![],
        path_attributes,
        nlri,
    })
}

/// Build the withdraw update for one removed RIB entry. IPv4 unicast uses
/// the top-level withdrawn routes field; other families a single
/// MP_UNREACH_NLRI attribute.
fn withdrawal_for(
    af: AddressFamily,
    e: &RibEntry,
) -> Result<UpdateMessage, Error> {
    match af {
        AddressFamily::Ipv4Unicast => Ok(UpdateMessage {
            withdrawn: vec![e.prefix],
            ..Default::default()
        }),
        AddressFamily::Ipv6Unicast | AddressFamily::Ipv6LabeledVpn => {
            let mp = MpUnreachNlri {
                af,
                withdrawn: vec![nlri_for_entry(af, e)],
            };
            Ok(UpdateMessage {
                path_attributes: vec![mp.to_attribute()?],
                ..Default::default()
            })
        }
    }
}

fn nlri_for_entry(af: AddressFamily, e: &RibEntry) -> Nlri {
    match af {
        AddressFamily::Ipv4Unicast | AddressFamily::Ipv6Unicast => {
            Nlri::Unicast(e.prefix)
        }
        AddressFamily::Ipv6LabeledVpn => {
            let vpn = e.vpn.clone().unwrap_or(VpnPath {
                labels: vec![Label::new(0, true)],
                rd: RouteDistinguisher::new(0, 0),
            });
            Nlri::LabeledVpn(VpnNlri {
                labels: vpn.labels,
                rd: vpn.rd,
                prefix: e.prefix,
            })
        }
    }
}

/// An inbound update decomposed for RIB intake: prefixes to withdraw and
/// candidate entries to install, each tagged with its address family.
pub(crate) struct UpdateIntake {
    pub withdrawn: Vec<(AddressFamily, Prefix)>,
    pub entries: Vec<RibEntry>,
}

/// Take an update message apart. Top-level withdrawn routes and NLRI are
/// IPv4 unicast; MP_REACH / MP_UNREACH contents are tagged with the
/// attribute's address family. Attributes the speaker does not interpret
/// are preserved on every produced entry for re-announcement.
pub(crate) fn decompose_update(
    m: &UpdateMessage,
    source: IpAddr,
) -> Result<UpdateIntake, Error> {
    let mut origin = PathOrigin::Igp;
    let mut as_path = AsPath::default();
    let mut next_hop = None;
    let mut mp_reach: Option<MpReachNlri> = None;
    let mut others = Vec::new();

    let mut withdrawn: Vec<(AddressFamily, Prefix)> = m
        .withdrawn
        .iter()
        .map(|p| (AddressFamily::Ipv4Unicast, *p))
        .collect();

    for a in &m.path_attributes {
        match PathAttributeTypeCode::try_from(a.type_code) {
            Ok(PathAttributeTypeCode::Origin) => {
                origin = origin_from_attr(a)?;
            }
            Ok(PathAttributeTypeCode::AsPath) => {
                as_path = as_path_from_attr(a)?;
            }
            Ok(PathAttributeTypeCode::NextHop) => {
                next_hop = Some(IpAddr::V4(next_hop_from_attr(a)?));
            }
            Ok(PathAttributeTypeCode::MpReachNlri) => {
                mp_reach = Some(MpReachNlri::from_attribute(a)?);
            }
            Ok(PathAttributeTypeCode::MpUnreachNlri) => {
                let mp = MpUnreachNlri::from_attribute(a)?;
                withdrawn
                    .extend(mp.withdrawn.iter().map(|n| (mp.af, *n.prefix())));
            }
            _ => others.push(a.clone()),
        }
    }

    let mut entries = Vec::new();

    if let Some(mp) = mp_reach {
        let nh = mp.next_hop_addr()?;
        for n in &mp.nlri {
            entries.push(RibEntry {
                af: mp.af,
                prefix: *n.prefix(),
                origin,
                as_path: as_path.clone(),
                next_hop: nh,
                other_attributes: others.clone(),
                vpn: match n {
                    Nlri::LabeledVpn(v) => Some(VpnPath {
                        labels: v.labels.clone(),
                        rd: v.rd,
                    }),
                    Nlri::Unicast(_) => None,
                },
                source: Some(source),
            });
        }
    }

    for p in &m.nlri {
        entries.push(RibEntry {
            af: AddressFamily::Ipv4Unicast,
            prefix: *p,
            origin,
            as_path: as_path.clone(),
            next_hop,
            other_attributes: others.clone(),
            vpn: None,
            source: Some(source),
        });
    }

    Ok(UpdateIntake { withdrawn, entries })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rdb::{PathAttribute, Prefix6};
    use std::net::Ipv6Addr;

    fn v6_entry(prefix: &str, source: Option<IpAddr>) -> RibEntry {
        RibEntry {
            af: AddressFamily::Ipv6LabeledVpn,
            prefix: prefix.parse().unwrap(),
            origin: PathOrigin::Igp,
            as_path: AsPath {
                sequence: true,
                segments: vec![65100],
            },
            next_hop: Some("2001:db8::1".parse().unwrap()),
            other_attributes: vec![],
            vpn: Some(VpnPath {
                labels: vec![Label::new(0x10000, true)],
                rd: RouteDistinguisher::new(1, 100),
            }),
            source,
        }
    }

    #[test]
    fn decompose_top_level_nlri() {
        let m = UpdateMessage {
            withdrawn: vec!["10.9.0.0/24".parse().unwrap()],
            path_attributes: vec![
                origin_attr(PathOrigin::Egp),
                as_path_attr(&AsPath {
                    sequence: true,
                    segments: vec![65002, 65003],
                })
                .unwrap(),
                next_hop_attr("10.0.0.2".parse().unwrap()),
                PathAttribute {
                    flags: PathAttribute::OPTIONAL
                        | PathAttribute::TRANSITIVE,
                    type_code: 201,
                    value: vec![1, 2, 3],
                },
            ],
            nlri: vec!["10.1.0.0/24".parse().unwrap()],
        };

        let source: IpAddr = "10.0.0.2".parse().unwrap();
        let intake = decompose_update(&m, source).unwrap();

        assert_eq!(
            intake.withdrawn,
            vec![(
                AddressFamily::Ipv4Unicast,
                "10.9.0.0/24".parse().unwrap()
            )]
        );
        assert_eq!(intake.entries.len(), 1);
        let e = &intake.entries[0];
        assert_eq!(e.af, AddressFamily::Ipv4Unicast);
        assert_eq!(e.prefix, "10.1.0.0/24".parse().unwrap());
        assert_eq!(e.origin, PathOrigin::Egp);
        assert_eq!(e.as_path.segments, vec![65002, 65003]);
        assert_eq!(e.next_hop, Some(source));
        assert_eq!(e.other_attributes.len(), 1);
        assert_eq!(e.other_attributes[0].type_code, 201);
        assert_eq!(e.source, Some(source));
    }

    #[test]
    fn decompose_mp_reach_vpn() {
        let nh: Ipv6Addr = "2001:db8::9".parse().unwrap();
        let mp = MpReachNlri {
            af: AddressFamily::Ipv6LabeledVpn,
            next_hops: vec![MpReachNlri::encode_next_hop(
                AddressFamily::Ipv6LabeledVpn,
                IpAddr::V6(nh),
            )
            .unwrap()],
            nlri: vec![Nlri::LabeledVpn(VpnNlri {
                labels: vec![Label::new(0x10000, true)],
                rd: RouteDistinguisher::new(1, 100),
                prefix: "2001:bb11::/64".parse().unwrap(),
            })],
        };
        let m = UpdateMessage {
            path_attributes: vec![
                origin_attr(PathOrigin::Igp),
                as_path_attr(&AsPath {
                    sequence: true,
                    segments: vec![65002],
                })
                .unwrap(),
                mp.to_attribute().unwrap(),
            ],
            ..Default::default()
        };

        let source: IpAddr = "10.0.0.2".parse().unwrap();
        let intake = decompose_update(&m, source).unwrap();
        assert!(intake.withdrawn.is_empty());
        assert_eq!(intake.entries.len(), 1);

        let e = &intake.entries[0];
        assert_eq!(e.af, AddressFamily::Ipv6LabeledVpn);
        assert_eq!(
            e.prefix,
            Prefix::V6(Prefix6 {
                value: "2001:bb11::".parse().unwrap(),
                length: 64,
            })
        );
        assert_eq!(e.next_hop, Some(IpAddr::V6(nh)));
        let vpn = e.vpn.as_ref().unwrap();
        assert_eq!(vpn.rd.to_string(), "1:100");
        assert_eq!(vpn.labels[0].label(), 0x10000);
    }

    #[test]
    fn decompose_mp_unreach() {
        let mp = MpUnreachNlri {
            af: AddressFamily::Ipv6Unicast,
            withdrawn: vec![Nlri::Unicast("2001:db8::/48".parse().unwrap())],
        };
        let m = UpdateMessage {
            path_attributes: vec![mp.to_attribute().unwrap()],
            ..Default::default()
        };
        let intake =
            decompose_update(&m, "10.0.0.2".parse().unwrap()).unwrap();
        assert_eq!(
            intake.withdrawn,
            vec![(
                AddressFamily::Ipv6Unicast,
                "2001:db8::/48".parse().unwrap()
            )]
        );
        assert!(intake.entries.is_empty());
    }

    #[test]
    fn announcement_prepends_asn_without_mutating_entry() {
        let config = PeerConfig {
            asn: 65001,
            id: "10.0.0.1".parse().unwrap(),
            neighbor: "10.0.0.2".parse().unwrap(),
            hold_time: 180,
            resolution: 100,
        };
        let rib = Rib::new();
        let mut families = BTreeMap::new();
        families.insert(
            AddressFamily::Ipv4Unicast,
            AfConfig {
                next_hop: "10.0.0.1".parse().unwrap(),
                rib: rib.clone(),
            },
        );

        let e = RibEntry {
            af: AddressFamily::Ipv4Unicast,
            prefix: "10.1.0.0/24".parse().unwrap(),
            origin: PathOrigin::Igp,
            as_path: AsPath {
                sequence: true,
                segments: vec![65002],
            },
            next_hop: None,
            other_attributes: vec![],
            vpn: None,
            source: None,
        };

        let m = announcement_for(
            &config,
            &families,
            AddressFamily::Ipv4Unicast,
            &e,
        )
        .unwrap();

        assert_eq!(
            as_path_from_attr(&m.path_attributes[1]).unwrap().segments,
            vec![65001, 65002]
        );
        // the stored entry is untouched
        assert_eq!(e.as_path.segments, vec![65002]);
        // nil next hop replaced by the configured self next hop
        assert_eq!(
            next_hop_from_attr(&m.path_attributes[2]).unwrap(),
            "10.0.0.1".parse::<std::net::Ipv4Addr>().unwrap()
        );
        assert_eq!(m.nlri, vec![e.prefix]);
        assert!(m.withdrawn.is_empty());
    }

    #[test]
    fn vpn_announcement_uses_mp_reach() {
        let config = PeerConfig {
            asn: 65001,
            id: "10.0.0.1".parse().unwrap(),
            neighbor: "10.0.0.2".parse().unwrap(),
            hold_time: 180,
            resolution: 100,
        };
        let mut families = BTreeMap::new();
        families.insert(
            AddressFamily::Ipv6LabeledVpn,
            AfConfig {
                next_hop: "2001:db8::1".parse().unwrap(),
                rib: Rib::new(),
            },
        );

        let e = v6_entry("2001:bb11::/64", None);
        let m = announcement_for(
            &config,
            &families,
            AddressFamily::Ipv6LabeledVpn,
            &e,
        )
        .unwrap();

        assert!(m.nlri.is_empty());
        let mp = MpReachNlri::from_attribute(&m.path_attributes[2]).unwrap();
        assert_eq!(mp.af, AddressFamily::Ipv6LabeledVpn);
        match &mp.nlri[0] {
            Nlri::LabeledVpn(v) => {
                assert_eq!(v.rd.to_string(), "1:100");
                assert_eq!(v.prefix, e.prefix);
            }
            n => panic!("expected labeled vpn nlri, got {n:?}"),
        }
    }

    #[test]
    fn withdrawal_per_family() {
        let e4 = RibEntry {
            af: AddressFamily::Ipv4Unicast,
            prefix: "10.1.0.0/24".parse().unwrap(),
            origin: PathOrigin::Igp,
            as_path: AsPath::default(),
            next_hop: None,
            other_attributes: vec![],
            vpn: None,
            source: None,
        };
        let m = withdrawal_for(AddressFamily::Ipv4Unicast, &e4).unwrap();
        assert_eq!(m.withdrawn, vec![e4.prefix]);
        assert!(m.path_attributes.is_empty());

        let e6 = v6_entry("2001:bb11::/64", None);
        let m = withdrawal_for(AddressFamily::Ipv6LabeledVpn, &e6).unwrap();
        assert!(m.withdrawn.is_empty());
        let mp = MpUnreachNlri::from_attribute(&m.path_attributes[0]).unwrap();
        assert_eq!(mp.af, AddressFamily::Ipv6LabeledVpn);
        assert_eq!(*mp.withdrawn[0].prefix(), e6.prefix);
    }
}
