// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::error::Error;
use num_enum::TryFromPrimitive;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

/// The address families this speaker can carry routes for. An address family
/// is identified on the wire by an (AFI, SAFI) pair.
///
/// Ref: RFC 4760 §3
#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    JsonSchema,
)]
pub enum AddressFamily {
    /// AFI 1 / SAFI 1
    Ipv4Unicast,

    /// AFI 2 / SAFI 1
    Ipv6Unicast,

    /// AFI 2 / SAFI 128. MPLS-labeled VPN routes with an 8-byte route
    /// distinguisher prepended to each prefix.
    Ipv6LabeledVpn,
}

impl AddressFamily {
    pub const fn afi(&self) -> u16 {
        match self {
            Self::Ipv4Unicast => 1,
            Self::Ipv6Unicast | Self::Ipv6LabeledVpn => 2,
        }
    }

    pub const fn safi(&self) -> u8 {
        match self {
            Self::Ipv4Unicast | Self::Ipv6Unicast => 1,
            Self::Ipv6LabeledVpn => 128,
        }
    }

    pub fn from_parts(afi: u16, safi: u8) -> Option<Self> {
        match (afi, safi) {
            (1, 1) => Some(Self::Ipv4Unicast),
            (2, 1) => Some(Self::Ipv6Unicast),
            (2, 128) => Some(Self::Ipv6LabeledVpn),
            _ => None,
        }
    }

    /// Width of an address in this family as it appears in NLRI. Labeled-VPN
    /// prefixes carry a 64-bit route distinguisher ahead of the address.
    pub const fn address_bits(&self) -> usize {
        match self {
            Self::Ipv4Unicast => 32,
            Self::Ipv6Unicast => 128,
            Self::Ipv6LabeledVpn => 192,
        }
    }

    /// Octet length of one next hop in an MP_REACH_NLRI attribute for this
    /// family. Labeled-VPN next hops are prefixed with an 8-byte zero RD.
    pub const fn next_hop_size(&self) -> usize {
        match self {
            Self::Ipv4Unicast => 4,
            Self::Ipv6Unicast => 16,
            Self::Ipv6LabeledVpn => 24,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ipv4Unicast => "ipv4-unicast",
            Self::Ipv6Unicast => "ipv6-unicast",
            Self::Ipv6LabeledVpn => "ipv6-vpn",
        }
    }
}

impl Display for AddressFamily {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AddressFamily {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ipv4-unicast" => Ok(Self::Ipv4Unicast),
            "ipv6-unicast" => Ok(Self::Ipv6Unicast),
            "ipv6-vpn" => Ok(Self::Ipv6LabeledVpn),
            _ => Err(Error::InvalidAddressFamily(s.into())),
        }
    }
}

#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    JsonSchema,
)]
pub struct Prefix4 {
    pub value: Ipv4Addr,
    pub length: u8,
}

impl Display for Prefix4 {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.value, self.length)
    }
}

impl FromStr for Prefix4 {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (value, length) =
            s.split_once('/').ok_or(Error::InvalidPrefix(s.into()))?;
        let value =
            value.parse().map_err(|_| Error::InvalidPrefix(s.into()))?;
        let length: u8 =
            length.parse().map_err(|_| Error::InvalidPrefix(s.into()))?;
        if length > 32 {
            return Err(Error::InvalidPrefix(s.into()));
        }
        Ok(Self { value, length })
    }
}

#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    JsonSchema,
)]
pub struct Prefix6 {
    pub value: Ipv6Addr,
    pub length: u8,
}

impl Display for Prefix6 {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.value, self.length)
    }
}

impl FromStr for Prefix6 {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (value, length) =
            s.split_once('/').ok_or(Error::InvalidPrefix(s.into()))?;
        let value =
            value.parse().map_err(|_| Error::InvalidPrefix(s.into()))?;
        let length: u8 =
            length.parse().map_err(|_| Error::InvalidPrefix(s.into()))?;
        if length > 128 {
            return Err(Error::InvalidPrefix(s.into()));
        }
        Ok(Self { value, length })
    }
}

/// An address prefix. Two prefixes are the same route iff their address
/// octets and their mask lengths are both equal.
#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    JsonSchema,
)]
pub enum Prefix {
    V4(Prefix4),
    V6(Prefix6),
}

impl Prefix {
    pub fn ip(&self) -> IpAddr {
        match self {
            Self::V4(p) => IpAddr::V4(p.value),
            Self::V6(p) => IpAddr::V6(p.value),
        }
    }

    pub fn length(&self) -> u8 {
        match self {
            Self::V4(p) => p.length,
            Self::V6(p) => p.length,
        }
    }

    /// The address octets, full width for the version.
    pub fn octets(&self) -> Vec<u8> {
        match self {
            Self::V4(p) => p.value.octets().to_vec(),
            Self::V6(p) => p.value.octets().to_vec(),
        }
    }
}

impl Display for Prefix {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::V4(p) => p.fmt(f),
            Self::V6(p) => p.fmt(f),
        }
    }
}

impl FromStr for Prefix {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (value, _) =
            s.split_once('/').ok_or(Error::InvalidPrefix(s.into()))?;
        if value.parse::<Ipv4Addr>().is_ok() {
            Ok(Self::V4(s.parse()?))
        } else {
            Ok(Self::V6(s.parse()?))
        }
    }
}

impl From<Prefix4> for Prefix {
    fn from(p: Prefix4) -> Self {
        Self::V4(p)
    }
}

impl From<Prefix6> for Prefix {
    fn from(p: Prefix6) -> Self {
        Self::V6(p)
    }
}

/// Origin of a path as carried in the ORIGIN attribute.
///
/// Ref: RFC 4271 §4.3, §5.1.1
#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    TryFromPrimitive,
    Serialize,
    Deserialize,
    JsonSchema,
)]
#[repr(u8)]
pub enum PathOrigin {
    Igp = 0,
    Egp = 1,
    Incomplete = 2,
}

impl Display for PathOrigin {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::Igp => write!(f, "igp"),
            Self::Egp => write!(f, "egp"),
            Self::Incomplete => write!(f, "incomplete"),
        }
    }
}

/// A single AS_PATH segment: either an ordered sequence or an unordered set
/// of 2-byte AS numbers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AsPath {
    /// True for an AS_SEQUENCE segment, false for an AS_SET.
    pub sequence: bool,
    pub segments: Vec<u16>,
}

/// A raw path attribute. Well-known attributes get typed views in the
/// protocol crate; attributes the speaker does not interpret are carried in
/// this form and re-emitted byte for byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathAttribute {
    pub flags: u8,
    pub type_code: u8,
    pub value: Vec<u8>,
}

impl PathAttribute {
    pub const OPTIONAL: u8 = 0b1000_0000;
    pub const TRANSITIVE: u8 = 0b0100_0000;
    pub const PARTIAL: u8 = 0b0010_0000;
    pub const EXTENDED_LENGTH: u8 = 0b0001_0000;

    pub fn optional(&self) -> bool {
        self.flags & Self::OPTIONAL != 0
    }

    pub fn transitive(&self) -> bool {
        self.flags & Self::TRANSITIVE != 0
    }

    pub fn partial(&self) -> bool {
        self.flags & Self::PARTIAL != 0
    }

    pub fn extended_length(&self) -> bool {
        self.flags & Self::EXTENDED_LENGTH != 0
    }

    /// Encoded size: flags, type code, a 1- or 2-byte length, the value.
    pub fn wire_len(&self) -> usize {
        let len = if self.extended_length() { 2 } else { 1 };
        2 + len + self.value.len()
    }
}

/// An MPLS label stack entry: 20 bits of label, 3 bits of traffic class and
/// the bottom-of-stack bit, packed into 3 bytes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Label(pub [u8; 3]);

impl Label {
    pub fn new(label: u32, bottom: bool) -> Self {
        let v = (label << 4) | u32::from(bottom);
        let b = v.to_be_bytes();
        Self([b[1], b[2], b[3]])
    }

    pub fn label(&self) -> u32 {
        u32::from_be_bytes([0, self.0[0], self.0[1], self.0[2]]) >> 4
    }

    pub fn bottom(&self) -> bool {
        self.0[2] & 0x01 == 0x01
    }
}

/// An 8-byte route distinguisher, printed as `high:low`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct RouteDistinguisher(pub [u8; 8]);

impl RouteDistinguisher {
    pub fn new(high: u32, low: u32) -> Self {
        let mut b = [0u8; 8];
        b[0..4].copy_from_slice(&high.to_be_bytes());
        b[4..8].copy_from_slice(&low.to_be_bytes());
        Self(b)
    }

    pub fn high(&self) -> u32 {
        u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]])
    }

    pub fn low(&self) -> u32 {
        u32::from_be_bytes([self.0[4], self.0[5], self.0[6], self.0[7]])
    }
}

impl Display for RouteDistinguisher {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.high(), self.low())
    }
}

/// Labeled-VPN path data a RIB entry has to remember so the route can be
/// re-announced: the label stack and the route distinguisher from the NLRI
/// it was learned with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VpnPath {
    pub labels: Vec<Label>,
    pub rd: RouteDistinguisher,
}

/// One path for one prefix. A RIB holds at most one entry per distinct
/// prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RibEntry {
    pub af: AddressFamily,
    pub prefix: Prefix,
    pub origin: PathOrigin,
    pub as_path: AsPath,

    /// Next hop for the path. `None` on locally originated entries; the
    /// session substitutes its configured self next hop when announcing.
    pub next_hop: Option<IpAddr>,

    /// Attributes received with the path that the speaker does not
    /// interpret, preserved verbatim for re-announcement.
    pub other_attributes: Vec<PathAttribute>,

    /// Label stack and RD for labeled-VPN routes.
    pub vpn: Option<VpnPath>,

    /// Address of the peer this entry was learned from. `None` means the
    /// entry is locally originated.
    pub source: Option<IpAddr>,
}
