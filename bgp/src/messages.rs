// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::error::Error;
use num_enum::TryFromPrimitive;
use rdb::{
    AddressFamily, AsPath, Label, PathAttribute, PathOrigin, Prefix, Prefix4,
    Prefix6, RouteDistinguisher,
};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// The version number for BGP-4.
pub const BGP4: u8 = 4;

/// According to RFC 4271 §4.1 the header marker is all ones.
const MARKER: [u8; 16] = [0xffu8; 16];

/// BGP message types.
///
/// Ref: RFC 4271 §4.1
#[derive(Debug, Eq, PartialEq, TryFromPrimitive, Copy, Clone)]
#[repr(u8)]
pub enum MessageType {
    /// The first message sent by each side once a TCP connection is
    /// established.
    Open = 1,

    /// Used to transfer routing information between BGP peers.
    Update = 2,

    /// Sent when an error condition is detected.
    Notification = 3,

    /// Exchanged between peers often enough not to cause the hold timer to
    /// expire.
    KeepAlive = 4,
}

/// Each BGP message begins with a fixed size header.
///
/// ```text
/// 0                   1                   2                   3
/// 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
///   +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///   |                                                               |
///   +                                                               +
///   |                                                               |
///   +                           Marker                              +
///   |                                                               |
///   +                                                               +
///   |                                                               |
///   +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///   |          Length               |      Type     |
///   +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
///
/// The type byte is kept raw so that messages of types this implementation
/// does not understand can still be framed and carried.
///
/// Ref: RFC 4271 §4.1
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub struct Header {
    /// Total length of the message including the header. Between 19 and
    /// 4096.
    pub length: u16,

    /// Indicates the type of message.
    pub typ: u8,
}

impl Header {
    pub const WIRE_SIZE: usize = 19;

    /// Create a new header. Length must be between 19 and 4096 per RFC 4271
    /// §4.1.
    pub fn new(length: u16, typ: u8) -> Result<Header, Error> {
        if length < Self::WIRE_SIZE as u16 {
            return Err(Error::TooSmall("message length".into()));
        }
        if length > 4096 {
            return Err(Error::TooLarge("message length".into()));
        }
        Ok(Header { length, typ })
    }

    pub fn to_wire(&self) -> Vec<u8> {
        let mut buf = MARKER.to_vec();
        buf.extend_from_slice(&self.length.to_be_bytes());
        buf.push(self.typ);
        buf
    }

    pub fn from_wire(buf: &[u8]) -> Result<Header, Error> {
        if buf.len() < Self::WIRE_SIZE {
            return Err(Error::TooSmall("message header".into()));
        }
        if buf[..16] != MARKER {
            return Err(Error::NoMarker);
        }
        let length = u16::from_be_bytes([buf[16], buf[17]]);
        if usize::from(length) < Self::WIRE_SIZE {
            return Err(Error::TooSmall("message length".into()));
        }
        if length > 4096 {
            return Err(Error::TooLarge("message length".into()));
        }
        Ok(Header {
            length,
            typ: buf[18],
        })
    }
}

/// A BGP message. Types this implementation does not interpret are carried
/// as [`UnknownMessage`] with their payload preserved byte for byte.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Message {
    Open(OpenMessage),
    Update(UpdateMessage),
    Notification(NotificationMessage),
    KeepAlive,
    Unknown(UnknownMessage),
}

impl Message {
    pub fn typ(&self) -> u8 {
        match self {
            Self::Open(_) => MessageType::Open as u8,
            Self::Update(_) => MessageType::Update as u8,
            Self::Notification(_) => MessageType::Notification as u8,
            Self::KeepAlive => MessageType::KeepAlive as u8,
            Self::Unknown(m) => m.typ,
        }
    }

    /// Serialize the message body (everything after the header).
    pub fn to_wire(&self) -> Result<Vec<u8>, Error> {
        match self {
            Self::Open(m) => m.to_wire(),
            Self::Update(m) => m.to_wire(),
            Self::Notification(m) => Ok(m.to_wire()),
            Self::KeepAlive => Ok(Vec::new()),
            Self::Unknown(m) => Ok(m.payload.clone()),
        }
    }

    /// Deserialize a message body of the given type.
    pub fn from_wire(typ: u8, buf: &[u8]) -> Result<Message, Error> {
        match MessageType::try_from(typ) {
            Ok(MessageType::Open) => Ok(OpenMessage::from_wire(buf)?.into()),
            Ok(MessageType::Update) => {
                Ok(UpdateMessage::from_wire(buf)?.into())
            }
            Ok(MessageType::Notification) => {
                Ok(NotificationMessage::from_wire(buf)?.into())
            }
            Ok(MessageType::KeepAlive) => {
                if !buf.is_empty() {
                    return Err(Error::BadLength {
                        expected: 0,
                        found: buf.len(),
                    });
                }
                Ok(Message::KeepAlive)
            }
            Err(_) => Ok(Message::Unknown(UnknownMessage {
                typ,
                payload: buf.to_vec(),
            })),
        }
    }
}

impl From<OpenMessage> for Message {
    fn from(m: OpenMessage) -> Message {
        Message::Open(m)
    }
}

impl From<UpdateMessage> for Message {
    fn from(m: UpdateMessage) -> Message {
        Message::Update(m)
    }
}

impl From<NotificationMessage> for Message {
    fn from(m: NotificationMessage) -> Message {
        Message::Notification(m)
    }
}

/// A message of a type this implementation does not understand, preserved
/// as received.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct UnknownMessage {
    pub typ: u8,
    pub payload: Vec<u8>,
}

/// The first message sent by each side once a TCP connection is
/// established.
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |    Version    |     My Autonomous System      |   Hold Time   :
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// :               |                BGP Identifier                 :
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// :               | Opt Parm Len  |     Optional Parameters       :
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
///
/// Optional parameters are carried as raw bytes; the only parameter this
/// speaker emits is the multiprotocol extensions capability, one per
/// configured address family, and received parameters are not interpreted.
///
/// Ref: RFC 4271 §4.2
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct OpenMessage {
    /// BGP protocol version.
    pub version: u8,

    /// Autonomous system number of the sender.
    pub asn: u16,

    /// Number of seconds the sender proposes for the hold timer.
    pub hold_time: u16,

    /// BGP identifier (router id) of the sender.
    pub id: Ipv4Addr,

    /// Raw optional parameters.
    pub parameters: Vec<u8>,
}

impl OpenMessage {
    pub fn new(asn: u16, hold_time: u16, id: Ipv4Addr) -> OpenMessage {
        OpenMessage {
            version: BGP4,
            asn,
            hold_time,
            id,
            parameters: Vec::new(),
        }
    }

    /// Append a multiprotocol extensions capability (RFC 4760 §8) for the
    /// given address family to the optional parameters.
    pub fn add_multiprotocol(&mut self, af: AddressFamily) {
        let afi = af.afi().to_be_bytes();
        self.parameters.extend_from_slice(&[
            2, // parameter type: capability
            6, // parameter length
            1, // capability code: multiprotocol extensions
            4, // capability length
            afi[0],
            afi[1],
            0, // reserved
            af.safi(),
        ]);
    }

    pub fn to_wire(&self) -> Result<Vec<u8>, Error> {
        if self.parameters.len() > usize::from(u8::MAX) {
            return Err(Error::TooLarge("open optional parameters".into()));
        }
        let mut buf = vec![self.version];
        buf.extend_from_slice(&self.asn.to_be_bytes());
        buf.extend_from_slice(&self.hold_time.to_be_bytes());
        buf.extend_from_slice(&self.id.octets());
        buf.push(self.parameters.len() as u8);
        buf.extend_from_slice(&self.parameters);
        Ok(buf)
    }

    pub fn from_wire(buf: &[u8]) -> Result<OpenMessage, Error> {
        if buf.len() < 10 {
            return Err(Error::TooSmall("open message".into()));
        }
        let param_len = usize::from(buf[9]);
        if buf.len() != 10 + param_len {
            return Err(Error::BadLength {
                expected: 10 + param_len,
                found: buf.len(),
            });
        }
        Ok(OpenMessage {
            version: buf[0],
            asn: u16::from_be_bytes([buf[1], buf[2]]),
            hold_time: u16::from_be_bytes([buf[3], buf[4]]),
            id: Ipv4Addr::new(buf[5], buf[6], buf[7], buf[8]),
            parameters: buf[10..].to_vec(),
        })
    }
}

/// An update message advertises feasible routes sharing common path
/// attributes, withdraws unfeasible ones, or both.
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |      Withdrawn Length         |       Withdrawn Routes        :
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |    Path Attribute Length      |       Path Attributes         :
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// :       Network Layer Reachability Information (variable)       :
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
///
/// The top-level withdrawn routes and NLRI are IPv4 unicast; other address
/// families ride in MP_REACH_NLRI / MP_UNREACH_NLRI path attributes.
///
/// Ref: RFC 4271 §4.3
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct UpdateMessage {
    pub withdrawn: Vec<Prefix>,
    pub path_attributes: Vec<PathAttribute>,
    pub nlri: Vec<Prefix>,
}

impl UpdateMessage {
    pub fn to_wire(&self) -> Result<Vec<u8>, Error> {
        let mut buf = Vec::new();

        let mut withdrawn = Vec::new();
        for w in &self.withdrawn {
            withdrawn.extend_from_slice(&prefix_to_wire(w));
        }
        if withdrawn.len() > usize::from(u16::MAX) {
            return Err(Error::TooLarge("withdrawn routes".into()));
        }
        buf.extend_from_slice(&(withdrawn.len() as u16).to_be_bytes());
        buf.extend_from_slice(&withdrawn);

        let mut attrs = Vec::new();
        for a in &self.path_attributes {
            attrs.extend_from_slice(&path_attribute_to_wire(a)?);
        }
        if attrs.len() > usize::from(u16::MAX) {
            return Err(Error::TooLarge("path attributes".into()));
        }
        buf.extend_from_slice(&(attrs.len() as u16).to_be_bytes());
        buf.extend_from_slice(&attrs);

        for n in &self.nlri {
            buf.extend_from_slice(&prefix_to_wire(n));
        }

        Ok(buf)
    }

    pub fn from_wire(buf: &[u8]) -> Result<UpdateMessage, Error> {
        if buf.len() < 2 {
            return Err(Error::TooSmall("update message".into()));
        }
        let len = usize::from(u16::from_be_bytes([buf[0], buf[1]]));
        let buf = &buf[2..];
        if buf.len() < len {
            return Err(Error::TooSmall("withdrawn routes".into()));
        }
        let withdrawn = prefixes_from_wire(&buf[..len], 32)?;
        let buf = &buf[len..];

        if buf.len() < 2 {
            return Err(Error::TooSmall("update message".into()));
        }
        let len = usize::from(u16::from_be_bytes([buf[0], buf[1]]));
        let buf = &buf[2..];
        if buf.len() < len {
            return Err(Error::TooSmall("path attributes".into()));
        }
        let path_attributes = path_attributes_from_wire(&buf[..len])?;
        let buf = &buf[len..];

        let nlri = prefixes_from_wire(buf, 32)?;

        Ok(UpdateMessage {
            withdrawn,
            path_attributes,
            nlri,
        })
    }
}

/// Sent when an error condition is detected; the session is torn down
/// afterwards.
///
/// Ref: RFC 4271 §4.5
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct NotificationMessage {
    pub error_code: u8,
    pub error_subcode: u8,
    pub data: Vec<u8>,
}

impl NotificationMessage {
    pub fn to_wire(&self) -> Vec<u8> {
        let mut buf = vec![self.error_code, self.error_subcode];
        buf.extend_from_slice(&self.data);
        buf
    }

    pub fn from_wire(buf: &[u8]) -> Result<NotificationMessage, Error> {
        if buf.len() < 2 {
            return Err(Error::TooSmall("notification message".into()));
        }
        Ok(NotificationMessage {
            error_code: buf[0],
            error_subcode: buf[1],
            data: buf[2..].to_vec(),
        })
    }
}

/// Number of whole bytes needed to carry a prefix of the given mask
/// length.
pub fn prefix_byte_length(mask_length: usize) -> usize {
    mask_length.div_ceil(8)
}

/// Serialize a prefix: one length byte followed by the minimum number of
/// address bytes covering the mask.
pub fn prefix_to_wire(p: &Prefix) -> Vec<u8> {
    let length = usize::from(p.length());
    let mut buf = vec![p.length()];
    buf.extend_from_slice(&p.octets()[..prefix_byte_length(length)]);
    buf
}

/// Deserialize a prefix of an address family with `address_bits` wide
/// addresses. Returns the prefix and the number of bytes consumed.
pub fn prefix_from_wire(
    buf: &[u8],
    address_bits: usize,
) -> Result<(Prefix, usize), Error> {
    let Some(&length) = buf.first() else {
        return Err(Error::TooSmall("prefix length".into()));
    };
    if usize::from(length) > address_bits {
        return Err(Error::InvalidPrefixLength(length));
    }
    let n = prefix_byte_length(usize::from(length));
    if buf.len() < 1 + n {
        return Err(Error::TooSmall("prefix".into()));
    }
    let prefix = match address_bits {
        32 => {
            let mut octets = [0u8; 4];
            octets[..n].copy_from_slice(&buf[1..1 + n]);
            Prefix::V4(Prefix4 {
                value: Ipv4Addr::from(octets),
                length,
            })
        }
        _ => {
            let mut octets = [0u8; 16];
            octets[..n].copy_from_slice(&buf[1..1 + n]);
            Prefix::V6(Prefix6 {
                value: Ipv6Addr::from(octets),
                length,
            })
        }
    };
    Ok((prefix, 1 + n))
}

fn prefixes_from_wire(
    mut buf: &[u8],
    address_bits: usize,
) -> Result<Vec<Prefix>, Error> {
    let mut result = Vec::new();
    while !buf.is_empty() {
        let (p, n) = prefix_from_wire(buf, address_bits)?;
        result.push(p);
        buf = &buf[n..];
    }
    Ok(result)
}

/// Serialize a raw path attribute. The length field is two bytes iff the
/// extended-length flag is set.
pub fn path_attribute_to_wire(a: &PathAttribute) -> Result<Vec<u8>, Error> {
    let mut buf = vec![a.flags, a.type_code];
    if a.extended_length() {
        if a.value.len() > usize::from(u16::MAX) {
            return Err(Error::TooLarge("path attribute value".into()));
        }
        buf.extend_from_slice(&(a.value.len() as u16).to_be_bytes());
    } else {
        if a.value.len() > usize::from(u8::MAX) {
            return Err(Error::TooLarge("path attribute value".into()));
        }
        buf.push(a.value.len() as u8);
    }
    buf.extend_from_slice(&a.value);
    Ok(buf)
}

/// Deserialize one raw path attribute. Returns the attribute and the number
/// of bytes consumed.
pub fn path_attribute_from_wire(
    buf: &[u8],
) -> Result<(PathAttribute, usize), Error> {
    if buf.len() < 2 {
        return Err(Error::TooSmall("path attribute".into()));
    }
    let flags = buf[0];
    let type_code = buf[1];
    let buf = &buf[2..];

    let (len, mut n) = if flags & PathAttribute::EXTENDED_LENGTH != 0 {
        if buf.len() < 2 {
            return Err(Error::TooSmall("path attribute length".into()));
        }
        (usize::from(u16::from_be_bytes([buf[0], buf[1]])), 4)
    } else {
        if buf.is_empty() {
            return Err(Error::TooSmall("path attribute length".into()));
        }
        (usize::from(buf[0]), 3)
    };
    let buf = &buf[n - 2..];
    if buf.len() < len {
        return Err(Error::TooSmall("path attribute value".into()));
    }
    n += len;

    Ok((
        PathAttribute {
            flags,
            type_code,
            value: buf[..len].to_vec(),
        },
        n,
    ))
}

fn path_attributes_from_wire(
    mut buf: &[u8],
) -> Result<Vec<PathAttribute>, Error> {
    let mut result = Vec::new();
    while !buf.is_empty() {
        let (a, n) = path_attribute_from_wire(buf)?;
        result.push(a);
        buf = &buf[n..];
    }
    Ok(result)
}

/// Path attribute type codes this implementation interprets. Anything else
/// is carried opaquely.
#[derive(Debug, PartialEq, Eq, Copy, Clone, TryFromPrimitive)]
#[repr(u8)]
pub enum PathAttributeTypeCode {
    /// RFC 4271
    Origin = 1,
    AsPath = 2,
    NextHop = 3,

    /// RFC 4760
    MpReachNlri = 14,
    MpUnreachNlri = 15,

    /// RFC 4360
    ExtendedCommunities = 16,

    /// RFC 9252
    PrefixSid = 40,
}

fn expect_type_code(
    a: &PathAttribute,
    code: PathAttributeTypeCode,
) -> Result<(), Error> {
    if a.type_code != code as u8 {
        return Err(Error::AttributeTypeMismatch {
            expected: code as u8,
            found: a.type_code,
        });
    }
    Ok(())
}

/// Build an ORIGIN attribute (well-known, transitive).
pub fn origin_attr(origin: PathOrigin) -> PathAttribute {
    PathAttribute {
        flags: PathAttribute::TRANSITIVE,
        type_code: PathAttributeTypeCode::Origin as u8,
        value: vec![origin as u8],
    }
}

pub fn origin_from_attr(a: &PathAttribute) -> Result<PathOrigin, Error> {
    expect_type_code(a, PathAttributeTypeCode::Origin)?;
    if a.value.len() != 1 {
        return Err(Error::BadLength {
            expected: 1,
            found: a.value.len(),
        });
    }
    Ok(PathOrigin::try_from(a.value[0])?)
}

/// Build an AS_PATH attribute with a single segment (well-known,
/// transitive).
pub fn as_path_attr(path: &AsPath) -> Result<PathAttribute, Error> {
    if path.segments.len() > usize::from(u8::MAX) {
        return Err(Error::TooLarge("as path".into()));
    }
    let mut value =
        vec![if path.sequence { 2 } else { 1 }, path.segments.len() as u8];
    for s in &path.segments {
        value.extend_from_slice(&s.to_be_bytes());
    }
    Ok(PathAttribute {
        flags: PathAttribute::TRANSITIVE,
        type_code: PathAttributeTypeCode::AsPath as u8,
        value,
    })
}

pub fn as_path_from_attr(a: &PathAttribute) -> Result<AsPath, Error> {
    expect_type_code(a, PathAttributeTypeCode::AsPath)?;
    if a.value.len() < 2 {
        return Err(Error::TooSmall("as path attribute".into()));
    }
    let count = usize::from(a.value[1]);
    if a.value.len() < 2 + count * 2 {
        return Err(Error::TooSmall("as path segments".into()));
    }
    let mut segments = Vec::with_capacity(count);
    for i in 0..count {
        let off = 2 + i * 2;
        segments.push(u16::from_be_bytes([a.value[off], a.value[off + 1]]));
    }
    Ok(AsPath {
        sequence: a.value[0] == 2,
        segments,
    })
}

/// Build a NEXT_HOP attribute (well-known, transitive). Top-level next hops
/// are IPv4; other families carry theirs inside MP_REACH_NLRI.
pub fn next_hop_attr(next_hop: Ipv4Addr) -> PathAttribute {
    PathAttribute {
        flags: PathAttribute::TRANSITIVE,
        type_code: PathAttributeTypeCode::NextHop as u8,
        value: next_hop.octets().to_vec(),
    }
}

pub fn next_hop_from_attr(a: &PathAttribute) -> Result<Ipv4Addr, Error> {
    expect_type_code(a, PathAttributeTypeCode::NextHop)?;
    if a.value.len() != 4 {
        return Err(Error::BadLength {
            expected: 4,
            found: a.value.len(),
        });
    }
    Ok(Ipv4Addr::new(a.value[0], a.value[1], a.value[2], a.value[3]))
}

/// Reachability information for one address family: a labeled-VPN NLRI for
/// that family, or a plain length-prefixed prefix for unicast.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Nlri {
    Unicast(Prefix),
    LabeledVpn(VpnNlri),
}

impl Nlri {
    /// The address prefix this NLRI covers.
    pub fn prefix(&self) -> &Prefix {
        match self {
            Self::Unicast(p) => p,
            Self::LabeledVpn(v) => &v.prefix,
        }
    }

    pub fn to_wire(&self) -> Result<Vec<u8>, Error> {
        match self {
            Self::Unicast(p) => Ok(prefix_to_wire(p)),
            Self::LabeledVpn(v) => v.to_wire(),
        }
    }

    pub fn from_wire(
        buf: &[u8],
        af: AddressFamily,
    ) -> Result<(Nlri, usize), Error> {
        match af {
            AddressFamily::Ipv4Unicast | AddressFamily::Ipv6Unicast => {
                let (p, n) = prefix_from_wire(buf, af.address_bits())?;
                Ok((Nlri::Unicast(p), n))
            }
            AddressFamily::Ipv6LabeledVpn => {
                let (v, n) = VpnNlri::from_wire(buf)?;
                Ok((Nlri::LabeledVpn(v), n))
            }
        }
    }
}

fn nlri_list_from_wire(
    mut buf: &[u8],
    af: AddressFamily,
) -> Result<Vec<Nlri>, Error> {
    let mut result = Vec::new();
    while !buf.is_empty() {
        let (n, len) = Nlri::from_wire(buf, af)?;
        result.push(n);
        buf = &buf[len..];
    }
    Ok(result)
}

/// A labeled-VPN NLRI: a label stack terminated by the bottom-of-stack
/// bit, an 8-byte route distinguisher and the address prefix.
///
/// ```text
/// +---------------------------+
/// | Length (1 octet)          |  label bits + RD bits + prefix bits
/// +---------------------------+
/// | Label stack (3n octets)   |
/// +---------------------------+
/// | RD (8 octets)             |
/// +---------------------------+
/// | Prefix (variable)         |
/// +---------------------------+
/// ```
///
/// Ref: RFC 8277 §2, RFC 4364 §4.3.4
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct VpnNlri {
    pub labels: Vec<Label>,
    pub rd: RouteDistinguisher,
    pub prefix: Prefix,
}

impl VpnNlri {
    pub fn to_wire(&self) -> Result<Vec<u8>, Error> {
        let bits =
            self.labels.len() * 24 + 64 + usize::from(self.prefix.length());
        if bits > usize::from(u8::MAX) {
            return Err(Error::TooLarge("vpn nlri length".into()));
        }
        let mut buf = vec![bits as u8];
        for l in &self.labels {
            buf.extend_from_slice(&l.0);
        }
        buf.extend_from_slice(&self.rd.0);
        let n = prefix_byte_length(usize::from(self.prefix.length()));
        buf.extend_from_slice(&self.prefix.octets()[..n]);
        Ok(buf)
    }

    pub fn from_wire(buf: &[u8]) -> Result<(VpnNlri, usize), Error> {
        let Some(&bits) = buf.first() else {
            return Err(Error::TooSmall("vpn nlri length".into()));
        };
        let mut at = 1;

        let mut labels = Vec::new();
        loop {
            if buf.len() < at + 3 {
                return Err(Error::TooSmall("vpn nlri label".into()));
            }
            let label = Label([buf[at], buf[at + 1], buf[at + 2]]);
            at += 3;
            let bottom = label.bottom();
            labels.push(label);
            if bottom {
                break;
            }
        }

        if buf.len() < at + 8 {
            return Err(Error::TooSmall("vpn nlri rd".into()));
        }
        let mut rd = [0u8; 8];
        rd.copy_from_slice(&buf[at..at + 8]);
        at += 8;

        let mask_bits = usize::from(bits)
            .checked_sub(labels.len() * 24 + 64)
            .ok_or(Error::InvalidPrefixLength(bits))?;
        if mask_bits > 128 {
            return Err(Error::InvalidPrefixLength(bits));
        }
        let n = prefix_byte_length(mask_bits);
        if buf.len() < at + n {
            return Err(Error::TooSmall("vpn nlri prefix".into()));
        }
        let mut octets = [0u8; 16];
        octets[..n].copy_from_slice(&buf[at..at + n]);
        at += n;

        Ok((
            VpnNlri {
                labels,
                rd: RouteDistinguisher(rd),
                prefix: Prefix::V6(Prefix6 {
                    value: Ipv6Addr::from(octets),
                    length: mask_bits as u8,
                }),
            },
            at,
        ))
    }
}

/// The MP_REACH_NLRI attribute: reachable destinations in one address
/// family together with their next hops.
///
/// Value layout: `AFI(2) | SAFI(1) | nh_len(1) | next hops | reserved(1) |
/// NLRI`. Next hops are kept as raw octet strings of the family's next hop
/// size; labeled-VPN next hops carry an 8-byte zero RD ahead of the
/// address.
///
/// Ref: RFC 4760 §3
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct MpReachNlri {
    pub af: AddressFamily,
    pub next_hops: Vec<Vec<u8>>,
    pub nlri: Vec<Nlri>,
}

impl MpReachNlri {
    /// Encode a next hop address for the given family.
    pub fn encode_next_hop(
        af: AddressFamily,
        addr: IpAddr,
    ) -> Result<Vec<u8>, Error> {
        match (af, addr) {
            (AddressFamily::Ipv4Unicast, IpAddr::V4(v4)) => {
                Ok(v4.octets().to_vec())
            }
            (AddressFamily::Ipv6Unicast, IpAddr::V6(v6)) => {
                Ok(v6.octets().to_vec())
            }
            (AddressFamily::Ipv6LabeledVpn, IpAddr::V6(v6)) => {
                let mut buf = vec![0u8; 8];
                buf.extend_from_slice(&v6.octets());
                Ok(buf)
            }
            (af, addr) => Err(Error::InvalidAddress(format!(
                "next hop {addr} does not fit address family {af}"
            ))),
        }
    }

    /// The next hop the speaker will use for routes in this attribute.
    // TODO: pick the best next hop rather than the first.
    pub fn next_hop_addr(&self) -> Result<Option<IpAddr>, Error> {
        let Some(bytes) = self.next_hops.first() else {
            return Ok(None);
        };
        let addr = match self.af {
            AddressFamily::Ipv4Unicast => {
                let octets: [u8; 4] =
                    bytes.as_slice().try_into().map_err(|_| {
                        Error::BadLength {
                            expected: 4,
                            found: bytes.len(),
                        }
                    })?;
                IpAddr::V4(Ipv4Addr::from(octets))
            }
            AddressFamily::Ipv6Unicast | AddressFamily::Ipv6LabeledVpn => {
                let at = self.af.next_hop_size() - 16;
                if bytes.len() != self.af.next_hop_size() {
                    return Err(Error::BadLength {
                        expected: self.af.next_hop_size(),
                        found: bytes.len(),
                    });
                }
                let octets: [u8; 16] = bytes[at..].try_into().unwrap();
                IpAddr::V6(Ipv6Addr::from(octets))
            }
        };
        Ok(Some(addr))
    }

    pub fn to_attribute(&self) -> Result<PathAttribute, Error> {
        let mut value = self.af.afi().to_be_bytes().to_vec();
        value.push(self.af.safi());

        let nh_len: usize = self.next_hops.iter().map(Vec::len).sum();
        if nh_len > usize::from(u8::MAX) {
            return Err(Error::TooLarge("mp_reach next hops".into()));
        }
        value.push(nh_len as u8);
        for nh in &self.next_hops {
            value.extend_from_slice(nh);
        }
        value.push(0); // reserved
        for n in &self.nlri {
            value.extend_from_slice(&n.to_wire()?);
        }

        Ok(PathAttribute {
            flags: PathAttribute::OPTIONAL,
            type_code: PathAttributeTypeCode::MpReachNlri as u8,
            value,
        })
    }

    pub fn from_attribute(a: &PathAttribute) -> Result<MpReachNlri, Error> {
        expect_type_code(a, PathAttributeTypeCode::MpReachNlri)?;
        if a.value.len() < 5 {
            return Err(Error::TooSmall("mp_reach attribute".into()));
        }
        let afi = u16::from_be_bytes([a.value[0], a.value[1]]);
        let safi = a.value[2];
        let af = AddressFamily::from_parts(afi, safi)
            .ok_or(Error::UnsupportedAddressFamily { afi, safi })?;

        let nh_len = usize::from(a.value[3]);
        if a.value.len() < 5 + nh_len {
            return Err(Error::TooSmall("mp_reach next hops".into()));
        }
        let count = nh_len / af.next_hop_size();
        let mut next_hops = Vec::with_capacity(count);
        for i in 0..count {
            let off = 4 + af.next_hop_size() * i;
            next_hops.push(a.value[off..off + af.next_hop_size()].to_vec());
        }

        // one reserved byte sits between the next hops and the NLRI
        let nlri = nlri_list_from_wire(&a.value[5 + nh_len..], af)?;

        Ok(MpReachNlri {
            af,
            next_hops,
            nlri,
        })
    }
}

/// The MP_UNREACH_NLRI attribute: destinations in one address family that
/// are no longer reachable.
///
/// Value layout: `AFI(2) | SAFI(1) | withdrawn NLRI`.
///
/// Ref: RFC 4760 §4
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct MpUnreachNlri {
    pub af: AddressFamily,
    pub withdrawn: Vec<Nlri>,
}

impl MpUnreachNlri {
    pub fn to_attribute(&self) -> Result<PathAttribute, Error> {
        let mut value = self.af.afi().to_be_bytes().to_vec();
        value.push(self.af.safi());
        for n in &self.withdrawn {
            value.extend_from_slice(&n.to_wire()?);
        }
        Ok(PathAttribute {
            flags: PathAttribute::OPTIONAL,
            type_code: PathAttributeTypeCode::MpUnreachNlri as u8,
            value,
        })
    }

    pub fn from_attribute(a: &PathAttribute) -> Result<MpUnreachNlri, Error> {
        expect_type_code(a, PathAttributeTypeCode::MpUnreachNlri)?;
        if a.value.len() < 3 {
            return Err(Error::TooSmall("mp_unreach attribute".into()));
        }
        let afi = u16::from_be_bytes([a.value[0], a.value[1]]);
        let safi = a.value[2];
        let af = AddressFamily::from_parts(afi, safi)
            .ok_or(Error::UnsupportedAddressFamily { afi, safi })?;
        let withdrawn = nlri_list_from_wire(&a.value[3..], af)?;
        Ok(MpUnreachNlri { af, withdrawn })
    }
}

/// One extended community: a type, a subtype and six bytes of value.
///
/// Ref: RFC 4360 §2
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub struct ExtendedCommunity {
    pub typ: u8,
    pub subtype: u8,
    pub value: [u8; 6],
}

impl ExtendedCommunity {
    pub fn to_wire(&self) -> [u8; 8] {
        let mut buf = [self.typ, self.subtype, 0, 0, 0, 0, 0, 0];
        buf[2..].copy_from_slice(&self.value);
        buf
    }

    pub fn from_wire(buf: &[u8]) -> Result<ExtendedCommunity, Error> {
        if buf.len() != 8 {
            return Err(Error::BadLength {
                expected: 8,
                found: buf.len(),
            });
        }
        Ok(ExtendedCommunity {
            typ: buf[0],
            subtype: buf[1],
            value: buf[2..8].try_into().unwrap(),
        })
    }
}

/// The EXTENDED_COMMUNITIES attribute: a sequence of 8-byte communities.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct ExtendedCommunities(pub Vec<ExtendedCommunity>);

impl ExtendedCommunities {
    pub fn to_attribute(&self) -> PathAttribute {
        let mut value = Vec::with_capacity(self.0.len() * 8);
        for c in &self.0 {
            value.extend_from_slice(&c.to_wire());
        }
        PathAttribute {
            flags: PathAttribute::OPTIONAL | PathAttribute::TRANSITIVE,
            type_code: PathAttributeTypeCode::ExtendedCommunities as u8,
            value,
        }
    }

    pub fn from_attribute(
        a: &PathAttribute,
    ) -> Result<ExtendedCommunities, Error> {
        expect_type_code(a, PathAttributeTypeCode::ExtendedCommunities)?;
        if a.value.len() % 8 != 0 {
            return Err(Error::BadLength {
                expected: a.value.len().next_multiple_of(8),
                found: a.value.len(),
            });
        }
        let mut result = Vec::with_capacity(a.value.len() / 8);
        for chunk in a.value.chunks(8) {
            result.push(ExtendedCommunity::from_wire(chunk)?);
        }
        Ok(ExtendedCommunities(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use pretty_hex::*;

    #[test]
    fn header_round_trip() {
        let h0 = Header {
            length: 0x1701,
            typ: MessageType::Notification as u8,
        };

        let buf = h0.to_wire();
        println!("buf: {}", buf.hex_dump());

        let mut expected = vec![0xffu8; 16];
        expected.extend_from_slice(&[0x17, 0x01, 3]);
        assert_eq!(buf, expected);

        let h1 = Header::from_wire(&buf).expect("header from wire");
        assert_eq!(h0, h1);
    }

    #[test]
    fn header_rejects_bad_marker() {
        let mut buf = Header {
            length: 19,
            typ: 4,
        }
        .to_wire();
        buf[7] = 0xfe;
        assert!(matches!(Header::from_wire(&buf), Err(Error::NoMarker)));
    }

    #[test]
    fn header_rejects_bad_length() {
        let mut buf = vec![0xffu8; 16];
        buf.extend_from_slice(&18u16.to_be_bytes());
        buf.push(4);
        assert!(matches!(
            Header::from_wire(&buf),
            Err(Error::TooSmall(_))
        ));

        let mut buf = vec![0xffu8; 16];
        buf.extend_from_slice(&4097u16.to_be_bytes());
        buf.push(4);
        assert!(matches!(
            Header::from_wire(&buf),
            Err(Error::TooLarge(_))
        ));
    }

    #[test]
    fn open_round_trip() {
        let mut om0 =
            OpenMessage::new(65001, 180, Ipv4Addr::new(10, 0, 0, 1));
        om0.add_multiprotocol(AddressFamily::Ipv4Unicast);
        om0.add_multiprotocol(AddressFamily::Ipv6LabeledVpn);

        let buf = om0.to_wire().expect("open message to wire");
        println!("buf: {}", buf.hex_dump());

        assert_eq!(
            buf,
            vec![
                4, // version
                0xfd, 0xe9, // asn
                0, 180, // hold time
                10, 0, 0, 1,  // id
                16, // optional parameter length
                2, 6, 1, 4, 0, 1, 0, 1, // mp ipv4-unicast
                2, 6, 1, 4, 0, 2, 0, 128, // mp ipv6-vpn
            ]
        );

        let om1 = OpenMessage::from_wire(&buf).expect("open from wire");
        assert_eq!(om0, om1);
    }

    #[test]
    fn open_rejects_inconsistent_parameter_length() {
        let om = OpenMessage::new(65001, 180, Ipv4Addr::new(10, 0, 0, 1));
        let mut buf = om.to_wire().unwrap();
        buf[9] = 7; // declares parameters that are not present
        assert!(matches!(
            OpenMessage::from_wire(&buf),
            Err(Error::BadLength { .. })
        ));

        assert!(matches!(
            OpenMessage::from_wire(&buf[..8]),
            Err(Error::TooSmall(_))
        ));
    }

    #[test]
    fn prefix_byte_length_covers_mask() {
        for n in 0..=128usize {
            assert_eq!(prefix_byte_length(n), n.div_ceil(8));
        }
        assert_eq!(prefix_byte_length(0), 0);
        assert_eq!(prefix_byte_length(1), 1);
        assert_eq!(prefix_byte_length(8), 1);
        assert_eq!(prefix_byte_length(9), 2);
        assert_eq!(prefix_byte_length(24), 3);
        assert_eq!(prefix_byte_length(128), 16);
    }

    #[test]
    fn prefix_wire_format() {
        let p: Prefix = "10.1.0.0/24".parse().unwrap();
        assert_eq!(prefix_to_wire(&p), vec![24, 10, 1, 0]);

        let (q, n) = prefix_from_wire(&[24, 10, 1, 0], 32).unwrap();
        assert_eq!(q, p);
        assert_eq!(n, 4);

        // length byte exceeding the family width is an error
        assert!(prefix_from_wire(&[33, 0, 0, 0, 0, 0], 32).is_err());
    }

    #[test]
    fn update_round_trip() {
        let um0 = UpdateMessage {
            withdrawn: vec!["10.9.0.0/24".parse().unwrap()],
            path_attributes: vec![
                origin_attr(PathOrigin::Igp),
                as_path_attr(&AsPath {
                    sequence: true,
                    segments: vec![65001, 65002],
                })
                .unwrap(),
                next_hop_attr(Ipv4Addr::new(10, 0, 0, 1)),
            ],
            nlri: vec![
                "10.1.0.0/24".parse().unwrap(),
                "10.2.128.0/17".parse().unwrap(),
            ],
        };

        let buf = um0.to_wire().expect("update message to wire");
        println!("buf: {}", buf.hex_dump());

        let um1 = UpdateMessage::from_wire(&buf).expect("update from wire");
        assert_eq!(um0, um1);

        assert_eq!(
            origin_from_attr(&um1.path_attributes[0]).unwrap(),
            PathOrigin::Igp
        );
        assert_eq!(
            as_path_from_attr(&um1.path_attributes[1]).unwrap().segments,
            vec![65001, 65002]
        );
        assert_eq!(
            next_hop_from_attr(&um1.path_attributes[2]).unwrap(),
            Ipv4Addr::new(10, 0, 0, 1)
        );
    }

    #[test]
    fn unknown_attribute_round_trips_verbatim() {
        let a0 = PathAttribute {
            flags: PathAttribute::OPTIONAL | PathAttribute::TRANSITIVE,
            type_code: 201,
            value: vec![0xde, 0xad, 0xbe, 0xef],
        };
        let um0 = UpdateMessage {
            withdrawn: vec![],
            path_attributes: vec![a0.clone()],
            nlri: vec![],
        };
        let um1 = UpdateMessage::from_wire(&um0.to_wire().unwrap()).unwrap();
        assert_eq!(um1.path_attributes, vec![a0]);
    }

    #[test]
    fn extended_length_attribute() {
        let a0 = PathAttribute {
            flags: PathAttribute::OPTIONAL | PathAttribute::EXTENDED_LENGTH,
            type_code: 99,
            value: vec![0xab; 300],
        };
        let buf = path_attribute_to_wire(&a0).unwrap();
        assert_eq!(&buf[2..4], &300u16.to_be_bytes());

        let (a1, n) = path_attribute_from_wire(&buf).unwrap();
        assert_eq!(a0, a1);
        assert_eq!(n, 304);
    }

    #[test]
    fn short_attribute_length_over_255_fails() {
        let a = PathAttribute {
            flags: 0,
            type_code: 99,
            value: vec![0; 300],
        };
        assert!(matches!(
            path_attribute_to_wire(&a),
            Err(Error::TooLarge(_))
        ));
    }

    #[test]
    fn keepalive_must_be_empty() {
        assert_eq!(
            Message::from_wire(4, &[]).unwrap(),
            Message::KeepAlive
        );
        assert!(Message::from_wire(4, &[0]).is_err());
    }

    #[test]
    fn unknown_message_preserved() {
        let m = Message::from_wire(99, &[1, 2, 3]).unwrap();
        assert_eq!(
            m,
            Message::Unknown(UnknownMessage {
                typ: 99,
                payload: vec![1, 2, 3],
            })
        );
        assert_eq!(m.to_wire().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn mp_reach_round_trip_v6_unicast() {
        let nh: Ipv6Addr = "2001:db8::1".parse().unwrap();
        let mp0 = MpReachNlri {
            af: AddressFamily::Ipv6Unicast,
            next_hops: vec![MpReachNlri::encode_next_hop(
                AddressFamily::Ipv6Unicast,
                IpAddr::V6(nh),
            )
            .unwrap()],
            nlri: vec![Nlri::Unicast("2001:db8::/48".parse().unwrap())],
        };

        let a = mp0.to_attribute().unwrap();
        assert_eq!(a.flags, PathAttribute::OPTIONAL);
        assert_eq!(a.type_code, 14);

        let mp1 = MpReachNlri::from_attribute(&a).unwrap();
        assert_eq!(mp0, mp1);
        assert_eq!(mp1.next_hop_addr().unwrap(), Some(IpAddr::V6(nh)));
    }

    #[test]
    fn mp_unreach_round_trip() {
        let mp0 = MpUnreachNlri {
            af: AddressFamily::Ipv6Unicast,
            withdrawn: vec![Nlri::Unicast("2001:db8::/48".parse().unwrap())],
        };
        let a = mp0.to_attribute().unwrap();
        let mp1 = MpUnreachNlri::from_attribute(&a).unwrap();
        assert_eq!(mp0, mp1);
    }

    #[test]
    fn vpn_nlri_pinned_bytes() {
        let v0 = VpnNlri {
            labels: vec![Label::new(0x10000, true)],
            rd: RouteDistinguisher::new(1, 100),
            prefix: "2001:bb11::/64".parse().unwrap(),
        };

        let buf = v0.to_wire().unwrap();
        println!("buf: {}", buf.hex_dump());

        // 1 label (24 bits) + RD (64 bits) + /64 prefix = 152 bits
        assert_eq!(
            buf,
            vec![
                0x98, // length
                0x10, 0x00, 0x01, // label 0x10000 with bottom-of-stack
                0, 0, 0, 1, 0, 0, 0, 100, // rd 1:100
                0x20, 0x01, 0xbb, 0x11, 0, 0, 0, 0, // prefix bytes
            ]
        );

        let (v1, n) = VpnNlri::from_wire(&buf).unwrap();
        assert_eq!(v0, v1);
        assert_eq!(n, buf.len());
    }

    #[test]
    fn vpn_nlri_label_stack() {
        let v0 = VpnNlri {
            labels: vec![Label::new(100, false), Label::new(200, true)],
            rd: RouteDistinguisher::new(65000, 7),
            prefix: "2001:db8:1::/48".parse().unwrap(),
        };
        let buf = v0.to_wire().unwrap();
        assert_eq!(buf[0], (2 * 24 + 64 + 48) as u8);
        let (v1, _) = VpnNlri::from_wire(&buf).unwrap();
        assert_eq!(v0, v1);
    }

    #[test]
    fn mp_reach_vpn_next_hop_strips_rd() {
        let nh: Ipv6Addr = "2001:bb11::".parse().unwrap();
        let encoded = MpReachNlri::encode_next_hop(
            AddressFamily::Ipv6LabeledVpn,
            IpAddr::V6(nh),
        )
        .unwrap();
        assert_eq!(encoded.len(), 24);
        assert_eq!(&encoded[..8], &[0u8; 8]);

        let mp = MpReachNlri {
            af: AddressFamily::Ipv6LabeledVpn,
            next_hops: vec![encoded],
            nlri: vec![],
        };
        assert_eq!(mp.next_hop_addr().unwrap(), Some(IpAddr::V6(nh)));
    }

    #[test]
    fn vpn_update_with_srv6_service_round_trip() {
        use crate::srv6::{
            SidInformation, SidStructure, Srv6L3Service,
            Srv6ServiceDataSubSubTlv, Srv6ServiceSubTlv,
        };

        let nh: Ipv6Addr = "2001:bb11::".parse().unwrap();
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
        let communities = ExtendedCommunities(vec![ExtendedCommunity {
            typ: 0x00,
            subtype: 0x02,
            value: [0x00, 0x63, 0x00, 0x00, 0x00, 0x63],
        }]);
        let service = Srv6L3Service {
            sub_tlvs: vec![Srv6ServiceSubTlv::SidInformation(
                SidInformation {
                    sid: "2001:1111::".parse().unwrap(),
                    flags: 0,
                    endpoint_behavior: 0xffff,
                    sub_sub_tlvs: vec![
                        Srv6ServiceDataSubSubTlv::SidStructure(SidStructure {
                            locator_block_length: 40,
                            locator_node_length: 24,
                            function_length: 16,
                            argument_length: 0,
                            transposition_length: 16,
                            transposition_offset: 64,
                        }),
                    ],
                },
            )],
        };

        let um0 = UpdateMessage {
            withdrawn: vec![],
            path_attributes: vec![
                origin_attr(PathOrigin::Igp),
                as_path_attr(&AsPath {
                    sequence: true,
                    segments: vec![65001],
                })
                .unwrap(),
                mp.to_attribute().unwrap(),
                communities.to_attribute(),
                service.to_attribute(),
            ],
            nlri: vec![],
        };

        let buf = um0.to_wire().expect("update message to wire");
        println!("buf: {}", buf.hex_dump());

        let um1 = UpdateMessage::from_wire(&buf).expect("update from wire");
        assert_eq!(um0, um1);
        // re-emission is byte identical
        assert_eq!(buf, um1.to_wire().unwrap());

        // every field survives the trip
        let mp1 =
            MpReachNlri::from_attribute(&um1.path_attributes[2]).unwrap();
        assert_eq!(mp, mp1);
        assert_eq!(mp1.next_hop_addr().unwrap(), Some(IpAddr::V6(nh)));
        assert_eq!(
            ExtendedCommunities::from_attribute(&um1.path_attributes[3])
                .unwrap(),
            communities
        );
        assert_eq!(
            Srv6L3Service::from_attribute(&um1.path_attributes[4]).unwrap(),
            service
        );
    }

    #[test]
    fn extended_communities_round_trip() {
        let c0 = ExtendedCommunities(vec![ExtendedCommunity {
            typ: 0x00,
            subtype: 0x02,
            value: [0x00, 0x63, 0x00, 0x00, 0x00, 0x63],
        }]);
        let a = c0.to_attribute();
        assert_eq!(
            a.value,
            vec![0x00, 0x02, 0x00, 0x63, 0x00, 0x00, 0x00, 0x63]
        );
        let c1 = ExtendedCommunities::from_attribute(&a).unwrap();
        assert_eq!(c0, c1);

        let bad = PathAttribute {
            flags: a.flags,
            type_code: a.type_code,
            value: vec![0; 7],
        };
        assert!(ExtendedCommunities::from_attribute(&bad).is_err());
    }
}
