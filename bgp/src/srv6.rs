// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The SRv6 L3 Service TLV carried in the Prefix-SID path attribute
//! (type 40), as a three-level TLV tree:
//!
//! ```text
//! Prefix-SID attribute value
//! └─ SRv6 L3 Service TLV (type 5)
//!    └─ SRv6 SID Information sub-TLV (type 1)
//!       └─ SRv6 SID Structure sub-sub-TLV (type 1)
//! ```
//!
//! Lengths are computed bottom-up on emission and the encoder asserts that
//! the finalized byte count matches; the assertion stays on in production
//! builds because it catches both encoder bugs and format-evolution
//! mistakes.
//!
//! Ref: RFC 9252 §2

use crate::error::Error;
use crate::messages::PathAttributeTypeCode;
use rdb::PathAttribute;
use std::net::Ipv6Addr;

/// TLV type for the SRv6 L3 Service TLV inside the Prefix-SID attribute.
pub const SRV6_L3_SERVICE: u8 = 5;

/// An SRv6 L3 Service TLV: a list of service sub-TLVs.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Srv6L3Service {
    pub sub_tlvs: Vec<Srv6ServiceSubTlv>,
}

impl Srv6L3Service {
    pub fn to_attribute(&self) -> PathAttribute {
        let size: usize =
            self.sub_tlvs.iter().map(Srv6ServiceSubTlv::wire_len).sum();

        let mut value = Vec::with_capacity(4 + size);
        value.push(SRV6_L3_SERVICE);
        value.extend_from_slice(&(size as u16).to_be_bytes());
        value.push(0); // reserved
        for sub in &self.sub_tlvs {
            sub.write(&mut value);
        }
        assert_eq!(value.len(), size + 4, "srv6 l3 service tlv size");

        PathAttribute {
            flags: PathAttribute::OPTIONAL | PathAttribute::TRANSITIVE,
            type_code: PathAttributeTypeCode::PrefixSid as u8,
            value,
        }
    }

    pub fn from_attribute(a: &PathAttribute) -> Result<Srv6L3Service, Error> {
        if a.type_code != PathAttributeTypeCode::PrefixSid as u8 {
            return Err(Error::AttributeTypeMismatch {
                expected: PathAttributeTypeCode::PrefixSid as u8,
                found: a.type_code,
            });
        }
        if a.value.len() < 4 {
            return Err(Error::TooSmall("prefix-sid attribute".into()));
        }
        if a.value[0] != SRV6_L3_SERVICE {
            return Err(Error::UnknownSrv6Tlv(a.value[0]));
        }

        // first 4 bytes: type(1) + length(2) + reserved(1)
        let mut buf = &a.value[4..];
        let mut sub_tlvs = Vec::new();
        while !buf.is_empty() {
            let (sub, n) = Srv6ServiceSubTlv::read(buf)?;
            sub_tlvs.push(sub);
            buf = &buf[n..];
        }

        Ok(Srv6L3Service { sub_tlvs })
    }
}

/// Service sub-TLVs of the SRv6 L3 Service TLV. Only SID Information
/// (type 1) is defined here; unknown types are a decode error.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Srv6ServiceSubTlv {
    SidInformation(SidInformation),
}

impl Srv6ServiceSubTlv {
    fn wire_len(&self) -> usize {
        match self {
            Self::SidInformation(s) => s.wire_len(),
        }
    }

    fn write(&self, buf: &mut Vec<u8>) {
        match self {
            Self::SidInformation(s) => s.write(buf),
        }
    }

    fn read(buf: &[u8]) -> Result<(Srv6ServiceSubTlv, usize), Error> {
        if buf.len() < 3 {
            return Err(Error::TooSmall("srv6 service sub-tlv".into()));
        }
        let typ = buf[0];
        let len = usize::from(u16::from_be_bytes([buf[1], buf[2]]));
        if buf.len() < 3 + len {
            return Err(Error::TooSmall("srv6 service sub-tlv value".into()));
        }
        match typ {
            1 => {
                let s = SidInformation::from_value(&buf[3..3 + len])?;
                Ok((Srv6ServiceSubTlv::SidInformation(s), 3 + len))
            }
            t => Err(Error::UnknownSrv6SubTlv(t)),
        }
    }
}

/// The SRv6 SID Information sub-TLV (type 1): a SID, its flags and
/// endpoint behavior, and optional service data sub-sub-TLVs.
///
/// ```text
/// type(1) | length(2) | reserved(1) | SID(16) | flags(1) |
/// endpoint behavior(2) | reserved(1) | sub-sub-TLVs
/// ```
///
/// Ref: RFC 9252 §3.1
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct SidInformation {
    pub sid: Ipv6Addr,
    pub flags: u8,
    pub endpoint_behavior: u16,
    pub sub_sub_tlvs: Vec<Srv6ServiceDataSubSubTlv>,
}

impl SidInformation {
    fn wire_len(&self) -> usize {
        24 + self
            .sub_sub_tlvs
            .iter()
            .map(Srv6ServiceDataSubSubTlv::wire_len)
            .sum::<usize>()
    }

    fn write(&self, buf: &mut Vec<u8>) {
        buf.push(1); // type: SID information
        // the type and length bytes themselves are not counted
        buf.extend_from_slice(&((self.wire_len() - 3) as u16).to_be_bytes());
        buf.push(0); // reserved
        buf.extend_from_slice(&self.sid.octets());
        buf.push(self.flags);
        buf.extend_from_slice(&self.endpoint_behavior.to_be_bytes());
        buf.push(0); // reserved
        for sub in &self.sub_sub_tlvs {
            sub.write(buf);
        }
    }

    fn from_value(b: &[u8]) -> Result<SidInformation, Error> {
        if b.len() < 21 {
            return Err(Error::TooSmall("sid information sub-tlv".into()));
        }
        let sid: [u8; 16] = b[1..17].try_into().unwrap();
        let mut v = SidInformation {
            sid: Ipv6Addr::from(sid),
            flags: b[17],
            endpoint_behavior: u16::from_be_bytes([b[18], b[19]]),
            sub_sub_tlvs: Vec::new(),
        };

        let mut buf = &b[21..];
        while !buf.is_empty() {
            let (sub, n) = Srv6ServiceDataSubSubTlv::read(buf)?;
            v.sub_sub_tlvs.push(sub);
            buf = &buf[n..];
        }
        Ok(v)
    }
}

/// Service data sub-sub-TLVs of the SID Information sub-TLV. Only SID
/// Structure (type 1) is defined here.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Srv6ServiceDataSubSubTlv {
    SidStructure(SidStructure),
}

impl Srv6ServiceDataSubSubTlv {
    fn wire_len(&self) -> usize {
        match self {
            // type (1) + length (2) + values (6)
            Self::SidStructure(_) => 9,
        }
    }

    fn write(&self, buf: &mut Vec<u8>) {
        match self {
            Self::SidStructure(s) => s.write(buf),
        }
    }

    fn read(buf: &[u8]) -> Result<(Srv6ServiceDataSubSubTlv, usize), Error> {
        if buf.len() < 3 {
            return Err(Error::TooSmall("srv6 service sub-sub-tlv".into()));
        }
        let typ = buf[0];
        let len = usize::from(u16::from_be_bytes([buf[1], buf[2]]));
        if buf.len() < 3 + len {
            return Err(Error::TooSmall(
                "srv6 service sub-sub-tlv value".into(),
            ));
        }
        match typ {
            1 => {
                let s = SidStructure::from_value(&buf[3..3 + len])?;
                Ok((Srv6ServiceDataSubSubTlv::SidStructure(s), 3 + len))
            }
            t => Err(Error::UnknownSrv6SubSubTlv(t)),
        }
    }
}

/// The SRv6 SID Structure sub-sub-TLV (type 1): how the 128 SID bits are
/// split into locator block, locator node, function and argument, plus the
/// transposition scheme in use.
///
/// Ref: RFC 9252 §3.2.1
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub struct SidStructure {
    pub locator_block_length: u8,
    pub locator_node_length: u8,
    pub function_length: u8,
    pub argument_length: u8,
    pub transposition_length: u8,
    pub transposition_offset: u8,
}

impl SidStructure {
    fn write(&self, buf: &mut Vec<u8>) {
        buf.push(1); // type: SID structure
        buf.extend_from_slice(&6u16.to_be_bytes());
        buf.extend_from_slice(&[
            self.locator_block_length,
            self.locator_node_length,
            self.function_length,
            self.argument_length,
            self.transposition_length,
            self.transposition_offset,
        ]);
    }

    fn from_value(b: &[u8]) -> Result<SidStructure, Error> {
        if b.len() < 6 {
            return Err(Error::TooSmall("sid structure sub-sub-tlv".into()));
        }
        Ok(SidStructure {
            locator_block_length: b[0],
            locator_node_length: b[1],
            function_length: b[2],
            argument_length: b[3],
            transposition_length: b[4],
            transposition_offset: b[5],
        })
    }
}
