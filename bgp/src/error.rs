// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use num_enum::TryFromPrimitiveError;
use rdb::{AddressFamily, PathOrigin};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("too small: {0}")]
    TooSmall(String),

    #[error("too large: {0}")]
    TooLarge(String),

    #[error("no marker")]
    NoMarker,

    #[error("bad length: expected {expected} found {found}")]
    BadLength { expected: usize, found: usize },

    #[error("invalid prefix length {0}")]
    InvalidPrefixLength(u8),

    #[error("attribute type mismatch: expected {expected} found {found}")]
    AttributeTypeMismatch { expected: u8, found: u8 },

    #[error("unsupported address family: afi {afi} safi {safi}")]
    UnsupportedAddressFamily { afi: u16, safi: u8 },

    #[error("address family {0} is not configured")]
    UnconfiguredAddressFamily(AddressFamily),

    #[error("unexpected SRv6 service TLV type {0}")]
    UnknownSrv6Tlv(u8),

    #[error("unknown SRv6 service sub-TLV type {0}")]
    UnknownSrv6SubTlv(u8),

    #[error("unknown SRv6 service data sub-sub-TLV type {0}")]
    UnknownSrv6SubSubTlv(u8),

    #[error("path origin error")]
    PathOrigin(#[from] TryFromPrimitiveError<PathOrigin>),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("io {0}")]
    Io(#[from] std::io::Error),

    #[error("channel recv {0}")]
    ChannelRecv(#[from] std::sync::mpsc::RecvError),

    #[error("channel send {0}")]
    ChannelSend(String),

    #[error("channel connect error")]
    ChannelConnect,

    #[error("attempt to send a message when not connected")]
    NotConnected,

    #[error("disconnected")]
    Disconnected,

    #[error("timeout")]
    Timeout,

    #[error("hold timer expired")]
    HoldTimerExpired,

    #[error("notification received: code {code} subcode {subcode}")]
    Notification { code: u8, subcode: u8 },

    #[error("unexpected event {event} in state {state}")]
    UnexpectedFsmEvent {
        state: &'static str,
        event: &'static str,
    },
}
