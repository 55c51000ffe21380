// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

pub mod clock;
pub mod config;
pub mod connection;
pub mod connection_tcp;
pub mod error;
pub mod messages;
pub mod session;
pub mod srv6;

#[cfg(test)]
#[macro_use]
extern crate lazy_static;

#[cfg(test)]
pub mod connection_channel;


pub const BGP_PORT: u16 = 179;
