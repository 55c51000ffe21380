// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The HTTP inspection server: read the RIBs and add or delete locally
//! originated networks.

use dropshot::{
    endpoint, ApiDescription, ConfigDropshot, ConfigLogging,
    ConfigLoggingLevel, HttpError, HttpResponseOk,
    HttpResponseUpdatedNoContent, HttpServerStarter, Query, RequestContext,
    TypedBody,
};
use rdb::{AddressFamily, AsPath, PathOrigin, Prefix, Rib, RibEntry};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use slog::{error, info, warn, Logger};
use std::collections::BTreeMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tokio::task::JoinHandle;

pub struct HandlerContext {
    pub ribs: BTreeMap<AddressFamily, Rib>,
    pub log: Logger,
}

/// One RIB entry as reported by `GET /rib`.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct RibEntryInfo {
    pub prefix: String,
    pub as_path: Vec<u16>,
    pub next_hop: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct AddNetworkRequest {
    /// Network to originate, in CIDR form.
    pub prefix: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct DeleteNetworkParams {
    /// Network to stop originating, in CIDR form.
    pub prefix: String,
}

#[endpoint { method = GET, path = "/rib" }]
async fn get_rib(
    ctx: RequestContext<Arc<HandlerContext>>,
) -> Result<HttpResponseOk<Vec<RibEntryInfo>>, HttpError> {
    let mut result = Vec::new();
    for rib in ctx.context().ribs.values() {
        for e in rib.entries() {
            result.push(RibEntryInfo {
                prefix: e.prefix.to_string(),
                as_path: e.as_path.segments.clone(),
                next_hop: e
                    .next_hop
                    .map(|nh| nh.to_string())
                    .unwrap_or_default(),
            });
        }
    }
    Ok(HttpResponseOk(result))
}

#[endpoint { method = POST, path = "/network/add" }]
async fn add_network(
    ctx: RequestContext<Arc<HandlerContext>>,
    request: TypedBody<AddNetworkRequest>,
) -> Result<HttpResponseUpdatedNoContent, HttpError> {
    let ctx = ctx.context();
    let rq = request.into_inner();

    let (prefix, rib) = lookup(ctx, &rq.prefix)?;
    if rib.find(&prefix).is_some() {
        return Err(HttpError::for_bad_request(
            None,
            "network already exists in RIB".into(),
        ));
    }

    info!(ctx.log, "originating network {prefix}");
    rib.update(RibEntry {
        af: unicast_family(&prefix),
        prefix,
        origin: PathOrigin::Igp,
        as_path: AsPath {
            sequence: true,
            segments: vec![],
        },
        next_hop: None,
        other_attributes: vec![],
        vpn: None,
        source: None,
    });

    Ok(HttpResponseUpdatedNoContent())
}

#[endpoint { method = DELETE, path = "/network/delete" }]
async fn delete_network(
    ctx: RequestContext<Arc<HandlerContext>>,
    query: Query<DeleteNetworkParams>,
) -> Result<HttpResponseUpdatedNoContent, HttpError> {
    let ctx = ctx.context();
    let rq = query.into_inner();

    let (prefix, rib) = lookup(ctx, &rq.prefix)?;
    let Some(e) = rib.find(&prefix) else {
        return Err(HttpError::for_not_found(
            None,
            "not found in RIB".into(),
        ));
    };
    if e.source.is_some() {
        return Err(HttpError::for_client_error(
            None,
            http::StatusCode::FORBIDDEN,
            "the entry is not managed by us".into(),
        ));
    }

    info!(ctx.log, "withdrawing network {prefix}");
    rib.remove(&e);

    Ok(HttpResponseUpdatedNoContent())
}

fn unicast_family(prefix: &Prefix) -> AddressFamily {
    match prefix.ip() {
        IpAddr::V4(_) => AddressFamily::Ipv4Unicast,
        IpAddr::V6(_) => AddressFamily::Ipv6Unicast,
    }
}

fn lookup<'a>(
    ctx: &'a HandlerContext,
    prefix: &str,
) -> Result<(Prefix, &'a Rib), HttpError> {
    let prefix: Prefix = prefix.parse().map_err(|_| {
        HttpError::for_bad_request(None, format!("bad prefix {prefix:?}"))
    })?;
    let rib = ctx.ribs.get(&unicast_family(&prefix)).ok_or_else(|| {
        HttpError::for_bad_request(
            None,
            format!("{} is not configured", unicast_family(&prefix)),
        )
    })?;
    Ok((prefix, rib))
}

pub fn start_server(
    log: Logger,
    addr: SocketAddr,
    context: Arc<HandlerContext>,
) -> Result<JoinHandle<()>, String> {
    let ds_config = ConfigDropshot {
        bind_address: addr,
        ..Default::default()
    };

    let ds_log = ConfigLogging::StderrTerminal {
        level: ConfigLoggingLevel::Error,
    }
    .to_logger("admin")
    .map_err(|e| e.to_string())?;

    let api = api_description();

    let server = HttpServerStarter::new(&ds_config, api, context, &ds_log)
        .map_err(|e| format!("new admin dropshot: {e}"))?;

    info!(log, "admin: listening on {addr}");

    Ok(tokio::spawn(async move {
        match server.start().await {
            Ok(_) => warn!(log, "admin: unexpected server exit"),
            Err(e) => error!(log, "admin: server start error {e:?}"),
        }
    }))
}

pub fn api_description() -> ApiDescription<Arc<HandlerContext>> {
    let mut api = ApiDescription::new();
    api.register(get_rib).unwrap();
    api.register(add_network).unwrap();
    api.register(delete_network).unwrap();
    api
}
