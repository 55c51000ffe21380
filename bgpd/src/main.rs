// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::admin::HandlerContext;
use crate::config::Config;
use bgp::config::{AfConfig, PeerConfig};
use bgp::connection_tcp::BgpConnectionTcp;
use bgp::session::SessionRunner;
use clap::{Args, Parser, Subcommand};
use fib::iproute::IpRoute;
use fib::FibSync;
use rdb::{AddressFamily, AsPath, PathOrigin, Rib, RibEntry};
use slog::{error, info, Drain, Logger};
use std::collections::BTreeMap;
use std::fs::File;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

mod admin;
mod config;

#[derive(Parser, Debug)]
#[command(version, about = "a small bgp speaker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the speaker.
    Run(Run),
    /// Generate the OpenAPI spec for the admin server.
    Apigen,
}

#[derive(Args, Debug)]
struct Run {
    /// Path to a JSON config file. Without one, configuration comes from
    /// the MY_ASN / ROUTER_ID / NEIGHBOR_ADDR environment variables.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listening address for the admin server.
    #[arg(long, default_value = "0.0.0.0:8000")]
    admin_addr: SocketAddr,
}

#[tokio::main]
async fn main() {
    let args = Cli::parse();
    match args.command {
        Commands::Run(r) => run(r).await,
        Commands::Apigen => apigen(),
    }
}

fn apigen() {
    let api = admin::api_description();
    let openapi = api.openapi("BGP Admin", "v0.1.0");
    let mut out = File::create("bgpd-admin.json").expect("create spec file");
    openapi.write(&mut out).expect("write spec file");
}

async fn run(args: Run) {
    let log = init_logger();

    let cfg = match &args.config {
        Some(path) => config::load(path),
        None => config::from_env(),
    };
    let cfg = match cfg {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(log, "configuration: {e:#}");
            std::process::exit(1);
        }
    };

    let ribs: BTreeMap<AddressFamily, Rib> = cfg
        .families
        .keys()
        .map(|af| (*af, Rib::new()))
        .collect();

    seed_networks(&cfg, &ribs, &log);

    // only unicast families map onto the kernel forwarding table
    let mut syncers = Vec::new();
    for af in [AddressFamily::Ipv4Unicast, AddressFamily::Ipv6Unicast] {
        if let Some(rib) = ribs.get(&af) {
            syncers.push(FibSync::new(
                rib.clone(),
                Arc::new(IpRoute::new(log.clone())),
                log.clone(),
            ));
        }
    }

    let admin = admin::start_server(
        log.clone(),
        args.admin_addr,
        Arc::new(HandlerContext {
            ribs: ribs.clone(),
            log: log.clone(),
        }),
    )
    .expect("start admin server");

    spawn_supervisor(cfg, ribs, log);

    admin.await.expect("admin server");
}

fn seed_networks(
    cfg: &Config,
    ribs: &BTreeMap<AddressFamily, Rib>,
    log: &Logger,
) {
    for network in &cfg.networks {
        let af = match network.ip() {
            IpAddr::V4(_) => AddressFamily::Ipv4Unicast,
            IpAddr::V6(_) => AddressFamily::Ipv6Unicast,
        };
        let Some(rib) = ribs.get(&af) else {
            error!(log, "network {network}: {af} is not configured");
            continue;
        };
        info!(log, "originating network {network}");
        rib.update(RibEntry {
            af,
            prefix: *network,
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
    }
}

/// Run session after session against the configured neighbor, pausing a
/// second between attempts. A fresh runner is built each time so a failed
/// session leaves nothing behind.
fn spawn_supervisor(
    cfg: Config,
    ribs: BTreeMap<AddressFamily, Rib>,
    log: Logger,
) {
    std::thread::spawn(move || loop {
        let peer_config = PeerConfig {
            asn: cfg.asn,
            id: cfg.router_id,
            neighbor: cfg.neighbor,
            hold_time: cfg.hold_time,
            resolution: cfg.resolution,
        };
        let families: BTreeMap<AddressFamily, AfConfig> = cfg
            .families
            .iter()
            .map(|(af, next_hop)| {
                (
                    *af,
                    AfConfig {
                        next_hop: *next_hop,
                        rib: ribs[af].clone(),
                    },
                )
            })
            .collect();

        let mut runner = SessionRunner::<BgpConnectionTcp>::new(
            peer_config,
            families,
            log.clone(),
        );
        if let Err(e) = runner.run() {
            error!(log, "session: {e}");
        }
        drop(runner);
        std::thread::sleep(Duration::from_secs(1));
    });
}

fn init_logger() -> Logger {
    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    let drain = slog_envlogger::new(drain).fuse();
    let drain = slog_async::Async::new(drain)
        .chan_size(0x2000)
        .build()
        .fuse();
    slog::Logger::root(drain, slog::o!())
}
