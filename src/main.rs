use anyhow::Result;
use clap::Parser;
use countyhealth::{
    api,
    config::{DataConfig, LogConfig},
};
use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about = "County health data API")]
struct Cli {
    #[command(flatten)]
    data: DataConfig,

    #[command(flatten)]
    log: LogConfig,

    /// Address to bind
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    host: IpAddr,

    #[arg(long, env = "PORT", default_value_t = 5000)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) config + logging ─────────────────────────────────────────
    let cli = Cli::parse();
    cli.log.init();
    info!("startup");

    std::panic::set_hook(Box::new(|info| {
        eprintln!("panic: {:?}", info);
    }));

    // ─── 2) datasets are read on every request, only report them here ─
    for source in cli.data.sources() {
        if source.path.exists() {
            info!(table = %source.table, path = %source.path.display(), "dataset");
        } else {
            warn!(
                table = %source.table,
                path = %source.path.display(),
                "dataset missing; requests will fail until it exists"
            );
        }
    }

    // ─── 3) serve until ctrl-c ───────────────────────────────────────
    let addr = SocketAddr::new(cli.host, cli.port);
    let routes = api::routes(Arc::new(cli.data));
    let (bound, server) = warp::serve(routes).bind_with_graceful_shutdown(addr, async {
        let _ = tokio::signal::ctrl_c().await;
        info!("shutdown requested");
    });
    info!("Server starting on {}", bound);
    info!("County data endpoint: POST http://{}/county_data", bound);
    server.await;

    info!("all done");
    Ok(())
}
