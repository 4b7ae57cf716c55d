use std::net::SocketAddr;

use tracing::Level;
use tracing_subscriber::{filter::Targets, layer::SubscriberExt, util::SubscriberInitExt, Layer};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_file(true)
                .with_line_number(true)
                .with_filter(
                    Targets::new()
                        .with_target("capsule_server", Level::DEBUG)
                        .with_default(Level::INFO),
                ),
        )
        .init();

    let addr: SocketAddr = "127.0.0.1:8080".parse().expect("valid demo address");
    if let Err(e) = capsule_server::serve_once(addr).await {
        eprintln!("server error: {e:?}");
        std::process::exit(1);
    }
}
