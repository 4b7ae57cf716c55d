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
                        .with_target("capsule_client", Level::DEBUG)
                        .with_default(Level::INFO),
                ),
        )
        .init();

    let addr: SocketAddr = "127.0.0.1:8080".parse().expect("valid demo address");
    match capsule_client::fetch(addr).await {
        Ok(packet) => println!("{packet}"),
        Err(e) => {
            eprintln!("client error: {e:?}");
            std::process::exit(1);
        }
    }
}
