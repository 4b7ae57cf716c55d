#![forbid(unsafe_code)]

use std::{io::Write, net::SocketAddr};

use capsule_common::{codec::timestamp::TimestampCodec, engine::Engine, types::Packet};
use chrono::{DateTime, Utc};
use flate2::{write::GzEncoder, Compression};
use snafu::{Location, ResultExt, Snafu};
use tokio::{io::AsyncWriteExt, net::TcpListener};
use tracing::info;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("encode sample packet error"))]
    Encode {
        source: capsule_common::engine::Error,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("gzip payload error"))]
    Compress {
        #[snafu(source)]
        error: std::io::Error,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("bind {addr} error"))]
    Bind {
        addr: SocketAddr,
        #[snafu(source)]
        error: std::io::Error,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("accept connection error"))]
    Accept {
        #[snafu(source)]
        error: std::io::Error,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("send payload error"))]
    Send {
        #[snafu(source)]
        error: std::io::Error,
        #[snafu(implicit)]
        location: Location,
    },
}

/// Serializes the sample packet, gzips it, and sends it to the first client
/// that connects. One exchange, then the listener is dropped.
#[tracing::instrument]
pub async fn serve_once(addr: SocketAddr) -> Result<(), Error> {
    let mut engine = Engine::new();
    engine.register_custom::<DateTime<Utc>>(TimestampCodec);

    let data = engine.serialize(&Packet::sample()).context(EncodeSnafu)?;
    let compressed = compress(&data).context(CompressSnafu)?;
    info!(
        raw = data.len(),
        compressed = compressed.len(),
        "sample packet ready"
    );

    let listener = TcpListener::bind(addr).await.context(BindSnafu { addr })?;
    let (mut stream, peer) = listener.accept().await.context(AcceptSnafu)?;
    stream.write_all(&compressed).await.context(SendSnafu)?;
    stream.shutdown().await.context(SendSnafu)?;
    info!(%peer, "payload sent");
    Ok(())
}

fn compress(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use super::*;

    #[test]
    fn gzip_output_is_recoverable() {
        let compressed = compress(b"si vic pacem para bellum").unwrap();
        let mut decoder = flate2::read::GzDecoder::new(compressed.as_slice());
        let mut restored = Vec::new();
        decoder.read_to_end(&mut restored).unwrap();
        assert_eq!(restored, b"si vic pacem para bellum");
    }
}
