#![forbid(unsafe_code)]

use std::{io::Read, net::SocketAddr};

use capsule_common::{codec::timestamp::TimestampCodec, engine::Engine, types::Packet};
use chrono::{DateTime, Utc};
use flate2::read::GzDecoder;
use snafu::{Location, ResultExt, Snafu};
use tokio::{io::AsyncReadExt, net::TcpStream};
use tracing::info;

/// Largest payload the demo accepts in one exchange; anything bigger
/// truncates, as in the reference demo.
pub const RECV_BUFFER_SIZE: usize = 4096;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("connect {addr} error"))]
    Connect {
        addr: SocketAddr,
        #[snafu(source)]
        error: std::io::Error,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("receive payload error"))]
    Receive {
        #[snafu(source)]
        error: std::io::Error,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("gunzip payload error"))]
    Decompress {
        #[snafu(source)]
        error: std::io::Error,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("decode packet error"))]
    Decode {
        source: capsule_common::engine::Error,
        #[snafu(implicit)]
        location: Location,
    },
}

/// Connects to the demo server, receives one gzip-compressed payload into a
/// fixed-size buffer, and decodes the packet.
#[tracing::instrument]
pub async fn fetch(addr: SocketAddr) -> Result<Packet, Error> {
    let mut stream = TcpStream::connect(addr)
        .await
        .context(ConnectSnafu { addr })?;

    let mut buf = vec![0u8; RECV_BUFFER_SIZE];
    let mut received = 0;
    loop {
        let read = stream
            .read(&mut buf[received..])
            .await
            .context(ReceiveSnafu)?;
        if read == 0 {
            break;
        }
        received += read;
        if received == buf.len() {
            break;
        }
    }
    info!(received, "payload received");

    let data = decompress(&buf[..received]).context(DecompressSnafu)?;
    let mut engine = Engine::new();
    engine.register_custom::<DateTime<Utc>>(TimestampCodec);
    engine.deserialize(&data).context(DecodeSnafu)
}

fn decompress(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut decoder = GzDecoder::new(data);
    let mut restored = Vec::new();
    decoder.read_to_end(&mut restored)?;
    Ok(restored)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn gzip_input_is_recoverable() {
        let mut encoder =
            flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(b"abcde").unwrap();
        let compressed = encoder.finish().unwrap();
        assert_eq!(decompress(&compressed).unwrap(), b"abcde");
    }

    #[test]
    fn truncated_gzip_is_rejected() {
        let mut encoder =
            flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(b"abcde").unwrap();
        let compressed = encoder.finish().unwrap();
        assert!(decompress(&compressed[..compressed.len() - 3]).is_err());
    }
}
