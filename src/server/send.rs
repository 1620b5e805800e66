//! The send loop (§4.G): serializes a [`Response`] and writes it to the
//! socket under a single timeout.

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

use crate::http::error::{Error, TransportError};
use crate::http::Response;

use super::config::SendOptions;

fn map_io_error(err: std::io::Error) -> TransportError {
    match err.kind() {
        std::io::ErrorKind::UnexpectedEof | std::io::ErrorKind::BrokenPipe => {
            TransportError::EndOfStream
        }
        std::io::ErrorKind::OutOfMemory => TransportError::BadAlloc,
        _ => TransportError::ShortRead,
    }
}

/// Serializes `response` and writes it in full to `stream`, bounded by
/// `opts.total_timeout`. Returns the number of bytes written.
pub async fn send_response(
    stream: &mut TcpStream,
    response: &Response,
    opts: &SendOptions,
) -> Result<usize, Error> {
    let bytes = response.serialize()?;

    let write = async {
        stream.write_all(&bytes).await?;
        stream.flush().await
    };

    match tokio::time::timeout(opts.total_timeout, write).await {
        Err(_elapsed) => Err(Error::from(crate::http::error::TimingError::SendTimeout)),
        Ok(Err(io_err)) => Err(Error::from(map_io_error(io_err))),
        Ok(Ok(())) => Ok(bytes.len()),
    }
}
