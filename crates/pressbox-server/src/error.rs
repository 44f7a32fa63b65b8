//! Server errors.

use std::io;
use std::net::SocketAddr;
use thiserror::Error;

/// Errors that stop the server from starting.
///
/// Per-connection failures are logged and never surface here.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listener could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// Address that was requested
        addr: SocketAddr,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// The bound listener could not report its address.
    #[error("listener has no local address: {0}")]
    LocalAddr(#[source] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_error_display() {
        let error = ServerError::Bind {
            addr: "127.0.0.1:4000".parse().unwrap(),
            source: io::Error::new(io::ErrorKind::AddrInUse, "address in use"),
        };
        assert_eq!(
            error.to_string(),
            "failed to bind 127.0.0.1:4000: address in use"
        );
    }
}
