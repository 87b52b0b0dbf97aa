//! Low-level SMTP stream handling.

use crate::error::{Error, Result};
use rustls::pki_types::ServerName;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio_rustls::{
    TlsConnector,
    rustls::{ClientConfig, RootCertStore},
};

/// Longest reply line read in one piece; the rest of a longer line is
/// discarded.
pub const MAX_LINE_LENGTH: u64 = 1024;

/// SMTP stream (TCP or TLS).
#[derive(Debug)]
pub enum SmtpStream {
    /// Plain TCP connection.
    Tcp(BufReader<TcpStream>),
    /// TLS-encrypted connection.
    Tls(Box<BufReader<tokio_rustls::client::TlsStream<TcpStream>>>),
}

impl SmtpStream {
    /// Reads one line, without its terminator.
    ///
    /// Returns `None` at end of stream.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    pub async fn read_line(&mut self) -> Result<Option<String>> {
        match self {
            Self::Tcp(reader) => read_limited_line(reader).await,
            Self::Tls(reader) => read_limited_line(reader.as_mut()).await,
        }
    }

    /// Writes data to the stream.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub async fn write_all(&mut self, data: &[u8]) -> Result<()> {
        match self {
            Self::Tcp(reader) => {
                reader.get_mut().write_all(data).await?;
                reader.get_mut().flush().await?;
            }
            Self::Tls(reader) => {
                reader.get_mut().write_all(data).await?;
                reader.get_mut().flush().await?;
            }
        }
        Ok(())
    }

    /// Upgrades a TCP stream to TLS in place of the plaintext channel.
    ///
    /// The server certificate is checked against the roots `connector`
    /// was built with.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TlsUpgrade`] if the stream is already encrypted, the
    /// hostname is not a valid server name or the handshake fails.
    pub async fn upgrade_to_tls(self, hostname: &str, connector: &TlsConnector) -> Result<Self> {
        let tcp_stream = match self {
            Self::Tcp(reader) => reader.into_inner(),
            Self::Tls(_) => return Err(Error::TlsUpgrade("Already using TLS".into())),
        };

        let server_name = server_name(hostname).map_err(|e| Error::TlsUpgrade(e.to_string()))?;
        let tls_stream = connector
            .connect(server_name, tcp_stream)
            .await
            .map_err(|e| Error::TlsUpgrade(e.to_string()))?;
        Ok(Self::Tls(Box::new(BufReader::new(tls_stream))))
    }

    /// Returns true if the stream is TLS-encrypted.
    #[must_use]
    pub const fn is_tls(&self) -> bool {
        matches!(self, Self::Tls(_))
    }

    /// Shuts the write half down, ignoring errors.
    pub async fn close(&mut self) {
        let _ = match self {
            Self::Tcp(reader) => reader.get_mut().shutdown().await,
            Self::Tls(reader) => reader.get_mut().shutdown().await,
        };
    }
}

async fn read_limited_line<R>(reader: &mut R) -> Result<Option<String>>
where
    R: tokio::io::AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    let n = (&mut *reader)
        .take(MAX_LINE_LENGTH)
        .read_until(b'\n', &mut buf)
        .await?;
    if n == 0 {
        return Ok(None);
    }

    if buf.last() != Some(&b'\n') && n as u64 == MAX_LINE_LENGTH {
        let mut overflow = Vec::new();
        loop {
            overflow.clear();
            let m = (&mut *reader)
                .take(MAX_LINE_LENGTH)
                .read_until(b'\n', &mut overflow)
                .await?;
            if m == 0 || overflow.last() == Some(&b'\n') {
                break;
            }
        }
    }

    let line = String::from_utf8_lossy(&buf);
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

/// Connects to an SMTP server over plain TCP.
///
/// # Errors
///
/// Returns [`Error::Connection`] if the connection fails or times out.
pub async fn connect(hostname: &str, port: u16, timeout: Duration) -> Result<SmtpStream> {
    let stream = open_tcp(hostname, port, timeout).await?;
    Ok(SmtpStream::Tcp(BufReader::new(stream)))
}

/// Connects to an SMTP server over TLS (implicit TLS on port 465).
///
/// # Errors
///
/// Returns [`Error::Connection`] if the connection or TLS handshake fails.
pub async fn connect_tls(
    hostname: &str,
    port: u16,
    timeout: Duration,
    connector: &TlsConnector,
) -> Result<SmtpStream> {
    let tcp_stream = open_tcp(hostname, port, timeout).await?;
    let connection_error = |source: io::Error| Error::Connection {
        host: hostname.to_string(),
        port,
        source,
    };

    let server_name = server_name(hostname).map_err(connection_error)?;
    let handshake = connector.connect(server_name, tcp_stream);
    let tls_stream = tokio::time::timeout(timeout, handshake)
        .await
        .map_err(|_| connection_error(io::ErrorKind::TimedOut.into()))?
        .map_err(connection_error)?;
    Ok(SmtpStream::Tls(Box::new(BufReader::new(tls_stream))))
}

async fn open_tcp(hostname: &str, port: u16, timeout: Duration) -> Result<TcpStream> {
    let addr = format!("{hostname}:{port}");
    let attempt = tokio::time::timeout(timeout, TcpStream::connect(&addr)).await;

    let source = match attempt {
        Ok(Ok(stream)) => return Ok(stream),
        Ok(Err(e)) => e,
        Err(_) => io::Error::new(io::ErrorKind::TimedOut, format!("no answer within {timeout:?}")),
    };

    Err(Error::Connection {
        host: hostname.to_string(),
        port,
        source,
    })
}

fn server_name(hostname: &str) -> io::Result<ServerName<'static>> {
    ServerName::try_from(hostname.to_string()).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("Invalid hostname: {hostname}"),
        )
    })
}

/// Creates a TLS connector from `config`, or from the bundled root
/// certificates when there is none.
///
/// The default configuration pins the aws-lc-rs provider and negotiates
/// TLS 1.3 with fallback to TLS 1.2; older versions are never offered.
///
/// # Errors
///
/// Returns [`Error::TlsUpgrade`] if the provider rejects the default
/// protocol versions.
pub fn create_tls_connector(config: Option<Arc<ClientConfig>>) -> Result<TlsConnector> {
    if let Some(config) = config {
        return Ok(TlsConnector::from(config));
    }

    let root_store = RootCertStore {
        roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
    };
    let config = ClientConfig::builder_with_provider(Arc::new(
        rustls::crypto::aws_lc_rs::default_provider(),
    ))
    .with_safe_default_protocol_versions()
    .map_err(|e| Error::TlsUpgrade(e.to_string()))?
    .with_root_certificates(root_store)
    .with_no_client_auth();

    Ok(TlsConnector::from(Arc::new(config)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::redundant_clone, clippy::manual_string_new, clippy::needless_collect, clippy::unreadable_literal, clippy::used_underscore_items, clippy::similar_names)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_read_lines_and_eof() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            socket.write_all(b"220 ready\r\n250 OK\n").await.unwrap();
        });

        let mut stream = connect("127.0.0.1", port, Duration::from_secs(5))
            .await
            .unwrap();
        assert!(!stream.is_tls());
        assert_eq!(stream.read_line().await.unwrap().as_deref(), Some("220 ready"));
        assert_eq!(stream.read_line().await.unwrap().as_deref(), Some("250 OK"));
        assert_eq!(stream.read_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_overlong_line_truncated() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let long = format!("250 {}\r\n221 bye\r\n", "x".repeat(3000));
            socket.write_all(long.as_bytes()).await.unwrap();
        });

        let mut stream = connect("127.0.0.1", port, Duration::from_secs(5))
            .await
            .unwrap();
        let first = stream.read_line().await.unwrap().unwrap();
        assert_eq!(first.len(), 1024);
        assert_eq!(stream.read_line().await.unwrap().as_deref(), Some("221 bye"));
    }

    #[tokio::test]
    async fn test_read_limited_line_lossy_utf8() {
        let mock = tokio_test::io::Builder::new()
            .read(b"250 caf\xc3\xa9 \xff\r\n")
            .build();
        let mut reader = BufReader::new(mock);
        let line = read_limited_line(&mut reader).await.unwrap().unwrap();
        assert_eq!(line, "250 caf\u{e9} \u{fffd}");
        assert_eq!(read_limited_line(&mut reader).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_read_limited_line_split_reads() {
        let mock = tokio_test::io::Builder::new()
            .read(b"250-first")
            .read(b" part\r\n250 last\r\n")
            .build();
        let mut reader = BufReader::new(mock);
        assert_eq!(
            read_limited_line(&mut reader).await.unwrap().as_deref(),
            Some("250-first part")
        );
        assert_eq!(
            read_limited_line(&mut reader).await.unwrap().as_deref(),
            Some("250 last")
        );
    }

    #[tokio::test]
    async fn test_connection_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let err = connect("127.0.0.1", port, Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Connection { port: p, .. } if p == port));
    }

    #[test]
    fn test_default_tls_connector_builds() {
        assert!(create_tls_connector(None).is_ok());
    }

    #[tokio::test]
    async fn test_upgrade_with_invalid_hostname() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let _ = listener.accept().await;
        });

        let stream = connect("127.0.0.1", port, Duration::from_secs(5))
            .await
            .unwrap();
        let connector = create_tls_connector(None).unwrap();
        let err = stream
            .upgrade_to_tls("not a hostname!", &connector)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::TlsUpgrade(_)));
    }
}
