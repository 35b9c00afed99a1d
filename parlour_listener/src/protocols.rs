use crate::id::*;
use crate::error::*;
use crate::Connection;

use bytes::Bytes;
use serde::{Serialize, Deserialize};
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionType
{
    Clear,
    Tls
}

/// The certificate chain and private key required to create a TLS listener,
/// both DER-encoded.
///
/// Should be provided to
/// [`ListenerCollection::load_tls_settings`](crate::ListenerCollection::load_tls_settings).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TlsSettings
{
    pub cert_chain: Vec<Vec<u8>>,
    pub key: Vec<u8>,
}

impl TlsSettings
{
    /// Read a PEM certificate chain and a PEM private key (PKCS#8 or PKCS#1)
    pub fn load_pem(cert_file: impl AsRef<Path>, key_file: impl AsRef<Path>) -> Result<Self, ListenerError>
    {
        let mut cert_reader = BufReader::new(std::fs::File::open(cert_file)?);
        let cert_chain = rustls_pemfile::certs(&mut cert_reader)?;
        if cert_chain.is_empty()
        {
            return Err(ListenerError::BadTlsConfig("no certificates found".to_string()));
        }

        let key_data = std::fs::read(key_file)?;
        let mut keys = rustls_pemfile::pkcs8_private_keys(&mut key_data.as_slice())?;
        if keys.is_empty()
        {
            keys = rustls_pemfile::rsa_private_keys(&mut key_data.as_slice())?;
        }
        let key = keys
            .into_iter()
            .next()
            .ok_or_else(|| ListenerError::BadTlsConfig("no private key found".to_string()))?;

        Ok(Self { cert_chain, key })
    }

    /// Build a server-side TLS configuration from these settings
    pub fn server_config(&self) -> Result<Arc<rustls::ServerConfig>, ListenerError>
    {
        let certs = self.cert_chain.iter().cloned().map(rustls::Certificate).collect();
        let config = rustls::ServerConfig::builder()
            .with_safe_defaults()
            .with_no_client_auth()
            .with_single_cert(certs, rustls::PrivateKey(self.key.clone()))?;
        Ok(Arc::new(config))
    }
}

/// Possible types of event that might occur on a given connection.
pub enum ConnectionEventDetail
{
    /// A new connection was accepted
    NewConnection(Connection),
    /// Bytes were received. These have already been counted against the
    /// connection's receive queue; see [`Connection::release_received`].
    Data(Bytes),
    /// An error occurred. The connection is closed after any error.
    Error(ConnectionError),
}

/// An event notified via a `ListenerCollection`'s event channel.
pub struct ConnectionEvent
{
    /// The connection ID to which this event relates
    pub source: ConnectionId,
    /// The type of event and its content
    pub detail: ConnectionEventDetail
}

impl ConnectionEvent
{
    pub(crate) fn data(id: ConnectionId, data: Bytes) -> Self
    {
        Self { source: id, detail: ConnectionEventDetail::Data(data) }
    }

    pub(crate) fn error(id: ConnectionId, error: ConnectionError) -> Self
    {
        Self { source: id, detail: ConnectionEventDetail::Error(error) }
    }

    pub(crate) fn new(id: ConnectionId, conn: Connection) -> Self
    {
        Self { source: id, detail: ConnectionEventDetail::NewConnection(conn) }
    }
}
