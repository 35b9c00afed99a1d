use bytes::Bytes;
use rustls::ServerConfig;
use std::sync::Arc;

use crate::ConnectionType;

#[derive(Clone)]
pub enum InternalConnectionType
{
    Clear,
    Tls(Arc<ServerConfig>)
}

impl InternalConnectionType
{
    pub fn to_pub(&self) -> ConnectionType
    {
        match self {
            InternalConnectionType::Clear => ConnectionType::Clear,
            InternalConnectionType::Tls(_) => ConnectionType::Tls
        }
    }
}

#[derive(Debug)]
pub enum ConnectionControlDetail
{
    Send(Bytes),
    Close,
}

#[derive(Debug)]
pub enum ListenerControlDetail
{
    Close,
}
