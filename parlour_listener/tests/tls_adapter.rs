use parlour_listener::tls::*;
use parlour_listener::TlsSettings;

use bytes::{Bytes, BytesMut};
use pretty_assertions::assert_eq;
use rustls::{ClientConfig, ClientConnection, RootCertStore, ServerName};
use std::io::{Read, Write};
use std::path::PathBuf;
use std::sync::Arc;

fn data_file(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data").join(name)
}

fn server() -> TlsAdapter {
    let settings = TlsSettings::load_pem(data_file("server.pem"), data_file("server.key")).unwrap();
    TlsAdapter::new(settings.server_config().unwrap()).unwrap()
}

fn client() -> ClientConnection {
    let ca = std::fs::read(data_file("ca.pem")).unwrap();
    let mut roots = RootCertStore::empty();
    for cert in rustls_pemfile::certs(&mut ca.as_slice()).unwrap() {
        roots.add(&rustls::Certificate(cert)).unwrap();
    }
    let config = ClientConfig::builder()
        .with_safe_defaults()
        .with_root_certificates(roots)
        .with_no_client_auth();
    ClientConnection::new(Arc::new(config), ServerName::try_from("localhost").unwrap()).unwrap()
}

/// Move client records to the server, returning whatever plaintext the server produced
fn client_to_server(client: &mut ClientConnection, server: &mut TlsAdapter, headroom: usize) -> Result<BytesMut, TlsError> {
    let mut wire = Vec::new();
    while client.wants_write() {
        client.write_tls(&mut wire).unwrap();
    }
    server.receive(&wire, headroom)
}

/// Move server records to the client, returning the plaintext the client read
fn server_to_client(server: &mut TlsAdapter, client: &mut ClientConnection) -> Vec<u8> {
    let mut wire = BytesMut::new();
    server.take_output(&mut wire).unwrap();
    let mut slice = &wire[..];
    while !slice.is_empty() {
        client.read_tls(&mut slice).unwrap();
        client.process_new_packets().unwrap();
    }
    server.step();

    let mut plaintext = Vec::new();
    let _ = client.reader().read_to_end(&mut plaintext);
    plaintext
}

fn handshake(client: &mut ClientConnection, server: &mut TlsAdapter) {
    for _ in 0..10 {
        if server.is_established() && !client.is_handshaking() {
            break;
        }
        client_to_server(client, server, 1 << 20).unwrap();
        server_to_client(server, client);
    }
    assert!(server.is_established());
    assert!(!client.is_handshaking());
}

#[test]
fn handshake_completes() {
    let mut server = server();
    let mut client = client();
    assert_eq!(server.state(), TlsState::Handshaking);
    assert_eq!(server.step(), TlsStatus::NeedInput);

    client_to_server(&mut client, &mut server, 1024).unwrap();
    assert_eq!(server.step(), TlsStatus::NeedOutput);

    handshake(&mut client, &mut server);
    assert_eq!(server.state(), TlsState::Established);
}

#[test]
fn plaintext_written_during_handshake_is_delivered_in_order() {
    let mut server = server();
    let mut client = client();

    server.write(Bytes::from_static(b"first ")).unwrap();
    server.write(Bytes::from_static(b"second ")).unwrap();
    assert!(server.has_pending_plaintext());

    let mut received = Vec::new();
    for _ in 0..10 {
        client_to_server(&mut client, &mut server, 1 << 20).unwrap();
        received.extend(server_to_client(&mut server, &mut client));
        if server.is_established() && !server.has_pending_plaintext() && !server.wants_write() {
            break;
        }
    }
    server.write(Bytes::from_static(b"third")).unwrap();
    received.extend(server_to_client(&mut server, &mut client));

    assert_eq!(String::from_utf8(received).unwrap(), "first second third");
}

#[test]
fn application_data_reaches_server() {
    let mut server = server();
    let mut client = client();
    handshake(&mut client, &mut server);

    client.writer().write_all(b"NICK alice\r\n").unwrap();
    let plaintext = client_to_server(&mut client, &mut server, 1024).unwrap();
    assert_eq!(&plaintext[..], b"NICK alice\r\n");
}

#[test]
fn unwrap_overflow_is_receive_queue_exceeded() {
    let mut server = server();
    let mut client = client();
    handshake(&mut client, &mut server);

    client.writer().write_all(&[b'x'; 100]).unwrap();
    let result = client_to_server(&mut client, &mut server, 50);
    assert_eq!(result, Err(TlsError::ReceiveQueueExceeded));
    assert_eq!(
        parlour_listener::ConnectionError::from(TlsError::ReceiveQueueExceeded),
        parlour_listener::ConnectionError::ReadQueueExceeded
    );
}

#[test]
fn close_sends_close_notify() {
    let mut server = server();
    let mut client = client();
    handshake(&mut client, &mut server);

    server.close();
    assert_eq!(server.state(), TlsState::Closing);
    assert!(server.write(Bytes::from_static(b"late")).is_err());

    let mut wire = BytesMut::new();
    server.take_output(&mut wire).unwrap();
    let mut slice = &wire[..];
    client.read_tls(&mut slice).unwrap();
    let io_state = client.process_new_packets().unwrap();
    assert!(io_state.peer_has_closed());

    assert_eq!(server.step(), TlsStatus::Closed);
    assert_eq!(server.state(), TlsState::Closed);
}

#[test]
fn garbage_is_a_protocol_error() {
    let mut server = server();
    let result = server.receive(b"NICK alice\r\nUSER a 0 * :A\r\n", 1024);
    assert!(matches!(result, Err(TlsError::Protocol(_))));
}
