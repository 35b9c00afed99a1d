use parlour_ircd::server::config::{ServerConfig, TlsConfig};
use parlour_ircd::server::Server;
use parlour_listener::TlsSettings;

use std::future::Future;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::time::timeout;

const NETWORK: &str = r#"{
    "flood": { "burst": 20 },
    "motd": [ "Welcome to the test network" ]
}"#;

fn config(network: &str) -> ServerConfig {
    let json = format!(
        r#"{{
            "server": {{ "name": "irc.test", "network_name": "TestNet", "resolve_hostnames": false }},
            "listeners": [ {{ "address": "127.0.0.1:0" }} ],
            "network": {}
        }}"#,
        network
    );
    let config: ServerConfig = serde_json::from_str(&json).unwrap();
    config.validate().unwrap();
    config
}

fn tls_data_file(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../parlour_listener/tests/data").join(name)
}

struct TestClient {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl TestClient {
    async fn connect(addr: SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).await.unwrap();
        let (read, writer) = stream.into_split();
        Self { reader: BufReader::new(read), writer }
    }

    async fn send(&mut self, line: &str) {
        self.writer.write_all(format!("{}\r\n", line).as_bytes()).await.unwrap();
    }

    async fn next_line(&mut self) -> String {
        let mut line = String::new();
        let read = timeout(Duration::from_secs(5), self.reader.read_line(&mut line))
            .await
            .expect("timed out waiting for a line")
            .unwrap();
        assert!(read > 0, "connection closed");
        line.trim_end().to_string()
    }

    /// Read lines until one matches, returning every line read including it
    async fn read_until(&mut self, pred: impl Fn(&str) -> bool) -> Vec<String> {
        let mut lines = Vec::new();
        loop {
            let line = self.next_line().await;
            let done = pred(&line);
            lines.push(line);
            if done {
                return lines;
            }
        }
    }

    async fn register(&mut self, nick: &str) -> Vec<String> {
        self.send(&format!("NICK {}", nick)).await;
        self.send(&format!("USER {} 0 * :Test user {}", nick, nick)).await;
        self.read_until(|l| l.contains(" 376 ") || l.contains(" 422 ")).await
    }
}

fn numeric(line: &str) -> Option<&str> {
    line.split(' ').nth(1).filter(|s| s.len() == 3 && s.bytes().all(|b| b.is_ascii_digit()))
}

/// Run a client script against a fresh server until the script finishes
async fn with_server<F, Fut>(script: F)
where
    F: FnOnce(SocketAddr) -> Fut,
    Fut: Future<Output = ()>,
{
    with_config(config(NETWORK), script).await
}

async fn with_config<F, Fut>(config: ServerConfig, script: F)
where
    F: FnOnce(SocketAddr) -> Fut,
    Fut: Future<Output = ()>,
{
    let server = Server::new(config.server, config.network).unwrap();
    if let Some(tls) = &config.tls {
        server.load_tls_settings(&TlsSettings::load_pem(&tls.cert_file, &tls.key_file).unwrap()).unwrap();
    }
    let listener = &config.listeners[0];
    let addr = server.add_listener(listener.address, listener.connection_type()).unwrap();

    tokio::select! {
        action = server.run() => panic!("server stopped unexpectedly: {:?}", action),
        _ = script(addr) => (),
    }
}

#[tokio::test]
async fn registration_welcomes_once() {
    with_server(|addr| async move {
        let mut alice = TestClient::connect(addr).await;
        let lines = alice.register("alice").await;

        for code in ["001", "002", "003", "004", "005", "375", "372", "376"] {
            assert!(lines.iter().any(|l| numeric(l) == Some(code)), "missing {} in {:?}", code, lines);
        }
        assert!(lines.iter().any(|l| l == ":irc.test 001 alice :Welcome to the TestNet Internet Relay Chat network, alice"));

        alice.send("PING :marker").await;
        let after = alice.read_until(|l| l.contains("PONG") && l.ends_with(":marker")).await;
        assert!(after.iter().all(|l| numeric(l) != Some("001")), "second welcome: {:?}", after);
    })
    .await;
}

#[tokio::test]
async fn commands_need_registration() {
    with_server(|addr| async move {
        let mut client = TestClient::connect(addr).await;
        client.send("JOIN #test").await;
        let lines = client.read_until(|l| numeric(l) == Some("451")).await;
        assert_eq!(lines.last().unwrap(), ":irc.test 451 * :You have not registered");

        client.register("carol").await;
        client.send("USER carol 0 * :again").await;
        client.read_until(|l| numeric(l) == Some("462")).await;
    })
    .await;
}

#[tokio::test]
async fn nick_collision_before_registration() {
    with_server(|addr| async move {
        let mut alice = TestClient::connect(addr).await;
        alice.register("alice").await;

        let mut other = TestClient::connect(addr).await;
        other.send("NICK Alice").await;
        let lines = other.read_until(|l| numeric(l) == Some("433")).await;
        assert!(lines.last().unwrap().contains("Alice"));

        let lines = other.register("alice2").await;
        assert!(lines.iter().any(|l| numeric(l) == Some("001")));
    })
    .await;
}

#[tokio::test]
async fn join_and_names() {
    with_server(|addr| async move {
        let mut alice = TestClient::connect(addr).await;
        alice.register("alice").await;

        alice.send("JOIN #test").await;
        let lines = alice.read_until(|l| numeric(l) == Some("366")).await;
        assert_eq!(lines[0], ":alice!alice@127.0.0.1 JOIN #test");
        assert!(lines.iter().any(|l| l == ":irc.test 353 alice = #test :@alice"), "{:?}", lines);

        let mut bob = TestClient::connect(addr).await;
        bob.register("bob").await;
        bob.send("JOIN #test").await;

        let lines = bob.read_until(|l| numeric(l) == Some("366")).await;
        assert_eq!(lines[0], ":bob!bob@127.0.0.1 JOIN #test");
        assert!(lines.iter().any(|l| l == ":irc.test 331 bob #test :No topic is set"), "{:?}", lines);

        let names = lines.iter().find(|l| numeric(l) == Some("353")).unwrap();
        let members: Vec<&str> = names.rsplit(':').next().unwrap().split(' ').collect();
        assert_eq!(members.len(), 2);
        assert!(members.contains(&"@alice"));
        assert!(members.contains(&"bob"));

        assert_eq!(alice.next_line().await, ":bob!bob@127.0.0.1 JOIN #test");

        bob.send("PRIVMSG #test :hello there").await;
        assert_eq!(alice.next_line().await, ":bob!bob@127.0.0.1 PRIVMSG #test :hello there");

        bob.send("QUIT :done").await;
        assert_eq!(alice.next_line().await, ":bob!bob@127.0.0.1 QUIT :Quit: done");
    })
    .await;
}

#[tokio::test]
async fn unknown_modes_are_skipped() {
    with_server(|addr| async move {
        let mut alice = TestClient::connect(addr).await;
        alice.register("alice").await;
        alice.send("JOIN #t").await;
        alice.read_until(|l| numeric(l) == Some("366")).await;

        alice.send("MODE #t +zn").await;
        assert_eq!(alice.next_line().await, ":alice!alice@127.0.0.1 MODE #t +n");

        alice.send("MODE alice +zi").await;
        assert_eq!(alice.next_line().await, ":alice MODE alice +i");

        alice.send("PING :marker").await;
        let after = alice.read_until(|l| l.contains("PONG") && l.ends_with(":marker")).await;
        assert_eq!(after.len(), 1, "unexpected replies: {:?}", after);
    })
    .await;
}

#[tokio::test]
async fn unregistered_connection_times_out() {
    let config = config(r#"{ "timeouts": { "registration": 1 } }"#);
    with_config(config, |addr| async move {
        let mut client = TestClient::connect(addr).await;
        let start = Instant::now();
        client.send("NICK slow").await;

        let lines = client.read_until(|l| l.starts_with("ERROR")).await;
        assert_eq!(lines.last().unwrap(), "ERROR :Closing Link: 127.0.0.1 (Registration timed out)");
        assert!(start.elapsed() >= Duration::from_millis(900));
    })
    .await;
}

#[tokio::test]
async fn silent_client_is_pinged_then_dropped() {
    let config = config(
        r#"{
            "classes": [ { "name": "users", "ping_frequency": 1, "max_links": 10,
                           "sendq": 65536, "recvq": 8192, "allow": [ "*" ] } ],
            "flood": { "burst": 20 }
        }"#,
    );
    with_config(config, |addr| async move {
        let mut alice = TestClient::connect(addr).await;
        alice.register("alice").await;

        let ping = alice.next_line().await;
        assert!(ping.starts_with("PING") && ping.contains("irc.test"), "{}", ping);

        let lines = alice.read_until(|l| l.starts_with("ERROR")).await;
        assert!(lines.last().unwrap().contains("(Ping timeout: "), "{:?}", lines);
    })
    .await;
}

#[tokio::test]
async fn pong_keeps_client_alive() {
    let config = config(
        r#"{
            "classes": [ { "name": "users", "ping_frequency": 1, "max_links": 10,
                           "sendq": 65536, "recvq": 8192, "allow": [ "*" ] } ],
            "flood": { "burst": 20 }
        }"#,
    );
    with_config(config, |addr| async move {
        let mut alice = TestClient::connect(addr).await;
        alice.register("alice").await;

        for _ in 0..2 {
            let ping = alice.next_line().await;
            assert!(ping.starts_with("PING"), "{}", ping);
            alice.send("PONG :irc.test").await;
        }

        alice.send("PING :still-here").await;
        alice.read_until(|l| l.contains("PONG") && l.ends_with(":still-here")).await;
    })
    .await;
}

#[tokio::test]
async fn stalled_tls_handshake_is_closed() {
    let mut config = config(NETWORK);
    config.network.timeouts.tls_handshake = Duration::from_secs(1);
    config.listeners[0].tls = true;
    config.tls = Some(TlsConfig {
        cert_file: tls_data_file("server.pem"),
        key_file: tls_data_file("server.key"),
    });

    with_config(config, |addr| async move {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        let start = Instant::now();

        let mut received = Vec::new();
        timeout(Duration::from_secs(5), stream.read_to_end(&mut received))
            .await
            .expect("handshake deadline was not enforced")
            .unwrap();
        assert!(start.elapsed() >= Duration::from_millis(900));
    })
    .await;
}

#[tokio::test]
async fn deferred_messages_are_released_without_further_input() {
    let config = config(r#"{ "flood": { "penalty": 300, "burst": 0 } }"#);
    with_config(config, |addr| async move {
        let mut alice = TestClient::connect(addr).await;
        alice.register("alice").await;

        let batch: String = (0..5).map(|i| format!("PING :m{}\r\n", i)).collect();
        let start = Instant::now();
        alice.writer.write_all(batch.as_bytes()).await.unwrap();

        for i in 0..5 {
            let expected = format!(":m{}", i);
            alice.read_until(|l| l.contains("PONG") && l.ends_with(&expected)).await;
        }
        assert!(start.elapsed() >= Duration::from_millis(900));
    })
    .await;
}
