//! End-to-end tests: a scripted SOCKS5 client against the full session,
//! with real loopback destinations for the relay.

use std::sync::Arc;

use tokio::{
    io::{duplex, AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
};

use charon::{protocol::AuthMethod, ProxySession, Server, ServerConfig, Socks5Error, TcpDialer};

fn no_auth_config() -> Arc<ServerConfig> {
    Arc::new(ServerConfig::builder().build().unwrap())
}

#[tokio::test]
async fn no_auth_handshake_selects_no_auth() {
    let (mut client, server_half) = duplex(512);
    let session = ProxySession::new(server_half, no_auth_config(), TcpDialer);
    let task = tokio::spawn(session.run());

    // Offers no-auth and GSSAPI.
    client.write_all(&[0x05, 0x02, 0x00, 0x01]).await.unwrap();
    let mut reply = [0u8; 2];
    client.read_exact(&mut reply).await.unwrap();
    assert_eq!(reply, [0x05, 0x00]);

    // Hanging up mid-request fails the session with a framing error.
    drop(client);
    let err = task.await.unwrap().unwrap_err();
    assert!(matches!(err, Socks5Error::Io(_)));
}

#[tokio::test]
async fn gssapi_only_client_is_refused() {
    let (mut client, server_half) = duplex(512);
    let session = ProxySession::new(server_half, no_auth_config(), TcpDialer);
    let task = tokio::spawn(session.run());

    client.write_all(&[0x05, 0x01, 0x01]).await.unwrap();
    let mut reply = [0u8; 2];
    client.read_exact(&mut reply).await.unwrap();
    assert_eq!(reply, [0x05, 0xFF]);

    let err = task.await.unwrap().unwrap_err();
    assert!(matches!(err, Socks5Error::MethodNotSupported));
}

#[tokio::test]
async fn connect_and_relay_to_loopback_destination() {
    let backend = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let backend_addr = backend.local_addr().unwrap();
    let backend_task = tokio::spawn(async move {
        let (mut conn, _) = backend.accept().await.unwrap();
        let mut buf = [0u8; 5];
        conn.read_exact(&mut buf).await.unwrap();
        conn.write_all(b"pong!").await.unwrap();
        buf
    });

    let (mut client, server_half) = duplex(512);
    let session = ProxySession::new(server_half, no_auth_config(), TcpDialer);
    let task = tokio::spawn(session.run());

    client.write_all(&[0x05, 0x01, 0x00]).await.unwrap();
    let mut reply = [0u8; 2];
    client.read_exact(&mut reply).await.unwrap();
    assert_eq!(reply, [0x05, 0x00]);

    let mut request = vec![0x05, 0x01, 0x00, 0x01, 127, 0, 0, 1];
    request.extend_from_slice(&backend_addr.port().to_be_bytes());
    client.write_all(&request).await.unwrap();

    // Success reply: fixed prefix, then the outbound socket's local
    // IPv4 address and port.
    let mut head = [0u8; 4];
    client.read_exact(&mut head).await.unwrap();
    assert_eq!(head, [0x05, 0x00, 0x00, 0x01]);
    let mut bound = [0u8; 6];
    client.read_exact(&mut bound).await.unwrap();
    assert_eq!(&bound[..4], [127, 0, 0, 1]);
    let bound_port = u16::from_be_bytes([bound[4], bound[5]]);
    assert_ne!(bound_port, 0);

    // Relay carries bytes verbatim in both directions.
    client.write_all(b"ping!").await.unwrap();
    let received = backend_task.await.unwrap();
    assert_eq!(&received, b"ping!");

    let mut echo = [0u8; 5];
    client.read_exact(&mut echo).await.unwrap();
    assert_eq!(&echo, b"pong!");

    drop(client);
    task.await.unwrap().unwrap();
}

#[tokio::test]
async fn unreachable_destination_replies_connection_refused() {
    // Grab a loopback port and close it again so the dial is refused.
    let closed = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let closed_addr = closed.local_addr().unwrap();
    drop(closed);

    let (mut client, server_half) = duplex(512);
    let session = ProxySession::new(server_half, no_auth_config(), TcpDialer);
    let task = tokio::spawn(session.run());

    client.write_all(&[0x05, 0x01, 0x00]).await.unwrap();
    let mut reply = [0u8; 2];
    client.read_exact(&mut reply).await.unwrap();

    let mut request = vec![0x05, 0x01, 0x00, 0x01, 127, 0, 0, 1];
    request.extend_from_slice(&closed_addr.port().to_be_bytes());
    client.write_all(&request).await.unwrap();

    let mut refusal = [0u8; 10];
    client.read_exact(&mut refusal).await.unwrap();
    assert_eq!(refusal, [0x05, 0x05, 0x00, 0x01, 0, 0, 0, 0, 0, 0]);

    let err = task.await.unwrap().unwrap_err();
    assert!(matches!(err, Socks5Error::ConnectionRefused(_)));
}

#[tokio::test]
async fn password_authenticated_connect() {
    let config = Arc::new(
        ServerConfig::builder()
            .auth_method(AuthMethod::UsernamePassword)
            .password_checker(|user: &str, pass: &str| user == "admin" && pass == "123456")
            .build()
            .unwrap(),
    );

    let backend = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let backend_addr = backend.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut conn, _) = backend.accept().await.unwrap();
        let mut buf = [0u8; 2];
        let _ = conn.read_exact(&mut buf).await;
    });

    let (mut client, server_half) = duplex(512);
    let session = ProxySession::new(server_half, config, TcpDialer);
    let task = tokio::spawn(session.run());

    client.write_all(&[0x05, 0x01, 0x02]).await.unwrap();
    let mut reply = [0u8; 2];
    client.read_exact(&mut reply).await.unwrap();
    assert_eq!(reply, [0x05, 0x02]);

    client
        .write_all(&[0x01, 5, b'a', b'd', b'm', b'i', b'n', 6, b'1', b'2', b'3', b'4', b'5', b'6'])
        .await
        .unwrap();
    let mut status = [0u8; 2];
    client.read_exact(&mut status).await.unwrap();
    assert_eq!(status, [0x01, 0x00]);

    let mut request = vec![0x05, 0x01, 0x00, 0x01, 127, 0, 0, 1];
    request.extend_from_slice(&backend_addr.port().to_be_bytes());
    client.write_all(&request).await.unwrap();

    let mut head = [0u8; 4];
    client.read_exact(&mut head).await.unwrap();
    assert_eq!(head, [0x05, 0x00, 0x00, 0x01]);

    drop(client);
    task.await.unwrap().unwrap();
}

#[tokio::test]
async fn full_server_end_to_end_over_tcp() {
    let backend = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let backend_addr = backend.local_addr().unwrap();
    tokio::spawn(async move {
        loop {
            let (mut conn, _) = backend.accept().await.unwrap();
            tokio::spawn(async move {
                let mut buf = [0u8; 3];
                if conn.read_exact(&mut buf).await.is_ok() {
                    let _ = conn.write_all(&buf).await;
                }
            });
        }
    });

    let config = ServerConfig::builder().build().unwrap();
    let server = Server::bind("127.0.0.1:0", config).await.unwrap();
    let proxy_addr = server.local_addr().unwrap();
    tokio::spawn(server.run());

    let mut client = TcpStream::connect(proxy_addr).await.unwrap();
    client.write_all(&[0x05, 0x01, 0x00]).await.unwrap();
    let mut reply = [0u8; 2];
    client.read_exact(&mut reply).await.unwrap();
    assert_eq!(reply, [0x05, 0x00]);

    let mut request = vec![0x05, 0x01, 0x00, 0x01, 127, 0, 0, 1];
    request.extend_from_slice(&backend_addr.port().to_be_bytes());
    client.write_all(&request).await.unwrap();

    let mut head = [0u8; 4];
    client.read_exact(&mut head).await.unwrap();
    assert_eq!(head, [0x05, 0x00, 0x00, 0x01]);
    let mut bound = [0u8; 6];
    client.read_exact(&mut bound).await.unwrap();

    client.write_all(b"abc").await.unwrap();
    let mut echo = [0u8; 3];
    client.read_exact(&mut echo).await.unwrap();
    assert_eq!(&echo, b"abc");
}
