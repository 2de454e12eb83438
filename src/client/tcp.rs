use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use socket2::{Domain, Protocol, SockAddr, Socket, TcpKeepalive, Type};
use tracing::trace;

use crate::constants::{
    TCP_CONNECT_TIMEOUT, TCP_KEEP_ALIVE_INTERVAL, TCP_KEEP_ALIVE_RETRIES, TCP_KEEP_ALIVE_SECS,
    TCP_READ_BUFFER_SIZE, TCP_WRITE_BUFFER_SIZE,
};
use crate::{Error, Result};

/// Connects to the native server port and configures common socket options.
pub(crate) fn connect_socket(host: &str, port: u16) -> Result<TcpStream> {
    let addrs: Vec<SocketAddr> = (host, port)
        .to_socket_addrs()
        .map_err(|_| Error::Client(format!("could not resolve {host}:{port}")))?
        .collect();
    let addr = addrs
        .first()
        .ok_or_else(|| Error::Client(format!("no addresses for {host}:{port}")))?;

    let domain = if addr.is_ipv4() { Domain::IPV4 } else { Domain::IPV6 };
    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;
    socket.set_recv_buffer_size(TCP_READ_BUFFER_SIZE)?;
    socket.set_send_buffer_size(TCP_WRITE_BUFFER_SIZE)?;
    let keepalive = TcpKeepalive::new()
        .with_time(Duration::from_secs(TCP_KEEP_ALIVE_SECS))
        .with_interval(Duration::from_secs(TCP_KEEP_ALIVE_INTERVAL))
        .with_retries(TCP_KEEP_ALIVE_RETRIES);
    socket.set_tcp_keepalive(&keepalive)?;

    socket.connect_timeout(&SockAddr::from(*addr), Duration::from_secs(TCP_CONNECT_TIMEOUT))?;
    trace!("connected socket for {addr}");

    let stream = TcpStream::from(socket);
    stream.set_nodelay(true)?;
    Ok(stream)
}
