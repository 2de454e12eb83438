mod options;
mod reader;
mod tcp;
mod writer;

use std::io::{BufReader, BufWriter};
use std::net::{Shutdown, TcpStream};

use strum::Display;
use tracing::{debug, instrument, trace};

pub use self::options::{ClientOptions, Secret};
use self::reader::{Reader, ServerPacket};
use self::writer::Writer;
use crate::constants::{TCP_READ_BUFFER_SIZE, TCP_WRITE_BUFFER_SIZE};
use crate::io::{ClickHouseRead, ClickHouseWrite};
use crate::native::block::Block;
use crate::native::protocol::{ServerInfo, ServerPacketId};
use crate::query::{QueryEvents, next_query_id};
use crate::{Error, Result};

/// The status of the underlying connection to `ClickHouse`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ConnectionStatus {
    Open,
    Broken,
    Closed,
}

type TcpConnection = Connection<BufReader<TcpStream>, BufWriter<TcpStream>>;

/// A blocking native-protocol session with one `ClickHouse` server.
///
/// Everything runs on the caller's thread: a `Client` is not meant to be
/// shared, and distinct clients are independent. Any I/O or protocol failure
/// leaves the session [`Broken`](ConnectionStatus::Broken) and every later
/// operation fails; a decoded server exception does not, since the server
/// completed that dialog cleanly.
pub struct Client {
    stream: TcpStream,
    conn:   TcpConnection,
    status: ConnectionStatus,
}

impl Client {
    /// Opens a TCP connection and performs the protocol handshake.
    #[instrument(
        level = "debug",
        name = "clickhouse.connect",
        skip_all,
        fields(host = %options.host, port = options.port),
        err
    )]
    pub fn connect(options: ClientOptions) -> Result<Client> {
        let stream = tcp::connect_socket(&options.host, options.port)?;
        let reader = BufReader::with_capacity(TCP_READ_BUFFER_SIZE, stream.try_clone()?);
        let writer = BufWriter::with_capacity(TCP_WRITE_BUFFER_SIZE, stream.try_clone()?);
        let conn = Connection::handshake(reader, writer, &options)?;
        debug!(server = %conn.server.name, revision = conn.server.revision, "connected");
        Ok(Client { stream, conn, status: ConnectionStatus::Open })
    }

    /// Server identity captured during the handshake.
    pub fn server_info(&self) -> &ServerInfo { &self.conn.server }

    pub fn status(&self) -> ConnectionStatus { self.status }

    /// Runs a query, driving `events` with everything the server streams
    /// back.
    #[instrument(level = "debug", name = "clickhouse.query", skip_all, fields(query = query), err)]
    pub fn execute<E: QueryEvents>(&mut self, query: &str, events: &mut E) -> Result<()> {
        self.guard(|conn| conn.execute(query, events))
    }

    /// Runs a SELECT and hands every data block to `f`.
    pub fn select<F: FnMut(Block)>(&mut self, query: &str, f: F) -> Result<()> {
        struct OnData<F>(F);
        impl<F: FnMut(Block)> QueryEvents for OnData<F> {
            fn on_data(&mut self, block: Block) { (self.0)(block); }
        }
        self.execute(query, &mut OnData(f))
    }

    /// Inserts one block of rows into `table_name`.
    #[instrument(
        level = "debug",
        name = "clickhouse.insert",
        skip_all,
        fields(table = table_name, rows = block.row_count()),
        err
    )]
    pub fn insert(&mut self, table_name: &str, block: &Block) -> Result<()> {
        self.guard(|conn| conn.insert(table_name, block))
    }

    /// Checks liveness with a ping/pong exchange.
    #[instrument(level = "debug", name = "clickhouse.ping", skip_all, err)]
    pub fn ping(&mut self) -> Result<()> { self.guard(Connection::ping) }

    /// Closes the connection. Unflushed writes are discarded and every later
    /// operation fails.
    pub fn close(&mut self) {
        if self.status != ConnectionStatus::Closed {
            let _ = self.stream.shutdown(Shutdown::Both);
            self.status = ConnectionStatus::Closed;
        }
    }

    fn guard<T>(&mut self, op: impl FnOnce(&mut TcpConnection) -> Result<T>) -> Result<T> {
        match self.status {
            ConnectionStatus::Open => {}
            status => return Err(Error::Client(format!("connection is {status}"))),
        }
        let result = op(&mut self.conn);
        if matches!(result, Err(Error::Io(_) | Error::Protocol(_))) {
            // The dialog is out of sync; nothing on this socket can be
            // trusted any more.
            self.status = ConnectionStatus::Broken;
            let _ = self.stream.shutdown(Shutdown::Both);
        }
        result
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        trace!("client dropped");
        self.close();
    }
}

/// Protocol state machine over a pair of byte streams.
///
/// Generic over the transport so tests can drive whole dialogs from
/// in-memory transcripts; [`Client`] instantiates it over the buffered
/// halves of one socket.
#[derive(Debug)]
pub(crate) struct Connection<R, W> {
    reader: R,
    writer: W,
    server: ServerInfo,
    rethrow_server_exceptions: bool,
}

impl<R: ClickHouseRead, W: ClickHouseWrite> Connection<R, W> {
    pub(crate) fn handshake(mut reader: R, mut writer: W, options: &ClientOptions) -> Result<Self> {
        Writer::send_hello(&mut writer, options)?;
        match Reader::receive_packet(&mut reader, 0)? {
            ServerPacket::Hello(server) => {
                trace!(server = %server.name, revision = server.revision, "handshake complete");
                Ok(Connection {
                    reader,
                    writer,
                    server,
                    rethrow_server_exceptions: options.rethrow_server_exceptions,
                })
            }
            ServerPacket::Exception(error) => Err(Error::Server(error)),
            packet => Err(Error::Protocol(format!(
                "unexpected {} packet during handshake",
                ServerPacketId::from(&packet).as_ref()
            ))),
        }
    }

    fn execute<E: QueryEvents>(&mut self, query: &str, events: &mut E) -> Result<()> {
        let query_id = next_query_id();
        Writer::send_query(&mut self.writer, query, query_id, self.server.revision)?;
        while self.receive_packet(events)? {}
        Ok(())
    }

    fn insert(&mut self, table_name: &str, block: &Block) -> Result<()> {
        // A ragged block is rejected before the dialog starts: once the Query
        // packet is out the server expects data, and a half-written Data
        // packet would corrupt the framing for everything after it.
        block.check_row_counts()?;

        let query_id = next_query_id();
        let query = format!("INSERT INTO {table_name} VALUES");
        Writer::send_query(&mut self.writer, &query, query_id, self.server.revision)?;

        // The server answers with its view of the table schema as a zero-row
        // block; progress may arrive first. The schema is consumed, not
        // validated: a mismatched block is the server's to reject.
        loop {
            match Reader::receive_packet(&mut self.reader, self.server.revision)? {
                ServerPacket::Data(_schema) => break,
                ServerPacket::Progress(_) => {}
                ServerPacket::Exception(error) => return Err(Error::Server(error)),
                packet => {
                    return Err(Error::Protocol(format!(
                        "unexpected {} packet while awaiting insert schema",
                        ServerPacketId::from(&packet).as_ref()
                    )));
                }
            }
        }

        Writer::send_data(&mut self.writer, block, self.server.revision)?;
        // Empty block: end of data.
        Writer::send_data(&mut self.writer, &Block::empty(), self.server.revision)?;

        // Wait for end of stream; a rejection at this point surfaces as the
        // exception the server sent.
        loop {
            match Reader::receive_packet(&mut self.reader, self.server.revision)? {
                ServerPacket::EndOfStream => return Ok(()),
                ServerPacket::Exception(error) => return Err(Error::Server(error)),
                ServerPacket::Data(_)
                | ServerPacket::Progress(_)
                | ServerPacket::ProfileInfo(_)
                | ServerPacket::Pong => {}
                packet @ ServerPacket::Hello(_) => {
                    return Err(Error::Protocol(format!(
                        "unexpected {} packet during insert",
                        ServerPacketId::from(&packet).as_ref()
                    )));
                }
            }
        }
    }

    fn ping(&mut self) -> Result<()> {
        Writer::send_ping(&mut self.writer)?;
        match Reader::receive_packet(&mut self.reader, self.server.revision)? {
            ServerPacket::Pong => Ok(()),
            packet => Err(Error::Protocol(format!(
                "ping answered by {}",
                ServerPacketId::from(&packet).as_ref()
            ))),
        }
    }

    /// Processes one server packet, returning whether the dispatch loop
    /// should keep going.
    fn receive_packet<E: QueryEvents>(&mut self, events: &mut E) -> Result<bool> {
        match Reader::receive_packet(&mut self.reader, self.server.revision)? {
            ServerPacket::Data(block) => {
                if block.row_count() > 0 {
                    events.on_data(block);
                }
                Ok(true)
            }
            ServerPacket::Progress(progress) => {
                events.on_progress(progress);
                Ok(true)
            }
            ServerPacket::ProfileInfo(profile) => {
                events.on_profile(profile);
                Ok(true)
            }
            ServerPacket::Pong => Ok(true),
            ServerPacket::EndOfStream => {
                events.on_finish();
                Ok(false)
            }
            ServerPacket::Exception(error) => {
                events.on_server_exception(&error);
                if self.rethrow_server_exceptions { Err(Error::Server(error)) } else { Ok(false) }
            }
            packet @ ServerPacket::Hello(_) => Err(Error::Protocol(format!(
                "unexpected {} packet during query",
                ServerPacketId::from(&packet).as_ref()
            ))),
        }
    }
}
