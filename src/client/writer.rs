use std::marker::PhantomData;

use tracing::trace;

use crate::Result;
use crate::client::options::ClientOptions;
use crate::client_info::ClientInfo;
use crate::io::ClickHouseWrite;
use crate::native::block::Block;
use crate::native::protocol::{
    ClientPacketId, CompressionState, DBMS_MIN_REVISION_WITH_CLIENT_INFO,
    DBMS_MIN_REVISION_WITH_TEMPORARY_TABLES, DBMS_NAME, DBMS_TCP_PROTOCOL_VERSION,
    DBMS_VERSION_MAJOR, DBMS_VERSION_MINOR, QueryProcessingStage,
};

pub(crate) struct Writer<W> {
    _phantom: PhantomData<W>,
}

impl<W: ClickHouseWrite> Writer<W> {
    pub(crate) fn send_hello(writer: &mut W, options: &ClientOptions) -> Result<()> {
        writer.write_var_uint(ClientPacketId::Hello as u64)?;
        writer.write_string(format!("{DBMS_NAME} client"))?;
        writer.write_var_uint(DBMS_VERSION_MAJOR)?;
        writer.write_var_uint(DBMS_VERSION_MINOR)?;
        writer.write_var_uint(DBMS_TCP_PROTOCOL_VERSION)?;
        writer.write_string(&options.default_database)?;
        writer.write_string(&options.username)?;
        writer.write_string(options.password.get())?;
        writer.flush()?;
        trace!("hello sent");
        Ok(())
    }

    pub(crate) fn send_query(
        writer: &mut W,
        query: &str,
        query_id: u64,
        revision: u64,
    ) -> Result<()> {
        writer.write_var_uint(ClientPacketId::Query as u64)?;
        writer.write_string(query_id.to_string())?;
        if revision >= DBMS_MIN_REVISION_WITH_CLIENT_INFO {
            ClientInfo::default().write(writer, revision)?;
        }
        writer.write_string("")?; // end of settings
        writer.write_var_uint(QueryProcessingStage::Complete as u64)?;
        writer.write_var_uint(CompressionState::Disable as u64)?;
        writer.write_string(query)?;
        // Trailing empty block: end-of-data marker for the query itself.
        Self::send_data(writer, &Block::empty(), revision)?;
        trace!(query_id, "query sent");
        Ok(())
    }

    pub(crate) fn send_data(writer: &mut W, block: &Block, revision: u64) -> Result<()> {
        writer.write_var_uint(ClientPacketId::Data as u64)?;
        if revision >= DBMS_MIN_REVISION_WITH_TEMPORARY_TABLES {
            writer.write_string("")?; // temporary table name
        }
        block.write(writer, revision)?;
        writer.flush()?;
        Ok(())
    }

    pub(crate) fn send_ping(writer: &mut W) -> Result<()> {
        writer.write_var_uint(ClientPacketId::Ping as u64)?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::io::ClickHouseRead as _;
    use crate::native::protocol::DBMS_MIN_REVISION_WITH_BLOCK_INFO;

    type TestWriter = Writer<Vec<u8>>;

    #[test]
    fn hello_carries_identity_and_credentials() {
        let options = ClientOptions::default()
            .with_username("writer")
            .with_password("secret")
            .with_database("events");
        let mut buf = Vec::new();
        TestWriter::send_hello(&mut buf, &options).unwrap();

        let mut cursor = Cursor::new(buf);
        assert_eq!(cursor.read_var_uint().unwrap(), ClientPacketId::Hello as u64);
        assert_eq!(cursor.read_utf8_string().unwrap(), "ClickHouse client");
        assert_eq!(cursor.read_var_uint().unwrap(), 1);
        assert_eq!(cursor.read_var_uint().unwrap(), 1);
        assert_eq!(cursor.read_var_uint().unwrap(), 54126);
        assert_eq!(cursor.read_utf8_string().unwrap(), "events");
        assert_eq!(cursor.read_utf8_string().unwrap(), "writer");
        assert_eq!(cursor.read_utf8_string().unwrap(), "secret");
    }

    #[test]
    fn query_without_client_info_below_gate() {
        let mut buf = Vec::new();
        TestWriter::send_query(&mut buf, "SELECT 1", 42, DBMS_MIN_REVISION_WITH_CLIENT_INFO - 1)
            .unwrap();

        let mut cursor = Cursor::new(buf);
        assert_eq!(cursor.read_var_uint().unwrap(), ClientPacketId::Query as u64);
        assert_eq!(cursor.read_utf8_string().unwrap(), "42");
        assert_eq!(cursor.read_utf8_string().unwrap(), ""); // settings terminator
        assert_eq!(cursor.read_var_uint().unwrap(), 2); // Stages::Complete
        assert_eq!(cursor.read_var_uint().unwrap(), 0); // CompressionState::Disable
        assert_eq!(cursor.read_utf8_string().unwrap(), "SELECT 1");
        // End-of-data marker: an empty Data packet.
        assert_eq!(cursor.read_var_uint().unwrap(), ClientPacketId::Data as u64);
        assert_eq!(cursor.read_utf8_string().unwrap(), ""); // temporary table
    }

    #[test]
    fn query_with_client_info_at_gate() {
        let mut buf = Vec::new();
        TestWriter::send_query(&mut buf, "SELECT 1", 7, DBMS_MIN_REVISION_WITH_CLIENT_INFO)
            .unwrap();

        let mut cursor = Cursor::new(buf);
        assert_eq!(cursor.read_var_uint().unwrap(), ClientPacketId::Query as u64);
        assert_eq!(cursor.read_utf8_string().unwrap(), "7");
        assert_eq!(cursor.read_u8().unwrap(), 1); // query_kind: initial
        assert_eq!(cursor.read_utf8_string().unwrap(), ""); // initial user
        assert_eq!(cursor.read_utf8_string().unwrap(), ""); // initial query id
        assert_eq!(cursor.read_utf8_string().unwrap(), "[::ffff:127.0.0.1]:0");
        assert_eq!(cursor.read_u8().unwrap(), 1); // iface: TCP
    }

    #[test]
    fn data_packet_table_name_is_gated() {
        let mut with_name = Vec::new();
        TestWriter::send_data(
            &mut with_name,
            &Block::empty(),
            DBMS_MIN_REVISION_WITH_TEMPORARY_TABLES,
        )
        .unwrap();
        // code, empty table name, counters (no BlockInfo at this revision)
        assert_eq!(with_name, [2, 0, 0, 0]);

        let mut without_name = Vec::new();
        TestWriter::send_data(
            &mut without_name,
            &Block::empty(),
            DBMS_MIN_REVISION_WITH_TEMPORARY_TABLES - 1,
        )
        .unwrap();
        assert_eq!(without_name, [2, 0, 0]);

        let mut modern = Vec::new();
        TestWriter::send_data(&mut modern, &Block::empty(), DBMS_MIN_REVISION_WITH_BLOCK_INFO)
            .unwrap();
        assert_eq!(modern, [2, 0, 1, 0, 2, 0xFF, 0xFF, 0xFF, 0xFF, 0, 0, 0]);
    }

    #[test]
    fn ping_is_a_bare_code() {
        let mut buf = Vec::new();
        TestWriter::send_ping(&mut buf).unwrap();
        assert_eq!(buf, [4]);
    }
}
