use std::marker::PhantomData;

use tracing::trace;

use crate::errors::{Error, Exception, Result, ServerError};
use crate::io::ClickHouseRead;
use crate::native::block::Block;
use crate::native::progress::Progress;
use crate::native::protocol::{
    DBMS_MIN_REVISION_WITH_SERVER_TIMEZONE, DBMS_MIN_REVISION_WITH_TEMPORARY_TABLES,
    DBMS_MIN_REVISION_WITH_TOTAL_ROWS_IN_PROGRESS, MAX_EXCEPTION_DEPTH, Profile, ServerInfo,
    ServerPacketId,
};

/// A decoded server → client packet.
#[derive(Debug, Clone)]
pub(crate) enum ServerPacket {
    Hello(ServerInfo),
    Data(Block),
    Exception(ServerError),
    Progress(Progress),
    Pong,
    EndOfStream,
    ProfileInfo(Profile),
}

impl From<&ServerPacket> for ServerPacketId {
    fn from(value: &ServerPacket) -> Self {
        match value {
            ServerPacket::Hello(_) => ServerPacketId::Hello,
            ServerPacket::Data(_) => ServerPacketId::Data,
            ServerPacket::Exception(_) => ServerPacketId::Exception,
            ServerPacket::Progress(_) => ServerPacketId::Progress,
            ServerPacket::Pong => ServerPacketId::Pong,
            ServerPacket::EndOfStream => ServerPacketId::EndOfStream,
            ServerPacket::ProfileInfo(_) => ServerPacketId::ProfileInfo,
        }
    }
}

pub(crate) struct Reader<R> {
    _phantom: PhantomData<R>,
}

impl<R: ClickHouseRead> Reader<R> {
    /// Reads one packet: the code varuint, then exactly its body.
    pub(crate) fn receive_packet(reader: &mut R, revision: u64) -> Result<ServerPacket> {
        let packet = ServerPacketId::from_u64(reader.read_var_uint()?)?;
        trace!(packet = packet.as_ref(), "receiving packet");
        Ok(match packet {
            ServerPacketId::Hello => ServerPacket::Hello(Self::read_hello(reader)?),
            ServerPacketId::Data => ServerPacket::Data(Self::read_data(reader, revision)?),
            ServerPacketId::Exception => ServerPacket::Exception(Self::read_exception(reader)?),
            ServerPacketId::Progress => {
                ServerPacket::Progress(Self::read_progress(reader, revision)?)
            }
            ServerPacketId::Pong => ServerPacket::Pong,
            ServerPacketId::EndOfStream => ServerPacket::EndOfStream,
            ServerPacketId::ProfileInfo => {
                ServerPacket::ProfileInfo(Self::read_profile_info(reader)?)
            }
        })
    }

    fn read_hello(reader: &mut R) -> Result<ServerInfo> {
        let name = reader.read_utf8_string()?;
        let version_major = reader.read_var_uint()?;
        let version_minor = reader.read_var_uint()?;
        let revision = reader.read_var_uint()?;
        let timezone = if revision >= DBMS_MIN_REVISION_WITH_SERVER_TIMEZONE {
            Some(reader.read_utf8_string()?)
        } else {
            None
        };
        Ok(ServerInfo { name, version_major, version_minor, revision, timezone })
    }

    fn read_data(reader: &mut R, revision: u64) -> Result<Block> {
        if revision >= DBMS_MIN_REVISION_WITH_TEMPORARY_TABLES {
            let _temporary_table = reader.read_string()?;
        }
        Block::read(reader, revision)
    }

    fn read_progress(reader: &mut R, revision: u64) -> Result<Progress> {
        let rows = reader.read_var_uint()?;
        let bytes = reader.read_var_uint()?;
        let total_rows = if revision >= DBMS_MIN_REVISION_WITH_TOTAL_ROWS_IN_PROGRESS {
            reader.read_var_uint()?
        } else {
            0
        };
        Ok(Progress { rows, bytes, total_rows })
    }

    fn read_profile_info(reader: &mut R) -> Result<Profile> {
        let rows = reader.read_var_uint()?;
        let blocks = reader.read_var_uint()?;
        let bytes = reader.read_var_uint()?;
        let applied_limit = reader.read_u8()? != 0;
        let rows_before_limit = reader.read_var_uint()?;
        let calculated_rows_before_limit = reader.read_u8()? != 0;
        Ok(Profile {
            rows,
            blocks,
            bytes,
            applied_limit,
            rows_before_limit,
            calculated_rows_before_limit,
        })
    }

    /// Decodes an exception chain. The wire does not bound the chain, so a
    /// depth cap keeps a misbehaving server from feeding frames forever.
    fn read_exception(reader: &mut R) -> Result<ServerError> {
        let (head, mut has_nested) = Self::read_exception_frame(reader)?;
        let mut nested = Vec::new();
        while has_nested {
            if nested.len() + 1 == MAX_EXCEPTION_DEPTH {
                return Err(Error::Protocol(format!(
                    "exception chain deeper than {MAX_EXCEPTION_DEPTH}"
                )));
            }
            let (frame, more) = Self::read_exception_frame(reader)?;
            nested.push(frame);
            has_nested = more;
        }
        Ok(ServerError { head, nested })
    }

    fn read_exception_frame(reader: &mut R) -> Result<(Exception, bool)> {
        let code = reader.read_i32_le()?;
        let name = reader.read_utf8_string()?;
        let message = reader.read_utf8_string()?;
        let stack_trace = reader.read_utf8_string()?;
        let has_nested = reader.read_u8()? != 0;
        Ok((Exception { code, name, message, stack_trace }, has_nested))
    }
}
