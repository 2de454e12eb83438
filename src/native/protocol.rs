use strum::AsRefStr;
use tracing::error;

use crate::{Error, Result};

pub(crate) const DBMS_MIN_REVISION_WITH_TEMPORARY_TABLES: u64 = 50264;
pub(crate) const DBMS_MIN_REVISION_WITH_TOTAL_ROWS_IN_PROGRESS: u64 = 51554;
pub(crate) const DBMS_MIN_REVISION_WITH_BLOCK_INFO: u64 = 51903;
pub(crate) const DBMS_MIN_REVISION_WITH_CLIENT_INFO: u64 = 54032;
pub(crate) const DBMS_MIN_REVISION_WITH_SERVER_TIMEZONE: u64 = 54058;
pub(crate) const DBMS_MIN_REVISION_WITH_QUOTA_KEY_IN_CLIENT_INFO: u64 = 54060;

pub(crate) const DBMS_NAME: &str = "ClickHouse";
pub(crate) const DBMS_VERSION_MAJOR: u64 = 1;
pub(crate) const DBMS_VERSION_MINOR: u64 = 1;
pub(crate) const DBMS_TCP_PROTOCOL_VERSION: u64 = 54126;

pub(crate) const MAX_STRING_SIZE: usize = 1 << 30;
pub(crate) const MAX_EXCEPTION_DEPTH: usize = 32;

#[repr(u64)]
#[derive(Clone, Copy, Debug)]
pub(crate) enum ClientPacketId {
    Hello = 0,
    Query = 1,
    Data  = 2,
    Ping  = 4,
}

#[repr(u64)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, AsRefStr)]
pub(crate) enum ServerPacketId {
    Hello,
    Data,
    Exception,
    Progress,
    Pong,
    EndOfStream,
    ProfileInfo,
}

impl ServerPacketId {
    pub(crate) fn from_u64(i: u64) -> Result<Self> {
        Ok(match i {
            0 => ServerPacketId::Hello,
            1 => ServerPacketId::Data,
            2 => ServerPacketId::Exception,
            3 => ServerPacketId::Progress,
            4 => ServerPacketId::Pong,
            5 => ServerPacketId::EndOfStream,
            6 => ServerPacketId::ProfileInfo,
            x => {
                error!("invalid packet id from server: {}", x);
                return Err(Error::Protocol(format!("unknown packet id {i}")));
            }
        })
    }
}

#[repr(u64)]
#[derive(Clone, Copy, Debug)]
#[expect(unused)]
pub(crate) enum QueryProcessingStage {
    FetchColumns,
    WithMergeableState,
    Complete,
}

#[repr(u64)]
#[derive(Clone, Copy, Debug)]
#[expect(unused)]
pub(crate) enum CompressionState {
    Disable = 0,
    Enable  = 1,
}

/// Server identity captured during the handshake. Immutable for the life of
/// the connection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerInfo {
    pub name:          String,
    pub version_major: u64,
    pub version_minor: u64,
    /// Wire-protocol revision; gates which optional fields both sides emit.
    pub revision:      u64,
    /// Advertised only by servers at revision 54058 or newer.
    pub timezone:      Option<String>,
}

impl ServerInfo {
    /// The server timezone parsed with `chrono-tz`, when advertised and known.
    pub fn tz(&self) -> Option<chrono_tz::Tz> {
        self.timezone.as_deref().and_then(|tz| tz.parse().ok())
    }
}

/// Stream statistics the server reports once per query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Profile {
    pub rows:   u64,
    pub blocks: u64,
    pub bytes:  u64,
    pub applied_limit: bool,
    pub rows_before_limit: u64,
    pub calculated_rows_before_limit: bool,
}
