use crate::Result;
use crate::io::ClickHouseWrite;
use crate::native::protocol::{
    DBMS_MIN_REVISION_WITH_QUOTA_KEY_IN_CLIENT_INFO, DBMS_NAME, DBMS_TCP_PROTOCOL_VERSION,
    DBMS_VERSION_MAJOR, DBMS_VERSION_MINOR,
};

const QUERY_KIND_INITIAL: u8 = 1;
const IFACE_TYPE_TCP: u8 = 1;

/// Identity block the client embeds in every Query packet once the server
/// revision supports it (54032).
#[derive(Debug, Clone, Copy)]
pub(crate) struct ClientInfo<'a> {
    pub(crate) initial_user:     &'a str,
    pub(crate) initial_query_id: &'a str,
    pub(crate) initial_address:  &'a str,
    pub(crate) os_user:          &'a str,
    pub(crate) client_hostname:  &'a str,
    pub(crate) quota_key:        &'a str,
}

impl Default for ClientInfo<'_> {
    fn default() -> Self {
        ClientInfo {
            initial_user:     "",
            initial_query_id: "",
            initial_address:  "[::ffff:127.0.0.1]:0",
            os_user:          "",
            client_hostname:  "",
            quota_key:        "",
        }
    }
}

impl ClientInfo<'_> {
    pub(crate) fn write<W: ClickHouseWrite>(&self, writer: &mut W, revision: u64) -> Result<()> {
        writer.write_u8(QUERY_KIND_INITIAL)?;
        writer.write_string(self.initial_user)?;
        writer.write_string(self.initial_query_id)?;
        writer.write_string(self.initial_address)?;
        writer.write_u8(IFACE_TYPE_TCP)?;
        writer.write_string(self.os_user)?;
        writer.write_string(self.client_hostname)?;
        writer.write_string(format!("{DBMS_NAME} client"))?;
        writer.write_var_uint(DBMS_VERSION_MAJOR)?;
        writer.write_var_uint(DBMS_VERSION_MINOR)?;
        writer.write_var_uint(DBMS_TCP_PROTOCOL_VERSION)?;
        if revision >= DBMS_MIN_REVISION_WITH_QUOTA_KEY_IN_CLIENT_INFO {
            writer.write_string(self.quota_key)?;
        }
        Ok(())
    }
}
