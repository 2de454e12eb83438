use crate::io::{ClickHouseRead, ClickHouseWrite};
use crate::{Error, Result};

/// Metadata about a block, framed as tagged fields terminated by a zero tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockInfo {
    pub is_overflows: bool,
    pub bucket_num:   i32,
}

impl Default for BlockInfo {
    fn default() -> Self { BlockInfo { is_overflows: false, bucket_num: -1 } }
}

impl BlockInfo {
    pub(crate) fn read<R: ClickHouseRead>(reader: &mut R) -> Result<Self> {
        let mut new = Self::default();
        loop {
            let field_num = reader.read_var_uint()?;
            match field_num {
                0 => break,
                1 => {
                    new.is_overflows = reader.read_u8()? != 0;
                }
                2 => {
                    new.bucket_num = reader.read_i32_le()?;
                }
                field_num => {
                    return Err(Error::Protocol(format!(
                        "unknown block info field number: {field_num}"
                    )));
                }
            }
        }
        Ok(new)
    }

    pub(crate) fn write<W: ClickHouseWrite>(&self, writer: &mut W) -> Result<()> {
        writer.write_var_uint(1)?;
        writer.write_u8(u8::from(self.is_overflows))?;
        writer.write_var_uint(2)?;
        writer.write_i32_le(self.bucket_num)?;
        writer.write_var_uint(0)?;
        Ok(())
    }
}
