use crate::io::{ClickHouseRead, ClickHouseWrite};
use crate::native::block_info::BlockInfo;
use crate::native::column::{Column, ColumnType};
use crate::native::protocol::DBMS_MIN_REVISION_WITH_BLOCK_INFO;
use crate::{Error, Result};

/// A columnar batch of rows: the unit of data transfer in both directions.
///
/// Columns are ordered, named, and typed; every column must hold exactly
/// `row_count` values by the time the block is serialized. The empty block
/// (zero columns, zero rows) doubles as the end-of-data marker on the
/// client→server channel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Block {
    pub info: BlockInfo,
    columns:  Vec<(String, Column)>,
    rows:     u64,
}

impl Block {
    /// A block that expects `columns` columns of `rows` values each.
    pub fn new(columns: usize, rows: u64) -> Self {
        Block { info: BlockInfo::default(), columns: Vec::with_capacity(columns), rows }
    }

    /// The empty block: zero columns, zero rows.
    pub fn empty() -> Self { Self::default() }

    pub fn column_count(&self) -> usize { self.columns.len() }

    pub fn row_count(&self) -> u64 { self.rows }

    /// Adds a column at the back. Row counts are checked at serialization,
    /// not here, so columns can be filled after attachment.
    pub fn append_column(&mut self, name: impl Into<String>, column: Column) -> Result<()> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::Client("column name must not be empty".into()));
        }
        self.columns.push((name, column));
        Ok(())
    }

    /// The first column named `name`, if any.
    pub fn get(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|(n, _)| n == name).map(|(_, c)| c)
    }

    /// Iterates columns in insertion order as `(name, type, column)`.
    pub fn iter(&self) -> impl Iterator<Item = (&str, ColumnType, &Column)> {
        self.columns.iter().map(|(name, column)| (name.as_str(), column.column_type(), column))
    }

    pub(crate) fn read<R: ClickHouseRead>(reader: &mut R, revision: u64) -> Result<Block> {
        let info = if revision >= DBMS_MIN_REVISION_WITH_BLOCK_INFO {
            BlockInfo::read(reader)?
        } else {
            BlockInfo::default()
        };

        let num_columns = usize::try_from(reader.read_var_uint()?)
            .map_err(|_| Error::Protocol("column count exceeds address space".into()))?;
        let num_rows = reader.read_var_uint()?;
        let rows = usize::try_from(num_rows)
            .map_err(|_| Error::Protocol("row count exceeds address space".into()))?;

        let mut block = Block::new(num_columns, num_rows);
        block.info = info;
        for _ in 0..num_columns {
            let name = reader.read_utf8_string()?;
            let type_name = reader.read_utf8_string()?;
            let mut column = Column::with_type(type_name.parse()?);
            column.load(reader, rows)?;
            // Accepted as sent; the name invariant binds locally built blocks.
            block.columns.push((name, column));
        }
        Ok(block)
    }

    /// Every column must hold exactly the declared row count before the
    /// block may touch the wire.
    pub(crate) fn check_row_counts(&self) -> Result<()> {
        for (name, column) in &self.columns {
            if column.len() as u64 != self.rows {
                return Err(Error::Client(format!(
                    "column `{name}` has {} rows, block declares {}",
                    column.len(),
                    self.rows
                )));
            }
        }
        Ok(())
    }

    pub(crate) fn write<W: ClickHouseWrite>(&self, writer: &mut W, revision: u64) -> Result<()> {
        // A rejected block must leave the writer's buffer untouched.
        self.check_row_counts()?;
        if revision >= DBMS_MIN_REVISION_WITH_BLOCK_INFO {
            self.info.write(writer)?;
        }
        writer.write_var_uint(self.columns.len() as u64)?;
        writer.write_var_uint(self.rows)?;
        for (name, column) in &self.columns {
            writer.write_string(name)?;
            writer.write_string(column.column_type().to_string())?;
            column.save(writer)?;
        }
        Ok(())
    }
}
