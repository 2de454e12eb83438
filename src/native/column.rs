use std::fmt;
use std::str::FromStr;

use crate::io::{ClickHouseRead, ClickHouseWrite};
use crate::native::values::{Date, DateTime};
use crate::{Error, Result};

/// Wire type descriptor for a column.
///
/// Parsing is exact and case-sensitive; anything outside this closed set is a
/// protocol error when it arrives from the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Int8,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    String,
    FixedString(usize),
    Date,
    DateTime,
}

impl FromStr for ColumnType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "UInt8" => Self::UInt8,
            "UInt16" => Self::UInt16,
            "UInt32" => Self::UInt32,
            "UInt64" => Self::UInt64,
            "Int8" => Self::Int8,
            "Int16" => Self::Int16,
            "Int32" => Self::Int32,
            "Int64" => Self::Int64,
            "Float32" => Self::Float32,
            "Float64" => Self::Float64,
            "String" => Self::String,
            "Date" => Self::Date,
            "DateTime" => Self::DateTime,
            _ => {
                let size = s
                    .strip_prefix("FixedString(")
                    .and_then(|rest| rest.strip_suffix(')'))
                    .and_then(|n| n.parse::<usize>().ok())
                    .filter(|n| *n > 0)
                    .ok_or_else(|| Error::Protocol(format!("unsupported column type: {s}")))?;
                Self::FixedString(size)
            }
        })
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UInt8 => write!(f, "UInt8"),
            Self::UInt16 => write!(f, "UInt16"),
            Self::UInt32 => write!(f, "UInt32"),
            Self::UInt64 => write!(f, "UInt64"),
            Self::Int8 => write!(f, "Int8"),
            Self::Int16 => write!(f, "Int16"),
            Self::Int32 => write!(f, "Int32"),
            Self::Int64 => write!(f, "Int64"),
            Self::Float32 => write!(f, "Float32"),
            Self::Float64 => write!(f, "Float64"),
            Self::String => write!(f, "String"),
            Self::FixedString(size) => write!(f, "FixedString({size})"),
            Self::Date => write!(f, "Date"),
            Self::DateTime => write!(f, "DateTime"),
        }
    }
}

/// Columnar payload for one column of a block, tagged by wire type.
///
/// Values are tightly packed on the wire with no per-row framing: fixed-width
/// types are `n` little-endian values, `String` is `n` length-prefixed byte
/// strings, `FixedString(k)` is `n * k` raw bytes.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    UInt8(Vec<u8>),
    UInt16(Vec<u16>),
    UInt32(Vec<u32>),
    UInt64(Vec<u64>),
    Int8(Vec<i8>),
    Int16(Vec<i16>),
    Int32(Vec<i32>),
    Int64(Vec<i64>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
    String(Vec<Vec<u8>>),
    FixedString { size: usize, data: Vec<u8> },
    Date(Vec<Date>),
    DateTime(Vec<DateTime>),
}

impl Column {
    /// Registry factory: a fresh empty column for a descriptor.
    pub fn with_type(type_: ColumnType) -> Self {
        match type_ {
            ColumnType::UInt8 => Self::UInt8(Vec::new()),
            ColumnType::UInt16 => Self::UInt16(Vec::new()),
            ColumnType::UInt32 => Self::UInt32(Vec::new()),
            ColumnType::UInt64 => Self::UInt64(Vec::new()),
            ColumnType::Int8 => Self::Int8(Vec::new()),
            ColumnType::Int16 => Self::Int16(Vec::new()),
            ColumnType::Int32 => Self::Int32(Vec::new()),
            ColumnType::Int64 => Self::Int64(Vec::new()),
            ColumnType::Float32 => Self::Float32(Vec::new()),
            ColumnType::Float64 => Self::Float64(Vec::new()),
            ColumnType::String => Self::String(Vec::new()),
            ColumnType::FixedString(size) => Self::FixedString { size, data: Vec::new() },
            ColumnType::Date => Self::Date(Vec::new()),
            ColumnType::DateTime => Self::DateTime(Vec::new()),
        }
    }

    /// A `FixedString(size)` column from byte strings that must all be
    /// exactly `size` bytes long.
    pub fn fixed_string<I, V>(size: usize, values: I) -> Result<Self>
    where
        I: IntoIterator<Item = V>,
        V: AsRef<[u8]>,
    {
        if size == 0 {
            return Err(Error::Client("FixedString size must be positive".into()));
        }
        let mut data = Vec::new();
        for value in values {
            let value = value.as_ref();
            if value.len() != size {
                return Err(Error::Client(format!(
                    "fixed string value has {} bytes, column holds {size}",
                    value.len()
                )));
            }
            data.extend_from_slice(value);
        }
        Ok(Self::FixedString { size, data })
    }

    /// The wire descriptor of this column.
    pub fn column_type(&self) -> ColumnType {
        match self {
            Self::UInt8(_) => ColumnType::UInt8,
            Self::UInt16(_) => ColumnType::UInt16,
            Self::UInt32(_) => ColumnType::UInt32,
            Self::UInt64(_) => ColumnType::UInt64,
            Self::Int8(_) => ColumnType::Int8,
            Self::Int16(_) => ColumnType::Int16,
            Self::Int32(_) => ColumnType::Int32,
            Self::Int64(_) => ColumnType::Int64,
            Self::Float32(_) => ColumnType::Float32,
            Self::Float64(_) => ColumnType::Float64,
            Self::String(_) => ColumnType::String,
            Self::FixedString { size, .. } => ColumnType::FixedString(*size),
            Self::Date(_) => ColumnType::Date,
            Self::DateTime(_) => ColumnType::DateTime,
        }
    }

    /// Number of rows held.
    pub fn len(&self) -> usize {
        match self {
            Self::UInt8(values) => values.len(),
            Self::UInt16(values) => values.len(),
            Self::UInt32(values) => values.len(),
            Self::UInt64(values) => values.len(),
            Self::Int8(values) => values.len(),
            Self::Int16(values) => values.len(),
            Self::Int32(values) => values.len(),
            Self::Int64(values) => values.len(),
            Self::Float32(values) => values.len(),
            Self::Float64(values) => values.len(),
            Self::String(values) => values.len(),
            // The variant is public, so a zero size cannot be ruled out here.
            Self::FixedString { size, data } => {
                if *size == 0 { 0 } else { data.len() / size }
            }
            Self::Date(values) => values.len(),
            Self::DateTime(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool { self.len() == 0 }

    /// Appends `rows` values decoded from `reader`.
    pub(crate) fn load<R: ClickHouseRead>(&mut self, reader: &mut R, rows: usize) -> Result<()> {
        match self {
            Self::UInt8(values) => {
                values.reserve(rows);
                for _ in 0..rows {
                    values.push(reader.read_u8()?);
                }
            }
            Self::UInt16(values) => {
                values.reserve(rows);
                for _ in 0..rows {
                    values.push(reader.read_u16_le()?);
                }
            }
            Self::UInt32(values) => {
                values.reserve(rows);
                for _ in 0..rows {
                    values.push(reader.read_u32_le()?);
                }
            }
            Self::UInt64(values) => {
                values.reserve(rows);
                for _ in 0..rows {
                    values.push(reader.read_u64_le()?);
                }
            }
            Self::Int8(values) => {
                values.reserve(rows);
                for _ in 0..rows {
                    values.push(reader.read_i8()?);
                }
            }
            Self::Int16(values) => {
                values.reserve(rows);
                for _ in 0..rows {
                    values.push(reader.read_i16_le()?);
                }
            }
            Self::Int32(values) => {
                values.reserve(rows);
                for _ in 0..rows {
                    values.push(reader.read_i32_le()?);
                }
            }
            Self::Int64(values) => {
                values.reserve(rows);
                for _ in 0..rows {
                    values.push(reader.read_i64_le()?);
                }
            }
            Self::Float32(values) => {
                values.reserve(rows);
                for _ in 0..rows {
                    values.push(f32::from_bits(reader.read_u32_le()?));
                }
            }
            Self::Float64(values) => {
                values.reserve(rows);
                for _ in 0..rows {
                    values.push(f64::from_bits(reader.read_u64_le()?));
                }
            }
            Self::String(values) => {
                values.reserve(rows);
                for _ in 0..rows {
                    values.push(reader.read_string()?);
                }
            }
            Self::FixedString { size, data } => {
                let total = size.checked_mul(rows).ok_or_else(|| {
                    Error::Protocol(format!("FixedString({size}) x {rows} rows overflows"))
                })?;
                let start = data.len();
                data.resize(start + total, 0);
                reader.read_exact(&mut data[start..])?;
            }
            Self::Date(values) => {
                values.reserve(rows);
                for _ in 0..rows {
                    values.push(Date(reader.read_u16_le()?));
                }
            }
            Self::DateTime(values) => {
                values.reserve(rows);
                for _ in 0..rows {
                    values.push(DateTime(reader.read_u32_le()?));
                }
            }
        }
        Ok(())
    }

    /// Writes every value, tightly packed, in wire order.
    pub(crate) fn save<W: ClickHouseWrite>(&self, writer: &mut W) -> Result<()> {
        match self {
            Self::UInt8(values) => {
                writer.write_all(values)?;
            }
            Self::UInt16(values) => {
                for value in values {
                    writer.write_u16_le(*value)?;
                }
            }
            Self::UInt32(values) => {
                for value in values {
                    writer.write_u32_le(*value)?;
                }
            }
            Self::UInt64(values) => {
                for value in values {
                    writer.write_u64_le(*value)?;
                }
            }
            Self::Int8(values) => {
                for value in values {
                    writer.write_i8(*value)?;
                }
            }
            Self::Int16(values) => {
                for value in values {
                    writer.write_i16_le(*value)?;
                }
            }
            Self::Int32(values) => {
                for value in values {
                    writer.write_i32_le(*value)?;
                }
            }
            Self::Int64(values) => {
                for value in values {
                    writer.write_i64_le(*value)?;
                }
            }
            Self::Float32(values) => {
                for value in values {
                    writer.write_u32_le(value.to_bits())?;
                }
            }
            Self::Float64(values) => {
                for value in values {
                    writer.write_u64_le(value.to_bits())?;
                }
            }
            Self::String(values) => {
                for value in values {
                    writer.write_string(value)?;
                }
            }
            Self::FixedString { data, .. } => {
                writer.write_all(data)?;
            }
            Self::Date(values) => {
                for value in values {
                    writer.write_u16_le(value.0)?;
                }
            }
            Self::DateTime(values) => {
                for value in values {
                    writer.write_u32_le(value.0)?;
                }
            }
        }
        Ok(())
    }
}

macro_rules! column_from_vec {
    ($($variant:ident: $element:ty),* $(,)?) => {
        $(
            impl From<Vec<$element>> for Column {
                fn from(values: Vec<$element>) -> Self { Self::$variant(values) }
            }
        )*
    };
}

column_from_vec! {
    UInt8: u8,
    UInt16: u16,
    UInt32: u32,
    UInt64: u64,
    Int8: i8,
    Int16: i16,
    Int32: i32,
    Int64: i64,
    Float32: f32,
    Float64: f64,
    String: Vec<u8>,
    Date: Date,
    DateTime: DateTime,
}

impl From<Vec<String>> for Column {
    fn from(values: Vec<String>) -> Self {
        Self::String(values.into_iter().map(String::into_bytes).collect())
    }
}

impl From<Vec<&str>> for Column {
    fn from(values: Vec<&str>) -> Self {
        Self::String(values.into_iter().map(|s| s.as_bytes().to_vec()).collect())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn round_trip(column: &Column) -> (Column, usize) {
        let mut bytes = Vec::new();
        column.save(&mut bytes).unwrap();
        let encoded_len = bytes.len();
        let mut decoded = Column::with_type(column.column_type());
        decoded.load(&mut Cursor::new(bytes), column.len()).unwrap();
        (decoded, encoded_len)
    }

    fn assert_round_trip(column: Column, expected_len: usize) {
        let (decoded, encoded_len) = round_trip(&column);
        assert_eq!(decoded, column);
        assert_eq!(encoded_len, expected_len);
    }

    #[test]
    fn descriptor_parse_and_print() {
        for name in [
            "UInt8", "UInt16", "UInt32", "UInt64", "Int8", "Int16", "Int32", "Int64", "Float32",
            "Float64", "String", "FixedString(9)", "Date", "DateTime",
        ] {
            let type_: ColumnType = name.parse().unwrap();
            assert_eq!(type_.to_string(), name);
        }
        assert_eq!("FixedString(9)".parse::<ColumnType>().unwrap(), ColumnType::FixedString(9));
    }

    #[test]
    fn descriptor_rejects_unknown_and_malformed() {
        for name in [
            "uint8",
            "UINT8",
            "Nullable(UInt8)",
            "FixedString(0)",
            "FixedString(x)",
            "FixedString(",
            "FixedString(9",
            "",
        ] {
            assert!(
                matches!(name.parse::<ColumnType>(), Err(Error::Protocol(_))),
                "descriptor {name:?} should be rejected"
            );
        }
    }

    #[test]
    fn round_trip_unsigned() {
        assert_round_trip(Column::from(vec![0u8, 1, 255]), 3);
        assert_round_trip(Column::from(vec![0u16, 12, u16::MAX]), 6);
        assert_round_trip(Column::from(vec![0u32, 900_000, u32::MAX]), 12);
        assert_round_trip(Column::from(vec![0u64, 9_000_000_000, u64::MAX]), 24);
    }

    #[test]
    fn round_trip_signed() {
        assert_round_trip(Column::from(vec![-128i8, 0, 127]), 3);
        assert_round_trip(Column::from(vec![i16::MIN, -1, i16::MAX]), 6);
        assert_round_trip(Column::from(vec![i32::MIN, -1, i32::MAX]), 12);
        assert_round_trip(Column::from(vec![i64::MIN, -1, i64::MAX]), 24);
    }

    #[test]
    fn round_trip_floats_bitwise() {
        assert_round_trip(
            Column::from(vec![0.0f32, -0.0, 1.5, f32::MIN_POSITIVE, f32::INFINITY]),
            20,
        );
        assert_round_trip(Column::from(vec![0.0f64, -1.25e300, f64::NEG_INFINITY]), 24);

        // NaN payloads survive because (de)serialization goes through bits.
        let column = Column::Float64(vec![f64::from_bits(0x7FF8_0000_0000_0001)]);
        let (decoded, _) = round_trip(&column);
        match decoded {
            Column::Float64(values) => {
                assert_eq!(values[0].to_bits(), 0x7FF8_0000_0000_0001);
            }
            other => panic!("expected Float64, got {other:?}"),
        }
    }

    #[test]
    fn round_trip_strings() {
        let values = vec![b"".to_vec(), b"a".to_vec(), b"a\0b".to_vec(), vec![0xFF; 300]];
        // One length varint per value plus the raw bytes.
        let expected = values.iter().map(|v| v.len() + if v.len() < 128 { 1 } else { 2 }).sum();
        assert_round_trip(Column::from(values), expected);
    }

    #[test]
    fn round_trip_fixed_strings() {
        let column = Column::fixed_string(3, ["abc", "d\0f"]).unwrap();
        assert_eq!(column.len(), 2);
        assert_round_trip(column, 6);
    }

    #[test]
    fn round_trip_dates() {
        assert_round_trip(Column::from(vec![Date(0), Date(1), Date(u16::MAX)]), 6);
        assert_round_trip(Column::from(vec![DateTime(0), DateTime(u32::MAX)]), 8);
    }

    #[test]
    fn round_trip_row_counts() {
        for rows in [0usize, 1, 7, 1024] {
            #[expect(clippy::cast_possible_truncation)]
            let values: Vec<u32> = (0..rows).map(|i| i as u32 * 31).collect();
            assert_round_trip(Column::from(values), rows * 4);

            let strings: Vec<Vec<u8>> = (0..rows).map(|i| vec![b'x'; i % 5]).collect();
            let column = Column::from(strings);
            let (decoded, _) = round_trip(&column);
            assert_eq!(decoded, column);
        }
    }

    #[test]
    fn fixed_string_constructor_validates_width() {
        assert!(matches!(Column::fixed_string(0, ["", ""]), Err(Error::Client(_))));
        assert!(matches!(Column::fixed_string(3, ["abcd"]), Err(Error::Client(_))));
    }

    #[test]
    fn zero_size_fixed_string_is_empty_not_a_panic() {
        let column = Column::with_type(ColumnType::FixedString(0));
        assert_eq!(column.len(), 0);
        assert!(column.is_empty());
    }

    #[test]
    fn load_truncated_input_is_io() {
        let mut column = Column::with_type(ColumnType::UInt32);
        let bytes = vec![1u8, 2];
        assert!(matches!(
            column.load(&mut Cursor::new(bytes), 1),
            Err(Error::Io(_))
        ));
    }
}
