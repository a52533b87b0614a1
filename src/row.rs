//! Row layouts written by the ingestion daemon.
//!
//! Each row is a fixed sequence of RowBinary fields. Readers decode them
//! with [`RowReader`] in column order; writers use [`RowWriter`].
//!
//! - points: `Path String, Value Float64, Time UInt32, Date Date, Timestamp UInt32`
//! - tagged: `Date Date, Tag1 String, Path String, Tags Array(String), Version UInt32`
//! - index: `Date Date, Level UInt32, Path String, Version UInt32`

use std::fmt;
use std::io::Read;
use std::str::FromStr;

use time::OffsetDateTime;

use crate::date::{date_from_days, days_from_unix};
use crate::reader::RowReader;
use crate::reverse::{reverse_bytes, segment_count};
use crate::writer::RowWriter;
use crate::{Error, Result};

/// Added to the level of index rows whose path is stored reversed.
pub const REVERSE_LEVEL_OFFSET: u32 = 10_000;

#[derive(Debug, Clone, PartialEq)]
pub struct PointRow {
    pub path: String,
    pub value: f64,
    pub time: u32,
    pub date: OffsetDateTime,
    pub timestamp: u32,
}

impl PointRow {
    /// Builds a point whose date is the UTC day of `time`.
    pub fn new(path: impl Into<String>, value: f64, time: u32, timestamp: u32) -> Self {
        Self {
            path: path.into(),
            value,
            time,
            date: date_from_days(days_from_unix(time)),
            timestamp,
        }
    }

    pub fn read_from<R: Read>(reader: &mut RowReader<R>) -> Result<Self> {
        Ok(Self {
            path: reader.read_string()?,
            value: reader.read_f64()?,
            time: reader.read_u32()?,
            date: reader.read_date()?,
            timestamp: reader.read_u32()?,
        })
    }

    pub fn write_to(&self, writer: &mut RowWriter) -> Result<()> {
        writer.write_string(&self.path);
        self.write_tail(writer)
    }

    /// Same layout as [`PointRow::write_to`] with the path segments reversed.
    pub fn write_reversed_to(&self, writer: &mut RowWriter) -> Result<()> {
        writer.write_reversed_path(self.path.as_bytes());
        self.write_tail(writer)
    }

    fn write_tail(&self, writer: &mut RowWriter) -> Result<()> {
        writer.write_f64(self.value);
        writer.write_u32(self.time);
        writer.write_date(self.date)?;
        writer.write_u32(self.timestamp);
        Ok(())
    }
}

impl fmt::Display for PointRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.path, self.value, self.time)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaggedRow {
    pub date: OffsetDateTime,
    pub tag1: String,
    pub path: String,
    pub tags: Vec<String>,
    pub version: u32,
}

impl TaggedRow {
    pub fn read_from<R: Read>(reader: &mut RowReader<R>) -> Result<Self> {
        Ok(Self {
            date: reader.read_date()?,
            tag1: reader.read_string()?,
            path: reader.read_string()?,
            tags: reader.read_string_list()?,
            version: reader.read_u32()?,
        })
    }

    pub fn write_to(&self, writer: &mut RowWriter) -> Result<()> {
        writer.write_date(self.date)?;
        writer.write_string(&self.tag1);
        writer.write_string(&self.path);
        writer.write_string_list(&self.tags);
        writer.write_u32(self.version);
        Ok(())
    }
}

impl fmt::Display for TaggedRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.path, self.version)?;
        for tag in &self.tags {
            write!(f, " {tag}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexRow {
    pub date: OffsetDateTime,
    pub level: u32,
    pub path: String,
    pub version: u32,
}

impl IndexRow {
    /// Index entry keyed by the path as written.
    pub fn direct(path: impl Into<String>, date: OffsetDateTime, version: u32) -> Self {
        let path = path.into();
        Self {
            date,
            level: level_of(path.as_bytes()),
            path,
            version,
        }
    }

    /// Index entry keyed by the reversed path, for suffix lookups.
    pub fn reversed(path: &str, date: OffsetDateTime, version: u32) -> Self {
        let reversed = reverse_bytes(path.as_bytes());
        Self {
            date,
            level: level_of(path.as_bytes()).saturating_add(REVERSE_LEVEL_OFFSET),
            path: String::from_utf8_lossy(&reversed).into_owned(),
            version,
        }
    }

    /// True only for levels in `REVERSE_LEVEL_OFFSET..2 * REVERSE_LEVEL_OFFSET`.
    /// Levels at or above `2 * REVERSE_LEVEL_OFFSET` belong to other index
    /// layouts and are treated as direct.
    pub fn is_reversed(&self) -> bool {
        (REVERSE_LEVEL_OFFSET..2 * REVERSE_LEVEL_OFFSET).contains(&self.level)
    }

    /// The path in its original segment order.
    pub fn metric_path(&self) -> String {
        if self.is_reversed() {
            String::from_utf8_lossy(&reverse_bytes(self.path.as_bytes())).into_owned()
        } else {
            self.path.clone()
        }
    }

    pub fn read_from<R: Read>(reader: &mut RowReader<R>) -> Result<Self> {
        Ok(Self {
            date: reader.read_date()?,
            level: reader.read_u32()?,
            path: reader.read_string()?,
            version: reader.read_u32()?,
        })
    }

    pub fn write_to(&self, writer: &mut RowWriter) -> Result<()> {
        writer.write_date(self.date)?;
        writer.write_u32(self.level);
        writer.write_string(&self.path);
        writer.write_u32(self.version);
        Ok(())
    }
}

impl fmt::Display for IndexRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.level, self.path)
    }
}

fn level_of(path: &[u8]) -> u32 {
    u32::try_from(segment_count(path)).unwrap_or(u32::MAX)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowSchema {
    Points,
    Tagged,
    Index,
}

impl RowSchema {
    /// Decodes the next row, or `None` if the source ended exactly on a row
    /// boundary. Input ending inside a row is an error.
    pub fn read_row<R: Read>(self, reader: &mut RowReader<R>) -> Result<Option<Row>> {
        if reader.at_eof()? {
            return Ok(None);
        }
        let row = match self {
            RowSchema::Points => Row::Point(PointRow::read_from(reader)?),
            RowSchema::Tagged => Row::Tagged(TaggedRow::read_from(reader)?),
            RowSchema::Index => Row::Index(IndexRow::read_from(reader)?),
        };
        Ok(Some(row))
    }
}

impl FromStr for RowSchema {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "points" => Ok(RowSchema::Points),
            "tagged" => Ok(RowSchema::Tagged),
            "index" => Ok(RowSchema::Index),
            other => Err(Error::InvalidConfig(format!("unknown row schema: {other}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Row {
    Point(PointRow),
    Tagged(TaggedRow),
    Index(IndexRow),
}

impl Row {
    pub fn write_to(&self, writer: &mut RowWriter) -> Result<()> {
        match self {
            Row::Point(row) => row.write_to(writer),
            Row::Tagged(row) => row.write_to(writer),
            Row::Index(row) => row.write_to(writer),
        }
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Row::Point(row) => fmt::Display::fmt(row, f),
            Row::Tagged(row) => fmt::Display::fmt(row, f),
            Row::Index(row) => fmt::Display::fmt(row, f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn point_date_follows_time() {
        let row = PointRow::new("host.cpu.load", 0.5, 86_400 * 2 + 10, 1);
        assert_eq!(row.date, datetime!(1970-01-03 0:00 UTC));
    }

    #[test]
    fn reversed_point_decodes_with_reversed_path() {
        let row = PointRow::new("host.cpu.load", 1.25, 1_700_000_000, 1_700_000_005);
        let mut writer = RowWriter::new();
        row.write_reversed_to(&mut writer).expect("write");

        let bytes = writer.into_inner();
        let mut reader = RowReader::new(&bytes[..]);
        let decoded = PointRow::read_from(&mut reader).expect("read");
        assert_eq!(decoded.path, "load.cpu.host");
        assert_eq!(decoded.value, 1.25);
        assert_eq!(decoded.date, row.date);
    }

    #[test]
    fn reversed_index_restores_path() {
        let date = datetime!(2024-01-01 0:00 UTC);
        let row = IndexRow::reversed("carbon.agents.host1.cpu", date, 3);
        assert_eq!(row.path, "cpu.host1.agents.carbon");
        assert_eq!(row.level, REVERSE_LEVEL_OFFSET + 4);
        assert!(row.is_reversed());
        assert_eq!(row.metric_path(), "carbon.agents.host1.cpu");

        let direct = IndexRow::direct("carbon.agents", date, 3);
        assert_eq!(direct.level, 2);
        assert!(!direct.is_reversed());
        assert_eq!(direct.metric_path(), "carbon.agents");
    }

    #[test]
    fn levels_past_reverse_band_are_direct() {
        let date = datetime!(2024-01-01 0:00 UTC);
        let mut row = IndexRow::direct("carbon.agents", date, 3);
        row.level = REVERSE_LEVEL_OFFSET - 1;
        assert!(!row.is_reversed());
        row.level = 2 * REVERSE_LEVEL_OFFSET - 1;
        assert!(row.is_reversed());
        row.level = 2 * REVERSE_LEVEL_OFFSET + 2;
        assert!(!row.is_reversed());
        assert_eq!(row.metric_path(), "carbon.agents");
    }

    #[test]
    fn schema_parses_names() {
        assert_eq!("points".parse::<RowSchema>().expect("points"), RowSchema::Points);
        assert_eq!("tagged".parse::<RowSchema>().expect("tagged"), RowSchema::Tagged);
        assert_eq!("index".parse::<RowSchema>().expect("index"), RowSchema::Index);
        assert!("tree".parse::<RowSchema>().is_err());
    }

    #[test]
    fn display_renders_text_lines() {
        let point = Row::Point(PointRow::new("a.b", 42.0, 100, 100));
        assert_eq!(point.to_string(), "a.b 42 100");

        let tagged = Row::Tagged(TaggedRow {
            date: datetime!(1970-01-01 0:00 UTC),
            tag1: "__name__=cpu".to_string(),
            path: "cpu?host=a".to_string(),
            tags: vec!["__name__=cpu".to_string(), "host=a".to_string()],
            version: 9,
        });
        assert_eq!(tagged.to_string(), "cpu?host=a 9 __name__=cpu host=a");
    }
}
