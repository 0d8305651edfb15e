//! CSV row serialization.
//!
//! Rows are written with `,` between fields and `\n` after every row. A field is quoted only
//! when it contains the delimiter, a quote, or a line break; quotes inside quoted fields are
//! doubled.

use csv::{QuoteStyle, Terminator, WriterBuilder};

use crate::error::{Result, SheetParityError};
use crate::types::NormalizedCell;

pub const DELIMITER: u8 = b',';
pub const LINE_TERMINATOR: u8 = b'\n';

/// Renders normalized rows as CSV lines.
#[derive(Debug)]
pub struct RowSerializer {
    builder: WriterBuilder,
}

impl RowSerializer {
    pub fn new() -> Self {
        let mut builder = WriterBuilder::new();
        builder
            .delimiter(DELIMITER)
            .quote(b'"')
            .double_quote(true)
            .quote_style(QuoteStyle::Necessary)
            .terminator(Terminator::Any(LINE_TERMINATOR))
            .flexible(true)
            .has_headers(false);
        Self { builder }
    }

    /// Serialize one row, terminator included.
    ///
    /// # Errors
    ///
    /// Returns [`SheetParityError::Serialization`] if the CSV writer fails.
    pub fn serialize_row<S: AsRef<str>>(&self, row: &[S]) -> Result<String> {
        let capacity = row.iter().map(|f| f.as_ref().len() + 3).sum::<usize>() + 1;
        let mut writer = self.builder.from_writer(Vec::with_capacity(capacity));
        writer.write_record(row.iter().map(|f| f.as_ref().as_bytes()))?;
        let bytes = writer
            .into_inner()
            .map_err(|e| SheetParityError::serialization(format!("Failed to flush CSV row: {}", e.error())))?;
        String::from_utf8(bytes)
            .map_err(|e| SheetParityError::serialization_with_source("CSV row is not valid UTF-8", e))
    }

    /// Lazily serialize `rows` in order, one line per row.
    pub fn serialize_rows<I>(&self, rows: I) -> SerializedRows<'_, I::IntoIter>
    where
        I: IntoIterator<Item = Vec<NormalizedCell>>,
    {
        SerializedRows {
            serializer: self,
            rows: rows.into_iter(),
        }
    }
}

impl Default for RowSerializer {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator returned by [`RowSerializer::serialize_rows`].
///
/// Each source row is pulled and written exactly once; the iterator is consumed as it goes.
pub struct SerializedRows<'a, I> {
    serializer: &'a RowSerializer,
    rows: I,
}

impl<I> Iterator for SerializedRows<'_, I>
where
    I: Iterator<Item = Vec<NormalizedCell>>,
{
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.rows.next().map(|row| self.serializer.serialize_row(&row))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.rows.size_hint()
    }
}

/// Serialize a single row with the default serializer.
pub fn serialize_row<S: AsRef<str>>(row: &[S]) -> Result<String> {
    RowSerializer::new().serialize_row(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn read_back(line: &str) -> Vec<String> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(line.as_bytes());
        let record = reader.records().next().unwrap().unwrap();
        record.iter().map(str::to_owned).collect()
    }

    #[test]
    fn test_plain_fields_unquoted() {
        assert_eq!(serialize_row(&["1", "abc", "TRUE"]).unwrap(), "1,abc,TRUE\n");
    }

    #[test]
    fn test_delimiter_is_quoted() {
        assert_eq!(serialize_row(&["1", "a,b", "TRUE"]).unwrap(), "1,\"a,b\",TRUE\n");
    }

    #[test]
    fn test_quotes_are_doubled() {
        assert_eq!(serialize_row(&["say \"hi\""]).unwrap(), "\"say \"\"hi\"\"\"\n");
    }

    #[test]
    fn test_line_breaks_are_quoted() {
        assert_eq!(serialize_row(&["a\nb", "c"]).unwrap(), "\"a\nb\",c\n");
        assert_eq!(serialize_row(&["a\r\nb"]).unwrap(), "\"a\r\nb\"\n");
    }

    #[test]
    fn test_empty_fields_between_values() {
        assert_eq!(serialize_row(&["", "x", ""]).unwrap(), ",x,\n");
    }

    #[test]
    fn test_round_trip_through_reader() {
        let fields = vec![
            "plain".to_string(),
            "with,comma".to_string(),
            "with \"quotes\"".to_string(),
            "multi\nline".to_string(),
            "".to_string(),
            "-#DIV/0!".to_string(),
        ];
        let line = serialize_row(&fields).unwrap();
        assert_eq!(read_back(&line), fields);
    }

    #[test]
    fn test_serialize_rows_is_lazy_and_ordered() {
        let serializer = RowSerializer::new();
        let rows = vec![
            vec!["1".to_string(), "a".to_string()],
            vec!["2".to_string()],
            vec!["3".to_string(), "c,d".to_string(), "e".to_string()],
        ];
        let mut lines = serializer.serialize_rows(rows);
        assert_eq!(lines.size_hint(), (3, Some(3)));
        assert_eq!(lines.next().unwrap().unwrap(), "1,a\n");
        assert_eq!(lines.size_hint(), (2, Some(2)));
        let rest: Vec<String> = lines.map(|l| l.unwrap()).collect();
        assert_eq!(rest, vec!["2\n", "3,\"c,d\",e\n"]);
    }
}
