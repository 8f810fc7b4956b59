//! Reading schedule rows from CSV.

use crate::errors::Result;
use csv::{ReaderBuilder, StringRecord};
use itertools::Itertools;
use std::collections::HashMap;
use std::io;

/// One row of the schedule, keyed by header text.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InputRow {
    fields: HashMap<String, String>,
}

impl InputRow {
    /// Pair up a record with the header. Missing trailing fields are empty.
    pub fn from_record(header: &StringRecord, record: &StringRecord) -> InputRow {
        let fields = header
            .iter()
            .zip_longest(record.iter())
            .filter_map(|pair| match pair.left_and_right() {
                (Some(k), v) => Some((k.to_owned(), v.unwrap_or_default().to_owned())),
                (None, _) => None,
            })
            .collect();
        InputRow { fields }
    }

    /// Value of a column with surrounding whitespace removed.
    /// Unknown columns read as empty.
    pub fn get(&self, column: &str) -> &str {
        self.fields.get(column).map_or("", |v| v.trim())
    }
}

impl<K, V> FromIterator<(K, V)> for InputRow
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        InputRow {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// A CSV reader for schedules: first line is the header, rows may be short.
pub fn reader<R: io::Read>(rdr: R) -> csv::Reader<R> {
    ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(rdr)
}

/// Header names of a schedule.
pub fn header_names<R: io::Read>(reader: &mut csv::Reader<R>) -> Result<Vec<String>> {
    Ok(reader.headers()?.iter().map(str::to_owned).collect_vec())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn short_and_long_rows() {
        let data = "Recipient,Floor,Time\nSt Raphael , 4\nHospital,2,3:00PM,extra\n";
        let mut rdr = reader(data.as_bytes());
        let header = rdr.headers().unwrap().clone();
        let rows = rdr
            .records()
            .map(|r| InputRow::from_record(&header, &r.unwrap()))
            .collect_vec();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("Recipient"), "St Raphael");
        assert_eq!(rows[0].get("Floor"), "4");
        assert_eq!(rows[0].get("Time"), "");
        assert_eq!(rows[1].get("Time"), "3:00PM");
        assert_eq!(rows[1].get("Nope"), "");
    }

    #[test]
    fn header() {
        let data = "Chapter, 5/27/20 Meals\n";
        let mut rdr = reader(data.as_bytes());
        assert_eq!(header_names(&mut rdr).unwrap(), vec!["Chapter", " 5/27/20 Meals"]);
    }
}
