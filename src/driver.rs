//! Main entry point for importing a schedule.

use crate::assemble::{Assembler, ReferencePolicy};
use crate::errors::Result;
use crate::input::{self, InputRow};
use crate::schema;
use crate::store::{NameResolver, Sink};
use itertools::Itertools;
use log::{debug, info, warn};
use std::io;

/// How to import.
#[derive(Clone, Copy, Debug, Default)]
pub struct DriverArgs {
    /// What to do with reference names that do not match any record.
    pub references: ReferencePolicy,
}

/// What an import did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    /// Data rows read.
    pub rows: usize,
    /// Delivery records inserted.
    pub records: usize,
}

/// Import every row of a schedule into the store.
///
/// The header is validated before any row is read. Rows are processed one
/// at a time and the first error stops the import; records inserted for
/// earlier rows stay in the store.
pub fn run<R, S>(rdr: R, args: &DriverArgs, store: &mut S) -> Result<Summary>
where
    R: io::Read,
    S: NameResolver + Sink,
{
    let mut reader = input::reader(rdr);
    let names = input::header_names(&mut reader)?;
    let schema = schema::validate(&names)?;
    info!(
        "date slots: {}",
        schema
            .dates
            .iter()
            .map(|s| format!("{} ({})", s.key, s.canonical))
            .join(", ")
    );
    if schema.dates.is_empty() {
        warn!("no date slots, nothing will be imported");
    }

    let header = reader.headers()?.clone();
    let mut summary = Summary::default();
    for (line, record) in (1..).zip(reader.records()) {
        let row = InputRow::from_record(&header, &record?);
        let records = {
            let assembler = Assembler::new(&schema, &*store, args.references);
            assembler
                .assemble(&row)
                .map_err(|e| e.at_line(line))?
        };
        debug!("row {line}: {} deliveries", records.len());
        for record in &records {
            store.insert(record)?;
        }
        summary.rows += 1;
        summary.records += records.len();
    }
    info!("rows: {}, deliveries: {}", summary.rows, summary.records);
    Ok(summary)
}
