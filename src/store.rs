//! The record store as seen by the importer: name lookups and inserts.

use crate::errors::Result;
use crate::record::{DeliveryRecord, RecordId};
use log::trace;
use std::collections::HashMap;
use std::io::{self, Write};

pub const DELIVERIES: &str = "Deliveries";
pub const CHAPTERS: &str = "Chapters";
pub const RECIPIENTS: &str = "Recipients";
pub const DELIVERY_LOCATIONS: &str = "Delivery Locations";
pub const RESTAURANTS: &str = "Restaurants";

/// Maps a display name to the id of the record with exactly that name.
pub trait NameResolver {
    /// Returns `None` if there is no such record.
    fn resolve_id(&self, table: &str, name: &str) -> Result<Option<RecordId>>;
}

/// Receives finished delivery records.
pub trait Sink {
    fn insert(&mut self, record: &DeliveryRecord) -> Result<()>;
}

/// A resolver and a sink used together as one store.
pub struct Combined<R, S> {
    pub resolver: R,
    pub sink: S,
}

impl<R: NameResolver, S> NameResolver for Combined<R, S> {
    fn resolve_id(&self, table: &str, name: &str) -> Result<Option<RecordId>> {
        self.resolver.resolve_id(table, name)
    }
}

impl<R, S: Sink> Sink for Combined<R, S> {
    fn insert(&mut self, record: &DeliveryRecord) -> Result<()> {
        self.sink.insert(record)
    }
}

/// An in-memory store with named records per table.
#[derive(Default)]
pub struct MemoryStore {
    tables: HashMap<String, HashMap<String, RecordId>>,
    pub inserted: Vec<DeliveryRecord>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }

    /// Add a named record to a table.
    pub fn add(&mut self, table: &str, name: &str, id: &str) {
        self.tables
            .entry(table.to_owned())
            .or_default()
            .insert(name.to_owned(), id.to_owned());
    }

    pub fn with(mut self, table: &str, name: &str, id: &str) -> MemoryStore {
        self.add(table, name, id);
        self
    }
}

impl NameResolver for MemoryStore {
    fn resolve_id(&self, table: &str, name: &str) -> Result<Option<RecordId>> {
        let id = self.tables.get(table).and_then(|t| t.get(name)).cloned();
        trace!("{table} '{name}' -> {id:?}");
        Ok(id)
    }
}

impl Sink for MemoryStore {
    fn insert(&mut self, record: &DeliveryRecord) -> Result<()> {
        self.inserted.push(record.clone());
        Ok(())
    }
}

/// Writes each record as one line of JSON.
pub struct JsonLines<W: io::Write> {
    writer: W,
}

impl<W: io::Write> JsonLines<W> {
    pub fn new(writer: W) -> JsonLines<W> {
        JsonLines { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: io::Write> Sink for JsonLines<W> {
    fn insert(&mut self, record: &DeliveryRecord) -> Result<()> {
        serde_json::to_writer(&mut self.writer, record).map_err(io::Error::from)?;
        writeln!(self.writer)?;
        Ok(())
    }
}
