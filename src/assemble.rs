//! Turning one schedule row into delivery records.
//!
//! Each date slot of a row is all or nothing: both the restaurant and the
//! number of meals must be given, or neither. A row with a half-filled slot
//! is rejected as a whole, so no delivery is ever created with a missing
//! restaurant or an implied meal count.

use crate::errors::{Result, RowContext, RowError, RowErrorKind};
use crate::input::InputRow;
use crate::record::{CommonAttributes, DeliveryRecord, RecordId};
use crate::schema::{DateSlot, HeaderSchema};
use crate::store::{self, NameResolver};
use crate::timestamp;
use log::debug;

/// What to do when a reference name has no matching record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReferencePolicy {
    /// Leave the link empty.
    #[default]
    Permissive,
    /// Reject the row.
    Strict,
}

/// Builds delivery records for the rows of one schedule.
pub struct Assembler<'a, R> {
    schema: &'a HeaderSchema,
    resolver: &'a R,
    policy: ReferencePolicy,
}

fn context(schema: &HeaderSchema, row: &InputRow) -> RowContext {
    let columns = &schema.columns;
    RowContext {
        line: None,
        date: None,
        time: row.get(&columns.time).to_owned(),
        recipient: row.get(&columns.recipient).to_owned(),
        floor: row.get(&columns.floor).to_owned(),
    }
}

impl<'a, R: NameResolver> Assembler<'a, R> {
    pub fn new(schema: &'a HeaderSchema, resolver: &'a R, policy: ReferencePolicy) -> Self {
        Assembler {
            schema,
            resolver,
            policy,
        }
    }

    fn resolve(&self, table: &str, name: &str, ctx: &RowContext) -> Result<Option<RecordId>> {
        let id = if name.is_empty() {
            None
        } else {
            self.resolver.resolve_id(table, name)?
        };
        if id.is_none() && self.policy == ReferencePolicy::Strict {
            let kind = RowErrorKind::UnresolvedReference {
                table: table.to_owned(),
                name: name.to_owned(),
            };
            return Err(RowError::new(kind, ctx.clone()).into());
        }
        Ok(id)
    }

    fn common(&self, row: &InputRow, ctx: &RowContext) -> Result<CommonAttributes> {
        let columns = &self.schema.columns;
        Ok(CommonAttributes {
            chapter: self.resolve(store::CHAPTERS, row.get(&columns.chapter), ctx)?,
            recipient: self.resolve(store::RECIPIENTS, row.get(&columns.recipient), ctx)?,
            floor: row.get(&columns.floor).to_owned(),
            delivery_location: self.resolve(
                store::DELIVERY_LOCATIONS,
                row.get(&columns.delivery_location),
                ctx,
            )?,
            contact_person: row.get(&columns.contact_person).to_owned(),
            contact_number: row.get(&columns.contact_number).to_owned(),
        })
    }

    fn slot(
        &self,
        row: &InputRow,
        slot: &DateSlot,
        common: &CommonAttributes,
        ctx: &RowContext,
    ) -> Result<Option<DeliveryRecord>> {
        let restaurant = row.get(&slot.restaurants);
        let meals = row.get(&slot.meals);
        let ctx = RowContext {
            date: Some(slot.key.clone()),
            ..ctx.clone()
        };
        match (restaurant.is_empty(), meals.is_empty()) {
            (true, true) => Ok(None),
            (false, false) => {
                let scheduled = timestamp::normalize(&slot.canonical, &ctx.time).map_err(|e| {
                    RowError::new(RowErrorKind::InvalidTime(e), ctx.clone())
                })?;
                let meals: i64 = meals.parse().map_err(|_| {
                    RowError::new(RowErrorKind::InvalidMeals(meals.to_owned()), ctx.clone())
                })?;
                let record = DeliveryRecord {
                    common: common.clone(),
                    scheduled,
                    restaurant: self.resolve(store::RESTAURANTS, restaurant, &ctx)?,
                    meals,
                };
                debug!(
                    "{}: {} meals from {} for {}",
                    record.scheduled, record.meals, restaurant, ctx.recipient
                );
                Ok(Some(record))
            }
            _ => Err(RowError::new(RowErrorKind::PartialSlot, ctx).into()),
        }
    }

    /// All delivery records of a row, in date-slot order.
    ///
    /// Empty slots are skipped; a half-filled slot, an unparseable time or a
    /// non-integer number of meals rejects the whole row.
    pub fn assemble(&self, row: &InputRow) -> Result<Vec<DeliveryRecord>> {
        let ctx = context(self.schema, row);
        let common = self.common(row, &ctx)?;
        let mut records = vec![];
        for slot in self.schema.dates.iter() {
            if let Some(record) = self.slot(row, slot, &common, &ctx)? {
                records.push(record);
            }
        }
        Ok(records)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::errors::Error;
    use crate::schema;
    use crate::store::MemoryStore;
    use itertools::Itertools;

    const HEADER: [&str; 11] = [
        "Chapter",
        "Recipient",
        "Floor",
        "Delivery Location",
        "CONTACT PERSON",
        "CONTACT NUMBER",
        "Time",
        "5/27/20 Restaurants",
        "5/27/20 Meals",
        "5/28/20 Restaurants",
        "5/28/20 Meals",
    ];

    fn header() -> HeaderSchema {
        schema::validate(&HEADER.iter().map(|s| s.to_string()).collect_vec()).unwrap()
    }

    fn store() -> MemoryStore {
        MemoryStore::new()
            .with(store::CHAPTERS, "New Haven", "recNH")
            .with(store::RECIPIENTS, "Yale New Haven Hospital", "recYNHH")
            .with(store::DELIVERY_LOCATIONS, "Main Lobby", "recLOBBY")
            .with(store::RESTAURANTS, "Roia Restaurant", "recROIA")
            .with(store::RESTAURANTS, "Mecha Noodle Bar", "recMECHA")
    }

    fn row(slots: [&str; 4]) -> InputRow {
        let values = [
            "New Haven",
            "Yale New Haven Hospital",
            " 4 ",
            "Main Lobby",
            "Dana",
            "203-555-0100",
            "3: 00 PM",
        ];
        HEADER
            .iter()
            .zip(values.iter().chain(slots.iter()))
            .map(|(&k, &v)| (k, v))
            .collect()
    }

    fn row_error(e: Error) -> RowError {
        match e {
            Error::Row(e) => e,
            e => panic!("expected a row error, got {e}"),
        }
    }

    #[test]
    fn two_slots() {
        let schema = header();
        let store = store();
        let assembler = Assembler::new(&schema, &store, ReferencePolicy::Permissive);
        let records = assembler
            .assemble(&row(["Roia Restaurant", "25", "Mecha Noodle Bar", "30"]))
            .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].common, records[1].common);
        let common = &records[0].common;
        assert_eq!(common.chapter.as_deref(), Some("recNH"));
        assert_eq!(common.recipient.as_deref(), Some("recYNHH"));
        assert_eq!(common.delivery_location.as_deref(), Some("recLOBBY"));
        assert_eq!(common.floor, "4");
        assert_eq!(common.contact_person, "Dana");
        assert_eq!(common.contact_number, "203-555-0100");
        assert_eq!(records[0].scheduled, "2020-05-27T15:00:00.000Z");
        assert_eq!(records[0].restaurant.as_deref(), Some("recROIA"));
        assert_eq!(records[0].meals, 25);
        assert_eq!(records[1].scheduled, "2020-05-28T15:00:00.000Z");
        assert_eq!(records[1].restaurant.as_deref(), Some("recMECHA"));
        assert_eq!(records[1].meals, 30);
    }

    #[test]
    fn scheduled_date_matches_slot() {
        let schema = header();
        let store = store();
        let assembler = Assembler::new(&schema, &store, ReferencePolicy::Permissive);
        let records = assembler
            .assemble(&row(["Roia Restaurant", "25", "Mecha Noodle Bar", "30"]))
            .unwrap();
        for (record, key) in records.iter().zip(schema.dates.keys()) {
            let date = record.scheduled_date().unwrap();
            assert_eq!(Some(timestamp::canonical_date(date).as_str()), schema.dates.get(key));
        }
    }

    #[test]
    fn empty_slot_is_skipped() {
        let schema = header();
        let store = store();
        let assembler = Assembler::new(&schema, &store, ReferencePolicy::Permissive);
        let records = assembler
            .assemble(&row(["", "", "Mecha Noodle Bar", "30"]))
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].scheduled, "2020-05-28T15:00:00.000Z");
        let records = assembler.assemble(&row(["", " ", "", ""])).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn empty_row_ignores_time() {
        let schema = header();
        let store = store();
        let assembler = Assembler::new(&schema, &store, ReferencePolicy::Permissive);
        let r: InputRow = HEADER
            .iter()
            .map(|&k| (k, if k == "Time" { "whenever" } else { "" }))
            .collect();
        assert!(assembler.assemble(&r).unwrap().is_empty());
    }

    #[test]
    fn missing_meals() {
        let schema = header();
        let store = store();
        let assembler = Assembler::new(&schema, &store, ReferencePolicy::Permissive);
        let e = row_error(
            assembler
                .assemble(&row(["Roia Restaurant", "", "Mecha Noodle Bar", "30"]))
                .unwrap_err(),
        );
        assert_eq!(e.kind, RowErrorKind::PartialSlot);
        assert_eq!(e.context.date.as_deref(), Some("5/27/20"));
        assert_eq!(e.context.time, "3: 00 PM");
        assert_eq!(e.context.recipient, "Yale New Haven Hospital");
        assert_eq!(e.context.floor, "4");
    }

    #[test]
    fn missing_restaurant() {
        let schema = header();
        let store = store();
        let assembler = Assembler::new(&schema, &store, ReferencePolicy::Permissive);
        let e = row_error(
            assembler
                .assemble(&row(["Roia Restaurant", "25", "", "30"]))
                .unwrap_err(),
        );
        assert_eq!(e.kind, RowErrorKind::PartialSlot);
        assert_eq!(e.context.date.as_deref(), Some("5/28/20"));
    }

    #[test]
    fn invalid_meals() {
        let schema = header();
        let store = store();
        let assembler = Assembler::new(&schema, &store, ReferencePolicy::Permissive);
        let e = row_error(
            assembler
                .assemble(&row(["Roia Restaurant", "2.5", "", ""]))
                .unwrap_err(),
        );
        assert_eq!(e.kind, RowErrorKind::InvalidMeals("2.5".to_owned()));
    }

    #[test]
    fn invalid_time() {
        let schema = header();
        let store = store();
        let assembler = Assembler::new(&schema, &store, ReferencePolicy::Permissive);
        let r: InputRow = HEADER
            .iter()
            .map(|&k| match k {
                "Time" => (k, "15:00"),
                "5/27/20 Restaurants" => (k, "Roia Restaurant"),
                "5/27/20 Meals" => (k, "25"),
                _ => (k, ""),
            })
            .collect();
        let e = row_error(assembler.assemble(&r).unwrap_err());
        assert_eq!(
            e.kind,
            RowErrorKind::InvalidTime(timestamp::normalize("2020-05-27", "15:00").unwrap_err())
        );
        assert_eq!(e.context.date.as_deref(), Some("5/27/20"));
    }

    #[test]
    fn scheduled_matches_normalize() {
        let schema = header();
        let store = store();
        let assembler = Assembler::new(&schema, &store, ReferencePolicy::Permissive);
        let records = assembler
            .assemble(&row(["Roia Restaurant", "25", "Mecha Noodle Bar", "30"]))
            .unwrap();
        for (record, slot) in records.iter().zip(schema.dates.iter()) {
            assert_eq!(
                record.scheduled,
                timestamp::normalize(&slot.canonical, "3: 00 PM").unwrap()
            );
        }
    }

    #[test]
    fn unknown_names() {
        let schema = header();
        let store = MemoryStore::new();
        let assembler = Assembler::new(&schema, &store, ReferencePolicy::Permissive);
        let records = assembler
            .assemble(&row(["Roia Restaurant", "25", "", ""]))
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].common.chapter, None);
        assert_eq!(records[0].restaurant, None);
        assert_eq!(records[0].meals, 25);
    }

    #[test]
    fn unknown_names_strict() {
        let schema = header();
        let store = store();
        let assembler = Assembler::new(&schema, &store, ReferencePolicy::Strict);
        assert_eq!(
            assembler
                .assemble(&row(["Roia Restaurant", "25", "", ""]))
                .unwrap()
                .len(),
            1
        );
        let e = row_error(
            assembler
                .assemble(&row(["ROIA Restaurant", "25", "", ""]))
                .unwrap_err(),
        );
        assert_eq!(
            e.kind,
            RowErrorKind::UnresolvedReference {
                table: "Restaurants".to_owned(),
                name: "ROIA Restaurant".to_owned(),
            }
        );
    }
}
