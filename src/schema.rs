//! Validating the header row and discovering date slots.
//!
//! A schedule has seven fixed columns and, for every delivery date, a pair
//! of columns `<date> Restaurants` and `<date> Meals`, for example:
//!
//! ```text
//! Chapter, Recipient, Floor, Delivery Location, CONTACT PERSON, CONTACT NUMBER, Time,
//! 5/27/20 Restaurants, 5/27/20 Meals, 5/28/20 Restaurants, 5/28/20 Meals
//! ```

use crate::errors::SchemaError;
use crate::timestamp;
use chrono::NaiveDate;
use itertools::Itertools;
use std::collections::{BTreeSet, HashMap, HashSet};

const RESTAURANTS_SUFFIX: &str = " restaurants";
const MEALS_SUFFIX: &str = " meals";

/// Header text of the fixed columns, exactly as it appears in the input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Columns {
    pub chapter: String,
    pub recipient: String,
    pub floor: String,
    pub delivery_location: String,
    pub contact_person: String,
    pub contact_number: String,
    pub time: String,
}

/// One delivery date and the pair of columns that describe it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DateSlot {
    /// The date as written in the header, e.g. `5/27/20`.
    pub key: String,
    pub date: NaiveDate,
    /// The date as `YYYY-MM-DD`.
    pub canonical: String,
    /// Header text of the `<date> Restaurants` column.
    pub restaurants: String,
    /// Header text of the `<date> Meals` column.
    pub meals: String,
}

/// Date slots in header order, keyed by the date as written in the header.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DateMap {
    slots: Vec<DateSlot>,
    index: HashMap<String, usize>,
}

impl DateMap {
    fn new(slots: Vec<DateSlot>) -> DateMap {
        let index = slots
            .iter()
            .enumerate()
            .map(|(i, s)| (s.key.clone(), i))
            .collect();
        DateMap { slots, index }
    }

    pub fn iter(&self) -> impl Iterator<Item = &DateSlot> {
        self.slots.iter()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|s| s.key.as_str())
    }

    /// Canonical date for a slot key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.index
            .get(key)
            .map(|&i| self.slots[i].canonical.as_str())
    }
}

/// Everything we need to know about the header to read the rows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeaderSchema {
    pub columns: Columns,
    pub dates: DateMap,
}

fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

fn strip_suffix_ignore_case<'a>(name: &'a str, suffix: &str) -> Option<&'a str> {
    let split = name.len().checked_sub(suffix.len())?;
    if !name.is_char_boundary(split) || !name[split..].eq_ignore_ascii_case(suffix) {
        return None;
    }
    Some(name[..split].trim())
}

fn find_columns(names: &[String]) -> Result<Columns, SchemaError> {
    let lookup: HashMap<String, &String> = names
        .iter()
        .rev()
        .map(|name| (normalize_name(name), name))
        .collect();
    let find = |display: &str| {
        lookup
            .get(&normalize_name(display))
            .map(|&name| name.clone())
            .ok_or_else(|| SchemaError::MissingColumn(display.to_owned()))
    };
    Ok(Columns {
        chapter: find("Chapter")?,
        recipient: find("Recipient")?,
        floor: find("Floor")?,
        delivery_location: find("Delivery Location")?,
        contact_person: find("Contact Person")?,
        contact_number: find("Contact Number")?,
        time: find("Time")?,
    })
}

/// Date keys and column names for one kind of slot column, in header order.
fn slot_columns<'a>(
    names: &'a [String],
    suffix: &str,
) -> Result<Vec<(&'a str, &'a String)>, SchemaError> {
    let mut seen = HashSet::new();
    let mut columns = vec![];
    for name in names {
        if let Some(key) = strip_suffix_ignore_case(name.trim(), suffix) {
            if !seen.insert(key) {
                return Err(SchemaError::DuplicateColumn(name.trim().to_owned()));
            }
            columns.push((key, name));
        }
    }
    Ok(columns)
}

fn find_dates(names: &[String]) -> Result<DateMap, SchemaError> {
    let restaurants = slot_columns(names, RESTAURANTS_SUFFIX)?;
    let meals = slot_columns(names, MEALS_SUFFIX)?;

    let r_keys: BTreeSet<&str> = restaurants.iter().map(|&(k, _)| k).collect();
    let m_keys: BTreeSet<&str> = meals.iter().map(|&(k, _)| k).collect();
    if r_keys != m_keys {
        return Err(SchemaError::UnpairedDates {
            restaurants: r_keys.difference(&m_keys).map(|&k| k.to_owned()).collect_vec(),
            meals: m_keys.difference(&r_keys).map(|&k| k.to_owned()).collect_vec(),
        });
    }

    let meals: HashMap<&str, &String> = meals.into_iter().collect();
    let slots = restaurants
        .into_iter()
        .map(|(key, column)| -> Result<DateSlot, SchemaError> {
            let date = timestamp::parse_slot_date(key)
                .ok_or_else(|| SchemaError::InvalidDate(key.to_owned()))?;
            Ok(DateSlot {
                key: key.to_owned(),
                date,
                canonical: timestamp::canonical_date(date),
                restaurants: column.clone(),
                meals: meals[key].clone(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(DateMap::new(slots))
}

/// Check that the header has all fixed columns and well-formed date slots.
///
/// Fixed columns are matched ignoring case and surrounding whitespace.
/// Date keys keep their original text so that they can be used to find
/// the slot columns in each row.
pub fn validate(names: &[String]) -> Result<HeaderSchema, SchemaError> {
    let columns = find_columns(names)?;
    let dates = find_dates(names)?;
    Ok(HeaderSchema { columns, dates })
}
