//! Delivery records as they are written to the record store.

use crate::timestamp::CANONICAL_DATE_FORMAT;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Opaque identifier of a record in the store.
pub type RecordId = String;

/// Linked-record fields are lists of ids; a missing link is an empty list.
fn serialize_link<S>(id: &Option<RecordId>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    id.iter().collect::<Vec<_>>().serialize(serializer)
}

fn deserialize_link<'de, D>(deserializer: D) -> Result<Option<RecordId>, D::Error>
where
    D: Deserializer<'de>,
{
    let ids: Vec<Option<RecordId>> = Vec::deserialize(deserializer)?;
    Ok(ids.into_iter().flatten().next())
}

/// Fields shared by every delivery derived from one row.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct CommonAttributes {
    #[serde(
        rename = "Chapter",
        serialize_with = "serialize_link",
        deserialize_with = "deserialize_link"
    )]
    pub chapter: Option<RecordId>,
    #[serde(
        rename = "Recipient",
        serialize_with = "serialize_link",
        deserialize_with = "deserialize_link"
    )]
    pub recipient: Option<RecordId>,
    #[serde(rename = "Floor")]
    pub floor: String,
    #[serde(
        rename = "Delivery Location",
        serialize_with = "serialize_link",
        deserialize_with = "deserialize_link"
    )]
    pub delivery_location: Option<RecordId>,
    #[serde(rename = "Day of Hospital Contact")]
    pub contact_person: String,
    #[serde(rename = "Hospital Contact Phone")]
    pub contact_number: String,
}

/// One delivery: a restaurant bringing meals to a recipient at a given time.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct DeliveryRecord {
    #[serde(flatten)]
    pub common: CommonAttributes,
    /// Canonical timestamp, e.g. `2020-05-27T15:00:00.000Z`.
    #[serde(rename = "Delivery Scheduled")]
    pub scheduled: String,
    #[serde(
        rename = "Restaurant",
        serialize_with = "serialize_link",
        deserialize_with = "deserialize_link"
    )]
    pub restaurant: Option<RecordId>,
    #[serde(rename = "Number of Meals")]
    pub meals: i64,
}

impl DeliveryRecord {
    /// Calendar date of the scheduled delivery.
    pub fn scheduled_date(&self) -> Option<NaiveDate> {
        let date = self.scheduled.get(..10)?;
        NaiveDate::parse_from_str(date, CANONICAL_DATE_FORMAT).ok()
    }
}
