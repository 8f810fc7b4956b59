//! A record store backed by an Airtable base, over its REST API.

use crate::errors::{Result, store_error};
use crate::record::{DeliveryRecord, RecordId};
use crate::store::{self, NameResolver, Sink};
use log::{debug, trace};
use reqwest::Url;
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::{Value, json};

pub const DEFAULT_API_URL: &str = "https://api.airtable.com/v0";

/// Records are matched on this field.
const NAME_FIELD: &str = "Name";

#[derive(Deserialize)]
struct ListResponse {
    records: Vec<RecordRef>,
}

#[derive(Deserialize)]
struct RecordRef {
    id: RecordId,
}

pub struct Airtable {
    client: Client,
    api_url: Url,
    base: String,
    api_key: String,
}

/// A formula that is true for records whose `field` equals `value`.
fn match_formula(field: &str, value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('\'', "\\'");
    format!("{{{field}}}='{escaped}'")
}

/// Id of the first matching record, if any.
fn first_id(response: ListResponse) -> Option<RecordId> {
    response.records.into_iter().next().map(|r| r.id)
}

/// Request body that creates one record.
fn insert_body(record: &DeliveryRecord) -> Value {
    json!({ "fields": record })
}

impl Airtable {
    pub fn new(api_url: &str, base: &str, api_key: &str) -> Result<Airtable> {
        let api_url = Url::parse(api_url)
            .map_err(|e| store_error(format!("invalid API URL '{api_url}': {e}")))?;
        if api_url.cannot_be_a_base() {
            return Err(store_error(format!("invalid API URL '{api_url}'")));
        }
        let client = Client::builder()
            .build()
            .map_err(|e| store_error(format!("cannot create HTTP client: {e}")))?;
        Ok(Airtable {
            client,
            api_url,
            base: base.to_owned(),
            api_key: api_key.to_owned(),
        })
    }

    fn table_url(&self, table: &str) -> Url {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .expect("checked in Airtable::new")
            .pop_if_empty()
            .push(&self.base)
            .push(table);
        url
    }
}

impl NameResolver for Airtable {
    fn resolve_id(&self, table: &str, name: &str) -> Result<Option<RecordId>> {
        let url = self.table_url(table);
        let formula = match_formula(NAME_FIELD, name);
        trace!("GET {url} {formula}");
        let response: ListResponse = self
            .client
            .get(url)
            .bearer_auth(&self.api_key)
            .query(&[("filterByFormula", formula.as_str()), ("maxRecords", "1")])
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.json())
            .map_err(|e| store_error(format!("looking up '{name}' in {table}: {e}")))?;
        let id = first_id(response);
        trace!("{table} '{name}' -> {id:?}");
        Ok(id)
    }
}

impl Sink for Airtable {
    fn insert(&mut self, record: &DeliveryRecord) -> Result<()> {
        let url = self.table_url(store::DELIVERIES);
        let created: RecordRef = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&insert_body(record))
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.json())
            .map_err(|e| {
                store_error(format!(
                    "inserting delivery at {} into {}: {e}",
                    record.scheduled,
                    store::DELIVERIES
                ))
            })?;
        debug!("created {}", created.id);
        Ok(())
    }
}
