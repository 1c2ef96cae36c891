//! The explicit mapping between the flattened `customers` row and the nested
//! `Customer` record.
//!
//! Every column the application reads is listed once in [`CUSTOMER_COLUMNS`]
//! together with the field path it lands on. Rows are read through the
//! [`ColumnSource`] trait, so the whole mapping can be exercised without a
//! database.

use crate::error::DbError;
use core_types::{Customer, Purchase};
use serde_json::{Map, Value};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

/// How a stored column is turned into a value of the nested record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Integer,
    /// Stored as an integer; any non-zero value means `true`.
    Flag,
    /// A serialized list of strings, see [`decode_string_list`].
    StringList,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMapping {
    pub column: &'static str,
    pub path: &'static [&'static str],
    pub kind: ColumnKind,
}

const fn map(column: &'static str, path: &'static [&'static str], kind: ColumnKind) -> ColumnMapping {
    ColumnMapping { column, path, kind }
}

/// Top-level field holding the optional garden profile.
pub const GARDEN_PROFILE_FIELD: &str = "garden_profile";

/// The column whose value decides whether a garden profile exists at all.
pub const GARDEN_SENTINEL_COLUMN: &str = "garden_type";

pub const CUSTOMER_COLUMNS: &[ColumnMapping] = &[
    map("customer_id", &["customer_id"], ColumnKind::Text),
    map("account_number", &["account_number"], ColumnKind::Text),
    map("customer_first_name", &["customer_first_name"], ColumnKind::Text),
    map("customer_last_name", &["customer_last_name"], ColumnKind::Text),
    map("email", &["email"], ColumnKind::Text),
    map("phone_number", &["phone_number"], ColumnKind::Text),
    map("customer_start_date", &["customer_start_date"], ColumnKind::Text),
    map("years_as_customer", &["years_as_customer"], ColumnKind::Integer),
    map("billing_address_street", &["billing_address", "street"], ColumnKind::Text),
    map("billing_address_city", &["billing_address", "city"], ColumnKind::Text),
    map("billing_address_state", &["billing_address", "state"], ColumnKind::Text),
    map("billing_address_zip", &["billing_address", "zip"], ColumnKind::Text),
    map("loyalty_points", &["loyalty_points"], ColumnKind::Integer),
    map("preferred_store", &["preferred_store"], ColumnKind::Text),
    map("comm_pref_email", &["communication_preferences", "email"], ColumnKind::Flag),
    map("comm_pref_sms", &["communication_preferences", "sms"], ColumnKind::Flag),
    map("comm_pref_push", &["communication_preferences", "push_notifications"], ColumnKind::Flag),
    map("garden_type", &["garden_profile", "type"], ColumnKind::Text),
    map("garden_size", &["garden_profile", "size"], ColumnKind::Text),
    map("garden_sun_exposure", &["garden_profile", "sun_exposure"], ColumnKind::Text),
    map("garden_soil_type", &["garden_profile", "soil_type"], ColumnKind::Text),
    map("garden_interests", &["garden_profile", "interests"], ColumnKind::StringList),
];

/// Read access to a single flat row, column by column. `Ok(None)` means NULL.
pub trait ColumnSource {
    fn text(&self, column: &str) -> Result<Option<String>, DbError>;
    fn integer(&self, column: &str) -> Result<Option<i64>, DbError>;
}

impl ColumnSource for SqliteRow {
    fn text(&self, column: &str) -> Result<Option<String>, DbError> {
        self.try_get::<Option<String>, _>(column)
            .map_err(DbError::from_query)
    }

    fn integer(&self, column: &str) -> Result<Option<i64>, DbError> {
        self.try_get::<Option<i64>, _>(column)
            .map_err(DbError::from_query)
    }
}

/// A garden profile exists only when `garden_type` holds a non-empty value.
pub fn has_garden_profile(source: &impl ColumnSource) -> Result<bool, DbError> {
    Ok(source
        .text(GARDEN_SENTINEL_COLUMN)?
        .is_some_and(|garden_type| !garden_type.is_empty()))
}

/// Decodes a stored list of strings, keeping the stored order.
///
/// The canonical form is a JSON array. Values that do not start with `[` are
/// read as a comma-delimited list, which is how older rows were written.
pub fn decode_string_list(raw: &str) -> Result<Vec<String>, serde_json::Error> {
    let trimmed = raw.trim();
    if trimmed.starts_with('[') {
        return serde_json::from_str(trimmed);
    }
    Ok(trimmed
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect())
}

/// Encodes a list of strings in the canonical stored form.
pub fn encode_string_list(values: &[String]) -> Result<String, serde_json::Error> {
    serde_json::to_string(values)
}

/// Builds the nested JSON object described by [`CUSTOMER_COLUMNS`].
///
/// NULL columns are left out, so the record's own defaults apply to them. The
/// garden columns are skipped entirely when [`has_garden_profile`] is false.
pub fn nest_columns(source: &impl ColumnSource) -> Result<Map<String, Value>, DbError> {
    let include_garden = has_garden_profile(source)?;
    let mut root = Map::new();

    for mapping in CUSTOMER_COLUMNS {
        if !include_garden && mapping.path.first() == Some(&GARDEN_PROFILE_FIELD) {
            continue;
        }
        if let Some(value) = read_column(source, mapping)? {
            insert_at(&mut root, mapping, value)?;
        }
    }

    Ok(root)
}

/// Rebuilds a full `Customer` from its flat row and its already-loaded purchases.
pub fn reconstruct_customer(
    source: &impl ColumnSource,
    purchase_history: Vec<Purchase>,
) -> Result<Customer, DbError> {
    let nested = nest_columns(source)?;
    let customer: Customer = serde_json::from_value(Value::Object(nested))
        .map_err(|e| DbError::malformed("customers", e))?;

    Ok(Customer {
        purchase_history,
        ..customer
    })
}

fn read_column(source: &impl ColumnSource, mapping: &ColumnMapping) -> Result<Option<Value>, DbError> {
    let column = mapping.column;
    let value = match mapping.kind {
        ColumnKind::Text => source.text(column)?.map(Value::String),
        ColumnKind::Integer => source.integer(column)?.map(Value::from),
        ColumnKind::Flag => source.integer(column)?.map(|flag| Value::Bool(flag != 0)),
        ColumnKind::StringList => match source.text(column)? {
            Some(raw) => {
                let list = decode_string_list(&raw).map_err(|e| DbError::malformed(column, e))?;
                Some(Value::from(list))
            }
            None => None,
        },
    };
    Ok(value)
}

fn insert_at(root: &mut Map<String, Value>, mapping: &ColumnMapping, value: Value) -> Result<(), DbError> {
    let Some((leaf, parents)) = mapping.path.split_last() else {
        return Err(DbError::malformed(mapping.column, "mapping has an empty field path"));
    };

    let mut current = root;
    for segment in parents {
        let entry = current
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        let Value::Object(next) = entry else {
            return Err(DbError::malformed(
                mapping.column,
                format!("field '{segment}' is both a value and a group"),
            ));
        };
        current = next;
    }

    current.insert(leaf.to_string(), value);
    Ok(())
}
