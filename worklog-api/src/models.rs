use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::Date;
use tracing::warn;
use uuid::Uuid;

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

const ISO_DATE: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Identifier of a worklog row.
///
/// Generated once when the row is created and never reassigned. Ids written by
/// other clients need not be UUIDs; see [`RowId::from_opaque`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RowId(Uuid);

impl RowId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Map any stored id onto a `RowId`.
    ///
    /// UUIDs are kept as they are. Anything else gets a name-based UUID, so the
    /// same stored id always maps to the same `RowId`.
    pub fn from_opaque(raw: &str) -> Self {
        match Uuid::parse_str(raw.trim()) {
            Ok(id) => Self(id),
            Err(_) => Self(Uuid::new_v5(&Uuid::NAMESPACE_OID, raw.as_bytes())),
        }
    }
}

impl Default for RowId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for RowId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl<'de> Deserialize<'de> for RowId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Scalar::deserialize(deserializer)?.into_text();
        Ok(Self::from_opaque(&raw))
    }
}

/// Any JSON scalar, for fields that other clients may have written loosely.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl Scalar {
    fn into_text(self) -> String {
        match self {
            Scalar::Text(text) => text,
            Scalar::Int(n) => n.to_string(),
            Scalar::Float(n) => n.to_string(),
            Scalar::Bool(b) => b.to_string(),
        }
    }
}

/// `null` and missing read as empty; numbers and booleans as their text.
fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<Scalar>::deserialize(deserializer)?
        .map(Scalar::into_text)
        .unwrap_or_default())
}

fn lenient_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<RowId, D::Error> {
    Ok(Option::<Scalar>::deserialize(deserializer)?
        .map(|raw| RowId::from_opaque(&raw.into_text()))
        .unwrap_or_default())
}

/// `YYYY-MM-DD`, also taking the date part of a full timestamp. Anything else
/// leaves the row undated.
fn lenient_date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Date>, D::Error> {
    let Some(raw) = Option::<Scalar>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let raw = raw.into_text();
    let day = raw.trim().split('T').next().unwrap_or_default();
    match Date::parse(day, ISO_DATE) {
        Ok(date) => Ok(Some(date)),
        Err(_) => {
            warn!("Treating row with unreadable date {:?} as undated", raw);
            Ok(None)
        }
    }
}

/// A single worklog entry as stored locally and sent to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorklogRow {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: RowId,
    #[serde(default, deserialize_with = "lenient_string")]
    pub client: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub sow_no: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub change_request_no: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub set_time: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub worked_item_details: String,
    /// `None` only for rows persisted before dates were recorded.
    #[serde(
        default,
        serialize_with = "iso_date::option::serialize",
        deserialize_with = "lenient_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<Date>,
}

impl WorklogRow {
    /// An empty row dated to `date`.
    pub fn new(date: Date) -> Self {
        Self {
            id: RowId::new(),
            client: String::new(),
            sow_no: String::new(),
            change_request_no: String::new(),
            set_time: String::new(),
            worked_item_details: String::new(),
            date: Some(date),
        }
    }

    /// Copy of this row under a fresh id.
    pub fn duplicate(&self) -> Self {
        Self {
            id: RowId::new(),
            ..self.clone()
        }
    }

    /// The date the row belongs to, treating undated rows as `today`.
    pub fn date_or(&self, today: Date) -> Date {
        self.date.unwrap_or(today)
    }
}

/// Body of `POST` submit requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitRequest {
    #[serde(with = "iso_date")]
    pub date: Date,
    pub items: Vec<WorklogRow>,
}
