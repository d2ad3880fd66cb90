//! Wire types returned by the controller's `lu_sdata` request
//!
//! The controller answers a change poll with a JSON document holding the
//! changed device records plus the `loadtime`/`dataversion` pair that has to be
//! sent back on the next poll to receive only newer changes.

use std::fmt;

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::error::Result;

/// Stable integer identifier of a device on the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceId(pub u32);

impl DeviceId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl From<u32> for DeviceId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The controller is inconsistent about quoting numbers, so both forms are accepted
#[derive(Deserialize)]
#[serde(untagged)]
enum IntOrString {
    Int(i64),
    Str(String),
}

impl IntOrString {
    fn into_i64(self) -> std::result::Result<i64, String> {
        match self {
            IntOrString::Int(n) => Ok(n),
            IntOrString::Str(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| format!("expected an integer, got {:?}", s)),
        }
    }
}

impl<'de> Deserialize<'de> for DeviceId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = IntOrString::deserialize(deserializer)?
            .into_i64()
            .map_err(serde::de::Error::custom)?;
        u32::try_from(raw)
            .map(DeviceId)
            .map_err(|_| serde::de::Error::custom(format!("device id out of range: {}", raw)))
    }
}

fn lenient_state<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Option<i32>, D::Error> {
    let Some(raw) = Option::<IntOrString>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let code = raw.into_i64().map_err(serde::de::Error::custom)?;
    i32::try_from(code)
        .map(Some)
        .map_err(|_| serde::de::Error::custom(format!("job state out of range: {}", code)))
}

/// A single changed-device record
///
/// `id`, `state` and `comment` are the keys the subscription logic needs;
/// every other key of the record is kept in `fields` for the device to
/// interpret in its own `update`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DeviceChange {
    pub id: DeviceId,

    /// Job status code, absent when no job ran for the device
    #[serde(default, deserialize_with = "lenient_state")]
    pub state: Option<i32>,

    #[serde(default)]
    pub comment: Option<String>,

    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl DeviceChange {
    pub fn new(id: u32) -> Self {
        Self {
            id: DeviceId(id),
            state: None,
            comment: None,
            fields: Map::new(),
        }
    }

    pub fn with_state(mut self, state: i32) -> Self {
        self.state = Some(state);
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Comment text, or an empty string when the controller sent none
    pub fn comment(&self) -> &str {
        self.comment.as_deref().unwrap_or("")
    }

    /// Any other key of the record, e.g. `status` or `level`
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}

/// Opaque position in the controller's change stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub loadtime: u64,
    pub dataversion: u64,
}

/// Result of one change poll
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeBatch {
    pub devices: Vec<DeviceChange>,

    /// Cursor for the next poll; `None` when the controller did not send one
    pub cursor: Option<Cursor>,
}

#[derive(Deserialize)]
struct SdataResponse {
    #[serde(default)]
    devices: Option<Vec<Value>>,
    #[serde(default)]
    loadtime: Option<u64>,
    #[serde(default)]
    dataversion: Option<u64>,
}

impl ChangeBatch {
    pub fn new(devices: Vec<DeviceChange>, cursor: Option<Cursor>) -> Self {
        Self { devices, cursor }
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Decode an `lu_sdata` response body
    ///
    /// Records that cannot be decoded are dropped with a warning so that a
    /// single malformed entry does not fail the whole poll.
    pub fn from_json(body: &str) -> Result<Self> {
        let response: SdataResponse = serde_json::from_str(body)?;

        let devices = response
            .devices
            .unwrap_or_default()
            .into_iter()
            .filter_map(|raw| match serde_json::from_value::<DeviceChange>(raw) {
                Ok(change) => Some(change),
                Err(e) => {
                    tracing::warn!("Skipping malformed device record: {}", e);
                    None
                }
            })
            .collect();

        let cursor = match (response.loadtime, response.dataversion) {
            (Some(loadtime), Some(dataversion)) => Some(Cursor {
                loadtime,
                dataversion,
            }),
            (None, None) => None,
            (loadtime, dataversion) => {
                tracing::warn!(
                    "Incomplete change cursor (loadtime {:?}, dataversion {:?}), dropping it",
                    loadtime,
                    dataversion
                );
                None
            }
        };

        Ok(Self { devices, cursor })
    }
}
