use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Snapshot of who holds the stall and until when
///
/// `occupied` is false exactly when `occupant_id` is empty and
/// `expires_at` is `None`. Use the constructors to keep it that way.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomStatus {
    pub occupied: bool,
    #[serde(rename = "userid")]
    pub occupant_id: String,
    #[serde(rename = "expires", with = "expires_format")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl RoomStatus {
    /// Status of an empty stall
    pub fn vacant() -> Self {
        Self::default()
    }

    /// Status of a stall held by `occupant_id` until `expires_at`
    pub fn occupied_by(occupant_id: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            occupied: true,
            occupant_id: occupant_id.into(),
            expires_at: Some(expires_at),
        }
    }

    /// Whether `requester_id` is the current occupant
    pub fn is_occupied_by(&self, requester_id: &str) -> bool {
        self.occupied && self.occupant_id == requester_id
    }
}

/// Deadline on the wire: epoch milliseconds as a string, `""` when vacant
mod expires_format {
    use chrono::{DateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(at) => serializer.serialize_str(&at.timestamp_millis().to_string()),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        if raw.is_empty() {
            return Ok(None);
        }

        let millis: i64 = raw.parse().map_err(de::Error::custom)?;
        DateTime::from_timestamp_millis(millis)
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("timestamp out of range: {millis}")))
    }
}
