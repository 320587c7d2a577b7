pub mod cat;
pub mod user;

pub use cat::{Cat, Owner, PostCat, PutCat};
pub use user::{PostUser, PutUser, Role, User, UserView};

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::validation::number_value;

/// Success body for mutating operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            id: None,
            user_id: None,
        }
    }

    pub fn with_id(message: impl Into<String>, id: i64) -> Self {
        Self {
            id: Some(id),
            ..Self::new(message)
        }
    }

    pub fn with_user_id(message: impl Into<String>, user_id: i64) -> Self {
        Self {
            user_id: Some(user_id),
            ..Self::new(message)
        }
    }
}

// Multipart text fields arrive as strings, JSON bodies as numbers; accept both.
pub(crate) fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    number_value(&value).ok_or_else(|| de::Error::custom("expected a number"))
}

pub(crate) fn lenient_option_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(value) => number_value(&value)
            .map(Some)
            .ok_or_else(|| de::Error::custom("expected a number")),
    }
}
