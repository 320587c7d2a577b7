use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{lenient_f64, lenient_option_f64, UserView};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cat {
    pub cat_id: i64,
    pub cat_name: String,
    pub weight: f64,
    pub owner: Owner,
    pub filename: String,
    pub birthdate: NaiveDate,
    pub lat: f64,
    pub lng: f64,
}

/// A cat's owner, either as a bare user id or resolved to the user's projection.
/// Which variant a read returns is decided by the store query, never by payload shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Owner {
    Id(i64),
    Resolved(UserView),
}

impl Owner {
    pub fn id(&self) -> i64 {
        match self {
            Owner::Id(id) => *id,
            Owner::Resolved(user) => user.user_id,
        }
    }
}

/// Creation payload. The side-channel fields are never read from the client;
/// the controller fills them in before the cat is persisted.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PostCat {
    pub cat_name: String,
    #[serde(deserialize_with = "lenient_f64")]
    pub weight: f64,
    pub birthdate: NaiveDate,
    #[serde(skip_deserializing)]
    pub owner: i64,
    #[serde(skip_deserializing)]
    pub filename: String,
    #[serde(skip_deserializing)]
    pub lat: f64,
    #[serde(skip_deserializing)]
    pub lng: f64,
}

/// Update payload; only these fields are mutable after creation
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PutCat {
    #[serde(default)]
    pub cat_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_option_f64")]
    pub weight: Option<f64>,
    #[serde(default)]
    pub birthdate: Option<NaiveDate>,
}
