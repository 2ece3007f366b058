//! Strongly-typed numeric IDs. The backend keys every table with a positive integer;
//! these wrappers keep a course id from being passed where a subject id is expected.

use crate::error::{ClientError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

fn validate_id(raw: i64) -> Result<i64> {
    if raw <= 0 {
        return Err(ClientError::InvalidId(raw.to_string()));
    }
    Ok(raw)
}

/// User id (students and administrators share the users table).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(i64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CourseId(i64);

/// Subject id. The backend calls subjects "careers" (`/careers/*`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubjectId(i64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssignmentId(i64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PaymentId(i64);

macro_rules! id_serde {
    ($name:ident) => {
        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, ser: S) -> std::result::Result<S::Ok, S::Error> {
                ser.serialize_i64(self.0)
            }
        }
        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(de: D) -> std::result::Result<Self, D::Error> {
                // Some endpoints send ids as strings ("12"), others as numbers.
                #[derive(Deserialize)]
                #[serde(untagged)]
                enum Raw {
                    Num(i64),
                    Text(String),
                }
                let id = match Raw::deserialize(de)? {
                    Raw::Num(n) => Self::new(n),
                    Raw::Text(s) => Self::from_str(&s),
                };
                id.map_err(serde::de::Error::custom)
            }
        }
    };
}
id_serde!(UserId);
id_serde!(CourseId);
id_serde!(SubjectId);
id_serde!(AssignmentId);
id_serde!(PaymentId);

macro_rules! id_type {
    ($name:ident) => {
        impl $name {
            pub fn new(raw: i64) -> Result<Self> {
                validate_id(raw).map(Self)
            }

            pub fn get(&self) -> i64 {
                self.0
            }
        }
        impl FromStr for $name {
            type Err = ClientError;
            fn from_str(s: &str) -> Result<Self> {
                let raw = s
                    .trim()
                    .parse::<i64>()
                    .map_err(|_| ClientError::InvalidId(s.to_string()))?;
                Self::new(raw)
            }
        }
        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}
id_type!(UserId);
id_type!(CourseId);
id_type!(SubjectId);
id_type!(AssignmentId);
id_type!(PaymentId);
