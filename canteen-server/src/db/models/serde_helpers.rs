//! Record-id serde helpers
//!
//! 对外统一把记录 ID 表示成 "table:id" 字符串；读入时两种来源都要接受：
//! API JSON 里的字符串形式，以及数据库返回的原生 RecordId。

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serializer};
use surrealdb::RecordId;

/// 两种来源的 ID 表示
#[derive(Deserialize)]
#[serde(untagged)]
enum IdRepr {
    Text(String),
    Native(RecordId),
}

impl IdRepr {
    fn into_record_id<E: DeError>(self) -> Result<RecordId, E> {
        match self {
            IdRepr::Native(id) => Ok(id),
            IdRepr::Text(text) => text
                .parse()
                .map_err(|_| E::custom(format!("invalid record id: {}", text))),
        }
    }
}

/// RecordId serialization as "table:id" string
pub mod record_id {
    use super::*;

    pub fn serialize<S>(id: &RecordId, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.serialize_str(&id.to_string())
    }

    pub fn deserialize<'de, D>(d: D) -> Result<RecordId, D::Error>
    where
        D: Deserializer<'de>,
    {
        IdRepr::deserialize(d)?.into_record_id()
    }
}

/// Option<RecordId> serialization
pub mod option_record_id {
    use super::*;

    pub fn serialize<S>(id: &Option<RecordId>, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match id {
            Some(id) => s.serialize_some(&id.to_string()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(d: D) -> Result<Option<RecordId>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<IdRepr>::deserialize(d)? {
            Some(repr) => repr.into_record_id().map(Some),
            None => Ok(None),
        }
    }
}
