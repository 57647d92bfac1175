pub mod activity;
pub mod auth;
pub mod contract;
pub mod dashboard;
pub mod lead;

use serde::{Deserialize, Deserializer};

// Distingue campo ausente (None) de `null` explícito (Some(None)) nos updates parciais.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
