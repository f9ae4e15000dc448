//! Entity models and request DTOs.

pub mod account;
pub mod activity;
pub mod contact;
pub mod deal;

use serde::{Deserialize, Deserializer};

/// Deserialize an optional string field, mapping `""` to `None`.
///
/// HTML forms submit empty strings for untouched optional fields; treating
/// them as absent keeps `#[validate(url)]` / `#[validate(email)]` from
/// rejecting blank input.
pub(crate) fn empty_string_as_none<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(de)?;
    Ok(opt.filter(|s| !s.trim().is_empty()))
}

/// Deserialize a field that distinguishes "absent" from "explicitly null".
///
/// Use with `#[serde(default, deserialize_with = "double_option")]` on an
/// `Option<Option<T>>`: a missing key stays `None`, JSON `null` becomes
/// `Some(None)`, and a value becomes `Some(Some(v))`.
pub(crate) fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}
