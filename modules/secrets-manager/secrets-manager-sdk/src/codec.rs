//! JSON conversion for polymorphic records and merge-patch documents.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::SecretsManagerError;
use crate::family::Polymorphic;
use crate::registry;

fn decode_error(path: impl Into<String>, err: &serde_json::Error) -> SecretsManagerError {
    SecretsManagerError::Decode {
        path: path.into(),
        reason: err.to_string(),
    }
}

/// Decode one record of a polymorphic family.
///
/// The discriminator is read first and checked against the registry, so an
/// unexpected value surfaces as `UnknownVariant` rather than a serde message.
/// Unknown non-discriminator fields are ignored.
///
/// # Errors
/// `UnknownVariant` when the discriminator is missing or unregistered,
/// `Decode` when the remaining fields do not fit the variant.
pub fn decode<T>(value: Value) -> Result<T, SecretsManagerError>
where
    T: Polymorphic + DeserializeOwned,
{
    decode_at(value, "$")
}

fn decode_at<T>(value: Value, path: &str) -> Result<T, SecretsManagerError>
where
    T: Polymorphic + DeserializeOwned,
{
    let field = T::FAMILY.discriminator_field();
    let Some(object) = value.as_object() else {
        return Err(SecretsManagerError::Decode {
            path: path.to_owned(),
            reason: format!("expected a {} object", T::FAMILY),
        });
    };
    let Some(discriminator) = object.get(field).and_then(Value::as_str) else {
        return Err(SecretsManagerError::UnknownVariant {
            family: T::FAMILY.to_string(),
            discriminator: String::new(),
        });
    };
    let info = registry::resolve(T::FAMILY, discriminator)?;
    serde_json::from_value(value)
        .map_err(|e| decode_error(format!("{path}<{}>", info.discriminator), &e))
}

/// Decode a list whose elements may be of different variants.
///
/// # Errors
/// The first element error, with its index in the path.
pub fn decode_list<T>(values: Vec<Value>) -> Result<Vec<T>, SecretsManagerError>
where
    T: Polymorphic + DeserializeOwned,
{
    values
        .into_iter()
        .enumerate()
        .map(|(i, v)| decode_at(v, &format!("$[{i}]")))
        .collect()
}

/// Decode a polymorphic record from a response body.
///
/// # Errors
/// `Decode` for malformed JSON, otherwise as [`decode`].
pub fn decode_slice<T>(body: &[u8]) -> Result<T, SecretsManagerError>
where
    T: Polymorphic + DeserializeOwned,
{
    let value: Value = serde_json::from_slice(body).map_err(|e| decode_error("$", &e))?;
    decode(value)
}

/// Decode a body of a non-polymorphic shape.
///
/// # Errors
/// `Decode` naming `what` when the body does not match.
pub fn decode_plain<T: DeserializeOwned>(body: &[u8], what: &str) -> Result<T, SecretsManagerError> {
    serde_json::from_slice(body).map_err(|e| decode_error(what, &e))
}

/// Encode a polymorphic record.
///
/// Tagged families carry their discriminator in the output; untagged ones
/// (patches and version prototypes) do not.
///
/// # Errors
/// `Encode` when serialization fails or the output is not a JSON object.
pub fn encode<T>(record: &T) -> Result<Value, SecretsManagerError>
where
    T: Polymorphic + Serialize,
{
    let family = T::FAMILY;
    let value = serde_json::to_value(record).map_err(|e| SecretsManagerError::Encode {
        field: family.to_string(),
        reason: e.to_string(),
    })?;
    if !value.is_object() {
        return Err(SecretsManagerError::Encode {
            field: family.to_string(),
            reason: "record did not serialize to an object".to_owned(),
        });
    }
    registry::resolve(family, record.discriminator())?;
    Ok(value)
}

/// Merge-patch body of the fields in `partial` that differ from `empty`.
///
/// - a key whose value differs is included; explicit `null` means erase
/// - a key present in `empty` but missing from `partial` becomes `null`
/// - nested objects recurse; arrays are replaced whole
///
/// Typed patches skip `None` fields, so only unset fields are left out. A set
/// field is sent even when it holds its type's default: `Some(vec![])` goes
/// out as `[]` and clears the list, `Some(None)` goes out as `null`.
#[must_use]
pub fn diff(partial: &Map<String, Value>, empty: &Map<String, Value>) -> Map<String, Value> {
    let mut patch = Map::new();
    for (key, value) in partial {
        match (value, empty.get(key)) {
            (Value::Object(p), Some(Value::Object(e))) => {
                let nested = diff(p, e);
                if !nested.is_empty() {
                    patch.insert(key.clone(), Value::Object(nested));
                }
            }
            (v, Some(e)) if v == e => {}
            (v, _) => {
                patch.insert(key.clone(), v.clone());
            }
        }
    }
    for key in empty.keys() {
        if !partial.contains_key(key) {
            patch.insert(key.clone(), Value::Null);
        }
    }
    patch
}

fn to_object<T: Serialize>(value: &T, what: &str) -> Result<Map<String, Value>, SecretsManagerError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(SecretsManagerError::Encode {
            field: what.to_owned(),
            reason: "patch did not serialize to an object".to_owned(),
        }),
        Err(e) => Err(SecretsManagerError::Encode {
            field: what.to_owned(),
            reason: e.to_string(),
        }),
    }
}

/// Serialize a typed partial and its empty prototype and [`diff`] them.
///
/// # Errors
/// `Encode` when either side does not serialize to a JSON object.
pub fn derive_patch<T: Serialize>(
    partial: &T,
    empty: &T,
) -> Result<Map<String, Value>, SecretsManagerError> {
    let p = to_object(partial, "patch")?;
    let e = to_object(empty, "empty prototype")?;
    Ok(diff(&p, &e))
}

/// Apply an RFC 7396 merge patch in place.
pub fn apply_merge_patch(target: &mut Value, patch: &Value) {
    let Value::Object(members) = patch else {
        *target = patch.clone();
        return;
    };
    if !target.is_object() {
        *target = Value::Object(Map::new());
    }
    if let Value::Object(doc) = target {
        for (key, value) in members {
            if value.is_null() {
                doc.remove(key);
            } else {
                apply_merge_patch(doc.entry(key.clone()).or_insert(Value::Null), value);
            }
        }
    }
}
