use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A field in a partial update.
///
/// A missing JSON key deserializes to [`Patch::Absent`] (the field must be
/// annotated with `#[serde(default)]`); any present value, including `null`,
/// is deserialized as `T`. For non-nullable `T` an explicit `null` is therefore
/// a deserialization error rather than a silent "leave unchanged".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch<T> {
    Absent,
    Set(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Self::Absent
    }
}

impl<T> Patch<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Absent => None,
            Self::Set(value) => Some(value),
        }
    }

    /// Returns the patched value, or `current` when the field was not supplied.
    pub fn apply(self, current: T) -> T {
        match self {
            Self::Absent => current,
            Self::Set(value) => value,
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        T::deserialize(deserializer).map(Self::Set)
    }
}

/// Only meaningful together with `skip_serializing_if = "Patch::is_absent"`.
impl<T: Serialize> Serialize for Patch<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Absent => serializer.serialize_none(),
            Self::Set(value) => value.serialize(serializer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize, Serialize)]
    struct Rename {
        #[serde(default, skip_serializing_if = "Patch::is_absent")]
        name: Patch<String>,
    }

    #[test]
    fn missing_key_is_absent() {
        let input: Rename = serde_json::from_str("{}").unwrap();
        assert_eq!(input.name, Patch::Absent);
    }

    #[test]
    fn present_key_is_set() {
        let input: Rename = serde_json::from_str(r#"{"name":"Evening"}"#).unwrap();
        assert_eq!(input.name, Patch::Set("Evening".to_string()));
    }

    #[test]
    fn explicit_null_is_rejected_for_non_nullable_fields() {
        let result = serde_json::from_str::<Rename>(r#"{"name":null}"#);
        assert!(result.is_err());
    }

    #[test]
    fn absent_fields_are_skipped_when_serializing() {
        let json = serde_json::to_string(&Rename { name: Patch::Absent }).unwrap();
        assert_eq!(json, "{}");
    }
}
