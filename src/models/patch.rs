use serde::{Deserialize, Deserializer};

/// One field of a partial update, keeping "omitted" and "explicitly null" apart.
///
/// Use with `#[serde(default)]` so an omitted field deserializes to `Absent`:
///
/// ```
/// use serde::Deserialize;
/// use taskforge::models::Patch;
///
/// #[derive(Deserialize)]
/// struct Update {
///     #[serde(default)]
///     note: Patch<String>,
/// }
///
/// let omitted: Update = serde_json::from_str("{}").unwrap();
/// let cleared: Update = serde_json::from_str(r#"{"note": null}"#).unwrap();
/// let set: Update = serde_json::from_str(r#"{"note": "hi"}"#).unwrap();
///
/// assert_eq!(omitted.note, Patch::Absent);
/// assert_eq!(cleared.note, Patch::Null);
/// assert_eq!(set.note, Patch::Value("hi".to_string()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch<T> {
    /// Field was not supplied; leave the stored value alone.
    Absent,
    /// Field was supplied as `null`.
    Null,
    /// Field was supplied with a value.
    Value(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Absent
    }
}

impl<T> Patch<T> {
    pub fn is_null(&self) -> bool {
        matches!(self, Patch::Null)
    }

    pub fn as_value(&self) -> Option<&T> {
        match self {
            Patch::Value(value) => Some(value),
            _ => None,
        }
    }

    /// Overwrites a non-nullable field. `Null` is rejected during validation and
    /// is a no-op here.
    pub fn apply(self, target: &mut T) {
        if let Patch::Value(value) = self {
            *target = value;
        }
    }

    /// Overwrites a nullable field; `Null` clears it.
    pub fn apply_nullable(self, target: &mut Option<T>) {
        match self {
            Patch::Absent => {}
            Patch::Null => *target = None,
            Patch::Value(value) => *target = Some(value),
        }
    }
}

impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(|value| match value {
            Some(value) => Patch::Value(value),
            None => Patch::Null,
        })
    }
}
