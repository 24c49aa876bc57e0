use serde::{Deserialize, Deserializer};

/// A field of a partial update: either left out by the caller or set to a
/// value. Unlike `Option<T>`, `Set(false)` and `Set(String::new())` are
/// distinct from "not provided".
///
/// Deserializes from `T`; pair it with `#[serde(default)]` so a missing key
/// becomes `Absent`. An explicit JSON `null` is also `Absent`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch<T> {
    Absent,
    Set(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Absent
    }
}

impl<T> From<Option<T>> for Patch<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Patch::Absent, Patch::Set)
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
        Option::<T>::deserialize(deserializer).map(Patch::from)
    }
}
