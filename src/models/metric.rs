use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::ChartError;

/// A requestable statistical field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricField {
    Views,
    Visitors,
    Likes,
    Comments,
    PostTitles,
}

impl MetricField {
    /// Every field the stats API knows about, in canonical order
    pub const ALL: [MetricField; 5] = [
        Self::Views,
        Self::Visitors,
        Self::Likes,
        Self::Comments,
        Self::PostTitles,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Views => "views",
            Self::Visitors => "visitors",
            Self::Likes => "likes",
            Self::Comments => "comments",
            Self::PostTitles => "post_titles",
        }
    }

    fn bit(&self) -> u8 {
        1 << (*self as u8)
    }
}

impl fmt::Display for MetricField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricField {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        MetricField::ALL
            .into_iter()
            .find(|field| field.as_str() == needle)
            .ok_or_else(|| ChartError::UnknownMetric(s.to_string()))
    }
}

/// A set of metric fields.
///
/// Iteration and the comma-joined wire form always follow the canonical
/// order of [`MetricField::ALL`], whatever order fields were inserted in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FieldSet(u8);

impl FieldSet {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub fn all() -> Self {
        MetricField::ALL.into_iter().collect()
    }

    pub fn insert(&mut self, field: MetricField) {
        self.0 |= field.bit();
    }

    pub fn contains(&self, field: MetricField) -> bool {
        self.0 & field.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn union(&self, other: &FieldSet) -> FieldSet {
        FieldSet(self.0 | other.0)
    }

    pub fn intersection(&self, other: &FieldSet) -> FieldSet {
        FieldSet(self.0 & other.0)
    }

    /// Fields of the full universe that are not in this set
    pub fn complement(&self) -> FieldSet {
        FieldSet(Self::all().0 & !self.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = MetricField> + '_ {
        MetricField::ALL
            .into_iter()
            .filter(move |field| self.contains(*field))
    }
}

impl FromIterator<MetricField> for FieldSet {
    fn from_iter<I: IntoIterator<Item = MetricField>>(iter: I) -> Self {
        let mut set = FieldSet::empty();
        for field in iter {
            set.insert(field);
        }
        set
    }
}

impl fmt::Display for FieldSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .iter()
            .map(|field| field.as_str())
            .collect::<Vec<_>>()
            .join(",");
        f.write_str(&joined)
    }
}

impl FromStr for FieldSet {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(',')
            .filter(|part| !part.trim().is_empty())
            .map(str::parse::<MetricField>)
            .collect()
    }
}

impl Serialize for FieldSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FieldSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
