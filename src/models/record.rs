use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;

/// Name of the key field stats responses are bucketed by
pub const DEFAULT_KEY_FIELD: &str = "period";

/// One bucket of metric values returned by the stats API.
///
/// The known metric fields are typed; anything else the API sends is kept
/// verbatim in `extra`. An absent field and an explicit JSON `null` both
/// deserialize to "no value".
///
/// Serialization omits typed fields that hold no value, so a `"likes": null`
/// from the API comes back out with no `likes` key at all. Nulls inside
/// `extra` are kept as they arrived.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeriodRecord {
    /// Period identifier (date stamp such as `2021-03-15`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub views: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visitors: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub likes: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_titles: Option<Vec<String>>,

    /// Fields outside the known schema
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PeriodRecord {
    pub fn new(period: impl Into<String>) -> Self {
        Self {
            period: Some(period.into()),
            ..Default::default()
        }
    }

    /// Key value of this record under `key_field`.
    ///
    /// `period` and the numeric metrics (`views`, `visitors`, `likes`,
    /// `comments`) read their typed field, numbers as decimal text.
    /// `post_titles` is a list and never yields a key. Any other name is
    /// looked up in the extra fields, where strings and numbers are accepted.
    pub fn key(&self, key_field: &str) -> Option<Cow<'_, str>> {
        let metric = match key_field {
            DEFAULT_KEY_FIELD => return self.period.as_deref().map(Cow::Borrowed),
            "views" => self.views,
            "visitors" => self.visitors,
            "likes" => self.likes,
            "comments" => self.comments,
            "post_titles" => return None,
            _ => return self.extra_key(key_field),
        };

        metric.map(|value| Cow::Owned(value.to_string()))
    }

    fn extra_key(&self, key_field: &str) -> Option<Cow<'_, str>> {
        match self.extra.get(key_field) {
            Some(Value::String(s)) => Some(Cow::Borrowed(s.as_str())),
            Some(Value::Number(n)) => Some(Cow::Owned(n.to_string())),
            _ => None,
        }
    }

    /// Fold `other` into this record: every value `other` carries replaces
    /// the current one, and missing values leave the current one in place.
    /// Nested objects in the extra fields fold recursively.
    pub fn absorb(&mut self, other: PeriodRecord) {
        let PeriodRecord {
            period,
            views,
            visitors,
            likes,
            comments,
            post_titles,
            extra,
        } = other;

        overwrite(&mut self.period, period);
        overwrite(&mut self.views, views);
        overwrite(&mut self.visitors, visitors);
        overwrite(&mut self.likes, likes);
        overwrite(&mut self.comments, comments);
        overwrite(&mut self.post_titles, post_titles);
        absorb_extra(&mut self.extra, extra);
    }
}

fn overwrite<T>(slot: &mut Option<T>, incoming: Option<T>) {
    if incoming.is_some() {
        *slot = incoming;
    }
}

fn absorb_extra(target: &mut Map<String, Value>, source: Map<String, Value>) {
    for (name, value) in source {
        if value.is_null() {
            continue;
        }

        match value {
            Value::Object(incoming) if matches!(target.get(&name), Some(Value::Object(_))) => {
                if let Some(Value::Object(existing)) = target.get_mut(&name) {
                    absorb_extra(existing, incoming);
                }
            }
            value => {
                target.insert(name, value);
            }
        }
    }
}
