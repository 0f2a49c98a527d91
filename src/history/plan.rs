//! Query planning for tiered history reads.
//!
//! A [`QueryPlan`] is pure data: one [`SubQuery`] per tier plus an optional
//! global page applied after the sub-results are unioned. Stores render
//! sub-queries into their own query language; nothing here touches I/O.
//!
//! When several tiers are unioned, no single tier knows where the requested
//! page boundary falls, so every tier over-fetches `n + offset` newest points
//! and the page is cut once, globally, after sorting.

use super::point::{Measurement, Point};
use super::tier::{DurationKey, StorageTier, TimeRange};
use chrono::{DateTime, Utc};

/// Newest-first window: skip `offset` points, then keep `limit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: usize,
    pub offset: usize,
}

impl Page {
    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.offset)
            .take(self.limit)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldSelection {
    All,
    /// Scalar fields plus every `attr.<id>.*` field of the listed ids.
    Attributes(Vec<String>),
}

impl FieldSelection {
    pub fn from_filter(attribute_ids: &[String]) -> Self {
        if attribute_ids.is_empty() {
            Self::All
        } else {
            Self::Attributes(attribute_ids.to_vec())
        }
    }

    pub fn keeps(&self, field: &str) -> bool {
        match self {
            Self::All => true,
            Self::Attributes(ids) => match field.strip_prefix("attr.") {
                None => true,
                Some(rest) => ids.iter().any(|id| {
                    rest.strip_prefix(id.as_str())
                        .is_some_and(|tail| tail.starts_with('.'))
                }),
            },
        }
    }

    pub fn project(&self, mut point: Point) -> Point {
        if !matches!(self, Self::All) {
            point.fields.retain(|name, _| self.keeps(name));
        }
        point
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubQuery {
    pub tier: StorageTier,
    pub measurement: Measurement,
    pub range: TimeRange,
    /// `None` reads every device.
    pub device_wwn: Option<String>,
    /// `None` reads every point in range.
    pub page: Option<Page>,
    pub fields: FieldSelection,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPlan {
    pub sub_queries: Vec<SubQuery>,
    /// Applied to the descending union; `None` when a single sub-query
    /// already pages itself or the request is unbounded.
    pub finish: Option<Page>,
}

/// Plans a newest-first attribute-history read. `n == 0` is unbounded.
pub fn attribute_history_plan(
    wwn: &str,
    key: DurationKey,
    n: usize,
    offset: usize,
    attribute_ids: &[String],
    now: DateTime<Utc>,
) -> QueryPlan {
    let tiers = key.tiers();
    let (per_tier, finish) = match (n, tiers.len()) {
        (0, _) => (None, None),
        (limit, 1) => (Some(Page { limit, offset }), None),
        (limit, _) => (
            Some(Page {
                limit: limit.saturating_add(offset),
                offset: 0,
            }),
            Some(Page { limit, offset }),
        ),
    };

    let fields = FieldSelection::from_filter(attribute_ids);
    let sub_queries = tiers
        .iter()
        .map(|&tier| SubQuery {
            tier,
            measurement: Measurement::Smart,
            range: tier.served_key().range(now),
            device_wwn: Some(wwn.to_string()),
            page: per_tier,
            fields: fields.clone(),
        })
        .collect();

    QueryPlan {
        sub_queries,
        finish,
    }
}

/// Plans a temperature read across every device; never paginated.
pub fn temperature_history_plan(key: DurationKey, now: DateTime<Utc>) -> QueryPlan {
    QueryPlan {
        sub_queries: key
            .tiers()
            .iter()
            .map(|&tier| SubQuery {
                tier,
                measurement: Measurement::Temp,
                range: tier.served_key().range(now),
                device_wwn: None,
                page: None,
                fields: FieldSelection::All,
            })
            .collect(),
        finish: None,
    }
}
