// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

/// Outcome of a data source capability
///
/// Backends answer capabilities they do not offer with `NotImplemented`
/// instead of failing, so callers can hide the matching console feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature<T> {
    Available(T),
    NotImplemented,
}

impl<T> Feature<T> {
    pub fn is_available(&self) -> bool {
        matches!(self, Feature::Available(_))
    }

    pub fn is_not_implemented(&self) -> bool {
        matches!(self, Feature::NotImplemented)
    }

    pub fn available(self) -> Option<T> {
        match self {
            Feature::Available(value) => Some(value),
            Feature::NotImplemented => None,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Feature<U> {
        match self {
            Feature::Available(value) => Feature::Available(f(value)),
            Feature::NotImplemented => Feature::NotImplemented,
        }
    }
}
