// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Step catalog: the ordered, immutable list of steps for one tour session.
//!
//! Index `i` always refers to the same step for the lifetime of a catalog.
//!
//! ```
//! use understory_tour::catalog::Catalog;
//! use understory_tour::types::{Placement, Step, Trigger};
//!
//! let catalog = Catalog::new(vec![
//!     Step::new("welcome", "start-card")
//!         .with_placement(Placement::Right)
//!         .gated_by(Trigger::screen("patient-modal")),
//!     Step::new("form", "patient-form"),
//! ])
//! .unwrap();
//! assert_eq!(catalog.len(), 2);
//! assert_eq!(catalog.index_of("form"), Some(1));
//! ```

use std::collections::HashSet;

use crate::error::CatalogError;
use crate::types::Step;

/// Ordered, validated steps.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Catalog {
    steps: Vec<Step>,
}

impl Catalog {
    /// Validate and wrap `steps`.
    ///
    /// Fails if the list is empty, if ids repeat, or if an action-gated step
    /// has no trigger.
    pub fn new(steps: Vec<Step>) -> Result<Self, CatalogError> {
        if steps.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut seen = HashSet::with_capacity(steps.len());
        for step in &steps {
            if !seen.insert(step.id.as_str()) {
                return Err(CatalogError::DuplicateId(step.id.clone()));
            }
            if step.action_required && step.trigger.is_none() {
                return Err(CatalogError::MissingTrigger(step.id.clone()));
            }
        }
        Ok(Self { steps })
    }

    /// Parse a JSON array of steps and validate it.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let steps: Vec<Step> = serde_json::from_str(json)?;
        Self::new(steps)
    }

    /// Number of steps. Never zero.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the catalog has no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Step at `index`, if in range.
    pub fn get(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    /// Index of the step with identifier `id`.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.steps.iter().position(|s| s.id == id)
    }

    /// Whether `index` is the final step.
    pub fn is_last(&self, index: usize) -> bool {
        index + 1 == self.steps.len()
    }

    /// Iterate over steps in order.
    pub fn iter(&self) -> core::slice::Iter<'_, Step> {
        self.steps.iter()
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Step;
    type IntoIter = core::slice::Iter<'a, Step>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
