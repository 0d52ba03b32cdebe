// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::{DepreloError, Result};
use crate::models::ParameterSet;
use crate::store::OwnerStore;

/// Parameters in force for `category_id` in `fiscal_year`: the active set
/// with the latest fiscal year at or before it. A set entered for year Y
/// stays in effect until a newer one is entered.
pub fn resolve(store: &OwnerStore<'_>, category_id: i64, fiscal_year: i32) -> Result<ParameterSet> {
    store
        .latest_parameters_at_or_before(category_id, fiscal_year)?
        .ok_or(DepreloError::MissingParameters {
            category_id,
            fiscal_year,
        })
}
