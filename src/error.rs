// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DepreloError>;

#[derive(Debug, Error)]
pub enum DepreloError {
    /// Bad depreciation setup: useful life, rates, stored numbers.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error(
        "configuration error: no fiscal parameters for category {category_id} at or before {fiscal_year}"
    )]
    MissingParameters { category_id: i64, fiscal_year: i32 },

    #[error("validation error: {0}")]
    Validation(String),

    /// Cross-owner references between an asset and its category or client.
    #[error("integrity error: {0}")]
    Integrity(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error(transparent)]
    Database(#[from] rusqlite::Error),
}

impl DepreloError {
    /// Errors a batch records against a single asset and moves past.
    pub fn is_per_asset(&self) -> bool {
        matches!(
            self,
            DepreloError::Configuration(_)
                | DepreloError::MissingParameters { .. }
                | DepreloError::Integrity(_)
        )
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        DepreloError::Validation(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        DepreloError::Configuration(msg.into())
    }
}
