// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy for the `hive` façade — aggregates the component errors
//! it is constructed from. The façade owns construction order, so its
//! error type is the union of what construction can fail with.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HiveError {
    #[error(transparent)]
    Core(#[from] hive_core::Error),

    #[error(transparent)]
    Comb(#[from] hive_comb::CombError),

    #[error(transparent)]
    Template(#[from] hive_template::TemplateError),

    #[error(transparent)]
    Pane(#[from] hive_pane::PaneError),

    #[error(transparent)]
    Coordinator(#[from] hive_coordinator::CoordinatorError),
}

pub type Result<T> = std::result::Result<T, HiveError>;
