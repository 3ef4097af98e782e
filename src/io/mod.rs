// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! I/O against the external comment persistence service.

pub mod api;

pub use api::{ApiError, HttpPersistence, PersistenceService};
