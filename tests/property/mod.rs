// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests Module
//!
//! - `formats`: identifier shape predicates
//! - `validation`: record rule sets, scaling invariants in particular

mod formats;
mod validation;
