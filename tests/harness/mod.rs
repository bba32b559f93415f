// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Test harness for driving the rate gate under concurrent load.
//!
//! Provides document generators, admission metrics and an in-process
//! registry served with axum.

#![allow(dead_code)]

pub mod generators;
pub mod metrics;
pub mod registry;
