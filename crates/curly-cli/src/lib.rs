// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Library half of the `curly` command, shared by the binary and its tests.

pub mod commands;
pub mod config;
pub mod diagnostic;
