// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests Module

mod release_properties;
mod version_properties;
