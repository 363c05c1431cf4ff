// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
pub mod config;
pub mod constants;
pub mod error;
pub mod kubernetes;
pub mod labels;
pub mod normalize;
pub mod types;

#[cfg(test)]
pub mod test_utils;

pub use error::{DeckError, Result};
pub use kubernetes::{ClientBundle, ClientCache, ContextKey, KubeconfigProvider};
pub use labels::{browse_labels, build_index, search};
pub use normalize::{extract_dependencies, normalize, Normalizer};
