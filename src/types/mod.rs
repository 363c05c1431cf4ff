// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Domain model shared by the normalizer, the label index and the selector engine.

pub mod labels;
pub mod resource;

pub use labels::{LabelGroup, LabelSearchResult, LabelValueCount};
pub use resource::*;
