// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Label selector grammar and evaluation.
//!
//! A selector is a comma separated list of terms, all of which must hold:
//!
//! | Term        | Matches when                                  |
//! |-------------|-----------------------------------------------|
//! | `key=value` | the label is present with exactly this value  |
//! | `key!=value`| the label is absent or has another value      |
//! | `key`       | the label is present with any value           |
//! | `!key`      | the label is absent                           |
//!
//! Evaluation is a linear scan over the resources. For browsing large sets, build the
//! label index over the filtered result rather than calling [`search`] per value.

use crate::error::{DeckError, Result};
use crate::types::DomainResource;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    Equals(String, String),
    NotEquals(String, String),
    Exists(String),
    NotExists(String),
}

impl Term {
    pub fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        match self {
            Term::Equals(key, value) => labels.get(key) == Some(value),
            Term::NotEquals(key, value) => labels.get(key) != Some(value),
            Term::Exists(key) => labels.contains_key(key),
            Term::NotExists(key) => !labels.contains_key(key),
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Equals(k, v) => write!(f, "{}={}", k, v),
            Term::NotEquals(k, v) => write!(f, "{}!={}", k, v),
            Term::Exists(k) => write!(f, "{}", k),
            Term::NotExists(k) => write!(f, "!{}", k),
        }
    }
}

/// A parsed selector. The empty selector has no terms and matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selector {
    terms: Vec<Term>,
}

impl Selector {
    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        self.terms.iter().all(|t| t.matches(labels))
    }
}

impl FromStr for Selector {
    type Err = DeckError;

    fn from_str(s: &str) -> Result<Self> {
        if s.trim().is_empty() {
            return Ok(Selector::default());
        }

        let terms = s
            .split(',')
            .map(|raw| parse_term(s, raw.trim()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Selector { terms })
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let terms: Vec<String> = self.terms.iter().map(Term::to_string).collect();
        write!(f, "{}", terms.join(","))
    }
}

fn parse_term(selector: &str, term: &str) -> Result<Term> {
    if term.is_empty() {
        return Err(DeckError::malformed(selector, "empty term"));
    }

    if let Some(key) = term.strip_prefix('!') {
        return Ok(Term::NotExists(label_key(selector, key)?));
    }

    if let Some((key, value)) = term.split_once("!=") {
        return Ok(Term::NotEquals(
            label_key(selector, key)?,
            label_value(selector, value)?,
        ));
    }

    if let Some((key, value)) = term.split_once('=') {
        // `key==value` is accepted as an equality, like kubectl does
        let value = value.strip_prefix('=').unwrap_or(value);
        return Ok(Term::Equals(
            label_key(selector, key)?,
            label_value(selector, value)?,
        ));
    }

    Ok(Term::Exists(label_key(selector, term)?))
}

fn label_key(selector: &str, key: &str) -> Result<String> {
    let key = key.trim();
    if key.is_empty() {
        return Err(DeckError::malformed(selector, "missing label key"));
    }
    if key.contains(['=', '!']) || key.contains(char::is_whitespace) {
        return Err(DeckError::malformed(
            selector,
            format!("invalid label key '{}'", key),
        ));
    }
    Ok(key.to_string())
}

fn label_value(selector: &str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.contains(['=', '!']) {
        return Err(DeckError::malformed(
            selector,
            format!("invalid label value '{}'", value),
        ));
    }
    Ok(value.to_string())
}

/// Resources whose labels satisfy `selector`, in input order.
///
/// An empty or whitespace-only selector returns every resource.
pub fn search<'a>(resources: &'a [DomainResource], selector: &str) -> Result<Vec<&'a DomainResource>> {
    let selector: Selector = selector.parse()?;
    Ok(resources
        .iter()
        .filter(|r| selector.matches(&r.labels))
        .collect())
}
