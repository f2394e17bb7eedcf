//! Testing utilities for the capability runtime workspace
//!
//! Shared fixtures: the demo domains plus counters that track calls and
//! builder runs.

#![allow(missing_docs)]

pub use cap_demo::domain::*;

use cap_core::{Leaf, Node, NodeRef};
use cap_flyweight::{CacheKey, Flyweight, FlyweightFactory};
use cap_structure::FnLayer;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub fn leaves(names: &[&str]) -> Vec<NodeRef> {
    names.iter().map(|name| leaf(name)).collect()
}

pub fn text_leaf(outcome: &str) -> NodeRef {
    Arc::new(Leaf::new(outcome, outcome.to_string()))
}

/// Post-transform appending `suffix`
pub fn suffix_layer(suffix: &str) -> FnLayer<(), String> {
    let suffix = suffix.to_string();
    FnLayer::new(suffix.clone()).after(move |out: String| format!("{out}{suffix}"))
}

/// Leaf that counts how often it runs
#[derive(Debug, Default)]
pub struct CountingNode {
    outcome: String,
    calls: AtomicUsize,
}

impl CountingNode {
    pub fn new(outcome: &str) -> Self {
        Self {
            outcome: outcome.to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Node for CountingNode {
    fn operation(&self, _input: &()) -> String {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub row: u32,
    pub col: u32,
}

/// Character shape shared by every occurrence; position is extrinsic
#[derive(Debug)]
pub struct Glyph {
    pub symbol: String,
    pub font: String,
}

impl Flyweight<Position> for Glyph {
    fn serve(&self, at: &Position) -> String {
        format!("{}[{}]@{},{}", self.symbol, self.font, at.row, at.col)
    }
}

/// Glyph factory keyed by `(symbol, font)` plus a counter of shared builds
pub fn glyph_factory() -> (FlyweightFactory<Glyph>, Arc<AtomicUsize>) {
    let builds = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&builds);
    let factory = FlyweightFactory::new(
        move |key: &CacheKey| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(Glyph {
                symbol: key.part(0).unwrap_or_default().to_string(),
                font: key.part(1).unwrap_or("mono").to_string(),
            }))
        },
        |description: &str| {
            Arc::new(Glyph {
                symbol: description.to_string(),
                font: "custom".to_string(),
            })
        },
    );
    (factory, builds)
}
