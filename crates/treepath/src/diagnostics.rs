//! Injectable diagnostics for evaluator runs.
//!
//! The evaluator always emits `tracing` events. A [`DiagnosticSink`] passed through
//! [`crate::EvaluatorBuilder::with_diagnostics`] additionally receives a structured
//! [`Diagnostic`] per step, so embedders can observe evaluation without installing a
//! global subscriber.

use core::fmt;
use std::sync::{Mutex, PoisonError};

use crate::error::Error;

/// Kind of a consumed step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    Root,
    DescendantOrSelf,
    /// `//name`
    Descendant,
    Parent,
    SelfNode,
    Attribute,
    Child,
    Predicate,
    Comparison,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Step::Root => "root",
            Step::DescendantOrSelf => "descendant-or-self",
            Step::Descendant => "descendant",
            Step::Parent => "parent",
            Step::SelfNode => "self",
            Step::Attribute => "attribute",
            Step::Child => "child",
            Step::Predicate => "predicate",
            Step::Comparison => "comparison",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A step at byte `offset` turned a set of `before` nodes into `after` nodes.
    Step { step: Step, offset: usize, before: usize, after: usize },
    /// A first-match comparison at `offset` ended the evaluation.
    ShortCircuit { offset: usize, matched: bool },
    Rejected { error: Error },
}

pub trait DiagnosticSink: Send + Sync {
    fn report(&self, diagnostic: &Diagnostic);
}

impl<F> DiagnosticSink for F
where
    F: Fn(&Diagnostic) + Send + Sync,
{
    fn report(&self, diagnostic: &Diagnostic) {
        self(diagnostic);
    }
}

/// Sink that keeps every diagnostic in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    events: Mutex<Vec<Diagnostic>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drains the collected diagnostics.
    pub fn take(&self) -> Vec<Diagnostic> {
        core::mem::take(&mut *self.events.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn len(&self) -> usize {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&self, diagnostic: &Diagnostic) {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).push(diagnostic.clone());
    }
}
