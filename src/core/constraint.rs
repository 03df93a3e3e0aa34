//! Cross-variant rules.
//!
//! Rules are data, not closures: a [`Condition`] is a small expression over
//! a resolved spec, so the same type drives conflict rules and conditional
//! dependencies and can be printed back in resolver syntax.

use std::fmt;

use crate::core::errors::ConflictError;
use crate::core::spec::{CompilerFamily, ResolvedSpec};
use crate::core::variant::NONE;

/// A predicate over a resolved spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// Always true.
    Always,
    /// `+name`
    Enabled(&'static str),
    /// `~name`
    Disabled(&'static str),
    /// `name=value`
    Equals(&'static str, &'static str),
    /// A path-like variant set to something other than `none`.
    Set(&'static str),
    /// `%family`
    Compiler(CompilerFamily),
    Not(Box<Condition>),
    All(Vec<Condition>),
}

impl Condition {
    pub fn not(condition: Condition) -> Self {
        Condition::Not(Box::new(condition))
    }

    pub fn all(conditions: impl IntoIterator<Item = Condition>) -> Self {
        Condition::All(conditions.into_iter().collect())
    }

    pub fn eval(&self, spec: &ResolvedSpec<'_>) -> bool {
        match self {
            Condition::Always => true,
            Condition::Enabled(name) => spec.enabled(name),
            Condition::Disabled(name) => !spec.enabled(name),
            Condition::Equals(name, value) => spec.has_value(name, value),
            Condition::Set(name) => spec
                .variants
                .text(name)
                .is_some_and(|value| value != NONE),
            Condition::Compiler(family) => &spec.compiler().family == family,
            Condition::Not(inner) => !inner.eval(spec),
            Condition::All(conditions) => conditions.iter().all(|c| c.eval(spec)),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Always => write!(f, "always"),
            Condition::Enabled(name) => write!(f, "+{}", name),
            Condition::Disabled(name) => write!(f, "~{}", name),
            Condition::Equals(name, value) => write!(f, "{}={}", name, value),
            Condition::Set(name) => write!(f, "{}!={}", name, NONE),
            Condition::Compiler(family) => write!(f, "%{}", family),
            Condition::Not(inner) => match inner.as_ref() {
                Condition::Equals(name, value) => write!(f, "{}!={}", name, value),
                Condition::Enabled(name) => write!(f, "~{}", name),
                Condition::Disabled(name) => write!(f, "+{}", name),
                other => write!(f, "not({})", other),
            },
            Condition::All(conditions) => {
                let parts: Vec<String> = conditions.iter().map(|c| c.to_string()).collect();
                write!(f, "{}", parts.join(" "))
            }
        }
    }
}

/// "These selections together are invalid."
#[derive(Debug, Clone)]
pub struct ConflictRule {
    pub name: &'static str,
    pub when: Condition,
    pub message: &'static str,
}

impl ConflictRule {
    pub fn new(name: &'static str, when: Condition, message: &'static str) -> Self {
        ConflictRule {
            name,
            when,
            message,
        }
    }

    fn to_error(&self) -> ConflictError {
        ConflictError {
            rule: self.name.to_string(),
            when: self.when.to_string(),
            message: self.message.to_string(),
        }
    }
}

/// Conflict rules in declaration order.
#[derive(Debug, Clone, Default)]
pub struct ConstraintSet {
    rules: Vec<ConflictRule>,
}

impl ConstraintSet {
    pub fn new(rules: Vec<ConflictRule>) -> Self {
        ConstraintSet { rules }
    }

    pub fn rules(&self) -> &[ConflictRule] {
        &self.rules
    }

    /// Fail on the first rule (in declaration order) whose condition holds.
    pub fn check_all(&self, spec: &ResolvedSpec<'_>) -> Result<(), ConflictError> {
        match self.violations(spec).next() {
            Some(rule) => {
                tracing::debug!(rule = rule.name, "conflict rule matched");
                Err(rule.to_error())
            }
            None => Ok(()),
        }
    }

    /// Every rule whose condition holds, in declaration order.
    pub fn violations<'s>(
        &'s self,
        spec: &'s ResolvedSpec<'s>,
    ) -> impl Iterator<Item = &'s ConflictRule> + 's {
        self.rules.iter().filter(move |rule| rule.when.eval(spec))
    }
}
