//! Runtime type descriptors.
//!
//! A `Descriptor` is a small immutable value describing a runtime type:
//! a scalar, a homogeneous container, a union, or `Untyped` (no
//! constraint). The variant set is closed on purpose. Design goals:
//!
//! - Checking is a pure yes/no question: `validate` never panics and
//!   never mutates the value under test.
//! - Identity is structural. Two descriptors built the same way compare
//!   equal, and `Array[Untyped]` *is* the untyped-sequence check.
//! - Element slots are `Arc`-shared so nested descriptors are cheap to
//!   clone across threads.

use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::value::{ContainerKind, Value};

// ------------------------------ Descriptors ------------------------------- //

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Descriptor {
    /// Matches every value unconditionally.
    Untyped,
    Scalar(Scalar),
    /// Homogeneous sequence. `Array[Untyped]` checks only the container
    /// kind and never iterates.
    Array { element: Arc<Descriptor> },
    /// Homogeneous set, same fast path as `Array` for an untyped element.
    Set { element: Arc<Descriptor> },
    /// Mapping with independently typed keys and values.
    Map { key: Arc<Descriptor>, value: Arc<Descriptor> },
    /// Matches when any variant matches. Empty unions match nothing.
    Union { variants: Vec<Descriptor> },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scalar {
    Nil,
    Bool,
    Integer,
    Float,
    String,
}

static UNTYPED: Lazy<Arc<Descriptor>> = Lazy::new(|| Arc::new(Descriptor::Untyped));

// ------------------------------ Construction ------------------------------ //

impl Descriptor {
    /// The process-wide unconstrained descriptor. Every call hands back
    /// the same allocation.
    pub fn untyped() -> Arc<Descriptor> {
        Arc::clone(&UNTYPED)
    }

    pub fn nil() -> Descriptor {
        Descriptor::Scalar(Scalar::Nil)
    }

    pub fn boolean() -> Descriptor {
        Descriptor::Scalar(Scalar::Bool)
    }

    pub fn integer() -> Descriptor {
        Descriptor::Scalar(Scalar::Integer)
    }

    pub fn float() -> Descriptor {
        Descriptor::Scalar(Scalar::Float)
    }

    pub fn string() -> Descriptor {
        Descriptor::Scalar(Scalar::String)
    }

    pub fn array_of(element: Descriptor) -> Descriptor {
        Descriptor::Array { element: share(element) }
    }

    /// Sequence whose elements are not checked at all. Identical to
    /// `array_of(Descriptor::Untyped)`; spelled out because it is the
    /// common hot-path escape hatch.
    pub fn untyped_array() -> Descriptor {
        Descriptor::Array { element: Descriptor::untyped() }
    }

    pub fn set_of(element: Descriptor) -> Descriptor {
        Descriptor::Set { element: share(element) }
    }

    pub fn untyped_set() -> Descriptor {
        Descriptor::Set { element: Descriptor::untyped() }
    }

    pub fn map_of(key: Descriptor, value: Descriptor) -> Descriptor {
        Descriptor::Map { key: share(key), value: share(value) }
    }

    pub fn untyped_map() -> Descriptor {
        Descriptor::Map { key: Descriptor::untyped(), value: Descriptor::untyped() }
    }

    pub fn union_of(variants: Vec<Descriptor>) -> Descriptor {
        Descriptor::Union { variants }
    }

    /// `Union[Nil, inner]`, the usual way to admit a missing value.
    pub fn nilable(inner: Descriptor) -> Descriptor {
        Descriptor::union_of(vec![Descriptor::nil(), inner])
    }

    pub fn is_untyped(&self) -> bool {
        matches!(self, Descriptor::Untyped)
    }

    /// The container kind this descriptor demands of a value, if it
    /// describes a container at all.
    pub fn required_kind(&self) -> Option<ContainerKind> {
        match self {
            Descriptor::Array { .. } => Some(ContainerKind::Sequence),
            Descriptor::Set { .. } => Some(ContainerKind::Set),
            Descriptor::Map { .. } => Some(ContainerKind::Mapping),
            Descriptor::Untyped | Descriptor::Scalar(_) | Descriptor::Union { .. } => None,
        }
    }
}

/// Element slots share the singleton for `Untyped` instead of allocating.
fn share(d: Descriptor) -> Arc<Descriptor> {
    if d.is_untyped() {
        Descriptor::untyped()
    } else {
        Arc::new(d)
    }
}

// -------------------------------- Naming ---------------------------------- //

impl Descriptor {
    /// Stable human-readable rendering, e.g. `Array[Integer]` or
    /// `Map[String, Union[Integer, Nil]]`. Equal descriptors always render
    /// identically, and `crate::expr::parse_type` reads the result back.
    pub fn name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Descriptor::Untyped => f.write_str("Untyped"),
            Descriptor::Scalar(s) => f.write_str(s.name()),
            Descriptor::Array { element } => write!(f, "Array[{element}]"),
            Descriptor::Set { element } => write!(f, "Set[{element}]"),
            Descriptor::Map { key, value } => write!(f, "Map[{key}, {value}]"),
            Descriptor::Union { variants } => {
                f.write_str("Union[")?;
                for (ix, variant) in variants.iter().enumerate() {
                    if ix > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{variant}")?;
                }
                f.write_str("]")
            }
        }
    }
}

impl Scalar {
    pub fn name(self) -> &'static str {
        match self {
            Scalar::Nil => "Nil",
            Scalar::Bool => "Bool",
            Scalar::Integer => "Integer",
            Scalar::Float => "Float",
            Scalar::String => "String",
        }
    }
}

// ------------------------------- Validation ------------------------------- //

impl Descriptor {
    /// Does `value` conform to this descriptor? Pure and total: no
    /// mutation, no panic, every value produces a plain boolean.
    ///
    /// Containers check their kind first, so a non-sequence fails
    /// `Array[...]` immediately without touching any elements. An
    /// untyped element slot reduces the whole check to
    /// `ContainerKind::matches` and never scans.
    pub fn validate(&self, value: &Value) -> bool {
        match self {
            Descriptor::Untyped => true,
            Descriptor::Scalar(s) => s.matches(value),
            Descriptor::Array { element } => {
                if element.is_untyped() {
                    return ContainerKind::Sequence.matches(value);
                }
                match value.as_sequence() {
                    Some(items) => all_match(element, items.iter()),
                    None => false,
                }
            }
            Descriptor::Set { element } => {
                if element.is_untyped() {
                    return ContainerKind::Set.matches(value);
                }
                match value.as_set() {
                    Some(items) => all_match(element, items.iter()),
                    None => false,
                }
            }
            Descriptor::Map { key, value: val } => {
                if key.is_untyped() && val.is_untyped() {
                    return ContainerKind::Mapping.matches(value);
                }
                match value.as_mapping() {
                    Some(entries) => entries.iter().all(|(k, v)| key.validate(k) && val.validate(v)),
                    None => false,
                }
            }
            Descriptor::Union { variants } => variants.iter().any(|d| d.validate(value)),
        }
    }
}

/// Shared element scan for homogeneous containers: true iff every element
/// satisfies `element`, short-circuiting left to right on the first
/// failure. Vacuously true for an empty container.
fn all_match<'a, I>(element: &Descriptor, items: I) -> bool
where
    I: IntoIterator<Item = &'a Value>,
{
    items.into_iter().all(|item| element.validate(item))
}

impl Scalar {
    pub fn matches(self, value: &Value) -> bool {
        matches!(
            (self, value),
            (Scalar::Nil, Value::Nil)
                | (Scalar::Bool, Value::Bool(_))
                | (Scalar::Integer, Value::Int(_))
                | (Scalar::Float, Value::Float(_))
                | (Scalar::String, Value::Str(_))
        )
    }
}

// -------------------------------- Tests ----------------------------------- //
