//! Empty-instance construction.
//!
//! A descriptor for a concrete shape can mint a fresh value of that
//! shape. Construction options pass straight through to the container
//! being built and are never checked against the descriptor's element
//! types; `Array[Integer]` happily pre-fills with strings. Validation
//! and construction stay independent by design.

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

use crate::descriptor::{Descriptor, Scalar};
use crate::value::Value;

/// Optional parameters forwarded to the underlying constructor. All
/// fields default to "not given".
#[derive(Clone, Debug, Default)]
pub struct NewOptions {
    /// Pre-allocate room for this many elements (sequences only).
    pub capacity: Option<usize>,
    /// Build with this many elements instead of zero (sequences only).
    pub len: Option<usize>,
    /// Element to clone into each pre-filled slot; defaults to nil when
    /// `len` is given. Unvalidated on purpose.
    pub fill: Option<Value>,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum EmptyError {
    /// `Untyped` and unions describe no single concrete shape.
    #[error("{type_name} has no canonical empty value")]
    NoCanonicalEmpty { type_name: String },
    #[error("{type_name} does not accept the `{option}` construction option")]
    UnsupportedOption { type_name: String, option: &'static str },
    #[error("`fill` requires an explicit `len`")]
    FillWithoutLen,
}

impl Descriptor {
    /// Construct a fresh value of this descriptor's shape.
    ///
    /// With default options the result is the empty/zero value of the
    /// shape and always satisfies `validate`. Pre-filled sequences carry
    /// whatever `fill` says, valid or not.
    pub fn empty_instance(&self, opts: &NewOptions) -> Result<Value, EmptyError> {
        match self {
            Descriptor::Array { .. } => {
                if opts.fill.is_some() && opts.len.is_none() {
                    return Err(EmptyError::FillWithoutLen);
                }
                let len = opts.len.unwrap_or(0);
                let mut items = Vec::with_capacity(opts.capacity.unwrap_or(0).max(len));
                if len > 0 {
                    let fill = opts.fill.clone().unwrap_or(Value::Nil);
                    items.resize(len, fill);
                }
                Ok(Value::Array(items))
            }
            Descriptor::Set { .. } => {
                reject_options(self, opts)?;
                Ok(Value::Set(BTreeSet::new()))
            }
            Descriptor::Map { .. } => {
                reject_options(self, opts)?;
                Ok(Value::Map(BTreeMap::new()))
            }
            Descriptor::Scalar(s) => {
                reject_options(self, opts)?;
                Ok(scalar_zero(*s))
            }
            Descriptor::Untyped | Descriptor::Union { .. } => {
                Err(EmptyError::NoCanonicalEmpty { type_name: self.name() })
            }
        }
    }
}

fn scalar_zero(s: Scalar) -> Value {
    match s {
        Scalar::Nil => Value::Nil,
        Scalar::Bool => Value::Bool(false),
        Scalar::Integer => Value::Int(0),
        Scalar::Float => Value::float(0.0),
        Scalar::String => Value::Str(String::new()),
    }
}

/// Shapes without a notion of pre-sizing refuse every option rather than
/// silently ignoring it. Reports the first option set.
fn reject_options(d: &Descriptor, opts: &NewOptions) -> Result<(), EmptyError> {
    let option = if opts.capacity.is_some() {
        Some("capacity")
    } else if opts.len.is_some() {
        Some("len")
    } else if opts.fill.is_some() {
        Some("fill")
    } else {
        None
    };
    match option {
        Some(option) => Err(EmptyError::UnsupportedOption { type_name: d.name(), option }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_yield_an_empty_validating_sequence() {
        let d = Descriptor::array_of(Descriptor::integer());
        let v = d.empty_instance(&NewOptions::default()).unwrap();
        assert_eq!(v, Value::Array(vec![]));
        assert!(d.validate(&v));
    }

    #[test]
    fn capacity_alone_still_builds_a_length_zero_sequence() {
        let d = Descriptor::untyped_array();
        let opts = NewOptions { capacity: Some(64), ..NewOptions::default() };
        assert_eq!(d.empty_instance(&opts).unwrap(), Value::Array(vec![]));
    }

    #[test]
    fn len_prefills_with_nil_by_default() {
        let d = Descriptor::array_of(Descriptor::integer());
        let opts = NewOptions { len: Some(3), ..NewOptions::default() };
        let v = d.empty_instance(&opts).unwrap();
        assert_eq!(v, Value::Array(vec![Value::Nil, Value::Nil, Value::Nil]));
        // pre-filled slots were never validated; the result may not conform
        assert!(!d.validate(&v));
    }

    #[test]
    fn fill_passes_through_unvalidated() {
        let d = Descriptor::array_of(Descriptor::integer());
        let opts = NewOptions { len: Some(2), fill: Some(Value::str("x")), ..NewOptions::default() };
        let v = d.empty_instance(&opts).unwrap();
        assert_eq!(v, Value::Array(vec![Value::str("x"), Value::str("x")]));
        assert!(!d.validate(&v));
    }

    #[test]
    fn fill_without_len_is_rejected() {
        let d = Descriptor::untyped_array();
        let opts = NewOptions { fill: Some(Value::Int(0)), ..NewOptions::default() };
        assert_eq!(d.empty_instance(&opts), Err(EmptyError::FillWithoutLen));
    }

    #[test]
    fn sets_and_maps_build_empty_and_refuse_sizing_options() {
        let set = Descriptor::set_of(Descriptor::integer());
        assert_eq!(set.empty_instance(&NewOptions::default()).unwrap(), Value::Set(BTreeSet::new()));

        let map = Descriptor::map_of(Descriptor::string(), Descriptor::integer());
        let built = map.empty_instance(&NewOptions::default()).unwrap();
        assert_eq!(built, Value::Map(BTreeMap::new()));
        assert!(map.validate(&built));

        let opts = NewOptions { len: Some(2), ..NewOptions::default() };
        assert_eq!(
            map.empty_instance(&opts),
            Err(EmptyError::UnsupportedOption {
                type_name: "Map[String, Integer]".to_string(),
                option: "len",
            })
        );
    }

    #[test]
    fn scalars_mint_zero_values() {
        assert_eq!(Descriptor::nil().empty_instance(&NewOptions::default()).unwrap(), Value::Nil);
        assert_eq!(
            Descriptor::boolean().empty_instance(&NewOptions::default()).unwrap(),
            Value::Bool(false)
        );
        assert_eq!(Descriptor::integer().empty_instance(&NewOptions::default()).unwrap(), Value::Int(0));
        assert_eq!(Descriptor::string().empty_instance(&NewOptions::default()).unwrap(), Value::str(""));
    }

    #[test]
    fn untyped_and_unions_have_no_canonical_empty() {
        let err = Descriptor::Untyped.empty_instance(&NewOptions::default()).unwrap_err();
        assert_eq!(err, EmptyError::NoCanonicalEmpty { type_name: "Untyped".to_string() });

        let u = Descriptor::nilable(Descriptor::integer());
        let err = u.empty_instance(&NewOptions::default()).unwrap_err();
        assert_eq!(
            err,
            EmptyError::NoCanonicalEmpty { type_name: "Union[Nil, Integer]".to_string() }
        );
    }
}
