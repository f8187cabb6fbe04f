//! Textual type expressions.
//!
//! `parse_type` reads the same bracket grammar that `Descriptor::name`
//! renders, so names round-trip: `parse_type(&d.name()) == Ok(d)` for
//! every descriptor.
//!
//! ```text
//! type := NAME
//!       | NAME '[' [type (',' type)*] ']'
//! NAME := Untyped | Nil | Bool | Integer | Float | String
//!       | Array | Set | Map | Union
//! ```
//!
//! Whitespace between tokens is ignored. Arity is enforced per head:
//! `Array`/`Set` take one argument, `Map` exactly two, scalar names
//! none. `Union` takes any number of bracketed arguments, so degenerate
//! unions like `Union[]` parse back to the descriptors that render
//! them.

use thiserror::Error;

use crate::descriptor::Descriptor;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TypeExprError {
    #[error("unknown type name `{name}` at byte {pos}")]
    UnknownType { name: String, pos: usize },
    #[error("`{name}` takes {expected}, found {found} (at byte {pos})")]
    WrongArity { name: String, expected: &'static str, found: usize, pos: usize },
    #[error("unexpected `{found}` at byte {pos}")]
    Unexpected { found: char, pos: usize },
    #[error("unexpected end of type expression")]
    UnexpectedEnd,
    #[error("trailing input at byte {pos}")]
    Trailing { pos: usize },
}

/// Parse a complete type expression. The whole input must be consumed;
/// anything left over after the expression is an error.
pub fn parse_type(src: &str) -> Result<Descriptor, TypeExprError> {
    let mut p = Parser { src, pos: 0 };
    let d = p.type_expr()?;
    p.skip_ws();
    match p.peek() {
        None => Ok(d),
        Some(_) => Err(TypeExprError::Trailing { pos: p.pos }),
    }
}

struct Parser<'a> {
    src: &'a str,
    /// Byte offset into `src`; reported in errors.
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn skip_ws(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
    }

    fn eat(&mut self, want: char) -> bool {
        if self.peek() == Some(want) {
            self.pos += want.len_utf8();
            true
        } else {
            false
        }
    }

    fn ident(&mut self) -> Result<(&'a str, usize), TypeExprError> {
        let src = self.src;
        let start = self.pos;
        match self.peek() {
            Some(c) if c.is_ascii_alphabetic() => {}
            Some(c) => return Err(TypeExprError::Unexpected { found: c, pos: self.pos }),
            None => return Err(TypeExprError::UnexpectedEnd),
        }
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
        Ok((&src[start..self.pos], start))
    }

    fn type_expr(&mut self) -> Result<Descriptor, TypeExprError> {
        self.skip_ws();
        let (name, at) = self.ident()?;
        self.skip_ws();
        let mut args = Vec::new();
        let mut bracketed = false;
        if self.eat('[') {
            bracketed = true;
            self.skip_ws();
            if !self.eat(']') {
                loop {
                    args.push(self.type_expr()?);
                    self.skip_ws();
                    if self.eat(',') {
                        continue;
                    }
                    if self.eat(']') {
                        break;
                    }
                    return match self.peek() {
                        Some(c) => Err(TypeExprError::Unexpected { found: c, pos: self.pos }),
                        None => Err(TypeExprError::UnexpectedEnd),
                    };
                }
            }
        }
        build_type(name, at, args, bracketed)
    }
}

fn build_type(
    name: &str,
    at: usize,
    args: Vec<Descriptor>,
    bracketed: bool,
) -> Result<Descriptor, TypeExprError> {
    match name {
        "Untyped" => leaf(name, at, args, bracketed, Descriptor::Untyped),
        "Nil" => leaf(name, at, args, bracketed, Descriptor::nil()),
        "Bool" => leaf(name, at, args, bracketed, Descriptor::boolean()),
        "Integer" => leaf(name, at, args, bracketed, Descriptor::integer()),
        "Float" => leaf(name, at, args, bracketed, Descriptor::float()),
        "String" => leaf(name, at, args, bracketed, Descriptor::string()),
        "Array" => match <[Descriptor; 1]>::try_from(args) {
            Ok([element]) => Ok(Descriptor::array_of(element)),
            Err(args) => Err(arity(name, "exactly one type argument", args.len(), at)),
        },
        "Set" => match <[Descriptor; 1]>::try_from(args) {
            Ok([element]) => Ok(Descriptor::set_of(element)),
            Err(args) => Err(arity(name, "exactly one type argument", args.len(), at)),
        },
        "Map" => match <[Descriptor; 2]>::try_from(args) {
            Ok([key, value]) => Ok(Descriptor::map_of(key, value)),
            Err(args) => Err(arity(name, "exactly two type arguments", args.len(), at)),
        },
        // Any bracketed arity, matching what `union_of` will build.
        // `Union[]` is the union of nothing and `Union[X]` is a one-armed
        // union; both render exactly this way, so both must parse.
        "Union" => {
            if bracketed {
                Ok(Descriptor::union_of(args))
            } else {
                Err(arity(name, "a bracketed list of type arguments", 0, at))
            }
        }
        _ => Err(TypeExprError::UnknownType { name: name.to_string(), pos: at }),
    }
}

fn leaf(
    name: &str,
    at: usize,
    args: Vec<Descriptor>,
    bracketed: bool,
    built: Descriptor,
) -> Result<Descriptor, TypeExprError> {
    if bracketed {
        Err(arity(name, "no type arguments", args.len(), at))
    } else {
        Ok(built)
    }
}

fn arity(name: &str, expected: &'static str, found: usize, pos: usize) -> TypeExprError {
    TypeExprError::WrongArity { name: name.to_string(), expected, found, pos }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_scalars_and_untyped() {
        assert_eq!(parse_type("Integer"), Ok(Descriptor::integer()));
        assert_eq!(parse_type("Untyped"), Ok(Descriptor::Untyped));
        assert_eq!(parse_type("  Nil  "), Ok(Descriptor::nil()));
    }

    #[test]
    fn parses_nested_containers() {
        assert_eq!(
            parse_type("Array[Array[Integer]]"),
            Ok(Descriptor::array_of(Descriptor::array_of(Descriptor::integer())))
        );
        assert_eq!(
            parse_type("Map[String, Union[Integer, Nil]]"),
            Ok(Descriptor::map_of(
                Descriptor::string(),
                Descriptor::union_of(vec![Descriptor::integer(), Descriptor::nil()])
            ))
        );
        assert_eq!(parse_type("Set[Float]"), Ok(Descriptor::set_of(Descriptor::float())));
    }

    #[test]
    fn whitespace_between_tokens_is_ignored() {
        assert_eq!(
            parse_type(" Map [ String ,\n  Array [ Bool ] ] "),
            Ok(Descriptor::map_of(Descriptor::string(), Descriptor::array_of(Descriptor::boolean())))
        );
    }

    #[test]
    fn rendered_names_parse_back_to_equal_descriptors() {
        let cases = vec![
            Descriptor::Untyped,
            Descriptor::integer(),
            Descriptor::untyped_array(),
            Descriptor::array_of(Descriptor::string()),
            Descriptor::array_of(Descriptor::array_of(Descriptor::float())),
            Descriptor::set_of(Descriptor::nilable(Descriptor::integer())),
            Descriptor::map_of(Descriptor::string(), Descriptor::untyped_array()),
            Descriptor::union_of(vec![
                Descriptor::integer(),
                Descriptor::string(),
                Descriptor::nil(),
            ]),
        ];
        for d in cases {
            assert_eq!(parse_type(&d.name()), Ok(d));
        }
    }

    #[test]
    fn unknown_names_are_rejected_with_position() {
        assert_eq!(
            parse_type("Array[Intger]"),
            Err(TypeExprError::UnknownType { name: "Intger".to_string(), pos: 6 })
        );
    }

    #[test]
    fn arity_is_enforced_per_head() {
        assert!(matches!(
            parse_type("Array"),
            Err(TypeExprError::WrongArity { found: 0, .. })
        ));
        assert!(matches!(
            parse_type("Array[]"),
            Err(TypeExprError::WrongArity { found: 0, .. })
        ));
        assert!(matches!(
            parse_type("Array[Integer, String]"),
            Err(TypeExprError::WrongArity { found: 2, .. })
        ));
        assert!(matches!(
            parse_type("Map[String]"),
            Err(TypeExprError::WrongArity { found: 1, .. })
        ));
        assert!(matches!(
            parse_type("Integer[Nil]"),
            Err(TypeExprError::WrongArity { found: 1, .. })
        ));
        assert!(matches!(
            parse_type("Untyped[]"),
            Err(TypeExprError::WrongArity { found: 0, .. })
        ));
        // the brackets themselves are required, even for a union of nothing
        assert!(matches!(
            parse_type("Union"),
            Err(TypeExprError::WrongArity { found: 0, .. })
        ));
    }

    #[test]
    fn degenerate_unions_parse_and_round_trip() {
        assert_eq!(parse_type("Union[]"), Ok(Descriptor::union_of(vec![])));
        assert_eq!(
            parse_type("Union[Integer]"),
            Ok(Descriptor::union_of(vec![Descriptor::integer()]))
        );
        for d in [
            Descriptor::union_of(vec![]),
            Descriptor::union_of(vec![Descriptor::integer()]),
            Descriptor::array_of(Descriptor::union_of(vec![])),
        ] {
            assert_eq!(parse_type(&d.name()), Ok(d));
        }
    }

    #[test]
    fn malformed_input_reports_the_offending_byte() {
        assert_eq!(parse_type("Array[Integer"), Err(TypeExprError::UnexpectedEnd));
        assert_eq!(parse_type(""), Err(TypeExprError::UnexpectedEnd));
        assert_eq!(parse_type("Array[,Integer]"), Err(TypeExprError::Unexpected { found: ',', pos: 6 }));
        assert_eq!(parse_type("[Integer]"), Err(TypeExprError::Unexpected { found: '[', pos: 0 }));
        assert_eq!(
            parse_type("Integer extra"),
            Err(TypeExprError::Trailing { pos: 8 })
        );
    }
}
