//! Runtime type descriptors for dynamic values: declare a type such as
//! `Array[Integer]` or `Map[String, Union[Integer, Nil]]`, then ask
//! whether concrete values conform, mint empty instances of the declared
//! shape, and round-trip the declarations as text.

pub mod cli;
pub mod descriptor;
pub mod empty;
pub mod expr;
pub mod registry;
pub mod value;

pub use descriptor::{Descriptor, Scalar};
pub use empty::{EmptyError, NewOptions};
pub use expr::{parse_type, TypeExprError};
pub use registry::{SignatureError, Signatures};
pub use value::{ContainerKind, Value};
