//! # msgforge — message schema compiler
//!
//! Compiles `.msg` message schemas (parsed with a PEST grammar) into Java
//! classes carrying byte-exact little-endian serialization, deserialization,
//! and length computation, plus an MD5 type fingerprint for cross-process
//! compatibility checks.
//!
//! ## Schema format
//!
//! One declaration per line; `#` starts a comment (except inside a string
//! constant value, which owns the rest of its line):
//!
//! ```text
//! # a 3D point
//! float64 x
//! float64 y
//! float64 z
//! ```
//!
//! Field types are builtins (`bool`, `char`, sized ints, `float32/64`,
//! `string`, `time`, `duration`), composites (`Name` in the same package,
//! `pkg/Name` across packages, the reserved `Header`), or arrays of either
//! (`T[]` variable-length, `T[n]` fixed-length). Constants are
//! `type NAME=value`.
//!
//! ## Wire format
//!
//! Strictly sequential little-endian concatenation of each field's encoding
//! in declaration order, no padding; strings and variable-length arrays are
//! prefixed by a 4-byte unsigned count. Java has no unsigned primitives, so
//! unsigned fields widen to the next larger signed type and mask back on
//! read — except `uint64`, which stays a `long` and is documented lossy.
//!
//! ## Usage
//!
//! Run the `msgforge` binary over one or more `.msg` files (the parent
//! directory name is the schema package):
//! `msgforge --out gen --include msgs/std msgs/geom/Point.msg`.
//! See `tests/codegen.rs` for library-level examples.

pub mod codegen;
pub mod identity;
pub mod layout;
pub mod mapping;
pub mod output;
pub mod parser;
pub mod schema;

pub use codegen::{generate, GenError, GeneratedUnit};
pub use identity::{dependency_closure, TypeIdentity};
pub use layout::{classify, fixed_wire_size, FieldLayout, WireClass};
pub use output::{write_unit, OutputError};
pub use parser::parse_message;
pub use schema::{Constant, Field, MessageType, SchemaRegistry};
