//! # conjure-core
//!
//! Turns parsed Conjure definition files into one validated
//! [`ConjureDefinition`].
//!
//! This crate provides:
//! - **Reference resolution**: local names, external imports and one level of
//!   `conjure-imports` namespaces
//! - **Dealiasing**: alias chains followed to their target, with cycles reported
//! - **Default values**: typed parsing of declared default literals
//! - **Parameter classification**: `auto` arguments placed in path or body
//! - **Validation**: ordered, fail-fast rule registries per node category
//!
//! ## Key Guarantees
//!
//! 1. **Deterministic**: the same files always produce the same IR, in
//!    file-then-declaration order
//! 2. **Fail-fast**: the first violated rule aborts the compile
//! 3. **All or nothing**: no partial IR is ever returned
//! 4. **Traceable**: every validation error names its [`Rule`] and subject
//!
//! ## Example
//!
//! ```rust,ignore
//! use conjure_core::{compile, SourceFile, SourceSet};
//!
//! let mut sources = SourceSet::new();
//! sources.add_target(SourceFile::from_yaml_file("api/widgets.yml")?);
//! sources.add_import(SourceFile::from_yaml_file("api/common.yml")?);
//!
//! let definition = compile(&sources)?;
//! println!("{}", definition.to_json_pretty()?);
//! ```

pub mod assembler;
pub mod dealias;
pub mod defaults;
pub mod error;
pub mod fixtures;
pub mod params;
pub mod patterns;
pub mod resolver;
pub mod source;
pub mod validators;

// Re-export main types at crate root
pub use assembler::{assemble, compile, Assembler, Compilation, DeclaredDefault};
pub use dealias::{Dealiased, Dealiaser};
pub use defaults::{DefaultValue, DefaultValueParser};
pub use error::{ConjureError, DefaultValueError, ResolutionError, Rule};
pub use params::{classify, path_variables, ParamKind};
pub use resolver::{ReferenceResolver, Scope};
pub use source::{RawDefinition, SourceFile, SourceSet, TypeExpr};

pub use conjure_ir::ConjureDefinition;
