//! In-memory model of Java compilation units.
//!
//! This crate provides two cooperating subsystems:
//! - A classpath-backed type index: classpath entries (source folders,
//!   class directories, jar/zip/jmod archives) are filtered, deduplicated
//!   and ordered, then served through a scoped [`Environment`] that answers
//!   type lookups lazily and memoizes the results
//! - A source generation framework: composable builders for type, method,
//!   field and annotation declarations that render deterministic,
//!   collision-free source text with a minimal grouped import list
//!
//! Module overview:
//! - Classpath model and entry ordering
//! - Environment builder and memoized type index
//! - Declaration-level symbol model
//! - Java source and class-file readers
//! - Import resolution engine
//! - Generator tree and rendering
//! - Asynchronous batch tasks

pub mod archive;
pub mod classfile;
pub mod classpath;
pub mod environment;
pub mod error;
pub mod generate;
pub mod imports;
pub mod model;
pub mod names;
pub mod parse;
pub mod task;

pub use classpath::{ClasspathEntry, ClasspathMode};
pub use environment::{Environment, EnvironmentBuilder};
pub use error::{ForgeError, ForgeResult};
pub use generate::{
    AnnotationGenerator, FieldGenerator, JavaBuilder, MethodGenerator, MethodParameterGenerator,
    PrimaryTypeGenerator, TypeGenerator, TypeParameterGenerator,
};
pub use imports::{ImportCollector, ImportDecision};
pub use model::{
    AnnotationUse, FieldDecl, Flags, MethodDecl, ParamDecl, Resolvable, TypeDecl, TypeKind,
    TypeParamDecl, TypeRef,
};
pub use task::{await_all, await_all_logging, Task};
