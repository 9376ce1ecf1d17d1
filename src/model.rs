//! Declaration-level symbol model.
//!
//! Types, members, annotations and generic parameters as they appear in a
//! declaration — no bodies, no dataflow. Instances are produced by the source
//! scanner ([`crate::parse`]) or the class-file reader ([`crate::classfile`])
//! and cached by the environment; they are plain data and carry no reference
//! back to any compiler internals. The only capability seam is
//! [`Resolvable`], which turns a textual type reference into an index lookup.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::environment::Environment;
use crate::error::ForgeResult;
use crate::names;

// ============================================================================
// Flags
// ============================================================================

/// Declaration modifiers as a compact bit set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Flags(pub u32);

impl Flags {
    pub const PUBLIC: Flags = Flags(0x0001);
    pub const PRIVATE: Flags = Flags(0x0002);
    pub const PROTECTED: Flags = Flags(0x0004);
    pub const STATIC: Flags = Flags(0x0008);
    pub const FINAL: Flags = Flags(0x0010);
    pub const SYNCHRONIZED: Flags = Flags(0x0020);
    pub const VOLATILE: Flags = Flags(0x0040);
    pub const TRANSIENT: Flags = Flags(0x0080);
    pub const NATIVE: Flags = Flags(0x0100);
    pub const ABSTRACT: Flags = Flags(0x0400);
    pub const STRICTFP: Flags = Flags(0x0800);
    pub const DEFAULT: Flags = Flags(0x1000);
    pub const VARARGS: Flags = Flags(0x2000);

    /// Returns a new set with `other` added.
    #[must_use]
    pub fn with(self, other: Flags) -> Flags {
        Flags(self.0 | other.0)
    }

    /// Returns true if every bit of `other` is set.
    pub fn contains(self, other: Flags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_public(self) -> bool {
        self.contains(Flags::PUBLIC)
    }

    pub fn is_private(self) -> bool {
        self.contains(Flags::PRIVATE)
    }

    pub fn is_protected(self) -> bool {
        self.contains(Flags::PROTECTED)
    }

    pub fn is_static(self) -> bool {
        self.contains(Flags::STATIC)
    }

    pub fn is_final(self) -> bool {
        self.contains(Flags::FINAL)
    }

    pub fn is_abstract(self) -> bool {
        self.contains(Flags::ABSTRACT)
    }

    /// Renders the modifier keywords in canonical order, with a trailing
    /// space when non-empty.
    pub fn render(self) -> String {
        let mut out = String::new();
        let keywords: &[(Flags, &str)] = &[
            (Flags::PUBLIC, "public"),
            (Flags::PROTECTED, "protected"),
            (Flags::PRIVATE, "private"),
            (Flags::ABSTRACT, "abstract"),
            (Flags::DEFAULT, "default"),
            (Flags::STATIC, "static"),
            (Flags::FINAL, "final"),
            (Flags::TRANSIENT, "transient"),
            (Flags::VOLATILE, "volatile"),
            (Flags::SYNCHRONIZED, "synchronized"),
            (Flags::NATIVE, "native"),
            (Flags::STRICTFP, "strictfp"),
        ];
        for (flag, kw) in keywords {
            if self.contains(*flag) {
                out.push_str(kw);
                out.push(' ');
            }
        }
        out
    }
}

impl std::ops::BitOr for Flags {
    type Output = Flags;

    fn bitor(self, rhs: Flags) -> Flags {
        Flags(self.0 | rhs.0)
    }
}

// ============================================================================
// Type References
// ============================================================================

/// A textual reference to a type, possibly generic (`java.util.List<a.b.C>`),
/// possibly an array (`int[]`), possibly a primitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeRef(pub String);

impl TypeRef {
    pub fn new(text: impl Into<String>) -> Self {
        TypeRef(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The reference without generic arguments or array suffixes:
    /// `java.util.List<a.b.C>[]` erases to `java.util.List`.
    pub fn erasure(&self) -> &str {
        let text = self.0.as_str();
        let end = text
            .find('<')
            .or_else(|| text.find('['))
            .unwrap_or(text.len());
        text[..end].trim()
    }

    /// Returns true if the erasure is a primitive type or `void`.
    pub fn is_primitive(&self) -> bool {
        names::is_primitive(self.erasure())
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeRef {
    fn from(s: &str) -> Self {
        TypeRef::new(s)
    }
}

/// Capability of resolving to a type declaration through an environment.
///
/// This is the only seam between the symbol model and the index: nothing in
/// the model holds compiler state, a reference is just a name to look up.
pub trait Resolvable {
    /// Resolves against `env`, returning `None` for primitives and unknown
    /// types.
    fn resolve(&self, env: &Environment) -> ForgeResult<Option<Arc<TypeDecl>>>;
}

impl Resolvable for TypeRef {
    fn resolve(&self, env: &Environment) -> ForgeResult<Option<Arc<TypeDecl>>> {
        if self.is_primitive() {
            return Ok(None);
        }
        env.find_type(self.erasure())
    }
}

// ============================================================================
// Declarations
// ============================================================================

/// The closed set of type-declaration kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    Class,
    Interface,
    Enum,
    Annotation,
    Record,
}

/// An annotation use site: the annotation type plus its raw element text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationUse {
    /// Referenced annotation type.
    pub type_ref: TypeRef,
    /// Raw text between the parentheses, if any (`"hi"` in `@Generated("hi")`).
    pub elements: Option<String>,
}

/// A declared generic type parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeParamDecl {
    /// Parameter name (`T`), empty for a wildcard.
    pub name: String,
    /// Upper bounds (`extends A & B`).
    pub bounds: Vec<TypeRef>,
}

/// A declared field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDecl {
    pub name: String,
    pub flags: Flags,
    pub data_type: TypeRef,
    pub annotations: Vec<AnnotationUse>,
    /// Raw initializer text, when present in source.
    pub constant_value: Option<String>,
}

/// A declared method parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamDecl {
    pub name: String,
    pub data_type: TypeRef,
    pub flags: Flags,
}

/// A declared method or constructor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDecl {
    pub name: String,
    pub flags: Flags,
    /// `None` marks a constructor.
    pub return_type: Option<TypeRef>,
    pub parameters: Vec<ParamDecl>,
    pub exceptions: Vec<TypeRef>,
    pub annotations: Vec<AnnotationUse>,
    pub type_params: Vec<TypeParamDecl>,
    /// Raw body text; only retained when the environment was built with
    /// `parse_method_bodies`.
    pub body: Option<String>,
}

impl MethodDecl {
    pub fn is_constructor(&self) -> bool {
        self.return_type.is_none()
    }
}

/// A declared type with all its declaration-level structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDecl {
    /// Fully qualified dotted name (`a.b.Outer.Inner` for nested types).
    pub fqn: String,
    pub simple_name: String,
    pub kind: TypeKind,
    pub flags: Flags,
    pub super_type: Option<TypeRef>,
    pub interfaces: Vec<TypeRef>,
    pub type_params: Vec<TypeParamDecl>,
    pub annotations: Vec<AnnotationUse>,
    pub fields: Vec<FieldDecl>,
    pub methods: Vec<MethodDecl>,
    pub inner_types: Vec<TypeDecl>,
}

impl TypeDecl {
    /// Looks up a direct field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDecl> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// All direct methods with the given name (overloads included).
    pub fn methods_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a MethodDecl> {
        self.methods.iter().filter(move |m| m.name == name)
    }

    /// Looks up a direct inner type by simple name.
    pub fn inner_type(&self, simple_name: &str) -> Option<&TypeDecl> {
        self.inner_types.iter().find(|t| t.simple_name == simple_name)
    }

    /// Descends a chain of inner-type names starting at this type.
    pub fn descend(&self, path: &[String]) -> Option<&TypeDecl> {
        let mut current = self;
        for segment in path {
            current = current.inner_type(segment)?;
        }
        Some(current)
    }

    /// Resolves the supertype declaration, if any and if on the classpath.
    pub fn resolve_super_type(&self, env: &Environment) -> ForgeResult<Option<Arc<TypeDecl>>> {
        match &self.super_type {
            Some(reference) => reference.resolve(env),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_render_order() {
        let flags = Flags::FINAL | Flags::STATIC | Flags::PUBLIC;
        assert_eq!(flags.render(), "public static final ");
        assert_eq!(Flags::default().render(), "");
    }

    #[test]
    fn test_type_ref_erasure() {
        assert_eq!(TypeRef::new("java.util.List<a.b.C>").erasure(), "java.util.List");
        assert_eq!(TypeRef::new("int[]").erasure(), "int");
        assert_eq!(TypeRef::new("a.b.C").erasure(), "a.b.C");
        assert!(TypeRef::new("int[]").is_primitive());
        assert!(!TypeRef::new("a.b.C").is_primitive());
    }

    #[test]
    fn test_descend_inner_types() {
        let leaf = TypeDecl {
            fqn: "a.Outer.Mid.Leaf".into(),
            simple_name: "Leaf".into(),
            kind: TypeKind::Class,
            flags: Flags::default(),
            super_type: None,
            interfaces: vec![],
            type_params: vec![],
            annotations: vec![],
            fields: vec![],
            methods: vec![],
            inner_types: vec![],
        };
        let mid = TypeDecl {
            fqn: "a.Outer.Mid".into(),
            simple_name: "Mid".into(),
            inner_types: vec![leaf],
            ..empty("a.Outer.Mid", "Mid")
        };
        let outer = TypeDecl {
            inner_types: vec![mid],
            ..empty("a.Outer", "Outer")
        };

        let path = vec!["Mid".to_string(), "Leaf".to_string()];
        assert_eq!(outer.descend(&path).unwrap().simple_name, "Leaf");
        assert!(outer.descend(&["Nope".to_string()]).is_none());
    }

    fn empty(fqn: &str, simple: &str) -> TypeDecl {
        TypeDecl {
            fqn: fqn.into(),
            simple_name: simple.into(),
            kind: TypeKind::Class,
            flags: Flags::default(),
            super_type: None,
            interfaces: vec![],
            type_params: vec![],
            annotations: vec![],
            fields: vec![],
            methods: vec![],
            inner_types: vec![],
        }
    }
}
