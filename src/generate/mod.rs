//! Source generation framework.
//!
//! A compilation unit is built as a tree of generator nodes: a
//! [`PrimaryTypeGenerator`] at the root, [`TypeGenerator`] nodes for nested
//! types, and field/method/annotation/type-parameter generators as leaves.
//! Every node owns its children by value, so attaching one generator under
//! two parents is impossible by construction, as is nesting a primary
//! generator inside another type.
//!
//! Mutators only update the tree. All name shortening happens during
//! rendering, when every referenced type is routed exactly once through the
//! unit's [`ImportCollector`]; the emitted text is syntactically complete but
//! unformatted (single newlines between members, no indentation) — layout is
//! a formatter's concern, not the generator's.
//!
//! Member order is deterministic: each added member carries a [`SortKey`],
//! either supplied by the caller or derived from the member's role, with a
//! monotonically increasing insertion counter as the final tiebreak. Two
//! renders of an unmodified tree produce byte-identical output.

pub mod annotation;
pub mod members;
pub mod types;

pub use annotation::AnnotationGenerator;
pub use members::{FieldGenerator, MethodGenerator, MethodParameterGenerator, TypeParameterGenerator};
pub use types::{PrimaryTypeGenerator, TypeGenerator};

use crate::imports::ImportCollector;
use crate::names;

// ============================================================================
// Render context
// ============================================================================

/// A deferred piece of source text, rendered through the context so that any
/// type references it appends are collected. Used for field values, method
/// bodies and annotation element values.
pub type SourceFn = Box<dyn Fn(&mut JavaBuilder)>;

/// The render context: accumulates output text and routes type references
/// into the compilation unit's import collector.
///
/// One instance per render pass; generators append through it top-down.
pub struct JavaBuilder<'a> {
    out: String,
    imports: &'a mut ImportCollector,
}

impl<'a> JavaBuilder<'a> {
    pub fn new(imports: &'a mut ImportCollector) -> Self {
        JavaBuilder {
            out: String::new(),
            imports,
        }
    }

    /// Appends raw text verbatim.
    pub fn append(&mut self, text: impl std::fmt::Display) -> &mut Self {
        use std::fmt::Write;
        let _ = write!(self.out, "{text}");
        self
    }

    /// Appends a type reference, shortening every embedded qualified name
    /// through the import collector.
    pub fn reference(&mut self, type_ref: &str) -> &mut Self {
        let rendered = self.imports.use_reference(type_ref);
        self.out.push_str(&rendered);
        self
    }

    /// Reserves a simple name in the import collector without emitting an
    /// import. Used for type names declared by the unit itself.
    pub fn reserve(&mut self, fqn: &str) -> &mut Self {
        self.imports.reserve(fqn);
        self
    }

    /// Appends a quoted string literal with `\` and `"` escaped.
    pub fn string_literal(&mut self, value: &str) -> &mut Self {
        self.out.push('"');
        for c in value.chars() {
            match c {
                '\\' => self.out.push_str("\\\\"),
                '"' => self.out.push_str("\\\""),
                '\n' => self.out.push_str("\\n"),
                _ => self.out.push(c),
            }
        }
        self.out.push('"');
        self
    }

    pub fn dot(&mut self) -> &mut Self {
        self.out.push('.');
        self
    }

    pub fn space(&mut self) -> &mut Self {
        self.out.push(' ');
        self
    }

    pub fn nl(&mut self) -> &mut Self {
        self.out.push('\n');
        self
    }

    pub fn into_source(self) -> String {
        self.out
    }
}

// ============================================================================
// Member ordering
// ============================================================================

/// Segment value marking a defaulted (caller supplied no key) member. Caller
/// keys use smaller values and therefore sort in front of every default.
pub const DEFAULT_ORDER: i64 = 1 << 20;

/// Kind segment of defaulted keys: fields before methods before types.
pub const FIELD_ORDER: i64 = 1;
pub const METHOD_ORDER: i64 = 2;
pub const TYPE_ORDER: i64 = 3;

/// Total, stable sort key of one addable member: explicit or derived
/// segments compared lexicographically, then the insertion sequence. The
/// sequence is assigned at registration time and never reused, so no two
/// distinct members compare equal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SortKey {
    pub segments: Vec<i64>,
    pub seq: u64,
}

impl SortKey {
    pub fn explicit(segments: &[i64], seq: u64) -> Self {
        SortKey {
            segments: segments.to_vec(),
            seq,
        }
    }
}

/// Default key of a field: serialVersionUID, then static-final constants,
/// then plain finals, then everything else.
pub fn default_field_order(field: &FieldGenerator, seq: u64) -> SortKey {
    let category = if field.element_name() == Some("serialVersionUID") {
        1000
    } else if field.flags().is_static() && field.flags().is_final() {
        2000
    } else if field.flags().is_final() {
        3000
    } else {
        4000
    };
    SortKey {
        segments: vec![DEFAULT_ORDER, FIELD_ORDER, category],
        seq,
    }
}

/// Default key of a method: constructors, then static methods, then the rest.
pub fn default_method_order(method: &MethodGenerator, seq: u64) -> SortKey {
    let category = if method.is_constructor() {
        1000
    } else if method.flags().is_static() {
        3000
    } else {
        4000
    };
    SortKey {
        segments: vec![DEFAULT_ORDER, METHOD_ORDER, category],
        seq,
    }
}

/// Default key of a nested type: public types first, then package/protected,
/// with non-public statics last.
pub fn default_type_order(inner: &TypeGenerator, seq: u64) -> SortKey {
    let category = if inner.flags().is_public() {
        1000
    } else if inner.flags().is_static() {
        3000
    } else {
        2000
    };
    SortKey {
        segments: vec![DEFAULT_ORDER, TYPE_ORDER, category],
        seq,
    }
}

/// One sorted member of a type body.
pub(crate) enum MemberEntry {
    Field(FieldGenerator),
    Method(MethodGenerator),
    Type(TypeGenerator),
}

pub(crate) struct SortedMemberEntry {
    pub(crate) member: MemberEntry,
    pub(crate) key: SortKey,
}

/// Renders a dotted name relative to `declaring`, for
/// [`fully_qualified_name`](TypeGenerator::fully_qualified_name).
pub(crate) fn qualify(declaring: Option<&str>, simple: &str) -> String {
    match declaring {
        Some(q) if !q.is_empty() => format!("{q}{}{simple}", names::DOT),
        _ => simple.to_string(),
    }
}
