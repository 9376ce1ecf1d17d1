//! Java name utilities.
//!
//! Helpers for splitting fully qualified names, recognizing primitive and
//! `java.lang` types, and the well-known Maven source-folder layout used when
//! locating source attachments for compiled output directories.

/// Separator between a qualifier and a simple name.
pub const DOT: char = '.';

/// Separator between an outer and an inner type in binary names.
pub const INNER_SEP: char = '$';

/// The package whose members are visible without an import.
pub const JAVA_LANG: &str = "java.lang";

/// Main source folder relative to a Maven module root.
pub const MAIN_JAVA_SOURCE_FOLDER: &str = "src/main/java";

/// Annotation-processor output folder relative to a Maven module root.
pub const GENERATED_ANNOTATIONS_SOURCE_FOLDER: &str = "target/generated-sources/annotations";

/// wsimport output folder relative to a Maven module root.
pub const GENERATED_WS_IMPORT_SOURCE_FOLDER: &str = "target/generated-sources/wsimport";

/// Test source folder relative to a Maven module root.
pub const TEST_JAVA_SOURCE_FOLDER: &str = "src/test/java";

/// Java primitive type names plus `void`.
const PRIMITIVES: &[&str] = &[
    "boolean", "byte", "char", "double", "float", "int", "long", "short", "void",
];

/// Returns true if `name` is a Java primitive type or `void`.
pub fn is_primitive(name: &str) -> bool {
    PRIMITIVES.contains(&name)
}

/// Returns the qualifier of a fully qualified name, or `None` for unqualified
/// names.
///
/// `qualifier("java.util.List")` is `Some("java.util")`; nested binary names
/// keep the outer type in the qualifier: `qualifier("a.b.Outer$Inner")` is
/// `Some("a.b.Outer")`.
pub fn qualifier(fqn: &str) -> Option<&str> {
    let end = fqn.rfind([DOT, INNER_SEP])?;
    Some(&fqn[..end])
}

/// Returns the last segment of a (possibly qualified) name.
pub fn simple_name(fqn: &str) -> &str {
    match fqn.rfind([DOT, INNER_SEP]) {
        Some(idx) => &fqn[idx + 1..],
        None => fqn,
    }
}

/// Splits a name into `(qualifier, simple_name)`.
pub fn split(fqn: &str) -> (Option<&str>, &str) {
    (qualifier(fqn), simple_name(fqn))
}

/// Converts a fully qualified name to its relative source-file path,
/// e.g. `a.b.Outer` becomes `a/b/Outer.java`. Inner-type segments must be
/// stripped by the caller first.
pub fn fqn_to_source_path(fqn: &str) -> String {
    let mut p = fqn.replace(DOT, "/");
    p.push_str(".java");
    p
}

/// Converts a fully qualified binary name to its class-file path,
/// e.g. `a.b.Outer$Inner` becomes `a/b/Outer$Inner.class`.
pub fn fqn_to_class_path(fqn: &str) -> String {
    let mut p = fqn.replace(DOT, "/");
    p.push_str(".class");
    p
}

/// Converts a JVM internal name (`java/lang/String`) to a dotted name.
pub fn internal_to_fqn(internal: &str) -> String {
    internal.replace('/', ".")
}

/// Yields every candidate `(outer_fqn, inner_path)` split for a dotted name,
/// longest outer part first. For `a.b.Outer.Inner` this yields
/// `("a.b.Outer.Inner", [])`, `("a.b.Outer", ["Inner"])`, `("a.b", ["Outer",
/// "Inner"])`, … — the resolver stops at the first split whose outer part is a
/// real compilation unit.
pub fn nested_splits(fqn: &str) -> Vec<(String, Vec<String>)> {
    // binary form uses '$' for the nesting boundary and is unambiguous
    if let Some(idx) = fqn.find(INNER_SEP) {
        let outer = fqn[..idx].to_string();
        let inner = fqn[idx + 1..]
            .split(INNER_SEP)
            .map(str::to_string)
            .collect();
        return vec![(outer, inner)];
    }

    let segments: Vec<&str> = fqn.split(DOT).collect();
    let mut splits = Vec::with_capacity(segments.len());
    for cut in (1..=segments.len()).rev() {
        let outer = segments[..cut].join(".");
        let inner = segments[cut..].iter().map(|s| (*s).to_string()).collect();
        splits.push((outer, inner));
    }
    splits
}
