//! Annotation generators.
//!
//! An annotation use renders as `@Name`, `@Name(value)` when the only
//! element is the implicit `value`, or `@Name(a = x,\nb = y)` otherwise.
//! Factory helpers cover the annotations code generators emit all the time
//! (`@Override`, `@Deprecated`, `@Generated`, `@SuppressWarnings`).

use crate::error::{ForgeError, ForgeResult};
use crate::generate::{JavaBuilder, SourceFn};
use crate::imports::ImportCollector;

const GENERATED_FQN: &str = "javax.annotation.processing.Generated";
const DEFAULT_GENERATED_COMMENT: &str =
    "This class is auto generated. No manual modifications recommended.";

/// Generator for one annotation use.
pub struct AnnotationGenerator {
    name: Option<String>,
    /// Element values in insertion order; a repeated element name replaces
    /// the value in place.
    elements: Vec<(String, SourceFn)>,
}

impl AnnotationGenerator {
    pub fn create() -> Self {
        AnnotationGenerator {
            name: None,
            elements: Vec::new(),
        }
    }

    /// `@Override`
    pub fn create_override() -> Self {
        AnnotationGenerator::create().with_element_name("java.lang.Override")
    }

    /// `@Deprecated`
    pub fn create_deprecated() -> Self {
        AnnotationGenerator::create().with_element_name("java.lang.Deprecated")
    }

    /// `@Generated(value = "...", comments = "...")` with the standard
    /// comment.
    pub fn create_generated(generator: impl Into<String>) -> Self {
        AnnotationGenerator::create_generated_with_comments(generator, DEFAULT_GENERATED_COMMENT)
    }

    /// `@Generated(value = "...", comments = "...")`.
    pub fn create_generated_with_comments(
        generator: impl Into<String>,
        comments: impl Into<String>,
    ) -> Self {
        let generator = generator.into();
        let comments = comments.into();
        AnnotationGenerator::create()
            .with_element_name(GENERATED_FQN)
            .with_element("value", move |b| {
                b.string_literal(&generator);
            })
            .with_element("comments", move |b| {
                b.string_literal(&comments);
            })
    }

    /// `@SuppressWarnings("x")` or `@SuppressWarnings({"x", "y"})`.
    pub fn create_suppress_warnings(values: &[&str]) -> Self {
        let values: Vec<String> = values.iter().map(|v| (*v).to_string()).collect();
        AnnotationGenerator::create()
            .with_element_name("java.lang.SuppressWarnings")
            .with_element("value", move |b| {
                if let [single] = values.as_slice() {
                    b.string_literal(single);
                } else {
                    b.append("{");
                    for (i, value) in values.iter().enumerate() {
                        if i > 0 {
                            b.append(", ");
                        }
                        b.string_literal(value);
                    }
                    b.append("}");
                }
            })
    }

    /// Sets the annotation type by fully qualified name.
    pub fn with_element_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Adds an element value. A second value for the same element replaces
    /// the first without changing its position.
    pub fn with_element(mut self, name: impl Into<String>, value: impl Fn(&mut JavaBuilder) + 'static) -> Self {
        let name = name.into();
        let value: SourceFn = Box::new(value);
        match self.elements.iter_mut().find(|(n, _)| *n == name) {
            Some(existing) => existing.1 = value,
            None => self.elements.push((name, value)),
        }
        self
    }

    /// Removes a previously added element.
    pub fn without_element(mut self, name: &str) -> Self {
        self.elements.retain(|(n, _)| n != name);
        self
    }

    pub fn element_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    pub fn render(&self, builder: &mut JavaBuilder) -> ForgeResult<()> {
        let name = self.name.as_deref().ok_or_else(|| {
            ForgeError::invalid_generator("annotation generator requires an element name")
        })?;
        builder.append("@").reference(name);
        if self.elements.is_empty() {
            return Ok(());
        }
        builder.append("(");
        if let [(name, value)] = self.elements.as_slice() {
            // the implicit element renders without its name
            if name == "value" {
                value(builder);
                builder.append(")");
                return Ok(());
            }
        }
        for (i, (name, value)) in self.elements.iter().enumerate() {
            if i > 0 {
                builder.append(",").nl();
            }
            builder.append(name).append(" = ");
            value(builder);
        }
        builder.append(")");
        Ok(())
    }

    /// Renders against a throwaway import collector; the import list is
    /// discarded.
    pub fn to_java_source(&self) -> ForgeResult<String> {
        let mut imports = ImportCollector::new(None);
        let mut builder = JavaBuilder::new(&mut imports);
        self.render(&mut builder)?;
        Ok(builder.into_source())
    }
}
