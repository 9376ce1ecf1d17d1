//! Type generators and compilation-unit rendering.
//!
//! [`TypeGenerator`] builds one (possibly nested) type declaration;
//! [`PrimaryTypeGenerator`] wraps the primary declaration of a compilation
//! unit and adds the package and import sections. Children are owned by
//! value: `with_type` consumes the nested generator, so a node cannot sit
//! under two parents, and a primary generator cannot be nested because
//! `with_type` only accepts plain [`TypeGenerator`] values.

use crate::environment::Environment;
use crate::error::{ForgeError, ForgeResult};
use crate::generate::annotation::AnnotationGenerator;
use crate::generate::members::{FieldGenerator, MethodGenerator, TypeParameterGenerator};
use crate::generate::{
    default_field_order, default_method_order, default_type_order, qualify, JavaBuilder,
    MemberEntry, SortKey, SortedMemberEntry,
};
use crate::imports::ImportCollector;
use crate::model::{Flags, TypeKind};

// ============================================================================
// TypeGenerator
// ============================================================================

/// Generator for one type declaration, usable as a nested member of another
/// type generator.
pub struct TypeGenerator {
    name: Option<String>,
    kind: TypeKind,
    flags: Flags,
    super_class: Option<String>,
    interfaces: Vec<String>,
    type_params: Vec<TypeParameterGenerator>,
    annotations: Vec<AnnotationGenerator>,
    members: Vec<SortedMemberEntry>,
    /// Insertion counter backing the sort-key tiebreak. Only ever
    /// incremented, entries removed by a `without_*` call do not return
    /// their sequence number.
    next_seq: u64,
    declaring_fqn: Option<String>,
}

impl TypeGenerator {
    pub fn create() -> Self {
        TypeGenerator {
            name: None,
            kind: TypeKind::Class,
            flags: Flags::default(),
            super_class: None,
            interfaces: Vec::new(),
            type_params: Vec::new(),
            annotations: Vec::new(),
            members: Vec::new(),
            next_seq: 0,
            declaring_fqn: None,
        }
    }

    // ------------------------------------------------------------------
    // Fluent mutators
    // ------------------------------------------------------------------

    pub fn with_element_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn as_public(mut self) -> Self {
        self.flags = self.flags.with(Flags::PUBLIC);
        self
    }

    pub fn as_protected(mut self) -> Self {
        self.flags = self.flags.with(Flags::PROTECTED);
        self
    }

    pub fn as_private(mut self) -> Self {
        self.flags = self.flags.with(Flags::PRIVATE);
        self
    }

    pub fn as_static(mut self) -> Self {
        self.flags = self.flags.with(Flags::STATIC);
        self
    }

    pub fn as_final(mut self) -> Self {
        self.flags = self.flags.with(Flags::FINAL);
        self
    }

    pub fn as_abstract(mut self) -> Self {
        self.flags = self.flags.with(Flags::ABSTRACT);
        self
    }

    pub fn as_interface(mut self) -> Self {
        self.kind = TypeKind::Interface;
        self
    }

    pub fn as_enum(mut self) -> Self {
        self.kind = TypeKind::Enum;
        self
    }

    pub fn as_annotation_type(mut self) -> Self {
        self.kind = TypeKind::Annotation;
        self
    }

    pub fn with_super_class(mut self, super_class: impl Into<String>) -> Self {
        self.super_class = Some(super_class.into());
        self
    }

    pub fn with_interface(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    pub fn with_interfaces(mut self, interfaces: impl IntoIterator<Item = String>) -> Self {
        self.interfaces.extend(interfaces);
        self
    }

    /// Retracts previously added interfaces matching the predicate.
    pub fn without_interface(mut self, predicate: impl Fn(&str) -> bool) -> Self {
        self.interfaces.retain(|i| !predicate(i));
        self
    }

    pub fn with_type_parameter(mut self, type_param: TypeParameterGenerator) -> Self {
        self.type_params.push(type_param);
        self
    }

    /// Removes the type parameter with the given name, if present.
    pub fn without_type_parameter(mut self, name: &str) -> Self {
        self.type_params.retain(|p| p.element_name() != Some(name));
        self
    }

    pub fn with_annotation(mut self, annotation: AnnotationGenerator) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn without_annotation(mut self, predicate: impl Fn(&AnnotationGenerator) -> bool) -> Self {
        self.annotations.retain(|a| !predicate(a));
        self
    }

    pub fn with_field(mut self, field: FieldGenerator) -> Self {
        let seq = self.take_seq();
        let key = default_field_order(&field, seq);
        self.members.push(SortedMemberEntry {
            member: MemberEntry::Field(field),
            key,
        });
        self
    }

    /// Adds a field with an explicit sort key; explicit keys order before
    /// all defaulted members when their leading segment is smaller than
    /// [`DEFAULT_ORDER`](crate::generate::DEFAULT_ORDER).
    pub fn with_sorted_field(mut self, field: FieldGenerator, segments: &[i64]) -> Self {
        let seq = self.take_seq();
        self.members.push(SortedMemberEntry {
            member: MemberEntry::Field(field),
            key: SortKey::explicit(segments, seq),
        });
        self
    }

    pub fn without_field(mut self, predicate: impl Fn(&FieldGenerator) -> bool) -> Self {
        self.members.retain(|entry| match &entry.member {
            MemberEntry::Field(field) => !predicate(field),
            _ => true,
        });
        self
    }

    pub fn with_method(mut self, method: MethodGenerator) -> Self {
        let seq = self.take_seq();
        let key = default_method_order(&method, seq);
        self.members.push(SortedMemberEntry {
            member: MemberEntry::Method(method),
            key,
        });
        self
    }

    pub fn with_sorted_method(mut self, method: MethodGenerator, segments: &[i64]) -> Self {
        let seq = self.take_seq();
        self.members.push(SortedMemberEntry {
            member: MemberEntry::Method(method),
            key: SortKey::explicit(segments, seq),
        });
        self
    }

    pub fn without_method(mut self, predicate: impl Fn(&MethodGenerator) -> bool) -> Self {
        self.members.retain(|entry| match &entry.member {
            MemberEntry::Method(method) => !predicate(method),
            _ => true,
        });
        self
    }

    /// Adds a nested type. The child is consumed; it cannot be attached
    /// anywhere else afterwards.
    pub fn with_type(mut self, inner: TypeGenerator) -> Self {
        let seq = self.take_seq();
        let key = default_type_order(&inner, seq);
        self.members.push(SortedMemberEntry {
            member: MemberEntry::Type(inner),
            key,
        });
        self
    }

    pub fn with_sorted_type(mut self, inner: TypeGenerator, segments: &[i64]) -> Self {
        let seq = self.take_seq();
        self.members.push(SortedMemberEntry {
            member: MemberEntry::Type(inner),
            key: SortKey::explicit(segments, seq),
        });
        self
    }

    pub fn without_type(mut self, predicate: impl Fn(&TypeGenerator) -> bool) -> Self {
        self.members.retain(|entry| match &entry.member {
            MemberEntry::Type(inner) => !predicate(inner),
            _ => true,
        });
        self
    }

    /// Qualifies this generator's simple name, for nested-type references
    /// from sibling generators.
    pub fn set_declaring_fully_qualified_name(mut self, declaring: impl Into<String>) -> Self {
        self.declaring_fqn = Some(declaring.into());
        self
    }

    fn take_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn element_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    pub fn flags(&self) -> Flags {
        self.flags
    }

    pub fn super_class(&self) -> Option<&str> {
        self.super_class.as_deref()
    }

    pub fn interfaces(&self) -> &[String] {
        &self.interfaces
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldGenerator> {
        self.members.iter().filter_map(|entry| match &entry.member {
            MemberEntry::Field(field) => Some(field),
            _ => None,
        })
    }

    pub fn methods(&self) -> impl Iterator<Item = &MethodGenerator> {
        self.members.iter().filter_map(|entry| match &entry.member {
            MemberEntry::Method(method) => Some(method),
            _ => None,
        })
    }

    pub fn types(&self) -> impl Iterator<Item = &TypeGenerator> {
        self.members.iter().filter_map(|entry| match &entry.member {
            MemberEntry::Type(inner) => Some(inner),
            _ => None,
        })
    }

    pub fn type_parameters(&self) -> &[TypeParameterGenerator] {
        &self.type_params
    }

    /// The dotted name of this type, including the declaring qualifier when
    /// set.
    pub fn fully_qualified_name(&self) -> ForgeResult<String> {
        let name = self.require_name()?;
        Ok(qualify(self.declaring_fqn.as_deref(), name))
    }

    fn require_name(&self) -> ForgeResult<&str> {
        self.name
            .as_deref()
            .ok_or_else(|| ForgeError::invalid_generator("type generator requires an element name"))
    }

    // ------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------

    pub fn render(&self, builder: &mut JavaBuilder) -> ForgeResult<()> {
        let name = self.require_name()?;
        // own and nested names defend their simple names against imports
        self.reserve_declared_names(builder)?;

        for annotation in &self.annotations {
            annotation.render(builder)?;
            builder.nl();
        }
        builder.append(self.flags.render());
        builder.append(match self.kind {
            TypeKind::Class => "class ",
            TypeKind::Interface => "interface ",
            TypeKind::Enum => "enum ",
            TypeKind::Annotation => "@interface ",
            TypeKind::Record => "record ",
        });
        builder.append(name);
        if !self.type_params.is_empty() {
            builder.append("<");
            for (i, type_param) in self.type_params.iter().enumerate() {
                if i > 0 {
                    builder.append(", ");
                }
                type_param.render(builder)?;
            }
            builder.append(">");
        }
        if let Some(super_class) = &self.super_class {
            builder.append(" extends ").reference(super_class);
        }
        if !self.interfaces.is_empty() {
            // interfaces extend, classes and enums implement
            builder.append(if self.kind == TypeKind::Interface {
                " extends "
            } else {
                " implements "
            });
            for (i, interface) in self.interfaces.iter().enumerate() {
                if i > 0 {
                    builder.append(", ");
                }
                builder.reference(interface);
            }
        }

        builder.append(" {").nl();
        let mut ordered: Vec<&SortedMemberEntry> = self.members.iter().collect();
        ordered.sort_by(|a, b| a.key.cmp(&b.key));
        if ordered.is_empty() {
            builder.nl();
        }
        let in_interface = matches!(self.kind, TypeKind::Interface | TypeKind::Annotation);
        for entry in ordered {
            builder.nl();
            match &entry.member {
                MemberEntry::Field(field) => field.render(builder)?,
                MemberEntry::Method(method) => method.render(builder, in_interface)?,
                MemberEntry::Type(inner) => inner.render(builder)?,
            }
            builder.nl();
        }
        builder.append("}");
        Ok(())
    }

    fn reserve_declared_names(&self, builder: &mut JavaBuilder) -> ForgeResult<()> {
        builder.reserve(&self.fully_qualified_name()?);
        for inner in self.types() {
            inner.reserve_declared_names(builder)?;
        }
        Ok(())
    }

    /// Renders the bare declaration against a throwaway import collector.
    pub fn to_java_source(&self) -> ForgeResult<String> {
        let mut imports = ImportCollector::new(None);
        let mut builder = JavaBuilder::new(&mut imports);
        self.render(&mut builder)?;
        Ok(builder.into_source())
    }
}

// ============================================================================
// PrimaryTypeGenerator
// ============================================================================

/// Generator for the primary type of a compilation unit. Owns the package
/// name and renders the full unit: package statement, import block, type
/// body.
///
/// This is deliberately not a [`TypeGenerator`]: `TypeGenerator::with_type`
/// only accepts plain type generators, so a primary declaration can never
/// end up nested inside another type.
pub struct PrimaryTypeGenerator {
    package: Option<String>,
    inner: TypeGenerator,
}

impl PrimaryTypeGenerator {
    pub fn create() -> Self {
        PrimaryTypeGenerator {
            package: None,
            inner: TypeGenerator::create().as_public(),
        }
    }

    pub fn with_package_name(mut self, package: impl Into<String>) -> Self {
        let package = package.into();
        self.inner = self.inner.set_declaring_fully_qualified_name(package.clone());
        self.package = Some(package);
        self
    }

    pub fn with_element_name(mut self, name: impl Into<String>) -> Self {
        self.inner = self.inner.with_element_name(name);
        self
    }

    pub fn as_final(mut self) -> Self {
        self.inner = self.inner.as_final();
        self
    }

    pub fn as_abstract(mut self) -> Self {
        self.inner = self.inner.as_abstract();
        self
    }

    pub fn as_interface(mut self) -> Self {
        self.inner = self.inner.as_interface();
        self
    }

    pub fn as_enum(mut self) -> Self {
        self.inner = self.inner.as_enum();
        self
    }

    pub fn as_annotation_type(mut self) -> Self {
        self.inner = self.inner.as_annotation_type();
        self
    }

    pub fn with_super_class(mut self, super_class: impl Into<String>) -> Self {
        self.inner = self.inner.with_super_class(super_class);
        self
    }

    pub fn with_interface(mut self, interface: impl Into<String>) -> Self {
        self.inner = self.inner.with_interface(interface);
        self
    }

    pub fn without_interface(mut self, predicate: impl Fn(&str) -> bool) -> Self {
        self.inner = self.inner.without_interface(predicate);
        self
    }

    pub fn with_annotation(mut self, annotation: AnnotationGenerator) -> Self {
        self.inner = self.inner.with_annotation(annotation);
        self
    }

    pub fn with_type_parameter(mut self, type_param: TypeParameterGenerator) -> Self {
        self.inner = self.inner.with_type_parameter(type_param);
        self
    }

    pub fn with_field(mut self, field: FieldGenerator) -> Self {
        self.inner = self.inner.with_field(field);
        self
    }

    pub fn with_sorted_field(mut self, field: FieldGenerator, segments: &[i64]) -> Self {
        self.inner = self.inner.with_sorted_field(field, segments);
        self
    }

    pub fn without_field(mut self, predicate: impl Fn(&FieldGenerator) -> bool) -> Self {
        self.inner = self.inner.without_field(predicate);
        self
    }

    pub fn with_method(mut self, method: MethodGenerator) -> Self {
        self.inner = self.inner.with_method(method);
        self
    }

    pub fn with_sorted_method(mut self, method: MethodGenerator, segments: &[i64]) -> Self {
        self.inner = self.inner.with_sorted_method(method, segments);
        self
    }

    pub fn without_method(mut self, predicate: impl Fn(&MethodGenerator) -> bool) -> Self {
        self.inner = self.inner.without_method(predicate);
        self
    }

    /// Adds a nested type. Only plain [`TypeGenerator`] values are
    /// accepted.
    pub fn with_type(mut self, inner: TypeGenerator) -> Self {
        let inner = match self.fully_qualified_name() {
            Ok(declaring) => inner.set_declaring_fully_qualified_name(declaring),
            Err(_) => inner,
        };
        self.inner = self.inner.with_type(inner);
        self
    }

    pub fn with_sorted_type(mut self, inner: TypeGenerator, segments: &[i64]) -> Self {
        let inner = match self.fully_qualified_name() {
            Ok(declaring) => inner.set_declaring_fully_qualified_name(declaring),
            Err(_) => inner,
        };
        self.inner = self.inner.with_sorted_type(inner, segments);
        self
    }

    pub fn without_type(mut self, predicate: impl Fn(&TypeGenerator) -> bool) -> Self {
        self.inner = self.inner.without_type(predicate);
        self
    }

    pub fn package_name(&self) -> Option<&str> {
        self.package.as_deref()
    }

    pub fn element_name(&self) -> Option<&str> {
        self.inner.element_name()
    }

    /// The primary declaration, for structural queries.
    pub fn primary_type(&self) -> &TypeGenerator {
        &self.inner
    }

    pub fn fully_qualified_name(&self) -> ForgeResult<String> {
        self.inner.fully_qualified_name()
    }

    /// Renders the whole compilation unit: package statement, the import
    /// block accumulated while rendering the body, then the body itself.
    /// Fails before producing any text when the tree is not renderable; the
    /// environment must still be open.
    pub fn to_compilation_unit_source(&self, env: &Environment) -> ForgeResult<String> {
        if env.is_closed() {
            return Err(ForgeError::EnvironmentClosed);
        }
        self.render_unit()
    }

    fn render_unit(&self) -> ForgeResult<String> {
        let mut imports = ImportCollector::new(self.package.as_deref());
        let mut builder = JavaBuilder::new(&mut imports);
        self.inner.render(&mut builder)?;
        let body = builder.into_source();

        let mut out = String::new();
        if let Some(package) = &self.package {
            out.push_str("package ");
            out.push_str(package);
            out.push_str(";\n\n");
        }
        let import_block = imports.render_import_block();
        if !import_block.is_empty() {
            out.push_str(&import_block);
            out.push('\n');
        }
        out.push_str(&body);
        out.push('\n');
        Ok(out)
    }
}
