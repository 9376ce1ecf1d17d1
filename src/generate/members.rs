//! Field, method, parameter and type-parameter generators.

use crate::error::{ForgeError, ForgeResult};
use crate::generate::annotation::AnnotationGenerator;
use crate::generate::{JavaBuilder, SourceFn};
use crate::imports::ImportCollector;
use crate::model::Flags;

// ============================================================================
// Fields
// ============================================================================

/// Generator for one field declaration.
pub struct FieldGenerator {
    name: Option<String>,
    flags: Flags,
    data_type: Option<String>,
    annotations: Vec<AnnotationGenerator>,
    value: Option<SourceFn>,
}

impl FieldGenerator {
    pub fn create() -> Self {
        FieldGenerator {
            name: None,
            flags: Flags::default(),
            data_type: None,
            annotations: Vec::new(),
            value: None,
        }
    }

    /// A `private static final long serialVersionUID = 1L` field.
    pub fn create_serial_version_uid() -> Self {
        FieldGenerator::create()
            .as_private()
            .as_static()
            .as_final()
            .with_data_type("long")
            .with_element_name("serialVersionUID")
            .with_value(|b| {
                b.append("1L");
            })
    }

    pub fn with_element_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_data_type(mut self, data_type: impl Into<String>) -> Self {
        self.data_type = Some(data_type.into());
        self
    }

    /// Sets the initializer, rendered through the context at render time.
    pub fn with_value(mut self, value: impl Fn(&mut JavaBuilder) + 'static) -> Self {
        self.value = Some(Box::new(value));
        self
    }

    pub fn with_annotation(mut self, annotation: AnnotationGenerator) -> Self {
        self.annotations.push(annotation);
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

    /// Clears all visibility bits.
    pub fn as_package_private(mut self) -> Self {
        self.flags = Flags(self.flags.0 & !(Flags::PUBLIC.0 | Flags::PROTECTED.0 | Flags::PRIVATE.0));
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

    pub fn as_transient(mut self) -> Self {
        self.flags = self.flags.with(Flags::TRANSIENT);
        self
    }

    pub fn as_volatile(mut self) -> Self {
        self.flags = self.flags.with(Flags::VOLATILE);
        self
    }

    pub fn element_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn flags(&self) -> Flags {
        self.flags
    }

    pub fn data_type(&self) -> Option<&str> {
        self.data_type.as_deref()
    }

    pub fn render(&self, builder: &mut JavaBuilder) -> ForgeResult<()> {
        let name = self
            .name
            .as_deref()
            .ok_or_else(|| ForgeError::invalid_generator("field generator requires an element name"))?;
        let data_type = self.data_type.as_deref().ok_or_else(|| {
            ForgeError::invalid_generator(format!("field '{name}' requires a data type"))
        })?;

        for annotation in &self.annotations {
            annotation.render(builder)?;
            builder.nl();
        }
        builder.append(self.flags.render()).reference(data_type).space().append(name);
        if let Some(value) = &self.value {
            builder.append(" = ");
            value(builder);
        }
        builder.append(";");
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

// ============================================================================
// Method parameters
// ============================================================================

/// Generator for one method parameter.
pub struct MethodParameterGenerator {
    name: Option<String>,
    data_type: Option<String>,
    final_flag: bool,
    varargs: bool,
}

impl MethodParameterGenerator {
    pub fn create() -> Self {
        MethodParameterGenerator {
            name: None,
            data_type: None,
            final_flag: false,
            varargs: false,
        }
    }

    pub fn with_element_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_data_type(mut self, data_type: impl Into<String>) -> Self {
        self.data_type = Some(data_type.into());
        self
    }

    pub fn as_final(mut self) -> Self {
        self.final_flag = true;
        self
    }

    pub fn as_varargs(mut self) -> Self {
        self.varargs = true;
        self
    }

    pub fn element_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn data_type(&self) -> Option<&str> {
        self.data_type.as_deref()
    }

    pub fn render(&self, builder: &mut JavaBuilder) -> ForgeResult<()> {
        let name = self.name.as_deref().ok_or_else(|| {
            ForgeError::invalid_generator("method parameter requires an element name")
        })?;
        let data_type = self.data_type.as_deref().ok_or_else(|| {
            ForgeError::invalid_generator(format!("parameter '{name}' requires a data type"))
        })?;
        if self.final_flag {
            builder.append("final ");
        }
        builder.reference(data_type);
        if self.varargs {
            builder.append("...");
        }
        builder.space().append(name);
        Ok(())
    }
}

// ============================================================================
// Type parameters
// ============================================================================

/// Generator for one generic type parameter. A parameter without a name
/// renders as a wildcard (`? extends A & B`).
pub struct TypeParameterGenerator {
    name: Option<String>,
    bounds: Vec<String>,
}

impl TypeParameterGenerator {
    pub fn create() -> Self {
        TypeParameterGenerator {
            name: None,
            bounds: Vec::new(),
        }
    }

    pub fn with_element_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Adds an upper bound.
    pub fn with_binding(mut self, bound: impl Into<String>) -> Self {
        self.bounds.push(bound.into());
        self
    }

    pub fn element_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn bounds(&self) -> &[String] {
        &self.bounds
    }

    pub fn render(&self, builder: &mut JavaBuilder) -> ForgeResult<()> {
        builder.append(self.name.as_deref().unwrap_or("?"));
        for (i, bound) in self.bounds.iter().enumerate() {
            builder.append(if i == 0 { " extends " } else { " & " });
            builder.reference(bound);
        }
        Ok(())
    }
}

// ============================================================================
// Methods
// ============================================================================

/// Generator for one method or constructor declaration. A generator without
/// a return type is a constructor.
pub struct MethodGenerator {
    name: Option<String>,
    flags: Flags,
    return_type: Option<String>,
    parameters: Vec<MethodParameterGenerator>,
    exceptions: Vec<String>,
    type_params: Vec<TypeParameterGenerator>,
    annotations: Vec<AnnotationGenerator>,
    body: Option<SourceFn>,
}

impl MethodGenerator {
    pub fn create() -> Self {
        MethodGenerator {
            name: None,
            flags: Flags::default(),
            return_type: None,
            parameters: Vec::new(),
            exceptions: Vec::new(),
            type_params: Vec::new(),
            annotations: Vec::new(),
            body: None,
        }
    }

    pub fn with_element_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_return_type(mut self, return_type: impl Into<String>) -> Self {
        self.return_type = Some(return_type.into());
        self
    }

    pub fn with_parameter(mut self, parameter: MethodParameterGenerator) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Retracts previously added parameters matching the predicate.
    pub fn without_parameter(mut self, predicate: impl Fn(&MethodParameterGenerator) -> bool) -> Self {
        self.parameters.retain(|p| !predicate(p));
        self
    }

    pub fn with_exception(mut self, exception: impl Into<String>) -> Self {
        self.exceptions.push(exception.into());
        self
    }

    pub fn with_type_parameter(mut self, type_param: TypeParameterGenerator) -> Self {
        self.type_params.push(type_param);
        self
    }

    pub fn with_annotation(mut self, annotation: AnnotationGenerator) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// Sets the body, rendered through the context at render time. Without a
    /// body, concrete methods render with an empty block; abstract, native
    /// and interface methods end in a semicolon.
    pub fn with_body(mut self, body: impl Fn(&mut JavaBuilder) + 'static) -> Self {
        self.body = Some(Box::new(body));
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

    pub fn as_synchronized(mut self) -> Self {
        self.flags = self.flags.with(Flags::SYNCHRONIZED);
        self
    }

    pub fn element_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn flags(&self) -> Flags {
        self.flags
    }

    pub fn return_type(&self) -> Option<&str> {
        self.return_type.as_deref()
    }

    pub fn is_constructor(&self) -> bool {
        self.return_type.is_none()
    }

    pub fn parameters(&self) -> &[MethodParameterGenerator] {
        &self.parameters
    }

    /// Renders the declaration. `in_interface` controls whether a bodyless
    /// method ends in `;` or an empty block.
    pub fn render(&self, builder: &mut JavaBuilder, in_interface: bool) -> ForgeResult<()> {
        let name = self.name.as_deref().ok_or_else(|| {
            ForgeError::invalid_generator("method generator requires an element name")
        })?;

        for annotation in &self.annotations {
            annotation.render(builder)?;
            builder.nl();
        }
        builder.append(self.flags.render());
        if !self.type_params.is_empty() {
            builder.append("<");
            for (i, type_param) in self.type_params.iter().enumerate() {
                if i > 0 {
                    builder.append(", ");
                }
                type_param.render(builder)?;
            }
            builder.append("> ");
        }
        if let Some(return_type) = &self.return_type {
            builder.reference(return_type).space();
        }
        builder.append(name).append("(");
        for (i, parameter) in self.parameters.iter().enumerate() {
            if i > 0 {
                builder.append(", ");
            }
            parameter.render(builder)?;
        }
        builder.append(")");
        for (i, exception) in self.exceptions.iter().enumerate() {
            builder.append(if i == 0 { " throws " } else { ", " });
            builder.reference(exception);
        }

        let bodyless = self.flags.is_abstract()
            || self.flags.contains(Flags::NATIVE)
            || (in_interface && !self.flags.contains(Flags::DEFAULT) && !self.flags.is_static());
        match (&self.body, bodyless) {
            (_, true) => {
                builder.append(";");
            }
            (Some(body), false) => {
                builder.append(" {").nl();
                body(builder);
                builder.nl().append("}");
            }
            (None, false) => {
                builder.append(" {").nl().append("}");
            }
        }
        Ok(())
    }
}
