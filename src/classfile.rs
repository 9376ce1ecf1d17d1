//! Declaration-level class-file reader.
//!
//! Decodes just enough of the JVM class-file format to recover a
//! [`TypeDecl`]: constant pool, access flags, supertypes, fields with
//! constant values, methods with descriptors and checked exceptions,
//! runtime-visible annotation type names, and generic `Signature` attributes
//! decoded back to source-level references. Bytecode and annotation element
//! values are skipped.
//!
//! ## Grammar (JVMS §4.1, abridged)
//!
//! ```text
//! ClassFile := magic minor major constant_pool access this super
//!              interfaces fields methods attributes
//! ```

use winnow::binary::{be_u16, be_u32, u8 as any_u8};
use winnow::combinator::repeat;
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::token::take;
use winnow::ModalResult;

use crate::error::{ForgeError, ForgeResult};
use crate::model::{
    AnnotationUse, FieldDecl, Flags, MethodDecl, ParamDecl, TypeDecl, TypeKind, TypeParamDecl,
    TypeRef,
};
use crate::names;

const MAGIC: u32 = 0xCAFE_BABE;

// JVM access bits that do not exist in source modifiers.
const ACC_INTERFACE: u16 = 0x0200;
const ACC_SYNTHETIC: u16 = 0x1000;
const ACC_ANNOTATION: u16 = 0x2000;
const ACC_ENUM: u16 = 0x4000;
const ACC_VARARGS: u16 = 0x0080;
const ACC_BRIDGE: u16 = 0x0040;

/// Result of decoding one class file.
#[derive(Debug)]
pub struct ParsedClass {
    /// The declaration, without inner types attached.
    pub decl: TypeDecl,
    /// Binary names of the direct nested classes, from the `InnerClasses`
    /// attribute. The environment loads these as separate class files.
    pub nested: Vec<String>,
}

/// Decodes `bytes` as a class file. `unit` names the input for errors.
pub fn parse_class(bytes: &[u8], unit: &str) -> ForgeResult<ParsedClass> {
    let mut input = bytes;
    class_file(&mut input).map_err(|_| ForgeError::ClassFile {
        unit: unit.to_string(),
        message: "truncated or malformed class file".to_string(),
    })
}

// ============================================================================
// Constant Pool
// ============================================================================

#[derive(Debug, Clone)]
enum CpEntry {
    Utf8(String),
    Integer(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    Class(u16),
    StringRef(u16),
    Other,
}

struct ConstantPool(Vec<CpEntry>);

impl ConstantPool {
    fn utf8(&self, index: u16) -> ModalResult<&str> {
        match self.0.get(index as usize) {
            Some(CpEntry::Utf8(s)) => Ok(s),
            _ => Err(ErrMode::Cut(ContextError::new())),
        }
    }

    /// Dotted name of a `Class` constant (`java.lang.String`, nested types
    /// keep their `$`).
    fn class_name(&self, index: u16) -> ModalResult<String> {
        match self.0.get(index as usize) {
            Some(CpEntry::Class(name_index)) => {
                Ok(names::internal_to_fqn(self.utf8(*name_index)?))
            }
            _ => Err(ErrMode::Cut(ContextError::new())),
        }
    }

    /// Source-literal rendering of a `ConstantValue` attribute target.
    fn constant_literal(&self, index: u16) -> Option<String> {
        match self.0.get(index as usize)? {
            CpEntry::Integer(v) => Some(v.to_string()),
            CpEntry::Long(v) => Some(format!("{v}L")),
            CpEntry::Float(v) => Some(format!("{v}f")),
            CpEntry::Double(v) => Some(v.to_string()),
            CpEntry::StringRef(utf8_index) => match self.0.get(*utf8_index as usize)? {
                CpEntry::Utf8(s) => Some(format!("{:?}", s)),
                _ => None,
            },
            _ => None,
        }
    }
}

fn constant_pool(input: &mut &[u8]) -> ModalResult<ConstantPool> {
    let count = be_u16.parse_next(input)?;
    let mut entries = Vec::with_capacity(count as usize);
    entries.push(CpEntry::Other); // slot 0 is unused
    let mut slot = 1u16;
    while slot < count {
        let tag = any_u8.parse_next(input)?;
        let entry = match tag {
            1 => {
                let len = be_u16.parse_next(input)?;
                let raw = take(len as usize).parse_next(input)?;
                // modified UTF-8 differs from UTF-8 only in corner cases that
                // cannot occur in names or source literals we care about
                CpEntry::Utf8(String::from_utf8_lossy(raw).into_owned())
            }
            3 => CpEntry::Integer(be_u32.parse_next(input)? as i32),
            4 => CpEntry::Float(f32::from_bits(be_u32.parse_next(input)?)),
            5 => {
                let hi = be_u32.parse_next(input)? as u64;
                let lo = be_u32.parse_next(input)? as u64;
                CpEntry::Long(((hi << 32) | lo) as i64)
            }
            6 => {
                let hi = be_u32.parse_next(input)? as u64;
                let lo = be_u32.parse_next(input)? as u64;
                CpEntry::Double(f64::from_bits((hi << 32) | lo))
            }
            7 => CpEntry::Class(be_u16.parse_next(input)?),
            8 => CpEntry::StringRef(be_u16.parse_next(input)?),
            9 | 10 | 11 | 12 | 17 | 18 => {
                take(4usize).parse_next(input)?;
                CpEntry::Other
            }
            15 => {
                take(3usize).parse_next(input)?;
                CpEntry::Other
            }
            16 | 19 | 20 => {
                take(2usize).parse_next(input)?;
                CpEntry::Other
            }
            _ => return Err(ErrMode::Cut(ContextError::new())),
        };
        let wide = matches!(entry, CpEntry::Long(_) | CpEntry::Double(_));
        entries.push(entry);
        slot += 1;
        if wide {
            // long and double occupy two pool slots
            entries.push(CpEntry::Other);
            slot += 1;
        }
    }
    Ok(ConstantPool(entries))
}

// ============================================================================
// Descriptors
// ============================================================================

/// Parses one field descriptor into its source-level type text.
fn descriptor_type(input: &mut &str) -> ModalResult<String> {
    let mut dims = 0usize;
    while input.starts_with('[') {
        *input = &input[1..];
        dims += 1;
    }
    let base = match input.chars().next() {
        Some('B') => {
            *input = &input[1..];
            "byte".to_string()
        }
        Some('C') => {
            *input = &input[1..];
            "char".to_string()
        }
        Some('D') => {
            *input = &input[1..];
            "double".to_string()
        }
        Some('F') => {
            *input = &input[1..];
            "float".to_string()
        }
        Some('I') => {
            *input = &input[1..];
            "int".to_string()
        }
        Some('J') => {
            *input = &input[1..];
            "long".to_string()
        }
        Some('S') => {
            *input = &input[1..];
            "short".to_string()
        }
        Some('Z') => {
            *input = &input[1..];
            "boolean".to_string()
        }
        Some('V') => {
            *input = &input[1..];
            "void".to_string()
        }
        Some('L') => {
            let end = input.find(';').ok_or(ErrMode::Cut(ContextError::new()))?;
            let name = names::internal_to_fqn(&input[1..end]);
            *input = &input[end + 1..];
            name
        }
        _ => return Err(ErrMode::Cut(ContextError::new())),
    };
    Ok(format!("{}{}", base, "[]".repeat(dims)))
}

/// Splits a method descriptor into parameter types and return type.
fn method_descriptor(descriptor: &str) -> ModalResult<(Vec<TypeRef>, TypeRef)> {
    let mut input = descriptor
        .strip_prefix('(')
        .ok_or(ErrMode::Cut(ContextError::new()))?;
    let mut params = Vec::new();
    while !input.starts_with(')') {
        if input.is_empty() {
            return Err(ErrMode::Cut(ContextError::new()));
        }
        params.push(TypeRef::new(descriptor_type(&mut input)?));
    }
    input = &input[1..];
    let ret = TypeRef::new(descriptor_type(&mut input)?);
    Ok((params, ret))
}

/// Converts an annotation type descriptor (`La/b/C;`) to a dotted name.
fn annotation_type_name(descriptor: &str) -> ModalResult<String> {
    let mut input = descriptor;
    descriptor_type(&mut input)
}

// ============================================================================
// Generic Signatures
// ============================================================================

/// Parses one type from a generic `Signature` attribute (JVMS §4.7.9.1) into
/// source text: `Ljava/util/List<TT;>;` becomes `java.util.List<T>`.
fn signature_type(input: &mut &str) -> ModalResult<String> {
    let mut dims = 0usize;
    while input.starts_with('[') {
        *input = &input[1..];
        dims += 1;
    }
    let base = match input.chars().next() {
        Some('T') => {
            let end = input.find(';').ok_or(ErrMode::Cut(ContextError::new()))?;
            let name = input[1..end].to_string();
            *input = &input[end + 1..];
            name
        }
        Some('L') => {
            *input = &input[1..];
            class_type_signature(input)?
        }
        // base types share the descriptor alphabet
        Some(_) => descriptor_type(input)?,
        None => return Err(ErrMode::Cut(ContextError::new())),
    };
    Ok(format!("{}{}", base, "[]".repeat(dims)))
}

/// The part of a class type signature after the leading `L`, through `;`.
/// Handles nested type arguments and `.`-separated inner classes.
fn class_type_signature(input: &mut &str) -> ModalResult<String> {
    let mut out = String::new();
    loop {
        let end = input
            .find(|c| matches!(c, '<' | ';' | '/' | '.'))
            .ok_or(ErrMode::Cut(ContextError::new()))?;
        out.push_str(&input[..end]);
        let delim = input.as_bytes()[end];
        *input = &input[end + 1..];
        match delim {
            b'/' | b'.' => out.push('.'),
            b';' => return Ok(out),
            _ => {
                out.push('<');
                let mut first = true;
                while !input.starts_with('>') {
                    if input.is_empty() {
                        return Err(ErrMode::Cut(ContextError::new()));
                    }
                    if !first {
                        out.push_str(", ");
                    }
                    first = false;
                    out.push_str(&type_argument(input)?);
                }
                *input = &input[1..];
                out.push('>');
                match input.chars().next() {
                    Some(';') => {
                        *input = &input[1..];
                        return Ok(out);
                    }
                    Some('.') => {
                        *input = &input[1..];
                        out.push('.');
                    }
                    _ => return Err(ErrMode::Cut(ContextError::new())),
                }
            }
        }
    }
}

fn type_argument(input: &mut &str) -> ModalResult<String> {
    match input.chars().next() {
        Some('*') => {
            *input = &input[1..];
            Ok("?".to_string())
        }
        Some('+') => {
            *input = &input[1..];
            Ok(format!("? extends {}", signature_type(input)?))
        }
        Some('-') => {
            *input = &input[1..];
            Ok(format!("? super {}", signature_type(input)?))
        }
        _ => signature_type(input),
    }
}

/// Parses a leading `<T:...;U:...>` formal type parameter section, if present.
/// An `Object` class bound is implicit in source and dropped.
fn signature_type_params(input: &mut &str) -> ModalResult<Vec<TypeParamDecl>> {
    let mut params = Vec::new();
    if !input.starts_with('<') {
        return Ok(params);
    }
    *input = &input[1..];
    while !input.starts_with('>') {
        let colon = input.find(':').ok_or(ErrMode::Cut(ContextError::new()))?;
        let name = input[..colon].to_string();
        *input = &input[colon..];
        let mut bounds = Vec::new();
        while input.starts_with(':') {
            *input = &input[1..];
            // interface-only parameters leave the class bound empty
            if input.starts_with(':') {
                continue;
            }
            let bound = signature_type(input)?;
            if bound != "java.lang.Object" {
                bounds.push(TypeRef::new(bound));
            }
        }
        params.push(TypeParamDecl { name, bounds });
        if input.is_empty() {
            return Err(ErrMode::Cut(ContextError::new()));
        }
    }
    *input = &input[1..];
    Ok(params)
}

/// Splits a class `Signature` into type parameters, generic superclass and
/// generic interfaces.
fn class_signature(
    signature: &str,
) -> ModalResult<(Vec<TypeParamDecl>, Option<TypeRef>, Vec<TypeRef>)> {
    let mut input = signature;
    let type_params = signature_type_params(&mut input)?;
    let super_text = signature_type(&mut input)?;
    let super_type = if super_text == "java.lang.Object" {
        None
    } else {
        Some(TypeRef::new(super_text))
    };
    let mut interfaces = Vec::new();
    while !input.is_empty() {
        interfaces.push(TypeRef::new(signature_type(&mut input)?));
    }
    Ok((type_params, super_type, interfaces))
}

/// Splits a method `Signature` into type parameters, parameter types and
/// return type. The throws section is covered by the `Exceptions` attribute.
fn method_signature(signature: &str) -> ModalResult<(Vec<TypeParamDecl>, Vec<TypeRef>, TypeRef)> {
    let mut input = signature;
    let type_params = signature_type_params(&mut input)?;
    input = input
        .strip_prefix('(')
        .ok_or(ErrMode::Cut(ContextError::new()))?;
    let mut params = Vec::new();
    while !input.starts_with(')') {
        if input.is_empty() {
            return Err(ErrMode::Cut(ContextError::new()));
        }
        params.push(TypeRef::new(signature_type(&mut input)?));
    }
    input = &input[1..];
    let ret = TypeRef::new(signature_type(&mut input)?);
    Ok((type_params, params, ret))
}

// ============================================================================
// Attributes
// ============================================================================

struct RawAttribute<'a> {
    name: &'a str,
    data: &'a [u8],
}

fn attributes<'a>(input: &mut &'a [u8], pool: &ConstantPool) -> ModalResult<Vec<RawAttribute<'a>>> {
    let count = be_u16.parse_next(input)?;
    let mut out = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let name_index = be_u16.parse_next(input)?;
        let length = be_u32.parse_next(input)?;
        let data = take(length as usize).parse_next(input)?;
        // canonicalize to the attribute keywords we interpret; anything
        // else collapses to "" and is skipped by the callers
        let name = match pool.utf8(name_index)? {
            "ConstantValue" => "ConstantValue",
            "Exceptions" => "Exceptions",
            "Signature" => "Signature",
            "RuntimeVisibleAnnotations" => "RuntimeVisibleAnnotations",
            "InnerClasses" => "InnerClasses",
            "Record" => "Record",
            _ => "",
        };
        out.push(RawAttribute { name, data });
    }
    Ok(out)
}

fn parse_annotations(data: &[u8], pool: &ConstantPool) -> ModalResult<Vec<AnnotationUse>> {
    let mut input = data;
    let count = be_u16.parse_next(&mut input)?;
    let mut out = Vec::with_capacity(count as usize);
    for _ in 0..count {
        out.push(parse_annotation(&mut input, pool)?);
    }
    Ok(out)
}

fn parse_annotation(input: &mut &[u8], pool: &ConstantPool) -> ModalResult<AnnotationUse> {
    let type_index = be_u16.parse_next(input)?;
    let pairs = be_u16.parse_next(input)?;
    for _ in 0..pairs {
        let _name = be_u16.parse_next(input)?;
        skip_element_value(input, pool)?;
    }
    let name = annotation_type_name(pool.utf8(type_index)?)?;
    Ok(AnnotationUse {
        type_ref: TypeRef::new(name),
        elements: None,
    })
}

/// Skips one `element_value` union (JVMS §4.7.16.1). Values are structurally
/// variable-length, so skipping still needs full recursion.
fn skip_element_value(input: &mut &[u8], pool: &ConstantPool) -> ModalResult<()> {
    let tag = any_u8.parse_next(input)?;
    match tag {
        b'B' | b'C' | b'D' | b'F' | b'I' | b'J' | b'S' | b'Z' | b's' | b'c' => {
            be_u16.parse_next(input)?;
        }
        b'e' => {
            take(4usize).parse_next(input)?;
        }
        b'@' => {
            parse_annotation(input, pool)?;
        }
        b'[' => {
            let count = be_u16.parse_next(input)?;
            for _ in 0..count {
                skip_element_value(input, pool)?;
            }
        }
        _ => return Err(ErrMode::Cut(ContextError::new())),
    }
    Ok(())
}

/// Direct nested classes of `this_class` from an `InnerClasses` attribute.
fn parse_inner_classes(
    data: &[u8],
    pool: &ConstantPool,
    this_name: &str,
) -> ModalResult<Vec<String>> {
    let mut input = data;
    let count = be_u16.parse_next(&mut input)?;
    let mut nested = Vec::new();
    for _ in 0..count {
        let inner = be_u16.parse_next(&mut input)?;
        let outer = be_u16.parse_next(&mut input)?;
        let _inner_name = be_u16.parse_next(&mut input)?;
        let _access = be_u16.parse_next(&mut input)?;
        if outer != 0 {
            let outer_name = pool.class_name(outer)?;
            if outer_name == this_name {
                nested.push(pool.class_name(inner)?);
            }
        }
    }
    Ok(nested)
}

// ============================================================================
// Members
// ============================================================================

/// Projects JVM access bits onto source modifiers, keeping only `mask`.
/// The bit values coincide for every masked modifier.
fn source_flags(access: u16, mask: Flags) -> Flags {
    Flags(u32::from(access) & mask.0)
}

fn field_info(input: &mut &[u8], pool: &ConstantPool) -> ModalResult<Option<FieldDecl>> {
    let access = be_u16.parse_next(input)?;
    let name_index = be_u16.parse_next(input)?;
    let descriptor_index = be_u16.parse_next(input)?;
    let attrs = attributes(input, pool)?;

    let mask = Flags::PUBLIC
        | Flags::PRIVATE
        | Flags::PROTECTED
        | Flags::STATIC
        | Flags::FINAL
        | Flags::VOLATILE
        | Flags::TRANSIENT;
    let mut field = FieldDecl {
        name: pool.utf8(name_index)?.to_string(),
        flags: source_flags(access, mask),
        data_type: {
            let mut d = pool.utf8(descriptor_index)?;
            TypeRef::new(descriptor_type(&mut d)?)
        },
        annotations: Vec::new(),
        constant_value: None,
    };

    if access & ACC_SYNTHETIC != 0 {
        return Ok(None);
    }

    for attr in &attrs {
        match attr.name {
            "ConstantValue" => {
                let mut data = attr.data;
                let index = be_u16.parse_next(&mut data)?;
                field.constant_value = pool.constant_literal(index);
            }
            "RuntimeVisibleAnnotations" => {
                field.annotations = parse_annotations(attr.data, pool)?;
            }
            "Signature" => {
                let mut data = attr.data;
                let index = be_u16.parse_next(&mut data)?;
                let mut sig = pool.utf8(index)?;
                // fall back to the erased descriptor on a malformed signature
                if let Ok(generic) = signature_type(&mut sig) {
                    field.data_type = TypeRef::new(generic);
                }
            }
            _ => {}
        }
    }
    Ok(Some(field))
}

fn method_info(
    input: &mut &[u8],
    pool: &ConstantPool,
    simple_name: &str,
) -> ModalResult<Option<MethodDecl>> {
    let access = be_u16.parse_next(input)?;
    let name_index = be_u16.parse_next(input)?;
    let descriptor_index = be_u16.parse_next(input)?;
    let attrs = attributes(input, pool)?;

    let name = pool.utf8(name_index)?.to_string();
    if name == "<clinit>" || access & (ACC_SYNTHETIC | ACC_BRIDGE) != 0 {
        return Ok(None);
    }

    let (param_types, ret) = method_descriptor(pool.utf8(descriptor_index)?)?;
    let is_ctor = name == "<init>";

    let mask = Flags::PUBLIC
        | Flags::PRIVATE
        | Flags::PROTECTED
        | Flags::STATIC
        | Flags::FINAL
        | Flags::SYNCHRONIZED
        | Flags::NATIVE
        | Flags::ABSTRACT
        | Flags::STRICTFP;
    let mut flags = source_flags(access, mask);
    if access & ACC_VARARGS != 0 {
        flags = flags.with(Flags::VARARGS);
    }

    // parameter names are not retained in the descriptor
    let parameters = param_types
        .into_iter()
        .enumerate()
        .map(|(i, data_type)| ParamDecl {
            name: format!("arg{i}"),
            data_type,
            flags: Flags::default(),
        })
        .collect();

    let mut method = MethodDecl {
        name: if is_ctor { simple_name.to_string() } else { name },
        flags,
        return_type: if is_ctor { None } else { Some(ret) },
        parameters,
        exceptions: Vec::new(),
        annotations: Vec::new(),
        type_params: Vec::new(),
        body: None,
    };

    for attr in &attrs {
        match attr.name {
            "Exceptions" => {
                let mut data = attr.data;
                let count = be_u16.parse_next(&mut data)?;
                for _ in 0..count {
                    let index = be_u16.parse_next(&mut data)?;
                    method.exceptions.push(TypeRef::new(pool.class_name(index)?));
                }
            }
            "RuntimeVisibleAnnotations" => {
                method.annotations = parse_annotations(attr.data, pool)?;
            }
            "Signature" => {
                let mut data = attr.data;
                let index = be_u16.parse_next(&mut data)?;
                if let Ok((type_params, params, ret)) = method_signature(pool.utf8(index)?) {
                    method.type_params = type_params;
                    if !is_ctor {
                        method.return_type = Some(ret);
                    }
                    // signatures omit synthetic parameters; adopt only on match
                    if params.len() == method.parameters.len() {
                        for (parameter, generic) in method.parameters.iter_mut().zip(params) {
                            parameter.data_type = generic;
                        }
                    }
                }
            }
            _ => {}
        }
    }
    Ok(Some(method))
}

// ============================================================================
// Class File
// ============================================================================

fn class_file(input: &mut &[u8]) -> ModalResult<ParsedClass> {
    let magic = be_u32.parse_next(input)?;
    if magic != MAGIC {
        return Err(ErrMode::Cut(ContextError::new()));
    }
    let _minor = be_u16.parse_next(input)?;
    let _major = be_u16.parse_next(input)?;

    let pool = constant_pool(input)?;

    let access = be_u16.parse_next(input)?;
    let this_index = be_u16.parse_next(input)?;
    let super_index = be_u16.parse_next(input)?;

    let binary_name = pool.class_name(this_index)?;
    let fqn = binary_name.replace(names::INNER_SEP, ".");
    let simple_name = names::simple_name(&fqn).to_string();

    let interface_count = be_u16.parse_next(input)?;
    let interface_indices: Vec<u16> =
        repeat(interface_count as usize, be_u16).parse_next(input)?;
    let mut interfaces = Vec::with_capacity(interface_indices.len());
    for index in interface_indices {
        interfaces.push(TypeRef::new(pool.class_name(index)?));
    }

    let mut super_type = if super_index == 0 {
        None
    } else {
        let name = pool.class_name(super_index)?;
        if name == "java.lang.Object" {
            None
        } else {
            Some(TypeRef::new(name))
        }
    };

    let field_count = be_u16.parse_next(input)?;
    let mut fields = Vec::with_capacity(field_count as usize);
    for _ in 0..field_count {
        if let Some(field) = field_info(input, &pool)? {
            fields.push(field);
        }
    }

    let method_count = be_u16.parse_next(input)?;
    let mut methods = Vec::with_capacity(method_count as usize);
    for _ in 0..method_count {
        if let Some(method) = method_info(input, &pool, &simple_name)? {
            methods.push(method);
        }
    }

    let attrs = attributes(input, &pool)?;

    let mut kind = if access & ACC_ANNOTATION != 0 {
        TypeKind::Annotation
    } else if access & ACC_INTERFACE != 0 {
        TypeKind::Interface
    } else if access & ACC_ENUM != 0 {
        TypeKind::Enum
    } else {
        TypeKind::Class
    };

    let mut nested = Vec::new();
    let mut annotations = Vec::new();
    let mut type_params = Vec::new();
    for attr in &attrs {
        match attr.name {
            "InnerClasses" => {
                nested = parse_inner_classes(attr.data, &pool, &binary_name)?;
            }
            "RuntimeVisibleAnnotations" => {
                annotations = parse_annotations(attr.data, &pool)?;
            }
            "Record" => {
                kind = TypeKind::Record;
            }
            "Signature" => {
                let mut data = attr.data;
                let index = be_u16.parse_next(&mut data)?;
                if let Ok((params, generic_super, generic_ifaces)) =
                    class_signature(pool.utf8(index)?)
                {
                    type_params = params;
                    super_type = generic_super;
                    interfaces = generic_ifaces;
                }
            }
            _ => {}
        }
    }

    let class_mask = Flags::PUBLIC | Flags::FINAL | Flags::ABSTRACT | Flags::STATIC;
    let mut flags = source_flags(access, class_mask);
    // interfaces are implicitly abstract in the class file, not in source
    if kind != TypeKind::Class {
        flags = Flags(flags.0 & !Flags::ABSTRACT.0);
    }

    Ok(ParsedClass {
        decl: TypeDecl {
            fqn,
            simple_name,
            kind,
            flags,
            super_type: if kind == TypeKind::Enum { None } else { super_type },
            interfaces,
            type_params,
            annotations,
            fields,
            methods,
            inner_types: Vec::new(),
        },
        nested,
    })
}
