//! Declaration-level Java source scanner.
//!
//! Parses a compilation unit down to its declaration structure: package,
//! imports, type declarations with modifiers, generic parameters, supertypes,
//! fields, methods and nested types. Method bodies are skipped by brace
//! matching unless the caller asks for them, mirroring the "ignore method
//! bodies" compiler option the environment exposes.
//!
//! The scanner is a hand-written cursor with trivia skipping (whitespace,
//! line/block comments, string/char/text-block literals) and a recursive
//! descent over declarations. It is deliberately forgiving: anything it does
//! not understand inside a body is skipped by balancing delimiters.

use crate::error::{parse_error, ForgeError, ForgeResult};
use crate::model::{
    AnnotationUse, FieldDecl, Flags, MethodDecl, ParamDecl, TypeDecl, TypeKind, TypeParamDecl,
    TypeRef,
};

// ============================================================================
// Compilation Unit
// ============================================================================

/// An import statement of a scanned unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDecl {
    pub is_static: bool,
    /// Imported name, possibly ending in `.*`.
    pub name: String,
}

/// Declaration-level view of one `.java` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilationUnit {
    pub package: Option<String>,
    pub imports: Vec<ImportDecl>,
    pub types: Vec<TypeDecl>,
}

impl CompilationUnit {
    /// The primary (first top-level) type, if the unit declares any.
    pub fn primary_type(&self) -> Option<&TypeDecl> {
        self.types.first()
    }
}

/// Scans `source` into a [`CompilationUnit`]. `unit` names the input for
/// error messages. `keep_bodies` retains raw method body text.
pub fn parse_compilation_unit(
    source: &str,
    unit: &str,
    keep_bodies: bool,
) -> ForgeResult<CompilationUnit> {
    let mut cursor = Cursor::new(source, unit, keep_bodies);
    cursor.parse_unit()
}

// ============================================================================
// Cursor
// ============================================================================

struct Cursor<'a> {
    src: &'a str,
    pos: usize,
    unit: &'a str,
    keep_bodies: bool,
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str, unit: &'a str, keep_bodies: bool) -> Self {
        Cursor {
            src,
            pos: 0,
            unit,
            keep_bodies,
        }
    }

    fn err(&self, message: impl Into<String>) -> ForgeError {
        let line = self.src[..self.pos].matches('\n').count() + 1;
        parse_error(self.unit, format!("line {}: {}", line, message.into()))
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn at_end(&mut self) -> bool {
        self.skip_trivia();
        self.pos >= self.src.len()
    }

    /// Skips whitespace and comments.
    fn skip_trivia(&mut self) {
        loop {
            let rest = self.rest();
            let mut chars = rest.char_indices();
            match chars.next() {
                Some((_, c)) if c.is_whitespace() => {
                    self.pos += c.len_utf8();
                }
                Some((_, '/')) if rest.starts_with("//") => {
                    match rest.find('\n') {
                        Some(nl) => self.pos += nl + 1,
                        None => self.pos = self.src.len(),
                    }
                }
                Some((_, '/')) if rest.starts_with("/*") => {
                    match rest[2..].find("*/") {
                        Some(end) => self.pos += 2 + end + 2,
                        None => self.pos = self.src.len(),
                    }
                }
                _ => return,
            }
        }
    }

    /// Consumes a string, char or text-block literal starting at the cursor.
    fn skip_literal(&mut self) {
        let rest = self.rest();
        if rest.starts_with("\"\"\"") {
            // text block
            match rest[3..].find("\"\"\"") {
                Some(end) => self.pos += 3 + end + 3,
                None => self.pos = self.src.len(),
            }
            return;
        }
        let quote = match self.bump() {
            Some(q @ ('"' | '\'')) => q,
            _ => return,
        };
        while let Some(c) = self.bump() {
            match c {
                '\\' => {
                    self.bump();
                }
                c if c == quote => return,
                _ => {}
            }
        }
    }

    fn eat(&mut self, c: char) -> bool {
        self.skip_trivia();
        if self.peek() == Some(c) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, c: char) -> ForgeResult<()> {
        if self.eat(c) {
            Ok(())
        } else {
            Err(self.err(format!("expected '{}'", c)))
        }
    }

    /// Peeks the next identifier-like word without consuming it.
    fn peek_word(&mut self) -> Option<&'a str> {
        self.skip_trivia();
        let rest = self.rest();
        let mut end = 0;
        for (idx, c) in rest.char_indices() {
            let ok = if idx == 0 {
                c.is_alphabetic() || c == '_' || c == '$'
            } else {
                c.is_alphanumeric() || c == '_' || c == '$'
            };
            if !ok {
                break;
            }
            end = idx + c.len_utf8();
        }
        if end == 0 {
            None
        } else {
            Some(&rest[..end])
        }
    }

    fn read_word(&mut self) -> ForgeResult<&'a str> {
        match self.peek_word() {
            Some(word) => {
                self.pos += word.len();
                Ok(word)
            }
            None => Err(self.err("expected identifier")),
        }
    }

    fn eat_word(&mut self, word: &str) -> bool {
        if self.peek_word() == Some(word) {
            self.pos += word.len();
            true
        } else {
            false
        }
    }

    /// Reads a dotted name (`a.b.C`). Stops before `.*`.
    fn read_qualified_name(&mut self) -> ForgeResult<String> {
        let mut name = self.read_word()?.to_string();
        loop {
            self.skip_trivia();
            if self.rest().starts_with('.') && !self.rest().starts_with(".*") {
                // lookahead: the dot must be followed by a word
                let saved = self.pos;
                self.bump();
                match self.peek_word() {
                    Some(word) => {
                        name.push('.');
                        name.push_str(word);
                        self.pos += word.len();
                    }
                    None => {
                        self.pos = saved;
                        break;
                    }
                }
            } else {
                break;
            }
        }
        Ok(name)
    }

    /// Reads a full type reference: qualified name, optional generic argument
    /// list, optional array suffixes. Returns its canonical text.
    fn read_type_ref(&mut self) -> ForgeResult<String> {
        let mut text = self.read_qualified_name()?;
        self.skip_trivia();
        if self.peek() == Some('<') {
            text.push_str(&self.capture_generics()?);
        }
        loop {
            self.skip_trivia();
            if self.rest().starts_with('[') {
                self.bump();
                self.expect(']')?;
                text.push_str("[]");
            } else {
                break;
            }
        }
        Ok(text)
    }

    /// Captures a balanced `<...>` section including the angle brackets.
    fn capture_generics(&mut self) -> ForgeResult<String> {
        self.skip_trivia();
        let start = self.pos;
        self.expect('<')?;
        let mut depth = 1usize;
        while depth > 0 {
            self.skip_trivia();
            match self.peek() {
                Some('<') => {
                    depth += 1;
                    self.bump();
                }
                Some('>') => {
                    depth -= 1;
                    self.bump();
                }
                Some('"') | Some('\'') => self.skip_literal(),
                Some(_) => {
                    self.bump();
                }
                None => return Err(self.err("unterminated generic argument list")),
            }
        }
        Ok(normalize_ws(&self.src[start..self.pos]))
    }

    /// Skips (or captures) a balanced region from `open` to `close`,
    /// honoring nested delimiters, comments and literals. The cursor must be
    /// at `open`. Returns the raw text between the delimiters.
    fn read_balanced(&mut self, open: char, close: char) -> ForgeResult<&'a str> {
        self.skip_trivia();
        self.expect(open)?;
        let body_start = self.pos;
        let mut depth = 1usize;
        loop {
            let rest = self.rest();
            if rest.is_empty() {
                return Err(self.err(format!("unterminated '{}'", open)));
            }
            if rest.starts_with("//") || rest.starts_with("/*") {
                self.skip_trivia();
                continue;
            }
            match self.peek() {
                Some('"') | Some('\'') => self.skip_literal(),
                Some(c) if c == open => {
                    depth += 1;
                    self.bump();
                }
                Some(c) if c == close => {
                    depth -= 1;
                    if depth == 0 {
                        let body = &self.src[body_start..self.pos];
                        self.bump();
                        return Ok(body);
                    }
                    self.bump();
                }
                _ => {
                    self.bump();
                }
            }
        }
    }

    /// Captures raw text up to (not including) a top-level occurrence of one
    /// of `stops`, balancing parens, brackets, braces and generic argument
    /// lists on the way. `new HashMap<String, Integer>()` must not be split
    /// at the inner comma, so `<` opens an angle level at bracket depth zero;
    /// a `<` that turns out to be a comparison is abandoned at the first
    /// character that cannot belong to a type argument list.
    fn read_until_top_level(&mut self, stops: &[char]) -> ForgeResult<&'a str> {
        self.skip_trivia();
        let start = self.pos;
        let mut depth = 0usize;
        let mut angle = 0usize;
        loop {
            let rest = self.rest();
            if rest.is_empty() {
                return Ok(&self.src[start..self.pos]);
            }
            if rest.starts_with("//") || rest.starts_with("/*") {
                self.skip_trivia();
                continue;
            }
            match self.peek() {
                Some('"') | Some('\'') => self.skip_literal(),
                Some('<') if depth == 0 => {
                    angle += 1;
                    self.bump();
                }
                Some('>') if depth == 0 && angle > 0 => {
                    angle -= 1;
                    self.bump();
                }
                Some(c @ ('(' | '[' | '{')) => {
                    if c != '[' {
                        angle = 0;
                    }
                    depth += 1;
                    self.bump();
                }
                Some(c @ (')' | ']' | '}')) => {
                    if depth == 0 {
                        return Ok(&self.src[start..self.pos]);
                    }
                    depth -= 1;
                    let _ = c;
                    self.bump();
                }
                Some(c) => {
                    if angle > 0 && !type_arg_char(c) {
                        angle = 0;
                    }
                    if depth == 0 && angle == 0 && stops.contains(&c) {
                        return Ok(&self.src[start..self.pos]);
                    }
                    self.bump();
                }
                None => return Ok(&self.src[start..self.pos]),
            }
        }
    }

    // ------------------------------------------------------------------
    // Unit structure
    // ------------------------------------------------------------------

    fn parse_unit(&mut self) -> ForgeResult<CompilationUnit> {
        let mut unit = CompilationUnit {
            package: None,
            imports: Vec::new(),
            types: Vec::new(),
        };

        // leading annotations (package-info style) are skipped
        self.skip_annotations()?;

        if self.eat_word("package") {
            unit.package = Some(self.read_qualified_name()?);
            self.expect(';')?;
        }

        loop {
            self.skip_trivia();
            if !self.eat_word("import") {
                break;
            }
            let is_static = self.eat_word("static");
            let mut name = self.read_qualified_name()?;
            self.skip_trivia();
            if self.rest().starts_with(".*") {
                self.pos += 2;
                name.push_str(".*");
            }
            self.expect(';')?;
            unit.imports.push(ImportDecl { is_static, name });
        }

        while !self.at_end() {
            if self.eat(';') {
                continue;
            }
            let package = unit.package.clone();
            let decl = self.parse_type_decl(package.as_deref())?;
            unit.types.push(decl);
        }

        Ok(unit)
    }

    fn skip_annotations(&mut self) -> ForgeResult<()> {
        loop {
            self.skip_trivia();
            if self.peek() != Some('@') {
                return Ok(());
            }
            // '@interface' starts a declaration, not an annotation use
            let saved = self.pos;
            self.bump();
            if self.peek_word() == Some("interface") {
                self.pos = saved;
                return Ok(());
            }
            self.pos = saved;
            self.parse_annotation()?;
        }
    }

    fn parse_annotation(&mut self) -> ForgeResult<AnnotationUse> {
        self.expect('@')?;
        let name = self.read_qualified_name()?;
        self.skip_trivia();
        let elements = if self.peek() == Some('(') {
            let raw = self.read_balanced('(', ')')?;
            let trimmed = normalize_ws(raw);
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed)
            }
        } else {
            None
        };
        Ok(AnnotationUse {
            type_ref: TypeRef::new(name),
            elements,
        })
    }

    fn collect_annotations(&mut self) -> ForgeResult<Vec<AnnotationUse>> {
        let mut annotations = Vec::new();
        loop {
            self.skip_trivia();
            if self.peek() != Some('@') {
                return Ok(annotations);
            }
            let saved = self.pos;
            self.bump();
            if self.peek_word() == Some("interface") {
                self.pos = saved;
                return Ok(annotations);
            }
            self.pos = saved;
            annotations.push(self.parse_annotation()?);
        }
    }

    fn collect_modifiers(&mut self) -> Flags {
        let mut flags = Flags::default();
        loop {
            let word = match self.peek_word() {
                Some(w) => w,
                None => return flags,
            };
            let bit = match word {
                "public" => Flags::PUBLIC,
                "protected" => Flags::PROTECTED,
                "private" => Flags::PRIVATE,
                "static" => Flags::STATIC,
                "final" => Flags::FINAL,
                "abstract" => Flags::ABSTRACT,
                "synchronized" => Flags::SYNCHRONIZED,
                "volatile" => Flags::VOLATILE,
                "transient" => Flags::TRANSIENT,
                "native" => Flags::NATIVE,
                "strictfp" => Flags::STRICTFP,
                "default" => Flags::DEFAULT,
                // sealing has no declaration-level consumer here
                "sealed" => Flags::default(),
                _ => {
                    // 'static' before '{' is an initializer, handled by caller
                    return flags;
                }
            };
            self.pos += word.len();
            flags = flags.with(bit);
        }
    }

    // ------------------------------------------------------------------
    // Type declarations
    // ------------------------------------------------------------------

    fn parse_type_decl(&mut self, qualifier: Option<&str>) -> ForgeResult<TypeDecl> {
        let annotations = self.collect_annotations()?;
        let flags = self.collect_modifiers();

        let kind = if self.eat_word("class") {
            TypeKind::Class
        } else if self.eat_word("interface") {
            TypeKind::Interface
        } else if self.eat_word("enum") {
            TypeKind::Enum
        } else if self.eat_word("record") {
            TypeKind::Record
        } else if self.eat('@') {
            if !self.eat_word("interface") {
                return Err(self.err("expected 'interface' after '@'"));
            }
            TypeKind::Annotation
        } else {
            return Err(self.err("expected type declaration"));
        };

        let simple_name = self.read_word()?.to_string();
        let fqn = match qualifier {
            Some(q) => format!("{}.{}", q, simple_name),
            None => simple_name.clone(),
        };

        self.skip_trivia();
        let type_params = if self.peek() == Some('<') {
            let raw = self.capture_generics()?;
            parse_type_params(&raw)
        } else {
            Vec::new()
        };

        let mut decl = TypeDecl {
            fqn: fqn.clone(),
            simple_name,
            kind,
            flags,
            super_type: None,
            interfaces: Vec::new(),
            type_params,
            annotations,
            fields: Vec::new(),
            methods: Vec::new(),
            inner_types: Vec::new(),
        };

        // record header: components become final fields
        if kind == TypeKind::Record {
            self.skip_trivia();
            if self.peek() == Some('(') {
                let raw = self.read_balanced('(', ')')?;
                for param in parse_parameter_list(raw, self.unit)? {
                    decl.fields.push(FieldDecl {
                        name: param.name,
                        flags: Flags::PRIVATE | Flags::FINAL,
                        data_type: param.data_type,
                        annotations: Vec::new(),
                        constant_value: None,
                    });
                }
            }
        }

        loop {
            self.skip_trivia();
            if self.eat_word("extends") {
                if kind == TypeKind::Interface {
                    loop {
                        decl.interfaces.push(TypeRef::new(self.read_type_ref()?));
                        if !self.eat(',') {
                            break;
                        }
                    }
                } else {
                    decl.super_type = Some(TypeRef::new(self.read_type_ref()?));
                }
            } else if self.eat_word("implements") {
                loop {
                    decl.interfaces.push(TypeRef::new(self.read_type_ref()?));
                    if !self.eat(',') {
                        break;
                    }
                }
            } else if self.eat_word("permits") {
                loop {
                    let _ = self.read_type_ref()?;
                    if !self.eat(',') {
                        break;
                    }
                }
            } else {
                break;
            }
        }

        self.expect('{')?;

        if kind == TypeKind::Enum {
            self.skip_enum_constants()?;
        }

        loop {
            self.skip_trivia();
            if self.peek() == Some('}') {
                self.bump();
                break;
            }
            if self.peek().is_none() {
                return Err(self.err(format!("unterminated body of {}", fqn)));
            }
            if self.eat(';') {
                continue;
            }
            self.parse_member(&mut decl)?;
        }

        Ok(decl)
    }

    /// Consumes the enum constant section up to and including the terminating
    /// ';' (or leaves the cursor at '}' when the enum has no members).
    fn skip_enum_constants(&mut self) -> ForgeResult<()> {
        loop {
            self.skip_trivia();
            match self.peek() {
                Some('}') | None => return Ok(()),
                Some(';') => {
                    self.bump();
                    return Ok(());
                }
                Some('(') => {
                    self.read_balanced('(', ')')?;
                }
                Some('{') => {
                    self.read_balanced('{', '}')?;
                }
                Some('@') => {
                    self.parse_annotation()?;
                }
                _ => {
                    self.bump();
                }
            }
        }
    }

    fn parse_member(&mut self, decl: &mut TypeDecl) -> ForgeResult<()> {
        let annotations = self.collect_annotations()?;
        let flags = self.collect_modifiers();

        self.skip_trivia();

        // initializer block (static or instance)
        if self.peek() == Some('{') {
            self.read_balanced('{', '}')?;
            return Ok(());
        }

        // nested type
        if matches!(
            self.peek_word(),
            Some("class") | Some("interface") | Some("enum") | Some("record")
        ) || (self.rest().starts_with('@') && {
            let saved = self.pos;
            self.bump();
            let is_decl = self.peek_word() == Some("interface");
            self.pos = saved;
            is_decl
        }) {
            let qualifier = decl.fqn.clone();
            let mut nested = self.parse_type_decl(Some(&qualifier))?;
            nested.annotations.splice(0..0, annotations);
            nested.flags = nested.flags.with(flags);
            decl.inner_types.push(nested);
            return Ok(());
        }

        // generic method type parameters
        self.skip_trivia();
        let type_params = if self.peek() == Some('<') {
            let raw = self.capture_generics()?;
            parse_type_params(&raw)
        } else {
            Vec::new()
        };

        // return type or constructor name
        let first_ref = self.read_type_ref()?;
        self.skip_trivia();

        if self.peek() == Some('(') {
            // constructor: first_ref was the name
            let method = self.finish_method(
                crate::names::simple_name(&first_ref).to_string(),
                None,
                flags,
                annotations,
                type_params,
            )?;
            decl.methods.push(method);
            return Ok(());
        }

        let name = self.read_word()?.to_string();
        self.skip_trivia();

        if self.peek() == Some('(') {
            let method = self.finish_method(
                name,
                Some(TypeRef::new(first_ref)),
                flags,
                annotations,
                type_params,
            )?;
            decl.methods.push(method);
            return Ok(());
        }

        // field declaration, possibly with several declarators
        let mut current_name = name;
        loop {
            let mut data_type = first_ref.clone();
            self.skip_trivia();
            while self.rest().starts_with('[') {
                self.bump();
                self.expect(']')?;
                data_type.push_str("[]");
                self.skip_trivia();
            }
            let constant_value = if self.eat('=') {
                let raw = self.read_until_top_level(&[',', ';'])?;
                Some(normalize_ws(raw))
            } else {
                None
            };
            decl.fields.push(FieldDecl {
                name: current_name,
                flags,
                data_type: TypeRef::new(data_type),
                annotations: annotations.clone(),
                constant_value,
            });
            if self.eat(',') {
                current_name = self.read_word()?.to_string();
            } else {
                self.expect(';')?;
                return Ok(());
            }
        }
    }

    fn finish_method(
        &mut self,
        name: String,
        return_type: Option<TypeRef>,
        mut flags: Flags,
        annotations: Vec<AnnotationUse>,
        type_params: Vec<TypeParamDecl>,
    ) -> ForgeResult<MethodDecl> {
        let raw_params = self.read_balanced('(', ')')?;
        let parameters = parse_parameter_list(raw_params, self.unit)?;
        if parameters.iter().any(|p| p.flags.contains(Flags::VARARGS)) {
            flags = flags.with(Flags::VARARGS);
        }

        // trailing array suffix on the return type is legal but rare; fold it in
        let mut return_type = return_type;
        self.skip_trivia();
        while self.rest().starts_with('[') {
            self.bump();
            self.expect(']')?;
            if let Some(ref mut r) = return_type {
                r.0.push_str("[]");
            }
            self.skip_trivia();
        }

        let mut exceptions = Vec::new();
        if self.eat_word("throws") {
            loop {
                exceptions.push(TypeRef::new(self.read_type_ref()?));
                if !self.eat(',') {
                    break;
                }
            }
        }

        // annotation member default value
        if self.eat_word("default") {
            self.read_until_top_level(&[';'])?;
        }

        self.skip_trivia();
        let body = if self.peek() == Some('{') {
            let raw = self.read_balanced('{', '}')?;
            if self.keep_bodies {
                Some(raw.trim().to_string())
            } else {
                None
            }
        } else {
            self.expect(';')?;
            None
        };

        Ok(MethodDecl {
            name,
            flags,
            return_type,
            parameters,
            exceptions,
            annotations,
            type_params,
            body,
        })
    }
}

// ============================================================================
// Fragment parsers
// ============================================================================

/// True for characters that may appear inside a generic type argument list
/// (identifier characters, separators, wildcards, bounds, annotations).
fn type_arg_char(c: char) -> bool {
    c.is_alphanumeric()
        || c.is_whitespace()
        || matches!(c, '_' | '$' | '.' | ',' | '?' | '&' | '@')
}

/// Collapses runs of whitespace into single spaces.
fn normalize_ws(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_ws = false;
    for c in text.trim().chars() {
        if c.is_whitespace() {
            if !last_ws {
                out.push(' ');
            }
            last_ws = true;
        } else {
            out.push(c);
            last_ws = false;
        }
    }
    out
}

/// Parses the inside of a captured `<...>` declaration list into type
/// parameters (`T`, `K extends A & B`).
fn parse_type_params(raw: &str) -> Vec<TypeParamDecl> {
    let inner = raw.trim();
    let inner = inner
        .strip_prefix('<')
        .and_then(|s| s.strip_suffix('>'))
        .unwrap_or(inner);

    split_top_level(inner, ',')
        .into_iter()
        .filter(|part| !part.trim().is_empty())
        .map(|part| {
            let part = part.trim();
            match part.split_once(" extends ") {
                Some((name, bounds)) => TypeParamDecl {
                    name: name.trim().to_string(),
                    bounds: split_top_level(bounds, '&')
                        .into_iter()
                        .map(|b| TypeRef::new(b.trim()))
                        .collect(),
                },
                None => TypeParamDecl {
                    name: part.to_string(),
                    bounds: Vec::new(),
                },
            }
        })
        .collect()
}

/// Splits on `sep` at angle-bracket depth zero.
fn split_top_level(text: &str, sep: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut current = String::new();
    for c in text.chars() {
        match c {
            '<' | '(' | '[' => {
                depth += 1;
                current.push(c);
            }
            '>' | ')' | ']' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            c if c == sep && depth == 0 => {
                parts.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }
    if !current.trim().is_empty() || !parts.is_empty() {
        parts.push(current);
    }
    parts
}

/// Parses a raw parameter list (`final int a, String... rest`).
fn parse_parameter_list(raw: &str, unit: &str) -> ForgeResult<Vec<ParamDecl>> {
    let mut params = Vec::new();
    for part in split_top_level(raw, ',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let mut cursor = Cursor::new(part, unit, false);
        let _annotations = cursor.collect_annotations()?;
        let mut flags = Flags::default();
        if cursor.eat_word("final") {
            flags = flags.with(Flags::FINAL);
        }
        let mut data_type = cursor.read_type_ref()?;
        cursor.skip_trivia();
        if cursor.rest().starts_with("...") {
            cursor.pos += 3;
            data_type.push_str("[]");
            flags = flags.with(Flags::VARARGS);
        }
        let name = cursor.read_word()?.to_string();
        cursor.skip_trivia();
        while cursor.rest().starts_with('[') {
            cursor.bump();
            cursor.expect(']')?;
            data_type.push_str("[]");
            cursor.skip_trivia();
        }
        params.push(ParamDecl {
            name,
            data_type: TypeRef::new(data_type),
            flags,
        });
    }
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIMPLE: &str = r#"
        package org.test;

        import java.util.List;
        import static java.util.Objects.requireNonNull;

        /** A test class. */
        @Deprecated
        public final class TestClass<T extends CharSequence> extends Base implements Comparable<TestClass<T>>, java.io.Serializable {

            private static final long serialVersionUID = 1L;
            public static int COUNT = 0, TOTAL = -1;
            private List<T> m_items;

            public TestClass(int size) throws IllegalStateException {
                this.m_items = new java.util.ArrayList<>(size);
            }

            public static String describe(String prefix, int... codes) {
                return prefix + codes.length;
            }

            List<T> items() { return m_items; }

            private abstract static class Inner {
                abstract void run();
            }
        }
        "#;

    fn parse(src: &str) -> CompilationUnit {
        parse_compilation_unit(src, "test.java", false).unwrap()
    }

    #[test]
    fn test_unit_structure() {
        let unit = parse(SIMPLE);
        assert_eq!(unit.package.as_deref(), Some("org.test"));
        assert_eq!(unit.imports.len(), 2);
        assert!(!unit.imports[0].is_static);
        assert_eq!(unit.imports[0].name, "java.util.List");
        assert!(unit.imports[1].is_static);
        assert_eq!(unit.types.len(), 1);
    }

    #[test]
    fn test_type_header() {
        let unit = parse(SIMPLE);
        let t = unit.primary_type().unwrap();
        assert_eq!(t.fqn, "org.test.TestClass");
        assert_eq!(t.kind, TypeKind::Class);
        assert!(t.flags.is_public());
        assert!(t.flags.is_final());
        assert_eq!(t.super_type.as_ref().unwrap().as_str(), "Base");
        assert_eq!(t.interfaces.len(), 2);
        assert_eq!(t.interfaces[1].as_str(), "java.io.Serializable");
        assert_eq!(t.type_params.len(), 1);
        assert_eq!(t.type_params[0].name, "T");
        assert_eq!(t.type_params[0].bounds[0].as_str(), "CharSequence");
        assert_eq!(t.annotations.len(), 1);
        assert_eq!(t.annotations[0].type_ref.as_str(), "Deprecated");
    }

    #[test]
    fn test_fields() {
        let unit = parse(SIMPLE);
        let t = unit.primary_type().unwrap();
        assert_eq!(t.fields.len(), 4);
        let uid = t.field("serialVersionUID").unwrap();
        assert!(uid.flags.is_static() && uid.flags.is_final());
        assert_eq!(uid.constant_value.as_deref(), Some("1L"));
        // multi-declarator field
        assert!(t.field("COUNT").is_some());
        let total = t.field("TOTAL").unwrap();
        assert_eq!(total.constant_value.as_deref(), Some("-1"));
        assert_eq!(t.field("m_items").unwrap().data_type.erasure(), "List");
    }

    #[test]
    fn test_methods() {
        let unit = parse(SIMPLE);
        let t = unit.primary_type().unwrap();
        assert_eq!(t.methods.len(), 3);

        let ctor = t.methods_named("TestClass").next().unwrap();
        assert!(ctor.is_constructor());
        assert_eq!(ctor.parameters.len(), 1);
        assert_eq!(ctor.exceptions[0].as_str(), "IllegalStateException");

        let describe = t.methods_named("describe").next().unwrap();
        assert!(describe.flags.is_static());
        assert!(describe.flags.contains(Flags::VARARGS));
        assert_eq!(describe.parameters[1].data_type.as_str(), "int[]");
        assert_eq!(describe.return_type.as_ref().unwrap().as_str(), "String");

        // bodies dropped when not requested
        assert!(describe.body.is_none());
    }

    #[test]
    fn test_nested_type() {
        let unit = parse(SIMPLE);
        let t = unit.primary_type().unwrap();
        assert_eq!(t.inner_types.len(), 1);
        let inner = t.inner_type("Inner").unwrap();
        assert_eq!(inner.fqn, "org.test.TestClass.Inner");
        assert!(inner.flags.is_static());
        assert!(inner.flags.is_abstract());
        assert_eq!(inner.methods.len(), 1);
    }

    #[test]
    fn test_bodies_kept_on_request() {
        let unit = parse_compilation_unit(SIMPLE, "test.java", true).unwrap();
        let t = unit.primary_type().unwrap();
        let items = t.methods_named("items").next().unwrap();
        assert_eq!(items.body.as_deref(), Some("return m_items;"));
    }

    #[test]
    fn test_enum_constants_skipped() {
        let src = r#"
            package p;
            public enum Color {
                RED(0xff0000), GREEN(0x00ff00) { @Override void hint() {} };
                Color(int rgb) {}
                Color() {}
                void hint() {}
            }
            "#;
        let unit = parse(src);
        let t = unit.primary_type().unwrap();
        assert_eq!(t.kind, TypeKind::Enum);
        assert_eq!(t.methods.len(), 3);
    }

    #[test]
    fn test_interface_extends_list() {
        let src = "package p; public interface I extends java.util.List<String>, Comparable<I> {}";
        let unit = parse(src);
        let t = unit.primary_type().unwrap();
        assert_eq!(t.kind, TypeKind::Interface);
        assert!(t.super_type.is_none());
        assert_eq!(t.interfaces.len(), 2);
        assert_eq!(t.interfaces[0].erasure(), "java.util.List");
    }

    #[test]
    fn test_record_components_become_fields() {
        let src = "package p; public record Point(int x, int y) {}";
        let unit = parse(src);
        let t = unit.primary_type().unwrap();
        assert_eq!(t.kind, TypeKind::Record);
        assert_eq!(t.fields.len(), 2);
        assert!(t.fields[0].flags.is_final());
    }

    #[test]
    fn test_annotation_type() {
        let src = r#"
            package p;
            public @interface Marker {
                String value() default "";
            }
            "#;
        let unit = parse(src);
        let t = unit.primary_type().unwrap();
        assert_eq!(t.kind, TypeKind::Annotation);
        assert_eq!(t.methods.len(), 1);
        assert_eq!(t.methods[0].name, "value");
    }

    #[test]
    fn test_generic_initializer_with_commas_is_one_declarator() {
        let src = r#"
            package p;
            class C {
                java.util.Map<String, Integer> m = new java.util.HashMap<String, Integer>();
                java.util.List<String> l = java.util.Collections.<String>emptyList();
            }
            "#;
        let unit = parse(src);
        let t = unit.primary_type().unwrap();
        assert_eq!(t.fields.len(), 2);
        let m = t.field("m").unwrap();
        assert_eq!(m.data_type.erasure(), "java.util.Map");
        assert_eq!(
            m.constant_value.as_deref(),
            Some("new java.util.HashMap<String, Integer>()")
        );
    }

    #[test]
    fn test_comparison_initializer_still_splits_declarators() {
        let src = "package p; class C { int a = 1 < 2 ? 3 : 4, b = 5; }";
        let unit = parse(src);
        let t = unit.primary_type().unwrap();
        assert_eq!(t.fields.len(), 2);
        assert_eq!(t.field("a").unwrap().constant_value.as_deref(), Some("1 < 2 ? 3 : 4"));
        assert_eq!(t.field("b").unwrap().constant_value.as_deref(), Some("5"));
    }

    #[test]
    fn test_braces_in_strings_do_not_confuse_scanner() {
        let src = r#"
            package p;
            class S {
                String s = "{ not a block }";
                char c = '}';
                void m() { String t = "}}}"; }
            }
            "#;
        let unit = parse(src);
        let t = unit.primary_type().unwrap();
        assert_eq!(t.fields.len(), 2);
        assert_eq!(t.methods.len(), 1);
    }

    #[test]
    fn test_parse_error_carries_line() {
        let err = parse_compilation_unit("package p export", "bad.java", false).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("bad.java"), "{}", msg);
    }
}
