//! Import collection for generated compilation units.
//!
//! The collector is keyed by simple name: the first registration of a simple
//! name owns it, every later registration under a different qualifier has to
//! stay fully qualified in the output. References pass through
//! [`ImportCollector::use_reference`], which tokenizes possibly-generic type
//! text and rewrites each qualified name to the shortest unambiguous form.
//!
//! Rendering follows the conventional grouping: all static imports before all
//! non-static imports, each side split into `java` / `javax` / `org` / other
//! groups, a blank line between non-empty groups, entries sorted by qualifier
//! then simple name. Unused registrations and non-static `java.lang` imports
//! are dropped.

use std::collections::HashMap;

use crate::names;
use crate::parse::ImportDecl;

// static groups order before non-static ones
const STATIC_GROUP_FACTOR: usize = 1;
const NON_STATIC_GROUP_FACTOR: usize = 10;

#[derive(Debug, Clone)]
struct ImportElement {
    qualifier: String,
    simple: String,
    used: bool,
}

impl ImportElement {
    fn fqn(&self) -> String {
        if self.qualifier.is_empty() {
            self.simple.clone()
        } else {
            format!("{}.{}", self.qualifier, self.simple)
        }
    }
}

/// Outcome of probing a name against the imports collected so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportDecision {
    /// The simple name already resolves to this qualifier.
    Simple,
    /// The simple name is owned by a different qualifier.
    Qualified,
    /// No registration yet; the name is free.
    Undecided,
}

/// Collects the imports of one compilation unit while its body is rendered.
#[derive(Debug, Default)]
pub struct ImportCollector {
    /// Package of the unit under construction; its types need no import.
    package: Option<String>,
    /// Non-static imports keyed by simple name.
    imports: HashMap<String, ImportElement>,
    /// Static imports keyed by simple (member) name.
    static_imports: HashMap<String, ImportElement>,
}

impl ImportCollector {
    pub fn new(package: Option<&str>) -> Self {
        ImportCollector {
            package: package.map(str::to_string),
            ..Default::default()
        }
    }

    pub fn package(&self) -> Option<&str> {
        self.package.as_deref()
    }

    /// Reserves a simple name without emitting an import. Used for type names
    /// declared inside the unit itself, so that foreign types of the same
    /// simple name stay qualified.
    pub fn reserve(&mut self, fqn: &str) {
        self.insert(fqn, false, false);
    }

    /// Registers an import and marks it used.
    pub fn add_import(&mut self, fqn: &str) {
        self.insert(fqn, true, true);
    }

    /// Registers a static member import and marks it used.
    pub fn add_static_import(&mut self, fqn: &str) {
        let fqn = normalize(fqn);
        let (qualifier, simple) = names::split(&fqn);
        let element = ImportElement {
            qualifier: qualifier.unwrap_or("").to_string(),
            simple: simple.to_string(),
            used: true,
        };
        self.static_imports.entry(element.simple.clone()).or_insert(element);
    }

    /// Seeds the collector from the import section of an existing unit, for
    /// working against already-written source.
    pub fn seed_existing(&mut self, imports: &[ImportDecl]) {
        for import in imports {
            if import.name.ends_with(".*") {
                // on-demand imports reserve nothing, they carry no simple name
                continue;
            }
            if import.is_static {
                self.add_static_import(&import.name);
            } else {
                self.insert(&import.name, false, true);
            }
        }
    }

    fn insert(&mut self, fqn: &str, used: bool, force: bool) {
        let fqn = normalize(fqn);
        let (qualifier, simple) = names::split(&fqn);
        let qualifier = qualifier.unwrap_or("");
        match self.imports.get_mut(simple) {
            Some(existing) if existing.qualifier == qualifier => {
                existing.used = existing.used || used;
            }
            Some(_) if !force => {
                // simple name owned by another qualifier, reference stays
                // fully qualified
            }
            _ => {
                self.imports.insert(
                    simple.to_string(),
                    ImportElement {
                        qualifier: qualifier.to_string(),
                        simple: simple.to_string(),
                        used,
                    },
                );
            }
        }
    }

    /// Probes how a name would render against the current registrations,
    /// without mutating the collector.
    pub fn check_existing_imports(&self, fqn: &str) -> ImportDecision {
        let fqn = normalize(fqn);
        let (qualifier, simple) = names::split(&fqn);
        match (self.imports.get(simple), qualifier) {
            (Some(existing), Some(q)) if existing.qualifier == q => ImportDecision::Simple,
            (Some(_), _) => ImportDecision::Qualified,
            (None, _) => ImportDecision::Undecided,
        }
    }

    /// Resolves one dotted name to its rendered form and records the import.
    /// The first registrant of a simple name wins; later names with the same
    /// simple name render fully qualified.
    pub fn use_name(&mut self, fqn: &str) -> String {
        let fqn = normalize(fqn);
        if names::is_primitive(&fqn) {
            return fqn;
        }
        let (qualifier, simple) = names::split(&fqn);
        let qualifier = match qualifier {
            Some(q) => q,
            // unqualified names cannot be imported
            None => return fqn,
        };

        match self.imports.get_mut(simple) {
            Some(existing) if existing.qualifier == qualifier => {
                existing.used = true;
                simple.to_string()
            }
            Some(_) => fqn,
            None => {
                self.imports.insert(
                    simple.to_string(),
                    ImportElement {
                        qualifier: qualifier.to_string(),
                        simple: simple.to_string(),
                        used: true,
                    },
                );
                simple.to_string()
            }
        }
    }

    /// Rewrites a full type reference, including generic arguments, bounds
    /// and array suffixes, shortening every embedded qualified name.
    pub fn use_reference(&mut self, reference: &str) -> String {
        let mut out = String::with_capacity(reference.len());
        let mut token = String::new();
        for c in reference.chars() {
            if c.is_alphanumeric() || c == '_' || c == '$' || c == '.' {
                token.push(c);
            } else {
                self.flush_token(&mut token, &mut out);
                out.push(c);
            }
        }
        self.flush_token(&mut token, &mut out);
        out
    }

    fn flush_token(&mut self, token: &mut String, out: &mut String) {
        if token.is_empty() {
            return;
        }
        // generic wildcards keep their keywords verbatim
        if token == "extends" || token == "super" {
            out.push_str(token);
        } else {
            out.push_str(&self.use_name(token));
        }
        token.clear();
    }

    /// Renders the import section. Empty string when nothing is imported;
    /// otherwise ends with a newline.
    pub fn render_import_block(&self) -> String {
        let mut entries: Vec<(usize, String, String, bool)> = Vec::new();

        for element in self.static_imports.values() {
            entries.push((
                group_of(&element.qualifier) * STATIC_GROUP_FACTOR,
                element.qualifier.clone(),
                element.simple.clone(),
                true,
            ));
        }
        for element in self.imports.values() {
            if !element.used || element.qualifier.is_empty() {
                continue;
            }
            if element.qualifier == names::JAVA_LANG {
                continue;
            }
            if Some(element.qualifier.as_str()) == self.package.as_deref() {
                continue;
            }
            entries.push((
                group_of(&element.qualifier) * NON_STATIC_GROUP_FACTOR,
                element.qualifier.clone(),
                element.simple.clone(),
                false,
            ));
        }

        entries.sort_by(|a, b| (a.0, &a.1, &a.2).cmp(&(b.0, &b.1, &b.2)));

        let mut out = String::new();
        let mut last_group = None;
        for (group, qualifier, simple, is_static) in &entries {
            if let Some(last) = last_group {
                if last != *group {
                    out.push('\n');
                }
            }
            last_group = Some(*group);
            if *is_static {
                out.push_str(&format!("import static {}.{};\n", qualifier, simple));
            } else {
                out.push_str(&format!("import {}.{};\n", qualifier, simple));
            }
        }
        out
    }
}

/// Normalizes a binary nested name (`a.b.Outer$Inner`) to its dotted source
/// form.
fn normalize(fqn: &str) -> String {
    fqn.replace(names::INNER_SEP, ".")
}

/// Import group of a qualifier: `java` (1), `javax` (2), `org` (3), other (4).
fn group_of(qualifier: &str) -> usize {
    match qualifier.split('.').next().unwrap_or("") {
        "java" => 1,
        "javax" => 2,
        "org" => 3,
        _ => 4,
    }
}
