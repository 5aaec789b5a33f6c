//! Modules, their type traversal order and token index.
//!
//! A [`ModuleDef`] is immutable once built. Construction flattens the type tree into the
//! canonical traversal order and indexes every type and method by token, rejecting
//! duplicate tokens.
//!
//! # Traversal order
//!
//! Each top-level type in declaration order, immediately followed by its nested types,
//! depth-first:
//!
//! ```text
//! <Module>            0x02000001
//! A                   0x02000002
//!   A/Inner           0x02000004
//!     A/Inner/Deep    0x02000005
//! B                   0x02000003
//! ```
//!
//! # Loading
//!
//! The upstream parser hands the model over as JSON. [`ModuleDef::from_path`] maps the dump
//! into memory rather than reading it, since dumps of large framework assemblies run into
//! hundreds of megabytes.

use std::{fmt, fs, path::Path, sync::Arc};

use crossbeam_skiplist::SkipMap;
use memmap2::Mmap;
use serde::{Deserialize, Serialize};

use crate::{
    metadata::{
        method::MethodDefRc,
        token::Token,
        typedef::{TypeDef, TypeDefRc},
    },
    Error, Result,
};

/// Serialized form of a module
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModuleDump {
    /// Module name
    #[serde(default)]
    pub name: String,
    /// Top-level types in declaration order
    #[serde(default)]
    pub types: Vec<TypeDefRc>,
}

/// A loaded module.
#[derive(Serialize, Deserialize)]
#[serde(try_from = "ModuleDump", into = "ModuleDump")]
pub struct ModuleDef {
    name: String,
    top_level: Vec<TypeDefRc>,
    ordered: Vec<TypeDefRc>,
    types_by_token: SkipMap<Token, TypeDefRc>,
    methods_by_token: SkipMap<Token, (TypeDefRc, MethodDefRc)>,
}

impl ModuleDef {
    /// Builds a module from its name and top-level types.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Malformed`] if a type or method token is null or appears more than
    /// once anywhere in the module.
    pub fn new(name: impl Into<String>, types: Vec<TypeDefRc>) -> Result<Self> {
        let module = ModuleDef {
            name: name.into(),
            top_level: types,
            ordered: Vec::new(),
            types_by_token: SkipMap::new(),
            methods_by_token: SkipMap::new(),
        };
        module.index()
    }

    /// Returns a builder for a new module
    #[must_use]
    pub fn builder() -> ModuleDefBuilder {
        ModuleDefBuilder::new()
    }

    /// Parses a module from its JSON dump.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Malformed`] if the text is not a valid dump or the model is
    /// inconsistent.
    pub fn from_json(json: &str) -> Result<Self> {
        Self::from_slice(json.as_bytes())
    }

    /// Parses a module from a JSON dump held in memory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Malformed`] if the data is empty, not a valid dump, or the model is
    /// inconsistent.
    pub fn from_slice(data: &[u8]) -> Result<Self> {
        if data.is_empty() {
            return Err(malformed_error!("Provided module dump is empty"));
        }

        let dump: ModuleDump = serde_json::from_slice(data)
            .map_err(|error| malformed_error!("Invalid module dump - {}", error))?;
        Self::try_from(dump)
    }

    /// Memory-maps and parses a JSON dump from disk.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FileError`] if the file cannot be opened, [`Error::Error`] if the
    /// mapping fails, and the errors of [`ModuleDef::from_slice`] otherwise.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = fs::File::open(path.as_ref())?;
        if file.metadata()?.len() == 0 {
            return Err(malformed_error!(
                "Module dump {} is empty",
                path.as_ref().display()
            ));
        }

        let mmap = unsafe { Mmap::map(&file) }.map_err(|error| Error::Error(error.to_string()))?;
        Self::from_slice(&mmap)
    }

    /// Module name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Top-level types in declaration order
    #[must_use]
    pub fn top_level_types(&self) -> &[TypeDefRc] {
        &self.top_level
    }

    /// Every type of the module, nested ones included, in traversal order
    #[must_use]
    pub fn types(&self) -> &[TypeDefRc] {
        &self.ordered
    }

    /// Total number of methods across all types
    #[must_use]
    pub fn method_count(&self) -> usize {
        self.methods_by_token.len()
    }

    /// Looks up a type by token
    #[must_use]
    pub fn type_by_token(&self, token: Token) -> Option<TypeDefRc> {
        self.types_by_token
            .get(&token)
            .map(|entry| entry.value().clone())
    }

    /// Looks up a method by token
    #[must_use]
    pub fn method_by_token(&self, token: Token) -> Option<MethodDefRc> {
        self.methods_by_token
            .get(&token)
            .map(|entry| entry.value().1.clone())
    }

    /// Returns the type declaring the method with `token`
    #[must_use]
    pub fn declaring_type(&self, token: Token) -> Option<TypeDefRc> {
        self.methods_by_token
            .get(&token)
            .map(|entry| entry.value().0.clone())
    }

    fn index(mut self) -> Result<Self> {
        let mut ordered = Vec::new();
        let mut pending: Vec<TypeDefRc> = self.top_level.iter().rev().cloned().collect();

        while let Some(current) = pending.pop() {
            pending.extend(current.nested_types.iter().rev().cloned());
            ordered.push(current);
        }

        for ty in &ordered {
            if ty.token.is_null() {
                return Err(malformed_error!("Type '{}' has a null token", ty.name));
            }
            if self.types_by_token.contains_key(&ty.token) {
                return Err(malformed_error!("Duplicate type token {}", ty.token));
            }
            self.types_by_token.insert(ty.token, ty.clone());

            for method in &ty.methods {
                if method.token.is_null() {
                    return Err(malformed_error!(
                        "Method '{}' of type {} has a null token",
                        method.name,
                        ty.token
                    ));
                }
                if self.methods_by_token.contains_key(&method.token) {
                    return Err(malformed_error!("Duplicate method token {}", method.token));
                }
                self.methods_by_token
                    .insert(method.token, (ty.clone(), method.clone()));
            }
        }

        self.ordered = ordered;
        Ok(self)
    }
}

impl TryFrom<ModuleDump> for ModuleDef {
    type Error = Error;

    fn try_from(dump: ModuleDump) -> Result<Self> {
        ModuleDef::new(dump.name, dump.types)
    }
}

impl From<ModuleDef> for ModuleDump {
    fn from(module: ModuleDef) -> Self {
        ModuleDump {
            name: module.name,
            types: module.top_level,
        }
    }
}

impl Clone for ModuleDef {
    fn clone(&self) -> Self {
        ModuleDef {
            name: self.name.clone(),
            top_level: self.top_level.clone(),
            ordered: self.ordered.clone(),
            types_by_token: self
                .types_by_token
                .iter()
                .map(|entry| (*entry.key(), entry.value().clone()))
                .collect(),
            methods_by_token: self
                .methods_by_token
                .iter()
                .map(|entry| (*entry.key(), entry.value().clone()))
                .collect(),
        }
    }
}

impl fmt::Debug for ModuleDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleDef")
            .field("name", &self.name)
            .field("types", &self.ordered.len())
            .field("methods", &self.methods_by_token.len())
            .finish()
    }
}

/// Builder for [`ModuleDef`].
///
/// ```rust
/// use vmscope::{metadata::typedef::TypeDef, ModuleDef, Token};
///
/// let module = ModuleDef::builder()
///     .name("protected.exe")
///     .add_type(TypeDef::builder().token(Token::new(0x0200_0001)).name("<Module>").build()?)
///     .build()?;
///
/// assert_eq!(module.types().len(), 1);
/// # Ok::<(), vmscope::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ModuleDefBuilder {
    name: Option<String>,
    types: Vec<TypeDefRc>,
}

impl ModuleDefBuilder {
    /// Creates an empty builder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the module name
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Appends a top-level type
    #[must_use]
    pub fn add_type(mut self, ty: TypeDef) -> Self {
        self.types.push(Arc::new(ty));
        self
    }

    /// Builds and indexes the module.
    ///
    /// # Errors
    ///
    /// See [`ModuleDef::new`].
    pub fn build(self) -> Result<ModuleDef> {
        ModuleDef::new(self.name.unwrap_or_default(), self.types)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::metadata::{method::MethodDef, signatures::TypeClass};

    fn method(token: u32) -> MethodDef {
        MethodDef::builder()
            .token(Token::new(token))
            .build()
            .unwrap()
    }

    fn ty(token: u32) -> crate::metadata::typedef::TypeDefBuilder {
        TypeDef::builder().token(Token::new(token))
    }

    #[test]
    fn test_traversal_order() {
        let deep = ty(0x02000005).name("Deep").build().unwrap();
        let inner = ty(0x02000004).name("Inner").nested(deep).build().unwrap();
        let a = ty(0x02000002).name("A").nested(inner).build().unwrap();
        let b = ty(0x02000003).name("B").build().unwrap();

        let module = ModuleDef::builder()
            .add_type(ty(0x02000001).name("<Module>").build().unwrap())
            .add_type(a)
            .add_type(b)
            .build()
            .unwrap();

        let order: Vec<u32> = module.types().iter().map(|t| t.token.value()).collect();
        assert_eq!(
            order,
            vec![0x02000001, 0x02000002, 0x02000004, 0x02000005, 0x02000003]
        );
        assert_eq!(module.top_level_types().len(), 3);
    }

    #[test]
    fn test_token_index() {
        let nested = ty(0x02000003)
            .method(method(0x06000003))
            .build()
            .unwrap();
        let module = ModuleDef::builder()
            .add_type(
                ty(0x02000002)
                    .method(method(0x06000001))
                    .method(method(0x06000002))
                    .nested(nested)
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap();

        assert_eq!(module.method_count(), 3);
        assert!(module.type_by_token(Token::new(0x02000003)).is_some());
        assert!(module.method_by_token(Token::new(0x06000002)).is_some());
        assert_eq!(
            module
                .declaring_type(Token::new(0x06000003))
                .map(|t| t.token),
            Some(Token::new(0x02000003))
        );
        assert!(module.method_by_token(Token::new(0x06000009)).is_none());
    }

    #[test]
    fn test_duplicate_tokens_rejected() {
        let result = ModuleDef::builder()
            .add_type(ty(0x02000002).build().unwrap())
            .add_type(ty(0x02000002).build().unwrap())
            .build();
        assert!(matches!(result, Err(Error::Malformed { .. })));

        let result = ModuleDef::builder()
            .add_type(ty(0x02000002).method(method(0x06000001)).build().unwrap())
            .add_type(ty(0x02000003).method(method(0x06000001)).build().unwrap())
            .build();
        assert!(matches!(result, Err(Error::Malformed { .. })));
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "name": "sample.exe",
            "types": [
                {
                    "token": "0x02000002",
                    "namespace": "VM",
                    "name": "Runtime",
                    "methods": [
                        {
                            "token": "0x06000001",
                            "name": "Dispatch",
                            "flags": 129,
                            "return_type": "class",
                            "params": ["class", "boolean"],
                            "locals": ["System.Object", "System.Int32"]
                        }
                    ],
                    "nested_types": [{ "token": "0x02000003", "name": "Frame" }]
                }
            ]
        }"#;

        let module = ModuleDef::from_json(json).unwrap();
        assert_eq!(module.name(), "sample.exe");
        assert_eq!(module.types().len(), 2);

        let dispatch = module.method_by_token(Token::new(0x06000001)).unwrap();
        assert_eq!(dispatch.params, vec![TypeClass::Class, TypeClass::Boolean]);
        assert!(!dispatch.is_static());
    }

    #[test]
    fn test_from_json_errors() {
        assert!(matches!(
            ModuleDef::from_json(""),
            Err(Error::Malformed { .. })
        ));
        assert!(matches!(
            ModuleDef::from_json("{ \"types\": 5 }"),
            Err(Error::Malformed { .. })
        ));
        assert!(matches!(
            ModuleDef::from_json(r#"{ "types": [{ "token": 0 }] }"#),
            Err(Error::Malformed { .. })
        ));
    }

    #[test]
    fn test_serde_roundtrip_preserves_order() {
        let module = ModuleDef::builder()
            .name("m")
            .add_type(ty(0x02000002).nested(ty(0x02000004).build().unwrap()).build().unwrap())
            .add_type(ty(0x02000003).build().unwrap())
            .build()
            .unwrap();

        let json = serde_json::to_string(&module.clone()).unwrap();
        let reloaded: ModuleDef = serde_json::from_str(&json).unwrap();

        let before: Vec<Token> = module.types().iter().map(|t| t.token).collect();
        let after: Vec<Token> = reloaded.types().iter().map(|t| t.token).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "name": "disk", "types": [{{ "token": "0x02000001", "name": "<Module>" }}] }}"#
        )
        .unwrap();
        file.flush().unwrap();

        let module = ModuleDef::from_path(file.path()).unwrap();
        assert_eq!(module.name(), "disk");
        assert_eq!(module.types().len(), 1);

        let empty = tempfile::NamedTempFile::new().unwrap();
        assert!(matches!(
            ModuleDef::from_path(empty.path()),
            Err(Error::Malformed { .. })
        ));

        assert!(matches!(
            ModuleDef::from_path("/nonexistent/vmscope/dump.json"),
            Err(Error::FileError(_))
        ));
    }
}
