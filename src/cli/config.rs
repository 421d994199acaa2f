//! The JSON manifest: type descriptions, checks and dispatch tables.
//!
//! ```json
//! {
//!   "types": [
//!     { "name": "Iterable", "members": [
//!         { "name": "next", "type": "fn(*Self) i32" },
//!         { "name": "printNext", "type": "fn(*Self) void", "default": true } ] },
//!     { "name": "Counter", "implemented": true, "members": [
//!         { "name": "current", "kind": "field", "type": "i32" },
//!         { "name": "next", "type": "fn(*Self) i32" } ] }
//!   ],
//!   "checks": [ { "shape": "Iterable", "candidate": "Counter" } ],
//!   "vtables": []
//! }
//! ```
//!
//! Function bodies cannot be expressed in JSON, so a function either has an
//! opaque body (`"default": true`, or every function of an `"implemented"`
//! type) or is bodyless.

use anyhow::{Context, Result, anyhow, bail};
use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use serde::Deserialize;
use shapecheck_solver::{Body, CheckMode, FnSig, TypeDescription, TypeRef, Value};
use std::path::Path;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    #[serde(default)]
    pub types: Vec<TypeSpec>,
    #[serde(default)]
    pub checks: Vec<CheckSpec>,
    #[serde(default)]
    pub vtables: Vec<VTableSpec>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeSpec {
    pub name: String,
    /// Every function member has a body.
    #[serde(default)]
    pub implemented: bool,
    #[serde(default)]
    pub members: Vec<MemberSpec>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberSpecKind {
    #[default]
    Function,
    Field,
    Const,
    Nested,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberSpec {
    pub name: String,
    #[serde(default)]
    pub kind: MemberSpecKind,
    /// Signature or type text; for `nested`, the name of another manifest type.
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub default: bool,
    #[serde(default)]
    pub private: bool,
    /// Field default or constant value.
    #[serde(default)]
    pub value: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManifestMode {
    #[default]
    Compose,
    Override,
}

impl From<ManifestMode> for CheckMode {
    fn from(mode: ManifestMode) -> Self {
        match mode {
            ManifestMode::Compose => CheckMode::Compose,
            ManifestMode::Override => CheckMode::Override,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckSpec {
    pub shape: String,
    pub candidate: String,
    #[serde(default)]
    pub mode: ManifestMode,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VTableSpec {
    pub table: String,
    pub implementation: String,
}

/// Parse manifest text.
pub fn parse_manifest(source: &str) -> Result<Manifest> {
    serde_json::from_str(source).context("failed to parse manifest")
}

/// Read and parse a manifest file.
pub fn load_manifest(path: &Path) -> Result<Manifest> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read manifest {}", path.display()))?;
    parse_manifest(&source).with_context(|| format!("in {}", path.display()))
}

/// A manifest with every type built and every reference checked.
#[derive(Debug, Clone)]
pub struct ResolvedManifest {
    pub types: IndexMap<String, TypeDescription>,
    pub checks: Vec<CheckSpec>,
    pub vtables: Vec<VTableSpec>,
}

impl ResolvedManifest {
    /// Look up a type the manifest declared. References are checked by
    /// `resolve`, so a miss here means the name came from elsewhere.
    pub fn get(&self, name: &str) -> Result<&TypeDescription> {
        self.types
            .get(name)
            .ok_or_else(|| anyhow!("unknown type '{name}'"))
    }
}

impl Manifest {
    pub fn resolve(&self) -> Result<ResolvedManifest> {
        let mut specs: IndexMap<&str, &TypeSpec> = IndexMap::new();
        for spec in &self.types {
            if specs.insert(spec.name.as_str(), spec).is_some() {
                bail!("type '{}' is declared more than once", spec.name);
            }
        }

        let mut resolver = Resolver {
            specs: &specs,
            built: IndexMap::new(),
            in_progress: FxHashSet::default(),
        };
        for name in specs.keys() {
            resolver.build(name)?;
        }
        let types = resolver.built;

        let known = |name: &str, context: &str| -> Result<()> {
            if types.contains_key(name) {
                Ok(())
            } else {
                Err(anyhow!("{context} refers to unknown type '{name}'"))
            }
        };
        for check in &self.checks {
            let context = format!("check '{}' against '{}'", check.candidate, check.shape);
            known(&check.shape, &context)?;
            known(&check.candidate, &context)?;
        }
        for vtable in &self.vtables {
            let context = format!("vtable '{}' for '{}'", vtable.table, vtable.implementation);
            known(&vtable.table, &context)?;
            known(&vtable.implementation, &context)?;
        }

        Ok(ResolvedManifest {
            types,
            checks: self.checks.clone(),
            vtables: self.vtables.clone(),
        })
    }
}

struct Resolver<'a> {
    specs: &'a IndexMap<&'a str, &'a TypeSpec>,
    built: IndexMap<String, TypeDescription>,
    in_progress: FxHashSet<String>,
}

impl Resolver<'_> {
    fn build(&mut self, name: &str) -> Result<TypeDescription> {
        if let Some(desc) = self.built.get(name) {
            return Ok(desc.clone());
        }
        let specs = self.specs;
        let spec = *specs
            .get(name)
            .ok_or_else(|| anyhow!("unknown type '{name}'"))?;
        if !self.in_progress.insert(name.to_string()) {
            bail!("type '{name}' nests itself");
        }

        let mut desc = TypeDescription::new(spec.name.as_str());
        for member in &spec.members {
            desc = self
                .add_member(desc, spec, member)
                .with_context(|| format!("type '{}' member '{}'", spec.name, member.name))?;
        }

        self.in_progress.remove(name);
        self.built.insert(name.to_string(), desc.clone());
        Ok(desc)
    }

    fn add_member(
        &mut self,
        desc: TypeDescription,
        owner: &TypeSpec,
        member: &MemberSpec,
    ) -> Result<TypeDescription> {
        let name = member.name.as_str();
        let desc = match member.kind {
            MemberSpecKind::Function => {
                let sig: FnSig = member
                    .ty
                    .parse()
                    .with_context(|| format!("invalid signature '{}'", member.ty))?;
                if member.default || owner.implemented {
                    desc.function_body(name, sig, Body::opaque())
                } else {
                    desc.required(name, sig)
                }
            }
            MemberSpecKind::Field => {
                let ty = parse_type(&member.ty)?;
                match &member.value {
                    Some(value) => desc.field_with_default(name, ty, json_value(value)?),
                    None => desc.field(name, ty),
                }
            }
            MemberSpecKind::Const => {
                let ty = parse_type(&member.ty)?;
                let value = match &member.value {
                    Some(value) => json_value(value)?,
                    None => Value::zero_for(&ty),
                };
                desc.constant(name, ty, value)
            }
            MemberSpecKind::Nested => {
                let nested = self.build(&member.ty)?;
                desc.nested(name, nested)
            }
        };
        Ok(if member.private { desc.private() } else { desc })
    }
}

fn parse_type(text: &str) -> Result<TypeRef> {
    text.parse().with_context(|| format!("invalid type '{text}'"))
}

/// Convert a JSON scalar into a runtime value.
pub fn json_value(value: &serde_json::Value) -> Result<Value> {
    Ok(match value {
        serde_json::Value::Null => Value::Void,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => Value::Float(
                n.as_f64()
                    .ok_or_else(|| anyhow!("number {n} is out of range"))?,
            ),
        },
        serde_json::Value::String(s) => Value::from(s.as_str()),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
            bail!("values must be scalars, found {value}")
        }
    })
}
