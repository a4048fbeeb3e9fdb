//! Contract ABI descriptors: which methods a contract exposes, and the types of
//! their parameters. Used to reject a call locally before anything is sent to
//! the network.
//!
//! Two JSON layouts are understood. The program ABI layout, where parameters
//! refer into a shared `types` table by `typeId`, and the older flat layout
//! where every entry spells its parameter types out inline.

mod param;

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::error::ErrorKind;
use crate::result::Result;

pub use self::param::ParamType;

/// Nesting deeper than this is treated as a cycle in the type table.
const MAX_TYPE_DEPTH: usize = 64;

/// A parsed ABI document. Loaded once and then only read; contract handles
/// share it behind an `Arc`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AbiDescriptor {
    functions: BTreeMap<String, AbiFunction>,
}

/// A single callable method of a contract.
#[derive(Clone, Debug, PartialEq)]
pub struct AbiFunction {
    pub name: String,
    pub inputs: Vec<AbiParam>,
    pub output: ParamType,
    /// Attribute names such as `payable` or `storage`. `None` when the ABI layout
    /// does not carry attributes at all.
    pub attributes: Option<Vec<String>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AbiParam {
    pub name: String,
    pub ty: ParamType,
}

impl AbiDescriptor {
    /// Read and parse an ABI document from `path`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|err| {
            ErrorKind::Io.full(format!("unable to read ABI file {}", path.display()), err)
        })?;
        Self::from_json_str(&contents)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let doc: AbiDocument = serde_json::from_str(json).map_err(|err| {
            ErrorKind::DataConversion.full("document is not a recognized ABI layout", err)
        })?;
        let functions = match doc {
            AbiDocument::Program(abi) => abi.into_functions()?,
            AbiDocument::Legacy(entries) => entries
                .into_iter()
                .filter(|entry| matches!(entry.kind.as_str(), "function" | "contract"))
                .map(LegacyEntry::into_function)
                .collect(),
        };

        let mut by_name = BTreeMap::new();
        for function in functions {
            if by_name.contains_key(&function.name) {
                return Err(ErrorKind::DataConversion
                    .message(format!("ABI declares `{}` more than once", function.name)));
            }
            by_name.insert(function.name.clone(), function);
        }

        Ok(Self {
            functions: by_name,
        })
    }

    pub fn function(&self, name: &str) -> Option<&AbiFunction> {
        self.functions.get(name)
    }

    /// All methods in the ABI, ordered by name.
    pub fn functions(&self) -> impl Iterator<Item = &AbiFunction> {
        self.functions.values()
    }

    /// Find `method` and check `args` against its signature.
    pub fn resolve(&self, method: &str, args: &[Value]) -> Result<&AbiFunction> {
        let function = self.function(method).ok_or_else(|| {
            let available: Vec<_> = self.functions.keys().map(String::as_str).collect();
            ErrorKind::MethodNotFound.message(format!(
                "method `{method}` not found in ABI (available: {})",
                available.join(", ")
            ))
        })?;
        function.check_args(args)?;
        Ok(function)
    }
}

impl AbiFunction {
    /// Whether this method accepts forwarded assets. `None` when the ABI does not say.
    pub fn is_payable(&self) -> Option<bool> {
        self.attributes
            .as_ref()
            .map(|attrs| attrs.iter().any(|attr| attr == "payable"))
    }

    /// Check arity first, then each argument's shape against its declared type.
    pub fn check_args(&self, args: &[Value]) -> Result<()> {
        if args.len() != self.inputs.len() {
            return Err(ErrorKind::ArgumentMismatch.message(format!(
                "method `{}` takes {} argument(s) but {} were supplied",
                self.name,
                self.inputs.len(),
                args.len()
            )));
        }

        for (i, (param, arg)) in self.inputs.iter().zip(args).enumerate() {
            param.ty.check(arg).map_err(|reason| {
                ErrorKind::ArgumentMismatch.message(format!(
                    "argument `{}` (#{}) of `{}`: {reason}",
                    param.name,
                    i + 1,
                    self.name
                ))
            })?;
        }
        Ok(())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AbiDocument {
    Program(ProgramAbi),
    Legacy(Vec<LegacyEntry>),
}

#[derive(Deserialize)]
struct ProgramAbi {
    types: Vec<TypeDeclaration>,
    functions: Vec<ProgramFunction>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TypeDeclaration {
    type_id: usize,
    #[serde(rename = "type")]
    type_field: String,
    #[serde(default)]
    components: Option<Vec<TypeApplication>>,
    #[serde(default)]
    type_parameters: Option<Vec<usize>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TypeApplication {
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    type_id: usize,
    #[serde(default)]
    type_arguments: Option<Vec<TypeApplication>>,
}

#[derive(Deserialize)]
struct ProgramFunction {
    name: String,
    inputs: Vec<TypeApplication>,
    output: TypeApplication,
    #[serde(default)]
    attributes: Option<Vec<Attribute>>,
}

#[derive(Deserialize)]
struct Attribute {
    name: String,
}

impl ProgramAbi {
    fn into_functions(self) -> Result<Vec<AbiFunction>> {
        let resolver = TypeResolver {
            types: self.types.iter().map(|decl| (decl.type_id, decl)).collect(),
        };
        let env = HashMap::new();

        self.functions
            .iter()
            .map(|function| {
                let inputs = function
                    .inputs
                    .iter()
                    .map(|input| {
                        Ok(AbiParam {
                            name: input.name.clone(),
                            ty: resolver.resolve(input, &env, 0)?,
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;

                Ok(AbiFunction {
                    name: function.name.clone(),
                    inputs,
                    output: resolver.resolve(&function.output, &env, 0)?,
                    // Program ABIs always describe attributes, so a missing list means none.
                    attributes: Some(
                        function
                            .attributes
                            .iter()
                            .flatten()
                            .map(|attr| attr.name.clone())
                            .collect(),
                    ),
                })
            })
            .collect()
    }
}

struct TypeResolver<'a> {
    types: HashMap<usize, &'a TypeDeclaration>,
}

impl TypeResolver<'_> {
    /// Resolve a type application into a `ParamType`. `env` binds the type ids of
    /// generic parameters in scope to the concrete types they were applied with.
    fn resolve(
        &self,
        app: &TypeApplication,
        env: &HashMap<usize, ParamType>,
        depth: usize,
    ) -> Result<ParamType> {
        if depth > MAX_TYPE_DEPTH {
            return Err(ErrorKind::DataConversion
                .message(format!("type {} nests too deeply", app.type_id)));
        }
        let decl = self.types.get(&app.type_id).ok_or_else(|| {
            ErrorKind::DataConversion.message(format!("unknown type id {}", app.type_id))
        })?;

        if let Some(name) = decl.type_field.strip_prefix("generic ") {
            return Ok(env
                .get(&decl.type_id)
                .cloned()
                .unwrap_or_else(|| ParamType::Generic(name.to_string())));
        }

        let mut inner = HashMap::new();
        let args = app.type_arguments.as_deref().unwrap_or_default();
        for (i, param_id) in decl.type_parameters.iter().flatten().enumerate() {
            let ty = match args.get(i) {
                Some(arg) => self.resolve(arg, env, depth + 1)?,
                None => self.unbound(*param_id),
            };
            inner.insert(*param_id, ty);
        }

        if let Some(ty) = ParamType::primitive(&decl.type_field) {
            return Ok(ty);
        }

        let field = decl.type_field.as_str();
        let components = || -> Result<Vec<(String, ParamType)>> {
            decl.components
                .iter()
                .flatten()
                .map(|c| Ok((c.name.clone(), self.resolve(c, &inner, depth + 1)?)))
                .collect()
        };

        let ty = if matches!(field, "struct Vec" | "struct std::vec::Vec") {
            let elem = decl
                .type_parameters
                .iter()
                .flatten()
                .next()
                .and_then(|id| inner.get(id).cloned())
                .unwrap_or_else(|| ParamType::Generic("T".to_string()));
            ParamType::Vector(Box::new(elem))
        } else if let Some(name) = field.strip_prefix("struct ") {
            ParamType::Struct {
                name: name.to_string(),
                fields: components()?,
            }
        } else if let Some(name) = field.strip_prefix("enum ") {
            ParamType::Enum {
                name: name.to_string(),
                variants: components()?,
            }
        } else if let Some(len) = array_len(field) {
            let elem = components()?
                .into_iter()
                .next()
                .map(|(_, ty)| ty)
                .ok_or_else(|| {
                    ErrorKind::DataConversion.message(format!("array type {field} has no element"))
                })?;
            ParamType::Array(Box::new(elem), len)
        } else if field.starts_with('(') {
            ParamType::Tuple(components()?.into_iter().map(|(_, ty)| ty).collect())
        } else {
            tracing::debug!(target: "contract_invoker::abi", ty = field, "unchecked ABI type");
            ParamType::Generic(field.to_string())
        };
        Ok(ty)
    }

    fn unbound(&self, param_id: usize) -> ParamType {
        let name = self
            .types
            .get(&param_id)
            .and_then(|decl| decl.type_field.strip_prefix("generic "))
            .unwrap_or("T");
        ParamType::Generic(name.to_string())
    }
}

/// `[_; 3]` -> 3
fn array_len(ty: &str) -> Option<usize> {
    let inner = ty.strip_prefix('[')?.strip_suffix(']')?;
    let (_, len) = inner.split_once(';')?;
    len.trim().parse().ok()
}

#[derive(Deserialize)]
struct LegacyEntry {
    #[serde(rename = "type")]
    kind: String,
    name: String,
    #[serde(default)]
    inputs: Vec<LegacyParam>,
    #[serde(default)]
    outputs: Vec<LegacyParam>,
}

#[derive(Deserialize)]
struct LegacyParam {
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    ty: String,
    #[serde(default)]
    components: Option<Vec<LegacyParam>>,
}

impl LegacyEntry {
    fn into_function(self) -> AbiFunction {
        AbiFunction {
            name: self.name,
            inputs: self
                .inputs
                .iter()
                .map(|p| AbiParam {
                    name: p.name.clone(),
                    ty: p.param_type(),
                })
                .collect(),
            output: self
                .outputs
                .first()
                .map(LegacyParam::param_type)
                .unwrap_or(ParamType::Unit),
            attributes: None,
        }
    }
}

impl LegacyParam {
    fn param_type(&self) -> ParamType {
        if let Some(ty) = ParamType::primitive(&self.ty) {
            return ty;
        }
        let components = || -> Vec<(String, ParamType)> {
            self.components
                .iter()
                .flatten()
                .map(|c| (c.name.clone(), c.param_type()))
                .collect()
        };

        if let Some(name) = self.ty.strip_prefix("struct ") {
            ParamType::Struct {
                name: name.to_string(),
                fields: components(),
            }
        } else if let Some(name) = self.ty.strip_prefix("enum ") {
            ParamType::Enum {
                name: name.to_string(),
                variants: components(),
            }
        } else if let (Some(len), Some((_, elem))) = (array_len(&self.ty), components().pop()) {
            ParamType::Array(Box::new(elem), len)
        } else if self.ty.starts_with('(') {
            ParamType::Tuple(components().into_iter().map(|(_, ty)| ty).collect())
        } else {
            ParamType::Generic(self.ty.clone())
        }
    }
}
