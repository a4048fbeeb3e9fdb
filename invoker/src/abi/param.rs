use std::fmt;

use serde_json::Value;

/// A resolved ABI type. Generic parameters have already been substituted
/// wherever the ABI provided type arguments for them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParamType {
    Unit,
    Bool,
    U8,
    U16,
    U32,
    U64,
    U256,
    B256,
    /// Fixed length string, `str[N]`.
    StringArray(usize),
    /// Heap string, `str` or `struct String`.
    String,
    Array(Box<ParamType>, usize),
    Vector(Box<ParamType>),
    Tuple(Vec<ParamType>),
    Struct {
        name: String,
        fields: Vec<(String, ParamType)>,
    },
    Enum {
        name: String,
        variants: Vec<(String, ParamType)>,
    },
    /// A generic parameter that was never given a concrete type.
    Generic(String),
}

impl ParamType {
    /// Map a primitive type string onto its `ParamType`. Composite types need their
    /// components and are built by the ABI resolver instead.
    pub(crate) fn primitive(ty: &str) -> Option<Self> {
        let ty = match ty {
            "()" => ParamType::Unit,
            "bool" => ParamType::Bool,
            "u8" => ParamType::U8,
            "u16" => ParamType::U16,
            "u32" => ParamType::U32,
            "u64" => ParamType::U64,
            "u256" => ParamType::U256,
            "b256" => ParamType::B256,
            "str" | "struct String" | "struct std::string::String" => ParamType::String,
            _ => {
                let len = ty.strip_prefix("str[")?.strip_suffix(']')?;
                ParamType::StringArray(len.trim().parse().ok()?)
            }
        };
        Some(ty)
    }

    /// Check that `value` has the JSON shape this type expects as an argument.
    /// Returns a description of the first mismatch found.
    pub fn check(&self, value: &Value) -> Result<(), String> {
        match self {
            ParamType::Unit => match value {
                Value::Null => Ok(()),
                Value::Array(items) if items.is_empty() => Ok(()),
                _ => Err(self.expected(value)),
            },
            ParamType::Bool => match value {
                Value::Bool(_) => Ok(()),
                _ => Err(self.expected(value)),
            },
            ParamType::U8 => check_uint(value, u8::MAX as u64, self),
            ParamType::U16 => check_uint(value, u16::MAX as u64, self),
            ParamType::U32 => check_uint(value, u32::MAX as u64, self),
            ParamType::U64 => check_uint(value, u64::MAX, self),
            ParamType::U256 => match value {
                Value::Number(n) if n.is_u64() => Ok(()),
                Value::String(s) if is_u256_literal(s) => Ok(()),
                _ => Err(self.expected(value)),
            },
            ParamType::B256 => match value {
                Value::String(s) if is_b256(s) => Ok(()),
                _ => Err(self.expected(value)),
            },
            ParamType::StringArray(len) => match value {
                Value::String(s) if s.len() == *len => Ok(()),
                Value::String(s) => Err(format!(
                    "expected {self}, got a string of length {}",
                    s.len()
                )),
                _ => Err(self.expected(value)),
            },
            ParamType::String => match value {
                Value::String(_) => Ok(()),
                _ => Err(self.expected(value)),
            },
            ParamType::Array(elem, len) => match value {
                Value::Array(items) if items.len() == *len => check_each(elem, items),
                Value::Array(items) => Err(format!(
                    "expected {self}, got an array of length {}",
                    items.len()
                )),
                _ => Err(self.expected(value)),
            },
            ParamType::Vector(elem) => match value {
                Value::Array(items) => check_each(elem, items),
                _ => Err(self.expected(value)),
            },
            ParamType::Tuple(elems) => match value {
                Value::Array(items) if items.len() == elems.len() => elems
                    .iter()
                    .zip(items)
                    .enumerate()
                    .try_for_each(|(i, (ty, item))| {
                        ty.check(item).map_err(|e| format!(".{i}: {e}"))
                    }),
                _ => Err(self.expected(value)),
            },
            ParamType::Struct { fields, .. } => {
                let Value::Object(map) = value else {
                    return Err(self.expected(value));
                };
                if let Some(unknown) = map.keys().find(|k| !fields.iter().any(|(f, _)| f == *k)) {
                    return Err(format!("{self} has no field `{unknown}`"));
                }
                for (name, ty) in fields {
                    let field = map
                        .get(name)
                        .ok_or_else(|| format!("{self} is missing field `{name}`"))?;
                    ty.check(field).map_err(|e| format!(".{name}: {e}"))?;
                }
                Ok(())
            }
            ParamType::Enum { variants, .. } => {
                let (tag, inner) = match value {
                    Value::String(tag) => (tag.as_str(), &Value::Null),
                    Value::Object(map) => match (map.len(), map.iter().next()) {
                        (1, Some((tag, inner))) => (tag.as_str(), inner),
                        _ => return Err(format!("expected {self} with exactly one variant set")),
                    },
                    _ => return Err(self.expected(value)),
                };
                let (_, ty) = variants
                    .iter()
                    .find(|(name, _)| name == tag)
                    .ok_or_else(|| format!("{self} has no variant `{tag}`"))?;
                ty.check(inner).map_err(|e| format!("::{tag}: {e}"))
            }
            ParamType::Generic(_) => Ok(()),
        }
    }

    fn expected(&self, got: &Value) -> String {
        let got = match got {
            Value::Null => "null",
            Value::Bool(_) => "a bool",
            Value::Number(_) => "a number",
            Value::String(_) => "a string",
            Value::Array(_) => "an array",
            Value::Object(_) => "an object",
        };
        format!("expected {self}, got {got}")
    }
}

fn check_each(elem: &ParamType, items: &[Value]) -> Result<(), String> {
    items
        .iter()
        .enumerate()
        .try_for_each(|(i, item)| elem.check(item).map_err(|e| format!("[{i}]: {e}")))
}

fn check_uint(value: &Value, max: u64, ty: &ParamType) -> Result<(), String> {
    let n = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse::<u64>().ok(),
        _ => None,
    };
    match n {
        Some(n) if n <= max => Ok(()),
        Some(n) => Err(format!("{n} does not fit in {ty}")),
        None => Err(ty.expected(value)),
    }
}

/// 2^256 - 1
const U256_MAX_DECIMAL: &str =
    "115792089237316195423570985008687907853269984665640564039457584007913129639935";

fn is_u256_literal(s: &str) -> bool {
    match s.strip_prefix("0x") {
        Some(hex) => {
            let digits = hex.trim_start_matches('0');
            !hex.is_empty() && digits.len() <= 64 && hex.chars().all(|c| c.is_ascii_hexdigit())
        }
        None => {
            if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit()) {
                return false;
            }
            let digits = s.trim_start_matches('0');
            // Equal length ASCII digit strings order the same as their values.
            digits.len() < U256_MAX_DECIMAL.len()
                || (digits.len() == U256_MAX_DECIMAL.len() && digits <= U256_MAX_DECIMAL)
        }
    }
}

fn is_b256(s: &str) -> bool {
    let hex = s.strip_prefix("0x").unwrap_or(s);
    hex.len() == 64 && hex.chars().all(|c| c.is_ascii_hexdigit())
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::Unit => f.write_str("()"),
            ParamType::Bool => f.write_str("bool"),
            ParamType::U8 => f.write_str("u8"),
            ParamType::U16 => f.write_str("u16"),
            ParamType::U32 => f.write_str("u32"),
            ParamType::U64 => f.write_str("u64"),
            ParamType::U256 => f.write_str("u256"),
            ParamType::B256 => f.write_str("b256"),
            ParamType::StringArray(len) => write!(f, "str[{len}]"),
            ParamType::String => f.write_str("String"),
            ParamType::Array(elem, len) => write!(f, "[{elem}; {len}]"),
            ParamType::Vector(elem) => write!(f, "Vec<{elem}>"),
            ParamType::Tuple(elems) => {
                f.write_str("(")?;
                for (i, elem) in elems.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{elem}")?;
                }
                f.write_str(")")
            }
            ParamType::Struct { name, .. } => write!(f, "struct {name}"),
            ParamType::Enum { name, .. } => write!(f, "enum {name}"),
            ParamType::Generic(name) => f.write_str(name),
        }
    }
}
