//! Built-in formula functions
//!
//! The evaluator resolves call names against a [`FunctionRegistry`]: a
//! mapping from uppercase name to an implementation plus its declared arity
//! range. Callers may inject their own registry; [`default_registry`] serves
//! the built-in set from a process-wide lazily initialized instance.

pub mod logical;
pub mod math;
pub mod text;

use crate::error::FormulaResult;
use ahash::AHashMap;
use gridcalc_core::Value;
use once_cell::sync::Lazy;

/// Function implementation signature. Arguments arrive fully resolved;
/// range and group arguments arrive as (possibly nested) arrays.
pub type FunctionImpl = fn(&[Value]) -> FormulaResult<Value>;

/// Function definition
pub struct FunctionDef {
    /// Function name (uppercase)
    pub name: &'static str,
    /// Minimum arguments
    pub min_args: usize,
    /// Maximum arguments (None = unlimited)
    pub max_args: Option<usize>,
    /// Implementation
    pub implementation: FunctionImpl,
}

/// Function registry
pub struct FunctionRegistry {
    functions: AHashMap<String, FunctionDef>,
}

impl FunctionRegistry {
    /// Create a new registry with all built-in functions
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register_math_functions();
        registry.register_logical_functions();
        registry.register_text_functions();
        registry
    }

    /// Create a registry with no functions registered
    pub fn empty() -> Self {
        Self {
            functions: AHashMap::new(),
        }
    }

    /// Look up a function by name
    pub fn get(&self, name: &str) -> Option<&FunctionDef> {
        self.functions.get(&name.to_uppercase())
    }

    /// Register a function
    pub fn register(&mut self, def: FunctionDef) {
        self.functions.insert(def.name.to_uppercase(), def);
    }

    fn register_math_functions(&mut self) {
        self.register(FunctionDef {
            name: "SUM",
            min_args: 1,
            max_args: None,
            implementation: math::fn_sum,
        });

        self.register(FunctionDef {
            name: "AVERAGE",
            min_args: 1,
            max_args: None,
            implementation: math::fn_average,
        });

        self.register(FunctionDef {
            name: "MIN",
            min_args: 1,
            max_args: None,
            implementation: math::fn_min,
        });

        self.register(FunctionDef {
            name: "MAX",
            min_args: 1,
            max_args: None,
            implementation: math::fn_max,
        });

        self.register(FunctionDef {
            name: "COUNT",
            min_args: 1,
            max_args: None,
            implementation: math::fn_count,
        });

        self.register(FunctionDef {
            name: "ABS",
            min_args: 1,
            max_args: Some(1),
            implementation: math::fn_abs,
        });

        self.register(FunctionDef {
            name: "ROUND",
            min_args: 1,
            max_args: Some(2),
            implementation: math::fn_round,
        });

        self.register(FunctionDef {
            name: "MOD",
            min_args: 2,
            max_args: Some(2),
            implementation: math::fn_mod,
        });

        self.register(FunctionDef {
            name: "FLOOR",
            min_args: 1,
            max_args: Some(2),
            implementation: math::fn_floor,
        });
    }

    fn register_logical_functions(&mut self) {
        self.register(FunctionDef {
            name: "IF",
            min_args: 2,
            max_args: Some(3),
            implementation: logical::fn_if,
        });

        self.register(FunctionDef {
            name: "AND",
            min_args: 1,
            max_args: None,
            implementation: logical::fn_and,
        });

        self.register(FunctionDef {
            name: "OR",
            min_args: 1,
            max_args: None,
            implementation: logical::fn_or,
        });

        self.register(FunctionDef {
            name: "NOT",
            min_args: 1,
            max_args: Some(1),
            implementation: logical::fn_not,
        });
    }

    fn register_text_functions(&mut self) {
        self.register(FunctionDef {
            name: "LEN",
            min_args: 1,
            max_args: Some(1),
            implementation: text::fn_len,
        });

        self.register(FunctionDef {
            name: "LEFT",
            min_args: 1,
            max_args: Some(2),
            implementation: text::fn_left,
        });

        self.register(FunctionDef {
            name: "RIGHT",
            min_args: 1,
            max_args: Some(2),
            implementation: text::fn_right,
        });

        self.register(FunctionDef {
            name: "MID",
            min_args: 3,
            max_args: Some(3),
            implementation: text::fn_mid,
        });

        self.register(FunctionDef {
            name: "UPPER",
            min_args: 1,
            max_args: Some(1),
            implementation: text::fn_upper,
        });

        self.register(FunctionDef {
            name: "LOWER",
            min_args: 1,
            max_args: Some(1),
            implementation: text::fn_lower,
        });

        self.register(FunctionDef {
            name: "CONCATENATE",
            min_args: 1,
            max_args: None,
            implementation: text::fn_concatenate,
        });
    }
}

/// The process-wide default registry (lazily initialized, immutable after)
pub fn default_registry() -> &'static FunctionRegistry {
    static REGISTRY: Lazy<FunctionRegistry> = Lazy::new(FunctionRegistry::new);
    &REGISTRY
}

/// Flatten nested array arguments into their scalar leaves, in order.
pub(crate) fn flatten(args: &[Value]) -> Vec<&Value> {
    fn push<'a>(value: &'a Value, out: &mut Vec<&'a Value>) {
        match value {
            Value::Array(items) => {
                for item in items {
                    push(item, out);
                }
            }
            other => out.push(other),
        }
    }

    let mut out = Vec::new();
    for value in args {
        push(value, &mut out);
    }
    out
}

/// The numeric view of the flattened arguments: numbers and booleans are
/// included, numeric text is parsed, everything else is skipped the way the
/// aggregate functions do.
pub(crate) fn numeric_scalars(args: &[Value]) -> Vec<f64> {
    flatten(args)
        .into_iter()
        .filter_map(|value| match value {
            Value::Number(n) => Some(*n),
            Value::Bool(true) => Some(1.0),
            Value::Bool(false) => Some(0.0),
            Value::String(s) => s.trim().parse().ok(),
            Value::Empty | Value::Array(_) => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_has_the_builtins() {
        let registry = default_registry();
        for name in ["SUM", "IF", "LEN", "MOD", "CONCATENATE"] {
            assert!(registry.get(name).is_some(), "{name} missing");
        }
        assert!(registry.get("NOPE").is_none());
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert!(default_registry().get("sum").is_some());
    }

    #[test]
    fn test_registration_overrides() {
        fn zero(_args: &[Value]) -> FormulaResult<Value> {
            Ok(Value::Number(0.0))
        }

        let mut registry = FunctionRegistry::empty();
        assert!(registry.get("SUM").is_none());
        registry.register(FunctionDef {
            name: "SUM",
            min_args: 0,
            max_args: None,
            implementation: zero,
        });
        assert_eq!(registry.get("SUM").map(|d| d.min_args), Some(0));
    }

    #[test]
    fn test_flatten_preserves_order() {
        let args = vec![
            Value::Number(1.0),
            Value::Array(vec![
                Value::Number(2.0),
                Value::Array(vec![Value::Number(3.0)]),
            ]),
            Value::Number(4.0),
        ];
        let flat: Vec<f64> = numeric_scalars(&args);
        assert_eq!(flat, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_numeric_scalars_skips_text_and_empty() {
        let args = vec![
            Value::from("12"),
            Value::from("n/a"),
            Value::Empty,
            Value::Bool(true),
        ];
        assert_eq!(numeric_scalars(&args), vec![12.0, 1.0]);
    }
}
