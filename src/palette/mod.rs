//! La paleta: tabla de capabilities invocables por nombre.
//!
//! Rol en el flujo:
//! - El decoder resuelve nombres de acción contra esta tabla; un nombre
//!   ausente decodifica a identidad.
//! - Cada entrada declara su aridad total (parámetros ligados + el dato
//!   final): con menos argumentos la acción queda parcialmente aplicada, con
//!   la aridad completa se invoca en decode-time.
//! - `standard()` arma la paleta completa; la tabla es extensible vía
//!   `register` para capabilities propias del llamador.
//!
//! Convención de llamada: los argumentos llegan como slice de `Evaluated`
//! donde el último es el dato y los anteriores son parámetros posicionales.

pub mod merge;
pub mod pick;
pub mod predicates;
pub mod shape;
pub mod stats;

use std::rc::Rc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::action::decode::{EvalCx, Evaluated};
use crate::errors::XformError;
use crate::numeric;

/// Capability registrada: misma forma que el callable ad hoc de las acciones
/// objeto.
pub type Capability = Rc<dyn Fn(&[Evaluated], &EvalCx<'_>) -> Result<Value, XformError>>;

pub struct PaletteEntry {
    /// Argumentos totales, dato incluido.
    pub arity: usize,
    pub info: Option<&'static str>,
    pub call: Capability,
}

/// Tabla nombre -> capability. Preserva el orden de registro.
pub struct Palette {
    entries: IndexMap<String, PaletteEntry>,
}

impl Palette {
    pub fn empty() -> Self {
        Self { entries: IndexMap::new() }
    }

    /// La paleta completa de serie.
    pub fn standard() -> Self {
        let mut p = Self::empty();
        register_core(&mut p);
        pick::register(&mut p);
        merge::register(&mut p);
        stats::register(&mut p);
        shape::register(&mut p);
        predicates::register(&mut p);
        p
    }

    pub fn register<F>(&mut self, name: &str, arity: usize, info: Option<&'static str>, call: F)
        where F: Fn(&[Evaluated], &EvalCx<'_>) -> Result<Value, XformError> + 'static
    {
        self.entries
            .insert(name.to_owned(), PaletteEntry { arity, info, call: Rc::new(call) });
    }

    pub fn get(&self, name: &str) -> Option<&PaletteEntry> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn info(&self, name: &str) -> Option<&'static str> {
        self.entries.get(name).and_then(|e| e.info)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::standard()
    }
}

/// Parte los argumentos en (parámetros, dato): el dato siempre es el último.
pub(crate) fn split_args(args: &[Evaluated]) -> (&[Evaluated], Value) {
    match args.split_last() {
        Some((data, params)) => (params, data.to_value()),
        None => (&[], Value::Null),
    }
}

/// Parámetro posicional como valor; ausente -> Null (junk downstream).
pub(crate) fn param_value(params: &[Evaluated], idx: usize) -> Value {
    params.get(idx).map(Evaluated::to_value).unwrap_or(Value::Null)
}

fn register_core(p: &mut Palette) {
    p.register("identity", 1, None, |args, _cx| {
        let (_, data) = split_args(args);
        Ok(data)
    });
    p.register("add", 2, None, |args, _cx| {
        let (params, data) = split_args(args);
        Ok(numeric::add(&param_value(params, 0), &data))
    });
    p.register("subtract", 2, None, |args, _cx| {
        let (params, data) = split_args(args);
        Ok(numeric::subtract(&param_value(params, 0), &data))
    });
    p.register("multiply", 2, None, |args, _cx| {
        let (params, data) = split_args(args);
        Ok(numeric::multiply(&param_value(params, 0), &data))
    });
    p.register("divide", 2, None, |args, _cx| {
        let (params, data) = split_args(args);
        Ok(numeric::divide(&param_value(params, 0), &data))
    });
    p.register("max", 2, None, |args, _cx| {
        let (params, data) = split_args(args);
        Ok(numeric::max(&param_value(params, 0), &data))
    });
    p.register("min", 2, None, |args, _cx| {
        let (params, data) = split_args(args);
        Ok(numeric::min(&param_value(params, 0), &data))
    });
    p.register("keepLatest", 2, None, |args, _cx| {
        let (params, data) = split_args(args);
        Ok(numeric::keep_latest(&param_value(params, 0), &data))
    });
    p.register("absolute", 1, None, |args, _cx| {
        let (_, data) = split_args(args);
        Ok(numeric::num(numeric::be_positive(&data)))
    });
    p.register("makePair", 2, None, |args, _cx| {
        let (params, data) = split_args(args);
        Ok(Value::Array(vec![param_value(params, 0), data]))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;
    use serde_json::json;

    fn call(name: &str, args: &[Evaluated]) -> Value {
        let palette = Palette::standard();
        let context = Context::new();
        let cx = EvalCx { palette: &palette, context: &context };
        let entry = palette.get(name).unwrap();
        (entry.call)(args, &cx).unwrap()
    }

    #[test]
    fn the_standard_palette_has_the_full_roster() {
        let p = Palette::standard();
        for name in ["identity", "pickFrom", "mergeWithAdd", "differential", "sumAll",
                     "getRate", "runAll", "sortAscending", "cleanData", "anyPass",
                     "takeTopPairsAndAddOthers"]
        {
            assert!(p.contains(name), "missing {name}");
        }
        assert!(!p.contains("notARealAction"));
    }

    #[test]
    fn core_arithmetic_uses_safe_coercion() {
        let two = Evaluated::Value(json!(2));
        assert_eq!(call("add", &[two.clone(), Evaluated::Value(json!("2"))]), json!(4));
        assert_eq!(call("divide", &[two.clone(), Evaluated::Value(Value::Null)]), json!(2));
        assert_eq!(call("divide", &[Evaluated::Value(Value::Null), two.clone()]), json!(0));
        assert_eq!(call("makePair", &[two, Evaluated::Value(json!("y"))]), json!([2, "y"]));
    }

    #[test]
    fn registering_a_custom_capability_makes_it_resolvable() {
        let mut p = Palette::empty();
        p.register("double", 1, Some("doubles a number"), |args, _cx| {
            let (_, data) = split_args(args);
            Ok(numeric::multiply(&json!(2), &data))
        });
        assert!(p.contains("double"));
        assert_eq!(p.info("double"), Some("doubles a number"));
    }
}
