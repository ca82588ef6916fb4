//! Predicados de la paleta: igualdad, comparaciones, regex y cuantificadores.
//!
//! Los comparadores reciben primero la cota y después el dato, de modo que la
//! forma parcial `isLessThanEqualTo(0)` pregunta por el dato:
//! `isLessThanEqualTo(0, -2) == true`. Dos valores incomparables (tipos
//! mezclados sin coerción numérica posible) comparan siempre falso.

use std::cmp::Ordering;

use serde_json::Value;

use crate::action::decode::{EvalCx, Evaluated};
use crate::errors::XformError;
use crate::numeric;

use super::shape::{any_pass, predicate_fns};
use super::{param_value, pick, split_args, Palette};

pub(super) fn register(p: &mut Palette) {
    p.register("isNothing", 1, None, |args, _cx| {
        let (_, data) = split_args(args);
        Ok(Value::Bool(numeric::is_nothing(&data)))
    });
    p.register("isEqualTo", 2, None, |args, _cx| {
        let (params, data) = split_args(args);
        Ok(Value::Bool(value_eq(&param_value(params, 0), &data)))
    });
    p.register("testRegex", 2, None, |args, _cx| {
        let (params, data) = split_args(args);
        let re = pick::regex_from_value(&param_value(params, 0))?;
        let subject = match &data {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        Ok(Value::Bool(re.is_match(&subject)))
    });
    p.register("isLessThan", 2, None, |args, _cx| {
        let (params, data) = split_args(args);
        Ok(compare_is(&data, &param_value(params, 0), &[Ordering::Less]))
    });
    p.register("isGreaterThan", 2, None, |args, _cx| {
        let (params, data) = split_args(args);
        Ok(compare_is(&data, &param_value(params, 0), &[Ordering::Greater]))
    });
    p.register("isLessThanEqualTo", 2, None, |args, _cx| {
        let (params, data) = split_args(args);
        Ok(compare_is(&data, &param_value(params, 0), &[Ordering::Less, Ordering::Equal]))
    });
    p.register("isGreaterThanEqualTo", 2, None, |args, _cx| {
        let (params, data) = split_args(args);
        Ok(compare_is(&data, &param_value(params, 0), &[Ordering::Greater, Ordering::Equal]))
    });
    p.register("any", 2, None, |args, cx| {
        let (params, data) = split_args(args);
        quantify_any(params.first(), &data, cx)
    });
    p.register("all", 2, None, |args, cx| {
        let (params, data) = split_args(args);
        quantify_all(params.first(), &data, cx)
    });
    p.register("anyPass", 2, None, |args, cx| {
        let (params, data) = split_args(args);
        let preds = predicate_fns(params.first(), cx);
        Ok(Value::Bool(any_pass(&preds, &data, cx)?))
    });
    p.register("allPass", 2, None, |args, cx| {
        let (params, data) = split_args(args);
        let preds = predicate_fns(params.first(), cx);
        for pred in &preds {
            if !numeric::truthy(&pred(&data, cx)?) {
                return Ok(Value::Bool(false));
            }
        }
        Ok(Value::Bool(true))
    });
}

/// Igualdad profunda con normalización numérica (2 == 2.0).
fn value_eq(l: &Value, r: &Value) -> bool {
    if let (Value::Number(_), Value::Number(_)) = (l, r) {
        return numeric::to_float(l) == numeric::to_float(r);
    }
    l == r
}

fn compare_is(data: &Value, bound: &Value, accepted: &[Ordering]) -> Value {
    match numeric::compare(data, bound) {
        Some(ord) => Value::Bool(accepted.contains(&ord)),
        None => Value::Bool(false),
    }
}

/// ¿Algún elemento (o valor, en objetos) satisface el predicado? Sobre un
/// escalar el predicado se aplica directo y su resultado se devuelve tal
/// cual.
fn quantify_any(predicate: Option<&Evaluated>,
                data: &Value,
                cx: &EvalCx<'_>)
                -> Result<Value, XformError> {
    let pred = match predicate {
        Some(p) => p.pipe_fn(cx),
        None => crate::action::decode::identity_fn(),
    };
    match data {
        Value::Array(items) => {
            for v in items {
                if numeric::truthy(&pred(v, cx)?) {
                    return Ok(Value::Bool(true));
                }
            }
            Ok(Value::Bool(false))
        }
        Value::Object(map) => {
            for v in map.values() {
                if numeric::truthy(&pred(v, cx)?) {
                    return Ok(Value::Bool(true));
                }
            }
            Ok(Value::Bool(false))
        }
        other => pred(other, cx),
    }
}

/// ¿Todos los elementos satisfacen el predicado? Un dato no-colección es
/// siempre falso.
fn quantify_all(predicate: Option<&Evaluated>,
                data: &Value,
                cx: &EvalCx<'_>)
                -> Result<Value, XformError> {
    let pred = match predicate {
        Some(p) => p.pipe_fn(cx),
        None => crate::action::decode::identity_fn(),
    };
    let values: Vec<&Value> = match data {
        Value::Array(items) => items.iter().collect(),
        Value::Object(map) => map.values().collect(),
        _ => return Ok(Value::Bool(false)),
    };
    for v in values {
        if !numeric::truthy(&pred(v, cx)?) {
            return Ok(Value::Bool(false));
        }
    }
    Ok(Value::Bool(true))
}
