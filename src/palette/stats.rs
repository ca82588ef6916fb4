//! Capabilities numéricas de agregación: sumas, promedios, tasas y deltas.

use serde_json::{Map, Value};

use crate::numeric;

use super::{param_value, split_args, Palette};

const SUM_ALL_INFO: &str = "Sums up all values in a list or JSON object; ignores values that \
                            are not numbers.";
const DIFFERENTIAL_INFO: &str = "Applies iterative subtraction over consecutive values in a \
                                 JSON object such that T[i] = T[i] - T[i-1]; first value is \
                                 ignored in the result.";
const DEFAULT_ALL_INFO: &str = "Replaces non-number values in a list or JSON object with the \
                                specified value.";
const GET_USED_MEMORY_INFO: &str = "Calculates percentages of used memory when given a list or \
                                    JSON object containing percentages of free memory.";
const GET_AVG_INFO: &str = "Calculates average of values in a list or JSON object; ignores \
                            values that are not numbers.";
const GET_RATE_INFO: &str = "Calculates rate by dividing each value in a list or JSON object by \
                             the provided interval; ignores values that are not numbers.";

pub(super) fn register(p: &mut Palette) {
    p.register("sumAll", 1, Some(SUM_ALL_INFO), |args, _cx| {
        let (_, data) = split_args(args);
        Ok(sum_all(&data))
    });
    p.register("differential", 1, Some(DIFFERENTIAL_INFO), |args, _cx| {
        let (_, data) = split_args(args);
        Ok(differential(&data))
    });
    p.register("defaultAll", 2, Some(DEFAULT_ALL_INFO), |args, _cx| {
        let (params, data) = split_args(args);
        Ok(default_all(&param_value(params, 0), &data))
    });
    p.register("getUsedMemory", 1, Some(GET_USED_MEMORY_INFO), |args, _cx| {
        let (_, data) = split_args(args);
        Ok(map_values(&data, numeric::used_memory_single))
    });
    p.register("getAvg", 1, Some(GET_AVG_INFO), |args, _cx| {
        let (_, data) = split_args(args);
        Ok(get_avg(&data))
    });
    p.register("getRate", 2, Some(GET_RATE_INFO), |args, _cx| {
        let (params, data) = split_args(args);
        let denominator = param_value(params, 0);
        Ok(map_values(&data, |v| numeric::divide(v, &denominator)))
    });
    p.register("getMax", 1, None, |args, _cx| {
        let (_, data) = split_args(args);
        Ok(get_max(&data))
    });
}

/// Aplica `f` valor a valor conservando la forma: una lista mapea, un objeto
/// conserva sus claves y un escalar se transforma directo.
fn map_values(data: &Value, f: impl Fn(&Value) -> Value) -> Value {
    match data {
        Value::Array(items) => Value::Array(items.iter().map(|v| f(v)).collect()),
        Value::Object(map) => {
            Value::Object(map.iter().map(|(k, v)| (k.clone(), f(v))).collect())
        }
        other => f(other),
    }
}

fn sum_all(data: &Value) -> Value {
    let total = match data {
        Value::Array(items) => numeric::sum_iter(items.iter()),
        Value::Object(map) => numeric::sum_iter(map.values()),
        other => numeric::default_to_zero(other),
    };
    numeric::num(total)
}

fn get_avg(data: &Value) -> Value {
    let avg = match data {
        Value::Array(items) => numeric::average(items.iter()),
        Value::Object(map) => numeric::average(map.values()),
        other => numeric::default_to_zero(other),
    };
    numeric::num(avg)
}

fn default_all(fallback: &Value, data: &Value) -> Value {
    map_values(data, |v| numeric::default_or_value(fallback, v))
}

/// Deltas absolutos entre valores consecutivos; el primer valor no aparece en
/// el resultado. Un objeto ordena por clave antes de derivar; una lista
/// conserva su orden y devuelve solo los deltas.
fn differential(data: &Value) -> Value {
    match data {
        Value::Object(map) => {
            let mut pairs: Vec<(&String, f64)> =
                map.iter()
                   .filter(|(_, v)| !numeric::is_junk(v))
                   .map(|(k, v)| (k, numeric::to_float(v)))
                   .collect();
            pairs.sort_by(|a, b| a.0.cmp(b.0));
            let deltas: Map<String, Value> =
                pairs.windows(2)
                     .map(|w| (w[1].0.clone(), numeric::num((w[1].1 - w[0].1).abs())))
                     .collect();
            Value::Object(deltas)
        }
        Value::Array(items) => {
            let clean: Vec<f64> = items.iter()
                                       .filter(|v| !numeric::is_junk(v))
                                       .map(numeric::to_float)
                                       .collect();
            Value::Array(clean.windows(2).map(|w| numeric::num((w[1] - w[0]).abs())).collect())
        }
        _ => Value::Null,
    }
}

/// Máximo de los valores coercionables; sin valores finitos -> 0. Un escalar
/// pasa sin cambios.
fn get_max(data: &Value) -> Value {
    let values: Vec<f64> = match data {
        Value::Array(items) => {
            items.iter().map(numeric::to_float).filter(|f| f.is_finite()).collect()
        }
        Value::Object(map) => {
            map.values().map(numeric::to_float).filter(|f| f.is_finite()).collect()
        }
        other => return other.clone(),
    };
    if values.is_empty() {
        return numeric::num(0.0);
    }
    numeric::num(values.into_iter().fold(f64::MIN, f64::max))
}
