//! Capabilities estructurales: mapear, ordenar, limpiar y recortar
//! colecciones.
//!
//! Varias de estas capabilities reciben acciones como parámetros (`map`,
//! `runAll`, los predicados de `cleanData*`, el xformer de
//! `takeTopAndCombineOthers`). Un parámetro con forma de lista se interpreta
//! como pipe secuencial, salvo en las listas de predicados, donde cada
//! miembro es un predicado independiente (OR).

use std::cmp::Ordering;
use std::rc::Rc;

use serde_json::{Map, Value};

use crate::action::decode::{decode_value_as_pipe, DecodedFn, EvalCx, Evaluated};
use crate::errors::XformError;
use crate::numeric;

use super::{param_value, pick, split_args, Palette};

const RUN_ALL_INFO: &str = "Execute a list of pipelines on provided data.";

pub(super) fn register(p: &mut Palette) {
    p.register("map", 2, None, |args, cx| {
        let (params, data) = split_args(args);
        let f = action_fn(params.first(), cx);
        map_with(&f, &data, cx)
    });
    p.register("runAll", 2, Some(RUN_ALL_INFO), |args, cx| {
        let (params, data) = split_args(args);
        run_all(params.first(), &data, cx)
    });
    p.register("sortAscending", 2, None, |args, _cx| {
        let (params, data) = split_args(args);
        Ok(sort(false, &param_value(params, 0), &data))
    });
    p.register("sortDescending", 2, None, |args, _cx| {
        let (params, data) = split_args(args);
        Ok(sort(true, &param_value(params, 0), &data))
    });
    p.register("sortObjectAscending", 2, None, |args, cx| {
        let (params, data) = split_args(args);
        sort_object(false, params.first(), &data, cx)
    });
    p.register("sortObjectDescending", 2, None, |args, cx| {
        let (params, data) = split_args(args);
        sort_object(true, params.first(), &data, cx)
    });
    p.register("cleanData", 2, None, |args, cx| {
        let (params, data) = split_args(args);
        let preds = predicate_fns(params.first(), cx);
        clean_data(&preds, &data, cx)
    });
    p.register("cleanDataByKeys", 2, None, |args, cx| {
        let (params, data) = split_args(args);
        let preds = predicate_fns(params.first(), cx);
        clean_data_by_keys(&preds, &data, cx)
    });
    p.register("takeTopAndCombineOthers", 3, None, |args, cx| {
        let (params, data) = split_args(args);
        let combine = action_fn(params.get(1), cx);
        take_top(&param_value(params, 0), &combine, &data, cx)
    });
    p.register("takeTopPairsAndAddOthers", 2, None, |args, cx| {
        let (params, data) = split_args(args);
        // equivalente a combinar con pickFrom(["*", 1]) -> sumAll ->
        // makePair("Others")
        let combine: DecodedFn = Rc::new(|others, _cx| {
            let plucked = pick::pick_from(&serde_json::json!(["*", 1]), others);
            let sum = match &plucked {
                Value::Array(items) => numeric::sum_iter(items.iter()),
                other => numeric::default_to_zero(other),
            };
            Ok(Value::Array(vec![Value::String("Others".into()), numeric::num(sum)]))
        });
        take_top(&param_value(params, 0), &combine, &data, cx)
    });
}

/// Parámetro-acción como callable; una lista compone secuencialmente.
fn action_fn(param: Option<&Evaluated>, cx: &EvalCx<'_>) -> DecodedFn {
    match param {
        Some(p) => p.pipe_fn(cx),
        None => crate::action::decode::identity_fn(),
    }
}

/// Lista de predicados independientes: cada miembro decodifica por separado
/// (un miembro lista es a su vez un pipe secuencial).
pub(super) fn predicate_fns(param: Option<&Evaluated>, cx: &EvalCx<'_>) -> Vec<DecodedFn> {
    match param {
        Some(Evaluated::Callable(f)) => vec![f.clone()],
        Some(Evaluated::Value(Value::Array(items))) => {
            items.iter().map(|v| decode_value_as_pipe(v, cx)).collect()
        }
        Some(Evaluated::Value(other)) => vec![decode_value_as_pipe(other, cx)],
        None => Vec::new(),
    }
}

pub(super) fn any_pass(preds: &[DecodedFn],
                       value: &Value,
                       cx: &EvalCx<'_>)
                       -> Result<bool, XformError> {
    for pred in preds {
        if numeric::truthy(&pred(value, cx)?) {
            return Ok(true);
        }
    }
    Ok(false)
}

fn map_with(f: &DecodedFn, data: &Value, cx: &EvalCx<'_>) -> Result<Value, XformError> {
    match data {
        Value::Array(items) => {
            Ok(Value::Array(items.iter().map(|v| f(v, cx)).collect::<Result<_, _>>()?))
        }
        Value::Object(map) => {
            let mut out = Map::new();
            for (k, v) in map {
                out.insert(k.clone(), f(v, cx)?);
            }
            Ok(Value::Object(out))
        }
        _ => Err(XformError::TypeMismatch("array or object".into())),
    }
}

/// Aplica cada pipe de la lista al mismo dato y recoge los resultados en
/// orden.
fn run_all(pipes: Option<&Evaluated>,
           data: &Value,
           cx: &EvalCx<'_>)
           -> Result<Value, XformError> {
    let fns: Vec<DecodedFn> = match pipes {
        Some(Evaluated::Value(Value::Array(items))) => {
            items.iter().map(|v| decode_value_as_pipe(v, cx)).collect()
        }
        Some(other) => vec![other.pipe_fn(cx)],
        None => Vec::new(),
    };
    Ok(Value::Array(fns.iter().map(|f| f(data, cx)).collect::<Result<_, _>>()?))
}

/// Ordena una lista (por clave cuando sus miembros son colecciones) o un
/// objeto (como lista de pares `[clave, valor]`, por clave o por valor según
/// el componente 0/1). Los escalares pasan sin cambios.
fn sort(descending: bool, key: &Value, data: &Value) -> Value {
    let cmp = |a: &Value, b: &Value| {
        let ord = numeric::compare(a, b).unwrap_or(Ordering::Equal);
        if descending {
            ord.reverse()
        } else {
            ord
        }
    };
    match data {
        Value::Array(items) => {
            let mut sorted = items.clone();
            match items.first() {
                Some(Value::Object(_)) | Some(Value::Array(_)) => {
                    sorted.sort_by(|a, b| {
                        cmp(&pick::get_prop(key, a), &pick::get_prop(key, b))
                    });
                }
                _ => sorted.sort_by(|a, b| cmp(a, b)),
            }
            Value::Array(sorted)
        }
        Value::Object(map) => {
            // componente 0 = por clave, 1 = por valor
            let component = numeric::default_to_zero(key).clamp(0.0, 1.0) as usize;
            let mut pairs: Vec<(String, Value)> =
                map.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
            pairs.sort_by(|a, b| {
                if component == 0 {
                    let ord = a.0.cmp(&b.0);
                    if descending {
                        ord.reverse()
                    } else {
                        ord
                    }
                } else {
                    cmp(&a.1, &b.1)
                }
            });
            Value::Array(pairs.into_iter()
                               .map(|(k, v)| Value::Array(vec![Value::String(k), v]))
                               .collect())
        }
        other => other.clone(),
    }
}

/// Ordena los pares de un objeto según el resultado de aplicar una acción al
/// valor de cada par.
fn sort_object(descending: bool,
               action: Option<&Evaluated>,
               data: &Value,
               cx: &EvalCx<'_>)
               -> Result<Value, XformError> {
    let key_fn = action_fn(action, cx);
    let pairs: Vec<(String, Value)> = match data {
        Value::Object(map) => map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        Value::Array(items) => {
            items.iter().enumerate().map(|(i, v)| (i.to_string(), v.clone())).collect()
        }
        _ => Vec::new(),
    };
    let mut keyed: Vec<(String, Value, Value)> = Vec::with_capacity(pairs.len());
    for (k, v) in pairs {
        let sort_key = key_fn(&v, cx)?;
        keyed.push((k, v, sort_key));
    }
    keyed.sort_by(|a, b| {
        let ord = numeric::compare(&a.2, &b.2).unwrap_or(Ordering::Equal);
        if descending {
            ord.reverse()
        } else {
            ord
        }
    });
    Ok(Value::Array(keyed.into_iter()
                         .map(|(k, v, _)| Value::Array(vec![Value::String(k), v]))
                         .collect()))
}

/// Descarta valores que satisfagan algún predicado; en objetos descarta
/// además las claves vacías.
fn clean_data(preds: &[DecodedFn], data: &Value, cx: &EvalCx<'_>) -> Result<Value, XformError> {
    match data {
        Value::Array(items) => {
            let mut kept = Vec::new();
            for v in items {
                if !any_pass(preds, v, cx)? {
                    kept.push(v.clone());
                }
            }
            Ok(Value::Array(kept))
        }
        Value::Object(map) => {
            let mut kept = Map::new();
            for (k, v) in map {
                if !k.is_empty() && !any_pass(preds, v, cx)? {
                    kept.insert(k.clone(), v.clone());
                }
            }
            Ok(Value::Object(kept))
        }
        other => Ok(other.clone()),
    }
}

/// Como `clean_data` pero los predicados se aplican a las claves (o índices,
/// como strings).
fn clean_data_by_keys(preds: &[DecodedFn],
                      data: &Value,
                      cx: &EvalCx<'_>)
                      -> Result<Value, XformError> {
    match data {
        Value::Array(items) => {
            let mut kept = Vec::new();
            for (i, v) in items.iter().enumerate() {
                if !any_pass(preds, &Value::String(i.to_string()), cx)? {
                    kept.push(v.clone());
                }
            }
            Ok(Value::Array(kept))
        }
        Value::Object(map) => {
            let mut kept = Map::new();
            for (k, v) in map {
                if !k.is_empty() && !any_pass(preds, &Value::String(k.clone()), cx)? {
                    kept.insert(k.clone(), v.clone());
                }
            }
            Ok(Value::Object(kept))
        }
        other => Ok(other.clone()),
    }
}

/// Conserva los primeros `count` miembros y reemplaza el resto por el
/// resultado de aplicarles `combine`.
fn take_top(count: &Value,
            combine: &DecodedFn,
            data: &Value,
            cx: &EvalCx<'_>)
            -> Result<Value, XformError> {
    let Value::Array(items) = data else {
        return Err(XformError::TypeMismatch("array".into()));
    };
    let n = (numeric::default_to_zero(count).max(0.0) as usize).min(items.len());
    let mut out: Vec<Value> = items[..n].to_vec();
    out.push(combine(&Value::Array(items[n..].to_vec()), cx)?);
    Ok(Value::Array(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;
    use serde_json::json;

    fn run(name: &str, args: &[Evaluated]) -> Value {
        let palette = Palette::standard();
        let context = Context::new();
        let cx = EvalCx { palette: &palette, context: &context };
        (palette.get(name).unwrap().call)(args, &cx).unwrap()
    }

    #[test]
    fn map_applies_a_pipe_to_each_member() {
        let out = run("map",
                      &[Evaluated::Value(json!(["sumAll", "getRate(100)"])),
                        Evaluated::Value(json!([[2, 4], [4, 6]]))]);
        assert_eq!(out, json!([0.06, 0.1]));
    }

    #[test]
    fn map_over_an_object_keeps_its_keys() {
        let out = run("map",
                      &[Evaluated::Value(json!("sumAll")),
                        Evaluated::Value(json!({ "a": [1, 2], "b": [3, 4] }))]);
        assert_eq!(out, json!({ "a": 3, "b": 7 }));
    }

    #[test]
    fn run_all_applies_each_pipe_to_the_same_input() {
        let data = json!({ "alpha": { "a1": 1, "a2": 2, "a3": 3 },
                           "beta": { "b1": 11, "b2": 22, "b3": 33 } });
        let pipes = json!([["pickFrom([\"alpha\"])", "getAvg"],
                           ["pickFrom([\"beta\"])", "getAvg"]]);
        assert_eq!(run("runAll", &[Evaluated::Value(pipes), Evaluated::Value(data)]),
                   json!([2, 22]));
    }

    #[test]
    fn sorting_scalars_ignores_the_key() {
        assert_eq!(run("sortAscending",
                       &[Evaluated::Value(Value::Null), Evaluated::Value(json!([3, 1, 2]))]),
                   json!([1, 2, 3]));
        assert_eq!(run("sortDescending",
                       &[Evaluated::Value(Value::Null), Evaluated::Value(json!([1, 3, 2]))]),
                   json!([3, 2, 1]));
    }

    #[test]
    fn sorting_pair_lists_uses_the_key_component() {
        let pairs = json!([[1, 345], [2, 45], [3, 121]]);
        assert_eq!(run("sortAscending", &[Evaluated::Value(json!(1)), Evaluated::Value(pairs)]),
                   json!([[2, 45], [3, 121], [1, 345]]));
    }

    #[test]
    fn sorting_an_object_returns_pairs() {
        let data = json!({ "jkl": 345, "efg": 121, "uvx": 45 });
        assert_eq!(run("sortAscending",
                       &[Evaluated::Value(json!(0)), Evaluated::Value(data.clone())]),
                   json!([["efg", 121], ["jkl", 345], ["uvx", 45]]));
        assert_eq!(run("sortAscending", &[Evaluated::Value(json!(1)), Evaluated::Value(data)]),
                   json!([["uvx", 45], ["efg", 121], ["jkl", 345]]));
    }

    #[test]
    fn sort_object_uses_an_action_as_key() {
        let data = json!({
            "a": { "bytes_out": 8887 },
            "b": { "bytes_out": 12696 },
            "c": { "bytes_out": 5818 },
        });
        let out = run("sortObjectDescending",
                      &[Evaluated::Value(json!("pickFrom([\"bytes_out\"])")),
                        Evaluated::Value(data)]);
        assert_eq!(out,
                   json!([["b", { "bytes_out": 12696 }],
                          ["a", { "bytes_out": 8887 }],
                          ["c", { "bytes_out": 5818 }]]));
    }

    #[test]
    fn clean_data_rejects_values_matching_any_predicate() {
        assert_eq!(run("cleanData",
                       &[Evaluated::Value(json!(["isNothing"])),
                         Evaluated::Value(json!([null, 1, 2, null, 3]))]),
                   json!([1, 2, 3]));
        assert_eq!(run("cleanData",
                       &[Evaluated::Value(json!(["isNothing"])),
                         Evaluated::Value(json!({ "a": 1, "": 2, "b": null }))]),
                   json!({ "a": 1 }));
    }

    #[test]
    fn clean_data_by_keys_filters_on_keys_and_indices() {
        assert_eq!(run("cleanDataByKeys",
                       &[Evaluated::Value(json!(["isEqualTo(\"b\")"])),
                         Evaluated::Value(json!({ "a": 1, "b": 2, "": 3 }))]),
                   json!({ "a": 1 }));
        assert_eq!(run("cleanDataByKeys",
                       &[Evaluated::Value(json!(["isLessThanEqualTo(1)"])),
                         Evaluated::Value(json!([10, 20, 30, 40]))]),
                   json!([30, 40]));
    }

    #[test]
    fn take_top_combines_the_tail() {
        assert_eq!(run("takeTopAndCombineOthers",
                       &[Evaluated::Value(json!(2)),
                         Evaluated::Value(json!("sumAll")),
                         Evaluated::Value(json!([2, 3, 1, 2, 3]))]),
                   json!([2, 3, 6]));
    }

    #[test]
    fn take_top_pairs_labels_the_remainder() {
        let pairs = json!([["abs", 2], ["fat", 3], ["net", 1], ["rip", 2], ["dom", 3]]);
        assert_eq!(run("takeTopPairsAndAddOthers",
                       &[Evaluated::Value(json!(2)), Evaluated::Value(pairs)]),
                   json!([["abs", 2], ["fat", 3], ["Others", 6]]));
    }
}
