//! Capabilities de merge: la familia `mergeWith*` y `mergeAll`.
//!
//! Todas funden una lista de objetos en uno solo con un combinador binario
//! por clave, en profundidad: cuando ambos lados son objetos se recursa,
//! cuando no, decide el combinador. El acumulador arranca vacío, así que la
//! primera aparición de una clave entra tal cual.

use std::rc::Rc;

use serde_json::{Map, Value};

use crate::action::decode::{decode_binary, BinaryFn, EvalCx, Evaluated};
use crate::errors::XformError;
use crate::numeric;

use super::{split_args, Palette};

const MERGE_WITH_ADD_INFO: &str = "Merges a list of JSON objects into a single JSON object by \
                                   adding values having the same key; treats a non-number value \
                                   as zero.";
const MERGE_WITH_SUBTRACT_INFO: &str = "Merges a list of JSON objects into a single JSON object \
                                        by subtracting values having the same key; treats a \
                                        non-number value as zero.";

pub(super) fn register(p: &mut Palette) {
    p.register("mergeWithOp", 2, None, |args, cx| {
        let (params, data) = split_args(args);
        let xformer = params.first().cloned().unwrap_or(Evaluated::Value(Value::Null));
        let combine = decode_binary(&xformer, cx)?;
        merge_collection(&combine, &data, cx)
    });
    p.register("mergeWithAdd", 1, Some(MERGE_WITH_ADD_INFO), |args, cx| {
        let (_, data) = split_args(args);
        merge_collection(&fixed(numeric::add), &data, cx)
    });
    p.register("mergeWithSubtract", 1, Some(MERGE_WITH_SUBTRACT_INFO), |args, cx| {
        let (_, data) = split_args(args);
        merge_collection(&fixed(numeric::subtract), &data, cx)
    });
    p.register("mergeWithMax", 1, None, |args, cx| {
        let (_, data) = split_args(args);
        merge_collection(&fixed(numeric::max), &data, cx)
    });
    p.register("mergeWithMin", 1, None, |args, cx| {
        let (_, data) = split_args(args);
        merge_collection(&fixed(numeric::min), &data, cx)
    });
    // el último valor gana (coercionado); las claves nuevas entran tal cual
    p.register("mergeAll", 1, None, |args, cx| {
        let (_, data) = split_args(args);
        merge_collection(&fixed(numeric::keep_latest), &data, cx)
    });
}

fn fixed(f: fn(&Value, &Value) -> Value) -> BinaryFn {
    Rc::new(move |l, r, _cx| Ok(f(l, r)))
}

/// Funde una colección de objetos. Una lista descarta miembros vacíos, un
/// objeto funde solo sus valores de tipo objeto, cualquier otra cosa produce
/// el objeto vacío.
fn merge_collection(combine: &BinaryFn,
                    data: &Value,
                    cx: &EvalCx<'_>)
                    -> Result<Value, XformError> {
    let members: Vec<&Value> = match data {
        Value::Array(items) => items.iter().filter(|v| numeric::is_something(v)).collect(),
        Value::Object(map) => map.values().filter(|v| v.is_object()).collect(),
        _ => Vec::new(),
    };
    let mut acc = Value::Object(Map::new());
    for member in members {
        acc = merge_deep_with(combine, &acc, member, cx)?;
    }
    Ok(acc)
}

fn merge_deep_with(combine: &BinaryFn,
                   l: &Value,
                   r: &Value,
                   cx: &EvalCx<'_>)
                   -> Result<Value, XformError> {
    match (l, r) {
        (Value::Object(lm), Value::Object(rm)) => {
            let mut out = lm.clone();
            for (k, rv) in rm {
                let merged = match lm.get(k) {
                    Some(lv) => merge_deep_with(combine, lv, rv, cx)?,
                    None => rv.clone(),
                };
                out.insert(k.clone(), merged);
            }
            Ok(Value::Object(out))
        }
        _ => combine(l, r, cx),
    }
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
    fn merge_with_add_sums_shared_keys() {
        let data = json!([{ "a": 1, "b": 5 }, { "a": 2 }, { "a": 3 }]);
        assert_eq!(run("mergeWithAdd", &[Evaluated::Value(data)]), json!({ "a": 6, "b": 5 }));
    }

    #[test]
    fn merge_with_subtract_folds_from_the_empty_object() {
        let data = json!([{ "a": 1 }, { "a": 2 }, { "a": 3 }]);
        assert_eq!(run("mergeWithSubtract", &[Evaluated::Value(data)]), json!({ "a": -4 }));
    }

    #[test]
    fn merging_an_object_keeps_only_object_valued_members() {
        let data = json!({ "x": { "a": 1 }, "skip": 7, "y": { "a": 2, "b": 1 } });
        assert_eq!(run("mergeWithAdd", &[Evaluated::Value(data)]), json!({ "a": 3, "b": 1 }));
    }

    #[test]
    fn merge_all_keeps_the_latest_value() {
        let data = json!([{ "a": 1, "b": 5 }, { "a": 2 }, { "a": 3 }]);
        assert_eq!(run("mergeAll", &[Evaluated::Value(data)]), json!({ "a": 3, "b": 5 }));
    }

    #[test]
    fn merging_recurses_into_nested_objects() {
        let data = json!([{ "a": { "x": 1 } }, { "a": { "x": 2, "y": 5 } }]);
        assert_eq!(run("mergeWithAdd", &[Evaluated::Value(data)]),
                   json!({ "a": { "x": 3, "y": 5 } }));
    }

    #[test]
    fn merge_with_op_resolves_a_named_combiner() {
        let data = json!([{ "a": 1 }, { "a": 5 }]);
        assert_eq!(run("mergeWithOp", &[Evaluated::Value(json!("max")), Evaluated::Value(data)]),
                   json!({ "a": 5 }));
    }

    #[test]
    fn empty_members_are_dropped_before_merging() {
        let data = json!([{ "a": 1 }, null, {}, { "a": 2 }]);
        assert_eq!(run("mergeWithAdd", &[Evaluated::Value(data)]), json!({ "a": 3 }));
    }
}
