//! Decodificación de acciones de punta a punta: formas stringy, objeto y
//! combo, con parámetros anidados y referencias al contexto.

use std::rc::Rc;

use serde_json::{json, Value};
use xformer::{action_name, decode_action, decode_stringy_action, numeric, Action, AdHocFn,
              Context, EvalCx, Evaluated, ObjectAction, Palette};

fn fixtures() -> (Palette, Context) {
    (Palette::standard(), Context::new())
}

#[test]
fn a_stringy_action_with_full_arity_applies_at_decode_time() {
    let (palette, context) = fixtures();
    let cx = EvalCx { palette: &palette, context: &context };

    let decoded = decode_stringy_action("getAvg([1, 2, 3])", &cx);
    assert_eq!(decoded.apply(&Value::Null, &cx).unwrap(), json!(2));

    let decoded = decode_stringy_action("getRate(2, [1, 2, 3])", &cx);
    assert_eq!(decoded.apply(&Value::Null, &cx).unwrap(), json!([0.5, 1, 1.5]));
}

#[test]
fn a_partially_applied_action_waits_for_the_data() {
    let (palette, context) = fixtures();
    let cx = EvalCx { palette: &palette, context: &context };

    let decoded = decode_stringy_action("getRate(2)", &cx);
    assert_eq!(decoded.apply(&json!([1, 2, 3]), &cx).unwrap(), json!([0.5, 1, 1.5]));
}

#[test]
fn a_nested_action_parameter_evaluates_first() {
    let (palette, context) = fixtures();
    let cx = EvalCx { palette: &palette, context: &context };

    let decoded = decode_stringy_action("getRate(2, \"X.getAvg([1, 2, 3])\")", &cx);
    assert_eq!(decoded.apply(&Value::Null, &cx).unwrap(), json!(1));
}

#[test]
fn context_references_resolve_while_decoding() {
    let palette = Palette::standard();
    let context = Context::from_value(&json!({ "INTERVAL": 4 }));
    let cx = EvalCx { palette: &palette, context: &context };

    let decoded = decode_stringy_action("getRate($.INTERVAL, [4, 8])", &cx);
    assert_eq!(decoded.apply(&Value::Null, &cx).unwrap(), json!([1, 2]));
}

#[test]
fn an_unknown_name_decodes_to_identity() {
    let (palette, context) = fixtures();
    let cx = EvalCx { palette: &palette, context: &context };

    let decoded = decode_stringy_action("notARealAction(1, 2)", &cx);
    assert_eq!(decoded.apply(&json!({ "a": 1 }), &cx).unwrap(), json!({ "a": 1 }));
}

#[test]
fn a_malformed_action_falls_back_to_its_original_form() {
    let (palette, context) = fixtures();
    let cx = EvalCx { palette: &palette, context: &context };

    // argumentos sin balancear: la acción queda sin decodificar
    let decoded = decode_stringy_action("getRate([1, 2", &cx);
    assert_eq!(decoded.apply(&json!([1, 2]), &cx).unwrap(), json!("getRate([1, 2"));
}

#[test]
fn object_actions_decode_like_their_stringy_twins() {
    let (palette, context) = fixtures();
    let cx = EvalCx { palette: &palette, context: &context };

    let action = Action::from_value(&json!({ "name": "getAvg", "params": [[1, 2, 3]] }));
    assert_eq!(decode_action(&action, &cx).apply(&Value::Null, &cx).unwrap(), json!(2));

    let action = Action::from_value(&json!({ "name": "getRate", "params": [2, [1, 2, 3]] }));
    assert_eq!(decode_action(&action, &cx).apply(&Value::Null, &cx).unwrap(),
               json!([0.5, 1, 1.5]));
}

#[test]
fn object_actions_accept_actions_as_parameters() {
    let (palette, context) = fixtures();
    let cx = EvalCx { palette: &palette, context: &context };

    let nested = Action::from_value(&json!({
        "name": "getRate",
        "params": [2, { "name": "getAvg", "params": [[1, 2, 3]] }],
    }));
    assert_eq!(decode_action(&nested, &cx).apply(&Value::Null, &cx).unwrap(), json!(1));

    let stringy_param = Action::from_value(&json!({
        "name": "getRate",
        "params": [2, "X.getAvg([1, 2, 3])"],
    }));
    assert_eq!(decode_action(&stringy_param, &cx).apply(&Value::Null, &cx).unwrap(), json!(1));
}

#[test]
fn deeply_nested_object_actions_run_their_pipes() {
    let (palette, context) = fixtures();
    let cx = EvalCx { palette: &palette, context: &context };

    let action = Action::from_value(&json!({
        "name": "runAll",
        "params": [
            [
                [
                    { "name": "pickFrom", "params": [["alpha", "*"]] },
                    "mergeWithAdd",
                    { "name": "getRate", "params": [10] },
                ],
                [
                    { "name": "pickFrom", "params": [["beta", "beta_2"]] },
                    "getAvg",
                    { "name": "getRate", "params": [10] },
                ],
            ],
            {
                "alpha": {
                    "alpha_1": { "a1": 3, "a2": 5, "a3": 7 },
                    "alpha_2": { "a1": 33, "a2": 55, "a3": 77 },
                },
                "beta": {
                    "beta_2": { "a1": 22, "a2": 44, "a3": 66 },
                },
            },
        ],
    }));
    assert_eq!(decode_action(&action, &cx).apply(&Value::Null, &cx).unwrap(),
               json!([{ "a1": 3.6, "a2": 6, "a3": 8.4 }, 4.4]));
}

#[test]
fn the_rendered_name_of_an_object_action_decodes_identically() {
    let (palette, context) = fixtures();
    let cx = EvalCx { palette: &palette, context: &context };

    let action = Action::from_value(&json!({ "name": "pickByRegex", "params": ["a_"] }));
    let rendered = action_name(&action);
    assert_eq!(rendered, "pickByRegex(\"a_\")");

    let data = json!({ "a_1": 1, "b_1": 2 });
    let via_object = decode_action(&action, &cx).apply(&data, &cx).unwrap();
    let via_string = decode_stringy_action(&rendered, &cx).apply(&data, &cx).unwrap();
    assert_eq!(via_object, json!({ "a_1": 1 }));
    assert_eq!(via_string, via_object);
}

#[test]
fn an_ad_hoc_callable_runs_without_a_palette_entry() {
    let (palette, context) = fixtures();
    let cx = EvalCx { palette: &palette, context: &context };

    let double: AdHocFn = Rc::new(|args, _cx| {
        let data = args.last().map(Evaluated::to_value).unwrap_or(Value::Null);
        Ok(numeric::num(numeric::default_to_zero(&data) * 2.0))
    });
    let action = Action::Object(ObjectAction { func: Some(double), ..ObjectAction::default() });
    assert_eq!(decode_action(&action, &cx).apply(&json!(21), &cx).unwrap(), json!(42));
}

#[test]
fn an_ad_hoc_callable_receives_its_params_before_the_data() {
    let (palette, context) = fixtures();
    let cx = EvalCx { palette: &palette, context: &context };

    let scale: AdHocFn = Rc::new(|args, _cx| {
        let factor = args.first().map(Evaluated::to_value).unwrap_or(Value::Null);
        let data = args.last().map(Evaluated::to_value).unwrap_or(Value::Null);
        Ok(numeric::multiply(&factor, &data))
    });
    // el nombre no resuelve en la paleta: manda el callable ad hoc
    let action = Action::Object(ObjectAction { name: Some("scaleBy".into()),
                                               params: vec![json!(10)],
                                               func: Some(scale),
                                               info: None });
    assert_eq!(decode_action(&action, &cx).apply(&json!(4), &cx).unwrap(), json!(40));
}

#[test]
fn a_combo_action_applies_every_member_to_the_same_input() {
    let (palette, context) = fixtures();
    let cx = EvalCx { palette: &palette, context: &context };

    let combo = Action::from_value(&json!(["sumAll", "getAvg"]));
    assert_eq!(decode_action(&combo, &cx).apply(&json!([1, 2, 3]), &cx).unwrap(), json!([6, 2]));
}
