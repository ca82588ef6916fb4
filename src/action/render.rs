//! Renderizado de acciones para el trace: nombre visible y descripción.
//!
//! El executor etiqueta cada entrada del buffer con `action_name` y la
//! enriquece con `action_info`. Ninguna de las dos falla: las acciones sin
//! nombre o sin descripción degradan a los textos por defecto.

use serde_json::Value;

use crate::constants::{action_alias, ANONYMOUS_FN, NO_DESCRIPTION};
use crate::palette::Palette;

use super::{Action, ObjectAction};

/// Nombre visible de una acción: una stringy es su propio nombre, una objeto
/// se traduce a forma stringy y un combo une sus miembros con ", ".
pub fn action_name(action: &Action) -> String {
    match action {
        Action::Stringy(s) => s.clone(),
        Action::Object(o) => object_to_string(o),
        Action::Combo(list) => {
            list.iter().map(action_name).collect::<Vec<_>>().join(", ")
        }
    }
}

/// Descripción de una acción, buscada en la paleta por alias. El campo `info`
/// de una acción objeto tiene prioridad; los combos unen con saltos de línea.
pub fn action_info(action: &Action, palette: &Palette) -> String {
    match action {
        Action::Stringy(s) => lookup_info(s, palette),
        Action::Object(o) => {
            if let Some(info) = &o.info {
                return info.clone();
            }
            o.name.as_deref().map(|n| lookup_info(n, palette)).unwrap_or_else(no_description)
        }
        Action::Combo(list) => {
            list.iter().map(|a| action_info(a, palette)).collect::<Vec<_>>().join("\n")
        }
    }
}

fn lookup_info(action: &str, palette: &Palette) -> String {
    palette.info(action_alias(action)).map(str::to_owned).unwrap_or_else(no_description)
}

fn no_description() -> String {
    NO_DESCRIPTION.to_owned()
}

/// Forma stringy de una acción objeto: `name(p1, p2)`, paréntesis solo cuando
/// hay parámetros.
fn object_to_string(action: &ObjectAction) -> String {
    let name = action.name.as_deref().unwrap_or(ANONYMOUS_FN);
    if action.params.is_empty() {
        return name.to_owned();
    }
    let params = action.params
                       .iter()
                       .map(render_param)
                       .collect::<Vec<_>>()
                       .join(", ");
    format!("{name}({params})")
}

/// Renderizado JSON de un parámetro: strings con comillas y colecciones con
/// ", " entre miembros, de modo que la forma canónica stringy hace roundtrip.
fn render_param(param: &Value) -> String {
    match param {
        Value::Array(items) => {
            let inner = items.iter().map(render_param).collect::<Vec<_>>().join(", ");
            format!("[{inner}]")
        }
        Value::Object(map) => {
            let inner = map.iter()
                           .map(|(k, v)| format!("{}: {}",
                                                 Value::String(k.clone()),
                                                 render_param(v)))
                           .collect::<Vec<_>>()
                           .join(", ");
            format!("{{{inner}}}")
        }
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn stringy_actions_are_their_own_name() {
        assert_eq!(action_name(&Action::from("getRate(2)")), "getRate(2)");
    }

    #[test]
    fn object_actions_render_back_to_stringy_form() {
        let action = Action::from_value(&json!({ "name": "getRate", "params": [2, [1, 2, 3]] }));
        assert_eq!(action_name(&action), "getRate(2, [1, 2, 3])");

        let bare = Action::from_value(&json!({ "name": "sumAll" }));
        assert_eq!(action_name(&bare), "sumAll");

        let anonymous = Action::from_value(&json!({ "params": [2] }));
        assert_eq!(action_name(&anonymous), "_anonymousFn_(2)");
    }

    #[test]
    fn string_params_render_with_their_quotes() {
        let action = Action::from_value(&json!({ "name": "pickByRegex", "params": ["a_"] }));
        assert_eq!(action_name(&action), "pickByRegex(\"a_\")");

        let nested = Action::from_value(&json!({
            "name": "pickFrom",
            "params": [["bytes", "in"]],
        }));
        assert_eq!(action_name(&nested), "pickFrom([\"bytes\", \"in\"])");

        let object_param = Action::from_value(&json!({ "name": "isEqualTo",
                                                       "params": [{ "a": 1 }] }));
        assert_eq!(action_name(&object_param), "isEqualTo({\"a\": 1})");
    }

    #[test]
    fn combos_join_member_names() {
        let action = Action::from_value(&json!(["sumAll", { "name": "getAvg" }]));
        assert_eq!(action_name(&action), "sumAll, getAvg");
    }

    #[test]
    fn info_prefers_the_explicit_field() {
        let palette = Palette::standard();
        let action = Action::from_value(&json!({ "name": "sumAll", "info": "custom text" }));
        assert_eq!(action_info(&action, &palette), "custom text");
    }

    #[test]
    fn unknown_actions_get_the_default_description() {
        let palette = Palette::standard();
        assert_eq!(action_info(&Action::from("notARealAction"), &palette),
                   "No description available.");
    }

    #[test]
    fn known_actions_resolve_their_registered_info() {
        let palette = Palette::standard();
        assert_ne!(action_info(&Action::from("sumAll"), &palette), "No description available.");
    }
}
