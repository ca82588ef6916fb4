//! Capabilities de extracción: `pickFrom` y `pickByRegex`.
//!
//! `pickFrom` navega un path dentro del dato con soporte de comodín `*`;
//! `pickByRegex` filtra claves de un objeto por expresión regular. Ambas
//! degradan a formas vacías en vez de fallar cuando el dato no tiene la
//! forma esperada.

use regex::Regex;
use serde_json::{Map, Value};

use crate::errors::XformError;
use crate::numeric;

use super::{param_value, split_args, Palette};

const PICK_FROM_INFO: &str = "Retrieves value at the specified path from a JSON object.";
const PICK_BY_REGEX_INFO: &str = "Filters key-value pairs from a JSON object when key matches \
                                  the specified regular expression (or string).";

pub(super) fn register(p: &mut Palette) {
    p.register("pickFrom", 2, Some(PICK_FROM_INFO), |args, _cx| {
        let (params, data) = split_args(args);
        Ok(pick_from(&param_value(params, 0), &data))
    });
    p.register("pickByRegex", 2, Some(PICK_BY_REGEX_INFO), |args, _cx| {
        let (params, data) = split_args(args);
        pick_by_regex(&param_value(params, 0), &data)
    });
}

/// Navega `path` (lista de segmentos) dentro de `data`. Un segmento `*`
/// expande el nivel actual y los segmentos siguientes se extraen de cada
/// miembro (pluck).
pub fn pick_from(path: &Value, data: &Value) -> Value {
    let segments: Vec<Value> = match path {
        Value::Array(items) => items.clone(),
        other => vec![other.clone()],
    };
    let mut current = data.clone();
    let mut prev_wildcard = false;
    for segment in &segments {
        current = pick_prop(segment, prev_wildcard, &current);
        prev_wildcard = is_wildcard(segment);
    }
    current
}

fn is_wildcard(segment: &Value) -> bool {
    matches!(segment, Value::String(s) if s == "*")
}

/// Un paso de navegación. Tras un comodín el segmento extrae de cada miembro;
/// en el caso directo un miss cae a pluck (útil sobre listas homogéneas).
/// Los arrays resultantes descartan nulls.
fn pick_prop(segment: &Value, prev_wildcard: bool, data: &Value) -> Value {
    let picked = if is_wildcard(segment) {
        match data {
            Value::Object(map) => Value::Array(map.values().cloned().collect()),
            other => other.clone(),
        }
    } else if prev_wildcard {
        pluck(segment, data)
    } else {
        let direct = get_prop(segment, data);
        if numeric::is_something(&direct) {
            direct
        } else {
            pluck(segment, data)
        }
    };
    match picked {
        Value::Array(items) => {
            Value::Array(items.into_iter().filter(|v| !v.is_null()).collect())
        }
        other => other,
    }
}

/// Acceso directo: clave de objeto o índice de array. Miss -> Null.
pub(crate) fn get_prop(segment: &Value, data: &Value) -> Value {
    match data {
        Value::Object(map) => {
            let key = match segment {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                _ => return Value::Null,
            };
            map.get(&key).cloned().unwrap_or(Value::Null)
        }
        Value::Array(items) => {
            let idx = numeric::to_float(segment);
            if idx.is_finite() && idx >= 0.0 {
                items.get(idx as usize).cloned().unwrap_or(Value::Null)
            } else {
                Value::Null
            }
        }
        _ => Value::Null,
    }
}

/// Extrae el mismo segmento de cada miembro de una colección.
fn pluck(segment: &Value, data: &Value) -> Value {
    match data {
        Value::Array(items) => {
            Value::Array(items.iter().map(|v| get_prop(segment, v)).collect())
        }
        Value::Object(map) => {
            let plucked: Map<String, Value> =
                map.iter().map(|(k, v)| (k.clone(), get_prop(segment, v))).collect();
            Value::Object(plucked)
        }
        _ => Value::Null,
    }
}

/// Filtra las claves de un objeto por regex. Un patrón vacío filtra todo.
pub fn pick_by_regex(pattern: &Value, data: &Value) -> Result<Value, XformError> {
    if numeric::is_nothing(pattern) {
        return Ok(Value::Object(Map::new()));
    }
    let re = regex_from_value(pattern)?;
    match data {
        Value::Object(map) => {
            let kept: Map<String, Value> = map.iter()
                                              .filter(|(k, _)| re.is_match(k))
                                              .map(|(k, v)| (k.clone(), v.clone()))
                                              .collect();
            Ok(Value::Object(kept))
        }
        Value::Array(items) => {
            let kept: Map<String, Value> = items.iter()
                                                .enumerate()
                                                .filter(|(i, _)| re.is_match(&i.to_string()))
                                                .map(|(i, v)| (i.to_string(), v.clone()))
                                                .collect();
            Ok(Value::Object(kept))
        }
        _ => Ok(Value::Object(Map::new())),
    }
}

/// Compila un valor como regex. Acepta strings planos, números y literales
/// estilo `/patrón/flags` (los flags se traducen a la forma inline `(?i)`).
pub(crate) fn regex_from_value(value: &Value) -> Result<Regex, XformError> {
    let pattern = match value {
        Value::String(s) => regex_literal(s),
        Value::Number(n) => n.to_string(),
        other => return Err(XformError::BadRegex(other.to_string())),
    };
    Regex::new(&pattern).map_err(|e| XformError::BadRegex(e.to_string()))
}

fn regex_literal(s: &str) -> String {
    if let Some(rest) = s.strip_prefix('/') {
        if let Some(pos) = rest.rfind('/') {
            let (pat, flags) = rest.split_at(pos);
            let flags: String =
                flags[1..].chars().filter(|c| matches!(c, 'i' | 'm' | 's' | 'x' | 'U')).collect();
            if flags.is_empty() {
                return pat.to_owned();
            }
            return format!("(?{flags}){pat}");
        }
    }
    s.to_owned()
}
