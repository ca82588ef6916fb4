//! Decodificación de acciones a callables.
//!
//! Rol en el flujo:
//! - `decode_action` convierte cualquier `Action` en un `Decoded`: un valor
//!   ya aplicado, un callable esperando el dato, o una yuxtaposición.
//! - `evaluate` aplica la cadena literal -> `$.KEY` -> `X.acción` -> acción
//!   objeto sobre cada parámetro, de modo que los parámetros pueden ser JSON
//!   plano, referencias al contexto o acciones anidadas.
//! - La decodificación nunca propaga errores: un nombre desconocido degrada a
//!   identidad y una acción compuesta malformada degrada a su valor original
//!   sin decodificar.
//!
//! La decodificación es una función pura de (acción, contexto, paleta); no
//! muta nada.

use std::rc::Rc;

use serde_json::Value;

use crate::constants::{action_alias, CONTEXT_PREFIX, NESTED_ACTION_PREFIX};
use crate::context::Context;
use crate::errors::XformError;
use crate::palette::{Palette, PaletteEntry};

use super::literal;
use super::{Action, ObjectAction};

/// Contexto de evaluación entregado a cada decodificación e invocación:
/// la paleta y el contexto son de solo lectura durante toda la corrida.
pub struct EvalCx<'a> {
    pub palette: &'a Palette,
    pub context: &'a Context,
}

/// Callable decodificado: recibe el dato y produce el dato transformado.
pub type DecodedFn = Rc<dyn Fn(&Value, &EvalCx<'_>) -> Result<Value, XformError>>;

/// Combinador binario resuelto desde una acción (para merges).
pub type BinaryFn = Rc<dyn Fn(&Value, &Value, &EvalCx<'_>) -> Result<Value, XformError>>;

/// Resultado de decodificar una acción.
#[derive(Clone)]
pub enum Decoded {
    /// Acción totalmente aplicada en decode-time; como paso se comporta como
    /// constante.
    Value(Value),
    /// Callable esperando el dato.
    Fn(DecodedFn),
    /// Combo: cada miembro se aplica al mismo input y los resultados se
    /// recogen posicionalmente.
    Juxt(Vec<Decoded>),
}

/// Parámetro ya evaluado: JSON plano o un callable (acción anidada).
#[derive(Clone)]
pub enum Evaluated {
    Value(Value),
    Callable(DecodedFn),
}

impl Decoded {
    /// Aplica el paso decodificado a un dato.
    pub fn apply(&self, data: &Value, cx: &EvalCx<'_>) -> Result<Value, XformError> {
        match self {
            Decoded::Value(v) => Ok(v.clone()),
            Decoded::Fn(f) => f(data, cx),
            Decoded::Juxt(members) => members.iter()
                                             .map(|m| m.apply(data, cx))
                                             .collect::<Result<Vec<_>, _>>()
                                             .map(Value::Array),
        }
    }

    /// Forma callable uniforme (un valor pasa a ser constante).
    pub fn into_fn(self) -> DecodedFn {
        match self {
            Decoded::Fn(f) => f,
            Decoded::Value(v) => Rc::new(move |_data, _cx| Ok(v.clone())),
            Decoded::Juxt(members) => Rc::new(move |data, cx| {
                members.iter()
                       .map(|m| m.apply(data, cx))
                       .collect::<Result<Vec<_>, _>>()
                       .map(Value::Array)
            }),
        }
    }

    pub fn into_evaluated(self) -> Evaluated {
        match self {
            Decoded::Value(v) => Evaluated::Value(v),
            Decoded::Fn(f) => Evaluated::Callable(f),
            juxt @ Decoded::Juxt(_) => Evaluated::Callable(juxt.into_fn()),
        }
    }
}

impl Evaluated {
    /// Valor JSON del parámetro; un callable no tiene forma de valor y se ve
    /// como Null (junk) desde los helpers numéricos.
    pub fn to_value(&self) -> Value {
        match self {
            Evaluated::Value(v) => v.clone(),
            Evaluated::Callable(_) => Value::Null,
        }
    }

    /// Interpreta el parámetro como acción invocable. Una lista se compone
    /// secuencialmente (pipe-en-parámetro, como en `runAll` o `map`).
    pub fn pipe_fn(&self, cx: &EvalCx<'_>) -> DecodedFn {
        match self {
            Evaluated::Callable(f) => f.clone(),
            Evaluated::Value(v) => decode_value_as_pipe(v, cx),
        }
    }
}

/// La transformación identidad: el paso deja pasar su input sin cambios.
pub fn identity_fn() -> DecodedFn {
    Rc::new(|data, _cx| Ok(data.clone()))
}

/// Decodifica cualquier acción. Infalible: ante un error interno devuelve la
/// acción original sin decodificar (no tumba la query completa).
pub fn decode_action(action: &Action, cx: &EvalCx<'_>) -> Decoded {
    match try_decode(action, cx) {
        Ok(decoded) => decoded,
        Err(err) => {
            log::debug!("decode fallback for {action:?}: {err}");
            Decoded::Value(action.to_value())
        }
    }
}

fn try_decode(action: &Action, cx: &EvalCx<'_>) -> Result<Decoded, XformError> {
    match action {
        Action::Stringy(s) => try_decode_stringy(s, cx),
        Action::Object(o) => try_decode_object(o, cx),
        // cada miembro cae por su cuenta; un miembro malo no tumba el combo
        Action::Combo(list) => {
            Ok(Decoded::Juxt(list.iter().map(|a| decode_action(a, cx)).collect()))
        }
    }
}

/// Decodifica un pipe completo (un `Decoded` por paso, en orden).
pub fn decode_pipe(pipe: &[Action], cx: &EvalCx<'_>) -> Vec<Decoded> {
    pipe.iter().map(|a| decode_action(a, cx)).collect()
}

/// Decodifica una acción stringy `name(arg1, arg2, …)`.
pub fn decode_stringy_action(action: &str, cx: &EvalCx<'_>) -> Decoded {
    match try_decode_stringy(action, cx) {
        Ok(decoded) => decoded,
        Err(err) => {
            log::debug!("decode fallback for {action:?}: {err}");
            Decoded::Value(Value::String(action.to_owned()))
        }
    }
}

fn try_decode_stringy(action: &str, cx: &EvalCx<'_>) -> Result<Decoded, XformError> {
    let name = action_alias(action);
    let Some(entry) = cx.palette.get(name) else {
        return Ok(Decoded::Fn(identity_fn()));
    };

    let rest = action[name.len()..].trim();
    let rest = rest.strip_prefix('(').unwrap_or(rest);
    let rest = rest.strip_suffix(')').unwrap_or(rest);
    let raw_args = literal::parse_args(rest)?;

    if raw_args.is_empty() {
        // forma point-free: la capability cruda, el dato llega después
        return Ok(Decoded::Fn(bare_capability(entry)));
    }
    let args: Vec<Evaluated> = raw_args.iter().map(|t| evaluate(t, cx)).collect();
    invoke_or_curry(entry, args, cx)
}

/// Decodifica una acción objeto `{name, params, fn}`.
pub fn decode_object_action(action: &ObjectAction, cx: &EvalCx<'_>) -> Decoded {
    match try_decode_object(action, cx) {
        Ok(decoded) => decoded,
        Err(err) => {
            log::debug!("decode fallback for {action:?}: {err}");
            Decoded::Value(Action::Object(action.clone()).to_value())
        }
    }
}

fn try_decode_object(action: &ObjectAction, cx: &EvalCx<'_>) -> Result<Decoded, XformError> {
    if let Some(entry) = action.name.as_deref().and_then(|n| cx.palette.get(n)) {
        if action.params.is_empty() {
            return Ok(Decoded::Fn(bare_capability(entry)));
        }
        let args: Vec<Evaluated> = action.params.iter().map(|p| evaluate(p, cx)).collect();
        return invoke_or_curry(entry, args, cx);
    }

    // escape hatch: lógica one-off sin registrar en la paleta
    if let Some(func) = &action.func {
        let func = func.clone();
        if action.params.is_empty() {
            return Ok(Decoded::Fn(Rc::new(move |data, cx| {
                func(&[Evaluated::Value(data.clone())], cx)
            })));
        }
        let args: Vec<Evaluated> = action.params.iter().map(|p| evaluate(p, cx)).collect();
        return Ok(Decoded::Fn(Rc::new(move |data, cx| {
            let mut full = args.clone();
            full.push(Evaluated::Value(data.clone()));
            func(&full, cx)
        })));
    }

    Ok(Decoded::Fn(identity_fn()))
}

/// Cadena de evaluación de un parámetro: literal -> `$.KEY` -> `X.acción` ->
/// acción objeto -> valor plano.
pub fn evaluate(token: &Value, cx: &EvalCx<'_>) -> Evaluated {
    if let Value::String(s) = token {
        if let Ok(parsed) = serde_json::from_str::<Value>(s) {
            return resolve(parsed, cx);
        }
        if let Some(key) = s.strip_prefix(CONTEXT_PREFIX) {
            return resolve(cx.context.resolve(key), cx);
        }
        if let Some(nested) = s.strip_prefix(NESTED_ACTION_PREFIX) {
            return decode_stringy_action(nested, cx).into_evaluated();
        }
        return Evaluated::Value(token.clone());
    }
    resolve(token.clone(), cx)
}

/// Segunda mitad de la cadena, aplicada también a valores post-lookup.
fn resolve(value: Value, cx: &EvalCx<'_>) -> Evaluated {
    match &value {
        Value::String(s) => {
            if let Some(nested) = s.strip_prefix(NESTED_ACTION_PREFIX) {
                return decode_stringy_action(nested, cx).into_evaluated();
            }
            Evaluated::Value(value)
        }
        Value::Object(map) => {
            let is_action = map.get("name")
                               .and_then(Value::as_str)
                               .map_or(false, |n| cx.palette.contains(n));
            if is_action {
                decode_object_action(&ObjectAction::from_map(map), cx).into_evaluated()
            } else {
                Evaluated::Value(value)
            }
        }
        _ => Evaluated::Value(value),
    }
}

/// Un valor usado como acción: una lista compone secuencialmente (la salida
/// de cada miembro alimenta al siguiente), cualquier otra forma decodifica
/// como acción suelta.
pub fn decode_value_as_pipe(value: &Value, cx: &EvalCx<'_>) -> DecodedFn {
    match value {
        Value::Array(steps) => {
            let decoded: Vec<Decoded> =
                steps.iter().map(|s| decode_action(&Action::from_value(s), cx)).collect();
            Rc::new(move |data, cx| {
                let mut current = data.clone();
                for step in &decoded {
                    current = step.apply(&current, cx)?;
                }
                Ok(current)
            })
        }
        other => decode_action(&Action::from_value(other), cx).into_fn(),
    }
}

/// Resuelve una acción como combinador binario (para la familia mergeWith*).
/// Solo una acción nombrada de la paleta (con args ligados opcionales) puede
/// aportar los dos argumentos restantes.
pub(crate) fn decode_binary(arg: &Evaluated, cx: &EvalCx<'_>) -> Result<BinaryFn, XformError> {
    let (entry, bound): (&PaletteEntry, Vec<Evaluated>) = match arg {
        Evaluated::Value(Value::String(s)) => {
            let name = action_alias(s);
            let entry = cx.palette.get(name).ok_or(XformError::NotInvokable)?;
            let rest = s[name.len()..].trim();
            let rest = rest.strip_prefix('(').unwrap_or(rest);
            let rest = rest.strip_suffix(')').unwrap_or(rest);
            let bound = literal::parse_args(rest)?.iter().map(|t| evaluate(t, cx)).collect();
            (entry, bound)
        }
        Evaluated::Value(Value::Object(map)) => {
            let action = ObjectAction::from_map(map);
            let entry = action.name
                              .as_deref()
                              .and_then(|n| cx.palette.get(n))
                              .ok_or(XformError::NotInvokable)?;
            let bound = action.params.iter().map(|p| evaluate(p, cx)).collect();
            (entry, bound)
        }
        _ => return Err(XformError::NotInvokable),
    };

    let call = entry.call.clone();
    Ok(Rc::new(move |l, r, cx| {
        let mut full = bound.clone();
        full.push(Evaluated::Value(l.clone()));
        full.push(Evaluated::Value(r.clone()));
        call(&full, cx)
    }))
}

fn bare_capability(entry: &PaletteEntry) -> DecodedFn {
    let call = entry.call.clone();
    Rc::new(move |data, cx| call(&[Evaluated::Value(data.clone())], cx))
}

fn invoke_or_curry(entry: &PaletteEntry,
                   args: Vec<Evaluated>,
                   cx: &EvalCx<'_>)
                   -> Result<Decoded, XformError> {
    if args.len() >= entry.arity {
        return Ok(Decoded::Value((entry.call)(&args, cx)?));
    }
    let call = entry.call.clone();
    Ok(Decoded::Fn(Rc::new(move |data, cx| {
        let mut full = args.clone();
        full.push(Evaluated::Value(data.clone()));
        call(&full, cx)
    })))
}
