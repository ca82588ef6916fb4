//! Modelo de datos de las acciones y su forma de cable JSON.
//!
//! Una `Action` describe un paso de transformación en una de tres formas:
//! - `Stringy`: `"getRate(2, [1,2,3])"` (paréntesis y args opcionales);
//! - `Object`: `{ name, params?, info? }`, más un callable ad hoc opcional
//!   que no forma parte del formato de cable;
//! - `Combo`: lista de acciones aplicadas en yuxtaposición al mismo input.
//!
//! `from_value`/`to_value` definen el formato con el que las queries se
//! persisten y transmiten.

pub mod decode;
pub mod literal;
pub mod render;

use std::fmt;
use std::rc::Rc;

use serde_json::{Map, Value};

use crate::errors::XformError;
use self::decode::{EvalCx, Evaluated};

/// Callable ad hoc para acciones objeto sin entrada en la paleta. Misma forma
/// que una capability registrada; no es serializable.
pub type AdHocFn = Rc<dyn Fn(&[Evaluated], &EvalCx<'_>) -> Result<Value, XformError>>;

#[derive(Clone)]
pub enum Action {
    Stringy(String),
    Object(ObjectAction),
    Combo(Vec<Action>),
}

#[derive(Clone, Default)]
pub struct ObjectAction {
    pub name: Option<String>,
    pub params: Vec<Value>,
    pub info: Option<String>,
    pub func: Option<AdHocFn>,
}

impl ObjectAction {
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: Some(name.into()), ..Self::default() }
    }

    pub fn with_params(name: impl Into<String>, params: Vec<Value>) -> Self {
        Self { name: Some(name.into()), params, ..Self::default() }
    }

    pub(crate) fn from_map(map: &Map<String, Value>) -> Self {
        let params = match map.get("params") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items.clone(),
            // un único parámetro suelto se acepta envuelto
            Some(other) => vec![other.clone()],
        };
        Self { name: map.get("name").and_then(Value::as_str).map(str::to_owned),
               params,
               info: map.get("info").and_then(Value::as_str).map(str::to_owned),
               func: None }
    }
}

impl fmt::Debug for ObjectAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectAction")
         .field("name", &self.name)
         .field("params", &self.params)
         .field("info", &self.info)
         .field("func", &self.func.as_ref().map(|_| "<fn>"))
         .finish()
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Stringy(s) => write!(f, "Stringy({s:?})"),
            Action::Object(o) => o.fmt(f),
            Action::Combo(list) => f.debug_list().entries(list).finish(),
        }
    }
}

impl Action {
    /// Lee una acción desde su forma JSON: string -> Stringy, array -> Combo,
    /// objeto -> Object. Otros escalares se tratan como stringy (y decodifican
    /// a identidad al no resolver en la paleta).
    pub fn from_value(value: &Value) -> Action {
        match value {
            Value::String(s) => Action::Stringy(s.clone()),
            Value::Array(items) => Action::Combo(items.iter().map(Action::from_value).collect()),
            Value::Object(map) => Action::Object(ObjectAction::from_map(map)),
            other => Action::Stringy(other.to_string()),
        }
    }

    /// Forma JSON de la acción; el callable ad hoc se omite (no es
    /// serializable).
    pub fn to_value(&self) -> Value {
        match self {
            Action::Stringy(s) => Value::String(s.clone()),
            Action::Combo(list) => Value::Array(list.iter().map(Action::to_value).collect()),
            Action::Object(o) => {
                let mut map = Map::new();
                if let Some(name) = &o.name {
                    map.insert("name".into(), Value::String(name.clone()));
                }
                if !o.params.is_empty() {
                    map.insert("params".into(), Value::Array(o.params.clone()));
                }
                if let Some(info) = &o.info {
                    map.insert("info".into(), Value::String(info.clone()));
                }
                Value::Object(map)
            }
        }
    }
}

impl From<&str> for Action {
    fn from(s: &str) -> Self {
        Action::Stringy(s.to_owned())
    }
}

impl From<ObjectAction> for Action {
    fn from(o: ObjectAction) -> Self {
        Action::Object(o)
    }
}

/// Lee un pipe (lista ordenada de acciones) desde JSON.
pub fn parse_pipe(value: &Value) -> Vec<Action> {
    match value {
        Value::Array(items) => items.iter().map(Action::from_value).collect(),
        other => vec![Action::from_value(other)],
    }
}
