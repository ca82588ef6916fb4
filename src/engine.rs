//! El executor: corre queries y pipes dejando un trace paso a paso.
//!
//! Rol en el flujo:
//! - Una query es un mapa nombre -> pipe; cada pipe recibe el mismo dato de
//!   entrada y corre de forma independiente.
//! - Cada corrida produce un `ExecutionResult`: el resultado final más un
//!   buffer con una entrada por paso, encabezado por el dato original. El
//!   buffer siempre tiene largo `pipe.len() + 1`.
//! - Un paso que falla se registra con `log::error!` y arrastra el resultado
//!   del paso anterior, tanto al buffer como a los pasos siguientes; la
//!   corrida nunca aborta.
//!
//! La paleta y el contexto viven en la instancia del engine: dos engines no
//! comparten estado.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::action::decode::{decode_pipe, EvalCx};
use crate::action::{parse_pipe, render, Action};
use crate::constants::ORIGINAL_DATA_TITLE;
use crate::context::Context;
use crate::palette::Palette;

/// Query: pipes con nombre, todos alimentados con el mismo dato.
pub type Query = IndexMap<String, Vec<Action>>;

/// Una entrada del trace: el título del paso, el dato que produjo y su
/// descripción. La entrada inicial (dato original) no lleva descripción.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEntry {
    pub title: String,
    pub data: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,
}

/// Resultado de correr un pipe: el valor final y el buffer paso a paso.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub buffer: Vec<TraceEntry>,
    pub result: Value,
}

/// Lee una query desde su forma JSON (objeto nombre -> pipe). Cualquier otra
/// forma produce una query vacía.
pub fn parse_query(value: &Value) -> Query {
    match value {
        Value::Object(map) => map.iter().map(|(k, v)| (k.clone(), parse_pipe(v))).collect(),
        _ => Query::new(),
    }
}

pub struct XformEngine {
    palette: Palette,
    context: Context,
}

impl XformEngine {
    pub fn new() -> Self {
        Self { palette: Palette::standard(), context: Context::new() }
    }

    pub fn with_palette(palette: Palette) -> Self {
        Self { palette, context: Context::new() }
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn palette_mut(&mut self) -> &mut Palette {
        &mut self.palette
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Aplica un patch shallow al contexto (`$.KEY` resuelve contra él).
    pub fn set_context(&mut self, patch: &Value) {
        self.context.merge_value(patch);
    }

    /// Corre todos los pipes de la query sobre el mismo dato.
    pub fn execute(&self, query: &Query, data: &Value) -> IndexMap<String, ExecutionResult> {
        query.iter().map(|(name, pipe)| (name.clone(), self.execute_pipe(pipe, data))).collect()
    }

    /// Merge del patch de contexto y ejecución en un solo paso.
    pub fn execute_with_context(&mut self,
                                query: &Query,
                                data: &Value,
                                patch: &Value)
                                -> IndexMap<String, ExecutionResult> {
        self.set_context(patch);
        self.execute(query, data)
    }

    /// Como `execute`, entregando además el resultado completo a un callback.
    pub fn execute_with_dispatch<F>(&self,
                                    query: &Query,
                                    data: &Value,
                                    dispatch: F)
                                    -> IndexMap<String, ExecutionResult>
        where F: FnOnce(&IndexMap<String, ExecutionResult>)
    {
        let results = self.execute(query, data);
        dispatch(&results);
        results
    }

    /// Corre un pipe dejando el trace completo.
    pub fn execute_pipe(&self, pipe: &[Action], data: &Value) -> ExecutionResult {
        let cx = EvalCx { palette: &self.palette, context: &self.context };
        let decoded = decode_pipe(pipe, &cx);

        let mut buffer = Vec::with_capacity(pipe.len() + 1);
        buffer.push(TraceEntry { title: ORIGINAL_DATA_TITLE.to_owned(),
                                 data: data.clone(),
                                 info: None });

        let mut result = data.clone();
        for (idx, (action, step)) in pipe.iter().zip(&decoded).enumerate() {
            let title = render::action_name(action);
            let info = render::action_info(action, &self.palette);
            match step.apply(&result, &cx) {
                Ok(next) => result = next,
                // el paso fallido arrastra el resultado anterior
                Err(err) => log::error!(
                    "failed to perform action {title:?} (step {idx}): {err}; \
                     carrying forward {result}"
                ),
            }
            buffer.push(TraceEntry { title, data: result.clone(), info: Some(info) });
        }
        ExecutionResult { buffer, result }
    }
}

impl Default for XformEngine {
    fn default() -> Self {
        Self::new()
    }
}
