//! Contexto de ejecución: la bolsa clave/valor que resuelve tokens `$.KEY`.
//!
//! Rol en el flujo:
//! - El decoder consulta el contexto únicamente al resolver parámetros con
//!   prefijo `$.`.
//! - El contexto vive en la instancia del engine y se pasa por referencia a
//!   cada llamada de decodificación: no hay estado global de proceso, dos
//!   engines no pueden interferir entre sí.
//! - Semántica de merge: shallow, última escritura gana, aplicado al inicio
//!   de cada `execute`/`execute_pipe`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Context {
    inner: IndexMap<String, Value>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Construye un contexto desde un objeto JSON; cualquier otro valor
    /// produce un contexto vacío.
    pub fn from_value(patch: &Value) -> Self {
        let mut ctx = Self::new();
        ctx.merge_value(patch);
        ctx
    }

    /// Merge shallow: las claves de `patch` sobreescriben las existentes.
    pub fn merge_value(&mut self, patch: &Value) {
        if let Value::Object(map) = patch {
            for (k, v) in map {
                self.inner.insert(k.clone(), v.clone());
            }
        }
    }

    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.inner.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.inner.get(key)
    }

    /// Resuelve una clave de contexto; un miss resuelve a Null, que los
    /// helpers numéricos downstream tratan como junk -> 0.
    pub fn resolve(&self, key: &str) -> Value {
        self.inner.get(key).cloned().unwrap_or(Value::Null)
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }
}
