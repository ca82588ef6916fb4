//! Errores del motor (simples por ahora).
//!
//! Ninguno de estos errores es fatal para el Query Runner: los errores de
//! decodificación se recuperan localmente (identidad / acción original) y los
//! errores de ejecución se recuperan por step dentro del executor.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub enum XformError {
    #[error("bad literal: {0}")]
    BadLiteral(String),
    #[error("bad regex: {0}")]
    BadRegex(String),
    #[error("value is not invokable")]
    NotInvokable,
    #[error("type mismatch: expected {0}")]
    TypeMismatch(String),
    #[error("internal: {0}")]
    Internal(String),
}
