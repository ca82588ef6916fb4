//! Constantes del motor.
//!
//! Agrupa los valores estáticos de la gramática de acciones stringy y los
//! textos fijos que aparecen en el trace. La gramática vive aquí para que
//! decoder y renderer compartan exactamente la misma definición de "nombre".

use once_cell::sync::Lazy;
use regex::Regex;

/// Nombre de acción: la corrida alfanumérica/underscore más larga desde la
/// posición 0. Una cadena que no empieza con un carácter válido tiene nombre
/// vacío (y decodifica a identidad).
pub static ALIAS_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_]*").expect("alias regex is valid"));

/// Prefijo de referencia al contexto dentro de parámetros stringy.
pub const CONTEXT_PREFIX: &str = "$.";

/// Prefijo de acción anidada dentro de parámetros stringy.
pub const NESTED_ACTION_PREFIX: &str = "X.";

/// Título de la primera entrada del buffer de ejecución.
pub const ORIGINAL_DATA_TITLE: &str = "Original Data";

/// Descripción por defecto cuando una acción no tiene info registrada.
pub const NO_DESCRIPTION: &str = "No description available.";

/// Nombre mostrado para acciones objeto sin `name` (fn ad hoc).
pub const ANONYMOUS_FN: &str = "_anonymousFn_";

/// Extrae el nombre de una acción stringy (puede ser vacío).
pub fn action_alias(action: &str) -> &str {
    ALIAS_REGEX.find(action).map(|m| m.as_str()).unwrap_or("")
}
