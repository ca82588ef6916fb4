//! xformer: motor embebido de queries de transformación sobre datos JSON.
//!
//! Una query describe pipes de acciones con nombre; cada acción resuelve
//! contra una paleta de capabilities y el executor corre los pipes dejando
//! un trace paso a paso. Las acciones se escriben como strings
//! (`"getRate(2, [1, 2, 3])"`), objetos (`{ "name": "getRate", "params":
//! [2] }`) o listas (yuxtaposición), y los parámetros admiten referencias al
//! contexto (`$.KEY`) y acciones anidadas (`X.accion(...)`).
//!
//! Diseño general:
//! - `action`: modelo de datos, parser de literales, decoder y renderizado.
//! - `palette`: la tabla de capabilities y sus implementaciones.
//! - `engine`: el executor con su buffer de trazas.
//! - `numeric`: coerción junk-tolerante compartida por toda la paleta.
//!
//! Política de fallos: decodificar nunca lanza (nombres desconocidos degradan
//! a identidad) y un paso que falla en ejecución arrastra el resultado
//! anterior en lugar de abortar la corrida.

pub mod action;
pub mod constants;
pub mod context;
pub mod engine;
pub mod errors;
pub mod numeric;
pub mod palette;

pub use action::decode::{decode_action, decode_pipe, decode_stringy_action, evaluate, Decoded,
                         DecodedFn, EvalCx, Evaluated};
pub use action::render::{action_info, action_name};
pub use action::{parse_pipe, AdHocFn, Action, ObjectAction};
pub use context::Context;
pub use engine::{parse_query, ExecutionResult, Query, TraceEntry, XformEngine};
pub use errors::XformError;
pub use palette::{Palette, PaletteEntry};
