//! Coerción numérica segura y aritmética que degrada en vez de fallar.
//!
//! Rol en el flujo:
//! - Toda la paleta numérica pasa por `default_to`: un operando que no puede
//!   coercionarse a número finito ("junk") degrada a un elemento neutro en
//!   lugar de propagar un error.
//! - La coerción sigue la semántica de `parseFloat`: un string se convierte
//!   tomando el prefijo numérico más largo ("3px" -> 3.0).
//! - Ninguna función de este módulo falla ni muta su entrada.

use serde_json::Value;

/// Coerciona un `Value` a f64 con semántica parseFloat. Devuelve NaN cuando
/// no hay prefijo numérico (null, bool, array, object, string no numérico).
pub fn to_float(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => parse_float_prefix(s),
        _ => f64::NAN,
    }
}

/// Prefijo numérico más largo de un string, como `parseFloat`.
/// Acepta signo, parte decimal, exponente e `Infinity`.
fn parse_float_prefix(input: &str) -> f64 {
    let s = input.trim_start();
    let bytes = s.as_bytes();
    let mut i = 0;

    let neg = match bytes.first() {
        Some(b'-') => {
            i += 1;
            true
        }
        Some(b'+') => {
            i += 1;
            false
        }
        _ => false,
    };

    if s[i..].starts_with("Infinity") {
        return if neg { f64::NEG_INFINITY } else { f64::INFINITY };
    }

    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let mut end = i;
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        end = i;
    }
    if end == int_start || (end == int_start + 1 && bytes[int_start] == b'.') {
        return f64::NAN;
    }
    // exponente opcional, solo si está completo
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        let digits_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > digits_start {
            end = j;
        }
    }

    s[..end].parse::<f64>().unwrap_or(f64::NAN)
}

/// true sii la coerción de `value` produce NaN o ±Infinity.
pub fn is_junk(value: &Value) -> bool {
    !to_float(value).is_finite()
}

/// Devuelve `fallback` si `value` es junk, si no el número coercionado.
pub fn default_to(fallback: f64, value: &Value) -> f64 {
    let f = to_float(value);
    if f.is_finite() {
        f
    } else {
        fallback
    }
}

pub fn default_to_zero(value: &Value) -> f64 {
    default_to(0.0, value)
}

/// Variante de `default_to` que conserva el fallback tal cual (para
/// `defaultAll`, donde el fallback puede ser cualquier JSON, p.ej. "N/A").
pub fn default_or_value(fallback: &Value, value: &Value) -> Value {
    let f = to_float(value);
    if f.is_finite() {
        num(f)
    } else {
        fallback.clone()
    }
}

pub fn be_positive(value: &Value) -> f64 {
    default_to_zero(value).abs()
}

/// Convierte un f64 a `Value`. Los enteros exactos se emiten como enteros
/// JSON para que comparen igual que los literales; los no finitos son Null.
pub fn num(f: f64) -> Value {
    if !f.is_finite() {
        return Value::Null;
    }
    if f.fract() == 0.0 && f.abs() < 9.0e15 {
        Value::from(f as i64)
    } else {
        Value::from(f)
    }
}

pub fn add(l: &Value, r: &Value) -> Value {
    num(default_to_zero(l) + default_to_zero(r))
}

pub fn subtract(l: &Value, r: &Value) -> Value {
    num(default_to_zero(l) - default_to_zero(r))
}

pub fn multiply(l: &Value, r: &Value) -> Value {
    num(default_to_zero(l) * default_to_zero(r))
}

/// El denominador junk degrada a 1, no a 0.
pub fn divide(l: &Value, r: &Value) -> Value {
    num(default_to_zero(l) / default_to(1.0, r))
}

pub fn max(l: &Value, r: &Value) -> Value {
    num(default_to_zero(l).max(default_to_zero(r)))
}

pub fn min(l: &Value, r: &Value) -> Value {
    num(default_to_zero(l).min(default_to_zero(r)))
}

/// Combinador de merge que se queda con el valor más reciente (coercionado).
pub fn keep_latest(_l: &Value, r: &Value) -> Value {
    num(default_to_zero(r))
}

/// Suma junk-tolerante de una secuencia de valores.
pub fn sum_iter<'a>(values: impl Iterator<Item = &'a Value>) -> f64 {
    values.map(default_to_zero).sum()
}

/// Promedio ignorando valores junk; vacío -> 0.
pub fn average<'a>(values: impl Iterator<Item = &'a Value>) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;
    for v in values {
        let f = to_float(v);
        if f.is_finite() {
            sum += f;
            count += 1;
        }
    }
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Porcentaje de memoria usada a partir de la fracción libre:
/// `100 * (1 - clamp(x, 0, 1))`. Un valor junk cuenta como 1 (0% usado).
pub fn used_memory_single(value: &Value) -> Value {
    let free = default_to(1.0, value).clamp(0.0, 1.0);
    num(100.0 * (1.0 - free))
}

/// Orden parcial entre valores: numérico cuando ambos coercionan a número
/// finito, lexicográfico cuando ambos son strings, incomparables si no.
pub fn compare(l: &Value, r: &Value) -> Option<std::cmp::Ordering> {
    let (lf, rf) = (to_float(l), to_float(r));
    if lf.is_finite() && rf.is_finite() {
        return lf.partial_cmp(&rf);
    }
    if let (Value::String(ls), Value::String(rs)) = (l, r) {
        return Some(ls.cmp(rs));
    }
    None
}

/// true para null, string vacío, array vacío u objeto vacío.
pub fn is_nothing(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(m) => m.is_empty(),
        _ => false,
    }
}

pub fn is_something(value: &Value) -> bool {
    !is_nothing(value)
}

/// Truthiness estilo JS para resultados de predicados.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
