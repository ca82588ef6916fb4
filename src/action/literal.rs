//! Parser de literales para la gramática stringy (sin eval).
//!
//! El resto de una acción stringy tras quitar nombre y paréntesis es una
//! lista de argumentos. Aquí se parte en comas de nivel superior (respetando
//! anidación `[] {} ()` y ambos estilos de comilla) y cada token se parsea
//! como JSON; un token que no es JSON válido degrada a string plano, lo que
//! admite palabras sueltas y literales de regex estilo `/patrón/flags`.

use serde_json::Value;

use crate::errors::XformError;

/// Parsea la lista de argumentos de una acción stringy. Vacío -> sin args.
pub fn parse_args(input: &str) -> Result<Vec<Value>, XformError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    split_top_level(trimmed)?.into_iter().map(|tok| Ok(parse_token(tok))).collect()
}

/// Parsea un token individual: JSON primero, string plano como fallback.
pub fn parse_token(token: &str) -> Value {
    let t = token.trim();
    if let Ok(v) = serde_json::from_str::<Value>(t) {
        return v;
    }
    // strings con comillas simples
    if t.len() >= 2 && t.starts_with('\'') && t.ends_with('\'') {
        return Value::String(t[1..t.len() - 1].to_owned());
    }
    Value::String(t.to_owned())
}

/// Parte en comas de nivel superior. Falla solo ante comillas o brackets sin
/// cerrar, que es el equivalente del throw del eval original.
fn split_top_level(input: &str) -> Result<Vec<&str>, XformError> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut start = 0usize;

    for (idx, ch) in input.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == q {
                quote = None;
            }
            continue;
        }
        match ch {
            '"' | '\'' => quote = Some(ch),
            '[' | '{' | '(' => depth += 1,
            ']' | '}' | ')' => {
                depth = depth.checked_sub(1)
                             .ok_or_else(|| XformError::BadLiteral(input.to_owned()))?;
            }
            ',' if depth == 0 => {
                parts.push(&input[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    if quote.is_some() || depth != 0 {
        return Err(XformError::BadLiteral(input.to_owned()));
    }
    parts.push(&input[start..]);
    Ok(parts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_input_means_no_args() {
        assert_eq!(parse_args("").unwrap(), Vec::<Value>::new());
        assert_eq!(parse_args("  ").unwrap(), Vec::<Value>::new());
    }

    #[test]
    fn json_literals_parse_as_values() {
        assert_eq!(parse_args("2, [1, 2, 3]").unwrap(), vec![json!(2), json!([1, 2, 3])]);
        assert_eq!(parse_args("{\"a\": 1}, true, null").unwrap(),
                   vec![json!({ "a": 1 }), json!(true), Value::Null]);
    }

    #[test]
    fn commas_inside_nesting_and_quotes_do_not_split() {
        assert_eq!(parse_args("\"X.getAvg([1, 2, 3])\", 4").unwrap(),
                   vec![json!("X.getAvg([1, 2, 3])"), json!(4)]);
        assert_eq!(parse_args("[[1, 2], [3, 4]]").unwrap(), vec![json!([[1, 2], [3, 4]])]);
    }

    #[test]
    fn bare_words_degrade_to_strings() {
        assert_eq!(parse_args("$.INTERVAL").unwrap(), vec![json!("$.INTERVAL")]);
        assert_eq!(parse_args("/tcp/i").unwrap(), vec![json!("/tcp/i")]);
        assert_eq!(parse_args("'Others'").unwrap(), vec![json!("Others")]);
    }

    #[test]
    fn unbalanced_input_is_a_bad_literal() {
        assert!(matches!(parse_args("[1, 2"), Err(XformError::BadLiteral(_))));
        assert!(matches!(parse_args("\"abc"), Err(XformError::BadLiteral(_))));
        assert!(matches!(parse_args("1]"), Err(XformError::BadLiteral(_))));
    }
}
