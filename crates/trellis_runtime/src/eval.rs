//! Expression evaluation.
//!
//! Directive bodies reference input data through `this`-rooted paths.
//! The [`Evaluator`] trait is the seam between the render program and
//! host code: expression contexts (interpolation, escaping, include
//! params) and raw evaluate blocks both go through it. The default
//! [`PathEvaluator`] interprets paths, literals, and flat object
//! literals; it has no statement semantics, so evaluate blocks fail
//! unless a custom evaluator is supplied via render options.

use serde_json::{Map, Value};

use crate::error::{RuntimeError, RuntimeResult};

/// Evaluates directive bodies against the render's input data.
pub trait Evaluator {
    /// Evaluate an expression to a value.
    fn expression(&self, code: &str, data: Option<&Value>) -> RuntimeResult<Value>;

    /// Execute a raw host-code block, appending any output to `out`.
    fn block(&self, code: &str, data: Option<&Value>, out: &mut String) -> RuntimeResult<()> {
        let _ = (data, out);
        Err(RuntimeError::HostCode(code.trim().to_string()))
    }
}

/// Render an evaluated value into markup text.
///
/// `null` renders as the empty string; structured values render as
/// compact JSON.
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

/// The default evaluator: `this`-rooted paths with dotted fields,
/// subscripts and `.length`, plus string/number/bool/null literals and
/// flat `{ key: expr }` object literals.
///
/// Missing path segments resolve to `null` rather than failing.
#[derive(Debug, Default, Clone, Copy)]
pub struct PathEvaluator;

impl Evaluator for PathEvaluator {
    fn expression(&self, code: &str, data: Option<&Value>) -> RuntimeResult<Value> {
        let mut cursor = Cursor {
            input: code,
            pos: 0,
        };
        let value = cursor.parse_value(data)?;
        cursor.skip_ws();
        if !cursor.at_end() {
            return Err(RuntimeError::Expression(format!(
                "trailing input in expression: {}",
                code.trim()
            )));
        }
        Ok(value)
    }
}

struct Cursor<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(|c| c.is_whitespace()) {
            self.bump();
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn fail(&self, message: &str) -> RuntimeError {
        RuntimeError::Expression(format!("{message}: {}", self.input.trim()))
    }

    fn read_ident(&mut self) -> &'a str {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            self.bump();
        }
        &self.input[start..self.pos]
    }

    fn parse_value(&mut self, data: Option<&Value>) -> RuntimeResult<Value> {
        self.skip_ws();
        match self.peek() {
            None => Err(self.fail("empty expression")),
            Some('\'' | '"') => self.parse_quoted(),
            Some('{') => self.parse_object(data),
            Some(c) if c.is_ascii_digit() || c == '-' => self.parse_number(),
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {
                let word = self.read_ident();
                match word {
                    "true" => Ok(Value::Bool(true)),
                    "false" => Ok(Value::Bool(false)),
                    "null" => Ok(Value::Null),
                    "this" => self.parse_path(data),
                    _ => Err(self.fail("unsupported identifier")),
                }
            }
            Some(_) => Err(self.fail("unsupported expression")),
        }
    }

    fn parse_quoted(&mut self) -> RuntimeResult<Value> {
        let quote = self.bump().ok_or_else(|| self.fail("empty expression"))?;
        let mut text = String::new();
        loop {
            match self.bump() {
                None => return Err(self.fail("unterminated string literal")),
                Some('\\') => match self.bump() {
                    None => return Err(self.fail("unterminated string literal")),
                    Some(escaped) => text.push(escaped),
                },
                Some(c) if c == quote => return Ok(Value::String(text)),
                Some(c) => text.push(c),
            }
        }
    }

    fn parse_number(&mut self) -> RuntimeResult<Value> {
        let start = self.pos;
        if self.peek() == Some('-') {
            self.bump();
        }
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_digit() || c == '.' || c == 'e' || c == 'E')
        {
            self.bump();
        }
        let text = &self.input[start..self.pos];
        if let Ok(int) = text.parse::<i64>() {
            return Ok(Value::from(int));
        }
        let float: f64 = text
            .parse()
            .map_err(|_| self.fail("malformed number literal"))?;
        serde_json::Number::from_f64(float)
            .map(Value::Number)
            .ok_or_else(|| self.fail("malformed number literal"))
    }

    fn parse_object(&mut self, data: Option<&Value>) -> RuntimeResult<Value> {
        self.bump();
        let mut map = Map::new();
        self.skip_ws();
        if self.eat('}') {
            return Ok(Value::Object(map));
        }
        loop {
            self.skip_ws();
            let key = match self.peek() {
                Some('\'' | '"') => match self.parse_quoted()? {
                    Value::String(key) => key,
                    _ => return Err(self.fail("malformed object key")),
                },
                _ => {
                    let key = self.read_ident();
                    if key.is_empty() {
                        return Err(self.fail("malformed object key"));
                    }
                    key.to_string()
                }
            };
            self.skip_ws();
            if !self.eat(':') {
                return Err(self.fail("expected `:` in object literal"));
            }
            let value = self.parse_value(data)?;
            map.insert(key, value);
            self.skip_ws();
            if self.eat(',') {
                continue;
            }
            if self.eat('}') {
                return Ok(Value::Object(map));
            }
            return Err(self.fail("expected `,` or `}` in object literal"));
        }
    }

    fn parse_path(&mut self, data: Option<&Value>) -> RuntimeResult<Value> {
        let mut current = data.cloned().unwrap_or(Value::Null);
        loop {
            if self.eat('.') {
                let field = self.read_ident();
                if field.is_empty() {
                    return Err(self.fail("expected field name after `.`"));
                }
                current = access_field(&current, field);
            } else if self.peek() == Some('[') {
                self.bump();
                let index = self.parse_value(data)?;
                self.skip_ws();
                if !self.eat(']') {
                    return Err(self.fail("unterminated subscript"));
                }
                current = access_index(&current, &index);
            } else {
                return Ok(current);
            }
        }
    }
}

fn access_field(value: &Value, name: &str) -> Value {
    match value {
        Value::Object(map) => map.get(name).cloned().unwrap_or(Value::Null),
        Value::Array(items) if name == "length" => Value::from(items.len() as u64),
        Value::String(s) if name == "length" => Value::from(s.chars().count() as u64),
        _ => Value::Null,
    }
}

fn access_index(value: &Value, index: &Value) -> Value {
    match (value, index) {
        (Value::Array(items), Value::Number(n)) => n
            .as_u64()
            .and_then(|i| items.get(i as usize))
            .cloned()
            .unwrap_or(Value::Null),
        (Value::Object(map), Value::String(key)) => {
            map.get(key).cloned().unwrap_or(Value::Null)
        }
        (Value::Object(map), Value::Number(n)) => {
            map.get(&n.to_string()).cloned().unwrap_or(Value::Null)
        }
        _ => Value::Null,
    }
}
