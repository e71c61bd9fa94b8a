use thiserror::Error;

/// An expression evaluation failure. Only the message is ever shown to the model.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct EvaluatorError {
    message: String,
}

impl EvaluatorError {
    pub fn new<S: Into<String>>(message: S) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<evalexpr::EvalexprError> for EvaluatorError {
    fn from(err: evalexpr::EvalexprError) -> Self {
        EvaluatorError::new(err.to_string())
    }
}

/// Evaluates arithmetic expressions for the `Calculator` action
pub trait Evaluator: Send + Sync {
    fn evaluate(&self, expression: &str) -> Result<f64, EvaluatorError>;

    /// Appended to the tool description so the model writes expressions this evaluator accepts
    fn syntax_hint(&self) -> &str {
        "Write a plain arithmetic expression, eg: 2 + 2"
    }
}

/// Evaluator backed by `evalexpr`.
///
/// Supports `+ - * / % ^`, parentheses and the `math::` builtins. Every number
/// literal is read as a float, so `7 / 2` is `3.5`. Infinite and NaN results are
/// reported as errors.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExpressionEvaluator;

impl ExpressionEvaluator {
    pub fn new() -> Self {
        Self
    }
}

impl Evaluator for ExpressionEvaluator {
    fn evaluate(&self, expression: &str) -> Result<f64, EvaluatorError> {
        let value = evalexpr::eval_number(&float_literals(expression.trim()))?;
        if !value.is_finite() {
            return Err(EvaluatorError::new(format!(
                "`{}` does not evaluate to a finite number",
                expression.trim()
            )));
        }
        Ok(value)
    }

    fn syntax_hint(&self) -> &str {
        "Use evalexpr syntax, eg: 2 + 2 or math::sqrt(2)"
    }
}

/// Rewrite integer literals as float literals (`7` becomes `7.0`).
///
/// evalexpr keeps integer operands as integers, which truncates division. Digits that
/// are part of an identifier (`log2`) or a string literal are left alone.
fn float_literals(expression: &str) -> String {
    let chars: Vec<char> = expression.chars().collect();
    let mut out = String::with_capacity(expression.len() + 8);
    let mut in_string = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if in_string {
            out.push(c);
            if c == '\\' && i + 1 < chars.len() {
                out.push(chars[i + 1]);
                i += 1;
            } else if c == '"' {
                in_string = false;
            }
            i += 1;
            continue;
        }
        if c == '"' {
            in_string = true;
            out.push(c);
            i += 1;
            continue;
        }

        let after_word = i > 0 && {
            let prev = chars[i - 1];
            prev.is_alphanumeric() || prev == '_' || prev == '.'
        };
        let starts_literal = c.is_ascii_digit() && !after_word;
        if !starts_literal {
            out.push(c);
            i += 1;
            continue;
        }

        let start = i;
        while i < chars.len() && chars[i].is_ascii_digit() {
            i += 1;
        }
        let mut is_float = false;
        if i < chars.len() && chars[i] == '.' {
            is_float = true;
            i += 1;
            while i < chars.len() && chars[i].is_ascii_digit() {
                i += 1;
            }
        }
        if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
            let mut j = i + 1;
            if j < chars.len() && (chars[j] == '+' || chars[j] == '-') {
                j += 1;
            }
            if j < chars.len() && chars[j].is_ascii_digit() {
                is_float = true;
                i = j;
                while i < chars.len() && chars[i].is_ascii_digit() {
                    i += 1;
                }
            }
        }

        out.extend(&chars[start..i]);
        let glued_to_identifier =
            i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_');
        if !is_float && !glued_to_identifier {
            out.push_str(".0");
        }
    }
    out
}

/// Render a number the way observations report it, always with a fractional part (`4.0`)
pub fn format_number(value: f64) -> String {
    format!("{:?}", value)
}
