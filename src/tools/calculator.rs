//! Calculator tool
//!
//! Evaluates arithmetic with `+ - * /`, unary signs, parentheses and
//! decimal literals.

use async_trait::async_trait;

use crate::core::{Result, ToolCall, WorldsmithError};
use crate::tools::registry::Tool;
use crate::tools::schema::{ArgSchema, ArgType};

/// Tool for evaluating arithmetic expressions
#[derive(Debug, Clone, Default)]
pub struct CalculatorTool;

impl CalculatorTool {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Tool for CalculatorTool {
    fn name(&self) -> &str {
        "calculator"
    }

    fn description(&self) -> &str {
        "Evaluate an arithmetic expression such as '2 + 2' or '(5 * 10) / 4'"
    }

    fn schema(&self) -> ArgSchema {
        ArgSchema::new().required("expression", ArgType::String, "The expression to evaluate")
    }

    async fn invoke(&self, call: &ToolCall) -> Result<String> {
        let expression = call.get_string("expression").unwrap_or_default();
        let value = evaluate(&expression).map_err(|e| WorldsmithError::tool(self.name(), e))?;
        Ok(format_number(value))
    }
}

/// Evaluate an expression to a finite number
pub fn evaluate(expression: &str) -> std::result::Result<f64, String> {
    let mut parser = Parser {
        chars: expression.chars().filter(|c| !c.is_whitespace()).collect(),
        pos: 0,
        depth: 0,
    };

    if parser.chars.is_empty() {
        return Err("empty expression".to_string());
    }

    let value = parser.expr()?;
    if let Some(c) = parser.peek() {
        return Err(format!("unexpected '{}' at position {}", c, parser.pos));
    }
    if !value.is_finite() {
        return Err("result is not a finite number".to_string());
    }
    Ok(value)
}

/// Print whole numbers without a fractional part
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Deepest nesting of signs and parentheses accepted
const MAX_DEPTH: usize = 256;

struct Parser {
    chars: Vec<char>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        self.pos += 1;
        c
    }

    // expr := term (('+' | '-') term)*
    fn expr(&mut self) -> std::result::Result<f64, String> {
        let mut value = self.term()?;
        while let Some(op @ ('+' | '-')) = self.peek() {
            self.pos += 1;
            let rhs = self.term()?;
            value = if op == '+' { value + rhs } else { value - rhs };
        }
        Ok(value)
    }

    // term := factor (('*' | '/') factor)*
    fn term(&mut self) -> std::result::Result<f64, String> {
        let mut value = self.factor()?;
        while let Some(op @ ('*' | '/')) = self.peek() {
            self.pos += 1;
            let rhs = self.factor()?;
            if op == '*' {
                value *= rhs;
            } else {
                if rhs == 0.0 {
                    return Err("division by zero".to_string());
                }
                value /= rhs;
            }
        }
        Ok(value)
    }

    // factor := ('+' | '-') factor | number | '(' expr ')'
    fn factor(&mut self) -> std::result::Result<f64, String> {
        if self.depth >= MAX_DEPTH {
            return Err("expression nested too deeply".to_string());
        }
        self.depth += 1;
        let value = self.unary();
        self.depth -= 1;
        value
    }

    fn unary(&mut self) -> std::result::Result<f64, String> {
        match self.peek() {
            Some('-') => {
                self.pos += 1;
                Ok(-self.factor()?)
            }
            Some('+') => {
                self.pos += 1;
                self.factor()
            }
            Some('(') => {
                self.pos += 1;
                let value = self.expr()?;
                match self.bump() {
                    Some(')') => Ok(value),
                    _ => Err("missing closing parenthesis".to_string()),
                }
            }
            Some(c) if c.is_ascii_digit() || c == '.' => self.number(),
            Some(c) => Err(format!("unexpected '{}' at position {}", c, self.pos)),
            None => Err("unexpected end of expression".to_string()),
        }
    }

    fn number(&mut self) -> std::result::Result<f64, String> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit() || c == '.') {
            self.pos += 1;
        }
        let literal: String = self.chars[start..self.pos].iter().collect();
        literal
            .parse::<f64>()
            .map_err(|_| format!("invalid number '{}'", literal))
    }
}
