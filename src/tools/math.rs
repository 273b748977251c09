//! `calculate_math`: arithmetic over a list of numbers or a single expression.

use async_trait::async_trait;
use serde_json::{json, Value};

use super::expression;
use crate::capability::{CapabilityDescriptor, CapabilityResult, ToolHandler};
use crate::error::HandlerError;

/// Operations accepted by the `operation` argument.
pub const OPERATIONS: [&str; 7] = [
    "add",
    "subtract",
    "multiply",
    "divide",
    "power",
    "sqrt",
    "factorial",
];

/// Largest integer that fits a factorial in an `f64`.
const MAX_FACTORIAL: f64 = 170.0;

/// The math tool.
#[derive(Debug, Default)]
pub struct MathTool;

#[async_trait]
impl ToolHandler for MathTool {
    fn descriptor(&self) -> CapabilityDescriptor {
        CapabilityDescriptor::new(
            "calculate_math",
            "Perform mathematical calculations and operations",
        )
        .with_schema(json!({
            "type": "object",
            "properties": {
                "operation": {
                    "type": "string",
                    "enum": OPERATIONS,
                    "description": "Mathematical operation to perform"
                },
                "numbers": {
                    "type": "array",
                    "items": { "type": "number" },
                    "description": "Numbers to operate on"
                },
                "expression": {
                    "type": "string",
                    "pattern": "^[0-9+\\-*/.() ]+$",
                    "description": "Mathematical expression to evaluate (alternative to operation+numbers)"
                }
            },
            "oneOf": [
                { "required": ["operation", "numbers"] },
                { "required": ["expression"] }
            ]
        }))
    }

    async fn invoke(&self, arguments: Value) -> Result<CapabilityResult, HandlerError> {
        tracing::debug!(arguments = %arguments, "Executing math tool");

        if let Some(expression) = arguments.get("expression").and_then(Value::as_str) {
            return evaluate_expression(expression);
        }

        let operation = arguments
            .get("operation")
            .and_then(Value::as_str)
            .ok_or_else(|| HandlerError::new("Missing required parameter: operation"))?;
        let raw_numbers = arguments
            .get("numbers")
            .and_then(Value::as_array)
            .ok_or_else(|| HandlerError::new("Missing required parameter: numbers"))?;

        if raw_numbers.is_empty() {
            return Err(HandlerError::new("Numbers array cannot be empty"));
        }

        let numbers = raw_numbers
            .iter()
            .map(Value::as_f64)
            .collect::<Option<Vec<f64>>>()
            .ok_or_else(|| HandlerError::new("Numbers array must contain only numbers"))?;

        let result = finite(perform_operation(operation, &numbers)?)?;
        let listed: Vec<String> = raw_numbers.iter().map(Value::to_string).collect();

        Ok(CapabilityResult::success(
            json!({
                "operation": operation,
                "numbers": raw_numbers,
                "result": number_value(result),
                "formatted": format!("{operation}({}) = {result}", listed.join(", ")),
            }),
            format!("Successfully calculated {operation}"),
        ))
    }
}

fn evaluate_expression(expression: &str) -> Result<CapabilityResult, HandlerError> {
    let result = expression::evaluate(expression)
        .map_err(|e| HandlerError::new(format!("Invalid expression: {e}")))?;
    let result = finite(result)?;

    Ok(CapabilityResult::success(
        json!({
            "expression": expression,
            "result": number_value(result),
            "formatted": format!("{expression} = {result}"),
        }),
        "Expression evaluated successfully",
    ))
}

/// Applies `operation` to a non-empty list of numbers.
fn perform_operation(operation: &str, numbers: &[f64]) -> Result<f64, HandlerError> {
    match operation {
        "add" => Ok(numbers.iter().sum()),
        "subtract" => Ok(fold_first(numbers, |acc, n| acc - n)),
        "multiply" => Ok(numbers.iter().product()),
        "divide" => {
            // A zero dividend is fine; any zero divisor is not.
            if numbers.iter().skip(1).any(|&n| n == 0.0) {
                return Err(HandlerError::new("Cannot divide by zero"));
            }
            Ok(fold_first(numbers, |acc, n| acc / n))
        }
        "power" => match numbers {
            [base, exponent] => Ok(base.powf(*exponent)),
            _ => Err(HandlerError::new(
                "Power operation requires exactly 2 numbers",
            )),
        },
        "sqrt" => match numbers {
            [n] if *n < 0.0 => Err(HandlerError::new(
                "Cannot calculate square root of negative number",
            )),
            [n] => Ok(n.sqrt()),
            _ => Err(HandlerError::new("Square root requires exactly 1 number")),
        },
        "factorial" => match numbers {
            [n] => factorial(*n),
            _ => Err(HandlerError::new("Factorial requires exactly 1 number")),
        },
        other => Err(HandlerError::new(format!("Unknown operation: {other}"))),
    }
}

fn fold_first(numbers: &[f64], f: impl Fn(f64, f64) -> f64) -> f64 {
    numbers
        .split_first()
        .map_or(0.0, |(first, rest)| rest.iter().fold(*first, |acc, &n| f(acc, n)))
}

fn factorial(n: f64) -> Result<f64, HandlerError> {
    if n < 0.0 || n.fract() != 0.0 {
        return Err(HandlerError::new(
            "Factorial requires a non-negative integer",
        ));
    }
    if n > MAX_FACTORIAL {
        return Err(HandlerError::new(format!(
            "Factorial input too large (maximum {MAX_FACTORIAL})"
        )));
    }
    Ok((2..=n as u32).map(f64::from).product())
}

fn finite(result: f64) -> Result<f64, HandlerError> {
    if result.is_finite() {
        Ok(result)
    } else {
        Err(HandlerError::new("Result is not a finite number"))
    }
}

/// Renders whole results as JSON integers, everything else as floats.
fn number_value(n: f64) -> Value {
    const SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;
    if n.fract() == 0.0 && n.abs() <= SAFE_INTEGER {
        json!(n as i64)
    } else {
        json!(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn run(arguments: Value) -> Result<CapabilityResult, HandlerError> {
        MathTool.invoke(arguments).await
    }

    #[tokio::test]
    async fn add_numbers() {
        let result = run(json!({"operation": "add", "numbers": [10, 20, 30]}))
            .await
            .unwrap();
        assert!(result.success);
        assert_eq!(result.payload["result"], json!(60));
        assert_eq!(result.payload["formatted"], json!("add(10, 20, 30) = 60"));
        assert_eq!(result.message.as_deref(), Some("Successfully calculated add"));
    }

    #[tokio::test]
    async fn subtract_and_multiply() {
        let result = run(json!({"operation": "subtract", "numbers": [10, 3, 2]}))
            .await
            .unwrap();
        assert_eq!(result.payload["result"], json!(5));

        let result = run(json!({"operation": "multiply", "numbers": [2, 2.5]}))
            .await
            .unwrap();
        assert_eq!(result.payload["result"], json!(5));
    }

    #[tokio::test]
    async fn divide_by_zero_after_first_operand() {
        let err = run(json!({"operation": "divide", "numbers": [5, 0]}))
            .await
            .unwrap_err();
        assert!(err.message().contains("divide by zero"));

        let result = run(json!({"operation": "divide", "numbers": [0, 5]}))
            .await
            .unwrap();
        assert_eq!(result.payload["result"], json!(0));
    }

    #[tokio::test]
    async fn sqrt_rejects_negative() {
        let err = run(json!({"operation": "sqrt", "numbers": [-4]}))
            .await
            .unwrap_err();
        assert!(err.message().contains("negative"));

        let result = run(json!({"operation": "sqrt", "numbers": [2.25]}))
            .await
            .unwrap();
        assert_eq!(result.payload["result"], json!(1.5));
    }

    #[tokio::test]
    async fn arity_checks() {
        for (operation, numbers) in [
            ("power", json!([2])),
            ("sqrt", json!([1, 2])),
            ("factorial", json!([1, 2])),
        ] {
            let err = run(json!({"operation": operation, "numbers": numbers}))
                .await
                .unwrap_err();
            assert!(err.message().contains("exactly"), "{operation}: {err}");
        }
    }

    #[tokio::test]
    async fn factorial_and_power() {
        let result = run(json!({"operation": "factorial", "numbers": [5]}))
            .await
            .unwrap();
        assert_eq!(result.payload["result"], json!(120));

        let err = run(json!({"operation": "factorial", "numbers": [2.5]}))
            .await
            .unwrap_err();
        assert!(err.message().contains("non-negative integer"));

        let result = run(json!({"operation": "power", "numbers": [2, 10]}))
            .await
            .unwrap();
        assert_eq!(result.payload["result"], json!(1024));
    }

    #[tokio::test]
    async fn empty_numbers_and_unknown_operation() {
        let err = run(json!({"operation": "add", "numbers": []}))
            .await
            .unwrap_err();
        assert_eq!(err.message(), "Numbers array cannot be empty");

        let err = run(json!({"operation": "modulo", "numbers": [1]}))
            .await
            .unwrap_err();
        assert_eq!(err.message(), "Unknown operation: modulo");
    }

    #[tokio::test]
    async fn overflow_is_reported() {
        let err = run(json!({"operation": "power", "numbers": [10, 400]}))
            .await
            .unwrap_err();
        assert_eq!(err.message(), "Result is not a finite number");
    }

    #[tokio::test]
    async fn expression_mode() {
        let result = run(json!({"expression": "(1 + 2) * 4"})).await.unwrap();
        assert_eq!(result.payload["result"], json!(12));
        assert_eq!(result.payload["formatted"], json!("(1 + 2) * 4 = 12"));

        let err = run(json!({"expression": "1 +"})).await.unwrap_err();
        assert!(err.message().starts_with("Invalid expression:"));
    }
}
