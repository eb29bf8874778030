use crate::{compile::Operator, log::Error, log::INCOMPATIBLE_TYPES};
use serde_json::{Number, Value};

/// Return true if the given [`Value`] is truthy.
///
/// `false`, `null`, zero, and empty strings, arrays and objects are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(bo) => *bo,
        Value::Number(nu) => nu.as_f64().is_some_and(|nu| nu != 0.0),
        Value::String(st) => !st.is_empty(),
        Value::Array(ar) => !ar.is_empty(),
        Value::Object(ob) => !ob.is_empty(),
        Value::Null => false,
    }
}

/// Apply the [`Operator`] to the two [`Value`] instances.
///
/// `&&` and `||` are not handled here, they short circuit and are evaluated
/// by the caller.
///
/// # Errors
///
/// Returns an [`Error`] if the `Operator` cannot be applied to the types.
pub fn operate(left: &Value, operator: Operator, right: &Value) -> Result<Value, Error> {
    let result = match (left, right) {
        (Value::Number(left), Value::Number(right)) => return arithmetic(left, operator, right),
        (Value::String(left), Value::String(right)) => match operator {
            Operator::Add => Value::String(format!("{left}{right}")),
            Operator::Greater => Value::Bool(left > right),
            Operator::Lesser => Value::Bool(left < right),
            Operator::Equal => Value::Bool(left == right),
            Operator::NotEqual => Value::Bool(left != right),
            Operator::GreaterOrEqual => Value::Bool(left >= right),
            Operator::LesserOrEqual => Value::Bool(left <= right),
            unsupported => return Err(invalid_operator(unsupported, "string")),
        },
        (Value::Bool(left), Value::Bool(right)) => match operator {
            Operator::Greater => Value::Bool(left > right),
            Operator::Lesser => Value::Bool(left < right),
            Operator::Equal => Value::Bool(left == right),
            Operator::NotEqual => Value::Bool(left != right),
            Operator::GreaterOrEqual => Value::Bool(left >= right),
            Operator::LesserOrEqual => Value::Bool(left <= right),
            Operator::And => Value::Bool(*left && *right),
            Operator::Or => Value::Bool(*left || *right),
            unsupported => return Err(invalid_operator(unsupported, "boolean")),
        },
        (Value::Array(left), Value::Array(right)) => match operator {
            Operator::Add => Value::Array(left.iter().chain(right).cloned().collect()),
            Operator::Greater => Value::Bool(left.len() > right.len()),
            Operator::Lesser => Value::Bool(left.len() < right.len()),
            Operator::Equal => Value::Bool(left == right),
            Operator::NotEqual => Value::Bool(left != right),
            Operator::GreaterOrEqual => Value::Bool(left.len() >= right.len()),
            Operator::LesserOrEqual => Value::Bool(left.len() <= right.len()),
            unsupported => return Err(invalid_operator(unsupported, "array")),
        },
        (left, right) => match operator {
            Operator::Equal => Value::Bool(left == right),
            Operator::NotEqual => Value::Bool(left != right),
            _ => {
                return Err(Error::build(INCOMPATIBLE_TYPES).with_help(format!(
                    "operator `{operator}` cannot be applied to `{left}` and `{right}`"
                )))
            }
        },
    };

    Ok(result)
}

/// Apply the [`Operator`] to two numbers.
///
/// Integer operands stay integers as long as the result is exact.
fn arithmetic(left: &Number, operator: Operator, right: &Number) -> Result<Value, Error> {
    if let (Some(left), Some(right)) = (left.as_i64(), right.as_i64()) {
        let exact = match operator {
            Operator::Add => left.checked_add(right),
            Operator::Subtract => left.checked_sub(right),
            Operator::Multiply => left.checked_mul(right),
            Operator::Divide if right != 0 && left % right == 0 => left.checked_div(right),
            _ => None,
        };
        if let Some(exact) = exact {
            return Ok(Value::from(exact));
        }
    }

    let (Some(left), Some(right)) = (left.as_f64(), right.as_f64()) else {
        return Err(Error::build(INCOMPATIBLE_TYPES).with_help("number is not representable"));
    };
    let result = match operator {
        Operator::Add => left + right,
        Operator::Subtract => left - right,
        Operator::Multiply => left * right,
        Operator::Divide => {
            if right == 0.0 {
                return Err(Error::build(INCOMPATIBLE_TYPES)
                    .with_help(format!("cannot divide `{left}` by zero")));
            }
            left / right
        }
        Operator::Greater => return Ok(Value::Bool(left > right)),
        Operator::Lesser => return Ok(Value::Bool(left < right)),
        Operator::Equal => return Ok(Value::Bool(left == right)),
        Operator::NotEqual => return Ok(Value::Bool(left != right)),
        Operator::GreaterOrEqual => return Ok(Value::Bool(left >= right)),
        Operator::LesserOrEqual => return Ok(Value::Bool(left <= right)),
        unsupported => return Err(invalid_operator(unsupported, "number")),
    };

    // Whole results render without a fraction, and `-0` becomes `0`.
    if result.fract() == 0.0 && result >= i64::MIN as f64 && result < i64::MAX as f64 {
        return Ok(Value::from(result as i64));
    }

    Number::from_f64(result).map(Value::Number).ok_or_else(|| {
        Error::build(INCOMPATIBLE_TYPES)
            .with_help(format!("result of `{left} {operator} {right}` is not a number"))
    })
}

fn invalid_operator(operator: Operator, kind: &str) -> Error {
    Error::build(INCOMPATIBLE_TYPES)
        .with_help(format!("operator `{operator}` is invalid on {kind} types"))
}

#[cfg(test)]
mod tests {
    use super::{is_truthy, operate};
    use crate::{compile::Operator, log::INCOMPATIBLE_TYPES};
    use serde_json::{json, Value};

    #[test]
    fn test_truthy() {
        let true_values = vec![
            json!("lorem"),
            json!(12),
            json!(114.4),
            json!(-12),
            json!(true),
            json!(vec!["lorem", "ipsum"]),
            json!({"lorem": "ipsum"}),
        ];
        let false_values = vec![
            json!(""),
            json!(0),
            json!(0.0),
            json!(false),
            json!(vec![""; 0]),
            json!({}),
            Value::Null,
        ];

        assert!(true_values.iter().all(is_truthy));
        assert!(!false_values.iter().any(is_truthy));
    }

    #[test]
    fn test_integer_arithmetic() {
        assert_eq!(operate(&json!(2), Operator::Add, &json!(3)), Ok(json!(5)));
        assert_eq!(operate(&json!(2), Operator::Subtract, &json!(3)), Ok(json!(-1)));
        assert_eq!(operate(&json!(4), Operator::Multiply, &json!(3)), Ok(json!(12)));
        assert_eq!(operate(&json!(12), Operator::Divide, &json!(4)), Ok(json!(3)));
    }

    #[test]
    fn test_float_arithmetic() {
        assert_eq!(operate(&json!(7), Operator::Divide, &json!(2)), Ok(json!(3.5)));
        assert_eq!(operate(&json!(1.5), Operator::Add, &json!(1)), Ok(json!(2.5)));
    }

    #[test]
    fn test_whole_float_results_are_integral() {
        assert_eq!(operate(&json!(2.5), Operator::Multiply, &json!(2)), Ok(json!(5)));
        assert_eq!(operate(&json!(0.5), Operator::Add, &json!(0.5)), Ok(json!(1)));
        assert_eq!(operate(&json!(-0.5), Operator::Add, &json!(0.5)), Ok(json!(0)));
    }

    #[test]
    fn test_divide_by_zero() {
        let error = operate(&json!(1), Operator::Divide, &json!(0)).unwrap_err();

        assert_eq!(error.get_reason(), INCOMPATIBLE_TYPES);
    }

    #[test]
    fn test_number_comparison() {
        assert_eq!(operate(&json!(100), Operator::Greater, &json!(50)), Ok(json!(true)));
        assert_eq!(operate(&json!(1), Operator::Equal, &json!(1.0)), Ok(json!(true)));
        assert_eq!(operate(&json!(1), Operator::LesserOrEqual, &json!(0)), Ok(json!(false)));
    }

    #[test]
    fn test_strings() {
        assert_eq!(operate(&json!("a"), Operator::Add, &json!("b")), Ok(json!("ab")));
        assert_eq!(operate(&json!("b"), Operator::Greater, &json!("a")), Ok(json!(true)));
        assert!(operate(&json!("a"), Operator::Multiply, &json!("b")).is_err());
    }

    #[test]
    fn test_arrays() {
        assert_eq!(
            operate(&json!([1]), Operator::Add, &json!([2, 3])),
            Ok(json!([1, 2, 3]))
        );
        assert_eq!(
            operate(&json!(["one", "two"]), Operator::Greater, &json!(["one"])),
            Ok(json!(true))
        );
    }

    #[test]
    fn test_mismatched_types() {
        assert_eq!(operate(&json!("1"), Operator::Equal, &json!(1)), Ok(json!(false)));
        assert_eq!(operate(&Value::Null, Operator::Equal, &Value::Null), Ok(json!(true)));
        assert_eq!(operate(&json!(null), Operator::NotEqual, &json!("")), Ok(json!(true)));

        let error = operate(&json!("hello"), Operator::Greater, &json!(true)).unwrap_err();
        assert_eq!(error.get_reason(), INCOMPATIBLE_TYPES);

        assert!(operate(&json!(true), Operator::Add, &json!(false)).is_err());
    }
}
