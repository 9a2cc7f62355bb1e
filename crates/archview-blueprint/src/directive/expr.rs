//! Heading-level and depth expressions.
//!
//! An expression is either a plain integer or a single binary operation
//! `<int><op><int>` with `op` one of `+ - * /`. Every `i` is replaced with
//! the current depth before evaluation, so `i+1` one level below a view
//! at depth 2 yields 3. Division truncates toward zero.

use crate::error::ExprError;

const OPERATORS: [char; 4] = ['+', '-', '*', '/'];

/// Evaluate `expr` with `i` bound to `depth`.
///
/// # Errors
///
/// Returns [`ExprError`] for malformed input, division by zero, or a
/// negative or overflowing result.
pub fn evaluate(expr: &str, depth: usize) -> Result<usize, ExprError> {
    let substituted: String = expr
        .replace('i', &depth.to_string())
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    let invalid = || ExprError::Invalid(expr.to_owned());
    let out_of_range = || ExprError::OutOfRange(expr.to_owned());

    // Skip the first character so a leading sign is never taken as the operator.
    let operator = substituted
        .char_indices()
        .skip(1)
        .find(|(_, c)| OPERATORS.contains(c));

    let value = match operator {
        None => substituted.parse::<i64>().map_err(|_| invalid())?,
        Some((pos, op)) => {
            let left: i64 = substituted[..pos].parse().map_err(|_| invalid())?;
            let right: i64 = substituted[pos + op.len_utf8()..]
                .parse()
                .map_err(|_| invalid())?;
            match op {
                '+' => left.checked_add(right),
                '-' => left.checked_sub(right),
                '*' => left.checked_mul(right),
                _ => {
                    if right == 0 {
                        return Err(ExprError::DivisionByZero(expr.to_owned()));
                    }
                    left.checked_div(right)
                }
            }
            .ok_or_else(out_of_range)?
        }
    };

    usize::try_from(value).map_err(|_| out_of_range())
}
