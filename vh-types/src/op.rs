//! Operator dispatch: named string operators (`+`, `-`, `=`, `sqrt`,
//! ...) applied to dynamically typed operands. See spec.md section
//! 4.2. Per the design note in spec.md section 9, the packed 32-bit
//! operator flag word is replaced with a typed [`OperatorDescriptor`]
//! that is parsed once into a [`TypeVarOpExec`] fast path.

use thiserror::Error;

use crate::typevar::Value;

/// Replaces the packed `{return DT, lhs DT, lhs ID, rhs DT, rhs ID}`
/// flag word: which kind of operand each side of an operator call is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandKind {
    I16,
    I32,
    I64,
    Float,
    Double,
    Bool,
    /// A value living inline in a TypeVar's own stack-tagged storage.
    TypeVarStack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorKind {
    Add,
    Sub,
    Mul,
    Div,
    AddAssign,
    Increment,
    Sqrt,
    Abs,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl OperatorKind {
    pub fn from_str(op: &str) -> Option<Self> {
        Some(match op {
            "+" => OperatorKind::Add,
            "-" => OperatorKind::Sub,
            "*" => OperatorKind::Mul,
            "/" => OperatorKind::Div,
            "+=" => OperatorKind::AddAssign,
            "++" => OperatorKind::Increment,
            "sqrt" => OperatorKind::Sqrt,
            "abs" => OperatorKind::Abs,
            "=" | "==" => OperatorKind::Eq,
            "!=" => OperatorKind::Ne,
            "<" => OperatorKind::Lt,
            "<=" => OperatorKind::Le,
            ">" => OperatorKind::Gt,
            ">=" => OperatorKind::Ge,
            _ => return None,
        })
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            OperatorKind::Eq
                | OperatorKind::Ne
                | OperatorKind::Lt
                | OperatorKind::Le
                | OperatorKind::Gt
                | OperatorKind::Ge
        )
    }

    pub fn is_unary(&self) -> bool {
        matches!(self, OperatorKind::Sqrt | OperatorKind::Abs | OperatorKind::Increment)
    }
}

/// A typed operator descriptor, replacing the 32-bit flag word.
#[derive(Debug, Clone, Copy)]
pub struct OperatorDescriptor {
    pub op: OperatorKind,
    pub lhs: OperandKind,
    pub rhs: OperandKind,
    pub ret: OperandKind,
}

#[derive(Debug, Error)]
pub enum OpError {
    #[error("operator {op:?} has no implementation for ({lhs:?}, {rhs:?})")]
    Unsupported {
        op: OperatorKind,
        lhs: OperandKind,
        rhs: OperandKind,
    },
    #[error("operand kind mismatch: expected {expected:?}, found value of a different shape")]
    OperandMismatch { expected: OperandKind },
    #[error("division by zero")]
    DivisionByZero,
}

fn as_f64(v: &Value) -> Option<f64> {
    match v {
        Value::I16(x) => Some(*x as f64),
        Value::I32(x) => Some(*x as f64),
        Value::I64(x) => Some(*x as f64),
        Value::Float(x) => Some(*x as f64),
        Value::Double(x) => Some(*x),
        _ => None,
    }
}

fn widen_result(lhs: &Value, rhs: &Value, result: f64) -> Value {
    match (lhs, rhs) {
        (Value::Double(_), _) | (_, Value::Double(_)) => Value::Double(result),
        (Value::Float(_), _) | (_, Value::Float(_)) => Value::Float(result as f32),
        (Value::I64(_), _) | (_, Value::I64(_)) => Value::I64(result as i64),
        (Value::I32(_), _) | (_, Value::I32(_)) => Value::I32(result as i32),
        _ => Value::I16(result as i16),
    }
}

/// A prepared operator execution plan: the "parse" (resolving which
/// numeric kernel applies) happens once in [`TypeVarOpExec::prepare`];
/// [`TypeVarOpExec::apply`] is the fast path, expected O(1) beyond the
/// first call for matching type stacks (spec.md section 4.2/8).
#[derive(Debug, Clone, Copy)]
pub struct TypeVarOpExec {
    descriptor: OperatorDescriptor,
}

impl TypeVarOpExec {
    pub fn prepare(descriptor: OperatorDescriptor) -> Result<Self, OpError> {
        // The "parse" step: reject operand kinds the numeric kernel
        // can never apply to (e.g. Bool with Sqrt).
        if descriptor.op.is_unary() && matches!(descriptor.lhs, OperandKind::Bool) {
            return Err(OpError::Unsupported {
                op: descriptor.op,
                lhs: descriptor.lhs,
                rhs: descriptor.rhs,
            });
        }
        Ok(TypeVarOpExec { descriptor })
    }

    pub fn descriptor(&self) -> OperatorDescriptor {
        self.descriptor
    }

    /// `fp(tvope, ...)`: the fast path, accepting raw values directly.
    pub fn apply(&self, lhs: &Value, rhs: &Value) -> Result<Value, OpError> {
        apply_operator(self.descriptor.op, lhs, rhs)
    }

    pub fn apply_unary(&self, lhs: &Value) -> Result<Value, OpError> {
        apply_unary(self.descriptor.op, lhs)
    }
}

fn apply_unary(op: OperatorKind, lhs: &Value) -> Result<Value, OpError> {
    let x = as_f64(lhs).ok_or(OpError::Unsupported {
        op,
        lhs: OperandKind::TypeVarStack,
        rhs: OperandKind::TypeVarStack,
    })?;
    let result = match op {
        OperatorKind::Sqrt => x.sqrt(),
        OperatorKind::Abs => x.abs(),
        OperatorKind::Increment => x + 1.0,
        _ => {
            return Err(OpError::Unsupported {
                op,
                lhs: OperandKind::TypeVarStack,
                rhs: OperandKind::TypeVarStack,
            })
        }
    };
    Ok(widen_result(lhs, lhs, result))
}

/// `vh_typevar_op` / `vh_typevar_comp`: the single-shot call used both
/// directly and as the reference behaviour [`TypeVarOpExec::apply`]
/// must match (spec.md section 8 fast-path equivalence property).
pub fn apply_operator(op: OperatorKind, lhs: &Value, rhs: &Value) -> Result<Value, OpError> {
    if op.is_unary() {
        return apply_unary(op, lhs);
    }

    let (a, b) = match (as_f64(lhs), as_f64(rhs)) {
        (Some(a), Some(b)) => (a, b),
        _ => {
            return Err(OpError::Unsupported {
                op,
                lhs: OperandKind::TypeVarStack,
                rhs: OperandKind::TypeVarStack,
            })
        }
    };

    if op.is_comparison() {
        let result = match op {
            OperatorKind::Eq => a == b,
            OperatorKind::Ne => a != b,
            OperatorKind::Lt => a < b,
            OperatorKind::Le => a <= b,
            OperatorKind::Gt => a > b,
            OperatorKind::Ge => a >= b,
            _ => unreachable!(),
        };
        return Ok(Value::Bool(result));
    }

    let result = match op {
        OperatorKind::Add | OperatorKind::AddAssign => a + b,
        OperatorKind::Sub => a - b,
        OperatorKind::Mul => a * b,
        OperatorKind::Div => {
            if b == 0.0 {
                return Err(OpError::DivisionByZero);
            }
            a / b
        }
        _ => unreachable!(),
    };

    Ok(widen_result(lhs, rhs, result))
}

/// `vh_typevar_comp`: always returns a boolean.
pub fn compare(op: OperatorKind, lhs: &Value, rhs: &Value) -> Result<bool, OpError> {
    match apply_operator(op, lhs, rhs)? {
        Value::Bool(b) => Ok(b),
        _ => Err(OpError::Unsupported {
            op,
            lhs: OperandKind::TypeVarStack,
            rhs: OperandKind::TypeVarStack,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fast_path_matches_single_shot() {
        let descriptor = OperatorDescriptor {
            op: OperatorKind::Add,
            lhs: OperandKind::I32,
            rhs: OperandKind::I32,
            ret: OperandKind::I32,
        };
        let exec = TypeVarOpExec::prepare(descriptor).unwrap();

        for (a, b) in [(1, 2), (40, 2), (-5, 5)] {
            let lhs = Value::I32(a);
            let rhs = Value::I32(b);
            let single_shot = apply_operator(OperatorKind::Add, &lhs, &rhs).unwrap();
            let fast_path = exec.apply(&lhs, &rhs).unwrap();
            assert_eq!(single_shot, fast_path);
        }
    }

    #[test]
    fn division_by_zero_is_an_error() {
        let err = apply_operator(OperatorKind::Div, &Value::I32(1), &Value::I32(0)).unwrap_err();
        assert!(matches!(err, OpError::DivisionByZero));
    }

    #[test]
    fn comparison_returns_bool() {
        assert!(compare(OperatorKind::Lt, &Value::I32(1), &Value::I32(2)).unwrap());
        assert!(!compare(OperatorKind::Lt, &Value::I32(2), &Value::I32(1)).unwrap());
    }

    #[test]
    fn sqrt_widens_to_double() {
        let result = apply_unary(OperatorKind::Sqrt, &Value::Double(4.0)).unwrap();
        assert_eq!(result, Value::Double(2.0));
    }
}
