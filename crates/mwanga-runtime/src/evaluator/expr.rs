//! Expression evaluation and the operator engine
//!
//! The infix dispatch follows a fixed priority: strings, the
//! collection rules for `+`/`*`, the numeric lattice, containment,
//! reference equality, booleans, and finally the type-mismatch /
//! unknown-operator errors.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::ast::{
    ArrayLiteral, AssignExpr, CallExpr, DictLiteral, Expr, Identifier, IndexExpr, InfixExpr,
    InfixOp, PostfixExpr, PostfixOp, PrefixExpr, PrefixOp,
};
use crate::builtins;
use crate::environment::Environment;
use crate::error::RuntimeError;
use crate::evaluator::{Evaluator, Flow};
use crate::value::{DictPair, Function, Value};

impl Evaluator {
    /// Evaluate an expression
    pub(crate) fn eval_expression(
        &mut self,
        expr: &Expr,
        env: &Rc<RefCell<Environment>>,
    ) -> Result<Flow, RuntimeError> {
        match expr {
            Expr::Int(node) => Ok(Flow::Value(Value::Int(node.value))),
            Expr::Float(node) => Ok(Flow::Value(Value::Float(node.value))),
            Expr::Str(node) => Ok(Flow::Value(Value::string(node.value.clone()))),
            Expr::Bool(node) => Ok(Flow::Value(Value::Bool(node.value))),
            Expr::Null(_) => Ok(Flow::Value(Value::Null)),
            Expr::Array(node) => self.eval_array_literal(node, env),
            Expr::Dict(node) => self.eval_dict_literal(node, env),
            Expr::Identifier(node) => self.eval_identifier(node, env),
            Expr::Prefix(node) => self.eval_prefix(node, env),
            Expr::Infix(node) => self.eval_infix(node, env),
            Expr::Postfix(node) => self.eval_postfix(node, env),
            Expr::Index(node) => self.eval_index(node, env),
            Expr::Assign(node) => self.eval_assign(node, env),
            Expr::If(node) => self.eval_if(node, env),
            Expr::While(node) => self.eval_while(node, env),
            Expr::ForIn(node) => self.eval_for_in(node, env),
            Expr::Switch(node) => self.eval_switch(node, env),
            Expr::Call(node) => self.eval_call(node, env),
            Expr::Function(node) => Ok(Flow::Value(Value::Function(Rc::new(Function {
                parameters: node.parameters.clone(),
                body: Rc::clone(&node.body),
                env: Rc::clone(env),
            })))),
        }
    }

    /// Identifier lookup: the environment chain first, then the
    /// builtin registry
    fn eval_identifier(
        &mut self,
        node: &Identifier,
        env: &Rc<RefCell<Environment>>,
    ) -> Result<Flow, RuntimeError> {
        let bound = env.borrow().get(&node.name);
        if let Some(value) = bound {
            return Ok(Flow::Value(value));
        }
        if let Some(builtin) = builtins::lookup(&node.name) {
            return Ok(Flow::Value(Value::Builtin(builtin)));
        }
        Err(RuntimeError::UnknownIdentifier {
            name: node.name.clone(),
            line: node.line,
        })
    }

    fn eval_array_literal(
        &mut self,
        node: &ArrayLiteral,
        env: &Rc<RefCell<Environment>>,
    ) -> Result<Flow, RuntimeError> {
        let mut elements = Vec::with_capacity(node.elements.len());
        for element in &node.elements {
            match self.eval_expression(element, env)? {
                Flow::Value(value) => elements.push(value),
                flow => return Ok(flow),
            }
        }
        Ok(Flow::Value(Value::array(elements)))
    }

    fn eval_dict_literal(
        &mut self,
        node: &DictLiteral,
        env: &Rc<RefCell<Environment>>,
    ) -> Result<Flow, RuntimeError> {
        let mut pairs = HashMap::with_capacity(node.pairs.len());
        for (key_expr, value_expr) in &node.pairs {
            let key = match self.eval_expression(key_expr, env)? {
                Flow::Value(value) => value,
                flow => return Ok(flow),
            };
            let Some(hash) = key.hash_key() else {
                return Err(RuntimeError::UnhashableKey {
                    type_name: key.type_name(),
                    line: node.line,
                });
            };
            let value = match self.eval_expression(value_expr, env)? {
                Flow::Value(value) => value,
                flow => return Ok(flow),
            };
            pairs.insert(hash, DictPair { key, value });
        }
        Ok(Flow::Value(Value::dict(pairs)))
    }

    fn eval_prefix(
        &mut self,
        node: &PrefixExpr,
        env: &Rc<RefCell<Environment>>,
    ) -> Result<Flow, RuntimeError> {
        let right = match self.eval_expression(&node.right, env)? {
            Flow::Value(value) => value,
            flow => return Ok(flow),
        };

        let value = match node.operator {
            PrefixOp::Bang => Value::Bool(!right.is_truthy()),
            PrefixOp::Minus => match right {
                Value::Int(n) => Value::Int(n.wrapping_neg()),
                Value::Float(x) => Value::Float(-x),
                other => {
                    return Err(RuntimeError::UnknownPrefixOperator {
                        operator: node.operator,
                        operand: other.type_name(),
                        line: node.line,
                    })
                }
            },
            PrefixOp::Plus => match right {
                Value::Int(_) | Value::Float(_) => right,
                other => {
                    return Err(RuntimeError::UnknownPrefixOperator {
                        operator: node.operator,
                        operand: other.type_name(),
                        line: node.line,
                    })
                }
            },
        };

        Ok(Flow::Value(value))
    }

    fn eval_infix(
        &mut self,
        node: &InfixExpr,
        env: &Rc<RefCell<Environment>>,
    ) -> Result<Flow, RuntimeError> {
        let left = match self.eval_expression(&node.left, env)? {
            Flow::Value(value) => value,
            flow => return Ok(flow),
        };
        let right = match self.eval_expression(&node.right, env)? {
            Flow::Value(value) => value,
            flow => return Ok(flow),
        };

        self.infix(node.operator, left, right, node.line)
            .map(Flow::Value)
    }

    /// The infix dispatch matrix; first matching rule wins
    pub(crate) fn infix(
        &self,
        operator: InfixOp,
        left: Value,
        right: Value,
        line: u32,
    ) -> Result<Value, RuntimeError> {
        match (&left, &right) {
            // Containment has to be recognized here: the string rule
            // would otherwise swallow `"lo" ktk "hello"`
            (Value::Str(_), Value::Str(_)) if operator == InfixOp::In => {
                containment(&left, &right, line)
            }
            (Value::Str(a), Value::Str(b)) => string_infix(operator, a, b, line),

            (Value::Dict(a), Value::Dict(b)) if operator == InfixOp::Plus => {
                // Merge; right-hand entries overwrite on key collision
                let mut pairs = a.borrow().clone();
                for (key, pair) in b.borrow().iter() {
                    pairs.insert(key.clone(), pair.clone());
                }
                Ok(Value::dict(pairs))
            }

            (Value::Array(a), Value::Array(b)) if operator == InfixOp::Plus => {
                let mut elements = a.borrow().clone();
                elements.extend(b.borrow().iter().cloned());
                Ok(Value::array(elements))
            }

            (Value::Array(elements), Value::Int(n)) | (Value::Int(n), Value::Array(elements))
                if operator == InfixOp::Star =>
            {
                // One copy plus (n - 1) more, so n <= 1 still yields
                // one copy
                let template = elements.borrow().clone();
                let mut result = template.clone();
                let mut remaining = *n;
                while remaining > 1 {
                    result.extend(template.iter().cloned());
                    remaining -= 1;
                }
                Ok(Value::array(result))
            }

            (Value::Str(s), Value::Int(n)) | (Value::Int(n), Value::Str(s))
                if operator == InfixOp::Star =>
            {
                Ok(Value::string(s.repeat((*n).max(0) as usize)))
            }

            (Value::Int(a), Value::Int(b)) => int_infix(operator, *a, *b, line),
            (Value::Float(a), Value::Float(b)) => float_infix(operator, *a, *b, line),
            (Value::Int(a), Value::Float(b)) => {
                mixed_infix(operator, *a as f64, *b, &left, &right, line)
            }
            (Value::Float(a), Value::Int(b)) => {
                mixed_infix(operator, *a, *b as f64, &left, &right, line)
            }

            _ if operator == InfixOp::In => containment(&left, &right, line),

            // Remaining `==`/`!=` shapes compare by reference identity;
            // booleans and null are canonical so this is value equality
            // for them
            _ if operator == InfixOp::Equal => Ok(Value::Bool(left == right)),
            _ if operator == InfixOp::NotEqual => Ok(Value::Bool(left != right)),

            (Value::Bool(a), Value::Bool(b)) => bool_infix(operator, *a, *b, line),

            _ if left.type_name() != right.type_name() => Err(RuntimeError::TypeMismatch {
                left: left.type_name(),
                operator,
                right: right.type_name(),
                line,
            }),

            _ => Err(RuntimeError::UnknownInfixOperator {
                left: left.type_name(),
                operator,
                right: right.type_name(),
                line,
            }),
        }
    }

    /// `name++` / `name--`: rebind the identifier in the current
    /// environment to its value ±1
    fn eval_postfix(
        &mut self,
        node: &PostfixExpr,
        env: &Rc<RefCell<Environment>>,
    ) -> Result<Flow, RuntimeError> {
        let current = env.borrow().get(&node.name);
        let Some(current) = current else {
            return Err(RuntimeError::UnknownIdentifier {
                name: node.name.clone(),
                line: node.line,
            });
        };

        let delta: i64 = match node.operator {
            PostfixOp::Increment => 1,
            PostfixOp::Decrement => -1,
        };
        let next = match current {
            Value::Int(n) => Value::Int(n.wrapping_add(delta)),
            Value::Float(x) => Value::Float(x + delta as f64),
            _ => {
                return Err(RuntimeError::InvalidPostfixTarget {
                    name: node.name.clone(),
                    line: node.line,
                })
            }
        };

        Ok(Flow::Value(env.borrow_mut().set(node.name.clone(), next)))
    }

    fn eval_index(
        &mut self,
        node: &IndexExpr,
        env: &Rc<RefCell<Environment>>,
    ) -> Result<Flow, RuntimeError> {
        let left = match self.eval_expression(&node.left, env)? {
            Flow::Value(value) => value,
            flow => return Ok(flow),
        };
        let index = match self.eval_expression(&node.index, env)? {
            Flow::Value(value) => value,
            flow => return Ok(flow),
        };

        let value = match (&left, &index) {
            (Value::Array(elements), Value::Int(idx)) => {
                let elements = elements.borrow();
                // Out-of-range reads (including negative) yield null
                if *idx < 0 || *idx as usize >= elements.len() {
                    Value::Null
                } else {
                    elements[*idx as usize].clone()
                }
            }
            (Value::Array(_), _) => {
                return Err(RuntimeError::InvalidArrayIndex {
                    type_name: index.type_name(),
                    line: node.line,
                })
            }
            (Value::Dict(pairs), _) => {
                let Some(key) = index.hash_key() else {
                    return Err(RuntimeError::InvalidKey {
                        type_name: index.type_name(),
                        line: node.line,
                    });
                };
                pairs
                    .borrow()
                    .get(&key)
                    .map(|pair| pair.value.clone())
                    .unwrap_or(Value::Null)
            }
            _ => {
                return Err(RuntimeError::NotIndexable {
                    type_name: left.type_name(),
                    line: node.line,
                })
            }
        };

        Ok(Flow::Value(value))
    }

    /// `left = value` and the compound forms. The target is evaluated
    /// first (for its effects and the current value), then the
    /// right-hand side; a compound operator folds the two through the
    /// infix engine before storing.
    fn eval_assign(
        &mut self,
        node: &AssignExpr,
        env: &Rc<RefCell<Environment>>,
    ) -> Result<Flow, RuntimeError> {
        let current = match self.eval_expression(&node.left, env)? {
            Flow::Value(value) => value,
            flow => return Ok(flow),
        };
        let mut value = match self.eval_expression(&node.value, env)? {
            Flow::Value(value) => value,
            flow => return Ok(flow),
        };

        if let Some(operator) = node.operator.folded() {
            value = self.infix(operator, current.clone(), value, node.line)?;
        }

        match node.left.as_ref() {
            Expr::Identifier(identifier) => {
                env.borrow_mut().set(identifier.name.clone(), value.clone());
            }
            Expr::Index(index_expr) => {
                let container = match self.eval_expression(&index_expr.left, env)? {
                    Flow::Value(value) => value,
                    flow => return Ok(flow),
                };
                match container {
                    Value::Array(elements) => {
                        let index = match self.eval_expression(&index_expr.index, env)? {
                            Flow::Value(value) => value,
                            flow => return Ok(flow),
                        };
                        let Value::Int(idx) = index else {
                            return Err(RuntimeError::InvalidIndexAssignment {
                                type_name: index.type_name(),
                                line: index_expr.line,
                            });
                        };
                        let mut elements = elements.borrow_mut();
                        if idx < 0 || idx as usize >= elements.len() {
                            return Err(RuntimeError::IndexOutOfRange);
                        }
                        elements[idx as usize] = value.clone();
                    }
                    Value::Dict(pairs) => {
                        let key = match self.eval_expression(&index_expr.index, env)? {
                            Flow::Value(value) => value,
                            flow => return Ok(flow),
                        };
                        let Some(hash) = key.hash_key() else {
                            return Err(RuntimeError::UnhashableKey {
                                type_name: key.type_name(),
                                line: index_expr.line,
                            });
                        };
                        pairs.borrow_mut().insert(
                            hash,
                            DictPair {
                                key,
                                value: value.clone(),
                            },
                        );
                    }
                    other => {
                        return Err(RuntimeError::InvalidIndexAssignment {
                            type_name: other.type_name(),
                            line: index_expr.line,
                        })
                    }
                }
            }
            _ => {
                return Err(RuntimeError::InvalidAssignmentTarget {
                    type_name: current.type_name(),
                    line: node.line,
                })
            }
        }

        Ok(Flow::Value(value))
    }

    fn eval_call(
        &mut self,
        node: &CallExpr,
        env: &Rc<RefCell<Environment>>,
    ) -> Result<Flow, RuntimeError> {
        let callee = match self.eval_expression(&node.callee, env)? {
            Flow::Value(value) => value,
            flow => return Ok(flow),
        };

        let mut arguments = Vec::with_capacity(node.arguments.len());
        for argument in &node.arguments {
            match self.eval_expression(argument, env)? {
                Flow::Value(value) => arguments.push(value),
                flow => return Ok(flow),
            }
        }

        self.apply_function(callee, arguments, node.line)
    }

    /// Apply a closure or builtin to already-evaluated arguments
    pub(crate) fn apply_function(
        &mut self,
        callee: Value,
        arguments: Vec<Value>,
        line: u32,
    ) -> Result<Flow, RuntimeError> {
        match callee {
            Value::Function(function) => {
                let call_env = Rc::new(RefCell::new(Environment::new_enclosed(Rc::clone(
                    &function.env,
                ))));
                // Positional binding: extra arguments are ignored,
                // missing ones leave the parameter unbound
                for (parameter, argument) in function.parameters.iter().zip(arguments) {
                    call_env.borrow_mut().set(parameter.clone(), argument);
                }

                match self.eval_block(&function.body, &call_env)? {
                    Flow::Return(value) => Ok(Flow::Value(value)),
                    flow => Ok(flow),
                }
            }
            Value::Builtin(builtin) => builtin
                .call(&arguments, line, &self.output)
                .map(Flow::Value),
            other => Err(RuntimeError::NotAFunction {
                type_name: other.type_name(),
                line,
            }),
        }
    }
}

/// Integer ⊕ integer
fn int_infix(operator: InfixOp, a: i64, b: i64, line: u32) -> Result<Value, RuntimeError> {
    let value = match operator {
        InfixOp::Plus => Value::Int(a.wrapping_add(b)),
        InfixOp::Minus => Value::Int(a.wrapping_sub(b)),
        InfixOp::Star => Value::Int(a.wrapping_mul(b)),
        InfixOp::Pow => Value::Int((a as f64).powf(b as f64) as i64),
        // Division runs in f64 and demotes when exact; division by
        // zero therefore follows IEEE semantics
        InfixOp::Slash => number_from(a as f64 / b as f64),
        InfixOp::Percent => {
            if b == 0 {
                return Err(RuntimeError::ZeroModulo { line });
            }
            Value::Int(a.wrapping_rem(b))
        }
        InfixOp::Less => Value::Bool(a < b),
        InfixOp::LessEqual => Value::Bool(a <= b),
        InfixOp::Greater => Value::Bool(a > b),
        InfixOp::GreaterEqual => Value::Bool(a >= b),
        InfixOp::Equal => Value::Bool(a == b),
        InfixOp::NotEqual => Value::Bool(a != b),
        InfixOp::And | InfixOp::Or | InfixOp::In => {
            return Err(RuntimeError::UnknownInfixOperator {
                left: "NAMBA",
                operator,
                right: "NAMBA",
                line,
            })
        }
    };
    Ok(value)
}

/// Float ⊕ float
fn float_infix(operator: InfixOp, a: f64, b: f64, line: u32) -> Result<Value, RuntimeError> {
    let value = match operator {
        InfixOp::Plus => Value::Float(a + b),
        InfixOp::Minus => Value::Float(a - b),
        InfixOp::Star => Value::Float(a * b),
        InfixOp::Slash => Value::Float(a / b),
        InfixOp::Pow => Value::Float(a.powf(b)),
        InfixOp::Less => Value::Bool(a < b),
        InfixOp::LessEqual => Value::Bool(a <= b),
        InfixOp::Greater => Value::Bool(a > b),
        InfixOp::GreaterEqual => Value::Bool(a >= b),
        InfixOp::Equal => Value::Bool(a == b),
        InfixOp::NotEqual => Value::Bool(a != b),
        InfixOp::Percent | InfixOp::And | InfixOp::Or | InfixOp::In => {
            return Err(RuntimeError::UnknownInfixOperator {
                left: "DESIMALI",
                operator,
                right: "DESIMALI",
                line,
            })
        }
    };
    Ok(value)
}

/// Mixed integer/float: arithmetic demotes back to integer when the
/// result is exactly integral
fn mixed_infix(
    operator: InfixOp,
    a: f64,
    b: f64,
    left: &Value,
    right: &Value,
    line: u32,
) -> Result<Value, RuntimeError> {
    let value = match operator {
        InfixOp::Plus => number_from(a + b),
        InfixOp::Minus => number_from(a - b),
        InfixOp::Star => number_from(a * b),
        InfixOp::Slash => number_from(a / b),
        InfixOp::Pow => number_from(a.powf(b)),
        InfixOp::Less => Value::Bool(a < b),
        InfixOp::LessEqual => Value::Bool(a <= b),
        InfixOp::Greater => Value::Bool(a > b),
        InfixOp::GreaterEqual => Value::Bool(a >= b),
        InfixOp::Equal => Value::Bool(a == b),
        InfixOp::NotEqual => Value::Bool(a != b),
        InfixOp::Percent | InfixOp::And | InfixOp::Or | InfixOp::In => {
            return Err(RuntimeError::UnknownInfixOperator {
                left: left.type_name(),
                operator,
                right: right.type_name(),
                line,
            })
        }
    };
    Ok(value)
}

/// String ⊕ string
fn string_infix(
    operator: InfixOp,
    a: &Rc<String>,
    b: &Rc<String>,
    line: u32,
) -> Result<Value, RuntimeError> {
    match operator {
        InfixOp::Plus => Ok(Value::string(format!("{}{}", a, b))),
        InfixOp::Equal => Ok(Value::Bool(a == b)),
        InfixOp::NotEqual => Ok(Value::Bool(a != b)),
        _ => Err(RuntimeError::UnknownInfixOperator {
            left: "NENO",
            operator,
            right: "NENO",
            line,
        }),
    }
}

/// Boolean ⊕ boolean (both sides are already evaluated)
fn bool_infix(operator: InfixOp, a: bool, b: bool, line: u32) -> Result<Value, RuntimeError> {
    match operator {
        InfixOp::And => Ok(Value::Bool(a && b)),
        InfixOp::Or => Ok(Value::Bool(a || b)),
        _ => Err(RuntimeError::UnknownInfixOperator {
            left: "BOOLEAN",
            operator,
            right: "BOOLEAN",
            line,
        }),
    }
}

/// `x ktk y` containment
fn containment(left: &Value, right: &Value, line: u32) -> Result<Value, RuntimeError> {
    match right {
        Value::Str(haystack) => match left {
            Value::Str(needle) => Ok(Value::Bool(haystack.contains(needle.as_str()))),
            _ => Ok(Value::Bool(false)),
        },
        Value::Array(elements) => {
            let found = elements.borrow().iter().any(|element| match (left, element) {
                (Value::Null, Value::Null) => true,
                (Value::Str(a), Value::Str(b)) => a == b,
                (Value::Int(a), Value::Int(b)) => a == b,
                (Value::Float(a), Value::Float(b)) => a == b,
                _ => false,
            });
            Ok(Value::Bool(found))
        }
        Value::Dict(pairs) => {
            let Some(key) = left.hash_key() else {
                return Err(RuntimeError::InvalidKey {
                    type_name: left.type_name(),
                    line,
                });
            };
            Ok(Value::Bool(pairs.borrow().contains_key(&key)))
        }
        _ => Ok(Value::Bool(false)),
    }
}

/// An arithmetic result that demotes to integer when exactly integral
fn number_from(x: f64) -> Value {
    if x.fract() == 0.0 {
        Value::Int(x as i64)
    } else {
        Value::Float(x)
    }
}
