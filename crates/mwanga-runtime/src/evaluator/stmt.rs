//! Statement execution and control flow
//!
//! Blocks hand sentinels to their caller unchanged; the loop forms and
//! function application decide what absorbs them.

use std::cell::RefCell;
use std::rc::Rc;

use crate::ast::{Block, ForInExpr, IfExpr, Stmt, SwitchExpr, WhileExpr};
use crate::environment::Environment;
use crate::error::RuntimeError;
use crate::evaluator::{Evaluator, Flow};
use crate::value::Value;

impl Evaluator {
    /// Execute a statement
    pub(crate) fn eval_statement(
        &mut self,
        stmt: &Stmt,
        env: &Rc<RefCell<Environment>>,
    ) -> Result<Flow, RuntimeError> {
        match stmt {
            Stmt::Let(node) => {
                let value = match self.eval_expression(&node.value, env)? {
                    Flow::Value(value) => value,
                    flow => return Ok(flow),
                };
                env.borrow_mut().set(node.name.clone(), value);
                Ok(Flow::Value(Value::Null))
            }
            Stmt::Return(node) => {
                let value = match &node.value {
                    Some(expr) => match self.eval_expression(expr, env)? {
                        Flow::Value(value) => value,
                        flow => return Ok(flow),
                    },
                    None => Value::Null,
                };
                Ok(Flow::Return(value))
            }
            Stmt::Break(_) => Ok(Flow::Break),
            Stmt::Continue(_) => Ok(Flow::Continue),
            Stmt::Expr(expr) => self.eval_expression(expr, env),
        }
    }

    /// Evaluate a block. Unlike a program, a block returns sentinels
    /// as-is so the enclosing loop or call can act on them.
    ///
    /// Blocks do not open a scope; only function application does.
    pub(crate) fn eval_block(
        &mut self,
        block: &Block,
        env: &Rc<RefCell<Environment>>,
    ) -> Result<Flow, RuntimeError> {
        let mut result = Value::Null;

        for statement in &block.statements {
            match self.eval_statement(statement, env)? {
                Flow::Value(value) => result = value,
                flow => return Ok(flow),
            }
        }

        Ok(Flow::Value(result))
    }

    /// `kama (cond) { ... } sivyo { ... }`
    pub(crate) fn eval_if(
        &mut self,
        node: &IfExpr,
        env: &Rc<RefCell<Environment>>,
    ) -> Result<Flow, RuntimeError> {
        let condition = match self.eval_expression(&node.condition, env)? {
            Flow::Value(value) => value,
            flow => return Ok(flow),
        };

        if condition.is_truthy() {
            self.eval_block(&node.consequence, env)
        } else if let Some(alternative) = &node.alternative {
            self.eval_block(alternative, env)
        } else {
            Ok(Flow::Value(Value::Null))
        }
    }

    /// `wakati (cond) { ... }`
    ///
    /// A `vunja` from the body is the loop's own outcome, so it keeps
    /// unwinding through enclosing `wakati` loops until a `kwa` loop or
    /// call boundary absorbs it.
    pub(crate) fn eval_while(
        &mut self,
        node: &WhileExpr,
        env: &Rc<RefCell<Environment>>,
    ) -> Result<Flow, RuntimeError> {
        loop {
            let condition = match self.eval_expression(&node.condition, env)? {
                Flow::Value(value) => value,
                flow => return Ok(flow),
            };
            if !condition.is_truthy() {
                return Ok(Flow::Value(Value::Null));
            }

            match self.eval_block(&node.body, env)? {
                Flow::Break => return Ok(Flow::Break),
                flow @ Flow::Return(_) => return Ok(flow),
                Flow::Value(_) | Flow::Continue => {}
            }
        }
    }

    /// `kwa key, value ktk iterable { ... }`
    pub(crate) fn eval_for_in(
        &mut self,
        node: &ForInExpr,
        env: &Rc<RefCell<Environment>>,
    ) -> Result<Flow, RuntimeError> {
        let iterable = match self.eval_expression(&node.iterable, env)? {
            Flow::Value(value) => value,
            flow => return Ok(flow),
        };
        let Some(mut entries) = iterable.entries() else {
            return Err(RuntimeError::NotIterable {
                type_name: iterable.type_name(),
                line: node.line,
            });
        };

        // The loop names shadow whatever was bound before; remember it
        // so we can put it back on every exit path
        let saved_key = env.borrow().get(&node.key);
        let saved_value = env.borrow().get(&node.value);

        let mut outcome = Ok(Flow::Value(Value::Null));
        while let Some((key, value)) = entries.next() {
            env.borrow_mut().set(node.key.clone(), key);
            env.borrow_mut().set(node.value.clone(), value);

            match self.eval_block(&node.body, env) {
                Ok(Flow::Value(_)) | Ok(Flow::Continue) => {}
                Ok(Flow::Break) => break,
                Ok(flow) => {
                    outcome = Ok(flow);
                    break;
                }
                Err(err) => {
                    outcome = Err(err);
                    break;
                }
            }
        }

        entries.reset();
        if let Some(previous) = saved_key {
            env.borrow_mut().set(node.key.clone(), previous);
        }
        if let Some(previous) = saved_value {
            env.borrow_mut().set(node.value.clone(), previous);
        }

        outcome
    }

    /// `badili value { ikiwa ...: ... kawaida: ... }`
    pub(crate) fn eval_switch(
        &mut self,
        node: &SwitchExpr,
        env: &Rc<RefCell<Environment>>,
    ) -> Result<Flow, RuntimeError> {
        let subject = match self.eval_expression(&node.value, env)? {
            Flow::Value(value) => value,
            flow => return Ok(flow),
        };

        for clause in &node.clauses {
            if clause.default {
                continue;
            }
            for candidate in &clause.conditions {
                let matched = match self.eval_expression(candidate, env)? {
                    Flow::Value(value) => value,
                    flow => return Ok(flow),
                };
                // Matching compares the type tag and the textual
                // rendering, so 1 and 1.0 never match a clause together
                if subject.type_name() == matched.type_name()
                    && subject.to_string() == matched.to_string()
                {
                    return self.eval_block(&clause.body, env);
                }
            }
        }

        for clause in &node.clauses {
            if clause.default {
                return self.eval_block(&clause.body, env);
            }
        }

        Ok(Flow::Value(Value::Null))
    }
}
