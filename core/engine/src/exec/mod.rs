//! The tree-walking interpreter: every [`Node`] knows how to run itself
//! against a [`Context`].
//!
//! Control flow is explicit: exceptions travel as `Err` values, while
//! `return`/`break`/`continue` set the context's [`ExecutionState`], which
//! every statement sequence checks before moving on.

#[cfg(test)]
mod tests;

use crate::{
    builtins::{
        array::Array,
        function::{make_ordinary_function, FunctionFlags},
        iterable::get_iterator,
    },
    context::Context,
    environment::lexical_environment::{
        self as scope, new_declarative_environment, Environment, VariableScope,
    },
    object::JsObject,
    property::PropertyKey,
    syntax::ast::node::{
        Const, IterationDeclKind, Node, PropertyDefinition, RcStatementList, StatementList,
    },
    syntax::ast::op::{AssignOp, BinOp, BitOp, CompOp, LogOp, NumOp, UnaryOp},
    value::JsValue,
    JsResult,
};

/// The control-flow signal of the running interpreter. At most one is
/// active; exceptions travel separately as `Err` values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ExecutionState {
    #[default]
    Executing,
    Return,
    Break(Option<Box<str>>),
    Continue(Option<Box<str>>),
}

/// Anything the interpreter can evaluate.
pub trait Executable {
    /// Runs this node, producing its completion value.
    fn run(&self, context: &mut Context) -> JsResult<JsValue>;
}

impl Executable for StatementList {
    fn run(&self, context: &mut Context) -> JsResult<JsValue> {
        let mut value = JsValue::undefined();
        for statement in self.statements() {
            value = statement.run(context)?;
            // A pending signal aborts the sequence; the value carries a
            // `return`'s argument upward.
            if !matches!(context.executor_state(), ExecutionState::Executing) {
                break;
            }
        }
        Ok(value)
    }
}

impl Executable for RcStatementList {
    fn run(&self, context: &mut Context) -> JsResult<JsValue> {
        (**self).run(context)
    }
}

impl Executable for Node {
    fn run(&self, context: &mut Context) -> JsResult<JsValue> {
        match self {
            Node::Const(constant) => Ok(match constant {
                Const::Undefined => JsValue::undefined(),
                Const::Null => JsValue::null(),
                Const::Bool(boolean) => JsValue::new(*boolean),
                Const::Num(number) => JsValue::new(*number),
                Const::Int(integer) => JsValue::new(*integer),
                Const::String(text) => JsValue::new(&**text),
            }),

            Node::Empty => Ok(JsValue::undefined()),

            Node::This => {
                let env = current_environment(context);
                scope::get_this_binding(&env, context)
            }

            Node::Identifier(name) => resolve_binding(name, context),

            Node::Block(statements) => {
                {
                    let env = new_declarative_environment(None);
                    context.realm_mut().environment.push(env);
                }
                let result = statements.run(context);
                context.realm_mut().environment.pop();
                result
            }

            Node::ArrayDecl(elements) => {
                let values = evaluate_spreadable(elements, context)?;
                Ok(Array::create_array(values, context))
            }

            Node::ObjectDecl(properties) => {
                let object = context.construct_object();
                for property in properties.iter() {
                    match property {
                        PropertyDefinition::Property(key, value) => {
                            let value = value.run(context)?;
                            object.create_data_property(PropertyKey::from(&**key), value);
                        }
                        PropertyDefinition::Computed(key, value) => {
                            let key = key.run(context)?.to_property_key(context)?;
                            let value = value.run(context)?;
                            object.create_data_property(key, value);
                        }
                        PropertyDefinition::Shorthand(name) => {
                            let value = resolve_binding(name, context)?;
                            object.create_data_property(PropertyKey::from(&**name), value);
                        }
                        PropertyDefinition::Spread(source) => {
                            let source = source.run(context)?;
                            if let JsValue::Object(from) = &source {
                                for key in from.enumerable_keys() {
                                    let value = from.get(&key, source.clone(), context)?;
                                    object.create_data_property(key, value);
                                }
                            }
                        }
                    }
                }
                Ok(object.into())
            }

            Node::ArrowFunctionDecl(params, body) => Ok(make_ordinary_function(
                params.clone(),
                body.clone(),
                FunctionFlags::LEXICAL_THIS_MODE,
                "",
                context,
            )),

            Node::FunctionExpr { name, params, body } => Ok(make_ordinary_function(
                params.clone(),
                body.clone(),
                FunctionFlags::CONSTRUCTABLE,
                name.as_deref().unwrap_or(""),
                context,
            )),

            Node::FunctionDecl { name, params, body } => {
                let function = make_ordinary_function(
                    params.clone(),
                    body.clone(),
                    FunctionFlags::CONSTRUCTABLE,
                    name,
                    context,
                );
                declare_var(name, Some(function), context)?;
                Ok(JsValue::undefined())
            }

            Node::VarDecl(declarations) => {
                for (name, init) in declarations.iter() {
                    let value = match init {
                        Some(init) => Some(init.run(context)?),
                        None => None,
                    };
                    declare_var(name, value, context)?;
                }
                Ok(JsValue::undefined())
            }

            Node::LetDecl(declarations) => {
                for (name, init) in declarations.iter() {
                    let value = match init {
                        Some(init) => init.run(context)?,
                        None => JsValue::undefined(),
                    };
                    let env = current_environment(context);
                    scope::create_mutable_binding(
                        &env,
                        name.to_string(),
                        false,
                        VariableScope::Block,
                        context,
                    )?;
                    scope::initialize_binding(&env, name, value, context)?;
                }
                Ok(JsValue::undefined())
            }

            Node::ConstDecl(declarations) => {
                for (name, init) in declarations.iter() {
                    let value = init.run(context)?;
                    let env = current_environment(context);
                    scope::create_immutable_binding(&env, name.to_string(), context)?;
                    scope::initialize_binding(&env, name, value, context)?;
                }
                Ok(JsValue::undefined())
            }

            Node::Assign { op, target, value } => {
                let new_value = match op {
                    None => value.run(context)?,
                    Some(op) => {
                        let current = target.run(context)?;
                        let rhs = value.run(context)?;
                        apply_assign_op(*op, &current, &rhs, context)?
                    }
                };
                assign(target, new_value.clone(), context)?;
                Ok(new_value)
            }

            Node::BinOp { op, lhs, rhs } => run_binop(*op, lhs, rhs, context),

            Node::UnaryOp { op, target } => run_unary(*op, target, context),

            Node::ConditionalOp {
                condition,
                if_true,
                if_false,
            } => {
                if condition.run(context)?.to_boolean() {
                    if_true.run(context)
                } else {
                    if_false.run(context)
                }
            }

            Node::GetConstField { obj, field } => {
                let object = obj.run(context)?;
                object.get_field(PropertyKey::from(&**field), context)
            }

            Node::GetField { obj, field } => {
                let object = obj.run(context)?;
                let key = field.run(context)?.to_property_key(context)?;
                object.get_field(key, context)
            }

            Node::Call { callee, args } => {
                let (this, function) = resolve_callee(callee, context)?;
                let arguments = evaluate_spreadable(args, context)?;
                if !function.is_function() {
                    return context
                        .throw_type_error(format!("{} is not a function", describe(callee)));
                }
                context.call(&function, &this, &arguments)
            }

            Node::New { callee, args } => {
                let function = callee.run(context)?;
                let arguments = evaluate_spreadable(args, context)?;
                context.construct(&function, &arguments)
            }

            Node::Spread(inner) => inner.run(context),

            Node::If {
                condition,
                body,
                else_node,
            } => {
                if condition.run(context)?.to_boolean() {
                    body.run(context)
                } else if let Some(else_node) = else_node {
                    else_node.run(context)
                } else {
                    Ok(JsValue::undefined())
                }
            }

            Node::WhileLoop { .. }
            | Node::DoWhileLoop { .. }
            | Node::ForLoop { .. }
            | Node::ForInLoop { .. }
            | Node::ForOfLoop { .. } => run_loop(self, None, context),

            Node::Label { name, body } => match &**body {
                loop_node @ (Node::WhileLoop { .. }
                | Node::DoWhileLoop { .. }
                | Node::ForLoop { .. }
                | Node::ForInLoop { .. }
                | Node::ForOfLoop { .. }) => run_loop(loop_node, Some(&**name), context),
                other => {
                    let result = other.run(context)?;
                    if let ExecutionState::Break(Some(label)) = context.executor_state() {
                        if **label == **name {
                            context.set_executor_state(ExecutionState::Executing);
                        }
                    }
                    Ok(result)
                }
            },

            Node::Break(label) => {
                context.set_executor_state(ExecutionState::Break(label.clone()));
                Ok(JsValue::undefined())
            }

            Node::Continue(label) => {
                context.set_executor_state(ExecutionState::Continue(label.clone()));
                Ok(JsValue::undefined())
            }

            Node::Return(argument) => {
                let value = match argument {
                    Some(argument) => argument.run(context)?,
                    None => JsValue::undefined(),
                };
                context.set_executor_state(ExecutionState::Return);
                Ok(value)
            }

            Node::Throw(argument) => {
                let value = argument.run(context)?;
                Err(value)
            }

            Node::Try {
                block,
                catch,
                finally,
            } => run_try(block, catch.as_ref(), finally.as_ref(), context),

            Node::Switch {
                discriminant,
                cases,
                default,
            } => run_switch(discriminant, cases, default.as_deref(), context),
        }
    }
}

// === Name resolution and assignment ===

fn current_environment(context: &Context) -> Environment {
    context.realm().environment.current()
}

fn resolve_binding(name: &str, context: &mut Context) -> JsResult<JsValue> {
    let env = current_environment(context);
    scope::get_binding_value(&env, name, context)
}

/// Writes `value` into the target of an assignment expression.
fn assign(target: &Node, value: JsValue, context: &mut Context) -> JsResult<()> {
    let strict = context.strict();
    match target {
        Node::Identifier(name) => {
            let env = current_environment(context);
            scope::set_mutable_binding(&env, name, value, strict, context)
        }
        Node::GetConstField { obj, field } => {
            let object = obj.run(context)?;
            object.set_field(PropertyKey::from(&**field), value, strict, context)?;
            Ok(())
        }
        Node::GetField { obj, field } => {
            let object = obj.run(context)?;
            let key = field.run(context)?.to_property_key(context)?;
            object.set_field(key, value, strict, context)?;
            Ok(())
        }
        other => context.throw_syntax_error(format!("invalid assignment to {other}")),
    }
}

/// `var` semantics: ensure the function-scoped binding exists and is
/// initialized; redeclaration is a no-op, re-initialization assigns.
fn declare_var(name: &str, value: Option<JsValue>, context: &mut Context) -> JsResult<()> {
    let env = current_environment(context);
    if !scope::has_binding(&env, name) {
        scope::create_mutable_binding(
            &env,
            name.to_owned(),
            false,
            VariableScope::Function,
            context,
        )?;
        scope::initialize_binding(&env, name, JsValue::undefined(), context)?;
    }
    if let Some(value) = value {
        scope::set_mutable_binding(&env, name, value, false, context)?;
    }
    Ok(())
}

/// Evaluates an argument/element list, flattening `...spread` entries.
fn evaluate_spreadable(nodes: &[Node], context: &mut Context) -> JsResult<Vec<JsValue>> {
    let mut values = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            Node::Spread(inner) => {
                let spread = inner.run(context)?;
                let record = get_iterator(&spread, context)?;
                while let Some(value) = record.step(context)? {
                    values.push(value);
                }
            }
            other => values.push(other.run(context)?),
        }
    }
    Ok(values)
}

/// Picks the `this` for a call from the callee shape: member calls bind
/// their base object, everything else gets `undefined` (the call machinery
/// upgrades that to the global object in sloppy mode).
fn resolve_callee(callee: &Node, context: &mut Context) -> JsResult<(JsValue, JsValue)> {
    match callee {
        Node::GetConstField { obj, field } => {
            let this = obj.run(context)?;
            let function = this.get_field(PropertyKey::from(&**field), context)?;
            Ok((this, function))
        }
        Node::GetField { obj, field } => {
            let this = obj.run(context)?;
            let key = field.run(context)?.to_property_key(context)?;
            let function = this.get_field(key, context)?;
            Ok((this, function))
        }
        Node::Identifier(name) => {
            // A `with` target containing the name becomes the receiver.
            let env = current_environment(context);
            let base = scope::with_base_object(&env, name);
            let function = resolve_binding(name, context)?;
            let this = base.map_or(JsValue::undefined(), JsValue::from);
            Ok((this, function))
        }
        other => Ok((JsValue::undefined(), other.run(context)?)),
    }
}

fn describe(node: &Node) -> String {
    match node {
        Node::Identifier(name) => name.to_string(),
        Node::GetConstField { field, .. } => field.to_string(),
        other => other.kind_name().to_owned(),
    }
}

// === Operators ===

fn run_binop(op: BinOp, lhs: &Node, rhs: &Node, context: &mut Context) -> JsResult<JsValue> {
    // The short-circuiting forms evaluate the right side lazily.
    if let BinOp::Log(log) = op {
        let left = lhs.run(context)?;
        return match log {
            LogOp::And => {
                if left.to_boolean() {
                    rhs.run(context)
                } else {
                    Ok(left)
                }
            }
            LogOp::Or => {
                if left.to_boolean() {
                    Ok(left)
                } else {
                    rhs.run(context)
                }
            }
            LogOp::Coalesce => {
                if left.is_null_or_undefined() {
                    rhs.run(context)
                } else {
                    Ok(left)
                }
            }
        };
    }

    let left = lhs.run(context)?;
    let right = rhs.run(context)?;
    match op {
        BinOp::Num(NumOp::Add) => left.add(&right, context),
        BinOp::Num(NumOp::Sub) => left.sub(&right, context),
        BinOp::Num(NumOp::Mul) => left.mul(&right, context),
        BinOp::Num(NumOp::Div) => left.div(&right, context),
        BinOp::Num(NumOp::Mod) => left.rem(&right, context),
        BinOp::Num(NumOp::Exp) => left.pow(&right, context),
        BinOp::Bit(BitOp::And) => left.bitand(&right, context),
        BinOp::Bit(BitOp::Or) => left.bitor(&right, context),
        BinOp::Bit(BitOp::Xor) => left.bitxor(&right, context),
        BinOp::Bit(BitOp::Shl) => left.shl(&right, context),
        BinOp::Bit(BitOp::Shr) => left.shr(&right, context),
        BinOp::Bit(BitOp::UShr) => left.ushr(&right, context),
        BinOp::Comp(CompOp::Equal) => Ok(left.equals(&right, context)?.into()),
        BinOp::Comp(CompOp::NotEqual) => Ok((!left.equals(&right, context)?).into()),
        BinOp::Comp(CompOp::StrictEqual) => Ok(left.strict_equals(&right).into()),
        BinOp::Comp(CompOp::StrictNotEqual) => Ok((!left.strict_equals(&right)).into()),
        BinOp::Comp(CompOp::LessThan) => Ok(left.lt(&right, context)?.into()),
        BinOp::Comp(CompOp::LessThanOrEqual) => Ok(left.le(&right, context)?.into()),
        BinOp::Comp(CompOp::GreaterThan) => Ok(left.gt(&right, context)?.into()),
        BinOp::Comp(CompOp::GreaterThanOrEqual) => Ok(left.ge(&right, context)?.into()),
        BinOp::Comp(CompOp::In) => {
            let JsValue::Object(object) = &right else {
                return context
                    .throw_type_error("cannot use 'in' operator to search in a non-object");
            };
            let key = left.to_property_key(context)?;
            Ok(object.has_property(&key).into())
        }
        BinOp::Comp(CompOp::InstanceOf) => Ok(left.instance_of(&right, context)?.into()),
        BinOp::Log(_) => unreachable!("handled above"),
    }
}

fn run_unary(op: UnaryOp, target: &Node, context: &mut Context) -> JsResult<JsValue> {
    match op {
        UnaryOp::Minus => target.run(context)?.neg(context),
        UnaryOp::Plus => Ok(JsValue::new(target.run(context)?.to_number(context)?)),
        UnaryOp::Not => Ok((!target.run(context)?.to_boolean()).into()),
        UnaryOp::Tilde => target.run(context)?.bitnot(context),
        UnaryOp::Void => {
            target.run(context)?;
            Ok(JsValue::undefined())
        }
        UnaryOp::TypeOf => {
            // `typeof unresolved` answers "undefined" instead of throwing.
            if let Node::Identifier(name) = target {
                let env = current_environment(context);
                if !scope::has_binding(&env, name) {
                    return Ok(JsValue::new("undefined"));
                }
            }
            Ok(JsValue::new(target.run(context)?.type_of()))
        }
        UnaryOp::Delete => match target {
            Node::GetConstField { obj, field } => {
                let object = obj.run(context)?;
                Ok(match object.as_object() {
                    Some(object) => object.delete(&PropertyKey::from(&**field)).into(),
                    None => true.into(),
                })
            }
            Node::GetField { obj, field } => {
                let object = obj.run(context)?;
                let key = field.run(context)?.to_property_key(context)?;
                Ok(match object.as_object() {
                    Some(object) => object.delete(&key).into(),
                    None => true.into(),
                })
            }
            Node::Identifier(name) => {
                let env = current_environment(context);
                Ok(scope::delete_binding(&env, name).into())
            }
            _ => Ok(true.into()),
        },
        UnaryOp::IncrementPre | UnaryOp::IncrementPost | UnaryOp::DecrementPre
        | UnaryOp::DecrementPost => {
            let old = target.run(context)?.to_number(context)?;
            let new = match op {
                UnaryOp::IncrementPre | UnaryOp::IncrementPost => old + 1.0,
                _ => old - 1.0,
            };
            assign(target, JsValue::new(new), context)?;
            Ok(JsValue::new(
                if matches!(op, UnaryOp::IncrementPost | UnaryOp::DecrementPost) {
                    old
                } else {
                    new
                },
            ))
        }
    }
}

fn apply_assign_op(
    op: AssignOp,
    current: &JsValue,
    rhs: &JsValue,
    context: &mut Context,
) -> JsResult<JsValue> {
    match op {
        AssignOp::Add => current.add(rhs, context),
        AssignOp::Sub => current.sub(rhs, context),
        AssignOp::Mul => current.mul(rhs, context),
        AssignOp::Div => current.div(rhs, context),
        AssignOp::Mod => current.rem(rhs, context),
        AssignOp::Exp => current.pow(rhs, context),
        AssignOp::And => current.bitand(rhs, context),
        AssignOp::Or => current.bitor(rhs, context),
        AssignOp::Xor => current.bitxor(rhs, context),
        AssignOp::Shl => current.shl(rhs, context),
        AssignOp::Shr => current.shr(rhs, context),
        AssignOp::UShr => current.ushr(rhs, context),
    }
}

// === Loops ===

/// What a pending signal means for the running loop.
enum LoopFlow {
    Continue,
    Exit,
    Propagate,
}

fn loop_flow(label: Option<&str>, context: &mut Context) -> LoopFlow {
    let state = context.executor_state().clone();
    match state {
        ExecutionState::Executing => LoopFlow::Continue,
        ExecutionState::Return => LoopFlow::Propagate,
        ExecutionState::Break(ref break_label) => {
            let mine = break_label.is_none() || break_label.as_deref() == label;
            if mine {
                context.set_executor_state(ExecutionState::Executing);
                LoopFlow::Exit
            } else {
                LoopFlow::Propagate
            }
        }
        ExecutionState::Continue(ref continue_label) => {
            let mine = continue_label.is_none() || continue_label.as_deref() == label;
            if mine {
                context.set_executor_state(ExecutionState::Executing);
                LoopFlow::Continue
            } else {
                LoopFlow::Propagate
            }
        }
    }
}

fn run_loop(node: &Node, label: Option<&str>, context: &mut Context) -> JsResult<JsValue> {
    match node {
        Node::WhileLoop { condition, body } => {
            while condition.run(context)?.to_boolean() {
                body.run(context)?;
                match loop_flow(label, context) {
                    LoopFlow::Continue => {}
                    LoopFlow::Exit => break,
                    LoopFlow::Propagate => return Ok(JsValue::undefined()),
                }
            }
            Ok(JsValue::undefined())
        }

        Node::DoWhileLoop { body, condition } => {
            loop {
                body.run(context)?;
                match loop_flow(label, context) {
                    LoopFlow::Continue => {}
                    LoopFlow::Exit => break,
                    LoopFlow::Propagate => return Ok(JsValue::undefined()),
                }
                if !condition.run(context)?.to_boolean() {
                    break;
                }
            }
            Ok(JsValue::undefined())
        }

        Node::ForLoop {
            init,
            condition,
            step,
            body,
        } => {
            // The head's `let` bindings live in their own scope.
            {
                let env = new_declarative_environment(None);
                context.realm_mut().environment.push(env);
            }
            let result = (|| {
                if let Some(init) = init {
                    init.run(context)?;
                }
                loop {
                    if let Some(condition) = condition {
                        if !condition.run(context)?.to_boolean() {
                            break;
                        }
                    }
                    body.run(context)?;
                    match loop_flow(label, context) {
                        LoopFlow::Continue => {}
                        LoopFlow::Exit => break,
                        LoopFlow::Propagate => return Ok(JsValue::undefined()),
                    }
                    if let Some(step) = step {
                        step.run(context)?;
                    }
                }
                Ok(JsValue::undefined())
            })();
            context.realm_mut().environment.pop();
            result
        }

        Node::ForInLoop {
            variable,
            kind,
            object,
            body,
        } => {
            let target = object.run(context)?;
            if target.is_null_or_undefined() {
                return Ok(JsValue::undefined());
            }
            let object = target.to_object(context)?;
            let keys = enumerate_for_in_keys(&object);
            for key in keys {
                bind_loop_variable(variable, *kind, JsValue::new(key), context)?;
                let outcome = body.run(context);
                context.realm_mut().environment.pop();
                outcome?;
                match loop_flow(label, context) {
                    LoopFlow::Continue => {}
                    LoopFlow::Exit => break,
                    LoopFlow::Propagate => return Ok(JsValue::undefined()),
                }
            }
            Ok(JsValue::undefined())
        }

        Node::ForOfLoop {
            variable,
            kind,
            iterable,
            body,
        } => {
            let iterable = iterable.run(context)?;
            let record = get_iterator(&iterable, context)?;
            loop {
                let Some(value) = record.step(context)? else {
                    break;
                };
                bind_loop_variable(variable, *kind, value, context)?;
                let outcome = body.run(context);
                context.realm_mut().environment.pop();
                outcome?;
                match loop_flow(label, context) {
                    LoopFlow::Continue => {}
                    LoopFlow::Exit => {
                        record.close(context)?;
                        break;
                    }
                    LoopFlow::Propagate => {
                        record.close(context)?;
                        return Ok(JsValue::undefined());
                    }
                }
            }
            Ok(JsValue::undefined())
        }

        _ => unreachable!("run_loop only receives loop nodes"),
    }
}

/// Pushes a per-iteration scope holding the loop variable. The caller pops
/// it after the body runs.
fn bind_loop_variable(
    name: &str,
    kind: IterationDeclKind,
    value: JsValue,
    context: &mut Context,
) -> JsResult<()> {
    {
        let env = new_declarative_environment(None);
        context.realm_mut().environment.push(env);
    }
    let bound = bind_loop_variable_inner(name, kind, value, context);
    if bound.is_err() {
        context.realm_mut().environment.pop();
    }
    bound
}

fn bind_loop_variable_inner(
    name: &str,
    kind: IterationDeclKind,
    value: JsValue,
    context: &mut Context,
) -> JsResult<()> {
    match kind {
        IterationDeclKind::Let | IterationDeclKind::Const => {
            let env = current_environment(context);
            scope::create_mutable_binding(
                &env,
                name.to_owned(),
                false,
                VariableScope::Block,
                context,
            )?;
            scope::initialize_binding(&env, name, value, context)?;
        }
        IterationDeclKind::Var => {
            declare_var(name, Some(value), context)?;
        }
        IterationDeclKind::None => {
            let env = current_environment(context);
            scope::set_mutable_binding(&env, name, value, false, context)?;
        }
    }
    Ok(())
}

/// The `for..in` key list: own-then-inherited enumerable string keys, each
/// name visited once.
fn enumerate_for_in_keys(object: &JsObject) -> Vec<crate::string::JsString> {
    let mut seen = std::collections::HashSet::new();
    let mut keys = Vec::new();
    let mut current = Some(object.clone());
    while let Some(object) = current {
        for key in object.enumerable_keys() {
            let name = key.to_js_string();
            if seen.insert(name.to_string()) {
                keys.push(name);
            }
        }
        current = match object.prototype() {
            JsValue::Object(parent) => Some(parent),
            _ => None,
        };
    }
    keys
}

// === try/catch/finally ===

fn run_try(
    block: &StatementList,
    catch: Option<&(Option<Box<str>>, StatementList)>,
    finally: Option<&StatementList>,
    context: &mut Context,
) -> JsResult<JsValue> {
    let result = {
        {
            let env = new_declarative_environment(None);
            context.realm_mut().environment.push(env);
        }
        let result = block.run(context);
        context.realm_mut().environment.pop();
        result
    };

    // A catch clause consumes the exception and binds it.
    let result = match result {
        Err(exception) => match catch {
            Some((parameter, body)) => {
                {
                    let env = new_declarative_environment(None);
                    context.realm_mut().environment.push(env);
                }
                let caught = (|| {
                    if let Some(parameter) = parameter {
                        let env = current_environment(context);
                        scope::create_mutable_binding(
                            &env,
                            parameter.to_string(),
                            false,
                            VariableScope::Block,
                            context,
                        )?;
                        scope::initialize_binding(&env, parameter, exception, context)?;
                    }
                    body.run(context)
                })();
                context.realm_mut().environment.pop();
                caught
            }
            None => Err(exception),
        },
        ok => ok,
    };

    // `finally` runs on every path; its own signal or exception replaces
    // the pending one.
    if let Some(finally) = finally {
        let saved_state = context.take_executor_state();
        {
            let env = new_declarative_environment(None);
            context.realm_mut().environment.push(env);
        }
        let finally_result = finally.run(context);
        context.realm_mut().environment.pop();

        match finally_result {
            Err(finally_exception) => return Err(finally_exception),
            Ok(finally_value) => {
                if !matches!(context.executor_state(), ExecutionState::Executing) {
                    // The finally block produced its own signal.
                    return Ok(finally_value);
                }
                context.set_executor_state(saved_state);
            }
        }
    }

    result
}

// === switch ===

fn run_switch(
    discriminant: &Node,
    cases: &[(Node, Box<[Node]>)],
    default: Option<&[Node]>,
    context: &mut Context,
) -> JsResult<JsValue> {
    let value = discriminant.run(context)?;

    {
        let env = new_declarative_environment(None);
        context.realm_mut().environment.push(env);
    }
    let result = (|| {
        let mut matched = None;
        for (index, (test, _)) in cases.iter().enumerate() {
            let test = test.run(context)?;
            if value.strict_equals(&test) {
                matched = Some(index);
                break;
            }
        }

        let mut completion = JsValue::undefined();
        if let Some(start) = matched {
            for (_, body) in &cases[start..] {
                for statement in body.iter() {
                    completion = statement.run(context)?;
                    match context.executor_state() {
                        ExecutionState::Executing => {}
                        ExecutionState::Break(None) => {
                            context.set_executor_state(ExecutionState::Executing);
                            return Ok(completion);
                        }
                        _ => return Ok(completion),
                    }
                }
            }
        }

        if matched.is_none() {
            if let Some(default) = default {
                for statement in default {
                    completion = statement.run(context)?;
                    match context.executor_state() {
                        ExecutionState::Executing => {}
                        ExecutionState::Break(None) => {
                            context.set_executor_state(ExecutionState::Executing);
                            return Ok(completion);
                        }
                        _ => return Ok(completion),
                    }
                }
            }
        }
        Ok(completion)
    })();
    context.realm_mut().environment.pop();
    result
}
