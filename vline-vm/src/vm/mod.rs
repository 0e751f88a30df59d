// vline-vm - Stack-based virtual machine for VLine
// Copyright (c) 2025 The VLine Authors. MIT licensed.

//! Stack-based virtual machine executing VLine bytecode.
//!
//! Frames form a stack; a call pushes a child frame and executes it
//! recursively, and the frame pops on every exit path, error included.
//! Variable reads walk the parent chain, writes stay in the executing
//! frame. The root frame's locals survive across runs so a REPL session
//! accumulates state.

pub mod frame;
pub mod ops;
pub mod stack;

use std::collections::HashMap;
use std::rc::Rc;

use vline_parser::{ObjectData, Value, Vector};
use vline_core::builtins::{HostFn, HostIo, registry};
use vline_core::error::{Error, Result};

use crate::bytecode::{CallOperand, Constant, Op, Program};
use crate::context::FunctionTable;

pub use frame::Frame;
pub use stack::OperandStack;

/// Frame-stack depth limit applied when the host configures none.
pub const DEFAULT_MAX_DEPTH: usize = 1000;

/// The VLine virtual machine.
pub struct VM {
    stack: OperandStack,
    frames: Vec<Frame>,
    functions: FunctionTable,
    builtins: HashMap<&'static str, HostFn>,
    io: HostIo,
    /// Root-frame locals carried across `run` calls.
    globals: HashMap<String, Value>,
    max_depth: usize,
}

impl VM {
    pub fn new() -> Self {
        VM::with_io(HostIo::default())
    }

    /// A VM whose built-ins read and write through the given host I/O.
    pub fn with_io(io: HostIo) -> Self {
        VM {
            stack: OperandStack::new(),
            frames: Vec::new(),
            functions: FunctionTable::default(),
            builtins: registry(),
            io,
            globals: HashMap::new(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn set_io(&mut self, io: HostIo) {
        self.io = io;
    }

    /// Caps the frame stack; exceeding it raises a Recursion error.
    pub fn set_max_depth(&mut self, max_depth: usize) {
        self.max_depth = max_depth.max(1);
    }

    /// The persistent top-level bindings.
    pub fn globals(&self) -> &HashMap<String, Value> {
        &self.globals
    }

    /// Executes a compiled program against the given function table.
    /// Top-level bindings persist into the next call.
    pub fn run(&mut self, program: Rc<Program>, functions: FunctionTable) -> Result<Value> {
        self.functions = functions;
        let locals = std::mem::take(&mut self.globals);
        self.frames.push(Frame::with_locals(program, locals, None));
        let result = self.execute();
        if let Some(root) = self.frames.pop() {
            self.globals = root.locals;
        }
        if result.is_err() {
            self.stack.clear();
        }
        result
    }

    /// Runs the top frame to completion and returns its return slot.
    fn execute(&mut self) -> Result<Value> {
        let frame_index = match self.frames.len().checked_sub(1) {
            Some(index) => index,
            None => return Ok(Value::Null),
        };
        let program = self.frames[frame_index].program.clone();

        loop {
            let pc = self.frames[frame_index].pc;
            if pc >= program.len() {
                break;
            }
            match &program[pc] {
                Op::LoadConst(constant) => {
                    let value = match constant {
                        Constant::Num(n) => Value::Num(n.clone()),
                        Constant::Str(s) => Value::Str(s.clone()),
                        Constant::Null => Value::Null,
                    };
                    self.stack.push(value);
                }
                Op::LoadVar(name) => self.load_var(frame_index, name)?,
                Op::StoreVar(name) => {
                    let value = self.stack.pop()?;
                    self.frames[frame_index].locals.insert(name.clone(), value);
                }
                Op::BinaryOp(op) => {
                    let right = self.stack.pop()?;
                    let left = self.stack.pop()?;
                    self.stack.push(ops::binary_op(*op, left, right)?);
                }
                Op::Jump(target) => {
                    self.frames[frame_index].pc = *target;
                    continue;
                }
                Op::JumpIfFalse(target) => {
                    let condition = self.stack.pop()?;
                    if !condition.truthy() {
                        self.frames[frame_index].pc = *target;
                        continue;
                    }
                }
                Op::CallFunction(call) => self.call_function(frame_index, call)?,
                Op::CallMethod(call) => self.call_method(frame_index, call)?,
                Op::Return => {
                    let value = if self.stack.is_empty() {
                        Value::Null
                    } else {
                        self.stack.pop()?
                    };
                    self.frames[frame_index].return_value = value;
                    self.frames[frame_index].pc = program.len();
                    continue;
                }
                Op::BuildList(count) => {
                    let items = self.stack.pop_n(*count)?;
                    self.stack.push(Value::List(Vector::from(items)));
                }
                Op::Pop => {
                    self.stack.pop()?;
                }
                Op::LoadSubscript => {
                    let index = self.stack.pop()?;
                    let list = self.stack.pop()?;
                    self.stack.push(ops::subscript(&list, &index)?);
                }
                Op::StoreSubscript => {
                    let value = self.stack.pop()?;
                    let index = self.stack.pop()?;
                    let list = self.stack.pop()?;
                    self.stack.push(ops::store_subscript(list, &index, value)?);
                }
                Op::CreateObject => {
                    self.stack.push(Value::Object(ObjectData::default()));
                }
                Op::LoadMember(name) => {
                    let object = self.stack.pop()?;
                    let data = match &object {
                        Value::Object(data) => data,
                        other => {
                            return Err(Error::type_error(format!(
                                "Cannot access member of non-object ({})",
                                other.type_name()
                            )));
                        }
                    };
                    let value = data
                        .members
                        .get(name.as_str())
                        .cloned()
                        .ok_or_else(|| {
                            Error::identifier(format!("Undefined member: {}", name))
                        })?;
                    self.stack.push(value);
                }
                Op::StoreMember(name) => {
                    let object = self.stack.pop()?;
                    let value = self.stack.pop()?;
                    match object {
                        Value::Object(mut data) => {
                            data.members.insert(name.clone(), value);
                            self.stack.push(Value::Object(data));
                        }
                        other => {
                            return Err(Error::type_error(format!(
                                "Cannot store member on non-object ({})",
                                other.type_name()
                            )));
                        }
                    }
                }
                Op::LoadFunc(qualified) => {
                    let index = self.functions.lookup(qualified).ok_or_else(|| {
                        Error::runtime(format!("Function not found: {}", qualified))
                    })?;
                    let mut data = ObjectData::default();
                    data.methods.insert(qualified.clone(), index);
                    self.stack.push(Value::Object(data));
                }
                Op::StoreMemberFunc => {
                    let handle = self.stack.pop()?;
                    let method_name = self.stack.pop()?;
                    let object = self.stack.pop()?;

                    let index = match &handle {
                        Value::Object(data) => data.methods.values().next().copied(),
                        _ => None,
                    }
                    .ok_or_else(|| Error::runtime("Invalid function handle"))?;
                    let method_name = match method_name {
                        Value::Str(s) => s,
                        _ => return Err(Error::type_error("Method name must be a string")),
                    };
                    match object {
                        Value::Object(mut data) => {
                            data.methods.insert(method_name, index);
                            self.stack.push(Value::Object(data));
                        }
                        _ => {
                            return Err(Error::type_error(
                                "Cannot store method on non-object",
                            ));
                        }
                    }
                }
                Op::Raise => {
                    let value = self.stack.pop()?;
                    return Err(Error::runtime(value.to_string()));
                }
                Op::Label(_) => {}
            }
            self.frames[frame_index].pc += 1;
        }

        Ok(self.frames[frame_index].return_value.clone())
    }

    /// Pushes the first binding of `name` found on the frame chain.
    fn load_var(&mut self, frame_index: usize, name: &str) -> Result<()> {
        let mut current = Some(frame_index);
        while let Some(index) = current {
            if let Some(value) = self.frames[index].locals.get(name) {
                let value = value.clone();
                self.stack.push(value);
                return Ok(());
            }
            current = self.frames[index].parent;
        }
        Err(Error::identifier(format!("Undefined variable '{}'", name)))
    }

    /// Pushes `frame`, executes it, and pops it on both exit paths.
    /// Returns the frame's return value and its final state.
    fn run_frame(&mut self, frame: Frame) -> Result<(Value, Frame)> {
        if self.frames.len() >= self.max_depth {
            return Err(Error::recursion("Maximum recursion depth exceeded"));
        }
        self.frames.push(frame);
        let result = self.execute();
        let finished = self.frames.pop();
        let value = result?;
        match finished {
            Some(frame) => Ok((value, frame)),
            None => Err(Error::runtime("Frame stack corrupted")),
        }
    }

    /// Free-function dispatch: user functions first, then the host
    /// registry.
    fn call_function(&mut self, caller: usize, call: &CallOperand) -> Result<()> {
        let args = self.stack.pop_n(call.arg_count)?;

        if let Some(index) = self.functions.lookup(&call.name) {
            let (params, code) = match self.functions.get(index) {
                Some(record) => (record.params.clone(), record.code.clone()),
                None => {
                    return Err(Error::runtime(format!(
                        "Invalid function handle: {}",
                        call.name
                    )));
                }
            };
            let mut frame = Frame::new(code, Some(caller));
            for (i, param) in params.iter().enumerate() {
                if i < args.len() {
                    frame.locals.insert(param.clone(), args[i].clone());
                }
            }
            let (value, _) = self.run_frame(frame)?;
            self.stack.push(value);
            return Ok(());
        }

        match self.builtins.get(call.name.as_str()) {
            Some(&host) => {
                let value = host(&mut self.io, &args)?;
                self.stack.push(value);
                Ok(())
            }
            None => Err(Error::identifier(format!(
                "Undefined function: {}",
                call.name
            ))),
        }
    }

    /// Method dispatch: the stack holds the receiver object, the
    /// receiver's dotted path in the caller's scope, then the arguments.
    /// After the method returns, the receiver is rebound through that
    /// path so mutations of `self` become visible to the caller.
    fn call_method(&mut self, caller: usize, call: &CallOperand) -> Result<()> {
        let mut args = self.stack.pop_n(call.arg_count)?;
        let path = match self.stack.pop()? {
            Value::Str(path) => path,
            _ => return Err(Error::runtime("Malformed method call: missing receiver name")),
        };
        let receiver = self.stack.pop()?;
        let object = match &receiver {
            Value::Object(data) => data.clone(),
            other => {
                return Err(Error::type_error(format!(
                    "Cannot call method '{}' on {}",
                    call.name,
                    other.type_name()
                )));
            }
        };

        let method_index = object.methods.get(call.name.as_str()).copied().ok_or_else(|| {
            Error::identifier(format!("Undefined method: {}.{}", path, call.name))
        })?;
        let record = self
            .functions
            .get(method_index)
            .cloned()
            .ok_or_else(|| Error::runtime(format!("Invalid method handle: {}", call.name)))?;

        // Omitted trailing parameters fill from the compiled defaults,
        // in declaration order, each evaluated in a child of the caller.
        while args.len() < record.params.len() {
            let i = args.len();
            match &record.default_code[i] {
                Some(code) => {
                    let frame = Frame::new(code.clone(), Some(caller));
                    let (value, _) = self.run_frame(frame)?;
                    args.push(value);
                }
                None => {
                    return Err(Error::syntax(format!(
                        "Missing argument for parameter '{}'",
                        record.params[i]
                    )));
                }
            }
        }

        let mut frame = Frame::new(record.code.clone(), Some(caller));
        frame.locals.insert("self".to_string(), receiver);
        for (i, param) in record.params.iter().enumerate() {
            if i < args.len() {
                frame.locals.insert(param.clone(), args[i].clone());
            }
        }

        let (value, finished) = self.run_frame(frame)?;
        let new_self = finished
            .locals
            .get("self")
            .cloned()
            .unwrap_or(Value::Null);
        self.rebind_receiver(caller, &path, new_self);
        self.stack.push(value);
        Ok(())
    }

    /// Walks the dotted receiver path in the caller's frame and merges
    /// the method's final `self` members back in. A path that no longer
    /// leads through objects is left untouched.
    fn rebind_receiver(&mut self, caller: usize, path: &str, new_self: Value) {
        let mut components = path.split('.');
        let root = match components.next() {
            Some(root) => root,
            None => return,
        };
        let slot = self
            .frames[caller]
            .locals
            .entry(root.to_string())
            .or_insert(Value::Null);
        let rest: Vec<&str> = components.collect();
        merge_self_at_path(slot, &rest, new_self);
    }
}

/// Follows member names down to the receiver slot, then merges the
/// method's `self` members into it (or replaces it outright when either
/// side is not an object).
fn merge_self_at_path(slot: &mut Value, components: &[&str], new_self: Value) {
    match components.split_first() {
        None => match (slot, new_self) {
            (Value::Object(existing), Value::Object(updated)) => {
                for (name, value) in updated.members {
                    existing.members.insert(name, value);
                }
            }
            (slot, other) => *slot = other,
        },
        Some((component, rest)) => {
            let data = match slot {
                Value::Object(data) => data,
                _ => return,
            };
            if data.members.get(*component).is_none() {
                data.members.insert(component.to_string(), Value::Null);
            }
            if let Some(next) = data.members.get_mut(*component) {
                merge_self_at_path(next, rest, new_self);
            }
        }
    }
}

impl Default for VM {
    fn default() -> Self {
        VM::new()
    }
}
