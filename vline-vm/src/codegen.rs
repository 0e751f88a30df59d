// vline-vm - Bytecode generation for VLine
// Copyright (c) 2025 The VLine Authors. MIT licensed.

//! One-pass translation from the statement tree to linear bytecode.
//!
//! Forward jumps are emitted with placeholder targets and back-patched:
//! structured conditionals patch their jump sites directly, loops go
//! through the label table so `break`/`continue` can target labels that
//! do not exist yet. Label resolution happens per program; nested
//! function bodies compile and resolve independently.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

use vline_parser::ast::{BinOp, ClassDecl, Expr, FnDecl, Stmt, UnaryOp};
use vline_parser::bignum::BigNum;
use vline_parser::lexer::Lexer;
use vline_parser::parser::Parser;
use vline_parser::value::Value;
use vline_core::error::{Error, Result};

use crate::bytecode::{CallOperand, Constant, Op, Program};
use crate::context::{Context, FunctionRecord};

/// Fixed temporary used by `new` expressions while an object is built.
const TEMP_OBJECT: &str = "__temp_obj__";

/// The in-place list mutators that keep the method-call surface syntax
/// but compile to plain host calls plus a receiver rebind.
const LIST_MUTATORS: [&str; 3] = ["append", "erase", "insert"];

/// Compiles a statement list into a program, threading the tables in
/// `ctx`. The context keeps definitions across calls, so a session can
/// compile incrementally.
pub fn generate(statements: &[Stmt], ctx: &mut Context) -> Result<Program> {
    let mut codegen = CodeGen::new(ctx);
    let mut program = Program::new();
    for stmt in statements {
        codegen.emit_stmt(stmt, &mut program)?;
    }
    codegen.resolve_labels(&mut program)?;
    Ok(program)
}

/// Open-loop bookkeeping for `break`/`continue`.
#[derive(Debug, Clone, Copy)]
struct LoopContext {
    break_label: usize,
    continue_label: usize,
}

struct CodeGen<'ctx> {
    ctx: &'ctx mut Context,
    /// Monotonic label allocator, per program.
    next_label: usize,
    /// Label id -> instruction index of its `Label` marker.
    label_addresses: HashMap<usize, usize>,
    /// Forward jumps awaiting resolution: (instruction index, label id).
    pending_jumps: Vec<(usize, usize)>,
    loop_stack: Vec<LoopContext>,
    next_temp: usize,
}

impl<'ctx> CodeGen<'ctx> {
    fn new(ctx: &'ctx mut Context) -> Self {
        CodeGen {
            ctx,
            next_label: 0,
            label_addresses: HashMap::new(),
            pending_jumps: Vec::new(),
            loop_stack: Vec::new(),
            next_temp: 0,
        }
    }

    fn new_label(&mut self) -> usize {
        let id = self.next_label;
        self.next_label += 1;
        id
    }

    /// Records the label's address (its own position) and emits the
    /// marker.
    fn emit_label(&mut self, id: usize, program: &mut Program) {
        self.label_addresses.insert(id, program.len());
        program.push(Op::Label(id));
    }

    /// Emits a jump with a placeholder target, registered for resolution.
    fn emit_pending_jump(&mut self, op: Op, label: usize, program: &mut Program) {
        self.pending_jumps.push((program.len(), label));
        program.push(op);
    }

    fn resolve_labels(&mut self, program: &mut Program) -> Result<()> {
        for (position, label) in self.pending_jumps.drain(..) {
            let address = *self
                .label_addresses
                .get(&label)
                .ok_or_else(|| Error::runtime(format!("Unresolved label: {}", label)))?;
            program[position].patch_target(address);
        }
        self.label_addresses.clear();
        Ok(())
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn emit_stmt(&mut self, stmt: &Stmt, program: &mut Program) -> Result<()> {
        match stmt {
            Stmt::Import { package } => self.emit_import(package, program),
            Stmt::ConstDecl { name, value } => self.emit_const_decl(name, value),
            Stmt::Assign {
                target,
                index,
                value,
            } => self.emit_assign(target, index.as_ref(), value, program),
            Stmt::If {
                condition,
                body,
                elifs,
                else_body,
            } => self.emit_if(condition, body, elifs, else_body, program),
            Stmt::While { condition, body } => self.emit_while(condition, body, program),
            Stmt::For {
                variable,
                iterable,
                body,
            } => self.emit_for(variable, iterable, body, program),
            Stmt::FnDecl(decl) => {
                let name = decl.name.clone();
                self.register_function(decl, &name)?;
                Ok(())
            }
            Stmt::Return { value } => {
                self.emit_expr(value, program)?;
                program.push(Op::Return);
                Ok(())
            }
            Stmt::Break => {
                let ctx = *self
                    .loop_stack
                    .last()
                    .ok_or_else(|| Error::syntax("'break' outside loop"))?;
                self.emit_pending_jump(Op::Jump(0), ctx.break_label, program);
                Ok(())
            }
            Stmt::Continue => {
                let ctx = *self
                    .loop_stack
                    .last()
                    .ok_or_else(|| Error::syntax("'continue' outside loop"))?;
                self.emit_pending_jump(Op::Jump(0), ctx.continue_label, program);
                Ok(())
            }
            Stmt::ClassDecl(decl) => self.emit_class_decl(decl),
            Stmt::MemberAssign {
                target,
                member,
                index,
                value,
            } => self.emit_member_assign(target, member, index.as_ref(), value, program),
            Stmt::Raise { message } => {
                self.emit_expr(message, program)?;
                program.push(Op::Raise);
                Ok(())
            }
            Stmt::Expr(expr) => {
                let leaves_value = self.emit_expr(expr, program)?;
                if leaves_value {
                    program.push(Op::Pop);
                }
                Ok(())
            }
        }
    }

    /// Resolves the package against the four search paths, compiles it
    /// with the current tables, and splices the result in.
    fn emit_import(&mut self, package: &str, program: &mut Program) -> Result<()> {
        let candidates = [
            PathBuf::from(format!("{}.vl", package)),
            PathBuf::from(format!("{}/__init__.vl", package)),
            PathBuf::from(format!("lib/{}.vl", package)),
            PathBuf::from(format!("lib/{}/__init__.vl", package)),
        ];
        let source = candidates
            .iter()
            .find_map(|path| fs::read_to_string(path).ok())
            .ok_or_else(|| {
                Error::syntax(format!("Cannot open package file {}.vl", package))
            })?;

        let tokens = Lexer::new(&source).tokenize()?;
        let statements = Parser::new(tokens).parse()?;
        let imported = generate(&statements, self.ctx)?;
        program.extend(imported);
        Ok(())
    }

    /// Constants never exist at run time: the initializer is compiled to
    /// a scratch program whose final literal becomes the stored value,
    /// and references inline as `LoadConst`.
    fn emit_const_decl(&mut self, name: &str, value: &Expr) -> Result<()> {
        if self.ctx.constants.contains_key(name) {
            return Err(Error::syntax(format!(
                "Cannot redefine constant '{}'",
                name
            )));
        }
        let mut scratch = Program::new();
        self.emit_expr(value, &mut scratch)?;
        let constant = match scratch.last() {
            Some(Op::LoadConst(Constant::Num(n))) => Value::Num(n.clone()),
            Some(Op::LoadConst(Constant::Str(s))) => Value::Str(s.clone()),
            _ => return Err(Error::syntax("Invalid constant value")),
        };
        self.ctx.constants.insert(name.to_string(), constant);
        Ok(())
    }

    fn emit_assign(
        &mut self,
        target: &str,
        index: Option<&Expr>,
        value: &Expr,
        program: &mut Program,
    ) -> Result<()> {
        if self.ctx.constants.contains_key(target) {
            return Err(Error::syntax(format!(
                "Cannot assign to constant '{}'",
                target
            )));
        }
        match index {
            Some(index) => {
                program.push(Op::LoadVar(target.to_string()));
                self.emit_expr(index, program)?;
                self.emit_expr(value, program)?;
                program.push(Op::StoreSubscript);
                program.push(Op::StoreVar(target.to_string()));
            }
            None => {
                self.emit_expr(value, program)?;
                program.push(Op::StoreVar(target.to_string()));
            }
        }
        Ok(())
    }

    fn emit_if(
        &mut self,
        condition: &Expr,
        body: &[Stmt],
        elifs: &[(Expr, Vec<Stmt>)],
        else_body: &[Stmt],
        program: &mut Program,
    ) -> Result<()> {
        self.emit_expr(condition, program)?;
        let false_jump = program.len();
        program.push(Op::JumpIfFalse(0));

        for stmt in body {
            self.emit_stmt(stmt, program)?;
        }

        let mut end_jumps = Vec::new();
        if !elifs.is_empty() || !else_body.is_empty() {
            end_jumps.push(program.len());
            program.push(Op::Jump(0));
        }
        let target = program.len();
        program[false_jump].patch_target(target);

        for (i, (elif_condition, elif_body)) in elifs.iter().enumerate() {
            self.emit_expr(elif_condition, program)?;
            let elif_false_jump = program.len();
            program.push(Op::JumpIfFalse(0));

            for stmt in elif_body {
                self.emit_stmt(stmt, program)?;
            }

            if i != elifs.len() - 1 || !else_body.is_empty() {
                end_jumps.push(program.len());
                program.push(Op::Jump(0));
            }
            let target = program.len();
            program[elif_false_jump].patch_target(target);
        }

        for stmt in else_body {
            self.emit_stmt(stmt, program)?;
        }

        let end_target = program.len();
        for position in end_jumps {
            program[position].patch_target(end_target);
        }
        let end_label = self.new_label();
        self.emit_label(end_label, program);
        Ok(())
    }

    fn emit_while(
        &mut self,
        condition: &Expr,
        body: &[Stmt],
        program: &mut Program,
    ) -> Result<()> {
        let loop_ctx = LoopContext {
            break_label: self.new_label(),
            continue_label: self.new_label(),
        };
        self.loop_stack.push(loop_ctx);

        let loop_start = self.new_label();
        self.emit_label(loop_start, program);

        self.emit_expr(condition, program)?;
        self.emit_pending_jump(Op::JumpIfFalse(0), loop_ctx.break_label, program);

        for stmt in body {
            self.emit_stmt(stmt, program)?;
        }

        self.emit_label(loop_ctx.continue_label, program);
        self.emit_pending_jump(Op::Jump(0), loop_start, program);
        self.emit_label(loop_ctx.break_label, program);

        self.loop_stack.pop();
        Ok(())
    }

    /// `for v in iter` lowers to an indexed while-loop over a list held
    /// in a fresh temporary.
    fn emit_for(
        &mut self,
        variable: &str,
        iterable: &Expr,
        body: &[Stmt],
        program: &mut Program,
    ) -> Result<()> {
        let list_var = format!("__iter_list_{}__", self.next_temp);
        self.next_temp += 1;
        let index_var = format!("__index_{}__", self.next_temp);
        self.next_temp += 1;

        self.emit_expr(iterable, program)?;
        program.push(Op::StoreVar(list_var.clone()));
        program.push(Op::LoadConst(Constant::Num(BigNum::from(0))));
        program.push(Op::StoreVar(index_var.clone()));

        let loop_ctx = LoopContext {
            break_label: self.new_label(),
            continue_label: self.new_label(),
        };
        self.loop_stack.push(loop_ctx);

        let loop_start = self.new_label();
        self.emit_label(loop_start, program);

        // index < len(list)
        program.push(Op::LoadVar(index_var.clone()));
        program.push(Op::LoadVar(list_var.clone()));
        program.push(Op::CallFunction(CallOperand {
            name: "len".to_string(),
            arg_count: 1,
        }));
        program.push(Op::BinaryOp(BinOp::Lt));
        self.emit_pending_jump(Op::JumpIfFalse(0), loop_ctx.break_label, program);

        // v = list[index]
        program.push(Op::LoadVar(list_var.clone()));
        program.push(Op::LoadVar(index_var.clone()));
        program.push(Op::LoadSubscript);
        program.push(Op::StoreVar(variable.to_string()));

        for stmt in body {
            self.emit_stmt(stmt, program)?;
        }

        // index = index + 1
        self.emit_label(loop_ctx.continue_label, program);
        program.push(Op::LoadVar(index_var.clone()));
        program.push(Op::LoadConst(Constant::Num(BigNum::from(1))));
        program.push(Op::BinaryOp(BinOp::Add));
        program.push(Op::StoreVar(index_var));

        self.emit_pending_jump(Op::Jump(0), loop_start, program);
        self.emit_label(loop_ctx.break_label, program);

        self.loop_stack.pop();
        Ok(())
    }

    fn emit_class_decl(&mut self, decl: &ClassDecl) -> Result<()> {
        let mut class = decl.clone();
        if let Some(parent_name) = &decl.parent {
            let parent = self
                .ctx
                .classes
                .get(parent_name)
                .cloned()
                .ok_or_else(|| Error::syntax(format!("Class not found: {}", parent_name)))?;

            // Shallow merge: inherited members and methods the child does
            // not redefine come first, in the parent's order.
            let mut members = Vec::new();
            for (name, init) in &parent.members {
                if !decl.members.iter().any(|(n, _)| n == name) {
                    members.push((name.clone(), init.clone()));
                }
            }
            members.extend(decl.members.iter().cloned());
            class.members = members;

            let mut methods = Vec::new();
            for method in &parent.methods {
                if decl.method(&method.name).is_none() {
                    methods.push(method.clone());
                }
            }
            methods.extend(decl.methods.iter().cloned());
            class.methods = methods;
        }
        let methods = class.methods.clone();
        self.ctx.classes.insert(class.name.clone(), class);

        // A redeclaration must refresh any method records an earlier
        // `new` compiled, or instances would keep running stale bodies.
        for method in &methods {
            let qualified = format!("{}.{}", decl.name, method.name);
            if self.ctx.functions.contains(&qualified) {
                self.register_function(method, &qualified)?;
            }
        }
        Ok(())
    }

    fn emit_member_assign(
        &mut self,
        target: &str,
        member: &str,
        index: Option<&Expr>,
        value: &Expr,
        program: &mut Program,
    ) -> Result<()> {
        match index {
            None => {
                self.emit_expr(value, program)?;
                program.push(Op::LoadVar(target.to_string()));
                program.push(Op::StoreMember(member.to_string()));
                program.push(Op::StoreVar(target.to_string()));
            }
            Some(index) => {
                // Mutate the member list in place, then store it back.
                program.push(Op::LoadVar(target.to_string()));
                program.push(Op::LoadMember(member.to_string()));
                self.emit_expr(index, program)?;
                self.emit_expr(value, program)?;
                program.push(Op::StoreSubscript);
                program.push(Op::LoadVar(target.to_string()));
                program.push(Op::StoreMember(member.to_string()));
                program.push(Op::StoreVar(target.to_string()));
            }
        }
        Ok(())
    }

    /// Registers a function (or class method) and compiles its body and
    /// default-value programs. The record is inserted before the body
    /// compiles so recursive references resolve.
    fn register_function(&mut self, decl: &FnDecl, qualified: &str) -> Result<usize> {
        let placeholder = FunctionRecord {
            name: qualified.to_string(),
            params: decl.params.clone(),
            defaults: decl.defaults.clone(),
            default_code: vec![None; decl.params.len()],
            code: Rc::new(Program::new()),
        };
        let index = self.ctx.functions.insert(placeholder);

        let mut default_code = Vec::with_capacity(decl.params.len());
        for default in &decl.defaults {
            match default {
                Some(expr) => default_code.push(Some(self.compile_expr_program(expr)?)),
                None => default_code.push(None),
            }
        }
        self.ctx.functions.set_default_code(index, default_code);

        let body = generate(&decl.body, self.ctx)?;
        self.ctx.functions.set_code(index, Rc::new(body));
        Ok(index)
    }

    /// Compiles a single expression into a stand-alone program ending in
    /// `Return`; used for default parameter values.
    fn compile_expr_program(&mut self, expr: &Expr) -> Result<Rc<Program>> {
        let mut codegen = CodeGen::new(&mut *self.ctx);
        let mut program = Program::new();
        codegen.emit_expr(expr, &mut program)?;
        program.push(Op::Return);
        codegen.resolve_labels(&mut program)?;
        Ok(Rc::new(program))
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    /// Emits an expression. Returns whether a value is left on the stack;
    /// list-mutator member calls consume theirs through the receiver
    /// rebind.
    fn emit_expr(&mut self, expr: &Expr, program: &mut Program) -> Result<bool> {
        match expr {
            Expr::Number(n) => {
                program.push(Op::LoadConst(Constant::Num(n.clone())));
                Ok(true)
            }
            Expr::Str(s) => {
                program.push(Op::LoadConst(Constant::Str(s.clone())));
                Ok(true)
            }
            Expr::Null => {
                program.push(Op::LoadConst(Constant::Null));
                Ok(true)
            }
            Expr::List(elements) => {
                for element in elements {
                    self.emit_expr(element, program)?;
                }
                program.push(Op::BuildList(elements.len()));
                Ok(true)
            }
            Expr::Ident(name) => {
                match self.ctx.constants.get(name) {
                    Some(Value::Num(n)) => {
                        program.push(Op::LoadConst(Constant::Num(n.clone())));
                    }
                    Some(Value::Str(s)) => {
                        program.push(Op::LoadConst(Constant::Str(s.clone())));
                    }
                    _ => program.push(Op::LoadVar(name.clone())),
                }
                Ok(true)
            }
            Expr::Binary { op, left, right } => {
                self.emit_expr(left, program)?;
                self.emit_expr(right, program)?;
                match op {
                    BinOp::Index => program.push(Op::LoadSubscript),
                    other => program.push(Op::BinaryOp(*other)),
                }
                Ok(true)
            }
            Expr::Unary { op, expr } => {
                match op {
                    UnaryOp::Neg => {
                        program.push(Op::LoadConst(Constant::Num(BigNum::from(0))));
                        self.emit_expr(expr, program)?;
                        program.push(Op::BinaryOp(BinOp::Sub));
                    }
                    UnaryOp::Not => {
                        self.emit_expr(expr, program)?;
                        program.push(Op::LoadConst(Constant::Num(BigNum::from(0))));
                        program.push(Op::BinaryOp(BinOp::Eq));
                    }
                    UnaryOp::BitNot => {
                        program.push(Op::LoadConst(Constant::Num(BigNum::from(0))));
                        self.emit_expr(expr, program)?;
                        program.push(Op::BinaryOp(BinOp::BitNot));
                    }
                }
                Ok(true)
            }
            Expr::Call { name, args } => self.emit_call(name, args, program),
            Expr::New {
                class,
                args,
                has_parens,
            } => self.emit_new(class, args, *has_parens, program),
            Expr::Member { path, index } => {
                program.push(Op::LoadVar(path[0].clone()));
                for component in &path[1..] {
                    program.push(Op::LoadMember(component.clone()));
                }
                if let Some(index) = index {
                    self.emit_expr(index, program)?;
                    program.push(Op::LoadSubscript);
                }
                Ok(true)
            }
        }
    }

    /// Emits the receiver value for a dotted path: the root variable,
    /// then a member load per further component.
    fn emit_receiver(&self, components: &[&str], program: &mut Program) {
        program.push(Op::LoadVar(components[0].to_string()));
        for component in &components[1..] {
            program.push(Op::LoadMember(component.to_string()));
        }
    }

    /// Stores the value on top of the stack through a dotted path,
    /// rippling the mutated objects back up to the root variable.
    fn emit_member_store(&self, components: &[&str], program: &mut Program) {
        let root = components[0];
        let last = components.len() - 1;
        program.push(Op::LoadVar(root.to_string()));
        for component in &components[1..last] {
            program.push(Op::LoadMember(component.to_string()));
        }
        program.push(Op::StoreMember(components[last].to_string()));
        for depth in (1..last).rev() {
            program.push(Op::LoadVar(root.to_string()));
            for component in &components[1..depth] {
                program.push(Op::LoadMember(component.to_string()));
            }
            program.push(Op::StoreMember(components[depth].to_string()));
        }
        program.push(Op::StoreVar(root.to_string()));
    }

    fn emit_call(&mut self, name: &str, args: &[Expr], program: &mut Program) -> Result<bool> {
        // Dotted name: everything before the last dot is the receiver
        // path, the last component the method.
        if let Some((receiver_path, method)) = name.rsplit_once('.') {
            let components: Vec<&str> = receiver_path.split('.').collect();

            if LIST_MUTATORS.contains(&method) {
                // Surface method syntax over a host call: the receiver
                // value becomes the first argument and the result rebinds
                // the receiver.
                self.emit_receiver(&components, program);
                for arg in args {
                    self.emit_expr(arg, program)?;
                }
                program.push(Op::CallFunction(CallOperand {
                    name: method.to_string(),
                    arg_count: args.len() + 1,
                }));
                if components.len() == 1 {
                    program.push(Op::StoreVar(components[0].to_string()));
                } else {
                    self.emit_member_store(&components, program);
                }
                return Ok(false);
            }

            self.emit_receiver(&components, program);
            program.push(Op::LoadConst(Constant::Str(receiver_path.to_string())));
            for arg in args {
                self.emit_expr(arg, program)?;
            }
            program.push(Op::CallMethod(CallOperand {
                name: method.to_string(),
                arg_count: args.len(),
            }));
            return Ok(true);
        }

        for arg in args {
            self.emit_expr(arg, program)?;
        }

        // Known user functions default omitted trailing parameters at the
        // call site; unknown names resolve at run time.
        let mut arg_count = args.len();
        let signature = self
            .ctx
            .functions
            .by_name(name)
            .map(|record| (record.params.clone(), record.defaults.clone()));
        if let Some((params, defaults)) = signature {
            if args.len() < params.len() {
                for i in args.len()..params.len() {
                    match &defaults[i] {
                        Some(default) => {
                            let default = default.clone();
                            self.emit_expr(&default, program)?;
                        }
                        None => {
                            return Err(Error::syntax(format!(
                                "Missing argument for parameter '{}'",
                                params[i]
                            )));
                        }
                    }
                }
                arg_count = params.len();
            }
        }

        program.push(Op::CallFunction(CallOperand {
            name: name.to_string(),
            arg_count,
        }));
        Ok(true)
    }

    /// `new Cls(args)`: build the object in a fixed temporary, install
    /// members and methods, then run `__init__` when present.
    fn emit_new(
        &mut self,
        class: &str,
        args: &[Expr],
        has_parens: bool,
        program: &mut Program,
    ) -> Result<bool> {
        let cls = self
            .ctx
            .classes
            .get(class)
            .cloned()
            .ok_or_else(|| Error::syntax(format!("Class not found: {}", class)))?;

        program.push(Op::CreateObject);
        program.push(Op::StoreVar(TEMP_OBJECT.to_string()));

        for (member, init) in &cls.members {
            self.emit_expr(init, program)?;
            program.push(Op::LoadVar(TEMP_OBJECT.to_string()));
            program.push(Op::StoreMember(member.clone()));
            program.push(Op::StoreVar(TEMP_OBJECT.to_string()));
        }

        for method in &cls.methods {
            let qualified = format!("{}.{}", class, method.name);
            program.push(Op::LoadVar(TEMP_OBJECT.to_string()));
            program.push(Op::LoadConst(Constant::Str(method.name.clone())));
            program.push(Op::LoadFunc(qualified.clone()));
            program.push(Op::StoreMemberFunc);
            program.push(Op::StoreVar(TEMP_OBJECT.to_string()));

            // Method bodies compile once; later `new` expressions reuse
            // the record.
            if !self.ctx.functions.contains(&qualified) {
                self.register_function(method, &qualified)?;
            }
        }

        if has_parens {
            if cls.method("__init__").is_some() {
                program.push(Op::LoadVar(TEMP_OBJECT.to_string()));
                program.push(Op::LoadConst(Constant::Str(TEMP_OBJECT.to_string())));
                for arg in args {
                    self.emit_expr(arg, program)?;
                }
                program.push(Op::CallMethod(CallOperand {
                    name: "__init__".to_string(),
                    arg_count: args.len(),
                }));
                program.push(Op::Pop);
            } else if !args.is_empty() {
                return Err(Error::syntax(format!(
                    "Class '{}' has no __init__",
                    class
                )));
            }
        }

        program.push(Op::LoadVar(TEMP_OBJECT.to_string()));
        Ok(true)
    }
}
