// vline-vm - End-to-end execution tests
// Copyright (c) 2025 The VLine Authors. MIT licensed.

mod common;

use std::rc::Rc;

use common::{capturing_vm, compile, run_err, run_ok};
use vline_core::error::Error;
use vline_parser::Value;
use vline_vm::Context;

// ============================================================================
// Reference scenarios
// ============================================================================

#[test]
fn recursion_and_arithmetic() {
    let source = "fn fact(n) if n <= 1 return 1 end return n * fact(n-1) end print(fact(20))";
    assert_eq!(run_ok(source), "2432902008176640000\n");
}

#[test]
fn fixed_point_division() {
    assert_eq!(run_ok("print(1/3)"), "0.33333333333333333333\n");
}

#[test]
fn list_mutation_through_methods() {
    let source = "a = [1,2,3] a.append(4) a.erase(0,1) print(a)";
    assert_eq!(run_ok(source), "[2, 3, 4]\n");
}

#[test]
fn object_method_updates_self() {
    let source = "class C m=0 fn inc() self.m = self.m + 1 end end \
                  x = new C() x.inc() x.inc() print(x.m)";
    assert_eq!(run_ok(source), "2\n");
}

#[test]
fn for_with_break_and_continue() {
    let source = "for i in range(0,5) if i == 3 break end if i == 1 continue end print(i) end";
    assert_eq!(run_ok(source), "0\n2\n");
}

#[test]
fn defaulted_parameters() {
    assert_eq!(run_ok("fn f(a, b=10) return a+b end print(f(5))"), "15\n");
    assert_eq!(
        run_ok("fn f(a, b=10) return a+b end print(f(5, 1))"),
        "6\n"
    );
}

// ============================================================================
// Statements and control flow
// ============================================================================

#[test]
fn if_elif_else_branches() {
    let source = "fn pick(x) if x > 10 return \"big\" elif x > 5 return \"mid\" \
                  elif x > 0 return \"small\" else return \"none\" end end \
                  print(pick(11)) print(pick(7)) print(pick(2)) print(pick(-1))";
    assert_eq!(run_ok(source), "big\nmid\nsmall\nnone\n");
}

#[test]
fn while_loop_accumulates() {
    let source = "total = 0 i = 0 while i < 5 total = total + i i = i + 1 end print(total)";
    assert_eq!(run_ok(source), "10\n");
}

#[test]
fn while_break_and_continue() {
    let source = "i = 0 while true i = i + 1 if i == 2 continue end if i >= 4 break end print(i) end";
    assert_eq!(run_ok(source), "1\n3\n");
}

#[test]
fn nested_loops_break_innermost_only() {
    let source = "for i in range(0,3) for j in range(0,3) if j == 1 break end print(i * 10 + j) end end";
    assert_eq!(run_ok(source), "0\n10\n20\n");
}

#[test]
fn for_iterates_over_list_literal() {
    assert_eq!(run_ok("for x in [5, 6, 7] print(x) end"), "5\n6\n7\n");
}

#[test]
fn subscript_assignment() {
    assert_eq!(run_ok("a = [1, 2, 3] a[1] = 9 print(a)"), "[1, 9, 3]\n");
}

#[test]
fn constants_evaluate_at_compile_time() {
    assert_eq!(run_ok("const TAU = 6.28 print(TAU / 2)"), "3.14\n");
    assert_eq!(run_ok("const GREETING = \"hi\" print(GREETING)"), "hi\n");
}

#[test]
fn raise_aborts_with_runtime_error() {
    let e = run_err("raise \"boom\"");
    assert_eq!(e.to_string(), "Runtime Error: boom");

    let (_, output) = common::run_program("print(1) raise \"stop\" print(2)");
    assert_eq!(output, "1\n");
}

// ============================================================================
// Expressions and operators
// ============================================================================

#[test]
fn operator_semantics() {
    assert_eq!(run_ok("print(7 % 3)"), "1\n");
    assert_eq!(run_ok("print(2 ^ 10)"), "1024\n");
    assert_eq!(run_ok("print(-5 + 2)"), "-3\n");
    assert_eq!(run_ok("print(\"ab\" + \"cd\")"), "abcd\n");
    assert_eq!(run_ok("print(\"ab\" * 3)"), "ababab\n");
    assert_eq!(run_ok("print([1, 2] * 2)"), "[1, 2, 1, 2]\n");
    assert_eq!(run_ok("print(6 | 1)"), "7\n");
    assert_eq!(run_ok("print(6 & 3)"), "2\n");
}

#[test]
fn truthiness_drives_conditions_and_logic() {
    assert_eq!(run_ok("if \"\" print(1) else print(2) end"), "2\n");
    assert_eq!(run_ok("if [] print(1) else print(2) end"), "2\n");
    assert_eq!(run_ok("if null print(1) else print(2) end"), "2\n");
    assert_eq!(run_ok("print(2 and 3)"), "1\n");
    assert_eq!(run_ok("print(0 or \"x\")"), "1\n");
    assert_eq!(run_ok("print(0 or 0)"), "0\n");
    assert_eq!(run_ok("print(not 0)"), "1\n");
    assert_eq!(run_ok("print(not 7)"), "0\n");
}

#[test]
fn equality_is_cross_type_safe() {
    assert_eq!(run_ok("print(1 == \"1\")"), "0\n");
    assert_eq!(run_ok("print(1 != \"1\")"), "1\n");
    assert_eq!(run_ok("print([1, 2] == [1, 2])"), "1\n");
    assert!(matches!(run_err("print(1 < \"2\")"), Error::Type(_)));
}

#[test]
fn builtin_conversions() {
    assert_eq!(run_ok("print(number(\"12.5\") + 0.5)"), "13\n");
    assert_eq!(run_ok("print(str(42) + \"!\")"), "42!\n");
    assert_eq!(run_ok("print(list(\"abc\"))"), "[a, b, c]\n");
    assert_eq!(run_ok("print(type(3)) print(type(\"s\")) print(type([])) print(type(null))"),
        "number\nstring\nlist\nnull\n");
    assert_eq!(run_ok("print(len(\"hello\")) print(len([1,2,3]))"), "5\n3\n");
}

#[test]
fn builtin_math() {
    assert_eq!(run_ok("print(floor(3.7))"), "3\n");
    assert_eq!(run_ok("print(ceil(3.2))"), "4\n");
    assert_eq!(run_ok("print(round(3.5))"), "4\n");
    assert_eq!(run_ok("print(round(3.4))"), "3\n");
    assert_eq!(run_ok("print(abs(-3.5))"), "3.5\n");
    assert_eq!(run_ok("print(pow(2, 8))"), "256\n");
    assert_eq!(run_ok("print(sqrt(2.25))"), "1.5\n");
}

#[test]
fn list_helpers_as_free_functions() {
    assert_eq!(run_ok("a = append([1], 2) print(a)"), "[1, 2]\n");
    assert_eq!(run_ok("a = insert([1, 3], 1, 2) print(a)"), "[1, 2, 3]\n");
    assert_eq!(run_ok("print(range(2, 6))"), "[2, 3, 4, 5]\n");
}

#[test]
fn insert_as_method_call() {
    assert_eq!(run_ok("a = [1, 3] a.insert(1, 2) print(a)"), "[1, 2, 3]\n");
}

// ============================================================================
// Functions and frames
// ============================================================================

#[test]
fn functions_read_outer_scope_but_write_locally() {
    // The function sees the caller's binding through the frame chain…
    assert_eq!(run_ok("x = 5 fn show() print(x) end show()"), "5\n");
    // …but its writes stay local.
    assert_eq!(
        run_ok("x = 1 fn clobber() x = 99 return x end print(clobber()) print(x)"),
        "99\n1\n"
    );
}

#[test]
fn caller_locals_survive_calls_unchanged() {
    let source = "x = 1 y = 2 fn f(a) x = 99 y = 98 return a + 1 end z = f(5)";
    let mut ctx = Context::default();
    let (mut vm, _buffer) = capturing_vm();
    let program = compile(source, &mut ctx).expect("compile error");
    vm.run(Rc::new(program), ctx.functions.clone())
        .expect("run error");

    let globals = vm.globals();
    assert_eq!(globals.get("x"), Some(&Value::from(1)));
    assert_eq!(globals.get("y"), Some(&Value::from(2)));
    assert_eq!(globals.get("z"), Some(&Value::from(6)));
}

#[test]
fn top_level_state_persists_across_runs() {
    let mut ctx = Context::default();
    let (mut vm, buffer) = capturing_vm();

    let program = compile("x = 40 fn bump(n) return n + 2 end", &mut ctx).expect("compile");
    vm.run(Rc::new(program), ctx.functions.clone()).expect("run");

    let program = compile("print(bump(x))", &mut ctx).expect("compile");
    vm.run(Rc::new(program), ctx.functions.clone()).expect("run");

    assert_eq!(buffer.contents(), "42\n");
}

#[test]
fn recursion_depth_is_bounded() {
    let source = "fn f() return f() end f()";
    let mut ctx = Context::default();
    let (mut vm, _buffer) = capturing_vm();
    vm.set_max_depth(32);
    let program = compile(source, &mut ctx).expect("compile error");
    let result = vm.run(Rc::new(program), ctx.functions.clone());
    assert!(matches!(result, Err(Error::Recursion(_))));
}

#[test]
fn method_defaults_fill_in_declaration_order() {
    let source = "class C m = 0 fn set(a = 3, b = 4) self.m = a * 10 + b end end \
                  x = new C() x.set() print(x.m) x.set(7) print(x.m) x.set(7, 8) print(x.m)";
    assert_eq!(run_ok(source), "34\n74\n78\n");
}

// ============================================================================
// Classes and objects
// ============================================================================

#[test]
fn init_runs_with_arguments() {
    let source = "class Point x = 0 y = 0 fn __init__(x, y) self.x = x self.y = y end end \
                  p = new Point(3, 4) print(p.x) print(p.y)";
    assert_eq!(run_ok(source), "3\n4\n");
}

#[test]
fn new_without_init_is_fine() {
    assert_eq!(run_ok("class C m = 7 end x = new C() print(x.m)"), "7\n");
    assert_eq!(run_ok("class C m = 7 end x = new C print(x.m)"), "7\n");
}

#[test]
fn inheritance_merges_members_and_methods() {
    let source = "class Animal legs = 4 fn describe() return self.legs end end \
                  class Bird : Animal legs = 2 fn fly() return 1 end end \
                  b = new Bird() print(b.describe()) print(b.fly())";
    assert_eq!(run_ok(source), "2\n1\n");
}

#[test]
fn methods_can_return_values_and_chain_state() {
    let source = "class Counter n = 0 fn add(k) self.n = self.n + k return self.n end end \
                  c = new Counter() print(c.add(5)) print(c.add(7))";
    assert_eq!(run_ok(source), "5\n12\n");
}

#[test]
fn nested_receiver_paths_rebind() {
    let source = "class Inner n = 0 fn bump() self.n = self.n + 1 end end \
                  class Outer inner = 0 end \
                  o = new Outer() o.inner = new Inner() \
                  o.inner.bump() o.inner.bump() print(o.inner.n)";
    assert_eq!(run_ok(source), "2\n");
}

#[test]
fn methods_can_mutate_member_lists() {
    let source = "class Bag items = [] fn add(v) self.items.append(v) end end \
                  b = new Bag() b.add(1) b.add(2) print(b.items)";
    assert_eq!(run_ok(source), "[1, 2]\n");
}

#[test]
fn member_assignment_with_subscript() {
    let source = "class Box items = [1, 2, 3] end b = new Box() b.items[1] = 9 print(b.items)";
    assert_eq!(run_ok(source), "[1, 9, 3]\n");
}

#[test]
fn objects_are_value_copied() {
    let source = "class C m = 1 end a = new C() b = a b.m = 2 print(a.m) print(b.m)";
    assert_eq!(run_ok(source), "1\n2\n");
}

// ============================================================================
// Host I/O
// ============================================================================

#[test]
fn input_reads_from_host_stdin() {
    let mut ctx = Context::default();
    let buffer = common::SharedBuffer::default();
    let io = vline_core::HostIo::with(
        Box::new(std::io::Cursor::new(b"world\n".to_vec())),
        Box::new(buffer.clone()),
    );
    let mut vm = vline_vm::VM::with_io(io);

    let program =
        compile("name = input() print(\"hi \" + name)", &mut ctx).expect("compile error");
    vm.run(Rc::new(program), ctx.functions.clone())
        .expect("run error");

    assert_eq!(buffer.contents(), "hi world\n");
}

#[test]
fn write_then_read_round_trips_a_file() {
    let path = std::env::temp_dir().join("vline_rw_test.txt");
    let path = path.display();
    let source = format!(
        "write(\"{0}\", \"line one\\nline two\") print(read(\"{0}\"))",
        path
    );
    assert_eq!(run_ok(&source), "line one\nline two\n");
}

#[test]
fn reading_a_missing_file_is_an_io_error() {
    assert!(matches!(
        run_err("read(\"/no/such/vline/file.txt\")"),
        Error::Io(_)
    ));
}

// ============================================================================
// Error taxonomy
// ============================================================================

#[test]
fn zero_division_errors() {
    assert!(matches!(run_err("print(1 / 0)"), Error::ZeroDivision(_)));
    assert!(matches!(run_err("print(1 % 0)"), Error::ZeroDivision(_)));
}

#[test]
fn index_errors() {
    assert!(matches!(run_err("a = [1] print(a[1])"), Error::Index(_)));
    assert!(matches!(run_err("a = [1] print(a[-1])"), Error::Index(_)));
    assert!(matches!(
        run_err("a = [1] a.erase(0, 2) print(a)"),
        Error::Index(_)
    ));
}

#[test]
fn identifier_errors() {
    assert!(matches!(run_err("print(nope)"), Error::Identifier(_)));
    assert!(matches!(run_err("nope(1)"), Error::Identifier(_)));
    assert!(matches!(
        run_err("class C m = 0 end x = new C() print(x.missing)"),
        Error::Identifier(_)
    ));
    assert!(matches!(
        run_err("class C m = 0 end x = new C() x.missing()"),
        Error::Identifier(_)
    ));
}

#[test]
fn type_errors() {
    assert!(matches!(run_err("print(1 + \"a\")"), Error::Type(_)));
    assert!(matches!(run_err("print(\"a\" % \"b\")"), Error::Type(_)));
    assert!(matches!(run_err("a = 3 print(a[0])"), Error::Type(_)));
    assert!(matches!(run_err("print(len(3))"), Error::Type(_)));
    assert!(matches!(run_err("print(sqrt(-1))"), Error::Type(_)));
}

#[test]
fn error_messages_are_single_prefixed_lines() {
    assert_eq!(
        run_err("print(1 / 0)").to_string(),
        "Zero Division Error: Division by zero"
    );
    assert_eq!(
        run_err("print(missing_var)").to_string(),
        "Identifier Error: Undefined variable 'missing_var'"
    );
}
