// vline-vm - Code generator invariant tests
// Copyright (c) 2025 The VLine Authors. MIT licensed.

mod common;

use common::compile;
use vline_core::error::Error;
use vline_vm::{Context, Op, Program};

fn emit(source: &str) -> Program {
    let mut ctx = Context::default();
    compile(source, &mut ctx).expect("compile error")
}

fn gen_err(source: &str) -> Error {
    let mut ctx = Context::default();
    match compile(source, &mut ctx) {
        Err(e) => e,
        Ok(program) => panic!("unexpectedly compiled: {:?}", program),
    }
}

/// Every jump target must land inside `[0, len]`, and every label marker
/// must be addressable at its own position.
fn assert_jump_safety(program: &Program) {
    for (position, op) in program.iter().enumerate() {
        if let Some(target) = op.jump_target() {
            assert!(
                target <= program.len(),
                "instruction {} jumps to {} beyond program of {} ops",
                position,
                target,
                program.len()
            );
        }
    }
}

const SAMPLES: [&str; 6] = [
    "x = 1",
    "if x > 1 print(x) elif x > 0 print(0) else print(-1) end",
    "while a < 10 a = a + 1 if a == 5 break end end",
    "for i in range(0, 5) if i == 3 continue end print(i) end",
    "fn fact(n) if n <= 1 return 1 end return n * fact(n - 1) end print(fact(5))",
    "class C m = 0 fn inc() self.m = self.m + 1 end end x = new C() x.inc()",
];

#[test]
fn emitted_bytecode_is_deterministic() {
    for source in SAMPLES {
        let first = emit(source);
        let second = emit(source);
        assert_eq!(first, second, "non-deterministic bytecode for: {}", source);
    }
}

#[test]
fn all_jumps_stay_in_range() {
    for source in SAMPLES {
        let program = emit(source);
        assert_jump_safety(&program);
    }
}

#[test]
fn loop_jumps_target_label_markers() {
    let program = emit("while a < 10 a = a + 1 end");
    for op in &program {
        if let Some(target) = op.jump_target() {
            assert!(
                matches!(program.get(target), Some(Op::Label(_))),
                "loop jump to {} does not land on a label",
                target
            );
        }
    }
}

#[test]
fn label_addresses_match_their_positions() {
    // Labels are markers; jumping at one must land exactly on it. Every
    // pending-resolved jump in loop code targets a label, so resolving
    // them against anything but the marker position would break the
    // previous test; here we additionally check markers are unique.
    let program = emit("while a < 10 for i in b print(i) end end");
    let mut seen = std::collections::HashSet::new();
    for op in &program {
        if let Op::Label(id) = op {
            assert!(seen.insert(*id), "duplicate label id {}", id);
        }
    }
}

#[test]
fn if_chains_fall_through_to_the_end() {
    let program = emit("if a print(1) elif b print(2) else print(3) end");
    assert_jump_safety(&program);
    // The last instruction is the end label.
    assert!(matches!(program.last(), Some(Op::Label(_))));
}

#[test]
fn break_outside_loop_is_a_syntax_error() {
    assert!(matches!(gen_err("break"), Error::Syntax(_)));
    assert!(matches!(gen_err("continue"), Error::Syntax(_)));
}

#[test]
fn constant_redefinition_is_a_syntax_error() {
    assert!(matches!(
        gen_err("const A = 1 const A = 2"),
        Error::Syntax(_)
    ));
}

#[test]
fn assignment_to_constant_is_a_syntax_error() {
    assert!(matches!(gen_err("const A = 1 A = 2"), Error::Syntax(_)));
}

#[test]
fn constants_inline_as_literals() {
    let program = emit("const A = 3 x = A");
    assert!(
        program
            .iter()
            .all(|op| !matches!(op, Op::LoadVar(name) if name == "A")),
        "constant reference compiled to LOAD_VAR: {:?}",
        program
    );
}

#[test]
fn non_literal_constant_is_a_syntax_error() {
    assert!(matches!(gen_err("const A = [1, 2]"), Error::Syntax(_)));
}

#[test]
fn unknown_class_is_a_syntax_error() {
    assert!(matches!(gen_err("x = new Nope()"), Error::Syntax(_)));
    assert!(matches!(
        gen_err("class D : Missing end"),
        Error::Syntax(_)
    ));
}

#[test]
fn missing_argument_without_default_is_a_syntax_error() {
    assert!(matches!(
        gen_err("fn f(a, b) return a end f(1)"),
        Error::Syntax(_)
    ));
}

#[test]
fn missing_import_is_a_syntax_error() {
    assert!(matches!(
        gen_err("import \"no_such_package_xyz\""),
        Error::Syntax(_)
    ));
}

#[test]
fn mutator_member_calls_rebind_the_receiver() {
    let program = emit("a = [1] a.append(2)");
    let stores = program
        .iter()
        .filter(|op| matches!(op, Op::StoreVar(name) if name == "a"))
        .count();
    // Once for the assignment, once for the rebind after append.
    assert_eq!(stores, 2, "program: {:?}", program);
}

#[test]
fn expression_statements_drain_the_stack() {
    let program = emit("1 + 2");
    assert_eq!(program.last(), Some(&Op::Pop));

    // The net stack effect of a drained statement sequence is zero.
    let program = emit("x = 1 x + 2 print(x)");
    let net: i32 = program.iter().map(|op| op.stack_effect()).sum();
    assert_eq!(net, 0, "program: {:?}", program);
}
