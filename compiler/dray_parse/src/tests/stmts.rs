//! Statement parser tests.

use super::{parse, parse_stmts_ok};
use dray_diagnostic::Severity;
use dray_ir::ast::{
    CondKind, ExprKind, ForeachKind, GotoTarget, ScopeGuardKind, StmtKind,
};

#[test]
fn if_with_binding_and_else() {
    let (stmts, arena, interner) = parse_stmts_ok("if (auto p = f()) g(p); else h();");
    assert_eq!(stmts.len(), 1);

    let StmtKind::If {
        param: Some(param),
        cond,
        then_branch,
        else_branch: Some(else_branch),
    } = arena.stmt(stmts[0]).kind
    else {
        panic!("expected if with binding, got {:?}", arena.stmt(stmts[0]).kind);
    };

    let param = arena.param(param);
    assert!(param.stc.contains(dray_ir::StorageClass::AUTO));
    assert!(param.ty.is_none());
    assert_eq!(interner.lookup(param.name.unwrap()), "p");

    let ExprKind::Call { callee, .. } = arena.expr(cond).kind else {
        panic!("expected call condition");
    };
    assert!(matches!(arena.expr(callee).kind, ExprKind::Ident(_)));
    assert!(matches!(arena.stmt(then_branch).kind, StmtKind::Expr(_)));
    assert!(matches!(arena.stmt(else_branch).kind, StmtKind::Expr(_)));
}

#[test]
fn if_with_typed_binding() {
    let (stmts, arena, _) = parse_stmts_ok("if (int x = next()) use(x);");
    let StmtKind::If {
        param: Some(param), ..
    } = arena.stmt(stmts[0]).kind
    else {
        panic!("expected typed binding");
    };
    assert!(arena.param(param).ty.is_some());
}

#[test]
fn dangling_else_warns() {
    let source = "if (a)\n if (b) x();\n else y();";
    let interner = dray_ir::StringInterner::new();
    let mut handler = dray_diagnostic::CollectHandler::new();
    crate::parse_statements_from_string(source, &interner, &mut handler);
    let diags = handler.into_set();
    assert!(diags
        .iter()
        .any(|d| d.severity == Severity::Warning && d.message.contains("dangling")));

    // braces silence it
    let source = "if (a) {\n if (b) x();\n else y();\n}";
    let mut handler = dray_diagnostic::CollectHandler::new();
    crate::parse_statements_from_string(source, &interner, &mut handler);
    assert!(handler.set().is_empty(), "{:?}", handler.set());
}

#[test]
fn loops() {
    let (stmts, arena, _) = parse_stmts_ok(
        "while (a) { }\ndo { } while (b);\nfor (int i = 0; i < n; i++) { }\nfor (;;) { }",
    );
    assert!(matches!(arena.stmt(stmts[0]).kind, StmtKind::While { .. }));
    assert!(matches!(arena.stmt(stmts[1]).kind, StmtKind::DoWhile { .. }));

    let StmtKind::For {
        init: Some(init),
        cond: Some(_),
        increment: Some(_),
        ..
    } = arena.stmt(stmts[2]).kind
    else {
        panic!("expected full for header");
    };
    assert!(matches!(arena.stmt(init).kind, StmtKind::DeclStmt(_)));

    assert!(matches!(
        arena.stmt(stmts[3]).kind,
        StmtKind::For {
            init: None,
            cond: None,
            increment: None,
            ..
        }
    ));
}

#[test]
fn foreach_variants() {
    let (stmts, arena, _) = parse_stmts_ok(
        "foreach (x; arr) { }\nforeach (i, ref v; arr) { }\nforeach (i; 0 .. 10) { }\n\
         foreach_reverse (x; arr) { }\nstatic foreach (i; 0 .. 4) { }",
    );

    let StmtKind::Foreach { header, .. } = arena.stmt(stmts[0]).kind else {
        panic!();
    };
    assert_eq!(header.kind, ForeachKind::Foreach);
    assert_eq!(arena.params(header.params).len(), 1);
    assert!(header.upper.is_none());

    let StmtKind::Foreach { header, .. } = arena.stmt(stmts[1]).kind else {
        panic!();
    };
    let params = arena.params(header.params);
    assert_eq!(params.len(), 2);
    assert!(params[1].stc.contains(dray_ir::StorageClass::REF));

    let StmtKind::Foreach { header, .. } = arena.stmt(stmts[2]).kind else {
        panic!();
    };
    assert!(header.upper.is_some());

    let StmtKind::Foreach { header, .. } = arena.stmt(stmts[3]).kind else {
        panic!();
    };
    assert_eq!(header.kind, ForeachKind::ForeachReverse);

    assert!(matches!(
        arena.stmt(stmts[4]).kind,
        StmtKind::StaticForeach { .. }
    ));
}

#[test]
fn switch_with_case_ranges() {
    let (stmts, arena, _) = parse_stmts_ok(
        "final switch (x) { case 1, 2: a(); break; case 3: .. case 9: b(); break; default: c(); }",
    );
    let StmtKind::Switch { is_final, body, .. } = arena.stmt(stmts[0]).kind else {
        panic!("expected switch");
    };
    assert!(is_final);

    let StmtKind::Block(cases) = arena.stmt(body).kind else {
        panic!("expected switch body block");
    };
    let cases = arena.stmt_list(cases);
    assert_eq!(cases.len(), 3);

    let StmtKind::Case { exprs, .. } = arena.stmt(cases[0]).kind else {
        panic!("expected case");
    };
    assert_eq!(arena.expr_list(exprs).len(), 2);
    assert!(matches!(arena.stmt(cases[1]).kind, StmtKind::CaseRange { .. }));
    assert!(matches!(arena.stmt(cases[2]).kind, StmtKind::DefaultCase { .. }));
}

#[test]
fn goto_forms() {
    let (stmts, arena, _) =
        parse_stmts_ok("goto done; goto default; goto case; goto case 3; done: x();");
    assert!(matches!(
        arena.stmt(stmts[0]).kind,
        StmtKind::Goto(GotoTarget::Label(_))
    ));
    assert!(matches!(
        arena.stmt(stmts[1]).kind,
        StmtKind::Goto(GotoTarget::Default)
    ));
    assert!(matches!(
        arena.stmt(stmts[2]).kind,
        StmtKind::Goto(GotoTarget::Case(None))
    ));
    assert!(matches!(
        arena.stmt(stmts[3]).kind,
        StmtKind::Goto(GotoTarget::Case(Some(_)))
    ));
    assert!(matches!(arena.stmt(stmts[4]).kind, StmtKind::Labeled { .. }));
}

#[test]
fn try_catch_finally() {
    let (stmts, arena, interner) =
        parse_stmts_ok("try { f(); } catch (Error e) { } catch (Throwable) { } finally { g(); }");
    let StmtKind::TryCatch {
        catches,
        finally: Some(_),
        ..
    } = arena.stmt(stmts[0]).kind
    else {
        panic!("expected try");
    };
    let catches = arena.catches(catches);
    assert_eq!(catches.len(), 2);
    assert_eq!(interner.lookup(catches[0].ident.unwrap()), "e");
    assert!(catches[1].ident.is_none());
}

#[test]
fn try_without_handlers_errors() {
    let interner = dray_ir::StringInterner::new();
    let mut handler = dray_diagnostic::CollectHandler::new();
    crate::parse_statements_from_string("try { f(); } g();", &interner, &mut handler);
    assert!(handler
        .set()
        .iter()
        .any(|d| d.message.contains("`catch` or `finally` expected")));
}

#[test]
fn scope_guards() {
    let (stmts, arena, _) = parse_stmts_ok(
        "scope(exit) close(); scope(failure) rollback(); scope(success) commit();",
    );
    let kinds: Vec<_> = stmts
        .iter()
        .map(|&s| match arena.stmt(s).kind {
            StmtKind::ScopeGuard { kind, .. } => kind,
            ref other => panic!("expected scope guard, got {other:?}"),
        })
        .collect();
    assert_eq!(
        kinds,
        vec![
            ScopeGuardKind::Exit,
            ScopeGuardKind::Failure,
            ScopeGuardKind::Success
        ]
    );
}

#[test]
fn invalid_scope_guard_identifier() {
    let (_, diags, _) = parse("void f() { scope(other) g(); }");
    assert!(diags
        .iter()
        .any(|d| d.message.contains("exit")));
}

#[test]
fn synchronized_and_with() {
    let (stmts, arena, _) =
        parse_stmts_ok("synchronized { } synchronized (lock) { } with (obj) { f(); }");
    assert!(matches!(
        arena.stmt(stmts[0]).kind,
        StmtKind::Synchronized { expr: None, .. }
    ));
    assert!(matches!(
        arena.stmt(stmts[1]).kind,
        StmtKind::Synchronized { expr: Some(_), .. }
    ));
    assert!(matches!(arena.stmt(stmts[2]).kind, StmtKind::With { .. }));
}

#[test]
fn asm_blocks_split_instructions() {
    let (stmts, arena, _) = parse_stmts_ok("asm { mov EAX, 1; ret; }");
    let StmtKind::Asm { insts, .. } = arena.stmt(stmts[0]).kind else {
        panic!("expected asm");
    };
    let insts = arena.asm_insts(insts);
    assert_eq!(insts.len(), 2);
    assert!(insts[0].tokens_end > insts[0].tokens_start);
}

#[test]
fn declaration_vs_expression_statements() {
    // `int* x;` is a declaration
    let (stmts, arena, _) = parse_stmts_ok("int* x;");
    assert!(matches!(arena.stmt(stmts[0]).kind, StmtKind::DeclStmt(_)));

    // `int.max;` reads as an expression
    let (stmts, arena, _) = parse_stmts_ok("int.max;");
    let StmtKind::Expr(e) = arena.stmt(stmts[0]).kind else {
        panic!("expected expression statement");
    };
    assert!(matches!(arena.expr(e).kind, ExprKind::TypeDotId { .. }));

    // `a * b;` can be a declaration, so it is one: b of type a*
    let (stmts, arena, _) = parse_stmts_ok("a * b;");
    assert!(matches!(arena.stmt(stmts[0]).kind, StmtKind::DeclStmt(_)));

    // `a * b` in expression-only position stays a multiplication
    let (stmts, arena, _) = parse_stmts_ok("x = a * b;");
    let StmtKind::Expr(e) = arena.stmt(stmts[0]).kind else {
        panic!("expected expression statement");
    };
    assert!(matches!(arena.expr(e).kind, ExprKind::Assign { .. }));

    let (stmts, arena, _) = parse_stmts_ok("MyType* p = null;");
    assert!(matches!(arena.stmt(stmts[0]).kind, StmtKind::DeclStmt(_)));
}

#[test]
fn static_if_and_conditional_statements() {
    let (stmts, arena, _) = parse_stmts_ok(
        "static if (cond) { } else { }\nversion (Posix) { } else { }\ndebug { }\nstatic assert(x, \"m\");",
    );
    assert!(matches!(arena.stmt(stmts[0]).kind, StmtKind::StaticIf { .. }));
    let StmtKind::Conditional { kind, .. } = arena.stmt(stmts[1]).kind else {
        panic!();
    };
    assert_eq!(kind, CondKind::Version);
    let StmtKind::Conditional { kind, .. } = arena.stmt(stmts[2]).kind else {
        panic!();
    };
    assert_eq!(kind, CondKind::Debug);
    assert!(matches!(
        arena.stmt(stmts[3]).kind,
        StmtKind::StaticAssert { .. }
    ));
}

#[test]
fn mixin_and_import_statements() {
    let (stmts, arena, _) = parse_stmts_ok("mixin(\"x = 1;\"); import std.io;");
    let StmtKind::Expr(e) = arena.stmt(stmts[0]).kind else {
        panic!("expected mixin expression statement");
    };
    assert!(matches!(arena.expr(e).kind, ExprKind::Mixin(_)));
    assert!(matches!(arena.stmt(stmts[1]).kind, StmtKind::DeclStmt(_)));
}

#[test]
fn return_break_continue_throw() {
    let (stmts, arena, _) = parse_stmts_ok(
        "return; return x; break; break outer; continue; throw new E();",
    );
    assert!(matches!(arena.stmt(stmts[0]).kind, StmtKind::Return(None)));
    assert!(matches!(arena.stmt(stmts[1]).kind, StmtKind::Return(Some(_))));
    assert!(matches!(
        arena.stmt(stmts[2]).kind,
        StmtKind::Break { label: None }
    ));
    assert!(matches!(
        arena.stmt(stmts[3]).kind,
        StmtKind::Break { label: Some(_) }
    ));
    assert!(matches!(
        arena.stmt(stmts[4]).kind,
        StmtKind::Continue { label: None }
    ));
    assert!(matches!(arena.stmt(stmts[5]).kind, StmtKind::Throw(_)));
}

#[test]
fn nested_aggregate_declaration_statement() {
    let (stmts, arena, _) = parse_stmts_ok("struct Local { int x; } Local l;");
    assert!(matches!(arena.stmt(stmts[0]).kind, StmtKind::DeclStmt(_)));
    assert!(matches!(arena.stmt(stmts[1]).kind, StmtKind::DeclStmt(_)));
}

#[test]
fn missing_semicolon_recovers_on_statement_boundary() {
    let interner = dray_ir::StringInterner::new();
    let mut handler = dray_diagnostic::CollectHandler::new();
    let (stmts, arena) =
        crate::parse_statements_from_string("f() g(); h();", &interner, &mut handler);
    assert!(handler.set().len() >= 1);
    // the last statement still parses
    assert!(stmts
        .iter()
        .any(|&s| matches!(arena.stmt(s).kind, StmtKind::Expr(_))));
}

#[test]
fn pragma_statement() {
    let (stmts, arena, _) = parse_stmts_ok("pragma(msg, \"hi\");");
    assert!(matches!(arena.stmt(stmts[0]).kind, StmtKind::Pragma { .. }));
}

#[test]
fn empty_statement_deprecation() {
    let (_, diags, _) = parse("void f() { if (x) ; }");
    assert!(diags
        .iter()
        .any(|d| d.severity == Severity::Deprecation && d.message.contains("empty statement")));
}
