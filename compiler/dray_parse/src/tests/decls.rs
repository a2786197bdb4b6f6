//! Declaration-level parser tests.

use super::{parse, parse_ok};
use dray_diagnostic::Severity;
use dray_ir::ast::{
    AggregateKind, BasicType, DeclKind, ExprKind, InitKind, TypeKind, VarArg,
};
use dray_ir::{ModFlags, StorageClass};

#[test]
fn module_header() {
    let (output, interner) = parse_ok("module a.b.c;");

    let decl = output.module.decl.expect("module declaration");
    let packages = output.arena.names(decl.packages);
    assert_eq!(packages.len(), 2);
    assert_eq!(interner.lookup(packages[0]), "a");
    assert_eq!(interner.lookup(packages[1]), "b");
    assert_eq!(interner.lookup(decl.name), "c");
    assert!(output.module.members.is_empty());
}

#[test]
fn shared_base_type_declarations() {
    let (output, interner) = parse_ok("int x, y = 3;");

    assert_eq!(output.module.members.len(), 2);
    let first = output.arena.decl(output.module.members[0]);
    let second = output.arena.decl(output.module.members[1]);

    let DeclKind::Var {
        name, ty, init, ..
    } = first.kind
    else {
        panic!("expected variable, got {:?}", first.kind);
    };
    assert_eq!(interner.lookup(name), "x");
    assert!(init.is_none());
    let ty = ty.expect("explicit type");
    assert!(matches!(
        output.arena.ty(ty).kind,
        TypeKind::Basic(BasicType::Int)
    ));

    let DeclKind::Var {
        name, init: Some(init), ..
    } = second.kind
    else {
        panic!("expected initialized variable, got {:?}", second.kind);
    };
    assert_eq!(interner.lookup(name), "y");
    let InitKind::Expr(value) = output.arena.init(init).kind else {
        panic!("expected expression initializer");
    };
    assert!(matches!(
        output.arena.expr(value).kind,
        ExprKind::Int { value: 3, .. }
    ));
}

#[test]
fn template_struct_with_constraint() {
    let (output, interner) = parse_ok("struct S(T) if (is(T == int)) { T x; }");

    assert_eq!(output.module.members.len(), 1);
    let tmpl = output.arena.decl(output.module.members[0]);
    let DeclKind::Template {
        name,
        tparams,
        constraint,
        members,
        is_mixin,
    } = tmpl.kind
    else {
        panic!("expected template wrapper, got {:?}", tmpl.kind);
    };
    assert!(!is_mixin);
    assert_eq!(interner.lookup(name), "S");
    assert_eq!(output.arena.tparams(tparams).len(), 1);

    let constraint = constraint.expect("constraint");
    assert!(matches!(
        output.arena.expr(constraint).kind,
        ExprKind::Is { .. }
    ));

    let inner = output.arena.decl_list(members);
    assert_eq!(inner.len(), 1);
    let DeclKind::Aggregate {
        kind,
        name: Some(agg_name),
        members: Some(fields),
        ..
    } = output.arena.decl(inner[0]).kind
    else {
        panic!("expected named aggregate with members");
    };
    assert_eq!(kind, AggregateKind::Struct);
    assert_eq!(interner.lookup(agg_name), "S");

    let fields = output.arena.decl_list(fields);
    assert_eq!(fields.len(), 1);
    let DeclKind::Var {
        name: field_name,
        ty: Some(field_ty),
        ..
    } = output.arena.decl(fields[0]).kind
    else {
        panic!("expected field");
    };
    assert_eq!(interner.lookup(field_name), "x");
    assert!(matches!(
        output.arena.ty(field_ty).kind,
        TypeKind::Path { .. }
    ));
}

#[test]
fn attributed_function_with_default_and_variadic() {
    let (output, interner) = parse_ok("@safe @nogc void f(int x = 1, ...) { }");

    assert_eq!(output.module.members.len(), 1);
    let func = output.arena.decl(output.module.members[0]);
    let DeclKind::Func { name, ty, stc, body } = func.kind else {
        panic!("expected function, got {:?}", func.kind);
    };
    assert_eq!(interner.lookup(name), "f");
    assert!(stc.contains(StorageClass::SAFE));
    assert!(stc.contains(StorageClass::NOGC));
    assert!(body.body.is_some());

    let TypeKind::Function {
        params, varargs, ..
    } = output.arena.ty(ty).kind
    else {
        panic!("expected function type");
    };
    assert_eq!(varargs, VarArg::Variadic);

    let params = output.arena.params(params);
    assert_eq!(params.len(), 1);
    assert_eq!(interner.lookup(params[0].name.unwrap()), "x");
    let default = params[0].default.expect("default value");
    assert!(matches!(
        output.arena.expr(default).kind,
        ExprKind::Int { value: 1, .. }
    ));
}

#[test]
fn anonymous_enum_members() {
    let (output, interner) = parse_ok("enum { A, B = 2, C }");

    assert_eq!(output.module.members.len(), 1);
    let decl = output.arena.decl(output.module.members[0]);
    let DeclKind::Enum {
        name: None,
        memtype: None,
        members: Some(members),
    } = decl.kind
    else {
        panic!("expected anonymous enum, got {:?}", decl.kind);
    };

    let members = output.arena.enum_members(members);
    assert_eq!(members.len(), 3);
    assert_eq!(interner.lookup(members[0].name), "A");
    assert!(members[0].value.is_none());
    let b_value = members[1].value.expect("B has a value");
    assert!(matches!(
        output.arena.expr(b_value).kind,
        ExprKind::Int { value: 2, .. }
    ));
    assert!(members[2].value.is_none());
}

#[test]
fn mixin_template_and_instantiation() {
    let (output, interner) = parse_ok("mixin template M() { int x; } mixin M!() m;");

    assert_eq!(output.module.members.len(), 2);

    let tmpl = output.arena.decl(output.module.members[0]);
    let DeclKind::Template {
        name, is_mixin, ..
    } = tmpl.kind
    else {
        panic!("expected mixin template, got {:?}", tmpl.kind);
    };
    assert!(is_mixin);
    assert_eq!(interner.lookup(name), "M");

    let inst = output.arena.decl(output.module.members[1]);
    let DeclKind::TemplateMixin {
        segments,
        ident: Some(bound),
        ..
    } = inst.kind
    else {
        panic!("expected template mixin, got {:?}", inst.kind);
    };
    assert_eq!(interner.lookup(bound), "m");
    let segs = output.arena.segments(segments);
    assert_eq!(segs.len(), 1);
    assert_eq!(interner.lookup(segs[0].name), "M");
    assert!(segs[0].tiargs.is_some());
}

#[test]
fn safety_group_conflict_diagnosed_once() {
    let (_, diags, _) = parse("@safe @system void f() { }");
    let conflicts: Vec<_> = diags
        .iter()
        .filter(|d| d.message.contains("conflicting attribute"))
        .collect();
    assert_eq!(conflicts.len(), 1, "diagnostics: {diags:?}");
    assert!(conflicts[0].message.contains("@system"));
}

#[test]
fn redundant_storage_class_diagnosed() {
    let (_, diags, _) = parse("const const int x;");
    assert!(diags
        .iter()
        .any(|d| d.message.contains("redundant attribute `const`")));
}

#[test]
fn type_ctor_vs_storage_class() {
    // const(int) applies the qualifier to the type
    let (output, _) = parse_ok("const(int) x;");
    let DeclKind::Var {
        ty: Some(ty), stc, ..
    } = output.arena.decl(output.module.members[0]).kind
    else {
        panic!("expected variable");
    };
    assert!(stc.is_empty());
    let TypeKind::Modified { mods, inner } = output.arena.ty(ty).kind else {
        panic!("expected qualified type");
    };
    assert!(mods.contains(ModFlags::CONST));
    assert!(matches!(
        output.arena.ty(inner).kind,
        TypeKind::Basic(BasicType::Int)
    ));

    // const int applies a storage class to the declaration
    let (output, _) = parse_ok("const int y;");
    let DeclKind::Var {
        ty: Some(ty), stc, ..
    } = output.arena.decl(output.module.members[0]).kind
    else {
        panic!("expected variable");
    };
    assert!(stc.contains(StorageClass::CONST));
    assert!(matches!(
        output.arena.ty(ty).kind,
        TypeKind::Basic(BasicType::Int)
    ));
}

#[test]
fn storage_class_order_is_insensitive() {
    let (a, _) = parse_ok("shared const int x;");
    let (b, _) = parse_ok("const shared int x;");
    let DeclKind::Var { stc: stc_a, .. } = a.arena.decl(a.module.members[0]).kind else {
        panic!();
    };
    let DeclKind::Var { stc: stc_b, .. } = b.arena.decl(b.module.members[0]).kind else {
        panic!();
    };
    assert_eq!(stc_a, stc_b);
}

#[test]
fn contracts_in_out_do() {
    let (output, _) = parse_ok(
        "int f(int x)\nin { assert(x > 0); }\nout (r) { assert(r > x); }\ndo { return x + 1; }",
    );
    let DeclKind::Func { body, .. } = output.arena.decl(output.module.members[0]).kind else {
        panic!("expected function");
    };
    assert_eq!(body.frequires.len(), 1);
    assert_eq!(body.fensures.len(), 1);
    let ensure = &output.arena.ensures(body.fensures)[0];
    assert!(ensure.ident.is_some());
    assert!(body.body.is_some());
}

#[test]
fn expression_contracts() {
    let (output, _) = parse_ok("int f(int x) in (x > 0) out (r; r > x) { return x + 1; }");
    let DeclKind::Func { body, .. } = output.arena.decl(output.module.members[0]).kind else {
        panic!("expected function");
    };
    assert_eq!(body.frequires.len(), 1);
    assert_eq!(body.fensures.len(), 1);
    assert!(body.body.is_some());
}

#[test]
fn legacy_body_keyword_accepted() {
    let (output, _, _) = parse("void f() in { } body { }");
    let DeclKind::Func { body, .. } = output.arena.decl(output.module.members[0]).kind else {
        panic!("expected function");
    };
    assert!(body.body.is_some());
}

#[test]
fn contract_only_declaration() {
    let (output, _) = parse_ok("interface I { int f(int x) in (x > 0); }");
    let DeclKind::Aggregate {
        members: Some(members),
        ..
    } = output.arena.decl(output.module.members[0]).kind
    else {
        panic!("expected interface");
    };
    let members = output.arena.decl_list(members);
    let DeclKind::Func { body, .. } = output.arena.decl(members[0]).kind else {
        panic!("expected method");
    };
    assert!(body.body.is_none());
    assert_eq!(body.frequires.len(), 1);
}

#[test]
fn auto_declaration_with_storage_class() {
    let (output, interner) = parse_ok("auto x = 1, y = 2;");
    assert_eq!(output.module.members.len(), 2);
    let DeclKind::Var {
        name, ty: None, stc, ..
    } = output.arena.decl(output.module.members[0]).kind
    else {
        panic!("expected inferred variable");
    };
    assert!(stc.contains(StorageClass::AUTO));
    assert_eq!(interner.lookup(name), "x");
}

#[test]
fn manifest_constant_forms() {
    let (output, _) = parse_ok("enum x = 5;");
    let DeclKind::Var { stc, ty: None, .. } =
        output.arena.decl(output.module.members[0]).kind
    else {
        panic!("expected manifest constant");
    };
    assert!(stc.contains(StorageClass::MANIFEST));

    let (output, _) = parse_ok("enum int y = 5;");
    let DeclKind::Var {
        stc, ty: Some(_), ..
    } = output.arena.decl(output.module.members[0]).kind
    else {
        panic!("expected typed manifest constant");
    };
    assert!(stc.contains(StorageClass::MANIFEST));
}

#[test]
fn alias_forms() {
    let (output, interner) = parse_ok("alias Size = ulong;");
    let DeclKind::Alias { name, .. } = output.arena.decl(output.module.members[0]).kind else {
        panic!("expected alias");
    };
    assert_eq!(interner.lookup(name), "Size");

    let (output, _) = parse_ok("alias ulong Size;");
    assert!(matches!(
        output.arena.decl(output.module.members[0]).kind,
        DeclKind::Alias { .. }
    ));

    let (output, interner) = parse_ok("struct S { int it; alias it this; }");
    let DeclKind::Aggregate {
        members: Some(members),
        ..
    } = output.arena.decl(output.module.members[0]).kind
    else {
        panic!();
    };
    let members = output.arena.decl_list(members);
    let DeclKind::AliasThis { name } = output.arena.decl(members[1]).kind else {
        panic!("expected alias-this");
    };
    assert_eq!(interner.lookup(name), "it");
}

#[test]
fn selective_import_with_rename() {
    let (output, interner) = parse_ok("import std.algo : sort, rename = find;");
    let DeclKind::Import {
        packages,
        name,
        selects,
        ..
    } = output.arena.decl(output.module.members[0]).kind
    else {
        panic!("expected import");
    };
    assert_eq!(interner.lookup(output.arena.names(packages)[0]), "std");
    assert_eq!(interner.lookup(name), "algo");

    let selects = output.arena.import_selects(selects);
    assert_eq!(selects.len(), 2);
    assert!(selects[0].alias.is_none());
    assert_eq!(interner.lookup(selects[1].alias.unwrap()), "rename");
    assert_eq!(interner.lookup(selects[1].name), "find");
}

#[test]
fn static_import_and_alias_import() {
    let (output, interner) = parse_ok("static import std.io; import io = std.io;");
    let DeclKind::Import { is_static, .. } = output.arena.decl(output.module.members[0]).kind
    else {
        panic!();
    };
    assert!(is_static);
    let DeclKind::Import {
        alias: Some(alias), ..
    } = output.arena.decl(output.module.members[1]).kind
    else {
        panic!();
    };
    assert_eq!(interner.lookup(alias), "io");
}

#[test]
fn linkage_blocks() {
    let (output, _) = parse_ok("extern(C) void f(); extern(C++, ns) struct S;");
    let DeclKind::LinkageDecl { linkage, .. } = output.arena.decl(output.module.members[0]).kind
    else {
        panic!("expected linkage declaration");
    };
    assert_eq!(linkage, dray_ir::Linkage::C);

    let DeclKind::LinkageDecl {
        linkage,
        namespaces,
        ..
    } = output.arena.decl(output.module.members[1]).kind
    else {
        panic!("expected linkage declaration");
    };
    assert_eq!(linkage, dray_ir::Linkage::Cpp);
    assert!(namespaces.is_some());
}

#[test]
fn protection_and_align_blocks() {
    let (output, _) = parse_ok("private: int x; int y;");
    let DeclKind::ProtectionDecl { prot, decls, .. } =
        output.arena.decl(output.module.members[0]).kind
    else {
        panic!("expected protection declaration");
    };
    assert_eq!(prot, dray_ir::Protection::Private);
    assert_eq!(output.arena.decl_list(decls).len(), 2);

    let (output, _) = parse_ok("align(16) struct S { }");
    let DeclKind::AlignDecl {
        alignment: Some(_),
        ..
    } = output.arena.decl(output.module.members[0]).kind
    else {
        panic!("expected align declaration");
    };
}

#[test]
fn package_protection_path() {
    let (output, interner) = parse_ok("package(a.b) void f() { }");
    let DeclKind::ProtectionDecl { prot, pkg, .. } =
        output.arena.decl(output.module.members[0]).kind
    else {
        panic!("expected protection declaration");
    };
    assert_eq!(prot, dray_ir::Protection::Package);
    let pkg = output.arena.names(pkg);
    assert_eq!(pkg.len(), 2);
    assert_eq!(interner.lookup(pkg[1]), "b");
}

#[test]
fn special_member_functions() {
    let (output, _) = parse_ok(
        "struct S {\n this(int x) { }\n this(this) { }\n ~this() { }\n}\n\
         static this() { }\nshared static ~this() { }\nunittest { }\ninvariant { }",
    );
    let DeclKind::Aggregate {
        members: Some(members),
        ..
    } = output.arena.decl(output.module.members[0]).kind
    else {
        panic!();
    };
    let members = output.arena.decl_list(members);
    assert!(matches!(
        output.arena.decl(members[0]).kind,
        DeclKind::Ctor { .. }
    ));
    assert!(matches!(
        output.arena.decl(members[1]).kind,
        DeclKind::Postblit { .. }
    ));
    assert!(matches!(
        output.arena.decl(members[2]).kind,
        DeclKind::Dtor { .. }
    ));

    assert!(matches!(
        output.arena.decl(output.module.members[1]).kind,
        DeclKind::StaticCtor { .. }
    ));
    assert!(matches!(
        output.arena.decl(output.module.members[2]).kind,
        DeclKind::SharedStaticDtor { .. }
    ));
    assert!(matches!(
        output.arena.decl(output.module.members[3]).kind,
        DeclKind::Unittest { .. }
    ));
    assert!(matches!(
        output.arena.decl(output.module.members[4]).kind,
        DeclKind::Invariant { .. }
    ));
}

#[test]
fn class_with_bases() {
    let (output, _) = parse_ok("class C : Base, I!(int) { }");
    let DeclKind::Aggregate { kind, bases, .. } =
        output.arena.decl(output.module.members[0]).kind
    else {
        panic!();
    };
    assert_eq!(kind, AggregateKind::Class);
    assert_eq!(output.arena.type_list(bases).len(), 2);
}

#[test]
fn static_if_and_version_declarations() {
    let (output, _) = parse_ok(
        "static if (x) { int a; } else { int b; }\nversion (Posix) int c;\ndebug = verbose;",
    );
    assert!(matches!(
        output.arena.decl(output.module.members[0]).kind,
        DeclKind::StaticIf { .. }
    ));
    assert!(matches!(
        output.arena.decl(output.module.members[1]).kind,
        DeclKind::Conditional { .. }
    ));
    assert!(matches!(
        output.arena.decl(output.module.members[2]).kind,
        DeclKind::CondSymbol { .. }
    ));
}

#[test]
fn static_foreach_declaration() {
    let (output, _) = parse_ok("static foreach (i; 0 .. 4) { mixin(\"int x\", i, \";\"); }");
    let DeclKind::StaticForeach { header, decls } =
        output.arena.decl(output.module.members[0]).kind
    else {
        panic!("expected static foreach");
    };
    assert!(header.upper.is_some());
    assert_eq!(output.arena.decl_list(decls).len(), 1);
}

#[test]
fn pragma_declaration() {
    let (output, interner) = parse_ok("pragma(lib, \"m\");\npragma(inline) void f() { }");
    let DeclKind::Pragma {
        name, decls: None, ..
    } = output.arena.decl(output.module.members[0]).kind
    else {
        panic!("expected pragma");
    };
    assert_eq!(interner.lookup(name), "lib");

    let DeclKind::Pragma {
        decls: Some(decls), ..
    } = output.arena.decl(output.module.members[1]).kind
    else {
        panic!("expected pragma with declaration");
    };
    assert_eq!(output.arena.decl_list(decls).len(), 1);
}

#[test]
fn initializer_forms() {
    let (output, _) = parse_ok("S s = { 1, b: 2 };");
    let DeclKind::Var {
        init: Some(init), ..
    } = output.arena.decl(output.module.members[0]).kind
    else {
        panic!();
    };
    let InitKind::Struct(fields) = output.arena.init(init).kind else {
        panic!("expected struct initializer");
    };
    let fields = output.arena.field_inits(fields);
    assert_eq!(fields.len(), 2);
    assert!(fields[0].name.is_none());
    assert!(fields[1].name.is_some());

    let (output, _) = parse_ok("int[4] a = [0: 1, 2, 3];");
    let DeclKind::Var {
        init: Some(init), ..
    } = output.arena.decl(output.module.members[0]).kind
    else {
        panic!();
    };
    let InitKind::Array(entries) = output.arena.init(init).kind else {
        panic!("expected array initializer");
    };
    let entries = output.arena.array_inits(entries);
    assert_eq!(entries.len(), 3);
    assert!(entries[0].index.is_some());

    let (output, _) = parse_ok("int x = void;");
    let DeclKind::Var {
        init: Some(init), ..
    } = output.arena.decl(output.module.members[0]).kind
    else {
        panic!();
    };
    assert!(matches!(output.arena.init(init).kind, InitKind::Void));
}

#[test]
fn template_value_and_alias_params() {
    let (output, _) = parse_ok("template T(int N : 4, alias a, this C, Rest...) { int x; }");
    let DeclKind::Template { tparams, .. } = output.arena.decl(output.module.members[0]).kind
    else {
        panic!();
    };
    use dray_ir::ast::TemplateParamKind as K;
    let tparams = output.arena.tparams(tparams);
    assert_eq!(tparams.len(), 4);
    assert!(matches!(tparams[0].kind, K::Value { spec: Some(_), .. }));
    assert!(matches!(tparams[1].kind, K::Alias { .. }));
    assert!(matches!(tparams[2].kind, K::This { .. }));
    assert!(matches!(tparams[3].kind, K::Tuple));
}

#[test]
fn premature_eof_names_the_opener() {
    let (_, diags, _) = parse("struct S {");
    assert!(diags.iter().any(|d| d.message.contains("not end of file")));
    assert!(diags
        .iter()
        .any(|d| d.supplementals.iter().any(|s| s.message.contains("opened here"))));
}

#[test]
fn error_locality_single_token() {
    // broken initializer: a bounded number of diagnostics, and the next
    // declaration still parses
    let (output, diags, interner) = parse("int x = ; int y = 2;");
    assert!(!diags.is_empty() && diags.len() <= 3, "diagnostics: {diags:?}");

    let has_y = output.module.members.iter().any(|&d| {
        matches!(
            output.arena.decl(d).kind,
            DeclKind::Var { name, .. } if interner.lookup(name) == "y"
        )
    });
    assert!(has_y, "recovery must reach the next declaration");
}

#[test]
fn resync_is_idempotent() {
    let source = "int x = ; struct ! S { } void f() { }";
    let (_, first, _) = parse(source);
    let (_, second, _) = parse(source);
    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(second.iter()) {
        assert_eq!(a.message, b.message);
        assert_eq!(a.severity, b.severity);
    }
}

#[test]
fn doc_comments_attach_to_symbols() {
    let (output, interner) = parse_ok("/// the answer\nint x;\nint y;");
    let first = output.arena.decl(output.module.members[0]);
    let second = output.arena.decl(output.module.members[1]);
    assert_eq!(interner.lookup(first.doc.expect("doc on x")), "the answer");
    assert!(second.doc.is_none());
}

#[test]
fn deprecated_with_message() {
    let (output, _) = parse_ok("deprecated(\"use g\") void f() { }");
    let DeclKind::DeprecatedDecl {
        msg: Some(_),
        decls,
    } = output.arena.decl(output.module.members[0]).kind
    else {
        panic!("expected deprecated wrapper, got {:?}",
            output.arena.decl(output.module.members[0]).kind);
    };
    let inner = output.arena.decl_list(decls);
    let DeclKind::Func { stc, .. } = output.arena.decl(inner[0]).kind else {
        panic!();
    };
    assert!(stc.contains(StorageClass::DEPRECATED));
}

#[test]
fn legacy_bracket_attributes_recover() {
    let (output, diags, _) = parse("[uda] int x;");
    assert!(diags
        .iter()
        .any(|d| d.message.contains("@(attributes)") && d.severity == Severity::Error));
    assert!(matches!(
        output.arena.decl(output.module.members[0]).kind,
        DeclKind::UserAttributeDecl { .. }
    ));
}

#[test]
fn in_with_scope_conflicts() {
    let (_, diags, _) = parse("void f(in scope int x) { }");
    assert!(diags
        .iter()
        .any(|d| d.message.contains("`in` cannot be combined")));
}
