//! Diagnostic behavior: accumulation order, determinism, scope
//! discipline, literal errors, and rendering.

use lattice_common::Span;
use lattice_hir::{
    Builder, Decl, DenseLit, Expr, FuncDecl, Ident, IdentDecl, Program, ScalarKind, Stmt,
    TypeExpr,
};
use lattice_typeck::diagnostics::DiagnosticOptions;
use lattice_typeck::{check, TypeckResult};

// ── Helpers ────────────────────────────────────────────────────────────

fn proc(name: &str, body: Vec<Stmt>) -> Decl {
    Decl::Func(FuncDecl {
        name: Ident::new(name),
        params: Vec::new(),
        results: Vec::new(),
        body,
        span: Span::DUMMY,
    })
}

fn assign(target: Expr, value: Expr) -> Stmt {
    Stmt::Assign { targets: vec![target], value, span: Span::DUMMY }
}

fn messages(result: &TypeckResult) -> Vec<String> {
    result.errors.iter().map(|e| e.to_string()).collect()
}

/// A program whose body references three undeclared names in order.
fn three_undeclared() -> Program {
    let mut hb = Builder::new();
    let a = hb.var("alpha");
    let x = hb.var("x");
    let b = hb.var("beta");
    let y = hb.var("y");
    let c = hb.var("gamma");
    let z = hb.var("z");
    Program {
        decls: vec![proc("main", vec![assign(x, a), assign(y, b), assign(z, c)])],
    }
}

// ── Accumulation ───────────────────────────────────────────────────────

#[test]
fn independent_errors_surface_in_source_order() {
    let result = check(&three_undeclared());
    assert_eq!(
        messages(&result),
        vec![
            "undeclared variable 'alpha'".to_string(),
            "undeclared variable 'beta'".to_string(),
            "undeclared variable 'gamma'".to_string(),
        ]
    );
}

#[test]
fn checking_is_deterministic_and_idempotent() {
    let program = three_undeclared();
    let first = check(&program);
    let second = check(&program);
    assert_eq!(first.errors, second.errors);
    assert_eq!(first.expr_types, second.expr_types);

    let mut first_elements: Vec<&str> = first.env.element_type_names().collect();
    let mut second_elements: Vec<&str> = second.env.element_type_names().collect();
    first_elements.sort_unstable();
    second_elements.sort_unstable();
    assert_eq!(first_elements, second_elements);
}

#[test]
fn valid_programs_produce_zero_diagnostics_twice() {
    let mut hb = Builder::new();
    let one = hb.int(1);
    let x = hb.var("x");
    let program = Program { decls: vec![proc("main", vec![assign(x, one)])] };
    assert!(check(&program).errors.is_empty());
    assert!(check(&program).errors.is_empty());
}

#[test]
fn symbol_stack_returns_to_global_depth() {
    let mut hb = Builder::new();
    let cond = hb.boolean(true);
    let inner_cond = hb.boolean(false);
    let bad = hb.var("missing");
    let t = hb.var("t");
    let program = Program {
        decls: vec![proc(
            "main",
            vec![Stmt::While {
                cond,
                body: vec![Stmt::If {
                    cond: inner_cond,
                    then_body: vec![assign(t, bad)],
                    else_body: Vec::new(),
                }],
            }],
        )],
    };
    let result = check(&program);
    // errors inside nested scopes do not unbalance the stack
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.env.symbols.depth(), 1);
}

// ── Dense literals ─────────────────────────────────────────────────────

#[test]
fn literal_types() {
    let mut hb = Builder::new();

    let row = hb.tensor_lit(
        DenseLit::List(vec![DenseLit::Float(1.0), DenseLit::Float(2.0), DenseLit::Float(3.0)]),
        false,
    );
    let row_id = row.id;
    let a = hb.var("a");

    let col = hb.tensor_lit(
        DenseLit::List(vec![DenseLit::Float(1.0), DenseLit::Float(2.0), DenseLit::Float(3.0)]),
        true,
    );
    let col_id = col.id;
    let b = hb.var("b");

    let matrix = hb.tensor_lit(
        DenseLit::List(vec![
            DenseLit::List(vec![DenseLit::Int(1), DenseLit::Int(2)]),
            DenseLit::List(vec![DenseLit::Int(3), DenseLit::Int(4)]),
        ]),
        false,
    );
    let matrix_id = matrix.id;
    let c = hb.var("c");

    let program = Program {
        decls: vec![proc(
            "main",
            vec![assign(a, row), assign(b, col), assign(c, matrix)],
        )],
    };
    let result = check(&program);
    assert!(result.errors.is_empty());
    assert_eq!(result.expr_types[&row_id][0].to_string(), "tensor[3](float)");
    assert_eq!(result.expr_types[&col_id][0].to_string(), "tensor[3](float)'");
    assert_eq!(result.expr_types[&matrix_id][0].to_string(), "tensor[2,2](int)");
}

#[test]
fn mixed_kind_literal_is_a_diagnostic() {
    let mut hb = Builder::new();
    let bad = hb.tensor_lit(
        DenseLit::List(vec![DenseLit::Int(1), DenseLit::Float(2.0)]),
        false,
    );
    let x = hb.var("x");
    let result = check(&Program { decls: vec![proc("main", vec![assign(x, bad)])] });
    assert_eq!(
        messages(&result),
        vec!["tensor literals cannot mix integer and floating-point elements".to_string()]
    );
}

#[test]
fn ragged_literal_is_a_diagnostic() {
    let mut hb = Builder::new();
    let bad = hb.tensor_lit(
        DenseLit::List(vec![
            DenseLit::List(vec![DenseLit::Int(1), DenseLit::Int(2)]),
            DenseLit::List(vec![DenseLit::Int(3)]),
        ]),
        false,
    );
    let x = hb.var("x");
    let result = check(&Program { decls: vec![proc("main", vec![assign(x, bad)])] });
    assert_eq!(
        messages(&result),
        vec!["tensor literal rows must have the same shape".to_string()]
    );
}

// ── Rendering ──────────────────────────────────────────────────────────

/// One-line source with a known bad reference: `x = y;` where `y` is
/// undeclared, spanning bytes 4..5.
fn spanned_program() -> (Program, &'static str) {
    let source = "x = y;\n";
    let mut hb = Builder::new();
    let y = hb.var_at("y", Span::new(4, 5));
    let x = hb.var_at("x", Span::new(0, 1));
    let program = Program {
        decls: vec![proc("main", vec![Stmt::Assign {
            targets: vec![x],
            value: y,
            span: Span::new(0, 5),
        }])],
    };
    (program, source)
}

#[test]
fn human_rendering_carries_code_and_label() {
    let (program, source) = spanned_program();
    let result = check(&program);
    let rendered = result.render_errors(source, "main.lat", &DiagnosticOptions::colorless());
    assert_eq!(rendered.len(), 1);
    assert!(rendered[0].contains("E0001"), "missing code: {}", rendered[0]);
    assert!(
        rendered[0].contains("undeclared variable 'y'"),
        "missing message: {}",
        rendered[0]
    );
    assert!(
        rendered[0].contains("not found in this scope"),
        "missing label: {}",
        rendered[0]
    );
}

#[test]
fn json_rendering_is_one_line_with_positions() {
    let (program, source) = spanned_program();
    let result = check(&program);
    let rendered = result.render_errors(source, "main.lat", &DiagnosticOptions::json_mode());
    assert_eq!(rendered.len(), 1);
    assert!(!rendered[0].contains('\n'), "expected one line: {}", rendered[0]);

    let parsed: serde_json::Value = serde_json::from_str(&rendered[0]).unwrap();
    assert_eq!(parsed["code"], "E0001");
    assert_eq!(parsed["severity"], "error");
    assert_eq!(parsed["message"], "undeclared variable 'y'");
    assert_eq!(parsed["file"], "main.lat");
    assert_eq!(parsed["span"]["start"], 4);
    assert_eq!(parsed["span"]["line_begin"], 1);
    assert_eq!(parsed["span"]["col_begin"], 5);
}

#[test]
fn rendering_tolerates_dummy_spans() {
    let result = check(&three_undeclared());
    let rendered =
        result.render_errors("proc main\n", "main.lat", &DiagnosticOptions::colorless());
    assert_eq!(rendered.len(), 3);
    for r in &rendered {
        assert!(r.contains("E0001"), "missing code: {r}");
    }
}

// ── Recovery ───────────────────────────────────────────────────────────

#[test]
fn checker_survives_a_thoroughly_broken_program() {
    let mut hb = Builder::new();
    let bad_map = hb.map("nosuch", "nowhere");
    let t1 = hb.var("a");
    let bad_lit = hb.tensor_lit(
        DenseLit::List(vec![DenseLit::Int(1), DenseLit::Float(2.0)]),
        false,
    );
    let t2 = hb.var("b");
    let missing = hb.var("missing");
    let t3 = hb.var("c");
    let program = Program {
        decls: vec![
            Decl::Extern {
                decl: IdentDecl::new("pts", TypeExpr::set("Nope", &[])),
                span: Span::DUMMY,
            },
            proc(
                "main",
                vec![
                    assign(t1, bad_map),
                    assign(t2, bad_lit),
                    assign(t3, missing),
                    Stmt::Var {
                        decl: IdentDecl::new("v", TypeExpr::scalar(ScalarKind::Float)),
                        init: None,
                    },
                ],
            ),
        ],
    };
    let result = check(&program);
    assert_eq!(result.errors.len(), 4);
    assert_eq!(result.env.symbols.depth(), 1);
}
