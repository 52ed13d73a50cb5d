//! Declaration and lowering checks: element kinds, externs, functions,
//! tensor type annotations, field reads, and calls.

use lattice_common::Span;
use lattice_hir::{
    Builder, Decl, Expr, Field, FuncDecl, FuncParam, Ident, IdentDecl, Index, IndexSetExpr,
    Program, ScalarKind, Stmt, TypeExpr,
};
use lattice_typeck::ty::Type;
use lattice_typeck::{check, TypeckResult};

// ── Helpers ────────────────────────────────────────────────────────────

fn float() -> TypeExpr {
    TypeExpr::scalar(ScalarKind::Float)
}

fn int() -> TypeExpr {
    TypeExpr::scalar(ScalarKind::Int)
}

fn element(name: &str, fields: Vec<Field>) -> Decl {
    Decl::Element { name: Ident::new(name), fields, span: Span::DUMMY }
}

fn extern_decl(name: &str, ty: TypeExpr) -> Decl {
    Decl::Extern { decl: IdentDecl::new(name, ty), span: Span::DUMMY }
}

fn func(name: &str, params: Vec<FuncParam>, results: Vec<IdentDecl>, body: Vec<Stmt>) -> Decl {
    Decl::Func(FuncDecl { name: Ident::new(name), params, results, body, span: Span::DUMMY })
}

fn proc(name: &str, body: Vec<Stmt>) -> Decl {
    func(name, Vec::new(), Vec::new(), body)
}

fn assign(target: Expr, value: Expr) -> Stmt {
    Stmt::Assign { targets: vec![target], value, span: Span::DUMMY }
}

fn messages(result: &TypeckResult) -> Vec<String> {
    result.errors.iter().map(|e| e.to_string()).collect()
}

fn node_decls() -> Vec<Decl> {
    vec![
        element("Node", vec![Field::new("b", float())]),
        extern_decl("nodes", TypeExpr::set("Node", &[])),
    ]
}

// ── Registries ─────────────────────────────────────────────────────────

#[test]
fn element_redefinition() {
    let decls = vec![
        element("Point", vec![Field::new("x", float())]),
        element("Point", vec![Field::new("y", float())]),
    ];
    let result = check(&Program { decls });
    assert_eq!(
        messages(&result),
        vec!["multiple definitions of element type 'Point'".to_string()]
    );
    // the first registration wins
    let point = result.env.element_type("Point").unwrap();
    assert!(point.field("x").is_some());
    assert!(point.field("y").is_none());
}

#[test]
fn extern_redefinition() {
    let mut decls = node_decls();
    decls.push(extern_decl("nodes", TypeExpr::set("Node", &[])));
    let result = check(&Program { decls });
    assert_eq!(
        messages(&result),
        vec!["multiple definitions of variable 'nodes'".to_string()]
    );
}

#[test]
fn function_redefinition() {
    let decls = vec![
        func("f", Vec::new(), Vec::new(), Vec::new()),
        func("f", Vec::new(), Vec::new(), Vec::new()),
    ];
    let result = check(&Program { decls });
    assert_eq!(
        messages(&result),
        vec!["multiple definitions of function 'f'".to_string()]
    );
}

#[test]
fn undeclared_element_type_reports_once() {
    let mut hb = Builder::new();
    let nodes = hb.var("pts");
    let b = hb.field(nodes, "b");
    let x_target = hb.var("x");
    let decls = vec![
        extern_decl("pts", TypeExpr::set("Nope", &[])),
        // pts carries an undefined type: the use below stays silent
        proc("main", vec![assign(x_target, b)]),
    ];
    let result = check(&Program { decls });
    assert_eq!(
        messages(&result),
        vec!["undeclared element type 'Nope'".to_string()]
    );
}

// ── Field reads ────────────────────────────────────────────────────────

#[test]
fn undefined_field_on_set() {
    let mut hb = Builder::new();
    let nodes = hb.var("nodes");
    let zzz = hb.field(nodes, "zzz");
    let x_target = hb.var("x");
    let mut decls = node_decls();
    decls.push(proc("main", vec![assign(x_target, zzz)]));
    let result = check(&Program { decls });
    assert_eq!(messages(&result), vec!["undefined field 'zzz'".to_string()]);
}

#[test]
fn set_field_read_synthesizes_a_column_vector() {
    let mut hb = Builder::new();
    let nodes = hb.var("nodes");
    let b = hb.field(nodes, "b");
    let b_id = b.id;
    let x_target = hb.var("x");
    let mut decls = node_decls();
    decls.push(proc("main", vec![assign(x_target, b)]));
    let result = check(&Program { decls });
    assert!(result.errors.is_empty());
    assert_eq!(result.expr_types[&b_id][0].to_string(), "tensor[nodes](float)'");
}

#[test]
fn set_field_read_nests_vector_fields() {
    let mut hb = Builder::new();
    let masses = hb.var("masses");
    let v = hb.field(masses, "v");
    let v_id = v.id;
    let x_target = hb.var("x");
    let decls = vec![
        element(
            "Mass",
            vec![Field::new("v", TypeExpr::tensor(vec![IndexSetExpr::range(3)], float()))],
        ),
        extern_decl("masses", TypeExpr::set("Mass", &[])),
        proc("main", vec![assign(x_target, v)]),
    ];
    let result = check(&Program { decls });
    assert!(result.errors.is_empty());
    assert_eq!(
        result.expr_types[&v_id][0].to_string(),
        "tensor[masses](tensor[3](float))'"
    );
}

#[test]
fn set_field_read_rejects_matrix_fields() {
    let mut hb = Builder::new();
    let frames = hb.var("frames");
    let m = hb.field(frames, "m");
    let x_target = hb.var("x");
    let decls = vec![
        element(
            "Frame",
            vec![Field::new(
                "m",
                TypeExpr::tensor(vec![IndexSetExpr::range(3), IndexSetExpr::range(3)], float()),
            )],
        ),
        extern_decl("frames", TypeExpr::set("Frame", &[])),
        proc("main", vec![assign(x_target, m)]),
    ];
    let result = check(&Program { decls });
    assert_eq!(
        messages(&result),
        vec!["field 'm' must be a scalar or vector to be read through a set".to_string()]
    );
}

#[test]
fn element_field_read_keeps_the_declared_type() {
    let mut hb = Builder::new();
    let e = hb.var("e");
    let m = hb.field(e, "m");
    let r_target = hb.var("r");
    let matrix = TypeExpr::tensor(vec![IndexSetExpr::range(3), IndexSetExpr::range(3)], float());
    let decls = vec![
        element("Frame", vec![Field::new("m", matrix.clone())]),
        func(
            "t",
            vec![FuncParam::new("e", TypeExpr::element("Frame"))],
            vec![IdentDecl::new("r", matrix)],
            vec![assign(r_target, m)],
        ),
    ];
    let result = check(&Program { decls });
    assert!(result.errors.is_empty());
}

#[test]
fn field_read_requires_fields() {
    let mut hb = Builder::new();
    let one = hb.int(1);
    let x_target = hb.var("x");
    let x = hb.var("x");
    let f = hb.field(x, "f");
    let y_target = hb.var("y");
    let result = check(&Program {
        decls: vec![proc("main", vec![assign(x_target, one), assign(y_target, f)])],
    });
    assert_eq!(
        messages(&result),
        vec!["cannot access fields of a value of type 'int'".to_string()]
    );
}

// ── Tensor type annotations ────────────────────────────────────────────

#[test]
fn index_sets_must_name_sets() {
    let decls = vec![proc(
        "main",
        vec![
            Stmt::Var { decl: IdentDecl::new("n", int()), init: None },
            Stmt::Var {
                decl: IdentDecl::new(
                    "A",
                    TypeExpr::tensor(vec![IndexSetExpr::set("n")], float()),
                ),
                init: None,
            },
        ],
    )];
    let result = check(&Program { decls });
    assert_eq!(
        messages(&result),
        vec!["index set must be a set, a range, or dynamic (*)".to_string()]
    );
}

#[test]
fn undeclared_index_set() {
    let decls = vec![proc(
        "main",
        vec![Stmt::Var {
            decl: IdentDecl::new("A", TypeExpr::tensor(vec![IndexSetExpr::set("foo")], float())),
            init: None,
        }],
    )];
    let result = check(&Program { decls });
    assert_eq!(messages(&result), vec!["undeclared set 'foo'".to_string()]);
}

#[test]
fn blocked_tensor_lowering() {
    let mut hb = Builder::new();
    let a = hb.var("A");
    let a_id = a.id;
    let y_target = hb.var("y");
    let blocked = TypeExpr::tensor(
        vec![IndexSetExpr::set("nodes")],
        TypeExpr::tensor(vec![IndexSetExpr::range(3)], float()),
    );
    let mut decls = node_decls();
    decls.push(proc(
        "main",
        vec![
            Stmt::Var { decl: IdentDecl::new("A", blocked), init: None },
            assign(y_target, a),
        ],
    ));
    let result = check(&Program { decls });
    assert!(result.errors.is_empty());
    assert_eq!(
        result.expr_types[&a_id][0].to_string(),
        "tensor[nodes](tensor[3](float))"
    );
}

#[test]
fn blocked_tensor_dimension_count_must_match() {
    let blocked = TypeExpr::tensor(
        vec![IndexSetExpr::set("nodes"), IndexSetExpr::set("nodes")],
        TypeExpr::tensor(vec![IndexSetExpr::range(3)], float()),
    );
    let mut decls = node_decls();
    decls.push(proc(
        "main",
        vec![Stmt::Var { decl: IdentDecl::new("A", blocked), init: None }],
    ));
    let result = check(&Program { decls });
    assert_eq!(
        messages(&result),
        vec!["blocked tensor expects 1 outer dimensions but 2 were given".to_string()]
    );
}

#[test]
fn column_vectors_have_exactly_one_dimension() {
    let bad = TypeExpr::tensor(vec![IndexSetExpr::range(3), IndexSetExpr::range(3)], float())
        .column();
    let result = check(&Program {
        decls: vec![proc(
            "main",
            vec![Stmt::Var { decl: IdentDecl::new("A", bad), init: None }],
        )],
    });
    assert_eq!(
        messages(&result),
        vec!["column vectors must have exactly one dimension, not 2".to_string()]
    );
}

#[test]
fn tuple_length_must_be_positive() {
    let mut decls = node_decls();
    decls.push(func(
        "f",
        vec![FuncParam::new("p", TypeExpr::tuple("Node", 0))],
        Vec::new(),
        Vec::new(),
    ));
    let result = check(&Program { decls });
    assert_eq!(
        messages(&result),
        vec!["tuple length must be at least 1, not 0".to_string()]
    );
}

#[test]
fn endpoints_must_be_sets() {
    let mut decls = node_decls();
    decls.push(extern_decl("k", float()));
    decls.push(extern_decl("edges", TypeExpr::set("Node", &["nodes", "k"])));
    let result = check(&Program { decls });
    assert_eq!(messages(&result), vec!["endpoint 'k' must be a set".to_string()]);
}

// ── Tensor reads ───────────────────────────────────────────────────────

#[test]
fn tensor_read_arity() {
    let mut hb = Builder::new();
    let a = hb.var("A");
    let zero = hb.int(0);
    let read = hb.read(a, vec![Index::Expr(zero)]);
    let x_target = hb.var("x");
    let matrix = TypeExpr::tensor(vec![IndexSetExpr::range(3), IndexSetExpr::range(3)], float());
    let result = check(&Program {
        decls: vec![proc(
            "main",
            vec![
                Stmt::Var { decl: IdentDecl::new("A", matrix), init: None },
                assign(x_target, read),
            ],
        )],
    });
    assert_eq!(
        messages(&result),
        vec!["wrong number of indices: expected 2, found 1".to_string()]
    );
}

#[test]
fn slices_preserve_axes() {
    let mut hb = Builder::new();

    let a = hb.var("A");
    let zero = hb.int(0);
    let slice = hb.slice();
    let row = hb.read(a, vec![Index::Expr(zero), slice]);
    let row_id = row.id;
    let r_target = hb.var("r");

    let a = hb.var("A");
    let zero = hb.int(0);
    let slice = hb.slice();
    let col = hb.read(a, vec![slice, Index::Expr(zero)]);
    let col_id = col.id;
    let c_target = hb.var("c");

    let matrix = TypeExpr::tensor(vec![IndexSetExpr::range(3), IndexSetExpr::range(3)], float());
    let result = check(&Program {
        decls: vec![proc(
            "main",
            vec![
                Stmt::Var { decl: IdentDecl::new("A", matrix), init: None },
                assign(r_target, row),
                assign(c_target, col),
            ],
        )],
    });
    assert!(result.errors.is_empty());
    // trailing slice: a row; trailing index: a column
    assert_eq!(result.expr_types[&row_id][0].to_string(), "tensor[3](float)");
    assert_eq!(result.expr_types[&col_id][0].to_string(), "tensor[3](float)'");
}

#[test]
fn tensor_indices_are_integers() {
    let mut hb = Builder::new();
    let a = hb.var("A");
    let bad = hb.float(1.5);
    let zero = hb.int(0);
    let read = hb.read(a, vec![Index::Expr(bad), Index::Expr(zero)]);
    let x_target = hb.var("x");
    let matrix = TypeExpr::tensor(vec![IndexSetExpr::range(3), IndexSetExpr::range(3)], float());
    let result = check(&Program {
        decls: vec![proc(
            "main",
            vec![
                Stmt::Var { decl: IdentDecl::new("A", matrix), init: None },
                assign(x_target, read),
            ],
        )],
    });
    assert_eq!(
        messages(&result),
        vec![
            "tensor indices must be integers or elements of the dimension's set, found 'float'"
                .to_string()
        ]
    );
}

// ── Calls and intrinsics ───────────────────────────────────────────────

#[test]
fn calls_check_arity_and_types() {
    let mut hb = Builder::new();
    let two = hb.float(2.0);
    let ok = hb.call("sqrt", vec![two]);
    let ok_id = ok.id;
    let x_target = hb.var("x");

    let bad_arg = hb.int(2);
    let mismatch = hb.call("sqrt", vec![bad_arg]);
    let y_target = hb.var("y");

    let a1 = hb.float(1.0);
    let a2 = hb.float(2.0);
    let too_many = hb.call("sqrt", vec![a1, a2]);
    let z_target = hb.var("z");

    let result = check(&Program {
        decls: vec![proc(
            "main",
            vec![
                assign(x_target, ok),
                assign(y_target, mismatch),
                assign(z_target, too_many),
            ],
        )],
    });
    assert_eq!(
        messages(&result),
        vec![
            "call passes argument of type 'int' but function 'sqrt' expects argument of type 'float'"
                .to_string(),
            "function 'sqrt' expects 1 arguments but 2 were given".to_string(),
        ]
    );
    assert_eq!(result.expr_types[&ok_id], vec![Type::float()]);
}

#[test]
fn zero_parameter_intrinsics_skip_argument_checks() {
    let mut hb = Builder::new();
    let v = hb.var("v");
    let norm = hb.call("norm", vec![v]);
    let norm_id = norm.id;
    let x_target = hb.var("x");
    let vector = TypeExpr::tensor(vec![IndexSetExpr::range(3)], float()).column();
    let result = check(&Program {
        decls: vec![proc(
            "main",
            vec![
                Stmt::Var { decl: IdentDecl::new("v", vector), init: None },
                assign(x_target, norm),
            ],
        )],
    });
    assert!(result.errors.is_empty());
    assert_eq!(result.expr_types[&norm_id], vec![Type::float()]);
}

#[test]
fn undeclared_function_call() {
    let mut hb = Builder::new();
    let call = hb.call("nosuch", Vec::new());
    let x_target = hb.var("x");
    let result = check(&Program { decls: vec![proc("main", vec![assign(x_target, call)])] });
    assert_eq!(messages(&result), vec!["undeclared function 'nosuch'".to_string()]);
}

#[test]
fn user_functions_are_callable() {
    let mut hb = Builder::new();
    let a1 = hb.float(1.0);
    let a2 = hb.float(2.0);
    let call = hb.call("add2", vec![a1, a2]);
    let call_id = call.id;
    let x_target = hb.var("x");

    let decls = vec![
        func(
            "add2",
            vec![FuncParam::new("a", float()), FuncParam::new("b", float())],
            vec![IdentDecl::new("r", float())],
            Vec::new(),
        ),
        proc("main", vec![assign(x_target, call)]),
    ];
    let result = check(&Program { decls });
    assert!(result.errors.is_empty());
    assert_eq!(result.expr_types[&call_id], vec![Type::float()]);
}
