//! Intrinsic function registration.
//!
//! Registers the built-in math and assembly helpers into the function
//! registry before user declarations are processed. Most intrinsics have
//! fixed scalar signatures; `norm` and `dot` are shape-polymorphic and are
//! declared with an empty parameter list, which call sites treat as "skip
//! the arity and argument checks".

use crate::env::{Environment, FuncSignature, Param};
use crate::ty::Type;

fn intrinsic(name: &str, params: Vec<Param>, result: Type) -> FuncSignature {
    FuncSignature {
        name: name.into(),
        params,
        results: vec![Param { name: "result".into(), ty: Some(result) }],
        intrinsic: true,
    }
}

fn param(name: &str, ty: Type) -> Param {
    Param { name: name.into(), ty: Some(ty) }
}

/// Register all intrinsic signatures into the environment.
pub fn register_intrinsics(env: &mut Environment) {
    for name in ["sin", "cos", "tan", "asin", "acos", "sqrt", "log", "exp"] {
        env.add_function(intrinsic(name, vec![param("x", Type::float())], Type::float()));
    }

    for name in ["atan2", "pow"] {
        env.add_function(intrinsic(
            name,
            vec![param("x", Type::float()), param("y", Type::float())],
            Type::float(),
        ));
    }

    env.add_function(intrinsic(
        "mod",
        vec![param("x", Type::int()), param("y", Type::int())],
        Type::int(),
    ));

    // Shape-polymorphic: declared without parameters so call sites skip
    // arity and argument checks.
    env.add_function(intrinsic("norm", Vec::new(), Type::float()));
    env.add_function(intrinsic("dot", Vec::new(), Type::float()));
}
