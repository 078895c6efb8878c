//! Textual rendering of artifacts.
//!
//! The output is deterministic and is what golden tests compare: two
//! generation runs over unchanged input must print identically.

use std::fmt::{self, Write};

use crate::artifact::{Artifact, Block, Cond, Constant, Expr, GeneratedMethod, Stmt};
use crate::data::{MutationStrategy, StaticData};

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&pretty_artifact(self))
    }
}

/// Render a whole artifact.
pub fn pretty_artifact(artifact: &Artifact) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "introspection {} for {} (targets: {}, buildable: {}, builder: {})",
        artifact.name,
        artifact.bean,
        artifact.dispatch_count,
        artifact.flags.buildable,
        artifact.flags.builder_support,
    );
    pretty_data(&mut out, &artifact.data);
    for method in &artifact.methods {
        pretty_method(&mut out, method);
    }
    out
}

fn pretty_data(out: &mut String, data: &StaticData) {
    for (i, ann) in data.annotations.iter().enumerate() {
        let names: Vec<&str> = ann.annotations.iter().map(|a| a.name.as_str()).collect();
        let _ = writeln!(out, "  annotations[{i}] = [{}]", names.join(", "));
    }
    for (i, p) in data.properties.iter().enumerate() {
        let _ = writeln!(
            out,
            "  property[{i}] {}: {} read={} write={} wither={} mutation={}{}",
            p.name,
            p.generic_ty,
            opt(p.read),
            opt(p.write),
            opt(p.wither),
            mutation_name(p.mutation),
            if p.read_only { " read-only" } else { "" },
        );
    }
    for (i, m) in data.methods.iter().enumerate() {
        let params: Vec<String> = m
            .params
            .iter()
            .map(|p| format!("{}: {}", p.name, p.ty))
            .collect();
        let _ = writeln!(
            out,
            "  method[{i}] {}({}) dispatch={}",
            m.name,
            params.join(", "),
            m.dispatch
        );
    }
    if !data.constructor_arguments.is_empty() {
        let args: Vec<String> = data
            .constructor_arguments
            .iter()
            .map(|a| format!("{}: {}", a.name, a.ty))
            .collect();
        let _ = writeln!(out, "  constructor({})", args.join(", "));
    }
    for (i, array) in data.int_arrays.iter().enumerate() {
        let _ = writeln!(out, "  int_array[{i}] = {array:?}");
    }
}

fn pretty_method(out: &mut String, method: &GeneratedMethod) {
    let params: Vec<&str> = method.kind.params().iter().map(|s| s.name()).collect();
    let _ = writeln!(out, "  fn {}({}) {{", method.kind.name(), params.join(", "));
    pretty_block(out, &method.body, 2);
    let _ = writeln!(out, "  }}");
}

fn pretty_block(out: &mut String, block: &Block, depth: usize) {
    for stmt in block {
        pretty_stmt(out, stmt, depth);
    }
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

fn pretty_stmt(out: &mut String, stmt: &Stmt, depth: usize) {
    indent(out, depth);
    match stmt {
        Stmt::Let { local, value } => {
            let _ = writeln!(out, "let %{} = {}", local.raw(), expr(value));
        }
        Stmt::Eval(value) => {
            let _ = writeln!(out, "{}", expr(value));
        }
        Stmt::SetField {
            owner,
            field,
            receiver,
            value,
        } => {
            let _ = writeln!(
                out,
                "{}.{owner}::{field} = {}",
                expr(receiver),
                expr(value)
            );
        }
        Stmt::Return(value) => {
            let _ = writeln!(out, "return {}", expr(value));
        }
        Stmt::Raise {
            kind,
            message,
            detail,
        } => match detail {
            Some(detail) => {
                let _ = writeln!(out, "raise {kind}({message:?} + {})", expr(detail));
            }
            None => {
                let _ = writeln!(out, "raise {kind}({message:?})");
            }
        },
        Stmt::If {
            cond: c,
            then,
            otherwise,
        } => {
            let _ = writeln!(out, "if {} {{", cond(c));
            pretty_block(out, then, depth + 1);
            if !otherwise.is_empty() {
                indent(out, depth);
                out.push_str("} else {\n");
                pretty_block(out, otherwise, depth + 1);
            }
            indent(out, depth);
            out.push_str("}\n");
        }
        Stmt::Switch(switch) => {
            out.push_str("switch index {\n");
            for (key, label) in &switch.keys {
                indent(out, depth + 1);
                let _ = writeln!(out, "{} => L{}", key.raw(), label.raw());
            }
            for (label, block) in &switch.blocks {
                indent(out, depth + 1);
                let _ = writeln!(out, "L{}:", label.raw());
                pretty_block(out, block, depth + 2);
            }
            indent(out, depth + 1);
            out.push_str("default:\n");
            pretty_block(out, &switch.default, depth + 2);
            indent(out, depth);
            out.push_str("}\n");
        }
        Stmt::StringSwitch(switch) => {
            let _ = writeln!(out, "switch {} {{", expr(&switch.scrutinee));
            for (key, block) in &switch.cases {
                indent(out, depth + 1);
                let _ = writeln!(out, "{key:?}:");
                pretty_block(out, block, depth + 2);
            }
            indent(out, depth + 1);
            out.push_str("default:\n");
            pretty_block(out, &switch.default, depth + 2);
            indent(out, depth);
            out.push_str("}\n");
        }
    }
}

fn cond(c: &Cond) -> String {
    match c {
        Cond::IndexEq(index) => format!("index == {}", index.raw()),
        Cond::IsNull(value) => format!("{} == null", expr(value)),
    }
}

fn expr(e: &Expr) -> String {
    match e {
        Expr::Param(slot) => slot.name().to_owned(),
        Expr::ArgAt { index, ty } => format!("({ty}) args[{index}]"),
        Expr::Local(local) => format!("%{}", local.raw()),
        Expr::Const(c) => match c {
            Constant::Null => "null".to_owned(),
            Constant::Bool(b) => b.to_string(),
            Constant::Int(i) => i.to_string(),
            Constant::Str(s) => format!("{s:?}"),
            Constant::EmptyIntArray => "int[0]".to_owned(),
        },
        Expr::Cast { value, ty } => format!("({ty}) {}", expr(value)),
        Expr::Invoke {
            owner,
            method,
            receiver,
            args,
        } => format!(
            "{}.{owner}::{}({})",
            expr(receiver),
            method.name,
            exprs(args)
        ),
        Expr::New {
            owner,
            constructor,
            args,
        } => format!("new {owner}{constructor}({})", exprs(args)),
        Expr::GetField {
            owner,
            field,
            receiver,
        } => format!("{}.{owner}::{field}", expr(receiver)),
        Expr::Select {
            cond: c,
            then,
            otherwise,
            ty,
        } => format!(
            "({} ? {} : {}): {ty}",
            cond(c),
            expr(then),
            expr(otherwise)
        ),
        Expr::IntArray(array) => format!("int_array[{}]", array.raw()),
    }
}

fn exprs(list: &[Expr]) -> String {
    list.iter().map(expr).collect::<Vec<_>>().join(", ")
}

fn opt(index: Option<crate::artifact::DispatchIndex>) -> String {
    index.map_or_else(|| "-".to_owned(), |i| i.raw().to_string())
}

fn mutation_name(strategy: MutationStrategy) -> &'static str {
    match strategy {
        MutationStrategy::Setter => "setter",
        MutationStrategy::ConstructorArgument => "constructor",
        MutationStrategy::WitherMethod => "wither",
        MutationStrategy::Unsupported => "unsupported",
    }
}
