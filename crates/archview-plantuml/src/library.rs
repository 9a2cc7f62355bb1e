//! Library class diagrams: variables and function signatures.

use std::fmt::Write;

use archview_blueprint::DiagramError;

use crate::node::{Node, Refs};

const STEREOTYPE: &str = "library";

fn visibility_symbol(visibility: Option<&str>) -> char {
    match visibility {
        Some("protected") => '~',
        Some("private") => '-',
        _ => '+',
    }
}

/// Resolved datatype label with `const`, `volatile`, pointer and array
/// modifiers applied.
fn datatype(item: Node<'_>, refs: Refs<'_>) -> Result<String, DiagramError> {
    let mut datatype = refs.label(item, "datatype")?.to_owned();
    if item.flag("isConst") {
        datatype.insert_str(0, "const ");
    }
    if item.flag("isVolatile") {
        datatype.insert_str(0, "volatile ");
    }
    if item.flag("isPointer") {
        datatype.push('*');
    }
    if item.flag("isArray")
        && let Some(size) = item.scalar("isArray")
    {
        let _ = write!(datatype, "[{size}]");
    }
    Ok(datatype)
}

/// `class LABEL <<library>>{ ... }` listing variables then functions.
pub(crate) fn library(node: Node<'_>, refs: Refs<'_>) -> Result<String, DiagramError> {
    let mut out = String::new();
    let _ = writeln!(out, "class {} <<{STEREOTYPE}>>{{", node.label()?);

    for var in node.children("variables")? {
        let _ = writeln!(
            out,
            "  {}{} : {}",
            visibility_symbol(var.opt_str("visibility")),
            var.label()?,
            datatype(var, refs)?
        );
    }

    let functions = node.field_name(&["functions", "funcions"]);
    for function in node.children(functions)? {
        let params = function
            .children("parameters")?
            .into_iter()
            .map(|param| Ok(format!("{}: {}", param.label()?, refs.label(param, "datatype")?)))
            .collect::<Result<Vec<_>, DiagramError>>()?;

        let _ = write!(
            out,
            "  {}{}({})",
            visibility_symbol(function.opt_str("visibility")),
            function.label()?,
            params.join(", ")
        );
        if let Some(returns) = function.opt_child("returntype") {
            let _ = write!(out, " : {}", datatype(returns, refs)?);
        }
        out.push('\n');
    }

    out.push_str("}\n");
    let _ = writeln!(out, "hide <<{STEREOTYPE}>> circle");
    Ok(out)
}
