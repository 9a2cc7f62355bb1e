//! Layer and component diagrams.
//!
//! Both are built from ports: a port has a direction, an interface
//! reference and an optional usage stereotype. Incoming ports are drawn as
//! required interfaces (`<--(`), outgoing ones as provided (`-->()`).

use std::borrow::Cow;
use std::fmt::Write;

use archview_blueprint::DiagramError;

use crate::node::{Node, Refs};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    In,
    Out,
}

impl Direction {
    fn parse(value: &str) -> Self {
        if value == "in" { Self::In } else { Self::Out }
    }

    fn name(self) -> &'static str {
        match self {
            Self::In => "in",
            Self::Out => "out",
        }
    }
}

#[derive(Debug)]
struct Port<'n, 's> {
    label: &'n str,
    direction: Direction,
    interface: &'s str,
    usage: Option<Cow<'n, str>>,
}

impl<'n, 's> Port<'n, 's> {
    fn read(node: Node<'n>, refs: Refs<'s>) -> Result<Self, DiagramError> {
        Ok(Self {
            label: node.opt_str("label").unwrap_or_default(),
            direction: Direction::parse(node.str("direction")?),
            interface: refs.label(node, "interface")?,
            usage: refs.opt_text(node, "use")?,
        })
    }

    fn read_all(owner: Node<'n>, refs: Refs<'s>) -> Result<Vec<Self>, DiagramError> {
        owner
            .children("ports")?
            .into_iter()
            .map(|port| Self::read(port, refs))
            .collect()
    }

    fn suffix(&self) -> String {
        self.usage
            .as_ref()
            .map(|usage| format!(" : <<{usage}>>"))
            .unwrap_or_default()
    }

    /// Edge from `from` to this port's interface.
    fn interface_edge(&self, indent: &str, from: &str) -> String {
        let arrow = match self.direction {
            Direction::In => "<--(",
            Direction::Out => "-->()",
        };
        format!("{indent}{from} {arrow} {}{}", self.interface, self.suffix())
    }
}

/// `package LABEL <<layer>> { ... }` with one component per entry.
pub(crate) fn layer(node: Node<'_>, refs: Refs<'_>) -> Result<String, DiagramError> {
    let mut out = String::new();
    let _ = writeln!(out, "package {} <<layer>> {{", node.label()?);

    for component in node.children("components")? {
        let label = component.label()?;
        let _ = writeln!(out, "  component {label}");
        for port in Port::read_all(component, refs)? {
            let _ = writeln!(out, "{}", port.interface_edge("  ", label));
        }
    }

    out.push_str("}\n");
    Ok(out)
}

/// `component LABEL{ ... }` with ports, sub-components and external edges.
///
/// A sub-component port whose interface matches a parent port is wired to
/// that parent port; otherwise it is wired to the interface directly.
pub(crate) fn component(node: Node<'_>, refs: Refs<'_>) -> Result<String, DiagramError> {
    let mut out = String::new();
    let ports = Port::read_all(node, refs)?;

    let _ = writeln!(out, "component {}{{", node.label()?);
    for port in &ports {
        let _ = writeln!(out, "  port{} {}", port.direction.name(), port.label);
    }

    for sub in node.children("components")? {
        let label = sub.label()?;
        let _ = writeln!(out, "  component {label}");
        for port in Port::read_all(sub, refs)? {
            let mut wired = false;
            for parent in ports.iter().filter(|p| p.interface == port.interface) {
                let arrow = match port.direction {
                    Direction::In => "<--",
                    Direction::Out => "-->",
                };
                let _ = writeln!(out, "  {label} {arrow} {}{}", parent.label, port.suffix());
                wired = true;
            }
            if !wired {
                let _ = writeln!(out, "{}", port.interface_edge("  ", label));
            }
        }
    }
    out.push_str("}\n");

    for port in &ports {
        let _ = writeln!(out, "{}", port.interface_edge("", port.label));
    }
    Ok(out)
}
