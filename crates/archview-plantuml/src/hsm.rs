//! Hierarchical state machine diagrams.
//!
//! States nest recursively. Each nesting level is filled with the palette
//! color for that depth, cycling when the machine is deeper than the
//! palette.

use std::fmt::Write;

use archview_blueprint::{DiagramError, Palette};

use crate::node::{Node, Refs};

/// All top-level states of an `hsm` node.
pub(crate) fn state_machine(
    node: Node<'_>,
    refs: Refs<'_>,
    palette: &Palette,
) -> Result<String, DiagramError> {
    let mut out = String::new();
    let states = node.field_name(&["States", "states"]);
    for state in node.children(states)? {
        write_state(&mut out, state, refs, palette, 0)?;
    }
    Ok(out)
}

fn write_state(
    out: &mut String,
    state: Node<'_>,
    refs: Refs<'_>,
    palette: &Palette,
    depth: usize,
) -> Result<(), DiagramError> {
    let indent = "  ".repeat(depth);
    let label = state.label()?;

    if state.flag("isInit") {
        let _ = writeln!(out, "{indent}[*] --> {label}");
    }
    if state.opt_str("isTerminated").is_some() {
        let event = refs.label(state, "isTerminated")?;
        let _ = writeln!(out, "{indent}{label} --> [*] : {event}");
    }
    let _ = writeln!(out, "{indent}state {label} #{}{{", palette.color(depth));

    for child in state.children("states")? {
        write_state(out, child, refs, palette, depth + 1)?;
    }

    for machine in state.children("hsms")? {
        let _ = writeln!(out, "{indent}  state {} #line.dotted;", machine.label()?);
    }

    for guard in state.children("guards")? {
        let choice = guard.label()?;
        let condition = refs.text(guard, "condition")?;
        let on_true = refs.label(guard.child("true")?, "to")?;
        let on_false = refs.label(guard.child("false")?, "to")?;
        let _ = writeln!(out, "{indent}  state {choice} <<choice>> : {condition}");
        let _ = writeln!(out, "{indent}  {choice} --> {on_true} : [{condition}=true]");
        let _ = writeln!(out, "{indent}  {choice} --> {on_false} : [{condition}=false]");
    }

    for transition in state.children("transitions")? {
        let event = refs.label(transition, "event")?;
        let target = refs.label(transition.child("transition")?, "to")?;
        if target == label {
            let _ = writeln!(out, "{indent}  {label} : {event}");
        } else {
            let _ = writeln!(out, "{indent}  {label} --> {target} : {event}");
        }
    }

    let _ = writeln!(out, "{indent}}}");
    Ok(())
}
