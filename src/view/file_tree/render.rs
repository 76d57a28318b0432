//! Projections of the widget state
//!
//! Rendering never mutates anything: the node model and the selection are
//! the source of truth, markup is derived from them on demand.

use super::node::{NodeId, NodeState, TreeNode};
use super::widget::FileTreeWidget;
use crate::services::listing::fragment::encode_entities;
use std::fmt::Write;

/// jQuery File Tree markup for the current state
///
/// While the root listing is loading only the `loadMessage` placeholder is
/// produced; before `init` the result is empty.
pub fn render_html(widget: &FileTreeWidget) -> String {
    let tree = widget.tree();
    let Some(root) = tree.get_node(tree.root_id()) else {
        return String::new();
    };

    let mut out = String::new();
    match root.state {
        NodeState::Expanding { .. } => {
            let _ = write!(
                out,
                "<ul class=\"jqueryFileTree start\"><li class=\"wait\">{}</li></ul>",
                encode_entities(&widget.config().load_message)
            );
        }
        NodeState::Expanded => html_list(widget, &root.children, &mut out),
        NodeState::Collapsed | NodeState::Leaf => {}
    }
    out
}

fn html_list(widget: &FileTreeWidget, children: &[NodeId], out: &mut String) {
    out.push_str("<ul class=\"jqueryFileTree\">");
    for &id in children {
        if let Some(node) = widget.tree().get_node(id) {
            html_row(widget, node, out);
        }
    }
    out.push_str("</ul>");
}

fn html_row(widget: &FileTreeWidget, node: &TreeNode, out: &mut String) {
    let class = match node.state {
        NodeState::Collapsed => "directory collapsed".to_string(),
        NodeState::Expanding { .. } => "directory expanded wait".to_string(),
        NodeState::Expanded => "directory expanded".to_string(),
        NodeState::Leaf => match node.entry.extension() {
            Some(ext) => format!("file ext_{}", ext),
            None => "file".to_string(),
        },
    };
    let chosen = if widget.is_selected(node.path()) {
        " class=\"chosen\""
    } else {
        ""
    };

    let _ = write!(
        out,
        "<li class=\"{}\"><a href=\"#\" rel=\"{}\"{}>",
        class,
        encode_entities(node.path()),
        chosen
    );
    if node.is_dir() {
        let icon = if node.is_open() {
            "icon-angle-down"
        } else {
            "icon-angle-right"
        };
        let _ = write!(out, "<span class=\"expand_folder {}\"></span>", icon);
    }
    out.push_str(&encode_entities(&node.entry.name));
    if widget.config().delete_icons {
        out.push_str("<span class=\"delete_folder icon-trash\"></span>");
    }
    out.push_str("</a>");

    if node.is_expanded() {
        html_list(widget, &node.children, out);
    }
    out.push_str("</li>");
}

/// Indented plain-text listing of the visible rows, one per line
///
/// Chosen rows start with `*`; directories show `[+]` when collapsed, `[-]`
/// when expanded and `[.]` while loading.
pub fn render_text(widget: &FileTreeWidget) -> String {
    let tree = widget.tree();
    let mut out = String::new();

    if tree
        .get_node(tree.root_id())
        .is_some_and(|root| root.is_expanding())
    {
        let _ = writeln!(out, "{}", widget.config().load_message);
        return out;
    }

    for id in tree.get_visible_nodes() {
        let Some(node) = tree.get_node(id) else {
            continue;
        };
        let mark = if widget.is_selected(node.path()) { '*' } else { ' ' };
        let indent = "  ".repeat(tree.get_depth(id).saturating_sub(1));
        let (marker, suffix) = match node.state {
            NodeState::Collapsed => ("[+] ", "/"),
            NodeState::Expanding { .. } => ("[.] ", "/"),
            NodeState::Expanded => ("[-] ", "/"),
            NodeState::Leaf => ("    ", ""),
        };
        let _ = writeln!(out, "{} {}{}{}{}", mark, indent, marker, node.entry.name, suffix);
    }
    out
}
