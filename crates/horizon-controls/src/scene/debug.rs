//! Debug visualization of scene subtrees.
//!
//! ```
//! use horizon_controls::scene::{Node, SceneTreeDebug};
//!
//! let root = Node::named("root");
//! root.add_child(&Node::named("child"));
//! println!("{}", SceneTreeDebug::new().format_subtree(&root));
//! ```

use std::fmt::{self, Write as _};

use super::node::Node;

/// Characters used to draw tree branches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    Ascii,
    #[default]
    Unicode,
}

/// Options for [`SceneTreeDebug`].
#[derive(Debug, Clone)]
pub struct TreeFormatOptions {
    pub style: TreeStyle,
    pub show_ids: bool,
    /// Print each node's bounds in parent coordinates.
    pub show_bounds: bool,
    /// Include invisible nodes (marked `hidden`).
    pub show_hidden: bool,
    pub max_depth: Option<usize>,
}

impl Default for TreeFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_ids: true,
            show_bounds: false,
            show_hidden: true,
            max_depth: None,
        }
    }
}

impl TreeFormatOptions {
    /// Names only.
    pub fn minimal() -> Self {
        Self {
            show_ids: false,
            ..Default::default()
        }
    }
}

/// Formats a node subtree as an indented tree.
#[derive(Debug, Clone, Default)]
pub struct SceneTreeDebug {
    options: TreeFormatOptions,
}

impl SceneTreeDebug {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: TreeFormatOptions) -> Self {
        Self { options }
    }

    pub fn format_subtree(&self, root: &Node) -> String {
        let mut output = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_node(root, "", true, 0, &mut output);
        output
    }

    fn write_node(
        &self,
        node: &Node,
        prefix: &str,
        is_last: bool,
        depth: usize,
        out: &mut String,
    ) -> fmt::Result {
        if self.options.max_depth.is_some_and(|max| depth > max) {
            return Ok(());
        }
        let (corner, tee, pipe) = match self.options.style {
            TreeStyle::Ascii => ("`-- ", "|-- ", "|   "),
            TreeStyle::Unicode => ("\u{2514}\u{2500}\u{2500} ", "\u{251c}\u{2500}\u{2500} ", "\u{2502}   "),
        };

        if depth > 0 {
            out.push_str(prefix);
            out.push_str(if is_last { corner } else { tee });
        }
        let name = node.name();
        out.push_str(if name.is_empty() { "(unnamed)" } else { &name });
        if self.options.show_ids {
            write!(out, " [{}]", node.id())?;
        }
        if self.options.show_bounds {
            let b = node.bounds();
            write!(out, " ({}, {}, {}x{})", b.left(), b.top(), b.width(), b.height())?;
        }
        if !node.is_visible() {
            out.push_str(" hidden");
        }
        out.push('\n');

        let children: Vec<Node> = node
            .children()
            .into_iter()
            .filter(|child| self.options.show_hidden || child.is_visible())
            .collect();
        let child_prefix = if depth == 0 {
            String::new()
        } else {
            format!("{prefix}{}", if is_last { "    " } else { pipe })
        };
        let count = children.len();
        for (i, child) in children.iter().enumerate() {
            self.write_node(child, &child_prefix, i + 1 == count, depth + 1, out)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use horizon_controls_render::Rect;

    fn tree() -> Node {
        let root = Node::named("window");
        let button = Node::rectangle("button", Rect::new(0.0, 0.0, 10.0, 5.0));
        let label = Node::named("label");
        let popup = Node::named("popup");
        popup.set_visible(false);
        button.add_child(&label);
        root.add_child(&button);
        root.add_child(&popup);
        root
    }

    #[test]
    fn test_format_hierarchy() {
        let output = SceneTreeDebug::with_options(TreeFormatOptions {
            style: TreeStyle::Ascii,
            ..TreeFormatOptions::minimal()
        })
        .format_subtree(&tree());

        assert_eq!(
            output,
            "window\n|-- button\n|   `-- label\n`-- popup hidden\n"
        );
    }

    #[test]
    fn test_hidden_nodes_can_be_skipped() {
        let output = SceneTreeDebug::with_options(TreeFormatOptions {
            show_hidden: false,
            ..TreeFormatOptions::minimal()
        })
        .format_subtree(&tree());
        assert!(!output.contains("popup"));
        assert!(output.contains("label"));
    }

    #[test]
    fn test_ids_and_bounds() {
        let root = tree();
        let output = SceneTreeDebug::with_options(TreeFormatOptions {
            show_bounds: true,
            max_depth: Some(0),
            ..Default::default()
        })
        .format_subtree(&root);
        assert!(output.contains(&root.id().to_string()));
        assert!(output.contains("(0, 0, 10x5)"));
        assert_eq!(output.lines().count(), 1);
    }
}
