use crate::nav::keys::{child_key, entry_key};
use crate::nav::tree::{ChildNode, FetchStatus, TreeNode};

/// One visible row of the left menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum FlatNode {
    Leaf {
        key: String,
        wrap: String,
        label: String,
    },
    Branch {
        key: String,
        wrap: String,
        label: String,
        expanded: bool,
        status: FetchStatus,
        // Number of selectable children when loaded
        loaded_count: usize,
    },
    Child {
        key: String,
        wrap: String,
        child: ChildNode,
    },
}

impl FlatNode {
    pub(crate) fn key(&self) -> &str {
        match self {
            FlatNode::Leaf { key, .. }
            | FlatNode::Branch { key, .. }
            | FlatNode::Child { key, .. } => key,
        }
    }

    pub(crate) fn wrap(&self) -> &str {
        match self {
            FlatNode::Leaf { wrap, .. }
            | FlatNode::Branch { wrap, .. }
            | FlatNode::Child { wrap, .. } => wrap,
        }
    }
}

// Children of a branch are emitted only while it is expanded.
pub(crate) fn flatten_nodes(nodes: &[TreeNode]) -> Vec<FlatNode> {
    let mut out = Vec::new();
    for node in nodes {
        match node {
            TreeNode::Leaf { wrap, label } => out.push(FlatNode::Leaf {
                key: entry_key(wrap),
                wrap: wrap.clone(),
                label: label.clone(),
            }),
            TreeNode::Branch {
                wrap,
                label,
                expanded,
                status,
                children,
            } => {
                out.push(FlatNode::Branch {
                    key: entry_key(wrap),
                    wrap: wrap.clone(),
                    label: label.clone(),
                    expanded: *expanded,
                    status: *status,
                    loaded_count: children.iter().filter(|c| c.is_selectable()).count(),
                });
                if *expanded {
                    for child in children {
                        out.push(FlatNode::Child {
                            key: child_key(wrap, child),
                            wrap: wrap.clone(),
                            child: child.clone(),
                        });
                    }
                }
            }
        }
    }
    out
}

/// Row index for `key`, used to keep the cursor on the same row when the
/// rows above it change.
pub(crate) fn position_of(rows: &[FlatNode], key: &str) -> Option<usize> {
    rows.iter().position(|r| r.key() == key)
}
