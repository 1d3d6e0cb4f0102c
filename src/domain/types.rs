use serde::Deserialize;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Mode {
    Markdown,
    Log,
}

impl Mode {
    pub fn toggle(self) -> Self {
        match self {
            Self::Markdown => Self::Log,
            Self::Log => Self::Markdown,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Markdown => "Markdown",
            Self::Log => "Logs",
        }
    }

    pub fn ready_status(self) -> &'static str {
        match self {
            Self::Markdown => "markdown mode",
            Self::Log => "log mode",
        }
    }

    pub fn tree_endpoint(self) -> &'static str {
        match self {
            Self::Markdown => "/api/tree",
            Self::Log => "/api/logs/tree",
        }
    }
}

/// One entry of a server-side listing. Directories nest arbitrarily deep;
/// `path` is the stable identifier for all file operations and is unique
/// within a loaded tree.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TreeNode {
    File { name: String, path: String },
    Dir { name: String, children: Vec<TreeNode> },
}

/// A flattened, selectable projection of a tree for the file panel.
/// `file_path` is `None` for directory rows.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TreeRow {
    pub depth: usize,
    pub name: String,
    pub file_path: Option<String>,
}

pub fn flatten_tree(nodes: &[TreeNode]) -> Vec<TreeRow> {
    let mut rows = Vec::new();
    push_rows(nodes, 0, &mut rows);
    rows
}

fn push_rows(nodes: &[TreeNode], depth: usize, rows: &mut Vec<TreeRow>) {
    for node in nodes {
        match node {
            TreeNode::File { name, path } => rows.push(TreeRow {
                depth,
                name: name.clone(),
                file_path: Some(path.clone()),
            }),
            TreeNode::Dir { name, children } => {
                rows.push(TreeRow {
                    depth,
                    name: name.clone(),
                    file_path: None,
                });
                push_rows(children, depth + 1, rows);
            }
        }
    }
}

/// One bounded read of a log file. `offset` is the position the server
/// actually read from (it clamps past-end offsets), `next_offset` the new
/// cursor.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct LogChunk {
    pub content: String,
    pub offset: u64,
    pub next_offset: u64,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub eof: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> Vec<TreeNode> {
        vec![
            TreeNode::Dir {
                name: "docs".to_string(),
                children: vec![
                    TreeNode::File {
                        name: "a.md".to_string(),
                        path: "docs/a.md".to_string(),
                    },
                    TreeNode::File {
                        name: "b.md".to_string(),
                        path: "docs/b.md".to_string(),
                    },
                ],
            },
            TreeNode::File {
                name: "welcome.md".to_string(),
                path: "welcome.md".to_string(),
            },
        ]
    }

    #[test]
    fn flattens_depth_first_with_indent_levels() {
        let rows = flatten_tree(&sample_tree());
        let names = rows.iter().map(|row| row.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, ["docs", "a.md", "b.md", "welcome.md"]);
        let depths = rows.iter().map(|row| row.depth).collect::<Vec<_>>();
        assert_eq!(depths, [0, 1, 1, 0]);
        assert_eq!(rows[0].file_path, None);
        assert_eq!(rows[1].file_path.as_deref(), Some("docs/a.md"));
    }

    #[test]
    fn flatten_is_deterministic_for_equal_trees() {
        assert_eq!(flatten_tree(&sample_tree()), flatten_tree(&sample_tree()));
    }

    #[test]
    fn decodes_wire_tree_nodes() {
        let raw = r#"[
            {"type":"dir","name":"docs","children":[
                {"type":"file","name":"a.md","path":"docs/a.md"}
            ]},
            {"type":"file","name":"welcome.md","path":"welcome.md"}
        ]"#;
        let nodes: Vec<TreeNode> = serde_json::from_str(raw).expect("decode");
        assert_eq!(nodes.len(), 2);
        assert!(matches!(&nodes[0], TreeNode::Dir { children, .. } if children.len() == 1));
    }

    #[test]
    fn decodes_log_chunk_with_server_extras() {
        let raw = r#"{"path":"logs/app.log","offset":0,"next_offset":6,"size":13,"eof":false,"content":"first\n"}"#;
        let chunk: LogChunk = serde_json::from_str(raw).expect("decode");
        assert_eq!(chunk.content, "first\n");
        assert_eq!(chunk.next_offset, 6);
        assert!(!chunk.eof);
    }
}
