//! `NodeSqlCmdContextData` -> `NodeSqlCmdContext`: the state threaded
//! through a `to_sql_cmd` render. The original's raw `void *caller_data`
//! and a `be` backend-handle pointer become whatever the embedding
//! crate needs; this crate only defines the parts rendering itself
//! depends on.

use vh_types::Value;

use crate::tag::NodeTag;

/// Produces the placeholder text for a bound parameter (`$1`, `?`, ...)
/// -- the backend driver's dialect, not this crate's concern.
pub trait ParamPlaceholder {
    fn placeholder(&mut self, index: u32) -> String;
}

/// The default placeholder style: PostgreSQL-style numbered params.
pub struct NumberedPlaceholder;

impl ParamPlaceholder for NumberedPlaceholder {
    fn placeholder(&mut self, index: u32) -> String {
        format!("${}", index + 1)
    }
}

pub struct NodeSqlCmdContext {
    /// `override_table`: render against this table name instead of
    /// whatever a `From`/`Join` node names, used by the planner's
    /// temp-table UPDATE decomposition.
    pub override_table: Option<String>,
    pub placeholder: Box<dyn ParamPlaceholder>,
    pub previous_tag: Option<NodeTag>,
    pub last_processed_tag: Option<NodeTag>,
    pub param_values: Vec<Value>,
    /// `fq`: render `schema.table.column` rather than bare names.
    pub fully_qualify: bool,
}

impl Default for NodeSqlCmdContext {
    fn default() -> Self {
        NodeSqlCmdContext {
            override_table: None,
            placeholder: Box::new(NumberedPlaceholder),
            previous_tag: None,
            last_processed_tag: None,
            param_values: Vec::new(),
            fully_qualify: false,
        }
    }
}

impl NodeSqlCmdContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that rendering has now moved on to `tag`.
    pub fn mark_tag(&mut self, tag: NodeTag) {
        self.previous_tag = self.last_processed_tag;
        self.last_processed_tag = Some(tag);
    }

    pub fn bind(&mut self, value: Value) -> u32 {
        self.param_values.push(value);
        self.param_values.len() as u32 - 1
    }

    /// `vh_nsql_cmd_param_placeholder`: bind `value` and render its
    /// placeholder text in one step.
    pub fn render_param(&mut self, value: Value) -> String {
        let idx = self.bind(value);
        self.placeholder.placeholder(idx)
    }
}
