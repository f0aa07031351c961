#[derive(Debug, Clone, PartialEq)]
pub struct SchemaAst {
    pub nodes: Vec<SchemaNode>,
}

impl SchemaAst {
    pub fn new(nodes: Vec<SchemaNode>) -> Self {
        Self { nodes }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    Literal(String),
    Parameter(ParameterNode),
    /// `[...]`, always optional.
    Segment(Vec<SchemaNode>),
}

/// `{name[:default][#type][|validator]}[?]` with escapes already resolved in
/// `name` and `default`; `validator` is kept as raw regex text.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterNode {
    pub name: String,
    pub default: Option<String>,
    pub type_name: Option<String>,
    pub validator: Option<String>,
    pub optional: bool,
}
