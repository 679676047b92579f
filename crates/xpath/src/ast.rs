//! Abstract syntax tree for the supported XPath 1.0 subset.

/// A parsed expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal(String),
    Number(f64),
    LocationPath(LocationPath),
    FunctionCall {
        name: String,
        args: Vec<Expression>,
    },
    BinaryOp {
        left: Box<Expression>,
        op: BinaryOperator,
        right: Box<Expression>,
    },
}

impl Expression {
    pub fn is_location_path(&self) -> bool {
        matches!(self, Expression::LocationPath(_))
    }

    /// The last step of a location path, if this expression is one.
    pub fn final_step(&self) -> Option<&Step> {
        match self {
            Expression::LocationPath(path) => path.steps.last(),
            Expression::BinaryOp {
                op: BinaryOperator::Union,
                right,
                ..
            } => right.final_step(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Or,
    And,
    Equals,
    NotEquals,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    Union,
}

/// A location path such as `/college/staff[1]` or `salary/basic`.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationPath {
    /// True if the path starts from the document root.
    pub is_absolute: bool,
    pub steps: Vec<Step>,
}

/// One step of a location path: `axis::test[predicate]*`.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub axis: Axis,
    pub node_test: NodeTest,
    pub predicates: Vec<Expression>,
}

impl Step {
    pub(crate) fn descendant_or_self() -> Self {
        Step {
            axis: Axis::DescendantOrSelf,
            node_test: NodeTest::NodeType(NodeTypeTest::Node),
            predicates: vec![],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Child,
    Descendant,
    DescendantOrSelf,
    Attribute,
    Parent,
    Ancestor,
    AncestorOrSelf,
    SelfAxis,
    FollowingSibling,
    PrecedingSibling,
    Following,
    Preceding,
}

impl Axis {
    /// Reverse axes number their proximity positions backwards from the context node.
    pub fn is_reverse(self) -> bool {
        matches!(
            self,
            Axis::Parent
                | Axis::Ancestor
                | Axis::AncestorOrSelf
                | Axis::PrecedingSibling
                | Axis::Preceding
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeTest {
    /// A name test. A prefix is resolved against the candidate node's scope.
    Name {
        prefix: Option<String>,
        local: String,
    },
    /// `*`
    Wildcard,
    NodeType(NodeTypeTest),
}

impl NodeTest {
    pub fn name(local: &str) -> Self {
        NodeTest::Name {
            prefix: None,
            local: local.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeTypeTest {
    Text,
    Node,
    Comment,
    ProcessingInstruction,
}
