use crate::{compile::Operator, region::Region};
use serde_json::Value;

/// Represents data within an expression marker, `@{ }`.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// A literal value or a variable lookup.
    Base(Base),
    /// Negation of the truthiness of an Expression.
    Not(Not),
    /// Arithmetic, comparison or logic between two Expressions.
    Binary(Binary),
    /// An Expression piped through a filter or function.
    Call(Call),
}

impl Expression {
    /// Get the Region from the underlying Expression kind.
    pub fn get_region(&self) -> Region {
        match self {
            Expression::Base(base) => base.get_region(),
            Expression::Not(not) => not.region,
            Expression::Binary(binary) => binary.region,
            Expression::Call(call) => call.region,
        }
    }
}

/// Negation, `!name`.
#[derive(Debug, Clone, PartialEq)]
pub struct Not {
    pub operand: Box<Expression>,
    pub region: Region,
}

/// Two Expressions joined by an Operator.
#[derive(Debug, Clone, PartialEq)]
pub struct Binary {
    pub left: Box<Expression>,
    pub operator: Operator,
    pub right: Box<Expression>,
    pub region: Region,
}

/// Variable types.
///
/// ## Literal
///
/// A literal value is some literal data, such as a string or number.
///
/// ## Variable
///
/// A variable is an Identifier such as "person.name" which indicates
/// the location of the true value within the scope.
#[derive(Debug, Clone, PartialEq)]
pub enum Base {
    /// A value located in the scope.
    Variable(Variable),
    /// A literal value located directly in the expression text.
    Literal(Literal),
}

impl Base {
    /// Get a Region from the underlying Base kind.
    pub fn get_region(&self) -> Region {
        match self {
            Base::Variable(variable) => variable.get_region(),
            Base::Literal(literal) => literal.region,
        }
    }
}

/// Set of Key instances that can be used to locate data within the scope.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    /// Never empty.
    pub path: Vec<Key>,
}

impl Variable {
    /// Get a Region spanning the area from the first and last Key instances.
    pub fn get_region(&self) -> Region {
        let first = self.path.first().expect("variable path must not be empty");
        let last = self.path.last().expect("variable path must not be empty");

        first.get_region().combine(last.get_region())
    }
}

/// Path segment in a larger identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Key {
    pub identifier: Identifier,
}

impl Key {
    /// Get a Region from the internal Identifier.
    pub fn get_region(&self) -> Region {
        self.identifier.region
    }
}

impl From<Identifier> for Key {
    /// Create a Key from the given Identifier.
    fn from(value: Identifier) -> Self {
        Self { identifier: value }
    }
}

/// Area that contains an identifying value.
#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub region: Region,
}

/// Literal data that does not need to be evaluated any further.
#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    pub value: Value,
    pub region: Region,
}

/// Call to some registered filter or function.
///
/// The receiver is evaluated first and its value becomes the input of the call.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub name: Identifier,
    pub arguments: Option<Arguments>,
    pub receiver: Box<Expression>,
    pub region: Region,
}

/// Set of arguments that can be provided to a filter or function.
///
/// Arguments without an explicit name are stored with `None`, and are
/// numbered in order when the call is evaluated.
#[derive(Debug, Clone, PartialEq)]
pub struct Arguments {
    pub values: Vec<(Option<String>, Base)>,
    pub region: Region,
}
