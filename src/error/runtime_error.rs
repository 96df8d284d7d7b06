#[derive(Debug)]
/// Represents all errors that can occur during reduction.
///
/// Every variant except `Output` describes a term whose reduced shape does not
/// match what the surrounding construct requires. Terms are carried in
/// rendered form so the message names the offending term.
pub enum RuntimeError {
    /// A boolean was expected (conditions, logic, predicates).
    ExpectedBoolean {
        /// The rendered term that was found instead.
        found: String,
    },
    /// A natural number was expected (`succ`, `pred`, `iszero`).
    ExpectedNatural {
        /// The rendered term that was found instead.
        found: String,
    },
    /// The function position of an application is not an abstraction.
    ExpectedAbstraction {
        /// The rendered term that was found instead.
        found: String,
    },
    /// The function position of a call is not a function value.
    ExpectedFunction {
        /// The rendered term that was found instead.
        found: String,
    },
    /// A table operand was expected.
    ExpectedTable {
        /// The rendered term that was found instead.
        found: String,
    },
    /// A member access receiver is neither a record nor a table.
    ExpectedRecordOrTable {
        /// The rendered term that was found instead.
        found: String,
    },
    /// A binary operator was handed to the evaluation routine of another
    /// operator family.
    OperatorMismatch {
        /// The operator, rendered.
        operator: String,
        /// The family the routine evaluates.
        expected: &'static str,
    },
    /// A call supplied the wrong number of arguments.
    ArgumentCountMismatch {
        /// Number of parameters of the function.
        expected: usize,
        /// Number of arguments at the call site.
        found:    usize,
    },
    /// A record or table has no field with the requested name.
    UnknownField {
        /// The requested name.
        name:     String,
        /// The rendered receiver.
        receiver: String,
    },
    /// A record, row, schema or projection names the same column twice.
    DuplicateColumn {
        /// The repeated name.
        name: String,
    },
    /// Two schemas that must agree do not.
    SchemaMismatch {
        /// The expected schema, rendered.
        expected: String,
        /// The schema that was found, rendered.
        found:    String,
    },
    /// A variable reached the evaluator without being substituted.
    UnboundVariable {
        /// The variable name.
        name: String,
    },
    /// A reference to a type-level declaration was used as a value.
    TypeHasNoValue {
        /// The declared name.
        name: String,
    },
    /// A definition's initializer refers back to the definition before it has
    /// a value.
    CyclicDefinition {
        /// The defined name.
        name: String,
    },
    /// The configured step budget was exhausted.
    StepLimitExceeded {
        /// The configured budget.
        limit: u64,
    },
    /// Writing printed output failed.
    Output {
        /// Details from the underlying I/O error.
        details: String,
    },
}

impl std::fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ExpectedBoolean { found } => {
                write!(f, "Runtime error: Expected a boolean value, but found '{found}'.")
            },
            Self::ExpectedNatural { found } => {
                write!(f, "Runtime error: '{found}' is not a numeric value.")
            },
            Self::ExpectedAbstraction { found } => write!(f,
                                                          "Runtime error: Ill-formed application target '{found}'; expected an abstraction."),
            Self::ExpectedFunction { found } => write!(f,
                                                       "Runtime error: Ill-formed call target '{found}'; expected a function."),
            Self::ExpectedTable { found } => {
                write!(f, "Runtime error: Expected a table, but found '{found}'.")
            },
            Self::ExpectedRecordOrTable { found } => write!(f,
                                                            "Runtime error: Expected a record or a table, but found '{found}'."),
            Self::OperatorMismatch { operator, expected } => {
                write!(f, "Runtime error: '{operator}' is not {expected}.")
            },
            Self::ArgumentCountMismatch { expected, found } => write!(f,
                                                                      "Runtime error: Argument count mismatch: expected {expected}, found {found}."),
            Self::UnknownField { name, receiver } => {
                write!(f, "Runtime error: No field '{name}' in '{receiver}'.")
            },
            Self::DuplicateColumn { name } => {
                write!(f, "Runtime error: Column '{name}' appears more than once.")
            },
            Self::SchemaMismatch { expected, found } => write!(f,
                                                               "Runtime error: Schema mismatch: expected '{expected}', found '{found}'."),
            Self::UnboundVariable { name } => {
                write!(f, "Runtime error: Unbound variable '{name}'.")
            },
            Self::TypeHasNoValue { name } => {
                write!(f, "Runtime error: '{name}' names a type and has no value.")
            },
            Self::CyclicDefinition { name } => write!(f,
                                                      "Runtime error: Definition of '{name}' depends on its own value."),
            Self::StepLimitExceeded { limit } => write!(f,
                                                        "Runtime error: Evaluation stopped after {limit} steps."),
            Self::Output { details } => {
                write!(f, "Runtime error: Failed to write output: {details}.")
            },
        }
    }
}

impl std::error::Error for RuntimeError {}

impl From<std::io::Error> for RuntimeError {
    fn from(e: std::io::Error) -> Self {
        Self::Output { details: e.to_string() }
    }
}
