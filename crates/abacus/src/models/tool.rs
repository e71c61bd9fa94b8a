use serde::{Deserialize, Serialize};

/// A tool the model may select, as advertised in the system prompt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tool {
    /// The action name the model must write after `Action:`
    pub name: String,
    /// A description of when the tool is useful
    pub description: String,
}

impl Tool {
    /// Create a new tool with the given name and description
    pub fn new<N, D>(name: N, description: D) -> Self
    where
        N: Into<String>,
        D: Into<String>,
    {
        Tool {
            name: name.into(),
            description: description.into(),
        }
    }
}
