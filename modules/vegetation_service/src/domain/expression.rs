//! Earth Engine computation graphs in their REST wire form
//!
//! An [`Expression`] is a flat table of named [`ValueNode`]s plus the name of
//! the node holding the result. Nodes may nest inline; a node that must be
//! addressed by name (a mapped function body, or a subtree shared by several
//! parents) is bound into the table through [`ExpressionBuilder::bind`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A complete graph ready to be posted to the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expression {
    pub values: BTreeMap<String, ValueNode>,
    pub result: String,
}

impl Expression {
    /// The node the graph evaluates to
    pub fn result_node(&self) -> Option<&ValueNode> {
        self.values.get(&self.result)
    }
}

/// One node of the graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValueNode {
    ConstantValue(Value),
    FunctionInvocationValue(FunctionInvocation),
    FunctionDefinitionValue(FunctionDefinition),
    ArgumentReference(String),
    ValueReference(String),
    ArrayValue(ArrayValue),
    DictionaryValue(DictionaryValue),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionInvocation {
    pub function_name: String,
    pub arguments: BTreeMap<String, ValueNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionDefinition {
    pub argument_names: Vec<String>,
    /// Name of the bound node holding the body
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayValue {
    pub values: Vec<ValueNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DictionaryValue {
    pub values: BTreeMap<String, ValueNode>,
}

impl ValueNode {
    pub fn constant(value: impl Into<Value>) -> Self {
        Self::ConstantValue(value.into())
    }

    /// Invoke a named server-side algorithm
    pub fn invoke<'a>(
        function_name: &str,
        arguments: impl IntoIterator<Item = (&'a str, ValueNode)>,
    ) -> Self {
        Self::FunctionInvocationValue(FunctionInvocation {
            function_name: function_name.to_string(),
            arguments: arguments
                .into_iter()
                .map(|(name, node)| (name.to_string(), node))
                .collect(),
        })
    }

    /// Invoke an algorithm that takes no arguments, e.g. `Reducer.mean`
    pub fn call(function_name: &str) -> Self {
        Self::FunctionInvocationValue(FunctionInvocation {
            function_name: function_name.to_string(),
            arguments: BTreeMap::new(),
        })
    }

    pub fn argument(name: &str) -> Self {
        Self::ArgumentReference(name.to_string())
    }

    pub fn array(values: impl IntoIterator<Item = ValueNode>) -> Self {
        Self::ArrayValue(ArrayValue {
            values: values.into_iter().collect(),
        })
    }

    /// Name of the invoked algorithm, if this is an invocation
    pub fn function_name(&self) -> Option<&str> {
        match self {
            Self::FunctionInvocationValue(call) => Some(&call.function_name),
            _ => None,
        }
    }

    /// Named argument of an invocation
    pub fn arg(&self, name: &str) -> Option<&ValueNode> {
        match self {
            Self::FunctionInvocationValue(call) => call.arguments.get(name),
            _ => None,
        }
    }
}

/// Accumulates bound nodes while a graph is assembled
#[derive(Debug, Default)]
pub struct ExpressionBuilder {
    values: BTreeMap<String, ValueNode>,
}

impl ExpressionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `node` under a fresh name and return a reference to it
    pub fn bind(&mut self, node: ValueNode) -> ValueNode {
        ValueNode::ValueReference(self.insert(node))
    }

    fn insert(&mut self, node: ValueNode) -> String {
        let name = self.values.len().to_string();
        self.values.insert(name.clone(), node);
        name
    }

    /// Wrap `body` into a one-argument function definition.
    ///
    /// `body` is called with a reference to the function's parameter.
    pub fn function(
        &mut self,
        argument_name: &str,
        body: impl FnOnce(ValueNode) -> ValueNode,
    ) -> ValueNode {
        let body_node = body(ValueNode::argument(argument_name));
        ValueNode::FunctionDefinitionValue(FunctionDefinition {
            argument_names: vec![argument_name.to_string()],
            body: self.insert(body_node),
        })
    }

    /// Seal the graph with `result` as its output
    pub fn finish(mut self, result: ValueNode) -> Expression {
        let result = match result {
            ValueNode::ValueReference(name) if self.values.contains_key(&name) => name,
            other => self.insert(other),
        };
        Expression {
            values: self.values,
            result,
        }
    }
}
