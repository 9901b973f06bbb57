//! Command definitions
//!
//! Represents one request to the router.

use std::fmt;

/// A named command argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,

    /// Missing values are still sent, as `=name=`
    pub value: Option<String>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
        }
    }

    /// A parameter without a value
    pub fn flag(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }
}

/// A request to send to the router
///
/// Built once per request and consumed by the serializer. Nothing is
/// validated or escaped; queries in particular are sent verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Command {
    path: String,
    parameters: Vec<Parameter>,
    tag: Option<String>,
    properties: Vec<String>,
    queries: Vec<String>,
}

impl Command {
    /// Create a command for `path`, prefixing `/` when missing
    pub fn new(path: impl Into<String>) -> Self {
        let mut path = path.into();
        if !path.starts_with('/') {
            path.insert(0, '/');
        }
        Self {
            path,
            ..Self::default()
        }
    }

    // =========================================================================
    // Mutating builders
    // =========================================================================

    /// Append a `name=value` parameter (duplicates are kept)
    pub fn add_parameter(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.parameters.push(Parameter::new(name, value));
    }

    /// Append an already built parameter
    pub fn push_parameter(&mut self, parameter: Parameter) {
        self.parameters.push(parameter);
    }

    /// Restrict the fields the router returns
    pub fn add_property<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.properties.extend(names.into_iter().map(Into::into));
    }

    /// Append raw query clauses such as `?address=192.168.88.1`
    pub fn add_query<I, S>(&mut self, clauses: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.queries.extend(clauses.into_iter().map(Into::into));
    }

    pub fn set_tag(&mut self, tag: impl Into<String>) {
        self.tag = Some(tag.into());
    }

    // =========================================================================
    // Chaining builders
    // =========================================================================

    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.add_parameter(name, value);
        self
    }

    pub fn with_flag(mut self, name: impl Into<String>) -> Self {
        self.push_parameter(Parameter::flag(name));
        self
    }

    pub fn with_property(mut self, name: impl Into<String>) -> Self {
        self.properties.push(name.into());
        self
    }

    pub fn with_query(mut self, clause: impl Into<String>) -> Self {
        self.queries.push(clause.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.set_tag(tag);
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn properties(&self) -> &[String] {
        &self.properties
    }

    pub fn queries(&self) -> &[String] {
        &self.queries
    }
}

impl fmt::Display for Command {
    /// Log-friendly rendering; parameter values are omitted since they may
    /// carry credentials
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path)?;
        for parameter in &self.parameters {
            write!(f, " ={}=...", parameter.name)?;
        }
        if let Some(tag) = self.tag() {
            write!(f, " .tag={}", tag)?;
        }
        if !self.properties.is_empty() {
            write!(f, " =.proplist={}", self.properties.join(","))?;
        }
        for query in &self.queries {
            write!(f, " {}", query)?;
        }
        Ok(())
    }
}
