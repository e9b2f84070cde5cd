use serde::{Deserialize, Serialize};

/// A parsed script file, usually every section of one locale.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Story {
    pub name: String,
    pub sections: Vec<Section>,
}

/// A labelled `::name { ... }` block. Labels are the targets of switches.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub name: String,
    pub children: Vec<Child>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Child {
    /// `[character] text`, the character is absent for narration
    Line(Option<String>, String),
    Command(CommandLine),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    String(String),
    Integer(i64),
    Boolean(bool),
}

impl Literal {
    /// `false`, `0` and `""` are false, everything else is true.
    pub fn is_truthy(&self) -> bool {
        match self {
            Literal::String(s) => !s.is_empty(),
            Literal::Integer(i) => *i != 0,
            Literal::Boolean(b) => *b,
        }
    }
}

impl std::fmt::Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Literal::String(s) => write!(f, "{s:?}"),
            Literal::Integer(i) => write!(f, "{i}"),
            Literal::Boolean(b) => write!(f, "{b}"),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Argument {
    pub name: String,
    /// `None` for a bare `name`, which reads as `name=true`
    pub value: Option<Literal>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandLine {
    pub command: String,
    pub arguments: Vec<Argument>,
}

impl CommandLine {
    pub fn get_argument(&self, name: &str) -> Option<&Argument> {
        self.arguments.iter().find(|arg| arg.name == name)
    }
}
