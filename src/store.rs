use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use twox_hash::XxHash3_128;

use crate::error::{Result, RuntimeError};
use crate::format::{Argument, Child, CommandLine, Literal, Story};
use crate::locale::Locale;

/// The run-local variables set by `@set`.
pub type Variables = BTreeMap<String, Literal>;

/// `@set name=value`, applied when the run enters the step it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub name: String,
    pub value: Literal,
}

/// `name` or `!name`, tested against the truthiness of a run variable.
/// An unset variable is false.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub variable: String,
    pub negated: bool,
}

impl Condition {
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let (negated, variable) = match text.strip_prefix('!') {
            Some(rest) => (true, rest.trim_start()),
            None => (false, text),
        };
        let valid = !variable.is_empty()
            && variable.chars().all(|c| c.is_alphanumeric() || c == '_');

        valid.then(|| Self {
            variable: variable.to_string(),
            negated,
        })
    }

    pub fn holds(&self, variables: &Variables) -> bool {
        let set = variables
            .get(&self.variable)
            .is_some_and(Literal::is_truthy);
        set != self.negated
    }
}

/// One selectable branch option of a step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Switch {
    pub text: String,
    /// disabled switches are shown but cannot be chosen
    pub enabled: bool,
    /// further gates an enabled switch on the run variables
    #[serde(default)]
    pub condition: Option<Condition>,
    /// index of the step this branch continues at, required when enabled
    pub target: Option<usize>,
}

impl Switch {
    pub fn is_enabled(&self, variables: &Variables) -> bool {
        self.enabled
            && self
                .condition
                .as_ref()
                .map_or(true, |condition| condition.holds(variables))
    }
}

/// One unit of narrative content.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub line: String,
    /// `None` is the narrator
    pub character: Option<String>,
    pub switches: Vec<Switch>,
    /// background image asset id
    pub background: Option<String>,
    /// background music asset id
    pub music: Option<String>,
    #[serde(default)]
    pub assignments: Vec<Assignment>,
}

/// The steps of one locale, densely indexed from zero.
#[derive(Debug, Clone, PartialEq)]
pub struct Script {
    steps: Vec<Step>,
    fingerprint: String,
}

impl Script {
    /// Builds a script from steps, checking every switch target.
    pub fn from_steps(name: &str, steps: Vec<Step>) -> Result<Self> {
        for (index, step) in steps.iter().enumerate() {
            for switch in &step.switches {
                match switch.target {
                    Some(target) if target >= steps.len() => {
                        return Err(RuntimeError::invalid_script(
                            name,
                            format!(
                                "switch \"{}\" of step {index} targets missing step {target}",
                                switch.text
                            ),
                        ));
                    }
                    None if switch.enabled => {
                        return Err(RuntimeError::invalid_script(
                            name,
                            format!(
                                "enabled switch \"{}\" of step {index} has no target",
                                switch.text
                            ),
                        ));
                    }
                    _ => {}
                }
            }
        }

        let data = serde_json::to_vec(&steps).map_err(anyhow::Error::from)?;
        let fingerprint = format!("{:032x}", XxHash3_128::oneshot(&data));

        Ok(Self { steps, fingerprint })
    }

    /// Lowers a parsed story into steps.
    ///
    /// Sections are laid out in file order and their labels become switch
    /// targets. `@bg` and `@bgm` hold for every following line until changed,
    /// a bare `@bg` or `@bgm` clears it. `@switch` adds an option to the line
    /// right before it in the same section, `@set` belongs to the line right
    /// after it in the same section.
    pub fn compile(story: &Story) -> Result<Self> {
        let name = story.name.as_str();
        let mut steps: Vec<Step> = vec![];
        let mut labels: HashMap<&str, usize> = HashMap::new();
        let mut pending: Vec<(usize, usize, &str)> = vec![];
        let mut background: Option<String> = None;
        let mut music: Option<String> = None;
        let mut assignments: Vec<Assignment> = vec![];

        for section in &story.sections {
            if labels.insert(&section.name, steps.len()).is_some() {
                return Err(RuntimeError::invalid_script(
                    name,
                    format!("section {} is defined twice", section.name),
                ));
            }
            let section_start = steps.len();

            for child in &section.children {
                let command = match child {
                    Child::Line(character, line) => {
                        steps.push(Step {
                            line: line.clone(),
                            character: character.clone(),
                            switches: vec![],
                            background: background.clone(),
                            music: music.clone(),
                            assignments: std::mem::take(&mut assignments),
                        });
                        continue;
                    }
                    Child::Command(command) => command,
                };

                match command.command.as_str() {
                    "bg" => {
                        check_arguments(name, command, &["src"])?;
                        background = string_argument(name, command, "src")?.map(str::to_string);
                    }
                    "bgm" => {
                        check_arguments(name, command, &["src"])?;
                        music = string_argument(name, command, "src")?.map(str::to_string);
                    }
                    "set" => {
                        if command.arguments.is_empty() {
                            return Err(RuntimeError::invalid_script(
                                name,
                                "@set requires at least one variable",
                            ));
                        }
                        assignments.extend(command.arguments.iter().map(|arg| Assignment {
                            name: arg.name.clone(),
                            value: arg.value.clone().unwrap_or(Literal::Boolean(true)),
                        }));
                    }
                    "switch" => {
                        check_arguments(name, command, &["text", "target", "enabled", "when"])?;
                        if steps.len() == section_start {
                            return Err(RuntimeError::invalid_script(
                                name,
                                format!("@switch in section {} must follow a line", section.name),
                            ));
                        }
                        let text = string_argument(name, command, "text")?.ok_or_else(|| {
                            RuntimeError::invalid_script(name, "@switch requires a text argument")
                        })?;
                        let enabled = bool_argument(name, command, "enabled")?.unwrap_or(true);
                        let condition = string_argument(name, command, "when")?
                            .map(|when| {
                                Condition::parse(when).ok_or_else(|| {
                                    RuntimeError::invalid_script(
                                        name,
                                        format!("invalid condition \"{when}\" of @switch"),
                                    )
                                })
                            })
                            .transpose()?;
                        let target = string_argument(name, command, "target")?;
                        if target.is_none() && enabled {
                            return Err(RuntimeError::invalid_script(
                                name,
                                format!("enabled switch \"{text}\" has no target"),
                            ));
                        }

                        let step_index = steps.len() - 1;
                        let step = &mut steps[step_index];
                        if let Some(target) = target {
                            pending.push((step_index, step.switches.len(), target));
                        }
                        step.switches.push(Switch {
                            text: text.to_string(),
                            enabled,
                            condition,
                            target: None,
                        });
                    }
                    other => {
                        return Err(RuntimeError::invalid_script(
                            name,
                            format!("unknown command @{other}"),
                        ));
                    }
                }
            }

            if !assignments.is_empty() {
                return Err(RuntimeError::invalid_script(
                    name,
                    format!("@set in section {} must precede a line", section.name),
                ));
            }
        }

        for (step_index, switch_index, label) in pending {
            let target = labels.get(label).copied().ok_or_else(|| {
                RuntimeError::invalid_script(name, format!("switch targets unknown section {label}"))
            })?;
            if target >= steps.len() {
                return Err(RuntimeError::invalid_script(
                    name,
                    format!("switch targets section {label} which has no lines"),
                ));
            }
            steps[step_index].switches[switch_index].target = Some(target);
        }

        Self::from_steps(name, steps)
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn step(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// xxh3-128 of the steps, hex encoded
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }
}

fn check_arguments(name: &str, command: &CommandLine, allowed: &[&str]) -> Result<()> {
    match command
        .arguments
        .iter()
        .find(|arg| !allowed.contains(&arg.name.as_str()))
    {
        Some(arg) => Err(RuntimeError::invalid_script(
            name,
            format!("unknown argument {} of @{}", arg.name, command.command),
        )),
        None => Ok(()),
    }
}

fn string_argument<'a>(name: &str, command: &'a CommandLine, key: &str) -> Result<Option<&'a str>> {
    match command.get_argument(key) {
        None => Ok(None),
        Some(Argument {
            value: Some(Literal::String(s)),
            ..
        }) => Ok(Some(s)),
        Some(Argument { value, .. }) => Err(RuntimeError::invalid_script(
            name,
            format!(
                "argument {key} of @{} must be a string, got {}",
                command.command,
                display_value(value)
            ),
        )),
    }
}

fn bool_argument(name: &str, command: &CommandLine, key: &str) -> Result<Option<bool>> {
    match command.get_argument(key) {
        None => Ok(None),
        Some(Argument { value: None, .. }) => Ok(Some(true)),
        Some(Argument {
            value: Some(Literal::Boolean(b)),
            ..
        }) => Ok(Some(*b)),
        Some(Argument { value, .. }) => Err(RuntimeError::invalid_script(
            name,
            format!(
                "argument {key} of @{} must be a boolean, got {}",
                command.command,
                display_value(value)
            ),
        )),
    }
}

fn display_value(value: &Option<Literal>) -> String {
    match value {
        Some(literal) => literal.to_string(),
        None => "nothing".to_string(),
    }
}

/// Every locale's script of a loaded project. Read-only once built.
#[derive(Debug, Default, Clone)]
pub struct ScriptStore {
    scripts: HashMap<Locale, Script>,
}

impl ScriptStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, locale: Locale, script: Script) {
        self.scripts.insert(locale, script);
    }

    pub fn contains(&self, locale: &str) -> bool {
        self.scripts.contains_key(locale)
    }

    pub fn locales(&self) -> impl Iterator<Item = &Locale> {
        self.scripts.keys()
    }

    pub fn script(&self, locale: &str) -> Option<&Script> {
        self.scripts.get(locale)
    }

    pub fn step_at(&self, locale: &str, index: usize) -> Option<&Step> {
        self.script(locale).and_then(|script| script.step(index))
    }

    /// zero for a locale without a script
    pub fn step_count(&self, locale: &str) -> usize {
        self.script(locale).map(Script::len).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::parse_script;

    use super::*;

    fn compile(text: &str) -> Result<Script> {
        Script::compile(&parse_script("test", text)?)
    }

    fn error_message(result: Result<Script>) -> String {
        match result {
            Err(RuntimeError::InvalidScript { message, .. }) => message,
            other => panic!("expected an invalid script, got {other:?}"),
        }
    }

    #[test]
    fn test_compile() {
        let script = compile(
            r#"
::entry {
    @bg src="school"
    @bgm src="theme"
    [Alice] Morning.
    Birds sing.
    @switch text="Go left" target="left"
    @switch text="Go right" enabled=false
}
::left {
    @bg
    [Alice] Left.
}
"#,
        )
        .unwrap();

        assert_eq!(script.len(), 3);
        assert_eq!(
            script.step(0),
            Some(&Step {
                line: "Morning.".to_string(),
                character: Some("Alice".to_string()),
                switches: vec![],
                background: Some("school".to_string()),
                music: Some("theme".to_string()),
                assignments: vec![],
            })
        );
        assert_eq!(
            script.step(1).unwrap().switches,
            vec![
                Switch {
                    text: "Go left".to_string(),
                    enabled: true,
                    condition: None,
                    target: Some(2),
                },
                Switch {
                    text: "Go right".to_string(),
                    enabled: false,
                    condition: None,
                    target: None,
                },
            ]
        );
        let last = script.step(2).unwrap();
        assert_eq!(last.background, None);
        assert_eq!(last.music.as_deref(), Some("theme"));
        assert_eq!(script.step(3), None);
    }

    #[test]
    fn test_compile_errors() {
        assert!(error_message(compile("::a { @switch text='x' target='a' }"))
            .contains("must follow a line"));
        assert!(error_message(compile("::a { Hi\n@switch text='x' target='b'\n}"))
            .contains("unknown section b"));
        assert!(error_message(compile("::a { Hi\n@switch text='x'\n}")).contains("no target"));
        assert!(error_message(compile("::a { Hi\n@switch target='a'\n}"))
            .contains("requires a text"));
        assert!(error_message(compile(
            "::a { Hi\n@switch text='x' target='b'\n}\n::b {\n}"
        ))
        .contains("has no lines"));
        assert!(error_message(compile("::a {\n  Hi\n}\n::a {\n  Ho\n}")).contains("defined twice"));
        assert!(error_message(compile("::a {\n@shake\n}")).contains("unknown command"));
        assert!(error_message(compile("::a {\n@bg source='x'\n}")).contains("unknown argument"));
        assert!(error_message(compile("::a {\n@bg src=1\n}")).contains("must be a string"));
        assert!(error_message(compile("::a {\n  Hi\n  @set key\n}")).contains("must precede a line"));
        assert!(error_message(compile("::a {\n  @set\n  Hi\n}")).contains("at least one variable"));
        assert!(error_message(compile(
            "::a {\n  Hi\n  @switch text='x' target='a' when='has key'\n}"
        ))
        .contains("invalid condition"));
    }

    #[test]
    fn test_compile_variables() {
        let script = compile(
            r#"
::entry {
    @set key visits=1 name="Aoi"
    The door is locked.
    @switch text="Open it" target="open" when="key"
    @switch text="Knock" target="open" when="!key"
}
::open {
    It opens.
}
"#,
        )
        .unwrap();

        let step = script.step(0).unwrap();
        assert_eq!(
            step.assignments,
            vec![
                Assignment {
                    name: "key".to_string(),
                    value: Literal::Boolean(true),
                },
                Assignment {
                    name: "visits".to_string(),
                    value: Literal::Integer(1),
                },
                Assignment {
                    name: "name".to_string(),
                    value: Literal::String("Aoi".to_string()),
                },
            ]
        );
        assert_eq!(script.step(1).unwrap().assignments, vec![]);
        assert_eq!(
            step.switches[1].condition,
            Some(Condition {
                variable: "key".to_string(),
                negated: true,
            })
        );

        let mut variables = Variables::new();
        assert!(!step.switches[0].is_enabled(&variables));
        assert!(step.switches[1].is_enabled(&variables));
        variables.insert("key".to_string(), Literal::Boolean(true));
        assert!(step.switches[0].is_enabled(&variables));
        assert!(!step.switches[1].is_enabled(&variables));
    }

    #[test]
    fn test_condition() {
        let mut variables = Variables::new();
        variables.insert("zero".to_string(), Literal::Integer(0));
        variables.insert("empty".to_string(), Literal::String(String::new()));
        variables.insert("three".to_string(), Literal::Integer(3));

        let holds = |text: &str| Condition::parse(text).unwrap().holds(&variables);
        assert!(holds("three"));
        assert!(!holds("zero"));
        assert!(!holds("empty"));
        assert!(!holds("unset"));
        assert!(holds("! unset"));
        assert_eq!(Condition::parse("!"), None);
        assert_eq!(Condition::parse("a b"), None);
    }

    #[test]
    fn test_from_steps() {
        let step = |target| Step {
            line: "?".to_string(),
            switches: vec![Switch {
                text: "x".to_string(),
                enabled: true,
                condition: None,
                target,
            }],
            ..Default::default()
        };
        assert!(Script::from_steps("t", vec![step(Some(0))]).is_ok());
        assert!(Script::from_steps("t", vec![step(Some(1))]).is_err());
        assert!(Script::from_steps("t", vec![step(None)]).is_err());
    }

    #[test]
    fn test_fingerprint() {
        let a = compile("::a {\n  Hi.\n}").unwrap();
        let b = compile("// reworded comment\n::a {\n  Hi.  \n}").unwrap();
        let c = compile("::a {\n  Hello.\n}").unwrap();
        assert_eq!(a.fingerprint().len(), 32);
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint());
    }

    #[test]
    fn test_store() {
        let mut store = ScriptStore::new();
        store.insert(Locale::from("en"), compile("::a {\n  One\n  Two\n}").unwrap());

        assert!(store.contains("en"));
        assert!(!store.contains("ja"));
        assert_eq!(store.step_count("en"), 2);
        assert_eq!(store.step_count("ja"), 0);
        assert_eq!(store.step_at("en", 1).map(|s| s.line.as_str()), Some("Two"));
        assert_eq!(store.step_at("en", 2), None);
        assert_eq!(store.step_at("ja", 0), None);
    }
}
