//! jq expressions for console rendering
//!
//! Format expressions are full jq programs evaluated by `jaq` against the
//! parsed JSON record, with the jaq standard library and JSON builtins in
//! scope. A [`Filter`] is checked once when it is created; each thread keeps
//! its own compiled copy for evaluation.

use super::error::{LoggerError, Result};
use jaq_core::load::{Arena, File, Loader};
use jaq_core::{Compiler, Ctx, Native, RcIter};
use jaq_json::Val;
use serde_json::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

type Compiled = jaq_core::Filter<Native<Val>>;

thread_local! {
    static COMPILED: RefCell<HashMap<String, Rc<Compiled>>> = RefCell::new(HashMap::new());
}

/// Parse and compile `source` with the standard definitions loaded
fn compile(source: &str) -> Result<Compiled> {
    let loader = Loader::new(jaq_std::defs().chain(jaq_json::defs()));
    let arena = Arena::default();
    let program = File {
        code: source,
        path: (),
    };

    let modules = loader
        .load(&arena, program)
        .map_err(|errs| filter_error(describe(errs.into_iter().map(|(_, e)| e))))?;

    Compiler::default()
        .with_funs(jaq_std::funs().chain(jaq_json::funs()))
        .compile(modules)
        .map_err(|errs| filter_error(describe(errs.into_iter().map(|(_, e)| e))))
}

fn describe<E: fmt::Debug>(errors: impl Iterator<Item = E>) -> String {
    let parts: Vec<String> = errors.map(|e| format!("{:?}", e)).collect();
    format!("invalid expression: {}", parts.join("; "))
}

fn filter_error(message: impl Into<String>) -> LoggerError {
    LoggerError::formatter("jq", message)
}

/// A checked jq expression
///
/// # Example
///
/// ```
/// use mango_logger::core::Filter;
///
/// let filter = Filter::parse(r#""[\(.level)] \(.message)""#).unwrap();
/// let line = filter.render(r#"{"level":0,"message":"hello"}"#).unwrap();
/// assert_eq!(line, r#""[0] hello""#);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    source: String,
}

impl Filter {
    /// Check that `source` parses and only calls known functions
    pub fn parse(source: &str) -> Result<Self> {
        let compiled = Rc::new(compile(source)?);
        COMPILED.with(|cache| {
            cache.borrow_mut().insert(source.to_string(), compiled);
        });
        Ok(Self {
            source: source.to_string(),
        })
    }

    /// The expression text this filter was created from
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Every value the expression produces for `input`
    pub fn run(&self, input: &Value) -> Result<Vec<Value>> {
        let filter = self.compiled()?;
        let inputs = RcIter::new(core::iter::empty());
        let outputs = filter.run((Ctx::new([], &inputs), Val::from(input.clone())));

        let mut values = Vec::new();
        for output in outputs {
            let val = output.map_err(|e| filter_error(e.to_string()))?;
            values.push(Value::from(val));
        }
        Ok(values)
    }

    /// Apply the filter to a JSON document and encode the last result
    ///
    /// An expression producing no values renders as `null`.
    pub fn render(&self, json: &str) -> Result<String> {
        let input: Value = serde_json::from_str(json)?;
        let last = self.run(&input)?.pop().unwrap_or(Value::Null);
        Ok(serde_json::to_string(&last)?)
    }

    /// This thread's compiled copy, compiling it on first use
    fn compiled(&self) -> Result<Rc<Compiled>> {
        if let Some(found) = COMPILED.with(|cache| cache.borrow().get(&self.source).cloned()) {
            return Ok(found);
        }
        let compiled = Rc::new(compile(&self.source)?);
        COMPILED.with(|cache| {
            cache
                .borrow_mut()
                .insert(self.source.clone(), Rc::clone(&compiled));
        });
        Ok(compiled)
    }
}

impl FromStr for Filter {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self> {
        Filter::parse(s)
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Check `expression` and render `json` through it
pub fn format_with_filter(json: &str, expression: &str) -> Result<String> {
    Filter::parse(expression)?.render(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::DEFAULT_FRIENDLY_FORMAT;
    use serde_json::json;
    use std::thread;

    fn record() -> Value {
        json!({
            "ts": "2025-01-08T10:30:45.12Z",
            "type": "Business",
            "operation": "op1",
            "level": 0,
            "message": "hello",
            "attributes": {"a": "1"},
            "tags": ["x", "y", "z"]
        })
    }

    fn run(expr: &str) -> Vec<Value> {
        Filter::parse(expr).unwrap().run(&record()).unwrap()
    }

    #[test]
    fn test_identity_renders_whole_record() {
        let json = r#"{"a":1}"#;
        assert_eq!(format_with_filter(json, ".").unwrap(), json);
    }

    #[test]
    fn test_field_paths() {
        assert_eq!(run(".operation"), vec![json!("op1")]);
        assert_eq!(run(".attributes.a"), vec![json!("1")]);
        assert_eq!(run(r#".["message"]"#), vec![json!("hello")]);
        assert_eq!(run(".missing.deeper"), vec![Value::Null]);
        assert_eq!(run(".tags[]"), vec![json!("x"), json!("y"), json!("z")]);
    }

    #[test]
    fn test_default_friendly_format() {
        let filter = Filter::parse(DEFAULT_FRIENDLY_FORMAT).unwrap();
        let line = filter.render(&record().to_string()).unwrap();
        assert_eq!(
            line,
            r#""[0] - 2025-01-08T10:30:45.12Z - op1 - hello - {\"a\":\"1\"}""#
        );
    }

    #[test]
    fn test_general_jq_programs() {
        assert_eq!(run(r#".message + "!""#), vec![json!("hello!")]);
        assert_eq!(
            run(r#"if .level == 0 then "INFO" else "OTHER" end"#),
            vec![json!("INFO")]
        );
        assert_eq!(
            run(".attributes | to_entries"),
            vec![json!([{"key": "a", "value": "1"}])]
        );
        assert_eq!(run(r#".ts | ltrimstr("2025")"#), vec![json!("-01-08T10:30:45.12Z")]);
        assert_eq!(run(".nope // \"fallback\""), vec![json!("fallback")]);
        assert_eq!(run(".tags | map(ascii_upcase) | join(\",\")"), vec![json!("X,Y,Z")]);
    }

    #[test]
    fn test_runtime_error() {
        let filter = Filter::parse(".message.x").unwrap();
        let err = filter.run(&record()).unwrap_err();
        assert!(matches!(err, LoggerError::FormatterError { .. }));
        assert_eq!(run(".message.x?"), Vec::<Value>::new());
    }

    #[test]
    fn test_render_uses_last_value() {
        let filter = Filter::parse(".operation, .level").unwrap();
        assert_eq!(filter.render(&record().to_string()).unwrap(), "0");

        let filter = Filter::parse("empty").unwrap();
        assert_eq!(filter.render("{}").unwrap(), "null");
    }

    #[test]
    fn test_parse_errors() {
        for bad in [".a |", "\"open", "nosuchfn", "(.a", ".a ]"] {
            assert!(Filter::parse(bad).is_err(), "expected error for {bad:?}");
        }
    }

    #[test]
    fn test_render_on_other_thread() {
        let filter = Filter::parse(".operation").unwrap();
        let line = thread::spawn(move || filter.render(&record().to_string()).unwrap())
            .join()
            .unwrap();
        assert_eq!(line, r#""op1""#);
    }

    #[test]
    fn test_render_rejects_malformed_json() {
        let filter = Filter::parse(".").unwrap();
        assert!(filter.render("{not json").is_err());
    }
}
