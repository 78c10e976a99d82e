//! Parser for the GraphQL subset `MemoryNode` understands.

use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;
use serde_json::{Map, Number, Value};

#[derive(Parser)]
#[grammar = "memory/graphql.pest"]
pub(crate) struct GraphqlParser;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OperationKind {
    Query,
    Mutation,
    Subscription,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Field {
    pub alias: Option<String>,
    pub name: String,
    pub arguments: Map<String, Value>,
    pub selection: Vec<Field>,
}

impl Field {
    /// Key under which this field appears in the response.
    pub fn response_key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Operation {
    pub kind: OperationKind,
    pub fields: Vec<Field>,
}

/// Parse a single executable request.
pub(crate) fn parse_request(src: &str) -> Result<Operation, String> {
    let operation = GraphqlParser::parse(Rule::request, src)
        .map_err(|e| e.to_string())?
        .next()
        .and_then(|request| request.into_inner().next())
        .ok_or("request is empty")?;

    let mut kind = OperationKind::Query;
    let mut fields = Vec::new();
    for part in operation.into_inner() {
        match part.as_rule() {
            Rule::operation_type => {
                kind = match part.as_str() {
                    "mutation" => OperationKind::Mutation,
                    "subscription" => OperationKind::Subscription,
                    _ => OperationKind::Query,
                }
            }
            // operation name
            Rule::name => {}
            Rule::variable_definitions => return Err("variables are not supported".to_string()),
            Rule::selection_set => fields = selection_set(part)?,
            other => return Err(unexpected(other)),
        }
    }

    Ok(Operation { kind, fields })
}

fn selection_set(pair: Pair<Rule>) -> Result<Vec<Field>, String> {
    pair.into_inner().map(field).collect()
}

fn field(pair: Pair<Rule>) -> Result<Field, String> {
    let mut alias = None;
    let mut name = None;
    let mut arguments = Map::new();
    let mut selection = Vec::new();

    for part in pair.into_inner() {
        match part.as_rule() {
            Rule::alias => alias = part.into_inner().next().map(|n| n.as_str().to_string()),
            Rule::name => name = Some(part.as_str().to_string()),
            Rule::arguments => arguments = entries(part)?,
            Rule::directive => {
                return Err(format!(
                    "directives are not supported on field {}",
                    name.as_deref().unwrap_or_default()
                ))
            }
            Rule::selection_set => selection = selection_set(part)?,
            other => return Err(unexpected(other)),
        }
    }

    Ok(Field {
        alias,
        name: name.ok_or("field without a name")?,
        arguments,
        selection,
    })
}

/// Collect `name: value` pairs of an argument list or object literal.
fn entries(pair: Pair<Rule>) -> Result<Map<String, Value>, String> {
    let mut map = Map::new();
    for entry in pair.into_inner() {
        let mut inner = entry.into_inner();
        let key = inner.next().ok_or("entry without a name")?.as_str().to_string();
        let value = value(inner.next().ok_or("entry without a value")?)?;
        map.insert(key, value);
    }
    Ok(map)
}

fn value(pair: Pair<Rule>) -> Result<Value, String> {
    let inner = pair.into_inner().next().ok_or("expected a value")?;
    match inner.as_rule() {
        Rule::variable => Err("variables are not supported".to_string()),
        Rule::string => {
            let raw = inner.into_inner().next().map(|p| p.as_str()).unwrap_or_default();
            unescape(raw).map(Value::String)
        }
        Rule::number => parse_number(inner.as_str()),
        Rule::true_lit => Ok(Value::Bool(true)),
        Rule::false_lit => Ok(Value::Bool(false)),
        Rule::null_lit => Ok(Value::Null),
        // enum values are carried as plain strings
        Rule::enum_value => Ok(Value::String(inner.as_str().to_string())),
        Rule::list => inner.into_inner().map(value).collect::<Result<_, _>>().map(Value::Array),
        Rule::object => entries(inner).map(Value::Object),
        other => Err(unexpected(other)),
    }
}

fn unescape(raw: &str) -> Result<String, String> {
    let mut text = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            text.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => text.push('\n'),
            Some('t') => text.push('\t'),
            Some('r') => text.push('\r'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                let decoded = u32::from_str_radix(&hex, 16)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or_else(|| format!("invalid unicode escape \\u{}", hex))?;
                text.push(decoded);
            }
            Some(other) => text.push(other),
            None => return Err("dangling escape at end of string".to_string()),
        }
    }
    Ok(text)
}

fn parse_number(raw: &str) -> Result<Value, String> {
    if let Ok(int) = raw.parse::<i64>() {
        return Ok(Value::Number(int.into()));
    }
    raw.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| format!("invalid number literal {}", raw))
}

pub(crate) fn unexpected(rule: Rule) -> String {
    format!("unexpected {:?}", rule)
}
