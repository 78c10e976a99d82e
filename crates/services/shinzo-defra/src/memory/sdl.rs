use pest::Parser;

use super::gql::{unexpected, GraphqlParser, Rule};

/// A collection declared by an SDL `type` definition.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CollectionSchema {
    pub name: String,
    pub fields: Vec<String>,
}

/// Parse `type Name { field: Type ... }` definitions.
pub(crate) fn parse_sdl(src: &str) -> Result<Vec<CollectionSchema>, String> {
    let schema = GraphqlParser::parse(Rule::schema, src)
        .map_err(|e| e.to_string())?
        .next()
        .ok_or("schema is empty")?;

    let mut collections = Vec::new();
    for definition in schema.into_inner() {
        if definition.as_rule() != Rule::type_definition {
            continue;
        }

        let mut name = String::new();
        let mut fields: Vec<String> = Vec::new();
        for part in definition.into_inner() {
            match part.as_rule() {
                Rule::type_keyword => {}
                Rule::name => name = part.as_str().to_string(),
                Rule::directive => return Err(format!("directives are not supported on type {}", name)),
                Rule::field_definition => {
                    let mut inner = part.into_inner();
                    let field = inner
                        .next()
                        .map(|p| p.as_str().to_string())
                        .ok_or("field definition without a name")?;
                    if inner.any(|p| p.as_rule() == Rule::directive) {
                        return Err(format!("directives are not supported on field {}.{}", name, field));
                    }
                    if fields.contains(&field) {
                        return Err(format!("duplicate field {}.{}", name, field));
                    }
                    fields.push(field);
                }
                other => return Err(unexpected(other)),
            }
        }

        collections.push(CollectionSchema { name, fields });
    }

    if collections.is_empty() {
        return Err("no type definitions found in schema".to_string());
    }
    Ok(collections)
}
