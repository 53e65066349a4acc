//! Reader for the `erDiagram` subset this crate emits.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use super::format::Cardinality;

static RELATIONSHIP_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^(\w+)\s+(\S+)\s+(\w+)\s*:\s*"(.*)"$"#).expect("valid regex")
});
static ENTITY_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\w+$").expect("valid regex"));

/// Errors that can occur while reading a diagram.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DiagramParseError {
    #[error("Missing erDiagram header")]
    MissingHeader,

    #[error("Line {line}: unterminated entity block '{name}'")]
    UnterminatedEntity { line: usize, name: String },

    #[error("Line {line}: invalid attribute '{content}'")]
    InvalidAttribute { line: usize, content: String },

    #[error("Line {line}: unknown cardinality '{symbol}'")]
    UnknownCardinality { line: usize, symbol: String },

    #[error("Line {line}: unrecognized content '{content}'")]
    InvalidLine { line: usize, content: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAttribute {
    pub type_name: String,
    pub name: String,
    pub primary_key: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedEntity {
    pub name: String,
    pub attributes: Vec<ParsedAttribute>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRelationship {
    pub left: String,
    pub cardinality: Cardinality,
    pub right: String,
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedDiagram {
    pub entities: Vec<ParsedEntity>,
    pub relationships: Vec<ParsedRelationship>,
}

impl ParsedDiagram {
    pub fn entity(&self, name: &str) -> Option<&ParsedEntity> {
        self.entities.iter().find(|e| e.name == name)
    }
}

/// Parse diagram text back into entities and relationship lines.
pub fn parse_er_diagram(text: &str) -> Result<ParsedDiagram, DiagramParseError> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim()))
        .filter(|(_, l)| !l.is_empty());

    match lines.next() {
        Some((_, "erDiagram")) => {}
        _ => return Err(DiagramParseError::MissingHeader),
    }

    let mut diagram = ParsedDiagram::default();
    let mut open: Option<(usize, ParsedEntity)> = None;

    for (line, content) in lines {
        if open.is_some() {
            if content == "}" {
                if let Some((_, entity)) = open.take() {
                    diagram.entities.push(entity);
                }
            } else if let Some((_, entity)) = open.as_mut() {
                entity.attributes.push(parse_attribute(line, content)?);
            }
            continue;
        }

        if let Some(name) = content.strip_suffix('{') {
            let name = name.trim();
            if !ENTITY_NAME.is_match(name) {
                return Err(DiagramParseError::InvalidLine {
                    line,
                    content: content.to_string(),
                });
            }
            open = Some((
                line,
                ParsedEntity {
                    name: name.to_string(),
                    attributes: Vec::new(),
                },
            ));
        } else if let Some(caps) = RELATIONSHIP_LINE.captures(content) {
            let symbol = &caps[2];
            let cardinality = Cardinality::from_symbol(symbol).ok_or_else(|| {
                DiagramParseError::UnknownCardinality {
                    line,
                    symbol: symbol.to_string(),
                }
            })?;
            diagram.relationships.push(ParsedRelationship {
                left: caps[1].to_string(),
                cardinality,
                right: caps[3].to_string(),
                label: caps[4].to_string(),
            });
        } else if ENTITY_NAME.is_match(content) {
            diagram.entities.push(ParsedEntity {
                name: content.to_string(),
                attributes: Vec::new(),
            });
        } else {
            return Err(DiagramParseError::InvalidLine {
                line,
                content: content.to_string(),
            });
        }
    }

    if let Some((line, entity)) = open {
        return Err(DiagramParseError::UnterminatedEntity {
            line,
            name: entity.name,
        });
    }

    Ok(diagram)
}

fn parse_attribute(line: usize, content: &str) -> Result<ParsedAttribute, DiagramParseError> {
    let invalid = || DiagramParseError::InvalidAttribute {
        line,
        content: content.to_string(),
    };

    let parts: Vec<&str> = content.split_whitespace().collect();
    let primary_key = match parts.as_slice() {
        [_, _] => false,
        [_, _, "PK"] => true,
        _ => return Err(invalid()),
    };

    Ok(ParsedAttribute {
        type_name: parts[0].to_string(),
        name: parts[1].to_string(),
        primary_key,
    })
}
