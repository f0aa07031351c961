use crate::pattern::ast::{ParameterNode, SchemaAst, SchemaNode};
use crate::pattern::{PatternError, PatternResult};

#[tracing::instrument(level = "trace", skip_all, fields(schema = %schema))]
pub fn parse_schema(schema: &str) -> PatternResult<SchemaAst> {
    let mut parser = SchemaParser::new(schema);
    let nodes = parser.parse_sequence(None)?;
    Ok(SchemaAst::new(nodes))
}

struct SchemaParser<'a> {
    schema: &'a str,
    chars: Vec<(usize, char)>,
    index: usize,
}

impl<'a> SchemaParser<'a> {
    fn new(schema: &'a str) -> Self {
        Self {
            schema,
            chars: schema.char_indices().collect(),
            index: 0,
        }
    }

    /// Parses until `]` when `segment_start` is set, or to the end of input.
    fn parse_sequence(&mut self, segment_start: Option<usize>) -> PatternResult<Vec<SchemaNode>> {
        let mut nodes = Vec::new();
        while let Some(ch) = self.peek() {
            match ch {
                ']' if segment_start.is_some() => {
                    self.next();
                    return Ok(nodes);
                }
                ']' | '}' => {
                    return Err(PatternError::UnexpectedClosing {
                        schema: self.schema.to_string(),
                        index: self.current_byte_index(),
                        found: ch,
                    });
                }
                '{' => nodes.push(self.parse_parameter()?),
                '[' => nodes.push(self.parse_segment()?),
                _ => nodes.push(self.parse_literal()?),
            }
        }

        if let Some(start) = segment_start {
            return Err(PatternError::UnterminatedSegment {
                schema: self.schema.to_string(),
                start,
            });
        }

        Ok(nodes)
    }

    fn parse_literal(&mut self) -> PatternResult<SchemaNode> {
        let mut literal = String::new();
        while let Some(ch) = self.peek() {
            match ch {
                '{' | '}' | '[' | ']' => break,
                '\\' => literal.push(self.consume_escape_char()?),
                _ => {
                    literal.push(ch);
                    self.next();
                }
            }
        }
        Ok(SchemaNode::Literal(literal))
    }

    fn parse_segment(&mut self) -> PatternResult<SchemaNode> {
        let start = self.current_byte_index();
        self.expect('[');
        let nodes = self.parse_sequence(Some(start))?;
        Ok(SchemaNode::Segment(nodes))
    }

    fn parse_parameter(&mut self) -> PatternResult<SchemaNode> {
        let start = self.current_byte_index();
        self.expect('{');

        // (char, escaped) pairs of the token body; validators may carry their
        // own `{m,n}` quantifiers, so braces nest.
        let mut body: Vec<(char, bool)> = Vec::new();
        let mut depth = 1usize;
        loop {
            match self.peek() {
                None => {
                    return Err(PatternError::UnterminatedParameter {
                        schema: self.schema.to_string(),
                        start,
                    });
                }
                Some('\\') => {
                    let escaped = self.consume_escape_char()?;
                    body.push((escaped, true));
                }
                Some('{') => {
                    depth += 1;
                    body.push(('{', false));
                    self.next();
                }
                Some('}') => {
                    depth -= 1;
                    self.next();
                    if depth == 0 {
                        break;
                    }
                    body.push(('}', false));
                }
                Some(ch) => {
                    body.push((ch, false));
                    self.next();
                }
            }
        }

        let optional = if self.peek() == Some('?') {
            self.next();
            true
        } else {
            false
        };

        let node = split_parameter(&body, optional).ok_or_else(|| {
            PatternError::ParameterMissingName {
                schema: self.schema.to_string(),
            }
        })?;

        Ok(SchemaNode::Parameter(node))
    }

    fn expect(&mut self, expected: char) {
        let actual = self.next();
        debug_assert_eq!(Some(expected), actual);
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.index).map(|(_, ch)| *ch)
    }

    fn next(&mut self) -> Option<char> {
        let ch = self.peek();
        if ch.is_some() {
            self.index += 1;
        }
        ch
    }

    fn current_byte_index(&self) -> usize {
        self.chars
            .get(self.index)
            .map(|(idx, _)| *idx)
            .unwrap_or(self.schema.len())
    }

    fn consume_escape_char(&mut self) -> PatternResult<char> {
        let escape_index = self.current_byte_index();
        self.next();
        match self.next() {
            Some(ch) => Ok(ch),
            None => Err(PatternError::LoneEscapeCharacter {
                schema: self.schema.to_string(),
                index: escape_index,
            }),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Part {
    Name,
    Default,
    Type,
    Validator,
}

/// Splits `name[:default][#type][|validator]`. Returns `None` for an empty name.
fn split_parameter(body: &[(char, bool)], optional: bool) -> Option<ParameterNode> {
    let mut name = String::new();
    let mut default = String::new();
    let mut type_name = String::new();
    let mut validator = String::new();
    let mut saw_default = false;
    let mut saw_type = false;
    let mut part = Part::Name;

    for &(ch, escaped) in body {
        if !escaped {
            let next = match (part, ch) {
                (Part::Name, ':') => Some(Part::Default),
                (Part::Name | Part::Default, '#') => Some(Part::Type),
                (Part::Name | Part::Default | Part::Type, '|') => Some(Part::Validator),
                _ => None,
            };
            if let Some(next) = next {
                saw_default |= next == Part::Default;
                saw_type |= next == Part::Type;
                part = next;
                continue;
            }
        }

        match part {
            Part::Name => name.push(ch),
            Part::Default => default.push(ch),
            Part::Type => type_name.push(ch),
            Part::Validator => {
                if escaped {
                    validator.push('\\');
                }
                validator.push(ch);
            }
        }
    }

    if name.is_empty() {
        return None;
    }

    let non_empty = |flag: bool, value: String| (flag && !value.is_empty()).then_some(value);

    Some(ParameterNode {
        name,
        default: non_empty(saw_default, default),
        type_name: non_empty(saw_type, type_name),
        validator: (!validator.is_empty()).then_some(validator),
        optional,
    })
}
