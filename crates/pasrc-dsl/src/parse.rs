//! Parser: indentation-based text → `IrBlock` (§6, "The text DSL"), the
//! inverse of [`crate::pretty::print_block`].

use pasrc_model::{ArgMetadata, FuncNode, IrBlock, PropNode, TypeRef, TypedName};

use crate::error::Error;

struct Line {
    indent: u32,
    text: String,
    line_no: u32,
}

fn tokenize(input: &str) -> Result<Vec<Line>, Error> {
    let mut lines = Vec::new();

    for (i, raw) in input.lines().enumerate() {
        let line_no = i as u32 + 1;

        if raw.trim().is_empty() {
            continue;
        }
        if raw.contains('\t') {
            return Err(Error::TabIndentation { line: line_no });
        }

        let leading = raw.len() - raw.trim_start_matches(' ').len();
        if leading % 4 != 0 {
            return Err(Error::Malformed {
                line: line_no,
                message: "indentation must be a multiple of 4 spaces".to_string(),
            });
        }

        lines.push(Line {
            indent: (leading / 4) as u32,
            text: raw.trim().to_string(),
            line_no,
        });
    }

    Ok(lines)
}

fn is_function_header(text: &str) -> bool {
    text.ends_with(':') && text.contains('(')
}

fn is_block_header(text: &str) -> bool {
    text.ends_with(':') && text.contains(" As ")
}

struct Parser {
    lines: Vec<Line>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Line> {
        self.lines.get(self.pos)
    }

    fn next_at(&mut self, indent: u32) -> Result<&Line, Error> {
        let line = self.lines.get(self.pos).ok_or(Error::UnexpectedEof)?;
        if line.indent != indent {
            return Err(Error::BadIndent { line: line.line_no, expected: indent, found: line.indent });
        }
        self.pos += 1;
        Ok(&self.lines[self.pos - 1])
    }

    fn parse_block(&mut self, indent: u32) -> Result<IrBlock, Error> {
        let header = self.next_at(indent)?;
        let (identifier, kind) = parse_header(header)?;
        let mut block = IrBlock::new(TypedName { identifier, kind });

        while matches!(self.peek(), Some(l) if l.indent == indent + 1 && !is_function_header(&l.text) && !is_block_header(&l.text))
        {
            block.properties.push(self.parse_property(indent + 1)?);
        }

        while matches!(self.peek(), Some(l) if l.indent == indent + 1 && is_function_header(&l.text)) {
            block.functions.push(self.parse_function(indent + 1)?);
        }

        while matches!(self.peek(), Some(l) if l.indent == indent + 1 && is_block_header(&l.text)) {
            block.children.push(self.parse_block(indent + 1)?);
        }

        Ok(block)
    }

    fn parse_property(&mut self, indent: u32) -> Result<PropNode, Error> {
        let line = self.next_at(indent)?;
        let line_no = line.line_no;

        if let Some(rest) = line.text.strip_suffix('=') {
            let identifier = rest.trim_end().to_string();
            let mut parts = Vec::new();

            while matches!(self.peek(), Some(l) if l.indent == indent + 1 && l.text.starts_with("| ")) {
                let cont = self.next_at(indent + 1)?;
                parts.push(cont.text[2..].to_string());
            }

            if parts.is_empty() {
                return Err(Error::Malformed {
                    line: line_no,
                    message: format!("property `{identifier}` has no continuation lines"),
                });
            }

            Ok(PropNode { identifier, expression: parts.join("\n") })
        } else if let Some(eq_pos) = line.text.find(" = ") {
            let identifier = line.text[..eq_pos].to_string();
            let expression = line.text[eq_pos + 3..].to_string();
            Ok(PropNode { identifier, expression })
        } else {
            Err(Error::Malformed { line: line_no, message: "expected `name = expression`".to_string() })
        }
    }

    fn parse_function(&mut self, indent: u32) -> Result<FuncNode, Error> {
        let header = self.next_at(indent)?;
        let line_no = header.line_no;

        let text = header.text.strip_suffix(':').ok_or_else(|| Error::Malformed {
            line: line_no,
            message: "expected function header ending with `:`".to_string(),
        })?;
        let open = text.find('(').ok_or_else(|| Error::Malformed {
            line: line_no,
            message: "expected `(` in function header".to_string(),
        })?;
        let close = text.rfind(')').ok_or_else(|| Error::Malformed {
            line: line_no,
            message: "expected `)` in function header".to_string(),
        })?;

        let identifier = text[..open].trim().to_string();
        let args_str = &text[open + 1..close];

        let mut args = Vec::new();
        if !args_str.trim().is_empty() {
            for part in args_str.split(',') {
                let (name, ty) = part.split_once(':').ok_or_else(|| Error::Malformed {
                    line: line_no,
                    message: format!("malformed argument `{part}`"),
                })?;
                args.push(TypedName {
                    identifier: name.trim().to_string(),
                    kind: TypeRef { type_name: ty.trim().to_string(), optional_variant: None },
                });
            }
        }

        let mut metadata = Vec::new();
        while matches!(self.peek(), Some(l) if l.indent == indent + 1) {
            let prop = self.parse_property(indent + 1)?;
            metadata.push(ArgMetadata { identifier: prop.identifier, default_expression: prop.expression });
        }

        Ok(FuncNode { identifier, args, metadata })
    }
}

fn parse_header(line: &Line) -> Result<(String, TypeRef), Error> {
    let text = line.text.strip_suffix(':').ok_or_else(|| Error::Malformed {
        line: line.line_no,
        message: "expected block header ending with `:`".to_string(),
    })?;
    let (ident, rest) = text.split_once(" As ").ok_or_else(|| Error::Malformed {
        line: line.line_no,
        message: "expected `Name As Type` header".to_string(),
    })?;

    let (type_name, variant) = match rest.split_once('.') {
        Some((t, v)) => (t.to_string(), Some(v.to_string())),
        None => (rest.to_string(), None),
    };

    Ok((
        ident.trim().to_string(),
        TypeRef { type_name: type_name.trim().to_string(), optional_variant: variant },
    ))
}

pub fn parse_block(input: &str) -> Result<IrBlock, Error> {
    let lines = tokenize(input)?;
    let mut parser = Parser { lines, pos: 0 };
    let block = parser.parse_block(0)?;

    if parser.pos != parser.lines.len() {
        let trailing = &parser.lines[parser.pos];
        return Err(Error::Malformed {
            line: trailing.line_no,
            message: "unexpected trailing content after the root block".to_string(),
        });
    }

    Ok(block)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::pretty::print_block;

    #[test]
    fn round_trips_through_pretty_printer() {
        let mut block = IrBlock::new(TypedName {
            identifier: "Screen1".into(),
            kind: TypeRef { type_name: "Screen".into(), optional_variant: None },
        });
        block.properties.push(PropNode { identifier: "Fill".into(), expression: "RGBA(0,0,0,1)".into() });
        block.properties.push(PropNode { identifier: "OnVisible".into(), expression: "Set(x,1)\nSet(y,2)".into() });
        block.functions.push(FuncNode {
            identifier: "OnSelect".into(),
            args: vec![TypedName { identifier: "record".into(), kind: TypeRef { type_name: "Record".into(), optional_variant: None } }],
            metadata: vec![
                ArgMetadata { identifier: "ThisProperty".into(), default_expression: "Navigate(Screen2)".into() },
                ArgMetadata { identifier: "record".into(), default_expression: "ThisItem".into() },
            ],
        });
        let mut child = IrBlock::new(TypedName {
            identifier: "Label1".into(),
            kind: TypeRef { type_name: "Classic/Label".into(), optional_variant: Some("V1".into()) },
        });
        child.properties.push(PropNode { identifier: "Text".into(), expression: "\"hi\"".into() });
        block.children.push(child);

        let text = print_block(&block);
        let reparsed = parse_block(&text).unwrap();
        assert_eq!(reparsed, block);
    }

    #[test]
    fn tab_indentation_is_rejected() {
        let err = parse_block("Screen1 As Screen:\n\tText = 1\n").unwrap_err();
        assert!(matches!(err, Error::TabIndentation { line: 2 }));
    }
}
