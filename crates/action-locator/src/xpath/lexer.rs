use super::XPathError;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Tok {
    Name(String),
    Str(String),
    Num(f64),
    Slash,
    DSlash,
    Dot,
    DDot,
    At,
    Star,
    LBrack,
    RBrack,
    LParen,
    RParen,
    Comma,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    Plus,
    Minus,
    And,
    Or,
}

fn is_name_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '$')
}

/// Whether the previous token ends an operand, so a following `and`/`or` is
/// an operator rather than an element name.
fn ends_operand(tok: Option<&Tok>) -> bool {
    matches!(
        tok,
        Some(
            Tok::RBrack
                | Tok::RParen
                | Tok::Str(_)
                | Tok::Num(_)
                | Tok::Name(_)
                | Tok::Star
                | Tok::Dot
                | Tok::DDot
        )
    )
}

pub(crate) fn tokenize(input: &str) -> Result<Vec<Tok>, XPathError> {
    let chars: Vec<(usize, char)> = input.char_indices().collect();
    let at = |i: usize| chars.get(i).map(|(_, c)| *c);
    let mut toks = Vec::with_capacity(16);
    let mut i = 0;

    while let Some(c) = at(i) {
        let offset = chars[i].0;
        match c {
            c if c.is_whitespace() => i += 1,
            '/' if at(i + 1) == Some('/') => {
                toks.push(Tok::DSlash);
                i += 2;
            }
            '/' => {
                toks.push(Tok::Slash);
                i += 1;
            }
            '.' if at(i + 1) == Some('.') => {
                toks.push(Tok::DDot);
                i += 2;
            }
            '.' if at(i + 1).is_some_and(|c| c.is_ascii_digit()) => {
                let start = i;
                i += 1;
                while at(i).is_some_and(|c| c.is_ascii_digit()) {
                    i += 1;
                }
                toks.push(Tok::Num(number(&chars[start..i], offset)?));
            }
            '.' => {
                toks.push(Tok::Dot);
                i += 1;
            }
            '@' => {
                toks.push(Tok::At);
                i += 1;
            }
            '*' => {
                toks.push(Tok::Star);
                i += 1;
            }
            '[' => {
                toks.push(Tok::LBrack);
                i += 1;
            }
            ']' => {
                toks.push(Tok::RBrack);
                i += 1;
            }
            '(' => {
                toks.push(Tok::LParen);
                i += 1;
            }
            ')' => {
                toks.push(Tok::RParen);
                i += 1;
            }
            ',' => {
                toks.push(Tok::Comma);
                i += 1;
            }
            '+' => {
                toks.push(Tok::Plus);
                i += 1;
            }
            '-' => {
                toks.push(Tok::Minus);
                i += 1;
            }
            '=' => {
                toks.push(Tok::Eq);
                i += 1;
            }
            '!' if at(i + 1) == Some('=') => {
                toks.push(Tok::Ne);
                i += 2;
            }
            '<' if at(i + 1) == Some('=') => {
                toks.push(Tok::Le);
                i += 2;
            }
            '<' => {
                toks.push(Tok::Lt);
                i += 1;
            }
            '>' if at(i + 1) == Some('=') => {
                toks.push(Tok::Ge);
                i += 2;
            }
            '>' => {
                toks.push(Tok::Gt);
                i += 1;
            }
            quote @ ('\'' | '"') => {
                i += 1;
                let start = i;
                while at(i).is_some_and(|c| c != quote) {
                    i += 1;
                }
                if at(i).is_none() {
                    return Err(XPathError::Lex {
                        offset,
                        message: "unterminated string literal".into(),
                    });
                }
                toks.push(Tok::Str(chars[start..i].iter().map(|(_, c)| c).collect()));
                i += 1;
            }
            c if c.is_ascii_digit() => {
                let start = i;
                while at(i).is_some_and(|c| c.is_ascii_digit() || c == '.') {
                    i += 1;
                }
                toks.push(Tok::Num(number(&chars[start..i], offset)?));
            }
            c if is_name_start(c) => {
                let start = i;
                while at(i).is_some_and(is_name_char) {
                    i += 1;
                }
                let name: String = chars[start..i].iter().map(|(_, c)| c).collect();
                let tok = match name.as_str() {
                    "and" if ends_operand(toks.last()) => Tok::And,
                    "or" if ends_operand(toks.last()) => Tok::Or,
                    _ => Tok::Name(name),
                };
                toks.push(tok);
            }
            other => {
                return Err(XPathError::Lex {
                    offset,
                    message: format!("unexpected character '{other}'"),
                })
            }
        }
    }
    Ok(toks)
}

fn number(chars: &[(usize, char)], offset: usize) -> Result<f64, XPathError> {
    let raw: String = chars.iter().map(|(_, c)| c).collect();
    raw.parse().map_err(|_| XPathError::Lex {
        offset,
        message: format!("bad number '{raw}'"),
    })
}
