use super::lexer::Tok;
use super::XPathError;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Path {
    pub absolute: bool,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Step {
    pub axis: Axis,
    pub test: NodeTest,
    pub predicates: Vec<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Axis {
    Child,
    Descendant,
    SelfNode,
    Parent,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum NodeTest {
    Name(String),
    Any,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Op {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    Add,
    Sub,
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Func {
    Text,
    Position,
    Last,
    Contains,
    StartsWith,
    EndsWith,
    Not,
    True,
    False,
}

impl Func {
    fn lookup(name: &str) -> Option<(Func, usize)> {
        let found = match name {
            "text" => (Func::Text, 0),
            "position" => (Func::Position, 0),
            "last" => (Func::Last, 0),
            "contains" => (Func::Contains, 2),
            "starts-with" => (Func::StartsWith, 2),
            "ends-with" => (Func::EndsWith, 2),
            "not" => (Func::Not, 1),
            "true" => (Func::True, 0),
            "false" => (Func::False, 0),
            _ => return None,
        };
        Some(found)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Expr {
    Binary(Op, Box<Expr>, Box<Expr>),
    Neg(Box<Expr>),
    Call(Func, Vec<Expr>),
    Attr(String),
    Path(Path),
    Str(String),
    Num(f64),
}

/// Longest accepted expression, in tokens. Bounds the depth of operator
/// chains, which nest without parser recursion.
pub(crate) const MAX_TOKENS: usize = 512;

/// Deepest accepted nesting of parentheses, predicates, call arguments and
/// unary minus.
pub(crate) const MAX_DEPTH: usize = 64;

pub(crate) fn parse(toks: Vec<Tok>) -> Result<Path, XPathError> {
    if toks.is_empty() {
        return Err(XPathError::Empty);
    }
    if toks.len() > MAX_TOKENS {
        return Err(XPathError::Parse(format!(
            "expression is too long ({} tokens, limit {MAX_TOKENS})",
            toks.len()
        )));
    }
    let mut parser = Parser {
        toks,
        pos: 0,
        depth: 0,
    };
    let path = parser.location_path()?;
    match parser.peek() {
        None => Ok(path),
        Some(tok) => Err(XPathError::Parse(format!("unexpected {tok:?} after path"))),
    }
}

struct Parser {
    toks: Vec<Tok>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Tok> {
        self.toks.get(self.pos)
    }

    fn peek_at(&self, ahead: usize) -> Option<&Tok> {
        self.toks.get(self.pos + ahead)
    }

    fn advance(&mut self) -> Option<Tok> {
        let tok = self.toks.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn eat(&mut self, tok: &Tok) -> bool {
        if self.peek() == Some(tok) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, tok: &Tok) -> Result<(), XPathError> {
        if self.eat(tok) {
            Ok(())
        } else {
            Err(XPathError::Parse(format!(
                "expected {tok:?}, found {:?}",
                self.peek()
            )))
        }
    }

    fn location_path(&mut self) -> Result<Path, XPathError> {
        let mut steps = Vec::new();
        let absolute = match self.peek() {
            Some(Tok::DSlash) => {
                self.advance();
                steps.push(self.step(Axis::Descendant)?);
                true
            }
            Some(Tok::Slash) => {
                self.advance();
                if self.starts_step() {
                    steps.push(self.step(Axis::Child)?);
                }
                true
            }
            _ => {
                steps.push(self.step(Axis::Child)?);
                false
            }
        };

        loop {
            if self.eat(&Tok::DSlash) {
                steps.push(self.step(Axis::Descendant)?);
            } else if self.eat(&Tok::Slash) {
                steps.push(self.step(Axis::Child)?);
            } else {
                break;
            }
        }
        Ok(Path { absolute, steps })
    }

    fn starts_step(&self) -> bool {
        matches!(
            self.peek(),
            Some(Tok::Name(_) | Tok::Star | Tok::Dot | Tok::DDot)
        )
    }

    fn step(&mut self, axis: Axis) -> Result<Step, XPathError> {
        let (axis, test) = match self.advance() {
            Some(Tok::Dot) => (Axis::SelfNode, NodeTest::Any),
            Some(Tok::DDot) => (Axis::Parent, NodeTest::Any),
            Some(Tok::Star) => (axis, NodeTest::Any),
            Some(Tok::Name(name)) => {
                if self.peek() == Some(&Tok::LParen) {
                    return Err(XPathError::Parse(format!(
                        "function '{name}' cannot be used as a location step"
                    )));
                }
                (axis, NodeTest::Name(name))
            }
            other => {
                return Err(XPathError::Parse(format!(
                    "expected a node test, found {other:?}"
                )))
            }
        };

        let mut predicates = Vec::new();
        while self.eat(&Tok::LBrack) {
            predicates.push(self.or_expr()?);
            self.expect(&Tok::RBrack)?;
        }
        if !predicates.is_empty() && matches!(axis, Axis::SelfNode | Axis::Parent) {
            return Err(XPathError::Parse(
                "predicates are not allowed after '.' or '..'".into(),
            ));
        }
        Ok(Step {
            axis,
            test,
            predicates,
        })
    }

    fn binary(
        &mut self,
        ops: &[(Tok, Op)],
        next: fn(&mut Self) -> Result<Expr, XPathError>,
    ) -> Result<Expr, XPathError> {
        let mut left = next(self)?;
        'outer: loop {
            for (tok, op) in ops {
                if self.eat(tok) {
                    let right = next(self)?;
                    left = Expr::Binary(*op, Box::new(left), Box::new(right));
                    continue 'outer;
                }
            }
            return Ok(left);
        }
    }

    fn nested<T>(
        &mut self,
        inner: impl FnOnce(&mut Self) -> Result<T, XPathError>,
    ) -> Result<T, XPathError> {
        if self.depth >= MAX_DEPTH {
            return Err(XPathError::Parse("expression nested too deeply".into()));
        }
        self.depth += 1;
        let result = inner(self);
        self.depth -= 1;
        result
    }

    fn or_expr(&mut self) -> Result<Expr, XPathError> {
        self.nested(|parser| parser.binary(&[(Tok::Or, Op::Or)], Self::and_expr))
    }

    fn and_expr(&mut self) -> Result<Expr, XPathError> {
        self.binary(&[(Tok::And, Op::And)], Self::equality)
    }

    fn equality(&mut self) -> Result<Expr, XPathError> {
        self.binary(&[(Tok::Eq, Op::Eq), (Tok::Ne, Op::Ne)], Self::relational)
    }

    fn relational(&mut self) -> Result<Expr, XPathError> {
        self.binary(
            &[
                (Tok::Le, Op::Le),
                (Tok::Ge, Op::Ge),
                (Tok::Lt, Op::Lt),
                (Tok::Gt, Op::Gt),
            ],
            Self::additive,
        )
    }

    fn additive(&mut self) -> Result<Expr, XPathError> {
        self.binary(&[(Tok::Plus, Op::Add), (Tok::Minus, Op::Sub)], Self::unary)
    }

    fn unary(&mut self) -> Result<Expr, XPathError> {
        if self.eat(&Tok::Minus) {
            self.nested(|parser| Ok(Expr::Neg(Box::new(parser.unary()?))))
        } else {
            self.primary()
        }
    }

    fn primary(&mut self) -> Result<Expr, XPathError> {
        match self.peek().cloned() {
            Some(Tok::LParen) => {
                self.advance();
                let expr = self.or_expr()?;
                self.expect(&Tok::RParen)?;
                Ok(expr)
            }
            Some(Tok::Str(value)) => {
                self.advance();
                Ok(Expr::Str(value))
            }
            Some(Tok::Num(value)) => {
                self.advance();
                Ok(Expr::Num(value))
            }
            Some(Tok::At) => {
                self.advance();
                match self.advance() {
                    Some(Tok::Name(name)) => Ok(Expr::Attr(name)),
                    other => Err(XPathError::Parse(format!(
                        "expected an attribute name after '@', found {other:?}"
                    ))),
                }
            }
            Some(Tok::Name(name)) if self.peek_at(1) == Some(&Tok::LParen) => {
                self.advance();
                self.advance();
                self.call(name)
            }
            Some(Tok::Name(_) | Tok::Star | Tok::Dot | Tok::DDot | Tok::Slash | Tok::DSlash) => {
                Ok(Expr::Path(self.location_path()?))
            }
            other => Err(XPathError::Parse(format!(
                "unexpected {other:?} in predicate"
            ))),
        }
    }

    fn call(&mut self, name: String) -> Result<Expr, XPathError> {
        let (func, arity) =
            Func::lookup(&name).ok_or_else(|| XPathError::UnknownFunction(name.clone()))?;
        let mut args = Vec::new();
        if !self.eat(&Tok::RParen) {
            args.push(self.or_expr()?);
            while self.eat(&Tok::Comma) {
                args.push(self.or_expr()?);
            }
            self.expect(&Tok::RParen)?;
        }
        if args.len() != arity {
            return Err(XPathError::Arity {
                function: name,
                expected: arity,
                found: args.len(),
            });
        }
        Ok(Expr::Call(func, args))
    }
}
