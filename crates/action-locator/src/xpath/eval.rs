use ui_snapshot::{Node, NodeId, UiSnapshot};

use super::parser::{Axis, Expr, Func, NodeTest, Op, Path, Step};

/// Position in the tree during evaluation. `Document` is the virtual parent
/// of the evaluation root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Cursor {
    Document,
    Node(NodeId),
}

#[derive(Debug, Clone)]
enum Value {
    Str(String),
    Num(f64),
    Bool(bool),
    Nodes(Vec<NodeId>),
    Absent,
}

struct Context {
    cursor: Cursor,
    position: usize,
    size: usize,
}

pub(crate) struct Evaluator<'a> {
    snapshot: &'a UiSnapshot,
    root: NodeId,
}

impl<'a> Evaluator<'a> {
    pub(crate) fn new(snapshot: &'a UiSnapshot, root: NodeId) -> Self {
        Self { snapshot, root }
    }

    /// Evaluate a top-level path. Relative paths start at the evaluation root
    /// when it is a scope, and at the document otherwise.
    pub(crate) fn select(&self, path: &Path, scoped: bool) -> Vec<NodeId> {
        let start = if path.absolute || !scoped {
            Cursor::Document
        } else {
            Cursor::Node(self.root)
        };
        nodes_only(self.walk(path, start))
    }

    fn walk(&self, path: &Path, start: Cursor) -> Vec<Cursor> {
        let mut current = vec![if path.absolute { Cursor::Document } else { start }];
        for step in &path.steps {
            current = self.apply_step(step, &current);
            if current.is_empty() {
                break;
            }
        }
        current
    }

    /// Candidates are collected across all context cursors, then each
    /// predicate filters the whole ordered set.
    fn apply_step(&self, step: &Step, context: &[Cursor]) -> Vec<Cursor> {
        let mut candidates: Vec<Cursor> = context
            .iter()
            .flat_map(|cursor| self.axis(step.axis, *cursor))
            .filter(|cursor| self.node_test(&step.test, *cursor))
            .collect();
        candidates.sort();
        candidates.dedup();

        for predicate in &step.predicates {
            let size = candidates.len();
            candidates = candidates
                .into_iter()
                .enumerate()
                .filter(|(idx, cursor)| {
                    let ctx = Context {
                        cursor: *cursor,
                        position: idx + 1,
                        size,
                    };
                    self.predicate(predicate, &ctx)
                })
                .map(|(_, cursor)| cursor)
                .collect();
        }
        candidates
    }

    fn axis(&self, axis: Axis, cursor: Cursor) -> Vec<Cursor> {
        match (axis, cursor) {
            (Axis::SelfNode, _) => vec![cursor],
            (Axis::Child, Cursor::Document) => vec![Cursor::Node(self.root)],
            (Axis::Child, Cursor::Node(id)) => self
                .snapshot
                .children(id)
                .iter()
                .map(|child| Cursor::Node(*child))
                .collect(),
            (Axis::Descendant, Cursor::Document) => {
                self.snapshot.subtree(self.root).map(Cursor::Node).collect()
            }
            (Axis::Descendant, Cursor::Node(id)) => {
                self.snapshot.descendants(id).map(Cursor::Node).collect()
            }
            (Axis::Parent, Cursor::Document) => Vec::new(),
            (Axis::Parent, Cursor::Node(id)) if id == self.root => vec![Cursor::Document],
            (Axis::Parent, Cursor::Node(id)) => self
                .snapshot
                .parent(id)
                .map(Cursor::Node)
                .into_iter()
                .collect(),
        }
    }

    fn node_test(&self, test: &NodeTest, cursor: Cursor) -> bool {
        match (test, cursor) {
            (NodeTest::Any, _) => true,
            (NodeTest::Name(_), Cursor::Document) => false,
            (NodeTest::Name(name), Cursor::Node(id)) => {
                let node = self.snapshot.get(id);
                node.tag == *name || node.class_name == *name
            }
        }
    }

    fn predicate(&self, expr: &Expr, ctx: &Context) -> bool {
        match self.eval(expr, ctx) {
            Value::Num(n) => n == ctx.position as f64,
            other => truthy(&other),
        }
    }

    fn eval(&self, expr: &Expr, ctx: &Context) -> Value {
        match expr {
            Expr::Str(value) => Value::Str(value.clone()),
            Expr::Num(value) => Value::Num(*value),
            Expr::Attr(name) => match ctx.cursor {
                Cursor::Node(id) => attribute(self.snapshot.get(id), name)
                    .map(Value::Str)
                    .unwrap_or(Value::Absent),
                Cursor::Document => Value::Absent,
            },
            Expr::Path(path) => Value::Nodes(nodes_only(self.walk(path, ctx.cursor))),
            Expr::Neg(inner) => Value::Num(-self.number(&self.eval(inner, ctx))),
            Expr::Call(func, args) => self.call(func, args, ctx),
            Expr::Binary(Op::And, left, right) => Value::Bool(
                truthy(&self.eval(left, ctx)) && truthy(&self.eval(right, ctx)),
            ),
            Expr::Binary(Op::Or, left, right) => Value::Bool(
                truthy(&self.eval(left, ctx)) || truthy(&self.eval(right, ctx)),
            ),
            Expr::Binary(Op::Add, left, right) => Value::Num(
                self.number(&self.eval(left, ctx)) + self.number(&self.eval(right, ctx)),
            ),
            Expr::Binary(Op::Sub, left, right) => Value::Num(
                self.number(&self.eval(left, ctx)) - self.number(&self.eval(right, ctx)),
            ),
            Expr::Binary(op, left, right) => {
                let left = self.eval(left, ctx);
                let right = self.eval(right, ctx);
                Value::Bool(self.compare(*op, &left, &right))
            }
        }
    }

    fn call(&self, func: &Func, args: &[Expr], ctx: &Context) -> Value {
        let text_args = |this: &Self| -> (Option<String>, String) {
            let first = this.eval(&args[0], ctx);
            let second = this.string(&this.eval(&args[1], ctx));
            let first = match first {
                Value::Absent => None,
                other => Some(this.string(&other)),
            };
            (first, second)
        };
        match func {
            Func::Text => match ctx.cursor {
                Cursor::Node(id) => Value::Str(self.snapshot.get(id).logical_text().to_string()),
                Cursor::Document => Value::Absent,
            },
            Func::Position => Value::Num(ctx.position as f64),
            Func::Last => Value::Num(ctx.size as f64),
            Func::Contains => match text_args(self) {
                (Some(haystack), needle) => Value::Bool(haystack.contains(&needle)),
                (None, _) => Value::Bool(false),
            },
            Func::StartsWith => match text_args(self) {
                (Some(haystack), needle) => Value::Bool(haystack.starts_with(&needle)),
                (None, _) => Value::Bool(false),
            },
            Func::EndsWith => match text_args(self) {
                (Some(haystack), needle) => Value::Bool(haystack.ends_with(&needle)),
                (None, _) => Value::Bool(false),
            },
            Func::Not => Value::Bool(!truthy(&self.eval(&args[0], ctx))),
            Func::True => Value::Bool(true),
            Func::False => Value::Bool(false),
        }
    }

    fn compare(&self, op: Op, left: &Value, right: &Value) -> bool {
        match (left, right) {
            (Value::Absent, _) | (_, Value::Absent) => false,
            (Value::Nodes(nodes), other) => nodes.iter().any(|id| {
                let text = Value::Str(self.snapshot.get(*id).logical_text().to_string());
                self.compare(op, &text, other)
            }),
            (other, Value::Nodes(nodes)) => nodes.iter().any(|id| {
                let text = Value::Str(self.snapshot.get(*id).logical_text().to_string());
                self.compare(op, other, &text)
            }),
            (Value::Bool(_), _) | (_, Value::Bool(_)) if matches!(op, Op::Eq | Op::Ne) => {
                let equal = truthy(left) == truthy(right);
                (op == Op::Eq) == equal
            }
            (Value::Num(_), _) | (_, Value::Num(_)) if matches!(op, Op::Eq | Op::Ne) => {
                let equal = self.number(left) == self.number(right);
                (op == Op::Eq) == equal
            }
            _ => match op {
                Op::Eq => self.string(left) == self.string(right),
                Op::Ne => self.string(left) != self.string(right),
                Op::Lt => self.number(left) < self.number(right),
                Op::Gt => self.number(left) > self.number(right),
                Op::Le => self.number(left) <= self.number(right),
                Op::Ge => self.number(left) >= self.number(right),
                _ => false,
            },
        }
    }

    fn string(&self, value: &Value) -> String {
        match value {
            Value::Str(s) => s.clone(),
            Value::Num(n) if n.fract() == 0.0 && n.is_finite() => format!("{}", *n as i64),
            Value::Num(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Nodes(nodes) => nodes
                .first()
                .map(|id| self.snapshot.get(*id).logical_text().to_string())
                .unwrap_or_default(),
            Value::Absent => String::new(),
        }
    }

    fn number(&self, value: &Value) -> f64 {
        match value {
            Value::Num(n) => *n,
            Value::Bool(true) => 1.0,
            Value::Bool(false) => 0.0,
            Value::Absent => f64::NAN,
            other => self.string(other).trim().parse().unwrap_or(f64::NAN),
        }
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Str(s) => !s.is_empty(),
        Value::Num(n) => *n != 0.0 && !n.is_nan(),
        Value::Bool(b) => *b,
        Value::Nodes(nodes) => !nodes.is_empty(),
        Value::Absent => false,
    }
}

fn nodes_only(cursors: Vec<Cursor>) -> Vec<NodeId> {
    cursors
        .into_iter()
        .filter_map(|cursor| match cursor {
            Cursor::Node(id) => Some(id),
            Cursor::Document => None,
        })
        .collect()
}

/// Attribute lookup by uiautomator attribute name. Unknown names are absent.
fn attribute(node: &Node, name: &str) -> Option<String> {
    let value = match name.to_ascii_lowercase().as_str() {
        "text" | "value" => node.logical_text().to_string(),
        "name" | "content-desc" => node.content_desc.clone(),
        "resource-id" | "id" => node.resource_id.clone(),
        "class" | "classname" => node.class_name.clone(),
        "tag" => node.tag.clone(),
        "package" => node.package.clone(),
        "bounds" => node.bounds.to_string(),
        "scrollable" => node.scrollable.to_string(),
        "password" => node.password.to_string(),
        "index" => node.index.to_string(),
        _ => return None,
    };
    Some(value)
}
