//! # Abstract Syntax Tree
//!
//! A discriminated union of statement and expression nodes produced by the
//! parser and consumed by the compiler. Every node owns its children
//! exclusively via `Box` — dropping a `Program` recursively drops the whole
//! tree once, with no shared ownership and no arena.
//!
//! Every node carries the literal text of the token that introduced it
//! (`token_literal`), which is enough to reproduce its textual form without
//! tracking source spans.

/// An entire parsed program: an ordered sequence of top-level statements.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Let {
        name: Identifier,
        value: Expr,
    },
    Return {
        value: Option<Expr>,
    },
    ExprStmt {
        expr: Expr,
    },
    Block {
        statements: Vec<Stmt>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Ident(String),
    IntLit(i64),
    BoolLit(bool),
    StringLit(String),
    ArrayLit(Vec<Expr>),
    HashLit(Vec<(Expr, Expr)>),
    Prefix {
        operator: String,
        right: Box<Expr>,
    },
    Infix {
        operator: String,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    If {
        condition: Box<Expr>,
        consequence: Box<Stmt>,
        alternative: Option<Box<Stmt>>,
    },
    FunctionLit {
        params: Vec<Identifier>,
        body: Box<Stmt>,
    },
    Call {
        function: Box<Expr>,
        args: Vec<Expr>,
    },
    Index {
        left: Box<Expr>,
        index: Box<Expr>,
    },
}

impl std::fmt::Display for Expr {
    /// Pretty-print an expression back to source-like text.
    ///
    /// Used both for error messages (`no prefix parse function for token Z`'s
    /// surrounding context) and by the compiler to obtain the canonical
    /// string form used to sort hash literal keys before emission.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expr::Ident(name) => write!(f, "{name}"),
            Expr::IntLit(v) => write!(f, "{v}"),
            Expr::BoolLit(v) => write!(f, "{v}"),
            Expr::StringLit(s) => write!(f, "{s}"),
            Expr::ArrayLit(elements) => {
                let parts: Vec<String> = elements.iter().map(|e| e.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            Expr::HashLit(pairs) => {
                let parts: Vec<String> =
                    pairs.iter().map(|(k, v)| format!("{k}:{v}")).collect();
                write!(f, "{{{}}}", parts.join(", "))
            }
            Expr::Prefix { operator, right } => write!(f, "({operator}{right})"),
            Expr::Infix {
                operator,
                left,
                right,
            } => write!(f, "({left} {operator} {right})"),
            Expr::If {
                condition,
                consequence,
                alternative,
            } => {
                write!(f, "if ({condition}) {consequence}")?;
                if let Some(alt) = alternative {
                    write!(f, "else {alt}")?;
                }
                Ok(())
            }
            Expr::FunctionLit { params, body } => {
                let parts: Vec<String> = params.iter().map(|p| p.name.clone()).collect();
                write!(f, "fn({}) {body}", parts.join(", "))
            }
            Expr::Call { function, args } => {
                let parts: Vec<String> = args.iter().map(|a| a.to_string()).collect();
                write!(f, "{function}({})", parts.join(", "))
            }
            Expr::Index { left, index } => write!(f, "({left}[{index}])"),
        }
    }
}

impl std::fmt::Display for Stmt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stmt::Let { name, value } => write!(f, "let {} = {};", name.name, value),
            Stmt::Return { value } => match value {
                Some(v) => write!(f, "return {v};"),
                None => write!(f, "return;"),
            },
            Stmt::ExprStmt { expr } => write!(f, "{expr}"),
            Stmt::Block { statements } => {
                write!(f, "{{ ")?;
                for stmt in statements {
                    write!(f, "{stmt} ")?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl std::fmt::Display for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for stmt in &self.statements {
            write!(f, "{stmt}")?;
        }
        Ok(())
    }
}
