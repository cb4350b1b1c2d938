//! Operator enums shared by the parser and the interpreter.

use std::fmt;

/// Arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Exp,
}

/// Bitwise operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitOp {
    And,
    Or,
    Xor,
    Shl,
    Shr,
    UShr,
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompOp {
    Equal,
    NotEqual,
    StrictEqual,
    StrictNotEqual,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    In,
    InstanceOf,
}

/// Short-circuiting operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOp {
    And,
    Or,
    Coalesce,
}

/// Any binary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Num(NumOp),
    Bit(BitOp),
    Comp(CompOp),
    Log(LogOp),
}

/// Unary operators, including the four increment/decrement forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Minus,
    Plus,
    Not,
    Tilde,
    TypeOf,
    Delete,
    Void,
    IncrementPre,
    IncrementPost,
    DecrementPre,
    DecrementPost,
}

/// Compound assignment operators (`+=` and friends).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Exp,
    And,
    Or,
    Xor,
    Shl,
    Shr,
    UShr,
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Self::Num(NumOp::Add) => "+",
            Self::Num(NumOp::Sub) => "-",
            Self::Num(NumOp::Mul) => "*",
            Self::Num(NumOp::Div) => "/",
            Self::Num(NumOp::Mod) => "%",
            Self::Num(NumOp::Exp) => "**",
            Self::Bit(BitOp::And) => "&",
            Self::Bit(BitOp::Or) => "|",
            Self::Bit(BitOp::Xor) => "^",
            Self::Bit(BitOp::Shl) => "<<",
            Self::Bit(BitOp::Shr) => ">>",
            Self::Bit(BitOp::UShr) => ">>>",
            Self::Comp(CompOp::Equal) => "==",
            Self::Comp(CompOp::NotEqual) => "!=",
            Self::Comp(CompOp::StrictEqual) => "===",
            Self::Comp(CompOp::StrictNotEqual) => "!==",
            Self::Comp(CompOp::GreaterThan) => ">",
            Self::Comp(CompOp::GreaterThanOrEqual) => ">=",
            Self::Comp(CompOp::LessThan) => "<",
            Self::Comp(CompOp::LessThanOrEqual) => "<=",
            Self::Comp(CompOp::In) => "in",
            Self::Comp(CompOp::InstanceOf) => "instanceof",
            Self::Log(LogOp::And) => "&&",
            Self::Log(LogOp::Or) => "||",
            Self::Log(LogOp::Coalesce) => "??",
        };
        f.write_str(symbol)
    }
}
