//! Operator precedence classification.
//!
//! One fixed table, keyed by the produced expression kind, consulted when
//! warning about ambiguous mixed-operator parenthesisation. Equality and
//! relational operators share a single level.

use dray_ir::ast::{BinOp, ExprKind};

/// Precedence levels, lowest binding first.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug)]
pub enum Prec {
    /// Comma expression.
    Expr,
    Assign,
    Cond,
    OrOr,
    AndAnd,
    Or,
    Xor,
    And,
    /// Equality, identity, `in`, and relational operators together.
    Compare,
    Shift,
    Add,
    Mul,
    Pow,
    Unary,
    Primary,
}

/// Precedence of the operator that produced an expression node.
pub fn of_expr(kind: &ExprKind) -> Prec {
    match kind {
        ExprKind::Comma { .. } => Prec::Expr,
        ExprKind::Assign { .. } => Prec::Assign,
        ExprKind::Cond { .. } => Prec::Cond,
        ExprKind::Binary { op, .. } => of_binop(*op),
        ExprKind::Unary { .. } | ExprKind::Cast { .. } => Prec::Unary,
        _ => Prec::Primary,
    }
}

fn of_binop(op: BinOp) -> Prec {
    match op {
        BinOp::OrOr => Prec::OrOr,
        BinOp::AndAnd => Prec::AndAnd,
        BinOp::Or => Prec::Or,
        BinOp::Xor => Prec::Xor,
        BinOp::And => Prec::And,
        BinOp::Equal
        | BinOp::NotEqual
        | BinOp::Identity
        | BinOp::NotIdentity
        | BinOp::In
        | BinOp::NotIn
        | BinOp::Less
        | BinOp::LessEqual
        | BinOp::Greater
        | BinOp::GreaterEqual => Prec::Compare,
        BinOp::Shl | BinOp::Shr | BinOp::Ushr => Prec::Shift,
        BinOp::Add | BinOp::Sub | BinOp::Concat => Prec::Add,
        BinOp::Mul | BinOp::Div | BinOp::Mod => Prec::Mul,
        BinOp::Pow => Prec::Pow,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_and_relational_share_a_level() {
        assert_eq!(of_binop(BinOp::Equal), of_binop(BinOp::Less));
        assert_eq!(of_binop(BinOp::Identity), of_binop(BinOp::GreaterEqual));
    }

    #[test]
    fn ladder_is_ordered() {
        assert!(Prec::Expr < Prec::Assign);
        assert!(Prec::And < Prec::Compare);
        assert!(Prec::Compare < Prec::Shift);
        assert!(Prec::Mul < Prec::Pow);
        assert!(Prec::Pow < Prec::Unary);
    }
}
