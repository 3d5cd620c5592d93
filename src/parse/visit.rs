use crate::parse::ast;

pub trait AstVisitor {
    type Output;

    fn visit(&mut self, node: &ast::Node) -> Self::Output {
        node.accept(self)
    }

    fn visit_expression(&mut self, node: &ast::Expression) -> Self::Output;

    fn visit_annotated(&mut self, node: &ast::AnnotatedNumber) -> Self::Output;

    fn visit_literal(&mut self, node: &ast::Literal) -> Self::Output;

    fn visit_parenthetical(&mut self, node: &ast::Parenthetical) -> Self::Output;

    fn visit_unop(&mut self, node: &ast::UnOp) -> Self::Output;

    fn visit_binop(&mut self, node: &ast::BinOp) -> Self::Output;

    fn visit_operated_set(&mut self, node: &ast::OperatedSet) -> Self::Output;

    fn visit_number_set(&mut self, node: &ast::NumberSet) -> Self::Output;

    fn visit_operated_dice(&mut self, node: &ast::OperatedSet) -> Self::Output {
        self.visit_operated_set(node)
    }

    fn visit_dice(&mut self, node: &ast::Dice) -> Self::Output;
}

pub trait Accept<V: AstVisitor + ?Sized> {
    fn accept(&self, v: &mut V) -> V::Output;
}

impl<V: AstVisitor + ?Sized> Accept<V> for ast::Node {
    fn accept(&self, v: &mut V) -> V::Output {
        match self {
            Self::Expression(x) => v.visit_expression(x),
            Self::Annotated(x) => v.visit_annotated(x),
            Self::Literal(x) => v.visit_literal(x),
            Self::Parenthetical(x) => v.visit_parenthetical(x),
            Self::UnOp(x) => v.visit_unop(x),
            Self::BinOp(x) => v.visit_binop(x),
            Self::OperatedSet(x) => v.visit_operated_set(x),
            Self::NumberSet(x) => v.visit_number_set(x),
            Self::OperatedDice(x) => v.visit_operated_dice(x),
            Self::Dice(x) => v.visit_dice(x),
        }
    }
}
