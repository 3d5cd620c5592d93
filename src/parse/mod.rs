pub mod ast;
mod lexer;
mod parser;
mod visit;

pub use parser::ParseError;
pub use visit::{Accept, AstVisitor};

use lexer::TokenKind;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum StartRule {
    Expression,
    CommentedExpression,
}

#[derive(Debug, Clone)]
pub struct DiceParser {
    comment_ambiguities: &'static [TokenKind],
}

impl DiceParser {
    pub fn new() -> Self {
        Self {
            comment_ambiguities: TokenKind::COMMENT_AMBIGUITIES,
        }
    }

    pub fn parse(&self, expr: &str, allow_comments: bool) -> Result<ast::Node, ParseError> {
        let rule = if allow_comments {
            StartRule::CommentedExpression
        } else {
            StartRule::Expression
        };
        self.parse_rule(expr, rule)
    }

    pub fn parse_rule(&self, expr: &str, rule: StartRule) -> Result<ast::Node, ParseError> {
        let expr = match rule {
            StartRule::Expression => parser::Parser::new(expr).parse_expression()?,
            StartRule::CommentedExpression => {
                parser::parse_commented(expr, self.comment_ambiguities)?
            }
        };
        Ok(ast::Node::Expression(expr))
    }
}

impl Default for DiceParser {
    fn default() -> Self {
        Self::new()
    }
}
