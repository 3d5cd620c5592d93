use crate::common::*;
use crate::dice::AdvType;
use crate::parse::ast;
use crate::roll::{Eval, Literal, Number, RResult};
use std::rc::Rc;

pub trait TreeNode: Sized {
    fn children(&self) -> Vec<&Self>;

    fn children_mut(&mut self) -> Vec<&mut Self>;

    /// Returns the child at `index`; negative indices count from the right.
    fn child(&self, index: isize) -> Result<&Self, ChildIndexError> {
        let children = self.children();
        let index = ChildIndexError::resolve(index, children.len())?;
        Ok(children[index])
    }

    fn set_child(&mut self, index: isize, value: Self) -> Result<(), ChildIndexError> {
        let mut children = self.children_mut();
        let index = ChildIndexError::resolve(index, children.len())?;
        *children[index] = value;
        Ok(())
    }

    fn left(&self) -> Option<&Self> {
        self.children().first().copied()
    }

    fn right(&self) -> Option<&Self> {
        self.children().last().copied()
    }
}

#[derive(thiserror::Error, Debug, Copy, Clone, Eq, PartialEq)]
#[error("child index {index} is out of range for a node with {len} children")]
pub struct ChildIndexError {
    pub index: isize,
    pub len: usize,
}

impl ChildIndexError {
    pub fn resolve(index: isize, len: usize) -> Result<usize, Self> {
        let resolved = if index < 0 {
            len.checked_sub(index.unsigned_abs())
        } else {
            usize::try_from(index).ok()
        };
        resolved
            .filter(|&i| i < len)
            .ok_or(Self { index, len })
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AnnotationInherit {
    Left,
    Right,
}

pub fn ast_adv_copy(node: &ast::Node, adv: AdvType) -> ast::Node {
    let mut root = node.clone();
    let sel = match adv {
        AdvType::None => return root,
        AdvType::Advantage => SetSelector::new(SetSelectorKind::Highest, 1),
        AdvType::Disadvantage => SetSelector::new(SetSelectorKind::Lowest, 1),
    };
    let op = SetOperator::new(SetOperatorKind::Keep, sel);
    if let Some(replacement) = add_advantage(&mut root, op) {
        root = replacement;
    }
    root
}

fn is_single_d20(node: &ast::Node) -> bool {
    matches!(node, ast::Node::Dice(d) if d.num == 1 && d.size == DiceSize::Int(20))
}

fn add_advantage(node: &mut ast::Node, op: SetOperator) -> Option<ast::Node> {
    let two_d20 = || ast::Node::dice(2, DiceSize::Int(20));
    match node {
        ast::Node::Dice(_) if is_single_d20(node) => Some(ast::Node::operated(two_d20(), vec![op])),
        ast::Node::OperatedDice(set) => {
            if is_single_d20(&set.value) {
                set.value = Rc::new(two_d20());
                set.operations.insert(0, op);
            }
            None
        }
        _ => {
            let child = node.children_mut().into_iter().next()?;
            if let Some(replacement) = add_advantage(child, op) {
                *child = replacement;
            }
            None
        }
    }
}

pub fn simplify_expr_annotations(expr: &mut Number, inherit: Option<AnnotationInherit>) {
    let root = match expr {
        Number::Expression(x) => &mut *x.roll,
        other => other,
    };
    collect_annotations(root, inherit);
}

fn annotation_of(node: &Number) -> Option<&str> {
    node.annotation().filter(|a| !a.is_empty())
}

fn collect_annotations(node: &mut Number, inherit: Option<AnnotationInherit>) -> Vec<String> {
    let no_right_inherit = matches!(node, Number::BinOp(x) if x.op.is_multiplicative());

    let mut possible: Vec<String> = Vec::new();
    let mut child_annotated = Vec::new();
    for child in node.children_mut() {
        let found = collect_annotations(child, inherit);
        child_annotated.push(!found.is_empty());
        for annotation in found {
            if !possible.contains(&annotation) {
                possible.push(annotation);
            }
        }
    }
    if let Some(own) = annotation_of(node) {
        if !possible.iter().any(|a| a == own) {
            possible.push(own.to_string());
        }
    }

    if let [only] = possible.as_slice() {
        node.set_annotation(Some(only.clone()));
        for child in node.children_mut() {
            child.set_annotation(None);
        }
    } else if let (Some(inherit), [first, .., last]) = (inherit, possible.as_slice()) {
        let inherited = match inherit {
            AnnotationInherit::Left => first,
            AnnotationInherit::Right => last,
        };
        for (i, child) in node.children_mut().into_iter().enumerate() {
            if child_annotated[i] || (no_right_inherit && i > 0) {
                continue;
            }
            child.set_annotation(Some(inherited.clone()));
        }
    }
    possible
}

pub fn simplify_expr(expr: &mut Number, inherit: Option<AnnotationInherit>) -> RResult<()> {
    simplify_expr_annotations(expr, inherit);
    let root = match expr {
        Number::Expression(x) => &mut *x.roll,
        other => other,
    };
    collapse_annotated(root, true)?;
    Ok(())
}

fn collapse_annotated(node: &mut Number, first: bool) -> RResult<bool> {
    if let Some(annotation) = annotation_of(node) {
        let mut literal = Literal::new(node.total()?);
        literal.set_annotation(Some(annotation.to_string()));
        *node = literal.into();
        return Ok(true);
    }

    let had_replacement = node
        .children_mut()
        .into_iter()
        .map(|child| collapse_annotated(child, false))
        .collect::<RResult<Vec<_>>>()?;

    if had_replacement.contains(&true) {
        for (child, replaced) in node.children_mut().into_iter().zip(had_replacement) {
            if !replaced {
                *child = Literal::new(child.total()?).into();
            }
        }
        Ok(true)
    } else if first {
        *node = Literal::new(node.total()?).into();
        Ok(true)
    } else {
        Ok(false)
    }
}

pub fn tree_map<T, F>(mut func: F, node: &T) -> T
where
    T: TreeNode + Clone,
    F: FnMut(T) -> T,
{
    map_node(&mut func, node)
}

fn map_node<T, F>(func: &mut F, node: &T) -> T
where
    T: TreeNode + Clone,
    F: FnMut(T) -> T,
{
    let mut copied = node.clone();
    for child in copied.children_mut() {
        *child = map_node(func, child);
    }
    func(copied)
}

pub fn leftmost<T: TreeNode>(root: &T) -> &T {
    let mut node = root;
    while let Some(child) = node.left() {
        node = child;
    }
    node
}

pub fn rightmost<T: TreeNode>(root: &T) -> &T {
    let mut node = root;
    while let Some(child) = node.right() {
        node = child;
    }
    node
}

pub fn dfs<T, F>(node: &T, mut predicate: F) -> Option<&T>
where
    T: TreeNode,
    F: FnMut(&T) -> bool,
{
    find_node(node, &mut predicate)
}

fn find_node<'a, T, F>(node: &'a T, predicate: &mut F) -> Option<&'a T>
where
    T: TreeNode,
    F: FnMut(&T) -> bool,
{
    if predicate(node) {
        return Some(node);
    }
    node.children()
        .into_iter()
        .find_map(|child| find_node(child, predicate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::DiceParser;
    use crate::roll::{RollContext, StepRoller, DEFAULT_MAX_ROLLS};
    use crate::stringifiers::{SimpleStringifier, Stringify};
    use rstest::rstest;

    fn parse(s: &str) -> ast::Node {
        DiceParser::new().parse(s, false).unwrap()
    }

    fn eval(s: &str) -> Number {
        RollContext::new_bounded(DEFAULT_MAX_ROLLS, StepRoller::new(10, 1))
            .eval(&parse(s))
            .unwrap()
    }

    fn render(node: &Number) -> String {
        SimpleStringifier.stringify(node).unwrap()
    }

    #[test]
    fn test_child_index() {
        assert_eq!(Ok(0), ChildIndexError::resolve(0, 2));
        assert_eq!(Ok(1), ChildIndexError::resolve(-1, 2));
        assert_eq!(Ok(0), ChildIndexError::resolve(-2, 2));
        assert!(ChildIndexError::resolve(2, 2).is_err());
        assert!(ChildIndexError::resolve(-3, 2).is_err());
        assert!(ChildIndexError::resolve(0, 0).is_err());
    }

    #[test]
    fn test_ast_child() {
        let node = parse("1d20 + 2 * 3");
        let sum = node.child(0).unwrap();
        assert_eq!(Ok(&ast::Node::dice(1, DiceSize::Int(20))), sum.child(0));
        assert_eq!(Ok(&ast::Node::literal(3)), sum.child(-1).and_then(|n| n.child(-1)));
        assert_eq!(Err(ChildIndexError { index: -2, len: 1 }), node.child(-2));
        assert!(ast::Node::literal(1).child(0).is_err());
    }

    #[test]
    fn test_number_set_child() {
        let mut node = eval("1 + 2");
        let Number::Expression(expr) = &mut node else {
            panic!("expected an expression")
        };
        expr.roll.set_child(-1, Literal::new(5).into()).unwrap();
        assert_eq!("1 + 5 = 6", render(&node));
        assert!(node.set_child(1, Literal::new(5).into()).is_err());
    }

    #[rstest]
    #[case("1d20", AdvType::Advantage, "2d20kh1")]
    #[case("1d20", AdvType::Disadvantage, "2d20kl1")]
    #[case("1d20 + 5", AdvType::Advantage, "2d20kh1 + 5")]
    #[case("1d20rr1 + 5", AdvType::Disadvantage, "2d20kl1rr1 + 5")]
    #[case("1d20kh1", AdvType::Advantage, "2d20kh1kh1")]
    #[case("(1d20 + 1) [x] * 2", AdvType::Advantage, "(2d20kh1 + 1) [x] * 2")]
    #[case("1d20 + 5", AdvType::None, "1d20 + 5")]
    #[case("2d20 + 1d20", AdvType::Advantage, "2d20 + 1d20")]
    #[case("5 + 1d20", AdvType::Advantage, "5 + 1d20")]
    #[case("d%", AdvType::Advantage, "1d%")]
    fn test_ast_adv_copy(#[case] input: &str, #[case] adv: AdvType, #[case] expected: &str) {
        let original = parse(input);
        let before = original.to_string();
        let copied = ast_adv_copy(&original, adv);
        assert_eq!(expected, copied.to_string());
        assert_eq!(before, original.to_string());
        assert_eq!(expected, parse(&copied.to_string()).to_string());
    }

    #[rstest]
    #[case("1 [a] + 2 + 3 [b] + 4", None, "1 + 2 [a] + 3 [b] + 4 = 10")]
    #[case(
        "1 [a] + 2 + 3 [b] + 4",
        Some(AnnotationInherit::Left),
        "1 + 2 [a] + 3 [b] + 4 [a] = 10"
    )]
    #[case(
        "1 [a] + 2 + 3 [b] + 4",
        Some(AnnotationInherit::Right),
        "1 + 2 [a] + 3 [b] + 4 [b] = 10"
    )]
    #[case("1 [a] + 2 [a]", None, "1 + 2 [a] = 3")]
    #[case(
        "(1 [a] + 2 [b]) * 3",
        Some(AnnotationInherit::Left),
        "(1 [a] + 2 [b]) * 3 = 9"
    )]
    #[case(
        "(1 [a] + 2 [b]) + 3",
        Some(AnnotationInherit::Left),
        "(1 [a] + 2 [b]) + 3 [a] = 6"
    )]
    fn test_simplify_expr_annotations(
        #[case] input: &str,
        #[case] inherit: Option<AnnotationInherit>,
        #[case] expected: &str,
    ) {
        let mut node = eval(input);
        simplify_expr_annotations(&mut node, inherit);
        assert_eq!(expected, render(&node));
    }

    #[rstest]
    #[case("1 [a] + 2 + 3 [b] + 4", "3 [a] + 3 [b] + 4 = 10")]
    #[case("1 [a] + 2 [a] + 3", "6 [a] = 6")]
    #[case("1 + 2 + 3 + 4", "10 = 10")]
    #[case("1d20 [fire] + 1d6 [cold] + 2", "10 [fire] + 5 [cold] + 2 = 17")]
    fn test_simplify_expr(#[case] input: &str, #[case] expected: &str) {
        let mut node = eval(input);
        simplify_expr(&mut node, None).unwrap();
        assert_eq!(expected, render(&node));
    }

    #[test]
    fn test_tree_map_number() {
        let original = eval("2d20 + 8d6 + 3");
        let mapped = tree_map(
            |node: Number| match node {
                Number::Dice(dice) => match dice.total() {
                    Ok(total) => Literal::new(total).into(),
                    Err(_) => dice.into(),
                },
                other => other,
            },
            &original,
        );
        assert_eq!("21 + 28 + 3 = 52", render(&mapped));
        assert_eq!(
            "2d20 (10, 11) + 8d6 (6, 1, 2, 3, 4, 5, 6, 1) + 3 = 52",
            render(&original)
        );
    }

    #[test]
    fn test_tree_map_ast() {
        let original = parse("(2d6, 2d6)kh1");
        let mapped = tree_map(
            |node: ast::Node| match node {
                ast::Node::Dice(d) => ast::Node::dice(d.num, DiceSize::Int(8)),
                other => other,
            },
            &original,
        );
        assert_eq!("(2d8, 2d8)kh1", mapped.to_string());
        assert_eq!("(2d6, 2d6)kh1", original.to_string());
    }

    #[test]
    fn test_leftmost_rightmost() {
        let node = parse("1d20 + 2 * 3");
        assert_eq!(&ast::Node::dice(1, DiceSize::Int(20)), leftmost(&node));
        assert_eq!(&ast::Node::literal(3), rightmost(&node));

        let leaf = ast::Node::literal(1);
        assert_eq!(&leaf, leftmost(&leaf));
    }

    #[test]
    fn test_dfs() {
        let node = parse("1 + (2, 3d6, 4d6)");
        let found = dfs(&node, |n| matches!(n, ast::Node::Dice(_)));
        assert_eq!(Some(&ast::Node::dice(3, DiceSize::Int(6))), found);

        let found = dfs(&node, |n| matches!(n, ast::Node::Expression(_)));
        assert_eq!(Some(&node), found);

        assert_eq!(None, dfs(&node, |n| matches!(n, ast::Node::UnOp(_))));
    }
}
