use crate::common::*;
use crate::utils::{ChildIndexError, TreeNode};
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Expression(Expression),
    Annotated(AnnotatedNumber),
    Literal(Literal),
    Parenthetical(Parenthetical),
    UnOp(UnOp),
    BinOp(BinOp),
    OperatedSet(OperatedSet),
    NumberSet(NumberSet),
    OperatedDice(OperatedSet),
    Dice(Dice),
}

impl Node {
    pub fn expression(roll: Node, comment: Option<String>) -> Self {
        Self::Expression(Expression::new(roll, comment))
    }

    pub fn annotated(value: Node, annotations: Vec<String>) -> Self {
        Self::Annotated(AnnotatedNumber {
            value: Rc::new(value),
            annotations,
        })
    }

    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Literal(Literal {
            value: value.into(),
        })
    }

    pub fn parenthetical(value: Node) -> Self {
        Self::Parenthetical(Parenthetical {
            value: Rc::new(value),
        })
    }

    pub fn unop(op: UnaryOperator, value: Node) -> Self {
        Self::UnOp(UnOp {
            op,
            value: Rc::new(value),
        })
    }

    pub fn binop(left: Node, op: BinaryOperator, right: Node) -> Self {
        Self::BinOp(BinOp {
            op,
            left: Rc::new(left),
            right: Rc::new(right),
        })
    }

    pub fn set(values: Vec<Node>) -> Self {
        Self::NumberSet(NumberSet {
            values: values.into_iter().map(Rc::new).collect(),
        })
    }

    pub fn dice(num: UInt, size: DiceSize) -> Self {
        Self::Dice(Dice { num, size })
    }

    pub fn operated(value: Node, operations: Vec<SetOperator>) -> Self {
        let is_dice = matches!(value, Self::Dice(_));
        let set = OperatedSet::new(Rc::new(value), operations);
        if is_dice {
            Self::OperatedDice(set)
        } else {
            Self::OperatedSet(set)
        }
    }

    fn child_slots_mut(&mut self) -> Vec<&mut Rc<Node>> {
        match self {
            Self::Expression(x) => vec![&mut x.roll],
            Self::Annotated(x) => vec![&mut x.value],
            Self::Parenthetical(x) => vec![&mut x.value],
            Self::UnOp(x) => vec![&mut x.value],
            Self::BinOp(x) => vec![&mut x.left, &mut x.right],
            Self::OperatedSet(x) | Self::OperatedDice(x) => vec![&mut x.value],
            Self::NumberSet(x) => x.values.iter_mut().collect(),
            Self::Literal(_) | Self::Dice(_) => vec![],
        }
    }
}

impl TreeNode for Node {
    fn children(&self) -> Vec<&Self> {
        match self {
            Self::Expression(x) => vec![&*x.roll],
            Self::Annotated(x) => vec![&*x.value],
            Self::Parenthetical(x) => vec![&*x.value],
            Self::UnOp(x) => vec![&*x.value],
            Self::BinOp(x) => vec![&*x.left, &*x.right],
            Self::OperatedSet(x) | Self::OperatedDice(x) => vec![&*x.value],
            Self::NumberSet(x) => x.values.iter().map(|v| &**v).collect(),
            Self::Literal(_) | Self::Dice(_) => vec![],
        }
    }

    fn children_mut(&mut self) -> Vec<&mut Self> {
        self.child_slots_mut()
            .into_iter()
            .map(Rc::make_mut)
            .collect()
    }

    fn set_child(&mut self, index: isize, value: Self) -> Result<(), ChildIndexError> {
        let mut slots = self.child_slots_mut();
        let index = ChildIndexError::resolve(index, slots.len())?;
        *slots[index] = Rc::new(value);
        Ok(())
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expression(x) => fmt::Display::fmt(x, f),
            Self::Annotated(x) => fmt::Display::fmt(x, f),
            Self::Literal(x) => fmt::Display::fmt(x, f),
            Self::Parenthetical(x) => fmt::Display::fmt(x, f),
            Self::UnOp(x) => fmt::Display::fmt(x, f),
            Self::BinOp(x) => fmt::Display::fmt(x, f),
            Self::OperatedSet(x) | Self::OperatedDice(x) => fmt::Display::fmt(x, f),
            Self::NumberSet(x) => fmt::Display::fmt(x, f),
            Self::Dice(x) => fmt::Display::fmt(x, f),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub roll: Rc<Node>,
    pub comment: Option<String>,
}

impl Expression {
    pub fn new(roll: Node, comment: Option<String>) -> Self {
        Self {
            roll: Rc::new(roll),
            comment,
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.comment {
            Some(comment) => write!(f, "{} {}", self.roll, comment),
            None => write!(f, "{}", self.roll),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedNumber {
    pub value: Rc<Node>,
    pub annotations: Vec<String>,
}

impl fmt::Display for AnnotatedNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.annotations.concat())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    pub value: Value,
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.value, f)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parenthetical {
    pub value: Rc<Node>,
}

impl fmt::Display for Parenthetical {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", self.value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnOp {
    pub op: UnaryOperator,
    pub value: Rc<Node>,
}

impl fmt::Display for UnOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.op, self.value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinOp {
    pub op: BinaryOperator,
    pub left: Rc<Node>,
    pub right: Rc<Node>,
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.left, self.op, self.right)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OperatedSet {
    pub value: Rc<Node>,
    pub operations: Vec<SetOperator>,
}

impl OperatedSet {
    pub fn new(value: Rc<Node>, operations: Vec<SetOperator>) -> Self {
        let mut ret = Self { value, operations };
        ret.simplify_ops();
        ret
    }

    fn simplify_ops(&mut self) {
        let mut new_ops: Vec<SetOperator> = Vec::with_capacity(self.operations.len());

        for op in self.operations.drain(..) {
            // `mi` and `ma` always start a new entry
            let mergeable = new_ops
                .last_mut()
                .filter(|last_op| last_op.op == op.op && !op.op.is_immediate());
            if let Some(last_op) = mergeable {
                last_op.add_sels(&mut op.sels.into_vec());
            } else {
                new_ops.push(op);
            }
        }

        self.operations = new_ops;
    }
}

impl fmt::Display for OperatedSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)?;
        for op in &self.operations {
            write!(f, "{}", op)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NumberSet {
    pub values: Vec<Rc<Node>>,
}

impl fmt::Display for NumberSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let out = self
            .values
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        if self.values.len() == 1 {
            write!(f, "({},)", out)
        } else {
            write!(f, "({})", out)
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Dice {
    pub num: UInt,
    pub size: DiceSize,
}

impl fmt::Display for Dice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.num, self.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use SetOperatorKind::*;
    use SetSelectorKind::*;

    fn op(kind: SetOperatorKind, cat: SetSelectorKind, num: Int) -> SetOperator {
        SetOperator::new(kind, SetSelector::new(cat, num))
    }

    #[test]
    fn test_simplify_ops() {
        let node = Node::operated(
            Node::dice(4, DiceSize::Int(6)),
            vec![
                op(Keep, Highest, 3),
                op(Keep, Lowest, 1),
                op(Reroll, EqualTo, 1),
                op(Keep, Highest, 1),
            ],
        );
        let Node::OperatedDice(set) = &node else {
            panic!("expected operated dice, got {:?}", node)
        };
        assert_eq!(3, set.operations.len());
        assert_eq!(2, set.operations[0].sels.len());
        assert_eq!("4d6kh3kl1rr1kh1", node.to_string());
    }

    #[test]
    fn test_simplify_ops_immediate() {
        let node = Node::operated(
            Node::dice(4, DiceSize::Int(6)),
            vec![op(Minimum, EqualTo, 2), op(Minimum, EqualTo, 3)],
        );
        let Node::OperatedDice(set) = &node else {
            panic!("expected operated dice, got {:?}", node)
        };
        assert_eq!(2, set.operations.len());
        assert_eq!("4d6mi2mi3", node.to_string());
    }

    #[test]
    fn test_display() {
        let single = Node::set(vec![Node::literal(1)]);
        assert_eq!("(1,)", single.to_string());
        let node = Node::binop(
            Node::annotated(
                Node::dice(1, DiceSize::Percentile),
                vec!["[a]".into(), "[b]".into()],
            ),
            BinaryOperator::Mul,
            Node::unop(UnaryOperator::Neg, Node::parenthetical(Node::literal(2.0))),
        );
        assert_eq!("1d% [a][b] * -(2.0)", node.to_string());
        let expr = Node::expression(node, Some("fire damage".into()));
        assert_eq!("1d% [a][b] * -(2.0) fire damage", expr.to_string());
    }

    #[test]
    fn test_set_child() {
        let mut node = Node::binop(Node::literal(1), BinaryOperator::Add, Node::literal(2));
        node.set_child(-1, Node::literal(5)).unwrap();
        assert_eq!("1 + 5", node.to_string());
        assert!(node.set_child(2, Node::literal(5)).is_err());
        assert!(node.set_child(-3, Node::literal(5)).is_err());
    }
}
