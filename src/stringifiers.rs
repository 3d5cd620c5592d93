use crate::common::*;
use crate::roll::*;

pub trait Stringify {
    fn stringify<N: Visit + ?Sized>(&mut self, the_roll: &N) -> crate::Result<String> {
        self.stringify_node(the_roll)
    }

    fn stringify_node<N: Visit + ?Sized>(&mut self, node: &N) -> crate::Result<String> {
        stringify_annotated(self, node)
    }

    fn str_expression(&mut self, node: &Expression) -> crate::Result<String> {
        let roll = self.stringify_node(&*node.roll)?;
        Ok(format!("{} = {}", roll, node.total()?.as_int()))
    }

    fn str_literal(&mut self, node: &Literal) -> crate::Result<String> {
        let history = node
            .values
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" -> ");
        Ok(if node.exploded {
            format!("{}!", history)
        } else {
            history
        })
    }

    fn str_unop(&mut self, node: &UnOp) -> crate::Result<String> {
        Ok(format!("{}{}", node.op, self.stringify_node(&*node.value)?))
    }

    fn str_binop(&mut self, node: &BinOp) -> crate::Result<String> {
        Ok(format!(
            "{} {} {}",
            self.stringify_node(&*node.left)?,
            node.op,
            self.stringify_node(&*node.right)?
        ))
    }

    fn str_parenthetical(&mut self, node: &Parenthetical) -> crate::Result<String> {
        Ok(format!(
            "({}){}",
            self.stringify_node(&*node.value)?,
            self.str_ops(&node.operations)?
        ))
    }

    fn str_set(&mut self, node: &Set) -> crate::Result<String> {
        let out = node
            .values
            .iter()
            .map(|v| self.stringify_node(v))
            .collect::<crate::Result<Vec<_>>>()?
            .join(", ");
        let ops = self.str_ops(&node.operations)?;
        Ok(if node.values.len() == 1 {
            format!("({},){}", out, ops)
        } else {
            format!("({}){}", out, ops)
        })
    }

    fn str_dice(&mut self, node: &Dice) -> crate::Result<String> {
        let the_dice = node
            .values
            .iter()
            .map(|die| self.stringify_node(die))
            .collect::<crate::Result<Vec<_>>>()?
            .join(", ");
        Ok(format!(
            "{}d{}{} ({})",
            node.num,
            node.size,
            self.str_ops(&node.operations)?,
            the_dice
        ))
    }

    fn str_die(&mut self, node: &Die) -> crate::Result<String> {
        node.values
            .iter()
            .map(|val| self.stringify_node(val))
            .collect::<crate::Result<Vec<_>>>()
            .map(|v| v.join(", "))
    }

    fn str_ops(&mut self, ops: &[SetOperator]) -> crate::Result<String> {
        Ok(ops.iter().map(ToString::to_string).collect())
    }
}

fn stringify_annotated<S, N>(s: &mut S, node: &N) -> crate::Result<String>
where
    S: Stringify + ?Sized,
    N: Visit + ?Sized,
{
    let inside = node.accept(s)?;
    Ok(match node.annotation() {
        Some(annotation) if !annotation.is_empty() => format!("{} {}", inside, annotation),
        _ => inside,
    })
}

pub trait Visit: Eval {
    fn accept<S: Stringify + ?Sized>(&self, s: &mut S) -> crate::Result<String>;
}

impl Visit for Number {
    fn accept<S: Stringify + ?Sized>(&self, s: &mut S) -> crate::Result<String> {
        match self {
            Self::Expression(x) => s.str_expression(x),
            Self::Literal(x) => s.str_literal(x),
            Self::UnOp(x) => s.str_unop(x),
            Self::BinOp(x) => s.str_binop(x),
            Self::Parenthetical(x) => s.str_parenthetical(x),
            Self::Set(x) => s.str_set(x),
            Self::Dice(x) => s.str_dice(x),
        }
    }
}

impl Visit for Die {
    fn accept<S: Stringify + ?Sized>(&self, s: &mut S) -> crate::Result<String> {
        s.str_die(self)
    }
}

impl Visit for Literal {
    fn accept<S: Stringify + ?Sized>(&self, s: &mut S) -> crate::Result<String> {
        s.str_literal(self)
    }
}

#[derive(Default, Debug)]
pub struct SimpleStringifier;

impl Stringify for SimpleStringifier {}

#[derive(Default, Debug)]
pub struct MarkdownStringifier {
    in_dropped: bool,
}

impl Stringify for MarkdownStringifier {
    fn stringify<N: Visit + ?Sized>(&mut self, the_roll: &N) -> crate::Result<String> {
        self.in_dropped = false;
        self.stringify_node(the_roll)
    }

    fn stringify_node<N: Visit + ?Sized>(&mut self, node: &N) -> crate::Result<String> {
        if !node.kept() && !self.in_dropped {
            self.in_dropped = true;
            let inside = stringify_annotated(self, node);
            self.in_dropped = false;
            Ok(format!("~~{}~~", inside?))
        } else {
            stringify_annotated(self, node)
        }
    }

    fn str_expression(&mut self, node: &Expression) -> crate::Result<String> {
        Ok(format!(
            "{} = `{}`",
            self.stringify_node(&*node.roll)?,
            node.total()?.as_int()
        ))
    }

    fn str_die(&mut self, node: &Die) -> crate::Result<String> {
        let size = node.size;
        node.values
            .iter()
            .map(|val| fmt_die_value_mkd(self, val, size))
            .collect::<crate::Result<Vec<_>>>()
            .map(|v| v.join(", "))
    }
}

fn fmt_die_value_mkd(
    this: &mut MarkdownStringifier,
    val: &Literal,
    size: DiceSize,
) -> crate::Result<String> {
    let inside = this.stringify_node(val)?;
    let number = val.number()?;
    let is_max = matches!(size, DiceSize::Int(n) if Int::try_from(n).map_or(false, |n| number == Value::Int(n)));
    Ok(if number == Value::Int(1) || is_max {
        format!("**{}**", inside)
    } else {
        inside
    })
}
