use num::rational::Rational64;

/// Abstract SMT term representation, solver-agnostic.
#[derive(Debug, Clone, PartialEq)]
pub enum SmtTerm {
    /// Variable reference by name.
    Var(String),
    /// Exact rational literal.
    RealLit(Rational64),
    /// Boolean literal.
    BoolLit(bool),

    // Arithmetic
    Add(Box<SmtTerm>, Box<SmtTerm>),
    Sub(Box<SmtTerm>, Box<SmtTerm>),
    Mul(Box<SmtTerm>, Box<SmtTerm>),
    Neg(Box<SmtTerm>),

    // Comparison
    Eq(Box<SmtTerm>, Box<SmtTerm>),
    Lt(Box<SmtTerm>, Box<SmtTerm>),
    Le(Box<SmtTerm>, Box<SmtTerm>),
    Gt(Box<SmtTerm>, Box<SmtTerm>),
    Ge(Box<SmtTerm>, Box<SmtTerm>),

    // Boolean logic
    And(Vec<SmtTerm>),
    Or(Vec<SmtTerm>),
    Not(Box<SmtTerm>),
}

#[allow(clippy::should_implement_trait)]
impl SmtTerm {
    pub fn var(name: impl Into<String>) -> Self {
        SmtTerm::Var(name.into())
    }

    pub fn real(value: Rational64) -> Self {
        SmtTerm::RealLit(value)
    }

    /// Integer-valued real literal.
    pub fn int(n: i64) -> Self {
        SmtTerm::RealLit(Rational64::from_integer(n))
    }

    pub fn bool(b: bool) -> Self {
        SmtTerm::BoolLit(b)
    }

    pub fn add(self, other: SmtTerm) -> Self {
        SmtTerm::Add(Box::new(self), Box::new(other))
    }

    pub fn sub(self, other: SmtTerm) -> Self {
        SmtTerm::Sub(Box::new(self), Box::new(other))
    }

    pub fn mul(self, other: SmtTerm) -> Self {
        SmtTerm::Mul(Box::new(self), Box::new(other))
    }

    pub fn neg(self) -> Self {
        SmtTerm::Neg(Box::new(self))
    }

    /// `self * self`.
    pub fn square(self) -> Self {
        let copy = self.clone();
        self.mul(copy)
    }

    /// Left-folded sum; the empty sum is `0`.
    pub fn sum(terms: Vec<SmtTerm>) -> Self {
        let mut iter = terms.into_iter();
        match iter.next() {
            Some(first) => iter.fold(first, SmtTerm::add),
            None => SmtTerm::int(0),
        }
    }

    pub fn eq(self, other: SmtTerm) -> Self {
        SmtTerm::Eq(Box::new(self), Box::new(other))
    }

    pub fn lt(self, other: SmtTerm) -> Self {
        SmtTerm::Lt(Box::new(self), Box::new(other))
    }

    pub fn le(self, other: SmtTerm) -> Self {
        SmtTerm::Le(Box::new(self), Box::new(other))
    }

    pub fn gt(self, other: SmtTerm) -> Self {
        SmtTerm::Gt(Box::new(self), Box::new(other))
    }

    pub fn ge(self, other: SmtTerm) -> Self {
        SmtTerm::Ge(Box::new(self), Box::new(other))
    }

    pub fn and(terms: Vec<SmtTerm>) -> Self {
        SmtTerm::And(terms)
    }

    pub fn or(terms: Vec<SmtTerm>) -> Self {
        SmtTerm::Or(terms)
    }

    pub fn not(self) -> Self {
        SmtTerm::Not(Box::new(self))
    }

    /// `not (self = other)`.
    pub fn ne(self, other: SmtTerm) -> Self {
        self.eq(other).not()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sum_folds_left() {
        let term = SmtTerm::sum(vec![
            SmtTerm::var("a"),
            SmtTerm::var("b"),
            SmtTerm::var("c"),
        ]);
        assert_eq!(
            term,
            SmtTerm::var("a").add(SmtTerm::var("b")).add(SmtTerm::var("c"))
        );
        assert_eq!(SmtTerm::sum(Vec::new()), SmtTerm::int(0));
    }

    #[test]
    fn square_duplicates_operand() {
        let term = SmtTerm::var("x").square();
        assert_eq!(term, SmtTerm::var("x").mul(SmtTerm::var("x")));
    }
}
