use crate::LispError;
use crate::evaluator::Environment;
use icu_properties::CodePointMapData;
use icu_properties::props::{GeneralCategory, GeneralCategoryGroup};
use std::fmt;
use std::sync::{Arc, LazyLock};

/// The false atom, also the empty-list terminator
pub const NIL: &str = "nil";
/// The canonical true atom
pub const T: &str = "t";

/// True for characters in one of the Unicode letter categories (Lu, Ll, Lt, Lm, Lo)
///
/// Letterlike numbers such as `Ⅻ` and combining marks are not letters.
pub fn is_letter(c: char) -> bool {
    GeneralCategoryGroup::Letter.contains(CodePointMapData::<GeneralCategory>::new().get(c))
}

/// An indivisible symbolic name made only of letters
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Atom(Arc<str>);

impl Atom {
    /// Create an atom, rejecting empty names and names with non-letter characters
    pub fn new(name: &str) -> Result<Atom, LispError> {
        if !name.is_empty() && name.chars().all(is_letter) {
            Ok(Atom(Arc::from(name)))
        } else {
            Err(LispError::InvalidAtom(name.to_string()))
        }
    }

    pub fn nil() -> Atom {
        Atom(Arc::from(NIL))
    }

    pub fn t() -> Atom {
        Atom(Arc::from(T))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_nil(&self) -> bool {
        &*self.0 == NIL
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A procedure value: parameter list, body and the environment it was defined in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Procedure {
    pub params: Expr,
    pub body: Expr,
    pub env: Environment,
}

/// Core expression type: an atom, a pair of expressions, or a procedure value
///
/// Pair components are shared, never mutated, so building a new expression out of
/// existing ones (consing onto an environment, for instance) copies no structure.
/// Procedures never come out of the reader; only evaluating a `lambda` form makes one.
#[derive(Debug, Clone, Eq)]
pub enum Expr {
    Atom(Atom),
    /// Head (car) and tail (cdr)
    Pair(Arc<Expr>, Arc<Expr>),
    Procedure(Arc<Procedure>),
}

impl Expr {
    pub fn atom(name: &str) -> Result<Expr, LispError> {
        Atom::new(name).map(Expr::Atom)
    }

    pub fn nil() -> Expr {
        Expr::Atom(Atom::nil())
    }

    pub fn t() -> Expr {
        Expr::Atom(Atom::t())
    }

    /// `t` for true, `nil` for false
    pub fn truth(value: bool) -> Expr {
        if value { Expr::t() } else { Expr::nil() }
    }

    pub fn cons(head: Expr, tail: Expr) -> Expr {
        Expr::Pair(Arc::new(head), Arc::new(tail))
    }

    /// Build a `nil`-terminated list from the given elements
    pub fn list<I>(items: I) -> Expr
    where
        I: IntoIterator<Item = Expr>,
        I::IntoIter: DoubleEndedIterator,
    {
        items
            .into_iter()
            .rev()
            .fold(Expr::nil(), |tail, head| Expr::cons(head, tail))
    }

    /// Anything that is not a pair, procedures included
    pub fn is_atom(&self) -> bool {
        !matches!(self, Expr::Pair(..))
    }

    /// Check if this is the atom `nil`
    pub fn is_nil(&self) -> bool {
        matches!(self, Expr::Atom(atom) if atom.is_nil())
    }

    pub fn as_atom(&self) -> Option<&Atom> {
        match self {
            Expr::Atom(atom) => Some(atom),
            _ => None,
        }
    }

    pub fn as_pair(&self) -> Option<(&Expr, &Expr)> {
        match self {
            Expr::Pair(head, tail) => Some((head.as_ref(), tail.as_ref())),
            _ => None,
        }
    }

    pub fn car(&self) -> Result<&Expr, LispError> {
        self.as_pair()
            .map(|(head, _)| head)
            .ok_or_else(|| LispError::TypeError(format!("not a list: {}", self)))
    }

    pub fn cdr(&self) -> Result<&Expr, LispError> {
        self.as_pair()
            .map(|(_, tail)| tail)
            .ok_or_else(|| LispError::TypeError(format!("not a list: {}", self)))
    }
}

/// Canonical rendering is dotted, `(a.(b.nil))`. The alternate form (`{:#}`)
/// separates with a space, `(a (b nil))`, which desugars back to the canonical text.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let separator = if f.alternate() { ' ' } else { '.' };
        let mut current = self;
        let mut open = 0usize;

        // Walk the tail spine iteratively; long lists nest only to the right.
        loop {
            match current {
                Expr::Atom(atom) => {
                    write!(f, "{}", atom)?;
                    break;
                }
                Expr::Procedure(_) => {
                    f.write_str("#<procedure>")?;
                    break;
                }
                Expr::Pair(head, tail) => {
                    if f.alternate() {
                        write!(f, "({:#}{}", head, separator)?;
                    } else {
                        write!(f, "({}{}", head, separator)?;
                    }
                    open += 1;
                    current = tail.as_ref();
                }
            }
        }

        for _ in 0..open {
            f.write_str(")")?;
        }
        Ok(())
    }
}

/// Shared `nil` swapped into the tails of pairs being dropped
static DETACHED_TAIL: LazyLock<Arc<Expr>> = LazyLock::new(|| Arc::new(Expr::nil()));

// Lists nest to the right, so the derived drop would recurse once per element.
// Unlink the tail spine in a loop instead; heads still drop recursively.
impl Drop for Expr {
    fn drop(&mut self) {
        let Expr::Pair(_, tail) = self else {
            return;
        };
        let mut next = std::mem::replace(tail, DETACHED_TAIL.clone());
        while let Ok(mut expr) = Arc::try_unwrap(next) {
            match &mut expr {
                Expr::Pair(_, tail) => next = std::mem::replace(tail, DETACHED_TAIL.clone()),
                _ => break,
            }
        }
    }
}

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        let (mut left, mut right) = (self, other);
        loop {
            match (left, right) {
                (Expr::Atom(a), Expr::Atom(b)) => return a == b,
                (Expr::Procedure(a), Expr::Procedure(b)) => return Arc::ptr_eq(a, b) || a == b,
                (Expr::Pair(head_a, tail_a), Expr::Pair(head_b, tail_b)) => {
                    if head_a != head_b {
                        return false;
                    }
                    if Arc::ptr_eq(tail_a, tail_b) {
                        return true;
                    }
                    left = tail_a.as_ref();
                    right = tail_b.as_ref();
                }
                _ => return false,
            }
        }
    }
}
