//! List utilities over `nil`-terminated pair chains.
//!
//! Every list in the language, environments included, is a chain of pairs whose last
//! tail is the atom `nil`. These helpers walk such chains with loops rather than
//! recursion, so long argument lists and deep environments cost no stack.
//!
//! A chain ending in any atom other than `nil` is not a list: traversal yields a
//! `TypeError` at that point.

use crate::LispError;
use crate::ast::{Atom, Expr};

/// Iterator over the elements of a `nil`-terminated list
#[derive(Debug, Clone)]
pub struct ListIter<'a> {
    list: &'a Expr,
    rest: Option<&'a Expr>,
}

impl<'a> Iterator for ListIter<'a> {
    type Item = Result<&'a Expr, LispError>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.rest.take()?;
        match current {
            Expr::Pair(head, tail) => {
                self.rest = Some(tail.as_ref());
                Some(Ok(head.as_ref()))
            }
            Expr::Atom(atom) if atom.is_nil() => None,
            _ => Some(Err(LispError::TypeError(format!(
                "not a list: {}",
                self.list
            )))),
        }
    }
}

pub fn iter(list: &Expr) -> ListIter<'_> {
    ListIter {
        list,
        rest: Some(list),
    }
}

/// Collect the elements of a list, failing if it is improperly terminated
pub fn to_vec(list: &Expr) -> Result<Vec<&Expr>, LispError> {
    iter(list).collect()
}

/// Find the value bound to `name` in an association list of `(name value)` entries
///
/// The first matching entry wins, so entries nearer the front shadow later ones.
pub fn assoc(name: &Atom, alist: &Expr) -> Result<Expr, LispError> {
    for entry in iter(alist) {
        let entry = entry?;
        let (key, rest) = entry.as_pair().ok_or_else(|| malformed_entry(entry))?;
        if key.as_atom() == Some(name) {
            return rest.car().cloned().map_err(|_| malformed_entry(entry));
        }
    }
    Err(LispError::UndefinedAtom(name.to_string()))
}

fn malformed_entry(entry: &Expr) -> LispError {
    LispError::TypeError(format!("malformed binding: {}", entry))
}

/// Append `back` onto the end of `front` without modifying either
///
/// The elements of `front` are reconstructed into new pairs; `back` is shared.
pub fn concat(front: &Expr, back: &Expr) -> Result<Expr, LispError> {
    let elements = to_vec(front)?;
    Ok(elements
        .into_iter()
        .rev()
        .fold(back.clone(), |tail, head| Expr::cons(head.clone(), tail)))
}

/// Pair up two equal-length lists into a list of two-element lists
///
/// `(a b)` and `(x y)` give `((a x) (b y))`. Lists of different lengths are an
/// arity error rather than being truncated to the shorter one.
pub fn zip(xs: &Expr, ys: &Expr) -> Result<Expr, LispError> {
    let xs = to_vec(xs)?;
    let ys = to_vec(ys)?;
    if xs.len() != ys.len() {
        return Err(LispError::arity_error(xs.len(), ys.len()));
    }

    Ok(Expr::list(
        xs.into_iter()
            .zip(ys)
            .map(|(x, y)| Expr::list([x.clone(), y.clone()])),
    ))
}
