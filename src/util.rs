use std::iter::FusedIterator;

pub mod fmt;

#[cfg(test)]
pub(crate) mod test_utils;

pub trait BreakableIteratorExt: Iterator + Sized {
    /// Yields items up to, and including, the first one that matches the
    /// predicate. Useful for the lexer, which never stops on its own.
    fn up_to<P>(self, stop_predicate: P) -> Break<Self, P>
    where
        P: FnMut(&Self::Item) -> bool;
}

impl<I: Iterator> BreakableIteratorExt for I {
    fn up_to<P>(self, stop_predicate: P) -> Break<Self, P>
    where
        P: FnMut(&Self::Item) -> bool,
    {
        Break {
            iter: self,
            stop_predicate,
            finished: false,
        }
    }
}

pub struct Break<I, P> {
    iter: I,
    stop_predicate: P,
    finished: bool,
}

impl<I, P> Iterator for Break<I, P>
where
    I: Iterator,
    P: FnMut(&I::Item) -> bool,
{
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let next = self.iter.next();
        self.finished = next.as_ref().map_or(true, &mut self.stop_predicate);
        next
    }
}

impl<I, P> FusedIterator for Break<I, P>
where
    I: Iterator,
    P: FnMut(&I::Item) -> bool,
{
}

#[cfg(test)]
mod tests {
    use crate::{lexer::Lexer, token::Token, util::BreakableIteratorExt};

    #[test]
    fn test_up_to() {
        let items: Vec<_> = (0..10).up_to(|x| *x == 5).collect();
        assert_eq!(items, [0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_up_to_exhausted_without_match() {
        let items: Vec<_> = (0..3).up_to(|x| *x == 7).collect();
        assert_eq!(items, [0, 1, 2]);
    }

    #[test]
    fn test_up_to_stops_endless_lexer() {
        let count = Lexer::new("a b c").up_to(Token::is_eof).count();
        assert_eq!(count, 4);
    }
}
