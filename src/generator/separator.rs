use crate::template::Directive;

/// Where the current item sits in the filtered collection being iterated.
///
/// Components are positioned against the components that passed the block
/// condition, attributes against the attributes kept for the current
/// component. Excluded items never count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub index: usize,
    pub count: usize,
}

impl Position {
    pub fn new(index: usize, count: usize) -> Self {
        Position { index, count }
    }

    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 == self.count
    }

    /// `n` counts from the front when non-negative, from the back otherwise
    /// (`-1` is the last item).
    pub fn is_nth(&self, n: i64) -> bool {
        let index = self.index as i64;
        if n >= 0 {
            index == n
        } else {
            self.count as i64 + n == index
        }
    }

    /// Text a position directive emits here.
    ///
    /// Returns `None` for directives that do not depend on position.
    pub fn select<'a>(&self, directive: &'a Directive) -> Option<&'a str> {
        let chosen = match directive {
            Directive::IfFirst(text) => self.is_first().then_some(text.as_str()),
            Directive::IfNotFirst(text) => (!self.is_first()).then_some(text.as_str()),
            Directive::IfLast(text) => self.is_last().then_some(text.as_str()),
            Directive::IfNotLast(text) => (!self.is_last()).then_some(text.as_str()),
            Directive::IfNthElse { n, yes, no } => {
                Some(if self.is_nth(*n) { yes.as_str() } else { no.as_str() })
            }
            Directive::AttrCount | Directive::AttrList { .. } => return None,
        };
        Some(chosen.unwrap_or(""))
    }
}
