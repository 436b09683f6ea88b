//! Presave ordering of a unit's tokens
//!
//! Every dumpable unit has a sorter mapping token classes to priorities. Tokens are laid out by
//! priority first; within a priority, tokens read from the file keep their file order and
//! tokens created by updates follow in creation order.

use crate::robot::token::{TokenArena, TokenClass, TokenId};

/// Priority of classes a sorter does not list.
const FALLBACK_PRIORITY: u8 = 3;

#[derive(Debug)]
pub struct Sorter {
    pub name: &'static str,
    pub priorities: &'static [(TokenClass, u8)],
}

/// Table headers: the header cell, then columns, comments and stray cells.
pub static HEADER: Sorter = Sorter {
    name: "header",
    priorities: &[
        (TokenClass::Declaration, 1),
        (TokenClass::Value, 2),
        (TokenClass::Comment, 2),
        (TokenClass::Continuation, 2),
        (TokenClass::Unknown, 2),
    ],
};

/// Settings, variables and `[local settings]`.
pub static DECLARATION: Sorter = Sorter {
    name: "declaration",
    priorities: &[
        (TokenClass::Declaration, 1),
        (TokenClass::Value, 2),
        (TokenClass::Argument, 2),
        (TokenClass::Comment, 2),
        (TokenClass::Continuation, 2),
        (TokenClass::Unknown, 2),
    ],
};

/// Executable rows of test cases, tasks and keywords.
pub static ROW: Sorter = Sorter {
    name: "row",
    priorities: &[
        (TokenClass::Action, 1),
        (TokenClass::Argument, 2),
        (TokenClass::Comment, 2),
        (TokenClass::Continuation, 2),
    ],
};

pub static NAME: Sorter = Sorter {
    name: "name",
    priorities: &[(TokenClass::Declaration, 1)],
};

/// Empty lines, comment lines and free rows keep plain file order.
pub static LINE: Sorter = Sorter {
    name: "line",
    priorities: &[],
};

impl Sorter {
    pub fn priority(&self, class: TokenClass) -> u8 {
        self.priorities
            .iter()
            .find(|(c, _)| *c == class)
            .map_or(FALLBACK_PRIORITY, |(_, p)| *p)
    }

    pub fn sort(&self, tokens: &mut [TokenId], arena: &TokenArena) {
        tokens.sort_by_key(|id| {
            let token = arena.get(*id);
            let offset = token.position().map_or(usize::MAX, |p| p.offset);
            (self.priority(token.token_type().class()), offset, id.index())
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::robot::token::{ElementKind, FilePosition, RobotToken, RobotTokenType};

    #[test]
    fn actions_lead_created_arguments() {
        let mut arena = TokenArena::new();
        let argument = arena.alloc(RobotToken::created("x", RobotTokenType::ActionArgument(ElementKind::Keyword)));
        let comment = arena.alloc(RobotToken::created("# c", RobotTokenType::StartHashComment));
        let action = arena.alloc(RobotToken::created("Log", RobotTokenType::ActionName(ElementKind::Keyword)));
        let mut tokens = vec![comment, argument, action];
        ROW.sort(&mut tokens, &arena);
        assert_eq!(tokens, vec![action, argument, comment]);
    }

    #[test]
    fn parsed_tokens_precede_created_ones() {
        let mut arena = TokenArena::new();
        let created = arena.alloc(RobotToken::created("b", RobotTokenType::VariableValue));
        let mut parsed = RobotToken::parsed("a", FilePosition::new(2, 12, 40));
        parsed.set_primary_type(RobotTokenType::VariableValue);
        let parsed = arena.alloc(parsed);
        let mut tokens = vec![created, parsed];
        DECLARATION.sort(&mut tokens, &arena);
        assert_eq!(tokens, vec![parsed, created]);
    }

    #[test]
    fn unlisted_classes_fall_back() {
        assert_eq!(NAME.priority(TokenClass::Filler), FALLBACK_PRIORITY);
        assert_eq!(ROW.priority(TokenClass::Action), 1);
    }
}
