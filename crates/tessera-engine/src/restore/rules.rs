//! The before/after rule table.
//!
//! A rule matches on (direction, old type, new type), each of which may be
//! a wildcard. Every matching rule contributes; rules are merged in
//! ascending specificity (number of non-wildcard keys), so a more specific
//! rule overrides the fields a broader one set. Equal specificity falls back
//! to table order, later entries winning.

use crate::content_type::ContentType;
use crate::position::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BrCondition {
    #[default]
    Always,
    /// Only act on a `<br>` that is fake.
    OnlyIfFake,
}

/// What to do at the edge next to a restored boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Decision {
    /// `Some(true)`: a collapsible edge space becomes NBSP.
    /// `Some(false)`: an edge NBSP becomes a plain space, and a collapsible
    /// edge run that sat against a line edge is dropped.
    pub space_visible: Option<bool>,
    /// `Some(true)`: a fake edge `<br>` is duplicated.
    /// `Some(false)`: an edge `<br>` is removed.
    pub br_visible: Option<bool>,
    pub br_condition: BrCondition,
}

impl Decision {
    const fn space(visible: bool) -> Self {
        Self {
            space_visible: Some(visible),
            br_visible: None,
            br_condition: BrCondition::Always,
        }
    }

    const fn br(visible: bool, condition: BrCondition) -> Self {
        Self {
            space_visible: None,
            br_visible: Some(visible),
            br_condition: condition,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.space_visible.is_none() && self.br_visible.is_none()
    }

    fn merge(self, over: Decision) -> Decision {
        Decision {
            space_visible: over.space_visible.or(self.space_visible),
            br_visible: over.br_visible.or(self.br_visible),
            br_condition: if over.br_visible.is_some() {
                over.br_condition
            } else {
                self.br_condition
            },
        }
    }
}

const ANY: ContentType = ContentType::all();

struct Rule {
    dir: Option<Direction>,
    old: ContentType,
    new: ContentType,
    decision: Decision,
}

impl Rule {
    fn matches(&self, dir: Direction, old: ContentType, new: ContentType) -> bool {
        self.dir.is_none_or(|d| d == dir) && self.old.intersects(old) && self.new.intersects(new)
    }

    fn specificity(&self) -> u8 {
        u8::from(self.dir.is_some()) + u8::from(self.old != ANY) + u8::from(self.new != ANY)
    }
}

const SPACE_OR_BLOCK: ContentType = ContentType::SPACE.union(ContentType::BLOCK);
const INLINE_OR_BR: ContentType = ContentType::INLINE.union(ContentType::BR);
const BR_OR_BLOCK: ContentType = ContentType::BR.union(ContentType::BLOCK);

static RULES: [Rule; 10] = [
    // A word went away; the space before it must not collapse.
    Rule {
        dir: None,
        old: ContentType::CONTENT,
        new: SPACE_OR_BLOCK,
        decision: Decision::space(true),
    },
    Rule {
        dir: Some(Direction::Left),
        old: ContentType::INLINE,
        new: ContentType::BR,
        decision: Decision::space(true),
    },
    Rule {
        dir: Some(Direction::Right),
        old: ContentType::CONTENT,
        new: ContentType::BR,
        decision: Decision::space(true),
    },
    Rule {
        dir: Some(Direction::Right),
        old: ContentType::BR,
        new: SPACE_OR_BLOCK,
        decision: Decision::space(true),
    },
    Rule {
        dir: None,
        old: ContentType::SPACE,
        new: ANY,
        decision: Decision::space(false),
    },
    Rule {
        dir: Some(Direction::Left),
        old: ContentType::BR,
        new: ANY,
        decision: Decision::space(false),
    },
    Rule {
        dir: None,
        old: ContentType::BLOCK,
        new: INLINE_OR_BR,
        decision: Decision::space(false),
    },
    // The line lost its content; keep it rendered.
    Rule {
        dir: Some(Direction::Right),
        old: ContentType::INLINE,
        new: ContentType::BLOCK,
        decision: Decision::br(true, BrCondition::Always),
    },
    Rule {
        dir: Some(Direction::Right),
        old: ContentType::BLOCK,
        new: INLINE_OR_BR,
        decision: Decision::br(false, BrCondition::Always),
    },
    Rule {
        dir: Some(Direction::Left),
        old: BR_OR_BLOCK,
        new: ContentType::INLINE,
        decision: Decision::br(false, BrCondition::OnlyIfFake),
    },
];

/// Merge every rule matching a change seen in `dir`.
pub fn decide(dir: Direction, old: ContentType, new: ContentType) -> Decision {
    let mut matching: Vec<&Rule> = RULES
        .iter()
        .filter(|rule| rule.matches(dir, old, new))
        .collect();
    matching.sort_by_key(|rule| rule.specificity());
    matching
        .into_iter()
        .fold(Decision::default(), |acc, rule| acc.merge(rule.decision))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const VISIBLE: Option<bool> = Some(true);
    const INVISIBLE: Option<bool> = Some(false);

    #[rstest]
    #[case(Direction::Right, ContentType::CONTENT, ContentType::BLOCK_OUTSIDE, VISIBLE, VISIBLE)]
    #[case(Direction::Left, ContentType::CONTENT, ContentType::SPACE, VISIBLE, None)]
    #[case(Direction::Left, ContentType::SPACE, ContentType::BR, VISIBLE, None)]
    #[case(Direction::Right, ContentType::CONTENT, ContentType::BR, VISIBLE, None)]
    #[case(Direction::Right, ContentType::SPACE, ContentType::BR, INVISIBLE, None)]
    #[case(Direction::Right, ContentType::BR, ContentType::BLOCK_INSIDE, VISIBLE, None)]
    #[case(Direction::Left, ContentType::BR, ContentType::CONTENT, INVISIBLE, INVISIBLE)]
    #[case(Direction::Left, ContentType::BLOCK_OUTSIDE, ContentType::CONTENT, INVISIBLE, INVISIBLE)]
    #[case(Direction::Right, ContentType::BLOCK_OUTSIDE, ContentType::CONTENT, INVISIBLE, INVISIBLE)]
    #[case(Direction::Right, ContentType::BLOCK_OUTSIDE, ContentType::BR, INVISIBLE, INVISIBLE)]
    #[case(Direction::Right, ContentType::SPACE, ContentType::BLOCK_OUTSIDE, INVISIBLE, VISIBLE)]
    #[case(Direction::Left, ContentType::SPACE, ContentType::CONTENT, INVISIBLE, None)]
    fn table(
        #[case] dir: Direction,
        #[case] old: ContentType,
        #[case] new: ContentType,
        #[case] space: Option<bool>,
        #[case] br: Option<bool>,
    ) {
        let decision = decide(dir, old, new);
        assert_eq!(decision.space_visible, space, "space for {dir:?} {old} -> {new}");
        assert_eq!(decision.br_visible, br, "br for {dir:?} {old} -> {new}");
    }

    #[test]
    fn left_br_removal_only_if_fake() {
        let decision = decide(Direction::Left, ContentType::BR, ContentType::CONTENT);
        assert_eq!(decision.br_condition, BrCondition::OnlyIfFake);
        let decision = decide(Direction::Right, ContentType::BLOCK_OUTSIDE, ContentType::CONTENT);
        assert_eq!(decision.br_condition, BrCondition::Always);
    }

    #[test]
    fn unmatched_change_decides_nothing() {
        assert!(decide(Direction::Left, ContentType::BLOCK_INSIDE, ContentType::BLOCK_OUTSIDE).is_empty());
        assert!(decide(Direction::Right, ContentType::CONTENT, ContentType::CONTENT).is_empty());
    }
}
