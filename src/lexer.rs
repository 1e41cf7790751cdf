//! Rule-body lexer.
//!
//! Converts the text of one grammar rule (everything up to and including its
//! terminating `;`) into an ordered list of [`Segment`]s, which the sub parser
//! turns into typed substitutions.
//!
//! ```text
//! "←← komma[ →→];"
//!        │
//!        v
//! [ LeftSub  "←←"    ]
//! [ Spellout " komma"]
//! [ RightDelim "[ ]" ]      bracketed segments keep literal [..] markers;
//! [ RightSub "[→→]"  ]      the sub parser recovers them as the Optional flag
//! ```
//!
//! ## State machine
//!
//! A single-threaded, non-suspending scanner with four states:
//!
//! ```text
//! initial ──'←' / '['──> left_sub ──────> spellout ──'→' / '['──> right_sub
//!    │                                       │  ^                     │
//!    └──otherwise───────────────────────────>┘  └──plain text after a─┘
//!                                                  right sub ("→→zehn")
//! ```
//!
//! - `left_sub` consumes one arrow group (`←←`, `←%name←`) or a bracketed
//!   region of arrow groups and delimiter runs, then hands over to `spellout`.
//! - `spellout` accumulates plain text, absorbing interior delimiter runs so
//!   hyphenated compounds stay one segment; verbatim escapes (`=%name=`,
//!   `=#,##0=`, `=0=`) and plural sigils (`$(…)$`) each form their own
//!   segment. A delimiter run immediately followed by a right-arrow belongs
//!   to the right substitution and is emitted there as a `RightDelim`.
//! - `right_sub` mirrors `left_sub` with right-arrows and brackets.
//!
//! Input is NFC-normalized before scanning so that visually identical rule
//! bodies lex identically regardless of source encoding.
//!
//! A [`Lexer`] processes exactly one input and is consumed by [`Lexer::run`];
//! the first embedded error wins.

use thiserror::Error;
use unicode_normalization::UnicodeNormalization;

const LEFT_ARROW: char = '←';
const RIGHT_ARROW: char = '→';
const LEFT_BRACKET: char = '[';
const RIGHT_BRACKET: char = ']';
const END_TAG: char = ';';
const ESCAPE: char = '=';
const PLURAL_SIGIL: char = '$';

/// Characters that separate words inside a rule body: apostrophe, comma,
/// space, soft hyphen (U+00AD), minus sign (U+2212) and hyphen-minus.
fn is_delim(c: char) -> bool {
    matches!(c, '\'' | ',' | ' ' | '\u{00AD}' | '−' | '-')
}

fn is_special(c: char) -> bool {
    matches!(c, LEFT_ARROW | RIGHT_ARROW | LEFT_BRACKET | RIGHT_BRACKET | ESCAPE | END_TAG | PLURAL_SIGIL)
}

fn is_plain(c: char) -> bool {
    !is_special(c)
}

/// Positional kind of a lexed segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    /// A substitution group left of the spellout text (`←←`, `←%name←`, or
    /// any group inside a leading bracket).
    LeftSub,
    /// A residual delimiter run inside a leading bracket (`[ ]`, `[­und­]`).
    LeftDelim,
    /// Literal spellout text, a verbatim escape, or a plural sigil.
    Spellout,
    /// A delimiter run attached to the right substitution (` ` in
    /// `←← komma →→;`, or `[ ]` when bracketed).
    RightDelim,
    /// A substitution group right of the spellout text.
    RightSub,
}

impl std::fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SegmentKind::LeftSub => "left sub",
            SegmentKind::LeftDelim => "left delim",
            SegmentKind::Spellout => "spellout",
            SegmentKind::RightDelim => "right delim",
            SegmentKind::RightSub => "right sub",
        };
        f.write_str(s)
    }
}

/// One lexed segment: its positional kind and its exact source text.
///
/// Segments that were lexed strictly between a bracket-open and its matching
/// close carry literal `[`/`]` markers around their text; the sub parser
/// strips them and sets the sub's Optional flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub kind: SegmentKind,
    pub text: String,
}

impl Segment {
    fn new(kind: SegmentKind, text: impl Into<String>) -> Self {
        Segment { kind, text: text.into() }
    }
}

/// Lexer errors. `UnknownInput` carries the unconsumed remainder of the rule
/// body so grammar authors can locate the offending character.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("premature end of input")]
    PrematureEnd,
    #[error("unknown input at expected {expected}: '{rest}'")]
    UnknownInput { expected: SegmentKind, rest: String },
}

/// Lex one rule body into segments.
pub fn lex(input: &str) -> Result<Vec<Segment>, LexError> {
    Lexer::new(input).run()
}

// Internal items carry bracket markers alongside real segments; the markers
// are folded away by the post-processing pass in `finish`.
enum Item {
    Seg(SegmentKind, String),
    BracketOpen,
    BracketClose,
}

enum State {
    Initial,
    LeftSub,
    Spellout,
    RightSub,
    Done,
}

/// Single-use scanner over one rule body.
pub struct Lexer {
    input: Vec<char>,
    pos: usize,
    items: Vec<Item>,
    /// Delimiter run handed from `spellout` to `right_sub`.
    pending_delim: Option<String>,
}

impl Lexer {
    /// Create a lexer over `input`, NFC-normalizing it first.
    pub fn new(input: &str) -> Self {
        Lexer { input: input.nfc().collect(), pos: 0, items: Vec::new(), pending_delim: None }
    }

    /// Run the state machine to completion and return the segment list, or
    /// the first error encountered.
    pub fn run(mut self) -> Result<Vec<Segment>, LexError> {
        let mut state = State::Initial;
        loop {
            state = match state {
                State::Initial => self.initial()?,
                State::LeftSub => self.left_sub()?,
                State::Spellout => self.spellout()?,
                State::RightSub => self.right_sub()?,
                State::Done => break,
            };
        }
        Ok(self.finish())
    }

    // --- Scanner primitives -------------------------------------------------

    fn peek(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn rest(&self) -> String {
        self.input[self.pos..].iter().collect()
    }

    fn take_while(&mut self, f: impl Fn(char) -> bool) -> String {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !f(c) {
                break;
            }
            self.pos += 1;
        }
        self.input[start..self.pos].iter().collect()
    }

    fn emit(&mut self, kind: SegmentKind, text: String) {
        self.items.push(Item::Seg(kind, text));
    }

    fn unknown(&self, expected: SegmentKind) -> LexError {
        LexError::UnknownInput { expected, rest: self.rest() }
    }

    // --- States -------------------------------------------------------------

    fn initial(&mut self) -> Result<State, LexError> {
        match self.peek() {
            None => Err(LexError::PrematureEnd),
            Some(END_TAG) => {
                self.bump();
                Ok(State::Done)
            }
            Some(LEFT_ARROW) | Some(LEFT_BRACKET) => Ok(State::LeftSub),
            Some(_) => Ok(State::Spellout),
        }
    }

    fn left_sub(&mut self) -> Result<State, LexError> {
        match self.peek() {
            Some(LEFT_ARROW) => {
                let group = self.group(LEFT_ARROW, SegmentKind::LeftSub)?;
                self.emit(SegmentKind::LeftSub, group);
                Ok(State::Spellout)
            }
            Some(LEFT_BRACKET) => {
                self.bracketed(SegmentKind::LeftSub, SegmentKind::LeftDelim)?;
                Ok(State::Spellout)
            }
            _ => Err(self.unknown(SegmentKind::LeftSub)),
        }
    }

    fn spellout(&mut self) -> Result<State, LexError> {
        let mut buf = String::new();
        loop {
            match self.peek() {
                None => {
                    self.flush(&mut buf);
                    return Err(LexError::PrematureEnd);
                }
                Some(END_TAG) => {
                    self.flush(&mut buf);
                    self.bump();
                    return Ok(State::Done);
                }
                Some(RIGHT_ARROW) | Some(LEFT_BRACKET) => {
                    self.flush(&mut buf);
                    return Ok(State::RightSub);
                }
                Some(ESCAPE) => {
                    self.flush(&mut buf);
                    let group = self.group(ESCAPE, SegmentKind::Spellout)?;
                    self.emit(SegmentKind::Spellout, group);
                }
                Some(PLURAL_SIGIL) => {
                    self.flush(&mut buf);
                    let group = self.plural_group()?;
                    self.emit(SegmentKind::Spellout, group);
                }
                Some(c) if is_delim(c) => {
                    let run = self.take_while(is_delim);
                    if self.peek() == Some(RIGHT_ARROW) {
                        // The run belongs to the right substitution.
                        self.flush(&mut buf);
                        self.pending_delim = Some(run);
                        return Ok(State::RightSub);
                    }
                    buf.push_str(&run);
                }
                Some(c) if is_plain(c) => {
                    let run = self.take_while(|c| is_plain(c) && !is_delim(c));
                    buf.push_str(&run);
                }
                Some(_) => return Err(self.unknown(SegmentKind::Spellout)),
            }
        }
    }

    fn right_sub(&mut self) -> Result<State, LexError> {
        if let Some(run) = self.pending_delim.take() {
            self.emit(SegmentKind::RightDelim, run);
        }
        loop {
            match self.peek() {
                None => return Err(LexError::PrematureEnd),
                Some(END_TAG) => {
                    self.bump();
                    return Ok(State::Done);
                }
                Some(RIGHT_ARROW) => {
                    let group = self.group(RIGHT_ARROW, SegmentKind::RightSub)?;
                    self.emit(SegmentKind::RightSub, group);
                }
                Some(LEFT_BRACKET) => {
                    self.bracketed(SegmentKind::RightSub, SegmentKind::RightDelim)?;
                }
                Some(LEFT_ARROW) | Some(RIGHT_BRACKET) => {
                    return Err(self.unknown(SegmentKind::RightSub));
                }
                // Spellout text after a right substitution ("→→zehn").
                Some(_) => return Ok(State::Spellout),
            }
        }
    }

    // --- Group scanners -----------------------------------------------------

    /// Consume one sentinel-delimited group: the opening sentinel, everything
    /// up to the matching sentinel, and the sentinel itself. Covers arrow
    /// groups (`←←`, `→%name→`) and verbatim escapes (`=%name=`, `=#,##0=`).
    fn group(&mut self, sentinel: char, expected: SegmentKind) -> Result<String, LexError> {
        let mut group = String::new();
        let Some(opening) = self.bump() else {
            return Err(LexError::PrematureEnd);
        };
        group.push(opening);
        let inner = self.take_while(|c| c != sentinel && c != END_TAG);
        group.push_str(&inner);
        match self.peek() {
            Some(c) if c == sentinel => {
                self.bump();
                group.push(c);
                Ok(group)
            }
            None => Err(LexError::PrematureEnd),
            Some(_) => Err(self.unknown(expected)),
        }
    }

    /// Consume a `$(…)$` plural sigil verbatim into one segment.
    fn plural_group(&mut self) -> Result<String, LexError> {
        let mut group = String::new();
        let Some(opening) = self.bump() else {
            return Err(LexError::PrematureEnd);
        };
        group.push(opening);
        let inner = self.take_while(|c| c != PLURAL_SIGIL);
        group.push_str(&inner);
        match self.bump() {
            Some(c) => {
                group.push(c);
                Ok(group)
            }
            None => Err(LexError::PrematureEnd),
        }
    }

    /// Consume a bracketed region: arrow groups and escapes are emitted with
    /// `sub_kind`, residual plain/delimiter runs with `delim_kind`, in source
    /// order. The bracket markers themselves become `Item::Bracket*` and are
    /// folded into the segment text by `finish`.
    fn bracketed(&mut self, sub_kind: SegmentKind, delim_kind: SegmentKind) -> Result<(), LexError> {
        self.bump();
        self.items.push(Item::BracketOpen);
        loop {
            match self.peek() {
                None => return Err(LexError::PrematureEnd),
                Some(RIGHT_BRACKET) => {
                    self.bump();
                    self.items.push(Item::BracketClose);
                    return Ok(());
                }
                Some(c @ (LEFT_ARROW | RIGHT_ARROW | ESCAPE)) => {
                    let group = self.group(c, sub_kind)?;
                    self.emit(sub_kind, group);
                }
                Some(PLURAL_SIGIL) => {
                    let group = self.plural_group()?;
                    self.emit(sub_kind, group);
                }
                Some(_) => {
                    let run = self.take_while(is_plain);
                    if run.is_empty() {
                        return Err(self.unknown(delim_kind));
                    }
                    self.emit(delim_kind, run);
                }
            }
        }
    }

    fn flush(&mut self, buf: &mut String) {
        if !buf.is_empty() {
            let text = std::mem::take(buf);
            self.emit(SegmentKind::Spellout, text);
        }
    }

    /// Fold bracket markers: segments strictly between an open and its close
    /// get literal `[`/`]` wrapped around their text, the markers are dropped.
    fn finish(self) -> Vec<Segment> {
        let mut res = Vec::new();
        let mut open = false;
        for item in self.items {
            match item {
                Item::BracketOpen => open = true,
                Item::BracketClose => open = false,
                Item::Seg(kind, text) => {
                    if open {
                        res.push(Segment::new(kind, format!("[{text}]")));
                    } else {
                        res.push(Segment::new(kind, text));
                    }
                }
            }
        }
        res
    }
}

#[cfg(test)]
mod tests {
    use super::SegmentKind::{LeftDelim, LeftSub, RightDelim, RightSub, Spellout};
    use super::*;

    fn seg(kind: SegmentKind, text: &str) -> Segment {
        Segment::new(kind, text)
    }

    fn check(input: &str, expected: &[Segment]) {
        let got = lex(input).unwrap_or_else(|e| panic!("lexing '{input}' failed: {e}"));
        assert_eq!(got, expected, "for input '{input}'");
    }

    #[test]
    fn empty_input_is_premature() {
        assert_eq!(lex(""), Err(LexError::PrematureEnd));
    }

    #[test]
    fn missing_terminator_is_premature() {
        assert_eq!(lex("minus"), Err(LexError::PrematureEnd));
        assert_eq!(lex("←← komma"), Err(LexError::PrematureEnd));
        assert_eq!(lex("[←← komma"), Err(LexError::PrematureEnd));
    }

    #[test]
    fn empty_body_lexes_to_nothing() {
        check(";", &[]);
    }

    #[test]
    fn plain_spellout() {
        check("minus;", &[seg(Spellout, "minus")]);
    }

    #[test]
    fn left_sub_then_spellout() {
        check("←← komma;", &[seg(LeftSub, "←←"), seg(Spellout, " komma")]);
    }

    #[test]
    fn spellout_then_right_sub() {
        check("komma →→;", &[seg(Spellout, "komma"), seg(RightDelim, " "), seg(RightSub, "→→")]);
    }

    #[test]
    fn both_subs() {
        check(
            "←← komma →→;",
            &[
                seg(LeftSub, "←←"),
                seg(Spellout, " komma"),
                seg(RightDelim, " "),
                seg(RightSub, "→→"),
            ],
        );
    }

    #[test]
    fn named_subs() {
        check(
            "←%cardinal-neuter← komma →%cardinal-reale→;",
            &[
                seg(LeftSub, "←%cardinal-neuter←"),
                seg(Spellout, " komma"),
                seg(RightDelim, " "),
                seg(RightSub, "→%cardinal-reale→"),
            ],
        );
    }

    #[test]
    fn bracketed_left_sub() {
        check(
            "[←← ]komma →→;",
            &[
                seg(LeftSub, "[←←]"),
                seg(LeftDelim, "[ ]"),
                seg(Spellout, "komma"),
                seg(RightDelim, " "),
                seg(RightSub, "→→"),
            ],
        );
    }

    #[test]
    fn bracketed_right_sub() {
        check(
            "←← komma[ →→];",
            &[
                seg(LeftSub, "←←"),
                seg(Spellout, " komma"),
                seg(RightDelim, "[ ]"),
                seg(RightSub, "[→→]"),
            ],
        );
        check(
            "komma[ →→];",
            &[seg(Spellout, "komma"), seg(RightDelim, "[ ]"), seg(RightSub, "[→→]")],
        );
    }

    #[test]
    fn bracketed_named_right_sub() {
        check(
            "←← komma[ →%cardinal-reale→];",
            &[
                seg(LeftSub, "←←"),
                seg(Spellout, " komma"),
                seg(RightDelim, "[ ]"),
                seg(RightSub, "[→%cardinal-reale→]"),
            ],
        );
    }

    #[test]
    fn interior_delimiters_stay_in_one_segment() {
        check("en miljon[→→];", &[seg(Spellout, "en miljon"), seg(RightSub, "[→→]")]);
    }

    #[test]
    fn verbatim_escape_forms_its_own_segment() {
        check(
            "=%spellout-cardinal-neuter=de;",
            &[seg(Spellout, "=%spellout-cardinal-neuter="), seg(Spellout, "de")],
        );
        check(
            "er =%spellout-cardinal-neuter= de;",
            &[
                seg(Spellout, "er "),
                seg(Spellout, "=%spellout-cardinal-neuter="),
                seg(Spellout, " de"),
            ],
        );
        check(
            "=%spellout-numbering= miljoner tusen;",
            &[seg(Spellout, "=%spellout-numbering="), seg(Spellout, " miljoner tusen")],
        );
    }

    #[test]
    fn leading_delimiter_run_flushes_before_escape() {
        check(
            "\u{00AD}=%spellout-ordinal-feminine=;",
            &[seg(Spellout, "\u{00AD}"), seg(Spellout, "=%spellout-ordinal-feminine=")],
        );
        check(
            "' =%spellout-cardinal-masculine=;",
            &[seg(Spellout, "' "), seg(Spellout, "=%spellout-cardinal-masculine=")],
        );
        check(
            ", =%spellout-cardinal-verbose=;",
            &[seg(Spellout, ", "), seg(Spellout, "=%spellout-cardinal-verbose=")],
        );
    }

    #[test]
    fn soft_hyphen_bracket() {
        check(
            "tjugo[\u{00AD}→→];",
            &[
                seg(Spellout, "tjugo"),
                seg(RightDelim, "[\u{00AD}]"),
                seg(RightSub, "[→→]"),
            ],
        );
    }

    #[test]
    fn bracketed_run_with_words() {
        check(
            "sesenta[ y →→];",
            &[seg(Spellout, "sesenta"), seg(RightDelim, "[ y ]"), seg(RightSub, "[→→]")],
        );
    }

    #[test]
    fn leading_bracket_with_right_arrows() {
        check(
            "[→%spellout-cardinal-masculine→\u{00AD}und\u{00AD}]fünfzig;",
            &[
                seg(LeftSub, "[→%spellout-cardinal-masculine→]"),
                seg(LeftDelim, "[\u{00AD}und\u{00AD}]"),
                seg(Spellout, "fünfzig"),
            ],
        );
    }

    #[test]
    fn spellout_text_after_right_sub() {
        check("→→zehn;", &[seg(RightSub, "→→"), seg(Spellout, "zehn")]);
    }

    #[test]
    fn non_latin_spellout() {
        check("பன்னிரண்டு;", &[seg(Spellout, "பன்னிரண்டு")]);
        check("அறுபது;", &[seg(Spellout, "அறுபது")]);
    }

    #[test]
    fn plural_sigil_forms_its_own_segment() {
        check(
            "←%spellout-cardinal-neuter←$(cardinal,one{tusen}other{tusen})$[ →→];",
            &[
                seg(LeftSub, "←%spellout-cardinal-neuter←"),
                seg(Spellout, "$(cardinal,one{tusen}other{tusen})$"),
                seg(RightDelim, "[ ]"),
                seg(RightSub, "[→→]"),
            ],
        );
    }

    #[test]
    fn numeric_escape_then_plural_sigil() {
        check(
            "=#,##0=$(ordinal,one{st}two{nd}few{rd}other{th})$;",
            &[
                seg(Spellout, "=#,##0="),
                seg(Spellout, "$(ordinal,one{st}two{nd}few{rd}other{th})$"),
            ],
        );
    }

    #[test]
    fn stray_left_arrow_in_spellout_errors() {
        let err = lex("tjugo←←;").unwrap_err();
        assert_eq!(
            err,
            LexError::UnknownInput { expected: SegmentKind::Spellout, rest: "←←;".to_string() }
        );
    }

    #[test]
    fn error_message_carries_remainder() {
        let err = lex("tjugo←rest;").unwrap_err();
        assert_eq!(err.to_string(), "unknown input at expected spellout: '←rest;'");
        assert_eq!(lex("").unwrap_err().to_string(), "premature end of input");
    }

    #[test]
    fn unterminated_escape_is_premature() {
        assert_eq!(lex("=%spellout-numbering"), Err(LexError::PrematureEnd));
        assert_eq!(lex("$(cardinal,one{a}"), Err(LexError::PrematureEnd));
    }
}
