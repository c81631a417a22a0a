//! Identifier sanitisation for generated code
//!
//! [`to_valid_string`] is a pure function of its input: it turns any name the
//! engine produced into something that can be emitted as a C++ type or member
//! identifier. It never fails and applying it twice changes nothing.
//!
//! Length-changing rules, in order:
//! - an empty name becomes [`EMPTY_NAME`]
//! - a leading ASCII digit is spelled out (`3DWidget` -> `ThreeDWidget`)
//! - `+ - * /` are spelled out (`Plus`, `Minus`, `Star`, `Slash`)
//! - a result equal to a reserved word is replaced wholesale (see [`RESERVED_WORDS`])
//!
//! Every other character that may not continue an identifier is replaced
//! by `_` one-for-one, as is a leading character that may not start one.
//! A leading lowercase ASCII letter other than `b` is upper-cased (`b`
//! marks booleans).

use unicode_xid::UnicodeXID;

/// Replacement for an empty name
pub const EMPTY_NAME: &str = "Unnamed";

/// Names that clash with keywords or macros in the generated SDK
pub const RESERVED_WORDS: &[(&str, &str)] = &[
    ("bool", "Bool"),
    ("break", "Break"),
    ("bitand", "Bitand"),
    ("bitor", "Bitor"),
    ("TRUE", "TRUEVal"),
    ("FALSE", "FALSEVal"),
    ("NULL", "NULLVal"),
];

const DIGIT_WORDS: [&str; 10] = [
    "Zero", "One", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight", "Nine",
];

/// Make `raw` safe to emit as an identifier
pub fn to_valid_string(raw: &str) -> String {
    let mut chars = raw.chars();

    let Some(first) = chars.next() else {
        return EMPTY_NAME.to_string();
    };

    let mut valid = String::with_capacity(raw.len() + 4);

    match first {
        '0'..='9' => valid.push_str(DIGIT_WORDS[(first as u8 - b'0') as usize]),
        'a'..='z' if first != 'b' => valid.push(first.to_ascii_uppercase()),
        '+' | '-' | '*' | '/' => push_sanitized(&mut valid, first),
        c if c == '_' || c.is_xid_start() => valid.push(c),
        _ => valid.push('_'),
    }

    for c in chars {
        push_sanitized(&mut valid, c);
    }

    // matched on the sanitised form so a second pass finds nothing new
    match RESERVED_WORDS.iter().find(|(word, _)| *word == valid) {
        Some(&(_, replacement)) => replacement.to_string(),
        None => valid,
    }
}

/// Convenience for callers holding the raw UTF-16 form
pub fn to_valid_string_wide(raw: &[u16]) -> String {
    to_valid_string(&String::from_utf16_lossy(raw))
}

/// Whether `name` is already a valid identifier that sanitisation leaves alone
pub fn is_valid_identifier(name: &str) -> bool {
    to_valid_string(name) == name
}

fn push_sanitized(out: &mut String, c: char) {
    match c {
        '+' => out.push_str("Plus"),
        '-' => out.push_str("Minus"),
        '*' => out.push_str("Star"),
        '/' => out.push_str("Slash"),
        c if c.is_xid_continue() => out.push(c),
        _ => out.push('_'),
    }
}
