//! Parser bridge contract and GML identifier rules

use std::path::Path;

use crate::symbol::SymbolRef;

/// Location-to-symbol resolution supplied by the language frontend
pub trait ParserBridge: Send + Sync {
    /// Resolve the symbol whose identifier covers `offset` in `file_path`
    fn find_symbol_at_offset(&self, file_path: &Path, offset: usize) -> Option<SymbolRef>;

    /// Whether `name` is a legal identifier for a renamed symbol.
    /// The default enforces GML lexical rules and rejects reserved words.
    fn is_valid_identifier(&self, name: &str) -> bool {
        is_valid_gml_identifier(name)
    }
}

/// Check `name` against GML identifier syntax: an ASCII letter or
/// underscore followed by letters, digits, or underscores, and not a
/// reserved word.
pub fn is_valid_gml_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !first.is_ascii_alphabetic() && first != '_' {
        return false;
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return false;
    }
    !is_gml_keyword(name)
}

/// GML reserved words that can never name a symbol
pub fn is_gml_keyword(word: &str) -> bool {
    matches!(
        word,
        "if" | "else"
            | "while"
            | "do"
            | "until"
            | "for"
            | "repeat"
            | "switch"
            | "case"
            | "default"
            | "break"
            | "continue"
            | "exit"
            | "return"
            | "with"
            | "var"
            | "globalvar"
            | "enum"
            | "function"
            | "begin"
            | "end"
            | "mod"
            | "div"
            | "not"
            | "and"
            | "or"
            | "xor"
            | "true"
            | "false"
            | "self"
            | "other"
            | "all"
            | "noone"
            | "global"
            | "undefined"
            | "static"
            | "new"
            | "delete"
            | "try"
            | "catch"
            | "finally"
            | "throw"
            | "constructor"
    )
}
