// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Literal placeholder substitution over a fixed token vocabulary.
//!
//! Substitution is a single left-to-right pass: at each position the longest
//! spelling that matches is replaced and scanning resumes after it, so
//! replacement values are never rescanned.

use std::collections::HashMap;

/// What a placeholder stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    OriginalText,
    Style,
    NovelType,
    Outline,
    Plot,
    CharacterDesign,
    MainCharacters,
    World,
    LengthClass,
}

/// Every recognised spelling and the token it denotes.
pub const VOCABULARY: &[(&str, Token)] = &[
    ("{ORIGINAL_PARAGRAPH}", Token::OriginalText),
    ("{ORIGINAL_TEXT}", Token::OriginalText),
    ("{STYLE}", Token::Style),
    ("[STYLE]", Token::Style),
    ("{novel_type}", Token::NovelType),
    ("[TYPE]", Token::NovelType),
    ("{outline}", Token::Outline),
    ("{STORY_INFO}", Token::Outline),
    ("{plot}", Token::Plot),
    ("{character_design}", Token::CharacterDesign),
    ("{CHARACTER_INFO}", Token::CharacterDesign),
    ("{main_characters_profile}", Token::MainCharacters),
    ("{world}", Token::World),
    ("{SHORT/ MID/ LONG}", Token::LengthClass),
    ("[SHORT / MID / LONG]", Token::LengthClass),
];

/// Concrete values for one substitution.  Tokens without a value become
/// the sentinel.
#[derive(Debug, Clone)]
pub struct Values {
    values: HashMap<Token, String>,
    sentinel: String,
}

impl Values {
    pub fn new(sentinel: impl Into<String>) -> Self {
        Self {
            values: HashMap::new(),
            sentinel: sentinel.into(),
        }
    }

    pub fn with(mut self, token: Token, value: impl Into<String>) -> Self {
        self.values.insert(token, value.into());
        self
    }

    pub fn get(&self, token: Token) -> &str {
        self.values
            .get(&token)
            .map(String::as_str)
            .unwrap_or(&self.sentinel)
    }
}

fn longest_match(rest: &str) -> Option<(&'static str, Token)> {
    VOCABULARY
        .iter()
        .filter(|(spelling, _)| rest.starts_with(spelling))
        .max_by_key(|(spelling, _)| spelling.len())
        .copied()
}

pub fn apply(template: &str, values: &Values) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(pos) = rest.find(['{', '[']) {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        match longest_match(rest) {
            Some((spelling, token)) => {
                out.push_str(values.get(token));
                rest = &rest[spelling.len()..];
            }
            None => {
                // '{' and '[' are one byte
                out.push_str(&rest[..1]);
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// True if any recognised spelling survives in `text`.
pub fn has_unresolved(text: &str) -> bool {
    VOCABULARY.iter().any(|(spelling, _)| text.contains(spelling))
}
