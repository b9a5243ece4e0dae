//! # tsenv Lexer
//!
//! Tokenizer for TypeScript declaration syntax. Tokens record whether a
//! line break precedes them so the parser can apply automatic semicolon
//! insertion.

pub mod token;
pub mod lexer;

// Re-export all public types from modules
pub use token::{Token, TokenKind};
pub use lexer::{parse_number_literal, Lexer};
