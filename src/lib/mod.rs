//! Build library for an essay site that treats every link as an annotated
//! citation. Documents are parsed into a typed AST, decorated by an ordered
//! sequence of rewrite passes (annotation popups, link archiving, typography,
//! self-linking headers), and emitted together with one standalone HTML
//! fragment per annotation.

pub mod archive;
pub mod ast;
pub mod clean;
pub mod config;
pub mod fragment;
pub mod header;
pub mod ident;
pub mod metadata;
pub mod pipeline;
pub mod scrape;
pub mod transformer;
pub mod types;
pub mod utils;
