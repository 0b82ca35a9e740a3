// tdmono — Type definition monomorphizer
//
// Library root. Front end (lexer, parser, check), expansion engine
// (algebra, naming, table, expand) and presentation (standardize, printer).

pub mod algebra;
pub mod ast;
pub mod check;
pub mod config;
pub mod diag;
pub mod expand;
pub mod id;
pub mod lexer;
pub mod naming;
pub mod parser;
pub mod pass;
pub mod pipeline;
pub mod predef;
pub mod printer;
pub mod standardize;
pub mod table;
