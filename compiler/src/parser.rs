// Parser for type definition source files.
//
// Parses a token stream (from the lexer) into a list of `TypeDef`s. Uses
// chumsky combinators. Grammar:
//
//   file     := typedef*
//   typedef  := "type" params? IDENT annot* "=" expr
//   params   := TVAR | "(" TVAR ("," TVAR)* ")"
//   expr     := atom (IDENT | annot)*
//   atom     := TVAR | IDENT | sum | record | "(" expr ("," expr)+ ")" IDENT
//             | "(" expr ("*" expr)* ")"
//   sum      := "[" "|"? variant ("|" variant)* "]"
//   variant  := IDENT ("of" expr)?
//   record   := "{" (field (";" field)* ";"?)? "}"
//   field    := IDENT ":" expr | "inherit" expr
//   annot    := "<" IDENT (IDENT ("=" STRING)?)+ ">"
//
// Preconditions: input is a valid token stream from `lexer::lex()`.
// Postconditions: returns definitions with normalized bodies plus any parse
//   errors (non-fatal).
// Failure modes: syntax errors produce `Rich` diagnostics.
// Side effects: none.

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;
use chumsky::span::SimpleSpan;

use crate::ast::{Annot, Annots, FieldItem, TypeDef, TypeExpr, Variant};
use crate::lexer::Token;

/// A parsed definition together with its source location.
#[derive(Debug, Clone, PartialEq)]
pub struct DefItem {
    pub def: TypeDef,
    pub span: SimpleSpan,
}

/// Result of parsing: definitions plus any errors.
#[derive(Debug)]
pub struct ParseResult {
    pub items: Option<Vec<DefItem>>,
    pub errors: Vec<Rich<'static, Token, SimpleSpan>>,
}

/// Parse a source string. Lexes then parses.
///
/// Returns the definitions (if parsing succeeded) plus any errors.
pub fn parse(source: &str) -> ParseResult {
    let lex_result = crate::lexer::lex(source);
    let len = source.len();

    // Convert lexer output to chumsky stream.
    let token_iter = lex_result.tokens.into_iter().map(|(tok, span)| {
        let cspan: SimpleSpan = (span.start..span.end).into();
        (tok, cspan)
    });
    let eoi: SimpleSpan = (len..len).into();
    let stream = Stream::from_iter(token_iter).map(eoi, |(t, s): (_, _)| (t, s));

    let parser = file_parser(source);
    let (items, parse_errors) = parser.parse(stream).into_output_errors();

    // Merge lex errors + parse errors.
    let mut all_errors: Vec<Rich<'static, Token, SimpleSpan>> = lex_result
        .errors
        .into_iter()
        .map(|e| {
            let span: SimpleSpan = (e.span.start..e.span.end).into();
            Rich::custom(span, e.message)
        })
        .collect();
    all_errors.extend(parse_errors.into_iter().map(|e| e.into_owned()));

    ParseResult {
        items,
        errors: all_errors,
    }
}

/// Postfix operators applied left to right after an atom.
enum Postfix {
    Apply(String),
    Annotate(Vec<Annot>),
}

// ── Main parser builder ──
//
// All grammar rules are built inside `file_parser` so that the `source`
// reference is captured once and shared by all combinators.

fn file_parser<'tokens, 'src: 'tokens, I>(
    source: &'src str,
) -> impl Parser<'tokens, I, Vec<DefItem>, extra::Err<Rich<'tokens, Token, SimpleSpan>>> + 'src
where
    'tokens: 'src,
    I: ValueInput<'tokens, Token = Token, Span = SimpleSpan>,
{
    // ── Identifier ──

    let ident = just(Token::Ident).map_with(move |_, e| {
        let span: SimpleSpan = e.span();
        source[span.start()..span.end()].to_string()
    });

    let tvar = select! { Token::TypeVar(v) => v };

    // ── Annotation ──

    let annot_value = just(Token::Equals).ignore_then(select! { Token::StringLit(s) => s });

    let annotation = ident
        .clone()
        .then(
            ident
                .clone()
                .then(annot_value.or_not())
                .repeated()
                .at_least(1)
                .collect::<Vec<_>>(),
        )
        .delimited_by(just(Token::Lt), just(Token::Gt))
        .map(|(section, fields)| {
            fields
                .into_iter()
                .map(|(key, value)| Annot::new(section.clone(), key, value.as_deref()))
                .collect::<Vec<_>>()
        });

    // ── Type expression ──

    let type_expr = recursive(|expr| {
        let var = tvar.clone().map(TypeExpr::var);
        let name_ref = ident.clone().map(TypeExpr::atom);

        let variant = ident
            .clone()
            .then(just(Token::Of).ignore_then(expr.clone()).or_not())
            .map(|(tag, payload)| Variant { tag, payload });
        let sum = just(Token::Pipe)
            .or_not()
            .ignore_then(
                variant
                    .separated_by(just(Token::Pipe))
                    .collect::<Vec<_>>(),
            )
            .delimited_by(just(Token::LBracket), just(Token::RBracket))
            .map(TypeExpr::sum);

        let field = ident
            .clone()
            .then_ignore(just(Token::Colon))
            .then(expr.clone())
            .map(|(label, ty)| FieldItem::Field { label, ty });
        let inherit = just(Token::Inherit)
            .ignore_then(expr.clone())
            .map(|ty| FieldItem::Inherit { ty });
        let record = choice((inherit, field))
            .separated_by(just(Token::Semi))
            .allow_trailing()
            .collect::<Vec<_>>()
            .delimited_by(just(Token::LBrace), just(Token::RBrace))
            .map(TypeExpr::record);

        // `(a, b) t`: must be tried before the grouped/tuple form.
        let multi_app = expr
            .clone()
            .separated_by(just(Token::Comma))
            .at_least(2)
            .collect::<Vec<_>>()
            .delimited_by(just(Token::LParen), just(Token::RParen))
            .then(ident.clone())
            .map(|(args, name)| TypeExpr::named(name, args));

        let tuple_or_group = expr
            .clone()
            .separated_by(just(Token::Star))
            .at_least(1)
            .collect::<Vec<_>>()
            .delimited_by(just(Token::LParen), just(Token::RParen))
            .map(|mut items: Vec<TypeExpr>| {
                if items.len() == 1 {
                    items.remove(0)
                } else {
                    TypeExpr::tuple(items)
                }
            });

        let atom = choice((var, name_ref, sum, record, multi_app, tuple_or_group));

        let postfix = choice((
            ident.clone().map(Postfix::Apply),
            annotation.clone().map(Postfix::Annotate),
        ));

        atom.then(postfix.repeated().collect::<Vec<_>>())
            .map(|(head, ops)| {
                ops.into_iter().fold(head, |lhs, op| match op {
                    Postfix::Apply(name) => TypeExpr::named(name, vec![lhs]),
                    Postfix::Annotate(annots) => {
                        let mut lhs = lhs;
                        for annot in annots {
                            lhs.annots_mut().insert(annot);
                        }
                        lhs
                    }
                })
            })
    });

    // ── Definition ──

    let params = choice((
        tvar.clone().map(|v| vec![v]),
        tvar.clone()
            .separated_by(just(Token::Comma))
            .at_least(1)
            .collect::<Vec<_>>()
            .delimited_by(just(Token::LParen), just(Token::RParen)),
    ))
    .or_not()
    .map(Option::unwrap_or_default);

    let typedef = just(Token::Type)
        .ignore_then(params)
        .then(ident)
        .then(annotation.repeated().collect::<Vec<_>>())
        .then_ignore(just(Token::Equals))
        .then(type_expr)
        .map_with(|(((params, name), annots), body), e| DefItem {
            def: TypeDef {
                name,
                params,
                annots: annots.into_iter().flatten().collect::<Annots>(),
                body: body.normalize(),
            },
            span: e.span(),
        });

    typedef.repeated().collect::<Vec<_>>()
}

// ── Tests ──
