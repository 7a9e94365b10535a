//! Parser implementation using chumsky

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use crate::language::{
    AbstractLayout, BoundLayout, CyclicLayout, GroupingLayout, LayoutBody, PredSelector, Selector,
    SelectorVariable, Separation, Untagged,
};
use crate::parser::lexer::{lex, Token};

/// Parse a layout program: a sequence of `IF ... THEN ...` rules
pub fn parse_program(input: &str) -> Result<Vec<AbstractLayout>, Vec<crate::ParseError>> {
    let len = input.len();

    let tokens = lex(input)?;
    let token_iter = tokens.into_iter().map(|(tok, span)| (tok, span.into()));

    // Split (Token, SimpleSpan) into token and span parts
    let token_stream = Stream::from_iter(token_iter).map((len..len).into(), |(t, s): (_, _)| (t, s));

    program_parser()
        .parse(token_stream)
        .into_result()
        .map_err(|errs| errs.into_iter().map(|e| e.into()).collect())
}

fn program_parser<'a, I>() -> impl Parser<'a, I, Vec<AbstractLayout>, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    let identifier = select! {
        Token::Ident(s) => s,
    }
    .labelled("identifier");

    let variable = identifier.clone().map(SelectorVariable::new);

    let number = select! {
        Token::Number(n) => n,
    }
    .labelled("number");

    // v : Sig
    let sig_selector = identifier
        .clone()
        .then_ignore(just(Token::Colon))
        .then(identifier.clone())
        .map(|(varname, sig)| Selector::sig(varname, sig));

    // pred(v0, v1, ...)
    let pred_selector = identifier
        .clone()
        .then(
            identifier
                .clone()
                .separated_by(just(Token::Comma))
                .collect::<Vec<_>>()
                .delimited_by(just(Token::ParenOpen), just(Token::ParenClose)),
        )
        .map(|(pred, args)| Selector::PredSelector(PredSelector { pred, args }));

    let selector = choice((sig_selector, pred_selector));

    // (separation at least N) | (separation exactly N)
    let separation = just(Token::Separation)
        .ignore_then(choice((
            just(Token::At)
                .then(just(Token::Least))
                .ignore_then(number.clone())
                .map(|distance| Separation::AtLeast { distance }),
            just(Token::Exactly)
                .ignore_then(number.clone())
                .map(|distance| Separation::Exact { distance }),
        )))
        .delimited_by(just(Token::ParenOpen), just(Token::ParenClose))
        .or_not()
        .map(Option::unwrap_or_default);

    let option_binary = select! { Token::Binary(o) => o };
    let option_unary = select! { Token::Unary(o) => o };
    let option_cyclic = select! { Token::Cyclic(o) => o };

    let cyclic = just(Token::Cycle)
        .ignore_then(variable.clone())
        .then(option_cyclic)
        .then(variable.clone())
        .map(|((op0, option), op1)| {
            BoundLayout::CyclicLayout(CyclicLayout {
                option,
                op0,
                op1,
                cycle_id: Untagged,
            })
        });

    let grouping = just(Token::Group).ignore_then(variable.clone()).map(|op| {
        BoundLayout::GroupingLayout(GroupingLayout {
            op,
            group_id: Untagged,
        })
    });

    let binary = variable
        .clone()
        .then(option_binary)
        .then(variable.clone())
        .then(separation.clone())
        .map(|(((op0, option), op1), sep)| {
            BoundLayout::binary(option, op0, op1).with_separation(sep)
        });

    let unary = variable
        .clone()
        .then(option_unary)
        .then(separation)
        .map(|((op, option), sep)| BoundLayout::unary(option, op).with_separation(sep));

    let terminal = choice((cyclic, grouping, binary, unary)).labelled("layout");

    let rule = recursive(|rule| {
        just(Token::If)
            .ignore_then(selector)
            .then_ignore(just(Token::Then))
            .then(choice((
                rule.map(|inner| LayoutBody::Nested(Box::new(inner))),
                terminal.map(LayoutBody::Terminal),
            )))
            .map(|(selector, layout)| AbstractLayout { selector, layout })
    });

    rule.repeated().collect().then_ignore(end()).boxed()
}
