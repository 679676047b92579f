//! A `nom`-based parser for the XPath subset used by mapping rules.

use super::ast::*;
use crate::error::XPathError;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{char, digit0, digit1, multispace0},
    combinator::{map, map_res, not, opt, peek, recognize},
    multi::{many0, separated_list0},
    sequence::{delimited, pair, preceded, terminated},
};

pub fn parse_expression(input: &str) -> Result<Expression, XPathError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(XPathError::Parse(
            input.to_string(),
            "empty expression".to_string(),
        ));
    }
    match expression(trimmed) {
        Ok(("", expr)) => Ok(expr),
        Ok((rem, _)) => Err(XPathError::Parse(
            input.to_string(),
            format!("unexpected input at '{}'", rem),
        )),
        Err(e) => Err(XPathError::Parse(input.to_string(), e.to_string())),
    }
}

fn ws<'a, F, O, E>(inner: F) -> impl Parser<&'a str, Output = O, Error = E>
where
    F: Parser<&'a str, Output = O, Error = E>,
    E: nom::error::ParseError<&'a str>,
{
    delimited(multispace0, inner, multispace0)
}

/// Left-associative chain of `sub (op sub)*`.
fn binary_chain<'a, F, G>(
    sub_expr: F,
    op: G,
) -> impl FnMut(&'a str) -> IResult<&'a str, Expression>
where
    F: Parser<&'a str, Output = Expression, Error = nom::error::Error<&'a str>> + Clone,
    G: Parser<&'a str, Output = BinaryOperator, Error = nom::error::Error<&'a str>> + Clone,
{
    move |input: &'a str| {
        let (input, mut left) = sub_expr.clone().parse(input)?;
        let (input, rest) = many0(pair(ws(op.clone()), sub_expr.clone())).parse(input)?;
        for (op, right) in rest {
            left = Expression::BinaryOp {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }
        Ok((input, left))
    }
}

fn expression(input: &str) -> IResult<&str, Expression> {
    or_expr(input)
}

/// Keyword operators must not swallow the start of a name such as `order`.
fn keyword<'a>(
    word: &'static str,
) -> impl Parser<&'a str, Output = &'a str, Error = nom::error::Error<&'a str>> {
    terminated(tag(word), not(take_while1(is_name_char)))
}

fn or_op(input: &str) -> IResult<&str, BinaryOperator> {
    map(keyword("or"), |_| BinaryOperator::Or).parse(input)
}

fn and_op(input: &str) -> IResult<&str, BinaryOperator> {
    map(keyword("and"), |_| BinaryOperator::And).parse(input)
}

fn equality_op(input: &str) -> IResult<&str, BinaryOperator> {
    alt((
        map(tag("!="), |_| BinaryOperator::NotEquals),
        map(tag("="), |_| BinaryOperator::Equals),
    ))
    .parse(input)
}

fn relational_op(input: &str) -> IResult<&str, BinaryOperator> {
    alt((
        map(tag("<="), |_| BinaryOperator::LessThanOrEqual),
        map(tag("&lt;="), |_| BinaryOperator::LessThanOrEqual),
        map(tag(">="), |_| BinaryOperator::GreaterThanOrEqual),
        map(tag("&gt;="), |_| BinaryOperator::GreaterThanOrEqual),
        map(tag("<"), |_| BinaryOperator::LessThan),
        map(tag("&lt;"), |_| BinaryOperator::LessThan),
        map(tag(">"), |_| BinaryOperator::GreaterThan),
        map(tag("&gt;"), |_| BinaryOperator::GreaterThan),
    ))
    .parse(input)
}

fn union_op(input: &str) -> IResult<&str, BinaryOperator> {
    map(char('|'), |_| BinaryOperator::Union).parse(input)
}

fn or_expr(input: &str) -> IResult<&str, Expression> {
    binary_chain(and_expr, or_op)(input)
}

fn and_expr(input: &str) -> IResult<&str, Expression> {
    binary_chain(equality_expr, and_op)(input)
}

fn equality_expr(input: &str) -> IResult<&str, Expression> {
    binary_chain(relational_expr, equality_op)(input)
}

fn relational_expr(input: &str) -> IResult<&str, Expression> {
    binary_chain(union_expr, relational_op)(input)
}

fn union_expr(input: &str) -> IResult<&str, Expression> {
    binary_chain(path_expr, union_op)(input)
}

fn path_expr(input: &str) -> IResult<&str, Expression> {
    // Primary expressions go first so that `last()` is not read as a step named `last`.
    ws(alt((primary_expr, map(location_path, Expression::LocationPath)))).parse(input)
}

fn primary_expr(input: &str) -> IResult<&str, Expression> {
    alt((
        map(number, Expression::Number),
        map(string_literal, Expression::Literal),
        function_call,
        delimited(ws(char('(')), expression, ws(char(')'))),
    ))
    .parse(input)
}

fn number(input: &str) -> IResult<&str, f64> {
    map_res(
        recognize(alt((
            recognize(pair(opt(char('-')), pair(digit1, opt(pair(char('.'), digit0))))),
            recognize(pair(opt(char('-')), pair(char('.'), digit1))),
        ))),
        |s: &str| s.parse::<f64>(),
    )
    .parse(input)
}

fn string_literal(input: &str) -> IResult<&str, String> {
    map(
        alt((
            delimited(char('\''), take_while(|c| c != '\''), char('\'')),
            delimited(char('"'), take_while(|c| c != '"'), char('"')),
        )),
        |s: &str| s.to_string(),
    )
    .parse(input)
}

fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-' || c == '.'
}

fn nc_name(input: &str) -> IResult<&str, &str> {
    recognize(pair(take_while1(is_name_start), take_while(is_name_char))).parse(input)
}

/// A name with an optional `prefix:`; a following `::` belongs to an axis, not a prefix.
fn q_name(input: &str) -> IResult<&str, (Option<&str>, &str)> {
    let (i, first) = nc_name(input)?;
    match prefixed_local(i) {
        Ok((rest, local)) => Ok((rest, (Some(first), local))),
        Err(_) => Ok((i, (None, first))),
    }
}

fn prefixed_local(input: &str) -> IResult<&str, &str> {
    preceded(pair(char(':'), not(char(':'))), nc_name).parse(input)
}

const NODE_TYPE_NAMES: [&str; 4] = ["text", "node", "comment", "processing-instruction"];

fn node_type_test(input: &str) -> IResult<&str, NodeTest> {
    map(
        terminated(
            alt((
                tag("processing-instruction"),
                tag("comment"),
                tag("text"),
                tag("node"),
            )),
            pair(ws(char('(')), char(')')),
        ),
        |name: &str| match name {
            "text" => NodeTest::NodeType(NodeTypeTest::Text),
            "comment" => NodeTest::NodeType(NodeTypeTest::Comment),
            "processing-instruction" => NodeTest::NodeType(NodeTypeTest::ProcessingInstruction),
            _ => NodeTest::NodeType(NodeTypeTest::Node),
        },
    )
    .parse(input)
}

fn node_test(input: &str) -> IResult<&str, NodeTest> {
    alt((
        map(char('*'), |_| NodeTest::Wildcard),
        node_type_test,
        map(q_name, |(prefix, local)| NodeTest::Name {
            prefix: prefix.map(str::to_string),
            local: local.to_string(),
        }),
    ))
    .parse(input)
}

fn axis(input: &str) -> IResult<&str, Axis> {
    map(
        terminated(
            alt((
                tag("ancestor-or-self"),
                tag("ancestor"),
                tag("attribute"),
                tag("child"),
                tag("descendant-or-self"),
                tag("descendant"),
                tag("following-sibling"),
                tag("following"),
                tag("parent"),
                tag("preceding-sibling"),
                tag("preceding"),
                tag("self"),
            )),
            tag("::"),
        ),
        |name: &str| match name {
            "ancestor-or-self" => Axis::AncestorOrSelf,
            "ancestor" => Axis::Ancestor,
            "attribute" => Axis::Attribute,
            "descendant-or-self" => Axis::DescendantOrSelf,
            "descendant" => Axis::Descendant,
            "following-sibling" => Axis::FollowingSibling,
            "following" => Axis::Following,
            "parent" => Axis::Parent,
            "preceding-sibling" => Axis::PrecedingSibling,
            "preceding" => Axis::Preceding,
            "self" => Axis::SelfAxis,
            _ => Axis::Child,
        },
    )
    .parse(input)
}

fn predicate(input: &str) -> IResult<&str, Expression> {
    delimited(ws(char('[')), expression, ws(char(']'))).parse(input)
}

fn abbreviated_step(input: &str) -> IResult<&str, Step> {
    let (i, axis) = alt((
        map(tag(".."), |_| Axis::Parent),
        map(terminated(char('.'), not(digit1)), |_| Axis::SelfAxis),
    ))
    .parse(input)?;
    Ok((
        i,
        Step {
            axis,
            node_test: NodeTest::NodeType(NodeTypeTest::Node),
            predicates: vec![],
        },
    ))
}

fn step(input: &str) -> IResult<&str, Step> {
    if let Ok(parsed) = abbreviated_step(input) {
        return Ok(parsed);
    }

    let (i, (axis, node_test)) = alt((
        map(preceded(char('@'), node_test), |nt| (Axis::Attribute, nt)),
        map(pair(opt(axis), node_test), |(ax, nt)| {
            (ax.unwrap_or(Axis::Child), nt)
        }),
    ))
    .parse(input)?;
    let (i, predicates) = many0(predicate).parse(i)?;
    Ok((
        i,
        Step {
            axis,
            node_test,
            predicates,
        },
    ))
}

fn separator(input: &str) -> IResult<&str, &str> {
    alt((tag("//"), tag("/"))).parse(input)
}

fn location_path(input: &str) -> IResult<&str, LocationPath> {
    let (i, lead) = opt(separator).parse(input)?;
    let mut steps = Vec::new();
    let i = match lead {
        Some("//") => {
            let (i, first) = step(i)?;
            steps.push(Step::descendant_or_self());
            steps.push(first);
            i
        }
        Some(_) => match step(i) {
            Ok((i, first)) => {
                steps.push(first);
                i
            }
            // A lone `/` selects the root.
            Err(_) => return Ok((i, LocationPath { is_absolute: true, steps })),
        },
        None => {
            let (i, first) = step(i)?;
            steps.push(first);
            i
        }
    };

    let (i, rest) = many0(pair(separator, step)).parse(i)?;
    for (sep, next) in rest {
        if sep == "//" {
            steps.push(Step::descendant_or_self());
        }
        steps.push(next);
    }

    Ok((
        i,
        LocationPath {
            is_absolute: lead.is_some(),
            steps,
        },
    ))
}

fn function_call(input: &str) -> IResult<&str, Expression> {
    let (i, (prefix, local)) = q_name(input)?;
    let (i, _) = peek(ws(char('('))).parse(i)?;
    if prefix.is_none() && NODE_TYPE_NAMES.contains(&local) {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Verify,
        )));
    }
    let name = match prefix {
        Some(p) => format!("{}:{}", p, local),
        None => local.to_string(),
    };
    let (i, _) = multispace0(i)?;
    let (i, args) = delimited(
        char('('),
        separated_list0(ws(char(',')), expression),
        ws(char(')')),
    )
    .parse(i)?;
    Ok((i, Expression::FunctionCall { name, args }))
}
