//! The XPath core functions available to mapping expressions.

use crate::datasource::DataSourceNode;
use crate::engine::{EvaluationContext, XPathValue};
use crate::error::XPathError;

/// Dispatches a function call to its implementation.
pub fn call<'a, N>(
    name: &str,
    args: Vec<XPathValue<N>>,
    ctx: &EvaluationContext<N>,
) -> Result<XPathValue<N>, XPathError>
where
    N: DataSourceNode<'a> + 'a,
{
    match name {
        // Node-set
        "position" => no_args(name, &args).map(|_| XPathValue::Number(ctx.position as f64)),
        "last" => no_args(name, &args).map(|_| XPathValue::Number(ctx.size as f64)),
        "count" => match one_arg(name, args)? {
            XPathValue::NodeSet(nodes) => Ok(XPathValue::Number(nodes.len() as f64)),
            _ => Err(not_a_node_set(name)),
        },
        "name" | "local-name" | "namespace-uri" => {
            let name_of = |node: Option<&N>| {
                let Some(node) = node else {
                    return String::new();
                };
                match name {
                    "namespace-uri" => node.namespace_uri().unwrap_or_default().to_string(),
                    "local-name" => node
                        .name()
                        .map(|q| q.local_part.to_string())
                        .unwrap_or_default(),
                    _ => node.name().map(|q| q.to_string()).unwrap_or_default(),
                }
            };
            match optional_arg(name, args)? {
                None => Ok(XPathValue::String(name_of(Some(&ctx.node)))),
                Some(XPathValue::NodeSet(nodes)) => Ok(XPathValue::String(name_of(nodes.first()))),
                Some(_) => Err(not_a_node_set(name)),
            }
        }

        // String
        "string" => Ok(XPathValue::String(string_arg(name, args, ctx)?)),
        "string-length" => {
            let s = string_arg(name, args, ctx)?;
            Ok(XPathValue::Number(s.chars().count() as f64))
        }
        "normalize-space" => {
            let s = string_arg(name, args, ctx)?;
            Ok(XPathValue::String(s.split_whitespace().collect::<Vec<_>>().join(" ")))
        }
        "concat" => {
            if args.len() < 2 {
                return Err(arity(name, "at least 2"));
            }
            Ok(XPathValue::String(args.iter().map(|a| a.to_string()).collect()))
        }
        "contains" | "starts-with" => {
            let [haystack, needle] = two_args(name, args)?;
            let (haystack, needle) = (haystack.to_string(), needle.to_string());
            let found = if name == "contains" {
                haystack.contains(&needle)
            } else {
                haystack.starts_with(&needle)
            };
            Ok(XPathValue::Boolean(found))
        }

        // Boolean
        "not" => Ok(XPathValue::Boolean(!one_arg(name, args)?.to_bool())),
        "boolean" => Ok(XPathValue::Boolean(one_arg(name, args)?.to_bool())),
        "true" => no_args(name, &args).map(|_| XPathValue::Boolean(true)),
        "false" => no_args(name, &args).map(|_| XPathValue::Boolean(false)),

        // Number
        "number" => match optional_arg(name, args)? {
            Some(value) => Ok(XPathValue::Number(value.to_number())),
            None => Ok(XPathValue::Number(
                XPathValue::NodeSet(vec![ctx.node]).to_number(),
            )),
        },
        "sum" => match one_arg(name, args)? {
            XPathValue::NodeSet(nodes) => Ok(XPathValue::Number(
                nodes
                    .iter()
                    .map(|n| XPathValue::<N>::String(n.string_value()).to_number())
                    .sum(),
            )),
            _ => Err(not_a_node_set(name)),
        },

        _ => Err(XPathError::UnknownFunction(name.to_string())),
    }
}

fn arity(function: &str, expected: &str) -> XPathError {
    XPathError::Function {
        function: function.to_string(),
        message: format!("expected {} argument(s)", expected),
    }
}

fn not_a_node_set(function: &str) -> XPathError {
    XPathError::Function {
        function: function.to_string(),
        message: "argument must be a node-set".to_string(),
    }
}

fn no_args<N>(name: &str, args: &[XPathValue<N>]) -> Result<(), XPathError> {
    if args.is_empty() { Ok(()) } else { Err(arity(name, "0")) }
}

fn one_arg<N>(name: &str, args: Vec<XPathValue<N>>) -> Result<XPathValue<N>, XPathError> {
    let [value] = <[XPathValue<N>; 1]>::try_from(args).map_err(|_| arity(name, "1"))?;
    Ok(value)
}

fn two_args<N>(name: &str, args: Vec<XPathValue<N>>) -> Result<[XPathValue<N>; 2], XPathError> {
    <[XPathValue<N>; 2]>::try_from(args).map_err(|_| arity(name, "2"))
}

fn optional_arg<N>(
    name: &str,
    mut args: Vec<XPathValue<N>>,
) -> Result<Option<XPathValue<N>>, XPathError> {
    match args.len() {
        0 => Ok(None),
        1 => Ok(args.pop()),
        _ => Err(arity(name, "0 or 1")),
    }
}

/// The single string argument, defaulting to the context node's string value.
fn string_arg<'a, N>(
    name: &str,
    args: Vec<XPathValue<N>>,
    ctx: &EvaluationContext<N>,
) -> Result<String, XPathError>
where
    N: DataSourceNode<'a> + 'a,
{
    Ok(match optional_arg(name, args)? {
        Some(value) => value.to_string(),
        None => ctx.node.string_value(),
    })
}

#[cfg(test)]
mod tests {
    use crate::datasource::xml::XmlDocument;
    use crate::engine::{EvaluationContext, evaluate};
    use crate::error::XPathError;
    use crate::parser::parse_expression;

    #[test]
    fn test_string_functions() {
        let xml = r#"<staff dep_name="Admin"><d>  Admin   Admin </d></staff>"#;
        let doc = XmlDocument::parse(xml).unwrap();
        let ctx = EvaluationContext::new(doc.root_element());
        let eval = |xpath: &str| evaluate(&parse_expression(xpath).unwrap(), &ctx).unwrap();

        assert_eq!(eval("string-length(@dep_name)").to_number(), 5.0);
        assert_eq!(eval("normalize-space(d)").to_string(), "Admin Admin");
        assert_eq!(eval("concat(@dep_name, '-', 1)").to_string(), "Admin-1");
        assert!(eval("starts-with(@dep_name, 'Ad')").to_bool());
        assert!(!eval("contains(d, 'Math')").to_bool());
        assert_eq!(eval("local-name()").to_string(), "staff");
    }

    #[test]
    fn test_function_errors() {
        let doc = XmlDocument::parse("<a/>").unwrap();
        let ctx = EvaluationContext::new(doc.root_element());
        let eval = |xpath: &str| evaluate(&parse_expression(xpath).unwrap(), &ctx);

        assert!(matches!(eval("count('x')"), Err(XPathError::Function { .. })));
        assert!(matches!(eval("position(1)"), Err(XPathError::Function { .. })));
        assert_eq!(
            eval("frobnicate()"),
            Err(XPathError::UnknownFunction("frobnicate".to_string()))
        );
    }

    #[test]
    fn test_name_keeps_prefix() {
        let doc = XmlDocument::parse(r#"<x:staff xmlns:x="urn:x" x:id="1"/>"#).unwrap();
        let ctx = EvaluationContext::new(doc.root_element());
        let eval = |xpath: &str| evaluate(&parse_expression(xpath).unwrap(), &ctx).unwrap();

        assert_eq!(eval("name()").to_string(), "x:staff");
        assert_eq!(eval("local-name()").to_string(), "staff");
        assert_eq!(eval("namespace-uri()").to_string(), "urn:x");
        assert_eq!(eval("name(@x:id)").to_string(), "x:id");
        assert_eq!(eval("local-name(@*)").to_string(), "id");
    }
}
