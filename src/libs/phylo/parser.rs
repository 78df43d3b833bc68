use super::error::TreeError;
use super::node::{NodeId, MAX_CHILDREN};
use super::tree::Tree;
use nom::{
    branch::alt,
    bytes::complete::{is_not, take_while},
    character::complete::{char, digit1, multispace0},
    combinator::{cut, map, map_res, opt, recognize},
    error::{context, ContextError, ErrorKind, FromExternalError, ParseError},
    multi::separated_list1,
    sequence::{delimited, preceded},
    IResult, Offset, Parser,
};
use std::collections::BTreeMap;

/// Deepest nesting of parentheses accepted in a tree description
pub const MAX_TREE_DEPTH: usize = 256;

/// Marker placed before the label of the designated ancestor: `(A,B)@anc`
pub const ANCESTOR_MARKER: char = '@';

const DEPTH_CONTEXT: &str = "nesting depth";

// ================================================================================================
// Error Handling Structures
// ================================================================================================

#[derive(Clone, Debug, PartialEq)]
pub enum DetailedErrorKind {
    Context(&'static str),
    Nom(ErrorKind),
}

/// A custom error type for nom that accumulates context and error kinds.
#[derive(Clone, Debug, PartialEq)]
pub struct DetailedError<'a> {
    pub errors: Vec<(&'a str, DetailedErrorKind)>,
}

impl<'a> ParseError<&'a str> for DetailedError<'a> {
    fn from_error_kind(input: &'a str, kind: ErrorKind) -> Self {
        DetailedError {
            errors: vec![(input, DetailedErrorKind::Nom(kind))],
        }
    }

    fn append(input: &'a str, kind: ErrorKind, mut other: Self) -> Self {
        other.errors.push((input, DetailedErrorKind::Nom(kind)));
        other
    }
}

impl<'a> ContextError<&'a str> for DetailedError<'a> {
    fn add_context(input: &'a str, ctx: &'static str, mut other: Self) -> Self {
        other.errors.push((input, DetailedErrorKind::Context(ctx)));
        other
    }
}

impl<'a, E> FromExternalError<&'a str, E> for DetailedError<'a> {
    fn from_external_error(input: &'a str, kind: ErrorKind, _e: E) -> Self {
        DetailedError {
            errors: vec![(input, DetailedErrorKind::Nom(kind))],
        }
    }
}

// ================================================================================================
// Intermediate Structure
// ================================================================================================

/// `ParsedNode` is a temporary recursive structure used during parsing.
/// After parsing is complete, it is converted into the flat, arena-based `Tree`
/// via the `to_tree` method.
#[derive(Debug)]
struct ParsedNode {
    name: Option<String>,
    ancestor: bool,
    length: Option<f64>,
    properties: Option<BTreeMap<String, String>>,
    children: Vec<ParsedNode>,
}

impl ParsedNode {
    fn new() -> Self {
        Self {
            name: None,
            ancestor: false,
            length: None,
            properties: None,
            children: Vec::new(),
        }
    }

    /// Converts this recursive `ParsedNode` into nodes in the provided `Tree` arena.
    ///
    /// Unnamed nodes are labelled `IN1`, `IN2`, ... in the order their subtrees close.
    /// IDs of nodes carrying the ancestor marker are collected into `marked`.
    fn to_tree(
        self,
        tree: &mut Tree,
        unnamed: &mut usize,
        marked: &mut Vec<NodeId>,
    ) -> Result<NodeId, TreeError> {
        if self.children.len() > MAX_CHILDREN {
            return Err(TreeError::LogicError(format!(
                "Node {} has {} children, only binary trees are supported",
                self.name.as_deref().unwrap_or("(unnamed)"),
                self.children.len()
            )));
        }

        let id = tree.add_node();
        for child in self.children {
            let child_id = child.to_tree(tree, unnamed, marked)?;
            tree.add_child(id, child_id)?;
        }

        let name = match self.name {
            Some(name) => name,
            None => {
                *unnamed += 1;
                format!("IN{}", unnamed)
            }
        };
        if let Some(node) = tree.get_node_mut(id) {
            node.name = Some(name);
            node.length = self.length;
            node.properties = self.properties;
        }
        if self.ancestor {
            marked.push(id);
        }

        Ok(id)
    }
}

// ================================================================================================
// Parsers
// ================================================================================================

// 1. Whitespace eater
fn ws<'a, F, O, E>(inner: F) -> impl Parser<&'a str, Output = O, Error = E>
where
    F: Parser<&'a str, Output = O, Error = E>,
    E: ParseError<&'a str>,
{
    delimited(multispace0, inner, multispace0)
}

// 2. Label
// Unquoted labels stop at reserved chars "():;,[]@".
// Quoted labels use '' or "" to escape the quote character.
fn parse_label(input: &str) -> IResult<&str, String, DetailedError<'_>> {
    let unquoted = map(take_while(|c: char| !"():;,[]@".contains(c)), |s: &str| {
        s.trim().to_string()
    });

    let single_quoted = delimited(
        char('\''),
        map(is_not("'"), |s: &str| s.replace("''", "'")),
        char('\''),
    );

    let double_quoted = delimited(
        char('"'),
        map(is_not("\""), |s: &str| s.replace("\"\"", "\"")),
        char('"'),
    );

    context("label", alt((single_quoted, double_quoted, unquoted))).parse(input)
}

// 3. Length
// Branch length after a colon, scientific notation allowed.
fn parse_length(input: &str) -> IResult<&str, f64, DetailedError<'_>> {
    context(
        "length",
        preceded(
            ws(char(':')),
            cut(map_res(
                recognize((
                    opt(char('-')),
                    digit1,
                    opt((char('.'), digit1)),
                    opt((
                        alt((char('e'), char('E'))),
                        opt(alt((char('+'), char('-')))),
                        digit1,
                    )),
                )),
                |s: &str| s.parse::<f64>(),
            )),
        ),
    )
    .parse(input)
}

// 4. Comment
// [&&NHX:key=value:...] or [key=value ...] become properties; other comments are dropped.
fn parse_comment(
    input: &str,
) -> IResult<&str, Option<BTreeMap<String, String>>, DetailedError<'_>> {
    let comment_content = delimited(ws(char('[')), is_not("]"), char(']'));

    context(
        "comment",
        map(opt(comment_content), |content: Option<&str>| {
            let s = content?;
            let mut props = BTreeMap::new();
            if s.starts_with("&&NHX") {
                for part in s.split(':') {
                    if let Some((k, v)) = part.split_once('=') {
                        props.insert(k.to_string(), v.to_string());
                    }
                }
            } else {
                for part in s.split_whitespace() {
                    if let Some((k, v)) = part.split_once('=') {
                        props.insert(k.to_string(), v.to_string());
                    }
                }
            }
            if props.is_empty() {
                None
            } else {
                Some(props)
            }
        }),
    )
    .parse(input)
}

// 5. Subtree
// (child1,child2)@Label:Length[Comment]
fn parse_subtree<'a>(
    input: &'a str,
    depth: usize,
) -> IResult<&'a str, ParsedNode, DetailedError<'a>> {
    if depth > MAX_TREE_DEPTH {
        return Err(nom::Err::Failure(DetailedError {
            errors: vec![(input, DetailedErrorKind::Context(DEPTH_CONTEXT))],
        }));
    }

    // 1. Children
    let (input, children) = context(
        "children",
        opt(delimited(
            ws(char('(')),
            separated_list1(ws(char(',')), move |i: &'a str| {
                parse_subtree(i, depth + 1)
            }),
            ws(char(')')),
        )),
    )
    .parse(input)?;

    // 2. Ancestor marker and label
    let (input, marker) = opt(ws(char(ANCESTOR_MARKER))).parse(input)?;
    let (input, label) = opt(parse_label).parse(input)?;

    // 3. Comments may surround the length
    let (input, comment1) = parse_comment(input)?;
    let (input, length) = opt(parse_length).parse(input)?;
    let (input, comment2) = parse_comment(input)?;

    let mut node = ParsedNode::new();
    if let Some(c) = children {
        node.children = c;
    }
    if let Some(l) = label {
        if !l.is_empty() {
            node.name = Some(l);
        }
    }
    node.ancestor = marker.is_some();
    node.length = length;

    if comment1.is_some() || comment2.is_some() {
        let mut props = BTreeMap::new();
        if let Some(p) = comment1 {
            props.extend(p);
        }
        if let Some(p) = comment2 {
            props.extend(p);
        }
        node.properties = Some(props);
    }

    Ok((input, node))
}

// ================================================================================================
// Entry Points
// ================================================================================================

/// Parses a single tree description ending with ';'.
///
/// At most one node may carry the `@` marker and it must be internal; without a
/// marker the root is the designated ancestor.
pub fn parse_newick(input: &str) -> Result<Tree, TreeError> {
    let mut parser = (ws(|i| parse_subtree(i, 0)), ws(char(';')));

    let root_node = match parser.parse(input) {
        Ok((_, (root_node, _))) => root_node,
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
            return Err(make_tree_error(input, e))
        }
        Err(nom::Err::Incomplete(_)) => {
            return Err(TreeError::ParseError {
                message: "Incomplete input".to_string(),
                line: 0,
                column: 0,
                snippet: "".to_string(),
            })
        }
    };

    let mut tree = Tree::new();
    let mut unnamed = 0;
    let mut marked = Vec::new();
    let root_id = root_node.to_tree(&mut tree, &mut unnamed, &mut marked)?;
    tree.set_root(root_id);

    match marked.as_slice() {
        [] => tree.set_ancestor(root_id),
        [id] => {
            if tree.get_node(*id).map(|n| n.is_leaf()).unwrap_or(true) {
                return Err(TreeError::LogicError(format!(
                    "Designated ancestor {} is a leaf",
                    tree.get_node(*id).map(|n| n.name_or_id()).unwrap_or_default()
                )));
            }
            tree.set_ancestor(*id);
        }
        _ => {
            return Err(TreeError::LogicError(format!(
                "Ancestor marker '{}' appears {} times",
                ANCESTOR_MARKER,
                marked.len()
            )))
        }
    }

    Ok(tree)
}

// Helper to convert nom errors into friendly TreeError
fn make_tree_error(input: &str, e: DetailedError) -> TreeError {
    if e
        .errors
        .iter()
        .any(|(_, kind)| *kind == DetailedErrorKind::Context(DEPTH_CONTEXT))
    {
        return TreeError::CapacityError {
            limit: MAX_TREE_DEPTH,
        };
    }

    let remaining = match e.errors.first() {
        Some((remaining, _)) => *remaining,
        None => input,
    };
    let offset = input.offset(remaining);

    // Calculate line/col
    let prefix = &input[..offset];
    let line = prefix.chars().filter(|&c| c == '\n').count() + 1;
    let last_newline = prefix.rfind('\n').map(|p| p + 1).unwrap_or(0);
    let column = offset - last_newline + 1;

    let mut msg = String::new();
    for (_, kind) in e.errors.iter().rev() {
        match kind {
            DetailedErrorKind::Context(ctx) => {
                msg.push_str(&format!("while parsing {}:\n", ctx));
            }
            DetailedErrorKind::Nom(k) => {
                msg.push_str(&format!("  error: {:?}\n", k));
            }
        }
    }

    TreeError::ParseError {
        message: msg,
        line,
        column,
        snippet: remaining.chars().take(50).collect(),
    }
}

impl Tree {
    /// Parse a tree description into a Tree.
    ///
    /// # Example
    /// ```
    /// use deschrambler::libs::phylo::tree::Tree;
    ///
    /// let tree = Tree::from_newick("((A:0.1,B:0.2)@anc:0.3,C:0.4);").unwrap();
    /// assert_eq!(tree.len(), 5);
    ///
    /// let anc = tree.get_ancestor().unwrap();
    /// assert_eq!(tree.get_node(anc).unwrap().name.as_deref(), Some("anc"));
    ///
    /// assert!(Tree::from_newick("(A,B:invalid)C;").is_err());
    /// ```
    pub fn from_newick(input: &str) -> Result<Self, TreeError> {
        parse_newick(input)
    }
}
