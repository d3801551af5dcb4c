//! Filter argument trees.
//!
//! Filter keys use bracket notation (`order[title]`,
//! `publicationDate[after]`). Each key becomes a path in a tree whose
//! leaves are argument types and whose inner nodes become list-of-input-
//! object arguments named after their path.

use indexmap::IndexMap;

use crate::error::GraphQLError;
use crate::types::{
    ArgumentMap, FieldDefinition, FieldMap, InputObjectType, InputValueDefinition, LazyFields,
    SchemaType, TypesContainer,
};

/// A node of a filter argument tree.
#[derive(Debug, Clone)]
pub(crate) enum FilterArg {
    /// A complete argument, such as a pagination argument.
    Argument(InputValueDefinition),
    Leaf(SchemaType),
    Node {
        name: String,
        children: FilterArgs,
    },
}

pub(crate) type FilterArgs = IndexMap<String, FilterArg>;

/// Splits `a[b][c]` into `["a", "b", "c"]`.
///
/// An unclosed first bracket is kept in the name with `[` replaced by `_`.
/// Anything after the last closed bracket is ignored.
pub(crate) fn parse_bracket_path(key: &str) -> Vec<String> {
    let Some(open) = key.find('[') else {
        return vec![key.to_string()];
    };

    let (base, mut rest) = key.split_at(open);
    let mut segments = vec![base.to_string()];
    while let Some(inner) = rest.strip_prefix('[') {
        match inner.find(']') {
            Some(close) => {
                segments.push(inner[..close].to_string());
                rest = &inner[close + 1..];
            }
            None => {
                if segments.len() == 1 {
                    segments[0] = format!("{base}_{inner}");
                }
                break;
            }
        }
    }
    segments
}

/// Type name of the node at `path`, below `prefix`.
pub(crate) fn node_name(prefix: &str, path: &[String]) -> String {
    format!("{prefix}_{}", path.join("_").replace('.', "__"))
}

/// Builds the branch for one parsed key. Returns the root key and its node.
pub(crate) fn filter_tree(segments: &[String], leaf: SchemaType, prefix: &str) -> (String, FilterArg) {
    fn branch(segments: &[String], depth: usize, leaf: SchemaType, prefix: &str) -> FilterArg {
        if depth + 1 == segments.len() {
            return FilterArg::Leaf(leaf);
        }
        let mut children = FilterArgs::new();
        children.insert(
            segments[depth + 1].clone(),
            branch(segments, depth + 1, leaf, prefix),
        );
        FilterArg::Node {
            name: node_name(prefix, &segments[..=depth]),
            children,
        }
    }

    let root = segments.first().cloned().unwrap_or_default();
    (root, branch(segments, 0, leaf, prefix))
}

/// Merges `value` under `key`.
///
/// Sub-trees merge recursively. An existing leaf or argument is never
/// overridden and a leaf never replaces a sub-tree.
pub(crate) fn merge_filter_args(args: &mut FilterArgs, key: String, value: FilterArg) {
    match (args.get_mut(&key), value) {
        (None, value) => {
            args.insert(key, value);
        }
        (Some(FilterArg::Node { children, .. }), FilterArg::Node { children: incoming, .. }) => {
            for (child_key, child) in incoming {
                merge_filter_args(children, child_key, child);
            }
        }
        (Some(_), _) => {}
    }
}

/// Materializes a tree into field arguments. Inner nodes become lists of
/// input objects, memoized in `types` by name.
pub(crate) fn convert_filter_args_to_types(
    args: FilterArgs,
    types: &TypesContainer,
) -> Result<ArgumentMap, GraphQLError> {
    args.into_iter()
        .map(|(key, arg)| {
            let definition = match arg {
                FilterArg::Argument(definition) => definition,
                FilterArg::Leaf(ty) => InputValueDefinition::new(ty),
                FilterArg::Node { name, children } => {
                    InputValueDefinition::new(node_type(name, children, types, true)?)
                }
            };
            Ok((key, definition))
        })
        .collect()
}

/// Input object for a node, registered under `name` on first use.
pub(crate) fn node_type(
    name: String,
    children: FilterArgs,
    types: &TypesContainer,
    as_list: bool,
) -> Result<SchemaType, GraphQLError> {
    if types.has(&name) {
        return types.get(&name);
    }

    let mut fields = FieldMap::new();
    for (key, child) in children {
        let field = match child {
            FilterArg::Argument(definition) => FieldDefinition::from(definition),
            FilterArg::Leaf(ty) => FieldDefinition::new(ty),
            FilterArg::Node { name, children } => {
                FieldDefinition::new(node_type(name, children, types, as_list)?)
            }
        };
        fields.insert(key, field);
    }

    let object = SchemaType::InputObject(std::rc::Rc::new(InputObjectType {
        name: name.clone(),
        description: None,
        fields: LazyFields::ready(fields),
    }));
    let ty = if as_list { SchemaType::list_of(object) } else { object };
    types.set(name, ty.clone());
    Ok(ty)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn segments(key: &str) -> Vec<String> {
        parse_bracket_path(key)
    }

    #[test]
    fn test_parse_bracket_path() {
        assert_eq!(segments("title"), vec!["title"]);
        assert_eq!(segments("order[title]"), vec!["order", "title"]);
        assert_eq!(
            segments("publicationDate[strictly_after]"),
            vec!["publicationDate", "strictly_after"]
        );
        assert_eq!(segments("a[b][c]"), vec!["a", "b", "c"]);
        assert_eq!(segments("a[b"), vec!["a_b"]);
        assert_eq!(segments("a[b]tail"), vec!["a", "b"]);
    }

    #[test]
    fn test_filter_tree_names_nodes_by_path() {
        let (root, tree) = filter_tree(&segments("order[author][name]"), SchemaType::string(), "BookFilter");
        assert_eq!(root, "order");
        let FilterArg::Node { name, children } = tree else {
            panic!("expected a node");
        };
        assert_eq!(name, "BookFilter_order");
        let Some(FilterArg::Node { name, .. }) = children.get("author") else {
            panic!("expected a nested node");
        };
        assert_eq!(name, "BookFilter_order_author");
    }

    #[test]
    fn test_merge_combines_sub_trees() {
        let mut args = FilterArgs::new();
        for key in ["order[title]", "order[isbn]"] {
            let (root, tree) = filter_tree(&segments(key), SchemaType::string(), "BookFilter");
            merge_filter_args(&mut args, root, tree);
        }

        let Some(FilterArg::Node { children, .. }) = args.get("order") else {
            panic!("expected a node");
        };
        assert_eq!(children.keys().collect::<Vec<_>>(), vec!["title", "isbn"]);
    }

    #[test]
    fn test_merge_never_overrides() {
        let mut args = FilterArgs::new();
        args.insert(
            "page".into(),
            FilterArg::Argument(InputValueDefinition::new(SchemaType::int())),
        );
        merge_filter_args(&mut args, "page".into(), FilterArg::Leaf(SchemaType::string()));
        assert!(matches!(args.get("page"), Some(FilterArg::Argument(def)) if def.ty.to_string() == "Int"));

        let (root, tree) = filter_tree(&segments("date[after]"), SchemaType::string(), "BookFilter");
        merge_filter_args(&mut args, root, tree);
        merge_filter_args(&mut args, "date".into(), FilterArg::Leaf(SchemaType::string()));
        assert!(matches!(args.get("date"), Some(FilterArg::Node { .. })));
    }

    #[test]
    fn test_convert_memoizes_node_types() {
        let types = TypesContainer::new();
        let build = || {
            let mut args = FilterArgs::new();
            let (root, tree) = filter_tree(&segments("exists[isbn]"), SchemaType::boolean(), "BookFilter");
            merge_filter_args(&mut args, root, tree);
            convert_filter_args_to_types(args, &types).unwrap()
        };

        let first = build();
        let second = build();
        assert_eq!(first["exists"].ty.to_string(), "[BookFilter_exists]");
        assert!(first["exists"].ty.ptr_eq(&second["exists"].ty));
        assert!(types.has("BookFilter_exists"));
    }
}
