//! Rule sets for the portable renderer

use super::render::{Node, NodeKind, Serialized, Serializers};
use crate::helpers::html_escape;

/// Leaves every kind to the built-in rules
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultSerializers;

impl Serializers for DefaultSerializers {
    fn serialize(&self, _node: &Node<'_>) -> Serialized {
        Serialized::Unhandled
    }
}

/// Rules used on post pages
#[derive(Debug, Clone, Copy, Default)]
pub struct BlogSerializers;

impl Serializers for BlogSerializers {
    fn serialize(&self, node: &Node<'_>) -> Serialized {
        let c = node.children;
        match node.kind {
            NodeKind::Heading(1) => {
                Serialized::Html(format!(r#"<h1 class="text-2xl font-bold my-5">{}</h1>"#, c))
            }
            NodeKind::Heading(2) => {
                Serialized::Html(format!(r#"<h2 class="text-xl font-bold my-5">{}</h2>"#, c))
            }
            NodeKind::ListItem(_) => {
                Serialized::Html(format!(r#"<li class="ml-4 list-disc">{}</li>"#, c))
            }
            NodeKind::Link { href } => Serialized::Html(format!(
                r#"<a href="{}" class="text-blue-500 hover:underline">{}</a>"#,
                html_escape(href),
                c
            )),
            _ => Serialized::Unhandled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blog_rules() {
        let node = Node {
            kind: NodeKind::Heading(1),
            children: "Title",
        };
        assert_eq!(
            BlogSerializers.serialize(&node),
            Serialized::Html(r#"<h1 class="text-2xl font-bold my-5">Title</h1>"#.to_string())
        );

        let node = Node {
            kind: NodeKind::Link { href: "/about" },
            children: "About",
        };
        assert!(matches!(
            BlogSerializers.serialize(&node),
            Serialized::Html(ref html) if html.contains(r#"href="/about""#)
        ));
    }

    #[test]
    fn test_blog_rules_leave_others_unhandled() {
        for kind in [NodeKind::Heading(3), NodeKind::Paragraph, NodeKind::Strong] {
            let node = Node {
                kind,
                children: "x",
            };
            assert_eq!(BlogSerializers.serialize(&node), Serialized::Unhandled);
        }
    }
}
