use crate::dom::Document;
use crate::types::NodeId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Filter {
    Accept,
    /// Skip the node and its whole subtree.
    Reject,
}

/// Pre-order walk over the descendants of a root (the root itself is not yielded).
///
/// Yields `(node, depth)` where depth is the distance from the document root, so
/// values are comparable with [`Document::depth`].
pub struct TreeWalker<'a, F> {
    doc: &'a Document,
    stack: Vec<(NodeId, usize)>,
    filter: F,
}

impl<'a, F> TreeWalker<'a, F>
where
    F: FnMut(&Document, NodeId) -> Filter,
{
    pub fn new(doc: &'a Document, root: NodeId, filter: F) -> Self {
        let depth = doc.depth(root) + 1;
        let stack = doc
            .children(root)
            .iter()
            .rev()
            .map(|&id| (id, depth))
            .collect();
        Self { doc, stack, filter }
    }
}

impl<F> Iterator for TreeWalker<'_, F>
where
    F: FnMut(&Document, NodeId) -> Filter,
{
    type Item = (NodeId, usize);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((id, depth)) = self.stack.pop() {
            if (self.filter)(self.doc, id) == Filter::Reject {
                continue;
            }
            self.stack.extend(
                self.doc
                    .children(id)
                    .iter()
                    .rev()
                    .map(|&child| (child, depth + 1)),
            );
            return Some((id, depth));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walker_yields_preorder_with_depths() {
        let doc = Document::parse("<div><p>a</p>b</div>");
        let steps: Vec<(String, usize)> = TreeWalker::new(&doc, doc.root(), |_, _| Filter::Accept)
            .map(|(id, depth)| {
                let label = doc
                    .tag_name(id)
                    .or_else(|| doc.text(id))
                    .unwrap_or("?")
                    .to_string();
                (label, depth)
            })
            .collect();
        assert_eq!(
            steps,
            vec![
                ("div".to_string(), 1),
                ("p".to_string(), 2),
                ("a".to_string(), 3),
                ("b".to_string(), 2),
            ]
        );
    }

    #[test]
    fn rejected_subtrees_are_skipped() {
        let doc = Document::parse("<div><script>x</script><p>y</p></div>");
        let texts: Vec<&str> = TreeWalker::new(&doc, doc.root(), |d, id| {
            if d.tag_name(id) == Some("script") {
                Filter::Reject
            } else {
                Filter::Accept
            }
        })
        .filter_map(|(id, _)| doc.text(id))
        .collect();
        assert_eq!(texts, vec!["y"]);
    }
}
