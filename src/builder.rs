//! Turns a parsed token tree into a drawable [`Graph`].

use crate::ast::{Token, TokenKind};
use crate::graph::{Graph, GroupId, Port};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidTreeError {
    #[error("Root term `{0}` has no body to draw, expected a parenthesised group")]
    ChildlessRoot(char),
}

/// Build `root` into `graph`, replacing whatever the graph held before.
///
/// The root token's binders become inputs of the root group. Terms that
/// follow the root in its chain are substituted for those inputs in order;
/// any left over are applied to the root body's result.
///
/// The graph is untouched when the tree is rejected.
pub fn build(graph: &mut Graph, root: &Token) -> Result<(), InvalidTreeError> {
    if root.child().is_none() {
        return Err(InvalidTreeError::ChildlessRoot(
            root.identifier().unwrap_or('?'),
        ));
    }

    graph.clean();
    let target = graph.root();
    Builder { graph }.build_scope(target, root, root.next());

    log::debug!(
        "built graph from {} tokens: {} groups, {} merges",
        root.size(),
        graph.live_groups().len(),
        graph.live_merges().len()
    );
    Ok(())
}

struct Builder<'a> {
    graph: &'a mut Graph,
}

impl Builder<'_> {
    /// Fill `group` from the group token `head`, binding `arguments` to its
    /// inputs left to right.
    fn build_scope(&mut self, group: GroupId, head: &Token, arguments: Option<&Token>) {
        let TokenKind::Group { binders, body } = &head.kind else {
            // A bare variable as a scope is a group whose body is that variable.
            let value = self.operand(group, head);
            self.graph.feed_output(group, value);
            return;
        };

        let outer = self.graph.group(group).parent;
        let mut cursor = arguments;
        for &binder in binders {
            let input = self.graph.add_input(group, binder);
            if let Some(arg) = cursor {
                let hosted = self.graph.add_group(outer);
                self.build_scope(hosted, arg, None);
                self.graph.attach_group(input, hosted);
                cursor = arg.next();
            }
        }

        let mut result = self.chain(group, body);
        while let Some(extra) = cursor {
            let value = self.operand(group, extra);
            result = Some(Port::Merge(self.graph.add_merge(group, result, value)));
            cursor = extra.next();
        }

        self.graph.feed_output(group, result);
    }

    /// Fold an application chain left to right: `f x y` is `(f x) y`.
    fn chain(&mut self, group: GroupId, first: &Token) -> Option<Port> {
        let mut terms = first.siblings();
        let mut acc = terms.next().and_then(|t| self.operand(group, t));
        for term in terms {
            let arg = self.operand(group, term);
            acc = Some(Port::Merge(self.graph.add_merge(group, acc, arg)));
        }
        acc
    }

    /// The value a single term contributes inside `group`.
    fn operand(&mut self, group: GroupId, term: &Token) -> Option<Port> {
        match &term.kind {
            TokenKind::Var(name) => {
                let found = self.graph.get_input(group, *name);
                if found.is_none() {
                    log::debug!("free variable `{}` left unresolved", name);
                }
                found.map(Port::Input)
            }
            TokenKind::Group { .. } => {
                let sub = self.graph.add_subgroup(group);
                self.build_scope(sub, term, None);
                Some(Port::Output(sub))
            }
        }
    }
}
