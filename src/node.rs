use std::ops::Deref;

/// Color of the link from parent to a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Color {
    Red,
    Black,
}

impl Color {
    #[inline]
    fn flip(self) -> Color {
        match self {
            Color::Red => Color::Black,
            Color::Black => Color::Red,
        }
    }
}

/// Node corresponds to a single key in Llrb instance.
#[derive(Clone)]
pub(crate) struct Node<K>
where
    K: Ord,
{
    pub(crate) key: K,
    pub(crate) color: Color,
    pub(crate) left: Option<Box<Node<K>>>,  // store: left child
    pub(crate) right: Option<Box<Node<K>>>, // store: right child
    pub(crate) count: usize,                // store: size of sub-tree
}

impl<K> Node<K>
where
    K: Ord,
{
    // new nodes always enter the tree as red.
    pub(crate) fn new(key: K) -> Box<Node<K>> {
        Box::new(Node {
            key,
            color: Color::Red,
            left: None,
            right: None,
            count: 1,
        })
    }

    #[inline]
    pub(crate) fn left_deref(&self) -> Option<&Node<K>> {
        self.left.as_ref().map(Deref::deref)
    }

    #[inline]
    pub(crate) fn right_deref(&self) -> Option<&Node<K>> {
        self.right.as_ref().map(Deref::deref)
    }

    #[inline]
    pub(crate) fn set_red(&mut self) {
        self.color = Color::Red
    }

    #[inline]
    pub(crate) fn set_black(&mut self) {
        self.color = Color::Black
    }

    #[inline]
    pub(crate) fn toggle_link(&mut self) {
        self.color = self.color.flip()
    }

    #[inline]
    pub(crate) fn is_black(&self) -> bool {
        self.color == Color::Black
    }

    /// Refresh cached sub-tree size, call after children are re-linked.
    #[inline]
    pub(crate) fn recompute_count(&mut self) {
        self.count = 1 + size_of(self.left_deref()) + size_of(self.right_deref());
    }
}

#[inline]
pub(crate) fn size_of<K: Ord>(node: Option<&Node<K>>) -> usize {
    node.map_or(0, |node| node.count)
}

#[inline]
pub(crate) fn is_red<K: Ord>(node: Option<&Node<K>>) -> bool {
    node.map_or(false, |node| !node.is_black())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_flip() {
        assert_eq!(Color::Red.flip(), Color::Black);
        assert_eq!(Color::Black.flip(), Color::Red);

        let mut node = Node::new(10);
        assert!(is_red(Some(&*node)));
        node.toggle_link();
        assert!(node.is_black());
        node.toggle_link();
        assert!(is_red(Some(&*node)));
    }

    #[test]
    fn test_recompute_count() {
        assert_eq!(size_of::<i32>(None), 0);
        assert!(!is_red::<i32>(None));

        let mut node = Node::new(10);
        assert_eq!(size_of(Some(&*node)), 1);

        let mut left = Node::new(5);
        left.left = Some(Node::new(1));
        left.recompute_count();
        node.left = Some(left);
        node.right = Some(Node::new(20));
        node.recompute_count();
        assert_eq!(node.count, 4);
    }
}
