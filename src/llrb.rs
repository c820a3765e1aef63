use std::{
    borrow::Borrow,
    cmp::{Ord, Ordering},
    iter::FromIterator,
    mem,
    ops::{Bound, Deref, DerefMut, RangeBounds},
};

use log::debug;
use rand::Rng;

use crate::depth::Depth;
use crate::error::LlrbError;
use crate::node::{is_red, size_of, Node};

/// Default number of keys gathered per batch while iterating.
pub(crate) const ITER_LIMIT: usize = 100;

/// Walk no deeper than this while picking a random key.
const RANDOM_DEPTH: u8 = 40;

/// Llrb manage a single instance of in-memory, ordered set of keys, using
/// [left-leaning-red-black][llrb] tree.
///
/// Inserting a key that is already present is a no-op, the stored key
/// is left untouched.
///
/// [llrb]: https://en.wikipedia.org/wiki/Left-leaning_red-black_tree
#[derive(Clone)]
pub struct Llrb<K>
where
    K: Clone + Ord,
{
    name: String,
    root: Option<Box<Node<K>>>,
    iter_limit: usize,
}

/// Different ways to construct a new Llrb instance.
impl<K> Llrb<K>
where
    K: Clone + Ord,
{
    /// Create an empty instance of Llrb, identified by `name`.
    /// Applications can choose unique names.
    pub fn new<S>(name: S) -> Llrb<K>
    where
        S: AsRef<str>,
    {
        Llrb {
            name: name.as_ref().to_string(),
            root: Default::default(),
            iter_limit: ITER_LIMIT,
        }
    }

    /// Create a new instance of Llrb tree and load it with keys from
    /// `iter`, in the order they are returned. Duplicate keys are
    /// silently dropped.
    pub fn build_from<S, I>(name: S, iter: I) -> Llrb<K>
    where
        S: AsRef<str>,
        I: IntoIterator<Item = K>,
    {
        let mut llrb = Llrb::new(name);
        let mut n_items = 0_usize;
        for key in iter {
            llrb.insert(key);
            n_items += 1;
        }
        debug!(
            "{}: loaded {} keys, {} duplicates dropped",
            llrb.name,
            llrb.len(),
            n_items - llrb.len()
        );
        llrb
    }
}

/// Maintenance API.
impl<K> Llrb<K>
where
    K: Clone + Ord,
{
    /// Identify this instance. Applications can choose unique names while
    /// creating Llrb instances.
    #[inline]
    pub fn id(&self) -> String {
        self.name.clone()
    }

    /// Number of keys gathered in a single batch by iterators. Iterators
    /// borrow the tree and re-scan it from root for every batch, larger
    /// batches trade memory for fewer scans. Zero is treated as one.
    pub fn set_iter_limit(&mut self, limit: usize) -> &mut Self {
        self.iter_limit = limit.max(1);
        self
    }

    /// Return number of keys in this instance.
    #[inline]
    pub fn len(&self) -> usize {
        size_of(self.root_deref())
    }

    /// Check whether this index is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Return quickly with basic statisics, only entries() and node_size()
    /// methods are valid with this statisics.
    pub fn stats(&self) -> Stats {
        Stats::new(self.len(), mem::size_of::<Node<K>>())
    }

    /// Validate LLRB tree with following rules:
    ///
    /// * Root link is black.
    /// * Red links lean left.
    /// * From root to any leaf, no consecutive reds allowed in its path.
    /// * Number of blacks should be same under left child and right child.
    /// * Make sure keys are in sorted order.
    /// * Cached sub-tree size matches the number of nodes under it.
    ///
    /// Additionally return full statistics on the tree. Refer to [`Stats`]
    /// for more information.
    pub fn validate(&self) -> Result<Stats, LlrbError<K>> {
        let root = self.root_deref();
        if is_red(root) {
            return Err(LlrbError::RedRoot);
        }

        let mut stats = self.stats();
        stats.set_depths(Depth::new());
        let blacks = Llrb::validate_tree(root, false, 0, 0, &mut stats)?;
        stats.set_blacks(blacks);

        debug!(
            "{}: validated {} keys, blacks:{} height:{:?}",
            self.name,
            stats.entries(),
            blacks,
            stats.height()
        );
        Ok(stats)
    }

    #[inline]
    fn root_deref(&self) -> Option<&Node<K>> {
        self.root.as_ref().map(Deref::deref)
    }
}

type Insert<K> = (Box<Node<K>>, bool);

/// Write operations on Llrb instance.
impl<K> Llrb<K>
where
    K: Clone + Ord,
{
    /// Insert `key` into this set. Return true if key was not already
    /// present, if it was, the set is left as it is and false is returned.
    pub fn insert(&mut self, key: K) -> bool {
        let (mut root, inserted) = Llrb::do_insert(self.root.take(), key);
        root.set_black();
        self.root = Some(root);
        inserted
    }

    fn do_insert(node: Option<Box<Node<K>>>, key: K) -> Insert<K> {
        let mut node = match node {
            None => return (Node::new(key), true),
            Some(node) => node,
        };

        let inserted = match node.key.cmp(&key) {
            Ordering::Greater => {
                let (left, inserted) = Llrb::do_insert(node.left.take(), key);
                node.left = Some(left);
                inserted
            }
            Ordering::Less => {
                let (right, inserted) = Llrb::do_insert(node.right.take(), key);
                node.right = Some(right);
                inserted
            }
            Ordering::Equal => return (node, false),
        };

        let mut node = Llrb::walkuprot_23(node);
        node.recompute_count();
        (node, inserted)
    }
}

impl<K> Extend<K> for Llrb<K>
where
    K: Clone + Ord,
{
    fn extend<I>(&mut self, iter: I)
    where
        I: IntoIterator<Item = K>,
    {
        iter.into_iter().for_each(|key| {
            self.insert(key);
        })
    }
}

impl<K> FromIterator<K> for Llrb<K>
where
    K: Clone + Ord,
{
    fn from_iter<I>(iter: I) -> Llrb<K>
    where
        I: IntoIterator<Item = K>,
    {
        Llrb::build_from("", iter)
    }
}

/// Read operations on Llrb instance.
impl<K> Llrb<K>
where
    K: Clone + Ord,
{
    /// Check whether `key` is present in this set.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut node = self.root_deref();
        while let Some(nref) = node {
            node = match nref.key.borrow().cmp(key) {
                Ordering::Less => nref.right_deref(),
                Ordering::Greater => nref.left_deref(),
                Ordering::Equal => return true,
            };
        }
        false
    }

    /// Return the smallest key in this set.
    pub fn first(&self) -> Option<K> {
        let mut nref = self.root_deref()?;
        while let Some(left) = nref.left_deref() {
            nref = left;
        }
        Some(nref.key.clone())
    }

    /// Return the largest key in this set.
    pub fn last(&self) -> Option<K> {
        let mut nref = self.root_deref()?;
        while let Some(right) = nref.right_deref() {
            nref = right;
        }
        Some(nref.key.clone())
    }

    /// Return a random key from this set.
    pub fn random<R: Rng>(&self, rng: &mut R) -> Option<K> {
        let mut nref = self.root_deref()?;

        let mut at_depth = rng.gen::<u8>() % RANDOM_DEPTH;
        loop {
            let next = if rng.gen::<bool>() {
                nref.left_deref()
            } else {
                nref.right_deref()
            };
            match next {
                Some(next) if at_depth > 0 => {
                    at_depth -= 1;
                    nref = next;
                }
                _ => break Some(nref.key.clone()),
            }
        }
    }

    /// Return an iterator over all keys in ascending order. Each call
    /// returns a fresh iterator starting from the smallest key.
    pub fn iter(&self) -> Iter<K> {
        Iter {
            root: self.root_deref(),
            node_iter: vec![].into_iter(),
            after_key: Some(Bound::Unbounded),
            limit: self.iter_limit,
        }
    }

    /// Range over all keys from low to high, in ascending order. Use
    /// [`Range::rev`] to iterate from high to low.
    pub fn range<Q, R>(&self, range: R) -> Range<K>
    where
        K: Borrow<Q>,
        R: RangeBounds<Q>,
        Q: Ord + ToOwned<Owned = K> + ?Sized,
    {
        let low: Bound<K> = match range.start_bound() {
            Bound::Included(key) => Bound::Included(key.to_owned()),
            Bound::Excluded(key) => Bound::Excluded(key.to_owned()),
            Bound::Unbounded => Bound::Unbounded,
        };
        let high: Bound<K> = match range.end_bound() {
            Bound::Included(key) => Bound::Included(key.to_owned()),
            Bound::Excluded(key) => Bound::Excluded(key.to_owned()),
            Bound::Unbounded => Bound::Unbounded,
        };

        Range {
            root: self.root_deref(),
            node_iter: vec![].into_iter(),
            low: Some(low),
            high,
            limit: self.iter_limit,
        }
    }
}

impl<'a, K> IntoIterator for &'a Llrb<K>
where
    K: Clone + Ord,
{
    type Item = K;
    type IntoIter = Iter<'a, K>;

    fn into_iter(self) -> Iter<'a, K> {
        self.iter()
    }
}

impl<K> Llrb<K>
where
    K: Clone + Ord,
{
    fn validate_tree(
        node: Option<&Node<K>>,
        fromred: bool,
        mut nb: usize,
        depth: usize,
        stats: &mut Stats,
    ) -> Result<usize, LlrbError<K>> {
        let node = match node {
            None => {
                if let Some(depths) = stats.depths.as_mut() {
                    depths.sample(depth)
                }
                return Ok(nb);
            }
            Some(node) => node,
        };

        let red = !node.is_black();
        if fromred && red {
            return Err(LlrbError::ConsecutiveReds);
        }
        if is_red(node.right_deref()) {
            return Err(LlrbError::RightLeaningRed);
        }
        if !red {
            nb += 1;
        }

        let (left, right) = (node.left_deref(), node.right_deref());
        let lblacks = Llrb::validate_tree(left, red, nb, depth + 1, stats)?;
        let rblacks = Llrb::validate_tree(right, red, nb, depth + 1, stats)?;
        if lblacks != rblacks {
            let err = format!("left: {} right: {}", lblacks, rblacks);
            return Err(LlrbError::UnbalancedBlacks(err));
        }

        if let Some(left) = left {
            if left.key.ge(&node.key) {
                let (lkey, parent) = (left.key.clone(), node.key.clone());
                return Err(LlrbError::SortError(lkey, parent));
            }
        }
        if let Some(right) = right {
            if right.key.le(&node.key) {
                let (rkey, parent) = (right.key.clone(), node.key.clone());
                return Err(LlrbError::SortError(rkey, parent));
            }
        }

        let expected = 1 + size_of(left) + size_of(right);
        if node.count != expected {
            let found = node.count;
            return Err(LlrbError::CountMismatch { expected, found });
        }
        Ok(lblacks)
    }

    //--------- rotation routines for 2-3 algorithm ----------------

    fn walkuprot_23(mut node: Box<Node<K>>) -> Box<Node<K>> {
        if is_red(node.right_deref()) && !is_red(node.left_deref()) {
            node = Llrb::rotate_left(node);
        }
        let left = node.left_deref();
        if is_red(left) && is_red(left.and_then(Node::left_deref)) {
            node = Llrb::rotate_right(node);
        }
        if is_red(node.left_deref()) && is_red(node.right_deref()) {
            Llrb::flip(node.deref_mut())
        }
        node
    }

    //              (i)                       (i)
    //               |                         |
    //              node                       x
    //              /  \                      / \
    //             /    (r)                 (r)  \
    //            /       \                 /     \
    //          left       x             node      xr
    //                    / \            /  \
    //                  xl   xr       left   xl
    //
    fn rotate_left(mut node: Box<Node<K>>) -> Box<Node<K>> {
        let mut x = match node.right.take() {
            Some(x) if !x.is_black() => x,
            _ => panic!("rotate_left(): rotating a black link ? Call the programmer"),
        };
        node.right = x.left.take();
        x.color = node.color;
        node.set_red();
        node.recompute_count();
        x.left = Some(node);
        x.recompute_count();
        x
    }

    //              (i)                       (i)
    //               |                         |
    //              node                       x
    //              /  \                      / \
    //            (r)   \                   (r)  \
    //           /       \                 /      \
    //          x       right             xl      node
    //         / \                                / \
    //       xl   xr                             xr  right
    //
    fn rotate_right(mut node: Box<Node<K>>) -> Box<Node<K>> {
        let mut x = match node.left.take() {
            Some(x) if !x.is_black() => x,
            _ => panic!("rotate_right(): rotating a black link ? Call the programmer"),
        };
        node.left = x.right.take();
        x.color = node.color;
        node.set_red();
        node.recompute_count();
        x.right = Some(node);
        x.recompute_count();
        x
    }

    //        (x)                   (!x)
    //         |                     |
    //        node                  node
    //        / \                   / \
    //      (r) (r)               (b) (b)
    //     /      \              /      \
    //   left    right         left    right
    //
    fn flip(node: &mut Node<K>) {
        match (node.left.as_mut(), node.right.as_mut()) {
            (Some(left), Some(right)) if !left.is_black() && !right.is_black() => {
                left.toggle_link();
                right.toggle_link();
            }
            _ => panic!("flip(): children are not a red pair ? Call the programmer"),
        }
        node.toggle_link();
    }
}

/// Iterator over keys in ascending order, refer to [`Llrb::iter`].
pub struct Iter<'a, K>
where
    K: Clone + Ord,
{
    root: Option<&'a Node<K>>,
    node_iter: std::vec::IntoIter<K>,
    after_key: Option<Bound<K>>,
    limit: usize,
}

impl<'a, K> Iter<'a, K>
where
    K: Clone + Ord,
{
    fn scan_iter(
        &self,
        node: Option<&Node<K>>,
        acc: &mut Vec<K>, // accumulator for batch of keys
    ) -> bool {
        let node = match node {
            None => return true,
            Some(node) => node,
        };

        let (left, right) = (node.left_deref(), node.right_deref());
        match &self.after_key {
            None => return false,
            Some(Bound::Included(akey)) | Some(Bound::Excluded(akey)) => {
                if node.key.le(akey) {
                    return self.scan_iter(right, acc);
                }
            }
            Some(Bound::Unbounded) => (),
        }

        if !self.scan_iter(left, acc) {
            return false;
        }

        acc.push(node.key.clone());
        if acc.len() >= self.limit {
            return false;
        }

        self.scan_iter(right, acc)
    }
}

impl<'a, K> Iterator for Iter<'a, K>
where
    K: Clone + Ord,
{
    type Item = K;

    fn next(&mut self) -> Option<Self::Item> {
        match self.node_iter.next() {
            None if self.after_key.is_some() => {
                let mut acc: Vec<K> = Vec::with_capacity(self.limit);
                self.scan_iter(self.root, &mut acc);
                self.after_key = acc.last().map(|x| Bound::Excluded(x.clone()));
                self.node_iter = acc.into_iter();
                self.node_iter.next()
            }
            None => None,
            item @ Some(_) => item,
        }
    }
}

/// Iterator over keys within a range, refer to [`Llrb::range`].
pub struct Range<'a, K>
where
    K: Clone + Ord,
{
    root: Option<&'a Node<K>>,
    node_iter: std::vec::IntoIter<K>,
    low: Option<Bound<K>>,
    high: Bound<K>,
    limit: usize,
}

impl<'a, K> Range<'a, K>
where
    K: Clone + Ord,
{
    /// Iterate the same range in descending order.
    pub fn rev(self) -> Reverse<'a, K> {
        // keys still buffered in the batch are not yet consumed.
        let low = match (self.node_iter.as_slice().first(), self.low) {
            (Some(key), Some(_)) => Bound::Included(key.clone()),
            (_, Some(low)) => low,
            // already exhausted, nothing left to reverse.
            (_, None) => return Reverse::exhausted(self.root, self.limit),
        };
        Reverse {
            root: self.root,
            node_iter: vec![].into_iter(),
            low,
            high: Some(self.high),
            limit: self.limit,
        }
    }

    fn range_iter(
        &self,
        node: Option<&Node<K>>,
        acc: &mut Vec<K>, // accumulator for batch of keys
    ) -> bool {
        let node = match node {
            None => return true,
            Some(node) => node,
        };

        let (left, right) = (node.left_deref(), node.right_deref());
        match &self.low {
            Some(Bound::Included(qow)) if node.key.lt(qow) => {
                return self.range_iter(right, acc);
            }
            Some(Bound::Excluded(qow)) if node.key.le(qow) => {
                return self.range_iter(right, acc);
            }
            _ => (),
        }

        if !self.range_iter(left, acc) {
            return false;
        }

        acc.push(node.key.clone());
        if acc.len() >= self.limit {
            return false;
        }

        self.range_iter(right, acc)
    }
}

impl<'a, K> Iterator for Range<'a, K>
where
    K: Clone + Ord,
{
    type Item = K;

    fn next(&mut self) -> Option<Self::Item> {
        let item = match self.node_iter.next() {
            None if self.low.is_some() => {
                let mut acc: Vec<K> = Vec::with_capacity(self.limit);
                self.range_iter(self.root, &mut acc);
                self.low = acc.last().map(|x| Bound::Excluded(x.clone()));
                self.node_iter = acc.into_iter();
                self.node_iter.next()
            }
            None => None,
            item @ Some(_) => item,
        };
        // check for upper bound
        match item {
            None => None,
            Some(item) => match &self.high {
                Bound::Unbounded => Some(item),
                Bound::Included(qigh) if item.le(qigh) => Some(item),
                Bound::Excluded(qigh) if item.lt(qigh) => Some(item),
                _ => {
                    self.low = None;
                    self.node_iter = vec![].into_iter();
                    None
                }
            },
        }
    }
}

/// Iterator over keys within a range in descending order, refer to
/// [`Range::rev`].
pub struct Reverse<'a, K>
where
    K: Clone + Ord,
{
    root: Option<&'a Node<K>>,
    node_iter: std::vec::IntoIter<K>,
    high: Option<Bound<K>>,
    low: Bound<K>,
    limit: usize,
}

impl<'a, K> Reverse<'a, K>
where
    K: Clone + Ord,
{
    fn exhausted(root: Option<&'a Node<K>>, limit: usize) -> Reverse<'a, K> {
        Reverse {
            root,
            node_iter: vec![].into_iter(),
            high: None,
            low: Bound::Unbounded,
            limit,
        }
    }

    fn reverse_iter(
        &self,
        node: Option<&Node<K>>,
        acc: &mut Vec<K>, // accumulator for batch of keys
    ) -> bool {
        let node = match node {
            None => return true,
            Some(node) => node,
        };

        let (left, right) = (node.left_deref(), node.right_deref());
        match &self.high {
            Some(Bound::Included(qigh)) if node.key.gt(qigh) => {
                return self.reverse_iter(left, acc);
            }
            Some(Bound::Excluded(qigh)) if node.key.ge(qigh) => {
                return self.reverse_iter(left, acc);
            }
            _ => (),
        }

        if !self.reverse_iter(right, acc) {
            return false;
        }

        acc.push(node.key.clone());
        if acc.len() >= self.limit {
            return false;
        }

        self.reverse_iter(left, acc)
    }
}

impl<'a, K> Iterator for Reverse<'a, K>
where
    K: Clone + Ord,
{
    type Item = K;

    fn next(&mut self) -> Option<Self::Item> {
        let item = match self.node_iter.next() {
            None if self.high.is_some() => {
                let mut acc: Vec<K> = Vec::with_capacity(self.limit);
                self.reverse_iter(self.root, &mut acc);
                self.high = acc.last().map(|x| Bound::Excluded(x.clone()));
                self.node_iter = acc.into_iter();
                self.node_iter.next()
            }
            None => None,
            item @ Some(_) => item,
        };
        // check for lower bound
        match item {
            None => None,
            Some(item) => match &self.low {
                Bound::Unbounded => Some(item),
                Bound::Included(qow) if item.ge(qow) => Some(item),
                Bound::Excluded(qow) if item.gt(qow) => Some(item),
                _ => {
                    self.high = None;
                    self.node_iter = vec![].into_iter();
                    None
                }
            },
        }
    }
}

/// Statistics on [`Llrb`] tree. Serves two purpose:
///
/// * To get partial but quick statistics via [`Llrb::stats`] method.
/// * To get full statisics via [`Llrb::validate`] method.
#[derive(Default, Debug)]
pub struct Stats {
    entries: usize, // number of keys in the tree.
    node_size: usize,
    blacks: Option<usize>,
    depths: Option<Depth>,
}

impl Stats {
    fn new(entries: usize, node_size: usize) -> Stats {
        Stats {
            entries,
            node_size,
            blacks: Default::default(),
            depths: Default::default(),
        }
    }

    #[inline]
    fn set_blacks(&mut self, blacks: usize) {
        self.blacks = Some(blacks)
    }

    #[inline]
    fn set_depths(&mut self, depths: Depth) {
        self.depths = Some(depths)
    }

    /// Return number of keys in [`Llrb`] instance.
    #[inline]
    pub fn entries(&self) -> usize {
        self.entries
    }

    /// Return node-size, including over-head for `Llrb<K>`. Although
    /// the node overhead is constant, the node size varies based on
    /// key type. EG:
    ///
    /// ```
    /// use llrb_set::Llrb;
    /// let llrb: Llrb<u64> = Llrb::new("myinstance");
    ///
    /// // size of key: 8 bytes
    /// // overhead is 32 bytes
    /// assert_eq!(llrb.stats().node_size(), 40);
    /// ```
    #[inline]
    pub fn node_size(&self) -> usize {
        self.node_size
    }

    /// Return number of black links from root to leaf, same for every
    /// path. Available only from [`Llrb::validate`].
    #[inline]
    pub fn blacks(&self) -> Option<usize> {
        self.blacks
    }

    /// Return [`Depth`] statistics, available only from [`Llrb::validate`].
    pub fn depths(&self) -> Option<Depth> {
        match &self.depths {
            Some(depths) if depths.samples() > 0 => Some(depths.clone()),
            _ => None,
        }
    }

    /// Return the number of nodes on the longest path from root to leaf.
    /// Available only from [`Llrb::validate`].
    pub fn height(&self) -> Option<usize> {
        self.depths().map(|depths| depths.max())
    }
}
