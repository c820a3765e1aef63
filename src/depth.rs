use std::fmt;

/// Deepest path that can be sampled. A red-black tree with height beyond
/// this would need more than 2^127 keys.
const MAX_DEPTH: usize = 256;

/// Depth calculates minimum, maximum, average and percentile of leaf-node
/// depths in the [`Llrb`] tree. Depth of a leaf is the number of nodes
/// on the path from root to an absent child.
///
/// [`Llrb`]: crate::Llrb
#[derive(Clone)]
pub struct Depth {
    samples: usize,
    min: usize,
    max: usize,
    total: usize,
    depths: [u64; MAX_DEPTH],
}

impl Depth {
    pub(crate) fn new() -> Depth {
        Default::default()
    }

    pub(crate) fn sample(&mut self, depth: usize) {
        if self.samples == 0 || depth < self.min {
            self.min = depth
        }
        if depth > self.max {
            self.max = depth
        }
        self.samples += 1;
        self.total += depth;
        self.depths[depth.min(MAX_DEPTH - 1)] += 1;
    }

    /// Return number of leaf-nodes sampled.
    pub fn samples(&self) -> usize {
        self.samples
    }

    /// Return minimum depth of leaf-node.
    pub fn min(&self) -> usize {
        self.min
    }

    /// Return maximum depth of leaf-node, same as the height of the tree.
    pub fn max(&self) -> usize {
        self.max
    }

    /// Return the average depth of leaf-nodes.
    pub fn mean(&self) -> usize {
        self.total.checked_div(self.samples).unwrap_or(0)
    }

    /// Return depth as tuple of percentiles, each tuple provides
    /// (percentile, depth). Only percentiles from 90 onwards are
    /// reported, the last one is always 100.
    pub fn percentiles(&self) -> Vec<(u8, usize)> {
        let mut percentiles: Vec<(u8, usize)> = vec![];
        let (mut acc, mut prev_perc) = (0_u64, None);
        let iter = self.depths.iter().enumerate().filter(|(_, &n)| n > 0);
        for (depth, n) in iter {
            acc += *n;
            let perc = ((acc as f64 / self.samples as f64) * 100_f64) as u8;
            // report each percentile once, at the shallowest depth reaching it.
            if perc >= 90 && prev_perc.map_or(true, |prev| perc > prev) {
                percentiles.push((perc, depth));
                prev_perc = Some(perc);
            }
        }
        percentiles
    }
}

impl Default for Depth {
    fn default() -> Self {
        Depth {
            samples: 0,
            min: 0,
            max: 0,
            total: 0,
            depths: [0; MAX_DEPTH],
        }
    }
}

impl fmt::Debug for Depth {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Depth")
            .field("samples", &self.samples)
            .field("min", &self.min)
            .field("max", &self.max)
            .field("mean", &self.mean())
            .finish()
    }
}

/// Human readable depth statistics, useful in logs.
impl fmt::Display for Depth {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "depth (min, avg, max): ({}, {}, {})",
            self.min,
            self.mean(),
            self.max
        )?;
        for (perc, depth) in self.percentiles().into_iter() {
            write!(f, ", {}th:{}", perc, depth)?;
        }
        Ok(())
    }
}
