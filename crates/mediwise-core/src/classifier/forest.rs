//! Tree-ensemble inference.
//!
//! Probability for a class is the mean, over trees, of the normalized class
//! weights in the leaf each tree routes the input to.

use serde::{Deserialize, Serialize};

/// Trained tree ensemble.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForestModel {
    /// Feature names in trained input order
    pub features: Vec<String>,
    pub n_classes: usize,
    pub trees: Vec<DecisionTree>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DecisionTree {
    /// Node 0 is the root
    pub nodes: Vec<TreeNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum TreeNode {
    /// Go left when `x[feature] <= threshold`
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        /// Per-class weights (sample counts or fractions)
        value: Vec<f64>,
    },
}

impl ForestModel {
    /// Structural checks run once at load time.
    pub fn validate(&self, schema: &[&str]) -> Result<(), String> {
        if self.features.len() != schema.len()
            || self.features.iter().zip(schema).any(|(a, b)| a != b)
        {
            return Err(format!(
                "model features {:?} do not match the biomarker schema",
                self.features
            ));
        }
        if self.n_classes == 0 {
            return Err("model has no classes".into());
        }
        if self.trees.is_empty() {
            return Err("model has no trees".into());
        }

        for (t, tree) in self.trees.iter().enumerate() {
            if tree.nodes.is_empty() {
                return Err(format!("tree {} is empty", t));
            }
            for (n, node) in tree.nodes.iter().enumerate() {
                match node {
                    TreeNode::Split {
                        feature,
                        threshold,
                        left,
                        right,
                    } => {
                        if *feature >= self.features.len() {
                            return Err(format!("tree {} node {}: feature {} out of range", t, n, feature));
                        }
                        if !threshold.is_finite() {
                            return Err(format!("tree {} node {}: threshold is not finite", t, n));
                        }
                        if *left >= tree.nodes.len() || *right >= tree.nodes.len() {
                            return Err(format!("tree {} node {}: child index out of range", t, n));
                        }
                    }
                    TreeNode::Leaf { value } => {
                        if value.len() != self.n_classes {
                            return Err(format!(
                                "tree {} node {}: leaf has {} weights, expected {}",
                                t,
                                n,
                                value.len(),
                                self.n_classes
                            ));
                        }
                        if value.iter().any(|w| !w.is_finite() || *w < 0.0) {
                            return Err(format!("tree {} node {}: invalid leaf weight", t, n));
                        }
                        if value.iter().sum::<f64>() <= 0.0 {
                            return Err(format!("tree {} node {}: leaf weights sum to zero", t, n));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Class probabilities for one input row.
    pub fn predict_proba(&self, x: &[f64]) -> Result<Vec<f64>, String> {
        if x.len() != self.features.len() {
            return Err(format!(
                "input has {} features, model expects {}",
                x.len(),
                self.features.len()
            ));
        }
        if self.trees.is_empty() {
            return Err("model has no trees".into());
        }

        let mut proba = vec![0.0; self.n_classes];
        for (t, tree) in self.trees.iter().enumerate() {
            let leaf = tree.leaf_for(x).map_err(|e| format!("tree {}: {}", t, e))?;
            if leaf.len() != self.n_classes {
                return Err(format!("tree {}: leaf width {} != {}", t, leaf.len(), self.n_classes));
            }
            let total: f64 = leaf.iter().sum();
            if !total.is_finite() || total <= 0.0 {
                return Err(format!("tree {}: degenerate leaf", t));
            }
            for (p, w) in proba.iter_mut().zip(leaf) {
                *p += w / total;
            }
        }

        let n_trees = self.trees.len() as f64;
        for p in proba.iter_mut() {
            *p /= n_trees;
        }
        if proba.iter().any(|p| !p.is_finite()) {
            return Err("non-finite class probability".into());
        }
        Ok(proba)
    }

    /// Index and probability of the most likely class (first on ties).
    pub fn predict(&self, x: &[f64]) -> Result<(usize, f64), String> {
        let proba = self.predict_proba(x)?;
        let mut best = 0;
        for (idx, p) in proba.iter().enumerate() {
            if *p > proba[best] {
                best = idx;
            }
        }
        Ok((best, proba[best]))
    }
}

impl DecisionTree {
    /// Walk from the root to a leaf. Bounded by the node count, so a malformed
    /// tree with a cycle fails instead of looping.
    fn leaf_for(&self, x: &[f64]) -> Result<&[f64], String> {
        let mut idx = 0;
        for _ in 0..=self.nodes.len() {
            match self.nodes.get(idx) {
                Some(TreeNode::Leaf { value }) => return Ok(value),
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let v = x
                        .get(*feature)
                        .ok_or_else(|| format!("feature {} out of range", feature))?;
                    idx = if *v <= *threshold { *left } else { *right };
                }
                None => return Err(format!("node {} does not exist", idx)),
            }
        }
        Err("no leaf reached (cycle in tree)".into())
    }
}
