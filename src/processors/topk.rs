//! Top-k selection over classification scores.

/// Result of top-k selection for a batch of score vectors.
#[derive(Debug, Clone, PartialEq)]
pub struct TopkResult {
    /// The top-k class indexes for each prediction, best first.
    pub indexes: Vec<Vec<usize>>,
    /// The scores matching `indexes`.
    pub scores: Vec<Vec<f32>>,
}

/// Extracts the k most confident classes from classifier outputs.
///
/// Ordering is stable: among equal scores the lower class index comes first,
/// which keeps `k = 1` consistent with argmax.
#[derive(Debug, Default, Clone, Copy)]
pub struct Topk;

impl Topk {
    pub fn new() -> Self {
        Self
    }

    /// Processes a batch of score vectors.
    ///
    /// # Arguments
    ///
    /// * `predictions` - One score vector per prediction.
    /// * `k` - Number of classes to keep per prediction (must be > 0). Clamped
    ///   to the number of classes.
    ///
    /// # Errors
    ///
    /// Returns an error if `k` is 0 or a score vector is empty.
    pub fn process(&self, predictions: &[Vec<f32>], k: usize) -> Result<TopkResult, String> {
        if k == 0 {
            return Err("k must be greater than 0".to_string());
        }

        let mut indexes = Vec::with_capacity(predictions.len());
        let mut scores = Vec::with_capacity(predictions.len());

        for prediction in predictions {
            if prediction.is_empty() {
                return Err("Empty prediction vector".to_string());
            }
            let (top_indexes, top_scores) =
                Self::extract_topk(prediction, k.min(prediction.len()));
            indexes.push(top_indexes);
            scores.push(top_scores);
        }

        Ok(TopkResult { indexes, scores })
    }

    /// Processes a single score vector.
    pub fn process_single(&self, prediction: &[f32], k: usize) -> Result<TopkResult, String> {
        self.process(&[prediction.to_vec()], k)
    }

    fn extract_topk(prediction: &[f32], k: usize) -> (Vec<usize>, Vec<f32>) {
        let mut indexed_scores: Vec<(usize, f32)> =
            prediction.iter().copied().enumerate().collect();

        // Stable sort, descending by score
        indexed_scores.sort_by(|a, b| b.1.total_cmp(&a.1));

        indexed_scores.into_iter().take(k).unzip()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topk_batch() {
        let topk = Topk::new();
        let predictions = vec![vec![0.1, 0.8, 0.1], vec![0.7, 0.2, 0.1]];

        let result = topk.process(&predictions, 2).unwrap();
        assert_eq!(result.indexes.len(), 2);
        assert_eq!(result.indexes[0], vec![1, 0]); // Class 1 (0.8), Class 0 (0.1)
        assert_eq!(result.indexes[1], vec![0, 1]); // Class 0 (0.7), Class 1 (0.2)
    }

    #[test]
    fn test_topk_ties_keep_lowest_index_first() {
        let topk = Topk::new();
        let result = topk
            .process_single(&[0.1, 0.9, 0.9, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0], 1)
            .unwrap();
        assert_eq!(result.indexes[0], vec![1]);
    }

    #[test]
    fn test_topk_k_larger_than_classes() {
        let topk = Topk::new();
        let result = topk.process(&[vec![0.1, 0.8]], 5).unwrap();
        assert_eq!(result.indexes[0].len(), 2);
    }

    #[test]
    fn test_topk_invalid_k() {
        let topk = Topk::new();
        assert!(topk.process(&[vec![0.1, 0.8, 0.1]], 0).is_err());
    }

    #[test]
    fn test_topk_empty_inputs() {
        let topk = Topk::new();
        let result = topk.process(&[], 2).unwrap();
        assert!(result.indexes.is_empty());
        assert!(topk.process(&[vec![]], 1).is_err());
    }
}
