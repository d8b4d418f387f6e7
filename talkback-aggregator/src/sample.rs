use rand::seq::SliceRandom;
use rand::Rng;
use talkback_common::Comment;

/// Default number of comments forwarded to the summarizer.
pub const DEFAULT_SAMPLE_CAP: usize = 50;

/// Draw `min(cap, comments.len())` comments uniformly without replacement.
///
/// The input is left untouched; the result is in shuffled order.
///
/// ```
/// use rand::{rngs::StdRng, SeedableRng};
/// use talkback_aggregator::sample;
/// use talkback_common::Comment;
///
/// let comments: Vec<Comment> = (0..10).map(|i| Comment::from_raw(&i.to_string())).collect();
/// let picked = sample(&comments, 4, &mut StdRng::seed_from_u64(1));
/// assert_eq!(picked.len(), 4);
/// ```
pub fn sample<R: Rng + ?Sized>(comments: &[Comment], cap: usize, rng: &mut R) -> Vec<Comment> {
    let mut pool = comments.to_vec();
    pool.shuffle(rng);
    pool.truncate(cap.min(comments.len()));
    pool
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn numbered(n: usize) -> Vec<Comment> {
        (0..n).map(|i| Comment::from_raw(&format!("c{i}"))).collect()
    }

    #[test]
    fn size_is_capped() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(sample(&numbered(120), 50, &mut rng).len(), 50);
        assert_eq!(sample(&numbered(12), 50, &mut rng).len(), 12);
        assert_eq!(sample(&numbered(50), 50, &mut rng).len(), 50);
        assert!(sample(&numbered(0), 50, &mut rng).is_empty());
        assert!(sample(&numbered(5), 0, &mut rng).is_empty());
    }

    #[test]
    fn members_come_from_input_without_duplicates() {
        let input = numbered(80);
        let picked = sample(&input, 50, &mut StdRng::seed_from_u64(42));

        let unique: HashSet<&Comment> = picked.iter().collect();
        assert_eq!(unique.len(), picked.len());
        assert!(picked.iter().all(|c| input.contains(c)));
    }

    #[test]
    fn input_is_not_mutated() {
        let input = numbered(30);
        let before = input.clone();
        let _ = sample(&input, 10, &mut StdRng::seed_from_u64(3));
        assert_eq!(input, before);
    }

    #[test]
    fn same_seed_same_sample() {
        let input = numbered(60);
        let a = sample(&input, 20, &mut StdRng::seed_from_u64(9));
        let b = sample(&input, 20, &mut StdRng::seed_from_u64(9));
        assert_eq!(a, b);
    }

    #[test]
    fn every_comment_can_be_picked() {
        let input = numbered(10);
        let mut seen = HashSet::new();
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            seen.extend(sample(&input, 3, &mut rng));
        }
        assert_eq!(seen.len(), input.len());
    }
}
