#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Decision {
    Consume,
    Skip,
    Abort,
}

/// Folds `acc` over `candidates` in order. `step` returns the next
/// accumulator and whether the candidate is consumed. On `Abort` the scan
/// stops and the current candidate, with everything after it, is left
/// unconsumed. Both returned lists keep the input order.
pub(crate) fn consume_inputs<T, A>(
    candidates: Vec<T>,
    mut acc: A,
    mut step: impl FnMut(A, &T) -> (A, Decision),
) -> (A, Vec<T>, Vec<T>) {
    let mut consumed = Vec::new();
    let mut remaining = Vec::new();
    let mut candidates = candidates.into_iter();

    while let Some(candidate) = candidates.next() {
        let (next, decision) = step(acc, &candidate);
        acc = next;

        match decision {
            Decision::Consume => consumed.push(candidate),
            Decision::Skip => remaining.push(candidate),
            Decision::Abort => {
                remaining.push(candidate);
                remaining.extend(candidates.by_ref());
                break;
            }
        }
    }

    (acc, consumed, remaining)
}

/// Splits `candidates` into (consumed, remaining) according to `predicate`,
/// which returns `(consume, abort)` for each candidate.
pub(crate) fn partition<T>(
    candidates: Vec<T>,
    mut predicate: impl FnMut(&T) -> (bool, bool),
) -> (Vec<T>, Vec<T>) {
    let ((), consumed, remaining) = consume_inputs(candidates, (), |(), candidate| {
        let decision = match predicate(candidate) {
            (_, true) => Decision::Abort,
            (true, false) => Decision::Consume,
            (false, false) => Decision::Skip,
        };
        ((), decision)
    });

    (consumed, remaining)
}

#[cfg(test)]
mod tests {
    use {super::*, pretty_assertions::assert_eq, std::collections::HashSet};

    fn assert_complete(candidates: &[u32], consumed: &[u32], remaining: &[u32]) {
        let consumed_set = consumed.iter().collect::<HashSet<_>>();
        let remaining_set = remaining.iter().collect::<HashSet<_>>();

        assert!(consumed_set.is_disjoint(&remaining_set));
        assert_eq!(consumed.len() + remaining.len(), candidates.len());
        assert_eq!(
            consumed_set.union(&remaining_set).count(),
            candidates.iter().collect::<HashSet<_>>().len()
        );
    }

    #[test]
    fn predicate_filters_in_order() {
        let candidates = (0..10).collect::<Vec<u32>>();

        let (consumed, remaining) = partition(candidates.clone(), |n| (n % 3 == 0, false));

        assert_eq!(consumed, vec![0, 3, 6, 9]);
        assert_eq!(remaining, vec![1, 2, 4, 5, 7, 8]);
        assert_complete(&candidates, &consumed, &remaining);
    }

    #[test]
    fn abort_keeps_current_and_rest_in_order() {
        let candidates = (0..8).collect::<Vec<u32>>();

        let (consumed, remaining) = partition(candidates.clone(), |n| (n % 2 == 0, *n == 5));

        assert_eq!(consumed, vec![0, 2, 4]);
        assert_eq!(remaining, vec![1, 3, 5, 6, 7]);
        assert_complete(&candidates, &consumed, &remaining);
    }

    #[test]
    fn abort_wins_over_consume() {
        let (consumed, remaining) = partition(vec![1, 2, 3], |n| (true, *n == 2));
        assert_eq!(consumed, vec![1]);
        assert_eq!(remaining, vec![2, 3]);
    }

    #[test]
    fn abort_on_first_candidate_consumes_nothing() {
        let candidates = vec![4, 5, 6];
        let (consumed, remaining) = partition(candidates.clone(), |_| (true, true));
        assert!(consumed.is_empty());
        assert_eq!(remaining, candidates);
    }

    #[test]
    fn empty_candidates() {
        let (consumed, remaining) = partition(Vec::<u32>::new(), |_| (true, false));
        assert!(consumed.is_empty());
        assert!(remaining.is_empty());
    }

    #[test]
    fn every_abort_index_splits_at_that_index() {
        let candidates = (0..6).collect::<Vec<u32>>();

        for abort_at in 0..candidates.len() as u32 {
            let (consumed, remaining) =
                partition(candidates.clone(), |n| (true, *n == abort_at));

            assert_eq!(consumed, (0..abort_at).collect::<Vec<_>>());
            assert_eq!(remaining, (abort_at..6).collect::<Vec<_>>());
        }
    }

    #[test]
    fn accumulator_is_threaded_through_steps() {
        let (sum, consumed, remaining) =
            consume_inputs(vec![5, 1, 7, 2, 9], 0u32, |sum, n| {
                if sum + n > 10 {
                    (sum, Decision::Abort)
                } else {
                    (sum + n, Decision::Consume)
                }
            });

        assert_eq!(sum, 6);
        assert_eq!(consumed, vec![5, 1]);
        assert_eq!(remaining, vec![7, 2, 9]);
    }

    #[test]
    fn skipped_candidates_leave_accumulator_untouched() {
        let (count, consumed, remaining) = consume_inputs(vec![1, 2, 3, 4], 0, |count, n| {
            if n % 2 == 0 {
                (count + 1, Decision::Consume)
            } else {
                (count, Decision::Skip)
            }
        });

        assert_eq!(count, 2);
        assert_eq!(consumed, vec![2, 4]);
        assert_eq!(remaining, vec![1, 3]);
    }
}
