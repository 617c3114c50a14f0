use serde::{Deserialize, Serialize};

use crate::protocol::Choice;

/// Poll-wide tally, recomputed by a full scan of the votes container on every
/// read. Aggregation is read-time, not write-time: the vote path stays O(1)
/// and there are no running counters that could drift from the raw votes.
///
/// The two percentages round independently, so they are not guaranteed to sum
/// to 100. Both are 0 for an empty poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tally {
    pub total: u32,
    pub yes: u32,
    pub no: u32,
    pub pct_yes: u32,
    pub pct_no: u32,
}

impl Tally {
    pub fn from_votes<'a, I>(votes: I) -> Self
    where
        I: IntoIterator<Item = &'a Choice>,
    {
        let mut yes = 0;
        let mut no = 0;
        for choice in votes {
            match choice {
                Choice::Yes => yes += 1,
                Choice::No => no += 1,
            }
        }
        let total = yes + no;
        Self {
            total,
            yes,
            no,
            pct_yes: pct(yes, total),
            pct_no: pct(no, total),
        }
    }
}

fn pct(n: u32, total: u32) -> u32 {
    if total == 0 {
        0
    } else {
        (f64::from(n) / f64::from(total) * 100.0).round() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::Tally;
    use crate::protocol::Choice;

    fn tally(yes: usize, no: usize) -> Tally {
        let votes: Vec<Choice> = std::iter::repeat(Choice::Yes)
            .take(yes)
            .chain(std::iter::repeat(Choice::No).take(no))
            .collect();
        Tally::from_votes(&votes)
    }

    #[test]
    fn empty_poll_is_all_zero() {
        let t = tally(0, 0);
        assert_eq!(t.total, 0);
        assert_eq!(t.pct_yes, 0);
        assert_eq!(t.pct_no, 0);
    }

    #[test]
    fn yes_plus_no_equals_total() {
        for (yes, no) in [(1, 0), (0, 1), (3, 5), (10, 10)] {
            let t = tally(yes, no);
            assert_eq!(t.yes + t.no, t.total);
        }
    }

    #[test]
    fn unanimous_poll_is_one_hundred_percent() {
        let t = tally(4, 0);
        assert_eq!((t.pct_yes, t.pct_no), (100, 0));
    }

    #[test]
    fn percentages_round_independently() {
        // 3/8 and 5/8 both round up, so the pair sums to 101. Documented
        // behavior, not a bug.
        let t = tally(3, 5);
        assert_eq!((t.pct_yes, t.pct_no), (38, 63));
    }

    #[test]
    fn serializes_camel_case() {
        let body = serde_json::to_value(tally(1, 0)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"total": 1, "yes": 1, "no": 0, "pctYes": 100, "pctNo": 0})
        );
    }
}
