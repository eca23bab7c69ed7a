// Grouping engine: uniform shuffle, then contiguous fixed-size slices.

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::roster::participant::Participant;

/// Smallest group size the engine accepts.
pub const MIN_GROUP_SIZE: usize = 1;

/// Cosmetic colour tag for a group card. Carries no meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Theme {
    Blue,
    Emerald,
    Violet,
    Amber,
    Rose,
    Cyan,
    Fuchsia,
    Orange,
}

pub const THEME_PALETTE: [Theme; 8] = [
    Theme::Blue,
    Theme::Emerald,
    Theme::Violet,
    Theme::Amber,
    Theme::Rose,
    Theme::Cyan,
    Theme::Fuchsia,
    Theme::Orange,
];

impl Theme {
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        THEME_PALETTE[rng.random_range(0..THEME_PALETTE.len())]
    }

    pub fn label(self) -> &'static str {
        match self {
            Theme::Blue => "blue",
            Theme::Emerald => "emerald",
            Theme::Violet => "violet",
            Theme::Amber => "amber",
            Theme::Rose => "rose",
            Theme::Cyan => "cyan",
            Theme::Fuchsia => "fuchsia",
            Theme::Orange => "orange",
        }
    }
}

/// One team in a grouping result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    /// `group-<index>`, zero-based.
    pub id: String,
    /// `Group <n>`, one-based.
    pub name: String,
    pub members: Vec<Participant>,
    pub theme: Theme,
}

/// A full partition of a roster snapshot into groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupingResult {
    pub groups: Vec<Group>,
    pub group_size: usize,
    pub generated_at: DateTime<Utc>,
}

impl GroupingResult {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total members across all groups.
    pub fn member_count(&self) -> usize {
        self.groups.iter().map(|g| g.members.len()).sum()
    }
}

/// Clamp a requested group size to the valid range.
pub fn clamp_group_size(requested: i64) -> usize {
    if requested < MIN_GROUP_SIZE as i64 {
        MIN_GROUP_SIZE
    } else {
        usize::try_from(requested).unwrap_or(usize::MAX)
    }
}

/// Parse a typed group size. Anything that is not an integer becomes the
/// minimum.
pub fn parse_group_size(input: &str) -> usize {
    input
        .trim()
        .parse::<i64>()
        .map(clamp_group_size)
        .unwrap_or(MIN_GROUP_SIZE)
}

/// Shuffle the snapshot uniformly and slice it into groups of `group_size`.
///
/// The last group holds the remainder. A `group_size` of zero is treated
/// as one.
pub fn generate<R: Rng + ?Sized>(
    snapshot: &[Participant],
    group_size: usize,
    rng: &mut R,
) -> GroupingResult {
    let group_size = group_size.max(MIN_GROUP_SIZE);

    let mut shuffled = snapshot.to_vec();
    shuffled.shuffle(rng);

    let groups = shuffled
        .chunks(group_size)
        .enumerate()
        .map(|(i, members)| Group {
            id: format!("group-{i}"),
            name: format!("Group {}", i + 1),
            members: members.to_vec(),
            theme: Theme::random(&mut *rng),
        })
        .collect();

    GroupingResult {
        groups,
        group_size,
        generated_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::{HashMap, HashSet};

    fn people(n: usize) -> Vec<Participant> {
        (0..n).map(|i| Participant::new(format!("P{i}"))).collect()
    }

    fn sizes(result: &GroupingResult) -> Vec<usize> {
        result.groups.iter().map(|g| g.members.len()).collect()
    }

    #[test]
    fn five_people_in_pairs() {
        let roster: Vec<Participant> = ["A", "B", "C", "D", "E"]
            .iter()
            .map(|&n| Participant::new(n))
            .collect();
        let mut rng = StdRng::seed_from_u64(1);
        let result = generate(&roster, 2, &mut rng);

        assert_eq!(sizes(&result), vec![2, 2, 1]);
        let mut names: Vec<&str> = result
            .groups
            .iter()
            .flat_map(|g| g.members.iter().map(|m| m.name.as_str()))
            .collect();
        names.sort();
        assert_eq!(names, vec!["A", "B", "C", "D", "E"]);
    }

    #[test]
    fn empty_roster_yields_no_groups() {
        let mut rng = StdRng::seed_from_u64(1);
        for size in [1, 2, 7] {
            let result = generate(&[], size, &mut rng);
            assert!(result.is_empty());
        }
    }

    #[test]
    fn oversized_group_holds_everyone() {
        let roster = people(6);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(sizes(&generate(&roster, 6, &mut rng)), vec![6]);
        assert_eq!(sizes(&generate(&roster, 50, &mut rng)), vec![6]);
    }

    #[test]
    fn zero_size_is_treated_as_one() {
        let roster = people(3);
        let mut rng = StdRng::seed_from_u64(1);
        let result = generate(&roster, 0, &mut rng);
        assert_eq!(result.group_size, 1);
        assert_eq!(sizes(&result), vec![1, 1, 1]);
    }

    #[test]
    fn names_and_ids_are_sequential() {
        let mut rng = StdRng::seed_from_u64(1);
        let result = generate(&people(7), 3, &mut rng);
        let names: Vec<&str> = result.groups.iter().map(|g| g.name.as_str()).collect();
        let ids: Vec<&str> = result.groups.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(names, vec!["Group 1", "Group 2", "Group 3"]);
        assert_eq!(ids, vec!["group-0", "group-1", "group-2"]);
    }

    #[test]
    fn partition_property_over_many_shapes() {
        let mut rng = StdRng::seed_from_u64(99);
        for n in 0..30usize {
            let roster = people(n);
            for g in 1..=8usize {
                let result = generate(&roster, g, &mut rng);
                let count = result.groups.len();
                assert_eq!(count, n.div_ceil(g), "n={n} g={g}");

                let mut ids = HashSet::new();
                for group in &result.groups {
                    for m in &group.members {
                        assert!(ids.insert(m.id.clone()), "duplicate member");
                    }
                }
                assert_eq!(ids.len(), n, "omitted member n={n} g={g}");

                if count > 0 {
                    for group in &result.groups[..count - 1] {
                        assert_eq!(group.members.len(), g);
                    }
                    let last = result.groups[count - 1].members.len();
                    assert_eq!(last, n - g * (count - 1));
                    assert!((1..=g).contains(&last));
                }
            }
        }
    }

    #[test]
    fn successive_generations_differ() {
        let roster = people(10);
        let mut rng = StdRng::seed_from_u64(2024);
        let order = |r: &GroupingResult| -> Vec<String> {
            r.groups
                .iter()
                .flat_map(|g| g.members.iter().map(|m| m.id.clone()))
                .collect()
        };
        let mut differing = 0;
        for _ in 0..200 {
            let a = generate(&roster, 3, &mut rng);
            let b = generate(&roster, 3, &mut rng);
            if order(&a) != order(&b) {
                differing += 1;
            }
        }
        // Two equal orderings of 10 people happen with probability 1/10!.
        assert!(differing >= 199, "only {differing} of 200 pairs differed");
    }

    #[test]
    fn shuffle_is_uniform_over_small_permutations() {
        let roster = people(3);
        let mut rng = StdRng::seed_from_u64(5);
        let mut counts: HashMap<Vec<String>, usize> = HashMap::new();
        let trials = 6000;
        for _ in 0..trials {
            let result = generate(&roster, 3, &mut rng);
            let order = result.groups[0].members.iter().map(|m| m.name.clone()).collect();
            *counts.entry(order).or_insert(0) += 1;
        }
        assert_eq!(counts.len(), 6, "all 3! orderings should appear");
        for (order, c) in &counts {
            assert!((800..1200).contains(c), "{:?} seen {} times", order, c);
        }
    }

    #[test]
    fn generate_does_not_touch_snapshot() {
        let roster = people(5);
        let copy = roster.clone();
        let mut rng = StdRng::seed_from_u64(3);
        generate(&roster, 2, &mut rng);
        assert_eq!(roster, copy);
    }

    #[test]
    fn clamp_rejects_non_positive() {
        assert_eq!(clamp_group_size(-5), 1);
        assert_eq!(clamp_group_size(0), 1);
        assert_eq!(clamp_group_size(1), 1);
        assert_eq!(clamp_group_size(4), 4);
    }

    #[test]
    fn parse_handles_garbage() {
        assert_eq!(parse_group_size("5"), 5);
        assert_eq!(parse_group_size(" 3 "), 3);
        assert_eq!(parse_group_size("0"), 1);
        assert_eq!(parse_group_size("-2"), 1);
        assert_eq!(parse_group_size("abc"), 1);
        assert_eq!(parse_group_size(""), 1);
    }

    #[test]
    fn themes_come_from_palette() {
        let mut rng = StdRng::seed_from_u64(11);
        let result = generate(&people(40), 2, &mut rng);
        assert!(result
            .groups
            .iter()
            .all(|g| THEME_PALETTE.contains(&g.theme)));
    }
}
