use std::collections::HashMap;

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;

use lead_pulse::{aggregate, compute_remaining, Countdown, Lead, LeadStatus};

const MEMBERS: [&str; 5] = ["", "Ali", "Sara", "Omar", "Hina"];

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 10, 16, 12, 0, 0).unwrap()
}

fn status_strategy() -> impl Strategy<Value = LeadStatus> {
    prop_oneof![
        Just(LeadStatus::OnTraining),
        Just(LeadStatus::OnDeposit),
        Just(LeadStatus::Blocked),
        Just(LeadStatus::Opened),
        Just(LeadStatus::FollowUp),
        Just(LeadStatus::NotInterested),
        Just(LeadStatus::Unknown),
    ]
}

fn leads_strategy() -> impl Strategy<Value = Vec<Lead>> {
    prop::collection::vec((0..MEMBERS.len(), status_strategy(), 0i64..90), 0..60).prop_map(
        |rows| {
            rows.into_iter()
                .enumerate()
                .map(|(i, (member, status, days_ago))| Lead {
                    id: i.to_string(),
                    client_number: format!("client-{i}"),
                    my_number: String::new(),
                    team_member: MEMBERS[member].to_string(),
                    status,
                    remarks: String::new(),
                    created_at: Some(now() - Duration::days(days_ago)),
                    date: None,
                    reminder: None,
                })
                .collect()
        },
    )
}

proptest! {
    #[test]
    fn ranking_covers_each_member_once(leads in leads_strategy()) {
        let ranked: Vec<_> = aggregate(&leads, &now()).collect();

        let mut expected: HashMap<&str, usize> = HashMap::new();
        for lead in leads.iter().filter(|l| !l.team_member.is_empty()) {
            *expected.entry(lead.team_member.as_str()).or_default() += 1;
        }

        prop_assert_eq!(ranked.len(), expected.len());
        for stats in &ranked {
            prop_assert_eq!(Some(&stats.total), expected.get(stats.name.as_str()));
        }
    }

    #[test]
    fn ranking_is_sorted_descending(leads in leads_strategy()) {
        let ranked: Vec<_> = aggregate(&leads, &now()).collect();
        for pair in ranked.windows(2) {
            prop_assert!(pair[0].rank_key() >= pair[1].rank_key());
        }
    }

    #[test]
    fn ranking_is_idempotent(leads in leads_strategy()) {
        let first: Vec<_> = aggregate(&leads, &now()).collect();
        let second: Vec<_> = aggregate(&leads, &now()).collect();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn countdown_shrinks_until_reached(ahead in 1i64..200_000, step in 60i64..5_000) {
        let target = (now() + Duration::seconds(ahead)).to_rfc3339();
        let mut previous = i64::MAX;
        let mut elapsed = 0;

        while elapsed < ahead {
            match compute_remaining(now() + Duration::seconds(elapsed), &target, "PST") {
                Countdown::Remaining(remaining) => {
                    prop_assert!(remaining.total_seconds() < previous);
                    prop_assert_eq!(remaining.total_seconds(), ahead - elapsed);
                    previous = remaining.total_seconds();
                }
                other => prop_assert!(false, "unexpected {:?}", other),
            }
            elapsed += step;
        }

        prop_assert_eq!(
            compute_remaining(now() + Duration::seconds(ahead), &target, "PST"),
            Countdown::Reached
        );
    }

    #[test]
    fn past_targets_are_reached(behind in 0i64..10_000_000, zone in "(EST|CST|MST|PST|UTC|XYZ)") {
        let target = (now() - Duration::seconds(behind)).to_rfc3339();
        prop_assert_eq!(compute_remaining(now(), &target, &zone), Countdown::Reached);
    }
}
