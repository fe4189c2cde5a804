use std::collections::HashMap;

use chrono::{DateTime, Datelike, TimeZone};

use crate::models::{Lead, LeadStatus, TeamMemberStats};

/// Ranks team members by what their leads turned into.
///
/// Groups keep the order in which a member first shows up in `leads`; the
/// sort is stable, so members that tie on every key stay in that order.
/// Month-to-date entries are bucketed by calendar day in `now`'s timezone.
pub fn aggregate<Tz: TimeZone>(
    leads: &[Lead],
    now: &DateTime<Tz>,
) -> impl ExactSizeIterator<Item = TeamMemberStats> {
    let zone = now.timezone();
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut members: Vec<TeamMemberStats> = Vec::new();

    for lead in leads {
        let name = lead.team_member.as_str();
        if name.is_empty() {
            continue;
        }

        let slot = *index.entry(name).or_insert_with(|| {
            members.push(TeamMemberStats::new(name));
            members.len() - 1
        });
        let entry = &mut members[slot];

        entry.total += 1;
        match lead.status {
            LeadStatus::Opened => entry.opened += 1,
            LeadStatus::OnDeposit => entry.on_deposit += 1,
            LeadStatus::OnTraining => entry.on_training += 1,
            LeadStatus::Blocked => entry.blocked += 1,
            LeadStatus::FollowUp => entry.follow_up += 1,
            LeadStatus::NotInterested => entry.not_interested += 1,
            LeadStatus::Unknown => {}
        }

        if let Some(created) = lead.created() {
            let local = created.with_timezone(&zone);
            if local.year() == now.year() && local.month() == now.month() {
                *entry.date_wise_entries.entry(local.date_naive()).or_insert(0) += 1;
            }
        }
    }

    members.sort_by(|a, b| b.rank_key().cmp(&a.rank_key()));
    members.into_iter()
}
