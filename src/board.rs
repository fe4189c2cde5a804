use chrono::TimeZone;
use serde::Serialize;

use crate::models::{date_label, Lead, LeadStatus};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusTotals {
    pub total: usize,
    pub on_training: usize,
    pub on_deposit: usize,
    pub opened: usize,
}

impl StatusTotals {
    pub fn from_leads(leads: &[Lead]) -> Self {
        leads.iter().fold(StatusTotals::default(), |mut acc, lead| {
            acc.total += 1;
            match lead.status {
                LeadStatus::OnTraining => acc.on_training += 1,
                LeadStatus::OnDeposit => acc.on_deposit += 1,
                LeadStatus::Opened => acc.opened += 1,
                _ => {}
            }
            acc
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct LeadFilter {
    pub search: Option<String>,
    pub status: Option<LeadStatus>,
}

impl LeadFilter {
    /// Text fields match case-insensitively; the creation date matches on
    /// its `M/D/YYYY` rendering in `zone`, as typed.
    pub fn matches<Tz: TimeZone>(&self, lead: &Lead, zone: &Tz) -> bool {
        if let Some(status) = self.status {
            if lead.status != status {
                return false;
            }
        }

        let Some(term) = self.search.as_deref().filter(|t| !t.is_empty()) else {
            return true;
        };
        let lower = term.to_lowercase();
        let text_hit = [&lead.client_number, &lead.team_member, &lead.remarks]
            .iter()
            .any(|field| field.to_lowercase().contains(&lower));
        if text_hit {
            return true;
        }

        lead.created()
            .map(|created| date_label(created.with_timezone(zone).date_naive()))
            .is_some_and(|label| label.contains(term))
    }

    pub fn apply<'a, Tz: TimeZone>(&self, leads: &'a [Lead], zone: &Tz) -> Vec<&'a Lead> {
        leads.iter().filter(|lead| self.matches(lead, zone)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn lead(member: &str, status: LeadStatus, remarks: &str) -> Lead {
        Lead {
            id: member.to_string(),
            client_number: "+44 7700 900123".to_string(),
            my_number: String::new(),
            team_member: member.to_string(),
            status,
            remarks: remarks.to_string(),
            created_at: Some(Utc.with_ymd_and_hms(2025, 10, 1, 15, 0, 0).unwrap()),
            date: None,
            reminder: None,
        }
    }

    #[test]
    fn totals_count_headline_statuses() {
        let leads = vec![
            lead("a", LeadStatus::Opened, ""),
            lead("b", LeadStatus::OnDeposit, ""),
            lead("c", LeadStatus::OnTraining, ""),
            lead("d", LeadStatus::Blocked, ""),
        ];
        assert_eq!(
            StatusTotals::from_leads(&leads),
            StatusTotals {
                total: 4,
                on_training: 1,
                on_deposit: 1,
                opened: 1,
            }
        );
    }

    #[test]
    fn search_is_case_insensitive_on_text() {
        let leads = vec![
            lead("Ali", LeadStatus::Opened, "Wants a CALLBACK"),
            lead("Sara", LeadStatus::Opened, "no answer"),
        ];
        let filter = LeadFilter {
            search: Some("callback".to_string()),
            status: None,
        };
        let hits = filter.apply(&leads, &Utc);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].team_member, "Ali");
    }

    #[test]
    fn search_matches_rendered_date() {
        let leads = vec![lead("Ali", LeadStatus::Opened, "")];
        let filter = LeadFilter {
            search: Some("10/1/2025".to_string()),
            status: None,
        };
        assert_eq!(filter.apply(&leads, &Utc).len(), 1);
    }

    #[test]
    fn date_match_follows_display_zone() {
        let mut early = lead("Ali", LeadStatus::Opened, "");
        early.created_at = Some(Utc.with_ymd_and_hms(2025, 10, 1, 2, 0, 0).unwrap());
        let leads = vec![early];
        let filter = LeadFilter {
            search: Some("9/30/2025".to_string()),
            status: None,
        };

        assert_eq!(filter.apply(&leads, &Utc).len(), 0);
        assert_eq!(filter.apply(&leads, &chrono_tz::America::Chicago).len(), 1);
    }

    #[test]
    fn status_filter_combines_with_search() {
        let leads = vec![
            lead("Ali", LeadStatus::Opened, ""),
            lead("Ali", LeadStatus::Blocked, ""),
        ];
        let filter = LeadFilter {
            search: Some("ali".to_string()),
            status: Some(LeadStatus::Blocked),
        };
        let hits = filter.apply(&leads, &Utc);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].status, LeadStatus::Blocked);
    }
}
