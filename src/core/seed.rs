//! Built-in templates written on first run.

use chrono::Utc;
use log::info;

use crate::core::error::Result;
use crate::core::model::{NewTemplate, TemplateKind, TemplateVariable};
use crate::core::store::{Store, templates};

struct Seed {
    name: &'static str,
    description: &'static str,
    kind: TemplateKind,
    icon: &'static str,
    body: &'static str,
    variables: &'static [(&'static str, &'static str)],
    is_default: bool,
}

const SEEDS: &[Seed] = &[
    Seed {
        name: "Blank Note",
        description: "An empty note",
        kind: TemplateKind::Note,
        icon: "📝",
        body: "",
        variables: &[],
        is_default: true,
    },
    Seed {
        name: "Blank Todo",
        description: "An empty todo",
        kind: TemplateKind::Todo,
        icon: "☑",
        body: "",
        variables: &[],
        is_default: true,
    },
    Seed {
        name: "Meeting Notes",
        description: "Attendees, agenda, decisions and action items",
        kind: TemplateKind::Note,
        icon: "👥",
        body: "## Attendees\n\n- \n\n## Agenda\n\n1. \n\n## Decisions\n\n- \n\n## Action Items\n\n- [ ] \n",
        variables: &[("date", ""), ("meeting", "")],
        is_default: false,
    },
    Seed {
        name: "Daily Standup",
        description: "Yesterday, today, blockers",
        kind: TemplateKind::Note,
        icon: "🌅",
        body: "## Yesterday\n\n- \n\n## Today\n\n- \n\n## Blockers\n\n- None\n",
        variables: &[("date", "")],
        is_default: false,
    },
    Seed {
        name: "Bug Report",
        description: "Steps to reproduce, expected and actual behaviour",
        kind: TemplateKind::Todo,
        icon: "🐛",
        body: "## Summary\n\n\n## Steps to Reproduce\n\n1. \n\n## Expected\n\n\n## Actual\n\n\n## Environment\n\n- \n",
        variables: &[("component", "")],
        is_default: false,
    },
    Seed {
        name: "Feature Request",
        description: "Problem, proposal, acceptance criteria",
        kind: TemplateKind::Todo,
        icon: "✨",
        body: "## Problem\n\n\n## Proposal\n\n\n## Acceptance Criteria\n\n- [ ] \n",
        variables: &[],
        is_default: false,
    },
    Seed {
        name: "Weekly Review",
        description: "Wins, misses and next week's focus",
        kind: TemplateKind::Note,
        icon: "📅",
        body: "## Wins\n\n- \n\n## Misses\n\n- \n\n## Next Week\n\n- \n",
        variables: &[("week", "")],
        is_default: false,
    },
    Seed {
        name: "Project Note",
        description: "Goal, status, links and open questions",
        kind: TemplateKind::Note,
        icon: "📂",
        body: "## Goal\n\n\n## Status\n\n\n## Links\n\n- \n\n## Open Questions\n\n- \n",
        variables: &[("project", "")],
        is_default: false,
    },
];

/// Insert the built-in templates if the table is empty. Returns how many
/// were written.
pub fn ensure_templates(store: &Store) -> Result<usize> {
    store.write(|tx| {
        if templates::count(tx)? > 0 {
            return Ok(0);
        }
        let now = Utc::now();
        for seed in SEEDS {
            let new = NewTemplate {
                name: seed.name.to_string(),
                description: seed.description.to_string(),
                body: seed.body.to_string(),
                kind: seed.kind,
                icon: Some(seed.icon.to_string()),
                variables: seed
                    .variables
                    .iter()
                    .map(|(name, default)| TemplateVariable {
                        name: name.to_string(),
                        default: default.to_string(),
                    })
                    .collect(),
                is_default: seed.is_default,
            };
            templates::insert(tx, &new, now)?;
        }
        info!("Seeded {} built-in templates", SEEDS.len());
        Ok(SEEDS.len())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeds_once() {
        let store = Store::open_in_memory().unwrap();
        assert_eq!(ensure_templates(&store).unwrap(), SEEDS.len());
        assert_eq!(ensure_templates(&store).unwrap(), 0);
        assert_eq!(store.read(templates::count).unwrap(), SEEDS.len() as u64);
    }

    #[test]
    fn test_one_default_per_kind() {
        for kind in [TemplateKind::Note, TemplateKind::Todo] {
            let defaults = SEEDS.iter().filter(|s| s.kind == kind && s.is_default).count();
            assert_eq!(defaults, 1, "{kind:?}");
        }
    }
}
