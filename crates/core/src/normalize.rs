use std::collections::{BTreeMap, BTreeSet};
use types::{ProjectName, SlotCode, Snapshot, Username};

use crate::{validate, ConfigError};

#[derive(Clone, Debug)]
pub struct Project {
    pub name: ProjectName,
    pub responsables: BTreeSet<Username>,
    /// Everyone interested, responsables included.
    pub votes: BTreeSet<Username>,
    pub difficult_level: u8,
    pub theme: Option<String>,
    pub priority_slots: Vec<SlotCode>,
}

/// Canonical model built from a [`Snapshot`]. Projects keep the snapshot's
/// name order, which fixes the enumeration order used by the search.
///
/// Only [`ScheduleData::from_snapshot`] builds one, so a value always holds
/// at least one slot whenever it holds a project.
#[derive(Clone, Debug)]
pub struct ScheduleData {
    projects: Vec<Project>,
    slots: Vec<SlotCode>,
    availability: BTreeMap<Username, Vec<SlotCode>>,
    total_participants: usize,
}

impl ScheduleData {
    pub fn from_snapshot(snap: &Snapshot) -> Result<Self, ConfigError> {
        validate(snap)?;

        let projects: Vec<Project> = snap
            .projects
            .iter()
            .map(|(name, spec)| {
                let responsables: BTreeSet<Username> = spec.responsables.iter().cloned().collect();
                let mut votes: BTreeSet<Username> = spec.votes.iter().cloned().collect();
                votes.extend(responsables.iter().cloned());
                Project {
                    name: name.clone(),
                    responsables,
                    votes,
                    difficult_level: spec.difficult_level,
                    theme: spec.theme.clone(),
                    priority_slots: spec.priority_slots.clone(),
                }
            })
            .collect();

        let total_participants = projects
            .iter()
            .flat_map(|p| p.votes.iter())
            .collect::<BTreeSet<_>>()
            .len();

        Ok(Self {
            projects,
            slots: snap.available_slots.clone(),
            availability: snap.responsable_available_slots.clone(),
            total_participants,
        })
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn slots(&self) -> &[SlotCode] {
        &self.slots
    }

    /// Who can attend which slot. Kept for callers; the search does not read it.
    pub fn availability(&self) -> &BTreeMap<Username, Vec<SlotCode>> {
        &self.availability
    }

    pub fn total_participants(&self) -> usize {
        self.total_participants
    }

    pub fn project_list(&self) -> Vec<&ProjectName> {
        self.projects.iter().map(|p| &p.name).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::ProjectSpec;

    fn users(names: &[&str]) -> Vec<Username> {
        names.iter().map(|&n| Username::from(n)).collect()
    }

    fn sample() -> Snapshot {
        let mut snap = Snapshot {
            available_slots: vec!["A1".into(), "A2".into(), "B1".into(), "B2".into()],
            ..Default::default()
        };
        snap.projects.insert(
            "proyecto1".into(),
            ProjectSpec {
                responsables: users(&["pepe"]),
                votes: users(&["juan", "maria"]),
                difficult_level: 1,
                theme: Some("django".into()),
                priority_slots: vec![],
            },
        );
        snap.projects.insert(
            "proyecto2".into(),
            ProjectSpec {
                responsables: users(&["ana"]),
                votes: users(&["juan", "carlos"]),
                difficult_level: 2,
                theme: Some("flask".into()),
                priority_slots: vec!["B2".into()],
            },
        );
        snap
    }

    #[test]
    fn responsables_are_added_to_votes() {
        let data = ScheduleData::from_snapshot(&sample()).unwrap();
        assert!(data.projects()[0].votes.contains(&Username::from("pepe")));
        assert!(data.projects()[1].votes.contains(&Username::from("ana")));
        assert_eq!(data.projects()[0].votes.len(), 3);
    }

    #[test]
    fn project_list_follows_name_order() {
        let data = ScheduleData::from_snapshot(&sample()).unwrap();
        let names: Vec<&str> = data.project_list().iter().map(|n| n.0.as_str()).collect();
        assert_eq!(names, vec!["proyecto1", "proyecto2"]);
    }

    #[test]
    fn counts_distinct_participants() {
        let data = ScheduleData::from_snapshot(&sample()).unwrap();
        // juan, maria, carlos, pepe, ana
        assert_eq!(data.total_participants(), 5);
    }

    #[test]
    fn priority_slots_pass_through() {
        let data = ScheduleData::from_snapshot(&sample()).unwrap();
        assert_eq!(data.projects()[1].priority_slots, vec![SlotCode::from("B2")]);
    }

    #[test]
    fn keeps_availability_untouched() {
        let mut snap = sample();
        snap.responsable_available_slots.insert("pepe".into(), vec!["A1".into()]);
        let data = ScheduleData::from_snapshot(&snap).unwrap();
        assert_eq!(data.availability()[&Username::from("pepe")], vec![SlotCode::from("A1")]);
        assert_eq!(data.slots().len(), 4);
    }

    #[test]
    fn fails_without_slots() {
        let mut snap = sample();
        snap.available_slots.clear();
        let err = ScheduleData::from_snapshot(&snap).unwrap_err();
        assert_eq!(err, ConfigError::NoSlots { projects: 2 });
    }

    #[test]
    fn empty_snapshot_builds_empty_model() {
        let data = ScheduleData::from_snapshot(&Snapshot::default()).unwrap();
        assert!(data.projects().is_empty());
        assert_eq!(data.total_participants(), 0);
    }
}
